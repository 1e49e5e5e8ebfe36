// ==========================================
// 诊所储值余额系统 - 中心数据仓储
// ==========================================
// 对齐: {namespace}.centers 表
// ==========================================

use crate::db::{DbPool, PooledConn};
use crate::domain::center::{Center, NewCenter};
use crate::repository::credit_balance_repo::{parse_optional_timestamp, parse_timestamp};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

const CENTER_COLUMNS: &str =
    "id, name, code, address, phone, email, is_active, created_at, updated_at";

fn map_row(row: &Row) -> rusqlite::Result<Center> {
    let created_at: String = row.get(7)?;
    let updated_at: Option<String> = row.get(8)?;
    Ok(Center {
        id: row.get(0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        address: row.get(3)?,
        phone: row.get(4)?,
        email: row.get(5)?,
        is_active: row.get(6)?,
        created_at: parse_timestamp(7, &created_at)?,
        updated_at: parse_optional_timestamp(8, updated_at)?,
    })
}

// ==========================================
// CenterRepository - 中心仓储
// ==========================================
pub struct CenterRepository {
    pool: DbPool,
    namespace: String,
}

impl CenterRepository {
    pub fn new(pool: DbPool, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }

    fn get_conn(&self) -> RepositoryResult<PooledConn> {
        Ok(self.pool.get()?)
    }

    /// 新建中心（name / code 唯一）
    pub fn insert(&self, center: &NewCenter) -> RepositoryResult<Center> {
        let conn = self.get_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO {}.centers (name, code, address, phone, email, is_active, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                self.namespace
            ),
            params![
                center.name,
                center.code,
                center.address,
                center.phone,
                center.email,
                center.is_active,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.find_by_id(id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Center".to_string(),
            id: id.to_string(),
        })
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Center>> {
        let conn = self.get_conn()?;
        let center = conn
            .query_row(
                &format!(
                    "SELECT {} FROM {}.centers WHERE id = ?1",
                    CENTER_COLUMNS, self.namespace
                ),
                params![id],
                map_row,
            )
            .optional()?;
        Ok(center)
    }

    /// 启用中的中心（按 id 升序）
    pub fn list_active(&self) -> RepositoryResult<Vec<Center>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {}.centers WHERE is_active = 1 ORDER BY id ASC",
            CENTER_COLUMNS, self.namespace
        ))?;
        let centers = stmt
            .query_map([], map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(centers)
    }
}
