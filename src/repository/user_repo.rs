// ==========================================
// 诊所储值余额系统 - 用户数据仓储
// ==========================================
// 对齐: {namespace}.users 表
// 红线: hashed_password 只在仓储与认证模块之间流转
// ==========================================

use crate::db::{DbPool, PooledConn};
use crate::domain::user::{NewUser, User};
use crate::repository::credit_balance_repo::{parse_optional_timestamp, parse_timestamp};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

const USER_COLUMNS: &str = r#"
    id, username, email, hashed_password, full_name, role, role_id,
    center_id, is_active, is_verified, created_at, updated_at
"#;

fn map_row(row: &Row) -> rusqlite::Result<User> {
    let created_at: String = row.get(10)?;
    let updated_at: Option<String> = row.get(11)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        hashed_password: row.get(3)?,
        full_name: row.get(4)?,
        role: row.get(5)?,
        role_id: row.get(6)?,
        center_id: row.get(7)?,
        is_active: row.get(8)?,
        is_verified: row.get(9)?,
        created_at: parse_timestamp(10, &created_at)?,
        updated_at: parse_optional_timestamp(11, updated_at)?,
    })
}

// ==========================================
// UserRepository - 用户仓储
// ==========================================
pub struct UserRepository {
    pool: DbPool,
    namespace: String,
}

impl UserRepository {
    pub fn new(pool: DbPool, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }

    fn get_conn(&self) -> RepositoryResult<PooledConn> {
        Ok(self.pool.get()?)
    }

    /// 新建用户（username / email 唯一，center_id 须指向已存在的中心）
    pub fn insert(&self, user: &NewUser) -> RepositoryResult<User> {
        let conn = self.get_conn()?;
        conn.execute(
            &format!(
                r#"
                INSERT INTO {}.users (
                    username, email, hashed_password, full_name, role, role_id,
                    center_id, is_active, is_verified, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                self.namespace
            ),
            params![
                user.username,
                user.email,
                user.hashed_password,
                user.full_name,
                user.role,
                user.role_id,
                user.center_id,
                user.is_active,
                user.is_verified,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.find_by_id(id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "User".to_string(),
            id: id.to_string(),
        })
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let user = conn
            .query_row(
                &format!(
                    "SELECT {} FROM {}.users WHERE id = ?1",
                    USER_COLUMNS, self.namespace
                ),
                params![id],
                map_row,
            )
            .optional()?;
        Ok(user)
    }

    /// 按用户名精确查询
    pub fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let user = conn
            .query_row(
                &format!(
                    "SELECT {} FROM {}.users WHERE username = ?1",
                    USER_COLUMNS, self.namespace
                ),
                params![username],
                map_row,
            )
            .optional()?;
        Ok(user)
    }
}
