use crate::db::{DbPool, PooledConn};
use crate::domain::api_log::{ApiLog, NewApiLog};
use crate::repository::credit_balance_repo::{like_pattern, parse_timestamp};
use crate::repository::error::RepositoryResult;
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};

const API_LOG_COLUMNS: &str =
    "id, user_name, voucher_id, api_endpoint, request_timestamp, ip_address, user_agent";

fn map_row(row: &Row) -> rusqlite::Result<ApiLog> {
    let ts: String = row.get(4)?;
    Ok(ApiLog {
        id: row.get(0)?,
        user_name: row.get(1)?,
        voucher_id: row.get(2)?,
        api_endpoint: row.get(3)?,
        request_timestamp: parse_timestamp(4, &ts)?,
        ip_address: row.get(5)?,
        user_agent: row.get(6)?,
    })
}

// ==========================================
// ApiLogRepository - 访问日志仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct ApiLogRepository {
    pool: DbPool,
    namespace: String,
}

impl ApiLogRepository {
    pub fn new(pool: DbPool, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }

    pub(super) fn get_conn(&self) -> RepositoryResult<PooledConn> {
        Ok(self.pool.get()?)
    }

    /// 插入访问日志（request_timestamp 取当前时间）
    ///
    /// # 返回
    /// - `Ok(id)`: 新日志 id
    pub fn insert(&self, log: &NewApiLog) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            &format!(
                r#"
                INSERT INTO {}.api_logs (
                    user_name, voucher_id, api_endpoint, request_timestamp, ip_address, user_agent
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                self.namespace
            ),
            params![
                log.user_name,
                log.voucher_id,
                log.api_endpoint,
                Utc::now().to_rfc3339(),
                log.ip_address,
                log.user_agent,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 查询访问日志（最新在前）
    ///
    /// # 参数
    /// - `user_name`: 请求人部分匹配（大小写不敏感），None 不过滤
    /// - `skip`: 偏移量
    /// - `limit`: 最大条数，None 不限制
    pub fn list(
        &self,
        user_name: Option<&str>,
        skip: i64,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<ApiLog>> {
        let mut values: Vec<Value> = Vec::new();
        let where_clause = match user_name.map(str::trim).filter(|v| !v.is_empty()) {
            Some(name) => {
                values.push(Value::Text(like_pattern(name)));
                "WHERE user_name LIKE ? ESCAPE '\\'"
            }
            None => "",
        };
        values.push(Value::Integer(limit.unwrap_or(-1)));
        values.push(Value::Integer(skip.max(0)));

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {}.api_logs {} ORDER BY request_timestamp DESC, id DESC LIMIT ? OFFSET ?",
            API_LOG_COLUMNS, self.namespace, where_clause
        ))?;
        let logs = stmt
            .query_map(params_from_iter(values), map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    /// 日志总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}.api_logs", self.namespace),
            [],
            |row| row.get(0),
        )?;
        Ok(n)
    }
}
