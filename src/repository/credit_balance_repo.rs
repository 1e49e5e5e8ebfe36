// ==========================================
// 诊所储值余额系统 - 储值余额数据仓储
// ==========================================
// 对齐: credit_balances 表
// 红线: Repository 不含业务规则（券号派生在 API/导入层完成）
// ==========================================

use crate::db::{DbPool, PooledConn};
use crate::domain::credit_balance::{
    CreditBalance, CreditBalanceFilter, CreditBalanceSummary, NewCreditBalance,
};
use crate::repository::error::RepositoryResult;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row, Transaction};

/// SELECT 列清单（与 map_row 的下标对齐）
pub(crate) const CREDIT_BALANCE_COLUMNS: &str = r#"
    id, client_code, client_name, phone_no, treatment_name,
    package_amount, amount_paid, balance_amount, prepaid_gift_card_balance,
    center, final_bucket, sessions_paid, sessions_consumed, balance_sessions,
    email, voucher_number, created_at, updated_at
"#;

/// 解析 RFC3339 时间戳列
pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// 解析可空时间戳列
pub(crate) fn parse_optional_timestamp(
    idx: usize,
    raw: Option<String>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    raw.map(|s| parse_timestamp(idx, &s)).transpose()
}

/// 转义 LIKE 通配符（配合 ESCAPE '\'）
pub(crate) fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn map_row(row: &Row) -> rusqlite::Result<CreditBalance> {
    let created_at: String = row.get(16)?;
    let updated_at: Option<String> = row.get(17)?;

    Ok(CreditBalance {
        id: row.get(0)?,
        client_code: row.get(1)?,
        client_name: row.get(2)?,
        phone_no: row.get(3)?,
        treatment_name: row.get(4)?,
        package_amount: row.get(5)?,
        amount_paid: row.get(6)?,
        balance_amount: row.get(7)?,
        prepaid_gift_card_balance: row.get(8)?,
        center: row.get(9)?,
        final_bucket: row.get(10)?,
        sessions_paid: row.get(11)?,
        sessions_consumed: row.get(12)?,
        balance_sessions: row.get(13)?,
        email: row.get(14)?,
        voucher_number: row.get(15)?,
        created_at: parse_timestamp(16, &created_at)?,
        updated_at: parse_optional_timestamp(17, updated_at)?,
    })
}

/// 在事务中插入一条记录，返回新 id
pub(crate) fn insert_tx(
    tx: &Transaction,
    record: &NewCreditBalance,
    created_at: &str,
) -> rusqlite::Result<i64> {
    let mut stmt = tx.prepare_cached(
        r#"
        INSERT INTO credit_balances (
            client_code, client_name, phone_no, treatment_name,
            package_amount, amount_paid, balance_amount, prepaid_gift_card_balance,
            center, final_bucket, sessions_paid, sessions_consumed, balance_sessions,
            email, voucher_number, created_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16
        )
        "#,
    )?;
    stmt.execute(params![
        record.client_code,
        record.client_name,
        record.phone_no,
        record.treatment_name,
        record.package_amount,
        record.amount_paid,
        record.balance_amount,
        record.prepaid_gift_card_balance,
        record.center,
        record.final_bucket,
        record.sessions_paid,
        record.sessions_consumed,
        record.balance_sessions,
        record.email,
        record.voucher_number,
        created_at,
    ])?;
    Ok(tx.last_insert_rowid())
}

// ==========================================
// CreditBalanceRepository - 储值余额仓储
// ==========================================
pub struct CreditBalanceRepository {
    pool: DbPool,
}

impl CreditBalanceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// 获取池化连接（随作用域结束归还）
    fn get_conn(&self) -> RepositoryResult<PooledConn> {
        Ok(self.pool.get()?)
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入单条记录
    pub fn insert(&self, record: &NewCreditBalance) -> RepositoryResult<CreditBalance> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let id = insert_tx(&tx, record, &Utc::now().to_rfc3339())?;
        tx.commit()?;
        drop(conn);

        self.find_by_id(id)?
            .ok_or_else(|| crate::repository::error::RepositoryError::NotFound {
                entity: "CreditBalance".to_string(),
                id: id.to_string(),
            })
    }

    /// 整行覆盖更新（id 不变，updated_at 置为当前时间）
    ///
    /// # 返回
    /// - Ok(Some): 更新后的记录
    /// - Ok(None): 记录不存在
    pub fn update(&self, record: &CreditBalance) -> RepositoryResult<Option<CreditBalance>> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE credit_balances SET
                client_code = ?1, client_name = ?2, phone_no = ?3, treatment_name = ?4,
                package_amount = ?5, amount_paid = ?6, balance_amount = ?7,
                prepaid_gift_card_balance = ?8, center = ?9, final_bucket = ?10,
                sessions_paid = ?11, sessions_consumed = ?12, balance_sessions = ?13,
                email = ?14, voucher_number = ?15, updated_at = ?16
            WHERE id = ?17
            "#,
            params![
                record.client_code,
                record.client_name,
                record.phone_no,
                record.treatment_name,
                record.package_amount,
                record.amount_paid,
                record.balance_amount,
                record.prepaid_gift_card_balance,
                record.center,
                record.final_bucket,
                record.sessions_paid,
                record.sessions_consumed,
                record.balance_sessions,
                record.email,
                record.voucher_number,
                Utc::now().to_rfc3339(),
                record.id,
            ],
        )?;
        drop(conn);

        if affected == 0 {
            return Ok(None);
        }
        self.find_by_id(record.id)
    }

    /// 删除记录
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 记录不存在
    pub fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM credit_balances WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    // ==========================================
    // 查询操作
    // ==========================================

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<CreditBalance>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM credit_balances WHERE id = ?1",
            CREDIT_BALANCE_COLUMNS
        );
        let record = conn.query_row(&sql, params![id], map_row).optional()?;
        Ok(record)
    }

    /// 条件查询（部分匹配、大小写不敏感，按 id 升序）
    pub fn list(&self, filter: &CreditBalanceFilter) -> RepositoryResult<Vec<CreditBalance>> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        let text_filters = [
            ("client_code LIKE ? ESCAPE '\\'", &filter.client_code),
            ("client_name LIKE ? ESCAPE '\\'", &filter.client_name),
            ("center LIKE ? ESCAPE '\\'", &filter.center),
        ];
        for (condition, value) in text_filters {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                conditions.push(condition);
                values.push(Value::Text(like_pattern(v)));
            }
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        // SQLite: LIMIT -1 表示不限制
        values.push(Value::Integer(filter.limit.unwrap_or(-1)));
        values.push(Value::Integer(filter.skip.max(0)));

        let sql = format!(
            "SELECT {} FROM credit_balances {} ORDER BY id ASC LIMIT ? OFFSET ?",
            CREDIT_BALANCE_COLUMNS, where_clause
        );

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), map_row)?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// 券号子串查询（按 id 升序）
    pub fn search_by_voucher(&self, fragment: &str) -> RepositoryResult<Vec<CreditBalance>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM credit_balances WHERE voucher_number LIKE ?1 ESCAPE '\\' ORDER BY id ASC",
            CREDIT_BALANCE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![like_pattern(fragment)], map_row)?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// 汇总统计（空表返回 0 与空中心列表）
    pub fn summary(&self) -> RepositoryResult<CreditBalanceSummary> {
        let conn = self.get_conn()?;

        let (total_records, total_balance_amount, total_balance_sessions) = conn.query_row(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(balance_amount), 0.0),
                   COALESCE(SUM(balance_sessions), 0.0)
            FROM credit_balances
            "#,
            [],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?, row.get::<_, f64>(2)?)),
        )?;

        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT center FROM credit_balances
            WHERE center IS NOT NULL AND TRIM(center) <> ''
            ORDER BY center
            "#,
        )?;
        let centers = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CreditBalanceSummary {
            total_records,
            total_balance_amount,
            total_balance_sessions,
            centers,
        })
    }

    /// 记录总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM credit_balances", [], |row| row.get(0))?;
        Ok(n)
    }
}
