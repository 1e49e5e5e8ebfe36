// ==========================================
// 诊所储值余额系统 - 余额导入 Repository 实现
// ==========================================
// 职责: 实现整表替换导入相关数据访问（r2d2 + rusqlite）
// 事务: 每次调用一个事务；失败时事务随 Drop 回滚
// ==========================================

use crate::db::{DbPool, PooledConn};
use crate::domain::credit_balance::{NewCreditBalance, VoucherIdentity};
use crate::repository::credit_balance_import_repo::CreditBalanceImportRepository;
use crate::repository::credit_balance_repo::insert_tx;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::params;
use tracing::{debug, warn};

// ==========================================
// CreditBalanceImportRepositoryImpl
// ==========================================
#[derive(Clone)]
pub struct CreditBalanceImportRepositoryImpl {
    pool: DbPool,
    namespace: String,
}

impl CreditBalanceImportRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - pool: 连接池
    /// - namespace: 附加库命名空间（建表用）
    pub fn new(pool: DbPool, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }

    fn get_conn(&self) -> RepositoryResult<PooledConn> {
        Ok(self.pool.get()?)
    }
}

#[async_trait]
impl CreditBalanceImportRepository for CreditBalanceImportRepositoryImpl {
    async fn ensure_schema(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        crate::db::ensure_schema(&conn, &self.namespace)?;
        Ok(())
    }

    async fn delete_all(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let deleted = tx.execute("DELETE FROM credit_balances", [])?;
        tx.commit()?;
        debug!(deleted = deleted, "余额表已清空");
        Ok(deleted)
    }

    async fn insert_batch(&self, records: Vec<NewCreditBalance>) -> RepositoryResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let created_at = Utc::now().to_rfc3339();

        let mut count = 0;
        for record in &records {
            if let Err(e) = insert_tx(&tx, record, &created_at) {
                // tx 在此处 Drop，整批回滚
                warn!(
                    client_code = %record.client_code,
                    batch_size = records.len(),
                    error = %e,
                    "批量插入失败，回滚本批"
                );
                return Err(e.into());
            }
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }

    async fn list_voucher_identities(&self) -> RepositoryResult<Vec<VoucherIdentity>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, center, client_code, phone_no FROM credit_balances ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(VoucherIdentity {
                id: row.get(0)?,
                center: row.get(1)?,
                client_code: row.get(2)?,
                phone_no: row.get(3)?,
            })
        })?;
        let identities = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(identities)
    }

    async fn update_vouchers_batch(
        &self,
        updates: Vec<(i64, Option<String>)>,
    ) -> RepositoryResult<usize> {
        if updates.is_empty() {
            return Ok(0);
        }

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let updated_at = Utc::now().to_rfc3339();

        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                "UPDATE credit_balances SET voucher_number = ?1, updated_at = ?2 WHERE id = ?3",
            )?;
            for (id, voucher) in &updates {
                count += stmt.execute(params![voucher, updated_at, id])?;
            }
        }

        tx.commit()?;
        Ok(count)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM credit_balances", [], |row| row.get(0))?;
        Ok(n)
    }
}
