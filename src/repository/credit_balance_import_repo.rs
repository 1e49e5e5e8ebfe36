// ==========================================
// 诊所储值余额系统 - 余额导入 Repository Trait
// ==========================================
// 职责: 定义整表替换导入与券号重算所需的数据访问接口
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::credit_balance::{NewCreditBalance, VoucherIdentity};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// CreditBalanceImportRepository Trait
// ==========================================
// 实现者: CreditBalanceImportRepositoryImpl（r2d2 + rusqlite）
#[async_trait]
pub trait CreditBalanceImportRepository: Send + Sync {
    /// 确保目标表存在（幂等）
    async fn ensure_schema(&self) -> RepositoryResult<()>;

    /// 清空全部余额记录并立即提交
    ///
    /// # 返回
    /// - Ok(usize): 删除的记录数
    async fn delete_all(&self) -> RepositoryResult<usize>;

    /// 单事务批量插入
    ///
    /// # 返回
    /// - Ok(usize): 成功插入的记录数
    /// - Err: 数据库错误（本批事务回滚，之前已提交的批次保留）
    async fn insert_batch(&self, records: Vec<NewCreditBalance>) -> RepositoryResult<usize>;

    /// 读取全部记录的券号三要素（按 id 升序）
    async fn list_voucher_identities(&self) -> RepositoryResult<Vec<VoucherIdentity>>;

    /// 单事务批量回写券号
    ///
    /// # 参数
    /// - updates: (id, voucher_number)
    async fn update_vouchers_batch(
        &self,
        updates: Vec<(i64, Option<String>)>,
    ) -> RepositoryResult<usize>;

    /// 当前记录总数
    async fn count(&self) -> RepositoryResult<i64>;
}
