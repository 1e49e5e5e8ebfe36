// ==========================================
// 诊所储值余额系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化（命名空间标识符除外，已在配置层校验）
// ==========================================

pub mod api_log_repo;
pub mod center_repo;
pub mod credit_balance_import_repo;
pub mod credit_balance_import_repo_impl;
pub mod credit_balance_repo;
pub mod error;
pub mod user_repo;

// 重导出核心仓储
pub use api_log_repo::ApiLogRepository;
pub use center_repo::CenterRepository;
pub use credit_balance_import_repo::CreditBalanceImportRepository;
pub use credit_balance_import_repo_impl::CreditBalanceImportRepositoryImpl;
pub use credit_balance_repo::CreditBalanceRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use user_repo::UserRepository;
