// ==========================================
// 诊所储值余额系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含导入逻辑
// ==========================================

pub mod api_log;
pub mod center;
pub mod credit_balance;
pub mod import_report;
pub mod types;
pub mod user;

// 重导出核心类型
pub use api_log::{ApiLog, NewApiLog};
pub use center::{Center, NewCenter};
pub use credit_balance::{
    CreditBalance, CreditBalanceFilter, CreditBalanceSummary, CreditBalanceUpdate,
    NewCreditBalance, VoucherIdentity,
};
pub use import_report::{ImportReport, SkippedRow, VoucherRefreshReport};
pub use types::{SchemaVariant, VoucherPolicy};
pub use user::{NewUser, User, UserProfile};
