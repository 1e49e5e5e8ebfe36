// ==========================================
// 诊所储值余额系统 - API 层
// ==========================================
// 职责: 提供进程内业务接口,供 CLI 或传输适配层调用
// ==========================================

pub mod api_log_api;
pub mod auth_api;
pub mod center_api;
pub mod credit_balance_api;
pub mod error;
pub mod import_api;

// 重导出核心类型
pub use api_log_api::ApiLogApi;
pub use auth_api::{AuthApi, CreateUserRequest, LoginRequest, LoginResponse};
pub use center_api::CenterApi;
pub use credit_balance_api::{CreditBalanceApi, VoucherSearchRequest};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use import_api::ImportApi;
