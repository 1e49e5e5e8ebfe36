// ==========================================
// 诊所储值余额系统 - 认证模块
// ==========================================
// 职责: 密码哈希（argon2）/ 访问令牌（JWT HS256）
// 红线: 用户不存在与密码错误不可区分
// ==========================================

pub mod error;
pub mod password;
pub mod token;

pub use error::{AuthError, AuthResult};
pub use password::{hash_password, verify_dummy_password, verify_password};
pub use token::{Claims, TokenService};
