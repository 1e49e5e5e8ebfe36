// ==========================================
// 诊所储值余额系统 - 认证错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// 用户不存在 / 密码错误 / 用户停用，对外统一
    #[error("用户名或密码错误")]
    InvalidCredentials,

    #[error("令牌已过期")]
    TokenExpired,

    #[error("令牌无效: {0}")]
    InvalidToken(String),

    #[error("密码哈希失败: {0}")]
    HashError(String),

    #[error("令牌签发失败: {0}")]
    TokenIssueError(String),
}

pub type AuthResult<T> = Result<T, AuthError>;
