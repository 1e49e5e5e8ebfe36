// ==========================================
// 诊所储值余额系统 - 密码哈希
// ==========================================
// 算法: Argon2id（argon2 crate 默认参数），PHC 字符串存储
// ==========================================

use std::sync::OnceLock;

use crate::auth::error::{AuthError, AuthResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// 哈希明文密码
///
/// # 返回
/// - PHC 字符串（含算法、参数、盐）
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::HashError(e.to_string()))
}

/// 校验密码
///
/// 哈希格式损坏同样视为不匹配
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "密码哈希格式无法解析");
            false
        }
    }
}

/// 用户不存在时参与比对的占位哈希（首次使用时生成）
static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

/// 对占位哈希做一次完整校验，结果恒为 false
///
/// 用户不存在或已停用时调用，使失败登录的耗时与密码错误一致
pub fn verify_dummy_password(password: &str) -> bool {
    let dummy = DUMMY_HASH.get_or_init(|| hash_password("credit-balance-dummy").ok());
    if let Some(hash) = dummy {
        let _ = verify_password(password, hash);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret!", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_dummy_verification_never_matches() {
        assert!(!verify_dummy_password("credit-balance-dummy"));
        assert!(!verify_dummy_password(""));
        assert!(DUMMY_HASH.get().is_some_and(|h| h.is_some()));
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        assert!(!verify_password("x", "not-a-phc-string"));
    }
}
