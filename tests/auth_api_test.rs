// ==========================================
// AuthApi 集成测试
// ==========================================
// 覆盖: 登录、统一 Unauthorized、令牌过期、停用用户、用户开通
// ==========================================

use chrono::Duration;
use clinic_credit_balance::api::{ApiError, CreateUserRequest, LoginRequest};
use clinic_credit_balance::auth::TokenService;
use clinic_credit_balance::domain::NewCenter;
use clinic_credit_balance::AppState;

mod test_helpers;
use test_helpers::create_test_state;

fn create_user(state: &AppState, username: &str, password: &str) {
    state
        .auth_api
        .create_user(&CreateUserRequest {
            username: username.to_string(),
            email: format!("{}@clinic.test", username),
            password: password.to_string(),
            full_name: "Test User".to_string(),
            role: "USER".to_string(),
            role_id: None,
            center_id: None,
        })
        .unwrap();
}

fn login(state: &AppState, username: &str, password: &str) -> Result<String, ApiError> {
    state
        .auth_api
        .login(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })
        .map(|r| r.access_token)
}

#[test]
fn test_login_and_current_user() {
    let (_dir, state) = create_test_state();
    create_user(&state, "alice", "correct horse");

    let response = state
        .auth_api
        .login(&LoginRequest {
            username: "alice".to_string(),
            password: "correct horse".to_string(),
        })
        .unwrap();
    assert_eq!(response.token_type, "bearer");
    assert_eq!(response.user.username, "alice");

    // 响应中不含密码哈希
    let json = serde_json::to_string(&response).unwrap();
    assert!(!json.contains("hashed_password"));
    assert!(!json.contains("$argon2"));

    let me = state.auth_api.current_user(&response.access_token).unwrap();
    assert_eq!(me.username, "alice");
    assert!(me.is_active);
    assert!(!me.is_verified);
}

#[test]
fn test_unknown_user_and_wrong_password_are_indistinguishable() {
    let (_dir, state) = create_test_state();
    create_user(&state, "alice", "correct horse");

    let wrong_password = login(&state, "alice", "battery staple").unwrap_err();
    let unknown_user = login(&state, "mallory", "correct horse").unwrap_err();

    match (&wrong_password, &unknown_user) {
        (ApiError::Unauthorized(a), ApiError::Unauthorized(b)) => assert_eq!(a, b),
        other => panic!("应返回 Unauthorized: {:?}", other),
    }
}

#[test]
fn test_expired_token_is_rejected() {
    let (_dir, state) = create_test_state();
    create_user(&state, "alice", "pw");

    let tokens = TokenService::new(&state.config.auth);
    let expired = tokens
        .issue_with_ttl("alice", Duration::minutes(-5))
        .unwrap();

    let result = state.auth_api.current_user(&expired);
    assert!(matches!(result, Err(ApiError::Unauthorized(_))));
}

#[test]
fn test_token_for_deleted_or_inactive_user_is_rejected() {
    let (_dir, state) = create_test_state();
    create_user(&state, "alice", "pw");
    let token = login(&state, "alice", "pw").unwrap();

    // 令牌签发后停用用户
    {
        let conn = state.pool.get().unwrap();
        conn.execute(
            &format!(
                "UPDATE {}.users SET is_active = 0 WHERE username = 'alice'",
                state.config.storage.namespace
            ),
            [],
        )
        .unwrap();
    }

    assert!(matches!(
        state.auth_api.current_user(&token),
        Err(ApiError::Unauthorized(_))
    ));
    assert!(matches!(
        login(&state, "alice", "pw"),
        Err(ApiError::Unauthorized(_))
    ));

    // 有效签名但主体不存在
    let tokens = TokenService::new(&state.config.auth);
    let ghost = tokens.issue("ghost").unwrap();
    assert!(matches!(
        state.auth_api.current_user(&ghost),
        Err(ApiError::Unauthorized(_))
    ));
}

#[test]
fn test_create_user_checks_center_and_uniqueness() {
    let (_dir, state) = create_test_state();

    let missing_center = state.auth_api.create_user(&CreateUserRequest {
        username: "bob".to_string(),
        email: "bob@clinic.test".to_string(),
        password: "pw".to_string(),
        full_name: "Bob".to_string(),
        role: "USER".to_string(),
        role_id: None,
        center_id: Some(77),
    });
    assert!(matches!(missing_center, Err(ApiError::NotFound(_))));

    let center = state
        .center_api
        .create_center(&NewCenter {
            name: "Preet Vihar".to_string(),
            code: "PV".to_string(),
            address: Some("Delhi".to_string()),
            phone: None,
            email: None,
            is_active: true,
        })
        .unwrap();
    assert_eq!(state.center_api.list_active_centers().unwrap().len(), 1);

    create_user(&state, "bob", "pw");
    let duplicate = state.auth_api.create_user(&CreateUserRequest {
        username: "bob".to_string(),
        email: "other@clinic.test".to_string(),
        password: "pw".to_string(),
        full_name: "Bob Again".to_string(),
        role: "USER".to_string(),
        role_id: None,
        center_id: Some(center.id),
    });
    assert!(matches!(duplicate, Err(ApiError::BusinessRuleViolation(_))));
}
