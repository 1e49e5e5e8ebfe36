// ==========================================
// 诊所储值余额系统 - 认证 API
// ==========================================
// 职责: 登录、令牌校验、当前用户、用户开通
// 红线: 用户不存在 / 密码错误 / 用户停用 → 同一个 Unauthorized
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::auth::{
    hash_password, verify_dummy_password, verify_password, AuthError, TokenService,
};
use crate::domain::user::{NewUser, User, UserProfile};
use crate::repository::{CenterRepository, UserRepository};

/// 登录请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 登录响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String, // 固定为 "bearer"
    pub user: UserProfile,
}

/// 新建用户请求（明文密码，仅在本 API 内哈希）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default = "default_role")]
    pub role: String,
    pub role_id: Option<i64>,
    pub center_id: Option<i64>,
}

fn default_role() -> String {
    "USER".to_string()
}

// ==========================================
// AuthApi - 认证 API
// ==========================================
pub struct AuthApi {
    user_repo: Arc<UserRepository>,
    center_repo: Arc<CenterRepository>,
    tokens: Arc<TokenService>,
}

impl AuthApi {
    pub fn new(
        user_repo: Arc<UserRepository>,
        center_repo: Arc<CenterRepository>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            user_repo,
            center_repo,
            tokens,
        }
    }

    /// 登录
    ///
    /// # 返回
    /// - Ok(LoginResponse): access_token + token_type="bearer" + 用户信息
    /// - Err(Unauthorized): 凭据无效（不区分原因）
    pub fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        // 三种失败路径都做一次完整哈希校验
        let user = match self.user_repo.find_by_username(request.username.trim())? {
            Some(u) => {
                let password_ok = verify_password(&request.password, &u.hashed_password);
                Some(u).filter(|u| password_ok && u.is_active)
            }
            None => {
                verify_dummy_password(&request.password);
                None
            }
        };

        let user = match user {
            Some(u) => u,
            None => {
                warn!(username = %request.username, "登录失败");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let access_token = self.tokens.issue(&user.username)?;
        info!(username = %user.username, "登录成功");

        Ok(LoginResponse {
            access_token,
            token_type: "bearer".to_string(),
            user: user.profile(),
        })
    }

    /// 校验令牌并加载主体用户
    ///
    /// # 返回
    /// - Err(Unauthorized): 令牌无效/过期，或用户不存在/已停用
    pub fn authenticate(&self, token: &str) -> ApiResult<User> {
        let claims = self.tokens.validate(token)?;
        match self.user_repo.find_by_username(&claims.sub)? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(ApiError::Unauthorized("无法验证凭据".to_string())),
        }
    }

    /// 当前用户信息
    pub fn current_user(&self, token: &str) -> ApiResult<UserProfile> {
        Ok(self.authenticate(token)?.profile())
    }

    /// 开通用户
    pub fn create_user(&self, request: &CreateUserRequest) -> ApiResult<UserProfile> {
        let username = request.username.trim();
        if username.is_empty() {
            return Err(ApiError::InvalidInput("用户名不能为空".to_string()));
        }
        if request.password.is_empty() {
            return Err(ApiError::InvalidInput("密码不能为空".to_string()));
        }
        if let Some(center_id) = request.center_id {
            if self.center_repo.find_by_id(center_id)?.is_none() {
                return Err(ApiError::NotFound(format!("Center(id={})不存在", center_id)));
            }
        }

        let user = self.user_repo.insert(&NewUser {
            username: username.to_string(),
            email: request.email.trim().to_string(),
            hashed_password: hash_password(&request.password)?,
            full_name: request.full_name.trim().to_string(),
            role: request.role.clone(),
            role_id: request.role_id,
            center_id: request.center_id,
            is_active: true,
            is_verified: false,
        })?;

        info!(user_id = user.id, username = %user.username, "用户已创建");
        Ok(user.profile())
    }
}
