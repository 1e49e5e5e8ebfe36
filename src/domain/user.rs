// ==========================================
// 诊所储值余额系统 - 用户领域模型
// ==========================================
// 对齐: {namespace}.users 表
// 红线: hashed_password 不得出现在任何对外响应中
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// User - 用户实体（含密码哈希，仅限内部使用）
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub hashed_password: String, // argon2 PHC 字符串
    pub full_name: String,
    pub role: String,
    pub role_id: Option<i64>,
    pub center_id: Option<i64>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            role: self.role.clone(),
            role_id: self.role_id,
            center_id: self.center_id,
            is_active: self.is_active,
            is_verified: self.is_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// ==========================================
// UserProfile - 对外展示的用户信息
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub role_id: Option<i64>,
    pub center_id: Option<i64>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ==========================================
// NewUser - 待落库用户（密码已哈希）
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub full_name: String,
    pub role: String,
    pub role_id: Option<i64>,
    pub center_id: Option<i64>,
    pub is_active: bool,
    pub is_verified: bool,
}
