// ==========================================
// 诊所储值余额系统 - 接口访问日志领域模型
// ==========================================
// 对齐: {namespace}.api_logs 表
// 用途: 券号查询审计
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiLog {
    pub id: i64,
    pub user_name: String,     // 请求人
    pub voucher_id: String,    // 查询的券号（子串）
    pub api_endpoint: String,  // 接口路径
    pub request_timestamp: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewApiLog {
    pub user_name: String,
    pub voucher_id: String,
    pub api_endpoint: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
