// ==========================================
// 诊所储值余额系统 - 访问日志 API
// ==========================================

use std::sync::Arc;

use crate::api::credit_balance_api::validate_pagination;
use crate::api::error::{degrade_on_connectivity, ApiResult};
use crate::domain::api_log::ApiLog;
use crate::repository::ApiLogRepository;

/// 未指定 limit 时的默认条数
pub const DEFAULT_LOG_LIMIT: i64 = 100;

pub struct ApiLogApi {
    api_log_repo: Arc<ApiLogRepository>,
}

impl ApiLogApi {
    pub fn new(api_log_repo: Arc<ApiLogRepository>) -> Self {
        Self { api_log_repo }
    }

    /// 访问日志列表（最新在前）
    ///
    /// # 参数
    /// - `user_name`: 请求人部分匹配（大小写不敏感）
    /// - `limit`: None 时取 DEFAULT_LOG_LIMIT
    pub fn list_logs(
        &self,
        user_name: Option<&str>,
        skip: i64,
        limit: Option<i64>,
    ) -> ApiResult<Vec<ApiLog>> {
        let limit = limit.unwrap_or(DEFAULT_LOG_LIMIT);
        validate_pagination(skip, Some(limit))?;
        degrade_on_connectivity(
            "list_api_logs",
            self.api_log_repo.list(user_name, skip, Some(limit)),
        )
    }
}
