// ==========================================
// 诊所储值余额系统 - 中心 API
// ==========================================

use std::sync::Arc;

use tracing::info;

use crate::api::error::{degrade_on_connectivity, ApiError, ApiResult};
use crate::domain::center::{Center, NewCenter};
use crate::repository::CenterRepository;

pub struct CenterApi {
    center_repo: Arc<CenterRepository>,
}

impl CenterApi {
    pub fn new(center_repo: Arc<CenterRepository>) -> Self {
        Self { center_repo }
    }

    /// 新建中心（name / code 重复 → BusinessRuleViolation）
    pub fn create_center(&self, center: &NewCenter) -> ApiResult<Center> {
        if center.name.trim().is_empty() || center.code.trim().is_empty() {
            return Err(ApiError::InvalidInput("中心名称与编码不能为空".to_string()));
        }
        let created = self.center_repo.insert(&NewCenter {
            name: center.name.trim().to_string(),
            code: center.code.trim().to_string(),
            ..center.clone()
        })?;
        info!(center_id = created.id, name = %created.name, "中心已创建");
        Ok(created)
    }

    /// 启用中的中心列表
    pub fn list_active_centers(&self) -> ApiResult<Vec<Center>> {
        degrade_on_connectivity("list_active_centers", self.center_repo.list_active())
    }
}
