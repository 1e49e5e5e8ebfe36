// ==========================================
// 诊所储值余额系统 - 储值余额 API
// ==========================================
// 职责: 余额记录增删改查、按中心/按当前用户中心查询、券号检索、汇总
// 红线: 读接口遇到连接类错误降级为空结果；写接口不降级
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::auth_api::AuthApi;
use crate::api::error::{degrade_on_connectivity, ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::api_log::NewApiLog;
use crate::domain::credit_balance::{
    clean_optional_text, CreditBalance, CreditBalanceFilter, CreditBalanceSummary,
    CreditBalanceUpdate, NewCreditBalance,
};
use crate::importer::VoucherGenerator;
use crate::repository::{ApiLogRepository, CenterRepository, CreditBalanceRepository};

/// 券号检索访问日志记录的接口路径
pub const VOUCHER_SEARCH_ENDPOINT: &str = "/credit-balances/by-voucher";

/// 券号检索请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherSearchRequest {
    pub voucher_id: String, // 券号子串
    pub user_name: String,  // 请求人（写入访问日志）
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

// ==========================================
// CreditBalanceApi - 储值余额 API
// ==========================================
pub struct CreditBalanceApi {
    balance_repo: Arc<CreditBalanceRepository>,
    center_repo: Arc<CenterRepository>,
    api_log_repo: Arc<ApiLogRepository>,
    config_manager: Arc<ConfigManager>,
    auth: Arc<AuthApi>,
}

impl CreditBalanceApi {
    pub fn new(
        balance_repo: Arc<CreditBalanceRepository>,
        center_repo: Arc<CenterRepository>,
        api_log_repo: Arc<ApiLogRepository>,
        config_manager: Arc<ConfigManager>,
        auth: Arc<AuthApi>,
    ) -> Self {
        Self {
            balance_repo,
            center_repo,
            api_log_repo,
            config_manager,
            auth,
        }
    }

    // ==========================================
    // 写接口
    // ==========================================

    /// 新建记录（券号按当前口径由 center/client_code/phone_no 派生，忽略请求中的券号）
    ///
    /// 可选文本字段去首尾空白，空白串存为 NULL
    pub fn create(&self, request: &NewCreditBalance) -> ApiResult<CreditBalance> {
        let client_code = request.client_code.trim();
        let client_name = request.client_name.trim();
        if client_code.is_empty() || client_name.is_empty() {
            return Err(ApiError::InvalidInput(
                "client_code 与 client_name 不能为空".to_string(),
            ));
        }

        let mut record = request.clone();
        record.client_code = client_code.to_string();
        record.client_name = client_name.to_string();
        record.phone_no = clean_optional_text(record.phone_no);
        record.treatment_name = clean_optional_text(record.treatment_name);
        record.center = clean_optional_text(record.center);
        record.final_bucket = clean_optional_text(record.final_bucket);
        record.email = clean_optional_text(record.email);
        record.voucher_number = self.voucher_generator()?.generate(
            record.center.as_deref(),
            Some(&record.client_code),
            record.phone_no.as_deref(),
        );

        let created = self.balance_repo.insert(&record)?;
        info!(
            id = created.id,
            client_code = %created.client_code,
            voucher = ?created.voucher_number,
            "余额记录已创建"
        );
        Ok(created)
    }

    /// 部分更新（修改券号三要素时重新派生券号）
    ///
    /// # 返回
    /// - Err(NotFound): 记录不存在
    pub fn update(&self, id: i64, changes: CreditBalanceUpdate) -> ApiResult<CreditBalance> {
        let mut record = self
            .balance_repo
            .find_by_id(id)?
            .ok_or_else(|| not_found(id))?;

        let regenerate = changes.touches_voucher_identity();
        changes.apply_to(&mut record);

        if record.client_code.trim().is_empty() || record.client_name.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "client_code 与 client_name 不能为空".to_string(),
            ));
        }

        if regenerate {
            record.voucher_number = self.voucher_generator()?.generate(
                record.center.as_deref(),
                Some(&record.client_code),
                record.phone_no.as_deref(),
            );
            debug!(id = id, voucher = ?record.voucher_number, "券号已重新派生");
        }

        let updated = self
            .balance_repo
            .update(&record)?
            .ok_or_else(|| not_found(id))?;
        info!(id = id, "余额记录已更新");
        Ok(updated)
    }

    /// 删除记录
    pub fn delete(&self, id: i64) -> ApiResult<()> {
        if !self.balance_repo.delete(id)? {
            return Err(not_found(id));
        }
        info!(id = id, "余额记录已删除");
        Ok(())
    }

    // ==========================================
    // 读接口
    // ==========================================

    /// 按 id 查询（不降级，连接错误照常返回）
    pub fn get(&self, id: i64) -> ApiResult<CreditBalance> {
        self.balance_repo
            .find_by_id(id)?
            .ok_or_else(|| not_found(id))
    }

    /// 条件列表（部分匹配，按 id 升序）
    pub fn list(&self, filter: &CreditBalanceFilter) -> ApiResult<Vec<CreditBalance>> {
        validate_pagination(filter.skip, filter.limit)?;
        degrade_on_connectivity("list_credit_balances", self.balance_repo.list(filter))
    }

    /// 按中心名称列表
    pub fn list_by_center(
        &self,
        center_name: &str,
        skip: i64,
        limit: Option<i64>,
    ) -> ApiResult<Vec<CreditBalance>> {
        validate_pagination(skip, limit)?;
        let filter = CreditBalanceFilter::by_center(center_name.trim(), skip, limit);
        degrade_on_connectivity("list_by_center", self.balance_repo.list(&filter))
    }

    /// 按当前用户所属中心列表（需令牌）
    ///
    /// # 返回
    /// - Err(Unauthorized): 令牌无效或用户不可用
    /// - Err(InvalidInput): 用户未分配中心
    /// - Err(NotFound): 用户所属中心不存在
    pub fn list_by_user_center(
        &self,
        token: &str,
        skip: i64,
        limit: Option<i64>,
    ) -> ApiResult<Vec<CreditBalance>> {
        let user = self.auth.authenticate(token)?;
        validate_pagination(skip, limit)?;

        let center_id = user.center_id.ok_or_else(|| {
            ApiError::InvalidInput(format!("用户 {} 未分配中心", user.username))
        })?;
        let center = self
            .center_repo
            .find_by_id(center_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Center(id={})不存在", center_id)))?;

        let filter = CreditBalanceFilter::by_center(center.name, skip, limit);
        degrade_on_connectivity("list_by_user_center", self.balance_repo.list(&filter))
    }

    /// 券号子串检索，检索完成后追加一条访问日志
    ///
    /// 检索本身失败（非连接类错误）时不写日志
    pub fn search_by_voucher(&self, request: &VoucherSearchRequest) -> ApiResult<Vec<CreditBalance>> {
        let fragment = request.voucher_id.trim();
        if fragment.is_empty() {
            return Err(ApiError::InvalidInput("voucher_id 不能为空".to_string()));
        }

        let hits = degrade_on_connectivity(
            "search_by_voucher",
            self.balance_repo.search_by_voucher(fragment),
        )?;

        let log = NewApiLog {
            user_name: request.user_name.trim().to_string(),
            voucher_id: fragment.to_string(),
            api_endpoint: VOUCHER_SEARCH_ENDPOINT.to_string(),
            ip_address: request.ip_address.clone(),
            user_agent: request.user_agent.clone(),
        };
        degrade_on_connectivity("insert_api_log", self.api_log_repo.insert(&log).map(|_| ()))?;

        debug!(fragment = fragment, hits = hits.len(), "券号检索完成");
        Ok(hits)
    }

    /// 汇总统计（空表返回 0 与空中心列表）
    pub fn summary(&self) -> ApiResult<CreditBalanceSummary> {
        degrade_on_connectivity("credit_balance_summary", self.balance_repo.summary())
    }

    fn voucher_generator(&self) -> ApiResult<VoucherGenerator> {
        Ok(VoucherGenerator::new(self.config_manager.voucher_policy()?))
    }
}

/// 分页参数校验（skip/limit 不得为负）
pub(crate) fn validate_pagination(skip: i64, limit: Option<i64>) -> ApiResult<()> {
    if skip < 0 {
        return Err(ApiError::InvalidInput(format!("skip 不能为负: {}", skip)));
    }
    if let Some(limit) = limit {
        if limit < 0 {
            return Err(ApiError::InvalidInput(format!("limit 不能为负: {}", limit)));
        }
    }
    Ok(())
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("CreditBalance(id={})不存在", id))
}
