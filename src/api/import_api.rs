// ==========================================
// 诊所储值余额系统 - 导入 API
// ==========================================
// 职责: 封装整表导入、券号重算与导入配置
// 约束: 导入/重算在进程内串行（运行级互斥锁）
// ==========================================

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{config_keys, ConfigManager};
use crate::domain::import_report::{ImportReport, VoucherRefreshReport};
use crate::domain::types::{SchemaVariant, VoucherPolicy};
use crate::importer::{
    CreditBalanceImporter, CreditBalanceImporterImpl, FileParser, RawTable, UniversalFileParser,
    VoucherRefresher,
};
use crate::repository::CreditBalanceImportRepositoryImpl;

type Importer = CreditBalanceImporterImpl<CreditBalanceImportRepositoryImpl, ConfigManager>;
type Refresher = VoucherRefresher<CreditBalanceImportRepositoryImpl, ConfigManager>;

/// 导入API
pub struct ImportApi {
    importer: Importer,
    refresher: Refresher,
    config_manager: Arc<ConfigManager>,
    run_lock: Mutex<()>,
}

impl ImportApi {
    /// 创建新的ImportApi实例（默认使用通用文件解析器）
    pub fn new(import_repo: CreditBalanceImportRepositoryImpl, config_manager: Arc<ConfigManager>) -> Self {
        Self::with_parser(import_repo, config_manager, Box::new(UniversalFileParser))
    }

    pub fn with_parser(
        import_repo: CreditBalanceImportRepositoryImpl,
        config_manager: Arc<ConfigManager>,
        file_parser: Box<dyn FileParser>,
    ) -> Self {
        let config = config_manager.as_ref().clone();
        Self {
            importer: CreditBalanceImporterImpl::new(import_repo.clone(), config.clone(), file_parser),
            refresher: VoucherRefresher::new(import_repo, config),
            config_manager,
            run_lock: Mutex::new(()),
        }
    }

    /// 整表替换导入
    ///
    /// # 参数
    /// - file_path: .xlsx / .xls / .csv 文件
    /// - variant: 表格版式
    /// - sheet: 工作表名（None = 版式默认）
    ///
    /// # 返回
    /// - Ok(ImportReport): 运行报告（提交行数、跳过行、批次数、耗时）
    /// - Err(ApiError): 文件/表头错误（数据未动）或存储错误（已提交批次保留）
    pub async fn import_file(
        &self,
        file_path: &Path,
        variant: SchemaVariant,
        sheet: Option<&str>,
    ) -> ApiResult<ImportReport> {
        let _guard = self.run_lock.lock().await;
        let report = self.importer.import_file(file_path, variant, sheet).await?;
        info!(
            run_id = %report.run_id,
            committed = report.committed_rows,
            skipped = report.skipped_rows(),
            "导入完成"
        );
        Ok(report)
    }

    /// 从已解析表格导入（工具/测试入口）
    pub async fn import_table(
        &self,
        table: RawTable,
        variant: SchemaVariant,
        source: &str,
    ) -> ApiResult<ImportReport> {
        let _guard = self.run_lock.lock().await;
        Ok(self.importer.import_table(table, variant, source).await?)
    }

    /// 按当前口径重算全部券号
    pub async fn refresh_vouchers(&self) -> ApiResult<VoucherRefreshReport> {
        let _guard = self.run_lock.lock().await;
        Ok(self.refresher.refresh().await?)
    }

    /// 切换券号口径（仅影响之后生成的券号）
    pub fn set_voucher_policy(&self, policy: VoucherPolicy) -> ApiResult<()> {
        self.config_manager
            .set_config_value(config_keys::VOUCHER_POLICY, &policy.to_string())?;
        Ok(())
    }

    /// 设置提交批大小
    pub fn set_commit_batch_size(&self, batch_size: usize) -> ApiResult<()> {
        if batch_size == 0 {
            return Err(ApiError::InvalidInput("commit_batch_size 必须大于 0".to_string()));
        }
        self.config_manager
            .set_config_value(config_keys::COMMIT_BATCH_SIZE, &batch_size.to_string())?;
        Ok(())
    }

    /// 当前导入配置
    pub fn current_policy(&self) -> ApiResult<VoucherPolicy> {
        Ok(self.config_manager.voucher_policy()?)
    }
}
