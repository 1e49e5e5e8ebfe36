// ==========================================
// 诊所储值余额系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::VoucherPolicy;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

/// 默认提交批大小
pub const DEFAULT_COMMIT_BATCH_SIZE: usize = 100;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入/券号重算所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取当前生效的券号生成策略
    ///
    /// # 默认值
    /// - COLUMN_IMPORT
    async fn get_voucher_policy(&self) -> RepositoryResult<VoucherPolicy>;

    /// 获取每批提交的记录数
    ///
    /// # 默认值
    /// - 100（非法值/0 同样回退到默认值）
    async fn get_commit_batch_size(&self) -> RepositoryResult<usize>;
}
