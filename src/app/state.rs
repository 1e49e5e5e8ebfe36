// ==========================================
// 诊所储值余额系统 - 应用状态
// ==========================================
// 职责: 构造连接池、建表、组装仓储与 API 实例
// ==========================================

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::api::{ApiLogApi, AuthApi, CenterApi, CreditBalanceApi, ImportApi};
use crate::auth::TokenService;
use crate::config::{AppConfig, ConfigError, ConfigManager};
use crate::db::{create_pool, ensure_schema, DbPool};
use crate::repository::{
    ApiLogRepository, CenterRepository, CreditBalanceImportRepositoryImpl,
    CreditBalanceRepository, UserRepository,
};

/// 应用初始化错误
#[derive(Error, Debug)]
pub enum AppInitError {
    #[error("配置无效: {0}")]
    Config(#[from] ConfigError),

    #[error("连接池创建失败: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("建表失败: {0}")]
    Schema(#[from] rusqlite::Error),

    #[error("无法创建数据目录: {0}")]
    Io(#[from] std::io::Error),
}

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 生效配置
    pub config: AppConfig,

    /// 连接池
    pub pool: DbPool,

    /// 认证API
    pub auth_api: Arc<AuthApi>,

    /// 储值余额API
    pub credit_balance_api: Arc<CreditBalanceApi>,

    /// 中心API
    pub center_api: Arc<CenterApi>,

    /// 访问日志API
    pub api_log_api: Arc<ApiLogApi>,

    /// 导入API
    pub import_api: Arc<ImportApi>,

    /// 运行时配置（config_kv）
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 校验配置
    /// 2. 创建连接池（附加命名空间库）
    /// 3. 建表（幂等）
    /// 4. 创建所有API实例
    ///
    /// 数据库文件所在目录不存在时会先创建
    pub fn new(config: AppConfig) -> Result<Self, AppInitError> {
        config.validate()?;
        tracing::info!(
            db_path = %config.storage.db_path,
            namespace = %config.storage.namespace,
            "初始化AppState"
        );
        if config.uses_dev_secret() {
            tracing::warn!("正在使用开发用签名密钥，生产环境请设置 CREDIT_BALANCE_SECRET_KEY");
        }

        if let Some(dir) = Path::new(&config.storage.db_path).parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }

        let pool = create_pool(&config.storage)?;
        {
            let conn = pool.get()?;
            ensure_schema(&conn, &config.storage.namespace)?;
        }

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let namespace = config.storage.namespace.clone();
        let balance_repo = Arc::new(CreditBalanceRepository::new(pool.clone()));
        let center_repo = Arc::new(CenterRepository::new(pool.clone(), namespace.clone()));
        let user_repo = Arc::new(UserRepository::new(pool.clone(), namespace.clone()));
        let api_log_repo = Arc::new(ApiLogRepository::new(pool.clone(), namespace.clone()));
        let import_repo = CreditBalanceImportRepositoryImpl::new(pool.clone(), namespace);
        let config_manager = Arc::new(ConfigManager::new(pool.clone()));
        let tokens = Arc::new(TokenService::new(&config.auth));

        // ==========================================
        // 初始化API层
        // ==========================================
        let auth_api = Arc::new(AuthApi::new(user_repo, center_repo.clone(), tokens));
        let credit_balance_api = Arc::new(CreditBalanceApi::new(
            balance_repo,
            center_repo.clone(),
            api_log_repo.clone(),
            config_manager.clone(),
            auth_api.clone(),
        ));
        let center_api = Arc::new(CenterApi::new(center_repo));
        let api_log_api = Arc::new(ApiLogApi::new(api_log_repo));
        let import_api = Arc::new(ImportApi::new(import_repo, config_manager.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            config,
            pool,
            auth_api,
            credit_balance_api,
            center_api,
            api_log_api,
            import_api,
            config_manager,
        })
    }

    /// 获取数据库路径
    pub fn db_path(&self) -> &str {
        &self.config.storage.db_path
    }
}
