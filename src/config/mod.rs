// ==========================================
// 诊所储值余额系统 - 配置层
// ==========================================
// 职责:
// - AppConfig: 启动期配置（存储/认证/日志），文件 + 环境变量覆写
// - ConfigManager: 运行期可调的导入配置（config_kv 表）
// ==========================================

pub mod app_config;
pub mod config_manager;
pub mod import_config_trait;

// 重导出核心配置类型
pub use app_config::{
    default_db_path, AppConfig, AuthConfig, ConfigError, LoggingConfig, StorageConfig,
};
pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::ImportConfigReader;
