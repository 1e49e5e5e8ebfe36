// ==========================================
// 诊所储值余额系统 - 启动配置
// ==========================================
// 来源优先级: 环境变量 > 配置文件(JSON) > 默认值
// 环境变量前缀: CREDIT_BALANCE_
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 未配置密钥时使用的开发密钥（启动时会告警）
pub const DEV_SECRET_KEY: &str = "dev-secret-key-change-this-in-production";

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    FileReadError { path: String, message: String },

    #[error("配置文件解析失败 ({path}): {message}")]
    ParseError { path: String, message: String },

    #[error("配置值错误 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

// ==========================================
// StorageConfig - 存储与连接池配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 主库文件路径（credit_balances / config_kv）
    pub db_path: String,
    /// 附加库命名空间（centers / users / api_logs 所在 schema）
    pub namespace: String,
    /// 常驻连接数
    pub pool_size: u32,
    /// 高峰期允许额外创建的连接数
    pub max_overflow: u32,
    /// 连接回收周期（秒），超过后下次归还时丢弃重建
    pub pool_recycle_secs: u64,
    /// 获取连接的等待上限（秒）
    pub pool_timeout_secs: u64,
    /// 借出前做存活检查
    pub pool_pre_ping: bool,
    /// SQLite busy_timeout（毫秒）
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            namespace: "delhi".to_string(),
            pool_size: 10,
            max_overflow: 20,
            pool_recycle_secs: 3600,
            pool_timeout_secs: 30,
            pool_pre_ping: true,
            busy_timeout_ms: crate::db::DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StorageConfig {
    /// 指向指定库文件、其余保持默认值（测试/工具常用）
    pub fn for_path(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Default::default()
        }
    }
}

// ==========================================
// AuthConfig - 认证配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 签名密钥
    pub secret_key: String,
    /// 访问令牌有效期（分钟）
    pub access_token_expire_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: DEV_SECRET_KEY.to_string(),
            access_token_expire_minutes: 30,
        }
    }
}

// ==========================================
// LoggingConfig - 日志配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 默认过滤器（RUST_LOG 优先）
    pub filter: String,
    /// 输出 JSON 格式
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

// ==========================================
// AppConfig - 应用配置
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 加载配置：可选 JSON 文件 + 进程环境变量覆写 + 校验
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件读取（缺省字段取默认值）
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 应用覆写值
    ///
    /// # 参数
    /// - lookup: 按变量名取值（生产环境为 std::env::var，测试可注入）
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get("CREDIT_BALANCE_DB_PATH") {
            self.storage.db_path = v;
        }
        if let Some(v) = get("CREDIT_BALANCE_DB_NAMESPACE") {
            self.storage.namespace = v;
        }
        if let Some(v) = get("CREDIT_BALANCE_POOL_SIZE") {
            self.storage.pool_size = parse_value("CREDIT_BALANCE_POOL_SIZE", &v)?;
        }
        if let Some(v) = get("CREDIT_BALANCE_MAX_OVERFLOW") {
            self.storage.max_overflow = parse_value("CREDIT_BALANCE_MAX_OVERFLOW", &v)?;
        }
        if let Some(v) = get("CREDIT_BALANCE_POOL_RECYCLE_SECS") {
            self.storage.pool_recycle_secs = parse_value("CREDIT_BALANCE_POOL_RECYCLE_SECS", &v)?;
        }
        if let Some(v) = get("CREDIT_BALANCE_POOL_PRE_PING") {
            self.storage.pool_pre_ping = parse_bool("CREDIT_BALANCE_POOL_PRE_PING", &v)?;
        }
        if let Some(v) = get("CREDIT_BALANCE_SECRET_KEY") {
            self.auth.secret_key = v;
        }
        if let Some(v) = get("CREDIT_BALANCE_TOKEN_EXPIRE_MINUTES") {
            self.auth.access_token_expire_minutes =
                parse_value("CREDIT_BALANCE_TOKEN_EXPIRE_MINUTES", &v)?;
        }
        if let Some(v) = get("CREDIT_BALANCE_LOG_JSON") {
            self.logging.json = parse_bool("CREDIT_BALANCE_LOG_JSON", &v)?;
        }
        Ok(())
    }

    /// 配置校验
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ns = &self.storage.namespace;
        let valid_ident = !ns.is_empty()
            && ns.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !ns.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(true)
            && !matches!(ns.to_lowercase().as_str(), "main" | "temp");
        if !valid_ident {
            return Err(ConfigError::InvalidValue {
                key: "storage.namespace".to_string(),
                value: ns.clone(),
                message: "须为字母/数字/下划线组成的标识符，且不能为 main/temp".to_string(),
            });
        }
        if self.storage.pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "storage.pool_size".to_string(),
                value: "0".to_string(),
                message: "连接池至少需要 1 个连接".to_string(),
            });
        }
        if self.auth.secret_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "auth.secret_key".to_string(),
                value: String::new(),
                message: "签名密钥不能为空".to_string(),
            });
        }
        if self.auth.access_token_expire_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "auth.access_token_expire_minutes".to_string(),
                value: self.auth.access_token_expire_minutes.to_string(),
                message: "令牌有效期必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    /// 是否仍在使用开发密钥
    pub fn uses_dev_secret(&self) -> bool {
        self.auth.secret_key == DEV_SECRET_KEY
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: "无法解析".to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message: "应为布尔值".to_string(),
        }),
    }
}

// ==========================================
// 默认数据库路径
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 用户数据目录/clinic-credit-balance/credit_balance.db
/// - 无法获取数据目录时回退到 ./credit_balance.db
pub fn default_db_path() -> String {
    let mut path = PathBuf::from("./credit_balance.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("clinic-credit-balance");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("credit_balance.db");
        }
    }

    path.to_string_lossy().to_string()
}
