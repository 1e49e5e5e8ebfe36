// ==========================================
// 诊所储值余额系统 - 配置管理器
// ==========================================
// 职责: 运行期配置查询与写入
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::config::import_config_trait::{ImportConfigReader, DEFAULT_COMMIT_BATCH_SIZE};
use crate::db::{DbPool, PooledConn};
use crate::domain::types::VoucherPolicy;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use std::collections::BTreeMap;

/// 配置键常量
pub mod config_keys {
    /// 券号生成策略: COLUMN_IMPORT | RECORD_METHOD
    pub const VOUCHER_POLICY: &str = "voucher_policy";
    /// 导入/重算的提交批大小
    pub const COMMIT_BATCH_SIZE: &str = "commit_batch_size";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Clone)]
pub struct ConfigManager {
    pool: DbPool,
}

impl ConfigManager {
    /// 从连接池创建 ConfigManager
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn get_conn(&self) -> RepositoryResult<PooledConn> {
        Ok(self.pool.get()?)
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 当前券号口径（无法识别时回退到 COLUMN_IMPORT）
    pub fn voucher_policy(&self) -> RepositoryResult<VoucherPolicy> {
        let value = self.get_config_or_default(config_keys::VOUCHER_POLICY, "COLUMN_IMPORT")?;
        Ok(value.parse::<VoucherPolicy>().unwrap_or_else(|_| {
            tracing::warn!(
                config_key = config_keys::VOUCHER_POLICY,
                raw_value = %value,
                "券号口径配置无法识别，使用 COLUMN_IMPORT"
            );
            VoucherPolicy::default()
        }))
    }

    /// 提交批大小（非法值/0 回退到默认值）
    pub fn commit_batch_size(&self) -> RepositoryResult<usize> {
        let value = self.get_config_or_default(
            config_keys::COMMIT_BATCH_SIZE,
            &DEFAULT_COMMIT_BATCH_SIZE.to_string(),
        )?;
        match value.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Ok(DEFAULT_COMMIT_BATCH_SIZE),
        }
    }

    /// 获取所有配置的快照
    pub fn get_config_snapshot(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_voucher_policy(&self) -> RepositoryResult<VoucherPolicy> {
        self.voucher_policy()
    }

    async fn get_commit_batch_size(&self) -> RepositoryResult<usize> {
        self.commit_batch_size()
    }
}
