// ==========================================
// 诊所储值余额系统 - SQLite 连接池与建表
// ==========================================
// 目标:
// - 所有连接统一 PRAGMA（foreign_keys / busy_timeout）
// - 每个连接 ATTACH 命名空间库（centers / users / api_logs）
// - 建表幂等，可重复执行
// ==========================================

use crate::config::StorageConfig;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;

/// 连接池类型
pub type DbPool = r2d2::Pool<SqliteConnectionManager>;

/// 池化连接（Drop 时自动归还）
pub type PooledConn = r2d2::PooledConnection<SqliteConnectionManager>;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前建表脚本对应的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：foreign_keys / busy_timeout 均需“每个连接”单独设置
pub fn configure_sqlite_connection(conn: &Connection, busy_timeout_ms: u64) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
    Ok(())
}

/// 命名空间库文件路径
///
/// 与主库同目录：credit_balance.db → credit_balance.delhi.db
pub fn namespace_db_path(db_path: &str, namespace: &str) -> String {
    let path = Path::new(db_path);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "credit_balance".to_string());
    let file_name = format!("{}.{}.db", stem, namespace);
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            parent.join(file_name).to_string_lossy().to_string()
        }
        _ => file_name,
    }
}

/// 附加命名空间库（已附加则跳过）
///
/// namespace 必须已通过 AppConfig::validate 的标识符校验
pub fn attach_namespace(conn: &Connection, db_path: &str, namespace: &str) -> rusqlite::Result<()> {
    let attached: bool = conn
        .query_row(
            "SELECT 1 FROM pragma_database_list WHERE name = ?1",
            [namespace],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !attached {
        let ns_path = namespace_db_path(db_path, namespace);
        conn.execute(&format!("ATTACH DATABASE ?1 AS {}", namespace), [ns_path])?;
    }
    Ok(())
}

/// 创建连接池
///
/// 参数映射:
/// - pool_size → min_idle（常驻连接）
/// - pool_size + max_overflow → max_size
/// - pool_recycle_secs → max_lifetime
/// - pool_pre_ping → test_on_check_out
pub fn create_pool(config: &StorageConfig) -> Result<DbPool, r2d2::Error> {
    let db_path = config.db_path.clone();
    let namespace = config.namespace.clone();
    let busy_timeout_ms = config.busy_timeout_ms;

    let manager = SqliteConnectionManager::file(&config.db_path).with_init(move |conn| {
        configure_sqlite_connection(conn, busy_timeout_ms)?;
        attach_namespace(conn, &db_path, &namespace)
    });

    r2d2::Pool::builder()
        .min_idle(Some(config.pool_size))
        .max_size(config.pool_size + config.max_overflow)
        .max_lifetime(Some(Duration::from_secs(config.pool_recycle_secs)))
        .connection_timeout(Duration::from_secs(config.pool_timeout_secs))
        .test_on_check_out(config.pool_pre_ping)
        .build(manager)
}

/// 建表（幂等）
///
/// 覆盖: credit_balances / config_kv / schema_version（主库）
///      centers / users / api_logs（命名空间库）
pub fn ensure_schema(conn: &Connection, namespace: &str) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS credit_balances (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            client_code TEXT NOT NULL,
            client_name TEXT NOT NULL,
            phone_no TEXT,
            treatment_name TEXT,
            package_amount REAL NOT NULL DEFAULT 0,
            amount_paid REAL NOT NULL DEFAULT 0,
            balance_amount REAL NOT NULL DEFAULT 0,
            prepaid_gift_card_balance REAL NOT NULL DEFAULT 0,
            center TEXT,
            final_bucket TEXT,
            sessions_paid REAL NOT NULL DEFAULT 0,
            sessions_consumed REAL NOT NULL DEFAULT 0,
            balance_sessions REAL NOT NULL DEFAULT 0,
            email TEXT,
            voucher_number TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_credit_balances_client_code ON credit_balances(client_code);
        CREATE INDEX IF NOT EXISTS idx_credit_balances_client_name ON credit_balances(client_name);
        CREATE INDEX IF NOT EXISTS idx_credit_balances_voucher ON credit_balances(voucher_number);

        CREATE TABLE IF NOT EXISTS config_kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {ns}.centers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            code TEXT NOT NULL UNIQUE,
            address TEXT,
            phone TEXT,
            email TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT
        );

        CREATE TABLE IF NOT EXISTS {ns}.users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            hashed_password TEXT NOT NULL,
            full_name TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'USER',
            role_id INTEGER,
            center_id INTEGER REFERENCES centers(id),
            is_active INTEGER NOT NULL DEFAULT 1,
            is_verified INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT
        );

        CREATE TABLE IF NOT EXISTS {ns}.api_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_name TEXT NOT NULL,
            voucher_id TEXT NOT NULL,
            api_endpoint TEXT NOT NULL,
            request_timestamp TEXT NOT NULL,
            ip_address TEXT,
            user_agent TEXT
        );
        CREATE INDEX IF NOT EXISTS {ns}.idx_api_logs_user ON api_logs(user_name);
        "#,
        ns = namespace
    ))?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![CURRENT_SCHEMA_VERSION, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
