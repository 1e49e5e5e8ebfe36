// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的临时数据库、AppState、测试表格生成等功能
// ==========================================

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use clinic_credit_balance::config::{AppConfig, AuthConfig, LoggingConfig, StorageConfig};
use clinic_credit_balance::AppState;
use tempfile::TempDir;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Legacy 版式表头
pub const LEGACY_HEADERS: &[&str] = &[
    "Client Code",
    "Client name",
    "Phone No",
    "Treatment Name",
    "Package Amount (₹)",
    "Amount Paid by the client",
    "Balance Amount (₹)",
    "Prepaid / Gift Card Balance",
    "Center",
    "Final Bucket",
    "Sessions Paid",
    "Sessions Consumed",
    "Balance Sessions",
];

/// Communication 版式表头
pub const COMMUNICATION_HEADERS: &[&str] = &[
    "Client Code",
    "Client name",
    "Phone No",
    "Treatment Name",
    "Package Amount (₹)",
    "Amount Paid by the client",
    "Balance Amount (₹)",
    "Prepaid / Gift Card Balance",
    "Center",
    "Sessions Paid",
    "Sessions Consumed",
    "Balance Sessions",
    "Email ID's",
];

/// 测试用配置（小连接池 + 固定密钥）
pub fn test_config(db_path: &Path) -> AppConfig {
    let storage = StorageConfig {
        pool_size: 2,
        max_overflow: 2,
        ..StorageConfig::for_path(db_path.to_string_lossy().to_string())
    };
    AppConfig {
        storage,
        auth: AuthConfig {
            secret_key: TEST_SECRET.to_string(),
            access_token_expire_minutes: 30,
        },
        logging: LoggingConfig::default(),
    }
}

/// 创建临时数据库并初始化 AppState
///
/// # 返回
/// - TempDir: 临时目录（需要保持存活）
/// - AppState: 应用状态
pub fn create_test_state() -> (TempDir, AppState) {
    clinic_credit_balance::logging::init_test();
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let config = test_config(&dir.path().join("credit_balance.db"));
    let state = AppState::new(config).expect("初始化AppState失败");
    (dir, state)
}

/// 生成一行 Legacy 数据
pub fn legacy_row(i: usize) -> Vec<String> {
    let center = if i % 2 == 0 { "GK Central" } else { "Preet Vihar" };
    vec![
        format!("C{:03}", i),
        format!("Client {}", i),
        format!("98765 {:05}", i),
        "Laser Hair Reduction".to_string(),
        "12,000".to_string(),
        "10,000.50".to_string(),
        "1,999.50".to_string(),
        "0".to_string(),
        center.to_string(),
        "Active".to_string(),
        "6".to_string(),
        "2".to_string(),
        "4".to_string(),
    ]
}

/// 写入 CSV 文件
pub fn write_csv(dir: &Path, name: &str, headers: &[&str], rows: &[Vec<String>]) -> PathBuf {
    let path = dir.join(name);
    let mut writer = csv::Writer::from_path(&path).expect("创建CSV失败");
    writer.write_record(headers).expect("写入表头失败");
    for row in rows {
        writer.write_record(row).expect("写入数据行失败");
    }
    writer.flush().expect("刷新CSV失败");
    path
}

/// 写入 Excel 文件（单工作表）
pub fn write_xlsx(
    dir: &Path,
    name: &str,
    sheet_name: &str,
    headers: &[&str],
    rows: &[Vec<String>],
) -> PathBuf {
    let path = dir.join(name);
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).expect("设置工作表名失败");

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .expect("写入表头失败");
    }
    for (r, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            let cell_row = (r + 1) as u32;
            // 纯数字写成数值单元格，模拟真实导出
            match value.parse::<f64>() {
                Ok(n) => worksheet.write_number(cell_row, col as u16, n),
                Err(_) => worksheet.write_string(cell_row, col as u16, value.as_str()),
            }
            .expect("写入单元格失败");
        }
    }

    workbook.save(&path).expect("保存Excel失败");
    path
}
