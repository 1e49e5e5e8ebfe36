// ==========================================
// 诊所储值余额系统 - 导入运行报告
// ==========================================
// 用途: 整表替换导入 / 券号重算的结果汇总
// ==========================================

use serde::{Deserialize, Serialize};

/// 被跳过的行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub row_index: usize, // 数据行下标（0 起，不含表头）
    pub reason: String,
}

// ==========================================
// ImportReport - 一次导入运行的结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub run_id: String,
    pub source: String,
    pub variant: String,
    pub total_rows: usize,     // 非空白数据行
    pub deleted_rows: usize,   // 导入前清空的记录数
    pub committed_rows: usize, // 已提交（不含跳过行）
    pub skipped: Vec<SkippedRow>,
    pub batches: usize, // 提交批次数
    pub elapsed_ms: u64,
}

impl ImportReport {
    pub fn skipped_rows(&self) -> usize {
        self.skipped.len()
    }
}

// ==========================================
// VoucherRefreshReport - 券号重算结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherRefreshReport {
    pub policy: String,
    pub total_records: usize,
    pub updated_records: usize,
    pub batches: usize,
    pub elapsed_ms: u64,
}
