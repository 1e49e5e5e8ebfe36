// ==========================================
// 诊所储值余额系统 - 余额导入 Trait
// ==========================================
// 职责: 定义整表替换导入接口（不包含实现）
// ==========================================

use crate::domain::import_report::ImportReport;
use crate::domain::types::SchemaVariant;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::RawTable;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// CreditBalanceImporter Trait
// ==========================================
// 实现者: CreditBalanceImporterImpl
#[async_trait]
pub trait CreditBalanceImporter: Send + Sync {
    /// 从文件整表替换导入
    ///
    /// # 参数
    /// - file_path: .xlsx / .xls / .csv
    /// - variant: 表格版式
    /// - sheet: 工作表名（None = 版式默认工作表）
    ///
    /// # 导入流程
    /// 1. 确保表结构存在
    /// 2. 解析文件并校验表头（缺必需列则在删除前失败）
    /// 3. 清空现有记录并提交
    /// 4. 逐行归一化（行级错误记录后跳过）
    /// 5. 按批提交（每批一个事务）
    /// 6. 提交尾批
    /// 7. 返回运行报告
    async fn import_file(
        &self,
        file_path: &Path,
        variant: SchemaVariant,
        sheet: Option<&str>,
    ) -> ImportResult<ImportReport>;

    /// 从已解析的表格整表替换导入（流程同上，跳过文件解析）
    async fn import_table(
        &self,
        table: RawTable,
        variant: SchemaVariant,
        source: &str,
    ) -> ImportResult<ImportReport>;
}
