// ==========================================
// 诊所储值余额系统 - 余额导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到数据库
// 流程: 建表 → 解析 → 表头校验 → 清空 → 归一化 → 分批落库
// 失败语义: 存储错误时回滚当前批并返回错误，已提交批次保留
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::credit_balance::NewCreditBalance;
use crate::domain::import_report::{ImportReport, SkippedRow};
use crate::domain::types::SchemaVariant;
use crate::importer::column_schema::ColumnSchema;
use crate::importer::credit_balance_importer_trait::CreditBalanceImporter;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{FileParser, RawTable};
use crate::importer::row_normalizer::RowNormalizer;
use crate::importer::voucher::VoucherGenerator;
use crate::repository::CreditBalanceImportRepository;
use async_trait::async_trait;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// CreditBalanceImporterImpl - 余额导入器实现
// ==========================================
pub struct CreditBalanceImporterImpl<R, C>
where
    R: CreditBalanceImportRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    import_repo: R,

    // 配置读取器
    config: C,

    // 文件解析器
    file_parser: Box<dyn FileParser>,
}

impl<R, C> CreditBalanceImporterImpl<R, C>
where
    R: CreditBalanceImportRepository,
    C: ImportConfigReader,
{
    /// 创建新的导入器实例
    ///
    /// # 参数
    /// - import_repo: 导入数据仓储
    /// - config: 配置读取器（券号口径、批大小）
    /// - file_parser: 文件解析器
    pub fn new(import_repo: R, config: C, file_parser: Box<dyn FileParser>) -> Self {
        Self {
            import_repo,
            config,
            file_parser,
        }
    }

    /// 提交一批记录（清空 pending）
    async fn flush(
        &self,
        run_id: &str,
        batch_no: usize,
        pending: &mut Vec<NewCreditBalance>,
    ) -> ImportResult<usize> {
        let batch = std::mem::take(pending);
        let size = batch.len();

        let inserted = self.import_repo.insert_batch(batch).await.map_err(|e| {
            error!(
                run_id = %run_id,
                batch_no = batch_no,
                batch_size = size,
                error = %e,
                "批次提交失败，本批已回滚"
            );
            e
        })?;

        debug!(run_id = %run_id, batch_no = batch_no, inserted = inserted, "批次已提交");
        Ok(inserted)
    }

    /// 表头校验之后的破坏性阶段
    async fn load(
        &self,
        run_id: String,
        source: String,
        table: RawTable,
        variant: SchemaVariant,
        started: Instant,
    ) -> ImportResult<ImportReport> {
        // === 步骤 2: 表头校验（破坏性操作之前）===
        let bound = ColumnSchema::for_variant(variant)
            .bind(&table.headers)
            .map_err(|e| {
                error!(run_id = %run_id, error = %e, "表头校验失败，现有数据未改动");
                e
            })?;

        let policy = self.config.get_voucher_policy().await?;
        let batch_size = self.config.get_commit_batch_size().await?;
        let normalizer = RowNormalizer::new(bound, VoucherGenerator::new(policy));
        let total_rows = table.rows.len();

        info!(
            run_id = %run_id,
            total_rows = total_rows,
            voucher_policy = %policy,
            batch_size = batch_size,
            "表头校验通过"
        );

        // === 步骤 3: 清空现有记录（独立提交）===
        let deleted_rows = self.import_repo.delete_all().await?;
        info!(run_id = %run_id, deleted_rows = deleted_rows, "现有记录已清空");

        // === 步骤 4-5: 归一化 + 分批提交 ===
        let mut pending: Vec<NewCreditBalance> = Vec::with_capacity(batch_size);
        let mut skipped: Vec<SkippedRow> = Vec::new();
        let mut committed_rows = 0;
        let mut batches = 0;

        for row in &table.rows {
            match normalizer.normalize(row) {
                Ok(record) => pending.push(record),
                Err(e) if e.is_row_level() => {
                    error!(run_id = %run_id, row_index = row.index, error = %e, "行处理失败，已跳过");
                    skipped.push(SkippedRow {
                        row_index: row.index,
                        reason: e.to_string(),
                    });
                    continue;
                }
                Err(e) => return Err(e),
            }

            if pending.len() >= batch_size {
                batches += 1;
                committed_rows += self.flush(&run_id, batches, &mut pending).await?;
            }
        }

        // === 步骤 6: 尾批 ===
        if !pending.is_empty() {
            batches += 1;
            committed_rows += self.flush(&run_id, batches, &mut pending).await?;
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if !skipped.is_empty() {
            warn!(run_id = %run_id, skipped_rows = skipped.len(), "部分行被跳过");
        }
        info!(
            run_id = %run_id,
            committed_rows = committed_rows,
            batches = batches,
            elapsed_ms = elapsed_ms,
            "导入完成"
        );

        Ok(ImportReport {
            run_id,
            source,
            variant: variant.to_string(),
            total_rows,
            deleted_rows,
            committed_rows,
            skipped,
            batches,
            elapsed_ms,
        })
    }
}

#[async_trait]
impl<R, C> CreditBalanceImporter for CreditBalanceImporterImpl<R, C>
where
    R: CreditBalanceImportRepository + Send + Sync,
    C: ImportConfigReader + Send + Sync,
{
    #[instrument(skip_all, fields(variant = %variant))]
    async fn import_file(
        &self,
        file_path: &Path,
        variant: SchemaVariant,
        sheet: Option<&str>,
    ) -> ImportResult<ImportReport> {
        let started = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        let source = file_path.display().to_string();
        info!(run_id = %run_id, file_path = %source, "开始导入余额数据");

        // === 步骤 1: 确保表结构 ===
        self.import_repo.ensure_schema().await?;

        // === 步骤 2: 解析文件 ===
        let sheet = sheet.or(variant.default_sheet_name());
        let table = self.file_parser.parse(file_path, sheet).map_err(|e| {
            error!(run_id = %run_id, error = %e, "文件解析失败");
            e
        })?;
        debug!(run_id = %run_id, columns = table.headers.len(), rows = table.rows.len(), "文件解析完成");

        self.load(run_id, source, table, variant, started).await
    }

    #[instrument(skip_all, fields(variant = %variant))]
    async fn import_table(
        &self,
        table: RawTable,
        variant: SchemaVariant,
        source: &str,
    ) -> ImportResult<ImportReport> {
        let started = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        info!(run_id = %run_id, source = %source, "开始导入余额数据");

        self.import_repo.ensure_schema().await?;
        self.load(run_id, source.to_string(), table, variant, started)
            .await
    }
}
