// ==========================================
// 诊所储值余额系统 - 券号重算
// ==========================================
// 职责: 按当前口径重算全部记录的券号，每批一个事务
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::import_report::VoucherRefreshReport;
use crate::importer::error::ImportResult;
use crate::importer::voucher::VoucherGenerator;
use crate::repository::CreditBalanceImportRepository;
use std::time::Instant;
use tracing::{debug, info};

pub struct VoucherRefresher<R, C>
where
    R: CreditBalanceImportRepository,
    C: ImportConfigReader,
{
    import_repo: R,
    config: C,
}

impl<R, C> VoucherRefresher<R, C>
where
    R: CreditBalanceImportRepository,
    C: ImportConfigReader,
{
    pub fn new(import_repo: R, config: C) -> Self {
        Self {
            import_repo,
            config,
        }
    }

    /// 重算全部券号
    ///
    /// # 返回
    /// - Ok(VoucherRefreshReport): updated_records 为回写的记录数
    /// - Err: 存储错误（已提交批次保留）
    pub async fn refresh(&self) -> ImportResult<VoucherRefreshReport> {
        let started = Instant::now();
        self.import_repo.ensure_schema().await?;

        let policy = self.config.get_voucher_policy().await?;
        let batch_size = self.config.get_commit_batch_size().await?;
        let generator = VoucherGenerator::new(policy);

        let identities = self.import_repo.list_voucher_identities().await?;
        let total_records = identities.len();
        info!(total_records = total_records, voucher_policy = %policy, "开始重算券号");

        let mut updated_records = 0;
        let mut batches = 0;
        for chunk in identities.chunks(batch_size) {
            let updates: Vec<(i64, Option<String>)> = chunk
                .iter()
                .map(|identity| {
                    let voucher = generator.generate(
                        identity.center.as_deref(),
                        Some(identity.client_code.as_str()),
                        identity.phone_no.as_deref(),
                    );
                    (identity.id, voucher)
                })
                .collect();

            updated_records += self.import_repo.update_vouchers_batch(updates).await?;
            batches += 1;
            debug!(batch_no = batches, updated_records = updated_records, "券号批次已提交");
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(updated_records = updated_records, batches = batches, elapsed_ms = elapsed_ms, "券号重算完成");

        Ok(VoucherRefreshReport {
            policy: policy.to_string(),
            total_records,
            updated_records,
            batches,
            elapsed_ms,
        })
    }
}
