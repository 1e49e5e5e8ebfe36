// ==========================================
// 诊所储值余额系统 - 行归一化器
// ==========================================
// 职责: 单行未定型数据 → NewCreditBalance（含券号）
// 行级错误: 必填列为空 / 次数列为非数字文本
// ==========================================

use crate::domain::credit_balance::NewCreditBalance;
use crate::importer::column_schema::{BoundSchema, Field};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{RawCell, RawRow};
use crate::importer::voucher::VoucherGenerator;

pub struct RowNormalizer {
    schema: BoundSchema,
    cleaner: DataCleaner,
    voucher: VoucherGenerator,
}

impl RowNormalizer {
    pub fn new(schema: BoundSchema, voucher: VoucherGenerator) -> Self {
        Self {
            schema,
            cleaner: DataCleaner,
            voucher,
        }
    }

    fn cell<'a>(&self, row: &'a RawRow, field: Field) -> &'a RawCell {
        static EMPTY: RawCell = RawCell::Empty;
        match self.schema.index_of(field) {
            Some(i) => row.cell(i),
            None => &EMPTY,
        }
    }

    fn text(&self, row: &RawRow, field: Field) -> Option<String> {
        self.cleaner.clean_text(self.cell(row, field))
    }

    fn money(&self, row: &RawRow, field: Field) -> f64 {
        self.cleaner.parse_money(self.cell(row, field))
    }

    fn count(&self, row: &RawRow, field: Field) -> ImportResult<f64> {
        self.cleaner
            .parse_count(self.cell(row, field))
            .map_err(|message| ImportError::TypeConversionError {
                row: row.index,
                field: self.schema.label_of(field).to_string(),
                message,
            })
    }

    fn required_text(&self, row: &RawRow, field: Field) -> ImportResult<String> {
        self.text(row, field)
            .ok_or_else(|| ImportError::FieldMappingError {
                row: row.index,
                message: format!("必填列 '{}' 为空", self.schema.label_of(field)),
            })
    }

    /// 归一化一行
    ///
    /// # 返回
    /// - Ok(NewCreditBalance): 已派生券号（输入不足时为 None）
    /// - Err: 行级错误，调用方记录后跳过该行
    pub fn normalize(&self, row: &RawRow) -> ImportResult<NewCreditBalance> {
        let client_code = self.required_text(row, Field::ClientCode)?;
        let client_name = self.required_text(row, Field::ClientName)?;

        let mut record = NewCreditBalance {
            phone_no: self.text(row, Field::PhoneNo),
            treatment_name: self.text(row, Field::TreatmentName),
            package_amount: self.money(row, Field::PackageAmount),
            amount_paid: self.money(row, Field::AmountPaid),
            balance_amount: self.money(row, Field::BalanceAmount),
            prepaid_gift_card_balance: self.money(row, Field::PrepaidGiftCardBalance),
            center: self.text(row, Field::Center),
            final_bucket: self.text(row, Field::FinalBucket),
            sessions_paid: self.count(row, Field::SessionsPaid)?,
            sessions_consumed: self.count(row, Field::SessionsConsumed)?,
            balance_sessions: self.count(row, Field::BalanceSessions)?,
            email: self.text(row, Field::Email),
            ..NewCreditBalance::new(client_code, client_name)
        };

        record.voucher_number = self.voucher.generate(
            record.center.as_deref(),
            Some(record.client_code.as_str()),
            record.phone_no.as_deref(),
        );

        Ok(record)
    }
}
