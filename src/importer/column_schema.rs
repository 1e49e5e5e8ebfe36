// ==========================================
// 诊所储值余额系统 - 列定义与表头绑定
// ==========================================
// 职责: 按版式声明列，并在读取数据前一次性校验表头
// 匹配: 表头去空白后精确匹配，其次大小写不敏感匹配，再次别名
// ==========================================

use crate::domain::types::SchemaVariant;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashMap;

/// 余额记录字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ClientCode,
    ClientName,
    PhoneNo,
    TreatmentName,
    PackageAmount,
    AmountPaid,
    BalanceAmount,
    PrepaidGiftCardBalance,
    Center,
    FinalBucket,
    SessionsPaid,
    SessionsConsumed,
    BalanceSessions,
    Email,
}

#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub field: Field,
    pub label: &'static str,
    pub aliases: &'static [&'static str],
    pub required: bool,
}

const fn col(field: Field, label: &'static str) -> ColumnSpec {
    ColumnSpec {
        field,
        label,
        aliases: &[],
        required: false,
    }
}

/// 两种版式共有的列
fn common_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec {
            required: true,
            ..col(Field::ClientCode, "Client Code")
        },
        ColumnSpec {
            required: true,
            ..col(Field::ClientName, "Client name")
        },
        col(Field::PhoneNo, "Phone No"),
        col(Field::TreatmentName, "Treatment Name"),
        col(Field::PackageAmount, "Package Amount (₹)"),
        col(Field::AmountPaid, "Amount Paid by the client"),
        col(Field::BalanceAmount, "Balance Amount (₹)"),
        col(Field::PrepaidGiftCardBalance, "Prepaid / Gift Card Balance"),
        col(Field::Center, "Center"),
        col(Field::SessionsPaid, "Sessions Paid"),
        col(Field::SessionsConsumed, "Sessions Consumed"),
        col(Field::BalanceSessions, "Balance Sessions"),
    ]
}

// ==========================================
// ColumnSchema - 版式列定义
// ==========================================
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    pub variant: SchemaVariant,
    pub columns: Vec<ColumnSpec>,
}

impl ColumnSchema {
    pub fn for_variant(variant: SchemaVariant) -> Self {
        let mut columns = common_columns();
        match variant {
            SchemaVariant::Legacy => {
                columns.push(col(Field::FinalBucket, "Final Bucket"));
            }
            SchemaVariant::Communication => {
                columns.push(ColumnSpec {
                    aliases: &["Email ID", "Email IDs", "Email"],
                    ..col(Field::Email, "Email ID's")
                });
            }
        }
        Self { variant, columns }
    }

    /// 绑定表头
    ///
    /// # 返回
    /// - Ok(BoundSchema): 字段 → 列下标（可选列缺失时不绑定）
    /// - Err(MissingRequiredColumns): 缺少必需列
    pub fn bind(&self, headers: &[String]) -> ImportResult<BoundSchema> {
        let trimmed: Vec<&str> = headers.iter().map(|h| h.trim()).collect();

        let find = |name: &str| -> Option<usize> {
            trimmed
                .iter()
                .position(|h| *h == name)
                .or_else(|| trimmed.iter().position(|h| h.eq_ignore_ascii_case(name)))
        };

        let mut bindings = HashMap::new();
        let mut missing = Vec::new();

        for spec in &self.columns {
            let index = std::iter::once(spec.label)
                .chain(spec.aliases.iter().copied())
                .find_map(|name| find(name));

            match index {
                Some(i) => {
                    bindings.insert(spec.field, i);
                }
                None if spec.required => missing.push(spec.label.to_string()),
                None => {}
            }
        }

        if !missing.is_empty() {
            return Err(ImportError::MissingRequiredColumns { columns: missing });
        }

        Ok(BoundSchema {
            variant: self.variant,
            columns: self.columns.clone(),
            bindings,
        })
    }
}

// ==========================================
// BoundSchema - 已绑定表头的列定义
// ==========================================
#[derive(Debug, Clone)]
pub struct BoundSchema {
    pub variant: SchemaVariant,
    pub columns: Vec<ColumnSpec>,
    bindings: HashMap<Field, usize>,
}

impl BoundSchema {
    /// 字段对应的列下标（列不存在时 None）
    pub fn index_of(&self, field: Field) -> Option<usize> {
        self.bindings.get(&field).copied()
    }

    pub fn label_of(&self, field: Field) -> &'static str {
        self.columns
            .iter()
            .find(|c| c.field == field)
            .map(|c| c.label)
            .unwrap_or("")
    }
}
