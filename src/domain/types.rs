// ==========================================
// 诊所储值余额系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 表格版式 (Schema Variant)
// ==========================================
// Legacy: 旧版平铺表（默认第一个工作表，含 Final Bucket）
// Communication: "For Communication" 工作表（含 Email 列）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaVariant {
    Legacy,
    Communication,
}

impl SchemaVariant {
    /// 该版式默认读取的工作表名（None = 第一个工作表）
    pub fn default_sheet_name(&self) -> Option<&'static str> {
        match self {
            SchemaVariant::Legacy => None,
            SchemaVariant::Communication => Some("For Communication"),
        }
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVariant::Legacy => write!(f, "LEGACY"),
            SchemaVariant::Communication => write!(f, "COMMUNICATION"),
        }
    }
}

impl FromStr for SchemaVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LEGACY" => Ok(SchemaVariant::Legacy),
            "COMMUNICATION" | "FOR COMMUNICATION" => Ok(SchemaVariant::Communication),
            other => Err(format!("未知的表格版式: {}", other)),
        }
    }
}

// ==========================================
// 券号生成口径 (Voucher Policy)
// ==========================================
// 两套口径并存，待业务方裁定；同一时刻只启用一套
// - ColumnImport: 包含匹配前缀（GK / PV|PREET / XX），电话取第 4-7 位
// - RecordMethod: 仅 "GK2" 为 GK，其余 PV，电话取第 3-6 位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherPolicy {
    #[default]
    ColumnImport,
    RecordMethod,
}

impl fmt::Display for VoucherPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoucherPolicy::ColumnImport => write!(f, "COLUMN_IMPORT"),
            VoucherPolicy::RecordMethod => write!(f, "RECORD_METHOD"),
        }
    }
}

impl FromStr for VoucherPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "COLUMN_IMPORT" | "A" => Ok(VoucherPolicy::ColumnImport),
            "RECORD_METHOD" | "B" => Ok(VoucherPolicy::RecordMethod),
            other => Err(format!("未知的券号口径: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_variant_from_str() {
        assert_eq!("legacy".parse::<SchemaVariant>(), Ok(SchemaVariant::Legacy));
        assert_eq!(
            " For Communication ".parse::<SchemaVariant>(),
            Ok(SchemaVariant::Communication)
        );
        assert!("flat".parse::<SchemaVariant>().is_err());
    }

    #[test]
    fn test_voucher_policy_roundtrip_display() {
        for policy in [VoucherPolicy::ColumnImport, VoucherPolicy::RecordMethod] {
            assert_eq!(policy.to_string().parse::<VoucherPolicy>(), Ok(policy));
        }
        assert_eq!(VoucherPolicy::default(), VoucherPolicy::ColumnImport);
    }

    #[test]
    fn test_default_sheet_name() {
        assert_eq!(SchemaVariant::Legacy.default_sheet_name(), None);
        assert_eq!(
            SchemaVariant::Communication.default_sheet_name(),
            Some("For Communication")
        );
    }
}
