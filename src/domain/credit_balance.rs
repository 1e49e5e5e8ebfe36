// ==========================================
// 诊所储值余额系统 - 储值余额领域模型
// ==========================================
// 对齐: credit_balances 表
// 用途: 导入层整表写入，API 层增删改查
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// NewCreditBalance - 待落库的余额记录
// ==========================================
// 来源: 行归一化器输出 / API 新建请求
// 说明: voucher_number 由券号生成器派生，可能为 None
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCreditBalance {
    // ===== 客户信息 =====
    pub client_code: String,
    pub client_name: String,
    pub phone_no: Option<String>, // 自由格式，可含空格/连字符

    // ===== 疗程与金额 =====
    pub treatment_name: Option<String>,
    #[serde(default)]
    pub package_amount: f64,
    #[serde(default)]
    pub amount_paid: f64,
    #[serde(default)]
    pub balance_amount: f64,
    #[serde(default)]
    pub prepaid_gift_card_balance: f64,

    // ===== 中心与分类 =====
    pub center: Option<String>,
    pub final_bucket: Option<String>, // 仅 Legacy 版式

    // ===== 疗程次数 =====
    #[serde(default)]
    pub sessions_paid: f64,
    #[serde(default)]
    pub sessions_consumed: f64,
    #[serde(default)]
    pub balance_sessions: f64,

    // ===== 联系方式 =====
    pub email: Option<String>, // 仅 Communication 版式

    // ===== 派生字段 =====
    pub voucher_number: Option<String>,
}

impl NewCreditBalance {
    /// 仅含必填字段的空记录（金额/次数为 0）
    pub fn new(client_code: impl Into<String>, client_name: impl Into<String>) -> Self {
        Self {
            client_code: client_code.into(),
            client_name: client_name.into(),
            phone_no: None,
            treatment_name: None,
            package_amount: 0.0,
            amount_paid: 0.0,
            balance_amount: 0.0,
            prepaid_gift_card_balance: 0.0,
            center: None,
            final_bucket: None,
            sessions_paid: 0.0,
            sessions_consumed: 0.0,
            balance_sessions: 0.0,
            email: None,
            voucher_number: None,
        }
    }
}

// ==========================================
// CreditBalance - 已落库的余额记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditBalance {
    pub id: i64,

    pub client_code: String,
    pub client_name: String,
    pub phone_no: Option<String>,

    pub treatment_name: Option<String>,
    pub package_amount: f64,
    pub amount_paid: f64,
    pub balance_amount: f64,
    pub prepaid_gift_card_balance: f64,

    pub center: Option<String>,
    pub final_bucket: Option<String>,

    pub sessions_paid: f64,
    pub sessions_consumed: f64,
    pub balance_sessions: f64,

    pub email: Option<String>,
    pub voucher_number: Option<String>,

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>, // 首次更新前为 None
}

// ==========================================
// CreditBalanceUpdate - 部分更新请求
// ==========================================
// None = 不修改该字段
// 可空文本字段: Some(None) / 空白串 = 置空
// 券号不可直接修改，由 center / client_code / phone_no 派生
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditBalanceUpdate {
    pub client_code: Option<String>,
    pub client_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone_no: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub treatment_name: Option<Option<String>>,
    pub package_amount: Option<f64>,
    pub amount_paid: Option<f64>,
    pub balance_amount: Option<f64>,
    pub prepaid_gift_card_balance: Option<f64>,
    #[serde(default, deserialize_with = "double_option")]
    pub center: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub final_bucket: Option<Option<String>>,
    pub sessions_paid: Option<f64>,
    pub sessions_consumed: Option<f64>,
    pub balance_sessions: Option<f64>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
}

/// 区分"字段缺省"与"显式 null"
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// 可选文本写入前清洗: 去首尾空白，空串视为 None
pub fn clean_optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CreditBalanceUpdate {
    /// 是否修改了券号三要素（center / client_code / phone_no）
    pub fn touches_voucher_identity(&self) -> bool {
        self.center.is_some() || self.client_code.is_some() || self.phone_no.is_some()
    }

    /// 将更新应用到已有记录（不处理审计字段与券号派生）
    pub fn apply_to(self, record: &mut CreditBalance) {
        if let Some(v) = self.client_code {
            record.client_code = v.trim().to_string();
        }
        if let Some(v) = self.client_name {
            record.client_name = v.trim().to_string();
        }
        if let Some(v) = self.phone_no {
            record.phone_no = clean_optional_text(v);
        }
        if let Some(v) = self.treatment_name {
            record.treatment_name = clean_optional_text(v);
        }
        if let Some(v) = self.package_amount {
            record.package_amount = v;
        }
        if let Some(v) = self.amount_paid {
            record.amount_paid = v;
        }
        if let Some(v) = self.balance_amount {
            record.balance_amount = v;
        }
        if let Some(v) = self.prepaid_gift_card_balance {
            record.prepaid_gift_card_balance = v;
        }
        if let Some(v) = self.center {
            record.center = clean_optional_text(v);
        }
        if let Some(v) = self.final_bucket {
            record.final_bucket = clean_optional_text(v);
        }
        if let Some(v) = self.sessions_paid {
            record.sessions_paid = v;
        }
        if let Some(v) = self.sessions_consumed {
            record.sessions_consumed = v;
        }
        if let Some(v) = self.balance_sessions {
            record.balance_sessions = v;
        }
        if let Some(v) = self.email {
            record.email = clean_optional_text(v);
        }
    }
}

// ==========================================
// VoucherIdentity - 券号三要素
// ==========================================
// 用途: 券号重算时只读取必要字段
#[derive(Debug, Clone, PartialEq)]
pub struct VoucherIdentity {
    pub id: i64,
    pub center: Option<String>,
    pub client_code: String,
    pub phone_no: Option<String>,
}

// ==========================================
// CreditBalanceFilter - 列表查询条件
// ==========================================
// 文本条件均为大小写不敏感的部分匹配
// limit = None 表示返回全部匹配记录（按 id 升序）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditBalanceFilter {
    pub client_code: Option<String>,
    pub client_name: Option<String>,
    pub center: Option<String>,
    #[serde(default)]
    pub skip: i64,
    pub limit: Option<i64>,
}

impl CreditBalanceFilter {
    pub fn by_center(center: impl Into<String>, skip: i64, limit: Option<i64>) -> Self {
        Self {
            center: Some(center.into()),
            skip,
            limit,
            ..Default::default()
        }
    }
}

// ==========================================
// CreditBalanceSummary - 汇总统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditBalanceSummary {
    pub total_records: i64,
    pub total_balance_amount: f64,
    pub total_balance_sessions: f64,
    pub centers: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> CreditBalance {
        CreditBalance {
            id: 1,
            client_code: "C123".to_string(),
            client_name: "Asha".to_string(),
            phone_no: Some("98765 43210".to_string()),
            treatment_name: None,
            package_amount: 1000.0,
            amount_paid: 500.0,
            balance_amount: 500.0,
            prepaid_gift_card_balance: 0.0,
            center: Some("GK2".to_string()),
            final_bucket: None,
            sessions_paid: 6.0,
            sessions_consumed: 2.0,
            balance_sessions: 4.0,
            email: None,
            voucher_number: Some("GK1236543".to_string()),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_update_touches_voucher_identity() {
        assert!(!CreditBalanceUpdate::default().touches_voucher_identity());

        let update = CreditBalanceUpdate {
            balance_amount: Some(1.0),
            ..Default::default()
        };
        assert!(!update.touches_voucher_identity());

        let update = CreditBalanceUpdate {
            phone_no: Some(None),
            ..Default::default()
        };
        assert!(update.touches_voucher_identity());
    }

    #[test]
    fn test_update_apply_only_set_fields() {
        let mut record = sample_record();
        let update = CreditBalanceUpdate {
            balance_amount: Some(250.0),
            center: Some(Some("Preet Vihar".to_string())),
            ..Default::default()
        };
        update.apply_to(&mut record);

        assert_eq!(record.balance_amount, 250.0);
        assert_eq!(record.center.as_deref(), Some("Preet Vihar"));
        assert_eq!(record.client_name, "Asha");
        assert_eq!(record.package_amount, 1000.0);
    }

    #[test]
    fn test_update_clears_blank_and_null_text() {
        let mut record = sample_record();
        let update = CreditBalanceUpdate {
            phone_no: Some(Some("   ".to_string())),
            center: Some(None),
            treatment_name: Some(Some(" Facial ".to_string())),
            ..Default::default()
        };
        update.apply_to(&mut record);

        assert_eq!(record.phone_no, None);
        assert_eq!(record.center, None);
        assert_eq!(record.treatment_name.as_deref(), Some("Facial"));
    }

    #[test]
    fn test_update_deserialize_distinguishes_null_from_absent() {
        let update: CreditBalanceUpdate =
            serde_json::from_str(r#"{"center": null, "balance_amount": 5.0}"#).unwrap();
        assert_eq!(update.center, Some(None));
        assert_eq!(update.phone_no, None);
        assert_eq!(update.balance_amount, Some(5.0));

        // 券号字段不属于更新请求，传入时被忽略
        let update: CreditBalanceUpdate =
            serde_json::from_str(r#"{"voucher_number": "BOGUS"}"#).unwrap();
        assert_eq!(update, CreditBalanceUpdate::default());
    }

    #[test]
    fn test_new_credit_balance_defaults() {
        let record = NewCreditBalance::new("C1", "Ravi");
        assert_eq!(record.balance_amount, 0.0);
        assert_eq!(record.sessions_paid, 0.0);
        assert!(record.voucher_number.is_none());
    }
}
