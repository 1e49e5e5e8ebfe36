// ==========================================
// 诊所储值余额系统 - 券号生成器
// ==========================================
// 券号 = 前缀 + 客户码 3 位 + 电话 4 位
// 纯函数: 相同输入 + 相同口径 → 相同输出，无副作用
// 任一输入缺失/空白 → None
// ==========================================

use crate::domain::types::VoucherPolicy;

/// 缺位电话的占位数字（ColumnImport 口径）
const PLACEHOLDER_PHONE: &str = "0000000000";

pub struct VoucherGenerator {
    policy: VoucherPolicy,
}

impl VoucherGenerator {
    pub fn new(policy: VoucherPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> VoucherPolicy {
        self.policy
    }

    /// 生成券号
    ///
    /// # 参数
    /// - center: 中心名称
    /// - client_code: 客户编码
    /// - phone: 电话（可含空格/连字符）
    ///
    /// # 返回
    /// - Some(券号)
    /// - None: 任一输入缺失或去空白后为空
    ///
    /// # 示例
    /// ```
    /// use clinic_credit_balance::domain::VoucherPolicy;
    /// use clinic_credit_balance::importer::VoucherGenerator;
    ///
    /// let generator = VoucherGenerator::new(VoucherPolicy::ColumnImport);
    /// assert_eq!(
    ///     generator.generate(Some("GK Center"), Some("C123"), Some("98-765 43210")),
    ///     Some("GK1236543".to_string())
    /// );
    /// ```
    pub fn generate(
        &self,
        center: Option<&str>,
        client_code: Option<&str>,
        phone: Option<&str>,
    ) -> Option<String> {
        let center = non_blank(center)?;
        let client_code = non_blank(client_code)?;
        let phone = non_blank(phone)?;

        let (prefix, phone_digits) = match self.policy {
            VoucherPolicy::ColumnImport => {
                (column_import_prefix(center), column_import_phone(phone))
            }
            VoucherPolicy::RecordMethod => {
                (record_method_prefix(center), record_method_phone(phone))
            }
        };

        Some(format!("{}{}{}", prefix, client_digits(client_code), phone_digits))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn digits_of(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// 左侧补零到指定宽度（超长不截断）
fn zfill(value: &str, width: usize) -> String {
    format!("{:0>width$}", value, width = width)
}

/// 客户码数字段: 取全部数字的前 3 位，不足补零
fn client_digits(client_code: &str) -> String {
    let digits: String = digits_of(client_code).chars().take(3).collect();
    zfill(&digits, 3)
}

// ===== ColumnImport 口径 =====

fn column_import_prefix(center: &str) -> &'static str {
    let upper = center.to_uppercase();
    if upper.contains("GK") {
        "GK"
    } else if upper.contains("PV") || upper.contains("PREET") {
        "PV"
    } else {
        "XX"
    }
}

/// 电话段: ≥7 位取第 4-7 位，否则补零取前 4 位
fn column_import_phone(phone: &str) -> String {
    let cleaned: String = phone.chars().filter(|c| *c != ' ' && *c != '-').collect();
    let mut digits = digits_of(&cleaned);
    if digits.is_empty() {
        digits = PLACEHOLDER_PHONE.to_string();
    }

    if digits.len() >= 7 {
        digits[3..7].to_string()
    } else {
        zfill(&digits, 4)[..4].to_string()
    }
}

// ===== RecordMethod 口径 =====

fn record_method_prefix(center: &str) -> &'static str {
    if center.trim().to_uppercase() == "GK2" {
        "GK"
    } else {
        "PV"
    }
}

/// 电话段: >6 位取第 3-6 位，4-6 位取前 4 位，不足 4 位补零
fn record_method_phone(phone: &str) -> String {
    let digits = digits_of(phone);
    if digits.len() >= 4 {
        if digits.len() > 6 {
            digits[2..6].to_string()
        } else {
            digits[..4].to_string()
        }
    } else {
        zfill(&digits, 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_import() -> VoucherGenerator {
        VoucherGenerator::new(VoucherPolicy::ColumnImport)
    }

    fn record_method() -> VoucherGenerator {
        VoucherGenerator::new(VoucherPolicy::RecordMethod)
    }

    #[test]
    fn test_column_import_reference_case() {
        assert_eq!(
            column_import().generate(Some("GK Center"), Some("C123"), Some("98-765 43210")),
            Some("GK1236543".to_string())
        );
    }

    #[test]
    fn test_generate_is_deterministic() {
        let g = column_import();
        let a = g.generate(Some("Preet Vihar"), Some("A77"), Some("9811122233"));
        let b = g.generate(Some("Preet Vihar"), Some("A77"), Some("9811122233"));
        assert_eq!(a, b);
        assert_eq!(a, Some("PV0771122".to_string()));
    }

    #[test]
    fn test_missing_inputs_yield_none() {
        for g in [column_import(), record_method()] {
            assert_eq!(g.generate(None, Some("C1"), Some("123")), None);
            assert_eq!(g.generate(Some("GK"), None, Some("123")), None);
            assert_eq!(g.generate(Some("GK"), Some("C1"), None), None);
            assert_eq!(g.generate(Some("  "), Some("C1"), Some("123")), None);
            assert_eq!(g.generate(Some("GK"), Some(""), Some("123")), None);
        }
    }

    #[test]
    fn test_column_import_prefixes() {
        let g = column_import();
        assert!(g.generate(Some("gk-2"), Some("1"), Some("1")).unwrap().starts_with("GK"));
        assert!(g.generate(Some("PV main"), Some("1"), Some("1")).unwrap().starts_with("PV"));
        assert!(g.generate(Some("preet"), Some("1"), Some("1")).unwrap().starts_with("PV"));
        assert!(g.generate(Some("Saket"), Some("1"), Some("1")).unwrap().starts_with("XX"));
    }

    #[test]
    fn test_column_import_short_and_digitless_phone() {
        let g = column_import();
        // 不足 7 位: 补零后取前 4 位
        assert_eq!(g.generate(Some("GK"), Some("C5"), Some("12")), Some("GK0050012".to_string()));
        assert_eq!(g.generate(Some("GK"), Some("C5"), Some("123456")), Some("GK0051234".to_string()));
        // 无数字: 视为 0000000000
        assert_eq!(g.generate(Some("GK"), Some("C5"), Some("n/a")), Some("GK0050000".to_string()));
    }

    #[test]
    fn test_client_digits() {
        assert_eq!(client_digits("C123456"), "123");
        assert_eq!(client_digits("AB"), "000");
        assert_eq!(client_digits("x9y8"), "098");
    }

    #[test]
    fn test_record_method_prefix_exact_match() {
        let g = record_method();
        assert!(g.generate(Some(" gk2 "), Some("1"), Some("1234")).unwrap().starts_with("GK"));
        assert!(g.generate(Some("GK Center"), Some("1"), Some("1234")).unwrap().starts_with("PV"));
        assert!(g.generate(Some("Saket"), Some("1"), Some("1234")).unwrap().starts_with("PV"));
    }

    #[test]
    fn test_record_method_phone_segments() {
        let g = record_method();
        // >6 位: 第 3-6 位
        assert_eq!(
            g.generate(Some("GK2"), Some("C123"), Some("98-765 43210")),
            Some("GK1237654".to_string())
        );
        // 4-6 位: 前 4 位
        assert_eq!(g.generate(Some("GK2"), Some("C1"), Some("123456")), Some("GK0011234".to_string()));
        // 不足 4 位: 补零
        assert_eq!(g.generate(Some("GK2"), Some("C1"), Some("7")), Some("GK0010007".to_string()));
    }
}
