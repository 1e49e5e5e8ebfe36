// ==========================================
// 诊所储值余额系统 - 数据清洗器
// ==========================================
// 职责: 缺失值标准化 / 金额解析 / 次数解析
// 规则:
// - 金额: 去千分位逗号后解析，空白/无法解析/非有限值 → 0.0（不报错）
// - 次数: 数字直接使用，数字文本解析，空白/NaN → 0.0，非数字文本 → 行级错误
// ==========================================

use crate::importer::file_parser::RawCell;

/// 视为缺失的文本值
const NULL_SENTINELS: &[&str] = &["", "nan", "NaN", "None", "NA", "N/A", "#N/A", "null"];

pub struct DataCleaner;

impl DataCleaner {
    /// 是否为缺失值标记
    pub fn is_null_sentinel(&self, value: &str) -> bool {
        NULL_SENTINELS.contains(&value.trim())
    }

    /// 文本字段: 去空白，缺失标记 → None
    pub fn clean_text(&self, cell: &RawCell) -> Option<String> {
        cell.as_text().filter(|v| !self.is_null_sentinel(v))
    }

    /// 金额字段
    ///
    /// # 示例
    /// - "12,345.50" → 12345.5
    /// - "" / "nan" / "abc" → 0.0
    pub fn parse_money(&self, cell: &RawCell) -> f64 {
        let value = match cell {
            RawCell::Number(n) => *n,
            RawCell::Text(s) => s.replace(',', "").trim().parse::<f64>().unwrap_or(0.0),
            RawCell::Bool(_) | RawCell::Empty => 0.0,
        };
        finite_or_zero(value)
    }

    /// 次数字段
    ///
    /// # 返回
    /// - Ok(f64): 解析结果
    /// - Err(String): 非数字文本（由调用方转为行级错误）
    pub fn parse_count(&self, cell: &RawCell) -> Result<f64, String> {
        match cell {
            RawCell::Empty => Ok(0.0),
            RawCell::Number(n) => Ok(finite_or_zero(*n)),
            RawCell::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            RawCell::Text(s) => {
                let trimmed = s.trim();
                if self.is_null_sentinel(trimmed) {
                    return Ok(0.0);
                }
                trimmed
                    .parse::<f64>()
                    .map(finite_or_zero)
                    .map_err(|_| format!("期望数值，实际为文本 '{}'", trimmed))
            }
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawCell {
        RawCell::Text(s.to_string())
    }

    #[test]
    fn test_parse_money() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_money(&text("12,345.50")), 12345.50);
        assert_eq!(cleaner.parse_money(&text(" 1,000 ")), 1000.0);
        assert_eq!(cleaner.parse_money(&RawCell::Number(250.75)), 250.75);
        assert_eq!(cleaner.parse_money(&RawCell::Empty), 0.0);
        assert_eq!(cleaner.parse_money(&text("")), 0.0);
        assert_eq!(cleaner.parse_money(&text("nan")), 0.0);
        assert_eq!(cleaner.parse_money(&text("inf")), 0.0);
        assert_eq!(cleaner.parse_money(&text("₹ abc")), 0.0);
        assert_eq!(cleaner.parse_money(&RawCell::Number(f64::NAN)), 0.0);
    }

    #[test]
    fn test_parse_count() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_count(&RawCell::Number(6.0)), Ok(6.0));
        assert_eq!(cleaner.parse_count(&text(" 4 ")), Ok(4.0));
        assert_eq!(cleaner.parse_count(&text("2.5")), Ok(2.5));
        assert_eq!(cleaner.parse_count(&RawCell::Empty), Ok(0.0));
        assert_eq!(cleaner.parse_count(&text("NaN")), Ok(0.0));
        assert_eq!(cleaner.parse_count(&RawCell::Number(f64::NAN)), Ok(0.0));
        assert!(cleaner.parse_count(&text("six")).is_err());
    }

    #[test]
    fn test_clean_text_sentinels() {
        let cleaner = DataCleaner;
        for sentinel in ["", "  ", "nan", "NaN", "None", "NA", "N/A", "#N/A", "null"] {
            assert_eq!(cleaner.clean_text(&text(sentinel)), None, "sentinel {:?}", sentinel);
        }
        assert_eq!(cleaner.clean_text(&RawCell::Empty), None);
        assert_eq!(cleaner.clean_text(&text(" GK2 ")), Some("GK2".to_string()));
        assert_eq!(
            cleaner.clean_text(&RawCell::Number(9876543210.0)),
            Some("9876543210".to_string())
        );
    }
}
