// ==========================================
// 诊所储值余额系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls/.xlsm/.ods) / CSV (.csv)
// 输出: RawTable（表头已去空白，完全空白的行已跳过）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

// ==========================================
// RawCell - 未定型单元格
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl RawCell {
    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 文本形式（整数值数字不带小数部分: 9876543210.0 → "9876543210"）
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawCell::Empty => None,
            RawCell::Text(s) => Some(s.trim().to_string()),
            RawCell::Number(n) => Some(format_number(*n)),
            RawCell::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        }
    }
}

/// 整数值按整数渲染，其余保持浮点格式
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&Data> for RawCell {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty | Data::Error(_) => RawCell::Empty,
            Data::String(s) => RawCell::Text(s.clone()),
            Data::Int(i) => RawCell::Number(*i as f64),
            Data::Float(f) => RawCell::Number(*f),
            Data::Bool(b) => RawCell::Bool(*b),
            Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
        }
    }
}

// ==========================================
// RawRow / RawTable
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub index: usize, // 数据行下标（0 起，不含表头；跳过空白行后仍保留原位置）
    pub cells: Vec<RawCell>,
}

static EMPTY_CELL: RawCell = RawCell::Empty;

impl RawRow {
    /// 越界列视为空单元格
    pub fn cell(&self, col: usize) -> &RawCell {
        self.cells.get(col).unwrap_or(&EMPTY_CELL)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// 由表头与数据行构造（跳过完全空白的行）
    pub fn from_rows<I>(headers: Vec<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<RawCell>>,
    {
        let headers = headers.into_iter().map(|h| h.trim().to_string()).collect();
        let rows = rows
            .into_iter()
            .enumerate()
            .filter(|(_, cells)| !cells.iter().all(RawCell::is_blank))
            .map(|(index, cells)| RawRow { index, cells })
            .collect();
        Self { headers, rows }
    }
}

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser: Send + Sync {
    /// 解析为未定型表格
    ///
    /// # 参数
    /// - sheet: 工作表名（CSV 忽略；None = 第一个工作表）
    fn parse(&self, file_path: &Path, sheet: Option<&str>) -> ImportResult<RawTable>;
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse(&self, file_path: &Path, _sheet: Option<&str>) -> ImportResult<RawTable> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let cells = record
                .iter()
                .map(|value| {
                    if value.trim().is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(value.to_string())
                    }
                })
                .collect();
            rows.push(cells);
        }

        Ok(RawTable::from_rows(headers, rows))
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse(&self, file_path: &Path, sheet: Option<&str>) -> ImportResult<RawTable> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if !matches!(ext.as_str(), "xlsx" | "xls" | "xlsm" | "ods") {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = match sheet {
            Some(name) => sheet_names
                .iter()
                .find(|s| s.trim() == name.trim())
                .cloned()
                .ok_or_else(|| ImportError::SheetNotFound {
                    sheet: name.to_string(),
                    available: sheet_names.join(", "),
                })?,
            None => sheet_names
                .first()
                .cloned()
                .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?,
        };

        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;
        let headers: Vec<String> = header_row.iter().map(|cell| cell.to_string()).collect();

        let data_rows: Vec<Vec<RawCell>> = rows
            .map(|row| row.iter().map(RawCell::from).collect())
            .collect();

        Ok(RawTable::from_rows(headers, data_rows))
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse(&self, file_path: &Path, sheet: Option<&str>) -> ImportResult<RawTable> {
        match extension_of(file_path).as_str() {
            "csv" => CsvParser.parse(file_path, sheet),
            "xlsx" | "xls" | "xlsm" | "ods" => ExcelParser.parse(file_path, sheet),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_csv_parser_trims_headers_and_skips_blank_rows() {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, " Client Code ,Client name,Phone No").unwrap();
        writeln!(temp_file, "C1,Asha,98765 43210").unwrap();
        writeln!(temp_file, ",,").unwrap();
        writeln!(temp_file, "C2,Ravi,").unwrap();
        temp_file.flush().unwrap();

        let table = CsvParser.parse(temp_file.path(), None).unwrap();
        assert_eq!(table.headers, vec!["Client Code", "Client name", "Phone No"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].index, 0);
        assert_eq!(table.rows[1].index, 2);
        assert_eq!(table.rows[1].cell(2), &RawCell::Empty);
        // 越界列视为空
        assert_eq!(table.rows[1].cell(9), &RawCell::Empty);
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse(Path::new("/nonexistent/file.csv"), None);
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let temp_file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = UniversalFileParser.parse(temp_file.path(), None);
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_number_rendering() {
        assert_eq!(format_number(9876543210.0), "9876543210");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(RawCell::Number(3.0).as_text().as_deref(), Some("3"));
        assert_eq!(RawCell::Text("  x ".to_string()).as_text().as_deref(), Some("x"));
        assert_eq!(RawCell::Empty.as_text(), None);
    }
}
