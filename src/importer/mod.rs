// ==========================================
// 诊所储值余额系统 - 导入层
// ==========================================
// 职责: 外部表格 → credit_balances 整表替换
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod column_schema;
pub mod credit_balance_importer_impl;
pub mod credit_balance_importer_trait;
pub mod data_cleaner;
pub mod error;
pub mod file_parser;
pub mod row_normalizer;
pub mod voucher;
pub mod voucher_refresh;

// 重导出核心类型
pub use column_schema::{BoundSchema, ColumnSchema, Field};
pub use credit_balance_importer_impl::CreditBalanceImporterImpl;
pub use credit_balance_importer_trait::CreditBalanceImporter;
pub use data_cleaner::DataCleaner;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawCell, RawRow, RawTable, UniversalFileParser};
pub use row_normalizer::RowNormalizer;
pub use voucher::VoucherGenerator;
pub use voucher_refresh::VoucherRefresher;
