// ==========================================
// 诊所储值余额系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite (r2d2 连接池)
// 系统定位: 储值余额台账导入与查询服务
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 认证层 - 密码与令牌
pub mod auth;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接池/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 依赖组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{SchemaVariant, VoucherPolicy};

// 领域实体
pub use domain::{
    ApiLog, Center, CreditBalance, CreditBalanceFilter, CreditBalanceSummary,
    CreditBalanceUpdate, ImportReport, NewCreditBalance, UserProfile, VoucherRefreshReport,
};

// 券号生成
pub use importer::VoucherGenerator;

// API
pub use api::{ApiError, ApiResult, AuthApi, CreditBalanceApi, ImportApi};

// 应用状态
pub use app::AppState;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "诊所储值余额系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
