// ==========================================
// 诊所储值余额系统 - 应用层
// ==========================================
// 职责: 组装各层依赖,供 CLI 入口使用
// ==========================================

pub mod state;

// 重导出
pub use state::{AppInitError, AppState};
