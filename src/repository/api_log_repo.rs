// ==========================================
// 诊所储值余额系统 - 接口访问日志仓储
// ==========================================
// 对齐: {namespace}.api_logs 表
// 红线: 券号查询必须留痕
// ==========================================

mod core;

#[cfg(test)]
mod tests;

pub use core::ApiLogRepository;
