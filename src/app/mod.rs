// ==========================================
// 跨境供应链协同平台 - 应用层
// ==========================================
// 职责: 装配仓储/引擎/调度/API, 供服务入口使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
