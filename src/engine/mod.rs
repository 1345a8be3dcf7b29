// ==========================================
// 跨境供应链协同平台 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎, 不拼 SQL
// 红线: Engine 不拼 SQL, 数据装配由 API 层经仓储完成
// ==========================================

pub mod risk;

// 重导出核心引擎
pub use risk::{ComplianceScore, ComplianceSnapshot, RiskEngine, BASELINE_SCORE};
