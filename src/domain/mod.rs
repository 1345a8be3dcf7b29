// ==========================================
// 跨境供应链协同平台 - 领域模型层
// ==========================================
// 职责: 定义领域实体、封闭类型、状态推进规则
// 红线: 不含数据访问逻辑,不含任务调度逻辑
// ==========================================

pub mod customs;
pub mod inventory;
pub mod job;
pub mod logistics;
pub mod order;
pub mod settlement;
pub mod types;

// 重导出核心类型
pub use customs::{CustomsHeader, CustomsItem};
pub use inventory::Inventory;
pub use job::Job;
pub use logistics::Logistics;
pub use order::Order;
pub use settlement::Settlement;
pub use types::{
    JobStatus, JobType, LogisticsStatus, OrderCategory, RiskLevel, SettlementStatus,
};
