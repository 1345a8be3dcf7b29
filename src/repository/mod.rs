// ==========================================
// 跨境供应链协同平台 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod customs_repo;
pub mod error;
pub mod inventory_repo;
pub mod job_repo;
pub mod logistics_repo;
pub mod order_repo;
pub mod settlement_repo;

// 重导出核心仓储
pub use customs_repo::CustomsRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use inventory_repo::InventoryRepository;
pub use job_repo::{JobQueueStats, JobRepository};
pub use logistics_repo::LogisticsRepository;
pub use order_repo::OrderRepository;
pub use settlement_repo::SettlementRepository;
