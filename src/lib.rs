// ==========================================
// 跨境供应链协同平台 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + Tokio
// 系统定位: 后台协同服务 (任务队列 + 合规评分),
//           HTTP/CRUD 外层作为外部协作方接入
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 任务子系统 - 调度器与轮询器
pub mod jobs;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施 (连接初始化/PRAGMA 统一/schema)
pub mod db;

// 日志系统
pub mod logging;

// SQL 性能观测
pub mod perf;

// API 层 - 业务接口
pub mod api;

// 应用层 - 服务装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    JobStatus, JobType, LogisticsStatus, OrderCategory, RiskLevel, SettlementStatus,
};

// 领域实体
pub use domain::{CustomsHeader, CustomsItem, Inventory, Job, Logistics, Order, Settlement};

// 引擎
pub use engine::{ComplianceScore, ComplianceSnapshot, RiskEngine};

// 任务子系统
pub use jobs::{JobDispatcher, JobWorker};

// API
pub use api::{JobApi, RiskApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "跨境供应链协同平台";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

// ==========================================
// 预编译检查
// ==========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
