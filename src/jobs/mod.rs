// ==========================================
// 跨境供应链协同平台 - 任务子系统
// ==========================================
// 职责: 任务调度器(按类型分发的处理器)与单消费者轮询器
// 红线: 处理器的全部读写在单事务内完成, 失败只落任务终态不外抛
// ==========================================

pub mod dispatcher;
pub mod worker;

// 重导出核心类型
pub use dispatcher::{DispatchError, JobDispatcher};
pub use worker::{JobWorker, DEFAULT_POLL_INTERVAL_MS};
