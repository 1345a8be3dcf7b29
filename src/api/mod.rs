// ==========================================
// 跨境供应链协同平台 - API 层
// ==========================================
// 职责: 提供业务 API 接口, 供 (外部) HTTP/CRUD 层调用
// ==========================================

pub mod error;
pub mod job_api;
pub mod risk_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use job_api::{JobApi, JobView, SubmitReceipt, MAX_JOB_LIST_LIMIT};
pub use risk_api::RiskApi;
