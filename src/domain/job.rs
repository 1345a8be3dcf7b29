// ==========================================
// 跨境供应链协同平台 - 任务领域模型
// ==========================================
// 职责: 异步任务的实体定义与生命周期约束
// 对齐: schema jobs 表
// ==========================================

use crate::domain::types::{JobStatus, JobType};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Job - 异步任务
// ==========================================
// 生命周期: 外部生产者入队(pending) → 轮询器认领(processing)
//           → 调度器执行后落终态(done/failed)
// 红线: 终态不回退, 失败不自动重试
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,                     // 任务 ID (UUID)
    pub job_type: JobType,              // 任务类型
    pub payload: String,                // 载荷 (JSON 文本, 按类型解释)
    pub status: JobStatus,              // 当前状态
    pub error_message: Option<String>,  // 失败原因 (仅 failed 时写入)
    pub created_at: String,             // 入队时间 (RFC3339)
    pub updated_at: String,             // 最后状态变更时间 (RFC3339)
}

impl Job {
    /// 创建一个待处理任务
    pub fn new(job_type: JobType, payload: serde_json::Value) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            job_type,
            payload: payload.to_string(),
            status: JobStatus::Pending,
            error_message: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
