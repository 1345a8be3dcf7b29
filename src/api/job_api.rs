// ==========================================
// 跨境供应链协同平台 - 任务 API
// ==========================================
// 职责: 任务提交与状态查询, 供 (外部) HTTP 层调用
// 约定: 提交时不校验任务类型 —— 未识别类型入队后按空操作完成,
//       这是刻意的兜底语义而非遗漏
// ==========================================

use crate::api::error::ApiResult;
use crate::domain::job::Job;
use crate::domain::types::{JobStatus, JobType};
use crate::repository::job_repo::{JobQueueStats, JobRepository};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// 状态查询单次返回的行数上限
pub const MAX_JOB_LIST_LIMIT: usize = 100;

// ==========================================
// SubmitReceipt - 提交回执
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct SubmitReceipt {
    pub id: String,
}

// ==========================================
// JobView - 任务状态视图
// ==========================================
/// 前端消费的任务行, 字段名为固定线上格式
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub id: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub status: String,
    pub payload: serde_json::Value,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl JobView {
    fn from_job(job: Job) -> Self {
        // 载荷入队时即为合法 JSON 文本, 解析失败兜底为 null
        let payload = serde_json::from_str(&job.payload).unwrap_or(serde_json::Value::Null);
        Self {
            id: job.id,
            job_type: job.job_type.as_str().to_string(),
            status: job.status.as_str().to_string(),
            payload,
            created_at: job.created_at,
        }
    }
}

// ==========================================
// JobApi - 任务 API
// ==========================================
pub struct JobApi {
    job_repo: Arc<JobRepository>,
}

impl JobApi {
    /// 创建新的 JobApi 实例
    pub fn new(job_repo: Arc<JobRepository>) -> Self {
        Self { job_repo }
    }

    /// 提交任务
    ///
    /// # 参数
    /// - job_type: 任务类型, 原样接受, 不做枚举校验
    /// - payload: 任务载荷文档
    ///
    /// # 返回
    /// - Ok(SubmitReceipt): 含新任务 ID; 处理结果只能经状态查询异步观察
    pub fn submit(&self, job_type: &str, payload: serde_json::Value) -> ApiResult<SubmitReceipt> {
        let id = self.job_repo.enqueue(JobType::parse(job_type), payload)?;
        Ok(SubmitReceipt { id })
    }

    /// 查询最近任务 (入队时间倒序, 最多 100 条)
    ///
    /// # 参数
    /// - status: 可选状态过滤; 未识别的状态值不命中任何行
    pub fn list(&self, status: Option<&str>) -> ApiResult<Vec<JobView>> {
        let filter = match status {
            None => None,
            Some(s) => match s {
                "pending" => Some(JobStatus::Pending),
                "processing" => Some(JobStatus::Processing),
                "done" => Some(JobStatus::Done),
                "failed" => Some(JobStatus::Failed),
                other => {
                    debug!("状态过滤值未识别, 返回空列表: status={}", other);
                    return Ok(Vec::new());
                }
            },
        };

        let jobs = self.job_repo.list_recent(filter, MAX_JOB_LIST_LIMIT)?;
        Ok(jobs.into_iter().map(JobView::from_job).collect())
    }

    /// 按 ID 查询单个任务
    pub fn get(&self, id: &str) -> ApiResult<Option<JobView>> {
        let job = self.job_repo.find_by_id(id)?;
        Ok(job.map(JobView::from_job))
    }

    /// 队列统计
    pub fn stats(&self) -> ApiResult<JobQueueStats> {
        Ok(self.job_repo.queue_stats()?)
    }
}
