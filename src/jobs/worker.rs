// ==========================================
// 跨境供应链协同平台 - 任务轮询器
// ==========================================
// 职责: 单消费者轮询循环, 每周期最多认领并处理一个任务
// 约束:
// - 认领 + 处理全程持有同一把互斥锁, 任意时刻只有一个周期在处理任务
// - 每周期结束后固定休眠一个轮询间隔, 处理完任务也不立即补拉
// - 处理器错误不会终止循环, 仅记录日志后继续轮询
// ==========================================

use crate::domain::types::JobStatus;
use crate::jobs::dispatcher::JobDispatcher;
use crate::repository::error::RepositoryResult;
use crate::repository::job_repo::JobRepository;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info};

/// 默认轮询间隔 (毫秒), 可经 config_kv 的 worker/poll_interval_ms 覆写
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

// ==========================================
// JobWorker - 任务轮询器
// ==========================================
pub struct JobWorker {
    job_repo: Arc<JobRepository>,
    dispatcher: Arc<JobDispatcher>,
    poll_interval: Duration,
    // 认领 + 处理的进程级临界区
    cycle_lock: AsyncMutex<()>,
    stop_flag: AtomicBool,
}

impl JobWorker {
    /// 创建新的 JobWorker 实例
    pub fn new(
        job_repo: Arc<JobRepository>,
        dispatcher: Arc<JobDispatcher>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            job_repo,
            dispatcher,
            poll_interval,
            cycle_lock: AsyncMutex::new(()),
            stop_flag: AtomicBool::new(false),
        }
    }

    /// 请求停止轮询 (当前周期处理完后退出)
    pub fn shutdown(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// 是否已请求停止
    pub fn is_shutting_down(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }

    /// 轮询主循环: 直到 shutdown 被调用前持续运行
    ///
    /// 每周期: 认领最早的待处理任务并同步处理完毕, 随后无条件休眠
    /// 一个轮询间隔 (无论本周期是否认领到任务)
    pub async fn run(&self) {
        info!(
            "任务轮询已启动: poll_interval_ms={}",
            self.poll_interval.as_millis()
        );

        while !self.is_shutting_down() {
            if let Err(e) = self.run_once().await {
                // 存储层故障也不终止循环, 等待下一周期重试
                error!("任务轮询周期出错: {}", e);
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        info!("任务轮询已停止");
    }

    /// 执行一个轮询周期: 锁内认领并处理至多一个任务
    ///
    /// # 返回
    /// - Ok(Some(status)): 本周期处理了一个任务, 返回其终态
    /// - Ok(None): 无待处理任务
    pub async fn run_once(&self) -> RepositoryResult<Option<JobStatus>> {
        let _guard = self.cycle_lock.lock().await;

        let job = match self.job_repo.claim_next()? {
            Some(job) => job,
            None => {
                debug!("队列为空, 本周期跳过");
                return Ok(None);
            }
        };

        let started = Instant::now();
        let status = self.dispatcher.process(&job)?;
        info!(
            "任务周期完成: id={}, type={}, status={}, elapsed_ms={}",
            job.id,
            job.job_type,
            status,
            started.elapsed().as_millis()
        );
        Ok(Some(status))
    }
}
