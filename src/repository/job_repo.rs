// ==========================================
// 跨境供应链协同平台 - 任务队列仓储
// ==========================================
// 职责: jobs 表的入队/认领/终态流转
// 状态机: pending → processing → done/failed, 以 SQL 守卫表达,
//         认领与终态更新均带状态前置条件, 并发下不会重复认领
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::job::Job;
use crate::domain::types::{JobStatus, JobType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

// ==========================================
// JobQueueStats - 队列统计
// ==========================================
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobQueueStats {
    pub pending: i64,
    pub processing: i64,
    pub done: i64,
    pub failed: i64,
    pub total: i64,
}

// ==========================================
// JobRepository - 任务队列仓储
// ==========================================
/// 任务队列仓储
/// 职责: 管理 jobs 表的入队、认领与终态流转
/// 红线: 不含任务载荷的业务解释, 载荷按原文存取
pub struct JobRepository {
    conn: Arc<Mutex<Connection>>,
}

impl JobRepository {
    /// 创建新的 JobRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 任务入队
    ///
    /// # 参数
    /// - job_type: 任务类型, 未识别类型照常入队 (调度时按空操作完成)
    /// - payload: 任务载荷, 序列化为 JSON 文本存储
    ///
    /// # 返回
    /// - Ok(String): 新任务 ID
    pub fn enqueue(&self, job_type: JobType, payload: serde_json::Value) -> RepositoryResult<String> {
        let job = Job::new(job_type, payload);
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO jobs (id, type, payload, status, error_message, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                job.id,
                job.job_type.as_str(),
                job.payload,
                job.status.as_str(),
                job.error_message,
                job.created_at,
                job.updated_at,
            ],
        )?;

        info!("任务已入队: id={}, type={}", job.id, job.job_type);
        Ok(job.id)
    }

    /// 认领最早的待处理任务
    ///
    /// # 返回
    /// - Ok(Some(Job)): 认领成功, 任务已置为 processing
    /// - Ok(None): 无待处理任务, 或候选任务已被其他认领者拿走
    ///
    /// # 说明
    /// - 在单个事务内完成「选最旧 + 守卫更新」, 更新条件带 status='pending',
    ///   受影响行数为 0 说明竞争失败, 不会出现同一任务被认领两次
    /// - 排序键: created_at, rowid 兜底保证同时刻入队仍按插入序
    pub fn claim_next(&self) -> RepositoryResult<Option<Job>> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let candidate = {
            let mut stmt = tx.prepare(
                r#"
                SELECT id, type, payload, status, error_message, created_at, updated_at
                FROM jobs
                WHERE status = 'pending'
                ORDER BY created_at ASC, rowid ASC
                LIMIT 1
                "#,
            )?;
            stmt.query_row([], map_job_row).optional()?
        };

        let mut job = match candidate {
            Some(job) => job,
            None => return Ok(None),
        };

        let now = Utc::now().to_rfc3339();
        let changed = tx.execute(
            "UPDATE jobs SET status = 'processing', updated_at = ?1 WHERE id = ?2 AND status = 'pending'",
            params![now, job.id],
        )?;
        if changed == 0 {
            // 候选已被并发认领者抢走
            return Ok(None);
        }
        tx.commit()?;

        job.status = JobStatus::Processing;
        job.updated_at = now;
        debug!("任务已认领: id={}, type={}", job.id, job.job_type);
        Ok(Some(job))
    }

    /// 将处理中的任务标记为完成
    ///
    /// # 返回
    /// - Ok(true): 状态已从 processing 变更为 done
    /// - Ok(false): 任务不存在或不处于 processing (终态不回退)
    pub fn mark_done(&self, job_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE jobs SET status = 'done', updated_at = ?1 WHERE id = ?2 AND status = 'processing'",
            params![Utc::now().to_rfc3339(), job_id],
        )?;
        Ok(changed > 0)
    }

    /// 将处理中的任务标记为失败并记录原因
    ///
    /// # 返回
    /// - Ok(true): 状态已从 processing 变更为 failed
    /// - Ok(false): 任务不存在或不处于 processing (终态不回退)
    pub fn mark_failed(&self, job_id: &str, reason: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"
            UPDATE jobs
            SET status = 'failed', error_message = ?1, updated_at = ?2
            WHERE id = ?3 AND status = 'processing'
            "#,
            params![reason, Utc::now().to_rfc3339(), job_id],
        )?;
        Ok(changed > 0)
    }

    /// 按 ID 查询任务
    pub fn find_by_id(&self, job_id: &str) -> RepositoryResult<Option<Job>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, type, payload, status, error_message, created_at, updated_at
            FROM jobs
            WHERE id = ?1
            "#,
        )?;

        let result = stmt.query_row(params![job_id], map_job_row);
        match result {
            Ok(job) => Ok(Some(job)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询最近入队的任务 (入队时间倒序)
    ///
    /// # 参数
    /// - status: 按状态过滤, None 表示全部
    /// - limit: 返回条数上限
    pub fn list_recent(
        &self,
        status: Option<JobStatus>,
        limit: usize,
    ) -> RepositoryResult<Vec<Job>> {
        let conn = self.get_conn()?;
        let jobs = match status {
            Some(status) => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, type, payload, status, error_message, created_at, updated_at
                    FROM jobs
                    WHERE status = ?1
                    ORDER BY created_at DESC
                    LIMIT ?2
                    "#,
                )?;
                let rows = stmt
                    .query_map(params![status.as_str(), limit as i64], map_job_row)?
                    .collect::<SqliteResult<Vec<_>>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, type, payload, status, error_message, created_at, updated_at
                    FROM jobs
                    ORDER BY created_at DESC
                    LIMIT ?1
                    "#,
                )?;
                let rows = stmt
                    .query_map(params![limit as i64], map_job_row)?
                    .collect::<SqliteResult<Vec<_>>>()?;
                rows
            }
        };
        Ok(jobs)
    }

    /// 队列统计
    pub fn queue_stats(&self) -> RepositoryResult<JobQueueStats> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM jobs GROUP BY status")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        // 未识别的状态值归入 failed 口径, 因此统一累加
        let mut stats = JobQueueStats::default();
        for (status, count) in rows {
            match JobStatus::from_str(&status) {
                JobStatus::Pending => stats.pending += count,
                JobStatus::Processing => stats.processing += count,
                JobStatus::Done => stats.done += count,
                JobStatus::Failed => stats.failed += count,
            }
            stats.total += count;
        }
        Ok(stats)
    }
}

/// 行映射: jobs 表 → Job
fn map_job_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Job> {
    Ok(Job {
        id: row.get(0)?,
        job_type: JobType::parse(&row.get::<_, String>(1)?),
        payload: row.get(2)?,
        status: JobStatus::from_str(&row.get::<_, String>(3)?),
        error_message: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
