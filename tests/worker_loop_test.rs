// ==========================================
// 任务轮询器集成测试
// ==========================================
// 职责: 验证轮询循环的端到端处理、失败容错与停止语义
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod worker_loop_test {
    use crossborder_scm::domain::types::{JobStatus, JobType};
    use crossborder_scm::jobs::{JobDispatcher, JobWorker};
    use crossborder_scm::repository::JobRepository;
    use rusqlite::Connection;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::test_helpers::{create_test_db, open_conn};

    fn setup() -> (tempfile::NamedTempFile, Arc<Mutex<Connection>>, Arc<JobRepository>, Arc<JobWorker>)
    {
        let (temp_file, db_path) = create_test_db().unwrap();
        let conn = Arc::new(Mutex::new(open_conn(&db_path)));
        let job_repo = Arc::new(JobRepository::from_connection(conn.clone()));
        let dispatcher = Arc::new(JobDispatcher::new(conn.clone(), job_repo.clone()));
        let worker = Arc::new(JobWorker::new(
            job_repo.clone(),
            dispatcher,
            Duration::from_millis(10),
        ));
        (temp_file, conn, job_repo, worker)
    }

    /// 轮询到任务终态, 最多等待约 2 秒
    async fn wait_for_terminal(job_repo: &JobRepository, id: &str) -> JobStatus {
        for _ in 0..200 {
            let job = job_repo.find_by_id(id).unwrap().unwrap();
            match job.status {
                JobStatus::Done | JobStatus::Failed => return job.status,
                _ => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }
        panic!("任务 {} 未在预期时间内到达终态", id);
    }

    #[tokio::test]
    async fn test_worker_processes_job_end_to_end() {
        let (_temp_file, conn, job_repo, worker) = setup();

        let id = job_repo
            .enqueue(
                JobType::parse("settlement_complete"),
                json!({"order_id": "ORD-W1"}),
            )
            .unwrap();

        let handle = tokio::spawn({
            let worker = worker.clone();
            async move { worker.run().await }
        });

        let status = wait_for_terminal(&job_repo, &id).await;
        assert_eq!(status, JobStatus::Done);

        // 业务落库已发生
        let st: String = {
            let conn = conn.lock().unwrap();
            conn.query_row(
                "SELECT status FROM settlements WHERE order_id = 'ORD-W1'",
                [],
                |row| row.get(0),
            )
            .unwrap()
        };
        assert_eq!(st, "completed");

        worker.shutdown();
        handle.await.unwrap();
    }

    /// 处理器失败不会终止循环, 后续任务照常处理
    #[tokio::test]
    async fn test_worker_survives_failing_job() {
        let (_temp_file, _conn, job_repo, worker) = setup();

        // 第一个任务载荷非法, 必然失败
        let bad = job_repo
            .enqueue(JobType::parse("settlement_complete"), json!({"time": 1}))
            .unwrap();
        let good = job_repo
            .enqueue(
                JobType::parse("settlement_complete"),
                json!({"order_id": "ORD-W2"}),
            )
            .unwrap();

        let handle = tokio::spawn({
            let worker = worker.clone();
            async move { worker.run().await }
        });

        assert_eq!(wait_for_terminal(&job_repo, &bad).await, JobStatus::Failed);
        assert_eq!(wait_for_terminal(&job_repo, &good).await, JobStatus::Done);

        let bad_job = job_repo.find_by_id(&bad).unwrap().unwrap();
        assert!(bad_job.error_message.is_some());

        worker.shutdown();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_run_once_returns_none_on_empty_queue() {
        let (_temp_file, _conn, _job_repo, worker) = setup();
        assert!(worker.run_once().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_shutdown_stops_loop() {
        let (_temp_file, _conn, _job_repo, worker) = setup();

        let handle = tokio::spawn({
            let worker = worker.clone();
            async move { worker.run().await }
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!worker.is_shutting_down());
        worker.shutdown();
        assert!(worker.is_shutting_down());

        // 循环应在一个轮询间隔内退出
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("轮询循环未在 shutdown 后退出")
            .unwrap();
    }
}
