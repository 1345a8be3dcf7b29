// ==========================================
// 任务队列集成测试
// ==========================================
// 职责: 验证 jobs 表队列在真实文件库上的状态流转与并发认领互斥
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod job_queue_test {
    use crossborder_scm::domain::types::{JobStatus, JobType};
    use crossborder_scm::repository::JobRepository;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use crate::test_helpers::create_test_db;

    #[test]
    fn test_queue_state_visible_across_connections() {
        let (_temp_file, db_path) = create_test_db().unwrap();

        // 两个仓储实例各持独立连接, 模拟多进程共享同一数据库文件
        let producer = JobRepository::new(&db_path).unwrap();
        let consumer = JobRepository::new(&db_path).unwrap();

        let id = producer
            .enqueue(
                JobType::parse("settlement_complete"),
                json!({"order_id": "O1"}),
            )
            .unwrap();

        let claimed = consumer.claim_next().unwrap().unwrap();
        assert_eq!(claimed.id, id);
        assert_eq!(claimed.status, JobStatus::Processing);

        assert!(consumer.mark_done(&id).unwrap());

        // 生产者侧观察到终态
        let job = producer.find_by_id(&id).unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Done);

        let stats = producer.queue_stats().unwrap();
        assert_eq!(stats.done, 1);
        assert_eq!(stats.total, 1);
    }

    #[test]
    fn test_claim_order_is_fifo_by_creation() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let repo = JobRepository::new(&db_path).unwrap();

        let mut expected = Vec::new();
        for i in 0..5 {
            expected.push(
                repo.enqueue(JobType::parse("customs_progress"), json!({ "n": i }))
                    .unwrap(),
            );
        }

        let mut claimed = Vec::new();
        while let Some(job) = repo.claim_next().unwrap() {
            claimed.push(job.id);
        }
        assert_eq!(claimed, expected);
    }

    /// 互斥性: 并发认领者绝不会拿到同一个任务
    #[test]
    fn test_concurrent_claim_mutual_exclusion() {
        let (_temp_file, db_path) = create_test_db().unwrap();

        const JOB_COUNT: usize = 20;
        const WORKER_COUNT: usize = 4;

        let producer = JobRepository::new(&db_path).unwrap();
        let mut all_ids = HashSet::new();
        for i in 0..JOB_COUNT {
            let id = producer
                .enqueue(JobType::parse("logistics_milestone"), json!({ "n": i }))
                .unwrap();
            all_ids.insert(id);
        }

        let claimed_total = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for _ in 0..WORKER_COUNT {
            let db_path = db_path.clone();
            let claimed_total = claimed_total.clone();
            handles.push(thread::spawn(move || {
                let repo = JobRepository::new(&db_path).unwrap();
                let mut mine = Vec::new();
                let deadline = Instant::now() + Duration::from_secs(5);

                // 认领竞争失败时 claim_next 返回 None, 需持续重试直到全部任务被领走
                while claimed_total.load(Ordering::SeqCst) < JOB_COUNT
                    && Instant::now() < deadline
                {
                    match repo.claim_next().unwrap() {
                        Some(job) => {
                            claimed_total.fetch_add(1, Ordering::SeqCst);
                            mine.push(job.id);
                        }
                        None => thread::sleep(Duration::from_millis(1)),
                    }
                }
                mine
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                // 任何任务都只能被一个认领者拿到
                assert!(seen.insert(id), "同一任务被重复认领");
            }
        }
        assert_eq!(seen, all_ids);
    }
}
