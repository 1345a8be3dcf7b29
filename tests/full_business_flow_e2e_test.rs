// ==========================================
// 业务全链路端到端测试
// ==========================================
// 职责: 经 AppState 装配完整系统, 走通
//       申报 → 通关 → 物流 → 结算 → 库存联动 → 合规评分 的完整链路
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod full_business_flow_e2e_test {
    use chrono::Utc;
    use crossborder_scm::app::AppState;
    use crossborder_scm::config::config_manager::config_keys;
    use crossborder_scm::domain::logistics::Logistics;
    use crossborder_scm::domain::order::Order;
    use crossborder_scm::domain::types::{JobStatus, LogisticsStatus, OrderCategory};
    use serde_json::json;

    use crate::test_helpers::create_test_db;

    /// 同步驱动轮询周期直到队列清空
    async fn drain_queue(state: &AppState) {
        while state.worker.run_once().await.unwrap().is_some() {}
    }

    #[tokio::test]
    async fn test_full_business_flow() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let state = AppState::new(db_path).unwrap();

        // ==========================================
        // 1. 种子数据: 家电订单 (CIF) + 在途运单
        // ==========================================
        state
            .order_repo
            .upsert(&Order {
                id: "ORD-E2E".to_string(),
                order_number: "ORD-2026-0828".to_string(),
                enterprise: "广州優品家电".to_string(),
                category: OrderCategory::parse("appliance"),
                status: "processing".to_string(),
                amount: 58000.0,
                currency: "USD".to_string(),
                incoterms: "CIF".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .unwrap();
        state
            .logistics_repo
            .upsert(&Logistics {
                id: "LG-1".to_string(),
                tracking_no: "TRK-E2E".to_string(),
                origin: "广州".to_string(),
                destination: "洛杉矶".to_string(),
                status: LogisticsStatus::Transit,
                estimated_time: 120,
                actual_time: 0,
                efficiency: 92,
                order_id: Some("ORD-E2E".to_string()),
            })
            .unwrap();

        // 初始评分: 结算未完成 (-3)
        let score = state.risk_api.score("ORD-E2E").unwrap();
        assert_eq!(score.compliance, 92);
        assert_eq!(
            score.messages,
            vec!["家电建议在结算完成后安排发运".to_string()]
        );

        // ==========================================
        // 2. 提交全部四类任务并驱动轮询处理
        // ==========================================
        state
            .job_api
            .submit(
                "customs_declare",
                json!({
                    "header": {
                        "id": "HD-E2E",
                        "declarationNo": "DEC-E2E",
                        "orderId": "ORD-E2E"
                    },
                    "items": [{
                        "id": "IT-E2E",
                        "lineNo": 1,
                        "hsCode": "8418.10.20",
                        "originCountry": "CN",
                        "spec": "500L"
                    }]
                }),
            )
            .unwrap();
        state
            .job_api
            .submit("customs_progress", json!({"header_id": "HD-E2E"}))
            .unwrap();
        state
            .job_api
            .submit("settlement_complete", json!({"order_id": "ORD-E2E", "time": 18}))
            .unwrap();
        state
            .job_api
            .submit("logistics_milestone", json!({"id": "LG-1"}))
            .unwrap();

        drain_queue(&state).await;

        // ==========================================
        // 3. 校验各域落库结果
        // ==========================================
        let header = state.customs_repo.find_header("HD-E2E").unwrap().unwrap();
        assert_eq!(header.status, "cleared");
        assert_eq!(header.order_id.as_deref(), Some("ORD-E2E"));
        assert_eq!(state.customs_repo.find_items_by_order("ORD-E2E").unwrap().len(), 1);

        let settlement = state.settlement_repo.find_by_order("ORD-E2E").unwrap().unwrap();
        assert_eq!(settlement.id, "SORD-E2E");
        assert_eq!(settlement.settlement_time, 18);
        assert!(settlement.status.is_completed());

        let logistics = state.logistics_repo.find_by_id("LG-1").unwrap().unwrap();
        assert_eq!(logistics.status, LogisticsStatus::Completed);

        // 物流完成联动: 家电品类入库到机械设备
        let inventory = state
            .inventory_repo
            .find_by_name("机械设备")
            .unwrap()
            .unwrap();
        assert_eq!(inventory.current, 10);

        // ==========================================
        // 4. 终局评分: 结算完成后专项扣分消失
        // ==========================================
        let score = state.risk_api.score("ORD-E2E").unwrap();
        assert_eq!(score.compliance, 95);
        assert!(score.messages.is_empty());

        let stats = state.job_api.stats().unwrap();
        assert_eq!(stats.done, 4);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.total, 4);
    }

    #[tokio::test]
    async fn test_failed_job_is_isolated_and_observable() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let state = AppState::new(db_path).unwrap();

        let bad = state
            .job_api
            .submit("settlement_complete", json!({"time": 6}))
            .unwrap();
        let good = state
            .job_api
            .submit("settlement_complete", json!({"order_id": "ORD-OK"}))
            .unwrap();

        drain_queue(&state).await;

        // 失败任务带原因, 不影响后续任务
        let bad_view = state.job_api.get(&bad.id).unwrap().unwrap();
        assert_eq!(bad_view.status, JobStatus::Failed.as_str());
        let good_view = state.job_api.get(&good.id).unwrap().unwrap();
        assert_eq!(good_view.status, JobStatus::Done.as_str());

        assert!(state
            .settlement_repo
            .find_by_order("ORD-OK")
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_poll_interval_config_applies_on_startup() {
        let (_temp_file, db_path) = create_test_db().unwrap();

        // 启动前写入配置, 装配时生效
        {
            let cm = crossborder_scm::config::config_manager::ConfigManager::new(&db_path).unwrap();
            cm.set_global_config_value(config_keys::WORKER_POLL_INTERVAL_MS, "20")
                .unwrap();
        }

        let state = AppState::new(db_path).unwrap();
        assert_eq!(
            state
                .config_manager
                .get_worker_poll_interval_ms()
                .unwrap(),
            20
        );

        // 轮询循环在该间隔下正常走完一个任务
        state
            .job_api
            .submit("settlement_complete", json!({"order_id": "ORD-CFG"}))
            .unwrap();

        let worker = state.worker.clone();
        let handle = tokio::spawn(async move { worker.run().await });

        let mut completed = false;
        for _ in 0..100 {
            if state
                .settlement_repo
                .find_by_order("ORD-CFG")
                .unwrap()
                .map(|s| s.status.is_completed())
                .unwrap_or(false)
            {
                completed = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(completed, "任务未在配置的轮询间隔下完成");

        state.worker.shutdown();
        handle.await.unwrap();
    }
}
