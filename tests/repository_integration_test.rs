// ==========================================
// 仓储层集成测试
// ==========================================
// 职责: 在真实数据库文件上验证各实体仓储的 CRUD 与关联查询
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod repository_integration_test {
    use chrono::Utc;
    use crossborder_scm::domain::customs::{CustomsHeader, CustomsItem};
    use crossborder_scm::domain::logistics::Logistics;
    use crossborder_scm::domain::order::Order;
    use crossborder_scm::domain::settlement::Settlement;
    use crossborder_scm::domain::types::{
        LogisticsStatus, OrderCategory, RiskLevel, SettlementStatus,
    };
    use crossborder_scm::repository::{
        CustomsRepository, InventoryRepository, LogisticsRepository, OrderRepository,
        SettlementRepository,
    };

    use crate::test_helpers::create_test_db;

    fn sample_order(id: &str, category: &str) -> Order {
        Order {
            id: id.to_string(),
            order_number: format!("ORD-{}", id),
            enterprise: "深圳市远贸科技".to_string(),
            category: OrderCategory::parse(category),
            status: "processing".to_string(),
            amount: 25000.0,
            currency: "USD".to_string(),
            incoterms: "CIF".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_order_crud_across_connections() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let writer = OrderRepository::new(&db_path).unwrap();
        let reader = OrderRepository::new(&db_path).unwrap();

        let mut order = sample_order("O1", "electronics");
        writer.upsert(&order).unwrap();
        writer.upsert(&sample_order("O2", "textile")).unwrap();

        let found = reader.find_by_id("O1").unwrap().unwrap();
        assert_eq!(found.category, OrderCategory::Electronics);
        assert_eq!(found.incoterms, "CIF");

        // upsert 更新既有行
        order.status = "shipped".to_string();
        writer.upsert(&order).unwrap();
        assert_eq!(
            reader.find_by_id("O1").unwrap().unwrap().status,
            "shipped"
        );

        assert_eq!(reader.count("", None, None).unwrap(), 2);
        assert_eq!(reader.count("", None, Some("textile")).unwrap(), 1);
        assert_eq!(reader.list("远贸", None, None, 0, 10).unwrap().len(), 2);
        assert_eq!(reader.list("", Some("shipped"), None, 0, 10).unwrap().len(), 1);

        assert_eq!(writer.delete("O2").unwrap(), 1);
        assert!(reader.find_by_id("O2").unwrap().is_none());
    }

    #[test]
    fn test_settlement_find_by_order() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let repo = SettlementRepository::new(&db_path).unwrap();

        let settlement = Settlement {
            id: "SETT-1".to_string(),
            order_id: "O1".to_string(),
            status: SettlementStatus::Processing,
            settlement_time: 12,
            risk_level: RiskLevel::Medium,
        };
        repo.upsert(&settlement).unwrap();

        let found = repo.find_by_order("O1").unwrap().unwrap();
        assert_eq!(found.id, "SETT-1");
        assert_eq!(found.status, SettlementStatus::Processing);
        assert_eq!(found.risk_level, RiskLevel::Medium);

        assert!(repo.find_by_order("O9").unwrap().is_none());
        assert_eq!(repo.count("", Some("processing")).unwrap(), 1);
    }

    fn sample_logistics(id: &str, order_id: &str, status: LogisticsStatus) -> Logistics {
        Logistics {
            id: id.to_string(),
            tracking_no: format!("TRK-{}", id),
            origin: "宁波".to_string(),
            destination: "汉堡".to_string(),
            status,
            estimated_time: 96,
            actual_time: 0,
            efficiency: 88,
            order_id: Some(order_id.to_string()),
        }
    }

    #[test]
    fn test_logistics_latest_by_order_prefers_highest_id() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let repo = LogisticsRepository::new(&db_path).unwrap();

        repo.upsert(&sample_logistics("L1", "O1", LogisticsStatus::Completed))
            .unwrap();
        repo.upsert(&sample_logistics("L2", "O1", LogisticsStatus::Transit))
            .unwrap();
        repo.upsert(&sample_logistics("L3", "O2", LogisticsStatus::Pickup))
            .unwrap();

        let latest = repo.find_latest_by_order("O1").unwrap().unwrap();
        assert_eq!(latest.id, "L2");
        assert_eq!(latest.status, LogisticsStatus::Transit);

        assert!(repo.find_latest_by_order("O9").unwrap().is_none());
        assert_eq!(repo.count("", Some("pickup")).unwrap(), 1);
    }

    fn sample_header(id: &str, order_id: &str) -> CustomsHeader {
        CustomsHeader {
            id: id.to_string(),
            declaration_no: format!("DEC-{}", id),
            enterprise: "深圳市远贸科技".to_string(),
            port_code: "5100".to_string(),
            trade_mode: "0110".to_string(),
            currency: "USD".to_string(),
            total_value: 8600.0,
            status: "declared".to_string(),
            declare_date: None,
            order_id: Some(order_id.to_string()),
        }
    }

    fn sample_item(id: &str, header_id: &str, line_no: i64) -> CustomsItem {
        CustomsItem {
            id: id.to_string(),
            header_id: header_id.to_string(),
            line_no,
            hs_code: "8528.72.00".to_string(),
            name: "液晶显示器".to_string(),
            spec: "27寸".to_string(),
            unit: "PCS".to_string(),
            qty: 100.0,
            unit_price: 86.0,
            amount: 8600.0,
            origin_country: "CN".to_string(),
            tax_rate: 0.13,
            tariff: 0.0,
            excise: 0.0,
            vat: 0.0,
        }
    }

    #[test]
    fn test_customs_items_by_order_joins_headers() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let repo = CustomsRepository::new(&db_path).unwrap();

        repo.upsert_header(&sample_header("H1", "O1")).unwrap();
        repo.upsert_header(&sample_header("H2", "O1")).unwrap();
        repo.upsert_header(&sample_header("H3", "O2")).unwrap();
        repo.upsert_item(&sample_item("I1", "H1", 2)).unwrap();
        repo.upsert_item(&sample_item("I2", "H1", 1)).unwrap();
        repo.upsert_item(&sample_item("I3", "H2", 1)).unwrap();
        repo.upsert_item(&sample_item("I4", "H3", 1)).unwrap();

        // 经表头 order_id 关联, 按表头 + 行号排序
        let items = repo.find_items_by_order("O1").unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].id, "I2");
        assert_eq!(items[1].id, "I1");
        assert_eq!(items[2].id, "I3");

        let header = repo.find_header("H1").unwrap().unwrap();
        assert_eq!(header.declaration_no, "DEC-H1");
        assert_eq!(repo.find_items_by_header("H1").unwrap().len(), 2);

        assert_eq!(repo.delete_item("I1").unwrap(), 1);
        assert_eq!(repo.find_items_by_order("O1").unwrap().len(), 2);
    }

    #[test]
    fn test_inventory_add_stock_cross_connection() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let repo = InventoryRepository::new(&db_path).unwrap();

        // 首次入库懒创建, 带默认字段
        let inv = repo.add_stock("电子产品", 10).unwrap();
        assert_eq!(inv.current, 10);
        assert_eq!(inv.target, 1000);
        assert_eq!(inv.efficiency, 90);

        let inv = repo.add_stock("电子产品", 10).unwrap();
        assert_eq!(inv.current, 20);

        let other = InventoryRepository::new(&db_path).unwrap();
        let found = other.find_by_name("电子产品").unwrap().unwrap();
        assert_eq!(found.current, 20);
        assert_eq!(other.list().unwrap().len(), 1);
    }
}
