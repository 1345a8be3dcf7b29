// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、固定数据写入等功能
// ==========================================

use rusqlite::{params, Connection};
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件 (需要保持存活)
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    // 测试日志只会初始化一次, 重复调用是空操作
    crossborder_scm::logging::init_test();

    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = crossborder_scm::db::open_sqlite_connection(&db_path)?;
    crossborder_scm::db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开一条已应用统一 PRAGMA 的连接
pub fn open_conn(db_path: &str) -> Connection {
    crossborder_scm::db::open_sqlite_connection(db_path).unwrap()
}

// ==========================================
// 固定数据写入 (直接 SQL, 不经仓储)
// ==========================================

/// 写入一条订单
pub fn insert_order(conn: &Connection, id: &str, category: &str, incoterms: &str) {
    conn.execute(
        r#"
        INSERT INTO orders (id, order_number, enterprise, category, status,
                            amount, currency, incoterms, created_at, updated_at)
        VALUES (?1, ?2, '测试企业', ?3, 'processing',
                10000.0, 'USD', ?4, datetime('now'), datetime('now'))
        "#,
        params![id, format!("ORD-{}", id), category, incoterms],
    )
    .unwrap();
}

/// 写入一条运单
pub fn insert_logistics(
    conn: &Connection,
    id: &str,
    status: &str,
    order_id: Option<&str>,
    efficiency: i64,
) {
    conn.execute(
        r#"
        INSERT INTO logistics (id, tracking_no, origin, destination, status,
                               estimated_time, actual_time, efficiency, order_id)
        VALUES (?1, ?2, '深圳', '鹿特丹', ?3, 72, 0, ?4, ?5)
        "#,
        params![id, format!("TRK-{}", id), status, efficiency, order_id],
    )
    .unwrap();
}

/// 写入一条报关单表头
pub fn insert_customs_header(conn: &Connection, id: &str, order_id: Option<&str>) {
    conn.execute(
        r#"
        INSERT INTO customs_headers (id, declaration_no, enterprise, port_code, trade_mode,
                                     currency, total_value, status, declare_date, order_id)
        VALUES (?1, ?2, '测试企业', '5100', '0110', 'USD', 0.0, 'declared', NULL, ?3)
        "#,
        params![id, format!("DEC-{}", id), order_id],
    )
    .unwrap();
}

/// 写入一条报关明细
pub fn insert_customs_item(
    conn: &Connection,
    id: &str,
    header_id: &str,
    hs_code: &str,
    origin_country: &str,
    spec: &str,
) {
    conn.execute(
        r#"
        INSERT INTO customs_items (id, header_id, line_no, hs_code, name, spec, unit,
                                   qty, unit_price, amount, origin_country, tax_rate,
                                   tariff, excise, vat)
        VALUES (?1, ?2, 1, ?3, '商品', ?4, 'PCS', 10.0, 5.0, 50.0, ?5, 0.13, 0.0, 0.0, 0.0)
        "#,
        params![id, header_id, hs_code, spec, origin_country],
    )
    .unwrap();
}

/// 写入一条结算单
pub fn insert_settlement(conn: &Connection, id: &str, order_id: &str, status: &str) {
    conn.execute(
        r#"
        INSERT INTO settlements (id, order_id, status, settlement_time, risk_level)
        VALUES (?1, ?2, ?3, 0, 'low')
        "#,
        params![id, order_id, status],
    )
    .unwrap();
}

// ==========================================
// 计数辅助
// ==========================================

/// 统计表行数
pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .unwrap()
}
