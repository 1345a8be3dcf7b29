// ==========================================
// 跨境供应链协同平台 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分模块外键开启/部分不开启”
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表语句集中在 init_schema，所有入口共用
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化业务库表（幂等，可重复执行）
///
/// 说明：
/// - 任务表 jobs 是轮询处理的唯一事实来源，status + created_at 建复合索引供认领查询
/// - 业务表均以 TEXT 主键存储外部生成的 ID
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS jobs (
            id            TEXT PRIMARY KEY,
            type          TEXT NOT NULL,
            payload       TEXT NOT NULL DEFAULT '{}',
            status        TEXT NOT NULL DEFAULT 'pending',
            error_message TEXT,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_jobs_status_created ON jobs(status, created_at);

        CREATE TABLE IF NOT EXISTS orders (
            id           TEXT PRIMARY KEY,
            order_number TEXT NOT NULL DEFAULT '',
            enterprise   TEXT NOT NULL DEFAULT '',
            category     TEXT NOT NULL DEFAULT '',
            status       TEXT NOT NULL DEFAULT '',
            amount       REAL NOT NULL DEFAULT 0.0,
            currency     TEXT NOT NULL DEFAULT 'CNY',
            incoterms    TEXT NOT NULL DEFAULT '',
            created_at   TEXT NOT NULL,
            updated_at   TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_orders_number ON orders(order_number);
        CREATE INDEX IF NOT EXISTS idx_orders_enterprise ON orders(enterprise);
        CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status);

        CREATE TABLE IF NOT EXISTS settlements (
            id              TEXT PRIMARY KEY,
            order_id        TEXT NOT NULL DEFAULT '',
            status          TEXT NOT NULL DEFAULT 'pending',
            settlement_time INTEGER NOT NULL DEFAULT 0,
            risk_level      TEXT NOT NULL DEFAULT 'low'
        );
        CREATE INDEX IF NOT EXISTS idx_settlements_order ON settlements(order_id);
        CREATE INDEX IF NOT EXISTS idx_settlements_status ON settlements(status);

        CREATE TABLE IF NOT EXISTS logistics (
            id             TEXT PRIMARY KEY,
            tracking_no    TEXT NOT NULL DEFAULT '',
            origin         TEXT NOT NULL DEFAULT '',
            destination    TEXT NOT NULL DEFAULT '',
            status         TEXT NOT NULL DEFAULT '',
            estimated_time INTEGER NOT NULL DEFAULT 0,
            actual_time    INTEGER NOT NULL DEFAULT 0,
            efficiency     INTEGER NOT NULL DEFAULT 0,
            order_id       TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_logistics_tracking ON logistics(tracking_no);
        CREATE INDEX IF NOT EXISTS idx_logistics_status ON logistics(status);
        CREATE INDEX IF NOT EXISTS idx_logistics_order ON logistics(order_id);

        CREATE TABLE IF NOT EXISTS customs_headers (
            id             TEXT PRIMARY KEY,
            declaration_no TEXT NOT NULL DEFAULT '',
            enterprise     TEXT NOT NULL DEFAULT '',
            port_code      TEXT NOT NULL DEFAULT '',
            trade_mode     TEXT NOT NULL DEFAULT '',
            currency       TEXT NOT NULL DEFAULT '',
            total_value    REAL NOT NULL DEFAULT 0.0,
            status         TEXT NOT NULL DEFAULT '',
            declare_date   TEXT,
            order_id       TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_customs_headers_no ON customs_headers(declaration_no);
        CREATE INDEX IF NOT EXISTS idx_customs_headers_order ON customs_headers(order_id);

        CREATE TABLE IF NOT EXISTS customs_items (
            id             TEXT PRIMARY KEY,
            header_id      TEXT NOT NULL REFERENCES customs_headers(id),
            line_no        INTEGER NOT NULL DEFAULT 0,
            hs_code        TEXT NOT NULL DEFAULT '',
            name           TEXT NOT NULL DEFAULT '',
            spec           TEXT NOT NULL DEFAULT '',
            unit           TEXT NOT NULL DEFAULT '',
            qty            REAL NOT NULL DEFAULT 0.0,
            unit_price     REAL NOT NULL DEFAULT 0.0,
            amount         REAL NOT NULL DEFAULT 0.0,
            origin_country TEXT NOT NULL DEFAULT '',
            tax_rate       REAL NOT NULL DEFAULT 0.0,
            tariff         REAL NOT NULL DEFAULT 0.0,
            excise         REAL NOT NULL DEFAULT 0.0,
            vat            REAL NOT NULL DEFAULT 0.0
        );
        CREATE INDEX IF NOT EXISTS idx_customs_items_header ON customs_items(header_id);
        CREATE INDEX IF NOT EXISTS idx_customs_items_hs ON customs_items(hs_code);

        CREATE TABLE IF NOT EXISTS inventory (
            name       TEXT PRIMARY KEY,
            current    INTEGER NOT NULL DEFAULT 0,
            target     INTEGER NOT NULL DEFAULT 0,
            production INTEGER NOT NULL DEFAULT 0,
            sales      INTEGER NOT NULL DEFAULT 0,
            efficiency INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id   TEXT NOT NULL,
            key        TEXT NOT NULL,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (scope_id, key)
        );
        ",
    )?;
    Ok(())
}
