// ==========================================
// 跨境供应链协同平台 - 报关单仓储
// ==========================================
// 职责: 管理 customs_headers / customs_items 两张表
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::customs::{CustomsHeader, CustomsItem};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// CustomsRepository - 报关单仓储
// ==========================================
/// 报关单仓储
/// 职责: 报关单表头与商品明细的 CRUD, 以及按订单关联明细的查询
pub struct CustomsRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CustomsRepository {
    /// 创建新的 CustomsRepository 实例
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

    // ==========================================
    // 表头操作
    // ==========================================

    /// 按 ID 查询报关单表头
    pub fn find_header(&self, id: &str) -> RepositoryResult<Option<CustomsHeader>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, declaration_no, enterprise, port_code, trade_mode,
                   currency, total_value, status, declare_date, order_id
            FROM customs_headers
            WHERE id = ?1
            "#,
        )?;

        let result = stmt.query_row(params![id], map_header_row);
        match result {
            Ok(header) => Ok(Some(header)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 分页查询报关单表头 (申报日期倒序)
    ///
    /// # 参数
    /// - q: 报关单号/企业名模糊匹配, 空串不过滤
    /// - status / port_code / trade_mode: 精确过滤, None 不过滤
    pub fn list_headers(
        &self,
        q: &str,
        status: Option<&str>,
        port_code: Option<&str>,
        trade_mode: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<CustomsHeader>> {
        let conn = self.get_conn()?;
        let (filter_sql, mut args) = build_header_filter(q, status, port_code, trade_mode);

        let sql = format!(
            r#"
            SELECT id, declaration_no, enterprise, port_code, trade_mode,
                   currency, total_value, status, declare_date, order_id
            FROM customs_headers
            {}
            ORDER BY declare_date DESC
            LIMIT ? OFFSET ?
            "#,
            filter_sql
        );
        args.push(Box::new(limit));
        args.push(Box::new(offset));

        let mut stmt = conn.prepare(&sql)?;
        let headers = stmt
            .query_map(params_from_iter(args), map_header_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(headers)
    }

    /// 统计符合过滤条件的表头数
    pub fn count_headers(
        &self,
        q: &str,
        status: Option<&str>,
        port_code: Option<&str>,
        trade_mode: Option<&str>,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let (filter_sql, args) = build_header_filter(q, status, port_code, trade_mode);

        let sql = format!("SELECT COUNT(*) FROM customs_headers {}", filter_sql);
        let mut stmt = conn.prepare(&sql)?;
        let count: i64 = stmt.query_row(params_from_iter(args), |row| row.get(0))?;
        Ok(count)
    }

    /// 插入或更新报关单表头 (按 ID 判断存在性)
    pub fn upsert_header(&self, header: &CustomsHeader) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO customs_headers (
                id, declaration_no, enterprise, port_code, trade_mode,
                currency, total_value, status, declare_date, order_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                declaration_no = excluded.declaration_no,
                enterprise = excluded.enterprise,
                port_code = excluded.port_code,
                trade_mode = excluded.trade_mode,
                currency = excluded.currency,
                total_value = excluded.total_value,
                status = excluded.status,
                declare_date = excluded.declare_date,
                order_id = excluded.order_id
            "#,
            params![
                header.id,
                header.declaration_no,
                header.enterprise,
                header.port_code,
                header.trade_mode,
                header.currency,
                header.total_value,
                header.status,
                header.declare_date.map(|d| d.to_string()),
                header.order_id,
            ],
        )?;
        Ok(())
    }

    /// 删除报关单表头及其全部明细 (单事务)
    pub fn delete_header(&self, id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM customs_items WHERE header_id = ?1", params![id])?;
        let count = tx.execute("DELETE FROM customs_headers WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(count)
    }

    // ==========================================
    // 明细操作
    // ==========================================

    /// 查询表头下的全部明细 (行号升序)
    pub fn find_items_by_header(&self, header_id: &str) -> RepositoryResult<Vec<CustomsItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, header_id, line_no, hs_code, name, spec, unit,
                   qty, unit_price, amount, origin_country, tax_rate,
                   tariff, excise, vat
            FROM customs_items
            WHERE header_id = ?1
            ORDER BY line_no ASC
            "#,
        )?;

        let items = stmt
            .query_map(params![header_id], map_item_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(items)
    }

    /// 查询订单关联的全部明细 (经表头 order_id 关联)
    ///
    /// # 用途
    /// - 合规评分的数据装配
    pub fn find_items_by_order(&self, order_id: &str) -> RepositoryResult<Vec<CustomsItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT i.id, i.header_id, i.line_no, i.hs_code, i.name, i.spec, i.unit,
                   i.qty, i.unit_price, i.amount, i.origin_country, i.tax_rate,
                   i.tariff, i.excise, i.vat
            FROM customs_items i
            JOIN customs_headers h ON i.header_id = h.id
            WHERE h.order_id = ?1
            ORDER BY i.header_id ASC, i.line_no ASC
            "#,
        )?;

        let items = stmt
            .query_map(params![order_id], map_item_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(items)
    }

    /// 插入或更新明细 (按 ID 判断存在性)
    pub fn upsert_item(&self, item: &CustomsItem) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO customs_items (
                id, header_id, line_no, hs_code, name, spec, unit,
                qty, unit_price, amount, origin_country, tax_rate,
                tariff, excise, vat
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            ON CONFLICT(id) DO UPDATE SET
                header_id = excluded.header_id,
                line_no = excluded.line_no,
                hs_code = excluded.hs_code,
                name = excluded.name,
                spec = excluded.spec,
                unit = excluded.unit,
                qty = excluded.qty,
                unit_price = excluded.unit_price,
                amount = excluded.amount,
                origin_country = excluded.origin_country,
                tax_rate = excluded.tax_rate,
                tariff = excluded.tariff,
                excise = excluded.excise,
                vat = excluded.vat
            "#,
            params![
                item.id,
                item.header_id,
                item.line_no,
                item.hs_code,
                item.name,
                item.spec,
                item.unit,
                item.qty,
                item.unit_price,
                item.amount,
                item.origin_country,
                item.tax_rate,
                item.tariff,
                item.excise,
                item.vat,
            ],
        )?;
        Ok(())
    }

    /// 按 ID 删除明细
    pub fn delete_item(&self, id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count = conn.execute("DELETE FROM customs_items WHERE id = ?1", params![id])?;
        Ok(count)
    }
}

/// 拼装表头 list/count 共用的过滤子句
fn build_header_filter(
    q: &str,
    status: Option<&str>,
    port_code: Option<&str>,
    trade_mode: Option<&str>,
) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
    let mut clauses: Vec<&str> = Vec::new();
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if !q.is_empty() {
        clauses.push("(declaration_no LIKE ? OR enterprise LIKE ?)");
        let like = format!("%{}%", q);
        args.push(Box::new(like.clone()));
        args.push(Box::new(like));
    }
    if let Some(status) = status {
        clauses.push("status = ?");
        args.push(Box::new(status.to_string()));
    }
    if let Some(port_code) = port_code {
        clauses.push("port_code = ?");
        args.push(Box::new(port_code.to_string()));
    }
    if let Some(trade_mode) = trade_mode {
        clauses.push("trade_mode = ?");
        args.push(Box::new(trade_mode.to_string()));
    }

    let filter_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    (filter_sql, args)
}

/// 行映射: customs_headers 表 → CustomsHeader
fn map_header_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CustomsHeader> {
    let declare_date: Option<String> = row.get(8)?;
    Ok(CustomsHeader {
        id: row.get(0)?,
        declaration_no: row.get(1)?,
        enterprise: row.get(2)?,
        port_code: row.get(3)?,
        trade_mode: row.get(4)?,
        currency: row.get(5)?,
        total_value: row.get(6)?,
        status: row.get(7)?,
        declare_date: declare_date.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        order_id: row.get(9)?,
    })
}

/// 行映射: customs_items 表 → CustomsItem
fn map_item_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CustomsItem> {
    Ok(CustomsItem {
        id: row.get(0)?,
        header_id: row.get(1)?,
        line_no: row.get(2)?,
        hs_code: row.get(3)?,
        name: row.get(4)?,
        spec: row.get(5)?,
        unit: row.get(6)?,
        qty: row.get(7)?,
        unit_price: row.get(8)?,
        amount: row.get(9)?,
        origin_country: row.get(10)?,
        tax_rate: row.get(11)?,
        tariff: row.get(12)?,
        excise: row.get(13)?,
        vat: row.get(14)?,
    })
}
