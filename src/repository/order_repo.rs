// ==========================================
// 跨境供应链协同平台 - 订单仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::order::Order;
use crate::domain::types::OrderCategory;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// OrderRepository - 订单仓储
// ==========================================
/// 订单仓储
/// 职责: 管理 orders 表的 CRUD 操作
/// 用途: CRUD 层写入, 合规评分与物流联动只读
pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
    /// 创建新的 OrderRepository 实例
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

    /// 按 ID 查询订单
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, order_number, enterprise, category, status,
                   amount, currency, incoterms, created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )?;

        let result = stmt.query_row(params![id], map_order_row);
        match result {
            Ok(order) => Ok(Some(order)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 分页查询订单 (创建时间倒序)
    ///
    /// # 参数
    /// - q: 订单号/企业名模糊匹配, 空串不过滤
    /// - status / category: 精确过滤, None 不过滤
    pub fn list(
        &self,
        q: &str,
        status: Option<&str>,
        category: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let (filter_sql, mut args) = build_order_filter(q, status, category);

        let sql = format!(
            r#"
            SELECT id, order_number, enterprise, category, status,
                   amount, currency, incoterms, created_at, updated_at
            FROM orders
            {}
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
            filter_sql
        );
        args.push(Box::new(limit));
        args.push(Box::new(offset));

        let mut stmt = conn.prepare(&sql)?;
        let orders = stmt
            .query_map(params_from_iter(args), map_order_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(orders)
    }

    /// 统计符合过滤条件的订单数
    pub fn count(
        &self,
        q: &str,
        status: Option<&str>,
        category: Option<&str>,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let (filter_sql, args) = build_order_filter(q, status, category);

        let sql = format!("SELECT COUNT(*) FROM orders {}", filter_sql);
        let mut stmt = conn.prepare(&sql)?;
        let count: i64 = stmt.query_row(params_from_iter(args), |row| row.get(0))?;
        Ok(count)
    }

    /// 插入或更新订单 (按 ID 判断存在性)
    pub fn upsert(&self, order: &Order) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO orders (
                id, order_number, enterprise, category, status,
                amount, currency, incoterms, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                order_number = excluded.order_number,
                enterprise = excluded.enterprise,
                category = excluded.category,
                status = excluded.status,
                amount = excluded.amount,
                currency = excluded.currency,
                incoterms = excluded.incoterms,
                updated_at = excluded.updated_at
            "#,
            params![
                order.id,
                order.order_number,
                order.enterprise,
                order.category.as_str(),
                order.status,
                order.amount,
                order.currency,
                order.incoterms,
                order.created_at,
                order.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 按 ID 删除订单
    pub fn delete(&self, id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count = conn.execute("DELETE FROM orders WHERE id = ?1", params![id])?;
        Ok(count)
    }
}

/// 拼装 list/count 共用的过滤子句
fn build_order_filter(
    q: &str,
    status: Option<&str>,
    category: Option<&str>,
) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
    let mut clauses: Vec<&str> = Vec::new();
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if !q.is_empty() {
        clauses.push("(order_number LIKE ? OR enterprise LIKE ?)");
        let like = format!("%{}%", q);
        args.push(Box::new(like.clone()));
        args.push(Box::new(like));
    }
    if let Some(status) = status {
        clauses.push("status = ?");
        args.push(Box::new(status.to_string()));
    }
    if let Some(category) = category {
        clauses.push("category = ?");
        args.push(Box::new(category.to_string()));
    }

    let filter_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    (filter_sql, args)
}

/// 行映射: orders 表 → Order
fn map_order_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Order> {
    Ok(Order {
        id: row.get(0)?,
        order_number: row.get(1)?,
        enterprise: row.get(2)?,
        category: OrderCategory::parse(&row.get::<_, String>(3)?),
        status: row.get(4)?,
        amount: row.get(5)?,
        currency: row.get(6)?,
        incoterms: row.get(7)?,
        created_at: row.get::<_, DateTime<Utc>>(8)?,
        updated_at: row.get::<_, DateTime<Utc>>(9)?,
    })
}
