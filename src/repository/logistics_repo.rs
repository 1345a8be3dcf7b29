// ==========================================
// 跨境供应链协同平台 - 物流运单仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::logistics::Logistics;
use crate::domain::types::LogisticsStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, params_from_iter, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// LogisticsRepository - 物流运单仓储
// ==========================================
/// 物流运单仓储
/// 职责: 管理 logistics 表的 CRUD 操作
pub struct LogisticsRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LogisticsRepository {
    /// 创建新的 LogisticsRepository 实例
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

    /// 按 ID 查询运单
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Logistics>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, tracking_no, origin, destination, status,
                   estimated_time, actual_time, efficiency, order_id
            FROM logistics
            WHERE id = ?1
            "#,
        )?;

        let result = stmt.query_row(params![id], map_logistics_row);
        match result {
            Ok(logistics) => Ok(Some(logistics)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询订单最近一条运单 (ID 最大者)
    pub fn find_latest_by_order(&self, order_id: &str) -> RepositoryResult<Option<Logistics>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, tracking_no, origin, destination, status,
                   estimated_time, actual_time, efficiency, order_id
            FROM logistics
            WHERE order_id = ?1
            ORDER BY id DESC
            LIMIT 1
            "#,
        )?;

        let result = stmt.query_row(params![order_id], map_logistics_row);
        match result {
            Ok(logistics) => Ok(Some(logistics)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 分页查询运单
    ///
    /// # 参数
    /// - q: 运单号/起讫地模糊匹配, 空串不过滤
    /// - status: 精确过滤, None 不过滤
    pub fn list(
        &self,
        q: &str,
        status: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<Logistics>> {
        let conn = self.get_conn()?;
        let (filter_sql, mut args) = build_logistics_filter(q, status);

        let sql = format!(
            r#"
            SELECT id, tracking_no, origin, destination, status,
                   estimated_time, actual_time, efficiency, order_id
            FROM logistics
            {}
            ORDER BY id DESC
            LIMIT ? OFFSET ?
            "#,
            filter_sql
        );
        args.push(Box::new(limit));
        args.push(Box::new(offset));

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args), map_logistics_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 统计符合过滤条件的运单数
    pub fn count(&self, q: &str, status: Option<&str>) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let (filter_sql, args) = build_logistics_filter(q, status);

        let sql = format!("SELECT COUNT(*) FROM logistics {}", filter_sql);
        let mut stmt = conn.prepare(&sql)?;
        let count: i64 = stmt.query_row(params_from_iter(args), |row| row.get(0))?;
        Ok(count)
    }

    /// 插入或更新运单 (按 ID 判断存在性)
    pub fn upsert(&self, logistics: &Logistics) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO logistics (
                id, tracking_no, origin, destination, status,
                estimated_time, actual_time, efficiency, order_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                tracking_no = excluded.tracking_no,
                origin = excluded.origin,
                destination = excluded.destination,
                status = excluded.status,
                estimated_time = excluded.estimated_time,
                actual_time = excluded.actual_time,
                efficiency = excluded.efficiency,
                order_id = excluded.order_id
            "#,
            params![
                logistics.id,
                logistics.tracking_no,
                logistics.origin,
                logistics.destination,
                logistics.status.as_str(),
                logistics.estimated_time,
                logistics.actual_time,
                logistics.efficiency,
                logistics.order_id,
            ],
        )?;
        Ok(())
    }

    /// 按 ID 删除运单
    pub fn delete(&self, id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count = conn.execute("DELETE FROM logistics WHERE id = ?1", params![id])?;
        Ok(count)
    }
}

/// 拼装 list/count 共用的过滤子句
fn build_logistics_filter(
    q: &str,
    status: Option<&str>,
) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
    let mut clauses: Vec<&str> = Vec::new();
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if !q.is_empty() {
        clauses.push("(tracking_no LIKE ? OR origin LIKE ? OR destination LIKE ?)");
        let like = format!("%{}%", q);
        args.push(Box::new(like.clone()));
        args.push(Box::new(like.clone()));
        args.push(Box::new(like));
    }
    if let Some(status) = status {
        clauses.push("status = ?");
        args.push(Box::new(status.to_string()));
    }

    let filter_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    (filter_sql, args)
}

/// 行映射: logistics 表 → Logistics
fn map_logistics_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Logistics> {
    Ok(Logistics {
        id: row.get(0)?,
        tracking_no: row.get(1)?,
        origin: row.get(2)?,
        destination: row.get(3)?,
        status: LogisticsStatus::parse(&row.get::<_, String>(4)?),
        estimated_time: row.get(5)?,
        actual_time: row.get(6)?,
        efficiency: row.get(7)?,
        order_id: row.get(8)?,
    })
}
