// ==========================================
// 跨境供应链协同平台 - 结算单仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::settlement::Settlement;
use crate::domain::types::{RiskLevel, SettlementStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, params_from_iter, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// SettlementRepository - 结算单仓储
// ==========================================
/// 结算单仓储
/// 职责: 管理 settlements 表的 CRUD 操作
pub struct SettlementRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SettlementRepository {
    /// 创建新的 SettlementRepository 实例
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

    /// 按 ID 查询结算单
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Settlement>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, order_id, status, settlement_time, risk_level FROM settlements WHERE id = ?1",
        )?;

        let result = stmt.query_row(params![id], map_settlement_row);
        match result {
            Ok(settlement) => Ok(Some(settlement)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询订单对应的结算单
    ///
    /// # 说明
    /// - 与订单按约定一对一使用, 存在多条时取最早插入的一条
    pub fn find_by_order(&self, order_id: &str) -> RepositoryResult<Option<Settlement>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, order_id, status, settlement_time, risk_level
            FROM settlements
            WHERE order_id = ?1
            ORDER BY rowid ASC
            LIMIT 1
            "#,
        )?;

        let result = stmt.query_row(params![order_id], map_settlement_row);
        match result {
            Ok(settlement) => Ok(Some(settlement)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 分页查询结算单
    ///
    /// # 参数
    /// - q: 结算单号/订单号模糊匹配, 空串不过滤
    /// - status: 精确过滤, None 不过滤
    pub fn list(
        &self,
        q: &str,
        status: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<Settlement>> {
        let conn = self.get_conn()?;
        let (filter_sql, mut args) = build_settlement_filter(q, status);

        let sql = format!(
            r#"
            SELECT id, order_id, status, settlement_time, risk_level
            FROM settlements
            {}
            ORDER BY rowid DESC
            LIMIT ? OFFSET ?
            "#,
            filter_sql
        );
        args.push(Box::new(limit));
        args.push(Box::new(offset));

        let mut stmt = conn.prepare(&sql)?;
        let settlements = stmt
            .query_map(params_from_iter(args), map_settlement_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(settlements)
    }

    /// 统计符合过滤条件的结算单数
    pub fn count(&self, q: &str, status: Option<&str>) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let (filter_sql, args) = build_settlement_filter(q, status);

        let sql = format!("SELECT COUNT(*) FROM settlements {}", filter_sql);
        let mut stmt = conn.prepare(&sql)?;
        let count: i64 = stmt.query_row(params_from_iter(args), |row| row.get(0))?;
        Ok(count)
    }

    /// 插入或更新结算单 (按 ID 判断存在性)
    pub fn upsert(&self, settlement: &Settlement) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO settlements (id, order_id, status, settlement_time, risk_level)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                order_id = excluded.order_id,
                status = excluded.status,
                settlement_time = excluded.settlement_time,
                risk_level = excluded.risk_level
            "#,
            params![
                settlement.id,
                settlement.order_id,
                settlement.status.as_str(),
                settlement.settlement_time,
                settlement.risk_level.as_str(),
            ],
        )?;
        Ok(())
    }

    /// 按 ID 删除结算单
    pub fn delete(&self, id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count = conn.execute("DELETE FROM settlements WHERE id = ?1", params![id])?;
        Ok(count)
    }
}

/// 拼装 list/count 共用的过滤子句
fn build_settlement_filter(
    q: &str,
    status: Option<&str>,
) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
    let mut clauses: Vec<&str> = Vec::new();
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if !q.is_empty() {
        clauses.push("(id LIKE ? OR order_id LIKE ?)");
        let like = format!("%{}%", q);
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

/// 行映射: settlements 表 → Settlement
fn map_settlement_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Settlement> {
    Ok(Settlement {
        id: row.get(0)?,
        order_id: row.get(1)?,
        status: SettlementStatus::parse(&row.get::<_, String>(2)?),
        settlement_time: row.get(3)?,
        risk_level: RiskLevel::from_str(&row.get::<_, String>(4)?),
    })
}
