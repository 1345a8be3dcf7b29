// ==========================================
// 跨境供应链协同平台 - 库存仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::inventory::Inventory;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// InventoryRepository - 库存仓储
// ==========================================
/// 库存仓储
/// 职责: 管理 inventory 表的 CRUD 操作, 主键为商品名
pub struct InventoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl InventoryRepository {
    /// 创建新的 InventoryRepository 实例
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

    /// 按商品名查询库存
    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Inventory>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT name, current, target, production, sales, efficiency FROM inventory WHERE name = ?1",
        )?;

        let result = stmt.query_row(params![name], map_inventory_row);
        match result {
            Ok(inventory) => Ok(Some(inventory)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询全部库存 (商品名升序)
    pub fn list(&self) -> RepositoryResult<Vec<Inventory>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT name, current, target, production, sales, efficiency FROM inventory ORDER BY name ASC",
        )?;

        let rows = stmt
            .query_map([], map_inventory_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 插入或更新库存 (按商品名判断存在性)
    pub fn upsert(&self, inventory: &Inventory) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO inventory (name, current, target, production, sales, efficiency)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(name) DO UPDATE SET
                current = excluded.current,
                target = excluded.target,
                production = excluded.production,
                sales = excluded.sales,
                efficiency = excluded.efficiency
            "#,
            params![
                inventory.name,
                inventory.current,
                inventory.target,
                inventory.production,
                inventory.sales,
                inventory.efficiency,
            ],
        )?;
        Ok(())
    }

    /// 入库: 不存在则按默认值懒创建, 懒创建与自增在单事务内完成
    pub fn add_stock(&self, name: &str, qty: i64) -> RepositoryResult<Inventory> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let exists: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM inventory WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            let defaults = Inventory::with_defaults(name);
            tx.execute(
                r#"
                INSERT INTO inventory (name, current, target, production, sales, efficiency)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    defaults.name,
                    defaults.current,
                    defaults.target,
                    defaults.production,
                    defaults.sales,
                    defaults.efficiency,
                ],
            )?;
        }

        tx.execute(
            "UPDATE inventory SET current = current + ?1 WHERE name = ?2",
            params![qty, name],
        )?;
        let updated = tx.query_row(
            "SELECT name, current, target, production, sales, efficiency FROM inventory WHERE name = ?1",
            params![name],
            map_inventory_row,
        )?;
        tx.commit()?;
        Ok(updated)
    }

    /// 按商品名删除库存
    pub fn delete(&self, name: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count = conn.execute("DELETE FROM inventory WHERE name = ?1", params![name])?;
        Ok(count)
    }
}

/// 行映射: inventory 表 → Inventory
fn map_inventory_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Inventory> {
    Ok(Inventory {
        name: row.get(0)?,
        current: row.get(1)?,
        target: row.get(2)?,
        production: row.get(3)?,
        sales: row.get(4)?,
        efficiency: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn memory_repo() -> InventoryRepository {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        InventoryRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_upsert_and_find() {
        let repo = memory_repo();
        repo.upsert(&Inventory::with_defaults("电子产品")).unwrap();

        let found = repo.find_by_name("电子产品").unwrap().unwrap();
        assert_eq!(found.current, 0);
        assert_eq!(found.target, 1000);
        assert_eq!(found.efficiency, 90);
        assert!(repo.find_by_name("不存在").unwrap().is_none());
    }

    #[test]
    fn test_add_stock_lazy_creates_then_increments() {
        let repo = memory_repo();

        // 首次引用: 懒创建后自增
        let inv = repo.add_stock("机械设备", 10).unwrap();
        assert_eq!(inv.current, 10);
        assert_eq!(inv.target, 1000);

        // 再次入库: 仅自增
        let inv = repo.add_stock("机械设备", 10).unwrap();
        assert_eq!(inv.current, 20);
    }

    #[test]
    fn test_list_sorted_and_delete() {
        let repo = memory_repo();
        repo.upsert(&Inventory::with_defaults("服装")).unwrap();
        repo.upsert(&Inventory::with_defaults("化妆品")).unwrap();

        let all = repo.list().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(repo.delete("服装").unwrap(), 1);
        assert_eq!(repo.list().unwrap().len(), 1);
    }
}
