// ==========================================
// 跨境供应链协同平台 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope, 当前仅 global scope)
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 配置键全集
pub mod config_keys {
    /// 任务轮询间隔 (毫秒)
    pub const WORKER_POLL_INTERVAL_MS: &str = "worker/poll_interval_ms";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明: 为保证连接行为一致, 会对传入连接再次应用统一 PRAGMA (幂等)。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值 (scope_id='global')
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值 (公开方法, 供其他模块复用)
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 从 config_kv 表读取配置值, 带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 的配置值 (UPSERT)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    // ===== 任务轮询配置 =====

    /// 获取任务轮询间隔 (毫秒)
    ///
    /// 配置缺失或格式错误时回退到默认 1000ms
    pub fn get_worker_poll_interval_ms(&self) -> Result<u64, Box<dyn Error>> {
        let value = self.get_config_or_default(
            config_keys::WORKER_POLL_INTERVAL_MS,
            &crate::jobs::worker::DEFAULT_POLL_INTERVAL_MS.to_string(),
        )?;
        Ok(value
            .trim()
            .parse::<u64>()
            .unwrap_or(crate::jobs::worker::DEFAULT_POLL_INTERVAL_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn memory_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_poll_interval_default_and_override() {
        let manager = memory_manager();
        assert_eq!(manager.get_worker_poll_interval_ms().unwrap(), 1000);

        manager
            .set_global_config_value(config_keys::WORKER_POLL_INTERVAL_MS, "250")
            .unwrap();
        assert_eq!(manager.get_worker_poll_interval_ms().unwrap(), 250);

        // 非法值回退默认
        manager
            .set_global_config_value(config_keys::WORKER_POLL_INTERVAL_MS, "abc")
            .unwrap();
        assert_eq!(manager.get_worker_poll_interval_ms().unwrap(), 1000);
    }

    #[test]
    fn test_get_missing_config_returns_none() {
        let manager = memory_manager();
        assert!(manager
            .get_global_config_value("worker/unknown")
            .unwrap()
            .is_none());
    }
}
