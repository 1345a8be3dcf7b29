// ==========================================
// 跨境供应链协同平台 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和 API 实例
// 说明: 所有仓储/调度器共享同一条 SQLite 连接 (Arc<Mutex>),
//       schema 初始化在装配前统一完成
// ==========================================

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::{JobApi, RiskApi};
use crate::config::config_manager::ConfigManager;
use crate::engine::risk::RiskEngine;
use crate::jobs::{JobDispatcher, JobWorker};
use crate::repository::{
    CustomsRepository, InventoryRepository, JobRepository, LogisticsRepository, OrderRepository,
    SettlementRepository,
};

/// 应用状态
///
/// 包含所有 API 实例和共享资源, 由服务入口持有
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 任务提交/状态查询 API
    pub job_api: Arc<JobApi>,

    /// 合规评分 API
    pub risk_api: Arc<RiskApi>,

    /// 任务轮询器
    pub worker: Arc<JobWorker>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    // ===== 实体仓储 (供外部 CRUD 层复用) =====
    pub order_repo: Arc<OrderRepository>,
    pub settlement_repo: Arc<SettlementRepository>,
    pub logistics_repo: Arc<LogisticsRepository>,
    pub customs_repo: Arc<CustomsRepository>,
    pub inventory_repo: Arc<InventoryRepository>,
}

impl AppState {
    /// 创建新的 AppState 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 该方法会:
    /// 1. 打开共享连接并初始化 schema (幂等)
    /// 2. 初始化所有 Repository 与引擎
    /// 3. 装配任务调度器/轮询器与 API 实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState, 数据库路径: {}", db_path);

        let mut conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        crate::perf::install_sqlite_tracing(&mut conn);
        crate::db::init_schema(&conn).map_err(|e| format!("无法初始化 schema: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化 Repository 层
        // ==========================================
        let job_repo = Arc::new(JobRepository::from_connection(conn.clone()));
        let order_repo = Arc::new(OrderRepository::from_connection(conn.clone()));
        let settlement_repo = Arc::new(SettlementRepository::from_connection(conn.clone()));
        let logistics_repo = Arc::new(LogisticsRepository::from_connection(conn.clone()));
        let customs_repo = Arc::new(CustomsRepository::from_connection(conn.clone()));
        let inventory_repo = Arc::new(InventoryRepository::from_connection(conn.clone()));

        // 配置管理器
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化引擎与任务子系统
        // ==========================================
        let risk_engine = Arc::new(RiskEngine::new());

        let dispatcher = Arc::new(JobDispatcher::new(conn.clone(), job_repo.clone()));
        let poll_interval_ms = config_manager
            .get_worker_poll_interval_ms()
            .map_err(|e| format!("无法读取轮询间隔配置: {}", e))?;
        let worker = Arc::new(JobWorker::new(
            job_repo.clone(),
            dispatcher,
            Duration::from_millis(poll_interval_ms),
        ));

        // ==========================================
        // 初始化 API 层
        // ==========================================
        let job_api = Arc::new(JobApi::new(job_repo));
        let risk_api = Arc::new(RiskApi::new(
            order_repo.clone(),
            customs_repo.clone(),
            settlement_repo.clone(),
            logistics_repo.clone(),
            risk_engine,
        ));

        tracing::info!("AppState初始化完成: poll_interval_ms={}", poll_interval_ms);

        Ok(Self {
            db_path,
            job_api,
            risk_api,
            worker,
            config_manager,
            order_repo,
            settlement_repo,
            logistics_repo,
            customs_repo,
            inventory_repo,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 开发环境: 用户数据目录/crossborder-scm-dev/crossborder_scm.db
/// - 生产环境: 用户数据目录/crossborder-scm/crossborder_scm.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径 (便于调试/测试/CI)
    if let Ok(path) = std::env::var("CROSSBORDER_SCM_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // 先给一个默认回退值, 后续如果能拿到 data_dir 再覆盖
    let mut path = PathBuf::from("./crossborder_scm.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录, 避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("crossborder-scm-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("crossborder-scm");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("crossborder_scm.db");
    }

    path.to_string_lossy().to_string()
}
