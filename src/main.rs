// ==========================================
// 跨境供应链协同平台 - 服务主入口
// ==========================================
// 职责: 初始化日志与应用状态, 启动任务轮询, 等待退出信号
// ==========================================

use crossborder_scm::app::{get_default_db_path, AppState};

#[tokio::main]
async fn main() {
    // 初始化日志系统
    crossborder_scm::logging::init();

    tracing::info!("==================================================");
    tracing::info!("跨境供应链协同平台 - 后台协同服务");
    tracing::info!("系统版本: {}", crossborder_scm::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    // 创建AppState
    tracing::info!("正在初始化AppState...");
    let app_state = AppState::new(db_path).expect("无法初始化AppState");
    tracing::info!("AppState初始化成功");

    // 启动任务轮询
    let worker = app_state.worker.clone();
    let worker_handle = tokio::spawn(async move {
        worker.run().await;
    });

    // 等待退出信号
    tokio::signal::ctrl_c()
        .await
        .expect("无法监听退出信号");
    tracing::info!("收到退出信号, 正在停止任务轮询...");

    app_state.worker.shutdown();
    let _ = worker_handle.await;

    tracing::info!("服务已退出");
}
