// ==========================================
// 跨境供应链协同平台 - 物流领域模型
// ==========================================
// 职责: 物流运单实体定义
// 对齐: schema logistics 表
// ==========================================

use crate::domain::types::LogisticsStatus;
use serde::{Deserialize, Serialize};

// ==========================================
// Logistics - 物流运单
// ==========================================
// 里程碑推进: pickup → transit → completed
// (customs 为种子数据中出现的中间态, 推进规则不会产生)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logistics {
    pub id: String,                  // 运单 ID
    pub tracking_no: String,         // 运单号
    pub origin: String,              // 起运地
    pub destination: String,         // 目的地
    pub status: LogisticsStatus,     // 当前里程碑
    pub estimated_time: i64,         // 预计时效 (小时)
    pub actual_time: i64,            // 实际时效 (小时)
    pub efficiency: i64,             // 时效评分 (0 视为缺失)
    pub order_id: Option<String>,    // 关联订单 ID (弱引用, 可为空)
}
