// ==========================================
// 跨境供应链协同平台 - 结算领域模型
// ==========================================
// 职责: 订单结算单实体定义
// 对齐: schema settlements 表
// ==========================================

use crate::domain::types::{RiskLevel, SettlementStatus};
use serde::{Deserialize, Serialize};

// ==========================================
// Settlement - 结算单
// ==========================================
// 约定: 与订单按 order_id 一对一使用 (存储层不强制唯一),
//       结算完成任务在缺失时以 'S' + order_id 懒创建
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub id: String,                 // 结算单 ID
    pub order_id: String,           // 关联订单 ID
    pub status: SettlementStatus,   // 结算状态
    pub settlement_time: i64,       // 结算耗时 (小时)
    pub risk_level: RiskLevel,      // 结算风险等级
}

impl Settlement {
    /// 为订单懒创建的初始结算单
    pub fn placeholder_for(order_id: &str) -> Self {
        Self {
            id: format!("S{}", order_id),
            order_id: order_id.to_string(),
            status: SettlementStatus::Processing,
            settlement_time: 0,
            risk_level: RiskLevel::Low,
        }
    }
}
