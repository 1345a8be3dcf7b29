// ==========================================
// 跨境供应链协同平台 - 订单领域模型
// ==========================================
// 职责: 跨境订单实体定义
// 对齐: schema orders 表
// ==========================================

use crate::domain::types::OrderCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Order - 跨境订单
// ==========================================
// 用途: CRUD 层写入, 合规评分与物流联动只读
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,                 // 订单 ID
    pub order_number: String,       // 订单号
    pub enterprise: String,         // 所属企业
    pub category: OrderCategory,    // 商品品类
    pub status: String,             // 订单状态 (自由文本, 由外部流程驱动)
    pub amount: f64,                // 订单金额
    pub currency: String,           // 币种
    pub incoterms: String,          // 贸易术语 (如 CIF/FOB, 可为空)
    pub created_at: DateTime<Utc>,  // 创建时间
    pub updated_at: DateTime<Utc>,  // 更新时间
}
