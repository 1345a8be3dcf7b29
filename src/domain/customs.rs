// ==========================================
// 跨境供应链协同平台 - 报关领域模型
// ==========================================
// 职责: 报关单表头与商品明细实体定义
// 对齐: schema customs_headers / customs_items 表
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// CustomsHeader - 报关单表头
// ==========================================
// 用途: 申报任务创建, 通关进度任务更新状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomsHeader {
    pub id: String,                      // 报关单 ID
    pub declaration_no: String,          // 报关单号
    pub enterprise: String,              // 申报企业
    pub port_code: String,               // 口岸代码
    pub trade_mode: String,              // 贸易方式
    pub currency: String,                // 币种
    pub total_value: f64,                // 申报总值
    pub status: String,                  // 通关状态 (declared/cleared/...)
    pub declare_date: Option<NaiveDate>, // 申报日期
    pub order_id: Option<String>,        // 关联订单 ID (弱引用)
}

// ==========================================
// CustomsItem - 报关商品明细
// ==========================================
// 归属: 仅随表头存在, 申报重放按 id 去重
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomsItem {
    pub id: String,             // 明细 ID
    pub header_id: String,      // 所属表头 ID
    pub line_no: i64,           // 行号
    pub hs_code: String,        // HS 编码 (去除 '.' 后长度 ≥8 视为完整)
    pub name: String,           // 商品名称
    pub spec: String,           // 规格型号
    pub unit: String,           // 计量单位
    pub qty: f64,               // 数量
    pub unit_price: f64,        // 单价
    pub amount: f64,            // 金额
    pub origin_country: String, // 原产国
    pub tax_rate: f64,          // 综合税率
    pub tariff: f64,            // 关税
    pub excise: f64,            // 消费税
    pub vat: f64,               // 增值税
}
