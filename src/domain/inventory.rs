// ==========================================
// 跨境供应链协同平台 - 库存领域模型
// ==========================================
// 职责: 仓储库存实体定义
// 对齐: schema inventory 表
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Inventory - 库存记录
// ==========================================
// 主键为商品名 (品类映射出的中文名), 首次引用时懒创建
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    pub name: String,    // 商品名 (主键)
    pub current: i64,    // 当前库存
    pub target: i64,     // 目标库存
    pub production: i64, // 生产量
    pub sales: i64,      // 销售量
    pub efficiency: i64, // 周转效率
}

impl Inventory {
    /// 首次引用时的默认库存记录
    pub fn with_defaults(name: &str) -> Self {
        Self {
            name: name.to_string(),
            current: 0,
            target: 1000,
            production: 0,
            sales: 0,
            efficiency: 90,
        }
    }
}
