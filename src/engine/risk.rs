// ==========================================
// 跨境供应链协同平台 - 合规评分引擎
// ==========================================
// 职责: 单订单合规评分
// 输入: 订单 + 关联报关明细 + 结算单 + 最近运单 (由调用方装配)
// 输出: ComplianceScore (分值 + 提示列表)
// ==========================================

use crate::domain::customs::CustomsItem;
use crate::domain::logistics::Logistics;
use crate::domain::order::Order;
use crate::domain::settlement::Settlement;
use crate::domain::types::OrderCategory;
use serde::{Deserialize, Serialize};

/// 评分基线, 在此基础上做扣分
pub const BASELINE_SCORE: i64 = 95;

// ==========================================
// ComplianceSnapshot - 评分输入快照
// ==========================================
// 说明: 多次独立读查询装配而成, 不保证事务一致性,
//       评分是时点参考值而非对账依据
#[derive(Debug, Clone)]
pub struct ComplianceSnapshot {
    pub order: Order,
    pub items: Vec<CustomsItem>,
    pub settlement: Option<Settlement>,
    pub latest_logistics: Option<Logistics>,
}

// ==========================================
// ComplianceScore - 评分结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceScore {
    pub compliance: i64,
    pub messages: Vec<String>,
}

impl ComplianceScore {
    /// 订单不存在时的哨兵结果
    pub fn order_not_found() -> Self {
        Self {
            compliance: 0,
            messages: vec!["order_not_found".to_string()],
        }
    }
}

// ==========================================
// RiskEngine - 合规评分引擎
// ==========================================
pub struct RiskEngine {
    // 无状态引擎,不需要注入依赖
    // Repository 操作由调用方处理
}

impl RiskEngine {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 对单个订单评分
    ///
    /// # 规则
    /// - 基线 95 分, 各项检查独立扣分, 不短路
    /// - 提示顺序固定: 品类专项 → HS 编码 → CIF 保险
    /// - 最终分值下限裁剪到 0
    pub fn score(&self, snapshot: &ComplianceSnapshot) -> ComplianceScore {
        let mut score = BASELINE_SCORE;
        let mut messages = Vec::new();

        // 1. 品类专项检查 (品类比较忽略大小写)
        match snapshot.order.category.normalized() {
            OrderCategory::Electronics => {
                if self.count_missing_origin(&snapshot.items) > 0 {
                    messages.push("电子产品缺少原产国".to_string());
                    score -= 5;
                }
            }
            OrderCategory::Textile => {
                if self.count_missing_spec(&snapshot.items) > 0 {
                    messages.push("纺织品缺少规格".to_string());
                    score -= 5;
                }
            }
            OrderCategory::Appliance => {
                let settled = snapshot
                    .settlement
                    .as_ref()
                    .map(|s| s.status.is_completed())
                    .unwrap_or(false);
                if !settled {
                    messages.push("家电建议在结算完成后安排发运".to_string());
                    score -= 3;
                }
            }
            // beauty / wine 无品类专项检查
            _ => {}
        }

        // 2. HS 编码完整性 (全品类)
        if self.count_incomplete_hs(&snapshot.items) > 0 {
            messages.push("HS编码不完整".to_string());
            score -= 6;
        }

        // 3. CIF 保险检查: 取最近一条运单, 时效评分为 0 视为无保险/运费数据
        if snapshot.order.incoterms == "CIF" {
            let insured = snapshot
                .latest_logistics
                .as_ref()
                .map(|l| l.efficiency != 0)
                .unwrap_or(false);
            if !insured {
                messages.push("CIF缺少保险费用".to_string());
                score -= 6;
            }
        }

        // 4. 下限裁剪
        if score < 0 {
            score = 0;
        }

        ComplianceScore {
            compliance: score,
            messages,
        }
    }

    /// 统计缺少原产国的明细数
    fn count_missing_origin(&self, items: &[CustomsItem]) -> usize {
        items.iter().filter(|i| i.origin_country.is_empty()).count()
    }

    /// 统计缺少规格的明细数
    fn count_missing_spec(&self, items: &[CustomsItem]) -> usize {
        items.iter().filter(|i| i.spec.is_empty()).count()
    }

    /// 统计 HS 编码不完整的明细数
    fn count_incomplete_hs(&self, items: &[CustomsItem]) -> usize {
        items
            .iter()
            .filter(|i| !is_hs_code_complete(&i.hs_code))
            .count()
    }
}

/// HS 编码去除 '.' 分隔符后不少于 8 个字符视为完整
pub fn is_hs_code_complete(hs_code: &str) -> bool {
    hs_code.replace('.', "").chars().count() >= 8
}
