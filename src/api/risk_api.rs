// ==========================================
// 跨境供应链协同平台 - 合规评分 API
// ==========================================
// 职责: 装配评分输入快照并调用评分引擎
// 说明: 快照经多次独立读查询装配, 无跨查询事务快照保证,
//       评分是时点参考值
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::engine::risk::{ComplianceScore, ComplianceSnapshot, RiskEngine};
use crate::perf::PerfGuard;
use crate::repository::customs_repo::CustomsRepository;
use crate::repository::logistics_repo::LogisticsRepository;
use crate::repository::order_repo::OrderRepository;
use crate::repository::settlement_repo::SettlementRepository;
use std::sync::Arc;
use tracing::debug;

// ==========================================
// RiskApi - 合规评分 API
// ==========================================
pub struct RiskApi {
    order_repo: Arc<OrderRepository>,
    customs_repo: Arc<CustomsRepository>,
    settlement_repo: Arc<SettlementRepository>,
    logistics_repo: Arc<LogisticsRepository>,
    risk_engine: Arc<RiskEngine>,
}

impl RiskApi {
    /// 创建新的 RiskApi 实例
    pub fn new(
        order_repo: Arc<OrderRepository>,
        customs_repo: Arc<CustomsRepository>,
        settlement_repo: Arc<SettlementRepository>,
        logistics_repo: Arc<LogisticsRepository>,
        risk_engine: Arc<RiskEngine>,
    ) -> Self {
        Self {
            order_repo,
            customs_repo,
            settlement_repo,
            logistics_repo,
            risk_engine,
        }
    }

    /// 对单个订单计算合规评分
    ///
    /// # 返回
    /// - 订单存在: {compliance, messages} 按引擎规则计算
    /// - 订单不存在: {compliance: 0, messages: ["order_not_found"]} 哨兵结果
    pub fn score(&self, order_id: &str) -> ApiResult<ComplianceScore> {
        let _perf = PerfGuard::new("risk_score");

        if order_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("订单 ID 不能为空".to_string()));
        }

        let order = match self.order_repo.find_by_id(order_id)? {
            Some(order) => order,
            None => {
                debug!("评分目标订单不存在: order_id={}", order_id);
                return Ok(ComplianceScore::order_not_found());
            }
        };

        let snapshot = ComplianceSnapshot {
            items: self.customs_repo.find_items_by_order(order_id)?,
            settlement: self.settlement_repo.find_by_order(order_id)?,
            latest_logistics: self.logistics_repo.find_latest_by_order(order_id)?,
            order,
        };

        Ok(self.risk_engine.score(&snapshot))
    }
}
