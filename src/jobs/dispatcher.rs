// ==========================================
// 跨境供应链协同平台 - 任务调度器
// ==========================================
// 职责: 解析任务载荷, 按类型路由到唯一的处理器, 落终态
// 约束:
// - 每个处理器的全部读写在单事务内完成, 不存在部分提交窗口
// - 处理器错误在调度边界吞掉, 任务置 failed 并记录原因
// - 未识别的任务类型视为空操作, 直接置 done
// ==========================================

use crate::domain::job::Job;
use crate::domain::types::{JobStatus, JobType, LogisticsStatus, OrderCategory};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::job_repo::JobRepository;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{info, warn};

/// 结算完成任务缺省耗时 (小时): 生产者未提供计时遥测时按名义 SLA 记账
const DEFAULT_SETTLEMENT_TIME_HOURS: i64 = 24;

/// 通关进度任务的缺省终态
const DEFAULT_CUSTOMS_CLEARED_STATUS: &str = "cleared";

/// 物流完成后一次入库的固定数量
const INVENTORY_RESTOCK_QTY: i64 = 10;

// ==========================================
// DispatchError - 处理器错误
// ==========================================
/// 处理器执行错误
/// 不跨出调度边界: process 将其落为任务 failed 终态
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("载荷解析失败: {0}")]
    PayloadDecode(String),

    #[error("载荷缺少必填字段: {0}")]
    MissingField(&'static str),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库操作失败: {0}")]
    Storage(#[from] rusqlite::Error),
}

// ==========================================
// 载荷文档 (字段名为固定线上格式, 不可改名)
// ==========================================
// 顶层键使用 snake_case; 报关表头/明细嵌套对象使用 camelCase

#[derive(Debug, Deserialize)]
struct SettlementCompletePayload {
    order_id: String,
    time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CustomsProgressPayload {
    header_id: Option<String>,
    next_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CustomsDeclarePayload {
    header: Option<DeclareHeaderDoc>,
    #[serde(default)]
    items: Vec<DeclareItemDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeclareHeaderDoc {
    id: Option<String>,
    #[serde(default)]
    declaration_no: String,
    #[serde(default)]
    enterprise: String,
    #[serde(default)]
    port_code: String,
    #[serde(default)]
    trade_mode: String,
    #[serde(default)]
    currency: String,
    #[serde(default)]
    total_value: f64,
    status: Option<String>,
    order_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeclareItemDoc {
    id: Option<String>,
    #[serde(default)]
    line_no: i64,
    #[serde(default)]
    hs_code: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    spec: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    qty: f64,
    #[serde(default)]
    unit_price: f64,
    #[serde(default)]
    amount: f64,
    #[serde(default)]
    origin_country: String,
    #[serde(default)]
    tax_rate: f64,
    #[serde(default)]
    tariff: f64,
    #[serde(default)]
    excise: f64,
    #[serde(default)]
    vat: f64,
}

#[derive(Debug, Deserialize)]
struct LogisticsMilestonePayload {
    id: Option<String>,
    next_status: Option<String>,
}

/// 载荷解析辅助
fn decode_payload<T: DeserializeOwned>(payload: &str) -> Result<T, DispatchError> {
    serde_json::from_str(payload).map_err(|e| DispatchError::PayloadDecode(e.to_string()))
}

// ==========================================
// JobDispatcher - 任务调度器
// ==========================================
pub struct JobDispatcher {
    conn: Arc<Mutex<Connection>>,
    job_repo: Arc<JobRepository>,
}

impl JobDispatcher {
    /// 创建新的 JobDispatcher 实例
    pub fn new(conn: Arc<Mutex<Connection>>, job_repo: Arc<JobRepository>) -> Self {
        Self { conn, job_repo }
    }

    /// 处理一个已认领 (processing) 的任务并落终态
    ///
    /// # 返回
    /// - Ok(JobStatus::Done): 处理成功 (含未识别类型的空操作)
    /// - Ok(JobStatus::Failed): 处理器出错, 原因已写入 error_message
    /// - Err: 仅在终态写入本身失败时返回
    pub fn process(&self, job: &Job) -> RepositoryResult<JobStatus> {
        match self.execute(job) {
            Ok(()) => {
                self.job_repo.mark_done(&job.id)?;
                info!("任务处理成功: id={}, type={}", job.id, job.job_type);
                Ok(JobStatus::Done)
            }
            Err(e) => {
                warn!(
                    "任务处理失败: id={}, type={}, error={}",
                    job.id, job.job_type, e
                );
                self.job_repo.mark_failed(&job.id, &e.to_string())?;
                Ok(JobStatus::Failed)
            }
        }
    }

    /// 按任务类型执行唯一对应的处理器
    fn execute(&self, job: &Job) -> Result<(), DispatchError> {
        if let JobType::Other(t) = &job.job_type {
            // 未识别类型是刻意的兜底而非错误路径
            info!("未识别的任务类型, 按空操作完成: id={}, type={}", job.id, t);
            return Ok(());
        }

        let conn = self
            .conn
            .lock()
            .map_err(|e| DispatchError::LockError(e.to_string()))?;
        let tx = conn.unchecked_transaction()?;

        match &job.job_type {
            JobType::SettlementComplete => self.handle_settlement_complete(&tx, &job.payload)?,
            JobType::CustomsProgress => self.handle_customs_progress(&tx, &job.payload)?,
            JobType::CustomsDeclare => self.handle_customs_declare(&tx, &job.payload)?,
            JobType::LogisticsMilestone => self.handle_logistics_milestone(&tx, &job.payload)?,
            JobType::Other(_) => unreachable!("已在入口处按空操作返回"),
        }

        tx.commit()?;
        Ok(())
    }

    // ==========================================
    // settlement_complete - 结算完成
    // ==========================================
    /// 结算单不存在时以 'S' + order_id 懒创建, 随后统一置 completed,
    /// 耗时取载荷 time, 缺省 24 小时
    fn handle_settlement_complete(
        &self,
        tx: &Transaction<'_>,
        payload: &str,
    ) -> Result<(), DispatchError> {
        let doc: SettlementCompletePayload = decode_payload(payload)?;
        let settlement_time = doc.time.unwrap_or(DEFAULT_SETTLEMENT_TIME_HOURS);

        let existing: Option<String> = tx
            .query_row(
                "SELECT id FROM settlements WHERE order_id = ?1 LIMIT 1",
                params![doc.order_id],
                |row| row.get(0),
            )
            .optional()?;

        let settlement_id = match existing {
            Some(id) => id,
            None => {
                let placeholder =
                    crate::domain::settlement::Settlement::placeholder_for(&doc.order_id);
                tx.execute(
                    r#"
                    INSERT INTO settlements (id, order_id, status, settlement_time, risk_level)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                    params![
                        placeholder.id,
                        placeholder.order_id,
                        placeholder.status.as_str(),
                        placeholder.settlement_time,
                        placeholder.risk_level.as_str(),
                    ],
                )?;
                info!("结算单不存在, 已懒创建: id={}", placeholder.id);
                placeholder.id
            }
        };

        tx.execute(
            "UPDATE settlements SET status = 'completed', settlement_time = ?1 WHERE id = ?2",
            params![settlement_time, settlement_id],
        )?;
        Ok(())
    }

    // ==========================================
    // customs_progress - 通关进度
    // ==========================================
    /// 表头不存在视为空操作; 未指定目标状态时落缺省终态 cleared
    fn handle_customs_progress(
        &self,
        tx: &Transaction<'_>,
        payload: &str,
    ) -> Result<(), DispatchError> {
        let doc: CustomsProgressPayload = decode_payload(payload)?;
        let header_id = match doc.header_id {
            Some(id) => id,
            None => {
                warn!("通关进度任务未携带 header_id, 视为空操作");
                return Ok(());
            }
        };
        let next_status = doc
            .next_status
            .unwrap_or_else(|| DEFAULT_CUSTOMS_CLEARED_STATUS.to_string());

        let changed = tx.execute(
            "UPDATE customs_headers SET status = ?1 WHERE id = ?2",
            params![next_status, header_id],
        )?;
        if changed == 0 {
            warn!("通关进度任务未命中表头, 视为空操作: header_id={}", header_id);
        }
        Ok(())
    }

    // ==========================================
    // customs_declare - 报关申报
    // ==========================================
    /// 表头缺失时创建 (已存在则保持原样不更新);
    /// 明细按 id 判重插入, 重放不产生重复行
    fn handle_customs_declare(
        &self,
        tx: &Transaction<'_>,
        payload: &str,
    ) -> Result<(), DispatchError> {
        let doc: CustomsDeclarePayload = decode_payload(payload)?;
        let header = doc.header.ok_or(DispatchError::MissingField("header.id"))?;
        let header_id = match header.id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(DispatchError::MissingField("header.id")),
        };

        let header_exists: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM customs_headers WHERE id = ?1",
                params![header_id],
                |row| row.get(0),
            )
            .optional()?;

        if header_exists.is_none() {
            tx.execute(
                r#"
                INSERT INTO customs_headers (
                    id, declaration_no, enterprise, port_code, trade_mode,
                    currency, total_value, status, declare_date, order_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, ?9)
                "#,
                params![
                    header_id,
                    header.declaration_no,
                    header.enterprise,
                    header.port_code,
                    header.trade_mode,
                    header.currency,
                    header.total_value,
                    header.status.unwrap_or_else(|| "declared".to_string()),
                    header.order_id,
                ],
            )?;
        }

        for item in doc.items {
            let item_id = match item.id {
                Some(id) if !id.is_empty() => id,
                _ => {
                    warn!("申报明细缺少 id, 跳过: header_id={}", header_id);
                    continue;
                }
            };

            let item_exists: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM customs_items WHERE id = ?1",
                    params![item_id],
                    |row| row.get(0),
                )
                .optional()?;
            if item_exists.is_some() {
                // 重放场景: 已有明细保持原样
                continue;
            }

            tx.execute(
                r#"
                INSERT INTO customs_items (
                    id, header_id, line_no, hs_code, name, spec, unit,
                    qty, unit_price, amount, origin_country, tax_rate,
                    tariff, excise, vat
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                "#,
                params![
                    item_id,
                    header_id,
                    item.line_no,
                    item.hs_code,
                    item.name,
                    item.spec,
                    item.unit,
                    item.qty,
                    item.unit_price,
                    item.amount,
                    item.origin_country,
                    item.tax_rate,
                    item.tariff,
                    item.excise,
                    item.vat,
                ],
            )?;
        }
        Ok(())
    }

    // ==========================================
    // logistics_milestone - 物流里程碑
    // ==========================================
    /// 运单不存在视为空操作; 未指定目标状态时按默认链推进
    /// (pickup → transit, 其余 → completed)。推进到 completed 时联动库存:
    /// 经运单 order_id 读订单品类, 映射中文商品名 (未识别归入通用商品),
    /// 库存行懒创建后固定入库 +10 —— 与状态更新同一事务
    fn handle_logistics_milestone(
        &self,
        tx: &Transaction<'_>,
        payload: &str,
    ) -> Result<(), DispatchError> {
        let doc: LogisticsMilestonePayload = decode_payload(payload)?;
        let logistics_id = match doc.id {
            Some(id) => id,
            None => {
                warn!("物流里程碑任务未携带 id, 视为空操作");
                return Ok(());
            }
        };

        let row: Option<(String, Option<String>)> = tx
            .query_row(
                "SELECT status, order_id FROM logistics WHERE id = ?1",
                params![logistics_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (current_status, order_id) = match row {
            Some(row) => row,
            None => {
                warn!("物流里程碑任务未命中运单, 视为空操作: id={}", logistics_id);
                return Ok(());
            }
        };

        let next_status = match doc.next_status {
            Some(s) => LogisticsStatus::parse(&s),
            None => LogisticsStatus::parse(&current_status).default_next(),
        };

        tx.execute(
            "UPDATE logistics SET status = ?1 WHERE id = ?2",
            params![next_status.as_str(), logistics_id],
        )?;

        if next_status.is_completed() {
            self.restock_inventory_for_order(tx, order_id.as_deref())?;
        }
        Ok(())
    }

    /// 物流完成后的库存联动: 品类 → 商品名映射区分大小写,
    /// 订单缺失或品类未识别均归入通用商品
    fn restock_inventory_for_order(
        &self,
        tx: &Transaction<'_>,
        order_id: Option<&str>,
    ) -> Result<(), DispatchError> {
        let category: Option<String> = match order_id {
            Some(order_id) => tx
                .query_row(
                    "SELECT category FROM orders WHERE id = ?1",
                    params![order_id],
                    |row| row.get(0),
                )
                .optional()?,
            None => None,
        };

        let name = category
            .map(|c| OrderCategory::parse(&c).inventory_name())
            .unwrap_or_else(|| OrderCategory::Other(String::new()).inventory_name());

        let exists: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM inventory WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            let defaults = crate::domain::inventory::Inventory::with_defaults(name);
            tx.execute(
                r#"
                INSERT INTO inventory (name, current, target, production, sales, efficiency)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    defaults.name,
                    defaults.current,
                    defaults.target,
                    defaults.production,
                    defaults.sales,
                    defaults.efficiency,
                ],
            )?;
        }

        tx.execute(
            "UPDATE inventory SET current = current + ?1 WHERE name = ?2",
            params![INVENTORY_RESTOCK_QTY, name],
        )?;
        info!("物流完成联动入库: name={}, qty={}", name, INVENTORY_RESTOCK_QTY);
        Ok(())
    }
}

impl From<DispatchError> for RepositoryError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::LockError(msg) => RepositoryError::LockError(msg),
            DispatchError::Storage(e) => e.into(),
            other => RepositoryError::InternalError(other.to_string()),
        }
    }
}
