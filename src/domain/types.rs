// ==========================================
// 跨境供应链协同平台 - 领域类型定义
// ==========================================
// 职责: 状态/类别等封闭枚举, 统一数据库与接口的字符串表示
// 说明: 库表与任务载荷均使用小写字符串, 未识别取值保留原文
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 任务类型 (Job Type)
// ==========================================
// 四种业务任务 + 未识别类型(保留原文, 调度时视为空操作)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobType {
    SettlementComplete,
    CustomsProgress,
    CustomsDeclare,
    LogisticsMilestone,
    Other(String),
}

impl JobType {
    /// 从字符串解析任务类型, 未识别的保留原文
    pub fn parse(s: &str) -> Self {
        match s {
            "settlement_complete" => JobType::SettlementComplete,
            "customs_progress" => JobType::CustomsProgress,
            "customs_declare" => JobType::CustomsDeclare,
            "logistics_milestone" => JobType::LogisticsMilestone,
            _ => JobType::Other(s.to_string()),
        }
    }

    /// 转换为数据库存储的字符串
    pub fn as_str(&self) -> &str {
        match self {
            JobType::SettlementComplete => "settlement_complete",
            JobType::CustomsProgress => "customs_progress",
            JobType::CustomsDeclare => "customs_declare",
            JobType::LogisticsMilestone => "logistics_milestone",
            JobType::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for JobType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(JobType::parse(&s))
    }
}

// ==========================================
// 任务状态 (Job Status)
// ==========================================
// 状态机: pending → processing → done / failed
// 终态不可再变更, 失败不重试
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,    // 待处理
    Processing, // 处理中
    Done,       // 已完成
    Failed,     // 已失败
}

impl JobStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s {
            "pending" => JobStatus::Pending,
            "processing" => JobStatus::Processing,
            "done" => JobStatus::Done,
            _ => JobStatus::Failed, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 订单品类 (Order Category)
// ==========================================
// 解析按小写精确匹配; 库存联动等场景区分大小写,
// 合规评分前先调用 normalized() 做大小写归一
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderCategory {
    Electronics,
    Beauty,
    Textile,
    Wine,
    Appliance,
    Other(String),
}

impl OrderCategory {
    /// 从字符串解析品类, 未识别的保留原文
    pub fn parse(s: &str) -> Self {
        match s {
            "electronics" => OrderCategory::Electronics,
            "beauty" => OrderCategory::Beauty,
            "textile" => OrderCategory::Textile,
            "wine" => OrderCategory::Wine,
            "appliance" => OrderCategory::Appliance,
            _ => OrderCategory::Other(s.to_string()),
        }
    }

    /// 转换为数据库存储的字符串
    pub fn as_str(&self) -> &str {
        match self {
            OrderCategory::Electronics => "electronics",
            OrderCategory::Beauty => "beauty",
            OrderCategory::Textile => "textile",
            OrderCategory::Wine => "wine",
            OrderCategory::Appliance => "appliance",
            OrderCategory::Other(s) => s.as_str(),
        }
    }

    /// 忽略大小写重新归类
    pub fn normalized(&self) -> OrderCategory {
        OrderCategory::parse(&self.as_str().to_lowercase())
    }

    /// 品类对应的库存商品名, 未识别品类归入通用商品
    pub fn inventory_name(&self) -> &'static str {
        match self {
            OrderCategory::Electronics => "电子产品",
            OrderCategory::Beauty => "化妆品",
            OrderCategory::Textile => "服装",
            OrderCategory::Wine => "食品",
            OrderCategory::Appliance => "机械设备",
            OrderCategory::Other(_) => "通用商品",
        }
    }
}

impl fmt::Display for OrderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for OrderCategory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderCategory {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(OrderCategory::parse(&s))
    }
}

// ==========================================
// 物流状态 (Logistics Status)
// ==========================================
// 里程碑链: pickup → transit → customs → completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogisticsStatus {
    Pickup,
    Transit,
    Customs,
    Completed,
    Other(String),
}

impl LogisticsStatus {
    /// 从字符串解析状态, 未识别的保留原文
    pub fn parse(s: &str) -> Self {
        match s {
            "pickup" => LogisticsStatus::Pickup,
            "transit" => LogisticsStatus::Transit,
            "customs" => LogisticsStatus::Customs,
            "completed" => LogisticsStatus::Completed,
            _ => LogisticsStatus::Other(s.to_string()),
        }
    }

    /// 转换为数据库存储的字符串
    pub fn as_str(&self) -> &str {
        match self {
            LogisticsStatus::Pickup => "pickup",
            LogisticsStatus::Transit => "transit",
            LogisticsStatus::Customs => "customs",
            LogisticsStatus::Completed => "completed",
            LogisticsStatus::Other(s) => s.as_str(),
        }
    }

    /// 未显式指定目标状态时的默认推进: 提货后进入运输, 其余直接完成
    pub fn default_next(&self) -> LogisticsStatus {
        match self {
            LogisticsStatus::Pickup => LogisticsStatus::Transit,
            _ => LogisticsStatus::Completed,
        }
    }

    /// 是否已完成
    pub fn is_completed(&self) -> bool {
        matches!(self, LogisticsStatus::Completed)
    }
}

impl fmt::Display for LogisticsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for LogisticsStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LogisticsStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(LogisticsStatus::parse(&s))
    }
}

// ==========================================
// 结算状态 (Settlement Status)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementStatus {
    Pending,
    Processing,
    Completed,
    Other(String),
}

impl SettlementStatus {
    /// 从字符串解析状态, 未识别的保留原文
    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => SettlementStatus::Pending,
            "processing" => SettlementStatus::Processing,
            "completed" => SettlementStatus::Completed,
            _ => SettlementStatus::Other(s.to_string()),
        }
    }

    /// 转换为数据库存储的字符串
    pub fn as_str(&self) -> &str {
        match self {
            SettlementStatus::Pending => "pending",
            SettlementStatus::Processing => "processing",
            SettlementStatus::Completed => "completed",
            SettlementStatus::Other(s) => s.as_str(),
        }
    }

    /// 是否已完成
    pub fn is_completed(&self) -> bool {
        matches!(self, SettlementStatus::Completed)
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for SettlementStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SettlementStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(SettlementStatus::parse(&s))
    }
}

// ==========================================
// 风险等级 (Risk Level)
// ==========================================
// 顺序: Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,    // 低风险
    Medium, // 中风险
    High,   // 高风险
}

impl RiskLevel {
    /// 从字符串解析等级
    pub fn from_str(s: &str) -> Self {
        match s {
            "medium" => RiskLevel::Medium,
            "high" => RiskLevel::High,
            _ => RiskLevel::Low, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
