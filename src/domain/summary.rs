// ==========================================
// 住院患者分配系统 - 展示层读模型
// ==========================================
// 红线: 只是周期快照,不可反向污染领域实体
// ==========================================

use crate::domain::census::{AssignedCensus, OptimalCensus, StartingCensus};
use crate::domain::types::DistributionPhase;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// AllocatedCounts - 单条目落位分组计数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatedCounts {
    pub total: i32,         // 本周期落位总数
    pub bounceback: i32,    // 回弹
    pub dual_positive: i32, // 双阳性
    pub ccu_only: i32,      // 仅 CCU
    pub covid_only: i32,    // 仅 COVID
    pub dual_negative: i32, // 双阴性
}

// ==========================================
// LineItemSummary - 单条目快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemSummary {
    pub line_item_id: String,
    pub provider_code: String,
    pub position: i32,
    pub starting: StartingCensus,
    pub optimal: OptimalCensus,
    pub assigned: AssignedCensus,
    pub allocated: AllocatedCounts,
}

// ==========================================
// DistributionSummary - 周期快照
// ==========================================
// 用途: 供外部展示层渲染,条目按轮值顺序排列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub distribution_id: String,
    pub cycle_date: NaiveDate,
    pub phase: DistributionPhase,
    pub line_items: Vec<LineItemSummary>,
}
