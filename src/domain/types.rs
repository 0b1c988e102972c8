// ==========================================
// 住院患者分配系统 - 领域类型定义
// ==========================================
// 红线: 周期状态机单向推进,不允许回退
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 分配周期阶段 (Distribution Phase)
// ==========================================
// 单向状态机: Created → OptimalComputed → BouncebacksAssigned → FullyAssigned
// 用途: 引擎在错误阶段重入会重复累加,必须被拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistributionPhase {
    Created,             // 周期已创建,患者与医生条目录入中
    OptimalComputed,     // 目标在册数已计算
    BouncebacksAssigned, // 回弹患者已落位
    FullyAssigned,       // 全部患者已落位
}

impl fmt::Display for DistributionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributionPhase::Created => write!(f, "CREATED"),
            DistributionPhase::OptimalComputed => write!(f, "OPTIMAL_COMPUTED"),
            DistributionPhase::BouncebacksAssigned => write!(f, "BOUNCEBACKS_ASSIGNED"),
            DistributionPhase::FullyAssigned => write!(f, "FULLY_ASSIGNED"),
        }
    }
}

// ==========================================
// 急重症分组 (Acuity Group)
// ==========================================
// 双阳性患者最容易破坏在册数平衡,分组用于排序与展示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcuityGroup {
    DualPositive, // CCU 阳性且 COVID 阳性
    CcuOnly,      // 仅 CCU 阳性
    CovidOnly,    // 仅 COVID 阳性
    DualNegative, // 双阴性
}

impl fmt::Display for AcuityGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcuityGroup::DualPositive => write!(f, "DUAL_POSITIVE"),
            AcuityGroup::CcuOnly => write!(f, "CCU_ONLY"),
            AcuityGroup::CovidOnly => write!(f, "COVID_ONLY"),
            AcuityGroup::DualNegative => write!(f, "DUAL_NEGATIVE"),
        }
    }
}
