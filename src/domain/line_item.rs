// ==========================================
// 住院患者分配系统 - 医生分配条目领域模型
// ==========================================
// 红线: 实际在册数只增不减,周期内条目不删除
// ==========================================

use crate::domain::census::{AssignedCensus, CensusDistance, OptimalCensus, StartingCensus};
use crate::domain::patient::Patient;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// LineItem - 医生分配条目
// ==========================================
// 一个分配周期内单个主治医生的参与记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub line_item_id: String,     // 条目ID
    pub provider_code: String,    // 医生代码 (周期内唯一,由调用方保证)
    pub position: i32,            // 轮值顺序 (周期内唯一,由调用方指定,核心不重算)
    pub starting: StartingCensus, // 起始在册数
    pub optimal: OptimalCensus,   // 目标在册数
    pub assigned: AssignedCensus, // 实际在册数
}

impl LineItem {
    /// 创建医生分配条目
    ///
    /// 目标在册数与实际在册数初始均等于起始在册数,
    /// 后续由目标计算引擎与落位引擎各自推进。
    pub fn new(provider_code: &str, starting: StartingCensus, position: i32) -> Self {
        Self {
            line_item_id: Uuid::new_v4().to_string(),
            provider_code: provider_code.to_string(),
            position,
            starting,
            optimal: OptimalCensus::from(starting),
            assigned: AssignedCensus::from(starting),
        }
    }

    /// 落位一名患者
    ///
    /// 立即更新实际在册数,同一轮后续患者据此选位。
    pub fn assign_patient(&mut self, patient: &mut Patient) {
        patient.assigned_line_item_id = Some(self.line_item_id.clone());
        self.assigned.admit(patient.ccu, patient.covid);
    }
}

// ==========================================
// CensusDistance trait 实现
// ==========================================
impl CensusDistance for LineItem {
    /// 检查是否还有总数空位
    fn has_space(&self) -> bool {
        self.assigned.total < self.optimal.total
    }

    /// 计算实际在册数到目标在册数的距离
    fn distance_to_optimal(&self) -> f64 {
        let ccu_gap = self.optimal.ccu - self.assigned.ccu as f64;
        let covid_gap = self.optimal.covid - self.assigned.covid as f64;
        (ccu_gap * ccu_gap + covid_gap * covid_gap).sqrt()
    }

    /// 计算接收一名患者后距离缩短了多少
    fn distance_moved_closer(&self, ccu: bool, covid: bool) -> f64 {
        let ccu_gap = self.optimal.ccu - self.assigned.ccu as f64 - if ccu { 1.0 } else { 0.0 };
        let covid_gap =
            self.optimal.covid - self.assigned.covid as f64 - if covid { 1.0 } else { 0.0 };
        self.distance_to_optimal() - (ccu_gap * ccu_gap + covid_gap * covid_gap).sqrt()
    }
}
