// ==========================================
// 住院患者分配系统 - 患者领域模型
// ==========================================
// 红线: 患者只会被落位一次,核心不做删除
// ==========================================

use crate::domain::types::AcuityGroup;
use serde::{Deserialize, Serialize};

// ==========================================
// Patient - 待分配患者
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub designation: i32,                      // 周期内稳定序号 (同优先级时的平手裁决键)
    pub ccu: bool,                             // CCU 标志
    pub covid: bool,                           // COVID 标志
    pub bounce_to: Option<String>,             // 回弹目标医生代码 (硬性指定)
    pub assigned_line_item_id: Option<String>, // 落位后的医生条目ID (弱引用,仅设置一次)
}

impl Patient {
    pub fn new(designation: i32, ccu: bool, covid: bool, bounce_to: Option<&str>) -> Self {
        Self {
            designation,
            ccu,
            covid,
            bounce_to: bounce_to.map(|code| code.to_string()),
            assigned_line_item_id: None,
        }
    }

    /// 判断是否为回弹患者
    pub fn is_bounceback(&self) -> bool {
        self.bounce_to.is_some()
    }

    /// 按急重症标志归组
    pub fn acuity_group(&self) -> AcuityGroup {
        match (self.ccu, self.covid) {
            (true, true) => AcuityGroup::DualPositive,
            (true, false) => AcuityGroup::CcuOnly,
            (false, true) => AcuityGroup::CovidOnly,
            (false, false) => AcuityGroup::DualNegative,
        }
    }
}
