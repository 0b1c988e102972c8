// ==========================================
// 住院患者分配系统 - 分配周期聚合根
// ==========================================
// 职责: 持有一个周期内的医生条目与患者,提供读视图与落位提交
// 红线: 聚合视图 (排序/计数/分组) 一律现算,不做缓存
// 红线: 不持有"最近周期"之类的全局指针,周期句柄由调用方显式传递
// ==========================================

use crate::domain::census::StartingCensus;
use crate::domain::line_item::LineItem;
use crate::domain::patient::Patient;
use crate::domain::summary::{AllocatedCounts, DistributionSummary, LineItemSummary};
use crate::domain::types::{AcuityGroup, DistributionPhase};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// AllocatedPatients - 单条目落位患者分组视图
// ==========================================
// 分组顺序: 回弹,双阳性,仅CCU,仅COVID,双阴性; 组内按序号升序
#[derive(Debug, Default)]
pub struct AllocatedPatients<'a> {
    pub bounceback: Vec<&'a Patient>,
    pub dual_positive: Vec<&'a Patient>,
    pub ccu_only: Vec<&'a Patient>,
    pub covid_only: Vec<&'a Patient>,
    pub dual_negative: Vec<&'a Patient>,
}

// ==========================================
// Distribution - 分配周期
// ==========================================
// 每日一个周期; 医生条目按轮值顺序读取
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub distribution_id: String,       // 周期ID
    pub cycle_date: NaiveDate,         // 周期日期
    pub phase: DistributionPhase,      // 周期阶段
    pub line_items: Vec<LineItem>,     // 医生分配条目
    pub patients: Vec<Patient>,        // 待分配患者
}

impl Distribution {
    /// 创建空白分配周期
    pub fn new(cycle_date: NaiveDate) -> Self {
        Self {
            distribution_id: Uuid::new_v4().to_string(),
            cycle_date,
            phase: DistributionPhase::Created,
            line_items: Vec::new(),
            patients: Vec::new(),
        }
    }

    /// 从上一周期延续创建新周期
    ///
    /// 复制上一周期各条目的医生代码/起始在册数/轮值顺序;
    /// 新条目的目标与实际在册数重置为起始在册数 (不延续已落位结果)。
    pub fn carry_forward_from(prior: &Distribution, cycle_date: NaiveDate) -> Self {
        let mut distribution = Self::new(cycle_date);
        for line_item in prior.ordered_line_items() {
            distribution.create_line_item(
                &line_item.provider_code,
                line_item.starting,
                line_item.position,
            );
        }
        distribution
    }

    // ==========================================
    // 实体工厂
    // ==========================================

    /// 录入一条医生分配条目
    ///
    /// 医生代码与轮值顺序的周期内唯一性由调用方保证。
    pub fn create_line_item(
        &mut self,
        provider_code: &str,
        starting: StartingCensus,
        position: i32,
    ) -> &LineItem {
        let index = self.line_items.len();
        self.line_items.push(LineItem::new(provider_code, starting, position));
        &self.line_items[index]
    }

    /// 录入一名待分配患者
    pub fn add_patient(
        &mut self,
        designation: i32,
        ccu: bool,
        covid: bool,
        bounce_to: Option<&str>,
    ) -> &Patient {
        let index = self.patients.len();
        self.patients.push(Patient::new(designation, ccu, covid, bounce_to));
        &self.patients[index]
    }

    // ==========================================
    // 读视图 (现算,不缓存)
    // ==========================================

    /// 按轮值顺序返回医生条目
    pub fn ordered_line_items(&self) -> Vec<&LineItem> {
        let mut ordered: Vec<&LineItem> = self.line_items.iter().collect();
        ordered.sort_by_key(|line_item| line_item.position);
        ordered
    }

    /// 按轮值顺序返回医生条目下标 (供引擎做可变访问)
    pub fn ordered_line_item_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.line_items.len()).collect();
        indices.sort_by_key(|&index| self.line_items[index].position);
        indices
    }

    /// 按医生代码查找条目下标
    pub fn line_item_index_by_provider(&self, provider_code: &str) -> Option<usize> {
        self.line_items
            .iter()
            .position(|line_item| line_item.provider_code == provider_code)
    }

    /// 按条目ID查找条目
    pub fn line_item_by_id(&self, line_item_id: &str) -> Option<&LineItem> {
        self.line_items
            .iter()
            .find(|line_item| line_item.line_item_id == line_item_id)
    }

    /// 按序号升序返回回弹患者下标
    pub fn bounceback_patient_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.patients.len())
            .filter(|&index| self.patients[index].is_bounceback())
            .collect();
        indices.sort_by_key(|&index| self.patients[index].designation);
        indices
    }

    /// 统计非回弹患者数 (待分摊数)
    pub fn non_bounceback_count(&self) -> usize {
        self.patients
            .iter()
            .filter(|patient| !patient.is_bounceback())
            .count()
    }

    /// 返回指定条目已落位患者的分组视图
    pub fn allocated_patients(&self, line_item_id: &str) -> AllocatedPatients<'_> {
        let mut assigned: Vec<&Patient> = self
            .patients
            .iter()
            .filter(|patient| patient.assigned_line_item_id.as_deref() == Some(line_item_id))
            .collect();
        assigned.sort_by_key(|patient| patient.designation);

        let mut groups = AllocatedPatients::default();
        for patient in assigned {
            if patient.is_bounceback() {
                groups.bounceback.push(patient);
                continue;
            }
            match patient.acuity_group() {
                AcuityGroup::DualPositive => groups.dual_positive.push(patient),
                AcuityGroup::CcuOnly => groups.ccu_only.push(patient),
                AcuityGroup::CovidOnly => groups.covid_only.push(patient),
                AcuityGroup::DualNegative => groups.dual_negative.push(patient),
            }
        }
        groups
    }

    /// 返回指定条目已落位患者的分组计数
    pub fn allocated_counts(&self, line_item_id: &str) -> AllocatedCounts {
        let groups = self.allocated_patients(line_item_id);
        AllocatedCounts {
            total: (groups.bounceback.len()
                + groups.dual_positive.len()
                + groups.ccu_only.len()
                + groups.covid_only.len()
                + groups.dual_negative.len()) as i32,
            bounceback: groups.bounceback.len() as i32,
            dual_positive: groups.dual_positive.len() as i32,
            ccu_only: groups.ccu_only.len() as i32,
            covid_only: groups.covid_only.len() as i32,
            dual_negative: groups.dual_negative.len() as i32,
        }
    }

    /// 生成面向展示层的周期快照
    pub fn summary(&self) -> DistributionSummary {
        DistributionSummary {
            distribution_id: self.distribution_id.clone(),
            cycle_date: self.cycle_date,
            phase: self.phase,
            line_items: self
                .ordered_line_items()
                .into_iter()
                .map(|line_item| LineItemSummary {
                    line_item_id: line_item.line_item_id.clone(),
                    provider_code: line_item.provider_code.clone(),
                    position: line_item.position,
                    starting: line_item.starting,
                    optimal: line_item.optimal,
                    assigned: line_item.assigned,
                    allocated: self.allocated_counts(&line_item.line_item_id),
                })
                .collect(),
        }
    }

    // ==========================================
    // 落位提交
    // ==========================================

    /// 提交一次落位: 设置患者回引,累加条目实际在册数
    ///
    /// 立即生效,同一轮后续患者的选位以更新后的实际在册数为准。
    pub fn commit_assignment(&mut self, patient_index: usize, line_item_index: usize) {
        let line_item = &mut self.line_items[line_item_index];
        let patient = &mut self.patients[patient_index];
        line_item.assign_patient(patient);
    }
}
