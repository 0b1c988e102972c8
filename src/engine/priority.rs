// ==========================================
// 住院患者分配系统 - 患者优先级排序引擎
// ==========================================
// 职责: 非回弹患者的落位顺序排序
// 输入: 周期聚合中的患者池
// 输出: 按优先级排列的患者下标
// 红线: 双阳性患者必须紧随回弹之后落位 (最能破坏平衡,趁各条目
//       仍有最大弹性时优先安置)
// ==========================================

use crate::domain::distribution::Distribution;
use crate::domain::patient::Patient;
use std::cmp::Ordering;

// ==========================================
// PrioritySorter - 患者优先级排序引擎
// ==========================================
pub struct PrioritySorter {
    // 无状态引擎,不需要注入依赖
}

impl PrioritySorter {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 返回全部非回弹患者下标,按落位优先级排列
    ///
    /// 排序键:
    /// 1) CCU 降序
    /// 2) COVID 降序
    /// 3) 序号升序
    ///
    /// 即: 双阳性 → 仅CCU → 仅COVID → 双阴性,组内按序号
    pub fn ordered_non_bounceback_indices(&self, distribution: &Distribution) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..distribution.patients.len())
            .filter(|&index| !distribution.patients[index].is_bounceback())
            .collect();
        indices.sort_by(|&a, &b| {
            self.compare(&distribution.patients[a], &distribution.patients[b])
        });
        indices
    }

    // ==========================================
    // 比较方法
    // ==========================================

    /// 比较两名患者的落位优先级
    ///
    /// # 返回
    /// Ordering::Less 表示 a 优先于 b
    fn compare(&self, a: &Patient, b: &Patient) -> Ordering {
        // 1. CCU 降序
        match b.ccu.cmp(&a.ccu) {
            Ordering::Equal => {}
            other => return other,
        }

        // 2. COVID 降序
        match b.covid.cmp(&a.covid) {
            Ordering::Equal => {}
            other => return other,
        }

        // 3. 序号升序
        a.designation.cmp(&b.designation)
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for PrioritySorter {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_ordering_prioritizes_dual_positive_then_ccu_then_covid() {
        let mut distribution =
            Distribution::new(NaiveDate::from_ymd_opt(2021, 3, 15).unwrap());
        // (序号, CCU, COVID, 回弹)
        let fixtures = [
            (1, true, true, None),
            (2, true, false, None),
            (3, false, true, None),
            (4, false, false, None),
            (5, true, true, None),
            (6, true, false, None),
            (7, false, true, None),
            (8, false, false, Some("provA")),
            (9, true, true, Some("provA")),
            (10, true, false, None),
            (11, false, true, Some("provA")),
            (12, false, false, Some("provA")),
        ];
        for (designation, ccu, covid, bounce_to) in fixtures {
            distribution.add_patient(designation, ccu, covid, bounce_to);
        }

        let ordered_designations: Vec<i32> = PrioritySorter::new()
            .ordered_non_bounceback_indices(&distribution)
            .into_iter()
            .map(|index| distribution.patients[index].designation)
            .collect();

        // 回弹患者 (8, 9, 11, 12) 不参与排序
        assert_eq!(ordered_designations, vec![1, 5, 2, 6, 10, 3, 7, 4]);
    }

    #[test]
    fn test_ordering_is_stable_on_designation_within_group() {
        let mut distribution =
            Distribution::new(NaiveDate::from_ymd_opt(2021, 3, 15).unwrap());
        distribution.add_patient(7, false, true, None);
        distribution.add_patient(2, false, true, None);
        distribution.add_patient(5, false, true, None);

        let ordered_designations: Vec<i32> = PrioritySorter::new()
            .ordered_non_bounceback_indices(&distribution)
            .into_iter()
            .map(|index| distribution.patients[index].designation)
            .collect();

        assert_eq!(ordered_designations, vec![2, 5, 7]);
    }
}
