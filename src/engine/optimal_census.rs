// ==========================================
// 住院患者分配系统 - 目标在册数计算引擎
// ==========================================
// 职责: 由各医生起始在册数与患者池推算每位医生的目标在册数
// 输入: 周期聚合 (医生条目 + 患者池)
// 输出: 各条目 optimal 字段就地更新
// 红线: 计算顺序固定为 回弹预占 → 总数分摊 → 急重症加权
// 红线: 同一周期只允许计算一次,重入被阶段机拒绝
// ==========================================

use crate::domain::distribution::Distribution;
use crate::domain::types::DistributionPhase;
use crate::engine::error::{EngineError, EngineResult};
use tracing::{debug, instrument};

// ==========================================
// OptimalCensusCalculator - 目标在册数计算引擎
// ==========================================
pub struct OptimalCensusCalculator {
    // 无状态引擎,不需要注入依赖
}

impl OptimalCensusCalculator {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算本周期各医生条目的目标在册数
    ///
    /// 三个步骤依次执行:
    /// 1) 回弹预占: 回弹患者先计入目标条目的 optimal
    /// 2) 总数分摊: 非回弹患者逐个分给当前 optimal.total 最低的条目
    /// 3) 急重症加权: 按 optimal.total 权重折算各条目的 CCU/COVID 目标
    ///
    /// # 参数
    /// - `distribution`: 周期聚合 (就地更新各条目 optimal)
    ///
    /// # 返回
    /// - `Ok(())`: 计算完成,周期进入 OPTIMAL_COMPUTED 阶段
    /// - `Err(InvalidPhase)`: 周期不在 CREATED 阶段
    /// - `Err(UnmatchedBounceback)`: 回弹目标医生不在本周期内
    /// - `Err(DivisionByZero)`: 无医生条目,或目标总数均值为 0
    #[instrument(skip(self, distribution), fields(
        distribution_id = %distribution.distribution_id,
        line_item_count = distribution.line_items.len(),
        patient_count = distribution.patients.len()
    ))]
    pub fn calculate(&self, distribution: &mut Distribution) -> EngineResult<()> {
        if distribution.phase != DistributionPhase::Created {
            return Err(EngineError::InvalidPhase {
                expected: DistributionPhase::Created,
                actual: distribution.phase,
            });
        }
        if distribution.line_items.is_empty() {
            return Err(EngineError::DivisionByZero {
                context: "line_item_count == 0".to_string(),
            });
        }

        self.allocate_bounceback_patients(distribution)?;
        self.set_optimal_totals(distribution);
        self.set_optimal_acuity(distribution)?;

        distribution.phase = DistributionPhase::OptimalComputed;
        debug!("目标在册数计算完成");
        Ok(())
    }

    // ==========================================
    // 步骤实现
    // ==========================================

    /// 回弹预占
    ///
    /// 回弹患者不参与分摊,直接计入目标医生条目:
    /// optimal.total +1,对应急重症标志 +1。
    /// (CCU/COVID 增量随后会被加权步骤覆盖,只有 total 存留。)
    fn allocate_bounceback_patients(&self, distribution: &mut Distribution) -> EngineResult<()> {
        for patient_index in distribution.bounceback_patient_indices() {
            let (designation, ccu, covid, provider_code) = {
                let patient = &distribution.patients[patient_index];
                let provider_code = match &patient.bounce_to {
                    Some(code) => code.clone(),
                    None => continue,
                };
                (patient.designation, patient.ccu, patient.covid, provider_code)
            };

            let line_item_index = distribution
                .line_item_index_by_provider(&provider_code)
                .ok_or(EngineError::UnmatchedBounceback {
                    designation,
                    provider_code: provider_code.clone(),
                })?;

            let line_item = &mut distribution.line_items[line_item_index];
            line_item.optimal.total += 1;
            if ccu {
                line_item.optimal.ccu += 1.0;
            }
            if covid {
                line_item.optimal.covid += 1.0;
            }
            debug!(designation, provider_code = %provider_code, "回弹患者预占目标在册数");
        }
        Ok(())
    }

    /// 总数分摊
    ///
    /// 非回弹患者逐个分摊: 每次扫描全部条目,
    /// 把 1 个名额加给当前 optimal.total 最低的条目。
    /// 平手时取轮值顺序靠后的条目 (<= 扫描,后到的同值条目替换候选)。
    fn set_optimal_totals(&self, distribution: &mut Distribution) {
        let ordered_indices = distribution.ordered_line_item_indices();
        let count_to_distribute = distribution.non_bounceback_count();

        for _ in 0..count_to_distribute {
            let mut lowest: Option<usize> = None;
            for &index in &ordered_indices {
                lowest = match lowest {
                    None => Some(index),
                    Some(current) => {
                        if distribution.line_items[index].optimal.total
                            <= distribution.line_items[current].optimal.total
                        {
                            Some(index)
                        } else {
                            Some(current)
                        }
                    }
                };
            }
            if let Some(index) = lowest {
                distribution.line_items[index].optimal.total += 1;
            }
        }
    }

    /// 急重症加权
    ///
    /// 全周期 CCU/COVID 目标均值 = (起始合计 + 非回弹患者中阳性数) / 条目数;
    /// 各条目按 optimal.total / 总数均值 加权折算,结果为小数,不取整。
    fn set_optimal_acuity(&self, distribution: &mut Distribution) -> EngineResult<()> {
        let line_item_count = distribution.line_items.len() as f64;

        let starting_ccu_sum: i32 = distribution
            .line_items
            .iter()
            .map(|line_item| line_item.starting.ccu)
            .sum();
        let starting_covid_sum: i32 = distribution
            .line_items
            .iter()
            .map(|line_item| line_item.starting.covid)
            .sum();

        // 目标构成按非回弹患者统计
        let ccu_patient_count = distribution
            .patients
            .iter()
            .filter(|patient| !patient.is_bounceback() && patient.ccu)
            .count() as f64;
        let covid_patient_count = distribution
            .patients
            .iter()
            .filter(|patient| !patient.is_bounceback() && patient.covid)
            .count() as f64;

        let optimal_total_sum: i32 = distribution
            .line_items
            .iter()
            .map(|line_item| line_item.optimal.total)
            .sum();
        let average_optimal_total = optimal_total_sum as f64 / line_item_count;
        if average_optimal_total == 0.0 {
            return Err(EngineError::DivisionByZero {
                context: "average optimal total == 0".to_string(),
            });
        }

        let target_ccu = (starting_ccu_sum as f64 + ccu_patient_count) / line_item_count;
        let target_covid = (starting_covid_sum as f64 + covid_patient_count) / line_item_count;

        for line_item in &mut distribution.line_items {
            let weight = line_item.optimal.total as f64 / average_optimal_total;
            line_item.optimal.ccu = weight * target_ccu;
            line_item.optimal.covid = weight * target_covid;
        }
        Ok(())
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for OptimalCensusCalculator {
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
    use crate::domain::census::StartingCensus;
    use chrono::NaiveDate;

    // ==========================================
    // 测试辅助函数
    // ==========================================

    /// 创建带 4 条样例医生条目的周期
    /// 轮值顺序读取时: 总数 [11,13,10,11], CCU [3,2,2,1], COVID [3,1,0,2]
    fn create_sample_distribution() -> Distribution {
        let mut distribution =
            Distribution::new(NaiveDate::from_ymd_opt(2021, 3, 15).unwrap());
        let providers = ["provA", "provB", "provC", "provD"];
        let totals = [10, 11, 13, 11];
        let ccus = [2, 3, 2, 1];
        let covids = [0, 3, 1, 2];
        let positions = [3, 1, 2, 4];
        for i in 0..4 {
            distribution.create_line_item(
                providers[i],
                StartingCensus::new(totals[i], ccus[i], covids[i]),
                positions[i],
            );
        }
        distribution
    }

    /// 录入混合患者: 偶数号 COVID 阳性,每 3 个 CCU 阳性,每 5 个为回弹
    fn add_motley_patients(distribution: &mut Distribution, patient_count: usize) {
        let providers = ["provA", "provB", "provC", "provD"];
        for i in 0..patient_count {
            let covid = i % 2 == 0;
            let ccu = i % 3 == 0;
            let bounce_to = if i % 5 == 0 {
                Some(providers[(i / 4) % 5])
            } else {
                None
            };
            distribution.add_patient((i + 1) as i32, ccu, covid, bounce_to);
        }
    }

    /// 录入纯回弹患者: 交替回弹到 provC / provB
    fn add_bounceback_patients(distribution: &mut Distribution, patient_count: usize) {
        let providers = ["provC", "provB"];
        for i in 0..patient_count {
            let covid = i % 2 == 0;
            let ccu = i % 3 == 0;
            distribution.add_patient((i + 1) as i32, ccu, covid, Some(providers[i % 2]));
        }
    }

    fn ordered_optimal_totals(distribution: &Distribution) -> Vec<i32> {
        distribution
            .ordered_line_items()
            .iter()
            .map(|line_item| line_item.optimal.total)
            .collect()
    }

    // ==========================================
    // 总数分摊测试
    // ==========================================

    #[test]
    fn test_single_patient_goes_to_lowest_total_line_item() {
        let mut distribution = create_sample_distribution();
        distribution.add_patient(1, false, false, None);

        OptimalCensusCalculator::new().calculate(&mut distribution).unwrap();

        assert_eq!(ordered_optimal_totals(&distribution), vec![11, 13, 11, 11]);
    }

    #[test]
    fn test_single_bounceback_allocates_to_listed_provider() {
        let mut distribution = create_sample_distribution();
        // provC 在轮值顺序中排第二
        distribution.add_patient(1, false, true, Some("provC"));

        OptimalCensusCalculator::new().calculate(&mut distribution).unwrap();

        assert_eq!(ordered_optimal_totals(&distribution), vec![11, 14, 10, 11]);
    }

    #[test]
    fn test_bounceback_patients_allocate_to_listed_providers() {
        let mut distribution = create_sample_distribution();
        add_bounceback_patients(&mut distribution, 9);

        OptimalCensusCalculator::new().calculate(&mut distribution).unwrap();

        assert_eq!(ordered_optimal_totals(&distribution), vec![15, 18, 10, 11]);
    }

    #[test]
    fn test_mixed_patients_allocate_after_bounceback_preallocation() {
        let mut distribution = create_sample_distribution();
        add_bounceback_patients(&mut distribution, 9);
        // 再录入 4 名混合患者 (序号续接)
        let providers = ["provA", "provB", "provC", "provD"];
        for i in 0..4usize {
            let covid = i % 2 == 0;
            let ccu = i % 3 == 0;
            let bounce_to = if i % 5 == 0 { Some(providers[(i / 4) % 5]) } else { None };
            distribution.add_patient((i + 10) as i32, ccu, covid, bounce_to);
        }

        OptimalCensusCalculator::new().calculate(&mut distribution).unwrap();

        // 平手时后到的同值条目获得名额
        assert_eq!(ordered_optimal_totals(&distribution), vec![15, 18, 12, 13]);
    }

    #[test]
    fn test_optimal_totals_with_30_motley_patients() {
        let mut distribution = create_sample_distribution();
        add_motley_patients(&mut distribution, 30);

        OptimalCensusCalculator::new().calculate(&mut distribution).unwrap();

        assert_eq!(ordered_optimal_totals(&distribution), vec![18, 19, 19, 19]);
    }

    #[test]
    fn test_total_distribution_conservation() {
        let mut distribution = create_sample_distribution();
        add_motley_patients(&mut distribution, 17);

        let starting_sum: i32 = distribution
            .line_items
            .iter()
            .map(|line_item| line_item.starting.total)
            .sum();

        OptimalCensusCalculator::new().calculate(&mut distribution).unwrap();

        let optimal_sum: i32 = distribution
            .line_items
            .iter()
            .map(|line_item| line_item.optimal.total)
            .sum();
        assert_eq!(optimal_sum, starting_sum + 17);
    }

    // ==========================================
    // 急重症加权测试
    // ==========================================

    #[test]
    fn test_optimal_ccu_weighted_by_total() {
        let mut distribution = create_sample_distribution();
        add_motley_patients(&mut distribution, 30);

        OptimalCensusCalculator::new().calculate(&mut distribution).unwrap();

        // 非回弹 CCU 阳性 8 名; 目标均值 (8 + 8) / 4 = 4.0; 总数均值 75 / 4 = 18.75
        let expected: Vec<f64> = vec![
            18.0 / 18.75 * 4.0,
            19.0 / 18.75 * 4.0,
            19.0 / 18.75 * 4.0,
            19.0 / 18.75 * 4.0,
        ];
        let actual: Vec<f64> = distribution
            .ordered_line_items()
            .iter()
            .map(|line_item| line_item.optimal.ccu)
            .collect();
        for (value, want) in actual.iter().zip(expected.iter()) {
            assert!((value - want).abs() < 1e-9);
        }
        assert!((actual[0] - 3.84).abs() < 1e-9);
    }

    #[test]
    fn test_optimal_covid_weighted_by_total() {
        let mut distribution = create_sample_distribution();
        add_motley_patients(&mut distribution, 30);

        OptimalCensusCalculator::new().calculate(&mut distribution).unwrap();

        // 非回弹 COVID 阳性 12 名; 目标均值 (6 + 12) / 4 = 4.5
        let expected: Vec<f64> = vec![
            18.0 / 18.75 * 4.5,
            19.0 / 18.75 * 4.5,
            19.0 / 18.75 * 4.5,
            19.0 / 18.75 * 4.5,
        ];
        let actual: Vec<f64> = distribution
            .ordered_line_items()
            .iter()
            .map(|line_item| line_item.optimal.covid)
            .collect();
        for (value, want) in actual.iter().zip(expected.iter()) {
            assert!((value - want).abs() < 1e-9);
        }
        assert!((actual[0] - 4.32).abs() < 1e-9);
    }

    // ==========================================
    // 错误与阶段机测试
    // ==========================================

    #[test]
    fn test_empty_distribution_is_division_by_zero() {
        let mut distribution =
            Distribution::new(NaiveDate::from_ymd_opt(2021, 3, 15).unwrap());
        distribution.add_patient(1, false, false, None);

        let result = OptimalCensusCalculator::new().calculate(&mut distribution);

        assert!(matches!(result, Err(EngineError::DivisionByZero { .. })));
    }

    #[test]
    fn test_unmatched_bounceback_is_rejected() {
        let mut distribution = create_sample_distribution();
        distribution.add_patient(1, true, false, Some("provX"));

        let result = OptimalCensusCalculator::new().calculate(&mut distribution);

        assert_eq!(
            result,
            Err(EngineError::UnmatchedBounceback {
                designation: 1,
                provider_code: "provX".to_string(),
            })
        );
    }

    #[test]
    fn test_second_calculation_is_rejected_by_phase() {
        let mut distribution = create_sample_distribution();
        distribution.add_patient(1, false, false, None);

        let calculator = OptimalCensusCalculator::new();
        calculator.calculate(&mut distribution).unwrap();
        let result = calculator.calculate(&mut distribution);

        assert_eq!(
            result,
            Err(EngineError::InvalidPhase {
                expected: DistributionPhase::Created,
                actual: DistributionPhase::OptimalComputed,
            })
        );
    }
}
