// ==========================================
// 住院患者分配系统 - 贪心落位引擎
// ==========================================
// 职责: 把患者逐个落位到医生条目,实际在册数实时推进
// 输入: 已计算目标在册数的周期聚合 + 排序后患者下标
// 输出: 患者回引 + 各条目 assigned 字段就地更新
// 红线: 回弹患者先于贪心落位; 落位即时生效,不做批量提交
// 红线: 已超出目标构成的条目只要有总数空位仍可入选 (得分为负,
//       排位自然靠后)
// ==========================================

use crate::domain::census::CensusDistance;
use crate::domain::distribution::Distribution;
use crate::domain::line_item::LineItem;
use crate::domain::patient::Patient;
use crate::domain::types::DistributionPhase;
use crate::engine::error::{EngineError, EngineResult};
use tracing::{debug, instrument};

// ==========================================
// AssignmentEngine - 贪心落位引擎
// ==========================================
pub struct AssignmentEngine {
    // 无状态引擎,不需要注入依赖
}

impl AssignmentEngine {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 回弹患者落位
    ///
    /// 按序号升序把每名回弹患者落位到指定医生条目。
    /// 回弹不参与贪心选位,顺序只影响落位记录顺序,不影响在册数结果。
    ///
    /// # 返回
    /// 落位的回弹患者数; 周期进入 BOUNCEBACKS_ASSIGNED 阶段
    #[instrument(skip(self, distribution), fields(
        distribution_id = %distribution.distribution_id
    ))]
    pub fn assign_bounceback_patients(
        &self,
        distribution: &mut Distribution,
    ) -> EngineResult<usize> {
        if distribution.phase != DistributionPhase::OptimalComputed {
            return Err(EngineError::InvalidPhase {
                expected: DistributionPhase::OptimalComputed,
                actual: distribution.phase,
            });
        }

        let bounceback_indices = distribution.bounceback_patient_indices();
        for &patient_index in &bounceback_indices {
            let (designation, provider_code) = {
                let patient = &distribution.patients[patient_index];
                let provider_code = match &patient.bounce_to {
                    Some(code) => code.clone(),
                    None => continue,
                };
                (patient.designation, provider_code)
            };

            let line_item_index = distribution
                .line_item_index_by_provider(&provider_code)
                .ok_or(EngineError::UnmatchedBounceback {
                    designation,
                    provider_code: provider_code.clone(),
                })?;

            distribution.commit_assignment(patient_index, line_item_index);
            debug!(designation, provider_code = %provider_code, "回弹患者已落位");
        }

        distribution.phase = DistributionPhase::BouncebacksAssigned;
        Ok(bounceback_indices.len())
    }

    /// 非回弹患者按给定顺序贪心落位
    ///
    /// 对每名患者选出"接收后向目标推进最多"的条目并立即提交,
    /// 同一轮后续患者看到的是更新后的实际在册数。
    ///
    /// # 参数
    /// - `ordered_patient_indices`: 排序引擎产出的患者下标序列
    ///
    /// # 返回
    /// 落位的患者数; 周期进入 FULLY_ASSIGNED 阶段
    #[instrument(skip(self, distribution, ordered_patient_indices), fields(
        distribution_id = %distribution.distribution_id,
        patient_count = ordered_patient_indices.len()
    ))]
    pub fn assign_patients_in_order(
        &self,
        distribution: &mut Distribution,
        ordered_patient_indices: &[usize],
    ) -> EngineResult<usize> {
        if distribution.phase != DistributionPhase::BouncebacksAssigned {
            return Err(EngineError::InvalidPhase {
                expected: DistributionPhase::BouncebacksAssigned,
                actual: distribution.phase,
            });
        }

        for &patient_index in ordered_patient_indices {
            let line_item_index =
                self.select_line_item(distribution, &distribution.patients[patient_index])?;
            let reason = self.generate_assign_reason(
                &distribution.line_items[line_item_index],
                &distribution.patients[patient_index],
            );
            debug!(reason = %reason, "贪心落位");
            distribution.commit_assignment(patient_index, line_item_index);
        }

        distribution.phase = DistributionPhase::FullyAssigned;
        Ok(ordered_patient_indices.len())
    }

    /// 选出接收该患者后向目标推进最多的条目
    ///
    /// 规则:
    /// 1) 仅在 assigned.total < optimal.total 的条目中选取
    /// 2) 轮值顺序上首个有空位的条目为初始候选
    /// 3) 得分严格更大才替换候选 (平手保留靠前条目)
    /// 4) 无任何条目有空位时返回 NoSpaceAvailable
    pub fn select_line_item(
        &self,
        distribution: &Distribution,
        patient: &Patient,
    ) -> EngineResult<usize> {
        let mut best: Option<usize> = None;
        for index in distribution.ordered_line_item_indices() {
            let line_item = &distribution.line_items[index];
            if !line_item.has_space() {
                continue;
            }
            best = match best {
                None => Some(index),
                Some(current) => {
                    let challenger_score =
                        line_item.distance_moved_closer(patient.ccu, patient.covid);
                    let current_score = distribution.line_items[current]
                        .distance_moved_closer(patient.ccu, patient.covid);
                    if challenger_score > current_score {
                        Some(index)
                    } else {
                        Some(current)
                    }
                }
            };
        }
        best.ok_or(EngineError::NoSpaceAvailable {
            designation: patient.designation,
        })
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 生成落位原因 (可解释性)
    ///
    /// # 返回
    /// JSON 格式的落位原因字符串
    pub fn generate_assign_reason(&self, line_item: &LineItem, patient: &Patient) -> String {
        serde_json::json!({
            "provider_code": line_item.provider_code,
            "designation": patient.designation,
            "acuity_group": patient.acuity_group().to_string(),
            "distance_before": line_item.distance_to_optimal(),
            "distance_moved_closer": line_item.distance_moved_closer(patient.ccu, patient.covid),
        })
        .to_string()
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for AssignmentEngine {
    fn default() -> Self {
        Self::new()
    }
}
