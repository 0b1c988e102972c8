// ==========================================
// 住院患者分配系统 - 引擎编排器
// ==========================================
// 用途: 协调目标计算/优先级排序/贪心落位的执行顺序
// 红线: 一个周期只执行一遍完整流程,重入被阶段机拒绝
// ==========================================

use crate::domain::distribution::Distribution;
use crate::domain::summary::DistributionSummary;
use crate::engine::assignment::AssignmentEngine;
use crate::engine::error::EngineResult;
use crate::engine::optimal_census::OptimalCensusCalculator;
use crate::engine::priority::PrioritySorter;
use tracing::{debug, info};

// ==========================================
// AssignmentResult - 分配结果
// ==========================================
#[derive(Debug, Clone)]
pub struct AssignmentResult {
    // 回弹落位数
    pub bounceback_count: usize,

    // 贪心落位数
    pub distributed_count: usize,

    // 周期快照 (供展示层渲染)
    pub summary: DistributionSummary,
}

// ==========================================
// AssignmentOrchestrator - 引擎编排器
// ==========================================
pub struct AssignmentOrchestrator {
    calculator: OptimalCensusCalculator,
    sorter: PrioritySorter,
    assignment: AssignmentEngine,
}

impl AssignmentOrchestrator {
    /// 创建新的编排器实例
    pub fn new() -> Self {
        Self {
            calculator: OptimalCensusCalculator::new(),
            sorter: PrioritySorter::new(),
            assignment: AssignmentEngine::new(),
        }
    }

    /// 执行完整分配流程 (单周期)
    ///
    /// # 参数
    /// - `distribution`: 周期聚合 (会被修改)
    ///
    /// # 返回
    /// 分配结果; 周期进入 FULLY_ASSIGNED 阶段
    pub fn assign_all(&self, distribution: &mut Distribution) -> EngineResult<AssignmentResult> {
        info!(
            distribution_id = %distribution.distribution_id,
            cycle_date = %distribution.cycle_date,
            line_item_count = distribution.line_items.len(),
            patient_count = distribution.patients.len(),
            "开始执行分配流程"
        );

        // ==========================================
        // 步骤1: 目标在册数计算
        // ==========================================
        debug!("步骤1: 计算目标在册数");

        self.calculator.calculate(distribution)?;

        info!("目标在册数计算完成");

        // ==========================================
        // 步骤2: 回弹患者落位
        // ==========================================
        debug!("步骤2: 回弹患者落位");

        let bounceback_count = self.assignment.assign_bounceback_patients(distribution)?;

        info!(bounceback_count, "回弹患者落位完成");

        // ==========================================
        // 步骤3: 非回弹患者优先级排序
        // ==========================================
        debug!("步骤3: 非回弹患者优先级排序");

        let ordered_patient_indices = self.sorter.ordered_non_bounceback_indices(distribution);

        // ==========================================
        // 步骤4: 贪心落位
        // ==========================================
        debug!("步骤4: 贪心落位");

        let distributed_count = self
            .assignment
            .assign_patients_in_order(distribution, &ordered_patient_indices)?;

        info!(distributed_count, "贪心落位完成");

        Ok(AssignmentResult {
            bounceback_count,
            distributed_count,
            summary: distribution.summary(),
        })
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for AssignmentOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}
