// ==========================================
// 住院患者分配系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 引擎错误均为确定性的前置条件违规,不做内部重试
// ==========================================

use crate::domain::types::DistributionPhase;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    // ===== 配置错误 =====
    #[error("没有任何医生条目还有空位: designation={designation}")]
    NoSpaceAvailable { designation: i32 },

    #[error("回弹目标医生不在本周期内: designation={designation}, provider_code={provider_code}")]
    UnmatchedBounceback {
        designation: i32,
        provider_code: String,
    },

    // ===== 算术错误 =====
    #[error("除零错误: {context}")]
    DivisionByZero { context: String },

    // ===== 状态机错误 =====
    #[error("周期阶段不允许该操作: expected={expected}, actual={actual}")]
    InvalidPhase {
        expected: DistributionPhase,
        actual: DistributionPhase,
    },
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
