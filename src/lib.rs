// ==========================================
// 住院患者分配系统 - 核心库
// ==========================================
// 系统定位: 决策支持核心 (查房患者分配)
// 职责: 计算每位主治医生的目标在册数,并按贪心规则落位患者
// 红线: 核心为纯内存同步计算,不含 UI/HTTP/持久化
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 业务规则
pub mod engine;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AcuityGroup, DistributionPhase};

// 领域实体
pub use domain::{
    AllocatedCounts, AllocatedPatients, AssignedCensus, CensusDistance, Distribution,
    DistributionSummary, LineItem, LineItemSummary, OptimalCensus, Patient, StartingCensus,
};

// 引擎
pub use engine::{
    AssignmentEngine, AssignmentOrchestrator, AssignmentResult, EngineError, EngineResult,
    OptimalCensusCalculator, PrioritySorter,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "住院患者分配系统";

// ==========================================
// 预编译检查
// ==========================================
