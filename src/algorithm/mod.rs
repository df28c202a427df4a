// ============================================================================
// 核心算法模块
// ============================================================================
// 本模块提供排课引擎的核心实现，包括：
// - 时间网格与毗邻关系
// - 引擎核心类型（槽位、条目、冲突、课表、优化选项、登记表）
// - 显式状态的随机源与种子混合
// - 质量评分
// - 排课求解器（单班级 / 多班级生成）
// ============================================================================

pub mod random;
pub mod scoring;
pub mod solver;
pub mod time_model;
pub mod types;

// 重新导出常用类型
pub use random::{mix_seed, AttemptProfile, Lcg};
pub use scoring::{quality_score, required_sessions};
pub use solver::{EngineError, TimetableEngine};
pub use time_model::TimeGrid;
pub use types::{
    CommittedRegistry, Conflict, ConflictKind, ConflictSeverity, Entry, OptimizationSettings,
    PriorityWeights, SlotPattern, TimeSlot, Timetable, TimetableStatus,
};
