// ============================================================================
// 排课引擎 Rust 库
// ============================================================================
// 本库提供高校周课表生成的核心功能：把静态目录（校历、学科、
// 讲师、教室、班级）与待排班级集合转换为无冲突的课表，附带
// 质量评分与不可避免冲突的清单。
//
// 主要模块：
// - models: 数据目录模型
// - algorithm: 时间网格、随机化、评分与排课求解器
// - solver: 硬约束冲突检测器
// - logging: 结构化日志
//
// 使用示例：
// ```rust,ignore
// use timetable_scheduling_system::{OptimizationSettings, TimetableEngine};
//
// // 构建引擎（目录校验在此完成）
// let engine = TimetableEngine::new(catalog, OptimizationSettings::default())?;
//
// // 为单个班级生成课表
// let timetable = engine.generate_single_cohort("cs-2024-a")?;
//
// // 为一组班级生成相互协调的课表
// let timetables = engine.generate_multi_cohort(&cohort_ids, &registry)?;
// ```
// ============================================================================

// 模块声明
pub mod algorithm;
pub mod logging;
pub mod models;
pub mod solver;

// 重新导出常用类型，方便外部使用
pub use algorithm::{
    CommittedRegistry, Conflict, ConflictKind, ConflictSeverity, EngineError, Entry,
    OptimizationSettings, PriorityWeights, SlotPattern, TimeGrid, TimeSlot, Timetable,
    TimetableEngine, TimetableStatus,
};
pub use logging::{init_default_logging, init_logging, sanitize_sensitive_data, LogConfig};
pub use models::{
    BreakInterval, Catalog, Cohort, DayPart, Institution, Instructor, PeriodTiming, Room,
    RoomKind, Subject, SubjectKind, TimePreference,
};
pub use solver::{free_slots_for_cohort, ConflictDetector};

// 版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
