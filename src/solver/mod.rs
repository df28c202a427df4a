// ============================================================================
// 冲突检测模块
// ============================================================================
// 本模块承载排课引擎的硬约束检查器：
// - conflict_detector.rs : 硬约束检查、完整课表校验与修复建议
//
// 检查器被求解器放在每次放置尝试的关键路径上调用；同时也以
// 公开接口形式提供给宿主应用，用于手动调课后的重新验证。
// ============================================================================

pub mod conflict_detector;

// 重新导出常用类型
pub use conflict_detector::{free_slots_for_cohort, ConflictDetector};
