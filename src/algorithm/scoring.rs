// ============================================================================
// 评分模块
// ============================================================================
// 本模块把一份（完整或部分）排课结果压缩为一个整数质量评分。
//
// 评分定义：score = round(100 × 已排课次 / 应排课次)。
// 应排课次为班级必修列表中各学科 `sessions_per_week` 之和
// （必修列表为空时回退到完整学科目录）。计数单位是"课次"
// （一次独立排课，即一个完整连堂块），不是单节条目。
//
// 评分只作咨询用途：除多次尝试循环用它做并列裁决外，
// 不影响任何放置决策。
// ============================================================================

use crate::models::Subject;

/// 统计一组学科的应排课次总数
///
/// # 参数
/// - `subjects`: 班级实际使用的学科列表（已按调用粒度规范化）
pub fn required_sessions(subjects: &[Subject]) -> u32 {
    subjects.iter().map(|s| s.sessions_per_week as u32).sum()
}

/// 计算质量评分
///
/// # 参数
/// - `scheduled`: 已成功放置的课次数
/// - `required`: 应排课次数
///
/// # 返回
/// `round(100 × scheduled / required)`，上限 100；
/// 应排课次为 0 时视为满分
pub fn quality_score(scheduled: u32, required: u32) -> u32 {
    if required == 0 {
        return 100;
    }
    let score = (scheduled as u64 * 100 + required as u64 / 2) / required as u64;
    score.min(100) as u32
}

// ============================================================================
// 单元测试
// ============================================================================
