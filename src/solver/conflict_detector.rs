// ============================================================================
// 冲突检测器模块
// ============================================================================
// 本模块实现排课引擎的硬约束检查：给定一条候选条目与已落定的
// 条目集合，返回全部硬约束违反。
//
// 检查的硬约束：
// 1. InstructorClash   : 讲师在同一 (工作日, 节次) 出现于两条条目
// 2. RoomClash         : 教室在同一 (工作日, 节次) 出现于两条条目
// 3. CohortClash       : 班级在同一 (工作日, 节次) 出现于两条条目
// 4. CapacityShortfall : 教室容量小于班级人数
//
// 检测器是纯函数式的：结果只取决于候选条目与已有条目集合，
// 与调用顺序无关。它位于每次放置尝试的关键路径上，实现保持
// 轻量；修复建议只在真正产生冲突时计算。
// ============================================================================

use std::collections::HashMap;

use tracing::trace;

use crate::algorithm::types::{Conflict, ConflictKind, ConflictSeverity, Entry, SlotPattern};
use crate::models::{Cohort, Room};

/// 建议列表的最大长度
const MAX_SUGGESTIONS: usize = 3;

// ============================================================================
// 冲突检测器
// ============================================================================

/// 硬约束冲突检测器
///
/// 持有教室与班级的查找表（容量检查需要），以及网格尺寸
/// （空闲槽位建议需要）。检测器自身无可变状态。
#[derive(Debug)]
pub struct ConflictDetector<'a> {
    /// 教室查找表（教室 ID -> 教室）
    rooms: &'a HashMap<String, Room>,
    /// 班级查找表（班级 ID -> 班级）
    cohorts: &'a HashMap<String, Cohort>,
    /// 工作日数量
    day_count: u8,
    /// 每天节次数
    periods_per_day: u8,
}

impl<'a> ConflictDetector<'a> {
    /// 创建冲突检测器
    pub fn new(
        rooms: &'a HashMap<String, Room>,
        cohorts: &'a HashMap<String, Cohort>,
        day_count: u8,
        periods_per_day: u8,
    ) -> Self {
        Self {
            rooms,
            cohorts,
            day_count,
            periods_per_day,
        }
    }

    /// 检查候选条目相对已有条目集合的全部硬约束违反
    ///
    /// # 参数
    /// - `entry`: 候选条目
    /// - `existing`: 已落定的条目集合
    ///
    /// # 返回
    /// 违反列表（可能为空）。结果只取决于参数，与调用顺序无关。
    pub fn check_hard_constraints(&self, entry: &Entry, existing: &[Entry]) -> Vec<Conflict> {
        trace!(
            entry_id = %entry.id,
            existing = existing.len(),
            "检查硬约束"
        );

        let mut conflicts = Vec::new();

        if let Some(conflict) = self.check_instructor_clash(entry, existing) {
            conflicts.push(conflict);
        }
        if let Some(conflict) = self.check_room_clash(entry, existing) {
            conflicts.push(conflict);
        }
        if let Some(conflict) = self.check_cohort_clash(entry, existing) {
            conflicts.push(conflict);
        }
        if let Some(conflict) = self.check_capacity(entry) {
            conflicts.push(conflict);
        }

        conflicts
    }

    /// 校验一份完整条目列表
    ///
    /// 对列表中每条条目相对其之前的条目做硬约束检查，汇总全部
    /// 违反。供宿主应用在引擎之外改动课表（如手动拖拽调课）后
    /// 重新验证使用。
    pub fn validate_timetable(&self, entries: &[Entry]) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            conflicts.extend(self.check_hard_constraints(entry, &entries[..index]));
        }
        conflicts
    }

    // ========================================================================
    // 单项检查
    // ========================================================================

    /// 讲师时间冲突
    fn check_instructor_clash(&self, entry: &Entry, existing: &[Entry]) -> Option<Conflict> {
        let clashing: Vec<&Entry> = existing
            .iter()
            .filter(|e| {
                e.instructor_id == entry.instructor_id && e.slot.same_pattern(&entry.slot)
            })
            .collect();

        if clashing.is_empty() {
            return None;
        }

        let mut affected: Vec<String> = clashing.iter().map(|e| e.id.clone()).collect();
        affected.push(entry.id.clone());

        let mut suggestions = vec![format!(
            "为学科 {} 改派其他有任课资格的讲师",
            entry.subject_id
        )];
        suggestions.extend(self.free_slot_suggestions(entry, existing));

        Some(
            Conflict::new(
                ConflictKind::InstructorClash,
                ConflictSeverity::High,
                format!(
                    "讲师 {} 在第 {} 天第 {} 节已有课程",
                    entry.instructor_id,
                    entry.slot.day + 1,
                    entry.slot.period
                ),
            )
            .with_entries(affected)
            .with_suggestions(suggestions),
        )
    }

    /// 教室时间冲突
    fn check_room_clash(&self, entry: &Entry, existing: &[Entry]) -> Option<Conflict> {
        let clashing: Vec<&Entry> = existing
            .iter()
            .filter(|e| e.room_id == entry.room_id && e.slot.same_pattern(&entry.slot))
            .collect();

        if clashing.is_empty() {
            return None;
        }

        let mut affected: Vec<String> = clashing.iter().map(|e| e.id.clone()).collect();
        affected.push(entry.id.clone());

        let mut suggestions = vec![format!("为学科 {} 改用其他空闲教室", entry.subject_id)];
        suggestions.extend(self.free_slot_suggestions(entry, existing));

        Some(
            Conflict::new(
                ConflictKind::RoomClash,
                ConflictSeverity::High,
                format!(
                    "教室 {} 在第 {} 天第 {} 节已被占用",
                    entry.room_id,
                    entry.slot.day + 1,
                    entry.slot.period
                ),
            )
            .with_entries(affected)
            .with_suggestions(suggestions),
        )
    }

    /// 班级时间冲突
    fn check_cohort_clash(&self, entry: &Entry, existing: &[Entry]) -> Option<Conflict> {
        let clashing: Vec<&Entry> = existing
            .iter()
            .filter(|e| e.cohort_id == entry.cohort_id && e.slot.same_pattern(&entry.slot))
            .collect();

        if clashing.is_empty() {
            return None;
        }

        let mut affected: Vec<String> = clashing.iter().map(|e| e.id.clone()).collect();
        affected.push(entry.id.clone());

        let suggestions = self.free_slot_suggestions(entry, existing);

        Some(
            Conflict::new(
                ConflictKind::CohortClash,
                ConflictSeverity::High,
                format!(
                    "班级 {} 在第 {} 天第 {} 节已有课程",
                    entry.cohort_id,
                    entry.slot.day + 1,
                    entry.slot.period
                ),
            )
            .with_entries(affected)
            .with_suggestions(suggestions),
        )
    }

    /// 教室容量检查
    fn check_capacity(&self, entry: &Entry) -> Option<Conflict> {
        let room = self.rooms.get(&entry.room_id)?;
        let cohort = self.cohorts.get(&entry.cohort_id)?;

        if room.fits(cohort.size) {
            return None;
        }

        let suggestions = self.larger_room_suggestions(cohort.size);

        Some(
            Conflict::new(
                ConflictKind::CapacityShortfall,
                ConflictSeverity::High,
                format!(
                    "教室 {} 容量 {} 小于班级 {} 人数 {}",
                    room.id, room.capacity, cohort.id, cohort.size
                ),
            )
            .with_entries(vec![entry.id.clone()])
            .with_suggestions(suggestions),
        )
    }

    // ========================================================================
    // 修复建议
    // ========================================================================

    /// 针对候选条目所在班级的空闲槽位建议
    fn free_slot_suggestions(&self, entry: &Entry, existing: &[Entry]) -> Vec<String> {
        free_slots_for_cohort(
            existing,
            &entry.cohort_id,
            self.day_count,
            self.periods_per_day,
        )
        .into_iter()
        .filter(|p| !(p.day == entry.slot.day && p.period == entry.slot.period))
        .take(MAX_SUGGESTIONS)
        .map(|p| {
            format!(
                "将学科 {} 调整到第 {} 天第 {} 节",
                entry.subject_id,
                p.day + 1,
                p.period
            )
        })
        .collect()
    }

    /// 容量足够的替代教室建议
    fn larger_room_suggestions(&self, cohort_size: u16) -> Vec<String> {
        let mut candidates: Vec<&Room> = self
            .rooms
            .values()
            .filter(|r| r.fits(cohort_size))
            .collect();
        // HashMap 迭代无序，排序保证建议稳定
        candidates.sort_by(|a, b| (a.capacity, &a.id).cmp(&(b.capacity, &b.id)));
        candidates
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|r| format!("改用教室 {}（容量 {}）", r.id, r.capacity))
            .collect()
    }
}

// ============================================================================
// 空闲槽位查询
// ============================================================================

/// 列出班级尚未占用的 (工作日, 节次) 模式
///
/// 按工作日、节次升序返回。供修复建议与宿主应用的手动调课
/// 界面使用。
pub fn free_slots_for_cohort(
    entries: &[Entry],
    cohort_id: &str,
    day_count: u8,
    periods_per_day: u8,
) -> Vec<SlotPattern> {
    let mut free = Vec::new();
    for day in 0..day_count {
        for period in 1..=periods_per_day {
            let occupied = entries.iter().any(|e| {
                e.cohort_id == cohort_id && e.slot.day == day && e.slot.period == period
            });
            if !occupied {
                free.push(SlotPattern::new(day, period));
            }
        }
    }
    free
}

// 测试模块
#[cfg(test)]
#[path = "conflict_detector_tests.rs"]
mod conflict_detector_tests;
