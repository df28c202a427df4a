// ============================================================================
// 冲突检测器单元测试
// ============================================================================
// 验证四类硬约束的检出、检查的纯函数性质（与调用顺序无关）、
// 完整课表校验与空闲槽位查询。
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use crate::algorithm::types::{ConflictKind, Entry, SlotPattern, TimeSlot};
    use crate::models::{Cohort, Room, RoomKind};
    use crate::solver::conflict_detector::{free_slots_for_cohort, ConflictDetector};

    // ========================================================================
    // 辅助函数：测试数据
    // ========================================================================

    fn test_rooms() -> HashMap<String, Room> {
        let mut rooms = HashMap::new();
        rooms.insert(
            "r-small".to_string(),
            Room::new("r-small", "主楼 101", RoomKind::Classroom, 30),
        );
        rooms.insert(
            "r-big".to_string(),
            Room::new("r-big", "主楼 201", RoomKind::Classroom, 80),
        );
        rooms
    }

    fn test_cohorts() -> HashMap<String, Cohort> {
        let mut cohorts = HashMap::new();
        cohorts.insert(
            "c1".to_string(),
            Cohort::new("c1", "计科 1 班", "计算机学院", 1, "1", 40, vec![], 8),
        );
        cohorts.insert(
            "c2".to_string(),
            Cohort::new("c2", "计科 2 班", "计算机学院", 1, "2", 40, vec![], 8),
        );
        cohorts
    }

    fn slot(day: u8, period: u8) -> TimeSlot {
        let start = 480 + (period as u16 - 1) * 60;
        TimeSlot::new(day, period, start, start + 60)
    }

    fn entry(subject: &str, instructor: &str, room: &str, cohort: &str, s: TimeSlot) -> Entry {
        Entry::new(subject, instructor, room, cohort, s)
    }

    // ========================================================================
    // 各类硬约束
    // ========================================================================

    #[test]
    fn test_no_conflicts_against_empty_set() {
        let rooms = test_rooms();
        let cohorts = test_cohorts();
        let detector = ConflictDetector::new(&rooms, &cohorts, 5, 8);

        let candidate = entry("CS101", "i1", "r-big", "c1", slot(0, 1));
        assert!(detector.check_hard_constraints(&candidate, &[]).is_empty());
    }

    #[test]
    fn test_instructor_clash_detected() {
        let rooms = test_rooms();
        let cohorts = test_cohorts();
        let detector = ConflictDetector::new(&rooms, &cohorts, 5, 8);

        let existing = vec![entry("CS101", "i1", "r-big", "c1", slot(0, 1))];
        let candidate = entry("MA101", "i1", "r-small", "c2", slot(0, 1));

        let conflicts = detector.check_hard_constraints(&candidate, &existing);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::InstructorClash);
        // 涉及双方条目
        assert!(conflicts[0].affected_entries.contains(&existing[0].id));
        assert!(conflicts[0].affected_entries.contains(&candidate.id));
        assert!(!conflicts[0].suggestions.is_empty());
    }

    #[test]
    fn test_room_clash_detected() {
        let rooms = test_rooms();
        let cohorts = test_cohorts();
        let detector = ConflictDetector::new(&rooms, &cohorts, 5, 8);

        let existing = vec![entry("CS101", "i1", "r-big", "c1", slot(1, 3))];
        let candidate = entry("MA101", "i2", "r-big", "c2", slot(1, 3));

        let conflicts = detector.check_hard_constraints(&candidate, &existing);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::RoomClash);
    }

    #[test]
    fn test_cohort_clash_detected() {
        let rooms = test_rooms();
        let cohorts = test_cohorts();
        let detector = ConflictDetector::new(&rooms, &cohorts, 5, 8);

        let existing = vec![entry("CS101", "i1", "r-big", "c1", slot(2, 5))];
        let candidate = entry("MA101", "i2", "r-small", "c1", slot(2, 5));

        let conflicts = detector.check_hard_constraints(&candidate, &existing);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::CohortClash);
    }

    #[test]
    fn test_capacity_shortfall_detected() {
        let rooms = test_rooms();
        let cohorts = test_cohorts();
        let detector = ConflictDetector::new(&rooms, &cohorts, 5, 8);

        // 30 座教室装 40 人班级
        let candidate = entry("CS101", "i1", "r-small", "c1", slot(0, 1));
        let conflicts = detector.check_hard_constraints(&candidate, &[]);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::CapacityShortfall);
        // 建议中给出容量足够的教室
        assert!(conflicts[0]
            .suggestions
            .iter()
            .any(|s| s.contains("r-big")));
    }

    #[test]
    fn test_different_slots_do_not_clash() {
        let rooms = test_rooms();
        let cohorts = test_cohorts();
        let detector = ConflictDetector::new(&rooms, &cohorts, 5, 8);

        let existing = vec![entry("CS101", "i1", "r-big", "c1", slot(0, 1))];
        // 同讲师同教室同班级，但不同节次
        let candidate = entry("CS101", "i1", "r-big", "c1", slot(0, 2));
        assert!(detector
            .check_hard_constraints(&candidate, &existing)
            .is_empty());
    }

    #[test]
    fn test_multiple_violations_reported_together() {
        let rooms = test_rooms();
        let cohorts = test_cohorts();
        let detector = ConflictDetector::new(&rooms, &cohorts, 5, 8);

        let existing = vec![entry("CS101", "i1", "r-small", "c1", slot(0, 1))];
        // 同讲师 + 同教室 + 同班级 + 容量不足，同一槽位
        let candidate = entry("MA101", "i1", "r-small", "c1", slot(0, 1));

        let conflicts = detector.check_hard_constraints(&candidate, &existing);
        let kinds: Vec<ConflictKind> = conflicts.iter().map(|c| c.kind).collect();
        assert!(kinds.contains(&ConflictKind::InstructorClash));
        assert!(kinds.contains(&ConflictKind::RoomClash));
        assert!(kinds.contains(&ConflictKind::CohortClash));
        assert!(kinds.contains(&ConflictKind::CapacityShortfall));
    }

    // ========================================================================
    // 纯函数性质
    // ========================================================================

    #[test]
    fn test_check_is_idempotent() {
        let rooms = test_rooms();
        let cohorts = test_cohorts();
        let detector = ConflictDetector::new(&rooms, &cohorts, 5, 8);

        let existing = vec![
            entry("CS101", "i1", "r-big", "c1", slot(0, 1)),
            entry("MA101", "i2", "r-small", "c2", slot(0, 2)),
        ];
        let candidate = entry("PH101", "i1", "r-big", "c2", slot(0, 1));

        let first = detector.check_hard_constraints(&candidate, &existing);
        let second = detector.check_hard_constraints(&candidate, &existing);
        assert_eq!(first, second);
    }

    #[test]
    fn test_check_independent_of_existing_order() {
        let rooms = test_rooms();
        let cohorts = test_cohorts();
        let detector = ConflictDetector::new(&rooms, &cohorts, 5, 8);

        let a = entry("CS101", "i1", "r-big", "c1", slot(0, 1));
        let b = entry("MA101", "i2", "r-small", "c2", slot(0, 2));
        let candidate = entry("PH101", "i1", "r-small", "c2", slot(0, 1));

        let forward = detector.check_hard_constraints(&candidate, &[a.clone(), b.clone()]);
        let backward = detector.check_hard_constraints(&candidate, &[b, a]);

        let kinds_forward: Vec<ConflictKind> = forward.iter().map(|c| c.kind).collect();
        let kinds_backward: Vec<ConflictKind> = backward.iter().map(|c| c.kind).collect();
        assert_eq!(kinds_forward, kinds_backward);
    }

    // ========================================================================
    // 完整课表校验
    // ========================================================================

    #[test]
    fn test_validate_clean_timetable() {
        let rooms = test_rooms();
        let cohorts = test_cohorts();
        let detector = ConflictDetector::new(&rooms, &cohorts, 5, 8);

        let entries = vec![
            entry("CS101", "i1", "r-big", "c1", slot(0, 1)),
            entry("MA101", "i2", "r-big", "c1", slot(0, 2)),
            entry("CS101", "i1", "r-big", "c2", slot(0, 3)),
        ];
        assert!(detector.validate_timetable(&entries).is_empty());
    }

    #[test]
    fn test_validate_finds_pairwise_clashes() {
        let rooms = test_rooms();
        let cohorts = test_cohorts();
        let detector = ConflictDetector::new(&rooms, &cohorts, 5, 8);

        let entries = vec![
            entry("CS101", "i1", "r-big", "c1", slot(0, 1)),
            entry("MA101", "i1", "r-small", "c2", slot(0, 1)), // 讲师冲突
            entry("PH101", "i2", "r-big", "c2", slot(0, 1)),   // 教室冲突 + 班级冲突
        ];
        let conflicts = detector.validate_timetable(&entries);
        let kinds: Vec<ConflictKind> = conflicts.iter().map(|c| c.kind).collect();
        assert!(kinds.contains(&ConflictKind::InstructorClash));
        assert!(kinds.contains(&ConflictKind::RoomClash));
        assert!(kinds.contains(&ConflictKind::CohortClash));
    }

    // ========================================================================
    // 空闲槽位查询
    // ========================================================================

    #[test]
    fn test_free_slots_excludes_occupied() {
        let entries = vec![
            entry("CS101", "i1", "r-big", "c1", slot(0, 1)),
            entry("MA101", "i2", "r-big", "c1", slot(1, 2)),
            // 其他班级的占用不影响 c1
            entry("PH101", "i3", "r-small", "c2", slot(0, 2)),
        ];

        let free = free_slots_for_cohort(&entries, "c1", 2, 3);
        assert!(!free.contains(&SlotPattern::new(0, 1)));
        assert!(!free.contains(&SlotPattern::new(1, 2)));
        assert!(free.contains(&SlotPattern::new(0, 2)));
        assert_eq!(free.len(), 2 * 3 - 2);
    }

    #[test]
    fn test_free_slots_ordered_by_day_then_period() {
        let free = free_slots_for_cohort(&[], "c1", 2, 2);
        assert_eq!(
            free,
            vec![
                SlotPattern::new(0, 1),
                SlotPattern::new(0, 2),
                SlotPattern::new(1, 1),
                SlotPattern::new(1, 2),
            ]
        );
    }
}
