// ============================================================================
// 实验课放置单元测试
// ============================================================================
// 验证实验块的整体放置行为：
// 1. 实验块在单日内整体落位，节次两两毗邻，不跨越课间休息
// 2. 退化实验课（单节声明）自动规范化后仍按整块放置
// 3. 同一实验课每天至多一块，多块落在不同工作日
// 4. 班级每天至多容纳两个实验块
// ============================================================================

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::algorithm::solver::TimetableEngine;
    use crate::algorithm::types::OptimizationSettings;
    use crate::models::{
        BreakInterval, Catalog, Cohort, Institution, Instructor, PeriodTiming, Room, RoomKind,
        Subject, SubjectKind,
    };

    // ========================================================================
    // 辅助函数：测试数据
    // ========================================================================

    /// 5 天 8 节、第 3/4 节之间午休的校历
    fn lunch_break_institution() -> Institution {
        let mut periods = Vec::new();
        for p in 1..=3u8 {
            let start = 480 + (p as u16 - 1) * 60;
            periods.push(PeriodTiming::new(p, start, start + 60));
        }
        for p in 4..=8u8 {
            let start = 680 + (p as u16 - 4) * 60;
            periods.push(PeriodTiming::new(p, start, start + 60));
        }
        Institution::new(
            "测试学院",
            (1..=5).map(|d| format!("周{}", d)).collect(),
            periods,
            vec![BreakInterval::new("午休", 660, 680)],
        )
    }

    /// 1 天 8 节、全天首尾相接的校历
    fn one_day_institution() -> Institution {
        let periods = (1..=8u8)
            .map(|p| {
                let start = 480 + (p as u16 - 1) * 60;
                PeriodTiming::new(p, start, start + 60)
            })
            .collect();
        Institution::new("测试学院", vec!["周一".to_string()], periods, vec![])
    }

    fn settings_with_seed(seed: u32) -> OptimizationSettings {
        OptimizationSettings {
            random_seed: Some(seed),
            ..Default::default()
        }
    }

    fn cohort(id: &str, mandatory: Vec<String>) -> Cohort {
        Cohort::new(id, id, "计算机学院", 1, "1", 40, mandatory, 8)
    }

    // ========================================================================
    // 实验块毗邻性（午休断点）
    // ========================================================================

    #[test]
    fn test_lab_block_avoids_break_straddle() {
        let theory = Subject::new("S1", "程序设计", SubjectKind::Theory, 3, 3, 3, 1);
        let lab = Subject::new("L1", "程序设计实验", SubjectKind::Lab, 2, 3, 1, 3);
        let lab_id = lab.id.clone();

        let catalog = Catalog::new(
            lunch_break_institution(),
            vec![theory, lab],
            vec![Instructor::new(
                "i1",
                "王老师",
                vec!["S1".to_string(), "L1-lab".to_string()],
                20,
                6,
            )],
            vec![Room::new("r1", "机房 301", RoomKind::Lab, 60)],
            vec![cohort("c1", vec!["S1".to_string(), "L1-lab".to_string()])],
        );

        let engine = TimetableEngine::new(catalog, settings_with_seed(8)).unwrap();
        let timetable = engine.generate_single_cohort("c1").unwrap();

        assert!(timetable.conflicts.is_empty());
        assert_eq!(timetable.score, 100);

        let lab_entries: Vec<_> = timetable
            .entries
            .iter()
            .filter(|e| e.subject_id == lab_id)
            .collect();
        assert_eq!(lab_entries.len(), 3);

        // 单日整块
        let day = lab_entries[0].slot.day;
        assert!(lab_entries.iter().all(|e| e.slot.day == day));

        // 只能是 1-2-3 或 4-5-6：2-3-4 与 3-4-5 都被午休切断
        let mut periods: Vec<u8> = lab_entries.iter().map(|e| e.slot.period).collect();
        periods.sort_unstable();
        assert!(
            periods == vec![1, 2, 3] || periods == vec![4, 5, 6],
            "实验块不得跨越午休，实际节次：{:?}",
            periods
        );
    }

    // ========================================================================
    // 退化实验课规范化
    // ========================================================================

    #[test]
    fn test_degenerate_lab_placed_as_two_period_block() {
        // 声明为单节单次的实验课：规范化为 2 节连堂、1 次课
        let lab = Subject::new("L2", "电子实验", SubjectKind::Lab, 1, 1, 1, 1);

        let catalog = Catalog::new(
            one_day_institution(),
            vec![lab],
            vec![Instructor::new("i1", "王老师", vec!["L2-lab".to_string()], 20, 6)],
            vec![Room::new("r1", "电子楼 101", RoomKind::Lab, 60)],
            vec![cohort("c1", vec!["L2-lab".to_string()])],
        );

        let engine = TimetableEngine::new(catalog, settings_with_seed(4)).unwrap();
        let timetable = engine.generate_single_cohort("c1").unwrap();

        assert!(timetable.conflicts.is_empty());
        assert_eq!(timetable.score, 100);
        assert_eq!(timetable.entries.len(), 2, "规范化后应为一个 2 节块");

        let mut periods: Vec<u8> = timetable.entries.iter().map(|e| e.slot.period).collect();
        periods.sort_unstable();
        assert_eq!(periods[1], periods[0] + 1, "块内节次必须连续");
        assert_eq!(timetable.entries[0].slot.day, timetable.entries[1].slot.day);
    }

    // ========================================================================
    // 多块分布
    // ========================================================================

    #[test]
    fn test_lab_blocks_spread_over_distinct_days() {
        // 每周两块，每块 2 节
        let lab = Subject::new("L3", "物理实验", SubjectKind::Lab, 2, 4, 2, 2);

        let catalog = Catalog::new(
            lunch_break_institution(),
            vec![lab],
            vec![Instructor::new("i1", "赵老师", vec!["L3-lab".to_string()], 20, 6)],
            vec![Room::new("r1", "物理楼 201", RoomKind::Lab, 60)],
            vec![cohort("c1", vec!["L3-lab".to_string()])],
        );

        let engine = TimetableEngine::new(catalog, settings_with_seed(15)).unwrap();
        let timetable = engine.generate_single_cohort("c1").unwrap();

        assert!(timetable.conflicts.is_empty());
        assert_eq!(timetable.entries.len(), 4);

        let mut days: Vec<u8> = timetable.entries.iter().map(|e| e.slot.day).collect();
        days.sort_unstable();
        days.dedup();
        assert_eq!(days.len(), 2, "同一实验课每天至多一块");

        for day in days {
            let mut periods: Vec<u8> = timetable
                .entries
                .iter()
                .filter(|e| e.slot.day == day)
                .map(|e| e.slot.period)
                .collect();
            periods.sort_unstable();
            assert_eq!(periods.len(), 2);
            assert_eq!(periods[1], periods[0] + 1);
        }
    }

    #[test]
    fn test_at_most_two_lab_blocks_per_day() {
        // 单日校历 + 三门实验课：第三块受"每天至多两块"限制
        let labs: Vec<Subject> = ["LA", "LB", "LC"]
            .iter()
            .map(|code| Subject::new(*code, *code, SubjectKind::Lab, 2, 2, 1, 2))
            .collect();
        let lab_ids: Vec<String> = labs.iter().map(|s| s.id.clone()).collect();

        let catalog = Catalog::new(
            one_day_institution(),
            labs,
            vec![Instructor::new("i1", "王老师", lab_ids.clone(), 30, 8)],
            vec![Room::new("r1", "机房 301", RoomKind::Lab, 60)],
            vec![cohort("c1", lab_ids)],
        );

        let engine = TimetableEngine::new(catalog, settings_with_seed(6)).unwrap();
        let timetable = engine.generate_single_cohort("c1").unwrap();

        // 两块落位（4 条条目），第三块成为冲突
        assert_eq!(timetable.entries.len(), 4);
        assert_eq!(timetable.conflicts.len(), 1);
        assert_eq!(timetable.score, 67);
    }

    #[test]
    fn test_lab_requires_equipped_room() {
        // 仅有的教室缺少所需设备：实验块无法排入
        let mut lab = Subject::new("L4", "化学实验", SubjectKind::Lab, 2, 3, 1, 3);
        lab.required_equipment = vec!["通风柜".to_string()];
        let lab_id = lab.id.clone();

        let catalog = Catalog::new(
            one_day_institution(),
            vec![lab],
            vec![Instructor::new("i1", "钱老师", vec![lab_id.clone()], 20, 6)],
            vec![Room::new("r1", "普通教室", RoomKind::Classroom, 60)],
            vec![cohort("c1", vec![lab_id])],
        );

        let engine = TimetableEngine::new(catalog, settings_with_seed(2)).unwrap();
        let timetable = engine.generate_single_cohort("c1").unwrap();

        assert!(timetable.entries.is_empty());
        assert_eq!(timetable.conflicts.len(), 1);
        assert_eq!(timetable.score, 0);
    }
}
