// ============================================================================
// 排课引擎集成测试
// ============================================================================
// 用一份接近真实的目录（午休断点、理论课 + 连堂课 + 实验课、
// 多讲师多教室多班级）端到端验证引擎输出的全局不变量：
// 1. 讲师/教室/班级在同一 (工作日, 节次) 不重复出现
// 2. 教室容量不小于班级人数
// 3. 讲师只教自己有资格的学科
// 4. 实验块单日整块、节次连续、不跨越午休
// 5. 同一学科不跨天复用节次号
// 6. 登记表预占用跨运行生效
// 7. 课表可序列化往返
// ============================================================================

use std::collections::HashMap;

use timetable_scheduling_system::{
    BreakInterval, Catalog, Cohort, CommittedRegistry, Entry, Institution, Instructor,
    OptimizationSettings, PeriodTiming, Room, RoomKind, Subject, SubjectKind, TimeSlot, Timetable,
    TimetableEngine, TimetableStatus,
};

// ============================================================================
// 辅助函数：目录构建
// ============================================================================

/// 5 天 8 节、第 3/4 节之间午休（11:00-11:20）的校历
fn institution() -> Institution {
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
        "工程学院",
        (1..=5).map(|d| format!("周{}", d)).collect(),
        periods,
        vec![BreakInterval::new("午休", 660, 680)],
    )
}

/// 理论 + 连堂 + 实验的完整目录，两个班级
fn full_catalog() -> Catalog {
    let cs_theory = Subject::new("CS301", "操作系统", SubjectKind::Theory, 4, 3, 3, 1);
    let mut cs_lab = Subject::new("CS301", "操作系统实验", SubjectKind::Lab, 2, 3, 1, 3);
    cs_lab.required_equipment = vec!["上机工位".to_string()];
    let ma_theory = Subject::new("MA201", "高等数学", SubjectKind::Theory, 4, 4, 2, 2);

    let mandatory = vec![
        "CS301".to_string(),
        "CS301-lab".to_string(),
        "MA201".to_string(),
    ];

    let mut lab_room = Room::new("r-lab", "机房 301", RoomKind::Lab, 45);
    lab_room.equipment = vec!["上机工位".to_string()];

    Catalog::new(
        institution(),
        vec![cs_theory, cs_lab, ma_theory],
        vec![
            Instructor::new(
                "i-cs",
                "王老师",
                vec!["CS301".to_string(), "CS301-lab".to_string()],
                20,
                6,
            ),
            Instructor::new("i-ma", "李老师", vec!["MA201".to_string()], 20, 6),
        ],
        vec![
            Room::new("r-a", "主楼 101", RoomKind::Classroom, 60),
            Room::new("r-b", "主楼 102", RoomKind::Classroom, 60),
            lab_room,
        ],
        vec![
            Cohort::new("c1", "计科 1 班", "计算机学院", 3, "1", 40, mandatory.clone(), 8),
            Cohort::new("c2", "计科 2 班", "计算机学院", 3, "2", 38, mandatory, 8),
        ],
    )
}

fn settings_with_seed(seed: u32) -> OptimizationSettings {
    OptimizationSettings {
        random_seed: Some(seed),
        ..Default::default()
    }
}

// ============================================================================
// 不变量检查辅助
// ============================================================================

/// 同一 (工作日, 节次) 上某个维度不得重复出现
fn assert_no_double_booking(entries: &[&Entry], key: fn(&Entry) -> &str, what: &str) {
    let mut seen: HashMap<(u8, u8, String), &str> = HashMap::new();
    for entry in entries {
        let slot_key = (entry.slot.day, entry.slot.period, key(entry).to_string());
        assert!(
            seen.insert(slot_key, entry.id.as_str()).is_none(),
            "{} 在同一槽位重复出现：{}",
            what,
            entry.id
        );
    }
}

fn assert_global_invariants(timetables: &[&Timetable], catalog: &Catalog) {
    let all_entries: Vec<&Entry> = timetables.iter().flat_map(|t| t.entries.iter()).collect();

    assert_no_double_booking(&all_entries, |e| &e.instructor_id, "讲师");
    assert_no_double_booking(&all_entries, |e| &e.room_id, "教室");
    assert_no_double_booking(&all_entries, |e| &e.cohort_id, "班级");

    for entry in &all_entries {
        let room = catalog.room(&entry.room_id).expect("教室必须来自目录");
        let cohort = catalog.cohort(&entry.cohort_id).expect("班级必须来自目录");
        assert!(
            room.capacity >= cohort.size,
            "教室 {} 容量不足以容纳班级 {}",
            room.id,
            cohort.id
        );

        let instructor = catalog
            .instructor(&entry.instructor_id)
            .expect("讲师必须来自目录");
        assert!(
            instructor.is_eligible(&entry.subject_id),
            "讲师 {} 没有学科 {} 的任课资格",
            instructor.id,
            entry.subject_id
        );
    }
}

/// 实验块：单日整块、节次连续、不跨越午休（第 3/4 节断点）
fn assert_lab_block_shape(timetable: &Timetable, lab_id: &str, block_len: u8) {
    let lab_entries: Vec<&Entry> = timetable
        .entries
        .iter()
        .filter(|e| e.subject_id == lab_id)
        .collect();
    assert_eq!(lab_entries.len(), block_len as usize);

    let day = lab_entries[0].slot.day;
    assert!(lab_entries.iter().all(|e| e.slot.day == day), "实验块必须单日整块");

    let mut periods: Vec<u8> = lab_entries.iter().map(|e| e.slot.period).collect();
    periods.sort_unstable();
    for pair in periods.windows(2) {
        assert_eq!(pair[1], pair[0] + 1, "实验块节次必须连续");
    }
    assert!(
        !(periods.contains(&3) && periods.contains(&4)),
        "实验块不得跨越午休断点"
    );
}

// ============================================================================
// 测试
// ============================================================================

#[test]
fn test_single_cohort_end_to_end() {
    let catalog = full_catalog();
    let engine = TimetableEngine::new(catalog.clone(), settings_with_seed(7)).unwrap();
    let timetable = engine.generate_single_cohort("c1").unwrap();

    // 3 + 3 + 2x2 = 10 条条目
    assert_eq!(timetable.entries.len(), 10);
    assert!(timetable.conflicts.is_empty());
    assert_eq!(timetable.score, 100);
    assert_eq!(timetable.status, TimetableStatus::Draft);

    assert_global_invariants(&[&timetable], &catalog);
    assert_lab_block_shape(&timetable, "CS301-lab", 3);

    // 同一学科不跨天复用节次号
    for subject_id in ["CS301", "MA201"] {
        let mut periods: Vec<u8> = timetable
            .entries
            .iter()
            .filter(|e| e.subject_id == subject_id)
            .map(|e| e.slot.period)
            .collect();
        periods.sort_unstable();
        let before = periods.len();
        periods.dedup();
        assert_eq!(before, periods.len(), "学科 {} 跨天复用了节次号", subject_id);
    }

    // 引擎自检：产出的课表重新校验不应有任何硬约束违反
    assert!(engine.validate_timetable(&timetable).is_empty());
}

#[test]
fn test_multi_cohort_end_to_end() {
    let catalog = full_catalog();
    let engine = TimetableEngine::new(catalog.clone(), settings_with_seed(11)).unwrap();
    let timetables = engine
        .generate_multi_cohort(
            &["c1".to_string(), "c2".to_string()],
            &CommittedRegistry::new(),
        )
        .unwrap();

    assert_eq!(timetables.len(), 2);
    assert_eq!(timetables[0].cohort_ids, vec!["c1".to_string()]);
    assert_eq!(timetables[1].cohort_ids, vec!["c2".to_string()]);

    let refs: Vec<&Timetable> = timetables.iter().collect();
    assert_global_invariants(&refs, &catalog);

    for timetable in &timetables {
        assert!(timetable.score <= 100);
        assert_eq!(timetable.status, TimetableStatus::Draft);
        if timetable.conflicts.is_empty() {
            assert_lab_block_shape(timetable, "CS301-lab", 3);
        }
    }
}

#[test]
fn test_registry_blocks_across_runs() {
    let catalog = full_catalog();

    // 外部班级 c0 的已保存课表把王老师占在周一上午前三节
    let saved_entries: Vec<Entry> = (1..=3u8)
        .map(|p| {
            let start = 480 + (p as u16 - 1) * 60;
            Entry::new(
                "CS301",
                "i-cs",
                "r-ext",
                "c0",
                TimeSlot::new(0, p, start, start + 60),
            )
        })
        .collect();
    let saved = Timetable::draft("tt-c0", saved_entries, vec![], 100, vec!["c0".to_string()]);
    let mut registry = CommittedRegistry::new();
    registry.add(saved);

    let engine = TimetableEngine::new(catalog, settings_with_seed(23)).unwrap();
    let timetables = engine
        .generate_multi_cohort(&["c1".to_string(), "c2".to_string()], &registry)
        .unwrap();

    for timetable in &timetables {
        for entry in &timetable.entries {
            let blocked = entry.instructor_id == "i-cs"
                && entry.slot.day == 0
                && (1..=3).contains(&entry.slot.period);
            assert!(
                !blocked,
                "登记表已占用王老师周一前三节：{}",
                entry.id
            );
        }
    }
}

#[test]
fn test_timetable_serde_roundtrip() {
    let catalog = full_catalog();
    let engine = TimetableEngine::new(catalog, settings_with_seed(31)).unwrap();
    let timetable = engine.generate_single_cohort("c2").unwrap();

    let json = serde_json::to_string(&timetable).unwrap();
    let back: Timetable = serde_json::from_str(&json).unwrap();
    assert_eq!(back, timetable);
}
