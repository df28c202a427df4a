// ============================================================================
// 排课求解器模块
// ============================================================================
// 本模块实现排课引擎的核心：带回溯的、按优先级排序的、种子随机化
// 的放置器，支持多次尝试重启。
//
// 两个公开入口共享同一套内部机制：
// - 单班级生成：为一个班级产出一份课表，可选地规避一组
//   (工作日, 节次) 模式，使重复生成呈现不同布局。
// - 多班级生成：为一组班级（调用方保证 >= 2 个）产出相互协调的
//   课表，讲师与教室不跨班冲突，也不与既有课表登记表中
//   班级不相交的已保存条目冲突。
//
// 算法要点：
// 1. 实验课优先、长连堂其次、单节课最后（可行位置越少越先放）
// 2. 实验块整体事务式放置：任一节失败即整块回退
// 3. 实验块可挤占先前放置的单节理论课，被挤占条目进入重排队列，
//    在主放置结束后统一重排一次
// 4. 讲师工作量上限按下限放宽执行（宁可超限也不稀疏）
// 5. 多班级模式最多 10 次带种子重启，按已排课次择优
// ============================================================================

use std::collections::HashMap;
use std::time::Instant;

use hashbrown::{HashMap as SlotMap, HashSet as PatternSet};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::algorithm::random::{mix_seed, AttemptProfile, Lcg};
use crate::algorithm::scoring::{quality_score, required_sessions};
use crate::algorithm::time_model::TimeGrid;
use crate::algorithm::types::{
    CommittedRegistry, Conflict, ConflictKind, ConflictSeverity, Entry, OptimizationSettings,
    SlotPattern, Timetable,
};
use crate::models::{Catalog, Cohort, Instructor, Room, RoomKind, Subject, SubjectKind};
use crate::solver::conflict_detector::{free_slots_for_cohort, ConflictDetector};

// ============================================================================
// 常量
// ============================================================================

/// 多班级模式的最大尝试次数
const MAX_ATTEMPTS: u32 = 10;

/// 从该次尝试起，达到可接受线即可提前收敛
const SETTLE_AFTER_ATTEMPT: u32 = 5;

/// 可接受线：目标课次的 85%（分子）
const MIN_ACCEPTABLE_PERCENT: u32 = 85;

/// 讲师每日节次上限的放宽下限
const INSTRUCTOR_DAILY_FLOOR: u8 = 6;

/// 讲师每周节次上限的放宽下限
const INSTRUCTOR_WEEKLY_FLOOR: u8 = 30;

/// 班级每日节次上限的放宽下限
const COHORT_DAILY_FLOOR: u8 = 6;

/// 班级每天最多容纳的实验块数
const MAX_LAB_BLOCKS_PER_DAY: usize = 2;

// ============================================================================
// 引擎错误类型
// ============================================================================

/// 引擎错误
///
/// 只在放置开始前的输入校验阶段出现。校验通过后，引擎不再抛错：
/// 一切可行性缺口都以课表内的 Conflict 形式呈现。
#[derive(Debug, Error)]
pub enum EngineError {
    /// 目录缺少必要数据
    #[error("目录为空：{0}")]
    EmptyCatalog(String),

    /// 目录数据违反不变量
    #[error("目录数据无效：{0}")]
    InvalidCatalog(String),

    /// 校历无法构成时间网格
    #[error("校历无效：{0}")]
    InvalidCalendar(String),

    /// 优化选项取值非法
    #[error("优化选项无效：{0}")]
    InvalidSettings(String),

    /// 班级 ID 不在目录中
    #[error("未知的班级 ID：{0}")]
    UnknownCohort(String),

    /// 多班级生成的班级数不足
    #[error("多班级生成至少需要 2 个班级，当前 {0} 个")]
    TooFewCohorts(usize),
}

// ============================================================================
// 内部状态
// ============================================================================

/// 既有课表的槽位占用者
#[derive(Debug, Default)]
struct SlotOwners {
    instructors: Vec<String>,
    rooms: Vec<String>,
}

/// 既有课表占用索引
///
/// 从登记表中班级不相交的课表条目构建，按 (工作日, 节次) 索引
/// 讲师与教室的预占用。放置热路径上的只读查找结构。
#[derive(Debug, Default)]
struct CommittedOccupancy {
    slots: SlotMap<(u8, u8), SlotOwners>,
}

impl CommittedOccupancy {
    /// 从预占用条目构建索引
    fn from_entries(entries: &[&Entry]) -> Self {
        let mut slots: SlotMap<(u8, u8), SlotOwners> = SlotMap::new();
        for entry in entries {
            let owners = slots
                .entry((entry.slot.day, entry.slot.period))
                .or_default();
            owners.instructors.push(entry.instructor_id.clone());
            owners.rooms.push(entry.room_id.clone());
        }
        Self { slots }
    }

    /// 讲师在该槽位是否被预占用
    fn instructor_busy(&self, instructor_id: &str, day: u8, period: u8) -> bool {
        self.slots
            .get(&(day, period))
            .map_or(false, |o| o.instructors.iter().any(|id| id == instructor_id))
    }

    /// 教室在该槽位是否被预占用
    fn room_busy(&self, room_id: &str, day: u8, period: u8) -> bool {
        self.slots
            .get(&(day, period))
            .map_or(false, |o| o.rooms.iter().any(|id| id == room_id))
    }
}

/// 实验课起始节次规划器
///
/// 为每门实验课分配一个偏好起始节次：全局计数器按间距推进，
/// 让不同实验课落在一天的不同时段。间距为
/// `max(1, 可用起点数 / 实验课数)`，计数器越过最后一个可行
/// 起点后回绕到 1。
#[derive(Debug)]
struct LabStartPlanner {
    next_start: u8,
    spacing: u8,
    last_viable: u8,
    assigned: HashMap<String, u8>,
}

impl LabStartPlanner {
    /// 依据本次运行涉及的实验课集合创建规划器
    fn new(periods_per_day: u8, lab_subjects: &[&Subject]) -> Self {
        let max_len = lab_subjects
            .iter()
            .map(|s| s.continuous_periods)
            .max()
            .unwrap_or(2);
        let last_viable = periods_per_day.saturating_sub(max_len).saturating_add(1).max(1);
        let count = lab_subjects.len().max(1) as u8;
        let spacing = (last_viable / count).max(1);
        Self {
            next_start: 1,
            spacing,
            last_viable,
            assigned: HashMap::new(),
        }
    }

    /// 取（或首次分配）实验课的偏好起始节次
    fn preferred_start(&mut self, subject_id: &str) -> u8 {
        if let Some(&start) = self.assigned.get(subject_id) {
            return start;
        }
        let start = self.next_start;
        self.assigned.insert(subject_id.to_string(), start);
        self.next_start = self.next_start.saturating_add(self.spacing);
        if self.next_start > self.last_viable {
            self.next_start = 1;
        }
        start
    }
}

/// 一次尝试的可变状态
///
/// 条目向量是一次运行唯一的可变产物；实验块的回退通过记录
/// 放置前的长度并截断实现。
#[derive(Debug)]
struct AttemptState {
    /// 已落定条目（按放置顺序）
    entries: Vec<Entry>,
    /// 按班级归属的冲突记录
    conflicts: Vec<(String, Conflict)>,
    /// 各班级已排课次
    placed_sessions: HashMap<String, u32>,
    /// 被实验块挤占、等待重排的条目
    reschedule_queue: Vec<Entry>,
    /// (班级, 学科) -> 已选定讲师，保证同一门课尽量同一人授课
    instructor_memo: HashMap<(String, String), String>,
    /// 剩余迭代预算（咨询性上限）
    iteration_budget: u32,
}

impl AttemptState {
    fn new(cohort_ids: &[String], max_iterations: u32) -> Self {
        let placed_sessions = cohort_ids.iter().map(|id| (id.clone(), 0)).collect();
        Self {
            entries: Vec::new(),
            conflicts: Vec::new(),
            placed_sessions,
            reschedule_queue: Vec::new(),
            instructor_memo: HashMap::new(),
            iteration_budget: max_iterations,
        }
    }

    /// 消耗迭代预算；预算耗尽时返回 false
    fn consume_budget(&mut self) -> bool {
        if self.iteration_budget == 0 {
            return false;
        }
        self.iteration_budget -= 1;
        true
    }

    fn budget_exhausted(&self) -> bool {
        self.iteration_budget == 0
    }

    fn record_session(&mut self, cohort_id: &str) {
        *self.placed_sessions.entry(cohort_id.to_string()).or_insert(0) += 1;
    }

    fn unrecord_session(&mut self, cohort_id: &str) {
        if let Some(count) = self.placed_sessions.get_mut(cohort_id) {
            *count = count.saturating_sub(1);
        }
    }

    fn total_sessions(&self) -> u32 {
        self.placed_sessions.values().sum()
    }

    /// 班级当天已占节次数
    fn cohort_daily_count(&self, cohort_id: &str, day: u8) -> u8 {
        self.entries
            .iter()
            .filter(|e| e.cohort_id == cohort_id && e.slot.day == day)
            .count() as u8
    }

    /// 班级某学科当天是否已有安排
    fn cohort_subject_on_day(&self, cohort_id: &str, subject_id: &str, day: u8) -> bool {
        self.entries
            .iter()
            .any(|e| e.cohort_id == cohort_id && e.subject_id == subject_id && e.slot.day == day)
    }

    /// 班级某学科已占用的节次号集合（跨天）
    fn cohort_subject_periods(&self, cohort_id: &str, subject_id: &str) -> Vec<u8> {
        self.entries
            .iter()
            .filter(|e| e.cohort_id == cohort_id && e.subject_id == subject_id)
            .map(|e| e.slot.period)
            .collect()
    }

    /// 班级某学科在 (工作日, 节次) 上是否有紧邻的安排
    fn has_adjacent_same_subject(
        &self,
        cohort_id: &str,
        subject_id: &str,
        day: u8,
        before: u8,
        after: u8,
    ) -> bool {
        self.entries.iter().any(|e| {
            e.cohort_id == cohort_id
                && e.subject_id == subject_id
                && e.slot.day == day
                && (e.slot.period == before || e.slot.period == after)
        })
    }

    /// 讲师当天已占节次数
    fn instructor_daily_count(&self, instructor_id: &str, day: u8) -> u8 {
        self.entries
            .iter()
            .filter(|e| e.instructor_id == instructor_id && e.slot.day == day)
            .count() as u8
    }

    /// 讲师一周已占节次数
    fn instructor_weekly_count(&self, instructor_id: &str) -> u8 {
        self.entries
            .iter()
            .filter(|e| e.instructor_id == instructor_id)
            .count() as u8
    }

    /// 讲师在 (工作日, 节次) 是否已有安排
    fn instructor_at(&self, instructor_id: &str, day: u8, period: u8) -> bool {
        self.entries.iter().any(|e| {
            e.instructor_id == instructor_id && e.slot.day == day && e.slot.period == period
        })
    }
}

/// 一次尝试的结果
#[derive(Debug, Clone)]
struct AttemptOutcome {
    entries: Vec<Entry>,
    conflicts: Vec<(String, Conflict)>,
    placed_sessions: HashMap<String, u32>,
}

impl AttemptOutcome {
    fn total_sessions(&self) -> u32 {
        self.placed_sessions.values().sum()
    }
}

// ============================================================================
// 排课引擎
// ============================================================================

/// 排课引擎
///
/// 对一份不可变目录与一份优化选项的纯计算：不触碰任何进程级
/// 全局状态，不读写存储。既有课表通过 [`CommittedRegistry`]
/// 参数注入。
#[derive(Debug)]
pub struct TimetableEngine {
    catalog: Catalog,
    settings: OptimizationSettings,
    grid: TimeGrid,
    /// 学科查找表（已按调用粒度规范化的副本）
    subjects: HashMap<String, Subject>,
    /// 教室查找表
    rooms: HashMap<String, Room>,
    /// 班级查找表
    cohorts: HashMap<String, Cohort>,
}

impl TimetableEngine {
    /// 创建排课引擎
    ///
    /// # 参数
    /// - `catalog`: 输入目录（校历、学科、讲师、教室、班级）
    /// - `settings`: 优化选项
    ///
    /// # 返回
    /// 目录或选项非法时返回相应的 [`EngineError`]；
    /// 校验通过后，后续 generate 调用不再抛错
    pub fn new(catalog: Catalog, settings: OptimizationSettings) -> Result<Self, EngineError> {
        settings.validate().map_err(EngineError::InvalidSettings)?;

        if catalog.subjects.is_empty() {
            return Err(EngineError::EmptyCatalog("学科目录为空".to_string()));
        }
        if catalog.instructors.is_empty() {
            return Err(EngineError::EmptyCatalog("讲师目录为空".to_string()));
        }
        if catalog.rooms.is_empty() {
            return Err(EngineError::EmptyCatalog("教室目录为空".to_string()));
        }
        if catalog.cohorts.is_empty() {
            return Err(EngineError::EmptyCatalog("班级目录为空".to_string()));
        }

        let grid = TimeGrid::from_institution(&catalog.institution)
            .map_err(EngineError::InvalidCalendar)?;

        // 规范化学科副本并校验不变量（不回写目录）
        let mut subjects = HashMap::new();
        for subject in &catalog.subjects {
            let normalized = subject.normalized();
            normalized.validate().map_err(EngineError::InvalidCatalog)?;
            if normalized.continuous_periods != subject.continuous_periods {
                debug!(
                    subject = %subject.id,
                    continuous = normalized.continuous_periods,
                    sessions = normalized.sessions_per_week,
                    "实验课课时结构已按调用粒度规范化"
                );
            }
            subjects.insert(normalized.id.clone(), normalized);
        }

        let rooms = catalog
            .rooms
            .iter()
            .map(|r| (r.id.clone(), r.clone()))
            .collect();
        let cohorts = catalog
            .cohorts
            .iter()
            .map(|c| (c.id.clone(), c.clone()))
            .collect();

        info!(
            subjects = catalog.subjects.len(),
            instructors = catalog.instructors.len(),
            rooms = catalog.rooms.len(),
            cohorts = catalog.cohorts.len(),
            "排课引擎就绪"
        );

        Ok(Self {
            catalog,
            settings,
            grid,
            subjects,
            rooms,
            cohorts,
        })
    }

    /// 当前优化选项
    pub fn settings(&self) -> &OptimizationSettings {
        &self.settings
    }

    /// 规范化后的时间网格
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// 对候选条目执行硬约束检查（公开接口）
    pub fn check_hard_constraints(&self, entry: &Entry, entries: &[Entry]) -> Vec<Conflict> {
        self.detector().check_hard_constraints(entry, entries)
    }

    /// 重新校验一份完整课表（宿主应用手动调课后使用）
    pub fn validate_timetable(&self, timetable: &Timetable) -> Vec<Conflict> {
        self.detector().validate_timetable(&timetable.entries)
    }

    fn detector(&self) -> ConflictDetector<'_> {
        ConflictDetector::new(
            &self.rooms,
            &self.cohorts,
            self.grid.day_count(),
            self.grid.periods_per_day(),
        )
    }

    // ========================================================================
    // 公开入口
    // ========================================================================

    /// 单班级生成
    ///
    /// 为一个班级产出一份课表。选项中的 `avoided_patterns` 在此
    /// 模式下生效：命中的 (工作日, 节次) 从候选槽位中移除。
    ///
    /// # 参数
    /// - `cohort_id`: 班级 ID
    ///
    /// # 返回
    /// 班级未知时返回 [`EngineError::UnknownCohort`]；否则总是
    /// 返回课表，可行性缺口以冲突形式包含在课表内
    pub fn generate_single_cohort(&self, cohort_id: &str) -> Result<Timetable, EngineError> {
        if !self.cohorts.contains_key(cohort_id) {
            return Err(EngineError::UnknownCohort(cohort_id.to_string()));
        }

        let seed = mix_seed(&self.settings);
        info!(cohort = cohort_id, seed, "单班级生成开始");

        let cohort_ids = vec![cohort_id.to_string()];
        let avoided: PatternSet<SlotPattern> =
            self.settings.avoided_patterns.iter().copied().collect();
        let occupancy = CommittedOccupancy::default();

        let mut rng = Lcg::new(seed);
        let outcome = self.run_attempt(&cohort_ids, &occupancy, &avoided, &mut rng);

        let timetable = self.cohort_timetable(cohort_id, seed, &outcome);
        info!(
            cohort = cohort_id,
            entries = timetable.entries.len(),
            conflicts = timetable.conflicts.len(),
            score = timetable.score,
            "单班级生成完成"
        );
        Ok(timetable)
    }

    /// 多班级生成
    ///
    /// 为一组班级产出相互协调的课表：讲师与教室不跨班冲突，
    /// 也不与登记表中班级不相交的已保存条目冲突。最多执行
    /// 10 次带种子重启，按已排课次（并列时按评分）择优返回。
    ///
    /// # 参数
    /// - `cohort_ids`: 班级 ID 列表（>= 2 个）
    /// - `registry`: 既有课表登记表
    ///
    /// # 返回
    /// 与输入班级顺序一致的课表列表
    pub fn generate_multi_cohort(
        &self,
        cohort_ids: &[String],
        registry: &CommittedRegistry,
    ) -> Result<Vec<Timetable>, EngineError> {
        // 去重但保持输入顺序
        let mut unique_ids: Vec<String> = Vec::new();
        for id in cohort_ids {
            if !unique_ids.contains(id) {
                unique_ids.push(id.clone());
            }
        }

        if unique_ids.len() < 2 {
            return Err(EngineError::TooFewCohorts(unique_ids.len()));
        }
        for id in &unique_ids {
            if !self.cohorts.contains_key(id) {
                return Err(EngineError::UnknownCohort(id.clone()));
            }
        }

        let blocking = registry.blocking_entries(&unique_ids);
        let occupancy = CommittedOccupancy::from_entries(&blocking);
        let avoided = PatternSet::new();

        let target: u32 = unique_ids
            .iter()
            .map(|id| required_sessions(&self.subjects_for_cohort(&self.cohorts[id])))
            .sum();
        let min_acceptable = target * MIN_ACCEPTABLE_PERCENT / 100;

        let seed = mix_seed(&self.settings);
        info!(
            cohorts = unique_ids.len(),
            blocking = blocking.len(),
            target,
            min_acceptable,
            seed,
            "多班级生成开始"
        );

        let started = Instant::now();
        let mut master = Lcg::new(seed);
        let mut best: Option<(AttemptOutcome, u32)> = None;

        for attempt in 1..=MAX_ATTEMPTS {
            if attempt > 1
                && self.settings.time_limit_seconds > 0
                && started.elapsed().as_secs() >= self.settings.time_limit_seconds as u64
            {
                warn!(attempt, "时间上限已到，返回目前最优结果");
                break;
            }

            let attempt_seed = master.next_u32();
            let mut rng = Lcg::new(attempt_seed);
            let outcome = self.run_attempt(&unique_ids, &occupancy, &avoided, &mut rng);
            let total = outcome.total_sessions();
            let score_sum: u32 = unique_ids
                .iter()
                .map(|id| self.cohort_score(id, &outcome))
                .sum();

            debug!(attempt, total, score_sum, "尝试完成");

            let better = match &best {
                None => true,
                Some((prev, prev_score)) => {
                    let prev_total = prev.total_sessions();
                    total > prev_total || (total == prev_total && score_sum > *prev_score)
                }
            };
            if better {
                best = Some((outcome, score_sum));
            }

            let best_total = best.as_ref().map(|(o, _)| o.total_sessions()).unwrap_or(0);
            if best_total >= target {
                info!(attempt, best_total, "已达目标课次，提前收敛");
                break;
            }
            if attempt >= SETTLE_AFTER_ATTEMPT && best_total >= min_acceptable {
                info!(attempt, best_total, "已达可接受线，提前收敛");
                break;
            }
        }

        // 至少执行过一次尝试，best 必然存在
        let outcome = match best {
            Some((outcome, _)) => outcome,
            None => self.run_attempt(&unique_ids, &occupancy, &avoided, &mut master),
        };

        let timetables: Vec<Timetable> = unique_ids
            .iter()
            .map(|id| self.cohort_timetable(id, seed, &outcome))
            .collect();

        info!(
            total_entries = outcome.entries.len(),
            total_sessions = outcome.total_sessions(),
            "多班级生成完成"
        );
        Ok(timetables)
    }

    // ========================================================================
    // 单次尝试
    // ========================================================================

    /// 执行一次完整的放置尝试
    fn run_attempt(
        &self,
        cohort_ids: &[String],
        committed: &CommittedOccupancy,
        avoided: &PatternSet<SlotPattern>,
        rng: &mut Lcg,
    ) -> AttemptOutcome {
        let profile = AttemptProfile::draw(rng);
        debug!(?profile, "尝试画像");

        let mut state = AttemptState::new(cohort_ids, self.settings.max_iterations);
        let detector = self.detector();

        // 本次运行涉及的实验课集合，驱动偏好起始节次规划
        let mut lab_subjects: Vec<&Subject> = Vec::new();
        for id in cohort_ids {
            for subject in self.subjects_for_cohort(&self.cohorts[id]) {
                if subject.is_lab() && !lab_subjects.iter().any(|s| s.id == subject.id) {
                    if let Some(stored) = self.subjects.get(&subject.id) {
                        lab_subjects.push(stored);
                    }
                }
            }
        }
        let mut planner = LabStartPlanner::new(self.grid.periods_per_day(), &lab_subjects);

        // 班级处理顺序由种子洗牌
        let mut order: Vec<String> = cohort_ids.to_vec();
        rng.shuffle(&mut order);

        for cohort_id in &order {
            let cohort = &self.cohorts[cohort_id];
            self.schedule_cohort(
                cohort,
                &mut state,
                &detector,
                committed,
                avoided,
                rng,
                &profile,
                &mut planner,
            );
        }

        self.drain_reschedule_queue(&mut state, &detector, committed, avoided);

        AttemptOutcome {
            entries: state.entries,
            conflicts: state.conflicts,
            placed_sessions: state.placed_sessions,
        }
    }

    /// 为一个班级放置全部学科
    #[allow(clippy::too_many_arguments)]
    fn schedule_cohort(
        &self,
        cohort: &Cohort,
        state: &mut AttemptState,
        detector: &ConflictDetector<'_>,
        committed: &CommittedOccupancy,
        avoided: &PatternSet<SlotPattern>,
        rng: &mut Lcg,
        profile: &AttemptProfile,
        planner: &mut LabStartPlanner,
    ) {
        let mut subjects = self.subjects_for_cohort(cohort);
        if subjects.is_empty() {
            warn!(cohort = %cohort.id, "班级没有可排学科");
            return;
        }

        // 洗牌后稳定排序：实验课最先，长连堂其次，单节课最后；
        // 同级之间保持洗牌产生的次序
        rng.shuffle(&mut subjects);
        subjects.sort_by_key(|s| {
            if s.is_lab() {
                0u8
            } else if s.continuous_periods > 1 {
                1
            } else {
                2
            }
        });

        debug!(
            cohort = %cohort.id,
            subjects = subjects.len(),
            "班级排课开始"
        );

        for subject in &subjects {
            if state.budget_exhausted() {
                state.conflicts.push((
                    cohort.id.clone(),
                    Conflict::new(
                        ConflictKind::ConstraintViolation,
                        ConflictSeverity::High,
                        format!("迭代预算耗尽，学科 {} 未能参与放置", subject.name),
                    ),
                ));
                continue;
            }

            if subject.is_lab() {
                self.place_lab_subject(
                    cohort, subject, state, detector, committed, avoided, rng, planner,
                );
            } else {
                self.place_theory_subject(
                    cohort, subject, state, detector, committed, avoided, rng, profile,
                );
            }
        }
    }

    // ========================================================================
    // 实验课放置
    // ========================================================================

    /// 放置一门实验课的全部实验块
    ///
    /// 每块为单日内 `continuous_periods` 个两两毗邻的节次，起始
    /// 节次须落在偏好起点的容差范围内。整块事务式放置；块可挤占
    /// 先前放置的单节理论课，被挤占条目进入重排队列。
    #[allow(clippy::too_many_arguments)]
    fn place_lab_subject(
        &self,
        cohort: &Cohort,
        subject: &Subject,
        state: &mut AttemptState,
        detector: &ConflictDetector<'_>,
        committed: &CommittedOccupancy,
        avoided: &PatternSet<SlotPattern>,
        rng: &mut Lcg,
        planner: &mut LabStartPlanner,
    ) {
        let length = subject.continuous_periods;
        let preferred = planner.preferred_start(&subject.id);
        let periods_per_day = self.grid.periods_per_day();
        let tolerance = (periods_per_day / 3).max(2) as i16;

        let instructors = self.instructor_candidates(cohort, subject, state, rng);
        let rooms = self.room_candidates(cohort, subject, rng);

        if instructors.is_empty() || rooms.is_empty() {
            state.conflicts.push((
                cohort.id.clone(),
                Conflict::new(
                    ConflictKind::ConstraintViolation,
                    ConflictSeverity::High,
                    format!(
                        "实验课 {} 缺少可用讲师或满足容量/设备要求的教室，{} 个实验块未排入",
                        subject.name, subject.sessions_per_week
                    ),
                )
                .with_suggestions(vec![
                    format!("为学科 {} 配置有任课资格的讲师", subject.id),
                    format!("检查实验室容量是否不小于 {} 且设备齐全", cohort.size),
                ]),
            ));
            return;
        }

        let mut days: Vec<u8> = (0..self.grid.day_count()).collect();
        rng.shuffle(&mut days);

        for block_index in 0..subject.sessions_per_week {
            let placed = self.try_place_lab_block(
                cohort, subject, length, preferred, tolerance, &days, &instructors, &rooms,
                state, detector, committed, avoided,
            );

            if !placed {
                let suggestions = self.unplaced_suggestions(cohort, subject, state);
                state.conflicts.push((
                    cohort.id.clone(),
                    Conflict::new(
                        ConflictKind::ConstraintViolation,
                        ConflictSeverity::High,
                        format!(
                            "实验课 {} 的第 {}/{} 个实验块（{} 节连堂）无法排入",
                            subject.name,
                            block_index + 1,
                            subject.sessions_per_week,
                            length
                        ),
                    )
                    .with_suggestions(suggestions),
                ));
            }
        }
    }

    /// 尝试放置一个实验块，返回是否成功
    #[allow(clippy::too_many_arguments)]
    fn try_place_lab_block(
        &self,
        cohort: &Cohort,
        subject: &Subject,
        length: u8,
        preferred: u8,
        tolerance: i16,
        days: &[u8],
        instructors: &[&Instructor],
        rooms: &[&Room],
        state: &mut AttemptState,
        detector: &ConflictDetector<'_>,
        committed: &CommittedOccupancy,
        avoided: &PatternSet<SlotPattern>,
    ) -> bool {
        for &day in days {
            // 同一实验课每天至多一块
            if state.cohort_subject_on_day(&cohort.id, &subject.id, day) {
                continue;
            }
            // 班级每天至多两个实验块
            if self.lab_blocks_on_day(state, &cohort.id, day) >= MAX_LAB_BLOCKS_PER_DAY {
                continue;
            }

            for (run_start, run_len) in self.grid.maximal_runs() {
                if run_len < length {
                    continue;
                }
                for offset in 0..=(run_len - length) {
                    let start = run_start + offset;
                    if (start as i16 - preferred as i16).abs() > tolerance {
                        continue;
                    }
                    if !self.grid.is_block_feasible(day, start, length) {
                        continue;
                    }
                    if block_hits_avoided(avoided, day, start, length) {
                        continue;
                    }
                    // 班级每日上限（按下限放宽）
                    if state.cohort_daily_count(&cohort.id, day) + length
                        > cohort.max_daily_periods.max(COHORT_DAILY_FLOOR)
                    {
                        continue;
                    }

                    for instructor in instructors {
                        if !self.instructor_budget_ok(state, instructor, day, length) {
                            continue;
                        }
                        if (start..start + length)
                            .any(|p| committed.instructor_busy(&instructor.id, day, p))
                        {
                            continue;
                        }

                        for room in rooms {
                            if (start..start + length)
                                .any(|p| committed.room_busy(&room.id, day, p))
                            {
                                continue;
                            }
                            if !state.consume_budget() {
                                return false;
                            }

                            if self.commit_lab_block(
                                cohort, subject, instructor, room, day, start, length, state,
                                detector,
                            ) {
                                state.instructor_memo.insert(
                                    (cohort.id.clone(), subject.id.clone()),
                                    instructor.id.clone(),
                                );
                                debug!(
                                    cohort = %cohort.id,
                                    subject = %subject.id,
                                    day,
                                    start,
                                    length,
                                    instructor = %instructor.id,
                                    room = %room.id,
                                    "实验块放置成功"
                                );
                                return true;
                            }
                        }
                    }
                }
            }
        }
        false
    }

    /// 事务式提交一个实验块
    ///
    /// 先收集块内全部冲突条目：只要有不可挤占者（实验条目或
    /// 连堂理论条目）即放弃；否则挤占（移入重排队列）后整块插入。
    /// 插入过程中任何一节未通过硬约束检查，整块截断回退。
    #[allow(clippy::too_many_arguments)]
    fn commit_lab_block(
        &self,
        cohort: &Cohort,
        subject: &Subject,
        instructor: &Instructor,
        room: &Room,
        day: u8,
        start: u8,
        length: u8,
        state: &mut AttemptState,
        detector: &ConflictDetector<'_>,
    ) -> bool {
        // 第一阶段：收集冲突条目下标，遇到不可挤占者立即放弃
        let mut displaced: Vec<usize> = Vec::new();
        for period in start..start + length {
            for (index, entry) in state.entries.iter().enumerate() {
                if entry.slot.day != day || entry.slot.period != period {
                    continue;
                }
                let clashes = entry.cohort_id == cohort.id
                    || entry.instructor_id == instructor.id
                    || entry.room_id == room.id;
                if !clashes {
                    continue;
                }
                let displaceable = self
                    .subjects
                    .get(&entry.subject_id)
                    .map_or(false, |s| !s.is_lab() && s.continuous_periods == 1);
                if displaceable {
                    displaced.push(index);
                } else {
                    return false;
                }
            }
        }

        // 第二阶段：挤占并整块插入
        displaced.sort_unstable();
        displaced.dedup();
        for &index in displaced.iter().rev() {
            let removed = state.entries.remove(index);
            debug!(entry = %removed.id, "实验块挤占条目，移入重排队列");
            state.unrecord_session(&removed.cohort_id);
            state.reschedule_queue.push(removed);
        }

        let mark = state.entries.len();
        for period in start..start + length {
            let slot = match self.grid.slot(day, period) {
                Some(slot) => slot,
                None => {
                    state.entries.truncate(mark);
                    return false;
                }
            };
            let entry = Entry::new(&subject.id, &instructor.id, &room.id, &cohort.id, slot);
            let conflicts = detector.check_hard_constraints(&entry, &state.entries);
            if !conflicts.is_empty() {
                warn!(
                    entry = %entry.id,
                    conflicts = conflicts.len(),
                    "实验块插入中途遇到约束违反，整块回退"
                );
                state.entries.truncate(mark);
                return false;
            }
            state.entries.push(entry);
        }

        state.record_session(&cohort.id);
        true
    }

    /// 班级当天已持有的实验块数（每门实验课每天至多一块，
    /// 故按当天出现的实验学科数计）
    fn lab_blocks_on_day(&self, state: &AttemptState, cohort_id: &str, day: u8) -> usize {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &state.entries {
            if entry.cohort_id != cohort_id || entry.slot.day != day {
                continue;
            }
            let is_lab = self
                .subjects
                .get(&entry.subject_id)
                .map_or(false, |s| s.is_lab());
            if is_lab && !seen.contains(&entry.subject_id.as_str()) {
                seen.push(&entry.subject_id);
            }
        }
        seen.len()
    }

    // ========================================================================
    // 理论课放置
    // ========================================================================

    /// 放置一门非实验学科的全部课次
    ///
    /// 每次课占用 `continuous_periods` 个毗邻节次（通常为 1）。
    /// 候选天为该班该科尚无安排的工作日；候选槽位按时段偏好分区，
    /// 偏好槽位先试。单节课不得紧邻同科已有安排，同科不得在多天
    /// 占用同一节次号。
    #[allow(clippy::too_many_arguments)]
    fn place_theory_subject(
        &self,
        cohort: &Cohort,
        subject: &Subject,
        state: &mut AttemptState,
        detector: &ConflictDetector<'_>,
        committed: &CommittedOccupancy,
        avoided: &PatternSet<SlotPattern>,
        rng: &mut Lcg,
        profile: &AttemptProfile,
    ) {
        let length = subject.continuous_periods;
        let instructors = self.instructor_candidates(cohort, subject, state, rng);
        let rooms = self.room_candidates(cohort, subject, rng);

        if instructors.is_empty() || rooms.is_empty() {
            state.conflicts.push((
                cohort.id.clone(),
                Conflict::new(
                    ConflictKind::ConstraintViolation,
                    ConflictSeverity::High,
                    format!(
                        "学科 {} 缺少可用讲师或满足容量要求的教室，{} 次课未排入",
                        subject.name, subject.sessions_per_week
                    ),
                )
                .with_suggestions(vec![
                    format!("为学科 {} 配置有任课资格的讲师", subject.id),
                    format!("检查教室容量是否不小于 {}", cohort.size),
                ]),
            ));
            return;
        }

        for session_index in 0..subject.sessions_per_week {
            let placed = self.try_place_theory_session(
                cohort, subject, length, &instructors, &rooms, state, detector, committed,
                avoided, rng, profile,
            );

            if !placed {
                let suggestions = self.unplaced_suggestions(cohort, subject, state);
                state.conflicts.push((
                    cohort.id.clone(),
                    Conflict::new(
                        ConflictKind::ConstraintViolation,
                        ConflictSeverity::High,
                        format!(
                            "学科 {} 的第 {}/{} 次课无法排入",
                            subject.name,
                            session_index + 1,
                            subject.sessions_per_week
                        ),
                    )
                    .with_suggestions(suggestions),
                ));
            }
        }
    }

    /// 尝试放置一次理论课，返回是否成功
    #[allow(clippy::too_many_arguments)]
    fn try_place_theory_session(
        &self,
        cohort: &Cohort,
        subject: &Subject,
        length: u8,
        instructors: &[&Instructor],
        rooms: &[&Room],
        state: &mut AttemptState,
        detector: &ConflictDetector<'_>,
        committed: &CommittedOccupancy,
        avoided: &PatternSet<SlotPattern>,
        rng: &mut Lcg,
        profile: &AttemptProfile,
    ) -> bool {
        let candidates =
            self.theory_candidates(cohort, subject, length, state, avoided, rng, profile);
        let ordered = self.partition_by_preference(
            subject,
            instructors.first().copied(),
            length,
            &candidates,
            state,
            rng,
            profile,
        );

        for (day, start) in ordered {
            for instructor in instructors {
                if !self.instructor_budget_ok(state, instructor, day, length) {
                    continue;
                }
                if (start..start + length)
                    .any(|p| committed.instructor_busy(&instructor.id, day, p))
                {
                    continue;
                }
                for room in rooms {
                    if (start..start + length).any(|p| committed.room_busy(&room.id, day, p)) {
                        continue;
                    }
                    if !state.consume_budget() {
                        return false;
                    }
                    if self.commit_session(
                        cohort, subject, instructor, room, day, start, length, state, detector,
                    ) {
                        state.instructor_memo.insert(
                            (cohort.id.clone(), subject.id.clone()),
                            instructor.id.clone(),
                        );
                        return true;
                    }
                }
            }
        }
        false
    }

    /// 构建一次理论课的候选 (工作日, 起始节次) 列表
    ///
    /// 过滤规则：
    /// - 候选天：该班该科尚无安排的工作日（种子洗牌）
    /// - 块内每节都不命中规避模式
    /// - 同科不得跨天复用节次号
    /// - 单节课不得紧邻同科已有安排
    /// - 班级每日上限（按下限放宽）
    fn theory_candidates(
        &self,
        cohort: &Cohort,
        subject: &Subject,
        length: u8,
        state: &AttemptState,
        avoided: &PatternSet<SlotPattern>,
        rng: &mut Lcg,
        profile: &AttemptProfile,
    ) -> Vec<(u8, u8)> {
        let periods_per_day = self.grid.periods_per_day();
        if length > periods_per_day {
            return Vec::new();
        }
        let max_start = periods_per_day - length + 1;

        let mut days: Vec<u8> = (0..self.grid.day_count())
            .filter(|&d| !state.cohort_subject_on_day(&cohort.id, &subject.id, d))
            .collect();
        rng.shuffle(&mut days);

        let used_periods = state.cohort_subject_periods(&cohort.id, &subject.id);
        let start_order = start_scan_order(max_start, profile);

        let mut candidates = Vec::new();
        for &day in &days {
            for &start in &start_order {
                if !self.grid.is_block_feasible(day, start, length) {
                    continue;
                }
                if block_hits_avoided(avoided, day, start, length) {
                    continue;
                }
                if (start..start + length).any(|p| used_periods.contains(&p)) {
                    continue;
                }
                if length == 1
                    && state.has_adjacent_same_subject(
                        &cohort.id,
                        &subject.id,
                        day,
                        start.wrapping_sub(1),
                        start + 1,
                    )
                {
                    continue;
                }
                if state.cohort_daily_count(&cohort.id, day) + length
                    > cohort.max_daily_periods.max(COHORT_DAILY_FLOOR)
                {
                    continue;
                }
                candidates.push((day, start));
            }
        }
        candidates
    }

    /// 按时段偏好把候选槽位分为"偏好/其余"两段
    ///
    /// 偏好命中来自学科偏好标签、主讲师偏好标签或主讲师偏好
    /// 工作日；分桶边界按尝试画像的放宽档位放宽。主讲师要求
    /// 避免连续授课时，紧邻其已有安排的槽位降级到"其余"段。
    /// 放宽档位为 2 时忽略分区，直接按基础顺序。
    #[allow(clippy::too_many_arguments)]
    fn partition_by_preference(
        &self,
        subject: &Subject,
        primary: Option<&Instructor>,
        length: u8,
        candidates: &[(u8, u8)],
        state: &AttemptState,
        rng: &mut Lcg,
        profile: &AttemptProfile,
    ) -> Vec<(u8, u8)> {
        if profile.time_flexibility >= 2 {
            let mut merged = candidates.to_vec();
            if profile.randomize_slot_selection {
                rng.shuffle(&mut merged);
            }
            return merged;
        }

        let flex = profile.flex_minutes();
        let mut preferred = Vec::new();
        let mut rest = Vec::new();

        for &(day, start) in candidates {
            let slot = match self.grid.slot(day, start) {
                Some(slot) => slot,
                None => continue,
            };

            let subject_hit = subject
                .preferred_times
                .iter()
                .any(|t| t.matches_slot(day, start, slot.start_minutes, flex));
            let instructor_hit = primary.map_or(false, |i| {
                i.prefers_day(day)
                    || i.preferred_times
                        .iter()
                        .any(|t| t.matches_slot(day, start, slot.start_minutes, flex))
            });

            let back_to_back = primary.map_or(false, |i| {
                i.avoid_back_to_back
                    && (state.instructor_at(&i.id, day, start.wrapping_sub(1))
                        || state.instructor_at(&i.id, day, start + length))
            });

            if (subject_hit || instructor_hit) && !back_to_back {
                preferred.push((day, start));
            } else {
                rest.push((day, start));
            }
        }

        if profile.randomize_slot_selection {
            rng.shuffle(&mut preferred);
            rng.shuffle(&mut rest);
        }

        preferred.extend(rest);
        preferred
    }

    /// 事务式提交一次课（不挤占既有条目）
    ///
    /// 逐节通过硬约束检查后插入；任何一节失败即截断回退到
    /// 放置前的长度。
    #[allow(clippy::too_many_arguments)]
    fn commit_session(
        &self,
        cohort: &Cohort,
        subject: &Subject,
        instructor: &Instructor,
        room: &Room,
        day: u8,
        start: u8,
        length: u8,
        state: &mut AttemptState,
        detector: &ConflictDetector<'_>,
    ) -> bool {
        let mark = state.entries.len();
        for period in start..start + length {
            let slot = match self.grid.slot(day, period) {
                Some(slot) => slot,
                None => {
                    state.entries.truncate(mark);
                    return false;
                }
            };
            let entry = Entry::new(&subject.id, &instructor.id, &room.id, &cohort.id, slot);
            let conflicts = detector.check_hard_constraints(&entry, &state.entries);
            if !conflicts.is_empty() {
                state.entries.truncate(mark);
                return false;
            }
            state.entries.push(entry);
        }
        state.record_session(&cohort.id);
        true
    }

    // ========================================================================
    // 重排队列
    // ========================================================================

    /// 主放置结束后统一重排被挤占的条目（只排空一次）
    ///
    /// 对每条被挤占的单节条目，在仍然可用的槽位中寻找通过全部
    /// 硬约束与理论课邻接规则的位置；找不到时产出高严重度冲突。
    fn drain_reschedule_queue(
        &self,
        state: &mut AttemptState,
        detector: &ConflictDetector<'_>,
        committed: &CommittedOccupancy,
        avoided: &PatternSet<SlotPattern>,
    ) {
        let queued = std::mem::take(&mut state.reschedule_queue);
        if queued.is_empty() {
            return;
        }
        info!(queued = queued.len(), "开始重排被挤占的条目");

        for old in queued {
            let subject = match self.subjects.get(&old.subject_id) {
                Some(subject) => subject,
                None => continue,
            };
            let cohort = match self.cohorts.get(&old.cohort_id) {
                Some(cohort) => cohort,
                None => continue,
            };
            let instructor = self.catalog.instructor(&old.instructor_id);

            let mut placed = false;
            'search: for day in 0..self.grid.day_count() {
                // 重排保持理论课规则：同科同天不重复、不跨天复用节次号
                if state.cohort_subject_on_day(&cohort.id, &subject.id, day) {
                    continue;
                }
                let used_periods = state.cohort_subject_periods(&cohort.id, &subject.id);

                for period in 1..=self.grid.periods_per_day() {
                    if block_hits_avoided(avoided, day, period, 1) {
                        continue;
                    }
                    if used_periods.contains(&period) {
                        continue;
                    }
                    if state.has_adjacent_same_subject(
                        &cohort.id,
                        &subject.id,
                        day,
                        period.wrapping_sub(1),
                        period + 1,
                    ) {
                        continue;
                    }
                    if state.cohort_daily_count(&cohort.id, day) + 1
                        > cohort.max_daily_periods.max(COHORT_DAILY_FLOOR)
                    {
                        continue;
                    }
                    if let Some(instructor) = instructor {
                        if !self.instructor_budget_ok(state, instructor, day, 1) {
                            continue;
                        }
                    }
                    if committed.instructor_busy(&old.instructor_id, day, period)
                        || committed.room_busy(&old.room_id, day, period)
                    {
                        continue;
                    }

                    let slot = match self.grid.slot(day, period) {
                        Some(slot) => slot,
                        None => continue,
                    };
                    let entry = Entry::new(
                        &old.subject_id,
                        &old.instructor_id,
                        &old.room_id,
                        &old.cohort_id,
                        slot,
                    );
                    if detector.check_hard_constraints(&entry, &state.entries).is_empty() {
                        debug!(entry = %entry.id, "被挤占条目重排成功");
                        state.entries.push(entry);
                        state.record_session(&old.cohort_id);
                        placed = true;
                        break 'search;
                    }
                }
            }

            if !placed {
                warn!(entry = %old.id, "被挤占条目无法重排");
                let suggestions = self.unplaced_suggestions(cohort, subject, state);
                state.conflicts.push((
                    old.cohort_id.clone(),
                    Conflict::new(
                        ConflictKind::ConstraintViolation,
                        ConflictSeverity::High,
                        format!(
                            "学科 {} 被实验块挤占后无法重新排入",
                            subject.name
                        ),
                    )
                    .with_entries(vec![old.id.clone()])
                    .with_suggestions(suggestions),
                ));
            }
        }
    }

    // ========================================================================
    // 候选与约束辅助
    // ========================================================================

    /// 班级实际使用的学科列表（规范化副本）
    ///
    /// 必修列表为空时回退到完整学科目录；列表中未知的学科 ID
    /// 记告警后跳过。
    fn subjects_for_cohort(&self, cohort: &Cohort) -> Vec<Subject> {
        if cohort.mandatory_subject_ids.is_empty() {
            debug!(cohort = %cohort.id, "必修列表为空，回退到完整学科目录");
            return self
                .catalog
                .subjects
                .iter()
                .filter_map(|s| self.subjects.get(&s.id).cloned())
                .collect();
        }

        cohort
            .mandatory_subject_ids
            .iter()
            .filter_map(|id| match self.subjects.get(id) {
                Some(subject) => Some(subject.clone()),
                None => {
                    warn!(cohort = %cohort.id, subject = %id, "必修列表引用了未知学科，跳过");
                    None
                }
            })
            .collect()
    }

    /// 学科的讲师候选列表
    ///
    /// 有任课资格者按目录顺序收集后种子洗牌；已为该班该科任课的
    /// 讲师（若有）稳定提前，保证同一门课尽量同一人授课。
    fn instructor_candidates<'a>(
        &'a self,
        cohort: &Cohort,
        subject: &Subject,
        state: &AttemptState,
        rng: &mut Lcg,
    ) -> Vec<&'a Instructor> {
        let mut candidates: Vec<&Instructor> = self
            .catalog
            .instructors
            .iter()
            .filter(|i| i.is_eligible(&subject.id))
            .collect();
        rng.shuffle(&mut candidates);

        if let Some(memo) = state
            .instructor_memo
            .get(&(cohort.id.clone(), subject.id.clone()))
        {
            candidates.sort_by_key(|i| if &i.id == memo { 0u8 } else { 1 });
        }
        candidates
    }

    /// 学科的教室候选列表
    ///
    /// 容量不小于班级人数、设备满足学科要求的教室，种子洗牌后按
    /// 教室类型与学科类型的匹配度稳定分区（实验课优先实验室，
    /// 研讨课优先研讨厅/报告厅）。
    fn room_candidates<'a>(
        &'a self,
        cohort: &Cohort,
        subject: &Subject,
        rng: &mut Lcg,
    ) -> Vec<&'a Room> {
        let mut candidates: Vec<&Room> = self
            .catalog
            .rooms
            .iter()
            .filter(|r| r.fits(cohort.size) && r.has_equipment(&subject.required_equipment))
            .collect();
        rng.shuffle(&mut candidates);
        candidates.sort_by_key(|r| room_kind_rank(subject.kind, r.kind));
        candidates
    }

    /// 讲师工作量检查（按下限放宽）
    ///
    /// 生效上限为 `max(配置值, 6)` 每日、`max(配置值, 30)` 每周。
    fn instructor_budget_ok(
        &self,
        state: &AttemptState,
        instructor: &Instructor,
        day: u8,
        added: u8,
    ) -> bool {
        let daily_cap = instructor.max_daily_periods.max(INSTRUCTOR_DAILY_FLOOR);
        let weekly_cap = instructor.max_weekly_periods.max(INSTRUCTOR_WEEKLY_FLOOR);
        state.instructor_daily_count(&instructor.id, day) + added <= daily_cap
            && state.instructor_weekly_count(&instructor.id) + added <= weekly_cap
    }

    /// 未排入课次的修复建议
    fn unplaced_suggestions(
        &self,
        cohort: &Cohort,
        subject: &Subject,
        state: &AttemptState,
    ) -> Vec<String> {
        let mut suggestions: Vec<String> = free_slots_for_cohort(
            &state.entries,
            &cohort.id,
            self.grid.day_count(),
            self.grid.periods_per_day(),
        )
        .into_iter()
        .take(3)
        .map(|p| {
            format!(
                "班级 {} 在第 {} 天第 {} 节尚有空闲",
                cohort.id,
                p.day + 1,
                p.period
            )
        })
        .collect();
        suggestions.push(format!(
            "放宽学科 {} 相关讲师的工作量上限或增加可任课讲师",
            subject.id
        ));
        suggestions
    }

    // ========================================================================
    // 结果组装
    // ========================================================================

    /// 从尝试结果组装一个班级的课表
    fn cohort_timetable(&self, cohort_id: &str, seed: u32, outcome: &AttemptOutcome) -> Timetable {
        let entries: Vec<Entry> = outcome
            .entries
            .iter()
            .filter(|e| e.cohort_id == cohort_id)
            .cloned()
            .collect();
        let conflicts: Vec<Conflict> = outcome
            .conflicts
            .iter()
            .filter(|(id, _)| id.as_str() == cohort_id)
            .map(|(_, c)| c.clone())
            .collect();
        let score = self.cohort_score(cohort_id, outcome);

        Timetable::draft(
            format!("tt-{}-{:08x}", cohort_id, seed),
            entries,
            conflicts,
            score,
            vec![cohort_id.to_string()],
        )
    }

    /// 班级在尝试结果中的质量评分
    fn cohort_score(&self, cohort_id: &str, outcome: &AttemptOutcome) -> u32 {
        let cohort = &self.cohorts[cohort_id];
        let required = required_sessions(&self.subjects_for_cohort(cohort));
        let placed = outcome.placed_sessions.get(cohort_id).copied().unwrap_or(0);
        quality_score(placed, required)
    }
}

// ============================================================================
// 自由函数辅助
// ============================================================================

/// 块内是否有节次命中规避模式
fn block_hits_avoided(
    avoided: &PatternSet<SlotPattern>,
    day: u8,
    start: u8,
    length: u8,
) -> bool {
    if avoided.is_empty() {
        return false;
    }
    (start..start + length).any(|p| avoided.contains(&SlotPattern::new(day, p)))
}

/// 理论课起始节次的扫描顺序
///
/// 偏好靠前槽位时按节次升序；否则从画像给出的起始偏移处开始
/// 旋转扫描，让不同种子偏向一天中的不同时段。
fn start_scan_order(max_start: u8, profile: &AttemptProfile) -> Vec<u8> {
    let mut order: Vec<u8> = (1..=max_start).collect();
    if !profile.prefer_earlier_slots && !order.is_empty() {
        let offset = (profile.start_period_offset.min(max_start) - 1) as usize;
        order.rotate_left(offset);
    }
    order
}

/// 教室类型与学科类型的匹配度（0 最优先）
fn room_kind_rank(subject_kind: SubjectKind, room_kind: RoomKind) -> u8 {
    match (subject_kind, room_kind) {
        (SubjectKind::Lab, RoomKind::Lab) => 0,
        (SubjectKind::Seminar, RoomKind::SeminarHall) => 0,
        (SubjectKind::Seminar, RoomKind::Auditorium) => 1,
        (SubjectKind::Theory, RoomKind::Classroom) => 0,
        (SubjectKind::Tutorial, RoomKind::Classroom) => 0,
        _ => 2,
    }
}

// 测试模块
#[cfg(test)]
#[path = "solver_theory_tests.rs"]
mod solver_theory_tests;

#[cfg(test)]
#[path = "solver_lab_tests.rs"]
mod solver_lab_tests;

#[cfg(test)]
#[path = "solver_multi_cohort_tests.rs"]
mod solver_multi_cohort_tests;

#[cfg(test)]
#[path = "solver_random_tests.rs"]
mod solver_random_tests;
