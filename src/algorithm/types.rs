// ============================================================================
// 引擎核心类型模块
// ============================================================================
// 本模块定义排课引擎的输出与配置类型：
// - TimeSlot / SlotPattern : 时间槽位（工作日 + 节次 + 起止时刻）与其模式
// - Entry                  : 已落定的单节排课条目
// - Conflict 系列          : 不可避免冲突的结构化描述
// - Timetable / Status     : 课表输出及其状态机
// - OptimizationSettings   : 引擎调用的优化选项
// - CommittedRegistry      : 受保护的既有课表登记表
//
// 条目（Entry）是输出与冲突检测的最小单位：连堂课以多条条目表示，
// 每节一条，共享学科/讲师/教室/班级。
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// 时间槽位
// ============================================================================

/// 时间槽位
///
/// (工作日, 节次号, 开始时刻, 结束时刻) 四元组。工作日序号来自
/// 校历的有序工作日列表（0 起始），节次号 1 起始且在一天内稠密。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    /// 工作日序号（0 起始）
    pub day: u8,
    /// 节次号（1 起始）
    pub period: u8,
    /// 开始时刻（当日分钟数）
    pub start_minutes: u16,
    /// 结束时刻（当日分钟数）
    pub end_minutes: u16,
}

impl TimeSlot {
    /// 创建时间槽位
    pub fn new(day: u8, period: u8, start_minutes: u16, end_minutes: u16) -> Self {
        Self {
            day,
            period,
            start_minutes,
            end_minutes,
        }
    }

    /// 槽位的 (工作日, 节次) 模式
    pub fn pattern(&self) -> SlotPattern {
        SlotPattern {
            day: self.day,
            period: self.period,
        }
    }

    /// 是否与另一槽位处于同一 (工作日, 节次)
    pub fn same_pattern(&self, other: &TimeSlot) -> bool {
        self.day == other.day && self.period == other.period
    }
}

/// 槽位模式
///
/// 仅含 (工作日, 节次) 的槽位骨架，用于规避模式列表与空闲槽位查询。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotPattern {
    /// 工作日序号（0 起始）
    pub day: u8,
    /// 节次号（1 起始）
    pub period: u8,
}

impl SlotPattern {
    /// 创建槽位模式
    pub fn new(day: u8, period: u8) -> Self {
        Self { day, period }
    }
}

// ============================================================================
// 排课条目
// ============================================================================

/// 排课条目
///
/// 一条已通过全部硬约束检查的落定安排：(学科, 讲师, 教室, 班级, 槽位)。
/// 条目 ID 由班级/学科/槽位确定性拼接而成，在一份课表内唯一。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// 条目 ID（确定性派生，在课表内唯一）
    pub id: String,
    /// 学科 ID
    pub subject_id: String,
    /// 讲师 ID
    pub instructor_id: String,
    /// 教室 ID
    pub room_id: String,
    /// 班级 ID
    pub cohort_id: String,
    /// 时间槽位
    pub slot: TimeSlot,
}

impl Entry {
    /// 创建排课条目，ID 由各分量确定性派生
    pub fn new(
        subject_id: impl Into<String>,
        instructor_id: impl Into<String>,
        room_id: impl Into<String>,
        cohort_id: impl Into<String>,
        slot: TimeSlot,
    ) -> Self {
        let subject_id = subject_id.into();
        let cohort_id = cohort_id.into();
        let id = format!(
            "{}:{}@{}-{}",
            cohort_id, subject_id, slot.day, slot.period
        );
        Self {
            id,
            subject_id,
            instructor_id: instructor_id.into(),
            room_id: room_id.into(),
            cohort_id,
            slot,
        }
    }
}

// ============================================================================
// 冲突
// ============================================================================

/// 冲突类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    /// 讲师在同一槽位出现于两条条目
    InstructorClash,
    /// 教室在同一槽位出现于两条条目
    RoomClash,
    /// 班级在同一槽位出现于两条条目
    CohortClash,
    /// 教室容量小于班级人数
    CapacityShortfall,
    /// 其他约束违反（如必修课时无法排入）
    ConstraintViolation,
}

/// 冲突严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictSeverity {
    /// 硬约束违反，不可接受
    High,
    /// 软约束违反，可接受但不推荐
    Medium,
    /// 轻微问题，仅提示
    Low,
}

/// 冲突记录
///
/// 描述一次不可避免的约束违反：类型、严重程度、人类可读的描述、
/// 涉及的条目 ID 列表与修复建议列表。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// 冲突类型
    pub kind: ConflictKind,
    /// 严重程度
    pub severity: ConflictSeverity,
    /// 描述信息
    pub description: String,
    /// 涉及的条目 ID
    pub affected_entries: Vec<String>,
    /// 修复建议
    pub suggestions: Vec<String>,
}

impl Conflict {
    /// 创建冲突记录
    pub fn new(
        kind: ConflictKind,
        severity: ConflictSeverity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            description: description.into(),
            affected_entries: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// 追加涉及的条目 ID
    pub fn with_entries(mut self, entry_ids: Vec<String>) -> Self {
        self.affected_entries = entry_ids;
        self
    }

    /// 追加修复建议
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }
}

// ============================================================================
// 课表
// ============================================================================

/// 课表状态
///
/// 引擎只产出 Draft；Draft -> Approved -> Published 的流转
/// 发生在引擎之外（审批与发布属于宿主应用职责）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimetableStatus {
    /// 草稿（引擎输出的唯一状态）
    Draft,
    /// 已审批
    Approved,
    /// 已发布
    Published,
}

/// 课表
///
/// 一次生成调用对一个班级集合的完整输出：条目列表、未能避免的
/// 冲突列表、整数质量评分与覆盖的班级 ID 列表。课表一经产出，
/// 对引擎而言即不可变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timetable {
    /// 课表 ID
    pub id: String,
    /// 生成时间
    pub generated_at: DateTime<Utc>,
    /// 条目列表（按放置顺序）
    pub entries: Vec<Entry>,
    /// 未解决的冲突列表
    pub conflicts: Vec<Conflict>,
    /// 质量评分（0-100）
    pub score: u32,
    /// 状态
    pub status: TimetableStatus,
    /// 覆盖的班级 ID 列表
    pub cohort_ids: Vec<String>,
}

impl Timetable {
    /// 创建草稿课表
    pub fn draft(
        id: impl Into<String>,
        entries: Vec<Entry>,
        conflicts: Vec<Conflict>,
        score: u32,
        cohort_ids: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            generated_at: Utc::now(),
            entries,
            conflicts,
            score,
            status: TimetableStatus::Draft,
            cohort_ids,
        }
    }

    /// 课表是否覆盖指定班级
    pub fn covers_cohort(&self, cohort_id: &str) -> bool {
        self.cohort_ids.iter().any(|id| id == cohort_id)
    }
}

// ============================================================================
// 既有课表登记表
// ============================================================================

/// 既有课表登记表
///
/// 外部提供的、受保护的已保存课表集合。为班级集合 C 生成课表时，
/// 登记表中班级集合与 C 不相交的课表，其条目在对应槽位上预先
/// 占用讲师与教室；与 C 相交的课表被视为将被替换，不参与占用。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommittedRegistry {
    /// 已保存的课表列表
    pub timetables: Vec<Timetable>,
}

impl CommittedRegistry {
    /// 创建空登记表
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一份课表
    pub fn add(&mut self, timetable: Timetable) {
        self.timetables.push(timetable);
    }

    /// 对给定班级集合生效的预占用条目
    ///
    /// 仅返回班级集合与 `cohort_ids` 不相交的课表中的条目。
    pub fn blocking_entries(&self, cohort_ids: &[String]) -> Vec<&Entry> {
        self.timetables
            .iter()
            .filter(|t| !t.cohort_ids.iter().any(|id| cohort_ids.contains(id)))
            .flat_map(|t| t.entries.iter())
            .collect()
    }
}

// ============================================================================
// 优化选项
// ============================================================================

/// 优先级权重
///
/// 各维度权重取值 [0,1]。当前版本仅参与种子混合（影响随机化方向），
/// 为后续代价函数扩展保留。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityWeights {
    /// 讲师工作量均衡
    pub instructor_load: f32,
    /// 教室利用率
    pub room_utilization: f32,
    /// 学生课表紧凑度
    pub student_schedule: f32,
    /// 约束满足度
    pub constraints: f32,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            instructor_load: 1.0,
            room_utilization: 1.0,
            student_schedule: 1.0,
            constraints: 1.0,
        }
    }
}

/// 优化选项
///
/// 控制一次生成调用的搜索行为。`avoided_patterns` 仅在单班级
/// 模式下生效：命中的 (工作日, 节次) 会从候选槽位中移除，使同一
/// 班级的多次生成呈现不同布局。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSettings {
    /// 单次尝试的内部迭代上限（咨询性）
    pub max_iterations: u32,

    /// 多次尝试循环的时间上限（秒），0 表示不限制；
    /// 仅在尝试之间检查，不抢占单次尝试
    pub time_limit_seconds: u32,

    /// 优先级权重
    #[serde(default)]
    pub priority_weights: PriorityWeights,

    /// 规避的 (工作日, 节次) 模式集合（仅单班级模式）
    #[serde(default)]
    pub avoided_patterns: Vec<SlotPattern>,

    /// 固定随机种子（确定性测试钩子；缺省时由时钟与熵混合产生）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u32>,
}

impl Default for OptimizationSettings {
    fn default() -> Self {
        Self {
            max_iterations: 100_000,
            time_limit_seconds: 30,
            priority_weights: PriorityWeights::default(),
            avoided_patterns: Vec::new(),
            random_seed: None,
        }
    }
}

impl OptimizationSettings {
    /// 校验选项取值
    ///
    /// # 返回
    /// 取值非法时返回描述错误的字符串
    pub fn validate(&self) -> Result<(), String> {
        if self.max_iterations == 0 {
            return Err("最大迭代次数必须大于 0".to_string());
        }

        let weights = [
            ("instructorLoad", self.priority_weights.instructor_load),
            ("roomUtilization", self.priority_weights.room_utilization),
            ("studentSchedule", self.priority_weights.student_schedule),
            ("constraints", self.priority_weights.constraints),
        ];
        for (name, value) in weights {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("权重 {} 必须在 [0,1] 区间内，当前值：{}", name, value));
            }
        }

        Ok(())
    }
}
