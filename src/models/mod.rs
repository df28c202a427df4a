// ============================================================================
// 数据目录模型模块
// ============================================================================
// 本模块定义排课引擎的输入目录：校历、学科、讲师、教室与班级。
//
// 模块组织：
// - Institution / PeriodTiming / BreakInterval : 校历（工作日、节次时刻、课间休息）
// - Subject / SubjectKind                      : 学科及其每周课时结构
// - Instructor                                 : 讲师及其任课资格与偏好
// - Room / RoomKind                            : 教室及其容量与设备
// - Cohort                                     : 班级（固定修读同一课程组的学生群体）
// - DayPart / TimePreference                   : 封闭的时段偏好词汇表
//
// 设计原则：
// 1. 所有类型都实现 Debug, Clone 特征
// 2. 需要与宿主应用交换的类型实现 Serialize, Deserialize
// 3. 使用 #[serde(rename_all = "camelCase")] 确保与前端 JSON 格式一致
// 4. 目录在一次引擎调用中是不可变输入，引擎不修改目录
// 5. 为复杂类型提供构造函数和辅助方法
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// 时段偏好词汇表
// ============================================================================

/// 一天内的时段分桶
///
/// 依据节次的开始时刻（当日分钟数）划分：
/// - Morning  : 12:00 之前
/// - Afternoon: 12:00 - 17:00
/// - Evening  : 17:00 及以后
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayPart {
    /// 上午（开始时刻 < 12:00）
    Morning,
    /// 下午（12:00 <= 开始时刻 < 17:00）
    Afternoon,
    /// 晚间（开始时刻 >= 17:00）
    Evening,
}

/// 正午（分钟数），上午/下午的分界
const NOON_MINUTES: u16 = 12 * 60;

/// 17:00（分钟数），下午/晚间的分界
const EVENING_MINUTES: u16 = 17 * 60;

impl DayPart {
    /// 根据开始时刻（当日分钟数）判断时段分桶
    pub fn of_minutes(start_minutes: u16) -> Self {
        if start_minutes < NOON_MINUTES {
            DayPart::Morning
        } else if start_minutes < EVENING_MINUTES {
            DayPart::Afternoon
        } else {
            DayPart::Evening
        }
    }
}

/// 时段偏好
///
/// 封闭词汇表的结构化形式：可选的时段分桶、可选的工作日序号、
/// 可选的节次号。所有给出的分量必须同时匹配才算命中。
///
/// 示例：
/// - `{ part: Morning }`         : 任意工作日的上午
/// - `{ part: Morning, day: 0 }` : 第一个工作日的上午
/// - `{ period: 3 }`             : 任意工作日的第 3 节
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePreference {
    /// 时段分桶（可选）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<DayPart>,

    /// 工作日序号（0 表示第一个工作日，可选）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,

    /// 节次号（1 起始，可选）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<u8>,
}

impl TimePreference {
    /// 创建仅指定时段分桶的偏好
    pub fn part(part: DayPart) -> Self {
        Self {
            part: Some(part),
            ..Default::default()
        }
    }

    /// 创建指定工作日 + 时段分桶的偏好
    pub fn day_part(day: u8, part: DayPart) -> Self {
        Self {
            part: Some(part),
            day: Some(day),
            period: None,
        }
    }

    /// 判断偏好是否命中给定槽位
    ///
    /// # 参数
    /// - `day`: 槽位的工作日序号（0 起始）
    /// - `period`: 槽位的节次号（1 起始）
    /// - `start_minutes`: 槽位的开始时刻（当日分钟数）
    /// - `flex_minutes`: 分桶边界的放宽量（分钟），0 表示严格分桶
    ///
    /// # 返回
    /// 所有给出的分量都匹配时返回 true；完全为空的偏好不命中任何槽位
    pub fn matches_slot(&self, day: u8, period: u8, start_minutes: u16, flex_minutes: u16) -> bool {
        if self.part.is_none() && self.day.is_none() && self.period.is_none() {
            return false;
        }

        if let Some(part) = self.part {
            if !part_matches(part, start_minutes, flex_minutes) {
                return false;
            }
        }

        if let Some(d) = self.day {
            if d != day {
                return false;
            }
        }

        if let Some(p) = self.period {
            if p != period {
                return false;
            }
        }

        true
    }
}

/// 按放宽后的边界判断开始时刻是否落在分桶内
fn part_matches(part: DayPart, start_minutes: u16, flex_minutes: u16) -> bool {
    let start = start_minutes as i32;
    let flex = flex_minutes as i32;
    let noon = NOON_MINUTES as i32;
    let evening = EVENING_MINUTES as i32;

    match part {
        DayPart::Morning => start < noon + flex,
        DayPart::Afternoon => start >= noon - flex && start < evening + flex,
        DayPart::Evening => start >= evening - flex,
    }
}

// ============================================================================
// 校历
// ============================================================================

/// 节次时刻
///
/// 描述一天内某一节课的编号与起止时刻。节次号从 1 开始，
/// 在一天内必须连续无缺口。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTiming {
    /// 节次号（1 起始，在一天内稠密连续）
    pub period: u8,
    /// 开始时刻（当日分钟数）
    pub start_minutes: u16,
    /// 结束时刻（当日分钟数）
    pub end_minutes: u16,
}

impl PeriodTiming {
    /// 创建节次时刻
    pub fn new(period: u8, start_minutes: u16, end_minutes: u16) -> Self {
        Self {
            period,
            start_minutes,
            end_minutes,
        }
    }
}

/// 课间休息区间
///
/// 休息区间会打断相邻节次的毗邻关系：即使两节课的节次号连续、
/// 时刻首尾相接，只要休息区间覆盖衔接点，它们也不构成连堂。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakInterval {
    /// 休息名称（如 "课间操"、"午休"）
    pub name: String,
    /// 开始时刻（当日分钟数）
    pub start_minutes: u16,
    /// 结束时刻（当日分钟数）
    pub end_minutes: u16,
}

impl BreakInterval {
    /// 创建休息区间
    pub fn new(name: impl Into<String>, start_minutes: u16, end_minutes: u16) -> Self {
        Self {
            name: name.into(),
            start_minutes,
            end_minutes,
        }
    }
}

/// 校历
///
/// 定义一周的离散时间网格：有序的工作日列表、按节次号升序的
/// 节次时刻表、以及课间休息区间。休息区间对每个工作日统一生效。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Institution {
    /// 院校名称
    pub name: String,
    /// 有序的工作日名称列表（如 ["周一", ..., "周五"]）
    pub working_days: Vec<String>,
    /// 节次时刻表（按节次号升序）
    pub periods: Vec<PeriodTiming>,
    /// 课间休息区间
    pub breaks: Vec<BreakInterval>,
}

impl Institution {
    /// 创建校历
    pub fn new(
        name: impl Into<String>,
        working_days: Vec<String>,
        periods: Vec<PeriodTiming>,
        breaks: Vec<BreakInterval>,
    ) -> Self {
        Self {
            name: name.into(),
            working_days,
            periods,
            breaks,
        }
    }

    /// 每天的节次数
    pub fn periods_per_day(&self) -> u8 {
        self.periods.len() as u8
    }
}

// ============================================================================
// 学科
// ============================================================================

/// 学科类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectKind {
    /// 理论课
    Theory,
    /// 实验课（必须以连堂块整体排入单日）
    Lab,
    /// 习题课
    Tutorial,
    /// 研讨课
    Seminar,
}

impl SubjectKind {
    /// 学科 ID 的类型后缀（理论课不加后缀）
    fn id_suffix(&self) -> Option<&'static str> {
        match self {
            SubjectKind::Theory => None,
            SubjectKind::Lab => Some("lab"),
            SubjectKind::Tutorial => Some("tutorial"),
            SubjectKind::Seminar => Some("seminar"),
        }
    }

    /// 是否为实验课
    pub fn is_lab(&self) -> bool {
        matches!(self, SubjectKind::Lab)
    }
}

/// 学科
///
/// 每周课时结构由三个字段描述：
/// - `weekly_periods`    : 每周总节次数
/// - `sessions_per_week` : 每周独立排课次数
/// - `continuous_periods`: 每次排课占用的连续节次数（连堂长度）
///
/// 不变量：`continuous_periods >= 1` 且 `continuous_periods <= weekly_periods`。
/// 实验课要求 `continuous_periods >= 2`；不满足的输入会在引擎内
/// 按调用粒度自动规范化（见 [`Subject::normalized`]），不回写目录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// 稳定标识：理论课取课程代码，其余类型为代码加类型后缀
    pub id: String,
    /// 课程代码（如 "CS301"）
    pub code: String,
    /// 显示名称
    pub name: String,
    /// 学科类型
    pub kind: SubjectKind,
    /// 学分
    pub credits: u8,
    /// 每周总节次数
    pub weekly_periods: u8,
    /// 每周独立排课次数
    pub sessions_per_week: u8,
    /// 每次排课的连堂长度
    pub continuous_periods: u8,
    /// 时段偏好提示
    #[serde(default)]
    pub preferred_times: Vec<TimePreference>,
    /// 所需设备标签（教室必须全部具备）
    #[serde(default)]
    pub required_equipment: Vec<String>,
}

impl Subject {
    /// 由课程代码与类型推导稳定 ID
    ///
    /// 理论课直接使用代码；其余类型为 "代码-类型后缀"（如 "CS301-lab"），
    /// 保证同一代码的理论课与实验课拥有不同的标识。
    pub fn derive_id(code: &str, kind: SubjectKind) -> String {
        match kind.id_suffix() {
            None => code.to_string(),
            Some(suffix) => format!("{}-{}", code, suffix),
        }
    }

    /// 创建学科
    ///
    /// # 参数
    /// - `code`: 课程代码
    /// - `name`: 显示名称
    /// - `kind`: 学科类型
    /// - `credits`: 学分
    /// - `weekly_periods`: 每周总节次数
    /// - `sessions_per_week`: 每周独立排课次数
    /// - `continuous_periods`: 连堂长度
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        kind: SubjectKind,
        credits: u8,
        weekly_periods: u8,
        sessions_per_week: u8,
        continuous_periods: u8,
    ) -> Self {
        let code = code.into();
        Self {
            id: Self::derive_id(&code, kind),
            code,
            name: name.into(),
            kind,
            credits,
            weekly_periods,
            sessions_per_week,
            continuous_periods,
            preferred_times: Vec::new(),
            required_equipment: Vec::new(),
        }
    }

    /// 校验课时结构不变量
    ///
    /// # 返回
    /// 违反不变量时返回描述错误的字符串
    pub fn validate(&self) -> Result<(), String> {
        if self.continuous_periods == 0 {
            return Err(format!("学科 {} 的连堂长度不能为 0", self.id));
        }
        if self.sessions_per_week == 0 {
            return Err(format!("学科 {} 的每周排课次数不能为 0", self.id));
        }
        if self.continuous_periods > self.weekly_periods {
            return Err(format!(
                "学科 {} 的连堂长度 {} 超过每周总节次数 {}",
                self.id, self.continuous_periods, self.weekly_periods
            ));
        }
        Ok(())
    }

    /// 返回按调用粒度规范化后的副本
    ///
    /// 实验课声明 `continuous_periods == 1` 或 `weekly_periods == 1` 时，
    /// 与实验课契约矛盾（单节"实验"无法构成实验块），静默规范化为：
    /// - `continuous_periods = max(2, weekly_periods)`
    /// - `sessions_per_week = 1`
    /// - `weekly_periods = continuous_periods`
    ///
    /// 其余学科原样返回。规范化不回写输入目录。
    pub fn normalized(&self) -> Subject {
        if self.kind.is_lab() && (self.continuous_periods < 2 || self.weekly_periods == 1) {
            let continuous = self.weekly_periods.max(2);
            let mut fixed = self.clone();
            fixed.continuous_periods = continuous;
            fixed.sessions_per_week = 1;
            fixed.weekly_periods = continuous;
            return fixed;
        }
        self.clone()
    }

    /// 是否为实验课
    pub fn is_lab(&self) -> bool {
        self.kind.is_lab()
    }
}

// ============================================================================
// 讲师
// ============================================================================

/// 讲师
///
/// `max_daily_periods` 与 `max_weekly_periods` 是软性工作量上限：
/// 引擎在放置时按下限放宽后执行（过紧的上限会让整周不可行，
/// 引擎倾向于给出超限但完整的课表，超限在下游报表中呈现）。
/// `leave_rate` 仅作咨询信息，核心不强制。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    /// 讲师 ID
    pub id: String,
    /// 姓名
    pub name: String,
    /// 可任教的学科 ID 集合
    pub eligible_subject_ids: Vec<String>,
    /// 每周最大节次数（软性上限）
    pub max_weekly_periods: u8,
    /// 每天最大节次数（软性上限）
    pub max_daily_periods: u8,
    /// 偏好的工作日序号集合
    #[serde(default)]
    pub preferred_days: Vec<u8>,
    /// 偏好的时段集合
    #[serde(default)]
    pub preferred_times: Vec<TimePreference>,
    /// 是否避免连续两节授课
    #[serde(default)]
    pub avoid_back_to_back: bool,
    /// 请假率 [0,1]（仅咨询，核心不强制）
    #[serde(default)]
    pub leave_rate: f32,
    /// 偏好的教室 ID 集合
    #[serde(default)]
    pub preferred_room_ids: Vec<String>,
}

impl Instructor {
    /// 创建讲师
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        eligible_subject_ids: Vec<String>,
        max_weekly_periods: u8,
        max_daily_periods: u8,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            eligible_subject_ids,
            max_weekly_periods,
            max_daily_periods,
            preferred_days: Vec::new(),
            preferred_times: Vec::new(),
            avoid_back_to_back: false,
            leave_rate: 0.0,
            preferred_room_ids: Vec::new(),
        }
    }

    /// 是否可任教指定学科
    pub fn is_eligible(&self, subject_id: &str) -> bool {
        self.eligible_subject_ids.iter().any(|id| id == subject_id)
    }

    /// 是否偏好指定工作日
    pub fn prefers_day(&self, day: u8) -> bool {
        self.preferred_days.contains(&day)
    }
}

// ============================================================================
// 教室
// ============================================================================

/// 教室类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    /// 普通教室
    Classroom,
    /// 实验室
    Lab,
    /// 研讨厅
    SeminarHall,
    /// 报告厅
    Auditorium,
}

/// 教室
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// 教室 ID
    pub id: String,
    /// 名称
    pub name: String,
    /// 教室类型
    pub kind: RoomKind,
    /// 容纳人数
    pub capacity: u16,
    /// 设备标签（如 "投影仪"、"示波器"）
    #[serde(default)]
    pub equipment: Vec<String>,
    /// 位置标签（如 "3 号楼"）
    #[serde(default)]
    pub location: String,
}

impl Room {
    /// 创建教室
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: RoomKind,
        capacity: u16,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            capacity,
            equipment: Vec::new(),
            location: String::new(),
        }
    }

    /// 是否具备全部所需设备
    pub fn has_equipment(&self, required: &[String]) -> bool {
        required.iter().all(|tag| self.equipment.contains(tag))
    }

    /// 容量是否满足班级规模
    pub fn fits(&self, cohort_size: u16) -> bool {
        self.capacity >= cohort_size
    }
}

// ============================================================================
// 班级
// ============================================================================

/// 班级
///
/// 固定修读同一课程组的学生群体。`mandatory_subject_ids` 为空时，
/// 引擎回退到完整学科目录作为该班级的必修列表。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cohort {
    /// 班级 ID
    pub id: String,
    /// 显示名称
    pub name: String,
    /// 院系
    pub department: String,
    /// 年级
    pub year: u8,
    /// 班号
    pub section: String,
    /// 班级人数
    pub size: u16,
    /// 必修学科 ID 有序列表
    pub mandatory_subject_ids: Vec<String>,
    /// 每天最大节次数（软性上限）
    pub max_daily_periods: u8,
    /// 特殊需求标签
    #[serde(default)]
    pub special_requirements: Vec<String>,
}

impl Cohort {
    /// 创建班级
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        department: impl Into<String>,
        year: u8,
        section: impl Into<String>,
        size: u16,
        mandatory_subject_ids: Vec<String>,
        max_daily_periods: u8,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            department: department.into(),
            year,
            section: section.into(),
            size,
            mandatory_subject_ids,
            max_daily_periods,
            special_requirements: Vec::new(),
        }
    }
}

// ============================================================================
// 目录
// ============================================================================

/// 输入目录
///
/// 一次引擎调用的全部静态输入。目录对引擎是不可变的：
/// 引擎只读取目录，规范化等调整都发生在内部副本上。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// 校历
    pub institution: Institution,
    /// 学科列表
    pub subjects: Vec<Subject>,
    /// 讲师列表
    pub instructors: Vec<Instructor>,
    /// 教室列表
    pub rooms: Vec<Room>,
    /// 班级列表
    pub cohorts: Vec<Cohort>,
}

impl Catalog {
    /// 创建目录
    pub fn new(
        institution: Institution,
        subjects: Vec<Subject>,
        instructors: Vec<Instructor>,
        rooms: Vec<Room>,
        cohorts: Vec<Cohort>,
    ) -> Self {
        Self {
            institution,
            subjects,
            instructors,
            rooms,
            cohorts,
        }
    }

    /// 按 ID 查找学科
    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    /// 按 ID 查找讲师
    pub fn instructor(&self, id: &str) -> Option<&Instructor> {
        self.instructors.iter().find(|i| i.id == id)
    }

    /// 按 ID 查找教室
    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// 按 ID 查找班级
    pub fn cohort(&self, id: &str) -> Option<&Cohort> {
        self.cohorts.iter().find(|c| c.id == id)
    }
}
