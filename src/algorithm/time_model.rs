// ============================================================================
// 时间网格模块
// ============================================================================
// 本模块将校历转换为规范的时间槽位网格，并回答毗邻查询。
//
// 毗邻（adjacency）是连堂与实验块的基础关系：两个槽位毗邻，
// 当且仅当同一工作日、节次号连续、前一节的结束时刻等于后一节的
// 开始时刻、且没有课间休息覆盖衔接点。节次号看似连续但中间隔着
// 午休的两节课（如第 3 节结束 11:00，第 4 节开始 11:20）不毗邻，
// 实验块不允许跨越这样的断点。
//
// 休息区间对所有工作日统一生效，因此毗邻表只需按节次计算一次。
// ============================================================================

use tracing::debug;

use crate::algorithm::types::TimeSlot;
use crate::models::Institution;

/// 时间网格
///
/// 校历的规范化形式：按 (工作日, 节次) 排序的全部槽位，
/// 以及预先计算好的节次毗邻表。
#[derive(Debug, Clone)]
pub struct TimeGrid {
    /// 工作日数量
    day_count: u8,
    /// 每天节次数
    periods_per_day: u8,
    /// 全部槽位，按工作日序号、节次号升序
    slots: Vec<TimeSlot>,
    /// 毗邻表：`adjacent_after[p-1]` 表示第 p 节与第 p+1 节毗邻
    adjacent_after: Vec<bool>,
}

impl TimeGrid {
    /// 从校历构建时间网格
    ///
    /// # 参数
    /// - `institution`: 校历（工作日、节次时刻、休息区间）
    ///
    /// # 返回
    /// 校历非法（无工作日、无节次、节次号不稠密、起止时刻颠倒）时
    /// 返回描述错误的字符串
    pub fn from_institution(institution: &Institution) -> Result<Self, String> {
        if institution.working_days.is_empty() {
            return Err("校历没有配置工作日".to_string());
        }
        if institution.periods.is_empty() {
            return Err("校历没有配置节次时刻".to_string());
        }

        // 节次号必须从 1 起稠密连续
        for (index, timing) in institution.periods.iter().enumerate() {
            let expected = (index + 1) as u8;
            if timing.period != expected {
                return Err(format!(
                    "节次号必须从 1 起稠密连续：位置 {} 处期望第 {} 节，实际第 {} 节",
                    index, expected, timing.period
                ));
            }
            if timing.start_minutes >= timing.end_minutes {
                return Err(format!(
                    "第 {} 节的开始时刻 {} 不早于结束时刻 {}",
                    timing.period, timing.start_minutes, timing.end_minutes
                ));
            }
        }

        let day_count = institution.working_days.len() as u8;
        let periods_per_day = institution.periods.len() as u8;

        // 计算毗邻表：首尾相接且无休息覆盖衔接点
        let mut adjacent_after = Vec::with_capacity(institution.periods.len().saturating_sub(1));
        for pair in institution.periods.windows(2) {
            let (first, second) = (&pair[0], &pair[1]);
            let seamless = first.end_minutes == second.start_minutes;
            let transition = first.end_minutes;
            let break_covers = institution.breaks.iter().any(|b| {
                b.start_minutes < b.end_minutes
                    && b.start_minutes <= transition
                    && transition < b.end_minutes
            });
            adjacent_after.push(seamless && !break_covers);
        }

        // 展开全部槽位，按工作日、节次升序
        let mut slots = Vec::with_capacity(day_count as usize * periods_per_day as usize);
        for day in 0..day_count {
            for timing in &institution.periods {
                slots.push(TimeSlot::new(
                    day,
                    timing.period,
                    timing.start_minutes,
                    timing.end_minutes,
                ));
            }
        }

        debug!(
            day_count,
            periods_per_day,
            slot_count = slots.len(),
            "时间网格构建完成"
        );

        Ok(Self {
            day_count,
            periods_per_day,
            slots,
            adjacent_after,
        })
    }

    /// 工作日数量
    pub fn day_count(&self) -> u8 {
        self.day_count
    }

    /// 每天节次数
    pub fn periods_per_day(&self) -> u8 {
        self.periods_per_day
    }

    /// 全部槽位，按工作日序号、节次号升序
    pub fn time_slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// 按 (工作日, 节次) 取槽位
    pub fn slot(&self, day: u8, period: u8) -> Option<TimeSlot> {
        if day >= self.day_count || period == 0 || period > self.periods_per_day {
            return None;
        }
        let index = day as usize * self.periods_per_day as usize + (period - 1) as usize;
        self.slots.get(index).copied()
    }

    /// 判断两个槽位是否毗邻
    ///
    /// 毗邻当且仅当：同一工作日、`b.period == a.period + 1`、
    /// `b.start == a.end`、且没有休息区间覆盖衔接点。
    pub fn is_adjacent(&self, a: &TimeSlot, b: &TimeSlot) -> bool {
        if a.day != b.day || b.period != a.period + 1 {
            return false;
        }
        if a.end_minutes != b.start_minutes {
            return false;
        }
        self.adjacent_after
            .get((a.period - 1) as usize)
            .copied()
            .unwrap_or(false)
    }

    /// 判断从 `start_period` 起的 `length` 个连续节次能否构成完整块
    ///
    /// 成立当且仅当这些节次都存在于当天，且两两依次毗邻。
    pub fn is_block_feasible(&self, day: u8, start_period: u8, length: u8) -> bool {
        if day >= self.day_count || start_period == 0 || length == 0 {
            return false;
        }
        let last = start_period as u16 + length as u16 - 1;
        if last > self.periods_per_day as u16 {
            return false;
        }
        (start_period..start_period + length - 1)
            .all(|p| self.adjacent_after.get((p - 1) as usize).copied().unwrap_or(false))
    }

    /// 枚举一天内的极大毗邻段
    ///
    /// 返回 (起始节次, 长度) 列表。休息区间把一天切成若干段，
    /// 每段内部两两毗邻、不可再向两侧扩展。所有工作日共享同一
    /// 份毗邻表，因此结果与具体工作日无关。
    pub fn maximal_runs(&self) -> Vec<(u8, u8)> {
        let mut runs = Vec::new();
        let mut start = 1u8;
        let mut length = 1u8;

        for period in 1..self.periods_per_day {
            if self.adjacent_after[(period - 1) as usize] {
                length += 1;
            } else {
                runs.push((start, length));
                start = period + 1;
                length = 1;
            }
        }
        runs.push((start, length));
        runs
    }
}

// ============================================================================
// 单元测试
// ============================================================================
