// ============================================================================
// 随机化模块
// ============================================================================
// 本模块提供排课搜索使用的随机源与种子混合。
//
// 设计要点：
// 1. 搜索内部只使用显式状态的线性同余生成器（LCG），状态作为
//    参数显式传递：同一种子 + 同一输入必然产出同一课表，
//    确定性可以直接用测试验证。
// 2. 种子本身由三部分混合：墙钟毫秒、一次均匀熵抽取（rand crate）、
//    优化选项的确定性摘要。调用方可通过 `random_seed` 固定种子。
// 3. 每次尝试额外抽取一份"尝试画像"（起始节次偏移、是否偏好
//    靠前槽位、是否打乱槽位顺序、时段放宽档位），让不同种子
//    在可观察的布局上产生差异。
// ============================================================================

use chrono::Utc;

use crate::algorithm::types::OptimizationSettings;

/// LCG 乘数（Park-Miller 最小标准生成器）
const LCG_MULTIPLIER: u64 = 16807;

/// LCG 模数：2^31 - 1
const LCG_MODULUS: u64 = 2_147_483_647;

// ============================================================================
// 线性同余生成器
// ============================================================================

/// 显式状态的线性同余生成器
///
/// `state_{n+1} = state_n * 16807 mod (2^31 - 1)`。状态永远落在
/// `[1, 2^31 - 2]` 区间内；零种子会被归一为 1，避免退化序列。
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// 以给定种子创建生成器
    pub fn new(seed: u32) -> Self {
        let mut state = seed as u64 % LCG_MODULUS;
        if state == 0 {
            state = 1;
        }
        Self { state }
    }

    /// 产生下一个伪随机数（区间 [1, 2^31 - 2]）
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state * LCG_MULTIPLIER % LCG_MODULUS;
        self.state as u32
    }

    /// 产生 [0, 1) 区间的伪随机小数
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / LCG_MODULUS as f64
    }

    /// 产生 [0, bound) 区间的伪随机下标
    ///
    /// # 参数
    /// - `bound`: 上界，必须大于 0
    pub fn next_index(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0, "上界必须大于 0");
        self.next_u32() as usize % bound
    }

    /// 产生伪随机布尔值
    pub fn next_bool(&mut self) -> bool {
        self.next_u32() & 1 == 1
    }

    /// Fisher-Yates 原地洗牌
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        if items.len() < 2 {
            return;
        }
        for i in (1..items.len()).rev() {
            let j = self.next_index(i + 1);
            items.swap(i, j);
        }
    }
}

// ============================================================================
// 种子混合
// ============================================================================

/// 混合产生一次生成调用的种子
///
/// 三路混合：墙钟毫秒、一次均匀熵抽取、优化选项的确定性摘要。
/// `settings.random_seed` 存在时直接使用，作为确定性测试钩子。
pub fn mix_seed(settings: &OptimizationSettings) -> u32 {
    if let Some(seed) = settings.random_seed {
        return seed;
    }

    let clock = Utc::now().timestamp_millis() as u64;
    let entropy: u32 = rand::random();
    let digest = settings_digest(settings);

    let mixed = (clock as u32)
        ^ (clock >> 32) as u32
        ^ entropy.rotate_left(13)
        ^ digest.wrapping_mul(2_654_435_761);

    // 归入 LCG 的有效状态区间
    let seed = mixed % (LCG_MODULUS as u32 - 1) + 1;
    seed
}

/// 优化选项的确定性摘要
///
/// 将权重、迭代上限与规避模式折叠为一个 u32，保证相同选项
/// 对种子的贡献相同。
fn settings_digest(settings: &OptimizationSettings) -> u32 {
    let mut digest: u32 = 17;

    let weights = [
        settings.priority_weights.instructor_load,
        settings.priority_weights.room_utilization,
        settings.priority_weights.student_schedule,
        settings.priority_weights.constraints,
    ];
    for weight in weights {
        let scaled = (weight.clamp(0.0, 1.0) * 1000.0) as u32;
        digest = digest.wrapping_mul(31).wrapping_add(scaled);
    }

    digest = digest.wrapping_mul(31).wrapping_add(settings.max_iterations);
    digest = digest
        .wrapping_mul(31)
        .wrapping_add(settings.time_limit_seconds);

    for pattern in &settings.avoided_patterns {
        let folded = (pattern.day as u32) << 8 | pattern.period as u32;
        digest = digest.wrapping_mul(31).wrapping_add(folded);
    }

    digest
}

// ============================================================================
// 尝试画像
// ============================================================================

/// 尝试画像
///
/// 一次放置尝试的随机化参数，开始尝试时从 LCG 抽取：
/// - `start_period_offset`: 槽位扫描的起始节次偏移，[1, 4]
/// - `prefer_earlier_slots`: 是否偏好一天中靠前的槽位
/// - `randomize_slot_selection`: 是否打乱候选槽位顺序
/// - `time_flexibility`: 时段偏好的放宽档位，{0, 1, 2}
#[derive(Debug, Clone, Copy)]
pub struct AttemptProfile {
    /// 槽位扫描的起始节次偏移（1-4）
    pub start_period_offset: u8,
    /// 是否偏好靠前槽位
    pub prefer_earlier_slots: bool,
    /// 是否打乱候选槽位顺序
    pub randomize_slot_selection: bool,
    /// 时段偏好放宽档位（0 严格，每档放宽 60 分钟）
    pub time_flexibility: u8,
}

impl AttemptProfile {
    /// 从生成器抽取一份尝试画像
    pub fn draw(rng: &mut Lcg) -> Self {
        Self {
            start_period_offset: (rng.next_index(4) + 1) as u8,
            prefer_earlier_slots: rng.next_bool(),
            randomize_slot_selection: rng.next_bool(),
            time_flexibility: rng.next_index(3) as u8,
        }
    }

    /// 时段偏好分桶边界的放宽量（分钟）
    pub fn flex_minutes(&self) -> u16 {
        self.time_flexibility as u16 * 60
    }
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Lcg::new(42);
        let mut b = Lcg::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = Lcg::new(1);
        let mut b = Lcg::new(2);
        let seq_a: Vec<u32> = (0..10).map(|_| a.next_u32()).collect();
        let seq_b: Vec<u32> = (0..10).map(|_| b.next_u32()).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn test_zero_seed_normalized() {
        let mut rng = Lcg::new(0);
        // 零种子归一为 1，序列仍然前进
        assert_eq!(rng.next_u32(), 16807);
    }

    #[test]
    fn test_values_stay_in_range() {
        let mut rng = Lcg::new(12345);
        for _ in 0..1000 {
            let value = rng.next_u32() as u64;
            assert!(value >= 1 && value < LCG_MODULUS);
        }
    }

    #[test]
    fn test_next_index_bounded() {
        let mut rng = Lcg::new(7);
        for _ in 0..1000 {
            assert!(rng.next_index(5) < 5);
        }
    }

    #[test]
    fn test_shuffle_preserves_elements() {
        let mut rng = Lcg::new(99);
        let mut items: Vec<u32> = (0..20).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<u32>>());
    }

    #[test]
    fn test_shuffle_deterministic_given_seed() {
        let mut a = Lcg::new(5);
        let mut b = Lcg::new(5);
        let mut items_a: Vec<u32> = (0..10).collect();
        let mut items_b: Vec<u32> = (0..10).collect();
        a.shuffle(&mut items_a);
        b.shuffle(&mut items_b);
        assert_eq!(items_a, items_b);
    }

    #[test]
    fn test_fixed_seed_overrides_mixing() {
        let settings = OptimizationSettings {
            random_seed: Some(4242),
            ..Default::default()
        };
        assert_eq!(mix_seed(&settings), 4242);
        assert_eq!(mix_seed(&settings), 4242);
    }

    #[test]
    fn test_attempt_profile_ranges() {
        let mut rng = Lcg::new(31337);
        for _ in 0..100 {
            let profile = AttemptProfile::draw(&mut rng);
            assert!((1..=4).contains(&profile.start_period_offset));
            assert!(profile.time_flexibility <= 2);
        }
    }
}
