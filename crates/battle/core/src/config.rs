/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleConfig {
    /// Simulated milliseconds advanced by one tick.
    pub step_ms: u32,
    /// Simulated battle length after which the attack ends as time-up.
    pub max_duration_ms: u64,
    /// Destruction percentage that earns the first star.
    pub one_star_percentage: u8,
}

impl BattleConfig {
    // ===== fixed battlefield dimensions =====
    pub const GRID_WIDTH: i32 = 80;
    pub const GRID_HEIGHT: i32 = 40;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_STEP_MS: u32 = 100;
    pub const DEFAULT_MAX_DURATION_MS: u64 = 180_000;
    pub const DEFAULT_ONE_STAR_PERCENTAGE: u8 = 50;

    pub fn new() -> Self {
        Self {
            step_ms: Self::DEFAULT_STEP_MS,
            max_duration_ms: Self::DEFAULT_MAX_DURATION_MS,
            one_star_percentage: Self::DEFAULT_ONE_STAR_PERCENTAGE,
        }
    }

    #[must_use]
    pub fn with_step_ms(mut self, step_ms: u32) -> Self {
        self.step_ms = step_ms.max(1);
        self
    }

    #[must_use]
    pub fn with_max_duration_ms(mut self, max_duration_ms: u64) -> Self {
        self.max_duration_ms = max_duration_ms;
        self
    }

    /// Seconds advanced per tick, used for movement budgets.
    pub fn step_secs(&self) -> f32 {
        self.step_ms as f32 / 1000.0
    }

    pub const fn in_bounds(x: i32, y: i32) -> bool {
        x >= 0 && x < Self::GRID_WIDTH && y >= 0 && y < Self::GRID_HEIGHT
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
