/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Simulation ticks per second. Catalogue durations are authored in
    /// milliseconds and converted with [`GameConfig::ticks`].
    pub tick_rate: u32,

    /// Radius scanned for a pre-existing debuff marker when an ability
    /// declares a conditional cooldown refund without its own radius.
    pub refund_scan_radius: f32,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    pub const ABILITY_SLOTS: usize = 4;
    pub const MAX_ACTIVE_EFFECTS: usize = 24;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_TICK_RATE: u32 = 30;
    pub const DEFAULT_REFUND_SCAN_RADIUS: f32 = 600.0;

    pub fn new() -> Self {
        Self {
            tick_rate: Self::DEFAULT_TICK_RATE,
            refund_scan_radius: Self::DEFAULT_REFUND_SCAN_RADIUS,
        }
    }

    pub fn with_tick_rate(tick_rate: u32) -> Self {
        Self {
            tick_rate,
            ..Self::new()
        }
    }

    /// Converts a millisecond duration into whole ticks, rounding up so that a
    /// non-zero duration always lasts at least one tick.
    pub fn ticks(&self, millis: u32) -> u64 {
        let rate = u64::from(self.tick_rate.max(1));
        (u64::from(millis) * rate).div_ceil(1000)
    }

    /// Length of one tick in seconds.
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Converts a per-second rate (speed, regeneration) into a per-tick amount.
    pub fn per_tick(&self, per_second: f32) -> f32 {
        per_second * self.tick_seconds()
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_round_up_to_whole_ticks() {
        let config = GameConfig::with_tick_rate(30);
        assert_eq!(config.ticks(0), 0);
        assert_eq!(config.ticks(1), 1);
        assert_eq!(config.ticks(1000), 30);
        assert_eq!(config.ticks(10_000), 300);
        assert_eq!(config.ticks(3_000), 90);
    }
}
