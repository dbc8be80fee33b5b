//! Runtime configuration with environment overrides.
use std::str::FromStr;
use std::time::Duration;

use battle_core::BattleConfig;

/// Slack added on top of the simulated duration before the wall-clock cap fires.
const WALL_CLOCK_SLACK: Duration = Duration::from_secs(10);

/// Runtime configuration
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Real time between two ticks of a session loop.
    pub tick_interval: Duration,
    /// Rules configuration handed to every new battle.
    pub battle: BattleConfig,
    /// Hard wall-clock limit per session, counted from creation.
    pub max_wall_clock: Duration,
    /// How long a session waits for a deployment after the attacker leaves.
    pub disconnect_grace: Duration,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let battle = BattleConfig::default();
        Self {
            tick_interval: Duration::from_millis(u64::from(battle.step_ms)),
            max_wall_clock: Duration::from_millis(battle.max_duration_ms) + WALL_CLOCK_SLACK,
            battle,
            disconnect_grace: Duration::from_secs(30),
            event_buffer_size: 256,
            command_buffer_size: 32,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `BATTLE_*` environment variables.
    ///
    /// Unparsable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(ms) = parse::<u64>(lookup("BATTLE_TICK_MS")) {
            config.tick_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(ms) = parse::<u32>(lookup("BATTLE_STEP_MS")) {
            config.battle = config.battle.with_step_ms(ms);
        }
        if let Some(secs) = parse::<u64>(lookup("BATTLE_MAX_DURATION_SECS")) {
            config.battle = config.battle.with_max_duration_ms(secs.saturating_mul(1000));
            config.max_wall_clock = Duration::from_secs(secs) + WALL_CLOCK_SLACK;
        }
        if let Some(secs) = parse::<u64>(lookup("BATTLE_DISCONNECT_GRACE_SECS")) {
            config.disconnect_grace = Duration::from_secs(secs);
        }
        if let Some(size) = parse::<usize>(lookup("BATTLE_EVENT_BUFFER")) {
            config.event_buffer_size = size.max(1);
        }
        if let Some(size) = parse::<usize>(lookup("BATTLE_COMMAND_BUFFER")) {
            config.command_buffer_size = size.max(1);
        }
        config
    }

    #[must_use]
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    #[must_use]
    pub fn with_battle(mut self, battle: BattleConfig) -> Self {
        self.battle = battle;
        self
    }

    #[must_use]
    pub fn with_max_wall_clock(mut self, max_wall_clock: Duration) -> Self {
        self.max_wall_clock = max_wall_clock;
        self
    }

    #[must_use]
    pub fn with_disconnect_grace(mut self, disconnect_grace: Duration) -> Self {
        self.disconnect_grace = disconnect_grace;
        self
    }
}

fn parse<T: FromStr>(value: Option<String>) -> Option<T> {
    value?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> RuntimeConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RuntimeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_battle_rules() {
        let config = RuntimeConfig::default();
        assert_eq!(config.tick_interval, Duration::from_millis(100));
        assert_eq!(config.max_wall_clock, Duration::from_secs(190));
        assert_eq!(config.disconnect_grace, Duration::from_secs(30));
        assert_eq!(config.event_buffer_size, 256);
        assert_eq!(config.command_buffer_size, 32);
    }

    #[test]
    fn environment_overrides_apply() {
        let config = config_from(&[
            ("BATTLE_TICK_MS", "250"),
            ("BATTLE_STEP_MS", "50"),
            ("BATTLE_MAX_DURATION_SECS", "60"),
            ("BATTLE_DISCONNECT_GRACE_SECS", "5"),
            ("BATTLE_EVENT_BUFFER", "1024"),
        ]);
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(config.battle.step_ms, 50);
        assert_eq!(config.battle.max_duration_ms, 60_000);
        assert_eq!(config.max_wall_clock, Duration::from_secs(70));
        assert_eq!(config.disconnect_grace, Duration::from_secs(5));
        assert_eq!(config.event_buffer_size, 1024);
        assert_eq!(config.command_buffer_size, 32);
    }

    #[test]
    fn garbage_values_are_ignored() {
        let config = config_from(&[("BATTLE_TICK_MS", "fast"), ("BATTLE_COMMAND_BUFFER", "-3")]);
        assert_eq!(config.tick_interval, Duration::from_millis(100));
        assert_eq!(config.command_buffer_size, 32);
    }
}
