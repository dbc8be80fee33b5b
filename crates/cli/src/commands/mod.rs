mod results;
mod simulate;

pub use results::Results;
pub use simulate::Simulate;

use battle_core::BattleResult;

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per line
    Json,
    /// Human-readable summary
    Summary,
}

/// Multi-line human summary of one battle.
pub fn describe(label: &str, result: &BattleResult) -> String {
    let mut text = format!(
        "{label}: {}\n  destruction {}%  stars {}\n  loot {} gold / {} elixir\n  duration {:.1}s",
        result.outcome,
        result.destruction_percentage,
        result.stars,
        result.loot_gold,
        result.loot_elixir,
        result.duration_ms as f64 / 1000.0,
    );
    if let Some(error) = &result.error {
        text.push_str(&format!("\n  error: {error}"));
    }
    text
}
