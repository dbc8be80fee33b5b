use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use battle_runtime::{BattleRecord, JsonLinesResultSink};

use super::{OutputFormat, describe};

/// Summarize a JSON-lines result log
#[derive(Parser)]
pub struct Results {
    /// Log written by `simulate --results`
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

impl Results {
    pub fn execute(self) -> Result<()> {
        let records = JsonLinesResultSink::load(&self.path)
            .with_context(|| format!("reading result log {}", self.path.display()))?;

        if records.is_empty() {
            println!("No battles recorded in {}", self.path.display());
            return Ok(());
        }

        match self.format {
            OutputFormat::Json => {
                for record in &records {
                    println!("{}", serde_json::to_string(record)?);
                }
            }
            OutputFormat::Summary => {
                for record in &records {
                    let label = format!("{} ({} vs {})", record.battle_id, record.attacker, record.village_id);
                    println!("{}", describe(&label, &record.result));
                }
                println!("\n{}", Totals::from_records(&records));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Totals {
    battles: usize,
    stars: u64,
    average_destruction: u64,
    loot_gold: u64,
    loot_elixir: u64,
}

impl Totals {
    fn from_records(records: &[BattleRecord]) -> Self {
        let mut totals = records.iter().fold(Self::default(), |mut totals, record| {
            totals.battles += 1;
            totals.stars += u64::from(record.result.stars);
            totals.average_destruction += u64::from(record.result.destruction_percentage);
            totals.loot_gold += record.result.loot_gold;
            totals.loot_elixir += record.result.loot_elixir;
            totals
        });
        if totals.battles > 0 {
            totals.average_destruction /= totals.battles as u64;
        }
        totals
    }
}

impl std::fmt::Display for Totals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} battles, {} stars, {}% average destruction, {} gold / {} elixir looted",
            self.battles, self.stars, self.average_destruction, self.loot_gold, self.loot_elixir
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{BattleOutcome, BattleResult};
    use battle_runtime::{AttackerId, BattleId, ResultSink, VillageId};

    fn record(id: u64, destruction: u8, stars: u8, gold: u64) -> BattleRecord {
        BattleRecord {
            battle_id: BattleId(id),
            village_id: VillageId(1),
            attacker: AttackerId(1),
            result: BattleResult {
                destruction_percentage: destruction,
                stars,
                loot_gold: gold,
                loot_elixir: 10,
                duration_ms: 60_000,
                outcome: BattleOutcome::TimeUp,
                error: None,
            },
        }
    }

    #[tokio::test]
    async fn totals_aggregate_a_written_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");
        let sink = JsonLinesResultSink::new(&path).unwrap();
        sink.record(&record(1, 100, 3, 900)).await.unwrap();
        sink.record(&record(2, 45, 0, 100)).await.unwrap();

        let records = JsonLinesResultSink::load(&path).unwrap();
        let totals = Totals::from_records(&records);
        assert_eq!(
            totals,
            Totals {
                battles: 2,
                stars: 3,
                average_destruction: 72,
                loot_gold: 1000,
                loot_elixir: 20,
            }
        );
        assert_eq!(
            totals.to_string(),
            "2 battles, 3 stars, 72% average destruction, 1000 gold / 20 elixir looted"
        );
    }

    #[test]
    fn empty_log_has_zero_totals() {
        assert_eq!(Totals::from_records(&[]), Totals::default());
    }
}
