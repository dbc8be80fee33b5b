//! Run one battle on the session runtime and stream its events.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use battle_core::{Army, BattleEvent, DeployError, Point, VillageLayout};
use battle_runtime::{
    AttackerId, InMemoryResultSink, JsonLinesResultSink, ResultSink, RuntimeConfig, RuntimeError,
    SessionManager, StaticVillageOracle, VillageId, Viewer,
};

use super::{OutputFormat, describe};
use crate::army;

const SAMPLE_VILLAGE: &str = include_str!("../../assets/sample_village.json");
const VILLAGE: VillageId = VillageId(1);
const ATTACKER: AttackerId = AttackerId(1);

/// Run one battle and print its events
#[derive(Parser)]
pub struct Simulate {
    /// Village layout JSON (defaults to the bundled sample base)
    #[arg(short, long, value_name = "PATH")]
    village: Option<PathBuf>,

    /// Troops to bring, as KIND=COUNT pairs
    #[arg(
        short,
        long,
        value_name = "ROSTER",
        default_value = "barbarian=10,archer=5,giant=2,wall_breaker=2",
        value_parser = army::parse_army
    )]
    army: Army,

    /// Deployment point; repeat to spread troops over several points
    #[arg(
        short = 'd',
        long = "deploy-at",
        value_name = "X,Y",
        default_value = "1.5,20.5",
        value_parser = army::parse_point
    )]
    deploy_at: Vec<Point>,

    /// Real milliseconds between ticks (defaults to BATTLE_TICK_MS or 100)
    #[arg(long, value_name = "MS", conflicts_with = "fast")]
    tick_ms: Option<u64>,

    /// Tick as fast as the runtime allows
    #[arg(long)]
    fast: bool,

    /// Append the result to this JSON-lines log
    #[arg(short, long, value_name = "PATH")]
    results: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

impl Simulate {
    pub async fn execute(self) -> Result<()> {
        let layout = self.load_layout()?;

        let mut config = RuntimeConfig::from_env();
        if self.fast {
            config = config.with_tick_interval(Duration::from_millis(1));
        } else if let Some(ms) = self.tick_ms {
            config = config.with_tick_interval(Duration::from_millis(ms.max(1)));
        }

        let sink: Arc<dyn ResultSink> = match &self.results {
            Some(path) => Arc::new(
                JsonLinesResultSink::new(path)
                    .with_context(|| format!("opening result log {}", path.display()))?,
            ),
            None => Arc::new(InMemoryResultSink::new()),
        };
        let villages = StaticVillageOracle::new().with_village(VILLAGE, layout);
        let manager = SessionManager::new(config, Arc::new(villages), sink);

        let handle = manager
            .create_battle(ATTACKER, VILLAGE, self.army.clone())
            .await?;
        let mut feed = manager
            .join_battle(handle.battle_id(), VILLAGE, Viewer::Attacker)
            .await?;

        let format = self.format;
        let printer = tokio::spawn(async move {
            let mut result = None;
            while let Some(envelope) = feed.recv().await {
                if format == OutputFormat::Json {
                    println!("{}", serde_json::to_string(&envelope)?);
                }
                if let BattleEvent::BattleEnd(end) = envelope.event {
                    result = Some(end);
                }
            }
            anyhow::Ok(result)
        });

        for (kind, position) in army::deployment_plan(&self.army, &self.deploy_at) {
            match handle.deploy_troop(kind, position).await {
                Ok(troop) => tracing::debug!(%troop, %kind, %position, "deployed"),
                Err(RuntimeError::Deploy(err)) if err != DeployError::BattleEnded => {
                    tracing::warn!("skipping {kind} at {position}: {err}");
                }
                Err(err) => {
                    tracing::warn!("battle ended before every troop was deployed: {err}");
                    break;
                }
            }
        }

        let result = printer
            .await??
            .context("battle stream closed without a result")?;

        match self.format {
            OutputFormat::Summary => println!("{}", describe(&handle.battle_id().to_string(), &result)),
            OutputFormat::Json => tracing::info!(
                battle = %handle.battle_id(),
                outcome = %result.outcome,
                stars = result.stars,
                destruction = result.destruction_percentage,
                "battle finished"
            ),
        }

        manager.shutdown().await?;
        Ok(())
    }

    fn load_layout(&self) -> Result<VillageLayout> {
        match &self.village {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading village {}", path.display()))?;
                VillageLayout::from_json(&json)
                    .with_context(|| format!("parsing village {}", path.display()))
            }
            None => VillageLayout::from_json(SAMPLE_VILLAGE).context("parsing bundled sample village"),
        }
    }
}
