//! In-memory ResultSink for tests and local runs.

use std::sync::RwLock;

use async_trait::async_trait;

use super::{BattleRecord, RepositoryError, Result, ResultSink};
use crate::types::BattleId;

/// Keeps every record in insertion order.
#[derive(Default)]
pub struct InMemoryResultSink {
    records: RwLock<Vec<BattleRecord>>,
}

impl InMemoryResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Result<Vec<BattleRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records.clone())
    }

    pub fn find(&self, battle_id: BattleId) -> Result<Option<BattleRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records
            .iter()
            .find(|record| record.battle_id == battle_id)
            .cloned())
    }
}

#[async_trait]
impl ResultSink for InMemoryResultSink {
    async fn record(&self, record: &BattleRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        records.push(record.clone());
        Ok(())
    }
}
