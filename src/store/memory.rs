//! In-memory store implementations.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{EngineError, EngineResult};
use crate::models::{DrawbackRecord, DrawbackStatus, EScrip, RodtepRecord, RodtepStatus};

use super::{ClaimStore, ScripStore};

fn poisoned(name: &str) -> EngineError {
    EngineError::Store {
        message: format!("{} lock poisoned", name),
    }
}

fn duplicate(claim_id: &str) -> EngineError {
    EngineError::DuplicateClaim {
        claim_id: claim_id.to_string(),
    }
}

/// A [`ClaimStore`] backed by ordered maps behind read-write locks.
#[derive(Debug, Default)]
pub struct InMemoryClaimStore {
    drawback: RwLock<BTreeMap<String, DrawbackRecord>>,
    rodtep: RwLock<BTreeMap<String, RodtepRecord>>,
}

impl InMemoryClaimStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClaimStore for InMemoryClaimStore {
    fn save_drawback(&self, record: DrawbackRecord) -> EngineResult<()> {
        let mut claims = self.drawback.write().map_err(|_| poisoned("drawback"))?;
        let id = &record.claim.claim_id;
        if let Some(existing) = claims.get(id) {
            if existing.claim.status == DrawbackStatus::Approved {
                return Err(duplicate(id));
            }
        }
        claims.insert(record.claim.claim_id.clone(), record);
        Ok(())
    }

    fn get_drawback(&self, claim_id: &str) -> EngineResult<Option<DrawbackRecord>> {
        let claims = self.drawback.read().map_err(|_| poisoned("drawback"))?;
        Ok(claims.get(claim_id).cloned())
    }

    fn list_drawback(&self, status: Option<DrawbackStatus>) -> EngineResult<Vec<DrawbackRecord>> {
        let claims = self.drawback.read().map_err(|_| poisoned("drawback"))?;
        Ok(claims
            .values()
            .filter(|record| status.is_none_or(|s| record.claim.status == s))
            .cloned()
            .collect())
    }

    fn save_rodtep(&self, record: RodtepRecord) -> EngineResult<()> {
        let mut claims = self.rodtep.write().map_err(|_| poisoned("rodtep"))?;
        let id = &record.claim.claim_id;
        if let Some(existing) = claims.get(id) {
            if existing.claim.status == RodtepStatus::Approved {
                return Err(duplicate(id));
            }
        }
        claims.insert(record.claim.claim_id.clone(), record);
        Ok(())
    }

    fn get_rodtep(&self, claim_id: &str) -> EngineResult<Option<RodtepRecord>> {
        let claims = self.rodtep.read().map_err(|_| poisoned("rodtep"))?;
        Ok(claims.get(claim_id).cloned())
    }

    fn list_rodtep(&self, status: Option<RodtepStatus>) -> EngineResult<Vec<RodtepRecord>> {
        let claims = self.rodtep.read().map_err(|_| poisoned("rodtep"))?;
        Ok(claims
            .values()
            .filter(|record| status.is_none_or(|s| record.claim.status == s))
            .cloned()
            .collect())
    }
}

/// A [`ScripStore`] keyed by claim reference.
#[derive(Debug, Default)]
pub struct InMemoryScripStore {
    scrips: RwLock<BTreeMap<String, EScrip>>,
}

impl InMemoryScripStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScripStore for InMemoryScripStore {
    fn find_by_claim(&self, claim_ref: &str) -> EngineResult<Option<EScrip>> {
        let scrips = self.scrips.read().map_err(|_| poisoned("scrip"))?;
        Ok(scrips.get(claim_ref).cloned())
    }

    fn insert_if_absent(&self, scrip: EScrip) -> EngineResult<EScrip> {
        let mut scrips = self.scrips.write().map_err(|_| poisoned("scrip"))?;
        let stored = scrips.entry(scrip.claim_ref.clone()).or_insert(scrip);
        Ok(stored.clone())
    }
}
