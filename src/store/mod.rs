//! Persistence seams for claims and e-scrips.
//!
//! The processor only talks to these traits, so a database-backed store can
//! replace the in-memory one without touching the calculators.

mod memory;

pub use memory::{InMemoryClaimStore, InMemoryScripStore};

use crate::error::EngineResult;
use crate::models::{DrawbackRecord, DrawbackStatus, EScrip, RodtepRecord, RodtepStatus};

/// Stores drawback and RoDTEP claim records keyed by claim id.
pub trait ClaimStore: Send + Sync {
    /// Inserts or replaces a drawback record.
    ///
    /// Fails with `DuplicateClaim` if the stored record for the same claim
    /// id is approved. The check and the write happen atomically.
    fn save_drawback(&self, record: DrawbackRecord) -> EngineResult<()>;

    /// Returns the drawback record for `claim_id`, if any.
    fn get_drawback(&self, claim_id: &str) -> EngineResult<Option<DrawbackRecord>>;

    /// Lists drawback records ordered by claim id, optionally by status.
    fn list_drawback(&self, status: Option<DrawbackStatus>) -> EngineResult<Vec<DrawbackRecord>>;

    /// Inserts or replaces a RoDTEP record.
    ///
    /// Fails with `DuplicateClaim` if the stored record for the same claim
    /// id is approved. The check and the write happen atomically.
    fn save_rodtep(&self, record: RodtepRecord) -> EngineResult<()>;

    /// Returns the RoDTEP record for `claim_id`, if any.
    fn get_rodtep(&self, claim_id: &str) -> EngineResult<Option<RodtepRecord>>;

    /// Lists RoDTEP records ordered by claim id, optionally by status.
    fn list_rodtep(&self, status: Option<RodtepStatus>) -> EngineResult<Vec<RodtepRecord>>;
}

/// Stores issued e-scrips, at most one per claim reference.
pub trait ScripStore: Send + Sync {
    /// Returns the scrip issued for `claim_ref`, if any.
    fn find_by_claim(&self, claim_ref: &str) -> EngineResult<Option<EScrip>>;

    /// Stores `scrip` unless one already exists for its claim reference.
    ///
    /// Returns whichever scrip is stored after the call. The check and the
    /// insert happen atomically.
    fn insert_if_absent(&self, scrip: EScrip) -> EngineResult<EScrip>;
}
