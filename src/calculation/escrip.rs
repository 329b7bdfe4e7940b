//! e-Scrip issuance for approved RoDTEP claims.

use chrono::{DateTime, Duration, Utc};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    CalculationStatus, EScrip, ExportReference, RodtepCalculation, RodtepClaim, ScripStatus,
};
use crate::store::ScripStore;

/// Days an e-scrip stays valid after issue.
pub const ESCRIP_VALIDITY_DAYS: i64 = 365;

/// Builds the e-scrip for an approved calculation without storing it.
///
/// The scrip id combines the issue timestamp with the claim id, and the
/// amount is the total benefit rounded to two decimal places.
///
/// # Errors
///
/// Returns `ScripNotAllowed` unless the calculation status is `approved`.
pub fn build_escrip(
    claim: &RodtepClaim,
    calculation: &RodtepCalculation,
    issued_at: DateTime<Utc>,
) -> EngineResult<EScrip> {
    if calculation.status != CalculationStatus::Approved {
        return Err(EngineError::ScripNotAllowed {
            claim_id: claim.claim_id.clone(),
            status: calculation.status.as_str().to_string(),
        });
    }

    Ok(EScrip {
        scrip_id: format!(
            "RODTEP{}-{}",
            issued_at.format("%Y%m%d%H%M%S"),
            claim.claim_id
        ),
        issue_date: issued_at,
        expiry_date: issued_at + Duration::days(ESCRIP_VALIDITY_DAYS),
        amount: calculation.total_benefit.round_dp(2),
        claim_ref: claim.claim_id.clone(),
        export_reference: ExportReference {
            shipping_bill_no: claim.export_details.shipping_bill_no.clone(),
            export_date: claim.export_details.export_date,
        },
        status: ScripStatus::Active,
        transferable: true,
    })
}

/// Issues the e-scrip for an approved claim, at most once per claim.
///
/// If `store` already holds a scrip for the claim, that scrip is returned
/// and nothing new is created.
///
/// # Errors
///
/// Returns `ScripNotAllowed` unless the calculation status is `approved`,
/// whether or not a scrip is already stored.
pub fn issue_escrip<S: ScripStore + ?Sized>(
    store: &S,
    claim: &RodtepClaim,
    calculation: &RodtepCalculation,
    issued_at: DateTime<Utc>,
) -> EngineResult<EScrip> {
    let scrip = build_escrip(claim, calculation, issued_at)?;

    if let Some(existing) = store.find_by_claim(&claim.claim_id)? {
        return Ok(existing);
    }
    store.insert_if_absent(scrip)
}
