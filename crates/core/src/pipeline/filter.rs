use crate::domain::record::CaseRecord;
use std::collections::BTreeSet;

/// Keeps records whose country is allow-listed, in their original order.
pub fn filter_countries(records: Vec<CaseRecord>, allowed: &BTreeSet<String>) -> Vec<CaseRecord> {
    let before = records.len();
    let kept: Vec<CaseRecord> = records
        .into_iter()
        .filter(|r| allowed.contains(&r.country))
        .collect();
    tracing::debug!(before, after = kept.len(), "filtered case records by country");
    kept
}
