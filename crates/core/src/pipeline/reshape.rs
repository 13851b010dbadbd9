use crate::domain::matrix::CaseMatrix;
use crate::domain::record::AggregatedRecord;
use crate::error::{PipelineError, Result};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Pivots records into a date × country matrix of case counts.
///
/// A repeated (date, country) pair with the same count collapses into one cell;
/// a repeated pair with a different count is ambiguous and rejected.
pub fn pivot(records: &[AggregatedRecord]) -> Result<CaseMatrix> {
    let mut rows: BTreeMap<_, BTreeMap<String, u64>> = BTreeMap::new();
    for AggregatedRecord { record, cases } in records {
        let row = rows.entry(record.date).or_default();
        match row.entry(record.country.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(*cases);
            }
            Entry::Occupied(slot) if slot.get() == cases => {
                tracing::debug!(date = %record.date, country = %record.country, "duplicate case row collapsed");
            }
            Entry::Occupied(slot) => {
                return Err(PipelineError::DataShape {
                    date: record.date,
                    country: record.country.clone(),
                    first: *slot.get(),
                    second: *cases,
                });
            }
        }
    }

    let matrix = CaseMatrix::from_rows(rows);
    tracing::info!(
        dates = matrix.dates().count(),
        countries = matrix.countries().len(),
        "pivoted case matrix"
    );
    Ok(matrix)
}
