use crate::domain::record::{AggregatedRecord, CaseMetric, CaseRecord};

pub fn aggregate(records: Vec<CaseRecord>, metric: CaseMetric) -> Vec<AggregatedRecord> {
    aggregate_with(records, |r| metric.select(r))
}

/// Attaches `select(record)` as the case count of every record.
pub fn aggregate_with(
    records: Vec<CaseRecord>,
    select: impl Fn(&CaseRecord) -> u64,
) -> Vec<AggregatedRecord> {
    records
        .into_iter()
        .map(|record| AggregatedRecord {
            cases: select(&record),
            record,
        })
        .collect()
}
