use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One row of the cumulative case dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRecord {
    pub date: NaiveDate,
    pub country: String,
    pub confirmed: u64,
    pub recovered: u64,
    pub deaths: u64,
}

/// A case record with the metric chosen for the run already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedRecord {
    pub record: CaseRecord,
    pub cases: u64,
}

/// Which raw columns count as "cases".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseMetric {
    #[default]
    Confirmed,
    Deaths,
    ConfirmedRecoveredDeaths,
}

impl CaseMetric {
    pub const ALL: [CaseMetric; 3] = [
        CaseMetric::Confirmed,
        CaseMetric::Deaths,
        CaseMetric::ConfirmedRecoveredDeaths,
    ];

    pub fn select(self, record: &CaseRecord) -> u64 {
        match self {
            Self::Confirmed => record.confirmed,
            Self::Deaths => record.deaths,
            Self::ConfirmedRecoveredDeaths => record
                .confirmed
                .saturating_add(record.recovered)
                .saturating_add(record.deaths),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Deaths => "deaths",
            Self::ConfirmedRecoveredDeaths => "confirmed_recovered_deaths",
        }
    }
}

impl fmt::Display for CaseMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseMetric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| anyhow::anyhow!("unknown case metric: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CaseRecord {
        CaseRecord {
            date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            country: "Germany".to_string(),
            confirmed: 130,
            recovered: 16,
            deaths: 2,
        }
    }

    #[test]
    fn metrics_select_expected_columns() {
        let r = record();
        assert_eq!(CaseMetric::Confirmed.select(&r), 130);
        assert_eq!(CaseMetric::Deaths.select(&r), 2);
        assert_eq!(CaseMetric::ConfirmedRecoveredDeaths.select(&r), 148);
    }

    #[test]
    fn metric_parses_from_its_name() {
        for m in CaseMetric::ALL {
            assert_eq!(m.to_string().parse::<CaseMetric>().unwrap(), m);
        }
        assert_eq!(" Deaths ".parse::<CaseMetric>().unwrap(), CaseMetric::Deaths);
        assert!("recovered".parse::<CaseMetric>().is_err());
    }
}
