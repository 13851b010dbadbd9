use crate::domain::chart::ChartLabels;
use crate::domain::record::CaseMetric;
use crate::ingest::source::DEFAULT_TIMEOUT_SECS;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

pub const DEFAULT_CASES_URL: &str =
    "https://raw.githubusercontent.com/datasets/covid-19/master/data/countries-aggregated.csv";
pub const DEFAULT_POPULATION_URL: &str =
    "https://datahub.io/JohnSnowLabs/population-figures-by-country/r/population-figures-by-country-csv.csv";
pub const DEFAULT_POPULATION_YEAR: u16 = 2016;
pub const DEFAULT_COUNTRIES: [&str; 5] = ["Korea, South", "Germany", "United Kingdom", "US", "France"];

/// Population dataset name → case dataset name.
pub const DEFAULT_POPULATION_RENAMES: [(&str, &str); 2] =
    [("United States", "US"), ("Korea, Rep.", "Korea, South")];

/// Everything a pipeline run needs to know. Passed in explicitly so tests can
/// point it at other sources or countries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub cases_url: String,
    pub population_url: String,
    pub countries: Vec<String>,
    pub population_renames: BTreeMap<String, String>,
    pub population_year: u16,
    pub metric: CaseMetric,
    pub labels: ChartLabels,
    pub request_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cases_url: DEFAULT_CASES_URL.to_string(),
            population_url: DEFAULT_POPULATION_URL.to_string(),
            countries: DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect(),
            population_renames: DEFAULT_POPULATION_RENAMES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            population_year: DEFAULT_POPULATION_YEAR,
            metric: CaseMetric::default(),
            labels: ChartLabels::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl PipelineConfig {
    pub fn allowed_countries(&self) -> BTreeSet<String> {
        self.countries.iter().cloned().collect()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
