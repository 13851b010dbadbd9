use chrono::NaiveDate;
use thiserror::Error;

/// Failures that abort a pipeline run. None of them are retried and no partial
/// chart is produced.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to fetch {url}: {detail}")]
    Network { url: String, detail: String },

    #[error("malformed {dataset} data at line {line}: {detail}")]
    Parse {
        dataset: &'static str,
        line: usize,
        detail: String,
    },

    #[error("ambiguous pivot for {country} on {date}: {first} vs {second}")]
    DataShape {
        date: NaiveDate,
        country: String,
        first: u64,
        second: u64,
    },

    #[error("no population figure for: {}", countries.join(", "))]
    MissingPopulation { countries: Vec<String> },

    #[error("failed to serialize chart: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PipelineError {
    /// Stable machine-readable tag, used in error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Parse { .. } => "parse",
            Self::DataShape { .. } => "data_shape",
            Self::MissingPopulation { .. } => "missing_population",
            Self::Serialize(_) => "serialize",
        }
    }

    /// Whether the failure originated in an upstream dataset rather than in
    /// our own reshaping of it.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Parse { .. })
    }

    pub(crate) fn parse(dataset: &'static str, line: usize, detail: impl Into<String>) -> Self {
        Self::Parse {
            dataset,
            line,
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
