pub mod domain;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod time;

pub use error::PipelineError;

/// Process settings for the binaries. The pipeline itself only ever sees the
/// `PipelineConfig` built from these.
pub mod config {
    use crate::domain::record::CaseMetric;
    use crate::pipeline::PipelineConfig;
    use anyhow::Context;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub port: Option<u16>,
        pub cases_url: Option<String>,
        pub population_url: Option<String>,
        pub population_year: Option<u16>,
        pub case_metric: Option<CaseMetric>,
        pub http_timeout_secs: Option<u64>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                port: parsed_var("PORT")?,
                cases_url: non_empty_var("COVID_CASES_URL"),
                population_url: non_empty_var("COVID_POPULATION_URL"),
                population_year: parsed_var("COVID_POPULATION_YEAR")?,
                case_metric: parsed_var("COVID_CASE_METRIC")?,
                http_timeout_secs: parsed_var("HTTP_TIMEOUT_SECS")?,
            })
        }

        /// Defaults with any configured overrides applied.
        pub fn pipeline_config(&self) -> PipelineConfig {
            let mut config = PipelineConfig::default();
            if let Some(url) = &self.cases_url {
                config.cases_url = url.clone();
            }
            if let Some(url) = &self.population_url {
                config.population_url = url.clone();
            }
            if let Some(year) = self.population_year {
                config.population_year = year;
            }
            if let Some(metric) = self.case_metric {
                config.metric = metric;
            }
            if let Some(secs) = self.http_timeout_secs {
                config.request_timeout_secs = secs;
            }
            config
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

    fn parsed_var<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        non_empty_var(key)
            .map(|raw| {
                raw.trim()
                    .parse::<T>()
                    .map_err(|e| anyhow::anyhow!("{e}"))
                    .with_context(|| format!("invalid {key}: {raw}"))
            })
            .transpose()
    }

}
