//! The chart pipeline:
//! fetch cases + population (concurrently) -> filter -> aggregate -> pivot
//! -> population lookup -> per-capita -> series -> chart config.
//!
//! Every stage is a plain function over the previous stage's output so each
//! one can be tested on its own; `run` only wires them together.

use crate::domain::chart::ChartConfig;
use crate::domain::matrix::{CaseMatrix, PerCapitaMatrix};
use crate::error::Result;
use crate::ingest::cases::load_case_records;
use crate::ingest::population::fetch_population_table;
use crate::ingest::source::DatasetSource;
use std::collections::BTreeSet;

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod filter;
pub mod normalize;
pub mod reshape;

pub use config::PipelineConfig;

/// Intermediate artifacts of one run, kept for callers that want to inspect
/// more than the final chart.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub cases: CaseMatrix,
    pub per_capita: PerCapitaMatrix,
    pub chart: ChartConfig,
}

#[tracing::instrument(skip_all, fields(metric = %config.metric, source = source.source_name()))]
pub async fn run(config: &PipelineConfig, source: &dyn DatasetSource) -> Result<RunOutput> {
    // The population table does not depend on the filtered records, so both
    // downloads go out together and the table is narrowed afterwards.
    let (records, population) = tokio::try_join!(
        load_case_records(source, &config.cases_url),
        fetch_population_table(source, &config.population_url, config.population_year),
    )?;

    let records = filter::filter_countries(records, &config.allowed_countries());
    let aggregated = aggregate::aggregate(records, config.metric);
    let cases = reshape::pivot(&aggregated)?;

    let present: BTreeSet<String> = cases.countries().iter().cloned().collect();
    let populations = population.lookup(&config.population_renames, &present)?;
    let per_capita = normalize::normalize(&cases, &populations)?;

    let series = chart::build_series(&per_capita);
    let chart = chart::assemble(series, &config.labels);

    tracing::info!(
        series = chart.series.len(),
        points = per_capita.cell_count(),
        "chart pipeline finished"
    );

    Ok(RunOutput {
        cases,
        per_capita,
        chart,
    })
}

/// Runs the pipeline and returns the serialized chart.
pub async fn run_to_json(config: &PipelineConfig, source: &dyn DatasetSource) -> Result<String> {
    let output = run(config, source).await?;
    chart::to_json(&output.chart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::ingest::source::StaticDatasetSource;
    use chrono::NaiveDate;
    use serde_json::{json, Value};

    const CASES: &str = "\
Date,Country,Confirmed,Recovered,Deaths
2020-01-22,US,1,0,0
2020-01-22,Italy,0,0,0
2020-01-22,\"Korea, South\",1,0,0
2020-01-23,US,2,0,0
2020-01-23,Italy,0,0,0
2020-01-23,\"Korea, South\",1,0,0
";

    const POPULATION: &str = "\
Country,Country_Code,Year_2016
Italy,ITA,60600590
\"Korea, Rep.\",KOR,51245707
United States,USA,1000000
";

    fn config() -> PipelineConfig {
        PipelineConfig {
            cases_url: "mem://cases".to_string(),
            population_url: "mem://population".to_string(),
            ..PipelineConfig::default()
        }
    }

    fn source(cases: &str, population: &str) -> StaticDatasetSource {
        StaticDatasetSource::new()
            .with("mem://cases", cases)
            .with("mem://population", population)
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, day).unwrap()
    }

    #[tokio::test]
    async fn us_scenario_produces_expected_points() {
        let out = run(&config(), &source(CASES, POPULATION)).await.unwrap();

        assert_eq!(out.per_capita.get(d(22), "US"), Some(&1.0));
        assert_eq!(out.per_capita.get(d(23), "US"), Some(&2.0));
        assert_eq!(out.per_capita.get(d(22), "Korea, South"), Some(&0.02));

        let us = out.chart.series.iter().find(|s| s.name == "US").unwrap();
        let v = serde_json::to_value(&us.data).unwrap();
        assert_eq!(
            v,
            json!([[1_579_651_200_000i64, 1.0], [1_579_737_600_000i64, 2.0]])
        );
    }

    #[tokio::test]
    async fn only_allow_listed_countries_present() {
        let out = run(&config(), &source(CASES, POPULATION)).await.unwrap();
        assert_eq!(
            out.cases.countries(),
            ["Korea, South".to_string(), "US".to_string()]
        );
        let names: Vec<&str> = out.chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Korea, South", "US"]);
    }

    #[tokio::test]
    async fn json_output_round_trips() {
        let text = run_to_json(&config(), &source(CASES, POPULATION)).await.unwrap();
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["xAxis"]["type"], "datetime");
        assert_eq!(v["series"].as_array().unwrap().len(), 2);
        assert_eq!(v["series"][1]["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_population_aborts_run() {
        let population = "Country,Country_Code,Year_2016\nUnited States,USA,1000000\n";
        let err = run(&config(), &source(CASES, population)).await.unwrap_err();
        match err {
            PipelineError::MissingPopulation { countries } => {
                assert_eq!(countries, vec!["Korea, South".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_source_is_a_network_error() {
        let only_cases = StaticDatasetSource::new().with("mem://cases", CASES);
        let err = run(&config(), &only_cases).await.unwrap_err();
        assert_eq!(err.kind(), "network");
    }

    #[tokio::test]
    async fn conflicting_rows_are_a_shape_error() {
        let cases = format!("{CASES}2020-01-23,US,3,0,0\n");
        let err = run(&config(), &source(&cases, POPULATION)).await.unwrap_err();
        assert_eq!(err.kind(), "data_shape");
    }

    #[tokio::test]
    async fn alternate_metric_changes_only_the_values() {
        let cases = "\
Date,Country,Confirmed,Recovered,Deaths
2020-04-01,US,10,2,3
";
        let config = PipelineConfig {
            metric: crate::domain::record::CaseMetric::ConfirmedRecoveredDeaths,
            ..config()
        };
        let out = run(&config, &source(cases, POPULATION)).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2020, 4, 1).unwrap();
        assert_eq!(out.cases.get(date, "US"), Some(&15));
        assert_eq!(out.per_capita.get(date, "US"), Some(&15.0));
    }
}
