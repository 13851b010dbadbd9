use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use percapita_core::domain::record::CaseMetric;
use percapita_core::ingest::{DatasetSource, HttpDatasetSource, StaticDatasetSource};
use percapita_core::pipeline::{self, PipelineConfig};

#[derive(Debug, Parser)]
#[command(name = "percapita_worker")]
struct Args {
    /// Write the chart JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Pretty-print the JSON.
    #[arg(long)]
    pretty: bool,

    /// Case metric: confirmed, deaths or confirmed_recovered_deaths.
    #[arg(long)]
    metric: Option<CaseMetric>,

    /// Population reference year (column Year_<year>).
    #[arg(long)]
    population_year: Option<u16>,

    /// Read the case CSV from a local file instead of downloading it.
    #[arg(long, requires = "population_file")]
    cases_file: Option<PathBuf>,

    /// Read the population CSV from a local file instead of downloading it.
    #[arg(long, requires = "cases_file")]
    population_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = percapita_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let mut config = settings.pipeline_config();
    if let Some(metric) = args.metric {
        config.metric = metric;
    }
    if let Some(year) = args.population_year {
        config.population_year = year;
    }

    let source = build_source(&args, &config)?;

    let output = match pipeline::run(&config, source.as_ref()).await {
        Ok(output) => output,
        Err(err) => {
            let err = anyhow::Error::new(err);
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "chart pipeline failed");
            return Err(err);
        }
    };

    let json = if args.pretty {
        pipeline::chart::to_json_pretty(&output.chart)?
    } else {
        pipeline::chart::to_json(&output.chart)?
    };

    match &args.out {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write chart JSON to {}", path.display()))?;
            tracing::info!(path = %path.display(), series = output.chart.series.len(), "wrote chart JSON");
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn build_source(args: &Args, config: &PipelineConfig) -> anyhow::Result<Box<dyn DatasetSource>> {
    if let (Some(cases), Some(population)) = (&args.cases_file, &args.population_file) {
        let read = |path: &PathBuf| {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        };
        let source = StaticDatasetSource::new()
            .with(config.cases_url.clone(), read(cases)?)
            .with(config.population_url.clone(), read(population)?);
        return Ok(Box::new(source));
    }

    Ok(Box::new(HttpDatasetSource::new(config.request_timeout())?))
}

fn init_sentry(settings: &percapita_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
