use crate::domain::matrix::PopulationMap;
use crate::error::{PipelineError, Result};
use crate::ingest::source::DatasetSource;
use std::collections::{BTreeMap, BTreeSet};

const DATASET: &str = "population";
const COUNTRY_COLUMN: &str = "Country";

/// One country's figure for the reference year, in the population dataset's
/// own naming.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationRow {
    pub country: String,
    pub population: Option<f64>,
}

/// The whole population dataset, reduced to a single year.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationTable {
    pub year: u16,
    pub rows: Vec<PopulationRow>,
}

impl PopulationTable {
    /// Renames countries into the case dataset's naming, keeps only
    /// `countries`, and fails if any of them ends up without a usable figure.
    ///
    /// When several rows rename to the same country, the last usable figure
    /// wins; empty or non-positive figures never replace one.
    pub fn lookup(
        &self,
        renames: &BTreeMap<String, String>,
        countries: &BTreeSet<String>,
    ) -> Result<PopulationMap> {
        let mut out = PopulationMap::new();
        for row in &self.rows {
            let name = renames.get(&row.country).unwrap_or(&row.country);
            if !countries.contains(name) {
                continue;
            }
            match row.population {
                Some(p) if p.is_finite() && p > 0.0 => {
                    out.insert(name.clone(), p);
                }
                _ => {
                    tracing::warn!(country = %name, year = self.year, "population figure unusable");
                }
            }
        }

        let missing: Vec<String> = countries
            .iter()
            .filter(|c| !out.contains_key(*c))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::MissingPopulation { countries: missing });
        }

        Ok(out)
    }
}

pub async fn fetch_population_table(
    source: &dyn DatasetSource,
    url: &str,
    year: u16,
) -> Result<PopulationTable> {
    let text = source.fetch_text(url).await?;
    let table = parse_population_csv(&text, year)?;
    tracing::info!(url, year, rows = table.rows.len(), "loaded population table");
    Ok(table)
}

/// Parses the wide `Country,Country_Code,Year_1960,...` layout, keeping only
/// the `Year_<year>` column.
pub fn parse_population_csv(text: &str, year: u16) -> Result<PopulationTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::parse(DATASET, 1, e.to_string()))?
        .clone();

    let year_column = format!("Year_{year}");
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PipelineError::parse(DATASET, 1, format!("missing column {name}")))
    };
    let country_idx = column(COUNTRY_COLUMN)?;
    let year_idx = column(year_column.as_str())?;

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let line = idx + 2;
        let record = record.map_err(|e| PipelineError::parse(DATASET, line, e.to_string()))?;

        let country = record.get(country_idx).unwrap_or_default();
        if country.is_empty() {
            return Err(PipelineError::parse(DATASET, line, "empty country"));
        }

        let raw = record.get(year_idx).unwrap_or_default();
        let population = if raw.is_empty() {
            None
        } else {
            Some(raw.parse::<f64>().map_err(|e| {
                PipelineError::parse(DATASET, line, format!("invalid {year_column} '{raw}': {e}"))
            })?)
        };

        rows.push(PopulationRow {
            country: country.to_string(),
            population,
        });
    }

    Ok(PopulationTable { year, rows })
}
