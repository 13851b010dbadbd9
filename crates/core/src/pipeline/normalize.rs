use crate::domain::matrix::{CaseMatrix, PerCapitaMatrix, PopulationMap};
use crate::error::{PipelineError, Result};
use crate::time::epoch::round_to;

pub const PER: f64 = 1_000_000.0;
pub const PER_CAPITA_PLACES: i32 = 2;

/// Cases per million inhabitants, rounded to two decimals.
pub fn normalize(matrix: &CaseMatrix, populations: &PopulationMap) -> Result<PerCapitaMatrix> {
    let missing: Vec<String> = matrix
        .countries()
        .iter()
        .filter(|c| !populations.contains_key(*c))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::MissingPopulation { countries: missing });
    }

    matrix.try_map(|country, count| {
        let population = populations
            .get(country)
            .copied()
            .ok_or_else(|| PipelineError::MissingPopulation {
                countries: vec![country.to_string()],
            })?;
        Ok(per_million(*count, population))
    })
}

pub fn per_million(count: u64, population: f64) -> f64 {
    round_to(count as f64 / population * PER, PER_CAPITA_PLACES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, day).unwrap()
    }

    fn matrix() -> CaseMatrix {
        let mut rows = BTreeMap::new();
        rows.insert(
            d(22),
            BTreeMap::from([("US".to_string(), 1u64), ("Korea, South".to_string(), 1)]),
        );
        rows.insert(
            d(23),
            BTreeMap::from([("US".to_string(), 2u64), ("Korea, South".to_string(), 1)]),
        );
        CaseMatrix::from_rows(rows)
    }

    #[test]
    fn scales_to_per_million() {
        let pops = PopulationMap::from([
            ("US".to_string(), 1_000_000.0),
            ("Korea, South".to_string(), 51_245_707.0),
        ]);
        let m = matrix();
        let out = normalize(&m, &pops).unwrap();
        assert_eq!(out.get(d(22), "US"), Some(&1.0));
        assert_eq!(out.get(d(23), "US"), Some(&2.0));
        for (date, row) in m.rows() {
            for (country, count) in row {
                let expected = round_to(*count as f64 / pops[country] * 1_000_000.0, 2);
                assert_eq!(out.get(date, country), Some(&expected));
            }
        }
        assert_eq!(out.get(d(22), "Korea, South"), Some(&0.02));
    }

    #[test]
    fn missing_population_fails_before_arithmetic() {
        let pops = PopulationMap::from([("US".to_string(), 1_000_000.0)]);
        let err = normalize(&matrix(), &pops).unwrap_err();
        match err {
            PipelineError::MissingPopulation { countries } => {
                assert_eq!(countries, vec!["Korea, South".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
