use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Country name (case dataset naming) to population for the reference year.
pub type PopulationMap = BTreeMap<String, f64>;

/// Cumulative case counts by date and country.
pub type CaseMatrix = DateCountryMatrix<u64>;

/// Cases per million inhabitants by date and country.
pub type PerCapitaMatrix = DateCountryMatrix<f64>;

/// Sparse date × country table. Rows are ordered by date, columns by country
/// name. A missing cell means the source had no row for that pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DateCountryMatrix<T> {
    countries: Vec<String>,
    rows: BTreeMap<NaiveDate, BTreeMap<String, T>>,
}

impl<T> Default for DateCountryMatrix<T> {
    fn default() -> Self {
        Self {
            countries: Vec::new(),
            rows: BTreeMap::new(),
        }
    }
}

impl<T> DateCountryMatrix<T> {
    pub fn from_rows(rows: BTreeMap<NaiveDate, BTreeMap<String, T>>) -> Self {
        let countries: BTreeSet<&String> = rows.values().flat_map(|row| row.keys()).collect();
        let countries = countries.into_iter().cloned().collect();
        Self { countries, rows }
    }

    /// Column order.
    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    pub fn get(&self, date: NaiveDate, country: &str) -> Option<&T> {
        self.rows.get(&date).and_then(|row| row.get(country))
    }

    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, &BTreeMap<String, T>)> {
        self.rows.iter().map(|(d, row)| (*d, row))
    }

    /// Cells of one country in ascending date order, skipping dates it lacks.
    pub fn column<'a>(&'a self, country: &'a str) -> impl Iterator<Item = (NaiveDate, &'a T)> + 'a {
        self.rows
            .iter()
            .filter_map(move |(d, row)| row.get(country).map(|v| (*d, v)))
    }

    pub fn cell_count(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Builds a matrix of the same shape, failing on the first cell `f` rejects.
    pub fn try_map<U, E>(
        &self,
        mut f: impl FnMut(&str, &T) -> Result<U, E>,
    ) -> Result<DateCountryMatrix<U>, E> {
        let mut rows = BTreeMap::new();
        for (date, row) in &self.rows {
            let mut out = BTreeMap::new();
            for (country, value) in row {
                out.insert(country.clone(), f(country, value)?);
            }
            rows.insert(*date, out);
        }
        Ok(DateCountryMatrix {
            countries: self.countries.clone(),
            rows,
        })
    }
}
