use crate::domain::record::CaseRecord;
use crate::error::{PipelineError, Result};
use crate::ingest::source::DatasetSource;
use chrono::NaiveDate;
use serde::Deserialize;

const DATASET: &str = "cases";

#[derive(Debug, Deserialize)]
struct RawCaseRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Confirmed")]
    confirmed: String,
    #[serde(rename = "Recovered")]
    recovered: String,
    #[serde(rename = "Deaths")]
    deaths: String,
}

/// Fetches the case dataset and parses every row. One attempt only.
pub async fn load_case_records(source: &dyn DatasetSource, url: &str) -> Result<Vec<CaseRecord>> {
    let text = source.fetch_text(url).await?;
    let records = parse_case_csv(&text)?;
    tracing::info!(url, rows = records.len(), "loaded case records");
    Ok(records)
}

/// Parses `Date,Country,Confirmed,Recovered,Deaths` CSV text, keeping row order.
pub fn parse_case_csv(text: &str) -> Result<Vec<CaseRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut out = Vec::new();
    for (idx, row) in reader.deserialize::<RawCaseRow>().enumerate() {
        // header is line 1
        let line = idx + 2;
        let row = row.map_err(|e| PipelineError::parse(DATASET, line, e.to_string()))?;

        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|e| {
            PipelineError::parse(DATASET, line, format!("invalid date '{}': {e}", row.date))
        })?;

        if row.country.is_empty() {
            return Err(PipelineError::parse(DATASET, line, "empty country"));
        }

        out.push(CaseRecord {
            date,
            confirmed: parse_count(&row.confirmed, "Confirmed", line)?,
            recovered: parse_count(&row.recovered, "Recovered", line)?,
            deaths: parse_count(&row.deaths, "Deaths", line)?,
            country: row.country,
        });
    }

    Ok(out)
}

/// Empty cells count as zero. Integral floats such as `12.0` are accepted.
fn parse_count(raw: &str, column: &str, line: usize) -> Result<u64> {
    if raw.is_empty() {
        return Ok(0);
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Ok(n);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => {
            Ok(v as u64)
        }
        _ => Err(PipelineError::parse(
            DATASET,
            line,
            format!("invalid {column} count '{raw}'"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Date,Country,Confirmed,Recovered,Deaths
2020-01-22,Afghanistan,0,0,0
2020-01-22,US,1,0,0
2020-01-23,US,2,0,0
2020-01-23,\"Korea, South\",1,,0
";

    #[test]
    fn parses_rows_in_order() {
        let records = parse_case_csv(SAMPLE).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[1].country, "US");
        assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2020, 1, 22).unwrap());
        assert_eq!(records[2].confirmed, 2);
        assert_eq!(records[3].country, "Korea, South");
        assert_eq!(records[3].recovered, 0);
    }

    #[test]
    fn accepts_integral_float_counts() {
        let text = "Date,Country,Confirmed,Recovered,Deaths\n2020-02-01,France,6.0,0,0\n";
        let records = parse_case_csv(text).unwrap();
        assert_eq!(records[0].confirmed, 6);
    }

    #[test]
    fn rejects_bad_date_with_line_number() {
        let text = "Date,Country,Confirmed,Recovered,Deaths\n2020-01-22,US,1,0,0\n22/01/2020,US,1,0,0\n";
        let err = parse_case_csv(text).unwrap_err();
        match err {
            PipelineError::Parse { dataset, line, .. } => {
                assert_eq!(dataset, "cases");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_numeric_and_fractional_counts() {
        let text = "Date,Country,Confirmed,Recovered,Deaths\n2020-01-22,US,many,0,0\n";
        assert!(matches!(parse_case_csv(text), Err(PipelineError::Parse { .. })));
        let text = "Date,Country,Confirmed,Recovered,Deaths\n2020-01-22,US,1.5,0,0\n";
        assert!(matches!(parse_case_csv(text), Err(PipelineError::Parse { .. })));
        let text = "Date,Country,Confirmed,Recovered,Deaths\n2020-01-22,US,-1,0,0\n";
        assert!(matches!(parse_case_csv(text), Err(PipelineError::Parse { .. })));
    }

    #[test]
    fn rejects_missing_column() {
        let text = "Date,Country,Confirmed\n2020-01-22,US,1\n";
        assert!(matches!(parse_case_csv(text), Err(PipelineError::Parse { .. })));
    }

    #[test]
    fn empty_body_yields_no_records() {
        let text = "Date,Country,Confirmed,Recovered,Deaths\n";
        assert!(parse_case_csv(text).unwrap().is_empty());
    }
}
