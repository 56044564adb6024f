//! CSV report output and report file naming.

use crate::aggregate::YearResult;
use crate::error::{PubcountError, Result};
use crate::source::Source;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::Path;
use tracing::info;

/// Filesystem-safe form of a UTC instant.
///
/// `2023-06-13T10:04:05.123456+00:00` becomes
/// `2023_06_13T10_04_05.123456_tzPlus_00_00`.
pub fn timestamp_token(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, false)
        .replace('-', "_")
        .replace(':', "_")
        .replace('+', "_tzPlus_")
}

/// Keep only characters that are safe in a file name
fn safe_term(term: &str) -> String {
    term.chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}

/// Base name shared by the CSV and chart files, without extension:
/// `{source}_{term}__{first}_to_{last}__{timestamp}`
pub fn report_basename(
    source: Source,
    term: &str,
    first_year: i32,
    last_year: i32,
    timestamp: &str,
) -> String {
    format!(
        "{}_{}__{}_to_{}__{}",
        source,
        safe_term(term),
        first_year,
        last_year,
        timestamp
    )
}

/// Write records as CSV with a header line.
///
/// Uses `,` as delimiter and `|` as quote character, quoting only when needed.
pub fn write_csv(records: &[YearResult], path: &Path) -> Result<()> {
    if path.extension().and_then(|e| e.to_str()) != Some("csv") {
        return Err(PubcountError::InvalidInput(format!(
            "report file must end in .csv: {:?}",
            path
        )));
    }

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .quote(b'|')
        .quote_style(csv::QuoteStyle::Necessary)
        .from_path(path)?;

    for record in records {
        wtr.serialize(record)?;
    }

    wtr.flush()?;
    info!(rows = records.len(), path = ?path, "Saved report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn record(year: i32, results: u64, errmsg: Option<&str>) -> YearResult {
        YearResult {
            search_term: "privacy".to_string(),
            year,
            results,
            errmsg: errmsg.map(str::to_string),
            url: format!("https://www.base-search.net/Search/Results?lookfor=privacy+year%3A{}", year),
        }
    }

    #[test]
    fn test_timestamp_token() {
        let now = Utc
            .with_ymd_and_hms(2023, 6, 13, 10, 4, 5)
            .single()
            .expect("valid date");
        assert_eq!(timestamp_token(now), "2023_06_13T10_04_05.000000_tzPlus_00_00");
    }

    #[test]
    fn test_report_basename() {
        assert_eq!(
            report_basename(Source::Arxiv, "machine learning/AI", 2020, 2026, "TS"),
            "arxiv_machine_learningAI__2020_to_2026__TS"
        );
    }

    #[test]
    fn test_write_csv() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("base_privacy.csv");
        let records = vec![record(2020, 1234, None), record(2021, 0, Some("no results"))];

        write_csv(&records, &path)?;

        let content = std::fs::read_to_string(&path)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "searchTerm,year,results,errmsg,url");
        assert_eq!(
            lines[1],
            "privacy,2020,1234,,https://www.base-search.net/Search/Results?lookfor=privacy+year%3A2020"
        );
        assert!(lines[2].starts_with("privacy,2021,0,no results,"));
        assert_eq!(lines.len(), 3);
        Ok(())
    }

    #[test]
    fn test_write_csv_quotes_with_pipe() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("report.csv");
        let mut row = record(2020, 5, None);
        row.search_term = "privacy, security".to_string();

        write_csv(&[row], &path)?;

        let content = std::fs::read_to_string(&path)?;
        assert!(content.contains("|privacy, security|,2020,5,"));
        Ok(())
    }

    #[test]
    fn test_write_csv_requires_csv_extension() {
        let result = write_csv(&[record(2020, 1, None)], Path::new("report.txt"));
        assert!(matches!(result, Err(PubcountError::InvalidInput(_))));
    }
}
