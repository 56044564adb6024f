//! End-to-end run: aggregate a year range, then write the CSV and chart.

use crate::aggregate::{run_for_years_stepped, YearResult};
use crate::chart::write_chart;
use crate::error::{PubcountError, Result};
use crate::fetch::Fetcher;
use crate::report::{report_basename, timestamp_token, write_csv};
use crate::source::Source;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What to download
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub source: Source,
    pub term: String,
    /// First year, inclusive
    pub from_year: i32,
    /// Last year, exclusive (the current year is always added)
    pub to_year: i32,
    pub step: usize,
}

/// Where and what to write
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Directory for the CSV and chart files
    pub output_dir: PathBuf,
    /// Also render the bar chart
    pub render_chart: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output"),
            render_chart: true,
        }
    }
}

/// Files written by [`download_and_save`]
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub csv: PathBuf,
    pub chart: Option<PathBuf>,
    pub rows: usize,
}

/// Download counts for every year of the request and save them under the output directory.
///
/// Nothing is written unless every year was fetched and parsed.
pub async fn download_and_save<F: Fetcher + ?Sized>(
    fetcher: &F,
    request: &DownloadRequest,
    options: &ReportOptions,
) -> Result<ReportPaths> {
    let timestamp = timestamp_token(Utc::now());

    let records = run_for_years_stepped(
        fetcher,
        request.source,
        &request.term,
        request.from_year,
        request.to_year,
        request.step,
    )
    .await?;

    let (first, last) = match (records.first(), records.last()) {
        (Some(first), Some(last)) => (first.year, last.year),
        _ => return Err(PubcountError::InvalidInput("no years to report".to_string())),
    };

    std::fs::create_dir_all(&options.output_dir)?;
    let basename = report_basename(request.source, &request.term, first, last, &timestamp);

    let csv = options.output_dir.join(format!("{}.csv", basename));
    let chart = options
        .render_chart
        .then(|| options.output_dir.join(format!("{}_CHART.png", basename)));
    save_report(request.source, &records, &csv, chart.as_deref())?;

    info!(csv = ?csv, chart = ?chart, rows = records.len(), "Report complete");
    Ok(ReportPaths {
        csv,
        chart,
        rows: records.len(),
    })
}

/// Write the CSV and, when `chart` is given, the bar chart.
///
/// Either both files exist afterwards or neither does.
pub fn save_report(
    source: Source,
    records: &[YearResult],
    csv: &Path,
    chart: Option<&Path>,
) -> Result<()> {
    write_csv(records, csv)?;

    if let Some(chart) = chart {
        if let Err(e) = write_chart(source, records, chart) {
            warn!(error = %e, csv = ?csv, "Chart failed, removing report");
            if let Err(rm) = std::fs::remove_file(csv) {
                warn!(error = %rm, csv = ?csv, "Could not remove report");
            }
            return Err(e);
        }
    }
    Ok(())
}
