//! Bar chart of results per year.

use crate::aggregate::YearResult;
use crate::error::{PubcountError, Result};
use crate::source::Source;
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

const CHART_SIZE: (u32, u32) = (900, 500);

fn chart_err<E: std::fmt::Display>(e: E) -> PubcountError {
    PubcountError::Chart(e.to_string())
}

/// Render one green bar per record, in record order, to a PNG file.
///
/// Bars are placed by position so repeated or out-of-order years each keep
/// their own bar. Does nothing for an empty record list.
pub fn write_chart(source: Source, records: &[YearResult], path: &Path) -> Result<()> {
    if path.extension().and_then(|e| e.to_str()) != Some("png") {
        return Err(PubcountError::InvalidInput(format!(
            "chart file must end in .png: {:?}",
            path
        )));
    }
    let Some(first) = records.first() else {
        return Ok(());
    };

    let max = records.iter().map(|r| r.results).max().unwrap_or(0);
    let y_max = max + max / 10 + 1;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let title = format!(
        "Results for search term '{}' per year (source:{})",
        first.search_term, source
    );
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(title, ("sans-serif", 22))
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..records.len()).into_segmented(), 0u64..y_max)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("year")
        .y_desc("results")
        .x_labels(records.len())
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => records
                .get(*i)
                .map(|r| r.year.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(GREEN.filled())
                .margin(8)
                .data(records.iter().enumerate().map(|(i, r)| (i, r.results))),
        )
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    info!(bars = records.len(), path = ?path, "Saved chart");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(year: i32, results: u64) -> YearResult {
        YearResult {
            search_term: "privacy".to_string(),
            year,
            results,
            errmsg: None,
            url: String::new(),
        }
    }

    #[test]
    fn test_write_chart_creates_png() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("arxiv_privacy_CHART.png");
        let records = vec![record(2020, 1234), record(2021, 0), record(2021, 56)];

        write_chart(Source::Arxiv, &records, &path)?;

        assert!(std::fs::metadata(&path)?.len() > 0);
        Ok(())
    }

    #[test]
    fn test_unwritable_path_is_chart_error() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("missing").join("arxiv_privacy_CHART.png");

        let result = write_chart(Source::Arxiv, &[record(2020, 1)], &path);

        assert!(matches!(result, Err(PubcountError::Chart(_))));
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_empty_records_write_nothing() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("empty_CHART.png");
        write_chart(Source::Base, &[], &path)?;
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_chart_requires_png_extension() {
        let result = write_chart(Source::Base, &[record(2020, 1)], Path::new("chart.csv"));
        assert!(matches!(result, Err(PubcountError::InvalidInput(_))));
    }
}
