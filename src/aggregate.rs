//! Year-range aggregation.
//!
//! Runs build URL → fetch → extract → classify for every year of a range,
//! strictly one year at a time, and collects one [`YearResult`] per year in
//! iteration order.

use crate::error::{PubcountError, Result};
use crate::extract::extract_count;
use crate::fetch::{validate_url, Fetcher};
use crate::query::{check_year_against, current_year};
use crate::source::Source;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{info, warn};

/// `errmsg` value recorded for empty or rejected queries
pub const NO_RESULTS: &str = "no results";

const ARXIV_RETURNED_NO_RESULTS: &str = "returned no results";
const ARXIV_MALFORMED_QUERY: &str =
    "Whoops! Something went wrong. Please correct errors in the form below.";
const BASE_NO_MATCHING_DOCUMENTS: &str = "Keine zu Ihrer Anfrage passenden Dokumente gefunden";

/// Optional sign, digits, `_` between digits
static NUMERIC_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9](_?[0-9])*$").expect("valid numeric term pattern"));

/// Result count for one (source, term, year)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearResult {
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    pub year: i32,
    pub results: u64,
    pub errmsg: Option<String>,
    pub url: String,
}

/// Years to query: `[from, to)` stepped by `step`, then `current` appended.
///
/// The current year is always appended, even when it is already in the
/// range or smaller than `from`.
pub fn year_list(from: i32, to: i32, step: usize, current: i32) -> Result<Vec<i32>> {
    if step == 0 {
        return Err(PubcountError::InvalidInput("step must be at least 1".to_string()));
    }
    let mut years: Vec<i32> = (from..to).step_by(step).collect();
    years.push(current);
    Ok(years)
}

/// Reject empty and purely numeric search terms.
///
/// Zero-valued terms such as `"0"` or `"000"` are numeric too and are rejected.
pub fn validate_search_term(term: &str) -> Result<()> {
    if term.trim().is_empty() {
        return Err(PubcountError::InvalidInput("searchTerm must be given".to_string()));
    }

    if NUMERIC_TERM.is_match(term.replace(',', "").trim()) {
        return Err(PubcountError::InvalidInput(format!(
            "searchTerm must be a string (= not a integer): '{}'",
            term
        )));
    }
    Ok(())
}

/// Scan a raw body for the provider's own "nothing found" wording.
///
/// Independent of [`extract_count`]: the two checks look for different
/// phrases and both feed the report.
pub fn classify_errmsg(source: Source, body: &str) -> Option<String> {
    let empty = match source {
        Source::Arxiv => {
            body.contains(ARXIV_RETURNED_NO_RESULTS) || body.contains(ARXIV_MALFORMED_QUERY)
        }
        Source::Base => body.contains(BASE_NO_MATCHING_DOCUMENTS),
    };
    empty.then(|| NO_RESULTS.to_string())
}

/// Query every year in `[from, to)` plus the current year.
pub async fn run_for_years<F: Fetcher + ?Sized>(
    fetcher: &F,
    source: Source,
    term: &str,
    from: i32,
    to: i32,
) -> Result<Vec<YearResult>> {
    run_for_years_stepped(fetcher, source, term, from, to, 1).await
}

/// Like [`run_for_years`] with a custom step between years.
///
/// The term and every year are validated before the first request. Any
/// fetch or hard parse failure aborts the whole run.
pub async fn run_for_years_stepped<F: Fetcher + ?Sized>(
    fetcher: &F,
    source: Source,
    term: &str,
    from: i32,
    to: i32,
    step: usize,
) -> Result<Vec<YearResult>> {
    validate_search_term(term)?;

    let current = current_year();
    let years = year_list(from, to, step, current)?;
    for year in &years {
        check_year_against(*year, current)?;
    }

    info!(%source, term, years = ?years, "Starting year-range run");

    let mut records = Vec::with_capacity(years.len());
    for year in years {
        records.push(download_year(fetcher, source, term, year).await?);
    }

    info!(%source, term, records = records.len(), "Year-range run complete");
    Ok(records)
}

async fn download_year<F: Fetcher + ?Sized>(
    fetcher: &F,
    source: Source,
    term: &str,
    year: i32,
) -> Result<YearResult> {
    let url = source.search_url(term, year);
    info!(%source, term, year, url = %url, "Querying");
    validate_url(&url)?;

    let body = fetcher.fetch(&url).await?;

    let (results, rejected) = match extract_count(source, &body) {
        Ok(count) => (count, false),
        Err(PubcountError::Query(msg)) => {
            warn!(%source, year, error = %msg, "Query rejected by provider, recording no results");
            (0, true)
        }
        Err(e) => return Err(e),
    };

    let errmsg = classify_errmsg(source, &body).or_else(|| rejected.then(|| NO_RESULTS.to_string()));

    info!(%source, year, count = results, errmsg = ?errmsg, "Recorded year");
    Ok(YearResult {
        search_term: term.to_string(),
        year,
        results,
        errmsg,
        url,
    })
}
