//! Search URL construction for each provider.
//!
//! Downstream scraping depends on the exact response shape these URLs
//! produce, so parameter names and order are fixed per provider.

use crate::error::{PubcountError, Result};
use crate::source::Source;
use chrono::Datelike;

/// Lowest accepted year
pub const MIN_YEAR: i32 = 1;

/// Years past the current one that still count as valid
const FUTURE_YEARS: i32 = 2;

/// Current calendar year (local time)
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Reject years outside `[MIN_YEAR, current_year() + 2]`.
pub fn check_year(year: i32) -> Result<()> {
    check_year_against(year, current_year())
}

pub(crate) fn check_year_against(year: i32, current: i32) -> Result<()> {
    let max = current + FUTURE_YEARS;
    if year < MIN_YEAR || year > max {
        return Err(PubcountError::InvalidInput(format!(
            "Year must be between the bounds of '{}' and '{}', got '{}'",
            MIN_YEAR, max, year
        )));
    }
    Ok(())
}

impl Source {
    /// Build the search URL for `term` restricted to `year`.
    pub fn search_url(&self, term: &str, year: i32) -> String {
        let term = urlencoding::encode(term);
        match self {
            Source::Arxiv => format!(
                "https://arxiv.org/search/advanced?advanced=&terms-0-operator=AND\
                 &terms-0-term={term}&terms-0-field=all\
                 &classification-physics_archives=all&classification-include_cross_list=include\
                 &date-filter_by=specific_year&date-year={year}\
                 &date-from_date={year}-01-01&date-to_date={year}-12-31\
                 &date-date_type=submitted_date&abstracts=hide&size=50&order=-submitted_date"
            ),
            Source::Base => format!(
                "https://www.base-search.net/Search/Results?type=all&lookfor={term}+year%3A{year}\
                 &ling=0&oaboost=1&name=&thes=&refid=dcresde&newsearch=1"
            ),
        }
    }
}

/// Build the search URL for a provider given by name.
///
/// The year is checked first. A name that is not in the registry yields an
/// empty string rather than an error.
pub fn build_url(source_name: &str, term: &str, year: i32) -> Result<String> {
    check_year(year)?;

    match Source::from_name(source_name) {
        Ok(source) => Ok(source.search_url(term, year)),
        Err(_) => Ok(String::new()),
    }
}
