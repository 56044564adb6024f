//! Result-count extraction from provider result pages.
//!
//! Both providers render the number of hits inside a free-text heading.
//! The two parsers are tuned independently and deliberately keep their own
//! strictness rules:
//!
//! | Condition                    | arxiv           | base            |
//! |------------------------------|-----------------|-----------------|
//! | structural marker missing    | `Parse` error   | `0`             |
//! | heading element missing      | `Parse` error   | `Parse` error   |
//! | explicit "no results" page   | `0`             | `0`             |
//! | malformed query page         | `Query` error   | n/a             |
//! | heading text not a number    | `0` (logged)    | `0` (logged)    |

use crate::error::{OptionExt, PubcountError, Result};
use crate::source::Source;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// Pages this short cannot be a result page
const MIN_BODY_LEN: usize = 100;

const ARXIV_TITLE_MARKER: &str = "class=\"title";
const ARXIV_NO_RESULTS: &str = "Sorry, your query returned no results";
const ARXIV_WHOOPS: &str = "Whoops! Something went wrong";

const BASE_NO_DOCUMENTS: &str = "No documents found.";
const BASE_HEADING_MARKER: &str = "class=\"heading";

/// Extract the result count from a provider's result page.
pub fn extract_count(source: Source, html: &str) -> Result<u64> {
    match source {
        Source::Arxiv => extract_arxiv_count(html),
        Source::Base => extract_base_count(html),
    }
}

/// Parse an arXiv advanced-search page.
///
/// The count lives in `h1.title`, e.g. `Showing 1–50 of 1,234 results for ...`.
pub fn extract_arxiv_count(html: &str) -> Result<u64> {
    check_body_len(html)?;
    if !html.contains(ARXIV_TITLE_MARKER) {
        return Err(PubcountError::Parse(
            "arxiv page must contain an element with class title".to_string(),
        ));
    }

    let document = Html::parse_document(html);
    let selector = selector("h1.title")?;
    let title = document
        .select(&selector)
        .next()
        .ok_or_parse("no h1.title element on arxiv page")?;
    let text = element_text(title);

    if text.contains(ARXIV_NO_RESULTS) {
        debug!("arxiv reported no results");
        return Ok(0);
    }

    if text.replace('\n', "").contains(ARXIV_WHOOPS) {
        return Err(PubcountError::Query(
            "Whoops! Something went wrong. Please correct errors in the form below.".to_string(),
        ));
    }

    Ok(lenient_count(
        Source::Arxiv,
        &text,
        text.split("of").nth(1).and_then(first_token),
    ))
}

/// Parse a BASE result page.
///
/// The count lives in `div.heading`, e.g. `56 Ergebnisse in 0.012s`.
pub fn extract_base_count(html: &str) -> Result<u64> {
    check_body_len(html)?;
    if html.contains(BASE_NO_DOCUMENTS) {
        debug!("base reported no documents");
        return Ok(0);
    }
    if !html.contains(BASE_HEADING_MARKER) {
        debug!("base page has no heading marker, treating as empty");
        return Ok(0);
    }

    let document = Html::parse_document(html);
    let selector = selector("div.heading")?;
    let heading = document
        .select(&selector)
        .next()
        .ok_or_parse("heading marker present but no div.heading element on base page")?;
    let text: String = element_text(heading)
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
        .collect();

    Ok(lenient_count(
        Source::Base,
        &text,
        text.split("in").next().and_then(first_token),
    ))
}

fn check_body_len(html: &str) -> Result<()> {
    if html.len() <= MIN_BODY_LEN {
        return Err(PubcountError::InvalidInput(format!(
            "page body must be longer than {} bytes, got {}",
            MIN_BODY_LEN,
            html.len()
        )));
    }
    Ok(())
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| PubcountError::Parse(e.to_string()))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_token(segment: &str) -> Option<&str> {
    segment.split_whitespace().next()
}

/// Turn a candidate token into a count; anything unparseable becomes 0.
fn lenient_count(source: Source, heading: &str, token: Option<&str>) -> u64 {
    let parsed = token
        .ok_or_else(|| "no number in heading".to_string())
        .and_then(|t| t.replace(',', "").parse::<u64>().map_err(|e| e.to_string()));

    match parsed {
        Ok(count) => count,
        Err(e) => {
            warn!(%source, error = %e, heading, "Could not read result count, using 0");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arxiv_page(title: &str) -> String {
        format!(
            r#"<!DOCTYPE html><html lang="en"><head><title>Search | arXiv e-print repository</title></head>
<body><main><div class="content">
<h1 class="title is-clearfix">
    {title}
</h1>
<ol class="breathe-horizontal"></ol>
</div></main></body></html>"#
        )
    }

    fn base_page(body: &str) -> String {
        format!(
            r#"<!DOCTYPE html><html lang="de"><head><title>BASE - Bielefeld Academic Search Engine</title></head>
<body><div id="content">{body}</div></body></html>"#
        )
    }

    #[test]
    fn test_arxiv_count() -> Result<()> {
        let html = arxiv_page(
            "Showing 1&ndash;50 of 1,234 results for all: <span class=\"mathjax\">privacy</span>",
        );
        assert_eq!(extract_count(Source::Arxiv, &html)?, 1234);
        Ok(())
    }

    #[test]
    fn test_arxiv_no_results() -> Result<()> {
        let html = arxiv_page("Sorry, your query returned no results");
        assert_eq!(extract_count(Source::Arxiv, &html)?, 0);
        Ok(())
    }

    #[test]
    fn test_arxiv_whoops_is_query_error() {
        let html = arxiv_page(
            "Whoops! Something went wrong.\n Please correct errors in the form below.",
        );
        assert!(matches!(
            extract_count(Source::Arxiv, &html),
            Err(PubcountError::Query(_))
        ));
    }

    #[test]
    fn test_arxiv_missing_title_marker_is_parse_error() {
        let html = base_page("<p>nothing to see here, this page has no title heading at all</p>");
        assert!(matches!(
            extract_count(Source::Arxiv, &html),
            Err(PubcountError::Parse(_))
        ));
    }

    #[test]
    fn test_arxiv_marker_without_h1_is_parse_error() {
        let html = arxiv_page("x").replace("<h1 class=\"title", "<h2 class=\"title");
        assert!(matches!(
            extract_arxiv_count(&html),
            Err(PubcountError::Parse(_))
        ));
    }

    #[test]
    fn test_arxiv_unparseable_heading_is_zero() -> Result<()> {
        let html = arxiv_page("Showing results of many papers");
        assert_eq!(extract_arxiv_count(&html)?, 0);
        let html = arxiv_page("Search results");
        assert_eq!(extract_arxiv_count(&html)?, 0);
        Ok(())
    }

    #[test]
    fn test_short_body_rejected() {
        assert!(matches!(
            extract_count(Source::Arxiv, "<h1 class=\"title\">x</h1>"),
            Err(PubcountError::InvalidInput(_))
        ));
        assert!(matches!(
            extract_count(Source::Base, "No documents found."),
            Err(PubcountError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_base_no_documents() -> Result<()> {
        let html = base_page(
            "<div class=\"heading\">0 Ergebnisse</div><p>No documents found.</p>",
        );
        assert_eq!(extract_count(Source::Base, &html)?, 0);
        Ok(())
    }

    #[test]
    fn test_base_count() -> Result<()> {
        let html = base_page("<div class=\"heading\">\n\t56 Ergebnisse in 0.012s\r\n</div>");
        assert_eq!(extract_count(Source::Base, &html)?, 56);
        Ok(())
    }

    #[test]
    fn test_base_count_with_separator() -> Result<()> {
        let html = base_page("<div class=\"heading\">12,345 Treffer in 0,2 Sekunden</div>");
        assert_eq!(extract_base_count(&html)?, 12345);
        Ok(())
    }

    #[test]
    fn test_base_missing_marker_is_zero() -> Result<()> {
        let html = base_page("<div class=\"results\">some unrelated content without a heading</div>");
        assert_eq!(extract_base_count(&html)?, 0);
        Ok(())
    }

    #[test]
    fn test_base_marker_without_div_is_parse_error() {
        let html = base_page("<span class=\"heading\">56 Ergebnisse in 0.012s</span>");
        assert!(matches!(
            extract_base_count(&html),
            Err(PubcountError::Parse(_))
        ));
    }

    #[test]
    fn test_base_unparseable_heading_is_zero() -> Result<()> {
        let html = base_page("<div class=\"heading\">Ergebnisse werden geladen</div>");
        assert_eq!(extract_base_count(&html)?, 0);
        Ok(())
    }

    #[test]
    fn test_extract_is_idempotent() -> Result<()> {
        let html = arxiv_page("Showing 1&ndash;50 of 987 results for all: privacy");
        let first = extract_count(Source::Arxiv, &html)?;
        let second = extract_count(Source::Arxiv, &html)?;
        assert_eq!(first, second);
        assert_eq!(first, 987);
        Ok(())
    }
}
