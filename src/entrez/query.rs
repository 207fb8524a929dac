//! Query shaping for protein-annotation searches.
//!
//! The query policy is fixed: candidate terms are matched against record
//! titles, restricted to the phage domain, stripped of low-confidence
//! annotation keywords, and bounded by sequence length. [`build_query`] is a
//! pure function so the policy can be tested without touching the network.

use std::fmt::Write;

/// Domain filter every query is intersected with.
pub const REQUIRED_TITLE_TERM: &str = "phage[Title]";

/// Hedge words that mark low-confidence annotations; every query excludes
/// titles containing any of them. "putitive" is a common database typo for
/// "putative" and is excluded alongside it.
pub const EXCLUDED_TITLE_TERMS: [&str; 6] = [
    "hypothetical",
    "putative",
    "putitive",
    "probable",
    "possible",
    "unknown",
];

/// Sequence-length bound applied to every query.
pub const SEQUENCE_LENGTH_FILTER: &str = "50:1000000[SLEN]";

/// Builds the Entrez term string for a job's search terms.
///
/// Terms are OR-joined and scoped to the title field, then intersected with
/// [`REQUIRED_TITLE_TERM`], the negated [`EXCLUDED_TITLE_TERMS`], and
/// [`SEQUENCE_LENGTH_FILTER`].
///
/// # Example
///
/// ```
/// use harvester_core::entrez::build_query;
///
/// let query = build_query(&["terminase".to_string(), "portal".to_string()]);
/// assert!(query.starts_with("(terminase[Title] OR portal[Title])"));
/// ```
#[must_use]
pub fn build_query(terms: &[String]) -> String {
    let scoped: Vec<String> = terms.iter().map(|term| format!("{term}[Title]")).collect();

    let mut query = format!("({}) AND {REQUIRED_TITLE_TERM}", scoped.join(" OR "));
    for excluded in EXCLUDED_TITLE_TERMS {
        // write! to a String cannot fail
        let _ = write!(query, " NOT {excluded}[Title]");
    }
    let _ = write!(query, " AND {SEQUENCE_LENGTH_FILTER}");
    query
}
