use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

fn bracketed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(.*?)\]").expect("static pattern"))
}

/// Parse a batch file of the form `[query one, query two, query three]`.
///
/// Only the first bracketed list counts, and it must sit on one line.
/// Returns `None` when the text has no bracketed list at all.
pub fn parse_query_list(content: &str) -> Option<Vec<String>> {
    let inner = bracketed().captures(content)?.get(1)?.as_str();
    Some(inner.split(", ").map(str::to_string).collect())
}

/// Distinct queries of a batch plus what was left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupedQueries {
    pub unique: Vec<String>,
    /// Exact repeats of an earlier query.
    pub duplicates: usize,
    /// Blank items, which cannot be searched for.
    pub blank: usize,
}

/// Collapse exact duplicates, keeping first-occurrence order.
///
/// Queries are compared byte for byte, so `"Song A"` and `" Song A"` are two
/// jobs. Blank items are skipped and counted separately.
pub fn dedup_queries(queries: &[String]) -> DedupedQueries {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = DedupedQueries::default();

    for q in queries {
        if q.trim().is_empty() {
            out.blank += 1;
        } else if seen.insert(q.as_str()) {
            out.unique.push(q.clone());
        } else {
            out.duplicates += 1;
        }
    }

    out
}
