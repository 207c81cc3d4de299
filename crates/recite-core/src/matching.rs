use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalize::{NormalizeOptions, normalize_doi, normalize_with};

/// A DOI clause: `doi:` prefix or a doi.org resolver URL followed by the DOI token.
static DOI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:doi:[ \t]*|(?:https?://)?(?:dx\.)?doi\.org/)(\S+)").unwrap()
});

/// Trim trailing sentence punctuation and unbalanced closing brackets from a DOI token.
///
/// Balanced brackets stay: `10.1016/0021-9681(87)90171-8` is a valid DOI.
pub fn clean_doi(doi: &str) -> &str {
    const TRAILING: [char; 4] = ['.', ',', ';', ':'];
    let mut doi = doi.trim_end_matches(TRAILING);

    loop {
        let unbalanced = [('(', ')'), ('[', ']'), ('{', '}')]
            .into_iter()
            .any(|(open, close)| {
                doi.ends_with(close) && doi.matches(close).count() > doi.matches(open).count()
            });
        if !unbalanced {
            break;
        }
        doi = doi[..doi.len() - 1].trim_end_matches(TRAILING);
    }

    doi
}

/// Byte range of the first DOI clause in `text` (prefix included), plus the cleaned DOI.
pub(crate) fn find_doi_clause(text: &str) -> Option<(std::ops::Range<usize>, &str)> {
    let caps = DOI_RE.captures(text)?;
    let whole = caps.get(0)?;
    let token = caps.get(1)?;
    let doi = clean_doi(token.as_str());
    if doi.is_empty() {
        return None;
    }
    Some((whole.start()..whole.end(), doi))
}

/// Extract the first DOI found in a candidate citation.
///
/// Handles formats like:
/// - `doi:10.1234/example`
/// - `https://doi.org/10.1234/example`
/// - `http://dx.doi.org/10.1234/example`
/// - `doi.org/10.1234/example`
pub fn extract_doi(text: &str) -> Option<String> {
    find_doi_clause(text).map(|(_, doi)| doi.to_string())
}

/// Check a candidate's DOI against a set of already-normalized DOIs.
///
/// Returns the matched (normalized) DOI. Candidates without a DOI clause never match.
pub fn match_doi(candidate: &str, known_dois: &HashSet<String>) -> Option<String> {
    let doi = normalize_doi(&extract_doi(candidate)?);
    if known_dois.contains(&doi) {
        tracing::debug!(doi = %doi, "DOI match");
        Some(doi)
    } else {
        None
    }
}

/// Closest citation found by [`match_fuzzy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyHit {
    pub distance: usize,
    /// Position of the closest citation in the searched collection.
    pub index: usize,
}

impl FuzzyHit {
    pub fn is_exact(&self) -> bool {
        self.distance == 0
    }
}

/// Character-level Levenshtein distance.
pub fn edit_distance(a: &str, b: &str) -> usize {
    rapidfuzz::distance::levenshtein::distance(a.chars(), b.chars())
}

/// Normalization applied to both sides of a fuzzy comparison.
pub fn fuzzy_key(text: &str) -> String {
    normalize_with(text, NormalizeOptions::FUZZY)
}

/// Find the citation with the minimal edit distance to `candidate`.
///
/// Both sides are case-folded and whitespace-collapsed first. Returns `None`
/// when nothing is within `max_distance`.
pub fn match_fuzzy<S: AsRef<str>>(
    candidate: &str,
    citations: &[S],
    max_distance: usize,
) -> Option<FuzzyHit> {
    let keys: Vec<String> = citations.iter().map(|c| fuzzy_key(c.as_ref())).collect();
    closest_normalized(&fuzzy_key(candidate), keys.iter().map(String::as_str), max_distance)
}

/// Like [`match_fuzzy`] but over keys that already went through [`fuzzy_key`].
pub fn closest_normalized<'a, I>(candidate: &str, keys: I, max_distance: usize) -> Option<FuzzyHit>
where
    I: IntoIterator<Item = &'a str>,
{
    let candidate_len = candidate.chars().count();
    let mut best: Option<FuzzyHit> = None;

    for (index, key) in keys.into_iter().enumerate() {
        let bound = best.map_or(max_distance, |b| b.distance.saturating_sub(1));
        // Length difference is a lower bound on the edit distance.
        if candidate_len.abs_diff(key.chars().count()) > bound {
            continue;
        }
        let distance = edit_distance(candidate, key);
        if distance <= bound {
            best = Some(FuzzyHit { distance, index });
            if distance == 0 {
                break;
            }
        }
    }

    best
}
