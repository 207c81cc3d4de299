//! Citation-shaped span extraction from free text.
//!
//! Each grammar scans the unmarked parts of the text independently and
//! returns its non-overlapping matches in order of appearance. Regions that
//! are already wrapped in match markup are never scanned, so annotating an
//! annotated text leaves it unchanged.

mod ama;
mod apa;

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Candidate, Style};

pub use ama::AmaGrammar;
pub use apa::ApaGrammar;

static MARKED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<mark class="(?:exact|approx)-match">.*?</mark>"#).unwrap()
});

static DEFAULT_EXTRACTOR: Lazy<CitationExtractor> = Lazy::new(CitationExtractor::default);

/// A citation grammar for one style.
pub trait CitationGrammar: Send + Sync {
    fn style(&self) -> Style;

    /// All non-overlapping matches inside `text[segment]`, in order.
    ///
    /// Spans in the returned candidates are offsets into `text`.
    fn scan(&self, text: &str, segment: Range<usize>) -> Vec<Candidate>;
}

pub struct CitationExtractor {
    grammars: Vec<Box<dyn CitationGrammar>>,
}

impl Default for CitationExtractor {
    fn default() -> Self {
        Self::with_grammars(vec![Box::new(ApaGrammar), Box::new(AmaGrammar)])
    }
}

impl CitationExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grammars(grammars: Vec<Box<dyn CitationGrammar>>) -> Self {
        Self { grammars }
    }

    pub fn styles(&self) -> Vec<Style> {
        self.grammars.iter().map(|g| g.style()).collect()
    }

    /// Every grammar's matches, concatenated in grammar order.
    ///
    /// Not deduplicated: a citation that fits two grammars appears twice.
    pub fn extract(&self, text: &str) -> Vec<Candidate> {
        let segments = unmarked_segments(text);
        let mut candidates = Vec::new();
        for grammar in &self.grammars {
            let before = candidates.len();
            for segment in &segments {
                candidates.extend(grammar.scan(text, segment.clone()));
            }
            tracing::debug!(
                grammar = grammar.style().as_str(),
                found = candidates.len() - before,
                "grammar scan complete"
            );
        }
        candidates
    }
}

/// Extract candidates with the default APA + AMA grammars.
pub fn extract_citations(text: &str) -> Vec<Candidate> {
    DEFAULT_EXTRACTOR.extract(text)
}

/// Byte ranges of `text` outside existing match markup.
pub fn unmarked_segments(text: &str) -> Vec<Range<usize>> {
    let mut segments = Vec::new();
    let mut pos = 0;
    for m in MARKED_RE.find_iter(text) {
        if m.start() > pos {
            segments.push(pos..m.start());
        }
        pos = m.end();
    }
    if pos < text.len() {
        segments.push(pos..text.len());
    }
    segments
}

/// Regex `\w`, on a single char.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    const APA: &str = "Smith, J. (2020). A study. Journal, 1(1), 1-2. doi:10.1000/xyz.";

    #[test]
    fn test_no_citation_shape() {
        assert!(extract_citations("").is_empty());
        assert!(extract_citations("Just some prose without any references at all.").is_empty());
    }

    #[test]
    fn test_unmarked_segments() {
        let text = r#"a <mark class="exact-match">b</mark> c <mark class="approx-match">d</mark>"#;
        let segments = unmarked_segments(text);
        assert_eq!(segments.len(), 2);
        assert_eq!(&text[segments[0].clone()], "a ");
        assert_eq!(&text[segments[1].clone()], " c ");
    }

    #[test]
    fn test_unmarked_segments_other_markup_kept() {
        let text = "<mark>plain</mark>";
        assert_eq!(unmarked_segments(text), vec![0..text.len()]);
    }

    #[test]
    fn test_marked_citation_not_reextracted() {
        let text = format!(r#"<mark class="exact-match">{APA}</mark>"#);
        assert!(extract_citations(&text).is_empty());
    }

    #[test]
    fn test_extract_apa_in_prose() {
        let text = format!("As shown before.\n\n{APA}\n\nMore prose here");
        let candidates = extract_citations(&text);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].grammar, Style::Apa);
        assert_eq!(candidates[0].text, APA);
        assert_eq!(&text[candidates[0].span.clone()], APA);
    }

    #[test]
    fn test_output_grouped_by_grammar() {
        let text = "Smith J. Heat. Nature. 2013;5:1-2.\nDoe, A. (2019). Cold. Science, 3, 4-5.";
        let candidates = extract_citations(text);
        let styles: Vec<Style> = candidates.iter().map(|c| c.grammar).collect();
        assert_eq!(styles, vec![Style::Apa, Style::Ama]);
        assert_eq!(candidates[0].text, "Doe, A. (2019). Cold. Science, 3, 4-5.");
        assert_eq!(candidates[1].text, "Smith J. Heat. Nature. 2013;5:1-2.");
    }

    #[test]
    fn test_extractor_styles() {
        assert_eq!(CitationExtractor::new().styles(), vec![Style::Apa, Style::Ama]);
    }
}
