//! Marks citations of retracted articles inside free text.

use std::ops::Range;

use crate::config::MatchConfig;
use crate::corpus::Corpus;
use crate::extract::CitationExtractor;
use crate::{Candidate, MatchOutcome, MatchResult};

pub const EXACT_OPEN: &str = r#"<mark class="exact-match">"#;
pub const APPROX_OPEN: &str = r#"<mark class="approx-match">"#;
pub const MARK_CLOSE: &str = "</mark>";

/// Result of annotating a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Nothing in the text looked like a citation.
    NoCandidates,
    Annotated(AnnotatedText),
}

impl Annotation {
    /// The output text: annotated, or the input unchanged when there were no candidates.
    pub fn text_or<'a>(&'a self, input: &'a str) -> &'a str {
        match self {
            Annotation::NoCandidates => input,
            Annotation::Annotated(annotated) => &annotated.text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedText {
    pub text: String,
    /// One entry per candidate, in extraction order.
    pub results: Vec<MatchResult>,
}

impl AnnotatedText {
    pub fn exact_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.marked && r.outcome.is_exact())
            .count()
    }

    pub fn approximate_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.marked && r.outcome.is_approximate())
            .count()
    }

    pub fn has_matches(&self) -> bool {
        self.results.iter().any(|r| r.marked)
    }
}

pub struct MatchAnnotator {
    extractor: CitationExtractor,
    config: MatchConfig,
}

impl MatchAnnotator {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            extractor: CitationExtractor::default(),
            config,
        }
    }

    pub fn with_extractor(mut self, extractor: CitationExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// DOI match first, then fuzzy match within the configured distance.
    pub fn match_candidate(&self, candidate: &Candidate, corpus: &Corpus) -> MatchOutcome {
        if let Some(doi) = corpus.match_doi(&candidate.text) {
            return MatchOutcome::DoiExact { doi };
        }
        match corpus.closest(&candidate.text, self.config.max_edit_distance) {
            Some((hit, citation)) if hit.is_exact() => MatchOutcome::FuzzyExact {
                article_id: citation.article_id,
            },
            Some((hit, citation)) => MatchOutcome::FuzzyApproximate {
                distance: hit.distance,
                article_id: citation.article_id,
            },
            None => MatchOutcome::NoMatch,
        }
    }

    /// Extract candidates, match each against the corpus, and wrap matches in markup.
    pub fn annotate(&self, text: &str, corpus: &Corpus) -> Annotation {
        let candidates = self.extractor.extract(text);
        if candidates.is_empty() {
            tracing::debug!("no citation candidates found");
            return Annotation::NoCandidates;
        }

        let mut marks: Vec<(Range<usize>, &'static str)> = Vec::new();
        let mut results = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let outcome = self.match_candidate(&candidate, corpus);
            let open = match &outcome {
                MatchOutcome::DoiExact { .. } | MatchOutcome::FuzzyExact { .. } => Some(EXACT_OPEN),
                MatchOutcome::FuzzyApproximate { .. } => Some(APPROX_OPEN),
                MatchOutcome::NoMatch => None,
            };

            let marked = match open {
                Some(open) if !overlaps(&marks, &candidate.span) => {
                    marks.push((candidate.span.clone(), open));
                    true
                }
                Some(_) => {
                    tracing::debug!(
                        start = candidate.span.start,
                        end = candidate.span.end,
                        "skipping match overlapping an earlier mark"
                    );
                    false
                }
                None => false,
            };

            tracing::debug!(
                grammar = candidate.grammar.as_str(),
                outcome = ?outcome,
                marked,
                "candidate matched"
            );
            results.push(MatchResult {
                candidate,
                outcome,
                marked,
            });
        }

        Annotation::Annotated(AnnotatedText {
            text: apply_marks(text, marks),
            results,
        })
    }
}

fn overlaps(marks: &[(Range<usize>, &'static str)], span: &Range<usize>) -> bool {
    marks
        .iter()
        .any(|(m, _)| m.start < span.end && span.start < m.end)
}

/// Copy unmarked text through and wrap each marked span.
fn apply_marks(text: &str, mut marks: Vec<(Range<usize>, &'static str)>) -> String {
    marks.sort_by_key(|(span, _)| span.start);
    let mut out = String::with_capacity(text.len() + marks.len() * 40);
    let mut pos = 0;
    for (span, open) in marks {
        out.push_str(&text[pos..span.start]);
        out.push_str(open);
        out.push_str(&text[span.clone()]);
        out.push_str(MARK_CLOSE);
        pos = span.end;
    }
    out.push_str(&text[pos..]);
    out
}

/// Annotate with the default extractor.
pub fn annotate(text: &str, corpus: &Corpus, config: MatchConfig) -> Annotation {
    MatchAnnotator::new(config).annotate(text, corpus)
}
