use std::ops::Range;

use serde::{Deserialize, Serialize};

pub mod abbrev;
pub mod annotate;
pub mod config;
pub mod config_file;
pub mod corpus;
pub mod extract;
pub mod generate;
pub mod matching;
pub mod normalize;
pub mod styles;

// Re-export for convenience
pub use abbrev::{AbbreviationResolver, AbbreviationTable, JournalAbbreviator, Partition};
pub use annotate::{AnnotatedText, Annotation, MatchAnnotator, annotate};
pub use config::{ConfigError, DEFAULT_MAX_EDIT_DISTANCE, MatchConfig};
pub use corpus::Corpus;
pub use extract::{CitationExtractor, extract_citations};
pub use generate::CitationGenerator;
pub use matching::{FuzzyHit, extract_doi, match_doi, match_fuzzy};
pub use normalize::{NormalizeOptions, normalize, normalize_doi};

/// A retracted article as handed over by the ingestion side.
///
/// Every text field defaults to an empty string when absent from the input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleRecord {
    pub id: u64,
    /// Raw `Surname, INITIALS; Surname, INITIALS` author list.
    pub author: String,
    pub author_full_name: String,
    /// Organizational author, if any.
    pub group_author: String,
    pub article_title: String,
    /// Journal or periodical name.
    pub pub_name: String,
    pub pub_date: String,
    pub pub_year: String,
    pub volume: String,
    pub issue: String,
    pub special_issue: String,
    pub begin_page: String,
    pub end_page: String,
    pub conf_title: String,
    pub conf_date: String,
    pub conf_location: String,
    pub article_number: String,
    pub doi: String,
    pub index: Option<i64>,
}

/// Citation style family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Apa,
    Ama,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Apa => "apa",
            Style::Ama => "ama",
        }
    }
}

/// Kind of publication a citation points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Journal,
    Conference,
}

/// Style tag attached to a generated citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleTag {
    ApaJournal,
    ApaConference,
    AmaJournal,
    AmaConference,
}

impl StyleTag {
    pub fn new(style: Style, kind: ReferenceKind) -> Self {
        match (style, kind) {
            (Style::Apa, ReferenceKind::Journal) => StyleTag::ApaJournal,
            (Style::Apa, ReferenceKind::Conference) => StyleTag::ApaConference,
            (Style::Ama, ReferenceKind::Journal) => StyleTag::AmaJournal,
            (Style::Ama, ReferenceKind::Conference) => StyleTag::AmaConference,
        }
    }

    pub fn style(&self) -> Style {
        match self {
            StyleTag::ApaJournal | StyleTag::ApaConference => Style::Apa,
            StyleTag::AmaJournal | StyleTag::AmaConference => Style::Ama,
        }
    }

    pub fn kind(&self) -> ReferenceKind {
        match self {
            StyleTag::ApaJournal | StyleTag::AmaJournal => ReferenceKind::Journal,
            StyleTag::ApaConference | StyleTag::AmaConference => ReferenceKind::Conference,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StyleTag::ApaJournal => "apa-journal",
            StyleTag::ApaConference => "apa-conference",
            StyleTag::AmaJournal => "ama-journal",
            StyleTag::AmaConference => "ama-conference",
        }
    }
}

impl std::fmt::Display for StyleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference string belonging to an [`ArticleRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub value: String,
    pub article_id: u64,
    #[serde(default)]
    pub style: Option<StyleTag>,
}

impl Citation {
    pub fn new(value: impl Into<String>, article_id: u64, style: Option<StyleTag>) -> Self {
        Self {
            value: value.into(),
            article_id,
            style,
        }
    }
}

/// Venue clause of an extracted citation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Venue {
    pub kind: ReferenceKind,
    pub span: Range<usize>,
}

/// Byte spans (into the scanned text) of the clauses a grammar recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clauses {
    pub authors: Option<Range<usize>>,
    pub date: Range<usize>,
    pub title: Range<usize>,
    pub venue: Option<Venue>,
    pub doi: Option<Range<usize>>,
}

/// A citation-shaped span of free text, not yet checked against any corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    /// Byte range of `text` within the scanned input.
    pub span: Range<usize>,
    /// Grammar that recognized the span.
    pub grammar: Style,
    pub clauses: Clauses,
}

/// How a candidate matched the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The candidate's DOI is a known DOI.
    DoiExact { doi: String },
    /// Edit distance 0 to a known citation.
    FuzzyExact { article_id: u64 },
    /// Edit distance within the configured threshold.
    FuzzyApproximate { distance: usize, article_id: u64 },
    NoMatch,
}

impl MatchOutcome {
    pub fn is_exact(&self) -> bool {
        matches!(
            self,
            MatchOutcome::DoiExact { .. } | MatchOutcome::FuzzyExact { .. }
        )
    }

    pub fn is_approximate(&self) -> bool {
        matches!(self, MatchOutcome::FuzzyApproximate { .. })
    }

    pub fn is_match(&self) -> bool {
        !matches!(self, MatchOutcome::NoMatch)
    }

    /// Minimal edit distance found, for fuzzy outcomes.
    pub fn distance(&self) -> Option<usize> {
        match self {
            MatchOutcome::FuzzyExact { .. } => Some(0),
            MatchOutcome::FuzzyApproximate { distance, .. } => Some(*distance),
            _ => None,
        }
    }
}

/// The outcome of matching a single candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub candidate: Candidate,
    pub outcome: MatchOutcome,
    /// False when a matched candidate overlapped a span that was already marked.
    pub marked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_tag_parts() {
        for style in [Style::Apa, Style::Ama] {
            for kind in [ReferenceKind::Journal, ReferenceKind::Conference] {
                let tag = StyleTag::new(style, kind);
                assert_eq!(tag.style(), style);
                assert_eq!(tag.kind(), kind);
                assert!(tag.as_str().starts_with(style.as_str()));
            }
        }
        assert_eq!(StyleTag::AmaConference.to_string(), "ama-conference");
    }

    #[test]
    fn test_match_outcome_predicates() {
        let doi = MatchOutcome::DoiExact {
            doi: "10.1000/xyz".into(),
        };
        let exact = MatchOutcome::FuzzyExact { article_id: 1 };
        let approx = MatchOutcome::FuzzyApproximate {
            distance: 2,
            article_id: 1,
        };

        assert!(doi.is_match() && doi.is_exact() && doi.distance().is_none());
        assert!(exact.is_match() && exact.is_exact());
        assert_eq!(exact.distance(), Some(0));
        assert!(approx.is_match() && approx.is_approximate() && !approx.is_exact());
        assert_eq!(approx.distance(), Some(2));
        assert!(!MatchOutcome::NoMatch.is_match());
        assert_eq!(MatchOutcome::NoMatch.distance(), None);
    }
}
