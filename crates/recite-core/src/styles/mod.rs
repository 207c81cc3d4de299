//! Citation formatters.
//!
//! A style is a [`Composition`] table (author rules, truncation rule, clause
//! order) plus clause functions. Clauses produce their own leading space and
//! trailing punctuation, so a citation is the plain concatenation of its
//! clauses.

pub mod ama;
pub mod apa;
pub mod parsers;

use crate::{ArticleRecord, ReferenceKind, Style};
use parsers::{NameFormat, parse_author, strip_retraction_notice, title_case};

/// Immutable, trimmed view of the record fields a formatter reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldSet<'a> {
    pub author: &'a str,
    pub group_author: &'a str,
    /// Title with any trailing retraction notice removed.
    pub article_title: &'a str,
    pub pub_name: &'a str,
    pub pub_date: &'a str,
    pub pub_year: &'a str,
    pub volume: &'a str,
    pub issue: &'a str,
    pub special_issue: &'a str,
    pub begin_page: &'a str,
    pub end_page: &'a str,
    pub conf_title: &'a str,
    pub conf_date: &'a str,
    pub conf_location: &'a str,
    pub doi: &'a str,
}

impl<'a> FieldSet<'a> {
    pub fn from_record(record: &'a ArticleRecord) -> Self {
        Self {
            author: record.author.trim(),
            group_author: record.group_author.trim(),
            article_title: strip_retraction_notice(record.article_title.trim()).trim_end(),
            pub_name: record.pub_name.trim(),
            pub_date: record.pub_date.trim(),
            pub_year: record.pub_year.trim(),
            volume: record.volume.trim(),
            issue: record.issue.trim(),
            special_issue: record.special_issue.trim(),
            begin_page: record.begin_page.trim(),
            end_page: record.end_page.trim(),
            conf_title: record.conf_title.trim(),
            conf_date: record.conf_date.trim(),
            conf_location: record.conf_location.trim(),
            doi: record.doi.trim(),
        }
    }

    pub fn has_author(&self) -> bool {
        !self.author.is_empty() || !self.group_author.is_empty()
    }

    /// Whether a citation of this kind can be generated at all.
    pub fn supports(&self, kind: ReferenceKind) -> bool {
        match kind {
            ReferenceKind::Journal => !self.article_title.is_empty(),
            ReferenceKind::Conference => !self.conf_title.is_empty(),
        }
    }
}

/// A clause slot in a style template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Authors,
    Date,
    Title,
    /// Journal or conference information.
    Tail,
}

/// Author list truncation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncation {
    /// More than `max` authors: the first `keep`, an ellipsis, then the last.
    /// Otherwise the final author is joined with `&`.
    Ellipsis { max: usize, keep: usize },
    /// More than `max` authors: the first `keep` followed by "et al".
    EtAl { max: usize, keep: usize },
}

/// Per-style composition table.
#[derive(Debug, Clone, Copy)]
pub struct Composition {
    pub names: NameFormat,
    pub truncation: Truncation,
    pub with_author: &'static [Clause],
    /// Title-led template used when the record has no author.
    pub without_author: &'static [Clause],
}

/// Journal- and conference-style citations of one record in one style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Formatted {
    pub journal: String,
    pub conference: String,
}

pub trait StyleFormatter: Send + Sync {
    fn style(&self) -> Style;

    fn composition(&self) -> &'static Composition;

    /// Render a non-author clause. `abbrev` is the abbreviated journal title, if known.
    fn clause(
        &self,
        clause: Clause,
        kind: ReferenceKind,
        fields: &FieldSet<'_>,
        abbrev: Option<&str>,
    ) -> String;

    fn authors(&self, fields: &FieldSet<'_>) -> String {
        format_authors(fields.author, fields.group_author, self.composition())
    }

    /// Citation of one kind, or an empty string if the record lacks that kind.
    fn format(&self, kind: ReferenceKind, fields: &FieldSet<'_>, abbrev: Option<&str>) -> String {
        if !fields.supports(kind) {
            return String::new();
        }

        let composition = self.composition();
        let template = if fields.has_author() {
            composition.with_author
        } else {
            composition.without_author
        };

        let mut out = String::new();
        for &clause in template {
            match clause {
                Clause::Authors => out.push_str(&self.authors(fields)),
                other => out.push_str(&self.clause(other, kind, fields, abbrev)),
            }
        }
        finish(&out)
    }

    fn format_all(&self, fields: &FieldSet<'_>, abbrev: Option<&str>) -> Formatted {
        Formatted {
            journal: self.format(ReferenceKind::Journal, fields, abbrev),
            conference: self.format(ReferenceKind::Conference, fields, abbrev),
        }
    }
}

/// The formatter for a style.
pub fn formatter(style: Style) -> &'static dyn StyleFormatter {
    match style {
        Style::Apa => &apa::Apa,
        Style::Ama => &ama::Ama,
    }
}

/// Parse the author field, append the group author, and apply the style's truncation.
pub fn format_authors(author: &str, group_author: &str, composition: &Composition) -> String {
    let mut authors = parse_author(author, &composition.names);
    if !group_author.is_empty() {
        authors.push(title_case(group_author));
    }
    join_authors(&authors, composition.truncation)
}

pub fn join_authors(authors: &[String], truncation: Truncation) -> String {
    let n = authors.len();
    let joined = match (truncation, n) {
        (_, 0) => return String::new(),
        (_, 1) => authors[0].clone(),
        (Truncation::Ellipsis { max, keep }, n) if n > max => {
            format!("{}, ... {}", authors[..keep].join(", "), authors[n - 1])
        }
        (Truncation::Ellipsis { .. }, n) => {
            format!("{}, & {}", authors[..n - 1].join(", "), authors[n - 1])
        }
        (Truncation::EtAl { max, keep }, n) if n > max => {
            format!("{}, et al", authors[..keep].join(", "))
        }
        (Truncation::EtAl { .. }, _) => authors.join(", "),
    };
    with_period(joined)
}

/// Append a period unless the text already ends with one.
pub(crate) fn with_period(mut text: String) -> String {
    if !text.ends_with('.') {
        text.push('.');
    }
    text
}

/// Trim, and end with exactly one period (or stay empty).
pub(crate) fn finish(text: &str) -> String {
    let body = text.trim().trim_end_matches('.').trim_end();
    if body.is_empty() {
        String::new()
    } else {
        format!("{body}.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Author{i}")).collect()
    }

    #[test]
    fn test_join_authors_ampersand() {
        let apa = Truncation::Ellipsis { max: 7, keep: 6 };
        assert_eq!(join_authors(&names(1), apa), "Author0.");
        assert_eq!(join_authors(&names(2), apa), "Author0, & Author1.");
        assert_eq!(
            join_authors(&names(7), apa),
            "Author0, Author1, Author2, Author3, Author4, Author5, & Author6."
        );
    }

    #[test]
    fn test_join_authors_ellipsis() {
        let apa = Truncation::Ellipsis { max: 7, keep: 6 };
        assert_eq!(
            join_authors(&names(9), apa),
            "Author0, Author1, Author2, Author3, Author4, Author5, ... Author8."
        );
    }

    #[test]
    fn test_join_authors_et_al() {
        let ama = Truncation::EtAl { max: 6, keep: 3 };
        assert_eq!(
            join_authors(&names(6), ama),
            "Author0, Author1, Author2, Author3, Author4, Author5."
        );
        assert_eq!(
            join_authors(&names(7), ama),
            "Author0, Author1, Author2, et al."
        );
    }

    #[test]
    fn test_join_authors_empty() {
        assert_eq!(join_authors(&[], Truncation::EtAl { max: 6, keep: 3 }), "");
    }

    #[test]
    fn test_finish() {
        assert_eq!(finish("  Smith, J. (2020). Title..  "), "Smith, J. (2020). Title.");
        assert_eq!(finish("Title"), "Title.");
        assert_eq!(finish(" . "), "");
        assert_eq!(finish(""), "");
    }

    #[test]
    fn test_field_set_trims_and_strips_notice() {
        let record = ArticleRecord {
            author: "  Smith, J ".into(),
            article_title: " A study (Retracted article. See vol 1) ".into(),
            conf_title: "   ".into(),
            ..Default::default()
        };
        let fields = FieldSet::from_record(&record);
        assert_eq!(fields.author, "Smith, J");
        assert_eq!(fields.article_title, "A study");
        assert!(fields.has_author());
        assert!(fields.supports(ReferenceKind::Journal));
        assert!(!fields.supports(ReferenceKind::Conference));
    }

    #[test]
    fn test_formatter_lookup() {
        assert_eq!(formatter(Style::Apa).style(), Style::Apa);
        assert_eq!(formatter(Style::Ama).style(), Style::Ama);
    }
}
