//! AMA style.
//!
//! Clauses are separated by periods rather than APA's parenthesized date; the
//! publication year sits inside the journal clause (`Nature. 2013;500(7461):123-126.`).

use super::parsers::{NameFormat, capitalize, parse_date, parse_page, parse_year, title_case};
use super::{Clause, Composition, FieldSet, StyleFormatter, Truncation, format_authors, with_period};
use crate::{ReferenceKind, Style};

pub const CONFERENCE_PREFIX: &str = "Paper presented at: ";

pub static COMPOSITION: Composition = Composition {
    names: NameFormat {
        surname_sep: " ",
        initial_sep: "",
        initial_suffix: "",
    },
    truncation: Truncation::EtAl { max: 6, keep: 3 },
    with_author: &[Clause::Authors, Clause::Title, Clause::Tail],
    without_author: &[Clause::Title, Clause::Tail],
};

pub struct Ama;

impl StyleFormatter for Ama {
    fn style(&self) -> Style {
        Style::Ama
    }

    fn composition(&self) -> &'static Composition {
        &COMPOSITION
    }

    fn clause(
        &self,
        clause: Clause,
        kind: ReferenceKind,
        fields: &FieldSet<'_>,
        abbrev: Option<&str>,
    ) -> String {
        match (clause, kind) {
            (Clause::Authors, _) => self.authors(fields),
            // The year lives in the journal clause.
            (Clause::Date, _) => String::new(),
            (Clause::Title, _) => gen_title(fields.article_title),
            (Clause::Tail, ReferenceKind::Journal) => {
                let mut year = parse_year(fields.pub_year);
                if year.is_empty() {
                    year = parse_year(fields.pub_date);
                }
                let name = abbrev.unwrap_or(fields.pub_name);
                gen_journal(
                    name,
                    &year,
                    fields.volume,
                    fields.issue,
                    fields.begin_page,
                    fields.end_page,
                )
            }
            (Clause::Tail, ReferenceKind::Conference) => gen_conf(
                fields.conf_title,
                &parse_date(fields.conf_date),
                fields.conf_location,
            ),
        }
    }
}

/// `Smith JA, Doe B.`, truncated to the first three plus "et al" beyond six.
pub fn gen_author(author: &str, group_author: &str) -> String {
    format_authors(author, group_author, &COMPOSITION)
}

pub fn gen_title(title: &str) -> String {
    if title.is_empty() {
        return String::new();
    }
    with_period(format!(" {}", capitalize(title)))
}

/// ` Journal. year;volume(issue):pages.`
///
/// `title` is the journal name or its abbreviation.
pub fn gen_journal(
    title: &str,
    year: &str,
    volume: &str,
    issue: &str,
    begin_page: &str,
    end_page: &str,
) -> String {
    if title.is_empty() {
        return String::new();
    }

    let volume_issue = match (volume.is_empty(), issue.is_empty()) {
        (false, false) => format!("{volume}({issue})"),
        (false, true) => volume.to_string(),
        (true, false) => format!("({issue})"),
        (true, true) => String::new(),
    };
    let pages = parse_page(begin_page, end_page);

    let mut locator = year.to_string();
    for (sep, part) in [(';', volume_issue), (':', pages)] {
        if part.is_empty() {
            continue;
        }
        if !locator.is_empty() {
            locator.push(sep);
        }
        locator.push_str(&part);
    }

    let mut ret = with_period(format!(" {}", title_case(title)));
    if !locator.is_empty() {
        ret.push(' ');
        ret.push_str(&locator);
    }
    with_period(ret)
}

/// ` Paper presented at: Conference; Mon DD, YYYY; Location.`
pub fn gen_conf(title: &str, date: &str, location: &str) -> String {
    if title.is_empty() {
        return String::new();
    }
    let mut ret = format!(" {CONFERENCE_PREFIX}{title}");
    for part in [date, location] {
        if !part.is_empty() {
            ret.push_str("; ");
            ret.push_str(part);
        }
    }
    with_period(ret)
}
