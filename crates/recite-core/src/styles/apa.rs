//! APA style.

use super::parsers::{NameFormat, capitalize, parse_page, parse_year, title_case};
use super::{Clause, Composition, FieldSet, StyleFormatter, Truncation, format_authors, with_period};
use crate::{ReferenceKind, Style};

pub const CONFERENCE_PREFIX: &str = "Paper presented at ";

pub static COMPOSITION: Composition = Composition {
    names: NameFormat {
        surname_sep: ", ",
        initial_sep: " ",
        initial_suffix: ".",
    },
    truncation: Truncation::Ellipsis { max: 7, keep: 6 },
    with_author: &[Clause::Authors, Clause::Date, Clause::Title, Clause::Tail],
    without_author: &[Clause::Title, Clause::Date, Clause::Tail],
};

pub struct Apa;

impl StyleFormatter for Apa {
    fn style(&self) -> Style {
        Style::Apa
    }

    fn composition(&self) -> &'static Composition {
        &COMPOSITION
    }

    fn clause(
        &self,
        clause: Clause,
        kind: ReferenceKind,
        fields: &FieldSet<'_>,
        _abbrev: Option<&str>,
    ) -> String {
        match (clause, kind) {
            (Clause::Authors, _) => self.authors(fields),
            (Clause::Date, ReferenceKind::Journal) => gen_date(fields.pub_date, fields.pub_year),
            (Clause::Date, ReferenceKind::Conference) => gen_date(fields.conf_date, ""),
            (Clause::Title, ReferenceKind::Journal) => {
                gen_title(fields.article_title, fields.special_issue)
            }
            (Clause::Title, ReferenceKind::Conference) => gen_title(fields.article_title, ""),
            (Clause::Tail, ReferenceKind::Journal) => gen_journal(
                fields.pub_name,
                fields.volume,
                fields.issue,
                fields.begin_page,
                fields.end_page,
            ),
            (Clause::Tail, ReferenceKind::Conference) => {
                gen_conf(fields.conf_title, fields.conf_location)
            }
        }
    }
}

/// `Smith, J. A., & Doe, B.`
pub fn gen_author(author: &str, group_author: &str) -> String {
    format_authors(author, group_author, &COMPOSITION)
}

/// ` (2013).` from the year field, falling back to the date field.
pub fn gen_date(date: &str, year: &str) -> String {
    let mut parsed = parse_year(year);
    if parsed.is_empty() {
        parsed = parse_year(date);
    }
    if parsed.is_empty() {
        String::new()
    } else {
        format!(" ({parsed}).")
    }
}

/// ` Title [special issue].`
pub fn gen_title(title: &str, special_issue: &str) -> String {
    if title.is_empty() {
        return String::new();
    }
    let mut ret = format!(" {}", capitalize(title));
    if !special_issue.is_empty() {
        ret.push_str(&format!(" [{special_issue}]"));
    }
    with_period(ret)
}

/// ` Journal, volume(issue), pages.`
pub fn gen_journal(
    title: &str,
    volume: &str,
    issue: &str,
    begin_page: &str,
    end_page: &str,
) -> String {
    if title.is_empty() {
        return String::new();
    }
    let mut ret = format!(" {}", title_case(title));
    match (volume.is_empty(), issue.is_empty()) {
        (false, false) => ret.push_str(&format!(", {volume}({issue})")),
        (false, true) => ret.push_str(&format!(", {volume}")),
        (true, false) => ret.push_str(&format!(", ({issue})")),
        (true, true) => {}
    }
    if !begin_page.is_empty() {
        ret.push_str(", ");
        ret.push_str(&parse_page(begin_page, end_page));
    }
    with_period(ret)
}

/// ` Paper presented at Conference, Location.`
pub fn gen_conf(title: &str, location: &str) -> String {
    if title.is_empty() && location.is_empty() {
        return String::new();
    }
    let place = [title, location]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    with_period(format!(" {CONFERENCE_PREFIX}{place}"))
}

/// ` doi:<doi>`
pub fn gen_doi(doi: &str) -> String {
    if doi.is_empty() {
        String::new()
    } else {
        format!(" doi:{doi}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArticleRecord;

    fn journal_record() -> ArticleRecord {
        ArticleRecord {
            id: 1,
            author: "SMITH, JA; Doe, B".into(),
            article_title: "A STUDY of things (Retracted article. See vol 3, pg 1)".into(),
            pub_name: "NATURE".into(),
            pub_year: "2013".into(),
            volume: "500".into(),
            issue: "7461".into(),
            begin_page: "123".into(),
            end_page: "126".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_gen_journal() {
        assert_eq!(
            gen_journal("Nature", "500", "7461", "123", "126"),
            " Nature, 500(7461), 123-126."
        );
    }

    #[test]
    fn test_gen_journal_open_ended_pages() {
        assert_eq!(
            gen_journal("Nature", "500", "7461", "123", "+"),
            " Nature, 500(7461), 123."
        );
    }

    #[test]
    fn test_gen_journal_partial_fields() {
        assert_eq!(gen_journal("nature", "500", "", "", ""), " Nature, 500.");
        assert_eq!(gen_journal("Nature", "", "12", "", ""), " Nature, (12).");
        assert_eq!(gen_journal("", "500", "1", "1", "2"), "");
    }

    #[test]
    fn test_gen_date_prefers_year() {
        assert_eq!(gen_date("JAN 2010", "2011"), " (2011).");
        assert_eq!(gen_date("JAN 2010", ""), " (2010).");
        assert_eq!(gen_date("", ""), "");
    }

    #[test]
    fn test_gen_title() {
        assert_eq!(gen_title("a STUDY", ""), " A study.");
        assert_eq!(gen_title("a study", "SI"), " A study [SI].");
        assert_eq!(gen_title("Done.", ""), " Done.");
        assert_eq!(gen_title("", "SI"), "");
    }

    #[test]
    fn test_gen_conf() {
        assert_eq!(
            gen_conf("Intl Conf on Things", "Boston, MA"),
            " Paper presented at Intl Conf on Things, Boston, MA."
        );
        assert_eq!(gen_conf("Conf", ""), " Paper presented at Conf.");
        assert_eq!(gen_conf("", ""), "");
    }

    #[test]
    fn test_gen_doi() {
        assert_eq!(gen_doi("10.1000/xyz"), " doi:10.1000/xyz");
        assert_eq!(gen_doi(""), "");
    }

    #[test]
    fn test_gen_author_group() {
        assert_eq!(
            gen_author("Smith, J", "world health organization"),
            "Smith, J., & World Health Organization."
        );
        assert_eq!(gen_author("", ""), "");
    }

    #[test]
    fn test_journal_citation() {
        let record = journal_record();
        let fields = FieldSet::from_record(&record);
        assert_eq!(
            Apa.format(ReferenceKind::Journal, &fields, None),
            "Smith, J. A., & Doe, B. (2013). A study of things. Nature, 500(7461), 123-126."
        );
        assert_eq!(Apa.format(ReferenceKind::Conference, &fields, None), "");
    }

    #[test]
    fn test_no_author_template_is_title_led() {
        let record = ArticleRecord {
            author: String::new(),
            ..journal_record()
        };
        let fields = FieldSet::from_record(&record);
        assert_eq!(
            Apa.format(ReferenceKind::Journal, &fields, None),
            "A study of things. (2013). Nature, 500(7461), 123-126."
        );
    }

    #[test]
    fn test_conference_citation() {
        let record = ArticleRecord {
            author: "Lee, K".into(),
            article_title: "Robust widgets".into(),
            conf_title: "Widget Symposium".into(),
            conf_date: "MAY 30-JUN 02, 2016".into(),
            conf_location: "Austin, TX".into(),
            ..Default::default()
        };
        let formatted = Apa.format_all(&FieldSet::from_record(&record), None);
        assert_eq!(formatted.journal, "Lee, K. Robust widgets.");
        assert_eq!(
            formatted.conference,
            "Lee, K. (2016). Robust widgets. Paper presented at Widget Symposium, Austin, TX."
        );
    }
}
