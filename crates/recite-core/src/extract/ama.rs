//! AMA grammar: one compiled pattern with named clause groups.
//!
//! Journal form: `Authors. Title. Journal. 2013;500(7461):123-126.`
//! Conference form: `Authors. Title. Paper presented at: Conf; Jun 5-7, 2015; City.`
//! Both may be followed by a DOI clause. Matches start at a line start.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::CitationGrammar;
use crate::{Candidate, Clauses, ReferenceKind, Style, Venue};

static AMA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?im)^(?P<cite>",
        r"(?P<authors>[\w-]{2,}(?: +[a-z]+)?(?: *, *[\w-]{2,}(?: +[a-z]+)?)* *\.)?",
        // A one-letter leading word ("A study", "J Am Chem Soc") needs a second word.
        r"(?P<title> *\w(?:\w| +\w)[^\n;.]*\.)",
        r"(?P<venue> *\w(?:\w| +\w)[^\n;.]*)",
        r"(?:",
        r"\.(?P<jdate> *(?:[a-z]{3}(?: +\d{1,2})? *, *)?\d{4})",
        r"(?P<volume> *;(?: *\d+)?(?: *\( *[\w-]+ *\))?)?",
        r"(?P<pages> *: *\w+(?: *- *\w+)?)?",
        r"|",
        r"(?P<cdate>; *(?:[a-z]{3}(?: +\d+(?: *- *(?:\d+|[a-z]{3} +\d+))?)? *, *)?\d{4})",
        r"(?P<location> *; *\w{2}[^\n;.]+)?",
        r")",
        r" *\.",
        r"(?P<doi> *(?:doi: *|https?://(?:dx\.)?doi\.org/)\S+)?",
        r")",
    ))
    .unwrap()
});

pub struct AmaGrammar;

impl CitationGrammar for AmaGrammar {
    fn style(&self) -> Style {
        Style::Ama
    }

    fn scan(&self, text: &str, segment: Range<usize>) -> Vec<Candidate> {
        // Truncating the haystack keeps matches inside the segment while `^`
        // still sees the real line starts before it.
        let haystack = &text[..segment.end];
        let mut candidates = Vec::new();
        let mut pos = segment.start;

        while pos < segment.end {
            let Some(caps) = AMA_RE.captures_at(haystack, pos) else {
                break;
            };
            let Some(cite) = caps.name("cite") else {
                break;
            };
            pos = cite.end().max(pos + 1);
            if let Some(candidate) = candidate(&caps) {
                tracing::debug!(start = candidate.span.start, end = candidate.span.end, "AMA candidate");
                candidates.push(candidate);
            }
        }

        candidates
    }
}

/// Span of a group with leading blanks and separators dropped.
fn trimmed_span(caps: &Captures<'_>, name: &str, strip: &[char]) -> Option<Range<usize>> {
    let m = caps.name(name)?;
    let lead = m.as_str().len() - m.as_str().trim_start_matches(strip).len();
    Some(m.start() + lead..m.end())
}

fn candidate(caps: &Captures<'_>) -> Option<Candidate> {
    let cite = caps.name("cite")?;
    let blanks: &[char] = &[' '];

    let (kind, date) = match trimmed_span(caps, "jdate", blanks) {
        Some(date) => (ReferenceKind::Journal, date),
        None => (
            ReferenceKind::Conference,
            trimmed_span(caps, "cdate", &[' ', ';'])?,
        ),
    };

    let venue_span = trimmed_span(caps, "venue", blanks)?;

    Some(Candidate {
        text: cite.as_str().to_string(),
        span: cite.start()..cite.end(),
        grammar: Style::Ama,
        clauses: Clauses {
            authors: trimmed_span(caps, "authors", blanks),
            date,
            title: trimmed_span(caps, "title", blanks)?,
            venue: Some(Venue {
                kind,
                span: venue_span,
            }),
            doi: trimmed_span(caps, "doi", blanks),
        },
    })
}
