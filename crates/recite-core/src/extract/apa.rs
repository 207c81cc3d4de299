//! APA grammar: a clause-by-clause parser.
//!
//! `Authors. (Date). Title. Venue. doi:…` where the venue and DOI are
//! optional. Candidates may start at any word boundary and may wrap across
//! lines; a blank line or the start of another citation ends them.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{CitationGrammar, is_word_char};
use crate::matching::find_doi_clause;
use crate::{Candidate, Clauses, ReferenceKind, Style, Venue};

/// `Surname, I. I.` or a multi-word group name, repeated with `,` / `, &` / `, ...`.
static AUTHORS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^[\w-]{2,}(?: *,(?: *[a-z]\.)+|(?: +[\w-]+)+)?",
        r"(?: *,(?: *(?:&|\.{3}))? *[\w-]{2,}(?: *,(?: *[a-z]\.)+|(?: +[\w-]+)+)?)*",
    ))
    .unwrap()
});

static AUTHORS_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ *\.").unwrap());

/// `(2020).`, `(2020, May).`, `(2020, May 3-5).`, optionally on the next line.
static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[ \t]*(?:\r?\n[ \t]*)?\( *\d{4}(?: *, *\w+(?: +\d+(?: *- *\d+)?)?)? *\) *\.")
        .unwrap()
});

/// `Journal, vol(issue), pages.` and its partial forms.
static JOURNAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^\s*[^.]*?[^\s.,]",
        r"(?:, *(?P<volume>\d+) *(?:\( *[\w-]+ *\))?|, *(?P<issue>\( *[\w-]+ *\)))?",
        r"(?:, *(?P<pages>\w+(?: *- *\w+)?))?",
        r"\s*\.$",
    ))
    .unwrap()
});

static CONFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?is)^\s*(?:paper\s+presented\s+at|poster\s+presented\s+at|presented\s+at",
        r"|in\s+proceedings\s+of|proceedings\s+of)\s*:?\s*[^\s.].*\.$",
    ))
    .unwrap()
});

/// Lines a single citation may span.
const MAX_LINES: usize = 6;

pub struct ApaGrammar;

impl CitationGrammar for ApaGrammar {
    fn style(&self) -> Style {
        Style::Apa
    }

    fn scan(&self, text: &str, segment: Range<usize>) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        let mut pos = segment.start;

        while pos < segment.end {
            let Some(c) = text[pos..].chars().next() else {
                break;
            };
            if (is_word_char(c) || c == '-') && !follows_word(text, pos) {
                if let Some(candidate) = parse_at(text, pos, segment.end) {
                    pos = candidate.span.end;
                    candidates.push(candidate);
                    continue;
                }
            }
            pos += c.len_utf8();
        }

        candidates
    }
}

fn follows_word(text: &str, pos: usize) -> bool {
    text[..pos]
        .chars()
        .next_back()
        .is_some_and(|p| is_word_char(p) || p == '-')
}

/// Length of the author clause at the start of `rest`, terminating period included.
fn authors_len(rest: &str) -> Option<usize> {
    let m = AUTHORS_RE.find(rest)?;
    if m.as_str().ends_with('.') {
        return Some(m.end());
    }
    let terminator = AUTHORS_END_RE.find(&rest[m.end()..])?;
    Some(m.end() + terminator.end())
}

/// Whether `line` opens with an author clause followed by a date clause.
fn starts_citation(line: &str) -> bool {
    authors_len(line).is_some_and(|n| DATE_RE.is_match(&line[n..]))
}

/// Skip blanks and at most one line break.
fn skip_gap(text: &str, mut pos: usize, limit: usize) -> usize {
    let bytes = text.as_bytes();
    let skip_blanks = |mut p: usize| {
        while p < limit && matches!(bytes[p], b' ' | b'\t') {
            p += 1;
        }
        p
    };
    pos = skip_blanks(pos);
    if text[pos..limit].starts_with("\r\n") {
        pos += 2;
    } else if text[pos..limit].starts_with('\n') {
        pos += 1;
    }
    skip_blanks(pos)
}

fn line_end(text: &str, start: usize, limit: usize) -> usize {
    text[start..limit].find('\n').map_or(limit, |i| start + i)
}

/// Where the title/venue body starting at `start` ends.
fn body_end(text: &str, start: usize, limit: usize) -> usize {
    let mut line_start = start;

    for _ in 1..MAX_LINES {
        let end = line_end(text, line_start, limit);
        if end == limit {
            return limit;
        }
        let line = &text[line_start..end];
        if find_doi_clause(line).is_some() {
            return end;
        }

        let next_start = end + 1;
        let next_end = line_end(text, next_start, limit);
        let next = &text[next_start..next_end];
        if next.trim().is_empty() || starts_citation(next) {
            return end;
        }

        if line.trim_end().ends_with('.') {
            // A DOI on its own line still belongs to this citation.
            if find_doi_clause(next).is_some_and(|(r, _)| next[..r.start].trim().is_empty()) {
                return next_end;
            }
            if has_venue(text, start, end) {
                return end;
            }
            // Cross a sentence end only when the next line completes the venue.
            if !(next.trim_end().ends_with('.') && has_venue(text, start, next_end)) {
                return end;
            }
        }
        line_start = next_start;
    }

    line_end(text, line_start, limit)
}

fn has_venue(text: &str, start: usize, end: usize) -> bool {
    let head = text[start..end].trim_end();
    split_title_venue(text, start, start + head.len()).is_some_and(|(_, venue)| venue.is_some())
}

/// Split `text[start..end]` into title and venue at the leftmost sentence
/// boundary whose remainder parses as a venue (the longest valid suffix).
fn split_title_venue(text: &str, start: usize, end: usize) -> Option<(Range<usize>, Option<Venue>)> {
    let head = &text[start..end];
    if !head.chars().any(char::is_alphanumeric) {
        return None;
    }

    let mut chars = head.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let at_boundary = c == '.' && chars.peek().is_some_and(|&(_, next)| next.is_whitespace());
        if !at_boundary {
            continue;
        }
        let title = &head[..=i];
        if !title.chars().any(char::is_alphanumeric) {
            continue;
        }
        let suffix = &head[i + 1..];
        if let Some(kind) = venue_kind(suffix) {
            let lead = suffix.len() - suffix.trim_start().len();
            let venue = Venue {
                kind,
                span: start + i + 1 + lead..end,
            };
            return Some((start..start + i + 1, Some(venue)));
        }
    }

    Some((start..end, None))
}

fn venue_kind(suffix: &str) -> Option<ReferenceKind> {
    if CONFERENCE_RE.is_match(suffix) {
        return Some(ReferenceKind::Conference);
    }
    let caps = JOURNAL_RE.captures(suffix)?;
    let has_locator = caps.name("volume").is_some()
        || caps.name("issue").is_some()
        || caps
            .name("pages")
            .is_some_and(|p| p.as_str().chars().any(|c| c.is_ascii_digit()));
    has_locator.then_some(ReferenceKind::Journal)
}

/// End of the title/venue head: the last period, unless the head only has a
/// venue when cut at an earlier sentence end (trailing prose on the same line).
fn closing_period(text: &str, start: usize, head: &str) -> Option<usize> {
    let last = head.rfind('.')?;
    if has_venue(text, start, start + last + 1) {
        return Some(last + 1);
    }
    let earlier = head[..last]
        .char_indices()
        .rev()
        .filter(|&(i, c)| c == '.' && head[i + 1..].starts_with(char::is_whitespace))
        .find(|&(i, _)| has_venue(text, start, start + i + 1));
    Some(earlier.map_or(last + 1, |(i, _)| i + 1))
}

fn parse_at(text: &str, start: usize, limit: usize) -> Option<Candidate> {
    let authors_end = start + authors_len(&text[start..limit])?;

    let date = DATE_RE.find(&text[authors_end..limit])?;
    let date_text = date.as_str();
    let date_lead = date_text.len() - date_text.trim_start().len();
    let date_span = authors_end + date_lead..authors_end + date.end();

    let body_start = skip_gap(text, date_span.end, limit);
    if body_start >= limit {
        return None;
    }
    let body_end = body_end(text, body_start, limit);
    let body = &text[body_start..body_end];

    // A DOI clause counts only after a closed sentence.
    let (head_end, doi, end) = match find_doi_clause(body) {
        Some((range, _)) if body[..range.start].trim_end().ends_with('.') => {
            let head_end = body_start + body[..range.start].trim_end().len();
            let doi = body_start + range.start..body_start + range.end;
            let end = doi.end;
            (head_end, Some(doi), end)
        }
        found => {
            let scope = found.map_or(body.len(), |(range, _)| range.start);
            let head_end = body_start + closing_period(text, body_start, &body[..scope])?;
            (head_end, None, head_end)
        }
    };

    let (title, venue) = split_title_venue(text, body_start, head_end)?;

    tracing::debug!(start, end, "APA candidate");
    Some(Candidate {
        text: text[start..end].to_string(),
        span: start..end,
        grammar: Style::Apa,
        clauses: Clauses {
            authors: Some(start..authors_end),
            date: date_span,
            title,
            venue,
            doi,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> Vec<Candidate> {
        ApaGrammar.scan(text, 0..text.len())
    }

    fn slice<'a>(text: &'a str, range: &Range<usize>) -> &'a str {
        &text[range.clone()]
    }

    #[test]
    fn test_full_citation_with_doi() {
        let text = "Smith, J. (2020). A study. Journal, 1(1), 1-2. doi:10.1000/xyz.";
        let found = scan(text);
        assert_eq!(found.len(), 1);
        let c = &found[0];
        assert_eq!(c.text, text);
        assert_eq!(slice(text, c.clauses.authors.as_ref().unwrap()), "Smith, J.");
        assert_eq!(slice(text, &c.clauses.date), "(2020).");
        assert_eq!(slice(text, &c.clauses.title), "A study.");
        let venue = c.clauses.venue.as_ref().unwrap();
        assert_eq!(venue.kind, ReferenceKind::Journal);
        assert_eq!(slice(text, &venue.span), "Journal, 1(1), 1-2.");
        assert_eq!(slice(text, c.clauses.doi.as_ref().unwrap()), "doi:10.1000/xyz.");
    }

    #[test]
    fn test_citation_without_doi() {
        let text = "Smith, J. (2020). A study. Journal, 1(1), 1-2.";
        let found = scan(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, text);
        assert!(found[0].clauses.doi.is_none());
    }

    #[test]
    fn test_title_only() {
        let text = "Smith, J., & Doe, A. (2019). A study of things.";
        let found = scan(text);
        assert_eq!(found.len(), 1);
        assert!(found[0].clauses.venue.is_none());
        assert_eq!(slice(text, &found[0].clauses.title), "A study of things.");
    }

    #[test]
    fn test_journal_name_with_commas() {
        let text = "Lee, K. (2018). Heat and cold. Journal of Things, Part B, 12, 3-9.";
        let c = &scan(text)[0];
        assert_eq!(slice(text, &c.clauses.title), "Heat and cold.");
        assert_eq!(
            slice(text, &c.clauses.venue.as_ref().unwrap().span),
            "Journal of Things, Part B, 12, 3-9."
        );
    }

    #[test]
    fn test_title_keeps_sentences_before_venue() {
        let text = "Lee, K. (2018). Heat. Cold. Journal of Things, 12, 3-9.";
        let c = &scan(text)[0];
        assert_eq!(slice(text, &c.clauses.title), "Heat. Cold.");
        assert_eq!(c.clauses.venue.as_ref().unwrap().kind, ReferenceKind::Journal);
    }

    #[test]
    fn test_conference_venue() {
        let text =
            "Lee, K. (2016). Robust widgets. Paper presented at Widget Symposium, Austin, TX.";
        let c = &scan(text)[0];
        let venue = c.clauses.venue.as_ref().unwrap();
        assert_eq!(venue.kind, ReferenceKind::Conference);
        assert_eq!(
            slice(text, &venue.span),
            "Paper presented at Widget Symposium, Austin, TX."
        );
    }

    #[test]
    fn test_group_author_and_ellipsis() {
        let text = "World Health Organization. (2005). Guidelines. Bulletin, 3, 10.";
        assert_eq!(scan(text).len(), 1);

        let text = "Aa, A., Bb, B., Cc, C., Dd, D., Ee, E., Ff, F., ... Zz, Z. (2001). Many hands. Science, 2, 1-9.";
        let found = scan(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, text);
    }

    #[test]
    fn test_wrapped_citation() {
        let text = "Smith, J. (2020). A study of\nthings. Journal, 1(1), 1-2.";
        let found = scan(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, text);
        assert!(found[0].clauses.venue.is_some());
    }

    #[test]
    fn test_venue_on_next_line() {
        let text = "Smith, J. (2020). A study.\nJournal, 1(1), 1-2.";
        let found = scan(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, text);
    }

    #[test]
    fn test_doi_on_next_line() {
        let text = "Smith, J. (2020). A study. Journal, 1(1), 1-2.\nhttps://doi.org/10.1000/xyz";
        let found = scan(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, text);
        assert!(found[0].clauses.doi.is_some());
    }

    #[test]
    fn test_reference_list() {
        let text = "References\nSmith, J. (2020). A study. Journal, 1(1), 1-2.\nDoe, A. (2019). Other work. Science, 3, 4-5.\n";
        let found = scan(text);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].text, "Smith, J. (2020). A study. Journal, 1(1), 1-2.");
        assert_eq!(found[1].text, "Doe, A. (2019). Other work. Science, 3, 4-5.");
    }

    #[test]
    fn test_blank_line_ends_citation() {
        let text = "Smith, J. (2020). A study.\n\nJournal, 1(1), 1-2.";
        let found = scan(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "Smith, J. (2020). A study.");
    }

    #[test]
    fn test_citation_inside_prose() {
        let text = "As reported in Smith, J. (2020). A study. Journal, 1(1), 1-2. we see it.";
        let found = scan(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "Smith, J. (2020). A study. Journal, 1(1), 1-2.");
    }

    #[test]
    fn test_non_citations() {
        assert!(scan("We measured it (2020) and moved on.").is_empty());
        assert!(scan("Smith, J. (2020).").is_empty());
        assert!(scan("Smith, J. (2020). No closing period").is_empty());
        assert!(scan("Smith, J. 2020. A study.").is_empty());
    }

    #[test]
    fn test_segment_bounds_respected() {
        let text = "Smith, J. (2020). A study. Journal, 1(1), 1-2.";
        assert!(ApaGrammar.scan(text, 0..20).is_empty());
    }
}
