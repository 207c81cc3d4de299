//! Field parsers shared by every citation style.
//!
//! All parsers are total: malformed input yields an empty result.

use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;

/// Surname (2+ letters, hyphens allowed), optionally `, INITIALS`.
static AUTHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z-]{2,})(?:, ?([A-Z]+))?").unwrap());

static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{4})|[a-zA-Z]{3}-([0-9]{2,4})").unwrap());

static MONTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]{3}").unwrap());

static DAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{1,2}(?:-\d{1,2})?\b").unwrap());

/// Trailing "(Retracted article. See ...)" / "(Retraction of ...)" notice.
static RETRACTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\(retract(?:ed|ion)[^()]*\)\s*$").unwrap());

/// How a style renders one `Surname, INITIALS` author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameFormat {
    /// Between surname and initials.
    pub surname_sep: &'static str,
    /// Between consecutive initials.
    pub initial_sep: &'static str,
    /// Appended to every initial.
    pub initial_suffix: &'static str,
}

/// Parse a `;`-separated author list into formatted names.
///
/// Segments that don't start with a 2+ letter surname are dropped.
pub fn parse_author(text: &str, format: &NameFormat) -> Vec<String> {
    text.split(';')
        .filter_map(|segment| {
            let caps = AUTHOR_RE.captures(segment.trim())?;
            let surname = capitalize(&caps[1]);
            match caps.get(2) {
                Some(initials) => {
                    let initials = initials
                        .as_str()
                        .chars()
                        .map(|c| format!("{c}{}", format.initial_suffix))
                        .collect::<Vec<_>>()
                        .join(format.initial_sep);
                    Some(format!("{surname}{}{initials}", format.surname_sep))
                }
                None => Some(surname),
            }
        })
        .collect()
}

/// Parse a 4-digit year out of a date-ish string, relative to the current year.
pub fn parse_year(datestring: &str) -> String {
    parse_year_at(datestring, chrono::Local::now().year())
}

/// [`parse_year`] with an explicit current year.
///
/// Accepts a bare 2- or 4-digit numeral, or the first `YYYY` / `Mon-YY` token.
/// Two-digit years land in 1969..=2068 and are moved back a century if that
/// puts them after `current_year`.
pub fn parse_year_at(datestring: &str, current_year: i32) -> String {
    let datestring = datestring.trim();
    if datestring.is_empty() {
        return String::new();
    }

    let raw = if datestring.chars().all(|c| c.is_ascii_digit()) {
        if !matches!(datestring.len(), 2 | 4) {
            return String::new();
        }
        datestring
    } else {
        let Some(caps) = YEAR_RE.captures(datestring) else {
            return String::new();
        };
        match caps.get(1).or_else(|| caps.get(2)) {
            Some(m) => m.as_str(),
            None => return String::new(),
        }
    };

    let Ok(value) = raw.parse::<i32>() else {
        return String::new();
    };

    match raw.len() {
        4 if value > 0 => value.to_string(),
        2 => {
            let mut year = if value < 69 { 2000 + value } else { 1900 + value };
            if year > current_year {
                year -= 100;
            }
            year.to_string()
        }
        _ => String::new(),
    }
}

/// Parse a conference-style date into `Mon DD[-DD][, YYYY]`.
///
/// Month abbreviations and day tokens are paired by position; with no day
/// tokens the months are joined with `-`. A day token at the very end of the
/// string is treated as a year fragment and skipped.
pub fn parse_date(datestring: &str) -> String {
    parse_date_at(datestring, chrono::Local::now().year())
}

/// [`parse_date`] with an explicit current year.
pub fn parse_date_at(datestring: &str, current_year: i32) -> String {
    let months: Vec<String> = MONTH_RE
        .find_iter(datestring)
        .map(|m| capitalize(m.as_str()))
        .collect();

    let mut date = String::new();
    if !months.is_empty() {
        let days: Vec<String> = find_days(datestring).into_iter().map(day_format).collect();
        date = if days.is_empty() {
            months.join("-")
        } else {
            months
                .iter()
                .zip(&days)
                .map(|(m, d)| format!("{m} {d}"))
                .collect::<Vec<_>>()
                .join("-")
        };
    }

    let year = parse_year_at(datestring, current_year);
    if !year.is_empty() {
        if !date.is_empty() {
            date.push_str(", ");
        }
        date.push_str(&year);
    }

    date
}

fn find_days(datestring: &str) -> Vec<&str> {
    DAY_RE
        .find_iter(datestring)
        .filter_map(|m| {
            if m.end() < datestring.len() {
                return Some(m.as_str());
            }
            // A range ending the string still contributes its first day.
            m.as_str().split_once('-').map(|(first, _)| first)
        })
        .collect()
}

fn day_format(day: &str) -> String {
    day.split('-')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .filter_map(|d| d.parse::<u32>().ok())
        .map(|d| format!("{d:02}"))
        .collect::<Vec<_>>()
        .join("-")
}

/// `begin-end`, or just `begin` when the end is empty or the `+` sentinel.
pub fn parse_page(begin_page: &str, end_page: &str) -> String {
    if begin_page.is_empty() {
        return String::new();
    }
    if !end_page.is_empty() && end_page != "+" {
        format!("{begin_page}-{end_page}")
    } else {
        begin_page.to_string()
    }
}

/// First character uppercased, the rest lowercased.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Uppercase the first letter of every run of letters, lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_letter = false;
    for c in text.chars() {
        if prev_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_letter = c.is_alphabetic();
    }
    out
}

/// Remove a trailing parenthesized retraction notice from an article title.
pub fn strip_retraction_notice(title: &str) -> &str {
    match RETRACTION_RE.find(title) {
        Some(m) => &title[..m.start()],
        None => title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APA_NAMES: NameFormat = NameFormat {
        surname_sep: ", ",
        initial_sep: " ",
        initial_suffix: ".",
    };

    const AMA_NAMES: NameFormat = NameFormat {
        surname_sep: " ",
        initial_sep: "",
        initial_suffix: "",
    };

    #[test]
    fn test_parse_author_apa() {
        assert_eq!(
            parse_author("SMITH, JA; doe, B", &APA_NAMES),
            vec!["Smith, J. A.", "Doe, B."]
        );
    }

    #[test]
    fn test_parse_author_ama() {
        assert_eq!(
            parse_author("Smith, JA; Garcia-Lopez,M", &AMA_NAMES),
            vec!["Smith JA", "Garcia-lopez M"]
        );
    }

    #[test]
    fn test_parse_author_drops_bad_segments() {
        assert_eq!(
            parse_author("X; ; 1234; Lee", &APA_NAMES),
            vec!["Lee"]
        );
        assert!(parse_author("", &APA_NAMES).is_empty());
    }

    #[test]
    fn test_parse_author_lowercase_initials_ignored() {
        assert_eq!(parse_author("Smith, ja", &APA_NAMES), vec!["Smith"]);
    }

    #[test]
    fn test_parse_year_bare() {
        assert_eq!(parse_year_at("2013", 2026), "2013");
        assert_eq!(parse_year_at("95", 2026), "1995");
        assert_eq!(parse_year_at("05", 2026), "2005");
        assert_eq!(parse_year_at("123", 2026), "");
        assert_eq!(parse_year_at("", 2026), "");
    }

    #[test]
    fn test_parse_year_month_tokens() {
        assert_eq!(parse_year_at("Jan-95", 2026), "1995");
        assert_eq!(parse_year_at("Jan-05", 2026), "2005");
        assert_eq!(parse_year_at("Jan-1999", 2026), "1999");
        assert_eq!(parse_year_at("JUN 05-07 2015", 2026), "2015");
    }

    #[test]
    fn test_parse_year_pivot() {
        assert_eq!(parse_year_at("Mar-30", 2026), "1930");
        assert_eq!(parse_year_at("Mar-26", 2026), "2026");
        assert_eq!(parse_year_at("Mar-68", 2070), "2068");
    }

    #[test]
    fn test_parse_year_invalid() {
        assert_eq!(parse_year_at("no date here", 2026), "");
        assert_eq!(parse_year_at("0000", 2026), "");
        assert_eq!(parse_year_at("Jan-199", 2026), "");
    }

    #[test]
    fn test_parse_year_uses_current_clock() {
        assert_eq!(parse_year("Jan-95"), "1995");
        assert_eq!(parse_year("2001"), "2001");
    }

    #[test]
    fn test_parse_date_day_range() {
        assert_eq!(parse_date_at("JUN 05-07 2015", 2026), "Jun 05-07, 2015");
        assert_eq!(parse_date_at("SEP 7-9, 2011", 2026), "Sep 07-09, 2011");
    }

    #[test]
    fn test_parse_date_month_range() {
        assert_eq!(
            parse_date_at("MAY 30-JUN 02, 2016", 2026),
            "May 30-Jun 02, 2016"
        );
    }

    #[test]
    fn test_parse_date_months_only() {
        assert_eq!(parse_date_at("Jan-95", 2026), "Jan, 1995");
        assert_eq!(parse_date_at("2015", 2026), "2015");
        assert_eq!(parse_date_at("", 2026), "");
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page("123", "126"), "123-126");
        assert_eq!(parse_page("123", "+"), "123");
        assert_eq!(parse_page("123", ""), "123");
        assert_eq!(parse_page("", "126"), "");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("a STUDY of DNA"), "A study of dna");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("JOURNAL OF 3d printing"), "Journal Of 3D Printing");
        assert_eq!(title_case("world health org."), "World Health Org.");
    }

    #[test]
    fn test_strip_retraction_notice() {
        assert_eq!(
            strip_retraction_notice("A study (Retracted article. See vol 5, pg 3)"),
            "A study"
        );
        assert_eq!(
            strip_retraction_notice("A study (RETRACTION OF VOL 2, PG 10) "),
            "A study"
        );
        assert_eq!(strip_retraction_notice("A (small) study"), "A (small) study");
    }
}
