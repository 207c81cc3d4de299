use std::io::Write;

use owo_colors::OwoColorize;
use recite_core::{Annotation, Candidate, Citation, MatchOutcome};

pub const NO_CANDIDATES_MESSAGE: &str =
    "No citations found. Likely reason: citations were not in the correct format.";
pub const NO_MATCHES_MESSAGE: &str = "No citations matched retracted articles in our database.";

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print what the annotation run found.
pub fn print_annotation_summary(
    w: &mut dyn Write,
    annotation: &Annotation,
    color: ColorMode,
) -> std::io::Result<()> {
    let annotated = match annotation {
        Annotation::NoCandidates => {
            if color.enabled() {
                writeln!(w, "{}", NO_CANDIDATES_MESSAGE.yellow())?;
            } else {
                writeln!(w, "{}", NO_CANDIDATES_MESSAGE)?;
            }
            return Ok(());
        }
        Annotation::Annotated(annotated) => annotated,
    };

    writeln!(
        w,
        "Checked {} citation candidates",
        annotated.results.len()
    )?;

    if !annotated.has_matches() {
        if color.enabled() {
            writeln!(w, "{}", NO_MATCHES_MESSAGE.green())?;
        } else {
            writeln!(w, "{}", NO_MATCHES_MESSAGE)?;
        }
        return Ok(());
    }

    for result in annotated.results.iter().filter(|r| r.marked) {
        let label = match &result.outcome {
            MatchOutcome::DoiExact { doi } => format!("EXACT (doi {doi})"),
            MatchOutcome::FuzzyExact { article_id } => format!("EXACT (article {article_id})"),
            MatchOutcome::FuzzyApproximate {
                distance,
                article_id,
            } => format!("APPROXIMATE (article {article_id}, distance {distance})"),
            MatchOutcome::NoMatch => continue,
        };
        let snippet = shorten(&result.candidate.text, 80);
        if color.enabled() {
            let label = if result.outcome.is_exact() {
                label.red().bold().to_string()
            } else {
                label.yellow().to_string()
            };
            writeln!(w, "  {} \"{}\"", label, snippet)?;
        } else {
            writeln!(w, "  {} \"{}\"", label, snippet)?;
        }
    }

    let summary = format!(
        "{} exact, {} approximate match(es)",
        annotated.exact_count(),
        annotated.approximate_count()
    );
    if color.enabled() {
        writeln!(w, "{}", summary.bold())?;
    } else {
        writeln!(w, "{}", summary)?;
    }
    Ok(())
}

/// `<style-tag>\t<article-id>\t<citation>`
pub fn print_citation(w: &mut dyn Write, citation: &Citation) -> std::io::Result<()> {
    let tag = citation.style.map_or("external", |s| s.as_str());
    writeln!(w, "{}\t{}\t{}", tag, citation.article_id, citation.value)
}

/// Dry-run listing of extracted candidates.
pub fn print_candidates(
    w: &mut dyn Write,
    candidates: &[Candidate],
    color: ColorMode,
) -> std::io::Result<()> {
    if candidates.is_empty() {
        writeln!(w, "{}", NO_CANDIDATES_MESSAGE)?;
        return Ok(());
    }

    if color.enabled() {
        writeln!(
            w,
            "{} {} citation candidates\n",
            "DRY RUN:".bold().cyan(),
            candidates.len()
        )?;
    } else {
        writeln!(w, "DRY RUN: {} citation candidates\n", candidates.len())?;
    }

    for (i, candidate) in candidates.iter().enumerate() {
        let header = format!(
            "[{}] {} {}..{}",
            i + 1,
            candidate.grammar.as_str().to_uppercase(),
            candidate.span.start,
            candidate.span.end
        );
        let display: String = candidate
            .text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if color.enabled() {
            writeln!(w, "{}", header.bold())?;
        } else {
            writeln!(w, "{}", header)?;
        }
        writeln!(w, "  {}", display)?;
        if let Some(venue) = &candidate.clauses.venue {
            writeln!(w, "  venue: {:?}", venue.kind)?;
        }
        if let Some(doi) = &candidate.clauses.doi {
            writeln!(w, "  doi clause: {}", candidate_slice(candidate, doi))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Clause text of a candidate; clause spans are offsets into the scanned input.
fn candidate_slice<'a>(candidate: &'a Candidate, span: &std::ops::Range<usize>) -> &'a str {
    let start = span.start.saturating_sub(candidate.span.start);
    let end = span.end.saturating_sub(candidate.span.start);
    candidate.text.get(start..end).unwrap_or("")
}

fn shorten(text: &str, max_chars: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max_chars {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recite_core::{Corpus, MatchConfig, StyleTag, annotate, extract_citations};

    const CITATION: &str = "Smith, J. (2020). A study. Journal, 1(1), 1-2. doi:10.1000/xyz.";

    fn render(f: impl FnOnce(&mut Vec<u8>) -> std::io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_summary_no_candidates() {
        let out = render(|w| {
            print_annotation_summary(w, &Annotation::NoCandidates, ColorMode(false))
        });
        assert_eq!(out.trim_end(), NO_CANDIDATES_MESSAGE);
    }

    #[test]
    fn test_summary_no_matches() {
        let annotation = annotate(CITATION, &Corpus::default(), MatchConfig::default());
        let out = render(|w| print_annotation_summary(w, &annotation, ColorMode(false)));
        assert!(out.contains("Checked 1 citation candidates"));
        assert!(out.contains(NO_MATCHES_MESSAGE));
    }

    #[test]
    fn test_summary_with_match() {
        let corpus = Corpus::new(["10.1000/xyz"], vec![]);
        let annotation = annotate(CITATION, &corpus, MatchConfig::default());
        let out = render(|w| print_annotation_summary(w, &annotation, ColorMode(false)));
        assert!(out.contains("EXACT (doi 10.1000/xyz)"));
        assert!(out.contains("1 exact, 0 approximate match(es)"));
    }

    #[test]
    fn test_print_citation_line() {
        let tagged = Citation::new("Smith J. A study.", 3, Some(StyleTag::AmaJournal));
        let external = Citation::new("Smith, J. A study.", 4, None);
        let out = render(|w| {
            print_citation(w, &tagged)?;
            print_citation(w, &external)
        });
        assert_eq!(
            out,
            "ama-journal\t3\tSmith J. A study.\nexternal\t4\tSmith, J. A study.\n"
        );
    }

    #[test]
    fn test_print_candidates_shows_doi_clause() {
        let text = format!("Intro.\n{CITATION}\n");
        let candidates = extract_citations(&text);
        let out = render(|w| print_candidates(w, &candidates, ColorMode(false)));
        assert!(out.starts_with("DRY RUN: 1 citation candidates"));
        assert!(out.contains("[1] APA 7.."));
        assert!(out.contains("doi clause: doi:10.1000/xyz."));
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("a  b\nc", 10), "a b c");
        assert_eq!(shorten("abcdef", 3), "abc...");
    }
}
