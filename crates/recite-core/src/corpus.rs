use std::collections::HashSet;

use crate::generate::CitationGenerator;
use crate::matching::{FuzzyHit, closest_normalized, fuzzy_key, match_doi};
use crate::normalize::normalize_doi;
use crate::{ArticleRecord, Citation};

/// The known retracted articles: their DOIs and every citation string
/// generated for them.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    dois: HashSet<String>,
    citations: Vec<Citation>,
    /// Fuzzy keys, parallel to `citations`.
    keys: Vec<String>,
}

impl Corpus {
    /// Build a corpus from raw DOIs and citations. DOIs are normalized; empty ones are skipped.
    pub fn new<I, S>(dois: I, citations: Vec<Citation>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dois = dois
            .into_iter()
            .map(|d| normalize_doi(d.as_ref().trim()))
            .filter(|d| !d.is_empty())
            .collect();
        let keys = citations.iter().map(|c| fuzzy_key(&c.value)).collect();
        Self {
            dois,
            citations,
            keys,
        }
    }

    /// Collect every record's DOI and generated citations.
    pub async fn from_records(records: &[ArticleRecord], generator: &CitationGenerator) -> Self {
        let mut citations = Vec::new();
        for record in records {
            citations.extend(generator.generate(record).await);
        }
        let corpus = Self::new(records.iter().map(|r| r.doi.as_str()), citations);
        tracing::info!(
            records = records.len(),
            dois = corpus.dois.len(),
            citations = corpus.citations.len(),
            "corpus assembled"
        );
        corpus
    }

    /// Add externally supplied citations.
    pub fn with_citations(mut self, extra: impl IntoIterator<Item = Citation>) -> Self {
        for citation in extra {
            self.keys.push(fuzzy_key(&citation.value));
            self.citations.push(citation);
        }
        self
    }

    pub fn dois(&self) -> &HashSet<String> {
        &self.dois
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    pub fn contains_doi(&self, doi: &str) -> bool {
        self.dois.contains(&normalize_doi(doi.trim()))
    }

    pub fn is_empty(&self) -> bool {
        self.dois.is_empty() && self.citations.is_empty()
    }

    /// Known DOI found in the candidate's DOI clause, if any.
    pub fn match_doi(&self, candidate: &str) -> Option<String> {
        match_doi(candidate, &self.dois)
    }

    /// Closest known citation within `max_distance`.
    pub fn closest(&self, candidate: &str, max_distance: usize) -> Option<(FuzzyHit, &Citation)> {
        let hit = closest_normalized(
            &fuzzy_key(candidate),
            self.keys.iter().map(String::as_str),
            max_distance,
        )?;
        Some((hit, &self.citations[hit.index]))
    }
}
