use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use super::JournalAbbreviator;
use crate::normalize::{NormalizeOptions, normalize_with};

/// Journal title → abbreviation pairs for one partition (or a static list).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbbreviationTable {
    entries: HashMap<String, String>,
}

/// Lookup key: unquoted, lowercased, whitespace-collapsed title.
fn lookup_key(title: &str) -> String {
    normalize_with(
        title.trim().trim_matches(['"', '\'']),
        NormalizeOptions::FUZZY,
    )
}

impl AbbreviationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut table = Self::new();
        for (title, abbrev) in pairs {
            table.insert(title.as_ref(), abbrev);
        }
        table
    }

    /// Parse a definition-list page: each `<dt>` holds a full title, the
    /// following `<dd>` its abbreviation.
    pub fn parse_html(html: &str) -> Self {
        let document = scraper::Html::parse_document(html);
        let item_sel = scraper::Selector::parse("dt, dd").unwrap();

        let mut table = Self::new();
        let mut pending: Option<String> = None;
        for item in document.select(&item_sel) {
            let text: String = item.text().collect();
            let text = text.trim();
            match item.value().name() {
                "dt" => pending = (!text.is_empty()).then(|| text.to_string()),
                _ => {
                    if let Some(title) = pending.take() {
                        if !text.is_empty() {
                            table.insert(&title, text);
                        }
                    }
                }
            }
        }
        table
    }

    pub fn insert(&mut self, title: &str, abbrev: impl Into<String>) {
        let key = lookup_key(title);
        if !key.is_empty() {
            self.entries.insert(key, abbrev.into());
        }
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.entries.get(&lookup_key(title)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A fixed table works as an offline abbreviator.
impl JournalAbbreviator for AbbreviationTable {
    fn abbreviate<'a>(
        &'a self,
        journal_title: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        let found = self.get(journal_title).map(String::from);
        Box::pin(async move { found })
    }
}
