use std::sync::Arc;

use crate::abbrev::JournalAbbreviator;
use crate::styles::{FieldSet, formatter};
use crate::{ArticleRecord, Citation, ReferenceKind, Style, StyleTag};

const STYLES: [Style; 2] = [Style::Apa, Style::Ama];
const KINDS: [ReferenceKind; 2] = [ReferenceKind::Journal, ReferenceKind::Conference];

/// Renders every supported style of a record.
#[derive(Clone, Default)]
pub struct CitationGenerator {
    abbreviator: Option<Arc<dyn JournalAbbreviator>>,
}

impl CitationGenerator {
    /// Generator without journal abbreviations; AMA falls back to the full name.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_abbreviator(abbreviator: Arc<dyn JournalAbbreviator>) -> Self {
        Self {
            abbreviator: Some(abbreviator),
        }
    }

    /// Up to four citations (APA/AMA × journal/conference); empty renderings are skipped.
    pub async fn generate(&self, record: &ArticleRecord) -> Vec<Citation> {
        let fields = FieldSet::from_record(record);

        let abbrev = match (&self.abbreviator, fields.pub_name.is_empty()) {
            (Some(abbreviator), false) => abbreviator.abbreviate(fields.pub_name).await,
            _ => None,
        };

        let mut citations = Vec::with_capacity(STYLES.len() * KINDS.len());
        for style in STYLES {
            let formatter = formatter(style);
            for kind in KINDS {
                let value = formatter.format(kind, &fields, abbrev.as_deref());
                if !value.is_empty() {
                    citations.push(Citation::new(value, record.id, Some(StyleTag::new(style, kind))));
                }
            }
        }

        tracing::debug!(
            article_id = record.id,
            citations = citations.len(),
            abbreviated = abbrev.is_some(),
            "generated citations"
        );
        citations
    }
}

impl std::fmt::Debug for CitationGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CitationGenerator")
            .field("abbreviations", &self.abbreviator.is_some())
            .finish()
    }
}
