//! Journal title abbreviation lookup.
//!
//! The reference table is partitioned by the first character of the title
//! (`A`..`Z`, plus one bucket for digits). A partition is fetched on first use
//! and kept for the lifetime of the [`AbbreviationResolver`]; concurrent
//! lookups in an uncached partition share a single fetch.

pub mod table;
pub mod wos;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::normalize::to_ascii;

pub use table::AbbreviationTable;
pub use wos::{WOS_URL_TEMPLATE, WosSource};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum AbbrevError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("unparsable abbreviation table: {0}")]
    Parse(String),
}

/// Partition key of the abbreviation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Digits,
    /// Uppercase ASCII letter.
    Letter(char),
}

impl Partition {
    /// Partition for a journal title: its first character (quotes skipped),
    /// ASCII-folded and uppercased. `None` for anything else.
    pub fn for_title(title: &str) -> Option<Self> {
        let first = title.trim().trim_matches(['"', '\'']).chars().next()?;
        if first.is_ascii_digit() {
            return Some(Partition::Digits);
        }
        let folded = to_ascii(first.encode_utf8(&mut [0; 4]))
            .chars()
            .next()?
            .to_ascii_uppercase();
        folded.is_ascii_uppercase().then_some(Partition::Letter(folded))
    }

    /// Page name in the source: `0-9` or the letter.
    pub fn page_name(&self) -> String {
        match self {
            Partition::Digits => "0-9".to_string(),
            Partition::Letter(c) => c.to_string(),
        }
    }
}

/// Where partition tables come from.
pub trait PartitionSource: Send + Sync {
    fn name(&self) -> &str;

    fn fetch<'a>(
        &'a self,
        partition: &'a Partition,
    ) -> Pin<Box<dyn Future<Output = Result<AbbreviationTable, AbbrevError>> + Send + 'a>>;
}

/// Capability handed to citation generation: abbreviate a journal title, if known.
pub trait JournalAbbreviator: Send + Sync {
    fn abbreviate<'a>(
        &'a self,
        journal_title: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
}

/// `None` inside a filled cell records a failed fetch.
type PartitionCell = Arc<OnceCell<Option<Arc<AbbreviationTable>>>>;

pub struct AbbreviationResolver {
    source: Arc<dyn PartitionSource>,
    partitions: DashMap<Partition, PartitionCell>,
    timeout: Duration,
}

impl AbbreviationResolver {
    pub fn new(source: Arc<dyn PartitionSource>) -> Self {
        Self {
            source,
            partitions: DashMap::new(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Resolver backed by the Web of Science abbreviation pages.
    pub fn web_of_science() -> Self {
        Self::new(Arc::new(WosSource::default()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Abbreviated form of `journal_title`, or `None` if unknown or the
    /// partition could not be loaded.
    ///
    /// A failed fetch, timeouts included, is remembered: the partition stays
    /// unavailable and is not requested again until [`clear`](Self::clear).
    pub async fn abbreviate(&self, journal_title: &str) -> Option<String> {
        let partition = Partition::for_title(journal_title)?;
        let table = self.table(partition).await?;
        table.get(journal_title).map(String::from)
    }

    async fn table(&self, partition: Partition) -> Option<Arc<AbbreviationTable>> {
        // Clone the cell out so no map guard is held across the await.
        let cell = Arc::clone(&*self.partitions.entry(partition).or_default());

        cell.get_or_init(|| self.load(partition)).await.clone()
    }

    async fn load(&self, partition: Partition) -> Option<Arc<AbbreviationTable>> {
        let page = partition.page_name();
        tracing::debug!(source = self.source.name(), page = %page, "fetching abbreviation partition");

        let result = match tokio::time::timeout(self.timeout, self.source.fetch(&partition)).await {
            Ok(result) => result,
            Err(_) => Err(AbbrevError::Timeout(self.timeout)),
        };

        match result {
            Ok(table) => {
                tracing::debug!(page = %page, entries = table.len(), "abbreviation partition cached");
                Some(Arc::new(table))
            }
            Err(e) => {
                tracing::warn!(
                    source = self.source.name(),
                    page = %page,
                    error = %e,
                    "abbreviation partition unavailable"
                );
                None
            }
        }
    }

    /// Whether a partition has been loaded (or its load has failed).
    pub fn is_cached(&self, partition: Partition) -> bool {
        self.partitions
            .get(&partition)
            .is_some_and(|cell| cell.initialized())
    }

    /// Number of partitions with a loaded table.
    pub fn cached_partitions(&self) -> usize {
        self.partitions
            .iter()
            .filter(|entry| matches!(entry.value().get(), Some(Some(_))))
            .count()
    }

    /// Drop every cached partition, including failed ones.
    pub fn clear(&self) {
        self.partitions.clear();
    }
}

impl JournalAbbreviator for AbbreviationResolver {
    fn abbreviate<'a>(
        &'a self,
        journal_title: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(AbbreviationResolver::abbreviate(self, journal_title))
    }
}
