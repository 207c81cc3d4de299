//! Web of Science journal title abbreviation pages.

use std::future::Future;
use std::pin::Pin;

use super::{AbbrevError, AbbreviationTable, Partition, PartitionSource};

pub const WOS_URL_TEMPLATE: &str =
    "https://images.webofknowledge.com/images/help/WOS/{page}_abrvjt.html";

/// Fetches one `{page}_abrvjt.html` page per partition.
pub struct WosSource {
    client: reqwest::Client,
    url_template: String,
}

impl Default for WosSource {
    fn default() -> Self {
        Self::new(reqwest::Client::new(), WOS_URL_TEMPLATE)
    }
}

impl WosSource {
    /// `url_template` must contain a `{page}` placeholder.
    pub fn new(client: reqwest::Client, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
        }
    }

    pub fn url_for(&self, partition: &Partition) -> String {
        self.url_template.replace("{page}", &partition.page_name())
    }
}

impl PartitionSource for WosSource {
    fn name(&self) -> &str {
        "Web of Science"
    }

    fn fetch<'a>(
        &'a self,
        partition: &'a Partition,
    ) -> Pin<Box<dyn Future<Output = Result<AbbreviationTable, AbbrevError>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.url_for(partition);
            let resp = self
                .client
                .get(&url)
                .header("User-Agent", concat!("recite/", env!("CARGO_PKG_VERSION")))
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                return Err(AbbrevError::Status {
                    url,
                    status: status.as_u16(),
                });
            }

            let body = resp.text().await?;

            // Parse in spawn_blocking to avoid !Send scraper types
            let table = tokio::task::spawn_blocking(move || AbbreviationTable::parse_html(&body))
                .await
                .map_err(|e| AbbrevError::Parse(e.to_string()))?;

            if table.is_empty() {
                return Err(AbbrevError::Parse(format!("no title entries at {url}")));
            }
            Ok(table)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_partition() {
        let source = WosSource::default();
        assert_eq!(
            source.url_for(&Partition::Letter('N')),
            "https://images.webofknowledge.com/images/help/WOS/N_abrvjt.html"
        );
        assert_eq!(
            source.url_for(&Partition::Digits),
            "https://images.webofknowledge.com/images/help/WOS/0-9_abrvjt.html"
        );
    }

    #[test]
    fn test_custom_template() {
        let source = WosSource::new(reqwest::Client::new(), "http://localhost:9/{page}.html");
        assert_eq!(source.url_for(&Partition::Letter('A')), "http://localhost:9/A.html");
    }
}
