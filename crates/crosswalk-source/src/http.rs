//! HTTP retrieval of code documents.

use std::time::Duration;

use async_trait::async_trait;
use crosswalk_core::CodeFamily;
use tracing::info;

use crate::{DocumentSource, SourceError};

// Some statute hosts reject the default reqwest UA.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; crosswalk/0.1)";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches each family's document from a fixed URL. One attempt per fetch,
/// no retries; a failure is reported and the family is left alone.
pub struct HttpSource {
    client: reqwest::Client,
    old_url: String,
    new_url: String,
}

impl HttpSource {
    pub fn new(old_url: String, new_url: String) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            old_url,
            new_url,
        })
    }

    fn url_for(&self, family: CodeFamily) -> &str {
        match family {
            CodeFamily::Old => &self.old_url,
            CodeFamily::New => &self.new_url,
        }
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self, family: CodeFamily) -> Result<String, SourceError> {
        let url = self.url_for(family);
        info!(url = %url, family = %family, "fetching code document");

        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound {
                family,
                location: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(SourceError::Server {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = resp.bytes().await?;
        let text =
            String::from_utf8(bytes.to_vec()).map_err(|_| SourceError::Malformed { family })?;
        info!(family = %family, bytes = text.len(), "fetched code document");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_choice_follows_family() {
        let source = HttpSource::new(
            "https://example.org/old.txt".into(),
            "https://example.org/new.txt".into(),
        )
        .unwrap();
        assert_eq!(
            source.url_for(CodeFamily::Old),
            "https://example.org/old.txt"
        );
        assert_eq!(
            source.url_for(CodeFamily::New),
            "https://example.org/new.txt"
        );
    }
}
