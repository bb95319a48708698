use std::time::Instant;

use anyhow::Context;

use super::{MultiSearchRequest, MultiSearchResponse, SearchDriver};

const DEFAULT_SEARCH_URL: &str = "http://127.0.0.1:8108";
const API_KEY_HEADER: &str = "X-TYPESENSE-API-KEY";


/// Posts multi-search batches to `{base_url}/multi_search`.
#[derive(Debug, Clone)]
pub struct HttpSearchDriver {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpSearchDriver {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into().trim_end_matches('/').to_string(), api_key }
    }

    /// Reads `SEARCH_URL` and `SEARCH_API_KEY`.
    pub fn from_env() -> Self {
        let base_url = std::env::var("SEARCH_URL").unwrap_or(DEFAULT_SEARCH_URL.to_string());
        let api_key = std::env::var("SEARCH_API_KEY").ok().filter(|key| !key.is_empty());
        Self::new(base_url, api_key)
    }

    pub fn endpoint(&self) -> String {
        format!("{}/multi_search", self.base_url)
    }
}

impl SearchDriver for HttpSearchDriver {
    async fn multi_search(&self, request: MultiSearchRequest) -> anyhow::Result<MultiSearchResponse> {
        let t0 = Instant::now();
        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, api_key);
        }

        let response = builder.send().await.with_context(|| format!("search backend unreachable at {}", self.base_url))?;
        let status = response.status();
        let response_txt = response.text().await?;
        if status.is_client_error() || status.is_server_error() {
            tracing::error!("Search backend answered {}", status);
            anyhow::bail!("Error: {}: {}", status, response_txt);
        }
        let dt_ms = t0.elapsed().as_millis();
        tracing::info!(
            "Multi-search with {} requests answered in {}ms (len = {})",
            request.searches.len(),
            dt_ms,
            response_txt.len()
        );

        let response: MultiSearchResponse =
            serde_json::from_str(&response_txt).context("search backend returned an unexpected payload")?;
        Ok(response)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let driver = HttpSearchDriver::new("http://search.local:8108/", None);
        assert_eq!(driver.endpoint(), "http://search.local:8108/multi_search");
    }
}
