use crate::models::{FinalQuery, ShoppingResult};
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

const SERPAPI_ENDPOINT: &str = "https://serpapi.com/search.json";
const ENGINE: &str = "google_shopping";
const LANGUAGE: &str = "en";
const COUNTRY: &str = "us";

/// A product search provider.
#[async_trait]
pub trait ShoppingSearch: Send + Sync {
    async fn search(&self, query: &FinalQuery) -> Result<Vec<ShoppingResult>>;
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    shopping_results: Option<Vec<ShoppingResult>>,
    #[serde(default)]
    error: Option<String>,
}

/// Google Shopping through SerpApi. One GET per search, no retries.
pub struct SerpApiClient {
    http: reqwest::Client,
    api_key: String,
}

impl SerpApiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ShoppingSearch for SerpApiClient {
    async fn search(&self, query: &FinalQuery) -> Result<Vec<ShoppingResult>> {
        debug!(query = query.as_str(), "Querying SerpApi");
        let response = self
            .http
            .get(SERPAPI_ENDPOINT)
            .query(&[
                ("engine", ENGINE),
                ("q", query.as_str()),
                ("api_key", self.api_key.as_str()),
                ("hl", LANGUAGE),
                ("gl", COUNTRY),
            ])
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("SerpApi request failed: {}", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read SerpApi response: {}", e))?;

        decode_response(status, &body)
    }
}

fn decode_response(status: reqwest::StatusCode, body: &str) -> Result<Vec<ShoppingResult>> {
    let parsed: Option<SerpApiResponse> = serde_json::from_str(body).ok();

    if !status.is_success() {
        let detail = parsed
            .and_then(|p| p.error)
            .unwrap_or_else(|| body.chars().take(200).collect());
        anyhow::bail!("SerpApi returned {}: {}", status, detail);
    }

    let parsed = parsed.ok_or_else(|| anyhow::anyhow!("Failed to parse SerpApi response"))?;
    if let Some(error) = &parsed.error {
        warn!("SerpApi reported: {}", error);
    }
    Ok(parsed.shopping_results.unwrap_or_default())
}
