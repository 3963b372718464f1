//! Campaign API REST client with rate limiting.
//!
//! Provides typed access to the upstream campaign-management service:
//! exhaustive pagination over the listing endpoint, per-campaign statistics
//! normalized through the alias tables, fault-isolated batch fetches, and a
//! cheap connectivity probe.
//!
//! # Example
//!
//! ```ignore
//! use outreach_campaign_api::{CampaignClient, CampaignClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = CampaignClient::new(
//!         std::env::var("CAMPAIGN_API_KEY")?,
//!         CampaignClientConfig::default(),
//!     )?;
//!
//!     let campaigns = client.list_campaigns().await?;
//!     println!("Found {} campaigns", campaigns.len());
//!
//!     let ids: Vec<String> = campaigns.iter().map(|c| c.id.clone()).collect();
//!     let names = campaigns.into_iter().map(|c| (c.id, c.name)).collect();
//!     for metrics in client.get_metrics_batch(&ids, &names).await {
//!         println!("{}: {:.2}% open rate", metrics.campaign_name, metrics.open_rate());
//!     }
//!
//!     Ok(())
//! }
//! ```

use crate::error::{Result, UpstreamError};
use crate::normalize;
use async_trait::async_trait;
use futures_util::future::join_all;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use outreach_core::config::UpstreamConfig;
use outreach_core::traits::CampaignSource;
use outreach_core::{CampaignMetrics, CampaignSummary};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Constants
// =============================================================================

/// Production base URL of the campaign API.
pub const CAMPAIGN_API_URL: &str = "https://apiv2.lagrowthmachine.com/flow";

/// Hard cap on listing pages fetched by one `list_campaigns` call. The
/// upstream has not been observed echoing full pages forever, but a
/// cursorless skip/limit loop must not depend on that.
const MAX_PAGES: u32 = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the campaign API client.
///
/// The API key is not part of the config; it is handed to
/// [`CampaignClient::new`] and kept out of anything that derives `Debug`.
#[derive(Debug, Clone)]
pub struct CampaignClientConfig {
    /// Base URL for the API.
    pub base_url: String,

    /// Listing page size; the upstream caps pages at 25.
    pub page_size: u32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Requests per minute limit.
    pub requests_per_minute: NonZeroU32,
}

impl Default for CampaignClientConfig {
    fn default() -> Self {
        Self {
            base_url: CAMPAIGN_API_URL.to_string(),
            page_size: 25,
            timeout_secs: 30,
            requests_per_minute: nonzero!(60u32),
        }
    }
}

impl CampaignClientConfig {
    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the listing page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the rate limit.
    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_minute: NonZeroU32) -> Self {
        self.requests_per_minute = requests_per_minute;
        self
    }
}

impl From<&UpstreamConfig> for CampaignClientConfig {
    fn from(config: &UpstreamConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            page_size: config.page_size,
            timeout_secs: config.timeout_secs,
            requests_per_minute: NonZeroU32::new(config.requests_per_minute)
                .unwrap_or(nonzero!(60u32)),
        }
    }
}

// =============================================================================
// API Response Types
// =============================================================================

/// Raw listing envelope from the campaign API.
#[derive(Debug, Clone, Deserialize)]
struct RawCampaignsResponse {
    campaigns: Option<Vec<RawCampaign>>,
}

/// Raw campaign row from the listing endpoint.
#[derive(Debug, Clone, Deserialize)]
struct RawCampaign {
    id: String,
    name: Option<String>,
    status: Option<String>,
}

impl From<RawCampaign> for CampaignSummary {
    fn from(raw: RawCampaign) -> Self {
        Self {
            id: raw.id,
            name: raw.name.unwrap_or_default(),
            status: raw.status,
        }
    }
}

/// Display name used when the caller has no better label for an id.
fn default_campaign_name(campaign_id: &str) -> String {
    let prefix: String = campaign_id.chars().take(8).collect();
    format!("Campaign {prefix}...")
}

// =============================================================================
// CampaignClient
// =============================================================================

/// Campaign API REST client.
///
/// Stateless between calls: no cursor or session is retained, every call is
/// independent, and the client can be shared freely behind an `Arc`.
pub struct CampaignClient {
    /// Configuration.
    config: CampaignClientConfig,

    /// API key, attached to every request as the `apikey` query parameter.
    api_key: SecretString,

    /// HTTP client.
    http: Client,

    /// Rate limiter.
    rate_limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
}

impl std::fmt::Debug for CampaignClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CampaignClient")
            .field("base_url", &self.config.base_url)
            .field("page_size", &self.config.page_size)
            .finish_non_exhaustive()
    }
}

impl CampaignClient {
    /// Creates a new client with the given API key and configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, config: CampaignClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                UpstreamError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        let quota = Quota::per_minute(config.requests_per_minute);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            config,
            api_key: SecretString::from(api_key.into()),
            http,
            rate_limiter,
        })
    }

    /// Creates a client from the application's upstream config section.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        let api_key = config.api_key.clone().unwrap_or_default();
        Self::new(api_key, CampaignClientConfig::from(config))
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Waits for the rate limiter and makes an authenticated GET request.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.config.base_url, path);

        // Log the path, not the URL: the full URL carries the key.
        tracing::debug!("GET {}", path);

        let response = self
            .http
            .get(&url)
            .query(&[("apikey", self.api_key.expose_secret())])
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handles an API response, converting errors appropriately.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(UpstreamError::rate_limit(retry_after));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(UpstreamError::api(status.as_u16(), text));
        }

        let body = response.json::<T>().await?;
        Ok(body)
    }

    // =========================================================================
    // Campaign Endpoints
    // =========================================================================

    /// Lists every campaign, paging through the listing endpoint until the
    /// upstream returns a short or empty page.
    ///
    /// Fetches at most `ceil(total / page_size) + 1` pages from a
    /// well-behaved upstream, and never more than `MAX_PAGES` from a
    /// misbehaving one.
    ///
    /// # Errors
    /// Returns error if any page fetch fails.
    pub async fn list_campaigns(&self) -> Result<Vec<CampaignSummary>> {
        let limit = self.config.page_size.max(1);
        let mut all = Vec::new();
        let mut skip: u32 = 0;

        for _ in 0..MAX_PAGES {
            let response: RawCampaignsResponse = self
                .get(
                    "/campaigns",
                    &[("skip", skip.to_string()), ("limit", limit.to_string())],
                )
                .await?;

            let page: Vec<CampaignSummary> = response
                .campaigns
                .unwrap_or_default()
                .into_iter()
                .map(CampaignSummary::from)
                .collect();

            let fetched = page.len() as u32;
            all.extend(page);

            if fetched < limit {
                return Ok(all);
            }
            skip += limit;
        }

        tracing::warn!(
            pages = MAX_PAGES,
            campaigns = all.len(),
            "campaign listing never returned a short page; stopping at the page cap"
        );
        Ok(all)
    }

    /// Fetches and normalizes statistics for a single campaign.
    ///
    /// The display name defaults to a truncated-id placeholder; callers
    /// that know the real name should prefer [`Self::get_metrics_batch`]
    /// with name overrides.
    ///
    /// # Errors
    /// Returns error if the request fails, times out, returns a non-success
    /// status, or yields an unparseable body.
    pub async fn get_metrics(&self, campaign_id: &str) -> Result<CampaignMetrics> {
        self.get_metrics_named(campaign_id, &default_campaign_name(campaign_id))
            .await
    }

    async fn get_metrics_named(&self, campaign_id: &str, name: &str) -> Result<CampaignMetrics> {
        let path = format!("/campaigns/{campaign_id}/stats");
        let stats: Value = self.get(&path, &[]).await?;
        Ok(normalize::campaign_metrics(campaign_id, name, &stats))
    }

    /// Fetches metrics for several campaigns at once.
    ///
    /// Always yields exactly one entry per requested id, in input order.
    /// Requests run concurrently; a campaign whose fetch fails is replaced
    /// by a zero-counter placeholder whose name carries an `" (error)"`
    /// suffix, and the error never escapes the batch.
    pub async fn get_metrics_batch(
        &self,
        campaign_ids: &[String],
        name_overrides: &HashMap<String, String>,
    ) -> Vec<CampaignMetrics> {
        let futures: Vec<_> = campaign_ids
            .iter()
            .map(|id| {
                let name = name_overrides
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| default_campaign_name(id));
                async move {
                    match self.get_metrics_named(id, &name).await {
                        Ok(metrics) => metrics,
                        Err(e) => {
                            tracing::warn!(
                                campaign_id = %id,
                                error = %e,
                                "Failed to fetch campaign metrics"
                            );
                            CampaignMetrics::placeholder(id.clone(), format!("{name} (error)"))
                        }
                    }
                }
            })
            .collect();

        join_all(futures).await
    }

    // =========================================================================
    // Connectivity
    // =========================================================================

    /// Lists audiences; the cheapest authenticated call the API offers.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn get_audiences(&self) -> Result<Vec<Value>> {
        self.get("/audiences", &[]).await
    }

    /// Reports whether an authenticated upstream call currently succeeds.
    ///
    /// Never fails: any `UpstreamError` from the probe is reported as
    /// `false`.
    pub async fn test_connection(&self) -> bool {
        match self.get_audiences().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Connectivity probe failed");
                false
            }
        }
    }
}

#[async_trait]
impl CampaignSource for CampaignClient {
    async fn list_campaigns(&self) -> anyhow::Result<Vec<CampaignSummary>> {
        Ok(CampaignClient::list_campaigns(self).await?)
    }

    async fn metrics_batch(
        &self,
        campaign_ids: &[String],
        name_overrides: &HashMap<String, String>,
    ) -> Vec<CampaignMetrics> {
        self.get_metrics_batch(campaign_ids, name_overrides).await
    }

    async fn test_connection(&self) -> bool {
        CampaignClient::test_connection(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: String) -> CampaignClient {
        CampaignClient::new(
            "test-key",
            CampaignClientConfig::default()
                .with_base_url(base_url)
                .with_rate_limit(nonzero!(100_000u32)),
        )
        .unwrap()
    }

    fn campaign_page(skip: u32, count: u32) -> Value {
        let campaigns: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "id": format!("cmp-{:03}", skip + i),
                    "name": format!("Campaign {}", skip + i),
                    "status": "running",
                })
            })
            .collect();
        json!({ "campaigns": campaigns })
    }

    #[test]
    fn test_client_creation() {
        let client =
            CampaignClient::new("test-key", CampaignClientConfig::default()).unwrap();
        assert_eq!(client.base_url(), CAMPAIGN_API_URL);
    }

    #[test]
    fn test_client_with_base_url() {
        let client = CampaignClient::new("test-key", CampaignClientConfig::default())
            .unwrap()
            .with_base_url("http://localhost:8080");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_from_upstream_config() {
        let upstream = UpstreamConfig {
            requests_per_minute: 0, // invalid; falls back to the default
            ..UpstreamConfig::default()
        };
        let config = CampaignClientConfig::from(&upstream);
        assert_eq!(config.requests_per_minute, nonzero!(60u32));
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn test_debug_output_omits_api_key() {
        let client =
            CampaignClient::new("super-secret-key", CampaignClientConfig::default()).unwrap();
        let debug_output = format!("{:?}", client);
        assert!(!debug_output.contains("super-secret-key"));
    }

    #[test]
    fn test_default_campaign_name_truncates_id() {
        assert_eq!(
            default_campaign_name("0123456789abcdef"),
            "Campaign 01234567..."
        );
        assert_eq!(default_campaign_name("abc"), "Campaign abc...");
    }

    #[tokio::test]
    async fn test_list_campaigns_pages_to_exhaustion() {
        let mock_server = MockServer::start().await;

        // Three full pages of 25, then a short page of 10. Each mock
        // expects exactly one request: 4 page fetches total.
        for (skip, count) in [(0u32, 25u32), (25, 25), (50, 25), (75, 10)] {
            Mock::given(method("GET"))
                .and(path("/campaigns"))
                .and(query_param("skip", skip.to_string()))
                .and(query_param("limit", "25"))
                .and(query_param("apikey", "test-key"))
                .respond_with(ResponseTemplate::new(200).set_body_json(campaign_page(skip, count)))
                .expect(1)
                .mount(&mock_server)
                .await;
        }

        let client = test_client(mock_server.uri());
        let campaigns = client.list_campaigns().await.unwrap();

        assert_eq!(campaigns.len(), 85);
        assert_eq!(campaigns[0].id, "cmp-000");
        assert_eq!(campaigns[84].id, "cmp-084");
    }

    #[tokio::test]
    async fn test_list_campaigns_single_short_page() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/campaigns"))
            .respond_with(ResponseTemplate::new(200).set_body_json(campaign_page(0, 3)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        let campaigns = client.list_campaigns().await.unwrap();
        assert_eq!(campaigns.len(), 3);
    }

    #[tokio::test]
    async fn test_list_campaigns_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/campaigns"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "campaigns": [] })))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        let campaigns = client.list_campaigns().await.unwrap();
        assert!(campaigns.is_empty());
    }

    #[tokio::test]
    async fn test_list_campaigns_stops_at_page_cap() {
        let mock_server = MockServer::start().await;

        // A misbehaving upstream that echoes a full page forever must not
        // hang the caller.
        Mock::given(method("GET"))
            .and(path("/campaigns"))
            .respond_with(ResponseTemplate::new(200).set_body_json(campaign_page(0, 25)))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        let campaigns = client.list_campaigns().await.unwrap();
        assert_eq!(campaigns.len(), (MAX_PAGES * 25) as usize);
    }

    #[tokio::test]
    async fn test_list_campaigns_propagates_page_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/campaigns"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        let err = client.list_campaigns().await.unwrap_err();
        assert!(matches!(err, UpstreamError::Api { status_code: 500, .. }));
    }

    #[tokio::test]
    async fn test_get_metrics_normalizes_stats() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/campaigns/cmp-001/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "engagementStats": {
                    "audienceSize": 200,
                    "converted": 10,
                    "channel": { "email": {
                        "sent": 120, "opened": 60, "clicked": 12, "replied": 9,
                    }},
                    "replies": { "replied": 9 },
                }
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        let metrics = client.get_metrics("cmp-001").await.unwrap();

        assert_eq!(metrics.campaign_id, "cmp-001");
        assert_eq!(metrics.emails_sent, 120);
        assert_eq!(metrics.open_rate(), 50.0);
        assert_eq!(metrics.total_leads, 200);
        assert_eq!(metrics.campaign_name, "Campaign cmp-001...");
    }

    #[tokio::test]
    async fn test_get_metrics_propagates_upstream_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/campaigns/cmp-404/stats"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        let err = client.get_metrics("cmp-404").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Api { status_code: 404, .. }));
    }

    #[tokio::test]
    async fn test_get_metrics_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/campaigns/cmp-001/stats"))
            .respond_with(
                ResponseTemplate::new(429).insert_header("Retry-After", "17"),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        let err = client.get_metrics("cmp-001").await.unwrap_err();
        assert!(matches!(
            err,
            UpstreamError::RateLimit {
                retry_after_secs: 17
            }
        ));
    }

    #[tokio::test]
    async fn test_batch_isolates_per_campaign_failures() {
        let mock_server = MockServer::start().await;

        let stats = json!({ "email": { "sent": 100, "opened": 40 } });
        for id in ["a", "c"] {
            Mock::given(method("GET"))
                .and(path(format!("/campaigns/{id}/stats")))
                .respond_with(ResponseTemplate::new(200).set_body_json(stats.clone()))
                .mount(&mock_server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/campaigns/b/stats"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let names = HashMap::from([
            ("a".to_string(), "Alpha".to_string()),
            ("b".to_string(), "Beta".to_string()),
            ("c".to_string(), "Gamma".to_string()),
        ]);

        let results = client.get_metrics_batch(&ids, &names).await;

        // Exactly one result per input id, in input order.
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].campaign_id, "a");
        assert_eq!(results[1].campaign_id, "b");
        assert_eq!(results[2].campaign_id, "c");

        assert_eq!(results[0].campaign_name, "Alpha");
        assert_eq!(results[0].emails_sent, 100);

        // The failed campaign degrades to a marked placeholder.
        assert_eq!(results[1].campaign_name, "Beta (error)");
        assert_eq!(results[1].emails_sent, 0);
        assert_eq!(results[1].open_rate(), 0.0);

        assert_eq!(results[2].campaign_name, "Gamma");
    }

    #[tokio::test]
    async fn test_batch_without_name_overrides() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/campaigns/0123456789abcdef/stats"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        let ids = vec!["0123456789abcdef".to_string()];
        let results = client.get_metrics_batch(&ids, &HashMap::new()).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].campaign_name, "Campaign 01234567... (error)");
    }

    #[tokio::test]
    async fn test_connection_ok() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/audiences"))
            .and(query_param("apikey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        assert!(client.test_connection().await);
    }

    #[tokio::test]
    async fn test_connection_false_on_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/audiences"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        assert!(!client.test_connection().await);
    }
}
