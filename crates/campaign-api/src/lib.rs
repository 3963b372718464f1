//! Upstream campaign-management API integration for the outreach dashboard.
//!
//! This crate provides:
//! - REST client with rate limiting for the campaign API
//! - Exhaustive pagination over the campaign listing endpoint
//! - Normalization of every historical response shape into `CampaignMetrics`
//! - Fault-isolated batch fetching: one degraded row per failed campaign,
//!   never a failed batch
//! - A cheap connectivity probe for the dashboard's "test connection" button
//!
//! # Example
//!
//! ```ignore
//! use outreach_campaign_api::{CampaignClient, CampaignClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = CampaignClient::new(api_key, CampaignClientConfig::default())?;
//!
//!     if !client.test_connection().await {
//!         anyhow::bail!("campaign API unreachable");
//!     }
//!
//!     let campaigns = client.list_campaigns().await?;
//!     let ids: Vec<String> = campaigns.iter().map(|c| c.id.clone()).collect();
//!     let names = campaigns.into_iter().map(|c| (c.id, c.name)).collect();
//!     let metrics = client.get_metrics_batch(&ids, &names).await;
//!     assert_eq!(metrics.len(), ids.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Authentication
//!
//! Every request carries the API key as the `apikey` query parameter. The
//! key is stored as a `SecretString` and never appears in logs, `Debug`
//! output, or error messages.
//!
//! # API Endpoints
//!
//! - `GET /campaigns?skip&limit` - paginated campaign listing
//! - `GET /campaigns/{id}/stats` - raw statistics for one campaign
//! - `GET /audiences` - low-cost listing used as the connectivity probe

pub mod client;
pub mod error;
pub mod normalize;

// Re-export main types for convenience
pub use client::{CampaignClient, CampaignClientConfig, CAMPAIGN_API_URL};
pub use error::{Result, UpstreamError};
