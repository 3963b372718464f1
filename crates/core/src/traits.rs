use crate::insight::{InsightRequest, InsightResponse};
use crate::metrics::{CampaignMetrics, CampaignSummary};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Produces narrative analysis from campaign reports.
///
/// Implemented outside this workspace; the response is opaque data the
/// core never inspects.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    async fn generate(&self, request: InsightRequest) -> Result<InsightResponse>;
}

/// Source of campaign listings and metrics, as the presentation layer
/// consumes it.
#[async_trait]
pub trait CampaignSource: Send + Sync {
    /// Lists every campaign the upstream knows about.
    async fn list_campaigns(&self) -> Result<Vec<CampaignSummary>>;

    /// Fetches metrics for the given ids: exactly one entry per id, in
    /// input order, with failed fetches degraded to placeholders rather
    /// than errors.
    async fn metrics_batch(
        &self,
        campaign_ids: &[String],
        name_overrides: &HashMap<String, String>,
    ) -> Vec<CampaignMetrics>;

    /// Reports whether an authenticated upstream call currently succeeds.
    async fn test_connection(&self) -> bool;
}
