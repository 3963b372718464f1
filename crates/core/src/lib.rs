pub mod config;
pub mod config_loader;
pub mod insight;
pub mod metrics;
pub mod traits;

pub use config::{AppConfig, InsightsConfig, UpstreamConfig};
pub use config_loader::ConfigLoader;
pub use insight::{
    CampaignReport, Channel, InsightKind, InsightRequest, InsightResponse, MessageTemplate,
};
pub use metrics::{CampaignMetrics, CampaignSummary};
pub use traits::{CampaignSource, InsightGenerator};
