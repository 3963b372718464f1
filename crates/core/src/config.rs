use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub insights: InsightsConfig,
}

/// Upstream campaign API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Pass-through credential sent as the `apikey` query parameter.
    pub api_key: Option<String>,
    /// Listing page size; the upstream caps pages at 25.
    pub page_size: u32,
    pub timeout_secs: u64,
    pub requests_per_minute: u32,
}

/// Settings forwarded to whichever Insight Generator implementation the
/// application wires in. Opaque to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    pub enabled: bool,
    pub model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            insights: InsightsConfig::default(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://apiv2.lagrowthmachine.com/flow".to_string(),
            api_key: None,
            page_size: 25,
            timeout_secs: 30,
            requests_per_minute: 60,
        }
    }
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gemini-1.5-flash".to_string(),
        }
    }
}
