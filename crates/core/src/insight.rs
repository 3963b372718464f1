//! Plain-data contract for the external Insight Generator.
//!
//! The generator (an LLM-backed analysis service) lives outside this
//! workspace; prompt construction and response parsing happen there. The
//! core only defines what crosses the boundary: flat campaign records,
//! optional message templates, and an opaque response the core passes
//! through untouched.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outreach channel a message template was sent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Linkedin,
}

/// One message template with its observed performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub channel: Channel,
    /// Subject line; LinkedIn messages have none.
    pub subject: Option<String>,
    pub body: String,
    /// Observed reply percentage for this template.
    pub reply_rate: f64,
}

/// Flat per-campaign record: identifiers, headline counters, and every
/// derived rate as a primitive, ready for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignReport {
    pub campaign_id: String,
    pub campaign_name: String,
    pub total_leads: u64,
    pub emails_sent: u64,
    pub linkedin_sent: u64,
    pub total_replies: u64,
    pub total_conversions: u64,
    pub open_rate: f64,
    pub click_rate: f64,
    pub email_reply_rate: f64,
    pub linkedin_acceptance_rate: f64,
    pub linkedin_reply_rate: f64,
    pub overall_reply_rate: f64,
    pub conversion_rate: f64,
}

/// Analysis flavors the generator understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Copywriting critique and strategic advice over the full batch.
    Analysis,
    /// Head-to-head comparison identifying winners.
    Comparison,
    /// Next A/B tests worth running.
    AbSuggestions,
    /// New content variants derived from winning templates.
    Variants,
    /// Spam-risk scoring of message templates.
    SpamCheck,
    /// Free-form question, answered as plain text.
    Question(String),
}

/// Request handed to the Insight Generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRequest {
    pub kind: InsightKind,
    pub campaigns: Vec<CampaignReport>,
    /// Message templates keyed by campaign name, when the caller has them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates: Option<HashMap<String, Vec<MessageTemplate>>>,
}

impl InsightRequest {
    #[must_use]
    pub fn new(kind: InsightKind, campaigns: Vec<CampaignReport>) -> Self {
        Self {
            kind,
            campaigns,
            templates: None,
        }
    }

    /// Attaches message templates keyed by campaign name.
    #[must_use]
    pub fn with_templates(mut self, templates: HashMap<String, Vec<MessageTemplate>>) -> Self {
        self.templates = Some(templates);
        self
    }
}

/// Generator output.
///
/// The structured payload's shape varies by analysis kind; nothing in the
/// core depends on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightResponse {
    Structured(serde_json::Value),
    Text(String),
}
