//! Campaign engagement metrics.
//!
//! `CampaignMetrics` holds the raw funnel counters the upstream campaign
//! API reports for a single campaign. Rates are derived on read and never
//! stored; a refresh produces a whole new instance rather than mutating an
//! existing one.

use crate::insight::CampaignReport;
use serde::{Deserialize, Serialize};

/// Rounds to two decimal places so repeated reads compare exactly.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of `numerator` over `denominator`; 0.0 when the denominator
/// is 0, never a division error.
fn rate(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round2(numerator as f64 / denominator as f64 * 100.0)
}

/// One row of the upstream campaign listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSummary {
    /// Stable external identifier.
    pub id: String,
    /// Display label.
    pub name: String,
    /// Upstream lifecycle status, when reported.
    pub status: Option<String>,
}

/// Engagement funnel for one campaign at the time of the last fetch.
///
/// Counters come from the upstream as-is; they are not validated or
/// reconciled against each other. `total_replies` in particular is reported
/// independently and is not required to equal
/// `emails_replied + linkedin_replied`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CampaignMetrics {
    pub campaign_id: String,
    /// Display label; placeholder text when the fetch failed.
    pub campaign_name: String,
    #[serde(default)]
    pub total_leads: u64,
    #[serde(default)]
    pub emails_sent: u64,
    #[serde(default)]
    pub emails_opened: u64,
    #[serde(default)]
    pub emails_clicked: u64,
    #[serde(default)]
    pub emails_replied: u64,
    #[serde(default)]
    pub linkedin_sent: u64,
    #[serde(default)]
    pub linkedin_accepted: u64,
    #[serde(default)]
    pub linkedin_replied: u64,
    /// Cross-channel reply count as the upstream computes it.
    #[serde(default)]
    pub total_replies: u64,
    #[serde(default)]
    pub total_conversions: u64,
}

impl CampaignMetrics {
    /// Zero-counter stand-in for a campaign whose fetch failed.
    #[must_use]
    pub fn placeholder(campaign_id: impl Into<String>, campaign_name: impl Into<String>) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            campaign_name: campaign_name.into(),
            ..Self::default()
        }
    }

    /// Emails opened per email sent, as a percentage.
    #[must_use]
    pub fn open_rate(&self) -> f64 {
        rate(self.emails_opened, self.emails_sent)
    }

    /// Emails clicked per email sent, as a percentage.
    #[must_use]
    pub fn click_rate(&self) -> f64 {
        rate(self.emails_clicked, self.emails_sent)
    }

    /// Email replies per email sent, as a percentage.
    #[must_use]
    pub fn email_reply_rate(&self) -> f64 {
        rate(self.emails_replied, self.emails_sent)
    }

    /// Accepted connection requests per request sent, as a percentage.
    #[must_use]
    pub fn linkedin_acceptance_rate(&self) -> f64 {
        rate(self.linkedin_accepted, self.linkedin_sent)
    }

    /// LinkedIn replies per request sent, as a percentage.
    #[must_use]
    pub fn linkedin_reply_rate(&self) -> f64 {
        rate(self.linkedin_replied, self.linkedin_sent)
    }

    /// Replies across both channels per outgoing touch, as a percentage.
    ///
    /// Uses the upstream `total_replies` counter verbatim; the upstream may
    /// count cross-channel unique replies, so this is not recomputed from
    /// the per-channel counters.
    #[must_use]
    pub fn overall_reply_rate(&self) -> f64 {
        rate(self.total_replies, self.emails_sent + self.linkedin_sent)
    }

    /// Conversions per lead, as a percentage.
    #[must_use]
    pub fn conversion_rate(&self) -> f64 {
        rate(self.total_conversions, self.total_leads)
    }

    /// Flat record handed to the presentation layer and Insight Generator.
    #[must_use]
    pub fn report_row(&self) -> CampaignReport {
        CampaignReport {
            campaign_id: self.campaign_id.clone(),
            campaign_name: self.campaign_name.clone(),
            total_leads: self.total_leads,
            emails_sent: self.emails_sent,
            linkedin_sent: self.linkedin_sent,
            total_replies: self.total_replies,
            total_conversions: self.total_conversions,
            open_rate: self.open_rate(),
            click_rate: self.click_rate(),
            email_reply_rate: self.email_reply_rate(),
            linkedin_acceptance_rate: self.linkedin_acceptance_rate(),
            linkedin_reply_rate: self.linkedin_reply_rate(),
            overall_reply_rate: self.overall_reply_rate(),
            conversion_rate: self.conversion_rate(),
        }
    }
}
