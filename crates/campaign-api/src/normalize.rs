//! Normalization of upstream statistics payloads.
//!
//! The campaign API has shipped several response shapes over the years:
//! flat top-level counters, counters under a `global`/`summary` object
//! with per-channel `email`/`linkedin` sub-objects, and an
//! `engagementStats` envelope with `channel`/`relations`/`replies`
//! sub-objects. Accounts on different upstream versions still return
//! different shapes, so all of them stay supported at once.
//!
//! Every target counter has exactly one ordered probe list in this module.
//! The first probe that resolves wins; a counter absent from every probe
//! defaults to 0. Supporting a new upstream variant is one added probe.

use outreach_core::CampaignMetrics;
use serde_json::Value;

/// A candidate location for a counter in the stats document.
enum Probe {
    /// Nested key path, e.g. `["channel", "email", "sent"]`.
    Path(&'static [&'static str]),
    /// Sum of several paths, for counters the upstream splits across
    /// fields. Resolves when at least one path is present.
    Sum(&'static [&'static [&'static str]]),
}

const TOTAL_LEADS: &[Probe] = &[
    Probe::Path(&["totalLeads"]),
    Probe::Path(&["audienceSize"]),
    Probe::Path(&["global", "totalLeads"]),
    Probe::Path(&["global", "audienceSize"]),
    Probe::Path(&["summary", "totalLeads"]),
];

const EMAILS_SENT: &[Probe] = &[
    Probe::Path(&["emailsSent"]),
    Probe::Path(&["email", "sent"]),
    Probe::Path(&["channel", "email", "sent"]),
    Probe::Path(&["global", "emailsSent"]),
    Probe::Path(&["summary", "emailsSent"]),
];

const EMAILS_OPENED: &[Probe] = &[
    Probe::Path(&["emailsOpened"]),
    Probe::Path(&["email", "opened"]),
    Probe::Path(&["channel", "email", "opened"]),
    Probe::Path(&["global", "emailsOpened"]),
    Probe::Path(&["summary", "emailsOpened"]),
];

const EMAILS_CLICKED: &[Probe] = &[
    Probe::Path(&["emailsClicked"]),
    Probe::Path(&["email", "clicked"]),
    Probe::Path(&["channel", "email", "clicked"]),
    Probe::Path(&["global", "emailsClicked"]),
    Probe::Path(&["summary", "emailsClicked"]),
];

const EMAILS_REPLIED: &[Probe] = &[
    Probe::Path(&["emailsReplied"]),
    Probe::Path(&["email", "replied"]),
    Probe::Path(&["channel", "email", "replied"]),
    Probe::Path(&["global", "emailsReplied"]),
    Probe::Path(&["summary", "emailsReplied"]),
];

const LINKEDIN_SENT: &[Probe] = &[
    Probe::Path(&["linkedinSent"]),
    Probe::Path(&["linkedin", "sent"]),
    Probe::Path(&["channel", "linkedin", "contactRequest", "sent"]),
    Probe::Path(&["relations", "requestSent"]),
    Probe::Path(&["global", "linkedinSent"]),
];

const LINKEDIN_ACCEPTED: &[Probe] = &[
    Probe::Path(&["linkedinAccepted"]),
    Probe::Path(&["linkedin", "accepted"]),
    // Newer accounts split accepted connections into fresh and
    // pre-existing relations.
    Probe::Sum(&[
        &["relations", "newRelations"],
        &["relations", "alreadyConnected"],
    ]),
    Probe::Path(&["global", "linkedinAccepted"]),
];

const LINKEDIN_REPLIED: &[Probe] = &[
    Probe::Path(&["linkedinReplied"]),
    Probe::Path(&["linkedin", "replied"]),
    Probe::Path(&["replies", "linkedinReplied"]),
    Probe::Path(&["channel", "linkedin", "message", "replied"]),
    Probe::Path(&["global", "linkedinReplied"]),
];

const TOTAL_REPLIES: &[Probe] = &[
    Probe::Path(&["totalReplies"]),
    Probe::Path(&["replies", "replied"]),
    Probe::Path(&["global", "totalReplies"]),
    Probe::Path(&["global", "replied"]),
    Probe::Path(&["summary", "replied"]),
];

const TOTAL_CONVERSIONS: &[Probe] = &[
    Probe::Path(&["totalConversions"]),
    Probe::Path(&["converted"]),
    Probe::Path(&["global", "converted"]),
    Probe::Path(&["global", "totalConversions"]),
    Probe::Path(&["summary", "converted"]),
];

fn lookup<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |node, key| node.get(key))
}

/// Reads a counter as a non-negative integer. Negative or non-integer
/// values are treated as absent; the upstream body is untrusted.
fn counter_at(doc: &Value, path: &[&str]) -> Option<u64> {
    lookup(doc, path).and_then(Value::as_u64)
}

fn resolve(doc: &Value, probes: &[Probe]) -> u64 {
    for probe in probes {
        match probe {
            Probe::Path(path) => {
                if let Some(value) = counter_at(doc, path) {
                    return value;
                }
            }
            Probe::Sum(paths) => {
                let hits: Vec<u64> = paths.iter().filter_map(|p| counter_at(doc, p)).collect();
                if !hits.is_empty() {
                    return hits.iter().sum();
                }
            }
        }
    }
    0
}

/// Unwraps the `engagementStats` envelope when present. The upstream has
/// also shipped the same object at the document root.
fn stats_root(body: &Value) -> &Value {
    body.get("engagementStats").unwrap_or(body)
}

/// Builds a `CampaignMetrics` from a raw stats payload.
///
/// Never fails: unknown shapes simply produce zero counters.
pub fn campaign_metrics(
    campaign_id: impl Into<String>,
    campaign_name: impl Into<String>,
    body: &Value,
) -> CampaignMetrics {
    let stats = stats_root(body);
    CampaignMetrics {
        campaign_id: campaign_id.into(),
        campaign_name: campaign_name.into(),
        total_leads: resolve(stats, TOTAL_LEADS),
        emails_sent: resolve(stats, EMAILS_SENT),
        emails_opened: resolve(stats, EMAILS_OPENED),
        emails_clicked: resolve(stats, EMAILS_CLICKED),
        emails_replied: resolve(stats, EMAILS_REPLIED),
        linkedin_sent: resolve(stats, LINKEDIN_SENT),
        linkedin_accepted: resolve(stats, LINKEDIN_ACCEPTED),
        linkedin_replied: resolve(stats, LINKEDIN_REPLIED),
        total_replies: resolve(stats, TOTAL_REPLIES),
        total_conversions: resolve(stats, TOTAL_CONVERSIONS),
    }
}
