//! Wire types for the Mailpulse API contract.
//!
//! Field names on the wire are camelCase, matching the external service.
//! Every value is created fresh for a single email, flows through the
//! pipeline once, and is discarded.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

// =============================================================================
// Tracking (POST /api/emails)
// =============================================================================

/// Request payload for registering an email with the tracking service.
///
/// Immutable once built; `recipient`, `subject` and `html_content` are
/// expected to be non-empty (enforced by the caller).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRequest {
    /// Recipient email address
    pub recipient: String,
    /// Email subject line
    pub subject: String,
    /// Raw HTML body, exactly as the caller supplied it
    pub html_content: String,
    /// Campaign identifier or name; omitted from the JSON body when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    /// Arbitrary JSON metadata stored with the email
    pub metadata: Map<String, Value>,
}

impl TrackingRequest {
    /// Create a request with no campaign and empty metadata.
    pub fn new(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        html_content: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            subject: subject.into(),
            html_content: html_content.into(),
            campaign_id: None,
            metadata: Map::new(),
        }
    }

    /// Set the campaign field. `None` leaves the field out of the JSON body.
    pub fn with_campaign(mut self, campaign_id: Option<String>) -> Self {
        self.campaign_id = campaign_id;
        self
    }

    /// Attach metadata from a raw JSON string, leniently.
    pub fn with_metadata_json(mut self, raw: Option<&str>) -> Self {
        self.metadata = parse_metadata(raw);
        self
    }
}

/// Parse caller-supplied metadata JSON.
///
/// Malformed JSON and JSON that is not an object both collapse to an empty
/// map with a warning; a single bad metadata field must not block sending or
/// tracking.
pub fn parse_metadata(raw: Option<&str>) -> Map<String, Value> {
    let raw = match raw {
        Some(r) if !r.trim().is_empty() => r,
        _ => return Map::new(),
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            warn!(raw_length = raw.len(), "metadata_not_an_object");
            Map::new()
        }
        Err(e) => {
            warn!(error = %e, raw_length = raw.len(), "metadata_parse_failed");
            Map::new()
        }
    }
}

/// One trackable hyperlink discovered by the tracking service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkMapping {
    /// Exact string an anchor's `href` must equal, byte for byte
    pub original_url: String,
    /// Identifier of this link on the service
    pub tracking_id: String,
    /// Redirect URL that records the click before forwarding
    pub tracking_url: String,
}

impl LinkMapping {
    /// Create a new link mapping.
    pub fn new(
        original_url: impl Into<String>,
        tracking_id: impl Into<String>,
        tracking_url: impl Into<String>,
    ) -> Self {
        Self {
            original_url: original_url.into(),
            tracking_id: tracking_id.into(),
            tracking_url: tracking_url.into(),
        }
    }
}

/// Response payload from registering an email.
///
/// Produced once per email and consumed exactly once by the rewrite engine;
/// never cached or persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingResult {
    /// Identifier of the registered email
    pub email_tracking_id: String,
    /// Link substitutions, in service order; duplicates are permitted
    #[serde(default)]
    pub links: Vec<LinkMapping>,
    /// URL of the open-tracking pixel
    pub pixel_url: String,
}

/// Terminal artifact returned to the caller for one tracked email.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEmail {
    /// HTML with tracked hrefs substituted and the open pixel appended
    pub modified_html: String,
    /// Identifier of the registered email
    pub tracking_id: String,
    /// Recipient email address, echoed from the job
    pub recipient: String,
    /// Email subject, echoed from the job
    pub subject: String,
    /// Number of link mappings applied (mapping count, not anchor count)
    pub links_tracked: usize,
}

// =============================================================================
// Campaigns (GET /api/campaigns)
// =============================================================================

/// A caller-defined grouping used by the service to aggregate statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    /// Service-assigned identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
}

/// Wrapper shape of the campaign list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignList {
    /// Known campaigns, in service order
    #[serde(default)]
    pub campaigns: Vec<Campaign>,
}

// =============================================================================
// Send pass-through (POST /api/send)
// =============================================================================

/// Request payload for a server-side send with tracking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    /// Sender address; the domain must be verified on the service
    pub from: String,
    /// Recipient addresses
    pub to: Vec<String>,
    /// Email subject line
    pub subject: String,
    /// Raw HTML body
    pub html_content: String,
    /// Reply-to address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    /// CC addresses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<Vec<String>>,
    /// BCC addresses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc: Option<Vec<String>>,
    /// Campaign identifier or name; omitted when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    /// Arbitrary JSON metadata stored with the email
    pub metadata: Map<String, Value>,
}

impl SendRequest {
    /// Create a send request with no optional fields set.
    pub fn new(
        from: impl Into<String>,
        to: Vec<String>,
        subject: impl Into<String>,
        html_content: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to,
            subject: subject.into(),
            html_content: html_content.into(),
            reply_to: None,
            cc: None,
            bcc: None,
            campaign_id: None,
            metadata: Map::new(),
        }
    }
}

/// Split a comma-separated recipient field into trimmed, non-empty addresses.
pub fn split_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Response payload from the send endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceipt {
    /// Identifier of the stored message
    pub id: String,
    /// Identifier of the registered email
    pub email_tracking_id: String,
    /// Sender address, echoed by the service
    pub from: String,
    /// Recipient addresses, echoed by the service
    pub to: Vec<String>,
    /// Email subject, echoed by the service
    pub subject: String,
    /// Links the service rewrote server-side
    #[serde(default)]
    pub links: Vec<LinkMapping>,
}

impl SendReceipt {
    /// Number of links the service tracked for this send.
    pub fn links_tracked(&self) -> usize {
        self.links.len()
    }
}

/// Flattened per-item record for a completed send.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSummary {
    /// Identifier of the stored message
    pub id: String,
    /// Identifier of the registered email
    pub email_tracking_id: String,
    /// Sender address
    pub from: String,
    /// Recipient addresses
    pub to: Vec<String>,
    /// Email subject
    pub subject: String,
    /// Number of links tracked server-side
    pub links_tracked: usize,
}

impl From<SendReceipt> for SendSummary {
    fn from(receipt: SendReceipt) -> Self {
        Self {
            links_tracked: receipt.links.len(),
            id: receipt.id,
            email_tracking_id: receipt.email_tracking_id,
            from: receipt.from,
            to: receipt.to,
            subject: receipt.subject,
        }
    }
}

// =============================================================================
// Statistics (GET /api/stats, GET /api/campaigns/{id}/stats)
// =============================================================================

/// Reporting window accepted by the campaign stats endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsPeriod {
    /// Last 7 days
    Last7Days,
    /// Last 30 days
    #[default]
    Last30Days,
    /// Last 90 days
    Last90Days,
}

impl StatsPeriod {
    /// Query-string value understood by the service.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
        }
    }
}
