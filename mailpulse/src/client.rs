//! HTTP adapter for the Mailpulse tracking service.
//!
//! One shared `reqwest::Client` issues JSON-over-HTTPS calls authenticated
//! with the caller-supplied API key. Exactly one outbound request per
//! operation: no retry, no local recovery, no timeout override beyond the
//! transport default. Failures surface as `Error::TrackingService` carrying
//! the underlying message.

use reqwest::Client;
use serde_json::Value;
use tracing::info;

use crate::config::MailpulseConfig;
use crate::error::Error;
use crate::types::{
    Campaign, CampaignList, SendReceipt, SendRequest, StatsPeriod, TrackingRequest, TrackingResult,
};

/// Header carrying the caller-supplied API key.
const API_KEY_HEADER: &str = "x-api-key";

/// Client for the Mailpulse HTTP API.
///
/// Cheap to clone; the underlying connection pool is shared, so a single
/// instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct TrackingClient {
    http: Client,
    config: MailpulseConfig,
}

impl TrackingClient {
    /// Create a client from connection parameters.
    pub fn new(config: MailpulseConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(concat!("mailpulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::TrackingService(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Register an email with the tracking service.
    ///
    /// Returns the tracking id, the link map, and the pixel URL the rewrite
    /// engine consumes.
    pub async fn track_email(&self, request: &TrackingRequest) -> Result<TrackingResult, Error> {
        info!(
            recipient = %request.recipient,
            subject = %request.subject,
            html_length = request.html_content.len(),
            has_campaign = request.campaign_id.is_some(),
            "track_request_start"
        );

        let response = self
            .http
            .post(self.endpoint("/api/emails"))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::TrackingService(e.to_string()))?;

        let response = check_status(response).await?;

        let result: TrackingResult = response
            .json()
            .await
            .map_err(|e| Error::TrackingService(e.to_string()))?;

        info!(
            tracking_id = %result.email_tracking_id,
            links = result.links.len(),
            "track_request_complete"
        );

        Ok(result)
    }

    /// List the campaigns known to the service.
    pub async fn list_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        let response = self
            .http
            .get(self.endpoint("/api/campaigns"))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(|e| Error::TrackingService(e.to_string()))?;

        let response = check_status(response).await?;

        let list: CampaignList = response
            .json()
            .await
            .map_err(|e| Error::TrackingService(e.to_string()))?;

        info!(campaigns = list.campaigns.len(), "campaigns_listed");

        Ok(list.campaigns)
    }

    /// Send an email through the service with tracking applied server-side.
    pub async fn send_email(&self, request: &SendRequest) -> Result<SendReceipt, Error> {
        info!(
            from = %request.from,
            recipients = request.to.len(),
            subject = %request.subject,
            "send_request_start"
        );

        let response = self
            .http
            .post(self.endpoint("/api/send"))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::TrackingService(e.to_string()))?;

        let response = check_status(response).await?;

        let receipt: SendReceipt = response
            .json()
            .await
            .map_err(|e| Error::TrackingService(e.to_string()))?;

        info!(
            tracking_id = %receipt.email_tracking_id,
            links = receipt.links.len(),
            "send_request_complete"
        );

        Ok(receipt)
    }

    /// Fetch global statistics. The payload schema is owned by the service.
    pub async fn global_stats(&self) -> Result<Value, Error> {
        let response = self
            .http
            .get(self.endpoint("/api/stats"))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(|e| Error::TrackingService(e.to_string()))?;

        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| Error::TrackingService(e.to_string()))
    }

    /// Fetch advanced statistics for one campaign over a reporting window.
    pub async fn campaign_stats(
        &self,
        campaign_id: &str,
        period: StatsPeriod,
    ) -> Result<Value, Error> {
        let response = self
            .http
            .get(self.endpoint(&format!("/api/campaigns/{campaign_id}/stats")))
            .query(&[("period", period.as_str())])
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(|e| Error::TrackingService(e.to_string()))?;

        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| Error::TrackingService(e.to_string()))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url, path)
    }
}

/// Map a non-success status to `Error::TrackingService`, keeping a short
/// excerpt of the response body as the message.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let excerpt: String = body.trim().chars().take(200).collect();

    Err(Error::TrackingService(format!("{status}: {excerpt}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_and_path() {
        let client =
            TrackingClient::new(MailpulseConfig::new("https://track.example.com/", "key")).unwrap();

        assert_eq!(
            client.endpoint("/api/emails"),
            "https://track.example.com/api/emails"
        );
        assert_eq!(
            client.endpoint("/api/campaigns/c1/stats"),
            "https://track.example.com/api/campaigns/c1/stats"
        );
    }
}
