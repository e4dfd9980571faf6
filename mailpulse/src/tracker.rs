//! Per-email tracking pipeline and batch processing.
//!
//! Each email flows through the pipeline once: resolve the campaign, build
//! the tracking request, register it with the service, rewrite the HTML with
//! the returned link map and pixel URL. Batches run sequentially with no
//! shared mutable state between items.

use serde::Serialize;
use tracing::{error, info};

use crate::campaign::CampaignSource;
use crate::client::TrackingClient;
use crate::error::Error;
use crate::rewrite::rewrite;
use crate::types::{SendRequest, SendSummary, TrackedEmail, TrackingRequest, TrackingResult};

/// One email to run through the tracking pipeline.
#[derive(Debug, Clone)]
pub struct EmailJob {
    /// Recipient email address
    pub recipient: String,
    /// Email subject line
    pub subject: String,
    /// Raw HTML body
    pub html: String,
    /// Campaign assignment for this email
    pub campaign: CampaignSource,
    /// Raw JSON metadata; malformed input collapses to an empty map
    pub metadata: Option<String>,
}

impl EmailJob {
    /// Create a job with no campaign and no metadata.
    pub fn new(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            subject: subject.into(),
            html: html.into(),
            campaign: CampaignSource::None,
            metadata: None,
        }
    }
}

/// Outcome of one tracked batch item.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobOutcome {
    /// The email was registered and its HTML rewritten.
    Tracked(TrackedEmail),
    /// The item failed; the batch may continue per caller policy.
    Failed {
        /// Message of the underlying error
        error: String,
    },
}

/// Outcome of one send batch item.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SendOutcome {
    /// The email was accepted by the service.
    Sent(SendSummary),
    /// The item failed; the batch may continue per caller policy.
    Failed {
        /// Message of the underlying error
        error: String,
    },
}

/// Composes the tracking adapter and the HTML rewrite engine.
#[derive(Debug, Clone)]
pub struct EmailTracker {
    client: TrackingClient,
}

impl EmailTracker {
    /// Create a tracker over an existing client.
    pub fn new(client: TrackingClient) -> Self {
        Self { client }
    }

    /// Run one email through the pipeline.
    pub async fn track(&self, job: &EmailJob) -> Result<TrackedEmail, Error> {
        info!(
            recipient = %job.recipient,
            subject = %job.subject,
            html_length = job.html.len(),
            "track_job_start"
        );

        let campaign_id = job.campaign.resolve(&self.client).await?;

        let request = TrackingRequest::new(&job.recipient, &job.subject, &job.html)
            .with_campaign(campaign_id)
            .with_metadata_json(job.metadata.as_deref());

        let result = self.client.track_email(&request).await?;
        let tracked = Self::assemble(job, result);

        info!(
            tracking_id = %tracked.tracking_id,
            links_tracked = tracked.links_tracked,
            "track_job_complete"
        );

        Ok(tracked)
    }

    /// Rewrite the job's HTML with the service's link map and pixel URL.
    ///
    /// `links_tracked` reports the mapping count, not the anchor count.
    fn assemble(job: &EmailJob, result: TrackingResult) -> TrackedEmail {
        let modified_html = rewrite(&job.html, &result.links, &result.pixel_url);

        TrackedEmail {
            modified_html,
            tracking_id: result.email_tracking_id,
            recipient: job.recipient.clone(),
            subject: job.subject.clone(),
            links_tracked: result.links.len(),
        }
    }

    /// Track a batch of emails sequentially.
    ///
    /// With `continue_on_failure`, a failing item is recorded as
    /// `JobOutcome::Failed` and processing moves to the next item; without
    /// it, the first failure aborts the batch.
    pub async fn track_batch(
        &self,
        jobs: &[EmailJob],
        continue_on_failure: bool,
    ) -> Result<Vec<JobOutcome>, Error> {
        let mut outcomes = Vec::with_capacity(jobs.len());

        for job in jobs {
            match self.track(job).await {
                Ok(tracked) => outcomes.push(JobOutcome::Tracked(tracked)),
                Err(e) if continue_on_failure => {
                    error!(recipient = %job.recipient, error = %e, "track_job_failed");
                    outcomes.push(JobOutcome::Failed {
                        error: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(outcomes)
    }

    /// Send one email through the service with tracking applied server-side.
    pub async fn send(&self, request: &SendRequest) -> Result<SendSummary, Error> {
        let receipt = self.client.send_email(request).await?;
        Ok(SendSummary::from(receipt))
    }

    /// Send a batch of emails sequentially, with the same failure policy as
    /// `track_batch`.
    pub async fn send_batch(
        &self,
        requests: &[SendRequest],
        continue_on_failure: bool,
    ) -> Result<Vec<SendOutcome>, Error> {
        let mut outcomes = Vec::with_capacity(requests.len());

        for request in requests {
            match self.send(request).await {
                Ok(summary) => outcomes.push(SendOutcome::Sent(summary)),
                Err(e) if continue_on_failure => {
                    error!(from = %request.from, error = %e, "send_job_failed");
                    outcomes.push(SendOutcome::Failed {
                        error: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MailpulseConfig;
    use crate::types::LinkMapping;
    use scraper::{Html, Selector};

    /// A client pointed at a closed local port; every call fails fast.
    fn unreachable_tracker() -> EmailTracker {
        let client =
            TrackingClient::new(MailpulseConfig::new("http://127.0.0.1:9", "key")).unwrap();
        EmailTracker::new(client)
    }

    #[test]
    fn test_assemble_rewrites_html_and_echoes_job_fields() {
        let job = EmailJob::new(
            "r@example.com",
            "Hello",
            r#"<a href="http://a.com">go</a>"#,
        );
        let result = TrackingResult {
            email_tracking_id: "em-1".to_string(),
            links: vec![LinkMapping::new("http://a.com", "t1", "http://track/t1")],
            pixel_url: "http://track/px".to_string(),
        };

        let tracked = EmailTracker::assemble(&job, result);

        assert_eq!(tracked.tracking_id, "em-1");
        assert_eq!(tracked.recipient, "r@example.com");
        assert_eq!(tracked.subject, "Hello");
        assert!(tracked.modified_html.contains("http://track/t1"));
        assert!(tracked.modified_html.contains("http://track/px"));
    }

    #[test]
    fn test_assemble_counts_mappings_not_anchors() {
        let job = EmailJob::new(
            "r@example.com",
            "Hello",
            r#"<a href="http://a.com">one</a><a href="http://a.com">two</a>"#,
        );
        let result = TrackingResult {
            email_tracking_id: "em-2".to_string(),
            links: vec![LinkMapping::new("http://a.com", "t1", "http://track/t1")],
            pixel_url: "http://track/px".to_string(),
        };

        let tracked = EmailTracker::assemble(&job, result);

        // Both anchors rewritten, one mapping reported.
        assert_eq!(tracked.links_tracked, 1);

        let document = Html::parse_document(&tracked.modified_html);
        let selector = Selector::parse("a").unwrap();
        let hrefs: Vec<_> = document
            .select(&selector)
            .filter_map(|a| a.value().attr("href"))
            .collect();
        assert_eq!(hrefs, vec!["http://track/t1", "http://track/t1"]);
    }

    #[test]
    fn test_assemble_with_no_links_still_injects_pixel() {
        let job = EmailJob::new("r@example.com", "Hello", "<p>plain</p>");
        let result = TrackingResult {
            email_tracking_id: "em-3".to_string(),
            links: Vec::new(),
            pixel_url: "http://track/px".to_string(),
        };

        let tracked = EmailTracker::assemble(&job, result);

        assert_eq!(tracked.links_tracked, 0);
        assert!(tracked.modified_html.contains("http://track/px"));
    }

    #[tokio::test]
    async fn test_track_batch_continue_on_failure_records_each_item() {
        let tracker = unreachable_tracker();
        let jobs = vec![
            EmailJob::new("a@example.com", "Hi", "<p>1</p>"),
            EmailJob::new("b@example.com", "Hi", "<p>2</p>"),
        ];

        let outcomes = tracker.track_batch(&jobs, true).await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o, JobOutcome::Failed { .. })));
    }

    #[tokio::test]
    async fn test_track_batch_fail_fast_aborts_on_first_error() {
        let tracker = unreachable_tracker();
        let jobs = vec![
            EmailJob::new("a@example.com", "Hi", "<p>1</p>"),
            EmailJob::new("b@example.com", "Hi", "<p>2</p>"),
        ];

        let result = tracker.track_batch(&jobs, false).await;

        assert!(matches!(result, Err(Error::TrackingService(_))));
    }

    #[test]
    fn test_job_outcome_serialization() {
        let failed = JobOutcome::Failed {
            error: "tracking service error: boom".to_string(),
        };
        let json = serde_json::to_string(&failed).unwrap();
        assert!(json.contains("\"status\":\"failed\""));
        assert!(json.contains("tracking service error: boom"));

        let tracked = JobOutcome::Tracked(TrackedEmail {
            modified_html: "<html></html>".to_string(),
            tracking_id: "em-1".to_string(),
            recipient: "r@example.com".to_string(),
            subject: "Hello".to_string(),
            links_tracked: 2,
        });
        let json = serde_json::to_string(&tracked).unwrap();
        assert!(json.contains("\"status\":\"tracked\""));
        assert!(json.contains("\"linksTracked\":2"));
    }
}
