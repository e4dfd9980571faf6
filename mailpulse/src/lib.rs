//! Mailpulse - email open and click tracking client.
//!
//! This library turns a raw HTML email body into a "tracked" variant: every
//! hyperlink the Mailpulse service recognizes is rewritten to route through a
//! tracking redirect, and an invisible open-tracking pixel is appended to the
//! document.
//!
//! ## Architecture
//!
//! ```text
//! EmailJob → TrackingClient (POST /api/emails) → rewrite() → TrackedEmail
//! ```
//!
//! Two components run sequentially per email: the tracking request adapter
//! ([`client::TrackingClient`]) registers the email with the service and
//! receives the link map and pixel URL; the HTML rewrite engine
//! ([`rewrite::rewrite`]) applies the substitutions and injects the pixel.
//! The send pass-through, campaign lookup, and statistics endpoints are thin
//! client methods around the same API.
//!
//! ## Example
//!
//! ```no_run
//! use mailpulse::{EmailJob, EmailTracker, MailpulseConfig, TrackingClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mailpulse::Error> {
//!     let config = MailpulseConfig::from_env();
//!     let tracker = EmailTracker::new(TrackingClient::new(config)?);
//!
//!     let job = EmailJob::new(
//!         "recipient@example.com",
//!         "Welcome",
//!         r#"<a href="https://example.com">Read more</a>"#,
//!     );
//!
//!     let tracked = tracker.track(&job).await?;
//!     println!("{} links tracked", tracked.links_tracked);
//!     Ok(())
//! }
//! ```

pub mod campaign;
pub mod client;
pub mod config;
pub mod error;
pub mod rewrite;
pub mod tracker;
pub mod types;

// Re-export commonly used types
pub use campaign::CampaignSource;
pub use client::TrackingClient;
pub use config::MailpulseConfig;
pub use error::Error;
pub use rewrite::rewrite;
pub use tracker::{EmailJob, EmailTracker, JobOutcome, SendOutcome};
pub use types::{
    Campaign, LinkMapping, SendReceipt, SendRequest, SendSummary, StatsPeriod, TrackedEmail,
    TrackingRequest, TrackingResult,
};
