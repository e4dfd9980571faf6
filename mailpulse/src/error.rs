//! Error taxonomy for the tracking pipeline.
//!
//! Malformed metadata is deliberately not represented here: it is recovered
//! locally (replaced with an empty map) and never propagates as an error.

/// Errors surfaced by the tracking pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The tracking service could not be reached, rejected the request, or
    /// answered with a shape the client does not understand.
    #[error("tracking service error: {0}")]
    TrackingService(String),

    /// No campaign with the given name exists on the service.
    #[error("campaign not found: {name}")]
    CampaignNotFound {
        /// The name that failed to resolve.
        name: String,
    },

    /// The parser could not produce a usable tree. The rewrite engine is
    /// maximally tolerant of malformed markup, so this is not expected to
    /// occur in practice.
    #[error("html rewrite failed: {0}")]
    Rewrite(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_service_message() {
        let err = Error::TrackingService("503 Service Unavailable".to_string());
        assert_eq!(
            err.to_string(),
            "tracking service error: 503 Service Unavailable"
        );
    }

    #[test]
    fn test_campaign_not_found_message() {
        let err = Error::CampaignNotFound {
            name: "Spring Launch".to_string(),
        };
        assert_eq!(err.to_string(), "campaign not found: Spring Launch");
    }

    #[test]
    fn test_rewrite_message() {
        let err = Error::Rewrite("unparseable input".to_string());
        assert_eq!(err.to_string(), "html rewrite failed: unparseable input");
    }
}
