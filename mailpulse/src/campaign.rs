//! Campaign selection and name resolution.

use tracing::debug;

use crate::client::TrackingClient;
use crate::error::Error;
use crate::types::Campaign;

/// How a campaign is assigned to an outgoing email.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CampaignSource {
    /// No campaign field is sent.
    #[default]
    None,
    /// Resolve an existing campaign by its human-readable name.
    Existing(String),
    /// Forward a name; the service creates the campaign idempotently.
    New(String),
}

impl CampaignSource {
    /// Resolve this source to the string forwarded to the service.
    ///
    /// `Existing` consults the campaign list and fails with
    /// `Error::CampaignNotFound` when the name is unknown. `New` forwards the
    /// name verbatim. `None` and empty names yield no field at all.
    pub async fn resolve(&self, client: &TrackingClient) -> Result<Option<String>, Error> {
        match self {
            Self::None => Ok(None),
            Self::New(name) if name.is_empty() => Ok(None),
            Self::New(name) => Ok(Some(name.clone())),
            Self::Existing(name) if name.is_empty() => Ok(None),
            Self::Existing(name) => {
                let campaigns = client.list_campaigns().await?;
                match find_campaign_id(&campaigns, name) {
                    Some(id) => {
                        debug!(campaign = %name, id = %id, "campaign_resolved");
                        Ok(Some(id))
                    }
                    None => Err(Error::CampaignNotFound { name: name.clone() }),
                }
            }
        }
    }
}

/// Find a campaign id by exact name.
fn find_campaign_id(campaigns: &[Campaign], name: &str) -> Option<String> {
    campaigns.iter().find(|c| c.name == name).map(|c| c.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MailpulseConfig;

    fn campaigns() -> Vec<Campaign> {
        vec![
            Campaign {
                id: "c1".to_string(),
                name: "Spring Launch".to_string(),
            },
            Campaign {
                id: "c2".to_string(),
                name: "Winter Digest".to_string(),
            },
        ]
    }

    #[test]
    fn test_find_campaign_id_exact_name() {
        assert_eq!(
            find_campaign_id(&campaigns(), "Winter Digest"),
            Some("c2".to_string())
        );
    }

    #[test]
    fn test_find_campaign_id_is_case_sensitive() {
        assert_eq!(find_campaign_id(&campaigns(), "winter digest"), None);
        assert_eq!(find_campaign_id(&campaigns(), "Autumn"), None);
    }

    #[tokio::test]
    async fn test_resolve_none_sends_no_field() {
        let client = test_client();
        let resolved = CampaignSource::None.resolve(&client).await.unwrap();
        assert_eq!(resolved, None);
    }

    #[tokio::test]
    async fn test_resolve_new_forwards_name() {
        let client = test_client();
        let resolved = CampaignSource::New("Launch Week".to_string())
            .resolve(&client)
            .await
            .unwrap();
        assert_eq!(resolved, Some("Launch Week".to_string()));
    }

    #[tokio::test]
    async fn test_resolve_empty_names_send_no_field() {
        let client = test_client();
        assert_eq!(
            CampaignSource::New(String::new()).resolve(&client).await.unwrap(),
            None
        );
        assert_eq!(
            CampaignSource::Existing(String::new())
                .resolve(&client)
                .await
                .unwrap(),
            None
        );
    }

    fn test_client() -> TrackingClient {
        TrackingClient::new(MailpulseConfig::new("http://localhost:9", "key")).unwrap()
    }
}
