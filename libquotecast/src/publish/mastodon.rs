//! Mastodon publisher
//!
//! Posts through the megalodon library, which speaks the Mastodon API as
//! implemented by Mastodon, Pleroma, GoToSocial and friends. Reply threading
//! uses the API's `in_reply_to_id` status option.

use async_trait::async_trait;
use megalodon::{Megalodon, SNS};

use crate::error::{PublishError, Result};
use crate::publish::Publisher;
use crate::types::{Published, ReplyRef};

/// Publisher backed by a Mastodon-compatible instance
pub struct MastodonPublisher {
    client: Box<dyn Megalodon + Send + Sync>,
    /// Handle of the authenticated account, resolved during connect
    handle: String,
    /// Instance-specific per-post character limit
    character_limit: usize,
}

impl MastodonPublisher {
    /// Connect to an instance: build the client, verify the token and
    /// resolve the acting account's handle and the instance post limit
    pub async fn connect(instance_url: &str, access_token: &str) -> Result<Self> {
        let instance_url = normalize_instance_url(instance_url);
        let client = megalodon::generator(
            SNS::Mastodon,
            instance_url,
            Some(access_token.to_string()),
            None,
        )
        .map_err(|e| {
            PublishError::Authentication(format!("Failed to create Mastodon client: {:?}", e))
        })?;

        let account = client
            .verify_account_credentials()
            .await
            .map_err(|e| map_megalodon_error(e, "verify credentials"))?;
        let handle = account.json.username;

        let instance = client
            .get_instance()
            .await
            .map_err(|e| map_megalodon_error(e, "fetch instance info"))?;
        let character_limit = instance.json.configuration.statuses.max_characters as usize;

        Ok(Self {
            client,
            handle,
            character_limit,
        })
    }

    /// Handle of the authenticated account
    pub fn handle(&self) -> &str {
        &self.handle
    }

    fn validate(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(PublishError::Validation("post text cannot be empty".to_string()).into());
        }

        let chars = text.chars().count();
        if chars > self.character_limit {
            return Err(PublishError::Validation(format!(
                "post exceeds the instance's {} character limit ({} characters)",
                self.character_limit, chars
            ))
            .into());
        }

        Ok(())
    }
}

#[async_trait]
impl Publisher for MastodonPublisher {
    async fn publish(&self, text: &str, reply_to: Option<&ReplyRef>) -> Result<Published> {
        self.validate(text)?;

        let options = reply_to.map(|reply| megalodon::megalodon::PostStatusInputOptions {
            in_reply_to_id: Some(reply.post_id.clone()),
            ..Default::default()
        });

        let response = self
            .client
            .post_status(text.to_string(), options.as_ref())
            .await
            .map_err(|e| map_megalodon_error(e, "post status"))?;

        let post_id = match response.json {
            megalodon::megalodon::PostStatusOutput::Status(status) => status.id,
            megalodon::megalodon::PostStatusOutput::ScheduledStatus(scheduled) => scheduled.id,
        };

        Ok(Published {
            post_id,
            handle: Some(self.handle.clone()),
        })
    }

    fn name(&self) -> &str {
        "mastodon"
    }

    fn character_limit(&self) -> Option<usize> {
        Some(self.character_limit)
    }
}

/// Ensure the instance URL carries an explicit scheme
fn normalize_instance_url(instance: &str) -> String {
    if instance.starts_with("http://") || instance.starts_with("https://") {
        instance.to_string()
    } else {
        format!("https://{}", instance)
    }
}

/// Map megalodon errors to [`PublishError`] by HTTP status where possible
fn map_megalodon_error(error: megalodon::error::Error, context: &str) -> PublishError {
    let message = error.to_string();

    match extract_http_status(&message) {
        Some(401) | Some(403) => PublishError::Authentication(format!(
            "Mastodon authentication failed ({}): {}",
            context, message
        )),
        Some(422) => PublishError::Validation(format!(
            "Mastodon rejected the post ({}): {}",
            context, message
        )),
        Some(429) => PublishError::RateLimit(format!(
            "Mastodon rate limit exceeded ({}): {}",
            context, message
        )),
        Some(500..=599) => PublishError::Network(format!(
            "Mastodon server error ({}): {}",
            context, message
        )),
        Some(_) => PublishError::Posting(format!("Mastodon error ({}): {}", context, message)),
        None => {
            let lower = message.to_lowercase();
            if lower.contains("unauthorized") || lower.contains("token") {
                PublishError::Authentication(format!(
                    "Mastodon authentication failed ({}): {}",
                    context, message
                ))
            } else {
                PublishError::Network(format!("Mastodon error ({}): {}", context, message))
            }
        }
    }
}

/// Extract an HTTP status code from an error message, if one is present
fn extract_http_status(message: &str) -> Option<u16> {
    for prefix in ["HTTP ", "status ", "code: ", "status_code: "] {
        if let Some(pos) = message.find(prefix) {
            if let Some(code) = message[pos + prefix.len()..].get(0..3) {
                if let Ok(code) = code.parse::<u16>() {
                    if (100..=599).contains(&code) {
                        return Some(code);
                    }
                }
            }
        }
    }
    None
}
