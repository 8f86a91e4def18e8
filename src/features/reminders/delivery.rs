//! Outbound delivery capability used by the scheduler
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use serenity::http::Http;
use serenity::model::id::{ChannelId, UserId};
use std::sync::Arc;

use crate::core::truncate_for_message;
use crate::database::TargetType;

/// Resolves a target and sends it a plain text message
///
/// Any error counts as a failed delivery; implementations should not retry.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn send(&self, target_type: TargetType, target_id: &str, text: &str) -> Result<()>;
}

/// Delivers through Discord's HTTP API
pub struct DiscordDelivery {
    http: Arc<Http>,
}

impl DiscordDelivery {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl DeliveryChannel for DiscordDelivery {
    async fn send(&self, target_type: TargetType, target_id: &str, text: &str) -> Result<()> {
        let id: u64 = target_id
            .parse()
            .map_err(|_| anyhow!("Invalid {} id: {}", target_type, target_id))?;
        let content = truncate_for_message(text);
        let http: &Http = &self.http;

        match target_type {
            TargetType::Channel => {
                ChannelId(id).say(http, &content).await?;
            }
            TargetType::User => {
                let dm = UserId(id).create_dm_channel(http).await?;
                dm.say(http, &content).await?;
            }
        }

        debug!("Delivered message to {target_type} {target_id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn DeliveryChannel) {}

    #[tokio::test]
    async fn test_invalid_id_fails_before_any_request() {
        let delivery = DiscordDelivery::new(Arc::new(Http::new("")));
        let err = delivery
            .send(TargetType::Channel, "not-a-snowflake", "hi")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid channel id"));
    }
}
