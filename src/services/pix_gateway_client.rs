use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

use crate::app::config::Config;
use crate::error::{PixError, Result};
use crate::services::response_normalizer::GatewayReply;

/// Single outbound call that creates a PIX transaction.
#[async_trait]
pub trait PixGateway: Send + Sync {
    fn name(&self) -> &'static str;

    /// Posts `payload` once; any HTTP status is returned as a reply, only
    /// transport faults are errors.
    async fn create_transaction(&self, payload: &Value) -> Result<GatewayReply>;
}

pub struct PixGatewayClient {
    client: Client,
    url: String,
    secret_key: Option<String>,
}

impl PixGatewayClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.gateway_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            url: config.gateway_url.clone(),
            secret_key: config.secret_key.clone(),
        })
    }

    pub fn has_credential(&self) -> bool {
        self.secret_key.is_some()
    }
}

#[async_trait]
impl PixGateway for PixGatewayClient {
    fn name(&self) -> &'static str {
        "payevo"
    }

    async fn create_transaction(&self, payload: &Value) -> Result<GatewayReply> {
        let secret = self.secret_key.as_deref().ok_or(PixError::MissingCredential)?;

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .basic_auth(secret, Some("x"))
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                error!("Request to {} gateway failed: {}", self.name(), e);
                PixError::from(e)
            })?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        // Non-JSON bodies are kept verbatim for diagnostics.
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        info!("{} gateway answered HTTP {}", self.name(), status);
        Ok(GatewayReply { status, body })
    }
}
