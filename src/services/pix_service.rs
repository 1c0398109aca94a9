use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::config::Config;
use crate::error::Result;
use crate::models::payment::{GatewayPayload, GatewayResult};
use crate::services::pix_gateway_client::PixGateway;
use crate::services::request_normalizer::RequestNormalizer;
use crate::services::response_normalizer::ResponseNormalizer;

/// Validate, call the gateway once, normalize the reply.
pub struct PixService {
    request_normalizer: RequestNormalizer,
    response_normalizer: ResponseNormalizer,
    gateway: Arc<dyn PixGateway>,
    expires_in_days: u32,
    postback_url: Option<String>,
}

impl PixService {
    pub fn new(config: &Config, gateway: Arc<dyn PixGateway>) -> Self {
        Self {
            request_normalizer: RequestNormalizer::new(config),
            response_normalizer: ResponseNormalizer::new(config),
            gateway,
            expires_in_days: config.expires_in_days,
            postback_url: config.postback_url.clone(),
        }
    }

    pub async fn create_pix(&self, body: &Value, client_ip: Option<String>) -> Result<GatewayResult> {
        let intent = self.request_normalizer.normalize(body, client_ip)?;
        info!(
            "Creating PIX {} for {} centavos via {}",
            intent.external_reference,
            intent.amount_minor_units,
            self.gateway.name()
        );

        let payload = GatewayPayload::from_intent(&intent, self.expires_in_days, self.postback_url.clone());
        let sent_payload = serde_json::to_value(&payload)?;

        let reply = self
            .gateway
            .create_transaction(&sent_payload)
            .await
            .map_err(|e| e.with_sent_payload(&sent_payload))?;
        let result = self.response_normalizer.normalize(reply, &sent_payload)?;

        if !result.is_complete() {
            warn!("PIX {} created without BR code", intent.external_reference);
        } else if let Some(warning) = result.warning {
            warn!("PIX {} created with warning {:?}", intent.external_reference, warning);
        } else {
            info!(
                "PIX {} created, transaction {:?}",
                intent.external_reference, result.transaction_id
            );
        }
        Ok(result)
    }
}
