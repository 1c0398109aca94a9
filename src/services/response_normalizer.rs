//! Maps the gateway's reply, whose field names drift between API versions,
//! onto [`GatewayResult`].
//!
//! Each canonical field has an ordered table of extractors; the first one
//! that yields a non-empty value wins. New aliases go in the tables.

use serde_json::Value;
use tracing::{error, warn};
use url::Url;

use crate::app::config::Config;
use crate::error::{PixError, Result};
use crate::models::payment::{GatewayResult, ResultWarning};

/// Raw gateway reply as seen by the transport.
#[derive(Debug, Clone)]
pub struct GatewayReply {
    pub status: u16,
    pub body: Value,
}

impl GatewayReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Copy)]
enum Extractor {
    /// String or number at a JSON pointer.
    Field(&'static str),
    /// Base64 PNG at a JSON pointer, wrapped into a data URI.
    Base64Image(&'static str),
}

impl Extractor {
    fn extract(&self, body: &Value) -> Option<String> {
        match *self {
            Extractor::Field(pointer) => scalar_at(body, pointer),
            Extractor::Base64Image(pointer) => scalar_at(body, pointer).map(|data| {
                if data.starts_with("data:") {
                    data
                } else {
                    format!("data:image/png;base64,{}", data)
                }
            }),
        }
    }
}

use self::Extractor::{Base64Image, Field};

const BR_CODE: &[Extractor] = &[
    Field("/brcode"),
    Field("/qrcode"),
    Field("/pix/qrcode"),
    Field("/pix/brcode"),
];

const QR_IMAGE: &[Extractor] = &[
    Field("/qr_code_url"),
    Field("/qrCodeUrl"),
    Field("/pix/qrCodeUrl"),
    Base64Image("/qr_code_base64"),
    Base64Image("/qrCodeBase64"),
    Base64Image("/pix/qrcodeBase64"),
];

const TRANSACTION_ID: &[Extractor] = &[Field("/id"), Field("/transaction_id"), Field("/pix/id")];

const STATUS: &[Extractor] = &[Field("/status")];

fn first_present(extractors: &[Extractor], body: &Value) -> Option<String> {
    extractors.iter().find_map(|e| e.extract(body))
}

fn scalar_at(body: &Value, pointer: &str) -> Option<String> {
    match body.pointer(pointer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    default_status: String,
    qr_renderer_url: Option<String>,
    qr_renderer_size: String,
}

impl ResponseNormalizer {
    pub fn new(config: &Config) -> Self {
        Self {
            default_status: config.default_status.clone(),
            qr_renderer_url: config.qr_renderer_url.clone(),
            qr_renderer_size: config.qr_renderer_size.clone(),
        }
    }

    pub fn normalize(&self, reply: GatewayReply, sent_payload: &Value) -> Result<GatewayResult> {
        if !reply.is_success() {
            error!("Gateway rejected transaction (HTTP {}): {}", reply.status, reply.body);
            return Err(PixError::GatewayRejected {
                status: reply.status,
                raw: reply.body,
                sent_payload: sent_payload.clone(),
            });
        }

        let body = &reply.body;
        let br_code = first_present(BR_CODE, body);
        let gateway_qr = first_present(QR_IMAGE, body);

        let (qr_code_url, warning) = match (br_code.as_deref(), gateway_qr) {
            (Some(_), Some(url)) => (Some(url), None),
            (Some(code), None) => (self.render_url(code), Some(ResultWarning::QrCodeFromBrcode)),
            (None, Some(url)) => (Some(url), Some(ResultWarning::MissingBrcode)),
            (None, None) => {
                warn!("Gateway reply carries neither BR code nor QR image: {}", body);
                return Err(PixError::IncompleteGatewayResponse {
                    raw: reply.body,
                    sent_payload: sent_payload.clone(),
                });
            }
        };

        if let Some(warning) = warning {
            warn!("Degraded gateway reply: {:?}", warning);
        }

        Ok(GatewayResult {
            qr_code_url,
            br_code,
            transaction_id: first_present(TRANSACTION_ID, body),
            status: first_present(STATUS, body).unwrap_or_else(|| self.default_status.clone()),
            warning,
        })
    }

    fn render_url(&self, code: &str) -> Option<String> {
        let base = self.qr_renderer_url.as_deref()?;
        match Url::parse_with_params(base, &[("size", self.qr_renderer_size.as_str()), ("data", code)]) {
            Ok(url) => Some(url.into()),
            Err(e) => {
                warn!("Invalid QR renderer URL {}: {}", base, e);
                None
            }
        }
    }
}
