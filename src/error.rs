//! Error taxonomy for the PIX creation pipeline.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PixError>;

#[derive(Debug, Error)]
pub enum PixError {
    /// Body is present but is not a JSON object.
    #[error("Corpo da requisição inválido: {0}")]
    MalformedBody(String),

    #[error("Valor mínimo: {min_cents} centavos ({min_formatted}).")]
    InvalidAmount {
        min_cents: u64,
        min_formatted: String,
    },

    #[error("Dados do cliente incompletos: faltando {}", .missing.join(", "))]
    MissingCustomerFields { missing: Vec<&'static str> },

    /// Gateway secret not configured. Operator fault.
    #[error("Chave secreta não configurada.")]
    MissingCredential,

    #[error("Erro ao criar transação")]
    GatewayRejected {
        status: u16,
        raw: Value,
        sent_payload: Value,
    },

    #[error("Resposta do gateway sem código PIX")]
    IncompleteGatewayResponse { raw: Value, sent_payload: Value },

    /// Transport faults and other unclassified failures. `sent_payload` is
    /// set once the gateway payload has been built.
    #[error("{message}")]
    UnexpectedFailure {
        message: String,
        sent_payload: Option<Value>,
    },
}

impl PixError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PixError::MalformedBody(_)
            | PixError::InvalidAmount { .. }
            | PixError::MissingCustomerFields { .. } => StatusCode::BAD_REQUEST,
            PixError::MissingCredential | PixError::UnexpectedFailure { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            PixError::GatewayRejected { .. } | PixError::IncompleteGatewayResponse { .. } => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        PixError::UnexpectedFailure {
            message: message.into(),
            sent_payload: None,
        }
    }

    /// Attaches the outbound payload to failures that would otherwise lose it.
    pub fn with_sent_payload(self, payload: &Value) -> Self {
        match self {
            PixError::UnexpectedFailure {
                message,
                sent_payload: None,
            } => PixError::UnexpectedFailure {
                message,
                sent_payload: Some(payload.clone()),
            },
            other => other,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Response contract body: canonical fields nulled out plus diagnostics.
    pub fn to_body(&self) -> Value {
        let mut body = json!({
            "qr_code_url": null,
            "brcode": null,
            "transaction_id": null,
            "status": null,
            "error": self.to_string(),
        });

        match self {
            PixError::GatewayRejected {
                status,
                raw,
                sent_payload,
            } => {
                body["gateway_status"] = json!(status);
                body["raw"] = raw.clone();
                body["sent_payload"] = sent_payload.clone();
            }
            PixError::IncompleteGatewayResponse { raw, sent_payload } => {
                body["raw"] = raw.clone();
                body["sent_payload"] = sent_payload.clone();
            }
            PixError::UnexpectedFailure {
                sent_payload: Some(sent_payload),
                ..
            } => {
                body["sent_payload"] = sent_payload.clone();
            }
            PixError::MissingCustomerFields { missing } => {
                body["missing_fields"] = json!(missing);
            }
            _ => {}
        }

        body
    }
}

impl From<reqwest::Error> for PixError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PixError::unexpected(format!("Tempo esgotado ao contatar o gateway: {}", e))
        } else {
            PixError::unexpected(format!("Falha de comunicação com o gateway: {}", e))
        }
    }
}

impl From<serde_json::Error> for PixError {
    fn from(e: serde_json::Error) -> Self {
        PixError::unexpected(format!("Erro de serialização: {}", e))
    }
}

impl IntoResponse for PixError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_body())).into_response()
    }
}
