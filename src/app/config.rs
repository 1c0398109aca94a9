use std::env;

use tracing::warn;

use crate::models::payment::{Address, Customer, Document, DocumentType};

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub gateway_url: String,
    pub secret_key: Option<String>,
    pub postback_url: Option<String>,
    pub min_amount_cents: u64,
    pub default_customer: Option<Customer>,
    pub default_status: String,
    pub expires_in_days: u32,
    pub default_product: String,
    pub default_source: String,
    pub gateway_timeout_ms: u64,
    pub qr_renderer_url: Option<String>,
    pub qr_renderer_size: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let allow_default_customer = lookup("PIX_ALLOW_DEFAULT_CUSTOMER")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        let default_customer = if allow_default_customer {
            Some(
                non_empty("PIX_DEFAULT_CUSTOMER_JSON")
                    .and_then(|raw| parse_default_customer(&raw))
                    .unwrap_or_else(builtin_default_customer),
            )
        } else {
            None
        };

        Self {
            server_port: var("PORT", "3000").parse().unwrap_or(3000),
            gateway_url: var(
                "PAYEVO_URL",
                "https://apiv2.payevo.com.br/functions/v1/transactions",
            ),
            secret_key: non_empty("PAYEVO_SECRET_KEY"),
            postback_url: non_empty("POSTBACK_URL"),
            min_amount_cents: var("PIX_MIN_AMOUNT_CENTS", "100").parse().unwrap_or(100),
            default_customer,
            default_status: var("PIX_DEFAULT_STATUS", "waiting_payment"),
            expires_in_days: var("PIX_EXPIRES_IN_DAYS", "1").parse().unwrap_or(1),
            default_product: var("PIX_DEFAULT_PRODUCT", "Pagamento"),
            default_source: var("PIX_DEFAULT_SOURCE", "site"),
            gateway_timeout_ms: var("GATEWAY_TIMEOUT_MS", "10000").parse().unwrap_or(10000),
            // Set but empty disables the fallback renderer.
            qr_renderer_url: match lookup("QR_RENDERER_URL") {
                Some(v) if v.trim().is_empty() => None,
                Some(v) => Some(v),
                None => Some("https://api.qrserver.com/v1/create-qr-code/".to_string()),
            },
            qr_renderer_size: var("QR_RENDERER_SIZE", "250x250"),
        }
    }
}

/// Override must be a well-formed organizational (CNPJ) record.
fn parse_default_customer(raw: &str) -> Option<Customer> {
    match serde_json::from_str::<Customer>(raw) {
        Ok(customer) if customer.document.doc_type == DocumentType::Cnpj => Some(customer),
        Ok(customer) => {
            warn!(
                "Ignoring PIX_DEFAULT_CUSTOMER_JSON: document type {:?} is not CNPJ",
                customer.document.doc_type
            );
            None
        }
        Err(e) => {
            warn!("Ignoring PIX_DEFAULT_CUSTOMER_JSON: {}", e);
            None
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            gateway_url: "https://apiv2.payevo.com.br/functions/v1/transactions".to_string(),
            secret_key: None,
            postback_url: None,
            min_amount_cents: 100,
            default_customer: Some(builtin_default_customer()),
            default_status: "waiting_payment".to_string(),
            expires_in_days: 1,
            default_product: "Pagamento".to_string(),
            default_source: "site".to_string(),
            gateway_timeout_ms: 10000,
            qr_renderer_url: Some("https://api.qrserver.com/v1/create-qr-code/".to_string()),
            qr_renderer_size: "250x250".to_string(),
        }
    }
}

/// Organizational record used for anonymous (donation-style) flows.
pub fn builtin_default_customer() -> Customer {
    Customer {
        name: "Cliente".to_string(),
        email: "payments@amparo.org".to_string(),
        phone: "5511999999999".to_string(),
        document: Document {
            number: "27865757000102".to_string(),
            doc_type: DocumentType::Cnpj,
        },
        address: Some(Address {
            street: "Rua X".to_string(),
            street_number: "1".to_string(),
            complement: String::new(),
            zip_code: "11050100".to_string(),
            neighborhood: "Centro".to_string(),
            city: "Santos".to_string(),
            state: "SP".to_string(),
            country: "BR".to_string(),
        }),
    }
}
