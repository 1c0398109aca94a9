use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "CPF")]
    Cpf,
    #[serde(rename = "CNPJ")]
    Cnpj,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub number: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub street_number: String,
    #[serde(default)]
    pub complement: String,
    pub zip_code: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub document: Document,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// Gateway-agnostic payment request, built fresh for every call.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionIntent {
    pub amount_minor_units: u64,
    pub description: String,
    pub customer: Customer,
    pub product: String,
    pub external_reference: String,
    pub metadata: BTreeMap<String, String>,
    pub client_ip: Option<String>,
}

// Payload para enviar ao gateway PIX
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayPayload {
    pub amount: u64,
    pub payment_method: &'static str,
    pub description: String,
    pub customer: Customer,
    pub pix: PixOptions,
    pub items: Vec<GatewayItem>,
    pub metadata: BTreeMap<String, String>,
    pub postback_url: Option<String>,
    pub ip: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PixOptions {
    pub expires_in_days: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayItem {
    pub title: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub external_ref: String,
}

impl GatewayPayload {
    pub fn from_intent(
        intent: &TransactionIntent,
        expires_in_days: u32,
        postback_url: Option<String>,
    ) -> Self {
        Self {
            amount: intent.amount_minor_units,
            payment_method: "PIX",
            description: intent.description.clone(),
            customer: intent.customer.clone(),
            pix: PixOptions { expires_in_days },
            items: vec![GatewayItem {
                title: intent.product.clone(),
                quantity: 1,
                unit_price: intent.amount_minor_units,
                external_ref: intent.external_reference.clone(),
            }],
            metadata: intent.metadata.clone(),
            postback_url,
            ip: intent.client_ip.clone(),
        }
    }
}

/// Marks a success that is missing part of the expected payment data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultWarning {
    /// The gateway sent no QR image; the reference was derived from the BR code.
    QrCodeFromBrcode,
    /// The gateway sent a QR image but no copy-and-paste code.
    MissingBrcode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayResult {
    pub qr_code_url: Option<String>,
    #[serde(rename = "brcode")]
    pub br_code: Option<String>,
    pub transaction_id: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<ResultWarning>,
}

impl GatewayResult {
    pub fn is_complete(&self) -> bool {
        self.br_code.is_some()
    }
}
