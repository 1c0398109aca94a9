use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

use crate::app::config::Config;
use crate::error::{PixError, Result};
use crate::models::payment::{Address, Customer, Document, DocumentType, TransactionIntent};
use crate::utils::money::{format_currency, major_to_minor, major_units_from_value, minor_units_from_value};
use crate::utils::reference::generate_external_reference;

/// Turns a loosely-typed caller body into a [`TransactionIntent`].
#[derive(Debug, Clone)]
pub struct RequestNormalizer {
    min_amount_cents: u64,
    default_customer: Option<Customer>,
    default_product: String,
    default_source: String,
}

impl RequestNormalizer {
    pub fn new(config: &Config) -> Self {
        Self {
            min_amount_cents: config.min_amount_cents,
            default_customer: config.default_customer.clone(),
            default_product: config.default_product.clone(),
            default_source: config.default_source.clone(),
        }
    }

    /// Replaces the record used for anonymous flows; `None` disables them.
    #[cfg(test)]
    fn with_default_customer(mut self, customer: Option<Customer>) -> Self {
        self.default_customer = customer;
        self
    }

    pub fn normalize(&self, body: &Value, client_ip: Option<String>) -> Result<TransactionIntent> {
        let empty = Map::new();
        let body = match body {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return Err(PixError::MalformedBody(format!(
                    "esperado um objeto JSON, recebido {}",
                    json_kind(other)
                )))
            }
        };

        let amount = self.resolve_amount(body)?;
        let customer = self.resolve_customer(body)?;

        let external_reference =
            text_field(body, "externalRef").unwrap_or_else(generate_external_reference);
        let product = text_field(body, "product").unwrap_or_else(|| self.default_product.clone());
        let description =
            text_field(body, "description").unwrap_or_else(|| format!("Pagamento {}", product));

        let mut metadata = BTreeMap::new();
        metadata.insert(
            "source".to_string(),
            text_field(body, "source").unwrap_or_else(|| self.default_source.clone()),
        );
        metadata.insert("externalRef".to_string(), external_reference.clone());
        for key in ["campaign", "platform"] {
            if let Some(value) = text_field(body, key) {
                metadata.insert(key.to_string(), value);
            }
        }

        debug!(
            "Normalized intent {} amount={} document_type={:?}",
            external_reference, amount, customer.document.doc_type
        );

        Ok(TransactionIntent {
            amount_minor_units: amount,
            description,
            customer,
            product,
            external_reference,
            metadata,
            client_ip,
        })
    }

    // `amount` (centavos) wins when valid, otherwise `amountReais` is converted.
    fn resolve_amount(&self, body: &Map<String, Value>) -> Result<u64> {
        let minor = body
            .get("amount")
            .and_then(minor_units_from_value)
            .filter(|cents| *cents >= self.min_amount_cents);

        let amount = minor.or_else(|| {
            body.get("amountReais")
                .and_then(major_units_from_value)
                .and_then(major_to_minor)
        });

        match amount {
            Some(cents) if cents >= self.min_amount_cents => Ok(cents),
            _ => Err(PixError::InvalidAmount {
                min_cents: self.min_amount_cents,
                min_formatted: format_currency(self.min_amount_cents),
            }),
        }
    }

    fn resolve_customer(&self, body: &Map<String, Value>) -> Result<Customer> {
        let name = text_field(body, "name");
        let email = text_field(body, "email");
        let cpf = text_field(body, "cpf").or_else(|| text_field(body, "document"));

        let missing: Vec<&'static str> = [
            ("name", name.is_none()),
            ("email", email.is_none()),
            ("cpf", cpf.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect();

        let (name, email, cpf) = match (name, email, cpf) {
            (Some(name), Some(email), Some(cpf)) => (name, email, cpf),
            (None, None, None) => {
                return self
                    .default_customer
                    .clone()
                    .ok_or(PixError::MissingCustomerFields { missing });
            }
            _ => return Err(PixError::MissingCustomerFields { missing }),
        };

        let phone = text_field(body, "phone")
            .or_else(|| self.default_customer.as_ref().map(|c| c.phone.clone()))
            .ok_or(PixError::MissingCustomerFields {
                missing: vec!["phone"],
            })?;

        let address = body
            .get("address")
            .and_then(|v| serde_json::from_value::<Address>(v.clone()).ok());

        Ok(Customer {
            name,
            email,
            phone,
            document: Document {
                number: cpf,
                doc_type: DocumentType::Cpf,
            },
            address,
        })
    }
}

/// Non-blank strings verbatim, numbers stringified, anything else absent.
fn text_field(body: &Map<String, Value>, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "booleano",
        Value::Number(_) => "número",
        Value::String(_) => "texto",
        Value::Array(_) => "lista",
        Value::Object(_) => "objeto",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::builtin_default_customer;
    use proptest::prelude::*;
    use serde_json::json;

    fn normalizer() -> RequestNormalizer {
        RequestNormalizer::new(&Config::default())
    }

    fn identified(extra: Value) -> Value {
        let mut body = json!({
            "amount": 1500,
            "name": "Maria Silva",
            "email": "maria@example.com",
            "cpf": "123.456.789-09",
        });
        if let (Value::Object(base), Value::Object(extra)) = (&mut body, extra) {
            base.extend(extra);
        }
        body
    }

    fn assert_invalid_amount(result: Result<TransactionIntent>) {
        assert!(matches!(result, Err(PixError::InvalidAmount { min_cents: 100, .. })));
    }

    #[test]
    fn test_minor_amount_used_directly() {
        let intent = normalizer().normalize(&json!({"amount": 2500}), None).unwrap();
        assert_eq!(intent.amount_minor_units, 2500);
    }

    #[test]
    fn test_major_amount_converted() {
        let intent = normalizer().normalize(&json!({"amountReais": 12.34}), None).unwrap();
        assert_eq!(intent.amount_minor_units, 1234);

        let intent = normalizer().normalize(&json!({"amountReais": "12,34"}), None).unwrap();
        assert_eq!(intent.amount_minor_units, 1234);
    }

    #[test]
    fn test_low_minor_amount_falls_back_to_major() {
        let body = json!({"amount": 50, "amountReais": 5});
        let intent = normalizer().normalize(&body, None).unwrap();
        assert_eq!(intent.amount_minor_units, 500);

        let body = json!({"amount": "abc", "amountReais": "7.5"});
        let intent = normalizer().normalize(&body, None).unwrap();
        assert_eq!(intent.amount_minor_units, 750);
    }

    #[test]
    fn test_invalid_amounts_rejected() {
        let n = normalizer();
        assert_invalid_amount(n.normalize(&json!({}), None));
        assert_invalid_amount(n.normalize(&json!({"amount": 99}), None));
        assert_invalid_amount(n.normalize(&json!({"amount": 50, "amountReais": 0.99}), None));
        assert_invalid_amount(n.normalize(&json!({"amountReais": -3}), None));
        assert_invalid_amount(n.normalize(&json!({"amount": "muito"}), None));
        assert_invalid_amount(n.normalize(&Value::Null, None));
    }

    #[test]
    fn test_non_object_body_is_malformed() {
        let result = normalizer().normalize(&json!([1, 2, 3]), None);
        assert!(matches!(result, Err(PixError::MalformedBody(_))));
    }

    #[test]
    fn test_full_identity_uses_caller_values() {
        let intent = normalizer()
            .normalize(&identified(json!({"phone": "5521900001111"})), None)
            .unwrap();

        assert_eq!(intent.customer.name, "Maria Silva");
        assert_eq!(intent.customer.email, "maria@example.com");
        assert_eq!(intent.customer.phone, "5521900001111");
        assert_eq!(intent.customer.document.number, "123.456.789-09");
        assert_eq!(intent.customer.document.doc_type, DocumentType::Cpf);
        assert!(intent.customer.address.is_none());
    }

    #[test]
    fn test_phone_falls_back_to_default_record() {
        let intent = normalizer().normalize(&identified(json!({})), None).unwrap();
        assert_eq!(intent.customer.phone, builtin_default_customer().phone);
    }

    #[test]
    fn test_phone_required_without_default_record() {
        let n = normalizer().with_default_customer(None);
        let result = n.normalize(&identified(json!({})), None);
        assert!(matches!(
            result,
            Err(PixError::MissingCustomerFields { ref missing }) if missing == &vec!["phone"]
        ));
    }

    #[test]
    fn test_document_alias_and_address() {
        let body = json!({
            "amount": 1000,
            "name": "João",
            "email": "joao@example.com",
            "document": 12345678909u64,
            "address": {
                "street": "Av. Ana Costa",
                "streetNumber": "100",
                "zipCode": "11060000",
                "neighborhood": "Gonzaga",
                "city": "Santos",
                "state": "SP",
                "country": "BR"
            }
        });
        let intent = normalizer().normalize(&body, None).unwrap();
        assert_eq!(intent.customer.document.number, "12345678909");
        let address = intent.customer.address.unwrap();
        assert_eq!(address.city, "Santos");
        assert_eq!(address.complement, "");
    }

    #[test]
    fn test_anonymous_uses_default_record() {
        let intent = normalizer().normalize(&json!({"amount": 1000}), None).unwrap();
        assert_eq!(intent.customer, builtin_default_customer());
        assert_eq!(intent.customer.document.doc_type, DocumentType::Cnpj);
    }

    #[test]
    fn test_anonymous_rejected_when_default_disabled() {
        let n = normalizer().with_default_customer(None);
        let result = n.normalize(&json!({"amount": 1000}), None);
        assert!(matches!(
            result,
            Err(PixError::MissingCustomerFields { ref missing }) if missing.len() == 3
        ));
    }

    #[test]
    fn test_partial_identity_never_falls_back() {
        let n = normalizer();
        for body in [
            json!({"amount": 1000, "name": "Maria"}),
            json!({"amount": 1000, "name": "Maria", "email": "m@example.com"}),
            json!({"amount": 1000, "cpf": "12345678909"}),
            json!({"amount": 1000, "name": "Maria", "email": "m@example.com", "cpf": "  "}),
        ] {
            assert!(matches!(
                n.normalize(&body, None),
                Err(PixError::MissingCustomerFields { .. })
            ));
        }
    }

    #[test]
    fn test_partial_identity_lists_missing_fields() {
        let result = normalizer().normalize(&json!({"amount": 1000, "email": "m@example.com"}), None);
        match result {
            Err(PixError::MissingCustomerFields { missing }) => assert_eq!(missing, vec!["name", "cpf"]),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_defaults_for_product_description_and_metadata() {
        let intent = normalizer()
            .normalize(&json!({"amount": 1000}), Some("203.0.113.9".to_string()))
            .unwrap();

        assert_eq!(intent.product, "Pagamento");
        assert_eq!(intent.description, "Pagamento Pagamento");
        assert_eq!(intent.metadata.get("source").map(String::as_str), Some("site"));
        assert_eq!(
            intent.metadata.get("externalRef"),
            Some(&intent.external_reference)
        );
        assert!(intent.external_reference.starts_with("pay-"));
        assert_eq!(intent.client_ip.as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_caller_fields_carried_through() {
        let body = json!({
            "amount": 1000,
            "product": "Campanha Inverno",
            "description": "Doação para a campanha",
            "externalRef": "order-42",
            "source": "app",
            "campaign": "inverno-2026",
            "platform": "ios",
        });
        let intent = normalizer().normalize(&body, None).unwrap();

        assert_eq!(intent.product, "Campanha Inverno");
        assert_eq!(intent.description, "Doação para a campanha");
        assert_eq!(intent.external_reference, "order-42");
        assert_eq!(intent.metadata.get("externalRef").map(String::as_str), Some("order-42"));
        assert_eq!(intent.metadata.get("source").map(String::as_str), Some("app"));
        assert_eq!(intent.metadata.get("campaign").map(String::as_str), Some("inverno-2026"));
        assert_eq!(intent.metadata.get("platform").map(String::as_str), Some("ios"));
    }

    #[test]
    fn test_generated_references_differ() {
        let n = normalizer();
        let a = n.normalize(&json!({"amount": 1000}), None).unwrap();
        let b = n.normalize(&json!({"amount": 1000}), None).unwrap();
        assert_ne!(a.external_reference, b.external_reference);
    }

    proptest! {
        #[test]
        fn major_amounts_at_or_above_minimum_accepted(reais in 1.0f64..100_000.0) {
            let intent = normalizer().normalize(&json!({"amountReais": reais}), None).unwrap();
            prop_assert_eq!(intent.amount_minor_units, (reais * 100.0).round() as u64);
        }

        #[test]
        fn minor_amounts_below_minimum_rejected(cents in 0u64..100) {
            let result = normalizer().normalize(&json!({"amount": cents}), None);
            prop_assert!(matches!(result, Err(PixError::InvalidAmount { .. })), "expected InvalidAmount");
        }

        #[test]
        fn major_amounts_below_minimum_rejected(reais in 0.0f64..0.994) {
            let result = normalizer().normalize(&json!({"amountReais": reais}), None);
            prop_assert!(matches!(result, Err(PixError::InvalidAmount { .. })), "expected InvalidAmount");
        }
    }
}
