// Utilitários para manipulação de valores monetários (BRL, centavos)

use serde_json::Value;

/// Reads a minor-unit amount. Only whole, positive values count.
pub fn minor_units_from_value(value: &Value) -> Option<u64> {
    let raw = match value {
        Value::Number(n) => match n.as_u64() {
            Some(exact) => return (exact > 0).then_some(exact),
            None => n.as_f64()?,
        },
        Value::String(s) => {
            let s = s.trim();
            if let Ok(exact) = s.parse::<u64>() {
                return (exact > 0).then_some(exact);
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };

    if !raw.is_finite() || raw <= 0.0 || raw.fract() != 0.0 || raw >= u64::MAX as f64 {
        return None;
    }
    Some(raw as u64)
}

/// Reads a major-unit (reais) amount from a number or a currency string.
pub fn major_units_from_value(value: &Value) -> Option<f64> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_currency(s)?,
        _ => return None,
    };
    raw.is_finite().then_some(raw)
}

/// `round(reais * 100)`; `None` for non-positive results.
pub fn major_to_minor(reais: f64) -> Option<u64> {
    if !reais.is_finite() {
        return None;
    }
    let cents = (reais * 100.0).round();
    if cents <= 0.0 || cents > u64::MAX as f64 {
        return None;
    }
    Some(cents as u64)
}

pub fn format_currency(amount: u64) -> String {
    format!("R$ {},{:02}", amount / 100, amount % 100)
}

/// Accepts `"10.50"`, `"10,50"`, `"R$ 1.234,56"`.
pub fn parse_currency(currency_str: &str) -> Option<f64> {
    let cleaned = currency_str.trim().trim_start_matches("R$").trim();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.contains('.'), cleaned.contains(',')) {
        (true, true) => cleaned.replace('.', "").replace(',', "."),
        (false, true) => cleaned.replace(',', "."),
        _ => cleaned.to_string(),
    };
    normalized.parse().ok()
}
