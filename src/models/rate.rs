use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Currencies the conversion service supports. PUSO is the platform token,
/// pegged 1:1 to PHP unless an explicit rate overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Php,
    Puso,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Php => "PHP",
            Currency::Puso => "PUSO",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Currency {
    type Err = crate::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PHP" => Ok(Currency::Php),
            "PUSO" => Ok(Currency::Puso),
            _ => Err(crate::AppError::validation(format!(
                "Unsupported currency: {s}"
            ))),
        }
    }
}

/// One row of the rate table. Superseded rows stay behind with
/// `is_active = false`; the write path never deletes history.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub id: Uuid,
    pub from_currency: String,
    pub to_currency: String,
    pub rate: Decimal,
    pub source: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Computed preview of a conversion's cost and proceeds. Never persisted;
/// the executing transaction records the rate and fee it was quoted with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionQuote {
    pub from_amount: Decimal,
    pub from_currency: Currency,
    pub to_amount: Decimal,
    pub to_currency: Currency,
    pub exchange_rate: Decimal,
    pub fee: Decimal,
    pub total_cost: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub from_amount: Decimal,
    pub from_currency: String,
    pub to_currency: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    pub user_id: Uuid,
    pub from_amount: Decimal,
    pub from_currency: String,
    pub to_currency: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRateRequest {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: Decimal,
    pub source: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn quote_serializes_in_wire_casing() {
        let quote = ConversionQuote {
            from_amount: dec!(100),
            from_currency: Currency::Php,
            to_amount: dec!(100),
            to_currency: Currency::Puso,
            exchange_rate: Decimal::ONE,
            fee: dec!(15),
            total_cost: dec!(115),
        };
        let value = serde_json::to_value(&quote).unwrap();
        assert_eq!(value["fromCurrency"], "PHP");
        assert_eq!(value["toCurrency"], "PUSO");
        // Decimals cross the wire as strings so the frontend never touches
        // floats.
        assert_eq!(value["totalCost"], "115");
        assert_eq!(value["fee"], "15");
    }

    #[test]
    fn quote_request_accepts_camel_case_bodies() {
        let request: QuoteRequest = serde_json::from_value(serde_json::json!({
            "fromAmount": "250.50",
            "fromCurrency": "PHP",
            "toCurrency": "PUSO"
        }))
        .unwrap();
        assert_eq!(request.from_amount, dec!(250.50));
        assert_eq!(request.from_currency, "PHP");
    }
}
