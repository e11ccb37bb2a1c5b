use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{ConversionQuote, Currency, ExchangeRate, QuoteRequest, SetRateRequest};
use crate::{AppError, Result};

// 0.5% of the converted amount, with a ₱5 floor.
const CONVERSION_FEE_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 3);
const CONVERSION_FEE_FLOOR: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
const PLATFORM_FEE: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

const MIN_AMOUNT: Decimal = Decimal::ONE;
const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Produces fee-inclusive conversion quotes and manages the rate table.
///
/// Quoting is a pure read: validation, one rate lookup, arithmetic. Moving
/// the balances happens in [`crate::storage::TransactionStorage`], which
/// takes a quote produced here.
#[derive(Clone)]
pub struct ConversionService {
    rates: crate::storage::RateStorage,
}

impl ConversionService {
    pub fn new(rates: crate::storage::RateStorage) -> Self {
        ConversionService { rates }
    }

    pub async fn quote(&self, request: &QuoteRequest) -> Result<ConversionQuote> {
        let (from, to) = validate(
            request.from_amount,
            &request.from_currency,
            &request.to_currency,
        )?;
        let rate = self.active_rate(from, to).await?;
        Ok(build_quote(request.from_amount, from, to, rate))
    }

    /// Most recently created active rate for the pair. A missing row only
    /// has the 1:1 peg to fall back on for PHP↔PUSO.
    async fn active_rate(&self, from: Currency, to: Currency) -> Result<Decimal> {
        if let Some(row) = self.rates.get_active(from, to).await? {
            return Ok(row.rate);
        }
        fallback_rate(from, to).ok_or_else(|| AppError::RateNotFound(format!("{from} to {to}")))
    }

    pub async fn set_rate(&self, request: &SetRateRequest) -> Result<ExchangeRate> {
        let from: Currency = request.from_currency.parse()?;
        let to: Currency = request.to_currency.parse()?;
        if from == to {
            return Err(AppError::validation("Cannot convert to same currency"));
        }
        if request.rate <= Decimal::ZERO {
            return Err(AppError::validation("Rate must be greater than 0"));
        }
        let source = request.source.as_deref().unwrap_or("manual");
        self.rates.set_rate(from, to, request.rate, source).await
    }

    pub async fn history(&self, from: &str, to: &str, limit: i64) -> Result<Vec<ExchangeRate>> {
        let from: Currency = from.parse()?;
        let to: Currency = to.parse()?;
        self.rates.history(from, to, limit).await
    }
}

fn validate(amount: Decimal, from: &str, to: &str) -> Result<(Currency, Currency)> {
    if amount <= Decimal::ZERO {
        return Err(AppError::validation("Amount must be greater than 0"));
    }
    if amount < MIN_AMOUNT {
        return Err(AppError::validation("Minimum conversion amount is ₱1"));
    }
    if amount > MAX_AMOUNT {
        return Err(AppError::validation("Maximum conversion amount is ₱1,000,000"));
    }
    let from: Currency = from.parse()?;
    let to: Currency = to.parse()?;
    if from == to {
        return Err(AppError::validation("Cannot convert to same currency"));
    }
    Ok((from, to))
}

fn fallback_rate(from: Currency, to: Currency) -> Option<Decimal> {
    match (from, to) {
        (Currency::Php, Currency::Puso) | (Currency::Puso, Currency::Php) => Some(Decimal::ONE),
        _ => None,
    }
}

/// The fee is charged on top of the input: `total_cost` is what the payer's
/// balance loses, `to_amount` is the full converted proceeds.
fn build_quote(amount: Decimal, from: Currency, to: Currency, rate: Decimal) -> ConversionQuote {
    let conversion_fee = (amount * CONVERSION_FEE_RATE).max(CONVERSION_FEE_FLOOR);
    let fee = round_centavos(conversion_fee + PLATFORM_FEE);
    ConversionQuote {
        from_amount: amount,
        from_currency: from,
        to_amount: round_centavos(amount * rate),
        to_currency: to,
        exchange_rate: rate,
        fee,
        total_cost: round_centavos(amount + fee),
    }
}

fn round_centavos(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn small_amounts_pay_the_fee_floor() {
        let quote = build_quote(dec!(100), Currency::Php, Currency::Puso, Decimal::ONE);
        // 0.5% of 100 is 0.50, below the ₱5 floor.
        assert_eq!(quote.fee, dec!(15.00));
        assert_eq!(quote.total_cost, dec!(115.00));
        assert_eq!(quote.to_amount, dec!(100.00));
    }

    #[test]
    fn large_amounts_pay_the_percentage() {
        // 0.5% of 2 000 is 10, above the floor, plus the flat ₱10.
        let quote = build_quote(dec!(2000), Currency::Php, Currency::Puso, Decimal::ONE);
        assert_eq!(quote.fee, dec!(20.00));
        assert_eq!(quote.total_cost, dec!(2020.00));
        assert_eq!(quote.to_amount, dec!(2000.00));

        let quote = build_quote(dec!(10000), Currency::Php, Currency::Puso, Decimal::ONE);
        assert_eq!(quote.fee, dec!(60.00));
        assert_eq!(quote.total_cost, dec!(10060.00));
    }

    #[test]
    fn floor_crossover_sits_at_one_thousand() {
        // At exactly ₱1 000 the percentage equals the floor.
        let at = build_quote(dec!(1000), Currency::Php, Currency::Puso, Decimal::ONE);
        assert_eq!(at.fee, dec!(15.00));
        let above = build_quote(dec!(1001), Currency::Php, Currency::Puso, Decimal::ONE);
        assert_eq!(above.fee, dec!(15.01));
    }

    #[test]
    fn fee_never_touches_proceeds() {
        let quote = build_quote(dec!(2500), Currency::Puso, Currency::Php, dec!(0.98));
        assert_eq!(quote.to_amount, dec!(2450.00));
        assert_eq!(quote.total_cost, quote.from_amount + quote.fee);
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let err = validate(Decimal::ZERO, "PHP", "PUSO").unwrap_err();
        assert_eq!(err.to_string(), "Amount must be greater than 0");
        let err = validate(dec!(-5), "PHP", "PUSO").unwrap_err();
        assert_eq!(err.to_string(), "Amount must be greater than 0");
    }

    #[test]
    fn rejects_amounts_outside_the_band() {
        let err = validate(dec!(0.50), "PHP", "PUSO").unwrap_err();
        assert_eq!(err.to_string(), "Minimum conversion amount is ₱1");
        let err = validate(dec!(2000000), "PHP", "PUSO").unwrap_err();
        assert_eq!(err.to_string(), "Maximum conversion amount is ₱1,000,000");
    }

    #[test]
    fn band_edges_are_inclusive() {
        assert!(validate(dec!(1), "PHP", "PUSO").is_ok());
        assert!(validate(dec!(1000000), "PHP", "PUSO").is_ok());
        let err = validate(dec!(0.99), "PHP", "PUSO").unwrap_err();
        assert_eq!(err.to_string(), "Minimum conversion amount is ₱1");
        let err = validate(dec!(1000000.01), "PHP", "PUSO").unwrap_err();
        assert_eq!(err.to_string(), "Maximum conversion amount is ₱1,000,000");
    }

    #[test]
    fn rejects_unknown_and_identical_currencies() {
        let err = validate(dec!(100), "USD", "PUSO").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported currency: USD");
        let err = validate(dec!(100), "PHP", "php").unwrap_err();
        assert_eq!(err.to_string(), "Cannot convert to same currency");
    }

    #[test]
    fn amount_checks_run_before_currency_checks() {
        let err = validate(Decimal::ZERO, "USD", "USD").unwrap_err();
        assert_eq!(err.to_string(), "Amount must be greater than 0");
    }

    #[test]
    fn peg_applies_only_across_the_pair() {
        assert_eq!(
            fallback_rate(Currency::Php, Currency::Puso),
            Some(Decimal::ONE)
        );
        assert_eq!(
            fallback_rate(Currency::Puso, Currency::Php),
            Some(Decimal::ONE)
        );
        assert_eq!(fallback_rate(Currency::Php, Currency::Php), None);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        let quote = build_quote(dec!(1001.25), Currency::Php, Currency::Puso, dec!(1.005));
        // 1001.25 × 1.005 = 1006.25625 → 1006.26
        assert_eq!(quote.to_amount, dec!(1006.26));
        // fee: max(5.00625, 5) + 10 = 15.00625 → 15.01
        assert_eq!(quote.fee, dec!(15.01));
    }
}
