// 2.0 pricing.rs: fixed-point price conversion. every amount that crosses an
// asset boundary goes through here.
//
// Feed quotes are normalized to 30-decimal USD once, then conversions move
// amounts between native units and USD with U256 intermediates so the
// multiply-then-divide chains cannot overflow. All division truncates toward
// zero; callers tolerate at most one native unit of rounding loss per round trip.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::types::{TokenAmount, Usd, USD_DECIMALS, USD_PRECISION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    #[error("arithmetic overflow")]
    Overflow,
    #[error("division by zero")]
    DivisionByZero,
}

// 2.1: decimal layout of one asset. `decimals` is the native on-chain precision,
// `feed_decimals` is the precision the price feed quotes in. Both must be <= 30;
// config validation enforces it before an engine is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenParams {
    pub symbol: String,
    pub decimals: u32,
    pub feed_decimals: u32,
}

impl TokenParams {
    pub fn new(symbol: &str, decimals: u32, feed_decimals: u32) -> Self {
        debug_assert!(decimals <= USD_DECIMALS && feed_decimals <= USD_DECIMALS);
        Self {
            symbol: symbol.to_string(),
            decimals,
            feed_decimals,
        }
    }

    // 10^decimals: one whole token in native units
    pub fn unit_scale(&self) -> u128 {
        10u128.pow(self.decimals)
    }

    // 10^(30 - decimals): bridges USD precision and native precision
    pub fn usd_unit_scale(&self) -> u128 {
        10u128.pow(USD_DECIMALS - self.decimals)
    }
}

// 2.2: feed answer -> 30-decimal USD price. Feeds report signed integers;
// anything non-positive means the feed is stale or broken and must not be
// cast, so the caller gets None and surfaces its own error.
#[must_use]
pub fn scale_quote(answer: i128, feed_decimals: u32) -> Option<Usd> {
    if answer <= 0 {
        return None;
    }
    let exp = USD_DECIMALS.checked_sub(feed_decimals)?;
    (answer as u128).checked_mul(10u128.pow(exp))
}

// 2.3: widening multiply-divide: a * b / divisor without intermediate overflow.
pub fn mul_div(a: u128, b: u128, divisor: u128) -> Result<u128, MathError> {
    if divisor == 0 {
        return Err(MathError::DivisionByZero);
    }
    narrow(U256::from(a) * U256::from(b) / U256::from(divisor))
}

pub(crate) fn narrow(value: U256) -> Result<u128, MathError> {
    if value > U256::from(u128::MAX) {
        return Err(MathError::Overflow);
    }
    Ok(value.low_u128())
}

// 2.4: native amount -> 30-decimal USD value at the given price.
pub fn usd_value(amount: TokenAmount, token: &TokenParams, price: Usd) -> Result<Usd, MathError> {
    mul_div(amount, price, token.unit_scale())
}

// 2.5: 30-decimal USD value -> native amount at the given price. Two
// truncating divisions, matching the USD-precision intermediate step.
pub fn amount_in_tokens(usd: Usd, token: &TokenParams, price: Usd) -> Result<TokenAmount, MathError> {
    let usd_units = mul_div(usd, USD_PRECISION, price)?;
    Ok(usd_units / token.usd_unit_scale())
}

// 2.6: native amount of one asset -> native amount of another, through USD.
pub fn convert_token(
    amount: TokenAmount,
    from: &TokenParams,
    from_price: Usd,
    to: &TokenParams,
    to_price: Usd,
) -> Result<TokenAmount, MathError> {
    let usd = usd_value(amount, from, from_price)?;
    amount_in_tokens(usd, to, to_price)
}
