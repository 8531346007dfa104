// 4.0 accrual.rs: time accrual and valuation. borrowing fees, weighted entry
// price, PnL, and the leverage bound.
//
// Everything here is a pure function over a position and an explicit price
// snapshot. The controller decides when to apply results; nothing in this file
// mutates state. Fees accrue against the entry-price notional, so an open
// position costs the same per second regardless of where the market moves.

use primitive_types::U256;

use crate::position::Position;
use crate::pricing::{
    amount_in_tokens, convert_token, mul_div, narrow, usd_value, MathError, TokenParams,
};
use crate::types::{Side, SignedTokenAmount, Timestamp, TokenAmount, Usd, BPS_DIVISOR};

// 4.1: borrowing fee in 30-decimal USD for `elapsed_secs` of exposure.
// `rate_seconds` is the number of seconds over which the fee equals the full
// notional; the default in config encodes 10% of notional per 365-day year.
pub fn borrowing_fee_usd(
    size: TokenAmount,
    average_price: Usd,
    index: &TokenParams,
    elapsed_secs: u64,
    rate_seconds: u64,
) -> Result<Usd, MathError> {
    let notional = usd_value(size, index, average_price)?;
    mul_div(notional, elapsed_secs as u128, rate_seconds as u128)
}

// The same fee, converted to collateral native units at the snapshot price.
pub fn borrowing_fee_tokens(
    position: &Position,
    index: &TokenParams,
    collateral: &TokenParams,
    collateral_price: Usd,
    now: Timestamp,
    rate_seconds: u64,
) -> Result<TokenAmount, MathError> {
    let elapsed = position.last_updated.elapsed_seconds(now);
    let fee_usd = borrowing_fee_usd(
        position.size,
        position.average_price,
        index,
        elapsed,
        rate_seconds,
    )?;
    amount_in_tokens(fee_usd, collateral, collateral_price)
}

// 4.2: volume-weighted entry price after adding `size_delta` at `fill_price`.
// Single division at the end; the weighted sum is carried in U256.
pub fn next_average_price(
    size: TokenAmount,
    average_price: Usd,
    size_delta: TokenAmount,
    fill_price: Usd,
) -> Result<Usd, MathError> {
    let total_size = size.checked_add(size_delta).ok_or(MathError::Overflow)?;
    if total_size == 0 {
        return Err(MathError::DivisionByZero);
    }

    let prior = U256::from(size) * U256::from(average_price);
    let added = U256::from(size_delta) * U256::from(fill_price);
    let weighted = prior.checked_add(added).ok_or(MathError::Overflow)?;

    narrow(weighted / U256::from(total_size))
}

// 4.3: signed PnL in collateral native units. Entry and current value are the
// position size converted to collateral units at the average price and the
// snapshot index price respectively, both at the snapshot collateral price.
pub fn position_pnl(
    position: &Position,
    index: &TokenParams,
    collateral: &TokenParams,
    index_price: Usd,
    collateral_price: Usd,
) -> Result<SignedTokenAmount, MathError> {
    let current = convert_token(position.size, index, index_price, collateral, collateral_price)?;
    let entry = convert_token(
        position.size,
        index,
        position.average_price,
        collateral,
        collateral_price,
    )?;

    let current = i128::try_from(current).map_err(|_| MathError::Overflow)?;
    let entry = i128::try_from(entry).map_err(|_| MathError::Overflow)?;

    Ok(match position.side {
        Side::Long => current - entry,
        Side::Short => entry - current,
    })
}

// Pro-rata share of a signed total, truncating toward zero.
pub fn prorate(
    total: SignedTokenAmount,
    part: TokenAmount,
    whole: TokenAmount,
) -> Result<SignedTokenAmount, MathError> {
    if whole == 0 {
        return Err(MathError::DivisionByZero);
    }
    let magnitude = mul_div(total.unsigned_abs(), part, whole)?;
    let magnitude = i128::try_from(magnitude).map_err(|_| MathError::Overflow)?;
    Ok(if total < 0 { -magnitude } else { magnitude })
}

// 4.4: entry notional in collateral native units, the numerator of leverage.
pub fn entry_notional(
    position: &Position,
    index: &TokenParams,
    collateral: &TokenParams,
    collateral_price: Usd,
) -> Result<TokenAmount, MathError> {
    convert_token(
        position.size,
        index,
        position.average_price,
        collateral,
        collateral_price,
    )
}

// Margin left after marking PnL and the still-pending borrowing fee.
// May be negative; a non-positive result already exceeds any leverage bound.
pub fn remaining_collateral(
    position: &Position,
    pending_fee: TokenAmount,
    index: &TokenParams,
    collateral: &TokenParams,
    index_price: Usd,
    collateral_price: Usd,
) -> Result<SignedTokenAmount, MathError> {
    let pnl = position_pnl(position, index, collateral, index_price, collateral_price)?;
    let margin = i128::try_from(position.collateral).map_err(|_| MathError::Overflow)?;
    let fee = i128::try_from(pending_fee).map_err(|_| MathError::Overflow)?;

    margin
        .checked_add(pnl)
        .and_then(|m| m.checked_sub(fee))
        .ok_or(MathError::Overflow)
}

// 4.5: the leverage bound, compared by cross-multiplication so no precision is
// lost to division. Exhausted margin (remaining <= 0) exceeds every bound.
pub fn exceeds_bound(
    notional: TokenAmount,
    remaining: SignedTokenAmount,
    max_leverage: u32,
) -> bool {
    if remaining <= 0 {
        return true;
    }
    U256::from(notional) > U256::from(max_leverage) * U256::from(remaining.unsigned_abs())
}

// Leverage as basis points (15x -> 150_000), for views and events only.
pub fn leverage_bps(
    notional: TokenAmount,
    remaining: SignedTokenAmount,
) -> Result<Option<u128>, MathError> {
    if remaining <= 0 {
        return Ok(None);
    }
    Ok(Some(mul_div(
        notional,
        BPS_DIVISOR,
        remaining.unsigned_abs(),
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TraderId, USD_PRECISION};

    fn btc() -> TokenParams {
        TokenParams::new("BTC", 8, 8)
    }

    fn usdc() -> TokenParams {
        TokenParams::new("USDC", 6, 8)
    }

    fn usd(n: u128) -> Usd {
        n * USD_PRECISION
    }

    fn position(side: Side, size: TokenAmount, collateral: TokenAmount, avg: Usd) -> Position {
        Position::new(TraderId(1), side, size, collateral, avg, Timestamp::from_secs(0))
    }

    const RATE_SECONDS: u64 = 315_360_000;

    #[test]
    fn fee_after_one_year_is_ten_percent() {
        // 2 BTC at $50,000 entry = $100,000 notional; 365 days = $10,000
        let fee = borrowing_fee_usd(2_00000000, usd(50_000), &btc(), 365 * 86_400, RATE_SECONDS)
            .unwrap();
        assert_eq!(fee, usd(10_000));
    }

    #[test]
    fn fee_zero_elapsed_is_zero() {
        let fee = borrowing_fee_usd(2_00000000, usd(50_000), &btc(), 0, RATE_SECONDS).unwrap();
        assert_eq!(fee, 0);
    }

    #[test]
    fn fee_converts_to_collateral_units() {
        let pos = position(Side::Long, 2_00000000, 10_000_000000, usd(50_000));
        let fee = borrowing_fee_tokens(
            &pos,
            &btc(),
            &usdc(),
            usd(1),
            Timestamp::from_secs(365 * 86_400),
            RATE_SECONDS,
        )
        .unwrap();
        // $10,000 at $1 collateral = 10,000 USDC
        assert_eq!(fee, 10_000_000000);
    }

    #[test]
    fn average_price_ladder() {
        // equal tranches at $50k, $60k, $70k walk the average 50k -> 55k -> 60k
        let avg = next_average_price(1_00000000, usd(50_000), 1_00000000, usd(60_000)).unwrap();
        assert_eq!(avg, usd(55_000));

        let avg = next_average_price(2_00000000, avg, 1_00000000, usd(70_000)).unwrap();
        assert_eq!(avg, usd(60_000));
    }

    #[test]
    fn average_price_of_fresh_position_is_fill_price() {
        let avg = next_average_price(0, 0, 1_00000000, usd(42_000)).unwrap();
        assert_eq!(avg, usd(42_000));
    }

    #[test]
    fn pnl_zero_at_entry_price() {
        let pos = position(Side::Long, 2_00000000, 10_000_000000, usd(50_000));
        let pnl = position_pnl(&pos, &btc(), &usdc(), usd(50_000), usd(1)).unwrap();
        assert_eq!(pnl, 0);
    }

    #[test]
    fn pnl_tracks_ten_percent_move() {
        // 2 BTC long from $50k: +10% index move = +$10,000 = +10,000 USDC
        let pos = position(Side::Long, 2_00000000, 10_000_000000, usd(50_000));

        let up = position_pnl(&pos, &btc(), &usdc(), usd(55_000), usd(1)).unwrap();
        assert_eq!(up, 10_000_000000);

        let down = position_pnl(&pos, &btc(), &usdc(), usd(45_000), usd(1)).unwrap();
        assert_eq!(down, -10_000_000000);
    }

    #[test]
    fn short_pnl_is_mirrored() {
        let long = position(Side::Long, 1_00000000, 5_000_000000, usd(50_000));
        let short = position(Side::Short, 1_00000000, 5_000_000000, usd(50_000));

        let long_pnl = position_pnl(&long, &btc(), &usdc(), usd(48_000), usd(1)).unwrap();
        let short_pnl = position_pnl(&short, &btc(), &usdc(), usd(48_000), usd(1)).unwrap();

        assert_eq!(long_pnl, -2_000_000000);
        assert_eq!(short_pnl, 2_000_000000);
    }

    #[test]
    fn prorate_truncates_toward_zero() {
        assert_eq!(prorate(10, 1, 3).unwrap(), 3);
        assert_eq!(prorate(-10, 1, 3).unwrap(), -3);
        assert_eq!(prorate(10, 3, 3).unwrap(), 10);
        assert_eq!(prorate(0, 1, 3).unwrap(), 0);
    }

    #[test]
    fn leverage_bound_is_strict() {
        // 15,000 USDC notional on 1,000 USDC margin is exactly 15x: allowed
        assert!(!exceeds_bound(15_000_000000, 1_000_000000, 15));
        // one unit more crosses the bound
        assert!(exceeds_bound(15_000_000001, 1_000_000000, 15));
    }

    #[test]
    fn exhausted_margin_exceeds_every_bound() {
        assert!(exceeds_bound(1, 0, 15));
        assert!(exceeds_bound(0, -1, 15));
    }

    #[test]
    fn leverage_bps_reads_fifteen_x() {
        assert_eq!(leverage_bps(15_000_000000, 1_000_000000).unwrap(), Some(150_000));
        assert_eq!(leverage_bps(15_000_000000, 0).unwrap(), None);
        assert_eq!(leverage_bps(15_000_000000, -5).unwrap(), None);
    }

    #[test]
    fn remaining_collateral_nets_fee_and_pnl() {
        let pos = position(Side::Long, 2_00000000, 10_000_000000, usd(50_000));

        // -$4,000 PnL and a 1,000 USDC pending fee leave 5,000 USDC
        let remaining =
            remaining_collateral(&pos, 1_000_000000, &btc(), &usdc(), usd(48_000), usd(1)).unwrap();
        assert_eq!(remaining, 5_000_000000);

        // deep drawdown goes negative
        let remaining =
            remaining_collateral(&pos, 0, &btc(), &usdc(), usd(44_000), usd(1)).unwrap();
        assert_eq!(remaining, -2_000_000000);
    }
}
