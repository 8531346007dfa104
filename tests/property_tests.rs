//! Property-based tests for the fixed-point conversion and accrual math.
//!
//! These verify numeric invariants hold under random inputs.

use pool_perps::*;
use proptest::prelude::*;

fn btc() -> TokenParams {
    TokenParams::new("BTC", 8, 8)
}

fn usdc() -> TokenParams {
    TokenParams::new("USDC", 6, 8)
}

fn weth() -> TokenParams {
    TokenParams::new("WETH", 18, 18)
}

// Strategies for generating fixed-point inputs
fn quote_strategy() -> impl Strategy<Value = i128> {
    1i128..10_000_000_000_000i128 // up to $100,000 at 8 feed decimals
}

fn amount_strategy() -> impl Strategy<Value = u128> {
    1u128..10_000_000_000u128 // up to 100 BTC in native units
}

fn size_pair_strategy() -> impl Strategy<Value = (u128, u128)> {
    (1u128..1_000_000_000_000u128, 1u128..1_000_000_000_000u128)
}

proptest! {
    /// Converting to USD and back loses at most one native unit.
    #[test]
    fn round_trip_loses_at_most_one_unit(
        amount in amount_strategy(),
        quote in quote_strategy(),
    ) {
        let params = btc();
        let price = scale_quote(quote, params.feed_decimals).unwrap();

        let usd = usd_value(amount, &params, price).unwrap();
        let back = amount_in_tokens(usd, &params, price).unwrap();

        prop_assert!(back <= amount);
        prop_assert!(amount - back <= 1, "lost {} units", amount - back);
    }

    /// Same bound for a token whose native precision exceeds its USD scale,
    /// where the divisions genuinely truncate.
    #[test]
    fn round_trip_high_precision_token(
        amount in 1u128..100_000_000_000_000_000_000u128,
        quote in 100_000_000i128..10_000_000_000_000_000_000_000i128,
    ) {
        let params = weth();
        let price = scale_quote(quote, params.feed_decimals).unwrap();

        let usd = usd_value(amount, &params, price).unwrap();
        let back = amount_in_tokens(usd, &params, price).unwrap();

        prop_assert!(back <= amount);
        prop_assert!(amount - back <= 1, "lost {} units", amount - back);
    }

    /// PnL is exactly zero when the index sits at the average entry.
    #[test]
    fn pnl_zero_at_entry(
        size in amount_strategy(),
        quote in quote_strategy(),
        // $0.10 floor keeps the USD-to-collateral division inside u128
        collateral_quote in 10_000_000i128..100_000_000_000i128,
    ) {
        let price = scale_quote(quote, 8).unwrap();
        let collateral_price = scale_quote(collateral_quote, 8).unwrap();
        let position = Position::new(
            TraderId(1),
            Side::Long,
            size,
            1_000_000_000,
            price,
            Timestamp::from_secs(0),
        );

        let pnl = position_pnl(&position, &btc(), &usdc(), price, collateral_price).unwrap();
        prop_assert_eq!(pnl, 0);
    }

    /// A long never shows the wrong PnL sign.
    #[test]
    fn pnl_sign_long(
        size in amount_strategy(),
        entry_quote in quote_strategy(),
        index_quote in quote_strategy(),
    ) {
        let entry = scale_quote(entry_quote, 8).unwrap();
        let index = scale_quote(index_quote, 8).unwrap();
        let position = Position::new(
            TraderId(1),
            Side::Long,
            size,
            1_000_000_000,
            entry,
            Timestamp::from_secs(0),
        );

        let pnl = position_pnl(&position, &btc(), &usdc(), index, USD_PRECISION).unwrap();
        if index >= entry {
            prop_assert!(pnl >= 0);
        } else {
            prop_assert!(pnl <= 0);
        }
    }

    /// Long and short PnL negate exactly for identical terms.
    #[test]
    fn pnl_long_short_negate(
        size in amount_strategy(),
        entry_quote in quote_strategy(),
        index_quote in quote_strategy(),
    ) {
        let entry = scale_quote(entry_quote, 8).unwrap();
        let index = scale_quote(index_quote, 8).unwrap();
        let now = Timestamp::from_secs(0);

        let long = Position::new(TraderId(1), Side::Long, size, 1_000_000_000, entry, now);
        let short = Position::new(TraderId(2), Side::Short, size, 1_000_000_000, entry, now);

        let long_pnl = position_pnl(&long, &btc(), &usdc(), index, USD_PRECISION).unwrap();
        let short_pnl = position_pnl(&short, &btc(), &usdc(), index, USD_PRECISION).unwrap();

        prop_assert_eq!(long_pnl, -short_pnl);
    }

    /// A weighted average never leaves the band of its inputs.
    #[test]
    fn average_price_stays_between_fills(
        (size, size_delta) in size_pair_strategy(),
        old_quote in quote_strategy(),
        fill_quote in quote_strategy(),
    ) {
        let old = scale_quote(old_quote, 8).unwrap();
        let fill = scale_quote(fill_quote, 8).unwrap();

        let next = next_average_price(size, old, size_delta, fill).unwrap();

        prop_assert!(next >= old.min(fill));
        prop_assert!(next <= old.max(fill));
    }

    /// Borrowing fees never shrink as time passes.
    #[test]
    fn fee_monotonic_in_elapsed(
        size in amount_strategy(),
        quote in quote_strategy(),
        e1 in 0u64..1_000_000_000u64,
        e2 in 0u64..1_000_000_000u64,
    ) {
        let price = scale_quote(quote, 8).unwrap();
        let (lo, hi) = if e1 <= e2 { (e1, e2) } else { (e2, e1) };

        let fee_lo = borrowing_fee_usd(size, price, &btc(), lo, BORROWING_RATE_SECONDS).unwrap();
        let fee_hi = borrowing_fee_usd(size, price, &btc(), hi, BORROWING_RATE_SECONDS).unwrap();

        prop_assert!(fee_lo <= fee_hi);
    }

    /// At exactly one rate period the fee equals the whole entry notional.
    #[test]
    fn fee_is_notional_after_full_rate_period(
        size in amount_strategy(),
        quote in quote_strategy(),
    ) {
        let price = scale_quote(quote, 8).unwrap();
        let notional = usd_value(size, &btc(), price).unwrap();
        let fee = borrowing_fee_usd(
            size,
            price,
            &btc(),
            BORROWING_RATE_SECONDS,
            BORROWING_RATE_SECONDS,
        )
        .unwrap();

        prop_assert_eq!(fee, notional);
    }

    /// Pro-rata shares keep the sign and never exceed the whole.
    #[test]
    fn prorate_bounded_and_sign_preserving(
        total in -1_000_000_000_000_000i128..1_000_000_000_000_000i128,
        part in 0u128..1_000_000_000_000u128,
        rest in 0u128..1_000_000_000_000u128,
    ) {
        let whole = part + rest + 1;
        let share = prorate(total, part, whole).unwrap();

        prop_assert!(share.unsigned_abs() <= total.unsigned_abs());
        prop_assert!(share == 0 || (share > 0) == (total > 0));
    }

    /// More remaining collateral never turns a passing bound into a failure.
    #[test]
    fn bound_monotonic_in_collateral(
        notional in 1u128..1_000_000_000_000_000u128,
        remaining in 1i128..1_000_000_000_000_000i128,
    ) {
        if !exceeds_bound(notional, remaining, 15) {
            prop_assert!(!exceeds_bound(notional, remaining + 1, 15));
        }
    }

    /// Exhausted collateral always exceeds the bound.
    #[test]
    fn bound_fails_without_collateral(
        notional in 1u128..1_000_000_000_000_000u128,
        deficit in 0i128..1_000_000_000_000i128,
    ) {
        prop_assert!(exceeds_bound(notional, -deficit, 15));
    }

    /// Widened multiply-divide is exact when the divisor cancels.
    #[test]
    fn mul_div_cancels_exactly(
        a in 0u128..1_000_000_000_000_000_000_000_000_000_000u128,
        b in 1u128..1_000_000_000_000_000_000_000_000_000_000u128,
    ) {
        prop_assert_eq!(mul_div(a, b, b).unwrap(), a);
    }

    /// Feed answers scale by exactly 10^(30 - feed_decimals).
    #[test]
    fn scale_quote_expands_to_thirty_decimals(
        quote in 1i128..100_000_000i128,
        decimals in 0u32..=12u32,
    ) {
        let expected = (quote as u128) * 10u128.pow(30 - decimals);
        prop_assert_eq!(scale_quote(quote, decimals), Some(expected));
    }
}

/// Deterministic extremes the strategies above cannot reach.
mod boundary_cases {
    use super::*;

    #[test]
    fn absurd_feed_answer_rejected_not_wrapped() {
        // $1e12 at 8 feed decimals needs more than 128 bits once scaled
        assert_eq!(scale_quote(100_000_000_000_000_000_000, 8), None);
        // the largest representable price still converts
        let price = scale_quote(10_000_000_000_000_000, 8).unwrap();
        assert_eq!(price, 100_000_000 * USD_PRECISION);
        assert_eq!(usd_value(100_000_000, &btc(), price).unwrap(), price);
    }

    #[test]
    fn whale_notional_overflow_is_an_error() {
        // 100,000 BTC at $1,000,000 exceeds the 128-bit USD range
        let price = scale_quote(100_000_000_000_000, 8).unwrap();
        let result = usd_value(10_000_000_000_000, &btc(), price);
        assert!(matches!(result, Err(MathError::Overflow)));
    }

    #[test]
    fn sub_unit_usd_value_truncates_to_zero() {
        // $0.999999... is worth zero whole USDC units at $1
        let one_usdc_in_usd = USD_PRECISION;
        assert_eq!(
            amount_in_tokens(one_usdc_in_usd - 1, &usdc(), USD_PRECISION).unwrap(),
            999_999
        );
        let one_unit_in_usd = USD_PRECISION / 1_000_000;
        assert_eq!(
            amount_in_tokens(one_unit_in_usd - 1, &usdc(), USD_PRECISION).unwrap(),
            0
        );
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert!(matches!(mul_div(1, 1, 0), Err(MathError::DivisionByZero)));
        assert!(matches!(
            amount_in_tokens(USD_PRECISION, &usdc(), 0),
            Err(MathError::DivisionByZero)
        ));
    }
}
