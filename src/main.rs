//! Pool-Backed Perps Core Simulation.
//!
//! Demonstrates the accounting engine lifecycle: LP deposits, position
//! open/increase/decrease, borrowing fee accrual, the utilization cap, and
//! liquidation settlement.

use pool_perps::*;

const BTC_UNIT: u128 = 100_000_000;
const USDC_UNIT: u128 = 1_000_000;
const FEED_UNIT: i128 = 100_000_000;

const DAY_SECS: i64 = 24 * 60 * 60;

fn main() {
    println!("Pool-Backed Perps Core Simulation");
    println!("Single Market, Shared Liquidity, Full Lifecycle\n");

    scenario_1_pool_and_long();
    scenario_2_entry_averaging();
    scenario_3_borrowing_fee();
    scenario_4_utilization_cap();
    scenario_5_liquidation();

    println!("\nAll simulations completed successfully.");
}

fn usdc(whole: u128) -> u128 {
    whole * USDC_UNIT
}

fn fmt_usdc(amount: u128) -> String {
    format!("{}.{:02}", amount / USDC_UNIT, (amount % USDC_UNIT) / 10_000)
}

fn fmt_signed_usdc(amount: i128) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    format!("{}{}", sign, fmt_usdc(amount.unsigned_abs()))
}

fn fmt_price(price: Usd) -> String {
    format!("{}", price / USD_PRECISION)
}

/// LP seeds the pool, a trader rides a 10% move and closes.
fn scenario_1_pool_and_long() {
    println!("Scenario 1: Pool Bootstrap and a Profitable Long\n");

    let mut engine = Engine::new(EngineConfig::default());
    engine.post_quote(Token::Index, 50_000 * FEED_UNIT);
    engine.post_quote(Token::Collateral, FEED_UNIT);

    let lp = TraderId(1);
    let alice = TraderId(2);

    engine.fund_trader(lp, usdc(1_000_000));
    engine.fund_trader(alice, usdc(20_000));

    let shares = engine.add_liquidity(lp, usdc(1_000_000)).unwrap();
    println!("  LP deposits 1,000,000 USDC for {} shares", shares);

    let open = engine
        .open_position(alice, Side::Long, 2 * BTC_UNIT, usdc(20_000))
        .unwrap();
    println!(
        "  Alice opens 2 BTC long @ ${}, reserves {} USDC",
        fmt_price(open.entry_price),
        fmt_usdc(open.reserved)
    );

    let view = engine.position_view(alice).unwrap();
    println!(
        "  Leverage: {}x, utilization: {} bps",
        view.leverage_bps.unwrap() / 10_000,
        engine.utilization_bps()
    );

    engine.post_quote(Token::Index, 55_000 * FEED_UNIT);
    let view = engine.position_view(alice).unwrap();
    println!(
        "  Price rises to $55,000: PnL {} USDC",
        fmt_signed_usdc(view.pnl)
    );

    let close = engine.decrease_position(alice, 2 * BTC_UNIT, 0).unwrap();
    println!(
        "  Alice closes: realized {} USDC, returned {} USDC",
        fmt_signed_usdc(close.realized_pnl),
        fmt_usdc(close.returned)
    );
    println!(
        "  Alice wallet: {} USDC, pool balance: {} USDC\n",
        fmt_usdc(engine.wallet_balance(alice)),
        fmt_usdc(engine.pool().balance)
    );
}

/// Entry price re-averages as size is added at rising prices.
fn scenario_2_entry_averaging() {
    println!("Scenario 2: Entry Price Averaging\n");

    let mut engine = Engine::new(EngineConfig::default());
    engine.post_quote(Token::Index, 50_000 * FEED_UNIT);
    engine.post_quote(Token::Collateral, FEED_UNIT);

    let lp = TraderId(1);
    let bob = TraderId(2);

    engine.fund_trader(lp, usdc(1_000_000));
    engine.fund_trader(bob, usdc(30_000));
    engine.add_liquidity(lp, usdc(1_000_000)).unwrap();

    engine
        .open_position(bob, Side::Long, BTC_UNIT, usdc(30_000))
        .unwrap();
    let pos = engine.position(bob).unwrap();
    println!("  1 BTC filled @ $50,000, average ${}", fmt_price(pos.average_price));

    engine.post_quote(Token::Index, 60_000 * FEED_UNIT);
    let result = engine.increase_position(bob, BTC_UNIT, 0).unwrap();
    println!("  +1 BTC @ $60,000, average ${}", fmt_price(result.average_price));

    engine.post_quote(Token::Index, 70_000 * FEED_UNIT);
    let result = engine.increase_position(bob, BTC_UNIT, 0).unwrap();
    println!("  +1 BTC @ $70,000, average ${}", fmt_price(result.average_price));

    let view = engine.position_view(bob).unwrap();
    println!(
        "  Final: {} sats @ average ${}, PnL {} USDC\n",
        view.size,
        fmt_price(view.average_price),
        fmt_signed_usdc(view.pnl)
    );
}

/// Borrowing fee accrues against the position and lands with LPs.
fn scenario_3_borrowing_fee() {
    println!("Scenario 3: Borrowing Fee Accrual\n");

    let mut engine = Engine::new(EngineConfig::default());
    engine.post_quote(Token::Index, 50_000 * FEED_UNIT);
    engine.post_quote(Token::Collateral, FEED_UNIT);

    let lp = TraderId(1);
    let carol = TraderId(2);

    engine.fund_trader(lp, usdc(100_000));
    engine.fund_trader(carol, usdc(10_000));
    engine.add_liquidity(lp, usdc(100_000)).unwrap();

    engine
        .open_position(carol, Side::Long, BTC_UNIT, usdc(10_000))
        .unwrap();
    println!("  Carol opens 1 BTC long @ $50,000 with 10,000 USDC");

    engine.advance_time(365 * DAY_SECS);
    let view = engine.position_view(carol).unwrap();
    println!(
        "  After 365 days the pending fee is {} USDC (10% of notional)",
        fmt_usdc(view.pending_fee)
    );

    let close = engine.decrease_position(carol, BTC_UNIT, 0).unwrap();
    println!(
        "  Close: fee {} USDC, returned {} USDC",
        fmt_usdc(close.fee_paid),
        fmt_usdc(close.returned)
    );

    let redeemed = engine
        .remove_liquidity(lp, engine.lp_shares(lp))
        .unwrap();
    println!(
        "  LP redeems all shares for {} USDC (fee income included)\n",
        fmt_usdc(redeemed)
    );
}

/// The reservation gate caps open interest at 75% of net assets.
fn scenario_4_utilization_cap() {
    println!("Scenario 4: Utilization Cap\n");

    let mut engine = Engine::new(EngineConfig::default());
    engine.post_quote(Token::Index, 50_000 * FEED_UNIT);
    engine.post_quote(Token::Collateral, FEED_UNIT);

    let lp = TraderId(1);
    let dave = TraderId(2);

    engine.fund_trader(lp, usdc(100_000));
    engine.fund_trader(dave, usdc(20_000));
    engine.add_liquidity(lp, usdc(100_000)).unwrap();
    println!(
        "  Pool holds 100,000 USDC, cap allows {} USDC reserved",
        fmt_usdc(engine.max_utilization().unwrap())
    );

    // 1.6 BTC at $50,000 wants 80,000 USDC of liquidity
    let err = engine
        .open_position(dave, Side::Long, 16 * BTC_UNIT / 10, usdc(10_000))
        .unwrap_err();
    println!("  Open 1.6 BTC rejected: {}", err);

    engine
        .open_position(dave, Side::Long, 15 * BTC_UNIT / 10, usdc(10_000))
        .unwrap();
    println!(
        "  Open 1.5 BTC accepted, utilization: {} bps",
        engine.utilization_bps()
    );

    let err = engine.remove_liquidity(lp, engine.lp_shares(lp)).unwrap_err();
    println!("  LP withdrawal while reserved rejected: {}", err);

    engine.decrease_position(dave, 15 * BTC_UNIT / 10, 0).unwrap();
    let redeemed = engine.remove_liquidity(lp, engine.lp_shares(lp)).unwrap();
    println!(
        "  After the close the LP exits with {} USDC\n",
        fmt_usdc(redeemed)
    );
}

/// A 10x long gets liquidated after a 9% drop.
fn scenario_5_liquidation() {
    println!("Scenario 5: Liquidation\n");

    let mut engine = Engine::new(EngineConfig::default());
    engine.post_quote(Token::Index, 50_000 * FEED_UNIT);
    engine.post_quote(Token::Collateral, FEED_UNIT);

    let lp = TraderId(1);
    let eve = TraderId(2);
    let frank = TraderId(3);

    engine.fund_trader(lp, usdc(200_000));
    engine.fund_trader(eve, usdc(5_000));
    engine.add_liquidity(lp, usdc(200_000)).unwrap();

    engine
        .open_position(eve, Side::Long, BTC_UNIT, usdc(5_000))
        .unwrap();
    println!("  Eve opens 1 BTC long @ $50,000 with 5,000 USDC (10x)");

    engine.post_quote(Token::Index, 45_500 * FEED_UNIT);
    let candidates = engine.liquidatable().unwrap();
    println!("  Price drops to $45,500, liquidatable: {:?}", candidates);

    let result = engine.liquidate_position(frank, eve).unwrap();
    println!(
        "  Frank liquidates eve: loss absorbed {} USDC, reward {} USDC, residual {} USDC",
        fmt_usdc(result.absorbed_loss),
        fmt_usdc(result.reward),
        fmt_usdc(result.returned)
    );

    println!(
        "  Frank wallet: {} USDC, Eve wallet: {} USDC",
        fmt_usdc(engine.wallet_balance(frank)),
        fmt_usdc(engine.wallet_balance(eve))
    );
    println!(
        "  Pool: balance {} USDC, net assets {} USDC, open positions {}",
        fmt_usdc(engine.pool().balance),
        fmt_usdc(engine.pool().net_assets()),
        engine.open_positions()
    );
    println!("  Events recorded: {}", engine.events().len());
}
