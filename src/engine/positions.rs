// 7.3: position lifecycle. open, increase, decrease.
//
// Shared shape for every mutation: validate inputs, take one price snapshot,
// stage copies of the position and pool, settle the borrowing fee, apply the
// change, run the leverage and reservation checks, then pull funds and commit.
// Nothing owned by the engine changes until every fallible step has passed.

use super::core::Engine;
use super::results::{DecreaseResult, EngineError, IncreaseResult, OpenResult};
use crate::accrual::{
    borrowing_fee_tokens, entry_notional, exceeds_bound, next_average_price, position_pnl,
    prorate, remaining_collateral,
};
use crate::config::MarketParams;
use crate::events::{
    EventPayload, PositionClosedEvent, PositionDecreasedEvent, PositionIncreasedEvent,
    PositionOpenedEvent,
};
use crate::oracle::{PriceOracle, PriceSnapshot};
use crate::pool::PoolState;
use crate::position::Position;
use crate::pricing::{convert_token, MathError};
use crate::types::{Side, SignedTokenAmount, Timestamp, TokenAmount, TraderId};

impl<O: PriceOracle> Engine<O> {
    /// Open a position for a trader with none. Size is in index-token units,
    /// collateral in collateral-token units; both must be positive. Entry is
    /// marked at the snapshot index price and the converted size is reserved
    /// against pool liquidity.
    pub fn open_position(
        &mut self,
        trader: TraderId,
        side: Side,
        size: TokenAmount,
        collateral: TokenAmount,
    ) -> Result<OpenResult, EngineError> {
        if size == 0 {
            return Err(EngineError::InsufficientSize);
        }
        if collateral == 0 {
            return Err(EngineError::InsufficientCollateral);
        }
        if self.ledger.contains(trader) {
            return Err(EngineError::TraderHasOpenPosition(trader));
        }

        let market = self.config.market.clone();
        let prices = self.price_snapshot()?;

        let reserved = convert_token(
            size,
            &market.index,
            prices.index_price,
            &market.collateral,
            prices.collateral_price,
        )?;

        let mut pool = self.pool.clone();
        pool.add_open_interest(side, reserved)?;
        pool.escrow_collateral(collateral)?;

        let position = Position::new(
            trader,
            side,
            size,
            collateral,
            prices.index_price,
            self.current_time,
        );

        check_leverage_bound(&position, &market, &prices)?;
        pool.check_reservation(market.max_utilization_bps)?;

        // last fallible step; after this the commit is unconditional
        self.bank.pull(trader, collateral)?;

        let event = EventPayload::PositionOpened(PositionOpenedEvent {
            trader,
            side,
            size,
            collateral,
            entry_price: prices.index_price,
            reserved,
        });

        self.pool = pool;
        self.ledger.insert(position);
        self.emit_event(event);

        Ok(OpenResult {
            entry_price: prices.index_price,
            reserved,
        })
    }

    /// Grow an open position. Either delta may be zero, not both. The pending
    /// borrowing fee settles first, then added size re-averages the entry
    /// price at the snapshot index price and reserves more liquidity.
    pub fn increase_position(
        &mut self,
        trader: TraderId,
        size_delta: TokenAmount,
        collateral_delta: TokenAmount,
    ) -> Result<IncreaseResult, EngineError> {
        if size_delta == 0 && collateral_delta == 0 {
            return Err(EngineError::NoIncrease);
        }

        let market = self.config.market.clone();
        let mut position = self
            .ledger
            .get(trader)
            .cloned()
            .ok_or(EngineError::PositionDoesNotExist(trader))?;
        let prices = self.price_snapshot()?;
        let mut pool = self.pool.clone();

        let fee_paid =
            settle_borrowing_fee(&mut position, &mut pool, &market, &prices, self.current_time)?;

        if size_delta > 0 {
            position.average_price = next_average_price(
                position.size,
                position.average_price,
                size_delta,
                prices.index_price,
            )?;
            position.size = position
                .size
                .checked_add(size_delta)
                .ok_or(MathError::Overflow)?;

            let reserved_delta = convert_token(
                size_delta,
                &market.index,
                prices.index_price,
                &market.collateral,
                prices.collateral_price,
            )?;
            pool.add_open_interest(position.side, reserved_delta)?;
        }

        if collateral_delta > 0 {
            position.collateral = position
                .collateral
                .checked_add(collateral_delta)
                .ok_or(MathError::Overflow)?;
            pool.escrow_collateral(collateral_delta)?;
        }

        check_leverage_bound(&position, &market, &prices)?;
        pool.check_reservation(market.max_utilization_bps)?;

        if collateral_delta > 0 {
            self.bank.pull(trader, collateral_delta)?;
        }

        let result = IncreaseResult {
            fee_paid,
            new_size: position.size,
            new_collateral: position.collateral,
            average_price: position.average_price,
        };
        let event = EventPayload::PositionIncreased(PositionIncreasedEvent {
            trader,
            size_delta,
            collateral_delta,
            fee_paid,
            new_size: position.size,
            new_collateral: position.collateral,
            average_price: position.average_price,
        });

        self.pool = pool;
        self.ledger.insert(position);
        self.emit_event(event);

        Ok(result)
    }

    /// Shrink an open position, realizing PnL on the size reduction, or close
    /// it outright. A size delta past the open size clamps to a full close.
    /// Withdrawing more collateral than the position holds is an error. No
    /// reservation check here: releasing is always allowed.
    pub fn decrease_position(
        &mut self,
        trader: TraderId,
        size_delta: TokenAmount,
        collateral_delta: TokenAmount,
    ) -> Result<DecreaseResult, EngineError> {
        if size_delta == 0 && collateral_delta == 0 {
            return Err(EngineError::NoDecrease);
        }

        let market = self.config.market.clone();
        let mut position = self
            .ledger
            .get(trader)
            .cloned()
            .ok_or(EngineError::PositionDoesNotExist(trader))?;
        let prices = self.price_snapshot()?;
        let mut pool = self.pool.clone();

        let fee_paid =
            settle_borrowing_fee(&mut position, &mut pool, &market, &prices, self.current_time)?;

        let size_delta = size_delta.min(position.size);

        let mut realized_pnl: SignedTokenAmount = 0;
        let mut returned: TokenAmount = 0;

        if size_delta > 0 {
            let pnl = position_pnl(
                &position,
                &market.index,
                &market.collateral,
                prices.index_price,
                prices.collateral_price,
            )?;
            realized_pnl = prorate(pnl, size_delta, position.size)?;

            if realized_pnl > 0 {
                // profit comes out of pool assets; fails if LPs cannot cover it
                let profit = realized_pnl.unsigned_abs();
                pool.pay_out(profit)?;
                returned = returned.checked_add(profit).ok_or(MathError::Overflow)?;
            } else if realized_pnl < 0 {
                let loss = realized_pnl.unsigned_abs().min(position.collateral);
                position.collateral -= loss;
                pool.absorb_collateral(loss)?;
            }

            // release at the average entry price so reservations made at fill
            // prices unwind to zero when the book empties
            let reserved_delta = convert_token(
                size_delta,
                &market.index,
                position.average_price,
                &market.collateral,
                prices.collateral_price,
            )?;
            pool.remove_open_interest(position.side, reserved_delta);
            position.size -= size_delta;
        }

        if collateral_delta > 0 {
            if collateral_delta > position.collateral {
                return Err(EngineError::InsufficientCollateral);
            }
            position.collateral -= collateral_delta;
            pool.release_collateral(collateral_delta)?;
            returned = returned
                .checked_add(collateral_delta)
                .ok_or(MathError::Overflow)?;
        }

        let closed = position.size == 0;
        if closed && position.collateral > 0 {
            let rest = position.collateral;
            position.collateral = 0;
            pool.release_collateral(rest)?;
            returned = returned.checked_add(rest).ok_or(MathError::Overflow)?;
        }

        if !closed {
            check_leverage_bound(&position, &market, &prices)?;
        }

        let event = if closed {
            EventPayload::PositionClosed(PositionClosedEvent {
                trader,
                fee_paid,
                realized_pnl,
                returned,
            })
        } else {
            EventPayload::PositionDecreased(PositionDecreasedEvent {
                trader,
                size_delta,
                collateral_delta,
                fee_paid,
                realized_pnl,
                returned,
                new_size: position.size,
                new_collateral: position.collateral,
            })
        };

        self.pool = pool;
        if closed {
            self.ledger.remove(trader);
        } else {
            self.ledger.insert(position);
        }
        if returned > 0 {
            self.bank.push(trader, returned);
        }
        self.emit_event(event);

        Ok(DecreaseResult {
            fee_paid,
            realized_pnl,
            returned,
            closed,
        })
    }
}

// Settle the pending borrowing fee onto staged copies. Application is capped
// at the position's collateral so margin never goes negative here; a position
// the fee has eaten through fails the leverage check right after.
fn settle_borrowing_fee(
    position: &mut Position,
    pool: &mut PoolState,
    market: &MarketParams,
    prices: &PriceSnapshot,
    now: Timestamp,
) -> Result<TokenAmount, EngineError> {
    let pending = borrowing_fee_tokens(
        position,
        &market.index,
        &market.collateral,
        prices.collateral_price,
        now,
        market.borrowing_rate_seconds,
    )?;
    let fee = pending.min(position.collateral);
    if fee > 0 {
        position.collateral -= fee;
        pool.absorb_collateral(fee)?;
    }
    position.last_updated = now;
    Ok(fee)
}

// Entry notional against fee-settled remaining collateral, compared by cross
// multiplication.
fn check_leverage_bound(
    position: &Position,
    market: &MarketParams,
    prices: &PriceSnapshot,
) -> Result<(), EngineError> {
    let remaining = remaining_collateral(
        position,
        0,
        &market.index,
        &market.collateral,
        prices.index_price,
        prices.collateral_price,
    )?;
    let notional = entry_notional(
        position,
        &market.index,
        &market.collateral,
        prices.collateral_price,
    )?;
    if exceeds_bound(notional, remaining, market.max_leverage) {
        return Err(EngineError::MaxLeverageExceeded {
            notional,
            remaining,
        });
    }
    Ok(())
}
