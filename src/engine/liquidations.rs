// 7.6: liquidation detection and execution.

use super::core::Engine;
use super::results::{EngineError, LiquidationResult};
use crate::accrual::{
    borrowing_fee_tokens, entry_notional, exceeds_bound, position_pnl, remaining_collateral,
};
use crate::events::{EventPayload, PositionLiquidatedEvent};
use crate::oracle::PriceOracle;
use crate::pricing::{convert_token, mul_div};
use crate::types::{TraderId, BPS_DIVISOR};

impl<O: PriceOracle> Engine<O> {
    /// Traders whose fee-adjusted remaining collateral no longer supports
    /// their entry notional at the current snapshot. Sorted for determinism.
    pub fn liquidatable(&self) -> Result<Vec<TraderId>, EngineError> {
        let market = &self.config.market;
        let prices = self.price_snapshot()?;

        let mut out = Vec::new();
        for (trader, position) in self.ledger.iter() {
            let pending_fee = borrowing_fee_tokens(
                position,
                &market.index,
                &market.collateral,
                prices.collateral_price,
                self.current_time,
                market.borrowing_rate_seconds,
            )?;
            let remaining = remaining_collateral(
                position,
                pending_fee,
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
                out.push(*trader);
            }
        }
        out.sort();
        Ok(out)
    }

    /// Forcibly close a position past the leverage bound. The caller must be
    /// a different trader. Collateral settles through a waterfall: borrowing
    /// fee, then trading loss, then the caller's reward, then the residual
    /// back to the owner. Positive PnL is forfeited on liquidation.
    pub fn liquidate_position(
        &mut self,
        caller: TraderId,
        trader: TraderId,
    ) -> Result<LiquidationResult, EngineError> {
        if caller == trader {
            return Err(EngineError::SelfLiquidationProhibited);
        }

        let market = self.config.market.clone();
        let position = self
            .ledger
            .get(trader)
            .cloned()
            .ok_or(EngineError::PositionDoesNotExist(trader))?;
        let prices = self.price_snapshot()?;

        // eligibility uses the uncapped pending fee
        let pending_fee = borrowing_fee_tokens(
            &position,
            &market.index,
            &market.collateral,
            prices.collateral_price,
            self.current_time,
            market.borrowing_rate_seconds,
        )?;
        let remaining = remaining_collateral(
            &position,
            pending_fee,
            &market.index,
            &market.collateral,
            prices.index_price,
            prices.collateral_price,
        )?;
        let notional = entry_notional(
            &position,
            &market.index,
            &market.collateral,
            prices.collateral_price,
        )?;
        if !exceeds_bound(notional, remaining, market.max_leverage) {
            return Err(EngineError::PositionNotLiquidatable(trader));
        }

        let mut pool = self.pool.clone();

        let fee_paid = pending_fee.min(position.collateral);
        pool.absorb_collateral(fee_paid)?;
        let after_fee = position.collateral - fee_paid;

        let pnl = position_pnl(
            &position,
            &market.index,
            &market.collateral,
            prices.index_price,
            prices.collateral_price,
        )?;
        let absorbed_loss = if pnl < 0 {
            pnl.unsigned_abs().min(after_fee)
        } else {
            0
        };
        pool.absorb_collateral(absorbed_loss)?;
        let remainder = after_fee - absorbed_loss;

        let reward = mul_div(remainder, market.liquidator_reward_bps as u128, BPS_DIVISOR)?;
        let returned = remainder - reward;
        pool.release_collateral(reward)?;
        pool.release_collateral(returned)?;

        // release at the average entry price, mirroring decrease
        let reserved = convert_token(
            position.size,
            &market.index,
            position.average_price,
            &market.collateral,
            prices.collateral_price,
        )?;
        pool.remove_open_interest(position.side, reserved);

        self.pool = pool;
        self.ledger.remove(trader);
        if reward > 0 {
            self.bank.push(caller, reward);
        }
        if returned > 0 {
            self.bank.push(trader, returned);
        }

        self.emit_event(EventPayload::PositionLiquidated(PositionLiquidatedEvent {
            trader,
            liquidator: caller,
            size: position.size,
            fee_paid,
            absorbed_loss,
            reward,
            returned,
        }));

        Ok(LiquidationResult {
            trader,
            size: position.size,
            fee_paid,
            absorbed_loss,
            reward,
            returned,
        })
    }
}
