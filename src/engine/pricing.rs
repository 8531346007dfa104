// 7.4: oracle snapshots and read-only valuation.

use super::core::Engine;
use super::results::{EngineError, PositionView};
use crate::accrual::{
    borrowing_fee_tokens, entry_notional, leverage_bps, position_pnl, remaining_collateral,
};
use crate::oracle::{PriceOracle, PriceSnapshot};
use crate::pricing::scale_quote;
use crate::types::{Token, TraderId, Usd};

impl<O: PriceOracle> Engine<O> {
    // One snapshot per operation. Prices travel explicitly from here on; no
    // operation consults the oracle twice.
    pub(super) fn price_snapshot(&self) -> Result<PriceSnapshot, EngineError> {
        Ok(PriceSnapshot {
            index_price: self.scaled_price(Token::Index)?,
            collateral_price: self.scaled_price(Token::Collateral)?,
        })
    }

    fn scaled_price(&self, token: Token) -> Result<Usd, EngineError> {
        let params = self.config.market.token_params(token);
        let answer = self.oracle.latest_answer(token).unwrap_or(0);
        scale_quote(answer, params.feed_decimals)
            .ok_or(EngineError::StaleOrInvalidPrice { token, answer })
    }

    /// Mark a live position against the current snapshot without mutating
    /// anything. The fee shown is pending; it settles on the next mutation.
    pub fn position_view(&self, trader: TraderId) -> Result<PositionView, EngineError> {
        let market = &self.config.market;
        let position = self
            .ledger
            .get(trader)
            .ok_or(EngineError::PositionDoesNotExist(trader))?;
        let prices = self.price_snapshot()?;

        let pending_fee = borrowing_fee_tokens(
            position,
            &market.index,
            &market.collateral,
            prices.collateral_price,
            self.current_time,
            market.borrowing_rate_seconds,
        )?;
        let pnl = position_pnl(
            position,
            &market.index,
            &market.collateral,
            prices.index_price,
            prices.collateral_price,
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

        Ok(PositionView {
            side: position.side,
            size: position.size,
            collateral: position.collateral,
            average_price: position.average_price,
            pending_fee,
            pnl,
            remaining_collateral: remaining,
            leverage_bps: leverage_bps(notional, remaining)?,
        })
    }
}
