// 7.7: LP entry and exit.

use super::core::Engine;
use super::results::EngineError;
use crate::events::{EventPayload, LiquidityAddedEvent, LiquidityRemovedEvent};
use crate::oracle::PriceOracle;
use crate::types::{TokenAmount, TraderId};

impl<O: PriceOracle> Engine<O> {
    /// Deposit collateral tokens into the pool for newly minted shares.
    /// Shares price against net assets, so escrowed trader collateral never
    /// dilutes or inflates an LP's slice.
    pub fn add_liquidity(
        &mut self,
        provider: TraderId,
        amount: TokenAmount,
    ) -> Result<u128, EngineError> {
        let mut vault = self.vault.clone();
        let minted = vault.deposit(provider, amount, self.pool.net_assets())?;

        let mut pool = self.pool.clone();
        pool.add_assets(amount)?;

        self.bank.pull(provider, amount)?;

        self.pool = pool;
        self.vault = vault;

        let pool_balance = self.pool.balance;
        self.emit_event(EventPayload::LiquidityAdded(LiquidityAddedEvent {
            provider,
            amount,
            shares_minted: minted,
            pool_balance,
        }));

        Ok(minted)
    }

    /// Burn shares for the proportional slice of net assets. Blocked when the
    /// withdrawal would leave reserved liquidity past the utilization cap.
    pub fn remove_liquidity(
        &mut self,
        provider: TraderId,
        shares: u128,
    ) -> Result<TokenAmount, EngineError> {
        let mut vault = self.vault.clone();
        let amount = vault.redeem(provider, shares, self.pool.net_assets())?;

        let mut pool = self.pool.clone();
        pool.pay_out(amount)?;
        pool.check_reservation(self.config.market.max_utilization_bps)?;

        self.pool = pool;
        self.vault = vault;
        self.bank.push(provider, amount);

        let pool_balance = self.pool.balance;
        self.emit_event(EventPayload::LiquidityRemoved(LiquidityRemovedEvent {
            provider,
            shares_burned: shares,
            amount,
            pool_balance,
        }));

        Ok(amount)
    }
}
