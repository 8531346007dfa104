// 8.1 vault.rs: LP share accounting (mocked). Proportional mint on deposit,
// proportional burn on redeem, valued against the pool's net assets so share
// price excludes escrowed trader margin. The generic ERC-4626 style entry
// points exist on the surface but are not wired to the engine and refuse.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::pricing::{mul_div, MathError};
use crate::types::{TokenAmount, TraderId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VaultError {
    #[error("entry point disabled; liquidity moves through add_liquidity / remove_liquidity")]
    UnsupportedOperation,
    #[error("insufficient shares: requested {requested}, held {held}")]
    InsufficientShares { requested: u128, held: u128 },
    #[error("share arithmetic overflow: {0}")]
    Math(#[from] MathError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SharePool {
    total_shares: u128,
    holdings: HashMap<TraderId, u128>,
}

impl SharePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_shares(&self) -> u128 {
        self.total_shares
    }

    pub fn shares_of(&self, provider: TraderId) -> u128 {
        self.holdings.get(&provider).copied().unwrap_or(0)
    }

    // Mint against pre-deposit assets. The first deposit (or a deposit into an
    // empty pool) mints one share per token.
    pub fn deposit(
        &mut self,
        provider: TraderId,
        assets: TokenAmount,
        total_assets: TokenAmount,
    ) -> Result<u128, VaultError> {
        let minted = if self.total_shares == 0 || total_assets == 0 {
            assets
        } else {
            mul_div(assets, self.total_shares, total_assets)?
        };

        self.total_shares = self
            .total_shares
            .checked_add(minted)
            .ok_or(MathError::Overflow)
            .map_err(VaultError::Math)?;
        let held = self.holdings.entry(provider).or_insert(0);
        *held = held
            .checked_add(minted)
            .ok_or(MathError::Overflow)
            .map_err(VaultError::Math)?;

        Ok(minted)
    }

    // Burn shares, return the proportional slice of `total_assets`.
    pub fn redeem(
        &mut self,
        provider: TraderId,
        shares: u128,
        total_assets: TokenAmount,
    ) -> Result<TokenAmount, VaultError> {
        let held = self.shares_of(provider);
        if shares > held {
            return Err(VaultError::InsufficientShares {
                requested: shares,
                held,
            });
        }
        if shares == 0 {
            return Ok(0);
        }

        let assets = mul_div(shares, total_assets, self.total_shares)?;

        self.total_shares -= shares;
        if held == shares {
            self.holdings.remove(&provider);
        } else {
            self.holdings.insert(provider, held - shares);
        }

        Ok(assets)
    }

    // Share-denominated mint is not offered: callers cannot know the token
    // cost ahead of the engine's net-asset accounting.
    pub fn mint(&mut self, _provider: TraderId, _shares: u128) -> Result<TokenAmount, VaultError> {
        Err(VaultError::UnsupportedOperation)
    }

    // Asset-denominated withdraw is not offered either; redemption is always
    // share-denominated and guarded by the engine.
    pub fn withdraw(
        &mut self,
        _provider: TraderId,
        _assets: TokenAmount,
    ) -> Result<u128, VaultError> {
        Err(VaultError::UnsupportedOperation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_deposit_mints_one_to_one() {
        let mut vault = SharePool::new();
        let minted = vault.deposit(TraderId(1), 100_000, 0).unwrap();

        assert_eq!(minted, 100_000);
        assert_eq!(vault.total_shares(), 100_000);
        assert_eq!(vault.shares_of(TraderId(1)), 100_000);
    }

    #[test]
    fn later_deposits_mint_proportionally() {
        let mut vault = SharePool::new();
        vault.deposit(TraderId(1), 100_000, 0).unwrap();

        // pool value doubled since the first deposit, so the same tokens buy
        // half the shares
        let minted = vault.deposit(TraderId(2), 100_000, 200_000).unwrap();
        assert_eq!(minted, 50_000);
        assert_eq!(vault.total_shares(), 150_000);
    }

    #[test]
    fn redeem_pays_the_proportional_slice() {
        let mut vault = SharePool::new();
        vault.deposit(TraderId(1), 100_000, 0).unwrap();

        // net assets grew to 120,000; the full holding redeems all of it
        let assets = vault.redeem(TraderId(1), 100_000, 120_000).unwrap();
        assert_eq!(assets, 120_000);
        assert_eq!(vault.total_shares(), 0);
        assert_eq!(vault.shares_of(TraderId(1)), 0);
    }

    #[test]
    fn partial_redeem_keeps_the_rest() {
        let mut vault = SharePool::new();
        vault.deposit(TraderId(1), 100_000, 0).unwrap();

        let assets = vault.redeem(TraderId(1), 25_000, 100_000).unwrap();
        assert_eq!(assets, 25_000);
        assert_eq!(vault.shares_of(TraderId(1)), 75_000);
        assert_eq!(vault.total_shares(), 75_000);
    }

    #[test]
    fn redeem_beyond_holding_fails() {
        let mut vault = SharePool::new();
        vault.deposit(TraderId(1), 1_000, 0).unwrap();

        let err = vault.redeem(TraderId(1), 2_000, 1_000).unwrap_err();
        assert!(matches!(
            err,
            VaultError::InsufficientShares {
                requested: 2_000,
                held: 1_000
            }
        ));
    }

    #[test]
    fn generic_entry_points_refuse() {
        let mut vault = SharePool::new();

        assert!(matches!(
            vault.mint(TraderId(1), 100),
            Err(VaultError::UnsupportedOperation)
        ));
        assert!(matches!(
            vault.withdraw(TraderId(1), 100),
            Err(VaultError::UnsupportedOperation)
        ));
    }
}
