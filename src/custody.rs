// 8.2 custody.rs: collateral wallet ledger (mocked). Tracks what each trader
// holds outside the pool; the pool's own holdings live in PoolState.balance.
// Pulls are all-or-nothing and only ever issued after an operation has passed
// every check; pushes credit back and cannot fail.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{TokenAmount, TraderId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        requested: TokenAmount,
        available: TokenAmount,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollateralBank {
    balances: HashMap<TraderId, TokenAmount>,
}

impl CollateralBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, trader: TraderId) -> TokenAmount {
        self.balances.get(&trader).copied().unwrap_or(0)
    }

    // Test/simulation faucet.
    pub fn credit(&mut self, trader: TraderId, amount: TokenAmount) {
        let balance = self.balances.entry(trader).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    // Move tokens out of the wallet. All or nothing.
    pub fn pull(&mut self, trader: TraderId, amount: TokenAmount) -> Result<(), TransferError> {
        let available = self.balance_of(trader);
        if amount > available {
            return Err(TransferError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        self.balances.insert(trader, available - amount);
        Ok(())
    }

    // Credit tokens back to the wallet.
    pub fn push(&mut self, trader: TraderId, amount: TokenAmount) {
        self.credit(trader, amount);
    }

    pub fn total_held(&self) -> TokenAmount {
        self.balances.values().fold(0, |acc, b| acc.saturating_add(*b))
    }
}
