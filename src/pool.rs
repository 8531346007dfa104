// 5.0 pool.rs: the shared pool's running aggregates and the liquidity
// reservation gate.
//
// All four counters are collateral native units. `balance` is every token the
// pool physically holds; `total_collateral` is the slice escrowed for traders,
// so `net_assets` is what actually belongs to LPs. Open interest is recorded
// at the prices prevailing when each position changed, which is why removal
// saturates instead of underflowing: converted sizes drift with prices.

use serde::{Deserialize, Serialize};

use crate::pricing::{mul_div, MathError};
use crate::types::{Side, TokenAmount, BPS_DIVISOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity {
        requested: TokenAmount,
        available: TokenAmount,
    },
    #[error("pool arithmetic overflow: {0}")]
    Math(#[from] MathError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub open_interest_long: TokenAmount,
    pub open_interest_short: TokenAmount,
    // Escrowed trader margin. Lives inside `balance`.
    pub total_collateral: TokenAmount,
    // Everything the pool holds: LP deposits, escrowed margin, retained fees.
    pub balance: TokenAmount,
}

impl PoolState {
    pub fn new() -> Self {
        Self::default()
    }

    // What LPs own: pool holdings minus escrowed trader margin.
    pub fn net_assets(&self) -> TokenAmount {
        self.balance.saturating_sub(self.total_collateral)
    }

    // Liquidity spoken for by open positions, both sides combined.
    pub fn reserved_liquidity(&self) -> TokenAmount {
        self.open_interest_long
            .saturating_add(self.open_interest_short)
    }

    pub fn max_reserved(&self, max_utilization_bps: u64) -> Result<TokenAmount, MathError> {
        mul_div(self.net_assets(), max_utilization_bps as u128, BPS_DIVISOR)
    }

    // 5.1: the reservation gate. Evaluated strictly after a candidate mutation
    // has been applied to a staged copy; a failure discards the whole staging.
    pub fn check_reservation(&self, max_utilization_bps: u64) -> Result<(), PoolError> {
        let requested = self.reserved_liquidity();
        let available = self.max_reserved(max_utilization_bps)?;
        if requested > available {
            return Err(PoolError::InsufficientLiquidity {
                requested,
                available,
            });
        }
        Ok(())
    }

    pub fn utilization_bps(&self) -> u128 {
        let net = self.net_assets();
        if net == 0 {
            return 0;
        }
        mul_div(self.reserved_liquidity(), BPS_DIVISOR, net).unwrap_or(u128::MAX)
    }

    pub fn add_open_interest(&mut self, side: Side, amount: TokenAmount) -> Result<(), MathError> {
        let oi = self.open_interest_mut(side);
        *oi = oi.checked_add(amount).ok_or(MathError::Overflow)?;
        Ok(())
    }

    pub fn remove_open_interest(&mut self, side: Side, amount: TokenAmount) {
        let oi = self.open_interest_mut(side);
        *oi = oi.saturating_sub(amount);
    }

    // LP deposits enter here: pool grows, nothing is escrowed.
    pub fn add_assets(&mut self, amount: TokenAmount) -> Result<(), MathError> {
        self.balance = self.balance.checked_add(amount).ok_or(MathError::Overflow)?;
        Ok(())
    }

    // Trader margin enters escrow: balance and total_collateral rise together,
    // net assets are untouched.
    pub fn escrow_collateral(&mut self, amount: TokenAmount) -> Result<(), MathError> {
        self.balance = self.balance.checked_add(amount).ok_or(MathError::Overflow)?;
        self.total_collateral = self
            .total_collateral
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        Ok(())
    }

    // Escrowed margin goes back to a trader.
    pub fn release_collateral(&mut self, amount: TokenAmount) -> Result<(), MathError> {
        self.total_collateral = self
            .total_collateral
            .checked_sub(amount)
            .ok_or(MathError::Overflow)?;
        self.balance = self.balance.checked_sub(amount).ok_or(MathError::Overflow)?;
        Ok(())
    }

    // Fees and realized losses: the tokens stay in the pool but stop being
    // escrow, so they accrue to LPs.
    pub fn absorb_collateral(&mut self, amount: TokenAmount) -> Result<(), MathError> {
        self.total_collateral = self
            .total_collateral
            .checked_sub(amount)
            .ok_or(MathError::Overflow)?;
        Ok(())
    }

    // Trader profit and LP withdrawals leave from net assets. The pool cannot
    // pay out what LPs do not own.
    pub fn pay_out(&mut self, amount: TokenAmount) -> Result<(), PoolError> {
        let available = self.net_assets();
        if amount > available {
            return Err(PoolError::InsufficientLiquidity {
                requested: amount,
                available,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    fn open_interest_mut(&mut self, side: Side) -> &mut TokenAmount {
        match side {
            Side::Long => &mut self.open_interest_long,
            Side::Short => &mut self.open_interest_short,
        }
    }
}
