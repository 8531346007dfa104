// 7.5: operation results and the engine error type.

use crate::custody::TransferError;
use crate::pool::PoolError;
use crate::pricing::MathError;
use crate::types::{Side, SignedTokenAmount, Token, TokenAmount, TraderId, Usd};
use crate::vault::VaultError;

/// Outcome of opening a position.
#[derive(Debug, Clone)]
pub struct OpenResult {
    /// Index price the entry was marked at.
    pub entry_price: Usd,
    /// Collateral-token value reserved against the pool.
    pub reserved: TokenAmount,
}

/// Outcome of growing a position.
#[derive(Debug, Clone)]
pub struct IncreaseResult {
    /// Borrowing fee settled before the change, in collateral tokens.
    pub fee_paid: TokenAmount,
    pub new_size: TokenAmount,
    pub new_collateral: TokenAmount,
    /// Weighted average entry after the fill.
    pub average_price: Usd,
}

/// Outcome of shrinking or closing a position.
#[derive(Debug, Clone)]
pub struct DecreaseResult {
    pub fee_paid: TokenAmount,
    /// PnL realized on the size reduction, in collateral tokens.
    pub realized_pnl: SignedTokenAmount,
    /// Total collateral tokens returned to the trader's wallet.
    pub returned: TokenAmount,
    /// True when the decrease took size to zero.
    pub closed: bool,
}

/// Outcome of a forced close.
#[derive(Debug, Clone)]
pub struct LiquidationResult {
    pub trader: TraderId,
    pub size: TokenAmount,
    pub fee_paid: TokenAmount,
    /// Trading loss taken out of collateral and left with the pool.
    pub absorbed_loss: TokenAmount,
    /// Collateral paid to the caller.
    pub reward: TokenAmount,
    /// Residual collateral returned to the position owner.
    pub returned: TokenAmount,
}

/// Read-only valuation of a live position at the current price snapshot.
#[derive(Debug, Clone)]
pub struct PositionView {
    pub side: Side,
    pub size: TokenAmount,
    pub collateral: TokenAmount,
    pub average_price: Usd,
    /// Borrowing fee accrued but not yet settled, in collateral tokens.
    pub pending_fee: TokenAmount,
    pub pnl: SignedTokenAmount,
    /// Collateral adjusted for PnL and the pending fee.
    pub remaining_collateral: SignedTokenAmount,
    /// None when remaining collateral is exhausted.
    pub leverage_bps: Option<u128>,
}

/// Errors from engine operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("position size must be positive")]
    InsufficientSize,

    #[error("insufficient position collateral")]
    InsufficientCollateral,

    #[error("{0} already has an open position")]
    TraderHasOpenPosition(TraderId),

    #[error("{0} has no open position")]
    PositionDoesNotExist(TraderId),

    #[error("increase must change size or collateral")]
    NoIncrease,

    #[error("decrease must change size or collateral")]
    NoDecrease,

    #[error("max leverage exceeded: notional {notional}, remaining collateral {remaining}")]
    MaxLeverageExceeded {
        notional: TokenAmount,
        remaining: SignedTokenAmount,
    },

    #[error("{0} is within the leverage bound")]
    PositionNotLiquidatable(TraderId),

    #[error("traders cannot liquidate their own position")]
    SelfLiquidationProhibited,

    #[error("stale or invalid price for {token:?}: answer {answer}")]
    StaleOrInvalidPrice { token: Token, answer: i128 },

    #[error("pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("vault error: {0}")]
    Vault(#[from] VaultError),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("math error: {0}")]
    Math(#[from] MathError),
}
