// 9.0: every state change produces an event. used for audit trails and state
// reconstruction. the EventPayload enum lists all event types; fee settlement
// rides on the payload of the operation that triggered it rather than
// emitting separately.

use serde::{Deserialize, Serialize};

use crate::types::{Side, SignedTokenAmount, Timestamp, TokenAmount, TraderId, Usd};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // Wallet events
    WalletFunded(WalletFundedEvent),

    // Position events
    PositionOpened(PositionOpenedEvent),
    PositionIncreased(PositionIncreasedEvent),
    PositionDecreased(PositionDecreasedEvent),
    PositionClosed(PositionClosedEvent),
    PositionLiquidated(PositionLiquidatedEvent),

    // Pool events
    LiquidityAdded(LiquidityAddedEvent),
    LiquidityRemoved(LiquidityRemovedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletFundedEvent {
    pub trader: TraderId,
    pub amount: TokenAmount,
    pub new_balance: TokenAmount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionOpenedEvent {
    pub trader: TraderId,
    pub side: Side,
    pub size: TokenAmount,
    pub collateral: TokenAmount,
    pub entry_price: Usd,
    // open interest added, collateral units at the entry snapshot
    pub reserved: TokenAmount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionIncreasedEvent {
    pub trader: TraderId,
    pub size_delta: TokenAmount,
    pub collateral_delta: TokenAmount,
    pub fee_paid: TokenAmount,
    pub new_size: TokenAmount,
    pub new_collateral: TokenAmount,
    pub average_price: Usd,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionDecreasedEvent {
    pub trader: TraderId,
    pub size_delta: TokenAmount,
    pub collateral_delta: TokenAmount,
    pub fee_paid: TokenAmount,
    pub realized_pnl: SignedTokenAmount,
    pub returned: TokenAmount,
    pub new_size: TokenAmount,
    pub new_collateral: TokenAmount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionClosedEvent {
    pub trader: TraderId,
    pub fee_paid: TokenAmount,
    pub realized_pnl: SignedTokenAmount,
    pub returned: TokenAmount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionLiquidatedEvent {
    pub trader: TraderId,
    pub liquidator: TraderId,
    pub size: TokenAmount,
    pub fee_paid: TokenAmount,
    // realized loss kept by the pool, capped at post-fee collateral
    pub absorbed_loss: TokenAmount,
    pub reward: TokenAmount,
    pub returned: TokenAmount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityAddedEvent {
    pub provider: TraderId,
    pub amount: TokenAmount,
    pub shares_minted: u128,
    pub pool_balance: TokenAmount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityRemovedEvent {
    pub provider: TraderId,
    pub shares_burned: u128,
    pub amount: TokenAmount,
    pub pool_balance: TokenAmount,
}
