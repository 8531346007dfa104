// 7.1: the engine owns every piece of state. one market, one collateral
// asset, serial mutations through &mut self.

use super::config::EngineConfig;
use super::results::EngineError;
use crate::config::MarketParams;
use crate::custody::CollateralBank;
use crate::events::{Event, EventId, EventPayload, WalletFundedEvent};
use crate::oracle::{PriceOracle, QuoteBoard};
use crate::pool::PoolState;
use crate::position::{Position, PositionLedger};
use crate::types::{Timestamp, Token, TokenAmount, TraderId};
use crate::vault::SharePool;

/** 7.2: all state lives here. &mut self is the lock: callers serialize
mutations, so every operation observes a consistent snapshot and commits
atomically before the next one runs. */
#[derive(Debug)]
pub struct Engine<O: PriceOracle = QuoteBoard> {
    pub(super) config: EngineConfig,
    pub(super) oracle: O,
    pub(super) ledger: PositionLedger,
    pub(super) pool: PoolState,
    pub(super) vault: SharePool,
    pub(super) bank: CollateralBank,
    pub(super) events: Vec<Event>,
    pub(super) next_event_id: u64,
    pub(super) current_time: Timestamp,
}

impl Engine<QuoteBoard> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_oracle(config, QuoteBoard::new())
    }

    /// Post a feed answer for a token, in that token's feed decimals.
    pub fn post_quote(&mut self, token: Token, answer: i128) {
        self.oracle.post(token, answer);
    }
}

impl<O: PriceOracle> Engine<O> {
    pub fn with_oracle(config: EngineConfig, oracle: O) -> Self {
        Self {
            config,
            oracle,
            ledger: PositionLedger::new(),
            pool: PoolState::new(),
            vault: SharePool::new(),
            bank: CollateralBank::new(),
            events: Vec::new(),
            next_event_id: 1,
            current_time: Timestamp::from_secs(0),
        }
    }

    // --- clock ---

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn advance_time(&mut self, secs: i64) {
        self.current_time = Timestamp::from_secs(self.current_time.as_secs() + secs);
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    // --- wallets ---

    /// Credit collateral tokens to a trader's wallet. Simulation faucet, so
    /// it cannot fail.
    pub fn fund_trader(&mut self, trader: TraderId, amount: TokenAmount) {
        self.bank.credit(trader, amount);
        let new_balance = self.bank.balance_of(trader);
        self.emit_event(EventPayload::WalletFunded(WalletFundedEvent {
            trader,
            amount,
            new_balance,
        }));
    }

    pub fn wallet_balance(&self, trader: TraderId) -> TokenAmount {
        self.bank.balance_of(trader)
    }

    // --- read access ---

    pub fn position(&self, trader: TraderId) -> Option<&Position> {
        self.ledger.get(trader)
    }

    pub fn open_positions(&self) -> usize {
        self.ledger.len()
    }

    pub fn pool(&self) -> &PoolState {
        &self.pool
    }

    pub fn market(&self) -> &MarketParams {
        &self.config.market
    }

    pub fn utilization_bps(&self) -> u128 {
        self.pool.utilization_bps()
    }

    pub fn reserved_liquidity(&self) -> TokenAmount {
        self.pool.reserved_liquidity()
    }

    /// Most liquidity open interest may reserve at current net assets.
    pub fn max_utilization(&self) -> Result<TokenAmount, EngineError> {
        Ok(self.pool.max_reserved(self.config.market.max_utilization_bps)?)
    }

    pub fn lp_shares(&self, provider: TraderId) -> u128 {
        self.vault.shares_of(provider)
    }

    pub fn total_lp_shares(&self) -> u128 {
        self.vault.total_shares()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    // --- event journal ---

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;

        if self.config.verbose {
            println!("[Event {}] {:?}", event.id.0, event.payload);
        }

        self.events.push(event);

        // Keep event count bounded
        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }
}
