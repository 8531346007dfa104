// 3.0 position.rs: one leveraged position per trader, plus the ledger that
// exclusively owns the records.
//
// A record exists only while the position is economically live: size is
// positive from creation until the record is deleted by a full decrease or a
// liquidation. Presence is the HashMap key, never a zero size. Collateral may
// legitimately reach zero when borrowing fees consume it faster than the
// trader tops up; only the liquidation eligibility check acts on that.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{Side, Timestamp, TokenAmount, TraderId, Usd};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub trader: TraderId,
    pub side: Side,
    // Index-asset exposure in native units.
    pub size: TokenAmount,
    // Escrowed margin in collateral native units.
    pub collateral: TokenAmount,
    // Volume-weighted entry price, 30-decimal USD.
    pub average_price: Usd,
    pub opened_at: Timestamp,
    // Borrowing fees are settled up to this instant.
    pub last_updated: Timestamp,
}

impl Position {
    pub fn new(
        trader: TraderId,
        side: Side,
        size: TokenAmount,
        collateral: TokenAmount,
        average_price: Usd,
        now: Timestamp,
    ) -> Self {
        Self {
            trader,
            side,
            size,
            collateral,
            average_price,
            opened_at: now,
            last_updated: now,
        }
    }

    pub fn is_long(&self) -> bool {
        self.side == Side::Long
    }
}

// 3.1: the ledger. At most one position per trader; an insert for an existing
// trader replaces the record (the engine stages a copy, mutates it, and
// commits it back through here).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionLedger {
    positions: HashMap<TraderId, Position>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, trader: TraderId) -> Option<&Position> {
        self.positions.get(&trader)
    }

    pub fn contains(&self, trader: TraderId) -> bool {
        self.positions.contains_key(&trader)
    }

    pub fn insert(&mut self, position: Position) {
        self.positions.insert(position.trader, position);
    }

    pub fn remove(&mut self, trader: TraderId) -> Option<Position> {
        self.positions.remove(&trader)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TraderId, &Position)> {
        self.positions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(trader: u64) -> Position {
        Position::new(
            TraderId(trader),
            Side::Long,
            1_00000000,
            1_000_000000,
            50_000 * crate::types::USD_PRECISION,
            Timestamp::from_secs(0),
        )
    }

    #[test]
    fn ledger_round_trip() {
        let mut ledger = PositionLedger::new();
        assert!(ledger.is_empty());
        assert!(!ledger.contains(TraderId(1)));

        ledger.insert(sample(1));
        assert!(ledger.contains(TraderId(1)));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(TraderId(1)).unwrap().size, 1_00000000);

        let removed = ledger.remove(TraderId(1)).unwrap();
        assert_eq!(removed.trader, TraderId(1));
        assert!(ledger.is_empty());
        assert!(ledger.get(TraderId(1)).is_none());
    }

    #[test]
    fn insert_replaces_existing_record() {
        let mut ledger = PositionLedger::new();
        ledger.insert(sample(7));

        let mut updated = sample(7);
        updated.size = 2_00000000;
        ledger.insert(updated);

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(TraderId(7)).unwrap().size, 2_00000000);
    }

    #[test]
    fn traders_do_not_collide() {
        let mut ledger = PositionLedger::new();
        ledger.insert(sample(1));
        ledger.insert(sample(2));

        assert_eq!(ledger.len(), 2);
        assert!(ledger.remove(TraderId(1)).is_some());
        assert!(ledger.contains(TraderId(2)));
    }
}
