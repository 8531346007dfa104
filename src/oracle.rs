// 8.0 oracle.rs: price acquisition boundary (mocked). The engine only ever sees
// the latest signed answer per token; scaling to 30-decimal USD happens in
// pricing. Real deployments put an aggregator behind this trait.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{Token, Usd};

pub trait PriceOracle {
    // Latest feed answer for the token, in the feed's own decimals.
    // None when no quote has ever been posted.
    fn latest_answer(&self, token: Token) -> Option<i128>;
}

// One pair of scaled prices, fetched once at the top of every mutation and
// passed explicitly from there on. No operation reads the oracle twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub index_price: Usd,
    pub collateral_price: Usd,
}

// In-memory quote store for tests and simulation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteBoard {
    quotes: HashMap<Token, i128>,
}

impl QuoteBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, token: Token, answer: i128) {
        self.quotes.insert(token, answer);
    }

    // simulate a dead feed
    pub fn clear(&mut self, token: Token) {
        self.quotes.remove(&token);
    }
}

impl PriceOracle for QuoteBoard {
    fn latest_answer(&self, token: Token) -> Option<i128> {
        self.quotes.get(&token).copied()
    }
}
