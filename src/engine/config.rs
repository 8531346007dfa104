//! Engine configuration options.

use crate::config::MarketParams;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// The single market this engine runs.
    pub market: MarketParams,
    /// Maximum number of events to retain in memory.
    pub max_events: usize,
    /// Enable verbose event logging.
    pub verbose: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            market: MarketParams::btc_usdc(),
            max_events: 100_000,
            verbose: false,
        }
    }
}
