// pool-perps: pool-backed leveraged trading core.
// Solvency-first accounting: collateral escrow and the liquidity reservation
// gate are checked before anything pays out. All computation is deterministic
// integer fixed-point with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: ids, sides, timestamps, fixed-point amount aliases
//   2.x  pricing.rs: 30-decimal USD conversion and U256-widened mul/div
//   3.x  position.rs: position record + the one-per-trader ledger
//   4.x  accrual.rs: borrowing fees, weighted entry price, PnL, leverage bound
//   5.x  pool.rs: pool aggregates + the liquidity reservation gate
//   6.x  config.rs: market parameters, validation, environment presets
//   7.x  engine/: lifecycle controller: open/increase/decrease/liquidate, LP flows
//   8.x  integration seams: 8.0 oracle.rs, 8.1 vault.rs, 8.2 custody.rs
//   9.x  events.rs: state transition events for audit

// core accounting modules
pub mod accrual;
pub mod engine;
pub mod events;
pub mod pool;
pub mod position;
pub mod pricing;
pub mod types;

// integration modules
pub mod config;
pub mod custody;
pub mod oracle;
pub mod vault;

// re exports for convenience
pub use accrual::*;
pub use engine::*;
pub use events::*;
pub use pool::*;
pub use position::*;
pub use pricing::*;
pub use types::*;

pub use config::{ConfigError, Environment, MarketParams, BORROWING_RATE_SECONDS};
pub use custody::{CollateralBank, TransferError};
pub use oracle::{PriceOracle, PriceSnapshot, QuoteBoard};
pub use vault::{SharePool, VaultError};
