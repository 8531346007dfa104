// 7.0: position lifecycle controller. coordinates price snapshots, fee
// accrual, position mutations, the leverage bound, the reservation gate, and
// LP entry/exit. every mutation is staged-copy commit: all effects or none.

mod config;
mod core;
mod liquidations;
mod liquidity;
mod positions;
mod pricing;
mod results;

pub use config::EngineConfig;
pub use core::Engine;
pub use results::{
    DecreaseResult, EngineError, IncreaseResult, LiquidationResult, OpenResult, PositionView,
};
