// 6.0 config.rs: all settings in one place. token layouts, risk bounds,
// accrual schedule, env presets.

use serde::{Deserialize, Serialize};

use crate::pricing::TokenParams;
use crate::types::{Token, USD_DECIMALS};

// Seconds over which the borrowing fee equals the full entry notional.
// 10 years of seconds, so one 365-day year costs 10% of notional.
pub const BORROWING_RATE_SECONDS: u64 = 315_360_000;

/** 6.1: one market: a single index asset priced against a single collateral
asset, plus every bound the lifecycle controller enforces. */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketParams {
    // Human readable pair name (e.g. "BTC-USDC")
    pub symbol: String,
    // The asset traders take exposure to
    pub index: TokenParams,
    // The asset margin is posted in and the pool holds
    pub collateral: TokenParams,
    // Hard leverage cap, integer multiple (15 = 15x)
    pub max_leverage: u32,
    // Reservation gate: open interest may use at most this share of net assets
    pub max_utilization_bps: u64,
    // Borrowing fee schedule, see BORROWING_RATE_SECONDS
    pub borrowing_rate_seconds: u64,
    // Share of post-loss collateral paid to the liquidation caller
    pub liquidator_reward_bps: u64,
}

impl MarketParams {
    // BTC exposure margined in USDC, both on 8-decimal feeds.
    pub fn btc_usdc() -> Self {
        Self {
            symbol: "BTC-USDC".to_string(),
            index: TokenParams::new("BTC", 8, 8),
            collateral: TokenParams::new("USDC", 6, 8),
            max_leverage: 15,
            max_utilization_bps: 7_500, // 75%
            borrowing_rate_seconds: BORROWING_RATE_SECONDS,
            liquidator_reward_bps: 500, // 5%
        }
    }

    // Tighter bounds for cautious deployments.
    pub fn conservative() -> Self {
        let mut params = Self::btc_usdc();
        params.max_leverage = 10;
        params.max_utilization_bps = 5_000; // 50%
        params.liquidator_reward_bps = 300; // 3%
        params
    }

    pub fn token_params(&self, token: Token) -> &TokenParams {
        match token {
            Token::Index => &self.index,
            Token::Collateral => &self.collateral,
        }
    }

    // Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        for token in [&self.index, &self.collateral] {
            if token.decimals > USD_DECIMALS {
                return Err(ConfigError::InvalidToken {
                    reason: format!("{}: decimals must be <= 30", token.symbol),
                });
            }
            if token.feed_decimals > USD_DECIMALS {
                return Err(ConfigError::InvalidToken {
                    reason: format!("{}: feed decimals must be <= 30", token.symbol),
                });
            }
        }

        if self.max_leverage == 0 {
            return Err(ConfigError::InvalidRisk {
                reason: "max leverage must be at least 1x".to_string(),
            });
        }

        if self.max_utilization_bps == 0 || self.max_utilization_bps > 10_000 {
            return Err(ConfigError::InvalidRisk {
                reason: "max utilization must be within (0, 100%]".to_string(),
            });
        }

        if self.liquidator_reward_bps > 10_000 {
            return Err(ConfigError::InvalidRisk {
                reason: "liquidator reward cannot exceed 100%".to_string(),
            });
        }

        if self.borrowing_rate_seconds == 0 {
            return Err(ConfigError::InvalidRisk {
                reason: "borrowing rate window must be positive".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for MarketParams {
    fn default() -> Self {
        Self::btc_usdc()
    }
}

// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidToken { reason: String },
    InvalidRisk { reason: String },
}

// Environment presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Testnet,
    Mainnet,
}

impl Environment {
    pub fn params(&self) -> MarketParams {
        match self {
            Environment::Development => MarketParams::btc_usdc(),
            Environment::Testnet => MarketParams::btc_usdc(),
            Environment::Mainnet => MarketParams::conservative(),
        }
    }
}
