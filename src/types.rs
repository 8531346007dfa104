// 1.0: all the primitives live here. nothing in the engine works without these types.
// IDs, sides, token identity, timestamps, and the fixed-point aliases.
//
// Amounts are plain u128/i128 aliases rather than newtypes: the conversion math
// chains multiplications and divisions constantly and wrapper types would bury it.
// Identifiers stay newtyped so the compiler catches trader/token mixups.

use serde::{Deserialize, Serialize};
use std::fmt;

// USD values carry 30 decimals. A price of $50,000 is 50_000 * 10^30.
pub const USD_DECIMALS: u32 = 30;
pub const USD_PRECISION: u128 = 1_000_000_000_000_000_000_000_000_000_000;

// 100 bps = 1%.
pub const BPS_DIVISOR: u128 = 10_000;

// 1.1: fixed-point aliases. Usd is 30-decimal; token amounts are native units.
pub type Usd = u128;
pub type TokenAmount = u128;
pub type SignedTokenAmount = i128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TraderId(pub u64);

impl fmt::Display for TraderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trader-{}", self.0)
    }
}

// Long = profit when the index price goes up. Short = profit when it goes down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

// 1.2: the two assets the engine knows about. Index is what traders take
// exposure to; Collateral is what they post margin in and the pool holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    Index,
    Collateral,
}

// 1.3: second-resolution timestamp. Borrowing accrual is seconds-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp())
    }

    pub fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> i64 {
        self.0
    }

    // saturates at zero when `later` is behind self
    pub fn elapsed_seconds(&self, later: Timestamp) -> u64 {
        (later.0 - self.0).max(0) as u64
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_opposite() {
        assert_eq!(Side::Long.opposite(), Side::Short);
        assert_eq!(Side::Short.opposite(), Side::Long);
    }

    #[test]
    fn usd_precision_is_thirty_decimals() {
        assert_eq!(USD_PRECISION, 10u128.pow(USD_DECIMALS));
    }

    #[test]
    fn elapsed_seconds_saturates() {
        let earlier = Timestamp::from_secs(100);
        let later = Timestamp::from_secs(350);

        assert_eq!(earlier.elapsed_seconds(later), 250);
        assert_eq!(later.elapsed_seconds(earlier), 0);
    }
}
