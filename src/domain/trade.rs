//! Trade commands produced by the allocator.

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Sell,
    Buy,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Sell => write!(f, "sell"),
            Side::Buy => write!(f, "buy"),
        }
    }
}

/// A single rebalance trade. Quantity is always positive; the direction
/// lives in `side`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub ticker: String,
    pub side: Side,
    pub quantity: i64,
}

impl Trade {
    pub fn sell(ticker: &str, quantity: i64) -> Self {
        Trade {
            ticker: ticker.to_string(),
            side: Side::Sell,
            quantity,
        }
    }

    pub fn buy(ticker: &str, quantity: i64) -> Self {
        Trade {
            ticker: ticker.to_string(),
            side: Side::Buy,
            quantity,
        }
    }

    /// Render as an output command line, e.g. `!buy BHP 10`.
    pub fn command(&self) -> String {
        format!("!{} {} {}", self.side, self.ticker, self.quantity)
    }
}
