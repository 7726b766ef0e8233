//! Portfolio state: cash plus per-ticker share holdings.

use std::collections::HashMap;

use super::error::RebalanceError;

/// A snapshot of cash and holdings.
///
/// Holdings never store explicit zero entries; absence of a ticker means a
/// quantity of zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Portfolio {
    pub cash: f64,
    pub holdings: HashMap<String, i64>,
}

impl Portfolio {
    pub fn new(cash: f64) -> Self {
        Portfolio {
            cash,
            holdings: HashMap::new(),
        }
    }

    /// Shares held for `ticker`; zero when absent.
    pub fn quantity(&self, ticker: &str) -> i64 {
        self.holdings.get(ticker).copied().unwrap_or(0)
    }

    /// Set the held quantity, removing the entry when it reaches zero.
    pub fn set_quantity(&mut self, ticker: &str, quantity: i64) {
        if quantity == 0 {
            self.holdings.remove(ticker);
        } else {
            self.holdings.insert(ticker.to_string(), quantity);
        }
    }

    pub fn has_holding(&self, ticker: &str) -> bool {
        self.holdings.contains_key(ticker)
    }

    pub fn holding_count(&self) -> usize {
        self.holdings.len()
    }

    /// Cash plus the market value of every holding that has a price.
    /// Holdings without a price contribute nothing.
    pub fn total_value(&self, prices: &HashMap<String, f64>) -> f64 {
        let holdings_value: f64 = self
            .holdings
            .iter()
            .filter_map(|(ticker, &quantity)| {
                prices.get(ticker).map(|&price| quantity as f64 * price)
            })
            .sum();
        self.cash + holdings_value
    }

    /// Check the at-rest invariants: cash is non-negative and every stored
    /// quantity is strictly positive.
    pub fn validate(&self) -> Result<(), RebalanceError> {
        if self.cash < 0.0 {
            return Err(RebalanceError::InvalidInput {
                reason: format!("negative cash: {}", self.cash),
            });
        }
        for (ticker, &quantity) in &self.holdings {
            if quantity <= 0 {
                return Err(RebalanceError::InvalidInput {
                    reason: format!("non-positive quantity for {ticker}: {quantity}"),
                });
            }
        }
        Ok(())
    }
}
