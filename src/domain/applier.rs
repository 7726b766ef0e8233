//! Applies an ordered trade list to a portfolio snapshot.

use std::collections::HashMap;

use super::allocator::EPSILON;
use super::error::RebalanceError;
use super::portfolio::Portfolio;
use super::trade::{Side, Trade};

/// Apply `trades` to `portfolio` strictly in the order given.
///
/// Trade lists from the allocator put every sell before every buy, so the
/// cash freed by selling is available when buys are checked. Application is
/// not transactional across the batch: a failure leaves the portfolio in
/// the partially-applied state reached so far. Failures only arise when the
/// portfolio or prices changed between allocation and application.
pub fn apply_trades(
    portfolio: &mut Portfolio,
    prices: &HashMap<String, f64>,
    trades: &[Trade],
) -> Result<(), RebalanceError> {
    for trade in trades {
        let price = *prices
            .get(&trade.ticker)
            .ok_or_else(|| RebalanceError::InvalidInput {
                reason: format!("no price for traded ticker {}", trade.ticker),
            })?;

        match trade.side {
            Side::Sell => {
                let held = portfolio.quantity(&trade.ticker);
                if held < trade.quantity {
                    return Err(RebalanceError::InsufficientShares {
                        ticker: trade.ticker.clone(),
                        have: held,
                        need: trade.quantity,
                    });
                }
                portfolio.cash += trade.quantity as f64 * price;
                portfolio.set_quantity(&trade.ticker, held - trade.quantity);
            }
            Side::Buy => {
                let cost = trade.quantity as f64 * price;
                if cost > portfolio.cash + EPSILON {
                    return Err(RebalanceError::InsufficientCash {
                        ticker: trade.ticker.clone(),
                        need: cost,
                        have: portfolio.cash,
                    });
                }
                // An epsilon-admitted buy may leave round-off below zero.
                portfolio.cash = (portfolio.cash - cost).max(0.0);
                let held = portfolio.quantity(&trade.ticker);
                portfolio.set_quantity(&trade.ticker, held + trade.quantity);
            }
        }
    }
    Ok(())
}
