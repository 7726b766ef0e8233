//! Equal-value allocation.
//!
//! Computes the trades that move a portfolio to an equal split of total
//! value across every priced ticker. Whole shares only: ideal quantities
//! are floored, then leftover cash is handed out by a single
//! largest-remainder pass.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::error::RebalanceError;
use super::trade::Trade;

/// Tolerance for cash comparisons, absorbs floating round-off.
pub const EPSILON: f64 = 1e-8;

/// Per-ticker working state for one allocation run.
struct Slot<'a> {
    ticker: &'a str,
    price: f64,
    held: i64,
    shares: i64,
    remainder: f64,
}

/// Compute the ordered trade list that rebalances `(cash, holdings)` to an
/// equal value per ticker in `prices`.
///
/// The universe is exactly the tickers of `prices`; holdings without a
/// price are left untouched. Output lists every sell before every buy,
/// each group sorted by ticker ascending, so that applying the list in
/// order frees cash before buys are attempted.
pub fn allocate(
    cash: f64,
    holdings: &HashMap<String, i64>,
    prices: &HashMap<String, f64>,
) -> Result<Vec<Trade>, RebalanceError> {
    if prices.is_empty() {
        return Err(RebalanceError::EmptyMarket);
    }
    validate_inputs(cash, holdings, prices)?;

    // Fixed universe order makes the run deterministic and fixes the
    // remainder tie-break downstream.
    let mut tickers: Vec<&str> = prices.keys().map(String::as_str).collect();
    tickers.sort_unstable();

    let held = |ticker: &str| holdings.get(ticker).copied().unwrap_or(0);

    let holdings_value: f64 = tickers
        .iter()
        .map(|&t| held(t) as f64 * prices[t])
        .sum();
    let total_value = cash + holdings_value;
    let target_value = total_value / tickers.len() as f64;

    // Floor the ideal share count per ticker, tracking the fractional part.
    let mut slots: Vec<Slot<'_>> = Vec::with_capacity(tickers.len());
    let mut spent_floor = 0.0;
    for &ticker in &tickers {
        let price = prices[ticker];
        let ideal = target_value / price;
        let floor = ideal.floor() as i64;
        spent_floor += floor as f64 * price;
        slots.push(Slot {
            ticker,
            price,
            held: held(ticker),
            shares: floor,
            remainder: ideal - floor as f64,
        });
    }

    let leftover = total_value - spent_floor;
    distribute_leftover(&mut slots, leftover);

    // Diff against current holdings. `slots` is ticker-ascending, so each
    // group comes out sorted without a second sort.
    let mut sells = Vec::new();
    let mut buys = Vec::new();
    for slot in &slots {
        let diff = slot.shares - slot.held;
        match diff.cmp(&0) {
            Ordering::Less => sells.push(Trade::sell(slot.ticker, -diff)),
            Ordering::Greater => buys.push(Trade::buy(slot.ticker, diff)),
            Ordering::Equal => {}
        }
    }

    let mut trades = sells;
    trades.append(&mut buys);
    Ok(trades)
}

fn validate_inputs(
    cash: f64,
    holdings: &HashMap<String, i64>,
    prices: &HashMap<String, f64>,
) -> Result<(), RebalanceError> {
    if cash < 0.0 {
        return Err(RebalanceError::InvalidInput {
            reason: format!("negative cash: {cash}"),
        });
    }
    for (ticker, &quantity) in holdings {
        if quantity < 0 {
            return Err(RebalanceError::InvalidInput {
                reason: format!("negative holding for {ticker}: {quantity}"),
            });
        }
    }
    for (ticker, &price) in prices {
        if price <= 0.0 {
            return Err(RebalanceError::InvalidInput {
                reason: format!("non-positive price for {ticker}: {price}"),
            });
        }
    }
    Ok(())
}

/// Single greedy largest-remainder pass.
///
/// Ranks tickers by fractional remainder descending, ties broken by ticker
/// ascending, and grants one extra share to each ticker whose price still
/// fits in the leftover. One pass only; a ticker never gains more than one
/// extra share even if cash remains afterwards.
fn distribute_leftover(slots: &mut [Slot<'_>], mut leftover: f64) {
    let mut order: Vec<usize> = (0..slots.len()).collect();
    order.sort_by(|&a, &b| {
        slots[b]
            .remainder
            .partial_cmp(&slots[a].remainder)
            .unwrap_or(Ordering::Equal)
            .then_with(|| slots[a].ticker.cmp(slots[b].ticker))
    });

    for i in order {
        if slots[i].price <= leftover + EPSILON {
            slots[i].shares += 1;
            leftover -= slots[i].price;
        }
    }
}
