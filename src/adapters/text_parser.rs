//! Parsers for the human-readable portfolio and market text formats.
//!
//! Portfolio files carry a cash section and a stocks-owned section:
//!
//! ```text
//! 💰 Cash
//! €1,234.56
//! 📈 Stocks Owned
//! Acme Corp (ACME): 12 shares
//! ```
//!
//! Market files carry name/price line pairs:
//!
//! ```text
//! Market Day 3 Summary
//! Closing Prices
//! Acme Corp (ACME)
//! €101.50
//! ```
//!
//! Lines that do not match either shape are noise and are skipped, so the
//! surrounding prose in these files never has to be kept in sync.

use std::collections::HashMap;

use crate::domain::error::RebalanceError;
use crate::domain::portfolio::Portfolio;

const CASH_HEADER: &str = "💰 Cash";
const STOCKS_HEADER: &str = "📈 Stocks Owned";

/// Parse a portfolio text file into cash and holdings.
///
/// A missing cash section means zero cash. Holding lines with a quantity of
/// zero are dropped (absence means zero). `currency` is the amount prefix
/// to tolerate, e.g. `€`; a bare number parses the same.
pub fn parse_portfolio(text: &str, currency: &str) -> Result<Portfolio, RebalanceError> {
    let lines = content_lines(text);

    let mut cash = 0.0;
    for (i, line) in lines.iter().enumerate() {
        if line.starts_with(CASH_HEADER) {
            let raw = lines
                .get(i + 1)
                .ok_or_else(|| RebalanceError::PortfolioParse {
                    reason: "cash header with no amount line".to_string(),
                })?;
            cash = parse_amount(raw, currency).ok_or_else(|| RebalanceError::PortfolioParse {
                reason: format!("unparseable cash amount: {raw}"),
            })?;
            if cash < 0.0 {
                return Err(RebalanceError::PortfolioParse {
                    reason: format!("negative cash amount: {raw}"),
                });
            }
            break;
        }
    }

    let mut portfolio = Portfolio::new(cash);
    if let Some(start) = lines.iter().position(|l| l.starts_with(STOCKS_HEADER)) {
        for line in &lines[start + 1..] {
            if let Some((ticker, quantity)) = parse_holding_line(line) {
                portfolio.set_quantity(&ticker, quantity);
            }
        }
    }

    Ok(portfolio)
}

/// Parse a market summary text file into a ticker→price table.
///
/// A ticker line (`Anything (TICKER)`) followed by a price line forms one
/// entry; a duplicate ticker keeps the last price seen. Matched prices must
/// be strictly positive.
pub fn parse_market(text: &str, currency: &str) -> Result<HashMap<String, f64>, RebalanceError> {
    let lines = content_lines(text);

    let mut prices = HashMap::new();
    let mut i = 0;
    while i < lines.len() {
        if let Some(ticker) = parse_ticker_line(lines[i]) {
            if let Some(&price_line) = lines.get(i + 1) {
                if let Some(price) = parse_amount(price_line, currency) {
                    if price <= 0.0 {
                        return Err(RebalanceError::MarketParse {
                            reason: format!("non-positive price for {ticker}: {price_line}"),
                        });
                    }
                    prices.insert(ticker, price);
                    i += 2;
                    continue;
                }
            }
        }
        i += 1;
    }

    Ok(prices)
}

/// Trimmed, non-empty lines.
fn content_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Parse a decimal amount with an optional currency prefix and optional
/// thousands separators, e.g. `€1,234.56`.
fn parse_amount(raw: &str, currency: &str) -> Option<f64> {
    let raw = raw.strip_prefix(currency).unwrap_or(raw);
    raw.trim().replace(',', "").parse().ok()
}

/// `Anything (TICKER): QTY shares` → `(TICKER, QTY)`. The ticker is taken
/// from the last parenthesised group before the colon.
fn parse_holding_line(line: &str) -> Option<(String, i64)> {
    let close = line.rfind("):")?;
    let open = line[..close].rfind('(')?;
    let ticker = line[open + 1..close].trim();
    if ticker.is_empty() {
        return None;
    }

    let rest = line[close + 2..].trim();
    let quantity_str = rest.strip_suffix("shares")?.trim();
    let quantity: u32 = quantity_str.parse().ok()?;
    Some((ticker.to_string(), i64::from(quantity)))
}

/// `Anything (TICKER)` → `TICKER`, from the last parenthesised group.
fn parse_ticker_line(line: &str) -> Option<String> {
    let open = line.rfind('(')?;
    let close = open + line[open..].find(')')?;
    let ticker = line[open + 1..close].trim();
    if ticker.is_empty() {
        return None;
    }
    Some(ticker.to_string())
}
