//! CSV file portfolio store.
//!
//! Two columns, `ticker,quantity`. One reserved row, ticker `CASH`, holds
//! the cash amount in its quantity column; every other row is a strictly
//! positive whole share count. Rows are written `CASH` first, then tickers
//! ascending, so saved files are byte-for-byte reproducible.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::RebalanceError;
use crate::domain::portfolio::Portfolio;
use crate::ports::store_port::StorePort;

/// Reserved ticker naming the cash row.
pub const CASH_TICKER: &str = "CASH";

pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn store_error(&self, reason: String) -> RebalanceError {
        RebalanceError::Store {
            reason: format!("{}: {}", self.path.display(), reason),
        }
    }
}

impl StorePort for CsvStore {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> Result<Portfolio, RebalanceError> {
        if !self.path.exists() {
            return Err(RebalanceError::MissingPortfolio {
                path: self.path.display().to_string(),
            });
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| self.store_error(format!("read failed: {e}")))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut cash: Option<f64> = None;
        let mut holdings: HashMap<String, i64> = HashMap::new();

        for result in rdr.records() {
            let record = result.map_err(|e| self.store_error(format!("CSV parse error: {e}")))?;

            let ticker = record
                .get(0)
                .ok_or_else(|| self.store_error("missing ticker column".to_string()))?;
            let raw_quantity = record
                .get(1)
                .ok_or_else(|| self.store_error("missing quantity column".to_string()))?;

            if ticker == CASH_TICKER {
                if cash.is_some() {
                    return Err(self.store_error("duplicate CASH row".to_string()));
                }
                let amount: f64 = raw_quantity.parse().map_err(|_| {
                    self.store_error(format!("invalid cash amount: {raw_quantity}"))
                })?;
                if amount < 0.0 {
                    return Err(self.store_error(format!("negative cash: {raw_quantity}")));
                }
                cash = Some(amount);
            } else {
                let quantity: i64 = raw_quantity.parse().map_err(|_| {
                    self.store_error(format!("invalid quantity for {ticker}: {raw_quantity}"))
                })?;
                if quantity <= 0 {
                    return Err(
                        self.store_error(format!("non-positive quantity for {ticker}: {quantity}"))
                    );
                }
                if holdings.insert(ticker.to_string(), quantity).is_some() {
                    return Err(self.store_error(format!("duplicate ticker: {ticker}")));
                }
            }
        }

        let cash = cash.ok_or_else(|| self.store_error("missing CASH row".to_string()))?;
        Ok(Portfolio { cash, holdings })
    }

    fn save(&self, portfolio: &Portfolio) -> Result<(), RebalanceError> {
        if portfolio.has_holding(CASH_TICKER) {
            return Err(self.store_error(
                "a holding named CASH collides with the reserved cash row".to_string(),
            ));
        }

        // Write the whole file aside, then rename over the target, so a
        // failed save never truncates an existing store.
        let tmp_path = self.path.with_extension("csv.tmp");
        let mut wtr = csv::Writer::from_path(&tmp_path)
            .map_err(|e| self.store_error(format!("write failed: {e}")))?;

        wtr.write_record(["ticker", "quantity"])
            .map_err(|e| self.store_error(format!("write failed: {e}")))?;
        let cash_field = portfolio.cash.to_string();
        wtr.write_record([CASH_TICKER, cash_field.as_str()])
            .map_err(|e| self.store_error(format!("write failed: {e}")))?;

        let mut tickers: Vec<&String> = portfolio.holdings.keys().collect();
        tickers.sort();
        for ticker in tickers {
            let quantity_field = portfolio.holdings[ticker].to_string();
            wtr.write_record([ticker.as_str(), quantity_field.as_str()])
                .map_err(|e| self.store_error(format!("write failed: {e}")))?;
        }

        wtr.flush()
            .map_err(|e| self.store_error(format!("write failed: {e}")))?;
        drop(wtr);

        fs::rename(&tmp_path, &self.path)
            .map_err(|e| self.store_error(format!("rename failed: {e}")))?;
        Ok(())
    }
}
