#![allow(dead_code)]

use rebalancer::domain::error::RebalanceError;
use rebalancer::domain::portfolio::Portfolio;
use rebalancer::ports::store_port::StorePort;
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory store for pipeline tests.
pub struct MockStore {
    pub state: RefCell<Option<Portfolio>>,
    pub fail_save: bool,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(None),
            fail_save: false,
        }
    }

    pub fn with_portfolio(portfolio: Portfolio) -> Self {
        Self {
            state: RefCell::new(Some(portfolio)),
            fail_save: false,
        }
    }

    pub fn failing_saves(mut self) -> Self {
        self.fail_save = true;
        self
    }
}

impl StorePort for MockStore {
    fn load(&self) -> Result<Portfolio, RebalanceError> {
        self.state
            .borrow()
            .clone()
            .ok_or_else(|| RebalanceError::MissingPortfolio {
                path: "<memory>".to_string(),
            })
    }

    fn save(&self, portfolio: &Portfolio) -> Result<(), RebalanceError> {
        if self.fail_save {
            return Err(RebalanceError::Store {
                reason: "mock save failure".to_string(),
            });
        }
        *self.state.borrow_mut() = Some(portfolio.clone());
        Ok(())
    }

    fn exists(&self) -> bool {
        self.state.borrow().is_some()
    }
}

pub fn prices(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
    pairs.iter().map(|(t, p)| (t.to_string(), *p)).collect()
}

pub fn portfolio(cash: f64, pairs: &[(&str, i64)]) -> Portfolio {
    let mut portfolio = Portfolio::new(cash);
    for (ticker, quantity) in pairs {
        portfolio.set_quantity(ticker, *quantity);
    }
    portfolio
}
