//! Integration tests for the allocate → apply → persist pipeline.
//!
//! Tests cover:
//! - Full pipeline against the in-memory store
//! - Idempotence: re-allocating after applying produces no trades
//! - Stale-state failures (prices or holdings changed after allocation)
//! - Value conservation and ordering properties over generated inputs

mod common;

use common::*;
use proptest::prelude::*;
use rebalancer::domain::allocator::{allocate, EPSILON};
use rebalancer::domain::applier::apply_trades;
use rebalancer::domain::error::RebalanceError;
use rebalancer::domain::portfolio::Portfolio;
use rebalancer::domain::trade::{Side, Trade};
use rebalancer::ports::store_port::StorePort;
use std::collections::HashMap;

mod pipeline {
    use super::*;

    #[test]
    fn full_pipeline_with_mock_store() {
        let store = MockStore::with_portfolio(portfolio(100.0, &[]));
        let market = prices(&[("A", 10.0), ("B", 20.0)]);

        let mut current = store.load().unwrap();
        let trades = allocate(current.cash, &current.holdings, &market).unwrap();
        assert_eq!(trades, vec![Trade::buy("A", 5), Trade::buy("B", 2)]);

        apply_trades(&mut current, &market, &trades).unwrap();
        store.save(&current).unwrap();

        let saved = store.load().unwrap();
        assert_eq!(saved.quantity("A"), 5);
        assert_eq!(saved.quantity("B"), 2);
        assert!((saved.cash - 10.0).abs() < 1e-9);
    }

    #[test]
    fn missing_store_without_text_fallback() {
        let store = MockStore::new();
        let err = store.load().unwrap_err();
        assert!(matches!(err, RebalanceError::MissingPortfolio { .. }));
    }

    #[test]
    fn failed_save_leaves_prior_state() {
        let store = MockStore::with_portfolio(portfolio(50.0, &[("A", 1)])).failing_saves();

        let err = store.save(&portfolio(0.0, &[])).unwrap_err();
        assert!(matches!(err, RebalanceError::Store { .. }));

        let unchanged = store.load().unwrap();
        assert_eq!(unchanged, portfolio(50.0, &[("A", 1)]));
    }

    #[test]
    fn rebalancing_is_idempotent() {
        let market = prices(&[("A", 11.0), ("B", 7.0), ("C", 29.5)]);
        let mut current = portfolio(500.0, &[("A", 40), ("C", 2)]);

        let trades = allocate(current.cash, &current.holdings, &market).unwrap();
        apply_trades(&mut current, &market, &trades).unwrap();

        let again = allocate(current.cash, &current.holdings, &market).unwrap();
        assert!(again.is_empty(), "second allocation produced {again:?}");
    }

    #[test]
    fn stale_prices_fail_with_sells_already_applied() {
        let market = prices(&[("A", 10.0), ("B", 10.0)]);
        let mut current = portfolio(0.0, &[("B", 10)]);

        let trades = allocate(current.cash, &current.holdings, &market).unwrap();
        assert_eq!(trades, vec![Trade::sell("B", 5), Trade::buy("A", 5)]);

        // Prices move against us between allocation and application.
        let stale = prices(&[("A", 1000.0), ("B", 10.0)]);
        let err = apply_trades(&mut current, &stale, &trades).unwrap_err();

        assert!(matches!(err, RebalanceError::InsufficientCash { .. }));
        // The sell went through and stays applied.
        assert_eq!(current.quantity("B"), 5);
        assert!((current.cash - 50.0).abs() < 1e-9);
        assert_eq!(current.quantity("A"), 0);
    }

    #[test]
    fn stale_holdings_fail_on_the_sell() {
        let market = prices(&[("A", 10.0), ("B", 10.0)]);
        let snapshot = portfolio(0.0, &[("B", 10)]);

        let trades = allocate(snapshot.cash, &snapshot.holdings, &market).unwrap();

        // Shares vanished since the snapshot was taken.
        let mut current = portfolio(0.0, &[("B", 2)]);
        let err = apply_trades(&mut current, &market, &trades).unwrap_err();

        assert!(matches!(err, RebalanceError::InsufficientShares { .. }));
        assert_eq!(current, portfolio(0.0, &[("B", 2)]));
    }
}

mod properties {
    use super::*;

    /// Small universes of distinct tickers with positive prices and
    /// non-negative holdings.
    fn scenario() -> impl Strategy<Value = (f64, Vec<(String, i64, f64)>)> {
        let cash = 0.0..10_000.0f64;
        let entry = ("[A-E]", 0i64..50, 0.5..200.0f64);
        (cash, proptest::collection::vec(entry, 1..5)).prop_map(|(cash, mut entries)| {
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            entries.dedup_by(|a, b| a.0 == b.0);
            (cash, entries)
        })
    }

    fn split(entries: &[(String, i64, f64)]) -> (HashMap<String, i64>, HashMap<String, f64>) {
        let holdings = entries
            .iter()
            .filter(|(_, q, _)| *q > 0)
            .map(|(t, q, _)| (t.clone(), *q))
            .collect();
        let market = entries.iter().map(|(t, _, p)| (t.clone(), *p)).collect();
        (holdings, market)
    }

    proptest! {
        #[test]
        fn value_is_conserved((cash, entries) in scenario()) {
            let (holdings, market) = split(&entries);
            let trades = allocate(cash, &holdings, &market).unwrap();

            let mut current = Portfolio { cash, holdings };
            let before = current.total_value(&market);
            apply_trades(&mut current, &market, &trades).unwrap();
            let after = current.total_value(&market);

            prop_assert!((before - after).abs() < 1e-6);
            prop_assert!(current.cash >= -EPSILON);
        }

        #[test]
        fn sells_precede_buys((cash, entries) in scenario()) {
            let (holdings, market) = split(&entries);
            let trades = allocate(cash, &holdings, &market).unwrap();

            let first_buy = trades
                .iter()
                .position(|t| t.side == Side::Buy)
                .unwrap_or(trades.len());
            prop_assert!(trades[..first_buy].iter().all(|t| t.side == Side::Sell));
            prop_assert!(trades[first_buy..].iter().all(|t| t.side == Side::Buy));

            for group in [&trades[..first_buy], &trades[first_buy..]] {
                for pair in group.windows(2) {
                    prop_assert!(pair[0].ticker < pair[1].ticker);
                }
            }
        }

        #[test]
        fn applying_then_reallocating_is_stable((cash, entries) in scenario()) {
            let (holdings, market) = split(&entries);
            let trades = allocate(cash, &holdings, &market).unwrap();

            let mut current = Portfolio { cash, holdings };
            apply_trades(&mut current, &market, &trades).unwrap();

            let again = allocate(current.cash, &current.holdings, &market).unwrap();
            prop_assert!(again.is_empty(), "re-allocation produced {again:?}");
        }

        #[test]
        fn quantities_stay_non_negative((cash, entries) in scenario()) {
            let (holdings, market) = split(&entries);
            let trades = allocate(cash, &holdings, &market).unwrap();

            let mut current = Portfolio { cash, holdings };
            apply_trades(&mut current, &market, &trades).unwrap();

            for (ticker, &quantity) in &current.holdings {
                prop_assert!(quantity > 0, "{ticker} stored at {quantity}");
            }
        }
    }
}
