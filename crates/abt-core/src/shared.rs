//! Per-market serialization.
//!
//! Every trade reads the pre-trade supply and writes the post-trade supply, so
//! two trades on the same market must never overlap. `SharedMarket` is the one
//! writer: a cloneable handle whose clones all lock the same market.

use crate::error::MarketError;
use crate::escrow::ValueEscrow;
use crate::ledger::Ledger;
use crate::market::{BondingCurveMarket, MarketSnapshot, TradeReceipt};
use crate::events::MarketEvent;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct SharedMarket<L, E> {
    inner: Arc<Mutex<BondingCurveMarket<L, E>>>,
}

impl<L, E> Clone for SharedMarket<L, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: Ledger, E: ValueEscrow> SharedMarket<L, E> {
    pub fn new(market: BondingCurveMarket<L, E>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(market)),
        }
    }

    /// Lock the market for a sequence of operations.
    ///
    /// A poisoned lock is recovered: trades only write market fields after
    /// every collaborator effect has succeeded, so the guarded state is
    /// always a committed one.
    pub fn lock(&self) -> MutexGuard<'_, BondingCurveMarket<L, E>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn execute_buy(
        &self,
        amount: u128,
        payment_provided: u128,
        buyer: &str,
    ) -> Result<TradeReceipt, MarketError> {
        self.lock().execute_buy(amount, payment_provided, buyer)
    }

    pub fn execute_sell(&self, amount: u128, seller: &str) -> Result<TradeReceipt, MarketError> {
        self.lock().execute_sell(amount, seller)
    }

    pub fn quote_buy(&self, amount: u128, current_supply: u128) -> Result<u128, MarketError> {
        self.lock().quote_buy(amount, current_supply)
    }

    pub fn quote_sell(&self, amount: u128, current_supply: u128) -> Result<u128, MarketError> {
        self.lock().quote_sell(amount, current_supply)
    }

    pub fn buy_price(&self, amount: u128) -> Result<u128, MarketError> {
        self.lock().buy_price(amount)
    }

    pub fn sell_price(&self, amount: u128) -> Result<u128, MarketError> {
        self.lock().sell_price(amount)
    }

    pub fn balance_of(&self, holder: &str) -> u128 {
        self.lock().ledger().balance_of(holder)
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        self.lock().snapshot()
    }

    pub fn check_invariants(&self) -> Result<(), String> {
        self.lock().check_invariants()
    }

    pub fn drain_events(&self) -> Vec<MarketEvent> {
        self.lock().drain_events()
    }
}
