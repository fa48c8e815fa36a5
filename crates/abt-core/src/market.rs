// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BONDING CURVE MARKET
//
// One market per ability token. Owns the curve, circulating supply and
// reserve; trades mint/burn through a Ledger and move value through a
// ValueEscrow. A trade either commits every effect or none of them.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::config::{ConfigError, CurveConfig};
use crate::curve::LinearCurve;
use crate::error::MarketError;
use crate::escrow::ValueEscrow;
use crate::events::MarketEvent;
use crate::ledger::Ledger;
use crate::{to_raw, MAX_SUPPLY_UNITS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Outcome of a committed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub side: TradeSide,
    pub trader: String,
    /// Whole units
    #[serde(with = "crate::u128_str")]
    pub amount: u128,
    #[serde(with = "crate::u128_str")]
    pub raw_amount: u128,
    /// Buy: cost charged. Sell: refund paid.
    #[serde(with = "crate::u128_str")]
    pub value: u128,
    /// Overpayment returned to the buyer (always 0 on sells)
    #[serde(with = "crate::u128_str")]
    pub refund: u128,
    #[serde(with = "crate::u128_str")]
    pub supply_after: u128,
    #[serde(with = "crate::u128_str")]
    pub reserve_after: u128,
    pub events: Vec<MarketEvent>,
}

/// Point-in-time view of a market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(with = "crate::u128_str")]
    pub base_price: u128,
    #[serde(with = "crate::u128_str")]
    pub price_increment: u128,
    #[serde(with = "crate::u128_str")]
    pub circulating_supply: u128,
    #[serde(with = "crate::u128_str")]
    pub reserve_balance: u128,
    /// Cost of the next unit; `None` at the supply cap
    #[serde(with = "crate::u128_str::option")]
    pub next_buy_price: Option<u128>,
    /// Refund for the last unit; `None` at zero supply
    #[serde(with = "crate::u128_str::option")]
    pub next_sell_price: Option<u128>,
    #[serde(with = "crate::u128_str")]
    pub ledger_total_supply: u128,
    #[serde(with = "crate::u128_str")]
    pub escrow_held: u128,
}

pub struct BondingCurveMarket<L, E> {
    curve: LinearCurve,
    circulating_supply: u128,
    reserve_balance: u128,
    ledger: L,
    escrow: E,
    /// Committed events not yet drained by an indexer
    events: Vec<MarketEvent>,
}

impl<L: Ledger, E: ValueEscrow> BondingCurveMarket<L, E> {
    /// Create a market at supply 0, reserve 0.
    pub fn new(config: &CurveConfig, ledger: L, escrow: E) -> Result<Self, ConfigError> {
        let curve = config.to_curve()?;
        Ok(Self {
            curve,
            circulating_supply: 0,
            reserve_balance: 0,
            ledger,
            escrow,
            events: Vec::new(),
        })
    }

    // ─── Accessors ───────────────────────────────────────────

    pub fn curve(&self) -> &LinearCurve {
        &self.curve
    }

    pub fn circulating_supply(&self) -> u128 {
        self.circulating_supply
    }

    pub fn reserve_balance(&self) -> u128 {
        self.reserve_balance
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn escrow(&self) -> &E {
        &self.escrow
    }

    /// Host-side access (funding wallets, transfers between holders).
    /// Minting or burning through this bypasses the market's books.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn escrow_mut(&mut self) -> &mut E {
        &mut self.escrow
    }

    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    /// Hand committed events to the caller and clear the log.
    pub fn drain_events(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.events)
    }

    // ─── Quotes ──────────────────────────────────────────────

    /// Cost to mint `amount` units at an arbitrary supply. Pure.
    pub fn quote_buy(&self, amount: u128, current_supply: u128) -> Result<u128, MarketError> {
        let cost = self.curve.quote_buy(amount, current_supply)?;
        log::debug!("quote_buy amount={} supply={} cost={}", amount, current_supply, cost);
        Ok(cost)
    }

    /// Refund for burning `amount` units at an arbitrary supply. Pure.
    pub fn quote_sell(&self, amount: u128, current_supply: u128) -> Result<u128, MarketError> {
        let refund = self.curve.quote_sell(amount, current_supply)?;
        log::debug!("quote_sell amount={} supply={} refund={}", amount, current_supply, refund);
        Ok(refund)
    }

    /// Cost to buy `amount` units now.
    pub fn buy_price(&self, amount: u128) -> Result<u128, MarketError> {
        self.quote_buy(amount, self.circulating_supply)
    }

    /// Refund for selling `amount` units now.
    pub fn sell_price(&self, amount: u128) -> Result<u128, MarketError> {
        self.quote_sell(amount, self.circulating_supply)
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        let next_buy_price = if self.circulating_supply < MAX_SUPPLY_UNITS {
            self.curve.quote_buy(1, self.circulating_supply).ok()
        } else {
            None
        };
        MarketSnapshot {
            base_price: self.curve.base_price,
            price_increment: self.curve.price_increment,
            circulating_supply: self.circulating_supply,
            reserve_balance: self.reserve_balance,
            next_buy_price,
            next_sell_price: self.curve.quote_sell(1, self.circulating_supply).ok(),
            ledger_total_supply: self.ledger.total_supply(),
            escrow_held: self.escrow.held(),
        }
    }

    /// Verify the books agree with each other.
    ///
    /// The ledger check assumes the ledger is only minted into by this market.
    pub fn check_invariants(&self) -> Result<(), String> {
        let expected_reserve = self
            .curve
            .reserve_for_supply(self.circulating_supply)
            .map_err(|e| e.to_string())?;
        if self.reserve_balance != expected_reserve {
            return Err(format!(
                "reserve {} != area under curve {} at supply {}",
                self.reserve_balance, expected_reserve, self.circulating_supply
            ));
        }

        let expected_raw = to_raw(self.circulating_supply)
            .ok_or_else(|| "supply overflows raw units".to_string())?;
        if self.ledger.total_supply() != expected_raw {
            return Err(format!(
                "ledger total supply {} != circulating supply {} raw",
                self.ledger.total_supply(),
                expected_raw
            ));
        }

        if self.escrow.held() < self.reserve_balance {
            return Err(format!(
                "escrow holds {} < reserve {}",
                self.escrow.held(),
                self.reserve_balance
            ));
        }
        Ok(())
    }

    // ─── Trades ──────────────────────────────────────────────

    /// Mint `amount` units to `buyer` for `payment_provided`.
    ///
    /// The whole payment is collected, then any excess over the cost is paid
    /// back. If collection, minting or the excess refund fails, nothing changes.
    pub fn execute_buy(
        &mut self,
        amount: u128,
        payment_provided: u128,
        buyer: &str,
    ) -> Result<TradeReceipt, MarketError> {
        if amount == 0 {
            return Err(MarketError::InvalidAmount);
        }
        let supply_after = self
            .circulating_supply
            .checked_add(amount)
            .filter(|s| *s <= MAX_SUPPLY_UNITS)
            .ok_or(MarketError::SupplyCapExceeded {
                cap: MAX_SUPPLY_UNITS,
            })?;

        let cost = self.curve.quote_buy(amount, self.circulating_supply)?;
        if payment_provided < cost {
            return Err(MarketError::InsufficientPayment {
                required: cost,
                provided: payment_provided,
            });
        }
        let reserve_after = self
            .reserve_balance
            .checked_add(cost)
            .ok_or(MarketError::Overflow("reserve + cost"))?;
        let raw_amount = to_raw(amount).ok_or(MarketError::Overflow("amount * 10^18"))?;
        let excess = payment_provided - cost;

        self.transact("buy", buyer, |ledger, escrow| {
            escrow
                .collect(buyer, payment_provided)
                .map_err(|e| MarketError::CollectFailed {
                    payer: buyer.to_string(),
                    amount: payment_provided,
                    reason: e.to_string(),
                })?;
            ledger
                .mint(buyer, raw_amount)
                .map_err(|e| MarketError::LedgerRejected(e.to_string()))?;
            if excess > 0 {
                escrow
                    .pay_out(buyer, excess)
                    .map_err(|e| MarketError::PayoutFailed {
                        recipient: buyer.to_string(),
                        amount: excess,
                        reason: e.to_string(),
                    })?;
            }
            Ok(())
        })?;

        self.circulating_supply = supply_after;
        self.reserve_balance = reserve_after;
        let event = MarketEvent::Minted {
            holder: buyer.to_string(),
            raw_amount,
        };
        self.events.push(event.clone());

        log::info!(
            "buy: {} minted {} units for {} (refund {}), supply={} reserve={}",
            buyer,
            amount,
            cost,
            excess,
            supply_after,
            reserve_after
        );

        Ok(TradeReceipt {
            side: TradeSide::Buy,
            trader: buyer.to_string(),
            amount,
            raw_amount,
            value: cost,
            refund: excess,
            supply_after,
            reserve_after,
            events: vec![event],
        })
    }

    /// Burn `amount` units from `seller` and pay the curve refund.
    ///
    /// If the burn or the payout fails, nothing changes.
    pub fn execute_sell(&mut self, amount: u128, seller: &str) -> Result<TradeReceipt, MarketError> {
        if amount == 0 {
            return Err(MarketError::InvalidAmount);
        }
        let available = self.ledger.balance_of(seller);
        // An amount too large to express in raw units exceeds any balance
        let raw_amount = to_raw(amount).ok_or(MarketError::InsufficientBalance {
            required: u128::MAX,
            available,
        })?;
        if available < raw_amount {
            return Err(MarketError::InsufficientBalance {
                required: raw_amount,
                available,
            });
        }

        let refund = self.curve.quote_sell(amount, self.circulating_supply)?;
        let reserve_after =
            self.reserve_balance
                .checked_sub(refund)
                .ok_or(MarketError::ReserveShortfall {
                    reserve: self.reserve_balance,
                    refund,
                })?;
        // quote_sell already rejected amount > supply
        let supply_after = self.circulating_supply - amount;

        self.transact("sell", seller, |ledger, escrow| {
            ledger
                .burn(seller, raw_amount)
                .map_err(|e| MarketError::LedgerRejected(e.to_string()))?;
            if refund > 0 {
                escrow
                    .pay_out(seller, refund)
                    .map_err(|e| MarketError::PayoutFailed {
                        recipient: seller.to_string(),
                        amount: refund,
                        reason: e.to_string(),
                    })?;
            }
            Ok(())
        })?;

        self.circulating_supply = supply_after;
        self.reserve_balance = reserve_after;
        let event = MarketEvent::Burned {
            holder: seller.to_string(),
            raw_amount,
        };
        self.events.push(event.clone());

        log::info!(
            "sell: {} burned {} units for {}, supply={} reserve={}",
            seller,
            amount,
            refund,
            supply_after,
            reserve_after
        );

        Ok(TradeReceipt {
            side: TradeSide::Sell,
            trader: seller.to_string(),
            amount,
            raw_amount,
            value: refund,
            refund: 0,
            supply_after,
            reserve_after,
            events: vec![event],
        })
    }

    /// Run collaborator effects under a checkpoint of both ledger and escrow.
    /// Both are committed on success and restored before an error is returned.
    fn transact<T>(
        &mut self,
        op: &str,
        trader: &str,
        apply: impl FnOnce(&mut L, &mut E) -> Result<T, MarketError>,
    ) -> Result<T, MarketError> {
        let ledger_cp = self.ledger.checkpoint();
        let escrow_cp = self.escrow.checkpoint();

        match apply(&mut self.ledger, &mut self.escrow) {
            Ok(value) => {
                self.ledger.commit(ledger_cp);
                self.escrow.commit(escrow_cp);
                Ok(value)
            }
            Err(e) => {
                self.ledger.rollback(ledger_cp);
                self.escrow.rollback(escrow_cp);
                log::warn!("{} by {} rolled back: {}", op, trader, e);
                Err(e)
            }
        }
    }
}
