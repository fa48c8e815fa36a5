//! # Linear Bonding Curve
//!
//! Marginal price of the unit at index `i` (0-indexed, the unit minted when
//! supply is `i`):
//!
//! ```text
//! price(i) = base_price + price_increment × i
//! ```
//!
//! ## Range cost
//!
//! Buying `n` units from supply `s` pays for indices `s .. s+n-1`; selling `n`
//! units at supply `s` refunds indices `s-n .. s-1`. Both are the closed-form
//! arithmetic series:
//!
//! ```text
//! cost(start, n) = n × base_price + price_increment × (n × start + n(n-1)/2)
//! ```
//!
//! Buy and sell integrate the exact same range, so `quote_sell(n, s + n)`
//! equals `quote_buy(n, s)` to the wei. There is no spread and no fee.
//!
//! Every product is checked; a result that does not fit in u128 is an
//! `Overflow` error, never a wrapped value.

use crate::error::MarketError;
use crate::{CANONICAL_BASE_PRICE, CANONICAL_PRICE_INCREMENT, MAX_SUPPLY_UNITS};
use serde::{Deserialize, Serialize};

/// Immutable curve parameters of one market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearCurve {
    /// Price of the 0th unit (smallest payment unit)
    #[serde(with = "crate::u128_str")]
    pub base_price: u128,
    /// Price delta per unit of supply (0 = flat pricing)
    #[serde(with = "crate::u128_str")]
    pub price_increment: u128,
}

impl LinearCurve {
    pub const fn new(base_price: u128, price_increment: u128) -> Self {
        LinearCurve {
            base_price,
            price_increment,
        }
    }

    /// The curve every ability token launched with by default.
    pub const fn canonical() -> Self {
        Self::new(CANONICAL_BASE_PRICE, CANONICAL_PRICE_INCREMENT)
    }

    /// True when every unit costs the same.
    pub fn is_flat(&self) -> bool {
        self.price_increment == 0
    }

    /// Exact cost to mint `amount` units starting at `current_supply`.
    pub fn quote_buy(&self, amount: u128, current_supply: u128) -> Result<u128, MarketError> {
        if amount == 0 {
            return Err(MarketError::InvalidAmount);
        }
        self.range_cost(current_supply, amount)
    }

    /// Exact refund for burning the top `amount` units of `current_supply`.
    pub fn quote_sell(&self, amount: u128, current_supply: u128) -> Result<u128, MarketError> {
        if amount == 0 {
            return Err(MarketError::InvalidAmount);
        }
        if amount > current_supply {
            return Err(MarketError::InsufficientSupply {
                requested: amount,
                circulating: current_supply,
            });
        }
        self.range_cost(current_supply - amount, amount)
    }

    /// Price of the unit at index `supply`, i.e. `quote_buy(1, supply)`.
    pub fn marginal_price(&self, supply: u128) -> Result<u128, MarketError> {
        self.price_increment
            .checked_mul(supply)
            .and_then(|ramp| ramp.checked_add(self.base_price))
            .ok_or(MarketError::Overflow("marginal price"))
    }

    /// Total payment backing `supply` units minted from zero.
    ///
    /// With no spread this is what the reserve must hold at that supply.
    pub fn reserve_for_supply(&self, supply: u128) -> Result<u128, MarketError> {
        self.range_cost(0, supply)
    }

    /// Largest `n` with `quote_buy(n, supply) <= budget`. Zero if not even
    /// one unit is affordable.
    ///
    /// On a free curve (both parameters zero) every amount is affordable and
    /// the answer is bounded by the remaining room under `MAX_SUPPLY_UNITS`.
    pub fn max_affordable(&self, budget: u128, supply: u128) -> Result<u128, MarketError> {
        let first = self.marginal_price(supply)?;

        // cost(n) >= n × first, and with an increment also >= (n-1) × increment
        let mut hi = if first > 0 {
            budget / first
        } else if self.price_increment > 0 {
            (budget / self.price_increment).saturating_add(1)
        } else {
            MAX_SUPPLY_UNITS.saturating_sub(supply)
        };
        let mut lo = 0u128;

        while lo < hi {
            let mid = lo + (hi - lo).div_ceil(2);
            let affordable = match self.range_cost(supply, mid) {
                Ok(cost) => cost <= budget,
                Err(_) => false,
            };
            if affordable {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }

        Ok(lo)
    }

    /// Marginal prices for supplies `start .. start + count`.
    pub fn price_schedule(&self, start: u128, count: usize) -> Result<Vec<u128>, MarketError> {
        let mut prices = Vec::with_capacity(count);
        let mut supply = start;
        for _ in 0..count {
            prices.push(self.marginal_price(supply)?);
            supply = supply
                .checked_add(1)
                .ok_or(MarketError::Overflow("price schedule supply"))?;
        }
        Ok(prices)
    }

    /// Σ_{i=start}^{start+count-1} (base_price + price_increment × i)
    fn range_cost(&self, start: u128, count: u128) -> Result<u128, MarketError> {
        let flat = count
            .checked_mul(self.base_price)
            .ok_or(MarketError::Overflow("count * base_price"))?;

        if self.price_increment == 0 {
            return Ok(flat);
        }

        let steps = count
            .checked_mul(start)
            .and_then(|offset| half_pairs(count).and_then(|ramp| offset.checked_add(ramp)))
            .ok_or(MarketError::Overflow("count * start + count(count-1)/2"))?;

        self.price_increment
            .checked_mul(steps)
            .and_then(|slope| slope.checked_add(flat))
            .ok_or(MarketError::Overflow("range cost"))
    }
}

/// `n(n-1)/2`, dividing the even factor first so the product cannot
/// overflow before the division does.
fn half_pairs(n: u128) -> Option<u128> {
    if n < 2 {
        return Some(0);
    }
    if n % 2 == 0 {
        (n / 2).checked_mul(n - 1)
    } else {
        n.checked_mul((n - 1) / 2)
    }
}
