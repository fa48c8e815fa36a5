// SPDX-License-Identifier: AGPL-3.0-only
//! # Ability Token Ledger
//!
//! The fungible-unit bookkeeping a market mints into and burns from.
//!
//! ## Overview
//! A market only needs three things from its ledger: `mint`, `burn` and
//! `balance_of`, all in raw units (1 whole unit = 10^18 raw). Any host
//! ledger (database table, chain token, ...) can back a market by
//! implementing [`Ledger`] plus [`Transactional`] for rollback.
//!
//! [`InMemoryLedger`] is the reference implementation used for:
//! 1. Unit and integration testing of the market
//! 2. Offline simulation from the CLI
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  InMemoryLedger                             │
//! │  ┌──────────┐  ┌──────────┐  ┌───────────┐  │
//! │  │ Metadata │  │ Balances │  │ Events    │  │
//! │  │ name     │  │ addr→u128│  │ Mint/Burn │  │
//! │  │ symbol   │  │          │  │ Transfer  │  │
//! │  │ decimals │  │          │  │           │  │
//! │  └──────────┘  └──────────┘  └───────────┘  │
//! └─────────────────────────────────────────────┘
//! ```

use crate::transaction::Transactional;
use crate::TOKEN_DECIMALS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("holder address is empty")]
    EmptyHolder,
    #[error("amount must be > 0")]
    ZeroAmount,
    #[error("insufficient balance: have {have} need {need}")]
    InsufficientBalance { have: u128, need: u128 },
    #[error("ledger arithmetic overflow")]
    Overflow,
    #[error("invalid token metadata: {0}")]
    InvalidMetadata(String),
}

/// Balance ledger consumed by a market. Amounts are raw units.
pub trait Ledger: Transactional {
    /// Credit `holder` and grow total supply.
    fn mint(&mut self, holder: &str, raw_amount: u128) -> Result<(), LedgerError>;

    /// Debit `holder` and shrink total supply. Fails if the balance is short.
    fn burn(&mut self, holder: &str, raw_amount: u128) -> Result<(), LedgerError>;

    fn balance_of(&self, holder: &str) -> u128;

    fn total_supply(&self) -> u128;
}

// ─────────────────────────────────────────────────────────────
// TOKEN METADATA
// ─────────────────────────────────────────────────────────────

/// Ledger-level token metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenMetadata {
    /// Human-readable name (e.g. "DeFi Expert")
    pub name: String,
    /// Ticker symbol (e.g. "DEFI"), max 8 characters
    pub symbol: String,
    /// Always 18 for ability tokens
    pub decimals: u8,
}

impl TokenMetadata {
    /// Validate metadata fields.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() || self.name.len() > 64 {
            return Err("Name must be 1-64 characters".to_string());
        }
        if self.symbol.is_empty() || self.symbol.len() > 8 {
            return Err("Symbol must be 1-8 characters".to_string());
        }
        if self.decimals > 18 {
            return Err("Decimals must be 0-18".to_string());
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
// EVENTS
// ─────────────────────────────────────────────────────────────

/// Balance changes recorded by [`InMemoryLedger`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LedgerEvent {
    Mint {
        to: String,
        #[serde(with = "crate::u128_str")]
        amount: u128,
    },
    Burn {
        from: String,
        #[serde(with = "crate::u128_str")]
        amount: u128,
    },
    Transfer {
        from: String,
        to: String,
        #[serde(with = "crate::u128_str")]
        amount: u128,
    },
}

// ─────────────────────────────────────────────────────────────
// REFERENCE IMPLEMENTATION
// ─────────────────────────────────────────────────────────────

/// In-memory ability token ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InMemoryLedger {
    pub metadata: TokenMetadata,
    /// BTreeMap for deterministic iteration and serialization
    balances: BTreeMap<String, u128>,
    #[serde(with = "crate::u128_str")]
    total_supply: u128,
    #[serde(default)]
    events: Vec<LedgerEvent>,
    /// Prior balances of holders touched while a checkpoint is open
    #[serde(skip)]
    journal: Vec<(String, Option<u128>)>,
    #[serde(skip)]
    open_checkpoints: usize,
}

impl InMemoryLedger {
    /// Create an empty 18-decimal ledger.
    pub fn new(name: &str, symbol: &str) -> Result<Self, LedgerError> {
        let metadata = TokenMetadata {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: TOKEN_DECIMALS,
        };
        metadata.validate().map_err(LedgerError::InvalidMetadata)?;

        Ok(Self {
            metadata,
            balances: BTreeMap::new(),
            total_supply: 0,
            events: Vec::new(),
            journal: Vec::new(),
            open_checkpoints: 0,
        })
    }

    /// Move `raw_amount` between holders. Total supply is unchanged.
    pub fn transfer(&mut self, from: &str, to: &str, raw_amount: u128) -> Result<(), LedgerError> {
        if from.is_empty() || to.is_empty() {
            return Err(LedgerError::EmptyHolder);
        }
        if raw_amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let have = self.balance_of(from);
        if have < raw_amount {
            return Err(LedgerError::InsufficientBalance {
                have,
                need: raw_amount,
            });
        }
        if from != to {
            let credited = self
                .balance_of(to)
                .checked_add(raw_amount)
                .ok_or(LedgerError::Overflow)?;
            self.set_balance(from, have - raw_amount);
            self.set_balance(to, credited);
        }

        self.events.push(LedgerEvent::Transfer {
            from: from.to_string(),
            to: to.to_string(),
            amount: raw_amount,
        });
        Ok(())
    }

    /// Holders with a non-zero balance, in address order.
    pub fn holders(&self) -> impl Iterator<Item = (&str, u128)> {
        self.balances.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    fn set_balance(&mut self, holder: &str, amount: u128) {
        if self.open_checkpoints > 0 {
            let prior = self.balances.get(holder).copied();
            self.journal.push((holder.to_string(), prior));
        }
        if amount == 0 {
            self.balances.remove(holder);
        } else {
            self.balances.insert(holder.to_string(), amount);
        }
    }
}

impl Ledger for InMemoryLedger {
    fn mint(&mut self, holder: &str, raw_amount: u128) -> Result<(), LedgerError> {
        if holder.is_empty() {
            return Err(LedgerError::EmptyHolder);
        }
        if raw_amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let supply = self
            .total_supply
            .checked_add(raw_amount)
            .ok_or(LedgerError::Overflow)?;
        let balance = self
            .balance_of(holder)
            .checked_add(raw_amount)
            .ok_or(LedgerError::Overflow)?;

        self.total_supply = supply;
        self.set_balance(holder, balance);
        self.events.push(LedgerEvent::Mint {
            to: holder.to_string(),
            amount: raw_amount,
        });
        Ok(())
    }

    fn burn(&mut self, holder: &str, raw_amount: u128) -> Result<(), LedgerError> {
        if holder.is_empty() {
            return Err(LedgerError::EmptyHolder);
        }
        if raw_amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let have = self.balance_of(holder);
        if have < raw_amount {
            return Err(LedgerError::InsufficientBalance {
                have,
                need: raw_amount,
            });
        }

        self.set_balance(holder, have - raw_amount);
        self.total_supply = self.total_supply.saturating_sub(raw_amount);
        self.events.push(LedgerEvent::Burn {
            from: holder.to_string(),
            amount: raw_amount,
        });
        Ok(())
    }

    fn balance_of(&self, holder: &str) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> u128 {
        self.total_supply
    }
}

/// Positions in the undo journal and the event log plus the supply at the
/// time of the checkpoint. Size does not depend on the number of holders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerCheckpoint {
    journal_len: usize,
    total_supply: u128,
    event_count: usize,
}

impl InMemoryLedger {
    fn close_checkpoint(&mut self) {
        self.open_checkpoints = self.open_checkpoints.saturating_sub(1);
        if self.open_checkpoints == 0 {
            self.journal.clear();
        }
    }
}

impl Transactional for InMemoryLedger {
    type Checkpoint = LedgerCheckpoint;

    fn checkpoint(&mut self) -> Self::Checkpoint {
        self.open_checkpoints += 1;
        LedgerCheckpoint {
            journal_len: self.journal.len(),
            total_supply: self.total_supply,
            event_count: self.events.len(),
        }
    }

    fn rollback(&mut self, checkpoint: Self::Checkpoint) {
        while self.journal.len() > checkpoint.journal_len {
            let Some((holder, prior)) = self.journal.pop() else {
                break;
            };
            match prior {
                Some(amount) => self.balances.insert(holder, amount),
                None => self.balances.remove(&holder),
            };
        }
        self.total_supply = checkpoint.total_supply;
        self.events.truncate(checkpoint.event_count);
        self.close_checkpoint();
    }

    fn commit(&mut self, _checkpoint: Self::Checkpoint) {
        self.close_checkpoint();
    }
}
