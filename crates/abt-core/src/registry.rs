// SPDX-License-Identifier: AGPL-3.0-only
//! # Ability Token Registry
//!
//! In-process factory that launches one bonding-curve market per ability
//! and indexes them by address and by creator.
//!
//! ## Addresses
//!
//! `"ABT" + hex(SHA3-256("creator:symbol:nonce")[0..20])`, where `nonce` is
//! the number of tokens created before this one. Deterministic for a given
//! creation order.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut registry = AbilityRegistry::new();
//! let addr = registry.create_ability_token("alice", metadata, &config, ledger, escrow)?;
//! registry.market(&addr).unwrap().execute_buy(1, payment, "bob")?;
//! let held = registry.active_abilities("bob");
//! ```

use crate::config::CurveConfig;
use crate::escrow::ValueEscrow;
use crate::events::RegistryEvent;
use crate::ledger::Ledger;
use crate::market::BondingCurveMarket;
use crate::shared::SharedMarket;
use crate::unix_now;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::collections::BTreeMap;
use thiserror::Error;

/// Address prefix for ability token markets.
pub const ADDRESS_PREFIX: &str = "ABT";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("creator address is empty")]
    EmptyCreator,
    #[error("invalid ability metadata: {0}")]
    InvalidMetadata(String),
    #[error("invalid curve config: {0}")]
    InvalidConfig(String),
    #[error("address {0} already registered")]
    AddressCollision(String),
}

/// What an ability token represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityMetadata {
    pub name: String,
    /// Max 8 characters
    pub symbol: String,
    /// The tokenized prompt
    pub prompt: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}

impl AbilityMetadata {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() || self.name.len() > 64 {
            return Err("Name must be 1-64 characters".to_string());
        }
        if self.symbol.is_empty() || self.symbol.len() > 8 {
            return Err("Symbol must be 1-8 characters".to_string());
        }
        if self.prompt.trim().is_empty() {
            return Err("Prompt cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Registry entry for one launched token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub address: String,
    pub creator: String,
    pub metadata: AbilityMetadata,
    pub config: CurveConfig,
    /// Unix seconds
    pub created_at: u64,
}

struct Entry<L, E> {
    record: TokenRecord,
    market: SharedMarket<L, E>,
}

pub struct AbilityRegistry<L, E> {
    tokens: BTreeMap<String, Entry<L, E>>,
    /// Addresses in creation order
    order: Vec<String>,
    by_creator: BTreeMap<String, Vec<String>>,
    events: Vec<RegistryEvent>,
}

impl<L: Ledger, E: ValueEscrow> AbilityRegistry<L, E> {
    pub fn new() -> Self {
        Self {
            tokens: BTreeMap::new(),
            order: Vec::new(),
            by_creator: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    /// Launch a market for a new ability and index it. Returns the address.
    pub fn create_ability_token(
        &mut self,
        creator: &str,
        metadata: AbilityMetadata,
        config: &CurveConfig,
        ledger: L,
        escrow: E,
    ) -> Result<String, RegistryError> {
        if creator.is_empty() {
            return Err(RegistryError::EmptyCreator);
        }
        metadata.validate().map_err(RegistryError::InvalidMetadata)?;
        let market = BondingCurveMarket::new(config, ledger, escrow)
            .map_err(|e| RegistryError::InvalidConfig(e.to_string()))?;

        let address = derive_address(creator, &metadata.symbol, self.order.len() as u64);
        if self.tokens.contains_key(&address) {
            return Err(RegistryError::AddressCollision(address));
        }

        let created_at = unix_now();
        self.events.push(RegistryEvent::AbilityTokenCreated {
            token: address.clone(),
            creator: creator.to_string(),
            name: metadata.name.clone(),
            symbol: metadata.symbol.clone(),
            prompt: metadata.prompt.clone(),
            timestamp: created_at,
        });
        log::info!(
            "ability token {} ({}) created by {} at {}",
            metadata.name,
            metadata.symbol,
            creator,
            address
        );

        let record = TokenRecord {
            address: address.clone(),
            creator: creator.to_string(),
            metadata,
            config: *config,
            created_at,
        };
        self.tokens.insert(
            address.clone(),
            Entry {
                record,
                market: SharedMarket::new(market),
            },
        );
        self.order.push(address.clone());
        self.by_creator
            .entry(creator.to_string())
            .or_default()
            .push(address.clone());

        Ok(address)
    }

    /// Every token, oldest first.
    pub fn all_tokens(&self) -> Vec<&TokenRecord> {
        self.order
            .iter()
            .filter_map(|addr| self.tokens.get(addr))
            .map(|e| &e.record)
            .collect()
    }

    pub fn creator_tokens(&self, creator: &str) -> Vec<&TokenRecord> {
        self.by_creator
            .get(creator)
            .map(|addrs| {
                addrs
                    .iter()
                    .filter_map(|addr| self.tokens.get(addr))
                    .map(|e| &e.record)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn token_info(&self, address: &str) -> Option<&TokenRecord> {
        self.tokens.get(address).map(|e| &e.record)
    }

    pub fn total_tokens(&self) -> usize {
        self.order.len()
    }

    /// Handle to the token's market. Clones share the same lock.
    pub fn market(&self, address: &str) -> Option<SharedMarket<L, E>> {
        self.tokens.get(address).map(|e| e.market.clone())
    }

    /// Tokens in which `holder` has a non-zero balance, oldest first.
    pub fn active_abilities(&self, holder: &str) -> Vec<&TokenRecord> {
        self.order
            .iter()
            .filter_map(|addr| self.tokens.get(addr))
            .filter(|e| e.market.balance_of(holder) > 0)
            .map(|e| &e.record)
            .collect()
    }

    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }
}

impl<L: Ledger, E: ValueEscrow> Default for AbilityRegistry<L, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// `ABT` followed by 40 hex chars.
pub fn derive_address(creator: &str, symbol: &str, nonce: u64) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(format!("{}:{}:{}", creator, symbol, nonce).as_bytes());
    let hash = hasher.finalize();
    format!("{}{}", ADDRESS_PREFIX, hex::encode(&hash[..20]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escrow::InMemoryEscrow;
    use crate::ledger::InMemoryLedger;

    type Registry = AbilityRegistry<InMemoryLedger, InMemoryEscrow>;

    fn meta(name: &str, symbol: &str) -> AbilityMetadata {
        AbilityMetadata {
            name: name.to_string(),
            symbol: symbol.to_string(),
            prompt: "You are an expert in DeFi protocols.".to_string(),
            description: "Explains DeFi mechanics".to_string(),
            category: "Finance".to_string(),
        }
    }

    fn create(registry: &mut Registry, creator: &str, name: &str, symbol: &str) -> String {
        let mut escrow = InMemoryEscrow::new();
        escrow.fund("buyer", 1_000_000_000_000_000_000).unwrap();
        registry
            .create_ability_token(
                creator,
                meta(name, symbol),
                &CurveConfig::canonical(),
                InMemoryLedger::new(name, symbol).unwrap(),
                escrow,
            )
            .unwrap()
    }

    #[test]
    fn test_derive_address_format() {
        let addr = derive_address("alice", "DEFI", 0);
        assert!(addr.starts_with("ABT"));
        assert_eq!(addr.len(), 43);
        assert!(addr[3..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(addr, derive_address("alice", "DEFI", 0));
        assert_ne!(addr, derive_address("alice", "DEFI", 1));
    }

    #[test]
    fn test_metadata_validation() {
        assert!(meta("DeFi Expert", "DEFI").validate().is_ok());
        assert!(meta("", "DEFI").validate().is_err());
        assert!(meta(&"x".repeat(65), "DEFI").validate().is_err());
        assert!(meta("DeFi Expert", "").validate().is_err());
        assert!(meta("DeFi Expert", "TOOLONGSYM").validate().is_err());
        let mut no_prompt = meta("DeFi Expert", "DEFI");
        no_prompt.prompt = "  ".to_string();
        assert!(no_prompt.validate().is_err());
    }

    #[test]
    fn test_create_and_query() {
        let mut registry = Registry::new();
        let a = create(&mut registry, "alice", "DeFi Expert", "DEFI");
        let b = create(&mut registry, "bob", "Solidity Auditor", "AUDIT");
        let c = create(&mut registry, "alice", "Rust Mentor", "RUST");

        assert_eq!(registry.total_tokens(), 3);
        let all: Vec<_> = registry.all_tokens().iter().map(|r| r.address.clone()).collect();
        assert_eq!(all, vec![a.clone(), b.clone(), c.clone()]);

        let alice: Vec<_> = registry
            .creator_tokens("alice")
            .iter()
            .map(|r| r.address.clone())
            .collect();
        assert_eq!(alice, vec![a.clone(), c]);
        assert!(registry.creator_tokens("nobody").is_empty());

        let info = registry.token_info(&b).unwrap();
        assert_eq!(info.creator, "bob");
        assert_eq!(info.metadata.symbol, "AUDIT");
        assert_eq!(info.config, CurveConfig::canonical());
        assert!(registry.token_info("ABT00").is_none());
    }

    #[test]
    fn test_create_emits_event() {
        let mut registry = Registry::new();
        let addr = create(&mut registry, "alice", "DeFi Expert", "DEFI");
        match &registry.events()[0] {
            RegistryEvent::AbilityTokenCreated {
                token,
                creator,
                symbol,
                ..
            } => {
                assert_eq!(token, &addr);
                assert_eq!(creator, "alice");
                assert_eq!(symbol, "DEFI");
            }
        }
    }

    #[test]
    fn test_create_rejects_bad_input() {
        let mut registry = Registry::new();
        let ledger = || InMemoryLedger::new("X", "X").unwrap();

        assert_eq!(
            registry.create_ability_token(
                "",
                meta("DeFi Expert", "DEFI"),
                &CurveConfig::canonical(),
                ledger(),
                InMemoryEscrow::new()
            ),
            Err(RegistryError::EmptyCreator)
        );
        assert!(matches!(
            registry.create_ability_token(
                "alice",
                meta("", "DEFI"),
                &CurveConfig::canonical(),
                ledger(),
                InMemoryEscrow::new()
            ),
            Err(RegistryError::InvalidMetadata(_))
        ));
        assert!(matches!(
            registry.create_ability_token(
                "alice",
                meta("DeFi Expert", "DEFI"),
                &CurveConfig::new(u128::MAX, 0),
                ledger(),
                InMemoryEscrow::new()
            ),
            Err(RegistryError::InvalidConfig(_))
        ));
        assert_eq!(registry.total_tokens(), 0);
    }

    #[test]
    fn test_active_abilities() {
        let mut registry = Registry::new();
        let a = create(&mut registry, "alice", "DeFi Expert", "DEFI");
        let b = create(&mut registry, "alice", "Rust Mentor", "RUST");

        assert!(registry.active_abilities("buyer").is_empty());

        let market = registry.market(&b).unwrap();
        market
            .execute_buy(1, 1_000_000_000_000, "buyer")
            .unwrap();
        let active: Vec<_> = registry
            .active_abilities("buyer")
            .iter()
            .map(|r| r.address.clone())
            .collect();
        assert_eq!(active, vec![b.clone()]);

        market.execute_sell(1, "buyer").unwrap();
        assert!(registry.active_abilities("buyer").is_empty());
        assert!(registry.market(&a).is_some());
    }
}
