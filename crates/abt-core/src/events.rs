use serde::{Deserialize, Serialize};

/// Emitted by a market after a committed trade. Amounts are raw units.
///
/// `Minted` is the ability being activated for the holder, `Burned` the
/// ability being released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum MarketEvent {
    Minted {
        holder: String,
        #[serde(with = "crate::u128_str")]
        raw_amount: u128,
    },
    Burned {
        holder: String,
        #[serde(with = "crate::u128_str")]
        raw_amount: u128,
    },
}

impl MarketEvent {
    pub fn holder(&self) -> &str {
        match self {
            MarketEvent::Minted { holder, .. } | MarketEvent::Burned { holder, .. } => holder,
        }
    }

    pub fn raw_amount(&self) -> u128 {
        match self {
            MarketEvent::Minted { raw_amount, .. } | MarketEvent::Burned { raw_amount, .. } => {
                *raw_amount
            }
        }
    }
}

/// Emitted by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum RegistryEvent {
    AbilityTokenCreated {
        token: String,
        creator: String,
        name: String,
        symbol: String,
        prompt: String,
        timestamp: u64,
    },
}
