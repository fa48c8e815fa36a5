// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ABILITY TOKENS (ABT) - CORE MODULE
//
// Linear bonding-curve market for ability tokens: exact u128 pricing,
// atomic mint/burn trades against a Ledger and a ValueEscrow, a per-market
// serialized handle, and an in-process token registry.
// All financial arithmetic is checked u128 (no floating-point).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod config;
pub mod curve;
pub mod error;
pub mod escrow;
pub mod events;
pub mod ledger;
pub mod market;
pub mod registry;
pub mod shared;
pub mod transaction;
pub mod u128_str;

pub use config::{ConfigError, CurveConfig};
pub use curve::LinearCurve;
pub use error::MarketError;
pub use escrow::{EscrowError, InMemoryEscrow, ValueEscrow};
pub use events::{MarketEvent, RegistryEvent};
pub use ledger::{InMemoryLedger, Ledger, LedgerError, LedgerEvent, TokenMetadata};
pub use market::{BondingCurveMarket, MarketSnapshot, TradeReceipt, TradeSide};
pub use registry::{AbilityMetadata, AbilityRegistry, RegistryError, TokenRecord};
pub use shared::SharedMarket;
pub use transaction::Transactional;

/// Decimal places of every ability token ledger (ERC-20 convention).
pub const TOKEN_DECIMALS: u8 = 18;

/// 1 whole unit = 10^18 raw ledger units.
/// Quotes work in whole units; the ledger works in raw units.
pub const RAW_PER_UNIT: u128 = 1_000_000_000_000_000_000;

/// Canonical curve: price of the first unit (10^12 wei = 0.000001 ETH).
pub const CANONICAL_BASE_PRICE: u128 = 1_000_000_000_000;

/// Canonical curve: price step per unit of supply (10^11 wei = 0.0000001 ETH).
pub const CANONICAL_PRICE_INCREMENT: u128 = 100_000_000_000;

/// Upper bound for `base_price` and `price_increment` (10^20 = 100 ETH in wei).
///
/// Together with [`MAX_SUPPLY_UNITS`] this keeps every quote below u128::MAX:
/// worst case is `10^20 * (10^9 * 10^9 + 10^18 / 2) ≈ 1.5 * 10^38`.
pub const MAX_PRICE_PARAM: u128 = 100_000_000_000_000_000_000;

/// Maximum circulating supply a market accepts, in whole units.
pub const MAX_SUPPLY_UNITS: u128 = 1_000_000_000;

/// Convert whole units to raw ledger units. `None` on overflow.
pub fn to_raw(amount: u128) -> Option<u128> {
    amount.checked_mul(RAW_PER_UNIT)
}

/// Format a raw 18-decimal value as `whole.fraction` (e.g. `0.000001000000000000`).
pub fn format_units(raw: u128) -> String {
    format!("{}.{:018}", raw / RAW_PER_UNIT, raw % RAW_PER_UNIT)
}

/// Current unix timestamp in seconds (0 if the clock is before the epoch).
pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
