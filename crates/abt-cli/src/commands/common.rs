use abt_core::config::{ENV_BASE_PRICE, ENV_PRICE_INCREMENT};
use abt_core::{format_units, CurveConfig, LinearCurve};
use std::path::Path;

/// Pick the active curve.
///
/// Source order: `--config` file, then `ABT_BASE_PRICE`/`ABT_PRICE_INCREMENT`
/// (both required once either is set), then the canonical curve. The
/// `--base-price` and `--price-increment` flags override whichever was used.
pub fn resolve_curve(
    config_path: Option<&Path>,
    base_price: Option<u128>,
    price_increment: Option<u128>,
) -> Result<LinearCurve, Box<dyn std::error::Error>> {
    let env_set = std::env::var_os(ENV_BASE_PRICE).is_some()
        || std::env::var_os(ENV_PRICE_INCREMENT).is_some();

    let mut config = match config_path {
        Some(path) => CurveConfig::load_from_file(path)
            .map_err(|e| format!("{} ({})", e, path.display()))?,
        None if env_set => CurveConfig::load_from_env()?,
        None => CurveConfig::canonical(),
    };

    if let Some(base) = base_price {
        config.base_price = base;
    }
    if let Some(inc) = price_increment {
        config.price_increment = inc;
    }

    log::debug!(
        "active curve: base_price={} price_increment={}",
        config.base_price,
        config.price_increment
    );
    Ok(config.to_curve()?)
}

/// `1300000000000 wei (0.000001300000000000 ETH)`
pub fn wei(value: u128) -> String {
    format!("{} wei ({} ETH)", value, format_units(value))
}
