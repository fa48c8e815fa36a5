use crate::curve::LinearCurve;
use crate::MAX_PRICE_PARAM;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const ENV_BASE_PRICE: &str = "ABT_BASE_PRICE";
pub const ENV_PRICE_INCREMENT: &str = "ABT_PRICE_INCREMENT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read or write config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("{0} not set")]
    MissingEnv(&'static str),
    #[error("{var} is not a non-negative integer: {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error("invalid curve config: {0}")]
    Invalid(String),
}

/// Curve parameters a market is created with.
///
/// Both fields are required; there are no defaults at this layer.
/// `canonical()` exists for callers (the CLI) that want one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveConfig {
    #[serde(with = "crate::u128_str")]
    pub base_price: u128,
    #[serde(with = "crate::u128_str")]
    pub price_increment: u128,
}

impl CurveConfig {
    pub fn new(base_price: u128, price_increment: u128) -> Self {
        Self {
            base_price,
            price_increment,
        }
    }

    /// 10^12 wei base, 10^11 wei step.
    pub fn canonical() -> Self {
        let curve = LinearCurve::canonical();
        Self::new(curve.base_price, curve.price_increment)
    }

    /// Load curve config from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: CurveConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load curve config from `ABT_BASE_PRICE` and `ABT_PRICE_INCREMENT`.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`load_from_env`](Self::load_from_env) with an injectable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &'static str| -> Result<u128, ConfigError> {
            let value = lookup(var).ok_or(ConfigError::MissingEnv(var))?;
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { var, value })
        };

        Ok(Self {
            base_price: read(ENV_BASE_PRICE)?,
            price_increment: read(ENV_PRICE_INCREMENT)?,
        })
    }

    /// Save curve config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Both parameters must stay within `MAX_PRICE_PARAM` so quotes cannot
    /// overflow for any supply up to `MAX_SUPPLY_UNITS`.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_price > MAX_PRICE_PARAM {
            return Err(format!(
                "base_price {} exceeds maximum {}",
                self.base_price, MAX_PRICE_PARAM
            ));
        }
        if self.price_increment > MAX_PRICE_PARAM {
            return Err(format!(
                "price_increment {} exceeds maximum {}",
                self.price_increment, MAX_PRICE_PARAM
            ));
        }
        Ok(())
    }

    /// Validate and build the pricing curve.
    pub fn to_curve(&self) -> Result<LinearCurve, ConfigError> {
        self.validate().map_err(ConfigError::Invalid)?;
        Ok(LinearCurve::new(self.base_price, self.price_increment))
    }
}

impl From<LinearCurve> for CurveConfig {
    fn from(curve: LinearCurve) -> Self {
        Self::new(curve.base_price, curve.price_increment)
    }
}
