//! Engine configuration.
//!
//! Every setting comes from an `ORDER_ENGINE_*` environment variable and
//! falls back to a default. `main` loads `.env.local` first, so a developer
//! file can supply the same keys.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::domain::Money;
use crate::engine::PricingPolicy;

pub const ENV_ADDR: &str = "ORDER_ENGINE_ADDR";
pub const ENV_MAILBOX_CAPACITY: &str = "ORDER_ENGINE_MAILBOX_CAPACITY";
pub const ENV_STORAGE_TIMEOUT_MS: &str = "ORDER_ENGINE_STORAGE_TIMEOUT_MS";
pub const ENV_STORAGE_ATTEMPTS: &str = "ORDER_ENGINE_STORAGE_ATTEMPTS";
pub const ENV_TAX_RATE_BPS: &str = "ORDER_ENGINE_TAX_RATE_BPS";
pub const ENV_DELIVERY_FEE: &str = "ORDER_ENGINE_DELIVERY_FEE";
pub const ENV_FREE_DELIVERY_THRESHOLD: &str = "ORDER_ENGINE_FREE_DELIVERY_THRESHOLD";
pub const ENV_SEED_FILE: &str = "ORDER_ENGINE_SEED_FILE";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key}: cannot parse {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Bounds applied to every round trip to a store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorageSettings {
    pub timeout: Duration,
    /// Total attempts for idempotent calls (1 = no retry).
    pub max_attempts: u32,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(2_000),
            max_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub bind_addr: SocketAddr,
    pub mailbox_capacity: usize,
    pub storage: StorageSettings,
    pub pricing: PricingPolicy,
    pub seed_file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            mailbox_capacity: 64,
            storage: StorageSettings::default(),
            pricing: PricingPolicy::default(),
            seed_file: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(addr) = parse_key(&lookup, ENV_ADDR)? {
            config.bind_addr = addr;
        }
        if let Some(capacity) = parse_key::<usize>(&lookup, ENV_MAILBOX_CAPACITY)? {
            if capacity == 0 {
                return Err(invalid(ENV_MAILBOX_CAPACITY, "0", "must be at least 1"));
            }
            config.mailbox_capacity = capacity;
        }
        if let Some(ms) = parse_key::<u64>(&lookup, ENV_STORAGE_TIMEOUT_MS)? {
            if ms == 0 {
                return Err(invalid(ENV_STORAGE_TIMEOUT_MS, "0", "must be at least 1"));
            }
            config.storage.timeout = Duration::from_millis(ms);
        }
        if let Some(attempts) = parse_key::<u32>(&lookup, ENV_STORAGE_ATTEMPTS)? {
            if attempts == 0 {
                return Err(invalid(ENV_STORAGE_ATTEMPTS, "0", "must be at least 1"));
            }
            config.storage.max_attempts = attempts;
        }
        if let Some(bps) = parse_key(&lookup, ENV_TAX_RATE_BPS)? {
            config.pricing.tax_rate_bps = bps;
        }
        if let Some(fee) = parse_money(&lookup, ENV_DELIVERY_FEE)? {
            config.pricing.delivery_fee = fee;
        }
        if let Some(threshold) = parse_money(&lookup, ENV_FREE_DELIVERY_THRESHOLD)? {
            config.pricing.free_delivery_threshold = threshold;
        }
        config.seed_file = lookup(ENV_SEED_FILE)
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Ok(config)
    }
}

fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_key<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| invalid(key, &raw, e.to_string())),
    }
}

fn parse_money(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<Money>, ConfigError> {
    let Some(amount) = parse_key::<f64>(lookup, key)? else {
        return Ok(None);
    };
    match Money::from_major(amount) {
        Some(money) if !money.is_negative() => Ok(Some(money)),
        _ => Err(invalid(key, &amount.to_string(), "must be a non-negative amount")),
    }
}
