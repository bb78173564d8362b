//! Configuration management for the storefront.
//!
//! Loads configuration from environment variables with sensible defaults;
//! every variable is optional, so the demo binary runs with no setup.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Storage configuration
    pub storage: StorageConfig,
    /// Simulated payment gateway configuration
    pub gateway: GatewayConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON store file holding carts and the sales ledger
    pub data_path: PathBuf,
}

/// Simulated payment gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Probability that a confirmation is approved (0.0 to 1.0)
    pub approval_rate: f64,
    /// Simulated latency of intent creation in milliseconds
    pub intent_latency_ms: u64,
    /// Simulated latency of confirmation in milliseconds
    pub confirm_latency_ms: u64,
}

impl GatewayConfig {
    /// Intent creation latency as a `Duration`
    #[must_use]
    pub const fn intent_latency(&self) -> Duration {
        Duration::from_millis(self.intent_latency_ms)
    }

    /// Confirmation latency as a `Duration`
    #[must_use]
    pub const fn confirm_latency(&self) -> Duration {
        Duration::from_millis(self.confirm_latency_ms)
    }
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            storage: StorageConfig {
                data_path: env::var("SPINSHOP_DATA_PATH")
                    .unwrap_or_else(|_| "spinshop-data.json".to_string())
                    .into(),
            },
            gateway: GatewayConfig {
                approval_rate: env::var("SPINSHOP_APPROVAL_RATE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0.95),
                intent_latency_ms: env::var("SPINSHOP_INTENT_LATENCY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1000),
                confirm_latency_ms: env::var("SPINSHOP_CONFIRM_LATENCY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2000),
            },
        }
    }
}
