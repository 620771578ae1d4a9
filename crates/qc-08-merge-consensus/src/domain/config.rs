//! Chain configuration consumed by the merge-transition engine.

use serde::{Deserialize, Serialize};
use shared_types::U256;
use std::env;

/// Maximum extra-data size of a post-merge header.
pub const DEFAULT_MAX_EXTRA_DATA_SIZE: usize = 32;

/// Protocol gas limit ceiling, 2^63 - 1.
pub const DEFAULT_MAX_GAS_LIMIT: u64 = 0x7fff_ffff_ffff_ffff;

/// Configuration for the merge transition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Cumulative difficulty at which the chain leaves proof-of-work.
    /// `None` keeps the chain on the legacy engine forever.
    pub terminal_total_difficulty: Option<U256>,
    /// Maximum extra-data bytes in a post-merge header
    pub max_extra_data_size: usize,
    /// Maximum gas limit of any header
    pub max_gas_limit: u64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            terminal_total_difficulty: None,
            max_extra_data_size: DEFAULT_MAX_EXTRA_DATA_SIZE,
            max_gas_limit: DEFAULT_MAX_GAS_LIMIT,
        }
    }
}

impl MergeConfig {
    /// Set the terminal total difficulty.
    pub fn with_terminal_total_difficulty(mut self, ttd: impl Into<U256>) -> Self {
        self.terminal_total_difficulty = Some(ttd.into());
        self
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_TERMINAL_TOTAL_DIFFICULTY`: decimal or `0x`-prefixed hex (default: unset)
    /// - `QC_MAX_EXTRA_DATA_SIZE`: bytes (default: 32)
    /// - `QC_MAX_GAS_LIMIT`: gas (default: 2^63 - 1)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            terminal_total_difficulty: env::var("QC_TERMINAL_TOTAL_DIFFICULTY")
                .ok()
                .and_then(|v| parse_u256(&v)),

            max_extra_data_size: env::var("QC_MAX_EXTRA_DATA_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_extra_data_size),

            max_gas_limit: env::var("QC_MAX_GAS_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_gas_limit),
        }
    }
}

fn parse_u256(value: &str) -> Option<U256> {
    let value = value.trim();
    match value.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16).ok(),
        None => U256::from_dec_str(value).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MergeConfig::default();
        assert_eq!(config.terminal_total_difficulty, None);
        assert_eq!(config.max_extra_data_size, 32);
        assert_eq!(config.max_gas_limit, (1u64 << 63) - 1);
    }

    #[test]
    fn test_with_terminal_total_difficulty() {
        let config = MergeConfig::default().with_terminal_total_difficulty(100u64);
        assert_eq!(config.terminal_total_difficulty, Some(U256::from(100)));
    }

    #[test]
    fn test_parse_u256() {
        assert_eq!(parse_u256("100"), Some(U256::from(100)));
        assert_eq!(parse_u256("0x64"), Some(U256::from(100)));
        assert_eq!(
            parse_u256("58750000000000000000000"),
            U256::from_dec_str("58750000000000000000000").ok()
        );
        assert_eq!(parse_u256("not-a-number"), None);
    }

    // The only test touching these variables, so it cannot race another.
    #[test]
    fn test_from_env() {
        const VARS: [&str; 3] = [
            "QC_TERMINAL_TOTAL_DIFFICULTY",
            "QC_MAX_EXTRA_DATA_SIZE",
            "QC_MAX_GAS_LIMIT",
        ];

        for var in VARS {
            env::remove_var(var);
        }
        assert_eq!(MergeConfig::from_env(), MergeConfig::default());

        env::set_var("QC_TERMINAL_TOTAL_DIFFICULTY", "0xC70D808A128D7380000");
        env::set_var("QC_MAX_EXTRA_DATA_SIZE", "64");
        env::set_var("QC_MAX_GAS_LIMIT", "30000000");
        let config = MergeConfig::from_env();
        assert_eq!(
            config.terminal_total_difficulty,
            U256::from_dec_str("58750000000000000000000").ok()
        );
        assert_eq!(config.max_extra_data_size, 64);
        assert_eq!(config.max_gas_limit, 30_000_000);

        env::set_var("QC_TERMINAL_TOTAL_DIFFICULTY", "lots");
        env::set_var("QC_MAX_EXTRA_DATA_SIZE", "-1");
        env::set_var("QC_MAX_GAS_LIMIT", "many");
        assert_eq!(MergeConfig::from_env(), MergeConfig::default());

        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_config_serde() {
        let config = MergeConfig::default().with_terminal_total_difficulty(100u64);
        let json = serde_json::to_string(&config).unwrap();
        let decoded: MergeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, config);
    }
}
