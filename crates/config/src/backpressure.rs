// Copyright The Ebus Authors
// SPDX-License-Identifier: Apache-2.0

//! Back-pressure policy configuration.
//!
//! The strategy decides what a publisher does when a partition queue is full.
//! It is chosen once per bus; the engine resolves it into a handler at
//! construction time so the publish hot path never re-inspects configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Behavior applied when an enqueue attempt finds the partition queue full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackPressureStrategy {
    /// Discard the incoming event immediately. One attempt, O(1) publish.
    #[default]
    DropNewest,
    /// Sleep between attempts until space is available. No timeout; the
    /// publisher may wait indefinitely behind a stalled consumer.
    Block,
    /// Busy-spin until space is available or `timeout` expires.
    Spin,
    /// Busy-spin, yielding to the OS every `spin_yield_threshold` attempts,
    /// until space is available or `timeout` expires.
    YieldingSpin,
}

/// Back-pressure configuration for the whole bus.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BackPressureConfig {
    /// Full-queue strategy.
    #[serde(default)]
    pub strategy: BackPressureStrategy,

    /// For `yielding_spin`: number of failed attempts between OS yields.
    #[serde(default = "default_spin_yield_threshold")]
    pub spin_yield_threshold: u32,

    /// For `block`: sleep between enqueue attempts.
    #[serde(default = "default_block_sleep")]
    pub block_sleep: Duration,

    /// For `spin` and `yielding_spin`: give up after this long.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

impl Default for BackPressureConfig {
    fn default() -> Self {
        Self {
            strategy: BackPressureStrategy::default(),
            spin_yield_threshold: default_spin_yield_threshold(),
            block_sleep: default_block_sleep(),
            timeout: default_timeout(),
        }
    }
}

fn default_spin_yield_threshold() -> u32 {
    1000
}

fn default_block_sleep() -> Duration {
    Duration::from_micros(10)
}

fn default_timeout() -> Duration {
    Duration::from_secs(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_drop_newest_with_documented_knobs() {
        let config = BackPressureConfig::default();
        assert_eq!(config.strategy, BackPressureStrategy::DropNewest);
        assert_eq!(config.spin_yield_threshold, 1000);
        assert_eq!(config.block_sleep, Duration::from_micros(10));
        assert_eq!(config.timeout, Duration::from_secs(1));
    }

    #[test]
    fn strategy_deserializes_from_snake_case() {
        let strategy: BackPressureStrategy =
            serde_json::from_str("\"yielding_spin\"").expect("strategy should parse");
        assert_eq!(strategy, BackPressureStrategy::YieldingSpin);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: BackPressureConfig =
            serde_json::from_str("{\"strategy\": \"block\"}").expect("config should parse");
        assert_eq!(config.strategy, BackPressureStrategy::Block);
        assert_eq!(config.block_sleep, Duration::from_micros(10));
    }
}
