// Copyright The Ebus Authors
// SPDX-License-Identifier: Apache-2.0

//! Bus topology configuration.
//!
//! An [`EventBusConfig`] declares the whole topology up front: topics with
//! their partition counts, consumer groups with their consumer counts, the
//! per-partition queue capacity, and the back-pressure policy. The engine
//! performs structural validation (duplicates, capacity rules, group/topic
//! references) when it builds the bus; this module only guarantees that the
//! values are well-formed.

use crate::backpressure::BackPressureConfig;
use crate::{ConfigError, GroupName, TopicName};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Declaration of one topic.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TopicConfig {
    /// Topic name, unique within the bus.
    pub name: TopicName,

    /// Number of independent ordered partitions. Must be at least 1.
    #[serde(default = "default_partition_count")]
    pub partition_count: usize,
}

/// Declaration of one consumer group.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ConsumerGroupConfig {
    /// Group identifier, unique within the bus.
    pub group_id: GroupName,

    /// The single topic this group subscribes to.
    pub topic_name: TopicName,

    /// Number of consumers registered into the group. Must be at least 1.
    #[serde(default = "default_consumer_count")]
    pub consumer_count: usize,
}

/// Whole-bus topology, consumed once by the engine at construction time.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EventBusConfig {
    /// Topics available for publishing.
    pub topics: Vec<TopicConfig>,

    /// Consumer groups and their topic subscriptions.
    #[serde(default)]
    pub consumer_groups: Vec<ConsumerGroupConfig>,

    /// Capacity of each partition queue. Must be a power of two.
    #[serde(default = "default_partition_capacity")]
    pub partition_capacity: usize,

    /// Full-queue behavior on the publish path.
    #[serde(default)]
    pub back_pressure: BackPressureConfig,
}

impl EventBusConfig {
    /// Parses a configuration from a JSON string.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}

fn default_partition_count() -> usize {
    1
}

fn default_consumer_count() -> usize {
    1
}

fn default_partition_capacity() -> usize {
    8192
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BackPressureStrategy;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config = EventBusConfig::from_json_str(
            r#"{
                "topics": [{ "name": "notifications" }]
            }"#,
        )
        .expect("minimal config should parse");

        assert_eq!(config.topics.len(), 1);
        assert_eq!(config.topics[0].partition_count, 1);
        assert!(config.consumer_groups.is_empty());
        assert_eq!(config.partition_capacity, 8192);
        assert_eq!(
            config.back_pressure.strategy,
            BackPressureStrategy::DropNewest
        );
    }

    #[test]
    fn full_config_round_trips() {
        let config = EventBusConfig::from_json_str(
            r#"{
                "topics": [
                    { "name": "orders", "partition_count": 4 },
                    { "name": "audit" }
                ],
                "consumer_groups": [
                    { "group_id": "billing", "topic_name": "orders", "consumer_count": 2 },
                    { "group_id": "audit_trail", "topic_name": "audit" }
                ],
                "partition_capacity": 4096,
                "back_pressure": { "strategy": "spin" }
            }"#,
        )
        .expect("config should parse");

        assert_eq!(config.topics[0].partition_count, 4);
        assert_eq!(config.consumer_groups[0].consumer_count, 2);
        assert_eq!(config.consumer_groups[1].consumer_count, 1);
        assert_eq!(config.partition_capacity, 4096);
        assert_eq!(config.back_pressure.strategy, BackPressureStrategy::Spin);

        let json = serde_json::to_string(&config).expect("config should serialize");
        let reparsed = EventBusConfig::from_json_str(&json).expect("round trip should parse");
        assert_eq!(reparsed.topics.len(), 2);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = EventBusConfig::from_json_str(
            r#"{ "topics": [], "replication_factor": 3 }"#,
        );
        assert!(result.is_err());
    }
}
