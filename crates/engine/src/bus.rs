// Copyright The Ebus Authors
// SPDX-License-Identifier: Apache-2.0

//! The bus: one-shot construction, frozen topology, publish fan-out.
//!
//! # Lifecycle
//!
//! [`EventBus::new`] consumes an [`EventBusConfig`] and builds the whole
//! topology in one pass: topics first, then each consumer group (create,
//! register its consumers, finalize). Construction failures are `Err`; after
//! a successful build nothing about the topology can change, which is why
//! the publish path reads the topic and group maps without synchronization.
//!
//! # Consumer handoff
//!
//! The consumers built during construction are parked inside the bus until
//! [`EventBus::take_consumers`] moves them out, grouped by group id. Each
//! [`Consumer`] is an owned value whose poll method takes `&mut self`; once
//! handed to a thread it cannot be polled from anywhere else without moving
//! it, which upholds the single-consumer side of every partition ring.
//!
//! # Publish
//!
//! `publish` stamps the per-topic id onto its own copy of the event, picks a
//! partition (id round-robin, or the hash of a caller-supplied key), and
//! fans the stamped event out to every subscribing group through the
//! back-pressure handler. `Ok(false)` means at least one group refused the
//! event (or nobody subscribes to the topic); which group is not surfaced.

use crate::backpressure::BackPressureHandler;
use crate::consumer::Consumer;
use crate::error::Error;
use crate::event::Event;
use crate::group::ConsumerGroup;
use crate::topic::{Topic, TopicRegistry};
use ebus_config::{EventBusConfig, GroupName, TopicName};
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::path::Path;

/// An in-process publish/subscribe bus with a frozen topology.
///
/// Thread-safe: any thread may publish through a shared reference.
pub struct EventBus {
    registry: TopicRegistry,
    groups_by_topic: HashMap<TopicName, Vec<ConsumerGroup>>,
    back_pressure: BackPressureHandler,
    /// Parked until the caller claims them; see [`EventBus::take_consumers`].
    consumers: Mutex<HashMap<GroupName, Vec<Consumer>>>,
}

impl EventBus {
    /// Builds a bus from configuration and freezes its topology.
    ///
    /// # Errors
    ///
    /// Any structural problem in the config is fatal here rather than at
    /// first use: duplicate topic or group names, a group subscribing to an
    /// undeclared topic, a group with zero consumers, a partition count of
    /// zero, or a partition capacity that is not a power of two.
    pub fn new(config: EventBusConfig) -> Result<Self, Error> {
        if !config.partition_capacity.is_power_of_two() {
            return Err(Error::InvalidConfig {
                reason: format!(
                    "partition_capacity must be a power of two, got {}",
                    config.partition_capacity
                ),
            });
        }

        let mut registry = TopicRegistry::default();
        for topic in &config.topics {
            registry.create_topic(topic.name.clone(), topic.partition_count)?;
            tracing::debug!(
                topic = %topic.name,
                partitions = topic.partition_count,
                "created topic"
            );
        }

        let mut groups_by_topic: HashMap<TopicName, Vec<ConsumerGroup>> = HashMap::new();
        let mut consumers: HashMap<GroupName, Vec<Consumer>> = HashMap::new();
        let mut seen_groups: HashSet<GroupName> = HashSet::new();

        for group_config in &config.consumer_groups {
            if !seen_groups.insert(group_config.group_id.clone()) {
                return Err(Error::GroupAlreadyExists {
                    group: group_config.group_id.clone(),
                });
            }
            let partition_count = registry
                .get(group_config.topic_name.as_str())
                .ok_or_else(|| Error::TopicNotFoundForGroup {
                    group: group_config.group_id.clone(),
                    topic: group_config.topic_name.clone(),
                })?
                .partition_count();

            let mut group = ConsumerGroup::new(
                group_config.group_id.clone(),
                partition_count,
                config.partition_capacity,
            );
            for _ in 0..group_config.consumer_count {
                let _ = group.register_consumer()?;
            }
            let group_consumers = group.finalize()?;

            let _ = consumers.insert(group_config.group_id.clone(), group_consumers);
            groups_by_topic
                .entry(group_config.topic_name.clone())
                .or_default()
                .push(group);
        }

        Ok(Self {
            registry,
            groups_by_topic,
            back_pressure: BackPressureHandler::new(&config.back_pressure),
            consumers: Mutex::new(consumers),
        })
    }

    /// Builds a bus from a JSON configuration file.
    ///
    /// Convenience over [`EventBusConfig::from_file`] followed by
    /// [`EventBus::new`]; loading and parsing failures surface as
    /// [`Error::Config`].
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let config = EventBusConfig::from_file(path)?;
        Self::new(config)
    }

    /// Moves the consumers out of the bus, grouped by group id.
    ///
    /// The first call returns every consumer built during construction;
    /// subsequent calls return an empty map. Hand each consumer to exactly
    /// one thread and keep the bus itself shared for publishing.
    #[must_use]
    pub fn take_consumers(&self) -> HashMap<GroupName, Vec<Consumer>> {
        std::mem::take(&mut *self.consumers.lock())
    }

    /// Looks up a declared topic, e.g. to inspect its partition count.
    #[must_use]
    pub fn topic(&self, name: &str) -> Option<&Topic> {
        self.registry.get(name)
    }

    /// Publishes an event with id-based round-robin partitioning.
    ///
    /// See [`EventBus::publish_with_key`] for the result contract.
    pub fn publish(&self, event: Event) -> Result<bool, Error> {
        self.publish_with_key(event, "")
    }

    /// Publishes an event, pinning it to a partition by `partition_key`.
    ///
    /// An empty key falls back to round-robin over the stamped id; any other
    /// key is hashed deterministically, so all events sharing a key share a
    /// partition and therefore an ordering.
    ///
    /// Returns `Ok(true)` when every subscribing group accepted the event,
    /// `Ok(false)` when no group subscribes to the topic or at least one
    /// group's partition queue refused it under the back-pressure policy.
    ///
    /// # Errors
    ///
    /// [`Error::TopicNotFound`] when the event's topic was never declared.
    pub fn publish_with_key(&self, event: Event, partition_key: &str) -> Result<bool, Error> {
        let topic = self
            .registry
            .get(event.topic.as_str())
            .ok_or_else(|| Error::TopicNotFound {
                topic: event.topic.clone(),
            })?;

        let Some(groups) = self.groups_by_topic.get(&event.topic) else {
            return Ok(false);
        };

        let mut event = event;
        event.id = topic.next_id();

        let partition_index = if partition_key.is_empty() {
            (event.id % topic.partition_count() as u64) as usize
        } else {
            (hash_key(partition_key) % topic.partition_count() as u64) as usize
        };

        let mut all_accepted = true;
        for group in groups {
            all_accepted &= group.deliver(&event, partition_index, &self.back_pressure);
        }
        Ok(all_accepted)
    }
}

/// Deterministic, well-distributed hash for short partition keys.
fn hash_key(key: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}
