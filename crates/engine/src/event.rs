// Copyright The Ebus Authors
// SPDX-License-Identifier: Apache-2.0

use ebus_config::TopicName;
use std::time::Instant;

/// A published value: topic, payload, and publish metadata.
///
/// The caller constructs an event with [`Event::new`], which stamps the
/// monotonic `timestamp`; the bus stamps `id` on its own copy during publish.
/// Consumers observe `id` and `timestamp` together with the payload.
#[derive(Debug, Clone)]
pub struct Event {
    /// Destination topic.
    pub topic: TopicName,
    /// Opaque payload.
    pub payload: String,
    /// Per-topic monotone identifier, assigned by the bus. Zero until
    /// published; every group in one fan-out sees the same value.
    pub id: u64,
    /// Construction time, monotonic. Used for publish-to-poll latency.
    pub timestamp: Instant,
}

impl Event {
    /// Creates an event bound to `topic`, timestamped now.
    #[must_use]
    pub fn new(topic: TopicName, payload: impl Into<String>) -> Self {
        Self {
            topic,
            payload: payload.into(),
            id: 0,
            timestamp: Instant::now(),
        }
    }
}
