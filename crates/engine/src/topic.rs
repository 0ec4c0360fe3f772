// Copyright The Ebus Authors
// SPDX-License-Identifier: Apache-2.0

//! Topic declarations and the build-time registry.
//!
//! Topics carry no queues; partition rings live inside each consumer group.
//! A topic owns only its partition count and the per-topic id counter. The
//! registry is mutated during bus construction and read-only afterwards, so
//! the publish path looks topics up without any lock.

use crate::error::Error;
use ebus_config::TopicName;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// A named channel split into `partition_count` independent ordered streams.
#[derive(Debug)]
pub struct Topic {
    name: TopicName,
    partition_count: usize,
    /// Per-topic id counter. Ids are FIFO within the topic; nothing is
    /// implied across topics.
    next_id: AtomicU64,
}

impl Topic {
    pub(crate) fn new(name: TopicName, partition_count: usize) -> Self {
        Self {
            name,
            partition_count,
            next_id: AtomicU64::new(0),
        }
    }

    /// Topic name.
    #[must_use]
    pub fn name(&self) -> &TopicName {
        &self.name
    }

    /// Number of partitions.
    #[must_use]
    pub fn partition_count(&self) -> usize {
        self.partition_count
    }

    /// Claims the next event id. Contended by every publisher of this topic.
    pub(crate) fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// Name-to-topic lookup, frozen once the bus is built.
#[derive(Debug, Default)]
pub(crate) struct TopicRegistry {
    topics: HashMap<TopicName, Topic>,
}

impl TopicRegistry {
    pub(crate) fn create_topic(
        &mut self,
        name: TopicName,
        partition_count: usize,
    ) -> Result<(), Error> {
        if partition_count == 0 {
            return Err(Error::InvalidConfig {
                reason: format!("topic `{name}` must have at least one partition"),
            });
        }
        if self.topics.contains_key(&name) {
            return Err(Error::TopicAlreadyExists { topic: name });
        }
        let _ = self
            .topics
            .insert(name.clone(), Topic::new(name, partition_count));
        Ok(())
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Topic> {
        self.topics.get(name)
    }
}
