// Copyright The Ebus Authors
// SPDX-License-Identifier: Apache-2.0

//! Consumer groups: per-partition rings and their assignment to consumers.
//!
//! A group is built in two phases. While building, consumers are registered
//! in order and receive ids of the form `<group_id>/<index>`. Finalization
//! allocates one ring per partition, assigns ring `j` to consumer `j % k`
//! round-robin, hands back the owned [`Consumer`] values, and freezes the
//! group. After finalization the group only serves the publish path:
//! [`ConsumerGroup::deliver`] clones an event into one partition ring through
//! the back-pressure handler.
//!
//! Each ring is shared by exactly two owners: the group (publish side) and
//! one consumer (poll side). That pairing is what makes an MPSC queue the
//! right shape -- any thread may publish, but only the owning consumer ever
//! dequeues.

use crate::backpressure::BackPressureHandler;
use crate::consumer::Consumer;
use crate::error::Error;
use crate::event::Event;
use crate::ring::MpscRing;
use ebus_config::GroupName;
use std::sync::Arc;

/// A set of consumers that collectively receive every event published to
/// their topic exactly once per group.
#[derive(Debug)]
pub struct ConsumerGroup {
    group_id: GroupName,
    /// Partition count of the subscribed topic.
    partition_count: usize,
    partition_capacity: usize,
    /// One ring per partition. Empty until finalization.
    partition_rings: Vec<Arc<MpscRing<Event>>>,
    registered: usize,
    finalized: bool,
}

impl ConsumerGroup {
    pub(crate) fn new(
        group_id: GroupName,
        partition_count: usize,
        partition_capacity: usize,
    ) -> Self {
        Self {
            group_id,
            partition_count,
            partition_capacity,
            partition_rings: Vec::new(),
            registered: 0,
            finalized: false,
        }
    }

    /// Reserves the next consumer slot and returns its id
    /// (`"<group_id>/<index>"`). Legal only before finalization.
    pub(crate) fn register_consumer(&mut self) -> Result<String, Error> {
        if self.finalized {
            return Err(Error::GroupFinalized {
                group: self.group_id.clone(),
            });
        }
        let index = self.registered;
        self.registered += 1;
        Ok(format!("{}/{index}", self.group_id))
    }

    /// Allocates the partition rings, assigns them round-robin across the
    /// registered consumers, and freezes the group.
    ///
    /// With `k` consumers, consumer `i` receives rings `{ j : j % k == i }`.
    /// When there are more consumers than partitions, the surplus consumers
    /// end up with no rings; they are idle, not an error.
    pub(crate) fn finalize(&mut self) -> Result<Vec<Consumer>, Error> {
        if self.finalized {
            return Err(Error::GroupFinalized {
                group: self.group_id.clone(),
            });
        }
        if self.registered == 0 {
            return Err(Error::NoConsumersRegistered {
                group: self.group_id.clone(),
            });
        }

        let mut assignments: Vec<Vec<Arc<MpscRing<Event>>>> = vec![Vec::new(); self.registered];
        for partition in 0..self.partition_count {
            let ring = Arc::new(MpscRing::with_capacity(self.partition_capacity));
            self.partition_rings.push(Arc::clone(&ring));
            assignments[partition % self.registered].push(ring);
        }

        let consumers = assignments
            .into_iter()
            .enumerate()
            .map(|(index, queues)| Consumer::new(format!("{}/{index}", self.group_id), queues))
            .collect::<Vec<_>>();

        self.finalized = true;
        tracing::debug!(
            group = %self.group_id,
            partitions = self.partition_count,
            consumers = self.registered,
            "finalized consumer group"
        );
        Ok(consumers)
    }

    /// Clones `event` into the ring of `partition_index` through the
    /// back-pressure handler. Returns whether the ring accepted it.
    pub(crate) fn deliver(
        &self,
        event: &Event,
        partition_index: usize,
        back_pressure: &BackPressureHandler,
    ) -> bool {
        debug_assert!(self.finalized, "deliver on an unfinalized group");
        back_pressure.enqueue(&self.partition_rings[partition_index], event.clone())
    }
}
