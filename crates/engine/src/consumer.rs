// Copyright The Ebus Authors
// SPDX-License-Identifier: Apache-2.0

//! Consumer-side batched drain.
//!
//! A consumer owns the poll side of one or more partition rings of its group.
//! [`Consumer::poll_batch`] takes `&mut self`: a consumer value can only be
//! polled by whichever thread holds it, which is exactly the single-consumer
//! contract the rings require. Share the bus freely; do not share a consumer.

use crate::event::Event;
use crate::ring::MpscRing;
use std::sync::Arc;

/// An owned handle over a disjoint subset of a group's partition rings.
#[derive(Debug)]
pub struct Consumer {
    id: String,
    queues: Vec<Arc<MpscRing<Event>>>,
}

impl Consumer {
    pub(crate) fn new(id: String, queues: Vec<Arc<MpscRing<Event>>>) -> Self {
        Self { id, queues }
    }

    /// Consumer id, `"<group_id>/<index>"`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of partition rings assigned to this consumer. Zero for the
    /// surplus consumers of an over-provisioned group.
    #[must_use]
    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }

    /// Drains up to `max_events` events across the assigned rings.
    ///
    /// The budget is divided evenly: every ring may yield `max_events / Q`,
    /// and the first rings additionally compete for the `max_events % Q`
    /// remainder. A ring that runs dry early keeps its unused budget (it is
    /// not redistributed within this call), but a remainder bonus that went
    /// unused stays available to the rings after it. Batched per-ring
    /// draining keeps the memory-ordering traffic at one acquire per event
    /// while still preventing a hot ring from starving a cold one across
    /// successive calls.
    ///
    /// Never blocks; returns an empty vector when nothing is queued, when no
    /// rings are assigned, or when `max_events` is zero.
    pub fn poll_batch(&mut self, max_events: usize) -> Vec<Event> {
        if self.queues.is_empty() || max_events == 0 {
            return Vec::new();
        }

        // Reservation hint only; `len` is approximate under concurrency.
        let queued: usize = self.queues.iter().map(|q| q.len()).sum();
        let mut events = Vec::with_capacity(queued.min(max_events));
        let per_queue = max_events / self.queues.len();
        let mut remainder = max_events % self.queues.len();

        for queue in &self.queues {
            let bonus = usize::from(remainder > 0);
            let budget = per_queue + bonus;
            let mut taken = 0;
            while taken < budget {
                match queue.pop() {
                    Some(event) => {
                        events.push(event);
                        taken += 1;
                    }
                    None => break,
                }
            }
            // The bonus is only spent once a ring actually filled it.
            if bonus == 1 && taken == budget {
                remainder -= 1;
            }
        }
        events
    }
}
