// Copyright The Ebus Authors
// SPDX-License-Identifier: Apache-2.0

//! Bounded lock-free multi-producer / single-consumer ring.
//!
//! Each slot carries its own sequence number, which encodes the slot's state
//! without a global lock:
//!
//! ```text
//!   sequence == pos          slot is empty, ready for the producer claiming pos
//!   sequence == pos + 1      slot is full, ready for the consumer at pos
//!   sequence == pos + C      slot was drained, ready for the producer at pos + C
//! ```
//!
//! Producers race on an unmasked `tail` cursor with a CAS; the physical slot
//! is `cursor & (capacity - 1)`. The consumer owns `head` exclusively, so the
//! dequeue side needs no CAS at all. Cursors are cache-padded so producer and
//! consumer traffic land on separate cache lines.
//!
//! # Single-slot rings
//!
//! At capacity 1 the encoding degenerates: `pos + 1` (full at round `k`) and
//! `pos + C` (drained, ready for round `k + 1`) are the same value, so the
//! sequence alone cannot tell a full slot from a drained one. The single-slot
//! path settles the ambiguity against the consumer cursor instead: the slot
//! is free for position `pos` only when `head` has caught up to `pos`. That
//! comparison also carries the drain's memory effects to the next producer,
//! which is why `head` is advanced with release ordering on this path (and
//! stays relaxed otherwise). Larger rings never read `head` on enqueue.
//!
//! # Safety conventions
//!
//! Slot payloads live in `UnsafeCell` and are coordinated entirely by the
//! sequence protocol: a producer writes a slot only after winning the CAS for
//! its position, and the consumer reads a slot only after observing the
//! published sequence with acquire ordering. [`MpscRing::pop`] must only ever
//! be called from one thread at a time; the engine guarantees this by giving
//! each ring's pop side to exactly one [`Consumer`](crate::Consumer), whose
//! poll method takes `&mut self`.

use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU64, Ordering};

struct Slot<T> {
    sequence: AtomicU64,
    value: UnsafeCell<Option<T>>,
}

/// A bounded MPSC queue with per-slot sequence numbers.
///
/// `push` is callable from any number of threads; `pop` from exactly one.
/// Neither blocks and neither allocates.
pub struct MpscRing<T> {
    slots: Box<[Slot<T>]>,
    index_mask: u64,
    /// Consumer cursor. Written only by the consumer thread.
    head: CachePadded<AtomicU64>,
    /// Producer cursor. Claimed by CAS.
    tail: CachePadded<AtomicU64>,
}

// SAFETY: slot payloads are moved in by exactly one producer (the CAS winner
// for that position) and moved out by the single consumer, never aliased.
// The sequence protocol publishes writes with release stores observed by
// acquire loads, so `T: Send` is sufficient for both impls.
unsafe impl<T: Send> Send for MpscRing<T> {}
unsafe impl<T: Send> Sync for MpscRing<T> {}

impl<T> MpscRing<T> {
    /// Creates a ring with the given capacity.
    ///
    /// Capacity 1 is the degenerate bound: one in-flight value at a time,
    /// with the second enqueue refused until the first is drained (see the
    /// module docs for how that case is disambiguated).
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of two (zero included).
    /// Configuration validation rejects such capacities before a bus ever
    /// constructs a ring.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity.is_power_of_two(),
            "ring capacity must be a power of two"
        );

        let slots = (0..capacity as u64)
            .map(|i| Slot {
                sequence: AtomicU64::new(i),
                value: UnsafeCell::new(None),
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            slots,
            index_mask: capacity as u64 - 1,
            head: CachePadded::new(AtomicU64::new(0)),
            tail: CachePadded::new(AtomicU64::new(0)),
        }
    }

    /// Attempts to enqueue a value. On a full ring the value is handed back.
    ///
    /// Callable concurrently from any number of producer threads. Lock-free:
    /// a producer retries only when another producer won its position.
    pub fn push(&self, value: T) -> Result<(), T> {
        let mut pos = self.tail.load(Ordering::Relaxed);
        loop {
            let slot = &self.slots[(pos & self.index_mask) as usize];
            let sequence = slot.sequence.load(Ordering::Acquire);
            let diff = sequence.wrapping_sub(pos) as i64;

            if diff == 0 {
                // Single-slot ring: `sequence == pos` also describes a slot
                // still holding the previous value, so the consumer cursor
                // settles it. The acquire pairs with the release advance of
                // `head` in `pop`, publishing the drain to this producer.
                if self.index_mask == 0 && self.head.load(Ordering::Acquire) != pos {
                    return Err(value);
                }
                // Slot is ready for this position; try to claim it.
                match self.tail.compare_exchange_weak(
                    pos,
                    pos + 1,
                    Ordering::AcqRel,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: winning the CAS for `pos` grants exclusive
                        // write access to this slot until the release store
                        // below publishes it.
                        unsafe {
                            *slot.value.get() = Some(value);
                        }
                        slot.sequence.store(pos + 1, Ordering::Release);
                        return Ok(());
                    }
                    // Lost the race; `pos` now holds the current tail.
                    Err(current) => pos = current,
                }
            } else if diff < 0 {
                // The consumer has not yet drained the slot a full lap back.
                return Err(value);
            } else {
                // Another producer claimed this position; refresh and retry.
                pos = self.tail.load(Ordering::Relaxed);
            }
        }
    }

    /// Dequeues the oldest value, or `None` when the ring is empty.
    ///
    /// Single-consumer contract: concurrent calls from multiple threads are
    /// not supported. See the module docs for how the engine enforces this.
    pub fn pop(&self) -> Option<T> {
        // Only the consumer thread writes `head`, so relaxed is enough here.
        let pos = self.head.load(Ordering::Relaxed);
        let slot = &self.slots[(pos & self.index_mask) as usize];
        let sequence = slot.sequence.load(Ordering::Acquire);

        if sequence != pos.wrapping_add(1) {
            // Empty, or a producer claimed the slot but has not published yet.
            return None;
        }

        // SAFETY: the acquire load above observed the producer's release
        // store for this position, so the payload is fully written and no
        // producer touches the slot until we release it below.
        let value = unsafe { (*slot.value.get()).take() };
        slot.sequence
            .store(pos.wrapping_add(self.capacity() as u64), Ordering::Release);
        if self.index_mask == 0 {
            // Single-slot producers synchronize on `head` (see `push`); this
            // store is what hands them the drained slot.
            self.head.store(pos + 1, Ordering::Release);
        } else {
            self.head.store(pos + 1, Ordering::Relaxed);
        }
        value
    }

    /// Total number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Approximate number of queued values. Exact only at quiescence.
    #[must_use]
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Relaxed);
        tail.saturating_sub(head) as usize
    }

    /// Whether the ring currently looks empty. Approximate under concurrency.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> std::fmt::Debug for MpscRing<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MpscRing")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
