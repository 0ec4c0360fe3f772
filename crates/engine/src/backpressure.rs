// Copyright The Ebus Authors
// SPDX-License-Identifier: Apache-2.0

//! Full-queue handling on the publish path.
//!
//! The handler is resolved from [`BackPressureConfig`] once at bus
//! construction; the publish path then runs a single match with no
//! configuration lookups. Only `block` and `yielding_spin` ever suspend the
//! publishing thread; `drop_newest` and a non-full `spin` never do.

use crate::ring::MpscRing;
use ebus_config::{BackPressureConfig, BackPressureStrategy};
use std::hint;
use std::thread;
use std::time::{Duration, Instant};

/// Applies the configured back-pressure strategy to ring enqueues.
#[derive(Debug, Clone)]
pub struct BackPressureHandler {
    strategy: BackPressureStrategy,
    spin_yield_threshold: u32,
    block_sleep: Duration,
    timeout: Duration,
}

impl BackPressureHandler {
    /// Resolves a handler from configuration.
    #[must_use]
    pub fn new(config: &BackPressureConfig) -> Self {
        Self {
            strategy: config.strategy,
            spin_yield_threshold: config.spin_yield_threshold,
            block_sleep: config.block_sleep,
            timeout: config.timeout,
        }
    }

    /// Enqueues `value` into `ring`, applying the full-queue strategy.
    ///
    /// Returns whether the value was enqueued. `false` means the value was
    /// dropped: immediately under `drop_newest`, or after `timeout` under the
    /// spin strategies. `block` never returns `false`.
    pub fn enqueue<T>(&self, ring: &MpscRing<T>, value: T) -> bool {
        match self.strategy {
            BackPressureStrategy::DropNewest => ring.push(value).is_ok(),
            BackPressureStrategy::Block => {
                let mut value = value;
                loop {
                    match ring.push(value) {
                        Ok(()) => return true,
                        Err(back) => {
                            value = back;
                            thread::sleep(self.block_sleep);
                        }
                    }
                }
            }
            BackPressureStrategy::Spin => {
                let deadline = Instant::now() + self.timeout;
                let mut value = value;
                loop {
                    match ring.push(value) {
                        Ok(()) => return true,
                        Err(back) => {
                            if Instant::now() >= deadline {
                                return false;
                            }
                            value = back;
                            hint::spin_loop();
                        }
                    }
                }
            }
            BackPressureStrategy::YieldingSpin => {
                let deadline = Instant::now() + self.timeout;
                let mut attempts = 0u32;
                let mut value = value;
                loop {
                    match ring.push(value) {
                        Ok(()) => return true,
                        Err(back) => {
                            if Instant::now() >= deadline {
                                return false;
                            }
                            value = back;
                            attempts += 1;
                            if attempts >= self.spin_yield_threshold {
                                thread::yield_now();
                                attempts = 0;
                            } else {
                                hint::spin_loop();
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn handler(strategy: BackPressureStrategy, timeout: Duration) -> BackPressureHandler {
        BackPressureHandler::new(&BackPressureConfig {
            strategy,
            timeout,
            ..BackPressureConfig::default()
        })
    }

    #[test]
    fn drop_newest_gives_up_immediately_on_full() {
        let ring = MpscRing::with_capacity(2);
        let bp = handler(BackPressureStrategy::DropNewest, Duration::from_secs(1));
        assert!(bp.enqueue(&ring, 1));
        assert!(bp.enqueue(&ring, 2));
        assert!(!bp.enqueue(&ring, 3));
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn drop_newest_on_a_single_slot_ring_keeps_one_in_flight() {
        let ring = MpscRing::with_capacity(1);
        let bp = handler(BackPressureStrategy::DropNewest, Duration::from_secs(1));
        assert!(bp.enqueue(&ring, 1));
        assert!(!bp.enqueue(&ring, 2));
        assert_eq!(ring.pop(), Some(1));
        assert!(bp.enqueue(&ring, 3));
        assert_eq!(ring.pop(), Some(3));
    }

    #[test]
    fn spin_times_out_on_a_stalled_consumer() {
        let ring = MpscRing::with_capacity(2);
        let bp = handler(BackPressureStrategy::Spin, Duration::from_millis(10));
        assert!(bp.enqueue(&ring, 1));
        assert!(bp.enqueue(&ring, 2));

        let start = Instant::now();
        assert!(!bp.enqueue(&ring, 3));
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn yielding_spin_times_out_on_a_stalled_consumer() {
        let ring = MpscRing::with_capacity(2);
        let bp = handler(BackPressureStrategy::YieldingSpin, Duration::from_millis(10));
        assert!(bp.enqueue(&ring, 1));
        assert!(bp.enqueue(&ring, 2));
        assert!(!bp.enqueue(&ring, 3));
    }

    /// Scenario:
    /// 1. Given a full two-slot ring and the `block` strategy.
    /// 2. When a consumer thread drains the ring shortly afterwards.
    /// 3. Then the blocked enqueue completes instead of dropping.
    #[test]
    fn block_waits_for_space_instead_of_dropping() {
        let ring = Arc::new(MpscRing::with_capacity(2));
        let bp = handler(BackPressureStrategy::Block, Duration::from_secs(1));
        assert!(bp.enqueue(&ring, 1));
        assert!(bp.enqueue(&ring, 2));

        let drainer = {
            let ring = Arc::clone(&ring);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                ring.pop()
            })
        };

        assert!(bp.enqueue(&ring, 3));
        assert_eq!(drainer.join().expect("drainer panicked"), Some(1));
        assert_eq!(ring.pop(), Some(2));
        assert_eq!(ring.pop(), Some(3));
    }
}
