// Copyright The Ebus Authors
// SPDX-License-Identifier: Apache-2.0

//! A lock-free in-process publish/subscribe event bus.
//!
//! Topics are partitioned into independent ordered streams; consumer groups
//! fan the stream out, with each group receiving every event exactly once
//! and spreading partitions across its consumers. Delivery runs through
//! bounded MPSC rings coordinated by per-slot sequence numbers -- no locks
//! anywhere on the publish or poll path.
//!
//! The topology is declared up front in an
//! [`EventBusConfig`](ebus_config::EventBusConfig) and frozen at
//! construction. Publishing is wait-free for the `drop_newest` back-pressure
//! strategy and bounded for the spin strategies; consuming is a non-blocking
//! batched drain.
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use ebus_config::{EventBusConfig, TopicName};
//! use ebus_engine::{Event, EventBus};
//!
//! let config = EventBusConfig::from_json_str(
//!     r#"{
//!         "topics": [{ "name": "notifications" }],
//!         "consumer_groups": [
//!             { "group_id": "handlers", "topic_name": "notifications" }
//!         ]
//!     }"#,
//! )?;
//!
//! let bus = EventBus::new(config)?;
//! let mut consumers = bus.take_consumers();
//! let handler = &mut consumers.get_mut("handlers").expect("group exists")[0];
//!
//! let topic = TopicName::parse("notifications")?;
//! assert!(bus.publish(Event::new(topic, "hello"))?);
//!
//! let batch = handler.poll_batch(16);
//! assert_eq!(batch.len(), 1);
//! assert_eq!(batch[0].payload, "hello");
//! # Ok(())
//! # }
//! ```
//!
//! # Threading model
//!
//! Plain OS threads. Any number of threads may publish through a shared
//! `&EventBus`; each [`Consumer`] is an owned value polled via `&mut self`
//! by exactly one thread at a time, which is what keeps every partition
//! ring's dequeue side single-consumer.

mod backpressure;
mod bus;
mod consumer;
mod error;
mod event;
mod group;
mod ring;
mod topic;


pub use backpressure::BackPressureHandler;
pub use bus::EventBus;
pub use consumer::Consumer;
pub use error::Error;
pub use event::Event;
pub use ring::MpscRing;
pub use topic::Topic;
