// Copyright The Ebus Authors
// SPDX-License-Identifier: Apache-2.0

//! Throughput across partition counts.
//!
//! Runs the same 10 000-event workload against 1, 4, and 8 partitions with
//! one consumer thread per partition, and prints events/second for each
//! configuration. Demonstrates how partitioning spreads the drain work.

use ebus_config::{
    BackPressureConfig, BackPressureStrategy, ConsumerGroupConfig, EventBusConfig, GroupName,
    TopicConfig, TopicName,
};
use ebus_engine::{Event, EventBus};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

const TOTAL_EVENTS: u64 = 10_000;

fn run(partitions: usize) -> Result<(), Box<dyn std::error::Error>> {
    let config = EventBusConfig {
        topics: vec![TopicConfig {
            name: TopicName::parse("load")?,
            partition_count: partitions,
        }],
        consumer_groups: vec![ConsumerGroupConfig {
            group_id: GroupName::parse("workers")?,
            topic_name: TopicName::parse("load")?,
            consumer_count: partitions,
        }],
        partition_capacity: 8192,
        back_pressure: BackPressureConfig {
            strategy: BackPressureStrategy::Block,
            ..BackPressureConfig::default()
        },
    };

    let bus = Arc::new(EventBus::new(config)?);
    let mut consumers = bus.take_consumers();
    let workers = consumers.remove("workers").expect("group exists");

    // Each consumer owns exactly one partition here, so round-robin by id
    // gives every consumer an equal share of the stream.
    let per_consumer = TOTAL_EVENTS / partitions as u64;
    let start = Instant::now();
    let drainers: Vec<_> = workers
        .into_iter()
        .map(|mut consumer| {
            thread::spawn(move || {
                let mut received = 0u64;
                while received < per_consumer {
                    received += consumer.poll_batch(256).len() as u64;
                }
                received
            })
        })
        .collect();

    let topic = TopicName::parse("load")?;
    for i in 0..TOTAL_EVENTS {
        let _ = bus.publish(Event::new(topic.clone(), format!("payload-{i}")))?;
    }

    let mut received = 0;
    for drainer in drainers {
        received += drainer.join().expect("drainer panicked");
    }
    let elapsed = start.elapsed();

    println!(
        "{partitions:2} partition(s): {received} events in {elapsed:?} ({:.0} events/s)",
        received as f64 / elapsed.as_secs_f64()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    for partitions in [1, 4, 8] {
        run(partitions)?;
    }
    Ok(())
}
