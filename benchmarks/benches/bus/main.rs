// Copyright The Ebus Authors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end publish/drain benchmark across partition counts.
//!
//! One topic, one group with as many consumers as partitions, a ~50-byte
//! payload. Each iteration publishes a fixed batch and drains it completely,
//! so the measurement covers id stamping, partition selection, fan-out
//! enqueue, and the batched fair drain.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ebus_benchmarks::payload;
use ebus_config::{
    BackPressureConfig, ConsumerGroupConfig, EventBusConfig, GroupName, TopicConfig, TopicName,
};
use ebus_engine::{Event, EventBus};
use std::hint::black_box;

const MSG_COUNT: u64 = 4096;
const PARTITION_COUNTS: [usize; 4] = [1, 2, 4, 8];

fn bus_with_partitions(partitions: usize) -> EventBus {
    let config = EventBusConfig {
        topics: vec![TopicConfig {
            name: TopicName::parse("bench").expect("topic name should be valid"),
            partition_count: partitions,
        }],
        consumer_groups: vec![ConsumerGroupConfig {
            group_id: GroupName::parse("g").expect("group name should be valid"),
            topic_name: TopicName::parse("bench").expect("topic name should be valid"),
            consumer_count: partitions,
        }],
        partition_capacity: 8192,
        back_pressure: BackPressureConfig::default(),
    };
    EventBus::new(config).expect("benchmark bus construction failed")
}

fn bench_publish_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("bus_publish_drain");
    let _ = group.throughput(Throughput::Elements(MSG_COUNT));

    for &partitions in &PARTITION_COUNTS {
        let _ = group.bench_with_input(
            BenchmarkId::new("partitions", partitions),
            &partitions,
            |b, &partitions| {
                let bus = bus_with_partitions(partitions);
                let mut consumers = bus
                    .take_consumers()
                    .remove("g")
                    .expect("benchmark group missing");
                let topic = TopicName::parse("bench").expect("topic name should be valid");
                let body = payload(50);

                b.iter(|| {
                    for _ in 0..MSG_COUNT {
                        let accepted = bus
                            .publish(Event::new(topic.clone(), body.clone()))
                            .expect("benchmark publish failed");
                        assert!(accepted, "benchmark ring overflowed");
                    }
                    let mut drained = 0;
                    while drained < MSG_COUNT {
                        for consumer in &mut consumers {
                            let batch = consumer.poll_batch(256);
                            drained += batch.len() as u64;
                            let _ = black_box(batch);
                        }
                    }
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_publish_drain);
criterion_main!(benches);
