// Copyright The Ebus Authors
// SPDX-License-Identifier: Apache-2.0

//! Minimal round trip: one topic, one group, one consumer.
//!
//! Publishes a handful of events and prints the publish-to-poll latency each
//! event observed, derived from its construction timestamp.

use ebus_config::{EventBusConfig, TopicName};
use ebus_engine::{Event, EventBus};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = EventBusConfig::from_json_str(
        r#"{
            "topics": [{ "name": "notifications", "partition_count": 1 }],
            "consumer_groups": [
                { "group_id": "notification_handlers", "topic_name": "notifications" }
            ]
        }"#,
    )?;

    let bus = EventBus::new(config)?;
    let mut consumers = bus.take_consumers();
    let handler = &mut consumers
        .get_mut("notification_handlers")
        .expect("group exists")[0];
    println!("consumer id: {}", handler.id());

    let topic = TopicName::parse("notifications")?;
    for i in 0..10 {
        let event = Event::new(topic.clone(), format!("message {i}: hello"));
        let accepted = bus.publish(event)?;
        println!("published message {i} (accepted: {accepted})");
    }

    for event in handler.poll_batch(10) {
        println!(
            "received id={} payload={:?} latency={:?}",
            event.id,
            event.payload,
            event.timestamp.elapsed()
        );
    }

    Ok(())
}
