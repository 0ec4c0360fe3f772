// Copyright The Ebus Authors
// SPDX-License-Identifier: Apache-2.0

use ebus_config::{ConfigError, GroupName, TopicName};

/// Errors produced by bus construction and the publish path.
///
/// Construction failures surface from [`EventBus::new`](crate::EventBus::new);
/// at runtime only an unknown topic is an error. A full queue or a topic with
/// no subscribers is reported as `Ok(false)` from publish, not as an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Publish targeted a topic that was never declared.
    #[error("topic `{topic}` does not exist")]
    TopicNotFound {
        /// Missing topic name.
        topic: TopicName,
    },
    /// Two topic declarations share a name.
    #[error("topic `{topic}` already exists")]
    TopicAlreadyExists {
        /// Duplicated topic name.
        topic: TopicName,
    },
    /// Two consumer groups share an id.
    #[error("consumer group `{group}` already exists")]
    GroupAlreadyExists {
        /// Duplicated group id.
        group: GroupName,
    },
    /// A consumer group subscribes to a topic that was never declared.
    #[error("topic `{topic}` does not exist for consumer group `{group}`")]
    TopicNotFoundForGroup {
        /// Subscribing group id.
        group: GroupName,
        /// Missing topic name.
        topic: TopicName,
    },
    /// A group reached finalization with no registered consumers.
    #[error("no consumers registered for group `{group}`")]
    NoConsumersRegistered {
        /// Group that cannot be finalized.
        group: GroupName,
    },
    /// A mutation was attempted on a group after finalization.
    #[error("consumer group `{group}` is already finalized")]
    GroupFinalized {
        /// Frozen group id.
        group: GroupName,
    },
    /// A configuration value failed structural validation.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with the value.
        reason: String,
    },
    /// Configuration loading or name parsing failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
