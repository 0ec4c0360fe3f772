// Copyright The Ebus Authors
// SPDX-License-Identifier: Apache-2.0

//! Configuration model for the ebus in-process event bus.
//!
//! This crate holds only data definitions and their validation -- no runtime
//! behavior. The engine crate consumes an [`EventBusConfig`] once at
//! construction time and freezes the resulting topology.
//!
//! # Names
//!
//! Topic and consumer-group names are validated newtypes ([`TopicName`],
//! [`GroupName`]). They parse from plain strings (`TopicName::parse("orders")`)
//! and deserialize with the same validation applied, so a config file with an
//! empty or whitespace-ridden name is rejected at load time rather than at
//! first use.

mod backpressure;
mod bus;

pub use backpressure::{BackPressureConfig, BackPressureStrategy};
pub use bus::{ConsumerGroupConfig, EventBusConfig, TopicConfig};

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Errors produced while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A topic or group name failed validation.
    #[error("invalid {kind} name `{value}`: {reason}")]
    InvalidName {
        /// What the name was for ("topic" or "group").
        kind: &'static str,
        /// The rejected raw value.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// Reading a configuration file failed.
    #[error("failed to read config file `{path}`: {source}")]
    Io {
        /// Path that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Parsing configuration JSON failed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

fn validate_name(kind: &'static str, raw: &str) -> Result<Arc<str>, ConfigError> {
    if raw.is_empty() {
        return Err(ConfigError::InvalidName {
            kind,
            value: raw.to_owned(),
            reason: "name must not be empty",
        });
    }
    if raw.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidName {
            kind,
            value: raw.to_owned(),
            reason: "name must not contain whitespace",
        });
    }
    Ok(Arc::from(raw))
}

macro_rules! name_newtype {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Arc<str>);

        impl $name {
            /// Parses and validates a raw string.
            pub fn parse(raw: &str) -> Result<Self, ConfigError> {
                validate_name($kind, raw).map(Self)
            }

            /// Returns the name as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        // Hashes identically to the inner string, so string slices can key
        // map lookups directly.
        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ConfigError;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                Self::parse(&raw)
            }
        }

        impl From<$name> for String {
            fn from(name: $name) -> String {
                name.0.to_string()
            }
        }

        impl JsonSchema for $name {
            fn schema_name() -> String {
                stringify!($name).to_owned()
            }

            fn json_schema(generator: &mut SchemaGenerator) -> Schema {
                String::json_schema(generator)
            }
        }
    };
}

name_newtype!(
    /// A validated topic name. Cheap to clone (shared allocation).
    TopicName,
    "topic"
);

name_newtype!(
    /// A validated consumer-group identifier. Cheap to clone (shared allocation).
    GroupName,
    "group"
);
