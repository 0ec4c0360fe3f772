// Copyright The Ebus Authors
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for the criterion benches.

/// Builds a payload of roughly `size` bytes, in the shape real events carry.
#[must_use]
pub fn payload(size: usize) -> String {
    "x".repeat(size)
}
