// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for resource cache housekeeping.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// Least-recently-used entry dropped to stay within capacity.
///
/// # Log Level
/// `debug!`
pub struct CacheEntryEvicted<'a> {
    pub key: &'a str,
    pub capacity: usize,
}

impl Display for CacheEntryEvicted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Evicted cache entry '{}' (capacity {})", self.key, self.capacity)
    }
}

impl StructuredLog for CacheEntryEvicted<'_> {
    fn log(&self) {
        tracing::debug!(key = self.key, capacity = self.capacity, "{}", self);
    }
}

/// Entry found past its time-to-live and purged.
///
/// # Log Level
/// `trace!`
pub struct CacheEntryExpired<'a> {
    pub key: &'a str,
}

impl Display for CacheEntryExpired<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cache entry '{}' expired", self.key)
    }
}

impl StructuredLog for CacheEntryExpired<'_> {
    fn log(&self) {
        tracing::trace!(key = self.key, "{}", self);
    }
}
