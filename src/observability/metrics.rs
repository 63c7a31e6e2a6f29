// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Engine metrics in Prometheus format.
//!
//! One [`EngineMetrics`] is shared by a dispatcher and its cache. Exposing
//! [`encode`](EngineMetrics::encode) over a transport is left to the embedder.

use prometheus_client::encoding::{text::encode, EncodeLabelSet};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

use crate::errors::ErrorKind;

const METRICS_PREFIX: &str = "process_engine";

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct PluginLabels {
    pub plugin: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct FailureLabels {
    pub plugin: String,
    pub kind: String,
}

pub struct EngineMetrics {
    registry: Registry,

    /// `run` calls by plugin name.
    pub runs: Family<PluginLabels, Counter>,

    /// Failed `run` calls by plugin name and error kind.
    pub failures: Family<FailureLabels, Counter>,

    /// Runs abandoned at their timeout.
    pub timeouts: Family<PluginLabels, Counter>,

    /// Wall time of `run`, successful or not.
    pub dispatch_duration_seconds: Family<PluginLabels, Histogram>,

    pub cache_hits: Counter,
    pub cache_misses: Counter,
    pub cache_evictions: Counter,

    /// Entries currently held by the cache.
    pub cache_entries: Gauge,
}

impl EngineMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix(METRICS_PREFIX);

        let runs = Family::<PluginLabels, Counter>::default();
        registry.register("runs", "Plugin runs dispatched", runs.clone());

        let failures = Family::<FailureLabels, Counter>::default();
        registry.register("failures", "Plugin runs that failed, by error kind", failures.clone());

        let timeouts = Family::<PluginLabels, Counter>::default();
        registry.register("timeouts", "Plugin runs abandoned at their timeout", timeouts.clone());

        let dispatch_duration_seconds = Family::<PluginLabels, Histogram>::new_with_constructor(|| {
            Histogram::new(exponential_buckets(0.001, 2.0, 16))
        });
        registry.register(
            "dispatch_duration_seconds",
            "Plugin run duration in seconds",
            dispatch_duration_seconds.clone(),
        );

        let cache_hits = Counter::default();
        registry.register("cache_hits", "Result cache hits", cache_hits.clone());

        let cache_misses = Counter::default();
        registry.register("cache_misses", "Result cache misses", cache_misses.clone());

        let cache_evictions = Counter::default();
        registry.register(
            "cache_evictions",
            "Results evicted to stay within capacity",
            cache_evictions.clone(),
        );

        let cache_entries = Gauge::default();
        registry.register("cache_entries", "Results currently cached", cache_entries.clone());

        Self {
            registry,
            runs,
            failures,
            timeouts,
            dispatch_duration_seconds,
            cache_hits,
            cache_misses,
            cache_evictions,
            cache_entries,
        }
    }

    pub fn record_run(&self, plugin: &str) {
        self.runs.get_or_create(&plugin_labels(plugin)).inc();
    }

    pub fn record_failure(&self, plugin: &str, kind: ErrorKind) {
        let labels = FailureLabels {
            plugin: plugin.to_string(),
            kind: kind.name().to_string(),
        };
        self.failures.get_or_create(&labels).inc();
    }

    pub fn record_timeout(&self, plugin: &str) {
        self.timeouts.get_or_create(&plugin_labels(plugin)).inc();
    }

    pub fn record_duration(&self, plugin: &str, duration_secs: f64) {
        self.dispatch_duration_seconds
            .get_or_create(&plugin_labels(plugin))
            .observe(duration_secs);
    }

    pub fn record_cache_lookup(&self, hit: bool) {
        if hit {
            self.cache_hits.inc();
        } else {
            self.cache_misses.inc();
        }
    }

    pub fn record_eviction(&self) {
        self.cache_evictions.inc();
    }

    pub fn set_cache_entries(&self, entries: usize) {
        self.cache_entries.set(i64::try_from(entries).unwrap_or(i64::MAX));
    }

    /// Counter value for `plugin`, zero when it never ran.
    pub fn run_count(&self, plugin: &str) -> u64 {
        self.runs.get_or_create(&plugin_labels(plugin)).get()
    }

    pub fn failure_count(&self, plugin: &str, kind: ErrorKind) -> u64 {
        let labels = FailureLabels {
            plugin: plugin.to_string(),
            kind: kind.name().to_string(),
        };
        self.failures.get_or_create(&labels).get()
    }

    pub fn timeout_count(&self, plugin: &str) -> u64 {
        self.timeouts.get_or_create(&plugin_labels(plugin)).get()
    }

    /// Prometheus text exposition of every metric.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        // Writing into a String cannot fail.
        let _ = encode(&mut buffer, &self.registry);
        buffer
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EngineMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineMetrics").finish()
    }
}

fn plugin_labels(plugin: &str) -> PluginLabels {
    PluginLabels {
        plugin: plugin.to_string(),
    }
}
