// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The dispatcher routes named operations to plugins and normalizes what
//! comes back.
//!
//! # Run Flow
//!
//! 1. **Reserved options**: `cache` and `timeout_ms` are pulled out of the
//!    caller's options and never reach the plugin
//! 2. **Resolve**: the registry hands out the memoized instance; a miss is
//!    `plugin-not-found` with no fallback
//! 3. **Validate**: remaining options are checked against the plugin's
//!    declared [`OptionSpec`](crate::options::OptionSpec)s
//! 4. **Cache lookup**: with `cache: true` a hit on the derived key returns
//!    the stored result without invoking the plugin, and re-pins it under its
//!    `result_id` so the returned id stays resolvable
//! 5. **Hooks**: the `pre_process` hook point may rewrite the input
//! 6. **Invoke**: the plugin runs in its own task, bounded by the timeout and
//!    by shutdown; a timed-out task is aborted and nothing is cached
//! 7. **Store**: successful results are cached under their `result_id` and,
//!    when caching was requested, under the derived key
//!
//! Failures are never retried here; plugin operations are not assumed idempotent.
//! Every failure is passed to the error hooks registered for its kind before it
//! is returned.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::cache::ResourceCache;
use crate::config::EngineSettings;
use crate::errors::{ErrorKind, ErrorRecord, Result};
use crate::observability::messages::dispatch::{
    CacheShortCircuit, DispatchCompleted, DispatchFailed, DispatchStarted, DispatchTimedOut,
    DispatcherShutdown,
};
use crate::observability::messages::StructuredLog;
use crate::observability::metrics::EngineMetrics;
use crate::options::{derive_cache_key, Options, TIMEOUT_OPTION};
use crate::registry::{ErrorHook, Hook, PluginDescriptor, PluginRegistry, PRE_PROCESS_HOOK};
use crate::result::{Payload, ProcessResult};
use crate::traits::{Plugin, PluginStatus, ResourceDescriptor};

/// Routes `run` calls to registered plugins.
///
/// A dispatcher owns its registry and cache; independent dispatchers share
/// nothing. It is safe to call from many tasks at once.
///
/// # Example
/// ```
/// use process_engine::engine::Dispatcher;
/// use process_engine::options::Options;
/// use process_engine::plugins::BuiltinPlugins;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dispatcher = Dispatcher::builder().build();
/// dispatcher.registry().discover(&BuiltinPlugins);
///
/// let result = dispatcher
///     .run("change_text_case", "hello", Options::new().with("case", "upper"))
///     .await?;
/// assert_eq!(result.data().as_text(), Some("HELLO"));
///
/// let again = dispatcher.get_resource_by_id(result.result_id())?;
/// assert_eq!(again, result);
/// # Ok(())
/// # }
/// ```
pub struct Dispatcher {
    registry: Arc<PluginRegistry>,
    cache: Arc<ResourceCache>,
    metrics: Arc<EngineMetrics>,
    default_timeout: Duration,
    shutdown: CancellationToken,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Dispatcher with an empty registry and a cache sized from `settings`.
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::builder().settings(settings).build()
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<ResourceCache> {
        &self.cache
    }

    /// Metrics shared with the cache.
    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Run `plugin_name` over `input`.
    ///
    /// # Errors
    /// * `service-unavailable` after [`shutdown`](Self::shutdown), including runs in flight
    /// * `validation` for malformed reserved options or options the plugin does not declare
    /// * `plugin-not-found` / `plugin-init-failure` from the registry
    /// * `timeout` when the plugin exceeds the effective timeout
    /// * `plugin-execution-failure` for anything the plugin reports, or a panic
    pub async fn run(
        &self,
        plugin_name: &str,
        input: impl Into<Payload>,
        options: Options,
    ) -> Result<Arc<ProcessResult>> {
        let input = input.into();
        let started = DispatchStarted {
            plugin: plugin_name,
            input_size: input.len(),
            option_count: options.len(),
        };
        let span = started.span("run");
        started.log();
        self.metrics.record_run(plugin_name);
        let start_time = Instant::now();

        let outcome = self.dispatch(plugin_name, input, options).instrument(span).await;
        self.metrics
            .record_duration(plugin_name, start_time.elapsed().as_secs_f64());
        if let Err(error) = &outcome {
            DispatchFailed {
                plugin: plugin_name,
                error,
            }
            .log();
            self.metrics.record_failure(plugin_name, error.kind());
            self.registry.hooks().call_error_hooks(error);
        }
        outcome
    }

    async fn dispatch(&self, plugin_name: &str, input: Payload, options: Options) -> Result<Arc<ProcessResult>> {
        self.ensure_running()?;

        let (controls, options) = options.split_reserved()?;
        let plugin = self.registry.resolve(plugin_name)?;
        options.validate(plugin_name, &plugin.option_specs())?;

        let cache_key = controls
            .cache
            .then(|| derive_cache_key(plugin_name, &input, &options));
        if let Some(key) = &cache_key {
            if let Some(hit) = self.cache.get(key) {
                CacheShortCircuit {
                    plugin: plugin_name,
                    cache_key: key,
                    result_id: hit.result_id(),
                }
                .log();
                // The `result_id` entry ages independently of the derived key.
                self.store(hit.result_id(), &hit)?;
                return Ok(hit);
            }
        }

        let input = self.registry.hooks().call(PRE_PROCESS_HOOK, input, &options);
        let timeout = controls.timeout.unwrap_or(self.default_timeout);
        let result = self.invoke(plugin_name, plugin, input, options, timeout).await?;

        let result = Arc::new(result);
        self.store(result.result_id(), &result)?;
        if let Some(key) = cache_key {
            self.store(key, &result)?;
        }
        Ok(result)
    }

    /// Cache `result` under `key` unless shutdown has begun. The check runs
    /// under the cache lock, so a concurrent `shutdown` cannot clear the cache
    /// between the check and the insert.
    fn store(&self, key: impl Into<String>, result: &Arc<ProcessResult>) -> Result<()> {
        let shutdown = &self.shutdown;
        if self.cache.put_if(key, result.clone(), None, || !shutdown.is_cancelled()) {
            Ok(())
        } else {
            Err(shutting_down())
        }
    }

    async fn invoke(
        &self,
        plugin_name: &str,
        plugin: Arc<dyn Plugin>,
        input: Payload,
        options: Options,
        timeout: Duration,
    ) -> Result<ProcessResult> {
        let redacted = options.redacted();
        let start_time = Instant::now();
        let mut task = tokio::spawn(async move { plugin.process(input, options).await });

        let joined = tokio::select! {
            joined = &mut task => joined,
            _ = tokio::time::sleep(timeout) => {
                task.abort();
                DispatchTimedOut { plugin: plugin_name, timeout }.log();
                self.metrics.record_timeout(plugin_name);
                return Err(ErrorRecord::timeout(format!(
                    "plugin '{}' did not finish within {} ms",
                    plugin_name,
                    timeout.as_millis()
                ))
                .with_detail("plugin", plugin_name)
                .with_detail(TIMEOUT_OPTION, timeout.as_millis() as u64));
            }
            _ = self.shutdown.cancelled() => {
                task.abort();
                return Err(shutting_down());
            }
        };

        // Shutdown may have begun while the task was finishing.
        self.ensure_running()?;

        match joined {
            Ok(Ok(result)) => {
                DispatchCompleted {
                    plugin: plugin_name,
                    result_id: result.result_id(),
                    output_size: result.data().len(),
                    duration: start_time.elapsed(),
                }
                .log();
                Ok(result)
            }
            Ok(Err(error)) => Err(ErrorRecord::plugin_execution(
                plugin_name,
                format!("plugin '{}' failed: {}", plugin_name, error.message()),
            )
            .with_detail("options", redacted)
            .with_cause(error)),
            Err(join_error) => Err(ErrorRecord::plugin_execution(
                plugin_name,
                format!("plugin '{}' crashed: {}", plugin_name, join_error),
            )
            .with_detail("options", redacted)
            .with_cause(join_error)),
        }
    }

    /// A previously produced result, by its `result_id` (or derived cache key).
    ///
    /// # Errors
    /// `not-found` when the result was never produced, was evicted or expired.
    pub fn get_resource_by_id(&self, result_id: &str) -> Result<Arc<ProcessResult>> {
        self.ensure_running()?;
        self.cache.get(result_id).ok_or_else(|| {
            ErrorRecord::not_found(format!("no result with id '{}'", result_id))
                .with_detail("result_id", result_id)
        })
    }

    /// Registered plugins in registration order.
    pub fn list_plugins(&self) -> Vec<PluginDescriptor> {
        self.registry.list_all()
    }

    /// `status()` of every plugin that can be resolved, in registration order.
    pub fn plugin_statuses(&self) -> IndexMap<String, PluginStatus> {
        self.registry
            .names()
            .into_iter()
            .filter_map(|name| {
                let plugin = self.registry.resolve(&name).ok()?;
                Some((name, plugin.status()))
            })
            .collect()
    }

    pub fn list_resources(&self, plugin_name: &str) -> Result<Vec<ResourceDescriptor>> {
        self.ensure_running()?;
        Ok(self.registry.resolve(plugin_name)?.list_resources())
    }

    pub fn get_plugin_resource(&self, plugin_name: &str, resource_id: &str) -> Result<ResourceDescriptor> {
        self.ensure_running()?;
        self.registry
            .resolve(plugin_name)?
            .get_resource(resource_id)
            .map_err(|error| error.with_detail("plugin", plugin_name))
    }

    /// Stop accepting work, fail in-flight runs, and release every plugin and cached result.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        let plugins_cleared = self.registry.clear();
        let results_cleared = self.cache.clear();
        DispatcherShutdown {
            plugins_cleared,
            results_cleared,
        }
        .log();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn ensure_running(&self) -> Result<()> {
        if self.is_shut_down() {
            return Err(shutting_down());
        }
        Ok(())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("cache", &self.cache)
            .field("default_timeout", &self.default_timeout)
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

fn shutting_down() -> ErrorRecord {
    ErrorRecord::service_unavailable("dispatcher is shut down")
}

/// Builder for [`Dispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    settings: EngineSettings,
    registry: Option<Arc<PluginRegistry>>,
    cache: Option<Arc<ResourceCache>>,
    hooks: Vec<(String, Hook)>,
    error_hooks: Vec<(ErrorKind, ErrorHook)>,
}

impl DispatcherBuilder {
    /// Timeout and cache sizing come from `settings`.
    pub fn settings(mut self, settings: &EngineSettings) -> Self {
        self.settings = settings.clone();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    pub fn cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.settings.cache_capacity = capacity;
        self
    }

    pub fn cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.settings.cache_ttl = ttl;
        self
    }

    /// Use an existing registry instead of an empty one.
    pub fn registry(mut self, registry: Arc<PluginRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use an existing cache; cache settings are then ignored.
    pub fn cache(mut self, cache: Arc<ResourceCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn hook(mut self, hook_point: impl Into<String>, hook: Hook) -> Self {
        self.hooks.push((hook_point.into(), hook));
        self
    }

    /// Called with every failed run whose error is of `kind`.
    pub fn error_hook(mut self, kind: ErrorKind, hook: ErrorHook) -> Self {
        self.error_hooks.push((kind, hook));
        self
    }

    pub fn build(self) -> Dispatcher {
        let registry = self.registry.unwrap_or_default();
        for (hook_point, hook) in self.hooks {
            registry.hooks().register(hook_point, hook);
        }
        for (kind, hook) in self.error_hooks {
            registry.hooks().register_error_hook(kind, hook);
        }

        let settings = self.settings;
        let cache = self.cache.unwrap_or_else(|| {
            Arc::new(ResourceCache::new(settings.cache_capacity).with_default_ttl(settings.cache_ttl))
        });
        let metrics = cache.metrics().clone();

        Dispatcher {
            registry,
            cache,
            metrics,
            default_timeout: settings.timeout,
            shutdown: CancellationToken::new(),
        }
    }
}
