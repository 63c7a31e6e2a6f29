// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Named hook points, plus error hooks keyed by [`ErrorKind`].
//!
//! Hooks run in registration order. Each may hand back a replacement payload.
//! A failing hook is logged and skipped; it never fails the surrounding call.
//! Error hooks observe a failed run after it has been classified and cannot
//! change its outcome.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::errors::{ErrorKind, ErrorRecord, Result};
use crate::observability::messages::dispatch::HookFailed;
use crate::observability::messages::StructuredLog;
use crate::options::Options;
use crate::result::Payload;

/// Hook point invoked on the input before a plugin runs.
pub const PRE_PROCESS_HOOK: &str = "pre_process";

/// `Ok(Some(payload))` replaces the input, `Ok(None)` leaves it untouched.
pub type Hook = Arc<dyn Fn(&Payload, &Options) -> Result<Option<Payload>> + Send + Sync>;

/// Called with the error a run is about to return.
pub type ErrorHook = Arc<dyn Fn(&ErrorRecord) -> Result<()> + Send + Sync>;

#[derive(Default)]
pub struct HookRegistry {
    hooks: RwLock<IndexMap<String, Vec<Hook>>>,
    error_hooks: RwLock<IndexMap<ErrorKind, Vec<ErrorHook>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, hook_point: impl Into<String>, hook: Hook) {
        self.hooks.write().entry(hook_point.into()).or_default().push(hook);
    }

    /// Thread `input` through every hook registered at `hook_point`.
    pub fn call(&self, hook_point: &str, input: Payload, options: &Options) -> Payload {
        let hooks: Vec<Hook> = match self.hooks.read().get(hook_point) {
            Some(hooks) => hooks.clone(),
            None => return input,
        };

        hooks
            .iter()
            .enumerate()
            .fold(input, |current, (position, hook)| match hook(&current, options) {
                Ok(Some(replacement)) => replacement,
                Ok(None) => current,
                Err(error) => {
                    HookFailed {
                        hook_point,
                        position,
                        error: &error,
                    }
                    .log();
                    current
                }
            })
    }

    pub fn count(&self, hook_point: &str) -> usize {
        self.hooks.read().get(hook_point).map_or(0, Vec::len)
    }

    pub fn register_error_hook(&self, kind: ErrorKind, hook: ErrorHook) {
        self.error_hooks.write().entry(kind).or_default().push(hook);
    }

    /// Run every error hook registered for `error.kind()`.
    pub fn call_error_hooks(&self, error: &ErrorRecord) {
        let kind = error.kind();
        let hooks: Vec<ErrorHook> = match self.error_hooks.read().get(&kind) {
            Some(hooks) => hooks.clone(),
            None => return,
        };

        for (position, hook) in hooks.iter().enumerate() {
            if let Err(hook_error) = hook(error) {
                HookFailed {
                    hook_point: kind.name(),
                    position,
                    error: &hook_error,
                }
                .log();
            }
        }
    }

    pub fn error_hook_count(&self, kind: ErrorKind) -> usize {
        self.error_hooks.read().get(&kind).map_or(0, Vec::len)
    }

    pub fn clear(&self) {
        self.hooks.write().clear();
        self.error_hooks.write().clear();
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: IndexMap<String, usize> = self
            .hooks
            .read()
            .iter()
            .map(|(point, hooks)| (point.clone(), hooks.len()))
            .collect();
        let error_counts: IndexMap<&str, usize> = self
            .error_hooks
            .read()
            .iter()
            .map(|(kind, hooks)| (kind.name(), hooks.len()))
            .collect();
        f.debug_struct("HookRegistry")
            .field("hooks", &counts)
            .field("error_hooks", &error_counts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_hooks_run_in_order_and_skip_failures() {
        let hooks = HookRegistry::new();
        hooks.register(
            PRE_PROCESS_HOOK,
            Arc::new(|input: &Payload, _: &Options| -> Result<Option<Payload>> {
                Ok(input.as_text().map(|text| Payload::from(text.trim())))
            }),
        );
        hooks.register(
            PRE_PROCESS_HOOK,
            Arc::new(|_: &Payload, _: &Options| -> Result<Option<Payload>> {
                Err(ErrorRecord::processing("hook exploded"))
            }),
        );
        hooks.register(
            PRE_PROCESS_HOOK,
            Arc::new(|input: &Payload, _: &Options| -> Result<Option<Payload>> {
                Ok(input.as_text().map(|text| Payload::from(format!("{}!", text))))
            }),
        );

        let output = hooks.call(PRE_PROCESS_HOOK, Payload::from("  hi  "), &Options::new());
        assert_eq!(output, Payload::from("hi!"));
        assert_eq!(hooks.count(PRE_PROCESS_HOOK), 3);
    }

    #[test]
    fn test_unknown_hook_point_is_identity() {
        let hooks = HookRegistry::new();
        let output = hooks.call("post_process", Payload::from("same"), &Options::new());
        assert_eq!(output, Payload::from("same"));
        assert_eq!(hooks.count("post_process"), 0);
    }

    #[test]
    fn test_error_hooks_fire_only_for_their_kind() {
        let hooks = HookRegistry::new();
        let timeouts = Arc::new(AtomicUsize::new(0));

        let counter = timeouts.clone();
        hooks.register_error_hook(
            ErrorKind::Timeout,
            Arc::new(move |error: &ErrorRecord| -> Result<()> {
                assert_eq!(error.kind(), ErrorKind::Timeout);
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );
        hooks.register_error_hook(
            ErrorKind::Timeout,
            Arc::new(|_: &ErrorRecord| -> Result<()> { Err(ErrorRecord::processing("hook exploded")) }),
        );
        let counter = timeouts.clone();
        hooks.register_error_hook(
            ErrorKind::Timeout,
            Arc::new(move |_: &ErrorRecord| -> Result<()> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );

        hooks.call_error_hooks(&ErrorRecord::validation("not mine"));
        assert_eq!(timeouts.load(Ordering::SeqCst), 0);

        hooks.call_error_hooks(&ErrorRecord::timeout("too slow"));
        assert_eq!(timeouts.load(Ordering::SeqCst), 2);
        assert_eq!(hooks.error_hook_count(ErrorKind::Timeout), 3);

        hooks.clear();
        assert_eq!(hooks.error_hook_count(ErrorKind::Timeout), 0);
    }
}
