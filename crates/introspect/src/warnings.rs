//! Injectable sink for non-fatal diagnostics.
//!
//! The parser, registry and decoder never write warnings to a global stream.
//! They receive a [`WarningSink`] at construction and report through it.

use std::sync::{Arc, Mutex};

/// Receiver for warnings raised while parsing or decoding.
pub trait WarningSink: Send + Sync {
    fn warn(&self, message: &str);
}

/// Forwards warnings to `tracing::warn!`. The default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

/// Discards every warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl WarningSink for NoopSink {
    fn warn(&self, _message: &str) {}
}

/// Keeps warnings in memory so callers can inspect them afterwards.
#[derive(Debug, Default)]
pub struct CollectingSink {
    messages: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the warnings received so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    /// Remove and return every collected warning.
    pub fn take(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|mut messages| std::mem::take(&mut *messages))
            .unwrap_or_default()
    }
}

impl WarningSink for CollectingSink {
    fn warn(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

/// Shared handle to the default sink.
pub fn default_sink() -> Arc<dyn WarningSink> {
    Arc::new(TracingSink)
}
