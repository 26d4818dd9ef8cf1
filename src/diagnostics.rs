//! Diagnostics sink handed to every component.
//!
//! Components report through a [`Diagnostics`] trait object instead of calling
//! the `log` macros directly, so tests can capture exactly what was emitted.

use std::sync::Mutex;

/// Severity of a captured message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Receiver for run diagnostics. Shared between worker threads.
pub trait Diagnostics: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);

    /// Verbose output (tool reports). Dropped unless a sink cares.
    fn debug(&self, _message: &str) {}
}

/// Forwards to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn info(&self, message: &str) {
        log::info!("{message}");
    }

    fn warn(&self, message: &str) {
        log::warn!("{message}");
    }

    fn error(&self, message: &str) {
        log::error!("{message}");
    }

    fn debug(&self, message: &str) {
        log::debug!("{message}");
    }
}

/// Keeps every message in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    messages: Mutex<Vec<(Level, String)>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured messages.
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.lock().clone()
    }

    /// Captured messages at one level.
    pub fn at(&self, level: Level) -> Vec<String> {
        self.lock().iter().filter(|(l, _)| *l == level).map(|(_, m)| m.clone()).collect()
    }

    fn push(&self, level: Level, message: &str) {
        self.lock().push((level, message.to_string()));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Level, String)>> {
        // a panicking writer cannot leave the Vec half-updated
        self.messages.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}
