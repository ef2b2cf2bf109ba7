// crates/campaign-cli/src/audit.rs
// ============================================================================
// Module: Validation Event Sinks
// Description: JSON-line sinks for compile and response validation events.
// Purpose: Persist validation outcomes to stderr or an append-only file.
// Dependencies: campaign-config, campaign-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Each recorded [`ValidationEvent`] becomes one JSON line. Sinks never fail
//! validation: serialization and write errors drop the event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use campaign_config::EventSinkKind;
use campaign_config::EventsConfig;
use campaign_core::NoopEventSink;
use campaign_core::ValidationEvent;
use campaign_core::ValidationEventSink;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while opening an event sink.
#[derive(Debug, Error)]
pub enum EventSinkError {
    /// The event file could not be opened.
    #[error("event log io error: {0}")]
    Io(String),
    /// The file sink was selected without a path.
    #[error("event log path is not configured")]
    MissingPath,
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Writes events as JSON lines to standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrEventSink;

impl ValidationEventSink for StderrEventSink {
    fn record(&self, event: &ValidationEvent) {
        if let Ok(line) = serde_json::to_string(event) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{line}");
        }
    }
}

/// Appends events as JSON lines to a file.
#[derive(Debug)]
pub struct FileEventSink {
    /// Open handle in append mode.
    file: Mutex<File>,
}

impl FileEventSink {
    /// Opens or creates an event log for appending.
    ///
    /// # Errors
    ///
    /// Returns [`EventSinkError::Io`] when the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, EventSinkError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| EventSinkError::Io(err.to_string()))?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl ValidationEventSink for FileEventSink {
    fn record(&self, event: &ValidationEvent) {
        if let Ok(line) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{line}");
            let _ = file.flush();
        }
    }
}

// ============================================================================
// SECTION: Selection
// ============================================================================

/// Builds the sink selected by the events configuration.
///
/// # Errors
///
/// Returns [`EventSinkError`] when the file sink cannot be opened.
pub fn sink_from_config(
    config: &EventsConfig,
) -> Result<Arc<dyn ValidationEventSink>, EventSinkError> {
    match config.sink {
        EventSinkKind::None => Ok(Arc::new(NoopEventSink)),
        EventSinkKind::Stderr => Ok(Arc::new(StderrEventSink)),
        EventSinkKind::File => {
            let path = config.path().ok_or(EventSinkError::MissingPath)?;
            Ok(Arc::new(FileEventSink::open(path)?))
        }
    }
}
