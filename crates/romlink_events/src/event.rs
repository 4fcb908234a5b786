//! Domain event types and severity levels
//!
//! This module defines the strongly-typed event system for the romlink
//! toolkit, organizing events by domain with optional key-value context for
//! additional ad-hoc information.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Severity levels for events, mapping to host-side verbosity settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Severity {
    /// Trace-level events (very chatty, per-descriptor)
    Trace,
    /// Debug-level events
    Debug,
    /// Info-level events (default)
    Info,
    /// Warning events
    Warn,
    /// Error events (all verbosity levels)
    Error,
}

impl Severity {
    /// Check if this severity should be shown at the given minimum level
    pub fn should_show(&self, min_level: Severity) -> bool {
        *self >= min_level
    }
}

/// Key-value context for ad-hoc event metadata
pub type Kv = HashMap<String, String>;

/// Core domain events for fundamental operations
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CoreEvent {
    /// Application or operation started
    Started {
        component: String,
        version: Option<String>,
    },

    /// Application or operation finished
    Finished {
        component: String,
        duration_ms: Option<u64>,
        success: bool,
    },

    /// Progress update
    Progress {
        operation: String,
        current: usize,
        total: Option<usize>,
        message: Option<String>,
    },

    /// Generic informational message
    Info { message: String },

    /// Warning that doesn't stop operation
    Warning { code: String, message: String },

    /// Error that stops operation
    Error { error: Error },
}

/// Descriptor domain events for asset text parsing
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DescriptorEvent {
    /// A descriptor file was scanned for references
    Parsed {
        path: String,
        sub_objects: usize,
        links: usize,
    },

    /// Descriptor warning (non-fatal, e.g. unreadable sidecar)
    Warning { code: String, message: String },
}

/// Analyzer domain events for the inclusion analysis lifecycle
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnalyzerEvent {
    /// Analysis run started with the number of indexed asset paths
    Started { asset_count: usize },

    /// Trusted roots were collected
    RootsCollected { count: usize },

    /// One analysis pass completed
    PassCompleted { pass: String, records: usize },

    /// Worker suspended at a record boundary
    Suspended,

    /// Worker resumed
    Resumed,

    /// Run cancelled (refresh or dispose)
    Cancelled,

    /// Bundle overlay phase started
    BundlePhaseStarted { bundles: usize },

    /// Analysis run finished with statistics
    Finished { records: usize, duration_ms: u64 },
}

/// Top-level event wrapper organizing events by domain
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Event {
    Core(CoreEvent),
    Descriptor(DescriptorEvent),
    Analyzer(AnalyzerEvent),
}

impl Event {
    /// Get the domain name for this event
    pub fn domain(&self) -> &'static str {
        match self {
            Event::Core(_) => "core",
            Event::Descriptor(_) => "descriptor",
            Event::Analyzer(_) => "analyzer",
        }
    }

    /// Get a short name for the specific event
    pub fn event_name(&self) -> &'static str {
        match self {
            Event::Core(e) => match e {
                CoreEvent::Started { .. } => "started",
                CoreEvent::Finished { .. } => "finished",
                CoreEvent::Progress { .. } => "progress",
                CoreEvent::Info { .. } => "info",
                CoreEvent::Warning { .. } => "warning",
                CoreEvent::Error { .. } => "error",
            },
            Event::Descriptor(e) => match e {
                DescriptorEvent::Parsed { .. } => "parsed",
                DescriptorEvent::Warning { .. } => "warning",
            },
            Event::Analyzer(e) => match e {
                AnalyzerEvent::Started { .. } => "started",
                AnalyzerEvent::RootsCollected { .. } => "roots_collected",
                AnalyzerEvent::PassCompleted { .. } => "pass_completed",
                AnalyzerEvent::Suspended => "suspended",
                AnalyzerEvent::Resumed => "resumed",
                AnalyzerEvent::Cancelled => "cancelled",
                AnalyzerEvent::BundlePhaseStarted { .. } => "bundle_phase_started",
                AnalyzerEvent::Finished { .. } => "finished",
            },
        }
    }

    /// The default severity this event is published at
    pub fn default_severity(&self) -> Severity {
        match self {
            Event::Core(CoreEvent::Error { .. }) => Severity::Error,
            Event::Core(CoreEvent::Warning { .. }) => Severity::Warn,
            Event::Descriptor(DescriptorEvent::Warning { .. }) => Severity::Warn,
            Event::Descriptor(DescriptorEvent::Parsed { .. }) => Severity::Trace,
            Event::Core(CoreEvent::Progress { .. }) => Severity::Debug,
            _ => Severity::Info,
        }
    }
}

/// Metadata attached to every published event
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventMetadata {
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub context: Option<Kv>,
}

/// An event paired with its publication metadata
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventWithMetadata {
    pub event: Event,
    pub metadata: EventMetadata,
}

impl EventWithMetadata {
    /// Wrap an event with metadata stamped at the current time
    pub fn new(event: Event, severity: Severity, context: Option<Kv>) -> Self {
        Self {
            event,
            metadata: EventMetadata {
                severity,
                timestamp: Utc::now(),
                context,
            },
        }
    }
}
