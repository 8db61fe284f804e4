//! Threshold evaluation and the alert channel
//!
//! ## Rules
//!
//! ```text
//! load > 0.9         → CRITICAL
//! 0.7 < load <= 0.9  → WARNING
//! not available      → ERROR   (independent of the load band)
//! ```
//!
//! Only the highest load band fires, while the availability check always runs.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::monitors::resource::Resource;
use crate::sink::LineSink;

const CRITICAL_LOAD: f64 = 0.9;
const WARNING_LOAD: f64 = 0.7;

const HIGHLIGHT: &str = "\x1b[1;31m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Critical,
    Warning,
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Load band a sample falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadBand {
    Normal,
    Warning,
    Critical,
}

impl LoadBand {
    /// Classify a load value. Out-of-range values are classified like any
    /// other, and NaN is never above a threshold.
    pub fn evaluate(load: f64) -> LoadBand {
        if load > CRITICAL_LOAD {
            return LoadBand::Critical;
        }

        if load > WARNING_LOAD {
            return LoadBand::Warning;
        }

        LoadBand::Normal
    }
}

/// A triggered alert for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub severity: Severity,
    pub resource: String,
}

impl Alert {
    pub fn new(severity: Severity, resource: impl Into<String>) -> Self {
        Self {
            severity,
            resource: resource.into(),
        }
    }

    /// Human readable text without the severity prefix.
    pub fn description(&self) -> String {
        let name = &self.resource;
        match self.severity {
            Severity::Critical => format!("{name} load exceeds 90%!"),
            Severity::Warning => format!("{name} load exceeds 70%."),
            Severity::Error => format!("{name} is unavailable!"),
        }
    }

    pub fn event(&self) -> AlertEvent {
        AlertEvent {
            resource: self.resource.clone(),
            severity: self.severity,
            message: self.to_string(),
            timestamp: Utc::now(),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.description())
    }
}

/// Evaluate all alert rules against the current state of a resource.
///
/// The load alert (if any) always comes before the availability alert.
pub fn evaluate(resource: &Resource) -> Vec<Alert> {
    evaluate_state(resource.name(), resource.load(), resource.is_available())
}

pub fn evaluate_state(name: &str, load: f64, available: bool) -> Vec<Alert> {
    let mut alerts = Vec::with_capacity(2);

    match LoadBand::evaluate(load) {
        LoadBand::Critical => alerts.push(Alert::new(Severity::Critical, name)),
        LoadBand::Warning => alerts.push(Alert::new(Severity::Warning, name)),
        LoadBand::Normal => {}
    }

    if !available {
        alerts.push(Alert::new(Severity::Error, name));
    }

    alerts
}

/// Event published for every alert raised by the monitor.
///
/// Subscribers may lag and drop events; the alert channel itself is the
/// authoritative record.
#[derive(Debug, Clone)]
pub struct AlertEvent {
    pub resource: String,
    pub severity: Severity,
    /// Full alert text, e.g. `CRITICAL: Server A load exceeds 90%!`
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Writes highlighted alert lines to the error channel.
#[derive(Clone)]
pub struct AlertSink {
    sink: Arc<dyn LineSink>,
    color: bool,
}

impl AlertSink {
    pub fn new(sink: Arc<dyn LineSink>, color: bool) -> Self {
        Self { sink, color }
    }

    pub fn format_line(&self, message: &str) -> String {
        if self.color {
            format!("{HIGHLIGHT}ALERT: {message}{RESET}")
        } else {
            format!("ALERT: {message}")
        }
    }

    /// Append one alert line.
    pub fn alert(&self, message: &str) -> Result<()> {
        self.sink
            .write_line(&self.format_line(message))
            .context("failed to write alert")
    }
}

impl fmt::Debug for AlertSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertSink")
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}
