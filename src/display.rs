//! Tabular status output
//!
//! ```text
//!
//! === Server Status Update ===
//! |     Server |    Details |
//! -------------------------------------
//! |   Server A | Load:  0.95 | Available: YES |
//! ```

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::monitors::resource::Resource;
use crate::sink::LineSink;

const BANNER: &str = "=== Server Status Update ===";
const HEADER_COLOR: &str = "\x1b[1;34m";
const RESET: &str = "\x1b[0m";
const SEPARATOR_WIDTH: usize = 37;

/// Renders resource rows to the output channel.
#[derive(Clone)]
pub struct Display {
    sink: Arc<dyn LineSink>,
    color: bool,
}

impl Display {
    pub fn new(sink: Arc<dyn LineSink>, color: bool) -> Self {
        Self { sink, color }
    }

    /// Format a single status row. Same state, same row.
    ///
    /// Load is rounded from its exact binary value, so `0.955` prints as
    /// `0.95`.
    pub fn row(resource: &Resource) -> String {
        format!(
            "| {:>10} | Load: {:>5.2} | Available: {} |",
            resource.name(),
            resource.load(),
            if resource.is_available() { "YES" } else { "NO" }
        )
    }

    /// Lines printed at the start of every cycle.
    pub fn header_lines(&self) -> Vec<String> {
        let banner = if self.color {
            format!("{HEADER_COLOR}{BANNER}{RESET}")
        } else {
            BANNER.to_string()
        };

        vec![
            String::new(),
            banner,
            format!("| {:>10} | {:>10} |", "Server", "Details"),
            "-".repeat(SEPARATOR_WIDTH),
        ]
    }

    pub fn render_header(&self) -> Result<()> {
        for line in self.header_lines() {
            self.sink
                .write_line(&line)
                .context("failed to write status header")?;
        }
        Ok(())
    }

    pub fn render(&self, resource: &Resource) -> Result<()> {
        self.sink
            .write_line(&Self::row(resource))
            .context("failed to write status row")
    }
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display")
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}
