//! Helper functions for integration tests

use std::io;
use std::sync::Arc;
use std::time::Duration;

use fleet_monitor::{
    monitors::fleet::{FleetMonitor, FleetMonitorBuilder},
    sampler::SequenceSampler,
    sink::{LineSink, MemorySink},
};
use tokio::sync::Notify;

pub const FLEET: [&str; 4] = ["Server A", "Server B", "Server C", "Server D"];

/// Blank line, banner, column header, separator.
pub const HEADER_LINES: usize = 4;

/// Builder for the default four-server fleet with both channels captured in
/// one sink, so relative ordering of alerts and rows can be checked.
pub fn combined_monitor(sink: &MemorySink, values: Vec<f64>) -> FleetMonitorBuilder {
    FleetMonitor::builder()
        .servers(FLEET)
        .sampler(SequenceSampler::new(values))
        .output(Arc::new(sink.clone()))
        .alert_output(Arc::new(sink.clone()))
        .color(false)
}

/// Status rows only (no header, no alerts).
pub fn rows(lines: &[String]) -> Vec<&String> {
    lines
        .iter()
        .filter(|line| line.contains(" | Load: "))
        .collect()
}

pub fn alert_lines(lines: &[String]) -> Vec<&String> {
    lines
        .iter()
        .filter(|line| line.starts_with("ALERT: "))
        .collect()
}

/// Sink that records lines slowly and announces the first write, so a test
/// can act while a cycle is still in progress.
pub struct SlowSink {
    pub lines: MemorySink,
    pub first_write: Arc<Notify>,
    pub delay: Duration,
}

impl SlowSink {
    pub fn new(delay: Duration) -> Self {
        Self {
            lines: MemorySink::new(),
            first_write: Arc::new(Notify::new()),
            delay,
        }
    }
}

impl LineSink for SlowSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        if self.lines.is_empty() {
            self.first_write.notify_one();
        }
        std::thread::sleep(self.delay);
        self.lines.write_line(line)
    }
}
