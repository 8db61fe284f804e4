//! End-to-end cycles with deterministic samplers
//!
//! Both channels are captured in one sink, so these tests also pin the
//! relative order of alerts and rows.

use fleet_monitor::{
    alerts::Severity,
    monitors::fleet::FleetMonitor,
    sampler::{RandomSampler, SequenceSampler},
    sink::MemorySink,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

use crate::helpers::*;

#[test]
fn test_reference_sequence_produces_expected_cycle() {
    let sink = MemorySink::new();
    // building draws one (load, availability) pair per server, the pass
    // draws the next four: A=(0.95, 0.1) B=(0.5, 0.9) C=(0.3, 0.99) D=(0.1, 0.1)
    let initial = [0.0, 0.5, 0.0, 0.5, 0.0, 0.5, 0.0, 0.5];
    let pass = [0.95, 0.1, 0.5, 0.9, 0.3, 0.99, 0.1, 0.1];
    let monitor = combined_monitor(&sink, [initial, pass].concat()).build();

    assert!(monitor.snapshot().iter().all(|s| s.load == 0.0 && s.available));

    monitor.run_cycle_now().unwrap();

    let expected = vec![
        "",
        "=== Server Status Update ===",
        "|     Server |    Details |",
        "-------------------------------------",
        "ALERT: CRITICAL: Server A load exceeds 90%!",
        "ALERT: ERROR: Server A is unavailable!",
        "|   Server A | Load:  0.95 | Available: NO |",
        "|   Server B | Load:  0.50 | Available: YES |",
        "|   Server C | Load:  0.30 | Available: YES |",
        "ALERT: ERROR: Server D is unavailable!",
        "|   Server D | Load:  0.10 | Available: NO |",
    ];
    assert_eq!(sink.lines(), expected);
}

#[test]
fn test_warning_band_end_to_end() {
    let sink = MemorySink::new();
    // eight values: building and the pass both see the same pairs
    let monitor = combined_monitor(&sink, vec![0.8, 0.5, 0.9, 0.5, 0.7, 0.5, 0.91, 0.5]).build();

    monitor.run_cycle_now().unwrap();

    let lines = sink.lines();
    assert_eq!(
        alert_lines(&lines),
        vec![
            "ALERT: WARNING: Server A load exceeds 70%.",
            "ALERT: WARNING: Server B load exceeds 70%.",
            "ALERT: CRITICAL: Server D load exceeds 90%!",
        ]
    );
}

#[test]
fn test_pinned_rounding_and_both_alerts() {
    let sink = MemorySink::new();
    let monitor = FleetMonitor::builder()
        .server("Server A")
        .sampler(SequenceSampler::new(vec![0.955, 0.0]))
        .output(Arc::new(sink.clone()))
        .alert_output(Arc::new(sink.clone()))
        .color(false)
        .build();
    let mut events = monitor.subscribe();

    monitor.run_cycle_now().unwrap();

    let lines = sink.lines();
    assert_eq!(rows(&lines), vec!["|   Server A | Load:  0.95 | Available: NO |"]);
    assert_eq!(events.try_recv().unwrap().severity, Severity::Critical);
    assert_eq!(events.try_recv().unwrap().severity, Severity::Error);
    assert!(events.try_recv().is_err());
}

#[test]
fn test_rows_follow_insertion_order() {
    let sink = MemorySink::new();
    let monitor = FleetMonitor::builder()
        .servers(["zeta", "alpha", "mu"])
        .sampler(RandomSampler::seeded(1234))
        .output(Arc::new(sink.clone()))
        .alert_output(Arc::new(MemorySink::new()))
        .color(false)
        .build();

    for _ in 0..5 {
        monitor.run_cycle_now().unwrap();
    }

    let lines = sink.lines();
    let row_lines = rows(&lines);
    let names: Vec<&str> = row_lines
        .iter()
        .filter_map(|row| row.split('|').nth(1))
        .map(str::trim)
        .collect();

    assert_eq!(names.len(), 15);
    for chunk in names.chunks(3) {
        assert_eq!(chunk, ["zeta", "alpha", "mu"]);
    }
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let run = || {
        let sink = MemorySink::new();
        let monitor = FleetMonitor::builder()
            .servers(FLEET)
            .sampler(RandomSampler::seeded(99))
            .output(Arc::new(sink.clone()))
            .alert_output(Arc::new(sink.clone()))
            .color(false)
            .build();
        monitor.run_cycle_now().unwrap();
        monitor.run_cycle_now().unwrap();
        sink.lines()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_snapshot_matches_rendered_rows() {
    let sink = MemorySink::new();
    let monitor = combined_monitor(&sink, vec![0.95, 0.1, 0.5, 0.9, 0.3, 0.99, 0.1, 0.1]).build();

    monitor.run_cycle_now().unwrap();

    let snapshot = monitor.snapshot();
    let names: Vec<&str> = snapshot.iter().map(|status| status.name.as_str()).collect();
    assert_eq!(names, FLEET);

    let availability: Vec<bool> = snapshot.iter().map(|status| status.available).collect();
    assert_eq!(availability, vec![false, true, true, false]);
    assert_eq!(snapshot[2].load, 0.3);
}

#[test]
fn test_faulty_sampler_does_not_crash() {
    let sink = MemorySink::new();
    let monitor = combined_monitor(&sink, vec![42.0, -3.0, -0.5, 7.0]).build();

    monitor.run_cycle_now().unwrap();

    let lines = sink.lines();
    assert_eq!(lines.len(), HEADER_LINES + 4 + 4);
    assert!(lines.contains(&"|   Server A | Load: 42.00 | Available: NO |".to_string()));
    assert!(lines.contains(&"|   Server B | Load: -0.50 | Available: YES |".to_string()));
}
