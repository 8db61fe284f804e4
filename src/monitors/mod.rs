//! Fleet monitoring
//!
//! ## Overview
//!
//! ```text
//!   FleetMonitor::start()            FleetMonitor::stop()
//!          │ spawns                          │ watch<bool>
//!          ▼                                 ▼
//!   ┌──────────────────────────────────────────────┐
//!   │ cycle task                                   │
//!   │   header                                     │
//!   │   for resource in fleet:                     │
//!   │     sample ─► [output lock] alerts + row     │
//!   │   sleep(interval) or stop                    │
//!   └──────────────────────────────────────────────┘
//!          │                    │
//!          ▼                    ▼
//!     AlertSink (stderr)   Display (stdout)     + broadcast<AlertEvent>
//! ```
//!
//! - **Resource**: simulated server state, resampled once per cycle
//! - **FleetMonitor**: owns the fleet and drives the cycle task

pub mod fleet;
pub mod resource;
