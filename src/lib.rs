pub mod alerts;
pub mod config;
pub mod display;
pub mod monitors;
pub mod sampler;
pub mod sink;
pub mod util;

/// Point-in-time view of a single resource, as returned by
/// [`monitors::fleet::FleetMonitor::snapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceStatus {
    pub name: String,
    pub load: f64,
    pub available: bool,
}
