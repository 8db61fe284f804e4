use tracing::trace;

use crate::{ResourceStatus, sampler::Sampler};

/// Threshold above which a second sample marks the resource available.
const AVAILABILITY_THRESHOLD: f64 = 0.2;

/// Simulated server with a load fraction and an availability flag.
///
/// The load is deliberately not clamped: whatever the sampler produces is what
/// gets rendered and alerted on.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    name: String,
    load: f64,
    available: bool,
}

impl Resource {
    /// Create a resource and take its initial sample.
    pub fn new(name: impl Into<String>, sampler: &mut dyn Sampler) -> Self {
        let mut resource = Self {
            name: name.into(),
            load: 0.0,
            available: true,
        };
        resource.sample(sampler);
        resource
    }

    /// Create a resource with a known state, bypassing the sampler.
    pub fn with_state(name: impl Into<String>, load: f64, available: bool) -> Self {
        Self {
            name: name.into(),
            load,
            available,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn load(&self) -> f64 {
        self.load
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Replace load and availability with two fresh draws.
    ///
    /// The first draw becomes the load, the second decides availability
    /// (available when it exceeds 0.2).
    pub fn sample(&mut self, sampler: &mut dyn Sampler) {
        let load = sampler.next_value();
        let available = sampler.next_value() > AVAILABILITY_THRESHOLD;

        self.load = load;
        self.available = available;

        trace!("{}: load {load:.2}, available {available}", self.name);
    }

    pub fn status(&self) -> ResourceStatus {
        ResourceStatus {
            name: self.name.clone(),
            load: self.load,
            available: self.available,
        }
    }
}
