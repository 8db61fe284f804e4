use std::str::FromStr;

const MONITOR_INTERVAL: &str = "MONITOR_INTERVAL";

pub fn get_interval() -> Option<u64> {
    parse_override(std::env::var(MONITOR_INTERVAL).ok())
}

const MONITOR_SEED: &str = "MONITOR_SEED";

pub fn get_seed() -> Option<u64> {
    parse_override(std::env::var(MONITOR_SEED).ok())
}

/// Parse an optional override value. Missing and unparsable values both
/// yield `None`.
pub fn parse_override<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|res| res.trim().parse().ok())
}
