use tracing::trace;

/// Names used when the configuration does not list any servers.
const DEFAULT_SERVERS: [&str; 4] = ["Server A", "Server B", "Server C", "Server D"];

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Fleet in display order (defaults to `Server A` .. `Server D`)
    #[serde(default = "default_servers")]
    pub servers: Vec<ServerConfig>,

    /// Seconds to sleep between two cycles
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Highlight alerts and the status banner with ANSI colors
    #[serde(default = "default_color")]
    pub color: bool,

    /// Seed for the random sampler (OS entropy if absent)
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            servers: default_servers(),
            interval: default_interval(),
            color: default_color(),
            seed: None,
        }
    }
}

impl Config {
    /// Apply `MONITOR_INTERVAL` and `MONITOR_SEED` from the environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(crate::util::get_interval(), crate::util::get_seed())
    }

    /// Replace interval and seed where an override is present.
    pub fn with_overrides(mut self, interval: Option<u64>, seed: Option<u64>) -> Self {
        if let Some(interval) = interval {
            self.interval = interval;
        }
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }

    pub fn server_names(&self) -> Vec<String> {
        self.servers.iter().map(|server| server.name.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ServerConfig {
    pub name: String,
}

fn default_servers() -> Vec<ServerConfig> {
    DEFAULT_SERVERS
        .iter()
        .map(|name| ServerConfig {
            name: name.to_string(),
        })
        .collect()
}

fn default_interval() -> u64 {
    5
}

fn default_color() -> bool {
    true
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    parse_config(&file_content)
}

pub fn parse_config(content: &str) -> anyhow::Result<Config> {
    serde_json::from_str(content)
        .map_err(|_| anyhow::anyhow!("Invalid configuration file provided!"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
