use std::time::Duration;

use clap::Parser;
use fleet_monitor::{
    config::{Config, read_config_file},
    monitors::fleet::FleetMonitorBuilder,
};
use tracing::{debug, info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file (JSON)
    #[arg(short)]
    file: Option<String>,

    /// Stop gracefully after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    duration: Option<u64>,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Log everything the monitor does
    #[arg(short, long)]
    verbose: bool,
}

fn init(verbose: bool) {
    dotenv::dotenv().ok();

    let level = if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };
    let filter = filter::Targets::new().with_target("fleet_monitor", level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init(args.verbose);
    trace!("started with args: {args:?}");

    let mut config = match &args.file {
        Some(file) => read_config_file(file)?,
        None => Config::default(),
    }
    .with_env_overrides();

    if args.no_color {
        config.color = false;
    }

    let mut monitor = FleetMonitorBuilder::from_config(&config).build();

    if args.once {
        return monitor.run_cycle_now();
    }

    monitor.start();
    info!(
        "monitoring {} servers every {}s",
        config.servers.len(),
        config.interval
    );

    tokio::select! {
        // a dead cycle task means the output is gone
        result = monitor.terminated() => return result,

        signal = shutdown_signal(args.duration) => signal?,
    }

    monitor.stop_and_wait().await?;
    info!("monitor stopped");

    Ok(())
}

async fn shutdown_signal(duration: Option<u64>) -> anyhow::Result<()> {
    match duration {
        Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
        None => {
            tokio::signal::ctrl_c().await?;
            debug!("received Ctrl-C");
        }
    }
    Ok(())
}
