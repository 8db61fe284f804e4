//! FleetMonitor - Periodically samples every resource, raises alerts and
//! renders the status table
//!
//! ## State Machine
//!
//! ```text
//! STOPPED --start()--> RUNNING --stop()--> STOPPED
//!
//! start() while RUNNING → no-op (returns false)
//! stop()  while STOPPED → no-op (returns false)
//! ```
//!
//! `stop()` only signals the cycle task. The task finishes the pass it is in
//! and exits without starting another one. `stop_and_wait()` additionally
//! waits for every cycle task launched so far to terminate.
//!
//! The fleet lock is only held while a single resource is sampled, so
//! `snapshot()` never waits for a whole pass.

use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::{broadcast, watch};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, instrument, trace};

use crate::{
    ResourceStatus,
    alerts::{self, AlertEvent, AlertSink},
    config::Config,
    display::Display,
    sampler::{RandomSampler, Sampler},
    sink::{LineSink, StreamSink},
};

use super::resource::Resource;

const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

const ALERT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Stopped,
    Running,
}

/// Resources plus the sampler that feeds them. Only the cycle holds this
/// mutably.
struct Fleet {
    resources: Vec<Resource>,
    sampler: Box<dyn Sampler>,
}

/// State shared between the monitor handle and its cycle task.
struct Shared {
    fleet: Mutex<Fleet>,

    /// Held for a whole pass so passes never overlap
    pass: Mutex<()>,

    /// Held while a resource's alerts and row are written
    output: Arc<Mutex<()>>,

    alerts: AlertSink,
    display: Display,
    alert_tx: broadcast::Sender<AlertEvent>,
    interval: Duration,
}

impl Shared {
    fn lock_fleet(&self) -> Result<MutexGuard<'_, Fleet>> {
        self.fleet
            .lock()
            .map_err(|_| anyhow!("fleet lock poisoned"))
    }

    fn lock_output(&self) -> MutexGuard<'_, ()> {
        self.output.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resample the resource at `index` and return a copy of its new state.
    fn sample_resource(&self, index: usize) -> Result<Option<Resource>> {
        let mut fleet = self.lock_fleet()?;
        let Fleet { resources, sampler } = &mut *fleet;

        Ok(resources.get_mut(index).map(|resource| {
            resource.sample(sampler.as_mut());
            resource.clone()
        }))
    }

    /// One full pass: header, then sample → alerts → row for each resource.
    fn run_cycle(&self) -> Result<()> {
        let _pass = self.pass.lock().unwrap_or_else(PoisonError::into_inner);

        {
            let _output = self.lock_output();
            self.display.render_header()?;
        }

        let mut index = 0;
        while let Some(resource) = self.sample_resource(index)? {
            index += 1;

            let _output = self.lock_output();
            for alert in alerts::evaluate(&resource) {
                self.alerts.alert(&alert.to_string())?;

                match self.alert_tx.send(alert.event()) {
                    Ok(receivers) => trace!("published alert to {receivers} receivers"),
                    Err(_) => trace!("no receivers for alert event"),
                }
            }
            self.display.render(&resource)?;
        }

        Ok(())
    }
}

/// Cycle task body. Stop requests are honoured before a pass and while
/// sleeping, never in the middle of a pass.
#[instrument(skip_all)]
async fn cycle_loop(shared: Arc<Shared>, mut stop_rx: watch::Receiver<bool>) -> Result<()> {
    debug!("starting monitoring cycle");

    while !*stop_rx.borrow() {
        if let Err(e) = shared.run_cycle() {
            error!("monitoring cycle aborted: {e:#}");
            return Err(e);
        }

        tokio::select! {
            _ = tokio::time::sleep(shared.interval) => {}

            changed = stop_rx.changed() => {
                if changed.is_err() {
                    debug!("monitor handle dropped");
                    break;
                }
            }
        }
    }

    debug!("monitoring cycle stopped");
    Ok(())
}

fn join_outcome(result: Result<Result<()>, JoinError>) -> Result<()> {
    match result {
        Ok(result) => result,
        Err(e) => Err(anyhow::Error::new(e).context("monitoring task failed")),
    }
}

struct RunningCycle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<Result<()>>,
}

/// Owns the fleet and controls the background cycle task.
///
/// `start()` spawns onto the current tokio runtime and therefore has to be
/// called from within one.
pub struct FleetMonitor {
    shared: Arc<Shared>,
    running: Option<RunningCycle>,

    /// Tasks that were told to stop but not joined yet
    draining: Vec<JoinHandle<Result<()>>>,

    /// First error of a stopped task that was reaped before `stop_and_wait()`
    failure: Option<anyhow::Error>,
}

impl FleetMonitor {
    pub fn builder() -> FleetMonitorBuilder {
        FleetMonitorBuilder::new()
    }

    pub fn state(&self) -> MonitorState {
        if self.running.is_some() {
            MonitorState::Running
        } else {
            MonitorState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == MonitorState::Running
    }

    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    /// Launch the cycle task. Returns `false` if it was already running.
    pub fn start(&mut self) -> bool {
        self.reap_finished();

        if self.running.is_some() {
            debug!("monitor already running, ignoring start");
            return false;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(cycle_loop(self.shared.clone(), stop_rx));

        self.running = Some(RunningCycle { stop_tx, task });
        debug!("monitor started with interval {:?}", self.shared.interval);
        true
    }

    /// Signal the cycle task to exit after its current pass and return
    /// immediately. Returns `false` if the monitor was not running.
    pub fn stop(&mut self) -> bool {
        self.reap_finished();

        let Some(RunningCycle { stop_tx, task }) = self.running.take() else {
            debug!("monitor not running, ignoring stop");
            return false;
        };

        // the task may already be gone after a fatal write error
        let _ = stop_tx.send(true);
        self.draining.push(task);

        debug!("monitor stop requested");
        true
    }

    /// Stop and wait until every cycle task has terminated.
    ///
    /// Returns the first fatal output error any of those tasks hit.
    pub async fn stop_and_wait(&mut self) -> Result<()> {
        self.stop();

        for task in std::mem::take(&mut self.draining) {
            let result = join_outcome(task.await);
            self.record_failure(result);
        }

        debug!("monitor stopped");
        match self.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Drop the handles of stopped tasks that already ended.
    fn reap_finished(&mut self) {
        let mut cx = Context::from_waker(Waker::noop());
        let mut pending = Vec::with_capacity(self.draining.len());

        for mut task in std::mem::take(&mut self.draining) {
            if !task.is_finished() {
                pending.push(task);
                continue;
            }

            // a finished task is ready unless the coop budget is used up
            match Pin::new(&mut task).poll(&mut cx) {
                Poll::Ready(result) => self.record_failure(join_outcome(result)),
                Poll::Pending => pending.push(task),
            }
        }

        self.draining = pending;
    }

    fn record_failure(&mut self, result: Result<()>) {
        if let Err(e) = result
            && self.failure.is_none()
        {
            self.failure = Some(e);
        }
    }

    /// Resolve once the running cycle task ends on its own, which only
    /// happens after a fatal output error. Returns immediately when stopped.
    ///
    /// Cancel safe: dropping the future leaves the task running.
    pub async fn terminated(&mut self) -> Result<()> {
        let Some(running) = self.running.as_mut() else {
            return Ok(());
        };

        let result = (&mut running.task).await;
        self.running = None;

        join_outcome(result)
    }

    /// Run a single pass on the calling thread, serialized with the
    /// background task.
    pub fn run_cycle_now(&self) -> Result<()> {
        self.shared.run_cycle()
    }

    /// Current state of every resource in fleet order. Never waits for more
    /// than a single resource's sample.
    pub fn snapshot(&self) -> Vec<ResourceStatus> {
        let fleet = self
            .shared
            .fleet
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        fleet.resources.iter().map(Resource::status).collect()
    }

    /// Receive every alert raised from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.shared.alert_tx.subscribe()
    }

    /// Lock guarding the output streams. External writers that share the
    /// monitor's streams hold it to avoid tearing a resource's alert/row
    /// block.
    pub fn output_lock(&self) -> Arc<Mutex<()>> {
        self.shared.output.clone()
    }
}

/// Builder for a [`FleetMonitor`].
pub struct FleetMonitorBuilder {
    names: Vec<String>,
    sampler: Option<Box<dyn Sampler>>,
    output: Option<Arc<dyn LineSink>>,
    alert_output: Option<Arc<dyn LineSink>>,
    interval: Duration,
    color: bool,
}

impl FleetMonitorBuilder {
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            sampler: None,
            output: None,
            alert_output: None,
            interval: DEFAULT_INTERVAL,
            color: true,
        }
    }

    /// Builder pre-filled from a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        let sampler = match config.seed {
            Some(seed) => RandomSampler::seeded(seed),
            None => RandomSampler::new(),
        };

        Self::new()
            .servers(config.server_names())
            .interval(Duration::from_secs(config.interval))
            .color(config.color)
            .sampler(sampler)
    }

    /// Append a resource. Insertion order is display order.
    pub fn server(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    pub fn servers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Defaults to an OS-seeded [`RandomSampler`].
    pub fn sampler(mut self, sampler: impl Sampler + 'static) -> Self {
        self.sampler = Some(Box::new(sampler));
        self
    }

    /// Status table sink (defaults to stdout).
    pub fn output(mut self, sink: Arc<dyn LineSink>) -> Self {
        self.output = Some(sink);
        self
    }

    /// Alert sink (defaults to stderr).
    pub fn alert_output(mut self, sink: Arc<dyn LineSink>) -> Self {
        self.alert_output = Some(sink);
        self
    }

    /// Sleep between two passes (defaults to 5 seconds).
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Build the monitor, taking an initial sample for every resource.
    pub fn build(self) -> FleetMonitor {
        let mut sampler = self
            .sampler
            .unwrap_or_else(|| Box::new(RandomSampler::new()));

        let resources = self
            .names
            .into_iter()
            .map(|name| Resource::new(name, sampler.as_mut()))
            .collect();

        let output = self
            .output
            .unwrap_or_else(|| Arc::new(StreamSink::stdout()));
        let alert_output = self
            .alert_output
            .unwrap_or_else(|| Arc::new(StreamSink::stderr()));

        let (alert_tx, _) = broadcast::channel(ALERT_CHANNEL_CAPACITY);

        FleetMonitor {
            shared: Arc::new(Shared {
                fleet: Mutex::new(Fleet { resources, sampler }),
                pass: Mutex::new(()),
                output: Arc::new(Mutex::new(())),
                alerts: AlertSink::new(alert_output, self.color),
                display: Display::new(output, self.color),
                alert_tx,
                interval: self.interval,
            }),
            running: None,
            draining: Vec::new(),
            failure: None,
        }
    }
}

impl Default for FleetMonitorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
