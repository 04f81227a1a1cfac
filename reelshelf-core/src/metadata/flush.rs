//! Debounced, capped write-back scheduling.
//!
//! Every [`DebouncedFlush::schedule_flush`] call pushes the quiet-period
//! deadline out again, while the first call after an idle period also arms a
//! hard deadline that later calls leave alone. Whichever deadline passes first
//! triggers one flush, after which both are disarmed until the next request.
//! A single background task performs every flush, so flushes never overlap.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::{debug, trace};

/// Something that can persist itself when the scheduler decides to.
#[async_trait]
pub trait FlushTarget: Send + Sync + 'static {
    async fn flush(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushPolicy {
    /// Reset by every request
    pub quiet_period: Duration,
    /// Armed by the first request after a flush, never reset
    pub max_delay: Duration,
}

impl Default for FlushPolicy {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
        }
    }
}

enum FlushCommand {
    Schedule,
    FlushNow(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Handle to the background flush task.
///
/// Must be created inside a tokio runtime. Dropping the handle while a flush
/// is pending runs that flush before the task exits.
pub struct DebouncedFlush {
    commands: mpsc::UnboundedSender<FlushCommand>,
    task: Mutex<Option<JoinHandle<()>>>,
    policy: FlushPolicy,
}

impl fmt::Debug for DebouncedFlush {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebouncedFlush")
            .field("policy", &self.policy)
            .field("running", &!self.commands.is_closed())
            .finish()
    }
}

impl DebouncedFlush {
    pub fn spawn(target: Arc<dyn FlushTarget>, policy: FlushPolicy) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_scheduler(target, policy, rx));
        Self {
            commands,
            task: Mutex::new(Some(task)),
            policy,
        }
    }

    /// Request a flush within the policy's windows. Never blocks.
    pub fn schedule_flush(&self) {
        if self.commands.send(FlushCommand::Schedule).is_err() {
            debug!("flush scheduler stopped; ignoring schedule request");
        }
    }

    /// Flush immediately and wait for it to finish. Disarms pending timers.
    pub async fn flush_now(&self) {
        let (ack, done) = oneshot::channel();
        if self.commands.send(FlushCommand::FlushNow(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Run a final flush and stop the background task.
    pub async fn shutdown(&self) {
        let (ack, done) = oneshot::channel();
        if self.commands.send(FlushCommand::Shutdown(ack)).is_ok() {
            let _ = done.await;
        }
        let task = self.task.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}

enum Armed {
    /// Flushed; wait for the next request
    Idle,
    Stop,
}

async fn run_scheduler(
    target: Arc<dyn FlushTarget>,
    policy: FlushPolicy,
    mut rx: mpsc::UnboundedReceiver<FlushCommand>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            FlushCommand::Schedule => {}
            FlushCommand::FlushNow(ack) => {
                target.flush().await;
                let _ = ack.send(());
                continue;
            }
            FlushCommand::Shutdown(ack) => {
                target.flush().await;
                let _ = ack.send(());
                return;
            }
        }

        match run_armed(target.as_ref(), policy, &mut rx).await {
            Armed::Idle => {}
            Armed::Stop => return,
        }
    }
}

/// Wait out the quiet period (bounded by the hard deadline), then flush.
async fn run_armed(
    target: &dyn FlushTarget,
    policy: FlushPolicy,
    rx: &mut mpsc::UnboundedReceiver<FlushCommand>,
) -> Armed {
    let armed_at = Instant::now();
    let hard_deadline = armed_at + policy.max_delay;
    let mut quiet_deadline = armed_at + policy.quiet_period;

    loop {
        let deadline = quiet_deadline.min(hard_deadline);
        tokio::select! {
            command = rx.recv() => match command {
                Some(FlushCommand::Schedule) => {
                    quiet_deadline = Instant::now() + policy.quiet_period;
                }
                Some(FlushCommand::FlushNow(ack)) => {
                    target.flush().await;
                    let _ = ack.send(());
                    return Armed::Idle;
                }
                Some(FlushCommand::Shutdown(ack)) => {
                    target.flush().await;
                    let _ = ack.send(());
                    return Armed::Stop;
                }
                None => {
                    target.flush().await;
                    return Armed::Stop;
                }
            },
            _ = sleep_until(deadline) => {
                trace!(
                    waited_ms = armed_at.elapsed().as_millis() as u64,
                    capped = deadline == hard_deadline,
                    "debounced flush firing"
                );
                target.flush().await;
                return Armed::Idle;
            }
        }
    }
}
