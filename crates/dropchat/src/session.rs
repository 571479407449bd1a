//! Per-room live session: poll and heartbeat tickers.
//!
//! A [`RoomSession`] owns everything one active room needs: its Tailer and
//! cursor, a poll timer, and a heartbeat timer. Sessions are independent;
//! the host can run several rooms side by side, and switching rooms means
//! dropping one session and spawning another.
//!
//! Each timer tick is fire-and-forget with respect to the timer driving it:
//! a slow tick never stalls the next timer firing, and a tick already in
//! flight suppresses a concurrent duplicate instead of queuing one.
//! Stopping a session stops scheduling future ticks; in-flight file I/O is
//! allowed to complete and its result is discarded.

use chrono::Utc;
use dropchat_core::{presence, StoreError, TailEvent, Tailer};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Consumer callback for tail events.
pub type EventSink = Arc<dyn Fn(TailEvent) + Send + Sync>;

/// Timer configuration for one session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub poll_interval: Duration,
    pub heartbeat_interval: Duration,
    pub max_initial: usize,
}

/// Handle to a running session. Dropping the handle does not stop the
/// tickers; call [`RoomSession::shutdown`] (or [`RoomSession::stop`]).
pub struct RoomSession {
    stop: Arc<AtomicBool>,
    tasks: Vec<JoinHandle<()>>,
}

impl RoomSession {
    /// Spawn the poll and heartbeat tickers for `room` on the current tokio
    /// runtime. `on_event` receives the initial [`TailEvent::Reset`] and
    /// every subsequent [`TailEvent::Append`].
    pub fn spawn(
        root: PathBuf,
        room: String,
        user: String,
        options: SessionOptions,
        on_event: EventSink,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));

        let tailer = Arc::new(Mutex::new(
            Tailer::new(&root, &room).max_initial(options.max_initial),
        ));
        let poll_stop = Arc::clone(&stop);
        let poll_tick: Arc<dyn Fn() + Send + Sync> = Arc::new(move || {
            let mut tailer = match tailer.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            match tailer.poll() {
                Ok(Some(event)) => {
                    // Discard results that complete after a stop.
                    if !poll_stop.load(Ordering::SeqCst) {
                        on_event(event);
                    }
                }
                Ok(None) => {}
                Err(StoreError::DirectoryMissing { path }) => {
                    tracing::debug!("room directory {} missing; retrying next tick", path.display());
                }
                Err(e) => tracing::warn!("poll failed: {e}"),
            }
        });

        let beat_root = root;
        let beat_tick: Arc<dyn Fn() + Send + Sync> = Arc::new(move || {
            match presence::heartbeat(&beat_root, &user, Utc::now()) {
                Ok(true) => {}
                Ok(false) => tracing::debug!("presence not enabled on this share"),
                Err(e) => tracing::warn!("heartbeat failed: {e}"),
            }
        });

        let tasks = vec![
            spawn_ticker(Arc::clone(&stop), options.poll_interval, poll_tick),
            spawn_ticker(Arc::clone(&stop), options.heartbeat_interval, beat_tick),
        ];

        Self { stop, tasks }
    }

    /// Stop scheduling future ticks. In-flight ticks complete on their own.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Stop the session and wait for its timer tasks to exit.
    pub async fn shutdown(self) {
        self.stop();
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

/// Drive `tick` on a fixed period until `stop` is set.
///
/// The tick body runs on the blocking pool so file I/O never stalls the
/// timer; an `in_flight` flag coalesces overlapping ticks.
fn spawn_ticker(
    stop: Arc<AtomicBool>,
    period: Duration,
    tick: Arc<dyn Fn() + Send + Sync>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let in_flight = Arc::new(AtomicBool::new(false));
        loop {
            timer.tick().await;
            if stop.load(Ordering::SeqCst) {
                break;
            }
            if in_flight
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                // Previous tick still running: coalesce, don't queue.
                continue;
            }
            let tick = Arc::clone(&tick);
            let done = Arc::clone(&in_flight);
            tokio::task::spawn_blocking(move || {
                tick();
                done.store(false, Ordering::SeqCst);
            });
        }
    })
}
