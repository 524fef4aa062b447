//! Shared-tick orchestrator.
//!
//! A tick moves `Idle -> Ticking -> Idle`. A tick requested while another is
//! in flight is skipped, never queued, so no source is sampled twice at once
//! and counter state is only touched by one sampling call at a time.
//!
//! `stop` during a tick only records the request. The tick that is running
//! moves the state to `Stopped` when it finishes, and `wait_stopped` blocks
//! until then.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use tokio::sync::watch;

use super::metrics::{Snapshot, SourceId, Tick};
use super::source::{MetricSource, SampleOutcome, SourceSlot};

/// Tagged tick state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickState {
    Idle,
    Ticking { seq: u64, started: Instant },
    Stopped,
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickStats {
    pub completed: u64,
    /// Ticks dropped because the previous one was still running.
    pub skipped: u64,
    pub transient_failures: u64,
    pub torn_down: u64,
    #[serde(skip)]
    pub last_duration: Duration,
}

pub struct Orchestrator {
    slots: Vec<Arc<Mutex<SourceSlot>>>,
    ids: Vec<SourceId>,
    state: Mutex<TickState>,
    stop_requested: AtomicBool,
    drained: Condvar,
    next_seq: Mutex<u64>,
    stats: Mutex<TickStats>,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
}

/// Ends the tick however the tick body exits: back to `Idle`, or `Stopped`
/// if a stop arrived meanwhile.
struct TickGuard<'a> {
    orchestrator: &'a Orchestrator,
}

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.orchestrator.state.lock();
        if matches!(*state, TickState::Ticking { .. }) {
            *state = if self.orchestrator.stop_requested.load(Ordering::SeqCst) {
                TickState::Stopped
            } else {
                TickState::Idle
            };
        }
        self.orchestrator.drained.notify_all();
    }
}

impl Orchestrator {
    pub fn new(sources: Vec<Box<dyn MetricSource>>, capacity: usize) -> Self {
        let slots: Vec<SourceSlot> = sources
            .into_iter()
            .map(|source| SourceSlot::new(source, capacity))
            .collect();
        Self::from_slots(slots)
    }

    pub(crate) fn from_slots(slots: Vec<SourceSlot>) -> Self {
        let ids = slots.iter().map(|slot| slot.id().clone()).collect();
        let initial = Snapshot {
            seq: 0,
            taken_at: chrono::Utc::now(),
            sources: slots.iter().map(SourceSlot::view).collect(),
        };
        let (snapshot_tx, _) = watch::channel(Arc::new(initial));

        Self {
            slots: slots
                .into_iter()
                .map(|slot| Arc::new(Mutex::new(slot)))
                .collect(),
            ids,
            state: Mutex::new(TickState::Idle),
            stop_requested: AtomicBool::new(false),
            drained: Condvar::new(),
            next_seq: Mutex::new(1),
            stats: Mutex::new(TickStats::default()),
            snapshot_tx,
        }
    }

    pub fn state(&self) -> TickState {
        *self.state.lock()
    }

    /// Source identities fixed at discovery. Never changes mid-session.
    pub fn active_ids(&self) -> &[SourceId] {
        &self.ids
    }

    pub fn stats(&self) -> TickStats {
        *self.stats.lock()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot_tx.subscribe()
    }

    pub fn latest(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot_tx.borrow())
    }

    /// Run one tick unless one is already in flight.
    ///
    /// Samples every source concurrently on the blocking pool, waits for the
    /// whole batch, then publishes the snapshot. Returns `None` when skipped.
    pub async fn try_tick(&self) -> Option<Arc<Snapshot>> {
        let (guard, seq) = match self.try_begin() {
            Some(begun) => begun,
            None => {
                self.stats.lock().skipped += 1;
                log::debug!("Tick skipped: previous tick still in flight");
                return None;
            }
        };
        let tick = Tick::now(seq);

        let batch = self.slots.iter().map(|slot| {
            let slot = Arc::clone(slot);
            tokio::task::spawn_blocking(move || slot.lock().sample(&tick))
        });
        let outcomes = join_all(batch).await;

        let mut transient = 0;
        let mut torn_down = 0;
        for outcome in outcomes {
            match outcome {
                Ok(SampleOutcome::Republished) => transient += 1,
                Ok(SampleOutcome::TornDown) => torn_down += 1,
                Ok(_) => {}
                Err(e) => log::error!("Sampling task failed: {}", e),
            }
        }

        let snapshot = Arc::new(self.assemble(&tick));
        self.snapshot_tx.send_replace(Arc::clone(&snapshot));

        {
            let mut stats = self.stats.lock();
            stats.completed += 1;
            stats.transient_failures += transient;
            stats.torn_down += torn_down;
            stats.last_duration = tick.at.elapsed();
        }
        log::trace!("Tick {} published", seq);

        drop(guard);
        Some(snapshot)
    }

    /// Discard one reading per source that needs it. Runs before the first tick.
    pub fn warm_up(&self) {
        let tick = Tick::now(0);
        for slot in &self.slots {
            slot.lock().warm_up(&tick);
        }
    }

    /// Leave the tick loop for good.
    ///
    /// Returns `false` when a tick is still in flight. The state then becomes
    /// `Stopped` as soon as that tick finishes; no new tick can begin.
    pub fn stop(&self) -> bool {
        let mut state = self.state.lock();
        self.stop_requested.store(true, Ordering::SeqCst);
        match *state {
            TickState::Ticking { .. } => false,
            _ => {
                *state = TickState::Stopped;
                true
            }
        }
    }

    /// Block until the orchestrator is `Stopped` or `timeout` elapses.
    pub fn wait_stopped(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while *state != TickState::Stopped {
            if self.drained.wait_until(&mut state, deadline).timed_out() {
                return *state == TickState::Stopped;
            }
        }
        true
    }

    pub(crate) fn slots(&self) -> &[Arc<Mutex<SourceSlot>>] {
        &self.slots
    }

    fn try_begin(&self) -> Option<(TickGuard<'_>, u64)> {
        let mut state = self.state.lock();
        if *state != TickState::Idle {
            return None;
        }
        let seq = {
            let mut next = self.next_seq.lock();
            let seq = *next;
            *next += 1;
            seq
        };
        *state = TickState::Ticking {
            seq,
            started: Instant::now(),
        };
        Some((TickGuard { orchestrator: self }, seq))
    }

    fn assemble(&self, tick: &Tick) -> Snapshot {
        Snapshot {
            seq: tick.seq,
            taken_at: tick.wall,
            sources: self.slots.iter().map(|slot| slot.lock().view()).collect(),
        }
    }
}
