//! Metric source contract and the per-source failure boundary.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::Utc;

use super::history::MetricHistory;
use super::metrics::{Availability, Sample, SourceId, SourceView, Tick};
use crate::error::{HwError, Result};

/// One hardware domain the engine samples.
///
/// The orchestrator never calls `sample` twice at once for the same source,
/// so implementations keep their counter state in plain fields.
pub trait MetricSource: Send {
    fn id(&self) -> SourceId;

    /// Display name, e.g. the GPU model or the chosen interface.
    fn label(&self) -> String {
        self.id().to_string()
    }

    /// Called once at discovery. Must not fail: any error means `false`.
    fn probe(&mut self) -> bool;

    fn sample(&mut self, tick: &Tick) -> Result<Sample>;

    /// Release owned handles. Safe to call more than once.
    fn close(&mut self) -> Result<()>;

    /// Names of the readings `sample` returns, used to pre-fill history.
    fn reading_names(&self) -> Vec<String>;

    /// Whether the first reading is a cold-start artifact worth discarding.
    fn needs_warm_up(&self) -> bool {
        false
    }
}

/// What happened to a source during one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleOutcome {
    Fresh,
    /// Transient failure: the previous sample was published again.
    Republished,
    /// Fatal failure: the source was closed and leaves the rotation.
    TornDown,
    /// The source was already unavailable.
    Skipped,
}

/// A source plus everything the orchestrator keeps for it between ticks.
pub struct SourceSlot {
    source: Box<dyn MetricSource>,
    id: SourceId,
    label: String,
    availability: Availability,
    closed: bool,
    latest: Sample,
    history: Arc<MetricHistory>,
    transient_failures: u64,
}

impl SourceSlot {
    pub fn new(source: Box<dyn MetricSource>, capacity: usize) -> Self {
        let id = source.id();
        let label = source.label();
        let names = source.reading_names();

        let mut history = MetricHistory::with_capacity(capacity);
        for name in &names {
            history.ensure(name);
        }

        Self {
            source,
            id,
            label,
            availability: Availability::Active,
            closed: false,
            latest: Sample::zeroed(Utc::now(), names.iter().map(String::as_str)),
            history: Arc::new(history),
            transient_failures: 0,
        }
    }

    pub fn id(&self) -> &SourceId {
        &self.id
    }

    pub fn availability(&self) -> Availability {
        self.availability
    }

    pub fn latest(&self) -> &Sample {
        &self.latest
    }

    pub fn transient_failures(&self) -> u64 {
        self.transient_failures
    }

    /// Sample once, containing any failure at this boundary. A closed source
    /// is never read again.
    pub fn sample(&mut self, tick: &Tick) -> SampleOutcome {
        if self.closed || self.availability == Availability::Unavailable {
            return SampleOutcome::Skipped;
        }

        match self.guarded_sample(tick) {
            Ok(sample) => {
                self.record(&sample);
                self.latest = sample;
                SampleOutcome::Fresh
            }
            Err(e) if e.is_fatal() => {
                log::error!("{}: {} (source removed)", self.id, e);
                self.tear_down();
                SampleOutcome::TornDown
            }
            Err(e) => {
                self.transient_failures += 1;
                log::warn!("{}: {} (republishing previous value)", self.id, e);
                let previous = self.latest.clone();
                self.record(&previous);
                SampleOutcome::Republished
            }
        }
    }

    /// Take and discard one reading so the first published value is meaningful.
    pub fn warm_up(&mut self, tick: &Tick) {
        if self.closed
            || self.availability == Availability::Unavailable
            || !self.source.needs_warm_up()
        {
            return;
        }
        match self.guarded_sample(tick) {
            Ok(_) => log::debug!("{}: warm-up reading discarded", self.id),
            Err(e) if e.is_fatal() => {
                log::error!("{}: warm-up failed: {} (source removed)", self.id, e);
                self.tear_down();
            }
            Err(e) => log::warn!("{}: warm-up failed: {}", self.id, e),
        }
    }

    /// Close the source's handles. Only the first call reaches the source.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match panic::catch_unwind(AssertUnwindSafe(|| self.source.close())) {
            Ok(result) => result,
            Err(_) => Err(HwError::fatal_resource("close panicked")),
        }
    }

    pub fn view(&self) -> SourceView {
        SourceView {
            id: self.id.clone(),
            label: self.label.clone(),
            availability: self.availability,
            latest: self.latest.clone(),
            history: Arc::clone(&self.history),
        }
    }

    fn guarded_sample(&mut self, tick: &Tick) -> Result<Sample> {
        let source = &mut self.source;
        match panic::catch_unwind(AssertUnwindSafe(|| source.sample(tick))) {
            Ok(result) => result,
            Err(payload) => Err(HwError::transient(format!(
                "sample panicked: {}",
                panic_message(&payload)
            ))),
        }
    }

    fn record(&mut self, sample: &Sample) {
        // copies only if a published snapshot still holds the old windows
        let history = Arc::make_mut(&mut self.history);
        for reading in &sample.readings {
            history.push(&reading.name, reading.value);
        }
    }

    fn tear_down(&mut self) {
        self.availability = Availability::Unavailable;
        if let Err(e) = self.close() {
            log::error!("{}: close failed: {}", self.id, e);
        }
    }
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
