use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

pub const DEFAULT_HISTORY_SIZE: usize = 60;

/// Fixed-size circular buffer for one metric (for sparklines).
///
/// The buffer is zero-filled at construction, so `len() == capacity()` holds
/// from the first read onwards. Pushing evicts the oldest value.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingWindow<T> {
    capacity: usize,
    values: VecDeque<T>,
}

impl<T: Copy + Default> RollingWindow<T> {
    /// Create a window holding `capacity` default values.
    ///
    /// A zero capacity is bumped to one so `latest()` always has a slot.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut values = VecDeque::with_capacity(capacity);
        values.resize(capacity, T::default());
        Self { capacity, values }
    }

    pub fn push(&mut self, value: T) {
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Values in chronological order, oldest first.
    pub fn values(&self) -> Vec<T> {
        self.values.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.values.iter()
    }

    pub fn latest(&self) -> T {
        self.values.back().copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Copy + Default> Default for RollingWindow<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

impl<T: Serialize> Serialize for RollingWindow<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.values.iter())
    }
}

/// Rolling windows for every reading a source publishes, keyed by reading name.
#[derive(Debug, Clone, Serialize)]
pub struct MetricHistory {
    #[serde(skip)]
    capacity: usize,
    #[serde(flatten)]
    windows: BTreeMap<String, RollingWindow<f64>>,
}

impl MetricHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            windows: BTreeMap::new(),
        }
    }

    /// Append one value to the named window, creating it zero-filled on first use.
    pub fn push(&mut self, name: &str, value: f64) {
        let capacity = self.capacity;
        self.windows
            .entry(name.to_string())
            .or_insert_with(|| RollingWindow::new(capacity))
            .push(value);
    }

    /// Create the named window, zero-filled, if it does not exist yet.
    pub fn ensure(&mut self, name: &str) {
        let capacity = self.capacity;
        self.windows
            .entry(name.to_string())
            .or_insert_with(|| RollingWindow::new(capacity));
    }

    pub fn window(&self, name: &str) -> Option<&RollingWindow<f64>> {
        self.windows.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.windows.keys().map(String::as_str)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
