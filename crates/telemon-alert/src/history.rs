use chrono::{DateTime, Utc};
use std::collections::HashMap;
use telemon_common::types::DataPoint;

/// Default number of samples retained per signal.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Fixed-capacity ring buffer of samples for a single signal.
///
/// The backing store grows up to `capacity` and is then reused in place:
/// once full, each push overwrites the oldest sample and advances `head`.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    capacity: usize,
    data: Vec<DataPoint>,
    /// Index of the oldest sample once the buffer has wrapped.
    head: usize,
}

impl HistoryBuffer {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            // Grows on demand; `capacity` may be far larger than any signal
            // ever fills.
            data: Vec::new(),
            head: 0,
        }
    }

    /// Record `value` stamped with the current time.
    pub fn push(&mut self, value: f64) {
        self.push_point(DataPoint::at(value, Utc::now()));
    }

    pub fn push_point(&mut self, point: DataPoint) {
        if self.data.len() < self.capacity {
            self.data.push(point);
        } else {
            self.data[self.head] = point;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    /// The last `n` samples, oldest first. Returns everything held when fewer
    /// than `n` samples exist.
    pub fn slice(&self, n: usize) -> Vec<DataPoint> {
        let len = self.data.len();
        let n = n.min(len);
        (len - n..len)
            .map(|i| self.data[(self.head + i) % self.capacity])
            .collect()
    }

    /// Most recent sample, if any.
    pub fn latest(&self) -> Option<DataPoint> {
        self.slice(1).first().copied()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Per-signal history, one [`HistoryBuffer`] per field name, created lazily.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    capacity: usize,
    buffers: HashMap<String, HistoryBuffer>,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buffers: HashMap::new(),
        }
    }

    pub fn record(&mut self, field: &str, value: f64, now: DateTime<Utc>) {
        let capacity = self.capacity;
        match self.buffers.get_mut(field) {
            Some(buffer) => buffer.push_point(DataPoint::at(value, now)),
            None => {
                let mut buffer = HistoryBuffer::new(capacity);
                buffer.push_point(DataPoint::at(value, now));
                self.buffers.insert(field.to_string(), buffer);
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&HistoryBuffer> {
        self.buffers.get(field)
    }

    /// Number of samples held for `field` (0 when never recorded).
    pub fn len(&self, field: &str) -> usize {
        self.buffers.get(field).map_or(0, HistoryBuffer::len)
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffers.clear();
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
