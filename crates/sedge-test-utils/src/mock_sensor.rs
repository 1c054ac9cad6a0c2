//! Mock sensor and indicator.

use sedge_ops::{Indicator, Sensor};
use sedge_types::IndicatorLevel;
use std::sync::{Arc, Mutex};

struct MockSensorInner {
    /// Value returned by `sample_averaged`.
    reading: u8,
    /// Value returned by `entropy_sample`.
    entropy: u32,
    /// Number of samples taken.
    samples: usize,
}

/// A sensor returning a fixed, adjustable reading.
#[derive(Clone)]
pub struct MockSensor {
    inner: Arc<Mutex<MockSensorInner>>,
}

impl MockSensor {
    /// Create a sensor that always reads `reading`.
    pub fn new(reading: u8) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockSensorInner {
                reading,
                entropy: 0x5EED_0001,
                samples: 0,
            })),
        }
    }

    /// Change the reading.
    pub fn set_reading(&self, reading: u8) {
        self.inner.lock().unwrap().reading = reading;
    }

    /// Number of samples taken so far.
    pub fn samples(&self) -> usize {
        self.inner.lock().unwrap().samples
    }
}

impl Sensor for MockSensor {
    fn sample_averaged(&self) -> u8 {
        let mut inner = self.inner.lock().unwrap();
        inner.samples += 1;
        inner.reading
    }

    fn entropy_sample(&self) -> u32 {
        self.inner.lock().unwrap().entropy
    }
}

/// An indicator that records every level it is set to.
#[derive(Clone, Default)]
pub struct RecordingIndicator {
    levels: Arc<Mutex<Vec<IndicatorLevel>>>,
}

impl RecordingIndicator {
    /// Create an indicator with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// All levels set so far.
    pub fn levels(&self) -> Vec<IndicatorLevel> {
        self.levels.lock().unwrap().clone()
    }

    /// The most recent level.
    pub fn last(&self) -> Option<IndicatorLevel> {
        self.levels.lock().unwrap().last().copied()
    }
}

impl Indicator for RecordingIndicator {
    fn set_level(&self, level: IndicatorLevel) {
        self.levels.lock().unwrap().push(level);
    }
}
