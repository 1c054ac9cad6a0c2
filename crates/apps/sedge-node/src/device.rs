//! Host-side stand-ins for the sensor and the indicator output.

use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use std::sync::Mutex;
use tracing::{debug, info};

use sedge_ops::{Indicator, Sensor};
use sedge_types::IndicatorLevel;

use crate::config::SensorConfig;

/// Samples averaged per reading.
const SAMPLE_WINDOW: usize = 8;

/// Sensor producing readings uniformly drawn from a configured range.
#[derive(Debug)]
pub struct SimulatedSensor {
    min: u8,
    max: u8,
}

impl SimulatedSensor {
    /// Create a sensor over `config.min..=config.max`.
    pub fn new(config: &SensorConfig) -> Self {
        Self {
            min: config.min.min(config.max),
            max: config.max.max(config.min),
        }
    }
}

impl Sensor for SimulatedSensor {
    fn sample_averaged(&self) -> u8 {
        let mut rng = rand::thread_rng();
        let total: usize = (0..SAMPLE_WINDOW)
            .map(|_| rng.gen_range(self.min..=self.max) as usize)
            .sum();
        let reading = (total / SAMPLE_WINDOW) as u8;
        debug!(reading, "Sensor sampled");
        reading
    }

    fn entropy_sample(&self) -> u32 {
        OsRng.next_u32()
    }
}

/// Indicator that reports level changes through the log.
#[derive(Debug, Default)]
pub struct LogIndicator {
    level: Mutex<Option<IndicatorLevel>>,
}

impl LogIndicator {
    /// Create an indicator with no level set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last level set.
    pub fn level(&self) -> Option<IndicatorLevel> {
        self.level.lock().ok().and_then(|level| *level)
    }
}

impl Indicator for LogIndicator {
    fn set_level(&self, level: IndicatorLevel) {
        let previous = match self.level.lock() {
            Ok(mut current) => current.replace(level),
            Err(_) => None,
        };
        if previous != Some(level) {
            info!(level = ?level, "Indicator switched");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readings_stay_in_range() {
        let sensor = SimulatedSensor::new(&SensorConfig { min: 3, max: 6 });
        for _ in 0..100 {
            let reading = sensor.sample_averaged();
            assert!((3..=6).contains(&reading), "reading {} out of range", reading);
        }
    }

    #[test]
    fn test_fixed_range() {
        let sensor = SimulatedSensor::new(&SensorConfig { min: 4, max: 4 });
        assert_eq!(sensor.sample_averaged(), 4);
    }

    #[test]
    fn test_inverted_range_is_normalized() {
        let sensor = SimulatedSensor::new(&SensorConfig { min: 9, max: 1 });
        let reading = sensor.sample_averaged();
        assert!((1..=9).contains(&reading));
    }

    #[test]
    fn test_indicator_tracks_last_level() {
        let indicator = LogIndicator::new();
        assert_eq!(indicator.level(), None);

        indicator.set_level(IndicatorLevel::Low);
        indicator.set_level(IndicatorLevel::High);
        assert_eq!(indicator.level(), Some(IndicatorLevel::High));
    }
}
