//! Full-revolution scans from a single-beam sensor.
//!
//! The robot reads one distance, turns by `2π / beam_count`, and repeats
//! until it has turned a full revolution. Readings go into an explicit
//! [`ScanAccumulator`] that is handed in and handed back, so no state
//! outlives a scan.

use std::f32::consts::TAU;
use std::time::{Duration, Instant};

use crate::core::types::RangeScan;
use crate::error::{NavError, Result};

use super::traits::{RangeScanner, SingleBeamSensor};

/// Readings collected so far for one scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanAccumulator {
    readings: Vec<f32>,
    expected: usize,
}

impl ScanAccumulator {
    pub fn new(expected: usize) -> Self {
        Self {
            readings: Vec::with_capacity(expected),
            expected,
        }
    }

    pub fn push(&mut self, distance: f32) {
        self.readings.push(distance);
    }

    /// Number of readings collected.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn is_complete(&self) -> bool {
        self.readings.len() >= self.expected
    }

    /// Finished scan. Only complete accumulators convert.
    pub fn into_scan(self) -> Option<RangeScan> {
        self.is_complete().then(|| RangeScan::new(self.readings))
    }
}

/// Fill `acc` by reading and turning until it is complete.
///
/// Returns the filled accumulator, or [`NavError::SensorTimeout`] if the
/// deadline passes first; the partial readings are dropped.
pub fn accumulate_rotation_scan<S: SingleBeamSensor>(
    sensor: &mut S,
    mut acc: ScanAccumulator,
    deadline: Instant,
    timeout: Duration,
) -> Result<ScanAccumulator> {
    if acc.expected() == 0 {
        return Ok(acc);
    }
    let step = TAU / acc.expected() as f32;

    while !acc.is_complete() {
        if Instant::now() > deadline {
            return Err(NavError::SensorTimeout {
                timeout_ms: timeout.as_millis() as u64,
                collected: acc.len(),
                expected: acc.expected(),
            });
        }
        acc.push(sensor.read_distance()?);
        sensor.rotate_by(step)?;
    }
    Ok(acc)
}

/// Sensor handle that keeps the total angle turned.
struct TurnTracker<'a, S> {
    sensor: &'a mut S,
    turned: f32,
}

impl<S: SingleBeamSensor> SingleBeamSensor for TurnTracker<'_, S> {
    fn rotate_by(&mut self, angle: f32) -> Result<()> {
        self.sensor.rotate_by(angle)?;
        self.turned += angle;
        Ok(())
    }

    fn read_distance(&mut self) -> Result<f32> {
        self.sensor.read_distance()
    }
}

/// [`RangeScanner`] built from a [`SingleBeamSensor`].
#[derive(Debug)]
pub struct RotationScanner<S> {
    sensor: S,
}

impl<S: SingleBeamSensor> RotationScanner<S> {
    pub fn new(sensor: S) -> Self {
        Self { sensor }
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn into_inner(self) -> S {
        self.sensor
    }
}

impl<S: SingleBeamSensor> RangeScanner for RotationScanner<S> {
    fn scan(&mut self, beam_count: usize, timeout: Duration) -> Result<RangeScan> {
        let deadline = Instant::now() + timeout;
        let acc = ScanAccumulator::new(beam_count);
        let mut tracker = TurnTracker {
            sensor: &mut self.sensor,
            turned: 0.0,
        };

        match accumulate_rotation_scan(&mut tracker, acc, deadline, timeout) {
            Ok(acc) => acc.into_scan().ok_or(NavError::SensorTimeout {
                timeout_ms: timeout.as_millis() as u64,
                collected: 0,
                expected: beam_count,
            }),
            Err(e) => {
                // Turn back to the heading the scan started from
                let undo = -tracker.turned;
                if undo != 0.0
                    && let Err(restore) = self.sensor.rotate_by(undo)
                {
                    log::warn!("Failed to restore heading after aborted scan: {}", restore);
                }
                log::warn!("Rotation scan aborted: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    /// Sensor returning the beam index, optionally slow.
    struct FakeSensor {
        heading: f32,
        reads: usize,
        delay: Duration,
        fail_on_read: Option<usize>,
    }

    impl FakeSensor {
        fn new(delay: Duration) -> Self {
            Self {
                heading: 0.0,
                reads: 0,
                delay,
                fail_on_read: None,
            }
        }
    }

    impl SingleBeamSensor for FakeSensor {
        fn rotate_by(&mut self, angle: f32) -> Result<()> {
            self.heading += angle;
            Ok(())
        }

        fn read_distance(&mut self) -> Result<f32> {
            thread::sleep(self.delay);
            self.reads += 1;
            if self.fail_on_read == Some(self.reads) {
                return Err(NavError::Motion("sensor stalled".into()));
            }
            Ok(self.reads as f32)
        }
    }

    #[test]
    fn test_accumulator_completion() {
        let mut acc = ScanAccumulator::new(2);
        acc.push(1.0);
        assert!(!acc.is_complete());
        assert!(acc.clone().into_scan().is_none());
        acc.push(2.0);
        assert_eq!(acc.into_scan(), Some(RangeScan::new(vec![1.0, 2.0])));
    }

    #[test]
    fn test_full_rotation() {
        let mut scanner = RotationScanner::new(FakeSensor::new(Duration::ZERO));
        let scan = scanner.scan(8, Duration::from_secs(5)).unwrap();
        assert_eq!(scan.ranges, (1..=8).map(|i| i as f32).collect::<Vec<_>>());
        assert!((scanner.sensor().heading - TAU).abs() < 1e-4);
    }

    #[test]
    fn test_accumulator_passed_through() {
        let mut sensor = FakeSensor::new(Duration::ZERO);
        let mut acc = ScanAccumulator::new(4);
        acc.push(0.5);
        let deadline = Instant::now() + Duration::from_secs(1);
        let acc = accumulate_rotation_scan(&mut sensor, acc, deadline, Duration::from_secs(1)).unwrap();
        assert_eq!(acc.len(), 4);
        assert_eq!(sensor.reads, 3);
    }

    #[test]
    fn test_timeout_discards_partial_scan() {
        let mut scanner = RotationScanner::new(FakeSensor::new(Duration::from_millis(10)));
        let err = scanner.scan(36, Duration::from_millis(30)).unwrap_err();
        match err {
            NavError::SensorTimeout {
                collected,
                expected,
                ..
            } => {
                assert!(collected < expected);
                assert_eq!(expected, 36);
            }
            other => panic!("unexpected error {other:?}"),
        }
        // Heading restored to where the scan started
        assert!(scanner.sensor().heading.abs() < 1e-4);
    }

    #[test]
    fn test_failed_read_restores_heading() {
        let mut sensor = FakeSensor::new(Duration::ZERO);
        sensor.fail_on_read = Some(5);
        let mut scanner = RotationScanner::new(sensor);
        let err = scanner.scan(8, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, NavError::Motion(_)));
        assert_eq!(scanner.sensor().reads, 5);
        assert!(scanner.sensor().heading.abs() < 1e-4);
    }
}
