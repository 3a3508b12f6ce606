//! Range scan type.

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// One full revolution of range readings.
///
/// Beam `i` points at `heading + i * 2π / len` relative to the pose the
/// scan was taken from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeScan {
    /// Distances, one per beam, in map units.
    pub ranges: Vec<f32>,
}

impl RangeScan {
    pub fn new(ranges: Vec<f32>) -> Self {
        Self { ranges }
    }

    /// Number of beams.
    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Angular spacing between beams in radians.
    #[inline]
    pub fn angle_increment(&self) -> f32 {
        if self.ranges.is_empty() {
            0.0
        } else {
            TAU / self.ranges.len() as f32
        }
    }

    /// Sum of squared differences against another range sequence.
    ///
    /// Pairs beams index by index; extra beams on either side are ignored.
    pub fn squared_error<I>(&self, expected: I) -> f64
    where
        I: IntoIterator<Item = f32>,
    {
        self.ranges
            .iter()
            .zip(expected)
            .map(|(&a, b)| {
                let d = (a - b) as f64;
                d * d
            })
            .sum()
    }
}

impl From<Vec<f32>> for RangeScan {
    fn from(ranges: Vec<f32>) -> Self {
        Self::new(ranges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_squared_error() {
        let scan = RangeScan::new(vec![1.0, 2.0, 3.0]);
        assert_relative_eq!(scan.squared_error(vec![1.0, 2.0, 3.0]), 0.0);
        assert_relative_eq!(scan.squared_error(vec![2.0, 2.0, 1.0]), 5.0);
    }

    #[test]
    fn test_angle_increment() {
        assert_relative_eq!(RangeScan::new(vec![0.0; 4]).angle_increment(), TAU / 4.0);
        assert_eq!(RangeScan::default().angle_increment(), 0.0);
    }
}
