//! Drive speed selection.
//!
//! Speed is either a named preset or an explicit percentage of the
//! platform's maximum wheel speed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{NavError, Result};

/// Percentage of maximum speed, always in `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SpeedPercent(u8);

impl SpeedPercent {
    pub const MIN: SpeedPercent = SpeedPercent(1);
    pub const MAX: SpeedPercent = SpeedPercent(100);

    pub fn new(value: u8) -> Result<Self> {
        if (1..=100).contains(&value) {
            Ok(Self(value))
        } else {
            Err(NavError::Config(format!("speed {value} outside 1..=100")))
        }
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Fraction of maximum speed in `(0, 1]`.
    #[inline]
    pub fn fraction(self) -> f32 {
        self.0 as f32 / 100.0
    }
}

impl TryFrom<u8> for SpeedPercent {
    type Error = NavError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SpeedPercent> for u8 {
    fn from(speed: SpeedPercent) -> u8 {
        speed.0
    }
}

impl fmt::Display for SpeedPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Named speed presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedSpeed {
    Normal,
    Sprint,
}

/// Speed requested for a motion batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpeedMode {
    Named(NamedSpeed),
    Explicit(SpeedPercent),
}

impl Default for SpeedMode {
    fn default() -> Self {
        SpeedMode::Named(NamedSpeed::Normal)
    }
}

impl From<SpeedPercent> for SpeedMode {
    fn from(speed: SpeedPercent) -> Self {
        SpeedMode::Explicit(speed)
    }
}

impl From<NamedSpeed> for SpeedMode {
    fn from(speed: NamedSpeed) -> Self {
        SpeedMode::Named(speed)
    }
}

/// Percentages behind the named presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedProfile {
    #[serde(default = "default_normal")]
    pub normal: SpeedPercent,
    #[serde(default = "default_sprint")]
    pub sprint: SpeedPercent,
}

fn default_normal() -> SpeedPercent {
    SpeedPercent(50)
}

fn default_sprint() -> SpeedPercent {
    SpeedPercent::MAX
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self {
            normal: default_normal(),
            sprint: default_sprint(),
        }
    }
}

impl SpeedProfile {
    /// Concrete percentage for a speed mode.
    pub fn resolve(&self, mode: SpeedMode) -> SpeedPercent {
        match mode {
            SpeedMode::Named(NamedSpeed::Normal) => self.normal,
            SpeedMode::Named(NamedSpeed::Sprint) => self.sprint,
            SpeedMode::Explicit(speed) => speed,
        }
    }
}
