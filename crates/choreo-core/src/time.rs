//! The logical scene clock. Nothing here reads wall-clock time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

use crate::error::ChoreoError;

/// Slack for rounding error accumulated by summing step durations.
const FRAME_EPSILON: f64 = 1e-6;

fn checked_seconds(what: &str, s: f64) -> Result<f64, ChoreoError> {
    if s.is_finite() && s >= 0.0 {
        Ok(s)
    } else {
        Err(ChoreoError::InvalidArgument(format!(
            "{what} must be a finite, non-negative number of seconds (got {s})"
        )))
    }
}

/// How long a step occupies the clock. Serializes as plain seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Duration {
    seconds: f64,
}

impl Duration {
    /// Negative input clamps to zero.
    pub fn from_seconds(s: f64) -> Self {
        Self {
            seconds: s.max(0.0),
        }
    }

    /// Rejects negative and non-finite input instead of clamping.
    pub fn try_from_seconds(s: f64) -> Result<Self, ChoreoError> {
        checked_seconds("duration", s).map(|seconds| Self { seconds })
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    pub fn is_zero(&self) -> bool {
        self.seconds == 0.0
    }

    /// Frames needed to show this span at `fps`; a partial frame counts,
    /// float noise below [`FRAME_EPSILON`] of a frame does not.
    pub fn frame_count(&self, fps: f64) -> u64 {
        (self.seconds * fps - FRAME_EPSILON).ceil().max(0.0) as u64
    }
}

impl TryFrom<f64> for Duration {
    type Error = ChoreoError;

    fn try_from(s: f64) -> Result<Self, Self::Error> {
        Duration::try_from_seconds(s)
    }
}

impl From<Duration> for f64 {
    fn from(d: Duration) -> f64 {
        d.seconds
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration::from_seconds(self.seconds + rhs.seconds)
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        self.seconds += rhs.seconds;
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.seconds)
    }
}

/// Position on the scene clock, in seconds from scene start.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Timestamp {
    seconds: f64,
}

impl Timestamp {
    /// Negative input clamps to the scene start.
    pub fn from_seconds(s: f64) -> Self {
        Self {
            seconds: s.max(0.0),
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

}

impl TryFrom<f64> for Timestamp {
    type Error = ChoreoError;

    fn try_from(s: f64) -> Result<Self, Self::Error> {
        checked_seconds("timestamp", s).map(|seconds| Self { seconds })
    }
}

impl From<Timestamp> for f64 {
    fn from(t: Timestamp) -> f64 {
        t.seconds
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp {
            seconds: self.seconds + rhs.as_seconds(),
        }
    }
}

impl AddAssign<Duration> for Timestamp {
    fn add_assign(&mut self, rhs: Duration) {
        self.seconds += rhs.as_seconds();
    }
}

/// `MM:SS.mmm`, with an hours field once the scene runs that long.
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = (self.seconds * 1000.0).round() as u64;
        let (minutes, rest) = (millis / 60_000, millis % 60_000);
        let (secs, ms) = (rest / 1000, rest % 1000);
        if minutes >= 60 {
            write!(f, "{}:{:02}:{:02}.{:03}", minutes / 60, minutes % 60, secs, ms)
        } else {
            write!(f, "{:02}:{:02}.{:03}", minutes, secs, ms)
        }
    }
}
