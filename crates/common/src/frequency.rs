//! Clock frequencies with unit parsing and display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const HZ_PER_GHZ: f64 = 1_000_000_000.0;
const PS_PER_SECOND: f64 = 1e12;

/// A frequency value stored in Hertz.
///
/// Parses strings like "2GHz", "500MHz", "100KHz", "48000Hz" and bare numbers
/// (interpreted as Hz). Displays using the most readable unit.
#[derive(Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Frequency(f64);

impl Frequency {
    /// Creates a frequency from a value in Hertz.
    pub fn new(hz: f64) -> Self {
        Self(hz)
    }

    /// Creates a frequency from a value in gigahertz.
    pub fn from_ghz(ghz: f64) -> Self {
        Self(ghz * HZ_PER_GHZ)
    }

    /// Returns the frequency in Hertz.
    pub fn hz(&self) -> f64 {
        self.0
    }

    /// Returns the frequency in gigahertz.
    pub fn ghz(&self) -> f64 {
        self.0 / HZ_PER_GHZ
    }

    /// Clock period in picoseconds.
    pub fn period_ps(&self) -> f64 {
        PS_PER_SECOND / self.0
    }

    /// Frequency rounded to whole Hertz, as carried on the wire.
    pub fn whole_hz(&self) -> i64 {
        self.0.round() as i64
    }

    /// A usable clock: finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

impl fmt::Debug for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frequency({self})")
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hz = self.0;
        if hz >= HZ_PER_GHZ {
            write!(f, "{}GHz", hz / HZ_PER_GHZ)
        } else if hz >= 1_000_000.0 {
            write!(f, "{}MHz", hz / 1_000_000.0)
        } else if hz >= 1_000.0 {
            write!(f, "{}KHz", hz / 1_000.0)
        } else {
            write!(f, "{hz}Hz")
        }
    }
}

/// Error type for parsing frequency strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFrequencyError {
    /// The input string that failed to parse.
    pub input: String,
}

impl fmt::Display for ParseFrequencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid frequency: '{}'", self.input)
    }
}

impl std::error::Error for ParseFrequencyError {}

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseFrequencyError {
            input: s.to_string(),
        };

        let lower = s.to_ascii_lowercase();
        let units = [
            ("ghz", HZ_PER_GHZ),
            ("mhz", 1_000_000.0),
            ("khz", 1_000.0),
            ("hz", 1.0),
        ];
        for (suffix, scale) in units {
            if let Some(num) = lower.strip_suffix(suffix) {
                let val: f64 = num.trim().parse().map_err(|_| err())?;
                return Ok(Frequency(val * scale));
            }
        }

        let val: f64 = s.parse().map_err(|_| err())?;
        Ok(Frequency(val))
    }
}
