//! Timing slack evaluation
//!
//! Slack is the requested clock period minus the period the design can
//! actually achieve, in picoseconds. Non-negative slack means the design
//! meets the requested frequency.

use synthd_common::{Frequency, Result, ServiceError};

/// Slack in picoseconds for a design whose maximum frequency is
/// `max_frequency`, clocked at `requested`.
///
/// Both frequencies must be finite and positive; anything else is rejected
/// rather than turned into a slack value.
pub fn slack_ps(max_frequency: Frequency, requested: Frequency) -> Result<i64> {
    if !max_frequency.is_valid() {
        return Err(ServiceError::invalid_argument(format!(
            "max frequency must be positive, got {} Hz",
            max_frequency.hz()
        )));
    }
    if !requested.is_valid() {
        return Err(ServiceError::invalid_argument(format!(
            "requested frequency must be positive, got {} Hz",
            requested.hz()
        )));
    }

    let slack = (requested.period_ps() - max_frequency.period_ps()).round() as i64;

    // A violation smaller than half a picosecond still reports as a violation.
    if requested.hz() > max_frequency.hz() && slack >= 0 {
        return Ok(-1);
    }
    Ok(slack)
}

/// Whether a slack value means the timing target is met.
pub fn timing_met(slack_ps: i64) -> bool {
    slack_ps >= 0
}
