//! Decide what to do with one probe reading.

use crate::status::StepSize;

/// What `correct_point` should do for a given sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Plan {
    /// Reading unusable (NaN or infinite).
    InvalidSample,
    /// `|z| <= tolerance`.
    Hold,
    /// Turn the knob. `direction` is `z > tolerance` (bed high at this corner);
    /// the lever travels from `lever_endpoint(!direction)` toward
    /// `lever_endpoint(direction)`.
    Turn { direction: bool, step: StepSize },
}

/// Classify a sample against `tolerance_mm`.
///
/// Small steps cover `tolerance < |z| < 2 * tolerance`; anything at or
/// beyond twice the tolerance gets the full throw.
pub fn plan_correction(z_mm: f32, tolerance_mm: f32) -> Plan {
    if !z_mm.is_finite() {
        return Plan::InvalidSample;
    }
    let magnitude = z_mm.abs();
    if magnitude <= tolerance_mm {
        return Plan::Hold;
    }
    let step = if magnitude < 2.0 * tolerance_mm {
        StepSize::Small
    } else {
        StepSize::Large
    };
    Plan::Turn {
        direction: z_mm > tolerance_mm,
        step,
    }
}
