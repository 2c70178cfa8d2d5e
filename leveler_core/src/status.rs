//! Outcomes of a single-point correction and of a whole leveling command.

use crate::geometry::Corner;

/// How far the lever is dragged while engaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSize {
    /// Shortened, blended throw for deviations just over tolerance.
    Small,
    /// Full endpoint-to-endpoint throw.
    Large,
}

/// Result of `correct_point` at one corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointOutcome {
    /// Probe returned no usable reading; nothing was moved.
    InvalidSample,
    /// Reading within tolerance; knob left alone.
    WithinTolerance { z_mm: f32 },
    /// Knob was turned.
    Adjusted { z_mm: f32, step: StepSize },
}

impl PointOutcome {
    #[inline]
    pub fn adjusted(&self) -> bool {
        matches!(self, PointOutcome::Adjusted { .. })
    }
}

/// Result of one leveling command.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationOutcome {
    /// Axes not homed; nothing moved.
    NotHomed,
    /// Selector outside [-1, 3]; nothing moved.
    SelectorOutOfRange(i32),
    /// Exactly one corner was visited.
    SinglePoint {
        corner: Corner,
        outcome: PointOutcome,
    },
    /// Four consecutive corners needed no adjustment.
    Converged { steps: u32 },
    /// `max_steps` reached before convergence.
    StepLimitReached {
        steps: u32,
        consecutive_unadjusted: u8,
    },
}

impl CalibrationOutcome {
    /// True unless a precondition stopped the command or the scan gave up.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            CalibrationOutcome::SinglePoint { .. } | CalibrationOutcome::Converged { .. }
        )
    }

    /// Stable name for JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            CalibrationOutcome::NotHomed => "NotHomed",
            CalibrationOutcome::SelectorOutOfRange(_) => "SelectorOutOfRange",
            CalibrationOutcome::SinglePoint { .. } => "SinglePoint",
            CalibrationOutcome::Converged { .. } => "Converged",
            CalibrationOutcome::StepLimitReached { .. } => "StepLimitReached",
        }
    }
}

impl std::fmt::Display for CalibrationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalibrationOutcome::NotHomed => write!(f, "needs homing"),
            CalibrationOutcome::SelectorOutOfRange(r) => {
                write!(f, "R index out of range ({r})")
            }
            CalibrationOutcome::SinglePoint { corner, outcome } => match outcome {
                PointOutcome::InvalidSample => write!(f, "{corner}: probe failed, not adjusted"),
                PointOutcome::WithinTolerance { z_mm } => {
                    write!(f, "{corner}: z={z_mm:.3} within tolerance")
                }
                PointOutcome::Adjusted { z_mm, step } => {
                    write!(f, "{corner}: z={z_mm:.3} adjusted ({step:?} step)")
                }
            },
            CalibrationOutcome::Converged { steps } => write!(f, "done after steps: {steps}"),
            CalibrationOutcome::StepLimitReached {
                steps,
                consecutive_unadjusted,
            } => write!(
                f,
                "stopped after {steps} steps without converging ({consecutive_unadjusted}/4 level)"
            ),
        }
    }
}
