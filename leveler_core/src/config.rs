//! Runtime configuration for the calibration controller.
//!
//! These are separate from the TOML-deserialized config in `leveler_config`;
//! see `conversions` for the mapping.

use crate::geometry::{Actuator, Corner};

/// Servo wiring and motion constants.
#[derive(Debug, Clone)]
pub struct ServoCfg {
    /// Servo index driving the west knobs (SW, NW).
    pub west_index: u8,
    /// Servo index driving the east knobs (NE, SE).
    pub east_index: u8,
    /// Angle that puts the lever into the knob wheel.
    pub engaged_deg: u16,
    /// Angle that parks the lever below the wheel.
    pub disengaged_deg: u16,
    /// Wait after each angle command.
    pub settle_ms: u64,
}

impl Default for ServoCfg {
    fn default() -> Self {
        Self {
            west_index: 1,
            east_index: 3,
            engaged_deg: 90,
            disengaged_deg: 0,
            settle_ms: 300,
        }
    }
}

impl ServoCfg {
    #[inline]
    pub fn index_of(&self, actuator: Actuator) -> u8 {
        match actuator {
            Actuator::West => self.west_index,
            Actuator::East => self.east_index,
        }
    }
}

/// Convergence parameters.
#[derive(Debug, Clone)]
pub struct LevelingCfg {
    /// A corner is level once `|z| <= tolerance_mm`. Corrections below
    /// `2 * tolerance_mm` use the shortened lever throw.
    pub tolerance_mm: f32,
    /// Weight of the knob center when blending the small-step endpoint.
    pub small_step_blend: f32,
    /// Seed corner; the scan visits `start_after.next()` first.
    pub start_after: Corner,
    /// Optional cap on scan steps (`None` = run until converged).
    pub max_steps: Option<u32>,
    /// Z the head is raised to before the first XY move.
    pub z_clearance_mm: f32,
}

impl Default for LevelingCfg {
    fn default() -> Self {
        Self {
            tolerance_mm: 0.015,
            small_step_blend: 0.6,
            start_after: Corner::SouthEast,
            max_steps: None,
            z_clearance_mm: 10.0,
        }
    }
}

/// Consecutive unadjusted points that end a scan (one full lap).
pub const CONVERGED_RUN_LENGTH: u8 = 4;
