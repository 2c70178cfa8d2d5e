//! The knob-turning control loop (`CalibrationController`).
//!
//! One correction probes a corner, classifies the reading and, when needed,
//! drags the engaged lever across the knob. A full scan repeats corrections
//! in visiting order until four corners in a row need nothing.

use std::sync::Arc;
use std::time::Duration;

use leveler_traits::{AfterProbe, BedLeveling, Clock, FeedrateScaling, Motion, Probe, Servos, XyPos};

use crate::builder::{ControllerBuilder, Missing};
use crate::config::{LevelingCfg, ServoCfg};
use crate::error::Result;
use crate::geometry::{Corner, PointGeometry, interpolate};
use crate::hw_error::hw;
use crate::scan::ScanState;
use crate::status::{CalibrationOutcome, PointOutcome, StepSize};
use crate::strategy::{Plan, plan_correction};

/// Selector value requesting the full four-corner scan.
pub const FULL_SCAN: i32 = -1;

pub struct CalibrationController {
    pub(crate) motion: Box<dyn Motion>,
    pub(crate) probe: Box<dyn Probe>,
    pub(crate) servos: Box<dyn Servos>,
    pub(crate) leveling: Box<dyn BedLeveling>,
    pub(crate) feedrate: Box<dyn FeedrateScaling>,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) geometry: PointGeometry,
    pub(crate) servo: ServoCfg,
    pub(crate) cfg: LevelingCfg,
}

impl core::fmt::Debug for CalibrationController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CalibrationController")
            .field("tolerance_mm", &self.cfg.tolerance_mm)
            .field("start_after", &self.cfg.start_after)
            .field("max_steps", &self.cfg.max_steps)
            .field("west_servo", &self.servo.west_index)
            .field("east_servo", &self.servo.east_index)
            .finish()
    }
}

/// Return `primary` unless it succeeded and `cleanup` failed.
fn settle<T>(primary: Result<T>, cleanup: Result<()>, what: &'static str) -> Result<T> {
    match (primary, cleanup) {
        (Ok(v), Ok(())) => Ok(v),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(ce)) => {
            tracing::warn!(error = %ce, what, "cleanup failed after error");
            Err(e)
        }
    }
}

impl CalibrationController {
    /// Start building a controller.
    pub fn builder() -> ControllerBuilder<Missing, Missing, Missing> {
        ControllerBuilder::default()
    }

    pub fn geometry(&self) -> &PointGeometry {
        &self.geometry
    }

    pub fn leveling_cfg(&self) -> &LevelingCfg {
        &self.cfg
    }

    pub fn servo_cfg(&self) -> &ServoCfg {
        &self.servo
    }

    /// Entry point of the leveling command.
    ///
    /// `selector`: `None` or `Some(-1)` scans all corners, `Some(0..=3)`
    /// corrects that corner once. Anything else is reported without motion.
    pub fn run(&mut self, selector: Option<i32>) -> Result<CalibrationOutcome> {
        if !self.motion.all_axes_homed() {
            tracing::warn!("needs homing");
            return Ok(CalibrationOutcome::NotHomed);
        }

        let selector = selector.unwrap_or(FULL_SCAN);
        let target = if selector == FULL_SCAN {
            None
        } else {
            match Corner::from_index(selector) {
                Some(corner) => Some(corner),
                None => {
                    tracing::warn!(selector, "R index out of range");
                    return Ok(CalibrationOutcome::SelectorOutOfRange(selector));
                }
            }
        };

        let mesh_was_enabled = self.leveling.is_enabled();
        let result = self.raise_to_clearance().and_then(|()| match target {
            Some(corner) => self
                .correct_point(corner)
                .map(|outcome| CalibrationOutcome::SinglePoint { corner, outcome }),
            None => self.scan(),
        });

        let restore = if mesh_was_enabled {
            self.leveling.set_enabled(true).map_err(hw)
        } else {
            Ok(())
        };
        settle(result, restore, "re-enable bed leveling")
    }

    /// Scan all corners until four in a row need no adjustment.
    pub fn run_full_calibration(&mut self) -> Result<CalibrationOutcome> {
        self.run(None)
    }

    /// Probe one corner and turn its knob if the reading is out of tolerance.
    ///
    /// Mesh compensation is switched off first. Feedrate scaling is suspended
    /// for the probe and lever moves and restored on every exit path.
    pub fn correct_point(&mut self, corner: Corner) -> Result<PointOutcome> {
        self.leveling.set_enabled(false).map_err(hw)?;
        self.feedrate.suspend().map_err(hw)?;
        let result = self.probe_and_turn(corner);
        let restore = self.feedrate.restore().map_err(hw);
        settle(result, restore, "restore feedrate scaling")
    }

    fn scan(&mut self) -> Result<CalibrationOutcome> {
        let mut state = ScanState::new(self.cfg.start_after);
        loop {
            if let Some(max) = self.cfg.max_steps
                && state.steps() >= max
            {
                tracing::warn!(
                    steps = state.steps(),
                    knobs_done = state.consecutive_unadjusted(),
                    "step limit reached before convergence"
                );
                return Ok(CalibrationOutcome::StepLimitReached {
                    steps: state.steps(),
                    consecutive_unadjusted: state.consecutive_unadjusted(),
                });
            }

            let corner = state.advance();
            tracing::info!(step = state.steps(), %corner, "starting step");
            let outcome = self.correct_point(corner)?;
            state.record(outcome.adjusted());
            tracing::info!(knobs_done = state.consecutive_unadjusted(), "step finished");

            if state.converged() {
                tracing::info!(steps = state.steps(), "done");
                return Ok(CalibrationOutcome::Converged {
                    steps: state.steps(),
                });
            }
        }
    }

    fn raise_to_clearance(&mut self) -> Result<()> {
        let z = self.motion.current_z();
        if z < self.cfg.z_clearance_mm {
            tracing::info!(
                from_z = z,
                to_z = self.cfg.z_clearance_mm,
                "raising print head before first xy movement"
            );
            self.motion
                .move_to_z(self.cfg.z_clearance_mm)
                .map_err(hw)?;
        }
        Ok(())
    }

    fn probe_and_turn(&mut self, corner: Corner) -> Result<PointOutcome> {
        let at = self.geometry.position_of(corner);
        let z_mm = self.probe.probe_at(at, AfterProbe::Stow, 1).map_err(hw)?;

        match plan_correction(z_mm, self.cfg.tolerance_mm) {
            Plan::InvalidSample => {
                tracing::warn!(%corner, "probe returned no usable sample");
                Ok(PointOutcome::InvalidSample)
            }
            Plan::Hold => {
                tracing::info!(%corner, x = at.x, y = at.y, z = z_mm, "bed within tolerance");
                Ok(PointOutcome::WithinTolerance { z_mm })
            }
            Plan::Turn { direction, step } => {
                tracing::info!(%corner, x = at.x, y = at.y, z = z_mm, ?step, "turning knob");
                self.turn_knob(corner, direction, step)?;
                Ok(PointOutcome::Adjusted { z_mm, step })
            }
        }
    }

    /// Engage at `lever_endpoint(!direction)`, drag toward
    /// `lever_endpoint(direction)`, then park and detach.
    fn turn_knob(&mut self, corner: Corner, direction: bool, step: StepSize) -> Result<()> {
        let index = self.servo.index_of(self.geometry.actuator_of(corner));
        let start = self.geometry.lever_endpoint(corner, !direction);
        let full = self.geometry.lever_endpoint(corner, direction);
        let end = match step {
            StepSize::Small => interpolate(
                self.geometry.position_of(corner),
                full,
                self.cfg.small_step_blend,
            ),
            StepSize::Large => full,
        };

        self.move_xy(start)?;
        self.set_servo(index, self.servo.engaged_deg)?;

        if let Err(e) = self.move_xy(end) {
            // Lever is still in the wheel; park it before bailing out.
            let park = self
                .set_servo(index, self.servo.disengaged_deg)
                .and_then(|()| self.servos.detach(index).map_err(hw));
            return settle(Err(e), park, "park servo");
        }

        // Detach even when the disengage command fails.
        let park = self.set_servo(index, self.servo.disengaged_deg);
        let detach = self.servos.detach(index).map_err(hw);
        settle(park, detach, "detach servo")?;
        tracing::debug!(servo = index, "servo detached");
        Ok(())
    }

    fn move_xy(&mut self, pos: XyPos) -> Result<()> {
        tracing::debug!(%pos, "move");
        self.motion.move_to_xy(pos).map_err(hw)
    }

    fn set_servo(&mut self, index: u8, degrees: u16) -> Result<()> {
        tracing::debug!(servo = index, degrees, "servo move");
        self.servos.set_angle(index, degrees).map_err(hw)?;
        self.clock.sleep(Duration::from_millis(self.servo.settle_ms));
        Ok(())
    }
}
