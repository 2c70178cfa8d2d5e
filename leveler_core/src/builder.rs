//! Type-state builder for `CalibrationController`.
//!
//! The builder enforces at compile time that Motion, Probe and Servos are
//! provided before `build()` is available. `try_build()` is always available
//! for dynamic checks. Bed leveling and feedrate scaling are optional and
//! default to no-ops for printers without those features.

use std::marker::PhantomData;
use std::sync::Arc;

use leveler_traits::clock::{Clock, MonotonicClock};
use leveler_traits::{BedLeveling, FeedrateScaling, Motion, Probe, Servos};

use crate::config::{LevelingCfg, ServoCfg};
use crate::controller::CalibrationController;
use crate::error::{BuildError, Result};
use crate::geometry::PointGeometry;
use crate::mocks::{NoopFeedrate, NoopLeveling};

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `CalibrationController`. All fields are validated on `build()`.
pub struct ControllerBuilder<M, P, S> {
    motion: Option<Box<dyn Motion>>,
    probe: Option<Box<dyn Probe>>,
    servos: Option<Box<dyn Servos>>,
    leveling: Option<Box<dyn BedLeveling>>,
    feedrate: Option<Box<dyn FeedrateScaling>>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    geometry: Option<PointGeometry>,
    servo: Option<ServoCfg>,
    cfg: Option<LevelingCfg>,
    _m: PhantomData<M>,
    _p: PhantomData<P>,
    _s: PhantomData<S>,
}

impl Default for ControllerBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            motion: None,
            probe: None,
            servos: None,
            leveling: None,
            feedrate: None,
            clock: None,
            geometry: None,
            servo: None,
            cfg: None,
            _m: PhantomData,
            _p: PhantomData,
            _s: PhantomData,
        }
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

fn validate(geometry: &PointGeometry, servo: &ServoCfg, cfg: &LevelingCfg) -> Result<()> {
    if geometry
        .positions
        .iter()
        .any(|p| !p.x.is_finite() || !p.y.is_finite())
    {
        return Err(invalid("corner positions must be finite"));
    }
    if !(geometry.knob_offset_mm.is_finite() && geometry.knob_offset_mm > 0.0) {
        return Err(invalid("knob_offset_mm must be > 0"));
    }
    if !(cfg.tolerance_mm.is_finite() && cfg.tolerance_mm > 0.0) {
        return Err(invalid("tolerance_mm must be > 0"));
    }
    if !(0.0..=1.0).contains(&cfg.small_step_blend) {
        return Err(invalid("small_step_blend must be in [0, 1]"));
    }
    if !cfg.z_clearance_mm.is_finite() || cfg.z_clearance_mm < 0.0 {
        return Err(invalid("z_clearance_mm must be >= 0"));
    }
    if cfg.max_steps == Some(0) {
        return Err(invalid("max_steps must be >= 1 when set"));
    }
    if servo.engaged_deg == servo.disengaged_deg {
        return Err(invalid("engaged and disengaged angles must differ"));
    }
    Ok(())
}

impl<M, P, S> ControllerBuilder<M, P, S> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<CalibrationController> {
        let motion = self
            .motion
            .ok_or_else(|| eyre::Report::new(BuildError::MissingMotion))?;
        let probe = self
            .probe
            .ok_or_else(|| eyre::Report::new(BuildError::MissingProbe))?;
        let servos = self
            .servos
            .ok_or_else(|| eyre::Report::new(BuildError::MissingServos))?;

        let geometry = self.geometry.unwrap_or_default();
        let servo = self.servo.unwrap_or_default();
        let cfg = self.cfg.unwrap_or_default();
        validate(&geometry, &servo, &cfg)?;

        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(b) => Arc::from(b),
            None => Arc::new(MonotonicClock::new()),
        };

        Ok(CalibrationController {
            motion,
            probe,
            servos,
            leveling: self.leveling.unwrap_or_else(|| Box::new(NoopLeveling)),
            feedrate: self.feedrate.unwrap_or_else(|| Box::new(NoopFeedrate)),
            clock,
            geometry,
            servo,
            cfg,
        })
    }
}

/// Chainable setters that do not affect type-state.
impl<M, P, S> ControllerBuilder<M, P, S> {
    pub fn with_geometry(mut self, geometry: PointGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }
    pub fn with_servo_cfg(mut self, servo: ServoCfg) -> Self {
        self.servo = Some(servo);
        self
    }
    pub fn with_leveling_cfg(mut self, cfg: LevelingCfg) -> Self {
        self.cfg = Some(cfg);
        self
    }
    pub fn with_bed_leveling(mut self, leveling: impl BedLeveling + 'static) -> Self {
        self.leveling = Some(Box::new(leveling));
        self
    }
    pub fn with_feedrate(mut self, feedrate: impl FeedrateScaling + 'static) -> Self {
        self.feedrate = Some(Box::new(feedrate));
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl<P, S> ControllerBuilder<Missing, P, S> {
    pub fn with_motion(self, motion: impl Motion + 'static) -> ControllerBuilder<Set, P, S> {
        ControllerBuilder {
            motion: Some(Box::new(motion)),
            probe: self.probe,
            servos: self.servos,
            leveling: self.leveling,
            feedrate: self.feedrate,
            clock: self.clock,
            geometry: self.geometry,
            servo: self.servo,
            cfg: self.cfg,
            _m: PhantomData,
            _p: PhantomData,
            _s: PhantomData,
        }
    }
}

impl<M, S> ControllerBuilder<M, Missing, S> {
    pub fn with_probe(self, probe: impl Probe + 'static) -> ControllerBuilder<M, Set, S> {
        ControllerBuilder {
            motion: self.motion,
            probe: Some(Box::new(probe)),
            servos: self.servos,
            leveling: self.leveling,
            feedrate: self.feedrate,
            clock: self.clock,
            geometry: self.geometry,
            servo: self.servo,
            cfg: self.cfg,
            _m: PhantomData,
            _p: PhantomData,
            _s: PhantomData,
        }
    }
}

impl<M, P> ControllerBuilder<M, P, Missing> {
    pub fn with_servos(self, servos: impl Servos + 'static) -> ControllerBuilder<M, P, Set> {
        ControllerBuilder {
            motion: self.motion,
            probe: self.probe,
            servos: Some(Box::new(servos)),
            leveling: self.leveling,
            feedrate: self.feedrate,
            clock: self.clock,
            geometry: self.geometry,
            servo: self.servo,
            cfg: self.cfg,
            _m: PhantomData,
            _p: PhantomData,
            _s: PhantomData,
        }
    }
}

impl ControllerBuilder<Set, Set, Set> {
    /// Validate and build. Only available when Motion, Probe and Servos are set.
    pub fn build(self) -> Result<CalibrationController> {
        self.try_build()
    }
}
