use leveler_traits::clock::{Clock, MonotonicClock};
use leveler_traits::{BedLeveling, FeedrateScaling, Motion, Probe, Servos};

use crate::controller::CalibrationController;
use crate::error::Result as CoreResult;
use crate::{CalibrationOutcome, LevelingCfg, PointGeometry, ServoCfg};

/// Everything a leveling command needs besides the hardware.
#[derive(Debug, Clone, Default)]
pub struct RunParams {
    pub geometry: PointGeometry,
    pub servo: ServoCfg,
    pub leveling: LevelingCfg,
    /// `None`/`Some(-1)` = full scan, `Some(0..=3)` = one corner.
    pub selector: Option<i32>,
}

impl RunParams {
    pub fn from_config(cfg: &leveler_config::Config, selector: Option<i32>) -> Self {
        Self {
            geometry: (&cfg.bed).into(),
            servo: (&cfg.servos).into(),
            leveling: cfg.into(),
            selector,
        }
    }
}

/// Build a controller around the given collaborators and run one leveling command.
pub fn run<M, P, S, L, F>(
    motion: M,
    probe: P,
    servos: S,
    leveling: L,
    feedrate: F,
    params: RunParams,
) -> CoreResult<CalibrationOutcome>
where
    M: Motion + 'static,
    P: Probe + 'static,
    S: Servos + 'static,
    L: BedLeveling + 'static,
    F: FeedrateScaling + 'static,
{
    let mut controller = CalibrationController::builder()
        .with_motion(motion)
        .with_probe(probe)
        .with_servos(servos)
        .with_bed_leveling(leveling)
        .with_feedrate(feedrate)
        .with_geometry(params.geometry)
        .with_servo_cfg(params.servo)
        .with_leveling_cfg(params.leveling)
        .build()?;

    let clock = MonotonicClock::new();
    let epoch = clock.now();
    tracing::info!(selector = ?params.selector, "leveling start");
    let outcome = controller.run(params.selector)?;
    tracing::info!(
        outcome = outcome.kind(),
        elapsed_ms = clock.ms_since(epoch),
        "leveling finished: {outcome}"
    );
    Ok(outcome)
}
