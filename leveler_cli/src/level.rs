//! Leveling command: config mapping, backend assembly, and result output.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use leveler_config::Config;
use leveler_core::error::Result as CoreResult;
use leveler_core::runner::{self, RunParams};
use leveler_core::{CalibrationOutcome, PointGeometry, PointOutcome};
use leveler_hardware::{ScriptedProbe, SimBedCfg, SimulatedPrinter};
use leveler_traits::Servos;
use serde_json::json;

/// Result of one `level` invocation, ready for printing.
#[derive(Debug, Clone)]
pub struct LevelReport {
    pub outcome: CalibrationOutcome,
    pub duration_ms: u64,
}

/// Simulated printer seeded from the `[bed]`, `[servos]` and `[simulation]` tables.
pub fn sim_from_config(cfg: &Config) -> SimulatedPrinter {
    let geometry = PointGeometry::from(&cfg.bed);
    SimulatedPrinter::new(SimBedCfg {
        positions: geometry.positions,
        heights_mm: cfg.simulation.corner_heights_mm,
        knob_offset_mm: cfg.bed.knob_offset_mm,
        mm_per_throw: cfg.simulation.mm_per_throw,
        homed: cfg.simulation.homed,
        start_z_mm: cfg.simulation.start_z_mm,
        west_servo: cfg.servos.west_index,
        east_servo: cfg.servos.east_index,
        engaged_deg: cfg.servos.engaged_deg,
        probe_timeout_after: cfg.simulation.probe_timeout_after,
    })
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub fn pwm_servos(cfg: &Config) -> eyre::Result<leveler_hardware::pwm::PwmServos> {
    use eyre::WrapErr;
    use leveler_hardware::pwm::{PwmServos, PwmTiming};

    PwmServos::new(
        cfg.servos.west_index,
        cfg.pwm.west_channel,
        cfg.servos.east_index,
        cfg.pwm.east_channel,
        PwmTiming {
            period_ms: cfg.pwm.period_ms,
            pulse_min_us: cfg.pwm.pulse_min_us,
            pulse_max_us: cfg.pwm.pulse_max_us,
        },
    )
    .wrap_err("open pwm servos")
}

fn dispatch<S: Servos + 'static>(
    sim: &SimulatedPrinter,
    servos: S,
    script: Option<Vec<f32>>,
    params: RunParams,
) -> CoreResult<CalibrationOutcome> {
    match script {
        Some(samples) => runner::run(
            sim.motion(),
            ScriptedProbe::new(samples),
            servos,
            sim.leveling(),
            sim.feedrate(),
            params,
        ),
        None => runner::run(
            sim.motion(),
            sim.probe(),
            servos,
            sim.leveling(),
            sim.feedrate(),
            params,
        ),
    }
}

/// Run the leveling command once against the configured backend.
pub fn run_level(cfg: &Config, point: Option<i32>, script: Option<Vec<f32>>) -> eyre::Result<LevelReport> {
    let sim = sim_from_config(cfg);
    let params = RunParams::from_config(cfg, point);
    let started = Instant::now();

    #[cfg(all(feature = "hardware", target_os = "linux"))]
    let outcome = dispatch(&sim, pwm_servos(cfg)?, script, params)?;
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    let outcome = dispatch(&sim, sim.servos(), script, params)?;

    tracing::debug!(heights = ?sim.heights(), "simulated corner heights after run");

    Ok(LevelReport {
        outcome,
        duration_ms: started.elapsed().as_millis() as u64,
    })
}

/// Exit status for an outcome that completed without error.
pub fn exit_code_for_outcome(outcome: &CalibrationOutcome) -> i32 {
    match outcome {
        CalibrationOutcome::StepLimitReached { .. } => 3,
        _ => 0,
    }
}

/// One JSON object per run; fields that do not apply are null.
pub fn outcome_json(report: &LevelReport) -> serde_json::Value {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    let (corner, z_mm, adjusted, step) = match &report.outcome {
        CalibrationOutcome::SinglePoint { corner, outcome } => {
            let (z, step) = match outcome {
                PointOutcome::InvalidSample => (None, None),
                PointOutcome::WithinTolerance { z_mm } => (Some(*z_mm), None),
                PointOutcome::Adjusted { z_mm, step } => {
                    (Some(*z_mm), Some(format!("{step:?}").to_lowercase()))
                }
            };
            (Some(corner.name()), z, Some(outcome.adjusted()), step)
        }
        _ => (None, None, None, None),
    };
    let steps = match report.outcome {
        CalibrationOutcome::Converged { steps }
        | CalibrationOutcome::StepLimitReached { steps, .. } => Some(steps),
        _ => None,
    };

    json!({
        "timestamp": ts,
        "outcome": report.outcome.kind(),
        "success": report.outcome.is_success(),
        "steps": steps,
        "corner": corner,
        "z_mm": z_mm,
        "adjusted": adjusted,
        "step": step,
        "duration_ms": report.duration_ms,
        "message": report.outcome.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use leveler_core::{Corner, StepSize};

    #[test]
    fn single_point_json_carries_corner_and_step() {
        let r = LevelReport {
            outcome: CalibrationOutcome::SinglePoint {
                corner: Corner::NorthEast,
                outcome: PointOutcome::Adjusted {
                    z_mm: 0.05,
                    step: StepSize::Large,
                },
            },
            duration_ms: 12,
        };
        let v = outcome_json(&r);
        assert_eq!(v["outcome"], "SinglePoint");
        assert_eq!(v["corner"], "north_east");
        assert_eq!(v["step"], "large");
        assert_eq!(v["adjusted"], true);
        assert!(v["steps"].is_null());
    }

    #[test]
    fn step_limit_is_not_a_clean_exit() {
        let o = CalibrationOutcome::StepLimitReached {
            steps: 10,
            consecutive_unadjusted: 1,
        };
        assert_eq!(exit_code_for_outcome(&o), 3);
        assert_eq!(exit_code_for_outcome(&CalibrationOutcome::NotHomed), 0);
    }
}
