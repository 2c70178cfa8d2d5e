use leveler_core::error::BuildError;
use leveler_core::{CalibrationController, LevelingCfg, PointGeometry, ServoCfg};
use leveler_hardware::{SimBedCfg, SimulatedPrinter};
use rstest::rstest;

#[rstest]
fn builder_missing_probe_yields_typed_build_error() {
    let sim = SimulatedPrinter::new(SimBedCfg::default());
    let err = CalibrationController::builder()
        .with_motion(sim.motion())
        // missing with_probe()
        .with_servos(sim.servos())
        .try_build()
        .expect_err("should fail with MissingProbe");

    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingProbe) => {}
        other => panic!("expected MissingProbe, got: {other:?}"),
    }
}

#[rstest]
fn builder_missing_everything_reports_motion_first() {
    let err = CalibrationController::builder()
        .try_build()
        .expect_err("empty builder");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingMotion)
    ));
}

#[rstest]
fn builder_missing_servos_yields_typed_build_error() {
    let sim = SimulatedPrinter::new(SimBedCfg::default());
    let err = CalibrationController::builder()
        .with_motion(sim.motion())
        .with_probe(sim.probe())
        .try_build()
        .expect_err("should fail with MissingServos");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingServos)
    ));
}

#[rstest]
#[case::zero_tolerance(LevelingCfg { tolerance_mm: 0.0, ..LevelingCfg::default() }, "tolerance_mm")]
#[case::nan_tolerance(LevelingCfg { tolerance_mm: f32::NAN, ..LevelingCfg::default() }, "tolerance_mm")]
#[case::blend_above_one(LevelingCfg { small_step_blend: 1.5, ..LevelingCfg::default() }, "small_step_blend")]
#[case::negative_clearance(LevelingCfg { z_clearance_mm: -1.0, ..LevelingCfg::default() }, "z_clearance_mm")]
#[case::zero_step_cap(LevelingCfg { max_steps: Some(0), ..LevelingCfg::default() }, "max_steps")]
fn invalid_leveling_cfg_is_rejected(#[case] cfg: LevelingCfg, #[case] needle: &str) {
    let sim = SimulatedPrinter::new(SimBedCfg::default());
    let err = CalibrationController::builder()
        .with_motion(sim.motion())
        .with_probe(sim.probe())
        .with_servos(sim.servos())
        .with_leveling_cfg(cfg)
        .build()
        .expect_err("invalid cfg");
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::InvalidConfig(msg)) => assert!(msg.contains(needle), "{msg}"),
        other => panic!("expected InvalidConfig, got: {other:?}"),
    }
}

#[rstest]
fn equal_servo_angles_are_rejected() {
    let sim = SimulatedPrinter::new(SimBedCfg::default());
    let err = CalibrationController::builder()
        .with_motion(sim.motion())
        .with_probe(sim.probe())
        .with_servos(sim.servos())
        .with_servo_cfg(ServoCfg {
            engaged_deg: 45,
            disengaged_deg: 45,
            ..ServoCfg::default()
        })
        .build()
        .expect_err("equal angles");
    assert!(err.to_string().contains("differ"));
}

#[rstest]
fn non_positive_knob_offset_is_rejected() {
    let sim = SimulatedPrinter::new(SimBedCfg::default());
    let err = CalibrationController::builder()
        .with_motion(sim.motion())
        .with_probe(sim.probe())
        .with_servos(sim.servos())
        .with_geometry(PointGeometry {
            knob_offset_mm: 0.0,
            ..PointGeometry::default()
        })
        .build()
        .expect_err("zero offset");
    assert!(err.to_string().contains("knob_offset_mm"));
}

#[rstest]
fn defaults_fill_in_optional_pieces() {
    let sim = SimulatedPrinter::new(SimBedCfg::default());
    let c = CalibrationController::builder()
        .with_motion(sim.motion())
        .with_probe(sim.probe())
        .with_servos(sim.servos())
        .build()
        .expect("build with defaults");
    assert_eq!(c.geometry(), &PointGeometry::default());
    assert_eq!(c.leveling_cfg().tolerance_mm, 0.015);
    assert_eq!(c.servo_cfg().east_index, 3);
}
