use leveler_config::load_toml;
use rstest::rstest;

const BED: &str = r#"
[bed]
south_west = [40.0, 40.0]
north_west = [40.0, 260.0]
north_east = [260.0, 260.0]
south_east = [260.0, 40.0]
knob_offset_mm = 35.0
z_clearance_mm = 10.0
"#;

fn with_section(extra: &str) -> String {
    format!("{BED}\n{extra}")
}

#[test]
fn accepts_full_config() {
    let toml = with_section(
        r#"
[servos]
west_index = 1
east_index = 3
engaged_deg = 90
disengaged_deg = 0
settle_ms = 300

[leveling]
tolerance_mm = 0.015
small_step_blend = 0.6
start_after = "south_west"
max_steps = 200

[simulation]
homed = true
start_z_mm = 2.0
corner_heights_mm = [0.05, -0.03, 0.0, 0.02]
mm_per_throw = 0.02
probe_timeout_after = 50

[logging]
level = "debug"
rotation = "daily"
"#,
    );
    let cfg = load_toml(&toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.leveling.max_steps, Some(200));
    assert_eq!(cfg.simulation.corner_heights_mm[0], 0.05);
    assert_eq!(cfg.simulation.probe_timeout_after, Some(50));
}

#[test]
fn missing_bed_section_is_a_parse_error() {
    let err = load_toml("[leveling]\ntolerance_mm = 0.02\n").expect_err("bed is required");
    assert!(format!("{err}").contains("bed"));
}

#[rstest]
#[case("[leveling]\ntolerance_mm = 0.0", "tolerance_mm must be > 0")]
#[case("[leveling]\ntolerance_mm = -0.01", "tolerance_mm must be > 0")]
#[case("[leveling]\nsmall_step_blend = 1.5", "small_step_blend must be in")]
#[case("[leveling]\nmax_steps = 0", "max_steps must be >= 1")]
#[case("[servos]\nengaged_deg = 200", "angles must be in [0, 180]")]
#[case("[servos]\nengaged_deg = 0\ndisengaged_deg = 0", "must differ")]
#[case("[servos]\nsettle_ms = 60000", "unreasonably large")]
#[case("[simulation]\nmm_per_throw = 0.0", "mm_per_throw must be > 0")]
#[case("[pwm]\npulse_min_us = 2500\npulse_max_us = 500", "pulse_min_us must be <")]
#[case("[logging]\nrotation = \"weekly\"", "rotation must be one of")]
fn rejects_out_of_range_values(#[case] section: &str, #[case] needle: &str) {
    let cfg = load_toml(&with_section(section)).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(needle),
        "expected '{needle}' in '{err}'"
    );
}

#[test]
fn rejects_non_positive_knob_offset() {
    let toml = BED.replace("knob_offset_mm = 35.0", "knob_offset_mm = 0.0");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("zero offset should fail");
    assert!(format!("{err}").contains("knob_offset_mm must be > 0"));
}
