use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

const BED: &str = r#"
[bed]
south_west = [40.0, 40.0]
north_west = [40.0, 260.0]
north_east = [260.0, 260.0]
south_east = [260.0, 40.0]
knob_offset_mm = 35.0
z_clearance_mm = 10.0

[servos]
# no settle wait so sim runs finish instantly
settle_ms = 0
"#;

fn write_config(dir: &tempfile::TempDir, extra: &str) -> PathBuf {
    let path = dir.path().join("cfg.toml");
    fs::write(&path, format!("{BED}\n{extra}")).unwrap();
    path
}

// Tilted simulated bed that levels out in a few laps
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    write_config(
        dir,
        r#"
[simulation]
corner_heights_mm = [0.08, -0.04, 0.02, -0.12]
"#,
    )
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["level"], 0, "done after steps", "stdout")]
#[case(&["level", "-R", "-1"], 0, "done after steps", "stdout")]
#[case(&["level", "-R", "2"], 0, "north_east", "stdout")]
#[case(&["level", "--point", "0"], 0, "south_west", "stdout")]
#[case(&["level", "-R", "7"], 0, "R index out of range (7)", "stdout")]
#[case(&["level", "-R", "abc"], 2, "invalid value", "stderr")]
#[case(&["bogus"], 2, "unrecognized subcommand", "stderr")]
#[case(&["self-check"], 0, "self-check ok", "stdout")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("leveler").unwrap();

    // Always include a valid config to avoid relying on default path
    cmd.arg("--config").arg(&cfg).arg("--log-level").arg("error");

    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);

    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn unhomed_printer_reports_needs_homing() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[simulation]\nhomed = false\n");

    Command::cargo_bin("leveler")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("level")
        .assert()
        .success()
        .stdout(predicate::str::contains("needs homing"));
}

#[rstest]
fn step_cap_exits_with_code_3() {
    let dir = tempdir().unwrap();
    let cfg = write_config(
        &dir,
        r#"
[leveling]
max_steps = 2

[simulation]
corner_heights_mm = [0.5, 0.5, 0.5, 0.5]
"#,
    );

    Command::cargo_bin("leveler")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("level")
        .assert()
        .code(3)
        .stdout(predicate::str::contains("stopped after 2 steps"));
}

#[rstest]
fn probe_timeout_exits_with_code_4() {
    let dir = tempdir().unwrap();
    let cfg = write_config(
        &dir,
        r#"
[simulation]
corner_heights_mm = [0.1, 0.1, 0.1, 0.1]
probe_timeout_after = 1
"#,
    );

    Command::cargo_bin("leveler")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("level")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("probe did not trigger"));
}

#[rstest]
fn invalid_config_is_explained() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[leveling]\ntolerance_mm = 0.0\n");

    Command::cargo_bin("leveler")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("level")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("tolerance_mm"));
}

#[rstest]
fn missing_config_file_fails() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("leveler")
        .unwrap()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("self-check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.toml"));
}

#[rstest]
fn scripted_probe_drives_the_run() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let script = dir.path().join("probe.csv");
    let mut f = fs::File::create(&script).unwrap();
    writeln!(f, "z_mm").unwrap();
    for z in [0.02, 0.02, 0.02, 0.02, 0.01, 0.01, 0.01, 0.01] {
        writeln!(f, "{z}").unwrap();
    }

    Command::cargo_bin("leveler")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--probe-script")
        .arg(&script)
        .arg("level")
        .assert()
        .success()
        .stdout(predicate::str::contains("done after steps: 8"));
}

#[rstest]
fn cli_reports_bad_probe_script_header() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    // Write a bad-header CSV
    let bad_csv = dir.path().join("probe.csv");
    let mut f = fs::File::create(&bad_csv).unwrap();
    writeln!(f, "z").unwrap();
    writeln!(f, "0.01").unwrap();

    Command::cargo_bin("leveler")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--probe-script")
        .arg(&bad_csv)
        .arg("self-check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid header"));
}
