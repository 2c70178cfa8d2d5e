//! Human-readable error descriptions and structured JSON error formatting.

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use leveler_core::error::{BuildError, LevelerError};

    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingMotion => {
                "What happened: No motion backend was provided to the leveling controller.\nLikely causes: The printer connection failed to initialize or was not wired into the builder.\nHow to fix: Ensure the motion backend is created and passed via with_motion(...).".to_string()
            }
            BuildError::MissingProbe => {
                "What happened: No probe was provided to the leveling controller.\nLikely causes: The probe failed to initialize or was not wired into the builder.\nHow to fix: Ensure the probe is created and passed via with_probe(...).".to_string()
            }
            BuildError::MissingServos => {
                "What happened: No servo driver was provided to the leveling controller.\nLikely causes: PWM setup failed or the servos were not wired into the builder.\nHow to fix: Ensure the servos are created and passed via with_servos(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(le) = err.downcast_ref::<LevelerError>() {
        return match le {
            LevelerError::Timeout => {
                "What happened: The probe did not trigger in time.\nLikely causes: Probe not deployed, wiring fault, or the bed is far below the expected height.\nHow to fix: Check the probe and its wiring, then home and rerun.".to_string()
            }
            LevelerError::State(msg) => format!(
                "What happened: The printer refused a move ({msg}).\nLikely causes: Axes lost their home position.\nHow to fix: Home all axes and rerun."
            ),
            LevelerError::HardwareFault(msg) | LevelerError::Hardware(msg) => format!(
                "What happened: Hardware error ({msg}).\nLikely causes: Wrong servo index or PWM channel, or a disconnected device.\nHow to fix: Check [servos] and [pwm] in the config and the wiring, then rerun."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("probe script csv must have header") {
        return "Invalid header in probe script CSV. Expected 'z_mm'.".to_string();
    }

    if lower.contains("open pwm") {
        return "What happened: Failed to open the PWM servo channels.\nLikely causes: PWM overlay not enabled or insufficient permissions.\nHow to fix: Enable the PWM overlay, check [pwm] channels, and ensure access to /sys/class/pwm.".to_string();
    }

    if lower.contains("invalid configuration") || lower.contains("must be") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Missing [bed] table or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable name for the error class, used as `reason` in JSON output.
pub fn error_reason(err: &eyre::Report) -> &'static str {
    use leveler_core::error::{BuildError, LevelerError};
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    match err.downcast_ref::<LevelerError>() {
        Some(LevelerError::Timeout) => "ProbeTimeout",
        Some(LevelerError::State(_)) => "State",
        Some(LevelerError::Hardware(_) | LevelerError::HardwareFault(_)) => "Hardware",
        None => "Error",
    }
}

/// Map typed errors to stable exit codes; anything else returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match error_reason(err) {
        "ProbeTimeout" => 4,
        "Hardware" => 5,
        "State" => 6,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": error_reason(err), "message": humanize(err) }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use leveler_core::error::{BuildError, LevelerError};

    #[test]
    fn timeout_gets_its_own_exit_code() {
        let e = eyre::Report::new(LevelerError::Timeout);
        assert_eq!(exit_code_for_error(&e), 4);
        assert!(humanize(&e).contains("probe did not trigger"));
    }

    #[test]
    fn build_errors_are_generic_failures() {
        let e = eyre::Report::new(BuildError::InvalidConfig("tolerance_mm must be > 0"));
        assert_eq!(exit_code_for_error(&e), 1);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&e)).unwrap();
        assert_eq!(v["reason"], "Build");
        assert!(v["message"].as_str().unwrap().contains("tolerance_mm"));
    }

    #[test]
    fn bad_probe_script_header_is_explained() {
        let e = eyre::eyre!("probe script CSV must have header 'z_mm', got: z");
        assert!(humanize(&e).contains("Expected 'z_mm'"));
    }
}
