#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and probe-script parsing for the knob leveler.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The probe-script CSV loader enforces its header and accepts `nan`
//!   rows to stand in for failed probe reads.
use serde::Deserialize;

/// One of the four knob positions, as spelled in the TOML file.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CornerName {
    SouthWest,
    NorthWest,
    NorthEast,
    #[default]
    SouthEast,
}

#[derive(Debug, Deserialize)]
pub struct Bed {
    pub south_west: [f32; 2],
    pub north_west: [f32; 2],
    pub north_east: [f32; 2],
    pub south_east: [f32; 2],
    /// Distance along Y from the knob center to either lever endpoint.
    #[serde(default = "default_knob_offset_mm")]
    pub knob_offset_mm: f32,
    /// The head is raised to this Z before the first XY move.
    #[serde(default = "default_z_clearance_mm")]
    pub z_clearance_mm: f32,
}

fn default_knob_offset_mm() -> f32 {
    35.0
}

fn default_z_clearance_mm() -> f32 {
    10.0
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Servos {
    /// Servo driving the south-west and north-west knobs
    pub west_index: u8,
    /// Servo driving the north-east and south-east knobs
    pub east_index: u8,
    pub engaged_deg: u16,
    pub disengaged_deg: u16,
    /// Wait after each angle command so the horn reaches its position
    pub settle_ms: u64,
}

impl Default for Servos {
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Leveling {
    /// A corner is level once |z| <= tolerance_mm
    pub tolerance_mm: f32,
    /// Blend toward the knob center for small corrections. Range: [0.0, 1.0].
    pub small_step_blend: f32,
    /// Seed corner; the scan probes the corner after this one first.
    pub start_after: CornerName,
    /// Optional cap on scan steps. Absent means the scan runs until it converges.
    pub max_steps: Option<u32>,
}

impl Default for Leveling {
    fn default() -> Self {
        Self {
            tolerance_mm: 0.015,
            small_step_blend: 0.6,
            start_after: CornerName::SouthEast,
            max_steps: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Simulation {
    pub homed: bool,
    pub start_z_mm: f32,
    /// Initial bed height error per corner, ordered SW, NW, NE, SE.
    pub corner_heights_mm: [f32; 4],
    /// Height change produced by one full lever throw
    pub mm_per_throw: f32,
    /// Probe stops triggering after this many samples (unset = never).
    pub probe_timeout_after: Option<u32>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            homed: true,
            start_z_mm: 0.0,
            corner_heights_mm: [0.0; 4],
            mm_per_throw: 0.02,
            probe_timeout_after: None,
        }
    }
}

/// PWM wiring for the `hardware` servo backend.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pwm {
    pub west_channel: u8,
    pub east_channel: u8,
    pub period_ms: u64,
    /// Pulse width at 0°
    pub pulse_min_us: u64,
    /// Pulse width at 180°
    pub pulse_max_us: u64,
}

impl Default for Pwm {
    fn default() -> Self {
        Self {
            west_channel: 0,
            east_channel: 1,
            period_ms: 20,
            pulse_min_us: 500,
            pulse_max_us: 2500,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub bed: Bed,
    #[serde(default)]
    pub servos: Servos,
    #[serde(default)]
    pub leveling: Leveling,
    #[serde(default)]
    pub simulation: Simulation,
    #[serde(default)]
    pub pwm: Pwm,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Probe-script CSV schema.
///
/// Expected headers:
/// z_mm
///
/// Example:
/// z_mm
/// 0.021
/// nan
/// -0.004
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ProbeScriptRow {
    pub z_mm: f32,
}

/// Load a scripted sequence of probe readings. `nan` rows are kept as-is.
pub fn load_probe_script_csv(path: &std::path::Path) -> eyre::Result<Vec<f32>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open probe script CSV {:?}: {}", path, e))?;

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != ["z_mm"] {
        eyre::bail!(
            "probe script CSV must have header 'z_mm', got: {}",
            actual.join(",")
        );
    }

    let mut samples = Vec::new();
    for (idx, rec) in rdr.deserialize::<ProbeScriptRow>().enumerate() {
        match rec {
            Ok(row) => samples.push(row.z_mm),
            Err(e) => eyre::bail!("invalid CSV row {}: {}", idx + 2, e),
        }
    }
    if samples.is_empty() {
        eyre::bail!("probe script CSV {:?} has no rows", path);
    }
    Ok(samples)
}

fn finite_xy(v: [f32; 2]) -> bool {
    v[0].is_finite() && v[1].is_finite()
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Bed
        for (name, pos) in [
            ("south_west", self.bed.south_west),
            ("north_west", self.bed.north_west),
            ("north_east", self.bed.north_east),
            ("south_east", self.bed.south_east),
        ] {
            if !finite_xy(pos) {
                eyre::bail!("bed.{name} must be a finite [x, y] pair");
            }
        }
        if !(self.bed.knob_offset_mm.is_finite() && self.bed.knob_offset_mm > 0.0) {
            eyre::bail!("bed.knob_offset_mm must be > 0");
        }
        if !self.bed.z_clearance_mm.is_finite() || self.bed.z_clearance_mm < 0.0 {
            eyre::bail!("bed.z_clearance_mm must be >= 0");
        }

        // Servos
        if self.servos.engaged_deg > 180 || self.servos.disengaged_deg > 180 {
            eyre::bail!("servos angles must be in [0, 180]");
        }
        if self.servos.engaged_deg == self.servos.disengaged_deg {
            eyre::bail!("servos.engaged_deg must differ from servos.disengaged_deg");
        }
        if self.servos.settle_ms > 10_000 {
            eyre::bail!("servos.settle_ms is unreasonably large (>10s)");
        }

        // Leveling
        if !(self.leveling.tolerance_mm.is_finite() && self.leveling.tolerance_mm > 0.0) {
            eyre::bail!("leveling.tolerance_mm must be > 0");
        }
        if !(0.0..=1.0).contains(&self.leveling.small_step_blend) {
            eyre::bail!("leveling.small_step_blend must be in [0.0, 1.0]");
        }
        if self.leveling.max_steps == Some(0) {
            eyre::bail!("leveling.max_steps must be >= 1 when set");
        }

        // Simulation
        if !(self.simulation.mm_per_throw.is_finite() && self.simulation.mm_per_throw > 0.0) {
            eyre::bail!("simulation.mm_per_throw must be > 0");
        }
        if !self.simulation.start_z_mm.is_finite() {
            eyre::bail!("simulation.start_z_mm must be finite");
        }
        if self.simulation.corner_heights_mm.iter().any(|h| !h.is_finite()) {
            eyre::bail!("simulation.corner_heights_mm must be finite");
        }

        // PWM
        if self.pwm.period_ms == 0 {
            eyre::bail!("pwm.period_ms must be >= 1");
        }
        if self.pwm.pulse_min_us >= self.pwm.pulse_max_us {
            eyre::bail!("pwm.pulse_min_us must be < pwm.pulse_max_us");
        }
        if self.pwm.pulse_max_us > self.pwm.period_ms.saturating_mul(1000) {
            eyre::bail!("pwm.pulse_max_us must fit inside pwm.period_ms");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[bed]
south_west = [40.0, 40.0]
north_west = [40.0, 260.0]
north_east = [260.0, 260.0]
south_east = [260.0, 40.0]
"#;

    #[test]
    fn minimal_config_takes_firmware_defaults() {
        let cfg = load_toml(MINIMAL).expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(cfg.bed.knob_offset_mm, 35.0);
        assert_eq!(cfg.servos.west_index, 1);
        assert_eq!(cfg.servos.east_index, 3);
        assert_eq!(cfg.leveling.tolerance_mm, 0.015);
        assert_eq!(cfg.leveling.start_after, CornerName::SouthEast);
        assert!(cfg.leveling.max_steps.is_none());
    }

    #[test]
    fn start_after_parses_snake_case() {
        let toml = format!("{MINIMAL}\n[leveling]\nstart_after = \"north_west\"\n");
        let cfg = load_toml(&toml).expect("parse");
        assert_eq!(cfg.leveling.start_after, CornerName::NorthWest);
    }

    #[test]
    fn unknown_corner_name_is_a_parse_error() {
        let toml = format!("{MINIMAL}\n[leveling]\nstart_after = \"middle\"\n");
        assert!(load_toml(&toml).is_err());
    }
}
