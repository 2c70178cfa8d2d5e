//! `From` implementations bridging `leveler_config` types to `leveler_core` types.

use leveler_config::CornerName;
use leveler_traits::XyPos;

use crate::config::{LevelingCfg, ServoCfg};
use crate::geometry::{Corner, PointGeometry};

impl From<CornerName> for Corner {
    fn from(c: CornerName) -> Self {
        match c {
            CornerName::SouthWest => Corner::SouthWest,
            CornerName::NorthWest => Corner::NorthWest,
            CornerName::NorthEast => Corner::NorthEast,
            CornerName::SouthEast => Corner::SouthEast,
        }
    }
}

// ── PointGeometry ────────────────────────────────────────────────────────────

impl From<&leveler_config::Bed> for PointGeometry {
    fn from(b: &leveler_config::Bed) -> Self {
        Self {
            positions: [
                XyPos::from(b.south_west),
                XyPos::from(b.north_west),
                XyPos::from(b.north_east),
                XyPos::from(b.south_east),
            ],
            knob_offset_mm: b.knob_offset_mm,
        }
    }
}

// ── ServoCfg ─────────────────────────────────────────────────────────────────

impl From<&leveler_config::Servos> for ServoCfg {
    fn from(s: &leveler_config::Servos) -> Self {
        Self {
            west_index: s.west_index,
            east_index: s.east_index,
            engaged_deg: s.engaged_deg,
            disengaged_deg: s.disengaged_deg,
            settle_ms: s.settle_ms,
        }
    }
}

// ── LevelingCfg ──────────────────────────────────────────────────────────────

/// Z clearance lives under `[bed]` in the TOML, so this takes the whole config.
impl From<&leveler_config::Config> for LevelingCfg {
    fn from(c: &leveler_config::Config) -> Self {
        Self {
            tolerance_mm: c.leveling.tolerance_mm,
            small_step_blend: c.leveling.small_step_blend,
            start_after: c.leveling.start_after.into(),
            max_steps: c.leveling.max_steps,
            z_clearance_mm: c.bed.z_clearance_mm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_maps_onto_runtime_config() {
        let cfg = leveler_config::load_toml(
            r#"
[bed]
south_west = [10.0, 20.0]
north_west = [10.0, 200.0]
north_east = [210.0, 200.0]
south_east = [210.0, 20.0]
knob_offset_mm = 30.0
z_clearance_mm = 5.0

[leveling]
tolerance_mm = 0.02
start_after = "north_east"
max_steps = 40
"#,
        )
        .expect("parse");

        let g = PointGeometry::from(&cfg.bed);
        assert_eq!(g.position_of(Corner::NorthWest), XyPos::new(10.0, 200.0));
        assert_eq!(g.knob_offset_mm, 30.0);

        let l = LevelingCfg::from(&cfg);
        assert_eq!(l.start_after, Corner::NorthEast);
        assert_eq!(l.max_steps, Some(40));
        assert_eq!(l.z_clearance_mm, 5.0);
        assert_eq!(l.small_step_blend, 0.6);

        let s = ServoCfg::from(&cfg.servos);
        assert_eq!((s.west_index, s.east_index), (1, 3));
    }
}
