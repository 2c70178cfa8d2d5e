#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Knob-turning bed leveling (hardware-agnostic).
//!
//! All printer interactions go through the `leveler_traits` collaborators
//! (`Motion`, `Probe`, `Servos`, `BedLeveling`, `FeedrateScaling`).
//!
//! ## Architecture
//!
//! - **Geometry**: corner table, actuator mapping, lever endpoints (`geometry`)
//! - **Decision**: tolerance / small-step / large-step classification (`strategy`)
//! - **Control**: single-point correction and the converging scan (`controller`)
//! - **Bookkeeping**: consecutive-unadjusted run length (`scan`)
//! - **Outcomes**: `PointOutcome`, `CalibrationOutcome` (`status`)

pub mod builder;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod error;
pub mod geometry;
pub mod hw_error;
pub mod mocks;
pub mod runner;
pub mod scan;
pub mod status;
pub mod strategy;

pub use builder::ControllerBuilder;
pub use config::{CONVERGED_RUN_LENGTH, LevelingCfg, ServoCfg};
pub use controller::{CalibrationController, FULL_SCAN};
pub use error::{BuildError, LevelerError, Result};
pub use geometry::{Actuator, Corner, PointGeometry, interpolate};
pub use leveler_traits::XyPos;
pub use scan::ScanState;
pub use status::{CalibrationOutcome, PointOutcome, StepSize};
pub use strategy::{Plan, plan_correction};
