//! Collaborator seams between the leveling core and the printer.
//!
//! Every operation blocks until the physical action is complete. Errors are
//! boxed at this boundary; `leveler_core` maps them to its typed error.

pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Error type crossing the trait boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A point in bed space, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct XyPos {
    pub x: f32,
    pub y: f32,
}

impl XyPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<[f32; 2]> for XyPos {
    fn from(v: [f32; 2]) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

impl std::fmt::Display for XyPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "X{:.2} Y{:.2}", self.x, self.y)
    }
}

/// What the probe should do once the sample has been taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterProbe {
    /// Stow the probe.
    Stow,
}

pub trait Motion {
    fn move_to_xy(&mut self, pos: XyPos) -> Result<(), BoxError>;
    fn move_to_z(&mut self, z_mm: f32) -> Result<(), BoxError>;
    fn current_z(&self) -> f32;
    fn all_axes_homed(&self) -> bool;
}

pub trait Probe {
    /// Sample the bed height at `pos`, averaging `samples` readings.
    /// Returns NaN when the probe could not produce a usable reading.
    fn probe_at(&mut self, pos: XyPos, after: AfterProbe, samples: u8) -> Result<f32, BoxError>;
}

pub trait Servos {
    fn set_angle(&mut self, index: u8, degrees: u16) -> Result<(), BoxError>;
    /// Release holding torque.
    fn detach(&mut self, index: u8) -> Result<(), BoxError>;
}

pub trait BedLeveling {
    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool) -> Result<(), BoxError>;
}

/// Feedrate override state; `suspend` and `restore` are always called as a pair.
pub trait FeedrateScaling {
    fn suspend(&mut self) -> Result<(), BoxError>;
    fn restore(&mut self) -> Result<(), BoxError>;
}
