pub mod error;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod pwm;
pub mod sim;
pub mod util;

pub use sim::{SimBedCfg, SimulatedPrinter};

use leveler_traits::{AfterProbe, BoxError, Probe, XyPos};

use crate::error::HwError;

/// Probe that replays a fixed list of readings in order (NaN = failed read).
/// Errors once the list is used up.
#[derive(Debug, Clone)]
pub struct ScriptedProbe {
    samples: Vec<f32>,
    idx: usize,
}

impl ScriptedProbe {
    pub fn new(samples: impl Into<Vec<f32>>) -> Self {
        Self {
            samples: samples.into(),
            idx: 0,
        }
    }

    /// Readings handed out so far.
    pub fn consumed(&self) -> usize {
        self.idx
    }
}

impl Probe for ScriptedProbe {
    fn probe_at(&mut self, pos: XyPos, _after: AfterProbe, _samples: u8) -> Result<f32, BoxError> {
        let Some(z) = self.samples.get(self.idx).copied() else {
            return Err(Box::new(HwError::ScriptExhausted(self.samples.len())));
        };
        self.idx += 1;
        tracing::debug!(%pos, z, "scripted probe sample");
        Ok(z)
    }
}
