//! Stand-in collaborators for printers without mesh leveling or feedrate overrides.

use leveler_traits::BoxError;

/// Mesh leveling that is never enabled.
pub struct NoopLeveling;

impl leveler_traits::BedLeveling for NoopLeveling {
    fn is_enabled(&self) -> bool {
        false
    }
    fn set_enabled(&mut self, _enabled: bool) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Feedrate scaling with nothing to save or restore.
pub struct NoopFeedrate;

impl leveler_traits::FeedrateScaling for NoopFeedrate {
    fn suspend(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
    fn restore(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}
