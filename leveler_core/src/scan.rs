//! Progress bookkeeping for a full-bed scan.

use crate::config::CONVERGED_RUN_LENGTH;
use crate::geometry::Corner;

/// Lives for one full-bed invocation.
#[derive(Debug, Clone)]
pub struct ScanState {
    current: Corner,
    consecutive_unadjusted: u8,
    steps: u32,
}

impl ScanState {
    /// `seed` is never probed first; the first `advance` moves past it.
    pub fn new(seed: Corner) -> Self {
        Self {
            current: seed,
            consecutive_unadjusted: 0,
            steps: 0,
        }
    }

    /// Move to the next corner in visiting order and count the step.
    pub fn advance(&mut self) -> Corner {
        self.current = self.current.next();
        self.steps = self.steps.saturating_add(1);
        self.current
    }

    /// Record the result of the current step.
    pub fn record(&mut self, adjusted: bool) {
        if adjusted {
            self.consecutive_unadjusted = 0;
        } else {
            self.consecutive_unadjusted = self.consecutive_unadjusted.saturating_add(1);
        }
    }

    #[inline]
    pub fn converged(&self) -> bool {
        self.consecutive_unadjusted >= CONVERGED_RUN_LENGTH
    }

    #[inline]
    pub fn current(&self) -> Corner {
        self.current
    }

    #[inline]
    pub fn steps(&self) -> u32 {
        self.steps
    }

    #[inline]
    pub fn consecutive_unadjusted(&self) -> u8 {
        self.consecutive_unadjusted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_quiet_points_converge() {
        let mut s = ScanState::new(Corner::SouthEast);
        for expected in Corner::ALL {
            assert!(!s.converged());
            assert_eq!(s.advance(), expected);
            s.record(false);
        }
        assert!(s.converged());
        assert_eq!(s.steps(), 4);
    }

    #[test]
    fn adjustment_resets_the_run() {
        let mut s = ScanState::new(Corner::SouthWest);
        for _ in 0..3 {
            s.advance();
            s.record(false);
        }
        s.advance();
        s.record(true);
        assert_eq!(s.consecutive_unadjusted(), 0);
        assert!(!s.converged());
    }
}
