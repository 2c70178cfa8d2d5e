//! Maps `Box<dyn Error>` from trait boundaries to typed `LevelerError`.
//!
//! The traits in `leveler_traits` use `Box<dyn Error + Send + Sync>`; this
//! module converts those to our typed error enum, with an optional
//! feature-gated path for `leveler_hardware::HwError` downcasting.

use crate::error::LevelerError;

/// Map a trait-boundary error to a typed `LevelerError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> LevelerError {
    #[cfg(feature = "hardware-errors")]
    {
        use leveler_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::ProbeTimeout => LevelerError::Timeout,
                HwError::NotHomed => LevelerError::State(hw.to_string()),
                other => LevelerError::HardwareFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        LevelerError::Timeout
    } else {
        LevelerError::Hardware(s)
    }
}

/// Convert a boxed collaborator error into an `eyre::Report` carrying a `LevelerError`.
pub(crate) fn hw(e: leveler_traits::BoxError) -> eyre::Report {
    eyre::Report::new(map_hw_error(&*e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_text_maps_to_timeout() {
        let e: leveler_traits::BoxError = "probe timeout".into();
        assert!(matches!(map_hw_error(&*e), LevelerError::Timeout));
    }

    #[test]
    fn other_text_maps_to_hardware() {
        let e: leveler_traits::BoxError = "servo bus jammed".into();
        match map_hw_error(&*e) {
            LevelerError::Hardware(msg) => assert!(msg.contains("jammed")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hw_errors_are_downcast() {
        use leveler_hardware::error::HwError;
        let e: leveler_traits::BoxError = Box::new(HwError::UnknownServo(7));
        assert!(matches!(map_hw_error(&*e), LevelerError::HardwareFault(_)));
        let e: leveler_traits::BoxError = Box::new(HwError::ProbeTimeout);
        assert!(matches!(map_hw_error(&*e), LevelerError::Timeout));
    }
}
