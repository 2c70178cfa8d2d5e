//! Hardware PWM servo backend (Raspberry Pi, via rppal).

use std::time::Duration;

use leveler_traits::{BoxError, Servos};
use rppal::pwm::{Channel, Polarity, Pwm};

use crate::error::{HwError, Result};
use crate::util::angle_to_pulse_us;

#[derive(Debug, Clone, Copy)]
pub struct PwmTiming {
    pub period_ms: u64,
    pub pulse_min_us: u64,
    pub pulse_max_us: u64,
}

fn channel(n: u8) -> Result<Channel> {
    match n {
        0 => Ok(Channel::Pwm0),
        1 => Ok(Channel::Pwm1),
        other => Err(HwError::Pwm(format!("no PWM channel {other}"))),
    }
}

/// Two hobby servos on the two hardware PWM channels.
pub struct PwmServos {
    west_index: u8,
    east_index: u8,
    west: Pwm,
    east: Pwm,
    timing: PwmTiming,
}

impl PwmServos {
    /// Channels start disabled so the levers stay limp until first commanded.
    pub fn new(
        west_index: u8,
        west_channel: u8,
        east_index: u8,
        east_channel: u8,
        timing: PwmTiming,
    ) -> Result<Self> {
        let open = |ch: u8| -> Result<Pwm> {
            Pwm::with_period(
                channel(ch)?,
                Duration::from_millis(timing.period_ms),
                Duration::from_micros(timing.pulse_min_us),
                Polarity::Normal,
                false,
            )
            .map_err(|e| HwError::Pwm(e.to_string()))
        };
        Ok(Self {
            west_index,
            east_index,
            west: open(west_channel)?,
            east: open(east_channel)?,
            timing,
        })
    }

    fn pwm(&self, index: u8) -> Result<&Pwm> {
        if index == self.west_index {
            Ok(&self.west)
        } else if index == self.east_index {
            Ok(&self.east)
        } else {
            Err(HwError::UnknownServo(index))
        }
    }
}

impl Servos for PwmServos {
    fn set_angle(&mut self, index: u8, degrees: u16) -> std::result::Result<(), BoxError> {
        let pulse = angle_to_pulse_us(degrees, self.timing.pulse_min_us, self.timing.pulse_max_us);
        let pwm = self.pwm(index)?;
        pwm.set_pulse_width(Duration::from_micros(pulse))
            .map_err(|e| HwError::Pwm(e.to_string()))?;
        pwm.enable().map_err(|e| HwError::Pwm(e.to_string()))?;
        tracing::debug!(servo = index, degrees, pulse_us = pulse, "pwm servo move");
        Ok(())
    }

    fn detach(&mut self, index: u8) -> std::result::Result<(), BoxError> {
        self.pwm(index)?
            .disable()
            .map_err(|e| HwError::Pwm(e.to_string()))?;
        Ok(())
    }
}
