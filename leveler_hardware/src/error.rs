use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("pwm error: {0}")]
    Pwm(String),
    #[error("unknown servo index {0}")]
    UnknownServo(u8),
    #[error("probe timeout")]
    ProbeTimeout,
    #[error("axes not homed")]
    NotHomed,
    #[error("probe script exhausted after {0} samples")]
    ScriptExhausted(usize),
}

pub type Result<T> = std::result::Result<T, HwError>;
