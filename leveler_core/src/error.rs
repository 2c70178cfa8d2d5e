use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum LevelerError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("timeout waiting for probe")]
    Timeout,
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing motion")]
    MissingMotion,
    #[error("missing probe")]
    MissingProbe,
    #[error("missing servos")]
    MissingServos,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
