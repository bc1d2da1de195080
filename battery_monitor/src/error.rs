use thiserror::Error;

/// Faults the monitor handles locally. None of them stops the control loop.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The reference channel read 0 or the upper rail, no factor can be derived from it
    #[error("reference reading {raw} is not plausible")]
    InvalidReference { raw: u16 },

    #[error("display did not respond")]
    DisplayUnavailable,

    #[error("telemetry transport did not respond")]
    TransportUnavailable,
}
