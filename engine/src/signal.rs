use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SignalError {
    #[error("reference price must be positive, got {0}")]
    NonPositiveReference(f64),

    #[error("non-finite input: traded={traded}, reference={reference}")]
    NonFinite { traded: f64, reference: f64 },
}

/// Spread between the traded and the reference price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub traded: f64,
    pub reference: f64,

    /// `traded - reference`. The only value ever gated on.
    pub spread: f64,

    /// `spread / reference * 100`, for reporting.
    pub percent: f64,
}

/// Derive the signal from two resolved prices.
///
/// Fails before dividing when `reference <= 0`; a missing price must be
/// handled by the caller and never substituted with zero.
pub fn evaluate(traded: f64, reference: f64) -> Result<Signal, SignalError> {
    if !traded.is_finite() || !reference.is_finite() {
        return Err(SignalError::NonFinite { traded, reference });
    }
    if reference <= 0.0 {
        return Err(SignalError::NonPositiveReference(reference));
    }

    let spread = traded - reference;

    Ok(Signal {
        traded,
        reference,
        spread,
        percent: spread / reference * 100.0,
    })
}
