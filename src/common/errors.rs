use thiserror::Error;

/// Contract violations reported by the resampling engine.
///
/// Every variant describes caller or configuration error. Running out of
/// input or output space is flow control and never surfaces here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResampleError {
    #[error("minFactor and maxFactor must be positive (got min={min}, max={max})")]
    NonPositiveFactorBounds { min: f64, max: f64 },

    #[error("minFactor must be <= maxFactor (got min={min}, max={max})")]
    InvertedFactorBounds { min: f64, max: f64 },

    #[error("factor {factor} is not between minFactor={min} and maxFactor={max}")]
    FactorOutOfRange { factor: f64, min: f64, max: f64 },

    #[error("invalid filter design: {0}")]
    InvalidFilter(String),
}

pub type Result<T> = std::result::Result<T, ResampleError>;
