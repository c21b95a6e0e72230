use thiserror::Error;

use crate::residuals::RejectionBand;

/// Errors raised by the Lagrange interpolation kernel.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LagrangeError {
    #[error("interpolation abscissa outside the table")]
    XOutOfBounds,

    #[error("interpolation tables disagree in size")]
    DataSizeMismatch,
}

/// Errors raised by [crate::prelude::CpfInterpolator] predictions.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PredictionError {
    #[error("ephemeris has no position records")]
    NoPositionRecords,

    #[error("requested instant outside the ephemeris")]
    XInterpolatedOutOfBounds,

    #[error("interpolation tables disagree in size")]
    InterpolationDataSizeMismatch,

    #[error("requested interpolation function is not implemented")]
    UnknownInterpolator,
}

impl From<LagrangeError> for PredictionError {
    fn from(e: LagrangeError) -> Self {
        match e {
            LagrangeError::XOutOfBounds => Self::XInterpolatedOutOfBounds,
            LagrangeError::DataSizeMismatch => Self::InterpolationDataSizeMismatch,
        }
    }
}

/// Errors raised by the pass calculator.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PassError {
    #[error("ephemeris is empty or not valid")]
    EphemerisNotValid,

    #[error("requested interval is not fully covered by the ephemeris")]
    IntervalOutsideEphemeris,

    #[error("prediction failed during scan: {0}")]
    Prediction(#[from] PredictionError),
}

/// Errors raised by the full-rate residual computation.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ResidualsError {
    #[error("ephemeris has no position records")]
    EmptyEphemeris,

    #[error("observation source has no full-rate records")]
    EmptyObservations,

    #[error("session is missing the transmit wavelength")]
    MissingWavelength,

    #[error("residual computation failed: {0}")]
    CalculationFailed(#[source] PredictionError),
}

/// Errors raised by the per-bin robust statistics.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BinStatsError {
    #[error("all samples rejected within the {0} band")]
    AllRejected(RejectionBand),

    #[error("robust mean did not converge within the {0} band")]
    NotConverged(RejectionBand),

    #[error("gaussian peak refinement failed within the {0} band")]
    PeakCalculationFailed(RejectionBand),
}

/// Errors raised by the residual statistics aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StatsError {
    #[error("statistics calculation failed in every bin")]
    AllBinsFailed,
}
