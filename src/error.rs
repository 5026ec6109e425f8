use thiserror::Error;

/// Why a [`PrescribedTwoAxisConfig`](crate::PrescribedTwoAxisConfig) was rejected.
///
/// All of these are detected once, when the propagator is constructed. Stepping an accepted
/// configuration never fails.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// A joint rotation axis does not have unit length.
    #[error("rotation axis {axis} has norm {norm}, expected 1")]
    NonUnitAxis { axis: u8, norm: f64 },

    /// A joint rotation axis has a NaN or infinite component.
    #[error("rotation axis {axis} has non-finite components")]
    NonFiniteAxis { axis: u8 },

    #[error("maximum angular acceleration must be positive and finite, got {0} rad/s²")]
    NonPositiveAcceleration(f64),

    /// One of the translational offsets has a NaN or infinite component.
    #[error("translational offset `{0}` has non-finite components")]
    NonFiniteOffset(&'static str),
}
