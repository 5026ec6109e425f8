//! Values exchanged with the simulation harness on every step.

use crate::frames::{FrameVector, Mount, Tip};
use crate::mrp::Mrp;
use crate::profile::Phase;
use uom::si::angle::radian;
use uom::si::angular_velocity::radian_per_second;
use uom::si::f64::{Angle, AngularVelocity};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Commanded joint angles and joint rates.
///
/// Only rest-to-rest maneuvers are flown; the rates are carried for completeness but are not
/// tracked.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TwoAxisReference {
    pub theta1: Angle,
    pub theta2: Angle,
    #[cfg_attr(feature = "serde", serde(default = "zero_rate"))]
    pub theta_dot1: AngularVelocity,
    #[cfg_attr(feature = "serde", serde(default = "zero_rate"))]
    pub theta_dot2: AngularVelocity,
}

#[cfg(feature = "serde")]
fn zero_rate() -> AngularVelocity {
    AngularVelocity::new::<radian_per_second>(0.)
}

impl TwoAxisReference {
    /// A reference to hold the two joints at rest at the given angles.
    #[must_use]
    pub fn at_rest(theta1: impl Into<Angle>, theta2: impl Into<Angle>) -> Self {
        Self {
            theta1: theta1.into(),
            theta2: theta2.into(),
            theta_dot1: AngularVelocity::new::<radian_per_second>(0.),
            theta_dot2: AngularVelocity::new::<radian_per_second>(0.),
        }
    }

    pub(crate) fn has_rates(&self) -> bool {
        self.theta_dot1.get::<radian_per_second>() != 0.
            || self.theta_dot2.get::<radian_per_second>() != 0.
    }

    /// Returns true if either joint angle differs from `other`'s by more than `tolerance` radians.
    pub(crate) fn differs_from(&self, other: &Self, tolerance: f64) -> bool {
        (self.theta1 - other.theta1).get::<radian>().abs() > tolerance
            || (self.theta2 - other.theta2).get::<radian>().abs() > tolerance
    }
}

/// Full kinematic state of the tip frame `F` relative to the mount frame `M`.
///
/// Translational quantities are expressed in `M`; rotational rates are expressed in `F`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrescribedMotionState {
    /// Position of the origin of `F` relative to the origin of `M`.
    pub r_fm_m: FrameVector<Mount>,
    /// First time derivative of [`PrescribedMotionState::r_fm_m`] as seen from `M`.
    pub r_prime_fm_m: FrameVector<Mount>,
    /// Second time derivative of [`PrescribedMotionState::r_fm_m`] as seen from `M`.
    pub r_prime_prime_fm_m: FrameVector<Mount>,
    /// Angular velocity of `F` relative to `M`.
    pub omega_fm_f: FrameVector<Tip>,
    /// Time derivative of [`PrescribedMotionState::omega_fm_f`] as seen from `F`.
    pub omega_prime_fm_f: FrameVector<Tip>,
    /// Attitude of `F` relative to `M`.
    pub sigma_fm: Mrp,
}

/// Scalar progress of the effective rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpinningBodyState {
    pub theta: Angle,
    pub theta_dot: AngularVelocity,
}

/// Per-joint progress, so that each joint can be driven on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TwoAxisState {
    pub theta1: Angle,
    pub theta2: Angle,
    pub theta_dot1: AngularVelocity,
    pub theta_dot2: AngularVelocity,
}

/// Everything published after one call to
/// [`PrescribedTwoAxis::update`](crate::PrescribedTwoAxis::update).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepOutput {
    pub prescribed: PrescribedMotionState,
    pub spinning_body: SpinningBodyState,
    pub joints: TwoAxisState,
    pub phase: Phase,
}

#[cfg(test)]
mod tests {
    use super::{PrescribedMotionState, TwoAxisReference};
    use std::f64::consts::PI;
    use uom::si::angle::{degree, radian};
    use uom::si::angular_velocity::radian_per_second;
    use uom::si::f64::{Angle, AngularVelocity};

    #[test]
    fn reference_change_uses_tolerance() {
        let base = TwoAxisReference::at_rest(
            Angle::new::<radian>(PI / 3.),
            Angle::new::<radian>(PI / 3.),
        );
        let nudged = TwoAxisReference {
            theta2: Angle::new::<radian>(PI / 3. + 1e-14),
            ..base
        };
        let moved = TwoAxisReference {
            theta1: Angle::new::<degree>(61.),
            ..base
        };

        assert!(!base.differs_from(&nudged, 1e-12));
        assert!(base.differs_from(&moved, 1e-12));
        assert!(!base.has_rates());
        assert!(TwoAxisReference {
            theta_dot2: AngularVelocity::new::<radian_per_second>(0.1),
            ..base
        }
        .has_rates());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn reference_rates_default_to_zero() {
        let reference: TwoAxisReference =
            serde_yaml::from_str("{ theta1: 1.0471975511965976, theta2: 0.5 }").unwrap();
        assert_eq!(reference.theta1.get::<radian>(), 1.0471975511965976);
        assert_eq!(reference.theta2.get::<radian>(), 0.5);
        assert_eq!(reference.theta_dot1.get::<radian_per_second>(), 0.);
        assert!(!reference.has_rates());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn state_round_trips_through_yaml() {
        let state = PrescribedMotionState {
            r_fm_m: crate::FrameVector::new(0., 0., 0.25),
            sigma_fm: crate::Mrp::new(0.1, 0., -0.2),
            ..Default::default()
        };
        let ser = serde_yaml::to_string(&state).unwrap();
        let de = serde_yaml::from_str::<PrescribedMotionState>(&ser).unwrap();
        assert_eq!(state, de);
    }
}
