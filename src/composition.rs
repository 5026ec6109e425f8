//! Combining the two joint rotations of the mechanism into one effective rotation.
//!
//! Both joint axes are fixed in the [`Mount`](crate::frames::Mount) frame. In general the two
//! rotations do not commute and their angles cannot simply be added; [`compose_two_axis`] uses the
//! MRP composition law instead. When both joints act about one common line, the angles _do_ add,
//! and the profile can be scheduled directly on the summed angle. Which of the two applies is
//! decided once from the axis geometry (see [`Combiner::for_axes`]).

use crate::mrp::Mrp;
use crate::UnitVector3;
use uom::si::angle::radian;
use uom::si::f64::Angle;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axes whose directions differ from a common line by less than this (as `1 − |a₁·a₂|`) are
/// treated as sharing that line.
pub const COLLINEAR_TOLERANCE: f64 = 1e-9;

/// A single rotation equivalent to the two joint rotations together.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EffectiveRotation {
    /// Rotation axis, expressed in the mount frame.
    pub axis: UnitVector3,
    /// Rotation angle about [`EffectiveRotation::axis`].
    pub angle: Angle,
}

impl EffectiveRotation {
    /// The MRP of this rotation.
    #[must_use]
    pub fn attitude(&self) -> Mrp {
        Mrp::from_axis_angle(&self.axis, self.angle)
    }
}

/// Returns the rotation equivalent to turning by `theta1` about `axis1` and then by `theta2` about
/// `axis2`, both axes being fixed in the mount frame.
///
/// The returned angle is the principal angle in [0, π]. If the two rotations cancel out, the
/// rotation axis is undefined and `axis1` is returned with a zero angle.
#[must_use]
pub fn compose_two_axis(
    axis1: &UnitVector3,
    axis2: &UnitVector3,
    theta1: impl Into<Angle>,
    theta2: impl Into<Angle>,
) -> EffectiveRotation {
    let first = Mrp::from_axis_angle(axis1, theta1);
    let second = Mrp::from_axis_angle(axis2, theta2);

    match first.compose(second).to_axis_angle() {
        Some((axis, angle)) => EffectiveRotation { axis, angle },
        None => EffectiveRotation {
            axis: *axis1,
            angle: Angle::new::<radian>(0.),
        },
    }
}

/// Turns a pair of joint angles into the single rotation the profile is scheduled along.
pub trait AxisCombiner {
    /// Returns the effective rotation for the joint angles `theta1` and `theta2`.
    fn effective_rotation(&self, theta1: Angle, theta2: Angle) -> EffectiveRotation;
}

/// Both joints act about one common line.
///
/// The joint angles add up about the first axis. For the anti-parallel mounting this means the
/// second joint is counter-wound: a positive angle on either joint advances the tip the same way
/// about the first axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharedAxis {
    axis: UnitVector3,
}

impl SharedAxis {
    #[must_use]
    pub fn new(axis: UnitVector3) -> Self {
        Self { axis }
    }
}

impl AxisCombiner for SharedAxis {
    fn effective_rotation(&self, theta1: Angle, theta2: Angle) -> EffectiveRotation {
        EffectiveRotation {
            axis: self.axis,
            angle: theta1 + theta2,
        }
    }
}

/// The joint axes are not collinear, so the rotations are composed in full.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposedAxes {
    axis1: UnitVector3,
    axis2: UnitVector3,
}

impl ComposedAxes {
    #[must_use]
    pub fn new(axis1: UnitVector3, axis2: UnitVector3) -> Self {
        Self { axis1, axis2 }
    }
}

impl AxisCombiner for ComposedAxes {
    fn effective_rotation(&self, theta1: Angle, theta2: Angle) -> EffectiveRotation {
        compose_two_axis(&self.axis1, &self.axis2, theta1, theta2)
    }
}

/// The [`AxisCombiner`] picked for a given pair of joint axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Combiner {
    Shared(SharedAxis),
    Composed(ComposedAxes),
}

impl Combiner {
    /// Picks [`SharedAxis`] when the two axes are parallel or anti-parallel, and [`ComposedAxes`]
    /// otherwise.
    #[must_use]
    pub fn for_axes(axis1: &UnitVector3, axis2: &UnitVector3) -> Self {
        if 1. - axis1.into_inner().dot(&axis2.into_inner()).abs() < COLLINEAR_TOLERANCE {
            Self::Shared(SharedAxis::new(*axis1))
        } else {
            Self::Composed(ComposedAxes::new(*axis1, *axis2))
        }
    }
}

impl AxisCombiner for Combiner {
    fn effective_rotation(&self, theta1: Angle, theta2: Angle) -> EffectiveRotation {
        match self {
            Self::Shared(shared) => shared.effective_rotation(theta1, theta2),
            Self::Composed(composed) => composed.effective_rotation(theta1, theta2),
        }
    }
}
