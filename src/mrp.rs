//! Modified Rodrigues Parameters (MRPs), the stereographic attitude coordinate used throughout
//! this crate.
//!
//! An MRP describing a rotation of `Φ` about the unit axis `ê` is `σ = tan(Φ/4) ê`. The
//! representation is minimal (three numbers) but singular at `Φ = ±2π`, where `|σ|` grows without
//! bound. Every rotation also has a "shadow" MRP `σˢ = −σ / |σ|²` describing the same attitude, so
//! the singularity is avoided by always storing whichever of the two has `|σ| ≤ 1`. All
//! constructors in this module return values on that branch.
//!
//! The attitude an [`Mrp`] represents is that of the tip frame F relative to the mount frame M
//! (`σ_FM`). Interpreted as a transform, it maps components in [`Mount`] into components in
//! [`Tip`]; see [`Mrp::to_dcm`].

use crate::frames::{FrameVector, Mount, Tip};
use crate::{Matrix3, UnitQuaternion, UnitVector3, Vector3};
use nalgebra::{Quaternion, Rotation3};
use std::fmt::{self, Display, Formatter};
use uom::si::angle::radian;
use uom::si::f64::{Angle, Time};
use uom::si::time::second;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Below this, the composition-law denominator is treated as zero and one operand is swapped for
/// its shadow set.
const COMPOSITION_SINGULARITY: f64 = 1e-10;

/// Attitude of the tip frame relative to the mount frame, as Modified Rodrigues Parameters.
///
/// <div class="warning">
///
/// [`Mrp::new`] stores its components as given. Every other constructor, and every operation
/// returning an `Mrp`, yields a value with `|σ| ≤ 1`. Run values obtained from elsewhere through
/// [`Mrp::shadow_if_needed`] if you need that guarantee.
///
/// </div>
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Mrp {
    inner: Vector3,
}

impl Default for Mrp {
    fn default() -> Self {
        Self::identity()
    }
}

impl Display for Mrp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "σ = [{}, {}, {}]",
            self.inner.x, self.inner.y, self.inner.z
        )
    }
}

impl Mrp {
    /// Constructs an MRP directly from its three components.
    #[must_use]
    pub fn new(s1: f64, s2: f64, s3: f64) -> Self {
        Self {
            inner: Vector3::new(s1, s2, s3),
        }
    }

    /// Constructs an MRP directly from a component vector.
    #[must_use]
    pub fn from_vector(components: Vector3) -> Self {
        Self { inner: components }
    }

    /// The zero rotation.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            inner: Vector3::zeros(),
        }
    }

    #[must_use]
    pub fn components(&self) -> Vector3 {
        self.inner
    }

    #[must_use]
    pub fn norm(&self) -> f64 {
        self.inner.norm()
    }

    /// Constructs the MRP for a rotation of `angle` about `axis`.
    ///
    /// Any real angle is accepted, including negative angles and angles beyond a full turn. If the
    /// raw value `tan(angle/4) * axis` lies outside the unit sphere, its shadow is returned instead.
    #[must_use]
    pub fn from_axis_angle(axis: &UnitVector3, angle: impl Into<Angle>) -> Self {
        let angle = angle.into().get::<radian>();
        Self {
            inner: axis.into_inner() * (angle / 4.).tan(),
        }
        .shadow_if_needed()
    }

    /// Returns the principal rotation angle `4 atan(|σ|)`.
    ///
    /// For an MRP on the `|σ| ≤ 1` branch this is in [0, π].
    #[must_use]
    pub fn rotation_magnitude(&self) -> Angle {
        Angle::new::<radian>(4. * self.norm().atan())
    }

    /// Returns the principal rotation axis and angle, or `None` for the zero rotation (whose axis
    /// is undefined).
    #[must_use]
    pub fn to_axis_angle(&self) -> Option<(UnitVector3, Angle)> {
        let axis = UnitVector3::try_new(self.inner, f64::EPSILON)?;
        Some((axis, self.rotation_magnitude()))
    }

    /// Returns the principal rotation vector `Φ ê`.
    #[must_use]
    pub fn to_principal_rotation_vector(&self) -> Vector3 {
        match self.to_axis_angle() {
            Some((axis, angle)) => axis.into_inner() * angle.get::<radian>(),
            None => Vector3::zeros(),
        }
    }

    /// Returns the shadow set `−σ / |σ|²`, which describes the same attitude.
    ///
    /// The zero rotation has no finite shadow and is returned unchanged.
    #[must_use]
    pub fn shadow(&self) -> Self {
        let norm_squared = self.inner.norm_squared();
        if norm_squared == 0. {
            return *self;
        }
        Self {
            inner: -self.inner / norm_squared,
        }
    }

    /// Returns the shadow set if `|σ| > 1`, and `self` otherwise.
    ///
    /// This keeps the stored parameters away from the singularity at a full rotation. The branch
    /// that divides is only taken when the divisor exceeds one.
    #[must_use]
    pub fn shadow_if_needed(self) -> Self {
        if self.inner.norm_squared() > 1. {
            self.shadow()
        } else {
            self
        }
    }

    /// Returns the attitude reached by first rotating by `self` and then by `then`, where both
    /// rotations are about axes fixed in the mount frame.
    ///
    /// This is the MRP composition law; it is equivalent to multiplying the corresponding
    /// quaternions as `then * self`.
    #[must_use]
    pub fn compose(self, then: Self) -> Self {
        let denominator = |a: &Vector3, b: &Vector3| {
            1. + a.norm_squared() * b.norm_squared() - 2. * a.dot(b)
        };

        // the denominator vanishes when the combined rotation is a full turn. swapping the first
        // operand for its shadow describes the same rotation but moves us off that point.
        let mut first = self.inner;
        if denominator(&first, &then.inner).abs() < COMPOSITION_SINGULARITY {
            first = self.shadow().inner;
        }
        let b = then.inner;

        let numerator = (1. - b.norm_squared()) * first
            + (1. - first.norm_squared()) * b
            + 2. * b.cross(&first);

        Self {
            inner: numerator / denominator(&first, &b),
        }
        .shadow_if_needed()
    }

    /// Returns `σ̇`, the rate of change of these parameters under the angular velocity `omega` of
    /// the tip frame relative to the mount frame.
    ///
    /// ```text
    /// σ̇ = ¼ [(1 − σᵀσ) I + 2 [σ×] + 2 σ σᵀ] ω
    /// ```
    #[must_use]
    pub fn kinematic_rate(&self, omega: FrameVector<Tip>) -> Vector3 {
        kinematic_rate(&self.inner, &omega.inner)
    }

    /// Integrates the MRP kinematic equation over `dt` under a constant `omega` using one
    /// fourth-order Runge-Kutta step.
    ///
    /// Closed-form attitudes are preferred wherever the rotation axis is known; this is meant for
    /// cross-checking those.
    #[must_use]
    pub fn propagate(&self, omega: FrameVector<Tip>, dt: impl Into<Time>) -> Self {
        let dt = dt.into().get::<second>();
        let w = omega.inner;
        let s = self.inner;

        let k1 = kinematic_rate(&s, &w);
        let k2 = kinematic_rate(&(s + k1 * (dt / 2.)), &w);
        let k3 = kinematic_rate(&(s + k2 * (dt / 2.)), &w);
        let k4 = kinematic_rate(&(s + k3 * dt), &w);

        Self {
            inner: s + (k1 + k2 * 2. + k3 * 2. + k4) * (dt / 6.),
        }
        .shadow_if_needed()
    }

    /// Returns the direction cosine matrix `[FM]`, which maps components expressed in the mount
    /// frame into components expressed in the tip frame.
    #[must_use]
    pub fn to_dcm(&self) -> Matrix3 {
        let s2 = self.inner.norm_squared();
        let tilde = self.inner.cross_matrix();
        let scale = (1. + s2) * (1. + s2);

        Matrix3::identity() + (8. * tilde * tilde - 4. * (1. - s2) * tilde) / scale
    }

    /// Constructs the MRP from a direction cosine matrix `[FM]` (see [`Mrp::to_dcm`]).
    ///
    /// The matrix is assumed to be orthonormal; it is not re-orthogonalized.
    #[must_use]
    pub fn from_dcm(dcm: &Matrix3) -> Self {
        // [FM] maps vectors into F, which is the transpose of the (active) rotation that carries
        // the axes of M onto those of F.
        let active = Rotation3::from_matrix_unchecked(dcm.transpose());
        Self::from_quaternion(&UnitQuaternion::from_rotation_matrix(&active))
    }

    /// Returns the unit quaternion of the rotation that carries the mount axes onto the tip axes.
    #[must_use]
    pub fn to_quaternion(&self) -> UnitQuaternion {
        let s2 = self.inner.norm_squared();
        let w = (1. - s2) / (1. + s2);
        let v = self.inner * (2. / (1. + s2));
        UnitQuaternion::new_normalize(Quaternion::new(w, v.x, v.y, v.z))
    }

    /// Constructs the MRP equivalent to a unit quaternion (see [`Mrp::to_quaternion`]).
    #[must_use]
    pub fn from_quaternion(quaternion: &UnitQuaternion) -> Self {
        // q and -q are the same rotation; picking w ≥ 0 lands on the |σ| ≤ 1 branch and keeps the
        // divisor at least 1.
        let q = if quaternion.w < 0. {
            -quaternion.into_inner()
        } else {
            quaternion.into_inner()
        };
        Self {
            inner: q.imag() / (1. + q.w),
        }
    }

    /// Expresses a mount-frame vector in the tip frame described by this attitude.
    #[must_use]
    pub fn express_in_tip(&self, vector: FrameVector<Mount>) -> FrameVector<Tip> {
        FrameVector::from_components(self.to_dcm() * vector.inner)
    }
}

fn kinematic_rate(sigma: &Vector3, omega: &Vector3) -> Vector3 {
    let b = (1. - sigma.norm_squared()) * Matrix3::identity()
        + 2. * sigma.cross_matrix()
        + 2. * sigma * sigma.transpose();
    0.25 * b * omega
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for Mrp {
    type Epsilon = <f64 as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        1e-12
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.inner.abs_diff_eq(&other.inner, epsilon)
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for Mrp {
    fn default_max_relative() -> Self::Epsilon {
        Vector3::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.inner.relative_eq(&other.inner, epsilon, max_relative)
    }
}
