use crate::Vector3;
use std::fmt::{self, Display, Formatter};
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Marks a reference frame that [`FrameVector`]s can be expressed in.
///
/// While you _can_ implement this trait directly, prefer using [`frame!`](crate::frame).
pub trait Frame {
    /// Short label used when printing vectors in this frame (eg, `M` for the mount frame).
    const LABEL: &'static str;
}

/// Defines a new reference frame.
///
/// A frame is a zero-sized type used only to mark [`FrameVector`]s with the frame their components
/// are expressed in. It does not know its relation to any other frame.
///
/// ```rust
/// # use prescribed_motion::frame;
/// frame!(pub struct Hinge labelled "H");
/// ```
#[macro_export]
macro_rules! frame {
    ($(#[$attr:meta])* $vis:vis struct $name:ident labelled $label:literal) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        $vis struct $name;

        impl $crate::frames::Frame for $name {
            const LABEL: &'static str = $label;
        }
    };
}

frame! {
    /// The frame fixed to the spacecraft structure that the mechanism base is attached to.
    ///
    /// Rotation axes and translational offsets are expressed in this frame.
    pub struct Mount labelled "M"
}

frame! {
    /// The frame fixed to the moving end of the mechanism.
    ///
    /// Prescribed angular velocity and angular acceleration are expressed in this frame.
    pub struct Tip labelled "F"
}

/// A Cartesian 3-vector whose components are expressed in the [`Frame`] `In`.
///
/// The frame marker makes it a type error to, say, hand an angular velocity expressed in the mount
/// frame to a consumer that expects it in the tip frame.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
// don't require In: Serialize/Deserialize since we skip it anyway
#[cfg_attr(feature = "serde", serde(bound = ""))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FrameVector<In> {
    pub(crate) inner: Vector3,
    #[cfg_attr(feature = "serde", serde(skip))]
    frame: PhantomData<In>,
}

// manual impls of Clone and Copy to avoid requiring In: Copy + Clone
impl<In> Clone for FrameVector<In> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<In> Copy for FrameVector<In> {}

impl<In> PartialEq<Self> for FrameVector<In> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.eq(&other.inner)
    }
}

impl<In> Default for FrameVector<In> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<In> FrameVector<In> {
    /// Constructs a vector from its x, y, and z components in `In`.
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self::from_components(Vector3::new(x, y, z))
    }

    /// Constructs a vector whose components in `In` are given by `components`.
    #[must_use]
    pub fn from_components(components: Vector3) -> Self {
        Self {
            inner: components,
            frame: PhantomData,
        }
    }

    /// The zero vector.
    #[must_use]
    pub fn zero() -> Self {
        Self::from_components(Vector3::zeros())
    }

    /// Returns the components of this vector in `In`.
    #[must_use]
    pub fn components(&self) -> Vector3 {
        self.inner
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.inner.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.inner.y
    }

    #[must_use]
    pub fn z(&self) -> f64 {
        self.inner.z
    }

    /// Euclidean norm.
    #[must_use]
    pub fn norm(&self) -> f64 {
        self.inner.norm()
    }

    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.inner.dot(&other.inner)
    }

    /// Returns true if every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.inner.iter().all(|c| c.is_finite())
    }
}

impl<In: Frame> Display for FrameVector<In> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}]_{}",
            self.inner.x,
            self.inner.y,
            self.inner.z,
            In::LABEL
        )
    }
}

impl<In> Add for FrameVector<In> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_components(self.inner + rhs.inner)
    }
}

impl<In> AddAssign for FrameVector<In> {
    fn add_assign(&mut self, rhs: Self) {
        self.inner += rhs.inner;
    }
}

impl<In> Sub for FrameVector<In> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::from_components(self.inner - rhs.inner)
    }
}

impl<In> Neg for FrameVector<In> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::from_components(-self.inner)
    }
}

impl<In> Mul<f64> for FrameVector<In> {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::from_components(self.inner * rhs)
    }
}

impl<In> Div<f64> for FrameVector<In> {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self::from_components(self.inner / rhs)
    }
}

#[cfg(any(test, feature = "approx"))]
impl<In> AbsDiffEq<Self> for FrameVector<In> {
    type Epsilon = <f64 as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        // rad/s and rad/s² are what we mostly compare, so this is tight on purpose
        1e-12
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.inner.abs_diff_eq(&other.inner, epsilon)
    }
}

#[cfg(any(test, feature = "approx"))]
impl<In> RelativeEq for FrameVector<In> {
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
