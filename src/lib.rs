//! This library prescribes the rotational motion of a body driven by two rotary joints (think
//! solar array drives, antenna gimbals, or a hinged boom) for rigid-body simulations that need to
//! know where the tip is, how fast it turns, and how hard it is being accelerated.
//!
//! The mechanism is described by a [`PrescribedTwoAxisConfig`]: two joint axes fixed in the
//! [`Mount`] frame and a bound on angular acceleration. Every simulation step,
//! [`PrescribedTwoAxis::update`] takes the commanded joint angles ([`TwoAxisReference`]) and
//! returns the [`PrescribedMotionState`] of the [`Tip`] frame relative to the mount: attitude as
//! modified Rodrigues parameters ([`Mrp`]), angular velocity, and angular acceleration.
//!
//! Internally, the two joint rotations are reduced to a single [effective
//! rotation](composition::EffectiveRotation), and a rest-to-rest bang-bang profile
//! ([`profile`]) is flown along it. Angles, rates, and times at the API boundary are [`uom`]
//! quantities; vectors are tagged with the frame they are expressed in ([`FrameVector`]) so
//! that a mount-frame offset cannot be mistaken for a tip-frame rate.
//!
//! # Examples
//!
//! Slew both joints of the default mechanism by 60° and step until the tip has settled:
//!
//! ```
//! use prescribed_motion::{
//!     Phase, PrescribedTwoAxis, PrescribedTwoAxisConfig, TwoAxisReference,
//! };
//! use uom::si::angle::degree;
//! use uom::si::f64::{Angle, Time};
//! use uom::si::time::second;
//!
//! let mut propagator = PrescribedTwoAxis::new(PrescribedTwoAxisConfig::default())
//!     .expect("default configuration is valid");
//! let reference = TwoAxisReference::at_rest(
//!     Angle::new::<degree>(60.),
//!     Angle::new::<degree>(60.),
//! );
//!
//! let mut t = 0.;
//! let output = loop {
//!     let output = propagator.update(Time::new::<second>(t), &reference, None);
//!     if output.phase == Phase::Settled {
//!         break output;
//!     }
//!     t += 0.5;
//! };
//!
//! // the joints are mounted back to back, so the tip has turned by 120°
//! let turned = output.prescribed.sigma_fm.rotation_magnitude();
//! assert!((turned.get::<degree>() - 120.).abs() < 1e-9);
//! assert_eq!(output.prescribed.omega_fm_f.norm(), 0.);
//! # assert!(t > 32. && t < 33.);
//! ```

pub mod composition;
pub mod config;
mod error;
pub mod frames;
pub mod messages;
pub mod mrp;
pub mod profile;
mod propagator;

pub(crate) type Vector3 = nalgebra::Vector3<f64>;
pub(crate) type Matrix3 = nalgebra::Matrix3<f64>;
pub(crate) type UnitVector3 = nalgebra::Unit<Vector3>;
pub(crate) type UnitQuaternion = nalgebra::UnitQuaternion<f64>;

pub use config::PrescribedTwoAxisConfig;
pub use error::ConfigError;
pub use frames::{Frame, FrameVector, Mount, Tip};
pub use messages::{
    PrescribedMotionState, SpinningBodyState, StepOutput, TwoAxisReference, TwoAxisState,
};
pub use mrp::Mrp;
pub use profile::Phase;
pub use propagator::{Maneuver, PrescribedTwoAxis, REFERENCE_TOLERANCE};
