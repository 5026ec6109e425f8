use crate::composition::{AxisCombiner, Combiner, EffectiveRotation, COLLINEAR_TOLERANCE};
use crate::config::PrescribedTwoAxisConfig;
use crate::error::ConfigError;
use crate::frames::{FrameVector, Mount};
use crate::messages::{
    PrescribedMotionState, SpinningBodyState, StepOutput, TwoAxisReference, TwoAxisState,
};
use crate::mrp::Mrp;
use crate::profile::{Phase, ProfileScheduler, ScalarState};
use std::f64::consts::TAU;
use uom::si::angle::radian;
use uom::si::angular_acceleration::radian_per_second_squared;
use uom::si::angular_velocity::radian_per_second;
use uom::si::f64::{Angle, AngularVelocity, Time};
use uom::si::time::second;

/// Joint references closer than this (in radians, per joint) to the one being flown do not start a
/// new maneuver.
pub const REFERENCE_TOLERANCE: f64 = 1e-12;

/// The maneuver currently being flown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Maneuver {
    /// The joint reference that started this maneuver.
    pub reference: TwoAxisReference,
    /// The single rotation the two joint references amount to.
    pub rotation: EffectiveRotation,
    /// Angle about [`EffectiveRotation::axis`] at the start of the maneuver.
    pub theta_init: Angle,
    /// Angle about [`EffectiveRotation::axis`] at the end of the maneuver.
    pub theta_ref: Angle,
    pub started_at: Time,
    pub duration: Time,
    joint_start: [f64; 2],
}

impl Maneuver {
    /// Joint angles when the maneuver started.
    #[must_use]
    pub fn joint_start(&self) -> (Angle, Angle) {
        (
            Angle::new::<radian>(self.joint_start[0]),
            Angle::new::<radian>(self.joint_start[1]),
        )
    }

    /// Splits the scalar progress along the effective axis onto the two joints in proportion to
    /// how far each joint has to travel.
    fn joint_state(&self, scalar: &ScalarState) -> TwoAxisState {
        let joint_ref = [
            self.reference.theta1.get::<radian>(),
            self.reference.theta2.get::<radian>(),
        ];
        let angle_to_go = (self.theta_ref - self.theta_init).get::<radian>();

        let (fraction, fraction_rate) = if angle_to_go == 0. {
            (1., 0.)
        } else {
            (
                (scalar.theta - self.theta_init).get::<radian>() / angle_to_go,
                scalar.theta_dot.get::<radian_per_second>() / angle_to_go,
            )
        };

        let [theta1, theta2] =
            [0, 1].map(|i| self.joint_start[i] + fraction * (joint_ref[i] - self.joint_start[i]));
        let [theta_dot1, theta_dot2] =
            [0, 1].map(|i| fraction_rate * (joint_ref[i] - self.joint_start[i]));

        TwoAxisState {
            theta1: Angle::new::<radian>(theta1),
            theta2: Angle::new::<radian>(theta2),
            theta_dot1: AngularVelocity::new::<radian_per_second>(theta_dot1),
            theta_dot2: AngularVelocity::new::<radian_per_second>(theta_dot2),
        }
    }
}

/// Prescribes the motion of a tip frame driven by two rotary joints.
///
/// Each call to [`PrescribedTwoAxis::update`] takes the commanded joint angles and returns the
/// attitude, angular velocity, and angular acceleration of the tip relative to its mount. The two
/// joint rotations are reduced to one effective rotation (see [`Combiner`]), along which a
/// rest-to-rest bang-bang profile is flown. A change of joint reference restarts the profile from
/// wherever the tip is at that instant.
#[derive(Debug, Clone)]
pub struct PrescribedTwoAxis {
    config: PrescribedTwoAxisConfig,
    combiner: Combiner,
    scheduler: ProfileScheduler,
    maneuver: Option<Maneuver>,
    joint_angles: [f64; 2],
    last: PrescribedMotionState,
    reset_at: Time,
}

impl PrescribedTwoAxis {
    /// Validates `config` and constructs a propagator that is reset at `t = 0`.
    pub fn new(config: PrescribedTwoAxisConfig) -> Result<Self, ConfigError> {
        let validated = config.validated()?;
        let mut propagator = Self {
            config,
            combiner: Combiner::for_axes(&validated.axis1, &validated.axis2),
            scheduler: ProfileScheduler::new(validated.limit),
            maneuver: None,
            joint_angles: [0.; 2],
            last: PrescribedMotionState::default(),
            reset_at: Time::new::<second>(0.),
        };
        propagator.reset(Time::new::<second>(0.));
        Ok(propagator)
    }

    #[must_use]
    pub fn config(&self) -> &PrescribedTwoAxisConfig {
        &self.config
    }

    #[must_use]
    pub fn combiner(&self) -> &Combiner {
        &self.combiner
    }

    /// Forgets any maneuver in progress and returns the tip to its configured initial state.
    ///
    /// `now` is the simulation time of the reset. Updates stamped before it are treated as if they
    /// happened at `now`.
    pub fn reset(&mut self, now: impl Into<Time>) {
        self.reset_at = now.into();
        self.maneuver = None;
        self.scheduler.reset();
        self.joint_angles = [0.; 2];
        self.last = PrescribedMotionState {
            r_fm_m: self.config.offset_position,
            r_prime_fm_m: self.config.offset_velocity,
            r_prime_prime_fm_m: self.config.offset_acceleration,
            omega_fm_f: FrameVector::zero(),
            omega_prime_fm_f: FrameVector::zero(),
            sigma_fm: self.config.initial_attitude.shadow_if_needed(),
        };
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    /// The maneuver being flown, if any reference has been received since the last reset.
    #[must_use]
    pub fn maneuver(&self) -> Option<&Maneuver> {
        self.maneuver.as_ref()
    }

    /// The state published by the most recent update.
    #[must_use]
    pub fn last_output(&self) -> &PrescribedMotionState {
        &self.last
    }

    /// Advances the prescribed motion to `now`.
    ///
    /// `feedback` is the current state of the tip as seen by the rest of the simulation. When it is
    /// `None`, the previously published state is used in its place. A maneuver is (re)started on the
    /// first update and whenever `reference` moves either joint by more than
    /// [`REFERENCE_TOLERANCE`].
    pub fn update(
        &mut self,
        now: impl Into<Time>,
        reference: &TwoAxisReference,
        feedback: Option<&PrescribedMotionState>,
    ) -> StepOutput {
        let now = {
            let now = now.into();
            if now < self.reset_at {
                self.reset_at
            } else {
                now
            }
        };
        let current = feedback.copied().unwrap_or(self.last);

        let flying = self.maneuver;
        let maneuver = match flying {
            Some(maneuver) if !reference.differs_from(&maneuver.reference, REFERENCE_TOLERANCE) => {
                maneuver
            }
            _ => self.start_maneuver(now, reference, &current.sigma_fm),
        };

        let scalar = self
            .scheduler
            .advance(now)
            .unwrap_or_else(|| ScalarState::at_rest(maneuver.theta_ref));
        let joints = maneuver.joint_state(&scalar);

        let axis = maneuver.rotation.axis;
        let sigma_fm = Mrp::from_axis_angle(&axis, scalar.theta);
        // the tip turns about the effective axis, which the attitude maps onto itself
        let omega = FrameVector::<Mount>::from_components(
            axis.into_inner() * scalar.theta_dot.get::<radian_per_second>(),
        );
        let omega_prime = FrameVector::<Mount>::from_components(
            axis.into_inner() * scalar.theta_ddot.get::<radian_per_second_squared>(),
        );

        let (r_fm_m, r_prime_fm_m, r_prime_prime_fm_m) = match feedback {
            Some(state) => (state.r_fm_m, state.r_prime_fm_m, state.r_prime_prime_fm_m),
            None => (
                self.config.offset_position,
                self.config.offset_velocity,
                self.config.offset_acceleration,
            ),
        };

        self.last = PrescribedMotionState {
            r_fm_m,
            r_prime_fm_m,
            r_prime_prime_fm_m,
            omega_fm_f: sigma_fm.express_in_tip(omega),
            omega_prime_fm_f: sigma_fm.express_in_tip(omega_prime),
            sigma_fm,
        };

        StepOutput {
            prescribed: self.last,
            spinning_body: SpinningBodyState {
                theta: scalar.theta,
                theta_dot: scalar.theta_dot,
            },
            joints,
            phase: self.scheduler.phase(),
        }
    }

    fn start_maneuver(
        &mut self,
        now: Time,
        reference: &TwoAxisReference,
        attitude: &Mrp,
    ) -> Maneuver {
        if reference.has_rates() {
            tracing::warn!(
                theta_dot1 = reference.theta_dot1.get::<radian_per_second>(),
                theta_dot2 = reference.theta_dot2.get::<radian_per_second>(),
                "ignoring non-zero reference joint rates; only rest-to-rest maneuvers are flown"
            );
        }

        // where a maneuver is interrupted, the joints pick up from their current split
        let mut previous_theta = None;
        if let Some(previous) = self.maneuver {
            if let Some(scalar) = self.scheduler.advance(now) {
                let joints = previous.joint_state(&scalar);
                self.joint_angles = [joints.theta1.get::<radian>(), joints.theta2.get::<radian>()];
                previous_theta = Some((previous.rotation.axis, scalar.theta.get::<radian>()));
            }
        }

        let rotation = self
            .combiner
            .effective_rotation(reference.theta1, reference.theta2);
        let attitude = attitude.shadow_if_needed();
        let magnitude = attitude.rotation_magnitude().get::<radian>();
        let mut theta_init = if attitude.components().dot(&rotation.axis.into_inner()) < 0. {
            -magnitude
        } else {
            magnitude
        };

        // the attitude only knows the principal angle; about an unchanged axis, stay on the turn
        // the tip is actually on rather than flying back around
        if let Some((axis, theta)) = previous_theta {
            if 1. - axis.into_inner().dot(&rotation.axis.into_inner()) < COLLINEAR_TOLERANCE {
                theta_init += TAU * ((theta - theta_init) / TAU).round();
            }
        }

        let profile = *self
            .scheduler
            .start(Angle::new::<radian>(theta_init), rotation.angle, now);
        let maneuver = Maneuver {
            reference: *reference,
            rotation,
            theta_init: profile.theta_init(),
            theta_ref: profile.theta_ref(),
            started_at: self.scheduler.started_at().unwrap_or(now),
            duration: profile.duration(),
            joint_start: self.joint_angles,
        };

        tracing::debug!(
            t = now.get::<second>(),
            theta_init,
            theta_ref = rotation.angle.get::<radian>(),
            duration = profile.duration().get::<second>(),
            axis = %FrameVector::<Mount>::from_components(rotation.axis.into_inner()),
            "starting maneuver"
        );

        self.maneuver = Some(maneuver);
        maneuver
    }
}
