//! Rest-to-rest bang-bang scheduling of a scalar angle.
//!
//! A maneuver from `θ₀` to `θᵣ` under the acceleration bound `a_max` accelerates at full
//! authority for half of the maneuver and decelerates at full authority for the other half:
//!
//! ```text
//! Δ = θᵣ − θ₀        t_s = √(|Δ| / a_max)        T = 2 t_s        a = sign(Δ) a_max
//!
//!  θ̈ │ a ┌──────┐
//!     │   │      │
//!   0 ┼───┘      │      ┌─────── settled
//!     │          │      │
//!  −a │          └──────┘
//!     └───┬──────┬──────┬──────▶ t
//!         0      t_s    T
//! ```
//!
//! There is no cruise phase. Both phases are evaluated in closed form (the decelerating phase
//! relative to the end of the maneuver), so the end state is reached exactly rather than through
//! accumulated integration.

use crate::error::ConfigError;
use std::fmt::{self, Display, Formatter};
use uom::si::angle::radian;
use uom::si::angular_acceleration::radian_per_second_squared;
use uom::si::angular_velocity::radian_per_second;
use uom::si::f64::{Angle, AngularAcceleration, AngularVelocity, Time};
use uom::si::time::second;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where in a maneuver the scheduler is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Phase {
    /// No maneuver has been started yet.
    Idle,
    /// Accelerating at full authority towards the target.
    Accelerating,
    /// Decelerating at full authority onto the target.
    Decelerating,
    /// At rest on the target.
    Settled,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Accelerating => "accelerating",
            Self::Decelerating => "decelerating",
            Self::Settled => "settled",
        })
    }
}

/// Scalar angle, rate, and acceleration at one instant of a maneuver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScalarState {
    pub theta: Angle,
    pub theta_dot: AngularVelocity,
    pub theta_ddot: AngularAcceleration,
}

impl ScalarState {
    /// At rest at `theta`.
    #[must_use]
    pub fn at_rest(theta: impl Into<Angle>) -> Self {
        Self {
            theta: theta.into(),
            theta_dot: AngularVelocity::new::<radian_per_second>(0.),
            theta_ddot: AngularAcceleration::new::<radian_per_second_squared>(0.),
        }
    }

    fn from_radians(theta: f64, theta_dot: f64, theta_ddot: f64) -> Self {
        Self {
            theta: Angle::new::<radian>(theta),
            theta_dot: AngularVelocity::new::<radian_per_second>(theta_dot),
            theta_ddot: AngularAcceleration::new::<radian_per_second_squared>(theta_ddot),
        }
    }
}

/// A validated, strictly positive bound on angular acceleration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelerationLimit(f64);

impl AccelerationLimit {
    /// Returns an error if `limit` is not strictly positive and finite.
    pub fn new(limit: impl Into<AngularAcceleration>) -> Result<Self, ConfigError> {
        let value = limit.into().get::<radian_per_second_squared>();
        if value.is_finite() && value > 0. {
            Ok(Self(value))
        } else {
            Err(ConfigError::NonPositiveAcceleration(value))
        }
    }

    #[must_use]
    pub fn get(&self) -> AngularAcceleration {
        AngularAcceleration::new::<radian_per_second_squared>(self.0)
    }
}

/// The closed-form schedule of one maneuver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BangBangProfile {
    theta_init: f64,
    theta_ref: f64,
    // signed: negative when moving towards smaller angles
    acceleration: f64,
    switch_time: f64,
    duration: f64,
}

impl BangBangProfile {
    /// Schedules a rest-to-rest maneuver from `theta_init` to `theta_ref`.
    #[must_use]
    pub fn new(
        theta_init: impl Into<Angle>,
        theta_ref: impl Into<Angle>,
        limit: AccelerationLimit,
    ) -> Self {
        let theta_init = theta_init.into().get::<radian>();
        let theta_ref = theta_ref.into().get::<radian>();
        let angle_to_go = theta_ref - theta_init;

        // an exact-zero displacement has no direction; it is settled from the start
        let acceleration = if angle_to_go == 0. {
            0.
        } else {
            limit.0.copysign(angle_to_go)
        };
        let switch_time = (angle_to_go.abs() / limit.0).sqrt();

        Self {
            theta_init,
            theta_ref,
            acceleration,
            switch_time,
            duration: 2. * switch_time,
        }
    }

    #[must_use]
    pub fn theta_init(&self) -> Angle {
        Angle::new::<radian>(self.theta_init)
    }

    #[must_use]
    pub fn theta_ref(&self) -> Angle {
        Angle::new::<radian>(self.theta_ref)
    }

    /// Acceleration during the first half of the maneuver; its sign is that of `θᵣ − θ₀`.
    #[must_use]
    pub fn acceleration(&self) -> AngularAcceleration {
        AngularAcceleration::new::<radian_per_second_squared>(self.acceleration)
    }

    /// Time since the start of the maneuver at which acceleration flips to deceleration.
    #[must_use]
    pub fn switch_time(&self) -> Time {
        Time::new::<second>(self.switch_time)
    }

    /// Total maneuver time, `2 √(|θᵣ − θ₀| / a_max)`.
    #[must_use]
    pub fn duration(&self) -> Time {
        Time::new::<second>(self.duration)
    }

    /// Returns the phase `elapsed` after the start of the maneuver. Negative times are treated as
    /// the start of the maneuver.
    #[must_use]
    pub fn phase_at(&self, elapsed: impl Into<Time>) -> Phase {
        let t = elapsed.into().get::<second>().max(0.);
        if self.duration == 0. || t >= self.duration {
            Phase::Settled
        } else if t < self.switch_time {
            Phase::Accelerating
        } else {
            Phase::Decelerating
        }
    }

    /// Returns angle, rate, and acceleration `elapsed` after the start of the maneuver.
    #[must_use]
    pub fn sample(&self, elapsed: impl Into<Time>) -> ScalarState {
        let t = elapsed.into().get::<second>().max(0.);
        let a = self.acceleration;

        match self.phase_at(Time::new::<second>(t)) {
            Phase::Accelerating => {
                ScalarState::from_radians(self.theta_init + 0.5 * a * t * t, a * t, a)
            }
            Phase::Decelerating => {
                let remaining = self.duration - t;
                ScalarState::from_radians(
                    self.theta_ref - 0.5 * a * remaining * remaining,
                    a * remaining,
                    -a,
                )
            }
            Phase::Settled | Phase::Idle => ScalarState::at_rest(self.theta_ref()),
        }
    }
}

/// Owns the profile of the maneuver currently being flown and tracks its phase.
#[derive(Debug, Clone)]
pub struct ProfileScheduler {
    limit: AccelerationLimit,
    profile: Option<BangBangProfile>,
    started_at: Time,
    phase: Phase,
}

impl ProfileScheduler {
    #[must_use]
    pub fn new(limit: AccelerationLimit) -> Self {
        Self {
            limit,
            profile: None,
            started_at: Time::new::<second>(0.),
            phase: Phase::Idle,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn profile(&self) -> Option<&BangBangProfile> {
        self.profile.as_ref()
    }

    /// When the current maneuver was started.
    #[must_use]
    pub fn started_at(&self) -> Option<Time> {
        self.profile.map(|_| self.started_at)
    }

    /// Drops any maneuver in progress.
    pub fn reset(&mut self) {
        self.profile = None;
        self.set_phase(Phase::Idle);
    }

    /// Starts a new maneuver at `now`, discarding whatever maneuver was in progress.
    pub fn start(
        &mut self,
        theta_init: impl Into<Angle>,
        theta_ref: impl Into<Angle>,
        now: impl Into<Time>,
    ) -> &BangBangProfile {
        let profile = BangBangProfile::new(theta_init, theta_ref, self.limit);
        self.started_at = now.into();
        self.set_phase(profile.phase_at(Time::new::<second>(0.)));
        self.profile.insert(profile)
    }

    /// Returns the scalar state at `now`, or `None` if no maneuver was ever started.
    pub fn advance(&mut self, now: impl Into<Time>) -> Option<ScalarState> {
        let profile = self.profile?;
        let elapsed = now.into() - self.started_at;
        self.set_phase(profile.phase_at(elapsed));
        Some(profile.sample(elapsed))
    }

    fn set_phase(&mut self, phase: Phase) {
        if phase != self.phase {
            tracing::trace!(from = %self.phase, to = %phase, "profile phase changed");
            self.phase = phase;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AccelerationLimit, BangBangProfile, Phase, ProfileScheduler};
    use crate::error::ConfigError;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use quickcheck::{quickcheck, TestResult};
    use rstest::rstest;
    use std::f64::consts::PI;
    use uom::si::angle::radian;
    use uom::si::angular_acceleration::radian_per_second_squared;
    use uom::si::angular_velocity::radian_per_second;
    use uom::si::f64::{Angle, AngularAcceleration, Time};
    use uom::si::time::second;

    fn r(radians: f64) -> Angle {
        Angle::new::<radian>(radians)
    }
    fn s(seconds: f64) -> Time {
        Time::new::<second>(seconds)
    }
    fn limit(rad_per_s2: f64) -> AccelerationLimit {
        AccelerationLimit::new(AngularAcceleration::new::<radian_per_second_squared>(
            rad_per_s2,
        ))
        .unwrap()
    }

    #[rstest]
    #[case(0.)]
    #[case(-0.008)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn acceleration_limit_rejects_non_positive(#[case] value: f64) {
        let err = AccelerationLimit::new(AngularAcceleration::new::<radian_per_second_squared>(
            value,
        ))
        .unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveAcceleration(_)));
    }

    #[rstest]
    #[case(0., 2. * PI / 3., 0.008)]
    #[case(PI / 4., PI, 0.015)]
    #[case(PI, 0., 0.0115)]
    #[case(-1., 2.5, 1.)]
    fn boundary_conditions_and_timing(
        #[case] theta_init: f64,
        #[case] theta_ref: f64,
        #[case] a_max: f64,
    ) {
        let profile = BangBangProfile::new(r(theta_init), r(theta_ref), limit(a_max));
        let duration = profile.duration().get::<second>();

        assert_eq!(
            duration,
            2. * ((theta_ref - theta_init).abs() / a_max).sqrt()
        );

        let start = profile.sample(s(0.));
        assert_eq!(start.theta.get::<radian>(), theta_init);
        assert_eq!(start.theta_dot.get::<radian_per_second>(), 0.);

        let end = profile.sample(s(duration));
        assert_abs_diff_eq!(end.theta.get::<radian>(), theta_ref, epsilon = 1e-12);
        assert_abs_diff_eq!(end.theta_dot.get::<radian_per_second>(), 0., epsilon = 1e-12);

        // just short of the end we're still decelerating onto the target
        let almost = profile.sample(s(duration * (1. - 1e-9)));
        assert_abs_diff_eq!(almost.theta.get::<radian>(), theta_ref, epsilon = 1e-12);
        assert_abs_diff_eq!(
            almost.theta_dot.get::<radian_per_second>(),
            0.,
            epsilon = 1e-8
        );
    }

    #[test]
    fn phases_follow_switch_time() {
        let profile = BangBangProfile::new(r(0.), r(1.), limit(0.25));
        // |Δ| / a = 4, so switching at 2 s and ending at 4 s
        assert_eq!(profile.switch_time(), s(2.));
        assert_eq!(profile.duration(), s(4.));

        assert_eq!(profile.phase_at(s(-1.)), Phase::Accelerating);
        assert_eq!(profile.phase_at(s(0.)), Phase::Accelerating);
        assert_eq!(profile.phase_at(s(1.999)), Phase::Accelerating);
        assert_eq!(profile.phase_at(s(2.)), Phase::Decelerating);
        assert_eq!(profile.phase_at(s(3.999)), Phase::Decelerating);
        assert_eq!(profile.phase_at(s(4.)), Phase::Settled);
        assert_eq!(profile.phase_at(s(100.)), Phase::Settled);
    }

    #[test]
    fn switch_point_is_continuous() {
        let profile = BangBangProfile::new(r(0.3), r(-1.7), limit(0.02));
        let ts = profile.switch_time().get::<second>();

        let before = profile.sample(s(ts * (1. - 1e-12)));
        let after = profile.sample(s(ts));
        assert_relative_eq!(
            before.theta.get::<radian>(),
            after.theta.get::<radian>(),
            epsilon = 1e-9
        );
        assert_relative_eq!(
            before.theta_dot.get::<radian_per_second>(),
            after.theta_dot.get::<radian_per_second>(),
            epsilon = 1e-9
        );
        // halfway in angle at the switch
        assert_relative_eq!(after.theta.get::<radian>(), -0.7, epsilon = 1e-12);
    }

    #[test]
    fn negative_displacement_flips_acceleration() {
        let profile = BangBangProfile::new(r(2.), r(0.5), limit(0.01));
        assert_eq!(
            profile.acceleration().get::<radian_per_second_squared>(),
            -0.01
        );
        assert_eq!(
            profile.duration().get::<second>(),
            2. * (1.5_f64 / 0.01).sqrt()
        );

        let early = profile.sample(s(1.));
        assert!(early.theta_dot.get::<radian_per_second>() < 0.);
        assert_eq!(
            early.theta_ddot.get::<radian_per_second_squared>(),
            -0.01
        );

        let late = profile.sample(profile.duration() * 0.75);
        assert_eq!(late.theta_ddot.get::<radian_per_second_squared>(), 0.01);
    }

    #[test]
    fn zero_displacement_is_settled_immediately() {
        let profile = BangBangProfile::new(r(0.4), r(0.4), limit(0.01));
        assert_eq!(profile.duration(), s(0.));
        assert_eq!(profile.phase_at(s(0.)), Phase::Settled);

        let state = profile.sample(s(0.));
        assert_eq!(state.theta, r(0.4));
        assert_eq!(state.theta_dot.get::<radian_per_second>(), 0.);
        assert_eq!(state.theta_ddot.get::<radian_per_second_squared>(), 0.);
    }

    #[test]
    fn scheduler_tracks_phase_and_restarts() {
        let mut scheduler = ProfileScheduler::new(limit(0.5));
        assert_eq!(scheduler.phase(), Phase::Idle);
        assert!(scheduler.advance(s(3.)).is_none());
        assert!(scheduler.started_at().is_none());

        // a 1 rad maneuver at 0.5 rad/s² takes 2√2 s
        scheduler.start(r(0.), r(1.), s(10.));
        assert_eq!(scheduler.phase(), Phase::Accelerating);
        assert_eq!(scheduler.started_at(), Some(s(10.)));

        scheduler.advance(s(11.5));
        assert_eq!(scheduler.phase(), Phase::Decelerating);

        let state = scheduler.advance(s(20.)).unwrap();
        assert_eq!(scheduler.phase(), Phase::Settled);
        assert_eq!(state.theta, r(1.));

        // a fresh start discards the settled maneuver
        scheduler.start(r(1.), r(1.), s(21.));
        assert_eq!(scheduler.phase(), Phase::Settled);

        scheduler.reset();
        assert_eq!(scheduler.phase(), Phase::Idle);
        assert!(scheduler.profile().is_none());
    }

    #[test]
    fn phase_display() {
        insta::assert_snapshot!(
            [Phase::Idle, Phase::Accelerating, Phase::Decelerating, Phase::Settled]
                .map(|p| p.to_string())
                .join(" -> "),
            @"idle -> accelerating -> decelerating -> settled"
        );
    }

    quickcheck! {
        fn acceleration_never_exceeds_limit(theta_init: f64, theta_ref: f64, a_max: f64, fraction: f64) -> TestResult {
            // quickcheck will give us awkward f64 values -- we ignore those
            if ![theta_init, theta_ref, a_max, fraction].iter().all(|v| v.is_finite())
                || theta_init.abs() > 1e3
                || theta_ref.abs() > 1e3
                || !(1e-6..1e3).contains(&a_max.abs())
            {
                return TestResult::discard();
            }
            let a_max = a_max.abs();
            let profile = BangBangProfile::new(r(theta_init), r(theta_ref), limit(a_max));

            let t = profile.duration() * fraction.abs().fract();
            let state = profile.sample(t);
            TestResult::from_bool(
                state.theta_ddot.get::<radian_per_second_squared>().abs() <= a_max
            )
        }

        fn rate_is_zero_at_both_ends(theta_init: f64, theta_ref: f64) -> TestResult {
            if !theta_init.is_finite() || !theta_ref.is_finite()
                || theta_init.abs() > 1e3 || theta_ref.abs() > 1e3
            {
                return TestResult::discard();
            }
            let profile = BangBangProfile::new(r(theta_init), r(theta_ref), limit(0.008));
            let start = profile.sample(s(0.));
            let end = profile.sample(profile.duration());
            TestResult::from_bool(
                start.theta_dot.get::<radian_per_second>() == 0.
                    && end.theta_dot.get::<radian_per_second>() == 0.
                    && end.theta.get::<radian>() == theta_ref
            )
        }
    }
}
