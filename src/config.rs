use crate::error::ConfigError;
use crate::frames::{FrameVector, Mount};
use crate::mrp::Mrp;
use crate::profile::AccelerationLimit;
use crate::UnitVector3;
use uom::si::angular_acceleration::radian_per_second_squared;
use uom::si::f64::AngularAcceleration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How far a configured rotation axis may be from unit length before it is rejected.
pub const AXIS_NORM_TOLERANCE: f64 = 1e-9;

/// Static description of a two-joint mechanism.
///
/// The fields are plain data; nothing is checked until the configuration is handed to
/// [`PrescribedTwoAxis::new`](crate::PrescribedTwoAxis::new). The default describes the reference
/// mechanism: joint 1 about `+x`, joint 2 about `−x`, and a `0.008 rad/s²` acceleration bound.
///
/// With the `serde` feature, the configuration can be read from YAML:
///
/// ```yaml
/// rot_axis_1: [1.0, 0.0, 0.0]
/// rot_axis_2: [-1.0, 0.0, 0.0]
/// max_angular_acceleration: 0.008 # rad/s²
/// offset_position: [0.0, 0.0, 0.25] # optional, m
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrescribedTwoAxisConfig {
    /// Axis of the first joint, in the mount frame.
    pub rot_axis_1: FrameVector<Mount>,
    /// Axis of the second joint, in the mount frame.
    pub rot_axis_2: FrameVector<Mount>,
    pub max_angular_acceleration: AngularAcceleration,
    /// Position of the tip frame origin relative to the mount frame origin.
    #[cfg_attr(feature = "serde", serde(default))]
    pub offset_position: FrameVector<Mount>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub offset_velocity: FrameVector<Mount>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub offset_acceleration: FrameVector<Mount>,
    /// Attitude of the tip relative to the mount before any feedback has been received.
    #[cfg_attr(feature = "serde", serde(default))]
    pub initial_attitude: Mrp,
}

impl Default for PrescribedTwoAxisConfig {
    fn default() -> Self {
        Self {
            rot_axis_1: FrameVector::new(1., 0., 0.),
            rot_axis_2: FrameVector::new(-1., 0., 0.),
            max_angular_acceleration: AngularAcceleration::new::<radian_per_second_squared>(0.008),
            offset_position: FrameVector::zero(),
            offset_velocity: FrameVector::zero(),
            offset_acceleration: FrameVector::zero(),
            initial_attitude: Mrp::identity(),
        }
    }
}

/// A configuration that passed [`PrescribedTwoAxisConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Validated {
    pub(crate) axis1: UnitVector3,
    pub(crate) axis2: UnitVector3,
    pub(crate) limit: AccelerationLimit,
}

impl PrescribedTwoAxisConfig {
    /// Checks that the axes have unit length, that the acceleration bound is positive, and that
    /// every offset is finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validated().map(|_| ())
    }

    pub(crate) fn validated(&self) -> Result<Validated, ConfigError> {
        let axis1 = unit_axis(1, self.rot_axis_1)?;
        let axis2 = unit_axis(2, self.rot_axis_2)?;
        let limit = AccelerationLimit::new(self.max_angular_acceleration)?;

        for (name, offset) in [
            ("offset_position", self.offset_position),
            ("offset_velocity", self.offset_velocity),
            ("offset_acceleration", self.offset_acceleration),
        ] {
            if !offset.is_finite() {
                return Err(ConfigError::NonFiniteOffset(name));
            }
        }

        Ok(Validated {
            axis1,
            axis2,
            limit,
        })
    }
}

fn unit_axis(index: u8, axis: FrameVector<Mount>) -> Result<UnitVector3, ConfigError> {
    if !axis.is_finite() {
        return Err(ConfigError::NonFiniteAxis { axis: index });
    }
    let norm = axis.norm();
    if (norm - 1.).abs() > AXIS_NORM_TOLERANCE {
        return Err(ConfigError::NonUnitAxis { axis: index, norm });
    }
    Ok(UnitVector3::new_normalize(axis.components()))
}

#[cfg(test)]
mod tests {
    use super::PrescribedTwoAxisConfig;
    use crate::error::ConfigError;
    use crate::frames::FrameVector;
    use rstest::rstest;
    use uom::si::angular_acceleration::radian_per_second_squared;
    use uom::si::f64::AngularAcceleration;

    #[test]
    fn default_is_valid() {
        let config = PrescribedTwoAxisConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(
            config
                .max_angular_acceleration
                .get::<radian_per_second_squared>(),
            0.008
        );
    }

    #[test]
    fn nearly_unit_axes_are_accepted() {
        let config = PrescribedTwoAxisConfig {
            rot_axis_2: FrameVector::new(0., 1. + 1e-10, 0.),
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[rstest]
    #[case::short_axis(
        PrescribedTwoAxisConfig { rot_axis_1: FrameVector::new(0.5, 0., 0.), ..Default::default() },
        ConfigError::NonUnitAxis { axis: 1, norm: 0.5 },
    )]
    #[case::zero_axis(
        PrescribedTwoAxisConfig { rot_axis_2: FrameVector::zero(), ..Default::default() },
        ConfigError::NonUnitAxis { axis: 2, norm: 0. },
    )]
    #[case::nan_axis(
        PrescribedTwoAxisConfig { rot_axis_2: FrameVector::new(f64::NAN, 0., 1.), ..Default::default() },
        ConfigError::NonFiniteAxis { axis: 2 },
    )]
    #[case::zero_acceleration(
        PrescribedTwoAxisConfig {
            max_angular_acceleration: AngularAcceleration::new::<radian_per_second_squared>(0.),
            ..Default::default()
        },
        ConfigError::NonPositiveAcceleration(0.),
    )]
    #[case::infinite_offset(
        PrescribedTwoAxisConfig {
            offset_velocity: FrameVector::new(0., f64::INFINITY, 0.),
            ..Default::default()
        },
        ConfigError::NonFiniteOffset("offset_velocity"),
    )]
    fn invalid_configurations_are_rejected(
        #[case] config: PrescribedTwoAxisConfig,
        #[case] expected: ConfigError,
    ) {
        assert_eq!(config.validate(), Err(expected));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn loads_from_yaml() {
        let config: PrescribedTwoAxisConfig = serde_yaml::from_str(
            r#"
            rot_axis_1: [0.0, 0.0, 1.0]
            rot_axis_2: [0.0, 1.0, 0.0]
            max_angular_acceleration: 0.015
            offset_position: [0.0, 0.0, 0.25]
            "#,
        )
        .unwrap();

        assert_eq!(config.rot_axis_1, FrameVector::new(0., 0., 1.));
        assert_eq!(config.rot_axis_2, FrameVector::new(0., 1., 0.));
        assert_eq!(
            config
                .max_angular_acceleration
                .get::<radian_per_second_squared>(),
            0.015
        );
        assert_eq!(config.offset_position, FrameVector::new(0., 0., 0.25));
        assert_eq!(config.offset_velocity, FrameVector::zero());
        assert_eq!(config.initial_attitude, crate::Mrp::identity());
        assert_eq!(config.validate(), Ok(()));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn yaml_round_trip() {
        let config = PrescribedTwoAxisConfig::default();
        let ser = serde_yaml::to_string(&config).unwrap();
        let de = serde_yaml::from_str::<PrescribedTwoAxisConfig>(&ser).unwrap();
        assert_eq!(config, de);
    }
}
