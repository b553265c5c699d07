//! Servo angle: an integer number of degrees in `[0, 180]`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A validated servo position in whole degrees.
///
/// The only ways to obtain an [`Angle`] are [`TryFrom<i64>`], [`FromStr`]
/// and deserialization, all of which reject values outside the range.
/// Stored configuration therefore can never hold an out-of-range angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Angle(u8);

impl Angle {
    /// Lowest accepted position.
    pub const MIN: Self = Self(0);
    /// Highest accepted position.
    pub const MAX: Self = Self(180);

    /// Build an angle from a compile-time known value.
    ///
    /// Returns `None` above [`Angle::MAX`].
    #[must_use]
    pub const fn new(degrees: u8) -> Option<Self> {
        if degrees <= Self::MAX.0 {
            Some(Self(degrees))
        } else {
            None
        }
    }

    /// The position in degrees.
    #[must_use]
    pub const fn degrees(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Angle {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(ValidationError::InvalidAngle)
    }
}

impl From<Angle> for u8 {
    fn from(angle: Angle) -> Self {
        angle.0
    }
}

impl FromStr for Angle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidAngle)?;
        Self::try_from(raw)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_every_value_in_range() {
        for raw in 0..=180_i64 {
            let angle = Angle::try_from(raw).unwrap();
            assert_eq!(i64::from(angle.degrees()), raw);
        }
    }

    #[test]
    fn should_reject_values_outside_range() {
        for raw in [-1_i64, -180, 181, 200, 255, 256, i64::MAX, i64::MIN] {
            assert_eq!(Angle::try_from(raw), Err(ValidationError::InvalidAngle));
        }
    }

    #[test]
    fn should_parse_decimal_string() {
        assert_eq!("90".parse::<Angle>().unwrap().degrees(), 90);
        assert_eq!(" 45 ".parse::<Angle>().unwrap().degrees(), 45);
    }

    #[test]
    fn should_reject_non_numeric_string() {
        for raw in ["", "abc", "12.5", "9O", "ninety"] {
            assert_eq!(raw.parse::<Angle>(), Err(ValidationError::InvalidAngle));
        }
    }

    #[test]
    fn should_reject_out_of_range_string() {
        assert_eq!("200".parse::<Angle>(), Err(ValidationError::InvalidAngle));
        assert_eq!("-5".parse::<Angle>(), Err(ValidationError::InvalidAngle));
    }

    #[test]
    fn should_build_const_angles() {
        assert_eq!(Angle::new(180), Some(Angle::MAX));
        assert_eq!(Angle::new(181), None);
    }

    #[test]
    fn should_serialize_as_plain_number() {
        let json = serde_json::to_string(&Angle::new(45).unwrap()).unwrap();
        assert_eq!(json, "45");
    }

    #[test]
    fn should_reject_out_of_range_when_deserializing() {
        assert!(serde_json::from_str::<Angle>("181").is_err());
        assert!(serde_json::from_str::<Angle>("-1").is_err());
        assert_eq!(
            serde_json::from_str::<Angle>("180").unwrap(),
            Angle::MAX
        );
    }

    #[test]
    fn should_display_with_degree_sign() {
        assert_eq!(Angle::MIN.to_string(), "0°");
    }
}
