use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::Vector2;

/// A heading in radians, always in (-pi, pi].
///
/// ```ignore
/// # use stp_core::Angle;
/// let a = Angle::from_degrees(170.0);
/// let b = Angle::from_degrees(20.0);
/// assert_eq!((a + b).degrees(), -170.0);
/// ```
#[derive(Debug, Clone, Copy, PartialOrd, Serialize, Deserialize)]
pub struct Angle(f64);

impl Angle {
    pub const PI: Angle = Angle(PI);
    pub const PI_2: Angle = Angle(PI / 2.0);

    pub fn from_radians(radians: f64) -> Self {
        Angle(wrap_angle(radians))
    }

    pub fn from_degrees(degrees: f64) -> Self {
        Self::from_radians(degrees.to_radians())
    }

    /// Heading of the vector pointing from `a` to `b`.
    pub fn between_points(a: Vector2, b: Vector2) -> Self {
        Self::of_vector(b - a)
    }

    /// Heading of a vector. The zero vector has heading zero.
    pub fn of_vector(v: Vector2) -> Self {
        Self::from_radians(v.y.atan2(v.x))
    }

    pub fn radians(&self) -> f64 {
        self.0
    }

    pub fn degrees(&self) -> f64 {
        self.0.to_degrees()
    }

    /// Unit vector pointing along this heading.
    pub fn to_vector(&self) -> Vector2 {
        Vector2::new(self.0.cos(), self.0.sin())
    }

    pub fn abs(&self) -> f64 {
        self.0.abs()
    }
}

impl std::ops::Add for Angle {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Angle::from_radians(self.0 + other.0)
    }
}

impl std::ops::Sub for Angle {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Angle::from_radians(self.0 - other.0)
    }
}

impl std::ops::Neg for Angle {
    type Output = Self;

    fn neg(self) -> Self {
        Angle::from_radians(-self.0)
    }
}

impl std::fmt::Display for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:.3} rad", self.0)
    }
}

impl Default for Angle {
    fn default() -> Self {
        Self::from_radians(0.0)
    }
}

impl PartialEq for Angle {
    fn eq(&self, other: &Self) -> bool {
        (*self - *other).abs() < 1e-5
    }
}

fn wrap_angle(angle: f64) -> f64 {
    let mut angle = angle % (2.0 * PI);
    if angle <= -PI {
        angle += 2.0 * PI;
    } else if angle > PI {
        angle -= 2.0 * PI;
    }
    angle
}
