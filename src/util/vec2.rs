use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// 2D vector for positions, directions and aim
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const UP: Vec2 = Vec2 { x: 0.0, y: -1.0 };
    pub const DOWN: Vec2 = Vec2 { x: 0.0, y: 1.0 };
    pub const LEFT: Vec2 = Vec2 { x: -1.0, y: 0.0 };
    pub const RIGHT: Vec2 = Vec2 { x: 1.0, y: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn from_angle(angle: f32) -> Self {
        Self {
            x: angle.cos(),
            y: angle.sin(),
        }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn length_sq(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Both components are finite (no NaN, no infinity)
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Unit vector in the same direction, or `None` when the length is zero
    /// or not finite.
    pub fn try_normalize(&self) -> Option<Self> {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            Some(Self {
                x: self.x / len,
                y: self.y / len,
            })
        } else {
            None
        }
    }

    #[inline]
    pub fn distance_to(&self, other: Vec2) -> f32 {
        (*self - other).length()
    }

    #[inline]
    pub fn distance_sq_to(&self, other: Vec2) -> f32 {
        (*self - other).length_sq()
    }

    /// Returns angle in radians
    pub fn angle(&self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Component-wise clamp into the rectangle `[min, max]`
    pub fn clamp(&self, min: Vec2, max: Vec2) -> Self {
        Self {
            x: self.x.clamp(min.x, max.x),
            y: self.y.clamp(min.y, max.y),
        }
    }

    /// Whether the point lies inside the rectangle `[min, max]` (edges included)
    pub fn within(&self, min: Vec2, max: Vec2) -> bool {
        self.x >= min.x && self.x <= max.x && self.y >= min.y && self.y <= max.y
    }

    /// Check if vector is approximately equal to another
    pub fn approx_eq(&self, other: Vec2, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

/// Wrap an angle into `(-PI, PI]`
pub fn wrap_angle(angle: f32) -> f32 {
    if angle > -PI && angle <= PI {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid maps +PI onto -PI; keep the closed end at +PI
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_length() {
        let v = Vec2::new(3.0, 4.0);
        assert!(approx_eq(v.length(), 5.0));
        assert!(approx_eq(v.length_sq(), 25.0));
    }

    #[test]
    fn test_try_normalize() {
        let n = Vec2::new(3.0, 4.0).try_normalize().unwrap();
        assert!(approx_eq(n.length(), 1.0));
        assert!(approx_eq(n.x, 0.6));
        assert!(approx_eq(n.y, 0.8));
    }

    #[test]
    fn test_try_normalize_extreme_magnitudes() {
        let huge = Vec2::new(1e20, 0.0).try_normalize().unwrap();
        assert_eq!(huge, Vec2::RIGHT);

        let tiny = Vec2::new(0.0, -1e-30).try_normalize().unwrap();
        assert_eq!(tiny, Vec2::UP);

        let n = Vec2::new(3e30, 4e30).try_normalize().unwrap();
        assert!(n.approx_eq(Vec2::new(0.6, 0.8), EPSILON));
    }

    #[test]
    fn test_try_normalize_rejects_degenerate() {
        assert!(Vec2::ZERO.try_normalize().is_none());
        assert!(Vec2::new(f32::NAN, 1.0).try_normalize().is_none());
        assert!(Vec2::new(f32::INFINITY, 0.0).try_normalize().is_none());
        // Overflows to an infinite length
        assert!(Vec2::new(f32::MAX, f32::MAX).try_normalize().is_none());
    }

    #[test]
    fn test_is_finite() {
        assert!(Vec2::new(1.0, -2.0).is_finite());
        assert!(!Vec2::new(f32::NAN, 0.0).is_finite());
        assert!(!Vec2::new(0.0, f32::NEG_INFINITY).is_finite());
    }

    #[test]
    fn test_distance() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert!(approx_eq(a.distance_to(b), 5.0));
        assert!(approx_eq(a.distance_sq_to(b), 25.0));
    }

    #[test]
    fn test_angle() {
        assert!(approx_eq(Vec2::new(1.0, 0.0).angle(), 0.0));
        assert!(approx_eq(Vec2::new(0.0, 1.0).angle(), PI / 2.0));
        assert!(approx_eq(Vec2::new(-1.0, 0.0).angle(), PI));
    }

    #[test]
    fn test_clamp_and_within() {
        let min = Vec2::ZERO;
        let max = Vec2::new(100.0, 50.0);
        assert_eq!(Vec2::new(-5.0, 70.0).clamp(min, max), Vec2::new(0.0, 50.0));
        assert_eq!(Vec2::new(20.0, 20.0).clamp(min, max), Vec2::new(20.0, 20.0));
        assert!(Vec2::new(100.0, 0.0).within(min, max));
        assert!(!Vec2::new(100.1, 0.0).within(min, max));
    }

    #[test]
    fn test_wrap_angle() {
        assert!(approx_eq(wrap_angle(0.0), 0.0));
        assert!(approx_eq(wrap_angle(PI), PI));
        assert!(approx_eq(wrap_angle(-PI), PI));
        assert!(approx_eq(wrap_angle(3.0 * PI / 2.0), -PI / 2.0));
        assert!(approx_eq(wrap_angle(-3.0 * PI / 2.0), PI / 2.0));
        assert!(approx_eq(wrap_angle(5.0 * TAU + 0.25), 0.25));
    }

    #[test]
    fn test_ops() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, 4.0);
        assert_eq!(a + b, Vec2::new(4.0, 6.0));
        assert_eq!(b - a, Vec2::new(2.0, 2.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
        assert_eq!(-a, Vec2::new(-1.0, -2.0));

        let mut c = a;
        c += b;
        c -= Vec2::new(1.0, 1.0);
        assert_eq!(c, Vec2::new(3.0, 5.0));
    }
}
