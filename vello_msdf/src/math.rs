// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scalar and vector helpers used across the distance field pipeline.

use crate::kurbo::Vec2;

/// Returns `1.0` for positive numbers and `-1.0` otherwise, including zero.
#[inline(always)]
pub fn non_zero_sign(n: f64) -> f64 {
    if n > 0.0 { 1.0 } else { -1.0 }
}

/// Returns the sign of `n` as `-1`, `0` or `1`.
#[inline(always)]
pub fn sign(n: f64) -> i32 {
    i32::from(n > 0.0) - i32::from(n < 0.0)
}

/// Linear interpolation between `a` and `b`.
#[inline(always)]
pub fn mix(a: f64, b: f64, t: f64) -> f64 {
    (1.0 - t) * a + t * b
}

/// Linear interpolation between two vectors.
#[inline(always)]
pub fn mix_vec(a: Vec2, b: Vec2, t: f64) -> Vec2 {
    (1.0 - t) * a + t * b
}

/// Linear interpolation between two single precision values, evaluated in double precision.
#[inline(always)]
pub fn mix_f32(a: f32, b: f32, t: f64) -> f32 {
    mix(f64::from(a), f64::from(b), t) as f32
}

/// The median of three values.
#[inline(always)]
pub fn median<T: PartialOrd + Copy>(a: T, b: T, c: T) -> T {
    max(min(a, b), min(max(a, b), c))
}

#[inline(always)]
fn min<T: PartialOrd>(a: T, b: T) -> T {
    if b < a { b } else { a }
}

#[inline(always)]
fn max<T: PartialOrd>(a: T, b: T) -> T {
    if a < b { b } else { a }
}

/// Normalizes `v` to unit length.
///
/// A zero vector becomes `(0, 0)` if `allow_zero` is set and `(0, 1)` otherwise.
#[inline]
pub fn normalize(v: Vec2, allow_zero: bool) -> Vec2 {
    let len = v.hypot();
    if len != 0.0 {
        v / len
    } else {
        Vec2::new(0.0, if allow_zero { 0.0 } else { 1.0 })
    }
}

/// Returns a vector of the same length perpendicular to `v`.
///
/// With `polarity` set, the result is rotated counter-clockwise (with the Y axis pointing up).
#[inline]
pub fn orthogonal(v: Vec2, polarity: bool) -> Vec2 {
    if polarity {
        Vec2::new(-v.y, v.x)
    } else {
        Vec2::new(v.y, -v.x)
    }
}

/// Returns a unit vector perpendicular to `v`, see [`orthogonal`] and [`normalize`].
#[inline]
pub fn orthonormal(v: Vec2, polarity: bool, allow_zero: bool) -> Vec2 {
    let len = v.hypot();
    if len != 0.0 {
        orthogonal(v, polarity) / len
    } else {
        let unit = if allow_zero { 0.0 } else { 1.0 };
        Vec2::new(0.0, if polarity { unit } else { -unit })
    }
}

/// Component-wise product of two vectors.
#[inline(always)]
pub fn mul_components(a: Vec2, b: Vec2) -> Vec2 {
    Vec2::new(a.x * b.x, a.y * b.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_three() {
        assert_eq!(median(1.0, 2.0, 3.0), 2.0);
        assert_eq!(median(3.0, 1.0, 2.0), 2.0);
        assert_eq!(median(2.0, 3.0, 1.0), 2.0);
        assert_eq!(median(0.5_f32, 0.5, 0.1), 0.5);
    }

    #[test]
    fn zero_vector_normalization() {
        assert_eq!(normalize(Vec2::ZERO, true), Vec2::ZERO);
        assert_eq!(normalize(Vec2::ZERO, false), Vec2::new(0.0, 1.0));
        let unit = normalize(Vec2::new(3.0, 4.0), false);
        assert!((unit - Vec2::new(0.6, 0.8)).hypot() < 1e-12, "{unit:?}");
    }

    #[test]
    fn orthonormal_rotates_both_ways() {
        let v = Vec2::new(2.0, 0.0);
        assert_eq!(orthonormal(v, true, false), Vec2::new(0.0, 1.0));
        assert_eq!(orthonormal(v, false, false), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn zero_has_negative_non_zero_sign() {
        assert_eq!(non_zero_sign(0.0), -1.0);
        assert_eq!(non_zero_sign(1e-300), 1.0);
        assert_eq!(sign(0.0), 0);
        assert_eq!(sign(-2.0), -1);
    }
}
