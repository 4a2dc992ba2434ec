// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Real roots of quadratic and cubic polynomials.

use core::f64::consts::PI;
use smallvec::{SmallVec, smallvec};

/// The real roots of a polynomial equation.
#[derive(Clone, Debug, PartialEq)]
pub enum Roots {
    /// Every number solves the equation (all coefficients are zero).
    Infinite,
    /// A finite, possibly empty, set of roots in no particular order.
    Finite(SmallVec<[f64; 3]>),
}

impl Roots {
    /// The finite roots, or an empty slice for [`Roots::Infinite`].
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Self::Infinite => &[],
            Self::Finite(roots) => roots,
        }
    }
}

/// Solves `a x² + b x + c = 0`.
///
/// Falls back to the linear equation when `a` is zero or negligible compared to `b`.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Roots {
    if a == 0.0 || b.abs() > 1e12 * a.abs() {
        if b == 0.0 {
            if c == 0.0 {
                return Roots::Infinite;
            }
            return Roots::Finite(SmallVec::new());
        }
        return Roots::Finite(smallvec![-c / b]);
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant > 0.0 {
        let d = discriminant.sqrt();
        Roots::Finite(smallvec![(-b + d) / (2.0 * a), (-b - d) / (2.0 * a)])
    } else if discriminant == 0.0 {
        Roots::Finite(smallvec![-b / (2.0 * a)])
    } else {
        Roots::Finite(SmallVec::new())
    }
}

/// Solves `x³ + a x² + b x + c = 0` with the trigonometric method for three real roots and
/// Cardano's formula otherwise.
fn solve_cubic_normed(a: f64, b: f64, c: f64) -> Roots {
    let a2 = a * a;
    let q = (a2 - 3.0 * b) / 9.0;
    let r = (a * (2.0 * a2 - 9.0 * b) + 27.0 * c) / 54.0;
    let r2 = r * r;
    let q3 = q * q * q;
    let a = a / 3.0;
    if r2 < q3 {
        let t = (r / q3.sqrt()).clamp(-1.0, 1.0).acos();
        let q = -2.0 * q.sqrt();
        Roots::Finite(smallvec![
            q * (t / 3.0).cos() - a,
            q * ((t + 2.0 * PI) / 3.0).cos() - a,
            q * ((t - 2.0 * PI) / 3.0).cos() - a,
        ])
    } else {
        let u = if r < 0.0 { 1.0 } else { -1.0 } * (r.abs() + (r2 - q3).sqrt()).cbrt();
        let v = if u == 0.0 { 0.0 } else { q / u };
        let x0 = (u + v) - a;
        if u == v || (u - v).abs() < 1e-12 * (u + v).abs() {
            Roots::Finite(smallvec![x0, -0.5 * (u + v) - a])
        } else {
            Roots::Finite(smallvec![x0])
        }
    }
}

/// Solves `a x³ + b x² + c x + d = 0`.
///
/// Falls back to the quadratic equation when the cubic term is negligible.
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Roots {
    if a != 0.0 {
        let bn = b / a;
        // Above this ratio, the normed equation loses too much precision.
        if bn.abs() < 1e6 {
            return solve_cubic_normed(bn, c / a, d / a);
        }
    }
    solve_quadratic(b, c, d)
}
