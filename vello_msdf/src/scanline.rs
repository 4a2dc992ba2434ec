// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Horizontal scanlines through a shape and the fill rules that interpret them.

use peniko::Fill;

/// How the winding number at a point decides whether it is filled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillRule {
    /// Filled where the winding number is non-zero.
    #[default]
    NonZero,
    /// Filled where the winding number is odd.
    Odd,
    /// Filled where the winding number is positive.
    Positive,
    /// Filled where the winding number is negative.
    Negative,
}

impl FillRule {
    /// Whether a point with the given winding number is filled under this rule.
    pub fn interpret(self, winding: i32) -> bool {
        match self {
            Self::NonZero => winding != 0,
            Self::Odd => winding & 1 != 0,
            Self::Positive => winding > 0,
            Self::Negative => winding < 0,
        }
    }
}

impl From<Fill> for FillRule {
    fn from(fill: Fill) -> Self {
        match fill {
            Fill::NonZero => Self::NonZero,
            Fill::EvenOdd => Self::Odd,
        }
    }
}

/// A crossing of a scanline with the outline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    /// X coordinate of the crossing.
    pub x: f64,
    /// Direction of the crossing (`1` upwards, `-1` downwards).
    ///
    /// After [`Scanline::set_intersections`], this is the winding number to the right of
    /// the crossing instead.
    pub direction: i32,
}

/// The crossings of a horizontal line with a shape, sorted by X coordinate.
#[derive(Clone, Debug, Default)]
pub struct Scanline {
    intersections: Vec<Intersection>,
}

impl Scanline {
    /// Create an empty scanline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the crossings of the scanline.
    ///
    /// The crossings are sorted and their directions are accumulated into winding numbers.
    pub fn set_intersections(&mut self, intersections: impl IntoIterator<Item = Intersection>) {
        self.intersections.clear();
        self.intersections.extend(intersections);
        self.intersections.sort_by(|a, b| a.x.total_cmp(&b.x));
        let mut total_direction = 0;
        for intersection in &mut self.intersections {
            total_direction += intersection.direction;
            intersection.direction = total_direction;
        }
    }

    /// The sorted crossings, whose directions hold the accumulated winding numbers.
    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    /// Index of the last crossing at or left of `x`.
    fn last_at_or_before(&self, x: f64) -> Option<usize> {
        let count = self
            .intersections
            .partition_point(|intersection| intersection.x <= x);
        count.checked_sub(1)
    }

    /// Number of crossings at or left of `x`.
    pub fn count_intersections(&self, x: f64) -> usize {
        self.last_at_or_before(x).map_or(0, |index| index + 1)
    }

    /// The winding number at `x`.
    pub fn sum_intersections(&self, x: f64) -> i32 {
        self.last_at_or_before(x)
            .map_or(0, |index| self.intersections[index].direction)
    }

    /// Whether `x` lies in the filled region under `fill_rule`.
    pub fn filled(&self, x: f64, fill_rule: FillRule) -> bool {
        fill_rule.interpret(self.sum_intersections(x))
    }

    /// The length of the parts of `[x_from, x_to]` where `a` and `b` agree on whether the
    /// scanline is filled.
    pub fn overlap(a: &Self, b: &Self, x_from: f64, x_to: f64, fill_rule: FillRule) -> f64 {
        let mut total = 0.0;
        let mut a_inside = false;
        let mut b_inside = false;
        let mut ai = 0;
        let mut bi = 0;
        let mut ax = a.intersections.first().map_or(x_to, |i| i.x);
        let mut bx = b.intersections.first().map_or(x_to, |i| i.x);
        while ax < x_from || bx < x_from {
            let x_next = ax.min(bx);
            if ax == x_next && ai < a.intersections.len() {
                a_inside = fill_rule.interpret(a.intersections[ai].direction);
                ai += 1;
                ax = a.intersections.get(ai).map_or(x_to, |i| i.x);
            }
            if bx == x_next && bi < b.intersections.len() {
                b_inside = fill_rule.interpret(b.intersections[bi].direction);
                bi += 1;
                bx = b.intersections.get(bi).map_or(x_to, |i| i.x);
            }
        }
        let mut x = x_from;
        while ax < x_to || bx < x_to {
            let x_next = ax.min(bx);
            if a_inside == b_inside {
                total += x_next - x;
            }
            if ax == x_next && ai < a.intersections.len() {
                a_inside = fill_rule.interpret(a.intersections[ai].direction);
                ai += 1;
                ax = a.intersections.get(ai).map_or(x_to, |i| i.x);
            }
            if bx == x_next && bi < b.intersections.len() {
                b_inside = fill_rule.interpret(b.intersections[bi].direction);
                bi += 1;
                bx = b.intersections.get(bi).map_or(x_to, |i| i.x);
            }
            x = x_next;
        }
        if a_inside == b_inside {
            total += x_to - x;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::{FillRule, Intersection, Scanline};

    fn scanline(crossings: &[(f64, i32)]) -> Scanline {
        let mut scanline = Scanline::new();
        scanline.set_intersections(
            crossings
                .iter()
                .map(|&(x, direction)| Intersection { x, direction }),
        );
        scanline
    }

    #[test]
    fn winding_accumulates_in_x_order() {
        let scanline = scanline(&[(3.0, -1), (1.0, 1), (2.0, 1), (4.0, -1)]);
        assert_eq!(scanline.sum_intersections(0.0), 0);
        assert_eq!(scanline.sum_intersections(1.5), 1);
        assert_eq!(scanline.sum_intersections(2.5), 2);
        assert_eq!(scanline.sum_intersections(3.5), 1);
        assert_eq!(scanline.sum_intersections(5.0), 0);
        assert_eq!(scanline.count_intersections(2.0), 2);
        assert!(scanline.filled(2.5, FillRule::NonZero));
        assert!(!scanline.filled(2.5, FillRule::Odd));
        assert!(!scanline.filled(2.5, FillRule::Negative));
    }

    #[test]
    fn fill_rules() {
        assert!(FillRule::Positive.interpret(1));
        assert!(!FillRule::Positive.interpret(-1));
        assert!(FillRule::Negative.interpret(-2));
        assert!(FillRule::Odd.interpret(-3));
        assert!(!FillRule::NonZero.interpret(0));
        assert_eq!(FillRule::from(peniko::Fill::EvenOdd), FillRule::Odd);
    }

    #[test]
    fn overlap_of_shifted_spans() {
        let a = scanline(&[(1.0, 1), (3.0, -1)]);
        let b = scanline(&[(2.0, 1), (4.0, -1)]);
        // Agreement on [0, 1], [2, 3] and [4, 5].
        let overlap = Scanline::overlap(&a, &b, 0.0, 5.0, FillRule::NonZero);
        assert!((overlap - 3.0).abs() < 1e-12);
        let identical = Scanline::overlap(&a, &a, 0.0, 5.0, FillRule::NonZero);
        assert!((identical - 5.0).abs() < 1e-12);
    }
}
