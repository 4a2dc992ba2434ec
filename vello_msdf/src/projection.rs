// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping between shape coordinates and pixel coordinates.

use crate::kurbo::{Point, Vec2};

/// An axis-aligned scale and translation from shape space to pixel space.
///
/// A shape coordinate `p` maps to the pixel coordinate `scale * (p + translate)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Per-axis scale factor.
    pub scale: Vec2,
    /// Translation applied in shape space, before scaling.
    pub translate: Vec2,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            scale: Vec2::new(1.0, 1.0),
            translate: Vec2::ZERO,
        }
    }
}

impl Projection {
    /// Create a new projection.
    pub fn new(scale: Vec2, translate: Vec2) -> Self {
        Self { scale, translate }
    }

    /// Maps a shape coordinate to pixel space.
    #[inline]
    pub fn project(&self, coord: Point) -> Point {
        Point::new(self.project_x(coord.x), self.project_y(coord.y))
    }

    /// Maps a pixel coordinate back to shape space.
    #[inline]
    pub fn unproject(&self, coord: Point) -> Point {
        Point::new(self.unproject_x(coord.x), self.unproject_y(coord.y))
    }

    /// Maps a shape space vector to pixel space, ignoring the translation.
    #[inline]
    pub fn project_vector(&self, vector: Vec2) -> Vec2 {
        Vec2::new(self.scale.x * vector.x, self.scale.y * vector.y)
    }

    /// Maps a pixel space vector back to shape space, ignoring the translation.
    #[inline]
    pub fn unproject_vector(&self, vector: Vec2) -> Vec2 {
        Vec2::new(vector.x / self.scale.x, vector.y / self.scale.y)
    }

    #[inline]
    pub fn project_x(&self, x: f64) -> f64 {
        self.scale.x * (x + self.translate.x)
    }

    #[inline]
    pub fn project_y(&self, y: f64) -> f64 {
        self.scale.y * (y + self.translate.y)
    }

    #[inline]
    pub fn unproject_x(&self, x: f64) -> f64 {
        x / self.scale.x - self.translate.x
    }

    #[inline]
    pub fn unproject_y(&self, y: f64) -> f64 {
        y / self.scale.y - self.translate.y
    }
}

#[cfg(test)]
mod tests {
    use super::Projection;
    use crate::kurbo::{Point, Vec2};

    #[test]
    fn project_then_unproject() {
        let projection = Projection::new(Vec2::new(2.0, 4.0), Vec2::new(1.0, -1.0));
        let p = Point::new(3.0, 5.0);
        assert_eq!(projection.project(p), Point::new(8.0, 16.0));
        assert_eq!(projection.unproject(Point::new(8.0, 16.0)), p);
        assert_eq!(
            projection.unproject_vector(Vec2::new(1.0, 1.0)),
            Vec2::new(0.5, 0.25)
        );
    }
}
