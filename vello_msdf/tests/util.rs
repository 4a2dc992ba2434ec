// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Utility functions shared across different tests.

use vello_msdf::kurbo::{PathEl, Point, Rect, Shape as _};
use vello_msdf::scanline::{FillRule, Scanline};
use vello_msdf::{Bitmap, Projection, Shape};

/// Cubic control point distance for a quarter circle of radius 1.
const KAPPA: f64 = 0.552_284_749_8;

/// A circle made of four cubic quadrants, oriented to be filled on the inside.
pub(crate) fn circle(center: (f64, f64), radius: f64) -> Shape {
    let (cx, cy) = center;
    let k = KAPPA * radius;
    let p = |x: f64, y: f64| Point::new(cx + x, cy + y);
    let mut shape = Shape::from_path([
        PathEl::MoveTo(p(radius, 0.0)),
        PathEl::CurveTo(p(radius, k), p(k, radius), p(0.0, radius)),
        PathEl::CurveTo(p(-k, radius), p(-radius, k), p(-radius, 0.0)),
        PathEl::CurveTo(p(-radius, -k), p(-k, -radius), p(0.0, -radius)),
        PathEl::CurveTo(p(k, -radius), p(radius, -k), p(radius, 0.0)),
        PathEl::ClosePath,
    ]);
    shape.normalize();
    shape.orient_contours();
    shape
}

/// An axis-aligned rectangle, oriented to be filled on the inside.
pub(crate) fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Shape {
    let mut shape = Shape::from_path(Rect::new(x0, y0, x1, y1).path_elements(0.1));
    shape.normalize();
    shape.orient_contours();
    shape
}

/// A closed polygon with the winding given by the order of `points`.
pub(crate) fn polygon(points: &[(f64, f64)]) -> Shape {
    let mut elements = Vec::with_capacity(points.len() + 1);
    for (i, &p) in points.iter().enumerate() {
        elements.push(if i == 0 {
            PathEl::MoveTo(p.into())
        } else {
            PathEl::LineTo(p.into())
        });
    }
    elements.push(PathEl::ClosePath);
    let mut shape = Shape::from_path(elements);
    shape.normalize();
    shape
}

/// Converts a pixel value back to a distance in shape units.
pub(crate) fn distance(value: f32, range: f64) -> f64 {
    (f64::from(value) - 0.5) * range
}

/// Whether the center of pixel `(x, y)` is filled by `shape`, for a bitmap generated with
/// `projection`.
pub(crate) fn pixel_filled(shape: &Shape, projection: &Projection, x: usize, y: usize) -> bool {
    let p = projection.unproject(Point::new(x as f64 + 0.5, y as f64 + 0.5));
    let mut line = Scanline::new();
    shape.scanline(&mut line, p.y);
    line.filled(p.x, FillRule::NonZero)
}

/// Calls `f` with the coordinates and value of every pixel of a bitmap.
pub(crate) fn for_each_pixel<const N: usize>(
    bitmap: &Bitmap<f32, N>,
    mut f: impl FnMut(usize, usize, [f32; N]),
) {
    for y in 0..bitmap.height() {
        for x in 0..bitmap.width() {
            f(x, y, *bitmap.pixel(x, y));
        }
    }
}
