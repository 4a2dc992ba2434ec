// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for single-channel distance fields.

use crate::util::{circle, distance, for_each_pixel, pixel_filled, polygon, rect};
use vello_msdf::kurbo::Vec2;
use vello_msdf::rasterization::distance_sign_correction;
use vello_msdf::{Bitmap, FillRule, GeneratorConfig, Projection, generate_psdf, generate_sdf};

#[test]
fn circle_distances() {
    let radius = 8.0;
    let range = 4.0;
    // Pixel (15, 15) is centered on the origin.
    let projection = Projection::new(Vec2::new(1.0, 1.0), Vec2::new(15.5, 15.5));
    let shape = circle((0.0, 0.0), radius);
    let mut sdf = Bitmap::new(32, 32);
    generate_sdf(&mut sdf, &shape, &projection, range, &GeneratorConfig::default());

    let center = distance(sdf.pixel(15, 15)[0], range);
    assert!((center - radius).abs() < 0.01, "{center}");
    for (x, y) in [(25, 15), (5, 15), (15, 25), (15, 5)] {
        let d = distance(sdf.pixel(x, y)[0], range);
        assert!((d + 2.0).abs() < 0.01, "({x}, {y}): {d}");
    }
    let on_edge = distance(sdf.pixel(23, 15)[0], range);
    assert!(on_edge.abs() < 0.01, "{on_edge}");
}

#[test]
fn unit_square_interior() {
    let shape = rect(0.0, 0.0, 1.0, 1.0);
    let range = 4.0;
    let projection = Projection::new(Vec2::new(32.0, 32.0), Vec2::ZERO);
    let mut sdf = Bitmap::new(32, 32);
    generate_sdf(&mut sdf, &shape, &projection, range, &GeneratorConfig::default());

    // Every pixel center lies inside the square.
    for_each_pixel(&sdf, |x, y, [value]| {
        let px = (x as f64 + 0.5) / 32.0;
        let py = (y as f64 + 0.5) / 32.0;
        let expected = px.min(1.0 - px).min(py).min(1.0 - py);
        assert!(value > 0.5);
        assert!((distance(value, range) - expected).abs() < 1e-5, "({x}, {y})");
    });
    assert!(sdf.pixel(16, 8)[0] > 0.5);
    assert!(sdf.pixel(16, 16)[0] > sdf.pixel(16, 8)[0]);
}

#[test]
fn unit_square_with_margin() {
    let shape = rect(0.0, 0.0, 1.0, 1.0);
    let range = 0.25;
    let projection = Projection::new(Vec2::new(16.0, 16.0), Vec2::new(0.5, 0.5));
    let mut sdf = Bitmap::new(32, 32);
    generate_sdf(&mut sdf, &shape, &projection, range, &GeneratorConfig::default());

    // The corner pixel lies outside the square, the middle one inside.
    assert!(sdf.pixel(0, 0)[0] < 0.5);
    assert!(sdf.pixel(16, 16)[0] > 0.5);
    for_each_pixel(&sdf, |x, y, [value]| {
        let inside = pixel_filled(&shape, &projection, x, y);
        if (value - 0.5).abs() > 1e-3 {
            assert_eq!(value > 0.5, inside, "({x}, {y})");
        }
    });
}

#[test]
fn sign_correction_fixes_reversed_winding() {
    let range = 4.0;
    let projection = Projection::default();
    let config = GeneratorConfig::default();
    for points in [
        [(4.0, 4.0), (28.0, 4.0), (16.0, 28.0)],
        [(4.0, 4.0), (16.0, 28.0), (28.0, 4.0)],
    ] {
        let shape = polygon(&points);
        let mut sdf = Bitmap::new(32, 32);
        generate_sdf(&mut sdf, &shape, &projection, range, &config);
        distance_sign_correction(&mut sdf, &shape, &projection, FillRule::NonZero);
        let mut psdf = Bitmap::new(32, 32);
        generate_psdf(&mut psdf, &shape, &projection, range, &config);
        distance_sign_correction(&mut psdf, &shape, &projection, FillRule::NonZero);

        for_each_pixel(&sdf, |x, y, [value]| {
            if distance(value, range).abs() > 0.5 {
                let inside = pixel_filled(&shape, &projection, x, y);
                assert_eq!(value > 0.5, inside, "sdf ({x}, {y})");
                assert_eq!(psdf.pixel(x, y)[0] > 0.5, inside, "psdf ({x}, {y})");
            }
        });
    }
}

#[test]
fn overlapping_contours() {
    let range = 4.0;
    let projection = Projection::default();
    let mut shape = rect(4.0, 4.0, 20.0, 20.0);
    shape.contours.extend(rect(12.0, 12.0, 28.0, 28.0).contours);
    let mut sdf = Bitmap::new(32, 32);
    generate_sdf(&mut sdf, &shape, &projection, range, &GeneratorConfig::default());

    // Within the overlap, the inner edges of the squares are not part of the outline, so the
    // farther of the two contour distances is reported.
    let d = distance(sdf.pixel(15, 15)[0], range);
    assert!((d - 4.5).abs() < 1e-3, "{d}");

    let config = GeneratorConfig {
        overlap_support: false,
        ..GeneratorConfig::default()
    };
    let mut simple = Bitmap::new(32, 32);
    generate_sdf(&mut simple, &shape, &projection, range, &config);
    let d = distance(simple.pixel(15, 15)[0], range);
    assert!((d - 3.5).abs() < 1e-3, "{d}");
}
