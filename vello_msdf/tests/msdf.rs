// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for multi-channel distance fields.

use crate::util::{distance, for_each_pixel, rect};
use vello_msdf::contour_combiners::SimpleContourCombiner;
use vello_msdf::distance_finder::ShapeDistanceFinder;
use vello_msdf::edge_coloring::edge_coloring_simple;
use vello_msdf::edge_selectors::MultiDistanceSelector;
use vello_msdf::error_correction::{MsdfErrorCorrection, msdf_error_correction_with_stencil};
use vello_msdf::kurbo::Point;
use vello_msdf::math::median;
use vello_msdf::shape_description::read_shape_description;
use vello_msdf::{
    Bitmap, DistanceCheckMode, ErrorCorrectionConfig, ErrorCorrectionMode, GeneratorConfig,
    MsdfGeneratorConfig, Projection, Shape, generate_msdf, generate_mtsdf, generate_sdf,
};

const MODES: [ErrorCorrectionMode; 4] = [
    ErrorCorrectionMode::Disabled,
    ErrorCorrectionMode::Indiscriminate,
    ErrorCorrectionMode::EdgePriority,
    ErrorCorrectionMode::EdgeOnly,
];

const CHECK_MODES: [DistanceCheckMode; 3] = [
    DistanceCheckMode::DoNotCheckDistance,
    DistanceCheckMode::CheckDistanceAtEdge,
    DistanceCheckMode::AlwaysCheckDistance,
];

fn colored(mut shape: Shape) -> Shape {
    edge_coloring_simple(&mut shape, 3.0, 0);
    shape
}

#[test]
fn channels_without_edges_are_unset() {
    let (shape, colors_specified) =
        read_shape_description("{ 0, 0; r; 0, 2; g; 2, 2; r; 2, 0; g; # }").unwrap();
    assert!(colors_specified);
    let distance =
        ShapeDistanceFinder::<SimpleContourCombiner<MultiDistanceSelector>>::one_shot_distance(
            &shape,
            Point::new(1.0, 1.0),
        );
    assert!((distance.r - 1.0).abs() < 1e-12, "{distance:?}");
    assert!((distance.g - 1.0).abs() < 1e-12, "{distance:?}");
    assert_eq!(distance.b, -f64::MAX);
}

#[test]
fn channel_follows_its_own_edges() {
    // Only the bottom edge is red, so off-center the red channel measures the distance to it.
    let (shape, _) =
        read_shape_description("{ 0, 0; g; 0, 4; b; 4, 4; g; 4, 0; r; # }").unwrap();
    let distance =
        ShapeDistanceFinder::<SimpleContourCombiner<MultiDistanceSelector>>::one_shot_distance(
            &shape,
            Point::new(1.0, 3.0),
        );
    assert!((distance.r - 3.0).abs() < 1e-12, "{distance:?}");
    assert!((distance.g - 1.0).abs() < 1e-12, "{distance:?}");
    assert!((distance.b - 1.0).abs() < 1e-12, "{distance:?}");
}

#[test]
fn median_classifies_like_sdf() {
    let range = 4.0;
    let projection = Projection::default();
    let shape = colored(rect(6.0, 6.0, 26.0, 20.0));
    let mut sdf = Bitmap::new(32, 32);
    generate_sdf(&mut sdf, &shape, &projection, range, &GeneratorConfig::default());

    for mode in MODES {
        for distance_check_mode in CHECK_MODES {
            let config = MsdfGeneratorConfig {
                error_correction: ErrorCorrectionConfig {
                    mode,
                    distance_check_mode,
                    ..ErrorCorrectionConfig::default()
                },
                ..MsdfGeneratorConfig::default()
            };
            let mut msdf = Bitmap::new(32, 32);
            generate_msdf(&mut msdf, &shape, &projection, range, &config);
            for_each_pixel(&msdf, |x, y, [r, g, b]| {
                let true_distance = distance(sdf.pixel(x, y)[0], range);
                if true_distance.abs() > 1.0 {
                    let inside = median(r, g, b) > 0.5;
                    assert_eq!(inside, true_distance > 0.0, "{mode:?} ({x}, {y})");
                }
            });
        }
    }
}

#[test]
fn interior_median_is_true_distance() {
    let range = 8.0;
    let projection = Projection::default();
    let shape = colored(rect(4.0, 4.0, 28.0, 28.0));
    let mut sdf = Bitmap::new(32, 32);
    generate_sdf(&mut sdf, &shape, &projection, range, &GeneratorConfig::default());
    let mut msdf = Bitmap::new(32, 32);
    generate_msdf(&mut msdf, &shape, &projection, range, &MsdfGeneratorConfig::default());

    for_each_pixel(&msdf, |x, y, [r, g, b]| {
        let expected = sdf.pixel(x, y)[0];
        if expected > 0.5 {
            assert!((median(r, g, b) - expected).abs() < 1e-5, "({x}, {y})");
        }
    });
}

#[test]
fn mtsdf_alpha_is_true_distance() {
    let range = 4.0;
    let projection = Projection::default();
    let shape = colored(rect(5.0, 7.0, 25.0, 23.0));
    let mut sdf = Bitmap::new(32, 32);
    generate_sdf(&mut sdf, &shape, &projection, range, &GeneratorConfig::default());
    let mut mtsdf = Bitmap::new(32, 32);
    generate_mtsdf(&mut mtsdf, &shape, &projection, range, &MsdfGeneratorConfig::default());

    for_each_pixel(&mtsdf, |x, y, [r, g, b, a]| {
        assert!((a - sdf.pixel(x, y)[0]).abs() < 1e-5, "({x}, {y})");
        let true_distance = distance(a, range);
        if true_distance.abs() > 1.0 {
            assert_eq!(median(r, g, b) > 0.5, true_distance > 0.0, "({x}, {y})");
        }
    });
}

#[test]
fn edge_priority_keeps_corners_and_clears_clashes() {
    let (shape, _) =
        read_shape_description("{ 4, 4; c; 4, 20; m; 20, 20; y; 20, 4; m; # }").unwrap();
    let projection = Projection::default();
    let range = 4.0;
    let mut msdf = Bitmap::<f32, 3>::new(24, 24);
    let uncorrected = MsdfGeneratorConfig {
        error_correction: ErrorCorrectionConfig {
            mode: ErrorCorrectionMode::Disabled,
            ..ErrorCorrectionConfig::default()
        },
        ..MsdfGeneratorConfig::default()
    };
    generate_msdf(&mut msdf, &shape, &projection, range, &uncorrected);

    // Two texels in the middle of the square whose green and blue channels swap places, so
    // that the median dips to the outline halfway between them.
    let (inside, outside) = (2.5, -1.5);
    *msdf.pixel_mut(11, 12) = [inside, inside, outside];
    *msdf.pixel_mut(12, 12) = [inside, outside, inside];
    let before = msdf.clone();

    let mut stencil = Bitmap::new(0, 0);
    let config = MsdfGeneratorConfig::default();
    assert_eq!(config.error_correction.mode, ErrorCorrectionMode::EdgePriority);
    msdf_error_correction_with_stencil(
        &mut msdf,
        &shape,
        &projection,
        range,
        &config,
        Some(&mut stencil),
    );

    for (x, y) in [(11, 12), (12, 12)] {
        assert_ne!(stencil.pixel(x, y)[0] & MsdfErrorCorrection::ERROR, 0);
        assert_eq!(*msdf.pixel(x, y), [inside; 3], "({x}, {y})");
    }

    // The four texels around each corner keep their channels.
    let mut sharp = 0;
    for (cx, cy) in [(4, 4), (4, 20), (20, 20), (20, 4)] {
        for (x, y) in [(cx - 1, cy - 1), (cx, cy - 1), (cx - 1, cy), (cx, cy)] {
            assert_eq!(stencil.pixel(x, y)[0] & MsdfErrorCorrection::ERROR, 0, "({x}, {y})");
            let texel = *msdf.pixel(x, y);
            assert_eq!(texel, *before.pixel(x, y), "({x}, {y})");
            if texel[0] != texel[1] || texel[1] != texel[2] {
                sharp += 1;
            }
        }
    }
    assert!(sharp > 0);
}
