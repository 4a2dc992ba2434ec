// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for shape preparation and import.

use crate::util::{circle, distance, pixel_filled};
use vello_msdf::edge_coloring::edge_coloring_simple;
use vello_msdf::kurbo::PathEl;
use vello_msdf::shape_description::{read_shape_description, write_shape_description};
use vello_msdf::{Bitmap, GeneratorConfig, Projection, Shape, generate_sdf};

fn mixed_shape() -> Shape {
    let mut shape = Shape::from_path([
        // Two curves meeting at a cusp.
        PathEl::MoveTo((0.0, 0.0).into()),
        PathEl::QuadTo((10.0, 10.0).into(), (10.0, 0.0).into()),
        PathEl::QuadTo((10.0, 10.0).into(), (20.0, 0.0).into()),
        PathEl::ClosePath,
        // A degenerate edge.
        PathEl::MoveTo((30.0, 0.0).into()),
        PathEl::LineTo((40.0, 0.0).into()),
        PathEl::LineTo((40.0, 0.0).into()),
        PathEl::LineTo((40.0, 10.0).into()),
        PathEl::ClosePath,
        // A single edge.
        PathEl::MoveTo((50.0, 0.0).into()),
        PathEl::CurveTo((60.0, 10.0).into(), (40.0, 10.0).into(), (50.0, 0.0).into()),
    ]);
    shape.contours.extend(circle((0.0, 30.0), 5.0).contours);
    shape
}

#[test]
fn normalize_is_idempotent() {
    let mut once = mixed_shape();
    once.normalize();
    let mut twice = once.clone();
    twice.normalize();
    assert_eq!(once, twice);
    assert_eq!(once.contours.len(), 4);
    assert_eq!(once.contours[1].edges.len(), 3);
    assert_eq!(once.contours[2].edges.len(), 3);
    assert!(once.validate());
}

#[test]
fn colored_description_survives_writing() {
    let mut shape = mixed_shape();
    shape.normalize();
    edge_coloring_simple(&mut shape, 3.0, 42);
    let (read, colors_specified) = read_shape_description(&write_shape_description(&shape))
        .unwrap();
    assert!(colors_specified);
    assert_eq!(read, shape);
}

#[cfg(feature = "svg")]
#[test]
fn svg_document_to_distance_field() {
    use vello_msdf::FillRule;
    use vello_msdf::rasterization::distance_sign_correction;
    use vello_msdf::svg::{SvgImportFlags, load_svg_shape};

    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 32 32">
        <path d="M4 4 H28 V28 H4 Z M10 10 V22 H22 V10 Z"/>
    </svg>"#;
    let import = load_svg_shape(svg).unwrap();
    assert_eq!(import.flags, SvgImportFlags::SUCCESS);
    let mut shape = import.shape;
    shape.normalize();
    assert_eq!(shape.contours.len(), 2);

    let range = 4.0;
    let projection = Projection::default();
    let mut sdf = Bitmap::new(32, 32);
    generate_sdf(&mut sdf, &shape, &projection, range, &GeneratorConfig::default());
    distance_sign_correction(&mut sdf, &shape, &projection, FillRule::NonZero);
    // The frame is filled, the hole is not. Rows are flipped, which the square shape hides.
    let frame = distance(sdf.pixel(6, 16)[0], range);
    assert!(frame > 1.0, "{frame}");
    let hole = distance(sdf.pixel(16, 16)[0], range);
    assert!((hole + 5.5).abs() < 1e-3, "{hole}");
    assert!(pixel_filled(&shape, &projection, 6, 16));
}
