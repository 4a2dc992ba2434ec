// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Utility functions shared across different tests.

use vello_msdf::kurbo::Point;
use vello_msdf::shape_description::read_shape_description;
use vello_msdf_atlas::GlyphGeometry;
use vello_msdf_atlas::rectangle_packing::Rectangle;

/// A square frame with a square hole, spanning `0..3` on both axes.
pub(crate) const FRAME: &str = "{ 0, 0; 0, 3; 3, 3; 3, 0; # } { 1, 1; 2, 1; 2, 2; 1, 2; # }";
/// A triangle spanning `0..2` on both axes.
pub(crate) const TRIANGLE: &str = "{ 0, 0; 1, 2; 2, 0; # }";
/// A shape with a quadratic edge.
pub(crate) const BULGE: &str = "{ 0, 0; (0, 2); 2, 2; 2, 0; # }";

/// Loads the test glyphs: the frame, the triangle, a space and the bulge, with codepoints
/// `A` to `D`. Shapes are in units of a quarter em.
pub(crate) fn glyph_set() -> Vec<GlyphGeometry> {
    [Some(FRAME), Some(TRIANGLE), None, Some(BULGE)]
        .into_iter()
        .zip('A'..)
        .enumerate()
        .map(|(i, (description, codepoint))| {
            let shape = match description {
                Some(description) => read_shape_description(description).unwrap().0,
                None => vello_msdf::Shape::new(),
            };
            let mut glyph = GlyphGeometry::new(shape, 0.25, 3.5)
                .with_index(i as u32)
                .with_codepoint(codepoint);
            glyph.edge_coloring(3.0, 0);
            glyph
        })
        .collect()
}

/// Asserts that the placed boxes lie within the atlas and keep `spacing` pixels apart.
pub(crate) fn assert_valid_layout(glyphs: &[GlyphGeometry], dimensions: (u32, u32), spacing: u32) {
    let rects: Vec<Rectangle> = glyphs
        .iter()
        .map(GlyphGeometry::box_rect)
        .filter(|rect| rect.w > 0)
        .collect();
    for (i, a) in rects.iter().enumerate() {
        assert!(a.x + a.w <= dimensions.0 && a.y + a.h <= dimensions.1, "{a:?}");
        for b in &rects[i + 1..] {
            let apart = a.x + a.w + spacing <= b.x
                || b.x + b.w + spacing <= a.x
                || a.y + a.h + spacing <= b.y
                || b.y + b.h + spacing <= a.y;
            assert!(apart, "{a:?} {b:?}");
        }
    }
}

/// The atlas pixel whose area contains the shape point `p` of `glyph`.
pub(crate) fn atlas_pixel(glyph: &GlyphGeometry, p: (f64, f64)) -> (usize, usize) {
    let rect = glyph.box_rect();
    let q = glyph.box_projection().project(Point::new(p.0, p.1));
    (
        rect.x as usize + q.x.floor() as usize,
        rect.y as usize + q.y.floor() as usize,
    )
}
