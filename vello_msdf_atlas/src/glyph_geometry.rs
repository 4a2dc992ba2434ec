// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The geometry of a single glyph and its box in the atlas.

use vello_msdf::Shape;
use vello_msdf::contour_combiners::SimpleContourCombiner;
use vello_msdf::distance_finder::ShapeDistanceFinder;
use vello_msdf::edge_coloring::edge_coloring_simple;
use vello_msdf::edge_selectors::TrueDistanceSelector;
use vello_msdf::kurbo::{Point, Rect, Vec2};
use vello_msdf::projection::Projection;

use crate::glyph_box::GlyphBox;
use crate::rectangle_packing::Rectangle;

/// Which number identifies glyphs in exported layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GlyphIdentifierType {
    /// The glyph index.
    GlyphIndex,
    /// The Unicode codepoint, or zero if the glyph has none.
    #[default]
    UnicodeCodepoint,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct BoxLayout {
    rect: Rectangle,
    range: f64,
    scale: f64,
    translate: Vec2,
}

/// A glyph shape prepared for distance field generation, and its box in the atlas.
///
/// The shape stays in its own units; `geometry_scale` converts them to em units, which is
/// what the atlas scale, distance ranges and exported bounds refer to.
#[derive(Clone, Debug)]
pub struct GlyphGeometry {
    index: u32,
    codepoint: Option<char>,
    geometry_scale: f64,
    shape: Shape,
    bounds: Option<Rect>,
    advance: f64,
    layout: BoxLayout,
}

impl GlyphGeometry {
    /// Prepares `shape` for generation.
    ///
    /// The shape is normalized, and its contours are reversed if it is wound inside out.
    /// `advance` is in shape units.
    pub fn new(mut shape: Shape, geometry_scale: f64, advance: f64) -> Self {
        shape.normalize();
        let bounds = shape.bounds();
        if let Some(b) = bounds {
            let outer_point = Point::new(b.x0 - b.width() - 1.0, b.y0 - b.height() - 1.0);
            let distance = ShapeDistanceFinder::<
                SimpleContourCombiner<TrueDistanceSelector>,
            >::one_shot_distance(&shape, outer_point);
            if distance > 0.0 {
                for contour in &mut shape.contours {
                    contour.reverse();
                }
            }
        }
        Self {
            index: 0,
            codepoint: None,
            geometry_scale,
            shape,
            bounds,
            advance: advance * geometry_scale,
            layout: BoxLayout::default(),
        }
    }

    /// Sets the glyph index.
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    /// Sets the Unicode codepoint the glyph represents.
    pub fn with_codepoint(mut self, codepoint: char) -> Self {
        self.codepoint = Some(codepoint);
        self
    }

    /// Colors the edges for multi-channel generation, see [`edge_coloring_simple`].
    pub fn edge_coloring(&mut self, angle_threshold: f64, seed: u64) {
        edge_coloring_simple(&mut self.shape, angle_threshold, seed);
    }

    /// Computes the size of the glyph box at `scale` pixels per em, padded for a distance
    /// range of `range` em.
    ///
    /// With a positive `miter_limit`, the box also fits miters of the outline grown by half
    /// the range. `align_origin_x` and `align_origin_y` place the glyph origin on a pixel
    /// boundary.
    pub fn wrap_box(
        &mut self,
        scale: f64,
        range: f64,
        miter_limit: f64,
        align_origin_x: bool,
        align_origin_y: bool,
    ) {
        let scale = scale * self.geometry_scale;
        let range = range / self.geometry_scale;
        self.layout.range = range;
        self.layout.scale = scale;
        let Some(bounds) = self.bounds.filter(|b| b.x0 < b.x1 && b.y0 < b.y1) else {
            self.layout.rect.w = 0;
            self.layout.rect.h = 0;
            self.layout.translate = Vec2::ZERO;
            return;
        };
        let border = 0.5 * range;
        let mut padded = bounds.inflate(border, border);
        if miter_limit > 0.0 {
            for contour in &self.shape.contours {
                contour.bound_miters(&mut padded, border, miter_limit, 1);
            }
        }
        let (w, tx) = fit_axis(scale, padded.x0, padded.x1, align_origin_x);
        let (h, ty) = fit_axis(scale, padded.y0, padded.y1, align_origin_y);
        self.layout.rect.w = w;
        self.layout.rect.h = h;
        self.layout.translate = Vec2::new(tx, ty);
    }

    /// Sets the position of the box in the atlas, with `y` at the bottom.
    pub fn place_box(&mut self, x: u32, y: u32) {
        self.layout.rect.x = x;
        self.layout.rect.y = y;
    }

    /// Overrides the box rectangle.
    pub fn set_box_rect(&mut self, rect: Rectangle) {
        self.layout.rect = rect;
    }

    /// The glyph index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The Unicode codepoint, if any.
    pub fn codepoint(&self) -> Option<char> {
        self.codepoint
    }

    /// The index or codepoint, as selected by `kind`.
    pub fn identifier(&self, kind: GlyphIdentifierType) -> u32 {
        match kind {
            GlyphIdentifierType::GlyphIndex => self.index,
            GlyphIdentifierType::UnicodeCodepoint => self.codepoint.map_or(0, u32::from),
        }
    }

    /// The factor from shape units to em units.
    pub fn geometry_scale(&self) -> f64 {
        self.geometry_scale
    }

    /// The prepared shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The bounds of the shape, in shape units.
    pub fn shape_bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// The horizontal advance, in em units.
    pub fn advance(&self) -> f64 {
        self.advance
    }

    /// The box rectangle in the atlas.
    pub fn box_rect(&self) -> Rectangle {
        self.layout.rect
    }

    /// The distance range of the box, in shape units.
    pub fn box_range(&self) -> f64 {
        self.layout.range
    }

    /// The scale of the box, in pixels per shape unit.
    pub fn box_scale(&self) -> f64 {
        self.layout.scale
    }

    /// The translation of the shape within the box, in shape units.
    pub fn box_translate(&self) -> Vec2 {
        self.layout.translate
    }

    /// The projection from shape units to pixels of the box.
    pub fn box_projection(&self) -> Projection {
        Projection::new(
            Vec2::new(self.layout.scale, self.layout.scale),
            self.layout.translate,
        )
    }

    /// The quad to draw the glyph with, in em units relative to the glyph origin.
    ///
    /// The quad runs through the centers of the outermost texels of the box.
    pub fn quad_plane_bounds(&self) -> Rect {
        let BoxLayout {
            rect,
            scale,
            translate,
            ..
        } = self.layout;
        if rect.w == 0 || rect.h == 0 {
            return Rect::ZERO;
        }
        let inv_scale = 1.0 / scale;
        let gs = self.geometry_scale;
        Rect::new(
            gs * (-translate.x + 0.5 * inv_scale),
            gs * (-translate.y + 0.5 * inv_scale),
            gs * (-translate.x + (f64::from(rect.w) - 0.5) * inv_scale),
            gs * (-translate.y + (f64::from(rect.h) - 0.5) * inv_scale),
        )
    }

    /// The texture coordinates of the quad, in atlas pixels.
    pub fn quad_atlas_bounds(&self) -> Rect {
        let rect = self.layout.rect;
        if rect.w == 0 || rect.h == 0 {
            return Rect::ZERO;
        }
        let (x, y) = (f64::from(rect.x), f64::from(rect.y));
        Rect::new(
            x + 0.5,
            y + 0.5,
            x + f64::from(rect.w) - 0.5,
            y + f64::from(rect.h) - 0.5,
        )
    }

    /// Whether the glyph has no outline.
    pub fn is_whitespace(&self) -> bool {
        self.shape.contours.is_empty()
    }

    /// The export record of the glyph.
    pub fn glyph_box(&self) -> GlyphBox {
        GlyphBox {
            index: self.index,
            codepoint: self.codepoint,
            advance: self.advance,
            bounds: self.quad_plane_bounds(),
            rect: self.layout.rect,
        }
    }
}

/// Returns the box size along one axis and the translation that centers `lo..hi` in it.
fn fit_axis(scale: f64, lo: f64, hi: f64, align_origin: bool) -> (u32, f64) {
    if align_origin {
        let start = (scale * lo - 0.5).floor();
        let end = (scale * hi + 0.5).ceil();
        ((end - start) as u32, -start / scale)
    } else {
        let extent = scale * (hi - lo);
        let size = extent.ceil() + 1.0;
        (size as u32, -lo + 0.5 * (size - extent) / scale)
    }
}

#[cfg(test)]
mod tests {
    use super::{GlyphGeometry, GlyphIdentifierType};
    use vello_msdf::Shape;
    use vello_msdf::kurbo::{Rect, Shape as _};

    fn square(size: f64) -> Shape {
        Shape::from_path(Rect::new(0.0, 0.0, size, size).path_elements(0.1))
    }

    #[test]
    fn inside_out_shape_is_reversed() {
        let mut reversed = square(2.0);
        reversed.orient_contours();
        for contour in &mut reversed.contours {
            contour.reverse();
        }
        let mut oriented = square(2.0);
        oriented.orient_contours();
        for shape in [reversed, oriented] {
            let glyph = GlyphGeometry::new(shape, 1.0, 0.0);
            assert_eq!(glyph.shape().contours[0].winding(), 1);
        }
    }

    #[test]
    fn box_layout() {
        let mut glyph = GlyphGeometry::new(square(2.0), 1.0, 3.0)
            .with_index(7)
            .with_codepoint('A');
        glyph.wrap_box(4.0, 1.0, 0.0, false, false);
        let rect = glyph.box_rect();
        assert_eq!((rect.w, rect.h), (13, 13));
        assert_eq!(glyph.box_translate().x, 0.625);
        assert_eq!(glyph.quad_plane_bounds(), Rect::new(-0.5, -0.5, 2.5, 2.5));

        glyph.place_box(3, 5);
        assert_eq!(glyph.quad_atlas_bounds(), Rect::new(3.5, 5.5, 15.5, 17.5));
        assert_eq!(glyph.identifier(GlyphIdentifierType::GlyphIndex), 7);
        assert_eq!(glyph.identifier(GlyphIdentifierType::UnicodeCodepoint), 65);
        assert_eq!(glyph.glyph_box().advance, 3.0);

        glyph.wrap_box(4.0, 1.0, 0.0, true, true);
        assert_eq!(glyph.box_rect().w, 14);
        assert_eq!(glyph.box_translate().y, 0.75);
    }

    #[test]
    fn geometry_scale_converts_to_em() {
        let mut glyph = GlyphGeometry::new(square(200.0), 0.01, 500.0);
        glyph.wrap_box(4.0, 1.0, 0.0, false, false);
        assert_eq!(glyph.advance(), 5.0);
        assert_eq!(glyph.box_scale(), 0.04);
        assert_eq!(glyph.box_range(), 100.0);
        assert_eq!(glyph.box_rect().w, 13);
        let plane = glyph.quad_plane_bounds();
        assert!((plane.x0 + 0.5).abs() < 1e-9 && (plane.x1 - 2.5).abs() < 1e-9);
    }

    #[test]
    fn whitespace_has_empty_box() {
        let mut glyph = GlyphGeometry::new(Shape::new(), 1.0, 1.0);
        assert!(glyph.is_whitespace());
        glyph.wrap_box(32.0, 0.125, 0.0, false, false);
        assert_eq!(glyph.box_rect().w, 0);
        assert_eq!(glyph.quad_plane_bounds(), Rect::ZERO);
        assert_eq!(glyph.quad_atlas_bounds(), Rect::ZERO);
    }
}
