// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Computes the layout of a set of glyphs in an atlas, and the largest glyph scale that fits.

use thiserror::Error;

use crate::glyph_geometry::GlyphGeometry;
use crate::rectangle_packing::{
    PowerOfTwoSizeSelector, Rectangle, SizeSelector, SquarePowerOfTwoSizeSelector,
    SquareSizeSelector, pack_rectangles, pack_rectangles_into,
};

/// The shapes the atlas dimensions may take when they are not fixed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DimensionsConstraint {
    /// Any square.
    Square,
    /// A square with an even side.
    EvenSquare,
    /// A square with a side divisible by four.
    MultipleOfFourSquare,
    /// A square with a power of two side.
    #[default]
    PowerOfTwoSquare,
    /// A rectangle with power of two sides.
    PowerOfTwoRectangle,
}

/// Errors that can occur while packing an atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PackError {
    /// The boxes do not fit into the fixed atlas dimensions.
    #[error("{remaining} glyph boxes do not fit into the atlas")]
    NoFit {
        /// The number of boxes left over.
        remaining: usize,
    },
    /// No scale at or above the minimum scale fits the fixed atlas dimensions.
    #[error("No glyph scale fits into the atlas")]
    ScaleNotFound,
    /// Neither the scale nor the dimensions are set, so nothing bounds the atlas.
    #[error("Atlas dimensions and glyph scale are both unconstrained")]
    Unconstrained,
}

/// Packs glyph boxes into an atlas as tightly as possible.
///
/// Either the atlas dimensions or the glyph scale may be left unset:
///
/// - With a fixed scale and no dimensions, the smallest dimensions allowed by the
///   [`DimensionsConstraint`] are found.
/// - With fixed dimensions and no scale, the largest scale that fits is found.
/// - With neither, the dimensions are found for the minimum scale and the scale is then
///   maximized for them.
#[derive(Clone, Debug)]
pub struct TightAtlasPacker {
    dimensions: Option<(u32, u32)>,
    spacing: u32,
    dimensions_constraint: DimensionsConstraint,
    scale: Option<f64>,
    min_scale: f64,
    unit_range: f64,
    px_range: f64,
    miter_limit: f64,
    align_origin_x: bool,
    align_origin_y: bool,
    scale_maximization_tolerance: f64,
}

impl Default for TightAtlasPacker {
    fn default() -> Self {
        Self {
            dimensions: None,
            spacing: 0,
            dimensions_constraint: DimensionsConstraint::default(),
            scale: None,
            min_scale: 1.0,
            unit_range: 0.0,
            px_range: 0.0,
            miter_limit: 0.0,
            align_origin_x: false,
            align_origin_y: false,
            scale_maximization_tolerance: 0.001,
        }
    }
}

impl TightAtlasPacker {
    /// Create a packer with unset dimensions and scale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the layout of `glyphs` and places their boxes.
    ///
    /// On success, the dimensions and scale are set and can be read back.
    ///
    /// On error, the scale is left unset when it was being searched, and the dimensions keep
    /// whatever the pack at the initial scale selected, if anything. The glyphs may be left
    /// wrapped and placed at the last scale that was tried.
    pub fn pack(&mut self, glyphs: &mut [GlyphGeometry]) -> Result<(), PackError> {
        let initial_scale = self.scale.unwrap_or(self.min_scale);
        if initial_scale > 0.0 {
            let constraint = self.dimensions_constraint;
            let mut dimensions = self.dimensions;
            let result = self.try_pack(glyphs, constraint, &mut dimensions, initial_scale);
            self.dimensions = dimensions;
            result?;
        } else if self.dimensions.is_none() {
            return Err(PackError::Unconstrained);
        }
        if self.scale.is_none() {
            let scale = self.pack_and_scale(glyphs);
            if scale <= 0.0 {
                return Err(PackError::ScaleNotFound);
            }
            self.scale = Some(scale);
        }
        Ok(())
    }

    /// Wraps the glyphs into boxes at `scale` and packs them.
    ///
    /// Unset `dimensions` are filled in from the constraint.
    fn try_pack(
        &self,
        glyphs: &mut [GlyphGeometry],
        constraint: DimensionsConstraint,
        dimensions: &mut Option<(u32, u32)>,
        scale: f64,
    ) -> Result<(), PackError> {
        let range = self.unit_range + self.px_range / scale;
        let mut rectangles = Vec::with_capacity(glyphs.len());
        let mut rectangle_glyphs = Vec::with_capacity(glyphs.len());
        for (i, glyph) in glyphs.iter_mut().enumerate() {
            if glyph.is_whitespace() {
                continue;
            }
            glyph.wrap_box(
                scale,
                range,
                self.miter_limit,
                self.align_origin_x,
                self.align_origin_y,
            );
            let rect = glyph.box_rect();
            if rect.w > 0 && rect.h > 0 {
                rectangles.push(Rectangle::new(0, 0, rect.w, rect.h));
                rectangle_glyphs.push(i);
            }
        }
        if rectangles.is_empty() {
            dimensions.get_or_insert((0, 0));
            return Ok(());
        }

        let height = match *dimensions {
            Some((width, height)) => {
                let remaining = pack_rectangles_into(&mut rectangles, width, height, self.spacing);
                if remaining > 0 {
                    return Err(PackError::NoFit { remaining });
                }
                height
            }
            None => {
                let found = self
                    .select_size(constraint, &mut rectangles)
                    .ok_or(PackError::NoFit {
                        remaining: rectangles.len(),
                    })?;
                *dimensions = Some(found);
                found.1
            }
        };
        // Rectangles are packed from the top, while boxes are placed from the bottom.
        for (rect, &i) in rectangles.iter().zip(&rectangle_glyphs) {
            glyphs[i].place_box(rect.x, height - (rect.y + rect.h));
        }
        Ok(())
    }

    fn select_size(
        &self,
        constraint: DimensionsConstraint,
        rectangles: &mut [Rectangle],
    ) -> Option<(u32, u32)> {
        fn search<S: SizeSelector>(
            rectangles: &mut [Rectangle],
            spacing: u32,
        ) -> Option<(u32, u32)> {
            pack_rectangles::<S>(rectangles, spacing).filter(|&(w, h)| w > 0 && h > 0)
        }
        match constraint {
            DimensionsConstraint::Square => {
                search::<SquareSizeSelector<1>>(rectangles, self.spacing)
            }
            DimensionsConstraint::EvenSquare => {
                search::<SquareSizeSelector<2>>(rectangles, self.spacing)
            }
            DimensionsConstraint::MultipleOfFourSquare => {
                search::<SquareSizeSelector<4>>(rectangles, self.spacing)
            }
            DimensionsConstraint::PowerOfTwoSquare => {
                search::<SquarePowerOfTwoSizeSelector>(rectangles, self.spacing)
            }
            DimensionsConstraint::PowerOfTwoRectangle => {
                search::<PowerOfTwoSizeSelector>(rectangles, self.spacing)
            }
        }
    }

    /// Finds the largest scale at which the glyphs fit into the current dimensions, and
    /// leaves the glyphs packed at that scale. Returns zero if no scale fits.
    fn pack_and_scale(&self, glyphs: &mut [GlyphGeometry]) -> f64 {
        let mut dimensions = self.dimensions;
        let constraint = self.dimensions_constraint;
        let mut try_pack = |glyphs: &mut [GlyphGeometry], scale: f64| {
            self.try_pack(glyphs, constraint, &mut dimensions, scale).is_ok()
        };

        let (mut min_scale, mut max_scale) = (1.0_f64, 1.0_f64);
        let mut last_result = try_pack(glyphs, 1.0);
        if last_result {
            while max_scale < 1e32 {
                max_scale = 2.0 * min_scale;
                last_result = try_pack(glyphs, max_scale);
                if !last_result {
                    break;
                }
                min_scale = max_scale;
            }
        } else {
            while min_scale > 1e-32 {
                min_scale = 0.5 * max_scale;
                last_result = try_pack(glyphs, min_scale);
                if last_result {
                    break;
                }
                max_scale = min_scale;
            }
        }
        if min_scale == max_scale {
            return 0.0;
        }
        log::debug!("Glyph scale bracketed between {min_scale} and {max_scale}");
        while min_scale / max_scale < 1.0 - self.scale_maximization_tolerance {
            let mid_scale = 0.5 * (min_scale + max_scale);
            last_result = try_pack(glyphs, mid_scale);
            if last_result {
                min_scale = mid_scale;
            } else {
                max_scale = mid_scale;
            }
        }
        if !last_result {
            try_pack(glyphs, min_scale);
        }
        log::debug!("Packed glyphs at scale {min_scale}");
        min_scale
    }

    /// Fixes the atlas dimensions.
    pub fn set_dimensions(&mut self, width: u32, height: u32) {
        self.dimensions = Some((width, height));
    }

    /// Lets [`pack`](Self::pack) choose the atlas dimensions.
    pub fn unset_dimensions(&mut self) {
        self.dimensions = None;
    }

    /// Sets the constraint on atlas dimensions chosen by [`pack`](Self::pack).
    pub fn set_dimensions_constraint(&mut self, constraint: DimensionsConstraint) {
        self.dimensions_constraint = constraint;
    }

    /// Sets the number of pixels kept free between glyph boxes.
    pub fn set_spacing(&mut self, spacing: u32) {
        self.spacing = spacing;
    }

    /// Fixes the glyph scale, in pixels per em.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = Some(scale);
    }

    /// Lets [`pack`](Self::pack) maximize the glyph scale.
    pub fn unset_scale(&mut self) {
        self.scale = None;
    }

    /// Sets the scale used to choose dimensions when neither scale nor dimensions are set.
    pub fn set_minimum_scale(&mut self, min_scale: f64) {
        self.min_scale = min_scale;
    }

    /// Sets the part of the distance range given in em units.
    pub fn set_unit_range(&mut self, unit_range: f64) {
        self.unit_range = unit_range;
    }

    /// Sets the part of the distance range given in pixels.
    pub fn set_pixel_range(&mut self, px_range: f64) {
        self.px_range = px_range;
    }

    /// Sets the miter limit that glyph boxes are grown to fit. Zero disables miters.
    pub fn set_miter_limit(&mut self, miter_limit: f64) {
        self.miter_limit = miter_limit;
    }

    /// Places glyph origins on pixel boundaries along the selected axes.
    pub fn set_origin_pixel_alignment(&mut self, align_x: bool, align_y: bool) {
        self.align_origin_x = align_x;
        self.align_origin_y = align_y;
    }

    /// Sets the relative precision of the scale maximization.
    pub fn set_scale_maximization_tolerance(&mut self, tolerance: f64) {
        self.scale_maximization_tolerance = tolerance;
    }

    /// The atlas dimensions, if set or found.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    /// The glyph scale in pixels per em, if set or found.
    pub fn scale(&self) -> Option<f64> {
        self.scale
    }

    /// The total distance range in pixels, at the current scale.
    pub fn pixel_range(&self) -> f64 {
        self.px_range + self.scale.unwrap_or(0.0) * self.unit_range
    }
}
