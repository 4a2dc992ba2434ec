// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use vello_msdf::kurbo::Rect;

use crate::rectangle_packing::Rectangle;

/// The layout of a glyph in the atlas: where its quad lies relative to the glyph origin and
/// which atlas pixels it covers.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphBox {
    /// The glyph index.
    pub index: u32,
    /// The Unicode codepoint, if the glyph was loaded for one.
    pub codepoint: Option<char>,
    /// The horizontal advance, in em units.
    pub advance: f64,
    /// The quad in em units, relative to the glyph origin, with `y0` at the bottom.
    pub bounds: Rect,
    /// The atlas pixels covered by the glyph, with `y` at the bottom.
    pub rect: Rectangle,
}
