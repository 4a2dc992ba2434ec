// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::io::Write;

use vello_msdf::kurbo::Rect;

use crate::glyph_geometry::{GlyphGeometry, GlyphIdentifierType};
use crate::{ExportError, YDirection};

/// Writes the glyph layout as CSV, one glyph per line.
///
/// The columns are the identifier, the advance, the quad plane bounds (left, bottom, right,
/// top) in em units and the quad atlas bounds (left, bottom, right, top) in pixels. With
/// [`YDirection::TopDown`], "bottom" and "top" are measured downwards, from the glyph origin
/// and from the top of the atlas respectively.
pub fn export_csv<W: Write>(
    mut writer: W,
    glyphs: &[GlyphGeometry],
    identifier: GlyphIdentifierType,
    atlas_height: u32,
    y_direction: YDirection,
) -> Result<(), ExportError> {
    let atlas_height = f64::from(atlas_height);
    for glyph in glyphs {
        let plane = glyph.quad_plane_bounds();
        let atlas = glyph.quad_atlas_bounds();
        let (plane, atlas) = match y_direction {
            YDirection::BottomUp => (plane, atlas),
            YDirection::TopDown => (
                Rect::new(plane.x0, -plane.y1, plane.x1, -plane.y0),
                Rect::new(
                    atlas.x0,
                    atlas_height - atlas.y1,
                    atlas.x1,
                    atlas_height - atlas.y0,
                ),
            ),
        };
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{},{}",
            glyph.identifier(identifier),
            glyph.advance(),
            plane.x0,
            plane.y0,
            plane.x1,
            plane.y1,
            atlas.x0,
            atlas.y0,
            atlas.x1,
            atlas.y1,
        )?;
    }
    Ok(())
}
