// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON description of an atlas and its glyph layout.

use std::io::Write;

use serde::Serialize;
use vello_msdf::kurbo::Rect;

use crate::glyph_geometry::{GlyphGeometry, GlyphIdentifierType};
use crate::{ExportError, YDirection};

/// The kind of distance field stored in the atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    /// True signed distance field.
    Sdf,
    /// Signed pseudo-distance field.
    Psdf,
    /// Multi-channel signed distance field.
    Msdf,
    /// Multi-channel signed distance field with the true distance in alpha.
    Mtsdf,
}

/// Properties of the atlas as a whole.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JsonAtlasMetrics {
    /// The distance range in pixels.
    pub distance_range: f64,
    /// The glyph scale in pixels per em.
    pub size: f64,
    /// The atlas width in pixels.
    pub width: u32,
    /// The atlas height in pixels.
    pub height: u32,
    /// The direction of the Y axis in exported coordinates.
    pub y_direction: YDirection,
}

#[derive(Serialize)]
struct Document {
    atlas: Atlas,
    glyphs: Vec<Glyph>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Atlas {
    #[serde(rename = "type")]
    image_type: ImageType,
    distance_range: f64,
    size: f64,
    width: u32,
    height: u32,
    y_origin: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Glyph {
    #[serde(skip_serializing_if = "Option::is_none")]
    unicode: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<u32>,
    advance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    plane_bounds: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    atlas_bounds: Option<Bounds>,
}

#[derive(Serialize)]
struct Bounds {
    left: f64,
    bottom: f64,
    right: f64,
    top: f64,
}

impl Bounds {
    /// `None` for an empty rectangle, which is what whitespace glyphs have.
    fn from_rect(rect: Rect, bottom: f64, top: f64) -> Option<Self> {
        (rect.x0 < rect.x1 && rect.y0 < rect.y1).then_some(Self {
            left: rect.x0,
            bottom,
            right: rect.x1,
            top,
        })
    }
}

/// Writes the atlas metrics and glyph layout as JSON.
///
/// With [`YDirection::TopDown`], vertical plane bounds are negated and vertical atlas bounds
/// are measured from the top of the atlas.
pub fn export_json<W: Write>(
    writer: W,
    glyphs: &[GlyphGeometry],
    identifier: GlyphIdentifierType,
    image_type: ImageType,
    metrics: &JsonAtlasMetrics,
) -> Result<(), ExportError> {
    let height = f64::from(metrics.height);
    let top_down = metrics.y_direction == YDirection::TopDown;
    let glyphs = glyphs
        .iter()
        .map(|glyph| {
            let id = glyph.identifier(identifier);
            let plane = glyph.quad_plane_bounds();
            let atlas = glyph.quad_atlas_bounds();
            let (plane_bottom, plane_top, atlas_bottom, atlas_top) = if top_down {
                (-plane.y0, -plane.y1, height - atlas.y0, height - atlas.y1)
            } else {
                (plane.y0, plane.y1, atlas.y0, atlas.y1)
            };
            Glyph {
                unicode: (identifier == GlyphIdentifierType::UnicodeCodepoint).then_some(id),
                index: (identifier == GlyphIdentifierType::GlyphIndex).then_some(id),
                advance: glyph.advance(),
                plane_bounds: Bounds::from_rect(plane, plane_bottom, plane_top),
                atlas_bounds: Bounds::from_rect(atlas, atlas_bottom, atlas_top),
            }
        })
        .collect();
    let document = Document {
        atlas: Atlas {
            image_type,
            distance_range: metrics.distance_range,
            size: metrics.size,
            width: metrics.width,
            height: metrics.height,
            y_origin: if top_down { "top" } else { "bottom" },
        },
        glyphs,
    };
    serde_json::to_writer(writer, &document)?;
    Ok(())
}
