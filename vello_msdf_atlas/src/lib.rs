// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph atlases of signed distance fields.
//!
//! This crate packs many glyph shapes into a single atlas image and renders their distance
//! fields with [`vello_msdf`]:
//!
//! 1. Wrap every glyph outline in a [`GlyphGeometry`], which normalizes it and fixes its
//!    winding. For multi-channel atlases, color its edges with
//!    [`GlyphGeometry::edge_coloring`].
//! 2. Lay out the glyph boxes with a [`TightAtlasPacker`], which finds either the atlas
//!    dimensions for a given glyph scale or the largest glyph scale for given dimensions.
//! 3. Render the glyphs into the atlas with an [`ImmediateAtlasGenerator`].
//! 4. Save the atlas image with [`image_save`] and the layout with [`export_csv`] or
//!    [`export_json`].
//!
//! Atlas images are stored with row zero at the bottom, and glyph boxes are placed with `y`
//! measured from the bottom. Exporters can flip this with [`YDirection::TopDown`].
//!
//! # Features
//!
//! - `png` (enabled by default): Save atlas images as PNG.

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![expect(
    clippy::cast_possible_truncation,
    reason = "Atlas coordinates are u32 while bitmaps are indexed with usize and geometry \
is computed in f64."
)]

use thiserror::Error;

pub mod atlas_generator;
pub mod atlas_storage;
pub mod csv_export;
pub mod glyph_box;
pub mod glyph_geometry;
pub mod image_save;
pub mod json_export;
pub mod rectangle_packing;
pub mod tight_atlas_packer;

pub use vello_msdf;

pub use atlas_generator::{GeneratorAttributes, ImmediateAtlasGenerator};
pub use atlas_storage::BitmapAtlasStorage;
pub use csv_export::export_csv;
pub use glyph_box::GlyphBox;
pub use glyph_geometry::{GlyphGeometry, GlyphIdentifierType};
pub use json_export::{ImageType, JsonAtlasMetrics, export_json};
pub use tight_atlas_packer::{DimensionsConstraint, PackError, TightAtlasPacker};

/// The direction of the Y axis in exported images and layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum YDirection {
    /// Y grows upwards from the bottom of the atlas and from the glyph baseline.
    #[default]
    BottomUp,
    /// Y grows downwards from the top of the atlas and from the glyph baseline.
    TopDown,
}

/// Errors that can occur while saving an atlas or its layout.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ExportError {
    /// Writing the output failed.
    #[error("Couldn't write atlas output")]
    Io(#[from] std::io::Error),
    /// Encoding the PNG image failed.
    #[cfg(feature = "png")]
    #[error("Couldn't encode PNG image")]
    Png(#[from] png::EncodingError),
    /// Serializing the JSON layout failed.
    #[error("Couldn't serialize atlas layout")]
    Json(#[from] serde_json::Error),
}
