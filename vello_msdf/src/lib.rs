// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generation of signed distance fields from vector outlines.
//!
//! This crate turns a [`Shape`](shape::Shape), a set of closed contours built from lines,
//! quadratic and cubic Bézier curves, into CPU-side distance field bitmaps:
//!
//! - SDF: the true signed distance to the outline, in one channel.
//! - PSDF: the signed perpendicular (pseudo) distance, in one channel.
//! - MSDF: three channels of pseudo-distance to differently colored edges, whose median
//!   reconstructs sharp corners after bilinear interpolation.
//! - MTSDF: an MSDF with the true distance stored in the fourth channel.
//!
//! The pipeline is:
//!
//! 1. Build a [`Shape`](shape::Shape), for example with
//!    [`Shape::from_path`](shape::Shape::from_path) or, with the `svg` feature,
//!    [`svg::load_svg_shape`].
//! 2. Call [`Shape::normalize`](shape::Shape::normalize) and optionally
//!    [`Shape::orient_contours`](shape::Shape::orient_contours).
//! 3. For multi-channel fields, assign edge colors, for example with
//!    [`edge_coloring_simple`](edge_coloring::edge_coloring_simple).
//! 4. Call one of the functions in [`generator`] with a [`Projection`](projection::Projection)
//!    and a distance range.
//!
//! Pixel values are `distance / range + 0.5`, so `0.5` lies on the outline.
//! Distances are positive on the filled side of contours that are wound like a TrueType
//! outer contour (clockwise with the Y axis pointing up).
//! [`Shape::orient_contours`](shape::Shape::orient_contours) and
//! [`distance_sign_correction`](rasterization::distance_sign_correction) bring arbitrary
//! input into that convention.
//!
//! # Features
//!
//! - `multithreading` (enabled by default): Distribute rows of the output bitmap over a
//!   [rayon] thread pool.
//! - `svg` (enabled by default): Import shapes from SVG documents (see the [`svg`] module).
//!
//! [rayon]: https://crates.io/crates/rayon

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
    reason = "Pixel values are stored as f32 while geometry is computed in f64, \
and pixel coordinates are converted between usize and f64 throughout."
)]

mod dispatch;

pub mod bitmap;
pub mod contour;
pub mod contour_combiners;
pub mod distance_finder;
pub mod edge;
pub mod edge_color;
pub mod edge_coloring;
pub mod edge_selectors;
pub mod equation;
pub mod error_correction;
pub mod error_estimation;
pub mod generator;
pub mod math;
pub mod pixel_conversion;
pub mod projection;
pub mod rasterization;
pub mod scanline;
pub mod shape;
pub mod shape_description;
pub mod signed_distance;
#[cfg(feature = "svg")]
pub mod svg;

pub use peniko;
pub use peniko::kurbo;

pub use bitmap::Bitmap;
pub use edge::EdgeSegment;
pub use edge_color::EdgeColor;
pub use error_correction::{DistanceCheckMode, ErrorCorrectionConfig, ErrorCorrectionMode};
pub use generator::{
    GeneratorConfig, MsdfGeneratorConfig, generate_msdf, generate_mtsdf, generate_psdf,
    generate_sdf,
};
pub use projection::Projection;
pub use scanline::FillRule;
pub use shape::Shape;
