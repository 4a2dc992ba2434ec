// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Distance field generators.
//!
//! All generators map the pixel center `(x + 0.5, y + 0.5)` through the inverse of the
//! [`Projection`] into shape space, query the distance to the shape there and store
//! `distance / range + 0.5`. With [`Shape::inverse_y_axis`] set, row `y` of the shape is
//! stored in bitmap row `height - y - 1`.

use core::num::NonZeroUsize;

use crate::bitmap::Bitmap;
use crate::contour_combiners::{
    ContourCombiner, OverlappingContourCombiner, SimpleContourCombiner,
};
use crate::dispatch::for_each_row;
use crate::distance_finder::ShapeDistanceFinder;
use crate::edge_selectors::{
    EdgeSelector, MultiAndTrueDistance, MultiAndTrueDistanceSelector, MultiDistance,
    MultiDistanceSelector, PerpendicularDistanceSelector, TrueDistanceSelector,
};
use crate::error_correction::{ErrorCorrectionConfig, msdf_error_correction_with_stencil};
use crate::kurbo::Point;
use crate::projection::Projection;
use crate::shape::Shape;

/// Options shared by all generators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Resolve overlapping and nested contours correctly, at some extra cost per pixel.
    ///
    /// Shapes whose contours never overlap can disable this.
    pub overlap_support: bool,
    /// Number of worker threads. `None` uses the available parallelism and `Some(1)` runs
    /// on the calling thread.
    pub num_threads: Option<NonZeroUsize>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            overlap_support: true,
            num_threads: None,
        }
    }
}

/// Options of the multi-channel generators.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MsdfGeneratorConfig {
    /// Options shared by all generators.
    pub generator: GeneratorConfig,
    /// How to correct artifacts after generation.
    pub error_correction: ErrorCorrectionConfig,
}

/// Conversion of a distance value into the channels of a pixel.
trait DistancePixel<const N: usize> {
    fn to_pixel(&self, inv_range: f64) -> [f32; N];
}

#[inline]
fn normalized(distance: f64, inv_range: f64) -> f32 {
    (inv_range * distance + 0.5) as f32
}

impl DistancePixel<1> for f64 {
    fn to_pixel(&self, inv_range: f64) -> [f32; 1] {
        [normalized(*self, inv_range)]
    }
}

impl DistancePixel<3> for MultiDistance {
    fn to_pixel(&self, inv_range: f64) -> [f32; 3] {
        [
            normalized(self.r, inv_range),
            normalized(self.g, inv_range),
            normalized(self.b, inv_range),
        ]
    }
}

impl DistancePixel<4> for MultiAndTrueDistance {
    fn to_pixel(&self, inv_range: f64) -> [f32; 4] {
        [
            normalized(self.r, inv_range),
            normalized(self.g, inv_range),
            normalized(self.b, inv_range),
            normalized(self.a, inv_range),
        ]
    }
}

fn generate_distance_field<C, const N: usize>(
    output: &mut Bitmap<f32, N>,
    shape: &Shape,
    projection: &Projection,
    range: f64,
    num_threads: Option<NonZeroUsize>,
) where
    C: ContourCombiner,
    <C::Selector as EdgeSelector>::Distance: DistancePixel<N>,
{
    let (width, height) = (output.width(), output.height());
    let inv_range = 1.0 / range;
    for_each_row(
        output.pixels_mut(),
        width,
        num_threads,
        || ShapeDistanceFinder::<C>::new(shape),
        |finder, row, pixels| {
            let y = if shape.inverse_y_axis {
                height - row - 1
            } else {
                row
            };
            let py = y as f64 + 0.5;
            // Alternate the column order to keep consecutive queries close together.
            let right_to_left = y % 2 == 1;
            for col in 0..width {
                let x = if right_to_left { width - col - 1 } else { col };
                let p = projection.unproject(Point::new(x as f64 + 0.5, py));
                pixels[x] = finder.distance(p).to_pixel(inv_range);
            }
        },
    );
}

fn generate_with_combiner<S, const N: usize>(
    output: &mut Bitmap<f32, N>,
    shape: &Shape,
    projection: &Projection,
    range: f64,
    config: &GeneratorConfig,
) where
    S: EdgeSelector,
    S::Distance: DistancePixel<N>,
{
    if config.overlap_support {
        generate_distance_field::<OverlappingContourCombiner<S>, N>(
            output,
            shape,
            projection,
            range,
            config.num_threads,
        );
    } else {
        generate_distance_field::<SimpleContourCombiner<S>, N>(
            output,
            shape,
            projection,
            range,
            config.num_threads,
        );
    }
}

/// Generates a conventional single-channel signed distance field.
///
/// `range` is the width of the distance range mapped to `[0, 1]`, in shape units.
pub fn generate_sdf(
    output: &mut Bitmap<f32, 1>,
    shape: &Shape,
    projection: &Projection,
    range: f64,
    config: &GeneratorConfig,
) {
    generate_with_combiner::<TrueDistanceSelector, 1>(output, shape, projection, range, config);
}

/// Generates a single-channel signed pseudo-distance field.
pub fn generate_psdf(
    output: &mut Bitmap<f32, 1>,
    shape: &Shape,
    projection: &Projection,
    range: f64,
    config: &GeneratorConfig,
) {
    generate_with_combiner::<PerpendicularDistanceSelector, 1>(
        output, shape, projection, range, config,
    );
}

/// Generates a multi-channel signed distance field.
///
/// The edges of `shape` must be colored, for example with
/// [`edge_coloring_simple`](crate::edge_coloring::edge_coloring_simple). Error correction
/// runs afterwards as configured in `config`.
pub fn generate_msdf(
    output: &mut Bitmap<f32, 3>,
    shape: &Shape,
    projection: &Projection,
    range: f64,
    config: &MsdfGeneratorConfig,
) {
    generate_msdf_with_stencil(output, shape, projection, range, config, None);
}

/// Like [`generate_msdf`], but error correction uses `stencil` as its working buffer
/// instead of allocating one.
pub fn generate_msdf_with_stencil(
    output: &mut Bitmap<f32, 3>,
    shape: &Shape,
    projection: &Projection,
    range: f64,
    config: &MsdfGeneratorConfig,
    stencil: Option<&mut Bitmap<u8, 1>>,
) {
    generate_with_combiner::<MultiDistanceSelector, 3>(
        output,
        shape,
        projection,
        range,
        &config.generator,
    );
    msdf_error_correction_with_stencil(output, shape, projection, range, config, stencil);
}

/// Generates a multi-channel signed distance field with the true distance in the fourth
/// channel.
///
/// Like [`generate_msdf`], this expects colored edges and runs error correction on the
/// color channels afterwards.
pub fn generate_mtsdf(
    output: &mut Bitmap<f32, 4>,
    shape: &Shape,
    projection: &Projection,
    range: f64,
    config: &MsdfGeneratorConfig,
) {
    generate_mtsdf_with_stencil(output, shape, projection, range, config, None);
}

/// Like [`generate_mtsdf`], with a caller-provided error correction stencil.
pub fn generate_mtsdf_with_stencil(
    output: &mut Bitmap<f32, 4>,
    shape: &Shape,
    projection: &Projection,
    range: f64,
    config: &MsdfGeneratorConfig,
    stencil: Option<&mut Bitmap<u8, 1>>,
) {
    generate_with_combiner::<MultiAndTrueDistanceSelector, 4>(
        output,
        shape,
        projection,
        range,
        &config.generator,
    );
    msdf_error_correction_with_stencil(output, shape, projection, range, config, stencil);
}
