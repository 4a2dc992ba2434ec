// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scanline rasterization of shapes and fill-based sign correction of distance fields.

use crate::bitmap::Bitmap;
use crate::math::median;
use crate::projection::Projection;
use crate::scanline::{FillRule, Scanline};
use crate::shape::Shape;

/// Maps an output row (counting from the bottom in shape space) to a bitmap row.
#[inline]
fn bitmap_row(shape: &Shape, height: usize, y: usize) -> usize {
    if shape.inverse_y_axis {
        height - y - 1
    } else {
        y
    }
}

/// Rasterizes `shape` into a hard mask, writing `1.0` for filled and `0.0` for empty pixels.
///
/// Pixels are sampled at their centers.
pub fn rasterize(
    output: &mut Bitmap<f32, 1>,
    shape: &Shape,
    projection: &Projection,
    fill_rule: FillRule,
) {
    let (width, height) = (output.width(), output.height());
    let mut scanline = Scanline::new();
    for y in 0..height {
        let row = bitmap_row(shape, height, y);
        shape.scanline(&mut scanline, projection.unproject_y(y as f64 + 0.5));
        for x in 0..width {
            let filled = scanline.filled(projection.unproject_x(x as f64 + 0.5), fill_rule);
            output.pixel_mut(x, row)[0] = if filled { 1.0 } else { 0.0 };
        }
    }
}

/// Fixes the sign of a distance field so that it agrees with the fill of `shape` under
/// `fill_rule`: filled pixels end up above `0.5`, empty ones below.
///
/// For multi-channel fields, all color channels of a pixel are flipped when their median has
/// the wrong sign. Pixels whose median is exactly `0.5` follow the majority of their
/// neighbours. The fourth channel of an MTSDF is corrected on its own.
///
/// Supports fields with one, three or four channels.
pub fn distance_sign_correction<const N: usize>(
    sdf: &mut Bitmap<f32, N>,
    shape: &Shape,
    projection: &Projection,
    fill_rule: FillRule,
) {
    const { assert!(N == 1 || N >= 3, "unsupported channel count") };
    if N == 1 {
        single_channel_sign_correction(sdf, shape, projection, fill_rule);
    } else {
        multi_channel_sign_correction(sdf, shape, projection, fill_rule);
    }
}

fn single_channel_sign_correction<const N: usize>(
    sdf: &mut Bitmap<f32, N>,
    shape: &Shape,
    projection: &Projection,
    fill_rule: FillRule,
) {
    let (width, height) = (sdf.width(), sdf.height());
    let mut scanline = Scanline::new();
    for y in 0..height {
        let row = bitmap_row(shape, height, y);
        shape.scanline(&mut scanline, projection.unproject_y(y as f64 + 0.5));
        for x in 0..width {
            let fill = scanline.filled(projection.unproject_x(x as f64 + 0.5), fill_rule);
            let sd = &mut sdf.pixel_mut(x, row)[0];
            if (*sd > 0.5) != fill {
                *sd = 1.0 - *sd;
            }
        }
    }
}

fn multi_channel_sign_correction<const N: usize>(
    sdf: &mut Bitmap<f32, N>,
    shape: &Shape,
    projection: &Projection,
    fill_rule: FillRule,
) {
    let (width, height) = (sdf.width(), sdf.height());
    if width == 0 || height == 0 {
        return;
    }
    let mut scanline = Scanline::new();
    let mut ambiguous = false;
    // -1 for flipped, 1 for correct, 0 for undecided pixels, in sampling order.
    let mut match_map = vec![0_i8; width * height];
    for y in 0..height {
        let row = bitmap_row(shape, height, y);
        shape.scanline(&mut scanline, projection.unproject_y(y as f64 + 0.5));
        for x in 0..width {
            let fill = scanline.filled(projection.unproject_x(x as f64 + 0.5), fill_rule);
            let msd = sdf.pixel_mut(x, row);
            let sd = median(msd[0], msd[1], msd[2]);
            let matched = &mut match_map[y * width + x];
            if sd == 0.5 {
                ambiguous = true;
            } else if (sd > 0.5) != fill {
                for channel in &mut msd[..3] {
                    *channel = 1.0 - *channel;
                }
                *matched = -1;
            } else {
                *matched = 1;
            }
            if N >= 4 && (msd[3] > 0.5) != fill {
                msd[3] = 1.0 - msd[3];
            }
        }
    }
    // Without this, a fully inverted shape leaves artifacts along its edges.
    if ambiguous {
        for y in 0..height {
            let row = bitmap_row(shape, height, y);
            for x in 0..width {
                let index = y * width + x;
                if match_map[index] != 0 {
                    continue;
                }
                let mut neighbor_match = 0;
                if x > 0 {
                    neighbor_match += i32::from(match_map[index - 1]);
                }
                if x + 1 < width {
                    neighbor_match += i32::from(match_map[index + 1]);
                }
                if y > 0 {
                    neighbor_match += i32::from(match_map[index - width]);
                }
                if y + 1 < height {
                    neighbor_match += i32::from(match_map[index + width]);
                }
                if neighbor_match < 0 {
                    let msd = sdf.pixel_mut(x, row);
                    for channel in &mut msd[..3] {
                        *channel = 1.0 - *channel;
                    }
                }
            }
        }
    }
}
