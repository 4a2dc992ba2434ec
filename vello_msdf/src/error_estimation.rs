// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Estimation of how accurately a distance field reproduces the fill of its shape.

use crate::bitmap::Bitmap;
use crate::math::{median, mix_f32, sign};
use crate::projection::Projection;
use crate::scanline::{FillRule, Intersection, Scanline};
use crate::shape::Shape;

/// Reconstructs the scanline at shape coordinate `y` from a distance field, as a renderer
/// with bilinear filtering would see it.
///
/// Multi-channel fields are evaluated through the median of their first three channels.
pub fn scanline_sdf<const N: usize>(
    line: &mut Scanline,
    sdf: &Bitmap<f32, N>,
    projection: &Projection,
    y: f64,
    inverse_y_axis: bool,
) {
    const { assert!(N == 1 || N >= 3, "unsupported channel count") };
    let (width, height) = (sdf.width(), sdf.height());
    if width == 0 || height == 0 {
        line.set_intersections([]);
        return;
    }
    let max_y = (height - 1) as f64;
    let mut pixel_y = (projection.project_y(y) - 0.5).clamp(0.0, max_y);
    if inverse_y_axis {
        pixel_y = max_y - pixel_y;
    }
    let b = pixel_y.floor();
    let bt = pixel_y - b;
    let b = b as usize;
    let t = (b + 1).min(height - 1);
    let sample = |x: usize| -> [f32; N] {
        let (bottom, top) = (sdf.pixel(x, b), sdf.pixel(x, t));
        core::array::from_fn(|i| mix_f32(bottom[i], top[i], bt))
    };

    let mut intersections = Vec::new();
    let mut rv = sample(0);
    for l in 0..width - 1 {
        let lv = rv;
        rv = sample(l + 1);
        if N == 1 {
            if lv[0] != rv[0] {
                let lr = f64::from(0.5 - lv[0]) / f64::from(rv[0] - lv[0]);
                if (0.0..=1.0).contains(&lr) {
                    intersections.push(Intersection {
                        x: projection.unproject_x(l as f64 + lr + 0.5),
                        direction: sign(f64::from(rv[0] - lv[0])),
                    });
                }
            }
            continue;
        }

        // Median crossings of the three color channels between the two texels.
        let mut crossings: Vec<Intersection> = (0..3)
            .filter(|&i| lv[i] != rv[i])
            .filter_map(|i| {
                let lr = f64::from(0.5 - lv[i]) / f64::from(rv[i] - lv[i]);
                if !(0.0..=1.0).contains(&lr) {
                    return None;
                }
                let v = [
                    mix_f32(lv[0], rv[0], lr),
                    mix_f32(lv[1], rv[1], lr),
                    mix_f32(lv[2], rv[2], lr),
                ];
                (median(v[0], v[1], v[2]) == v[i]).then(|| Intersection {
                    x: projection.unproject_x(l as f64 + lr + 0.5),
                    direction: sign(f64::from(rv[i] - lv[i])),
                })
            })
            .collect();
        crossings.sort_by(|a, b| a.x.total_cmp(&b.x));
        for crossing in crossings {
            // Consecutive crossings in the same direction describe the same transition.
            if intersections
                .last()
                .is_some_and(|last: &Intersection| last.direction == crossing.direction)
            {
                continue;
            }
            intersections.push(crossing);
        }
    }
    line.set_intersections(intersections);
}

/// Estimates the portion of the area that is filled incorrectly when rendering `sdf`.
///
/// The fill reconstructed from the distance field is compared with the fill of `shape` along
/// `scanlines_per_row` scanlines between each pair of texel rows. Returns a value between
/// `0` (exact) and `1`.
pub fn estimate_sdf_error<const N: usize>(
    sdf: &Bitmap<f32, N>,
    shape: &Shape,
    projection: &Projection,
    scanlines_per_row: usize,
    fill_rule: FillRule,
) -> f64 {
    let (width, height) = (sdf.width(), sdf.height());
    if width <= 1 || height <= 1 || scanlines_per_row == 0 {
        return 0.0;
    }
    let sub_row_size = 1.0 / scanlines_per_row as f64;
    let x_from = projection.unproject_x(0.5);
    let x_to = projection.unproject_x(width as f64 - 0.5);
    let overlap_factor = 1.0 / (x_to - x_from);
    let mut error = 0.0;
    let mut reference = Scanline::new();
    let mut reconstructed = Scanline::new();
    for row in 0..height - 1 {
        for sub_row in 0..scanlines_per_row {
            let bt = (sub_row as f64 + 0.5) * sub_row_size;
            let y = projection.unproject_y(row as f64 + bt + 0.5);
            shape.scanline(&mut reference, y);
            scanline_sdf(&mut reconstructed, sdf, projection, y, shape.inverse_y_axis);
            let overlap = Scanline::overlap(&reference, &reconstructed, x_from, x_to, fill_rule);
            error += 1.0 - overlap_factor * overlap;
        }
    }
    error / ((height - 1) * scanlines_per_row) as f64
}
