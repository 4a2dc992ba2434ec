// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Assignment of edge colors for multi-channel distance fields.

use smallvec::SmallVec;

use crate::edge_color::EdgeColor;
use crate::kurbo::Vec2;
use crate::math::normalize;
use crate::shape::Shape;

/// A pseudo-random sequence of color decisions drawn from a seed.
struct ColorSeed(u64);

impl ColorSeed {
    fn extract2(&mut self) -> u32 {
        let v = (self.0 & 1) as u32;
        self.0 >>= 1;
        v
    }

    fn extract3(&mut self) -> usize {
        let v = (self.0 % 3) as usize;
        self.0 /= 3;
        v
    }

    fn initial_color(&mut self) -> EdgeColor {
        [EdgeColor::CYAN, EdgeColor::MAGENTA, EdgeColor::YELLOW][self.extract3()]
    }

    /// Rotates a two-channel color to one of the other two.
    fn switch_color(&mut self, color: &mut EdgeColor) {
        let shifted = color.bits() << (1 + self.extract2());
        *color = EdgeColor::from_bits(shifted | shifted >> 3);
    }

    /// Like [`Self::switch_color`], but the result shares only one channel with `banned`.
    fn switch_color_banned(&mut self, color: &mut EdgeColor, banned: EdgeColor) {
        let combined = *color & banned;
        if matches!(combined, EdgeColor::RED | EdgeColor::GREEN | EdgeColor::BLUE) {
            *color = combined ^ EdgeColor::WHITE;
        } else {
            self.switch_color(color);
        }
    }
}

fn is_corner(a_dir: Vec2, b_dir: Vec2, cross_threshold: f64) -> bool {
    a_dir.dot(b_dir) <= 0.0 || a_dir.cross(b_dir).abs() > cross_threshold
}

/// Maps `position` in `0..n` to `-1`, `0` or `1`, symmetrically around the middle.
fn symmetrical_trichotomy(position: usize, n: usize) -> i32 {
    (3.0 + 2.875 * position as f64 / (n - 1) as f64 - 1.4375 + 0.5) as i32 - 3
}

/// Colors the edges of `shape` so that the two edges meeting at every sharp corner share
/// exactly one channel.
///
/// A corner is sharp if the direction changes by more than `angle_threshold` radians there
/// (3 is a good default). Contours without corners are colored [`EdgeColor::WHITE`].
/// Contours with a single corner and fewer than three edges are split so that three colors
/// can be assigned. `seed` selects among the valid colorings.
pub fn edge_coloring_simple(shape: &mut Shape, angle_threshold: f64, seed: u64) {
    let cross_threshold = angle_threshold.sin();
    let mut seed = ColorSeed(seed);
    let mut color = seed.initial_color();
    for contour in &mut shape.contours {
        let Some(last) = contour.edges.last() else {
            continue;
        };
        let mut corners = SmallVec::<[usize; 8]>::new();
        let mut prev_direction = last.direction(1.0);
        for (index, edge) in contour.edges.iter().enumerate() {
            let a_dir = normalize(prev_direction, false);
            let b_dir = normalize(edge.direction(0.0), false);
            if is_corner(a_dir, b_dir, cross_threshold) {
                corners.push(index);
            }
            prev_direction = edge.direction(1.0);
        }

        match corners.as_slice() {
            [] => {
                for edge in &mut contour.edges {
                    edge.color = EdgeColor::WHITE;
                }
            }
            // A teardrop.
            &[corner] => {
                seed.switch_color(&mut color);
                let first = color;
                seed.switch_color(&mut color);
                let colors = [first, EdgeColor::WHITE, color];
                let m = contour.edges.len();
                if m >= 3 {
                    for i in 0..m {
                        let color_index = (1 + symmetrical_trichotomy(i, m)) as usize;
                        contour.edges[(corner + i) % m].color = colors[color_index];
                    }
                } else {
                    // Three colors need at least three edges.
                    let mut parts = SmallVec::<[_; 6]>::new();
                    for i in 0..m {
                        parts.extend(contour.edges[(corner + i) % m].split_in_thirds());
                    }
                    let per_color = parts.len() / 3;
                    for (i, part) in parts.iter_mut().enumerate() {
                        part.color = colors[i / per_color];
                    }
                    contour.edges = parts.into_vec();
                }
            }
            &[start, ..] => {
                let corner_count = corners.len();
                let m = contour.edges.len();
                let mut spline = 0;
                seed.switch_color(&mut color);
                let initial_color = color;
                for i in 0..m {
                    let index = (start + i) % m;
                    if spline + 1 < corner_count && corners[spline + 1] == index {
                        spline += 1;
                        let banned = if spline == corner_count - 1 {
                            initial_color
                        } else {
                            EdgeColor::BLACK
                        };
                        seed.switch_color_banned(&mut color, banned);
                    }
                    contour.edges[index].color = color;
                }
            }
        }
    }
}
