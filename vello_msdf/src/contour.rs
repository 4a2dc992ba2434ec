// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Closed contours made of edge segments.

use crate::edge::EdgeSegment;
use crate::kurbo::{Point, Rect};
use crate::math::{normalize, sign};

/// A closed loop of edges, where each edge starts at the end point of the previous one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Contour {
    /// The edges of the contour in order.
    pub edges: Vec<EdgeSegment>,
}

impl Contour {
    /// Create an empty contour.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an edge to the contour.
    pub fn add_edge(&mut self, edge: EdgeSegment) {
        self.edges.push(edge);
    }

    /// The bounding box of all edges, or `None` for an empty contour.
    pub fn bounds(&self) -> Option<Rect> {
        self.edges
            .iter()
            .map(EdgeSegment::bounds)
            .reduce(|a, b| a.union(b))
    }

    /// Grows `bounds` to include the tips of the miter joins formed when the contour is
    /// stroked with half-width `border`.
    ///
    /// Only corners turning in the direction given by `polarity` are considered. Miters are
    /// clamped to `miter_limit` times the border.
    pub fn bound_miters(&self, bounds: &mut Rect, border: f64, miter_limit: f64, polarity: i32) {
        let Some(last) = self.edges.last() else {
            return;
        };
        let mut prev_dir = normalize(last.direction(1.0), true);
        for edge in &self.edges {
            let dir = -normalize(edge.direction(0.0), true);
            if f64::from(polarity) * prev_dir.cross(dir) >= 0.0 {
                let q = 0.5 * (1.0 - prev_dir.dot(dir));
                let miter_length = if q > 0.0 {
                    (1.0 / q.sqrt()).min(miter_limit)
                } else {
                    miter_limit
                };
                let miter =
                    edge.point(0.0) + border * miter_length * normalize(prev_dir + dir, true);
                *bounds = bounds.union_pt(miter);
            }
            prev_dir = normalize(edge.direction(1.0), true);
        }
    }

    /// The orientation of the contour: `1` for clockwise, `-1` for counter-clockwise (with
    /// the Y axis pointing up) and `0` for an empty or degenerate contour.
    pub fn winding(&self) -> i32 {
        let total = match self.edges.as_slice() {
            [] => return 0,
            [edge] => {
                let a = edge.point(0.0);
                let b = edge.point(1.0 / 3.0);
                let c = edge.point(2.0 / 3.0);
                shoelace(a, b) + shoelace(b, c) + shoelace(c, a)
            }
            [first, second] => {
                let a = first.point(0.0);
                let b = first.point(0.5);
                let c = second.point(0.0);
                let d = second.point(0.5);
                shoelace(a, b) + shoelace(b, c) + shoelace(c, d) + shoelace(d, a)
            }
            edges => {
                let mut total = 0.0;
                let mut prev = edges[edges.len() - 1].point(0.0);
                for edge in edges {
                    let cur = edge.point(0.0);
                    total += shoelace(prev, cur);
                    prev = cur;
                }
                total
            }
        };
        sign(total)
    }

    /// Reverses the direction of the contour.
    pub fn reverse(&mut self) {
        self.edges.reverse();
        for edge in &mut self.edges {
            edge.reverse();
        }
    }
}

fn shoelace(a: Point, b: Point) -> f64 {
    (b.x - a.x) * (a.y + b.y)
}
