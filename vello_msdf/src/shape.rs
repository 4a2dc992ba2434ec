// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vector shapes: sets of closed contours.

use crate::contour::Contour;
use crate::edge::EdgeSegment;
use crate::kurbo::{PathEl, PathSeg, Point, Rect};
use crate::math::{mix, non_zero_sign, normalize, orthonormal};
use crate::scanline::{Intersection, Scanline};

/// Threshold of the dot product of normalized adjacent edge directions, offset from `-1`,
/// below which a corner is considered convergent.
const CORNER_DOT_EPSILON: f64 = 0.000001;

/// Angle (in radians) by which the tangents of the curves meeting at a convergent corner are
/// rotated apart.
const DECONVERGENCE_FACTOR: f64 = 0.002;

/// A vector shape made of closed contours.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shape {
    /// The contours of the shape.
    pub contours: Vec<Contour>,
    /// Whether the Y axis of the shape's coordinate system points down.
    ///
    /// When set, row 0 of generated bitmaps corresponds to the top of the shape.
    pub inverse_y_axis: bool,
}

impl Shape {
    /// Create an empty shape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a shape from path elements, closing every open subpath with a straight line.
    ///
    /// Each `MoveTo` starts a new contour. Subpaths without any segment are dropped.
    pub fn from_path(path: impl IntoIterator<Item = PathEl>) -> Self {
        Self::from_path_with_snap(path, 0.0)
    }

    /// Like [`from_path`](Self::from_path), but an open subpath whose end lies closer than
    /// `snap_range` to its start is closed by moving the end point of its last edge instead
    /// of adding a closing line.
    pub fn from_path_with_snap(path: impl IntoIterator<Item = PathEl>, snap_range: f64) -> Self {
        let mut shape = Self::new();
        let mut contour = Contour::new();
        let mut start = Point::ZERO;
        let mut current = Point::ZERO;
        for el in path {
            match el {
                PathEl::MoveTo(p) => {
                    close_contour(&mut shape, &mut contour, start, snap_range);
                    start = p;
                    current = p;
                }
                PathEl::LineTo(p) => {
                    contour.add_edge(EdgeSegment::line(current, p));
                    current = p;
                }
                PathEl::QuadTo(p1, p2) => {
                    contour.add_edge(EdgeSegment::quad(current, p1, p2));
                    current = p2;
                }
                PathEl::CurveTo(p1, p2, p3) => {
                    contour.add_edge(EdgeSegment::cubic(current, p1, p2, p3));
                    current = p3;
                }
                PathEl::ClosePath => {
                    close_contour(&mut shape, &mut contour, start, snap_range);
                    current = start;
                }
            }
        }
        close_contour(&mut shape, &mut contour, start, snap_range);
        shape
    }

    /// Appends a contour.
    pub fn add_contour(&mut self, contour: Contour) {
        self.contours.push(contour);
    }

    /// Appends an empty contour and returns it for filling in.
    pub fn add_empty_contour(&mut self) -> &mut Contour {
        self.contours.push(Contour::new());
        let index = self.contours.len() - 1;
        &mut self.contours[index]
    }

    /// Checks that every contour is closed and connected, that is, each edge starts where
    /// the previous one ends.
    pub fn validate(&self) -> bool {
        self.contours.iter().all(|contour| {
            let Some(last) = contour.edges.last() else {
                return true;
            };
            let mut corner = last.end();
            for edge in &contour.edges {
                if edge.start() != corner {
                    return false;
                }
                corner = edge.end();
            }
            true
        })
    }

    /// Prepares the shape for distance field generation.
    ///
    /// This removes degenerate edges, splits contours consisting of a single edge into three
    /// parts (so they can be given three colors), and rotates apart the tangents of curves
    /// meeting at a cusp so that their pseudo-distances do not coincide. Applying it twice
    /// has the same effect as applying it once.
    pub fn normalize(&mut self) {
        for contour in &mut self.contours {
            if contour.edges.len() > 1 {
                contour.edges.retain(|edge| !edge.is_degenerate());
                // A contour of only degenerate edges becomes empty.
                if contour.edges.is_empty() {
                    continue;
                }
            }
            if contour.edges.len() == 1 {
                let parts = contour.edges[0].split_in_thirds();
                contour.edges = parts.to_vec();
                continue;
            }
            let len = contour.edges.len();
            for i in 0..len {
                let prev_index = (i + len - 1) % len;
                let prev_dir = contour.edges[prev_index].direction(1.0);
                let cur_dir = contour.edges[i].direction(0.0);
                if normalize(prev_dir, false).dot(normalize(cur_dir, false))
                    < CORNER_DOT_EPSILON - 1.0
                {
                    deconverge(&mut contour.edges, prev_index, i);
                }
            }
        }
    }

    /// The bounding box of all contours, or `None` for an empty shape.
    pub fn bounds(&self) -> Option<Rect> {
        self.contours
            .iter()
            .filter_map(Contour::bounds)
            .reduce(|a, b| a.union(b))
    }

    /// The bounding box of the shape grown by `border` on all sides.
    ///
    /// If `miter_limit` is positive, the box additionally fits the miter joins of the corners
    /// turning in the direction given by `polarity`, see [`Contour::bound_miters`].
    pub fn bounds_with_border(
        &self,
        border: f64,
        miter_limit: f64,
        polarity: i32,
    ) -> Option<Rect> {
        let mut bounds = self.bounds()?.inflate(border, border);
        if border > 0.0 && miter_limit > 0.0 {
            for contour in &self.contours {
                contour.bound_miters(&mut bounds, border, miter_limit, polarity);
            }
        }
        Some(bounds)
    }

    /// Fills `line` with the crossings of the shape with the horizontal line at `y`.
    pub fn scanline(&self, line: &mut Scanline, y: f64) {
        line.set_intersections(self.edges().flat_map(|edge| {
            edge.scanline_intersections(y)
                .into_iter()
                .map(|(x, direction)| Intersection { x, direction })
        }));
    }

    /// Iterates over the edges of all contours.
    pub fn edges(&self) -> impl Iterator<Item = &EdgeSegment> {
        self.contours.iter().flat_map(|contour| contour.edges.iter())
    }

    /// The total number of edges.
    pub fn edge_count(&self) -> usize {
        self.contours.iter().map(|contour| contour.edges.len()).sum()
    }

    /// Orients contours to conform to the non-zero fill rule, assuming the input was meant to
    /// be filled with the even-odd rule.
    ///
    /// Each contour is probed with a horizontal scanline through the whole shape; crossings are
    /// expected to alternate between entering (upwards) and leaving (downwards) the filled
    /// region. Contours that mostly disagree are reversed.
    pub fn orient_contours(&mut self) {
        // An irrational ratio avoids hitting corners or other points of interest.
        let ratio = 0.5 * (5.0_f64.sqrt() - 1.0);
        let mut orientations = vec![0_i32; self.contours.len()];
        let mut intersections: Vec<(f64, i32, usize)> = Vec::new();
        for i in 0..self.contours.len() {
            let edges = &self.contours[i].edges;
            if orientations[i] != 0 || edges.is_empty() {
                continue;
            }
            // Find a Y that crosses the contour.
            let y0 = edges[0].point(0.0).y;
            let mut y1 = y0;
            for edge in edges {
                if y0 != y1 {
                    break;
                }
                y1 = edge.point(1.0).y;
            }
            // All endpoints may lie on a horizontal line.
            for edge in edges {
                if y0 != y1 {
                    break;
                }
                y1 = edge.point(ratio).y;
            }
            let y = mix(y0, y1, ratio);

            for (j, contour) in self.contours.iter().enumerate() {
                for edge in &contour.edges {
                    intersections.extend(
                        edge.scanline_intersections(y)
                            .into_iter()
                            .map(|(x, direction)| (x, direction, j)),
                    );
                }
            }
            if intersections.is_empty() {
                continue;
            }
            intersections.sort_by(|a, b| a.0.total_cmp(&b.0));
            // Disqualify coincident crossings.
            for j in 1..intersections.len() {
                if intersections[j].0 == intersections[j - 1].0 {
                    intersections[j].1 = 0;
                    intersections[j - 1].1 = 0;
                }
            }
            for (j, &(_, direction, contour_index)) in intersections.iter().enumerate() {
                if direction != 0 {
                    let entering = j & 1 == 0;
                    orientations[contour_index] +=
                        if entering == (direction > 0) { 1 } else { -1 };
                }
            }
            intersections.clear();
        }
        for (contour, orientation) in self.contours.iter_mut().zip(orientations) {
            if orientation < 0 {
                contour.reverse();
            }
        }
    }
}

/// Finishes the contour under construction and moves it into `shape`.
fn close_contour(shape: &mut Shape, contour: &mut Contour, start: Point, snap_range: f64) {
    let Some(last) = contour.edges.last_mut() else {
        return;
    };
    let end = last.end();
    if end != start {
        if (end - start).hypot() < snap_range {
            last.move_end_point(start);
        } else {
            contour.add_edge(EdgeSegment::line(end, start));
        }
    }
    shape.add_contour(core::mem::take(contour));
}

/// Rotates apart the end tangent of `edges[prev]` and the start tangent of `edges[cur]`,
/// which point in opposite directions.
///
/// Quadratic edges are raised to cubic ones so that the tangent at one end can change without
/// affecting the other. Straight edges are left alone.
fn deconverge(edges: &mut [EdgeSegment], prev: usize, cur: usize) {
    let out_dir = normalize(edges[cur].direction(0.0), false);
    let left = orthonormal(out_dir, true, false);
    // Push the curve that bends further to the left further to the left, so the two do not
    // cross near the corner.
    let ordering = non_zero_sign(
        out_dir.cross(edges[cur].direction_change(0.0))
            - out_dir.cross(edges[prev].direction_change(1.0)),
    );
    if !matches!(edges[cur].segment, PathSeg::Line(_)) {
        edges[cur].convert_to_cubic();
        if let PathSeg::Cubic(cubic) = &mut edges[cur].segment {
            let handle = (cubic.p1 - cubic.p0).hypot();
            cubic.p1 += handle * DECONVERGENCE_FACTOR * ordering * left;
        }
    }
    if !matches!(edges[prev].segment, PathSeg::Line(_)) {
        edges[prev].convert_to_cubic();
        if let PathSeg::Cubic(cubic) = &mut edges[prev].segment {
            let handle = (cubic.p3 - cubic.p2).hypot();
            cubic.p2 -= handle * DECONVERGENCE_FACTOR * ordering * left;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Shape;
    use crate::edge::EdgeSegment;
    use crate::kurbo::{BezPath, PathSeg, Point, Rect};
    use crate::scanline::Scanline;

    fn square_path(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
        let mut path = BezPath::new();
        path.move_to((x0, y0));
        path.line_to((x1, y0));
        path.line_to((x1, y1));
        path.line_to((x0, y1));
        path.close_path();
        path
    }

    #[test]
    fn from_path_closes_contours() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((1.0, 0.0));
        path.line_to((1.0, 1.0));
        // Implicitly closed by the next subpath.
        path.move_to((5.0, 5.0));
        path.line_to((6.0, 5.0));
        path.line_to((6.0, 6.0));
        path.close_path();
        let shape = Shape::from_path(path);
        assert_eq!(shape.contours.len(), 2);
        assert_eq!(shape.contours[0].edges.len(), 3);
        assert_eq!(shape.contours[1].edges.len(), 3);
        assert!(shape.validate());
    }

    #[test]
    fn snapping_moves_last_endpoint() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((1.0, 0.0));
        path.line_to((0.0, 1e-9));
        let shape = Shape::from_path_with_snap(path, 1e-6);
        assert_eq!(shape.contours[0].edges.len(), 2);
        assert_eq!(shape.contours[0].edges[1].end(), Point::ZERO);
        assert!(shape.validate());
    }

    #[test]
    fn validate_detects_gaps() {
        let mut shape = Shape::new();
        let contour = shape.add_empty_contour();
        contour.add_edge(EdgeSegment::line((0.0, 0.0), (1.0, 0.0)));
        contour.add_edge(EdgeSegment::line((1.0, 0.5), (0.0, 0.0)));
        assert!(!shape.validate());
    }

    #[test]
    fn bounds_of_shape() {
        let mut path = square_path(0.0, 0.0, 1.0, 1.0);
        path.extend(square_path(2.0, -1.0, 3.0, 0.5));
        let shape = Shape::from_path(path);
        assert_eq!(shape.bounds(), Some(Rect::new(0.0, -1.0, 3.0, 1.0)));
        assert_eq!(
            shape.bounds_with_border(0.5, 0.0, 1),
            Some(Rect::new(-0.5, -1.5, 3.5, 1.5))
        );
        assert_eq!(Shape::new().bounds(), None);
        assert_eq!(shape.edge_count(), 8);
    }

    #[test]
    fn scanline_through_nested_squares() {
        let mut path = square_path(0.0, 0.0, 4.0, 4.0);
        path.extend(square_path(1.0, 1.0, 3.0, 3.0));
        let shape = Shape::from_path(path);
        let mut scanline = Scanline::new();
        shape.scanline(&mut scanline, 2.0);
        assert_eq!(scanline.intersections().len(), 4);
        assert_eq!(scanline.sum_intersections(0.5).abs(), 1);
        assert_eq!(scanline.sum_intersections(2.0).abs(), 2);
        assert_eq!(scanline.sum_intersections(5.0), 0);
    }

    #[test]
    fn orient_contours_makes_holes_opposite() {
        // Both squares wound the same way.
        let mut path = square_path(0.0, 0.0, 4.0, 4.0);
        path.extend(square_path(1.0, 1.0, 3.0, 3.0));
        let mut shape = Shape::from_path(path);
        assert_eq!(shape.contours[0].winding(), shape.contours[1].winding());
        shape.orient_contours();
        assert_eq!(shape.contours[0].winding(), 1);
        assert_eq!(shape.contours[1].winding(), -1);
    }

    #[test]
    fn normalize_splits_single_edge_contours() {
        let mut shape = Shape::new();
        shape.add_empty_contour().add_edge(EdgeSegment::cubic(
            (0.0, 0.0),
            (0.0, 2.0),
            (2.0, 2.0),
            (0.0, 0.0),
        ));
        shape.normalize();
        assert_eq!(shape.contours[0].edges.len(), 3);
        assert!(shape.validate());
    }

    #[test]
    fn normalize_removes_degenerate_edges() {
        let mut shape = Shape::from_path(square_path(0.0, 0.0, 1.0, 1.0));
        shape.contours[0]
            .edges
            .push(EdgeSegment::line((0.0, 0.0), (0.0, 0.0)));
        shape.normalize();
        assert_eq!(shape.contours[0].edges.len(), 4);
    }

    #[test]
    fn normalize_deconverges_cusps() {
        // A curve that leaves a corner along the direction the straight edge arrived from.
        let mut shape = Shape::new();
        let contour = shape.add_empty_contour();
        contour.add_edge(EdgeSegment::line((0.0, 0.0), (2.0, 0.0)));
        contour.add_edge(EdgeSegment::quad((2.0, 0.0), (0.0, 0.0), (0.0, 2.0)));
        contour.add_edge(EdgeSegment::line((0.0, 2.0), (0.0, 0.0)));
        shape.normalize();
        let edges = &shape.contours[0].edges;
        assert!(matches!(edges[1].segment, PathSeg::Cubic(_)));
        let incoming = edges[0].direction(1.0).normalize();
        let outgoing = edges[1].direction(0.0).normalize();
        assert!(incoming.dot(outgoing) > -1.0 + 1e-6);
        assert!(shape.validate());

        let once = shape.clone();
        shape.normalize();
        assert_eq!(shape, once);
    }
}
