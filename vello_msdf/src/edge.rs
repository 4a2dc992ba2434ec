// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge segments of a contour and the distance queries on them.

use crate::edge_color::EdgeColor;
use crate::equation::{solve_cubic, solve_quadratic};
use crate::kurbo::{
    CubicBez, Line, ParamCurve, ParamCurveArclen, ParamCurveExtrema, PathSeg, Point, QuadBez,
    Rect, Vec2,
};
use crate::math::{mix_vec, non_zero_sign, normalize, orthonormal};
use crate::signed_distance::SignedDistance;
use smallvec::SmallVec;

/// Number of starting parameters of the Newton search for the closest point on a cubic.
const CUBIC_SEARCH_STARTS: usize = 4;
/// Number of Newton steps taken from each starting parameter, after evaluating it.
const CUBIC_SEARCH_STEPS: usize = 4;

/// Crossings of an edge with a horizontal line, as `(x, direction)` pairs.
///
/// The direction is `1` where the edge moves upwards (towards positive Y) and `-1` where it
/// moves downwards.
pub type ScanlineIntersections = SmallVec<[(f64, i32); 3]>;

/// A single line, quadratic or cubic segment of a contour, tagged with an [`EdgeColor`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeSegment {
    /// The geometry of the edge.
    pub segment: PathSeg,
    /// The channels of a multi-channel distance field this edge contributes to.
    pub color: EdgeColor,
}

impl EdgeSegment {
    /// Create a new white edge from a path segment.
    pub fn new(segment: PathSeg) -> Self {
        Self {
            segment,
            color: EdgeColor::WHITE,
        }
    }

    /// Create a new white line segment.
    pub fn line(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        Self::new(PathSeg::Line(Line::new(p0.into(), p1.into())))
    }

    /// Create a new white quadratic Bézier segment.
    pub fn quad(p0: impl Into<Point>, p1: impl Into<Point>, p2: impl Into<Point>) -> Self {
        Self::new(PathSeg::Quad(QuadBez::new(p0.into(), p1.into(), p2.into())))
    }

    /// Create a new white cubic Bézier segment.
    pub fn cubic(
        p0: impl Into<Point>,
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        p3: impl Into<Point>,
    ) -> Self {
        Self::new(PathSeg::Cubic(CubicBez::new(
            p0.into(),
            p1.into(),
            p2.into(),
            p3.into(),
        )))
    }

    /// Returns the edge with its color replaced.
    #[must_use]
    pub fn with_color(mut self, color: EdgeColor) -> Self {
        self.color = color;
        self
    }

    /// The point of the edge at parameter `t`.
    ///
    /// Parameters outside of `[0, 1]` extrapolate the curve's polynomial.
    #[inline]
    pub fn point(&self, t: f64) -> Point {
        self.segment.eval(t)
    }

    /// The start point of the edge.
    #[inline]
    pub fn start(&self) -> Point {
        self.segment.start()
    }

    /// The end point of the edge.
    #[inline]
    pub fn end(&self) -> Point {
        self.segment.end()
    }

    /// The direction the edge is heading at parameter `t`.
    ///
    /// This is the (unnormalized) derivative, except where it vanishes at an endpoint of a
    /// curve, in which case the direction towards the next distinct control point is used.
    pub fn direction(&self, t: f64) -> Vec2 {
        match self.segment {
            PathSeg::Line(line) => line.p1 - line.p0,
            PathSeg::Quad(quad) => {
                let tangent = mix_vec(quad.p1 - quad.p0, quad.p2 - quad.p1, t);
                if tangent == Vec2::ZERO {
                    return quad.p2 - quad.p0;
                }
                tangent
            }
            PathSeg::Cubic(cubic) => {
                let tangent = mix_vec(
                    mix_vec(cubic.p1 - cubic.p0, cubic.p2 - cubic.p1, t),
                    mix_vec(cubic.p2 - cubic.p1, cubic.p3 - cubic.p2, t),
                    t,
                );
                if tangent == Vec2::ZERO {
                    if t == 0.0 {
                        return cubic.p2 - cubic.p0;
                    }
                    if t == 1.0 {
                        return cubic.p3 - cubic.p1;
                    }
                }
                tangent
            }
        }
    }

    /// The change of [`direction`](Self::direction) at parameter `t`.
    pub fn direction_change(&self, t: f64) -> Vec2 {
        match self.segment {
            PathSeg::Line(_) => Vec2::ZERO,
            PathSeg::Quad(quad) => (quad.p2 - quad.p1) - (quad.p1 - quad.p0),
            PathSeg::Cubic(cubic) => mix_vec(
                (cubic.p2 - cubic.p1) - (cubic.p1 - cubic.p0),
                (cubic.p3 - cubic.p2) - (cubic.p2 - cubic.p1),
                t,
            ),
        }
    }

    /// Computes the signed distance from `origin` to the edge, together with the curve
    /// parameter of the closest point.
    ///
    /// The distance is negative when `origin` lies to the left of the edge's direction (with
    /// the Y axis pointing up). The parameter is not clamped: when the closest point is an
    /// endpoint, it is the parameter of the foot point on the tangent line extended past that
    /// endpoint, which lies outside of `[0, 1]` if `origin` is beyond the end of the edge.
    pub fn signed_distance(&self, origin: Point) -> (SignedDistance, f64) {
        match self.segment {
            PathSeg::Line(line) => line_signed_distance(line, origin),
            PathSeg::Quad(quad) => self.quad_signed_distance(quad, origin),
            PathSeg::Cubic(cubic) => self.cubic_signed_distance(cubic, origin),
        }
    }

    fn quad_signed_distance(&self, quad: QuadBez, origin: Point) -> (SignedDistance, f64) {
        let qa = quad.p0 - origin;
        let ab = quad.p1 - quad.p0;
        let br = quad.p2 - quad.p1 - ab;
        let a = br.dot(br);
        let b = 3.0 * ab.dot(br);
        let c = 2.0 * ab.dot(ab) + qa.dot(br);
        let d = qa.dot(ab);
        let roots = solve_cubic(a, b, c, d);

        let mut ep_dir = self.direction(0.0);
        let mut min_distance = non_zero_sign(ep_dir.cross(qa)) * qa.hypot();
        let mut param = -qa.dot(ep_dir) / ep_dir.dot(ep_dir);
        {
            ep_dir = self.direction(1.0);
            let distance = (quad.p2 - origin).hypot();
            if distance < min_distance.abs() {
                min_distance = non_zero_sign(ep_dir.cross(quad.p2 - origin)) * distance;
                param = (origin - quad.p1).dot(ep_dir) / ep_dir.dot(ep_dir);
            }
        }
        for &t in roots.as_slice() {
            if t > 0.0 && t < 1.0 {
                let qe = qa + 2.0 * t * ab + t * t * br;
                let distance = qe.hypot();
                if distance <= min_distance.abs() {
                    min_distance = non_zero_sign((ab + t * br).cross(qe)) * distance;
                    param = t;
                }
            }
        }

        self.finish_curve_distance(min_distance, param, qa, quad.p2 - origin)
    }

    fn cubic_signed_distance(&self, cubic: CubicBez, origin: Point) -> (SignedDistance, f64) {
        let qa = cubic.p0 - origin;
        let ab = cubic.p1 - cubic.p0;
        let br = cubic.p2 - cubic.p1 - ab;
        let as_ = (cubic.p3 - cubic.p2) - (cubic.p2 - cubic.p1) - br;

        let mut ep_dir = self.direction(0.0);
        let mut min_distance = non_zero_sign(ep_dir.cross(qa)) * qa.hypot();
        let mut param = -qa.dot(ep_dir) / ep_dir.dot(ep_dir);
        {
            ep_dir = self.direction(1.0);
            let distance = (cubic.p3 - origin).hypot();
            if distance < min_distance.abs() {
                min_distance = non_zero_sign(ep_dir.cross(cubic.p3 - origin)) * distance;
                param = (ep_dir - (cubic.p3 - origin)).dot(ep_dir) / ep_dir.dot(ep_dir);
            }
        }
        // Iterative minimum distance search
        for i in 0..=CUBIC_SEARCH_STARTS {
            let mut t = i as f64 / CUBIC_SEARCH_STARTS as f64;
            for step in 0..=CUBIC_SEARCH_STEPS {
                let qe = qa + 3.0 * t * ab + 3.0 * t * t * br + t * t * t * as_;
                let distance = qe.hypot();
                if distance < min_distance.abs() {
                    min_distance = non_zero_sign(self.direction(t).cross(qe)) * distance;
                    param = t;
                }
                if step == CUBIC_SEARCH_STEPS {
                    break;
                }
                let d1 = 3.0 * ab + 6.0 * t * br + 3.0 * t * t * as_;
                let d2 = 6.0 * br + 6.0 * t * as_;
                t -= qe.dot(d1) / (d1.dot(d1) + qe.dot(d2));
                if t <= 0.0 || t >= 1.0 {
                    break;
                }
            }
        }

        self.finish_curve_distance(min_distance, param, qa, cubic.p3 - origin)
    }

    /// Attaches the endpoint alignment term to a curve distance.
    ///
    /// `qa` and `qb` point from the query point to the start and end of the curve.
    fn finish_curve_distance(
        &self,
        min_distance: f64,
        param: f64,
        qa: Vec2,
        qb: Vec2,
    ) -> (SignedDistance, f64) {
        if (0.0..=1.0).contains(&param) {
            return (SignedDistance::new(min_distance, 0.0), param);
        }
        let dot = if param < 0.5 {
            normalize(self.direction(0.0), false)
                .dot(normalize(qa, false))
                .abs()
        } else {
            normalize(self.direction(1.0), false)
                .dot(normalize(qb, false))
                .abs()
        };
        (SignedDistance::new(min_distance, dot), param)
    }

    /// Converts a distance to the edge into a pseudo-distance, which extends the edge along
    /// its end tangents beyond its endpoints.
    ///
    /// `param` is the parameter returned together with `distance` by
    /// [`signed_distance`](Self::signed_distance).
    pub fn distance_to_pseudo_distance(
        &self,
        distance: SignedDistance,
        origin: Point,
        param: f64,
    ) -> SignedDistance {
        if param < 0.0 {
            let dir = normalize(self.direction(0.0), false);
            let aq = origin - self.start();
            let ts = aq.dot(dir);
            if ts < 0.0 {
                let pseudo_distance = aq.cross(dir);
                if pseudo_distance.abs() <= distance.distance.abs() {
                    return SignedDistance::new(pseudo_distance, 0.0);
                }
            }
        } else if param > 1.0 {
            let dir = normalize(self.direction(1.0), false);
            let bq = origin - self.end();
            let ts = bq.dot(dir);
            if ts > 0.0 {
                let pseudo_distance = bq.cross(dir);
                if pseudo_distance.abs() <= distance.distance.abs() {
                    return SignedDistance::new(pseudo_distance, 0.0);
                }
            }
        }
        distance
    }

    /// Computes the crossings of the edge with the horizontal line at `y`.
    ///
    /// Endpoints are counted so that the crossings of consecutive edges of a closed contour
    /// alternate in direction, which keeps the winding numbers of a
    /// [`Scanline`](crate::scanline::Scanline) consistent at vertices.
    pub fn scanline_intersections(&self, y: f64) -> ScanlineIntersections {
        match self.segment {
            PathSeg::Line(line) => line_scanline_intersections(line, y),
            PathSeg::Quad(quad) => quad_scanline_intersections(quad, y),
            PathSeg::Cubic(cubic) => cubic_scanline_intersections(cubic, y),
        }
    }

    /// The arc length of the edge.
    pub fn length(&self) -> f64 {
        match self.segment {
            PathSeg::Line(line) => (line.p1 - line.p0).hypot(),
            segment => segment.arclen(1e-9),
        }
    }

    /// The bounding box of the edge.
    pub fn bounds(&self) -> Rect {
        self.segment.bounding_box()
    }

    /// Reverses the direction of the edge.
    pub fn reverse(&mut self) {
        self.segment = self.segment.reverse();
    }

    /// Moves the start point of the edge to `to`, keeping the start tangent of a quadratic
    /// edge where possible.
    pub fn move_start_point(&mut self, to: Point) {
        match &mut self.segment {
            PathSeg::Line(line) => line.p0 = to,
            PathSeg::Quad(quad) => {
                let orig_start_dir = quad.p0 - quad.p1;
                let orig_p1 = quad.p1;
                quad.p1 += (quad.p0 - quad.p1).cross(to - quad.p0)
                    / (quad.p0 - quad.p1).cross(quad.p2 - quad.p1)
                    * (quad.p2 - quad.p1);
                quad.p0 = to;
                if orig_start_dir.dot(quad.p0 - quad.p1) < 0.0 {
                    quad.p1 = orig_p1;
                }
            }
            PathSeg::Cubic(cubic) => {
                cubic.p1 += to - cubic.p0;
                cubic.p0 = to;
            }
        }
    }

    /// Moves the end point of the edge to `to`, keeping the end tangent of a quadratic edge
    /// where possible.
    pub fn move_end_point(&mut self, to: Point) {
        match &mut self.segment {
            PathSeg::Line(line) => line.p1 = to,
            PathSeg::Quad(quad) => {
                let orig_end_dir = quad.p2 - quad.p1;
                let orig_p1 = quad.p1;
                quad.p1 += (quad.p2 - quad.p1).cross(to - quad.p2)
                    / (quad.p2 - quad.p1).cross(quad.p0 - quad.p1)
                    * (quad.p0 - quad.p1);
                quad.p2 = to;
                if orig_end_dir.dot(quad.p2 - quad.p1) < 0.0 {
                    quad.p1 = orig_p1;
                }
            }
            PathSeg::Cubic(cubic) => {
                cubic.p2 += to - cubic.p3;
                cubic.p3 = to;
            }
        }
    }

    /// Splits the edge into three parts of equal parameter length, each keeping the color.
    pub fn split_in_thirds(&self) -> [Self; 3] {
        const THIRD: f64 = 1.0 / 3.0;
        const TWO_THIRDS: f64 = 2.0 / 3.0;
        [0.0..THIRD, THIRD..TWO_THIRDS, TWO_THIRDS..1.0].map(|range| Self {
            segment: self.segment.subsegment(range),
            color: self.color,
        })
    }

    /// Whether all control points of the edge coincide.
    pub fn is_degenerate(&self) -> bool {
        match self.segment {
            PathSeg::Line(line) => line.p0 == line.p1,
            PathSeg::Quad(quad) => quad.p0 == quad.p1 && quad.p1 == quad.p2,
            PathSeg::Cubic(cubic) => {
                cubic.p0 == cubic.p1 && cubic.p1 == cubic.p2 && cubic.p2 == cubic.p3
            }
        }
    }

    /// Raises a quadratic edge to a cubic one, leaving other edges unchanged.
    pub fn convert_to_cubic(&mut self) {
        if let PathSeg::Quad(quad) = self.segment {
            self.segment = PathSeg::Cubic(quad.raise());
        }
    }
}

fn line_signed_distance(line: Line, origin: Point) -> (SignedDistance, f64) {
    let aq = origin - line.p0;
    let ab = line.p1 - line.p0;
    let param = aq.dot(ab) / ab.dot(ab);
    let eq = if param > 0.5 { line.p1 } else { line.p0 } - origin;
    let endpoint_distance = eq.hypot();
    if param > 0.0 && param < 1.0 {
        let ortho_distance = orthonormal(ab, false, false).dot(aq);
        if ortho_distance.abs() < endpoint_distance {
            return (SignedDistance::new(ortho_distance, 0.0), param);
        }
    }
    (
        SignedDistance::new(
            non_zero_sign(aq.cross(ab)) * endpoint_distance,
            normalize(ab, false).dot(normalize(eq, false)).abs(),
        ),
        param,
    )
}

fn line_scanline_intersections(line: Line, y: f64) -> ScanlineIntersections {
    let mut intersections = ScanlineIntersections::new();
    let (p0, p1) = (line.p0, line.p1);
    if (y >= p0.y && y < p1.y) || (y >= p1.y && y < p0.y) {
        let param = (y - p0.y) / (p1.y - p0.y);
        let x = crate::math::mix(p0.x, p1.x, param);
        intersections.push((x, crate::math::sign(p1.y - p0.y)));
    }
    intersections
}

fn quad_scanline_intersections(quad: QuadBez, y: f64) -> ScanlineIntersections {
    let p = [quad.p0, quad.p1, quad.p2];
    let mut x = [0.0; 3];
    let mut dy = [0; 3];
    let mut total = 0;
    let mut next_dy = if y > p[0].y { 1 } else { -1 };
    x[total] = p[0].x;
    if p[0].y == y {
        if p[0].y < p[1].y || (p[0].y == p[1].y && p[0].y < p[2].y) {
            dy[total] = 1;
            total += 1;
        } else {
            next_dy = 1;
        }
    }
    {
        let ab = p[1] - p[0];
        let br = p[2] - p[1] - ab;
        let roots = solve_quadratic(br.y, 2.0 * ab.y, p[0].y - y);
        let mut t: SmallVec<[f64; 3]> = roots.as_slice().into();
        t.sort_by(f64::total_cmp);
        for &t in &t {
            if total >= 2 {
                break;
            }
            if (0.0..=1.0).contains(&t) {
                x[total] = p[0].x + 2.0 * t * ab.x + t * t * br.x;
                if f64::from(next_dy) * (ab.y + t * br.y) >= 0.0 {
                    dy[total] = next_dy;
                    total += 1;
                    next_dy = -next_dy;
                }
            }
        }
    }
    if p[2].y == y {
        if next_dy > 0 && total > 0 {
            total -= 1;
            next_dy = -1;
        }
        if (p[2].y < p[1].y || (p[2].y == p[1].y && p[2].y < p[0].y)) && total < 2 {
            x[total] = p[2].x;
            if next_dy < 0 {
                dy[total] = -1;
                total += 1;
                next_dy = 1;
            }
        }
    }
    if next_dy != if y >= p[2].y { 1 } else { -1 } {
        if total > 0 {
            total -= 1;
        } else {
            if (p[2].y - y).abs() < (p[0].y - y).abs() {
                x[total] = p[2].x;
            }
            dy[total] = next_dy;
            total += 1;
        }
    }
    x.into_iter().zip(dy).take(total).collect()
}

fn cubic_scanline_intersections(cubic: CubicBez, y: f64) -> ScanlineIntersections {
    let p = [cubic.p0, cubic.p1, cubic.p2, cubic.p3];
    let mut x = [0.0; 3];
    let mut dy = [0; 3];
    let mut total = 0;
    let mut next_dy = if y > p[0].y { 1 } else { -1 };
    x[total] = p[0].x;
    if p[0].y == y {
        if p[0].y < p[1].y
            || (p[0].y == p[1].y && (p[0].y < p[2].y || (p[0].y == p[2].y && p[0].y < p[3].y)))
        {
            dy[total] = 1;
            total += 1;
        } else {
            next_dy = 1;
        }
    }
    {
        let ab = p[1] - p[0];
        let br = p[2] - p[1] - ab;
        let as_ = (p[3] - p[2]) - (p[2] - p[1]) - br;
        let roots = solve_cubic(as_.y, 3.0 * br.y, 3.0 * ab.y, p[0].y - y);
        let mut t: SmallVec<[f64; 3]> = roots.as_slice().into();
        t.sort_by(f64::total_cmp);
        for &t in &t {
            if total >= 3 {
                break;
            }
            if (0.0..=1.0).contains(&t) {
                x[total] = p[0].x + 3.0 * t * ab.x + 3.0 * t * t * br.x + t * t * t * as_.x;
                if f64::from(next_dy) * (ab.y + 2.0 * t * br.y + t * t * as_.y) >= 0.0 {
                    dy[total] = next_dy;
                    total += 1;
                    next_dy = -next_dy;
                }
            }
        }
    }
    if p[3].y == y {
        if next_dy > 0 && total > 0 {
            total -= 1;
            next_dy = -1;
        }
        if (p[3].y < p[2].y
            || (p[3].y == p[2].y && (p[3].y < p[1].y || (p[3].y == p[1].y && p[3].y < p[0].y))))
            && total < 3
        {
            x[total] = p[3].x;
            if next_dy < 0 {
                dy[total] = -1;
                total += 1;
                next_dy = 1;
            }
        }
    }
    if next_dy != if y >= p[3].y { 1 } else { -1 } {
        if total > 0 {
            total -= 1;
        } else {
            if (p[3].y - y).abs() < (p[0].y - y).abs() {
                x[total] = p[3].x;
            }
            dy[total] = next_dy;
            total += 1;
        }
    }
    x.into_iter().zip(dy).take(total).collect()
}
