// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge selectors, which reduce the edges of a contour to a distance value.
//!
//! A selector is reset to a query point, fed every edge (together with its neighbours and a
//! per-edge cache), and finally asked for the distance. The caches let a selector skip edges
//! that cannot beat the current minimum when consecutive query points are close together.

use crate::edge::EdgeSegment;
use crate::edge_color::EdgeColor;
use crate::kurbo::{Point, Vec2};
use crate::math::{median, non_zero_sign, normalize};
use crate::signed_distance::SignedDistance;

/// Safety margin applied to the distance travelled between queries when deciding whether a
/// cached edge distance is still conclusive.
const DISTANCE_DELTA_FACTOR: f64 = 1.001;

/// A distance value produced by an [`EdgeSelector`].
pub trait DistanceValue: Copy + core::fmt::Debug {
    /// The value reported when no edge contributed, with every channel at `-f64::MAX`.
    const UNSET: Self;

    /// Reduces the value to a single signed distance (the median for multi-channel values).
    fn resolve(&self) -> f64;
}

impl DistanceValue for f64 {
    const UNSET: Self = -f64::MAX;

    #[inline]
    fn resolve(&self) -> f64 {
        *self
    }
}

/// Per-channel pseudo-distances of a multi-channel distance field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MultiDistance {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl DistanceValue for MultiDistance {
    const UNSET: Self = Self {
        r: -f64::MAX,
        g: -f64::MAX,
        b: -f64::MAX,
    };

    #[inline]
    fn resolve(&self) -> f64 {
        median(self.r, self.g, self.b)
    }
}

/// Per-channel pseudo-distances plus the true distance in the alpha channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MultiAndTrueDistance {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl DistanceValue for MultiAndTrueDistance {
    const UNSET: Self = Self {
        r: -f64::MAX,
        g: -f64::MAX,
        b: -f64::MAX,
        a: -f64::MAX,
    };

    #[inline]
    fn resolve(&self) -> f64 {
        median(self.r, self.g, self.b)
    }
}

/// Selects the distance from a query point to a set of edges.
pub trait EdgeSelector: Default + Clone {
    /// The distance value this selector produces.
    type Distance: DistanceValue;
    /// Per-edge state kept between consecutive queries.
    type EdgeCache: Default + Clone;

    /// Prepares the selector for a new query point.
    fn reset(&mut self, p: Point);

    /// Considers `edge`, whose neighbours in its contour are `prev` and `next`.
    fn add_edge(
        &mut self,
        cache: &mut Self::EdgeCache,
        prev: &EdgeSegment,
        edge: &EdgeSegment,
        next: &EdgeSegment,
    );

    /// Merges the edges seen by `other` into this selector.
    fn merge(&mut self, other: &Self);

    /// The distance to the edges added since the last reset.
    fn distance(&self) -> Self::Distance;
}

/// Cache of a [`TrueDistanceSelector`] for one edge.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrueDistanceCache {
    point: Point,
    abs_distance: f64,
}

/// Selects the true signed distance to the nearest edge.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrueDistanceSelector {
    p: Point,
    min_distance: SignedDistance,
}

impl EdgeSelector for TrueDistanceSelector {
    type Distance = f64;
    type EdgeCache = TrueDistanceCache;

    fn reset(&mut self, p: Point) {
        let delta = DISTANCE_DELTA_FACTOR * (p - self.p).hypot();
        self.min_distance.distance += non_zero_sign(self.min_distance.distance) * delta;
        self.p = p;
    }

    fn add_edge(
        &mut self,
        cache: &mut TrueDistanceCache,
        _prev: &EdgeSegment,
        edge: &EdgeSegment,
        _next: &EdgeSegment,
    ) {
        let delta = DISTANCE_DELTA_FACTOR * (self.p - cache.point).hypot();
        if cache.abs_distance - delta <= self.min_distance.distance.abs() {
            let (distance, _) = edge.signed_distance(self.p);
            if distance.is_closer_than(&self.min_distance) {
                self.min_distance = distance;
            }
            cache.point = self.p;
            cache.abs_distance = distance.distance.abs();
        }
    }

    fn merge(&mut self, other: &Self) {
        if other.min_distance.is_closer_than(&self.min_distance) {
            self.min_distance = other.min_distance;
        }
    }

    fn distance(&self) -> f64 {
        self.min_distance.distance
    }
}

/// Cache of the perpendicular distance selectors for one edge.
#[derive(Clone, Copy, Debug, Default)]
pub struct PerpendicularDistanceCache {
    point: Point,
    abs_distance: f64,
    a_domain_distance: f64,
    b_domain_distance: f64,
    a_perpendicular_distance: f64,
    b_perpendicular_distance: f64,
}

/// The state shared by the perpendicular distance selectors, tracked once per channel.
#[derive(Clone, Copy, Debug)]
struct PerpendicularDistanceState {
    min_true_distance: SignedDistance,
    min_negative_perpendicular_distance: f64,
    min_positive_perpendicular_distance: f64,
    near_edge: Option<EdgeSegment>,
    near_edge_param: f64,
}

impl Default for PerpendicularDistanceState {
    fn default() -> Self {
        let min_true_distance = SignedDistance::INFINITE;
        Self {
            min_true_distance,
            min_negative_perpendicular_distance: -min_true_distance.distance.abs(),
            min_positive_perpendicular_distance: min_true_distance.distance.abs(),
            near_edge: None,
            near_edge_param: 0.0,
        }
    }
}

impl PerpendicularDistanceState {
    fn reset(&mut self, delta: f64) {
        self.min_true_distance.distance += non_zero_sign(self.min_true_distance.distance) * delta;
        self.min_negative_perpendicular_distance = -self.min_true_distance.distance.abs();
        self.min_positive_perpendicular_distance = self.min_true_distance.distance.abs();
        self.near_edge = None;
        self.near_edge_param = 0.0;
    }

    /// Whether the edge described by `cache` could still affect the result at `p`.
    fn is_edge_relevant(&self, cache: &PerpendicularDistanceCache, p: Point) -> bool {
        let delta = DISTANCE_DELTA_FACTOR * (p - cache.point).hypot();
        cache.abs_distance - delta <= self.min_true_distance.distance.abs()
            || cache.a_domain_distance.abs() < delta
            || cache.b_domain_distance.abs() < delta
            || (cache.a_domain_distance > 0.0
                && if cache.a_perpendicular_distance < 0.0 {
                    cache.a_perpendicular_distance + delta
                        >= self.min_negative_perpendicular_distance
                } else {
                    cache.a_perpendicular_distance - delta
                        <= self.min_positive_perpendicular_distance
                })
            || (cache.b_domain_distance > 0.0
                && if cache.b_perpendicular_distance < 0.0 {
                    cache.b_perpendicular_distance + delta
                        >= self.min_negative_perpendicular_distance
                } else {
                    cache.b_perpendicular_distance - delta
                        <= self.min_positive_perpendicular_distance
                })
    }

    fn add_edge_true_distance(
        &mut self,
        edge: &EdgeSegment,
        distance: SignedDistance,
        param: f64,
    ) {
        if distance.is_closer_than(&self.min_true_distance) {
            self.min_true_distance = distance;
            self.near_edge = Some(*edge);
            self.near_edge_param = param;
        }
    }

    fn add_edge_perpendicular_distance(&mut self, distance: f64) {
        if distance <= 0.0 && distance > self.min_negative_perpendicular_distance {
            self.min_negative_perpendicular_distance = distance;
        }
        if distance >= 0.0 && distance < self.min_positive_perpendicular_distance {
            self.min_positive_perpendicular_distance = distance;
        }
    }

    fn merge(&mut self, other: &Self) {
        if other.min_true_distance.is_closer_than(&self.min_true_distance) {
            self.min_true_distance = other.min_true_distance;
            self.near_edge = other.near_edge;
            self.near_edge_param = other.near_edge_param;
        }
        if other.min_negative_perpendicular_distance > self.min_negative_perpendicular_distance {
            self.min_negative_perpendicular_distance = other.min_negative_perpendicular_distance;
        }
        if other.min_positive_perpendicular_distance < self.min_positive_perpendicular_distance {
            self.min_positive_perpendicular_distance = other.min_positive_perpendicular_distance;
        }
    }

    fn compute_distance(&self, p: Point) -> f64 {
        let mut min_distance = if self.min_true_distance.distance < 0.0 {
            self.min_negative_perpendicular_distance
        } else {
            self.min_positive_perpendicular_distance
        };
        if let Some(near_edge) = &self.near_edge {
            let distance = near_edge.distance_to_pseudo_distance(
                self.min_true_distance,
                p,
                self.near_edge_param,
            );
            if distance.distance.abs() < min_distance.abs() {
                min_distance = distance.distance;
            }
        }
        min_distance
    }
}

/// Replaces `distance` with the perpendicular distance from the line through an endpoint of
/// an edge, if the query point lies beyond that endpoint and the result is closer.
///
/// `ep` points from the endpoint to the query point and `edge_dir` is the unit direction
/// leading away from the edge.
fn perpendicular_distance(distance: &mut f64, ep: Vec2, edge_dir: Vec2) -> bool {
    let ts = ep.dot(edge_dir);
    if ts > 0.0 {
        let perpendicular_distance = ep.cross(edge_dir);
        if perpendicular_distance.abs() < distance.abs() {
            *distance = perpendicular_distance;
            return true;
        }
    }
    false
}

/// Geometry of the domains around the endpoints of an edge, shared by the perpendicular
/// selectors.
struct EndpointDomains {
    ap: Vec2,
    bp: Vec2,
    a_dir: Vec2,
    b_dir: Vec2,
    /// Distance into the domain beyond the start point, along its bisector.
    a_domain_distance: f64,
    /// Distance into the domain beyond the end point, along its bisector.
    b_domain_distance: f64,
}

impl EndpointDomains {
    fn new(p: Point, prev: &EdgeSegment, edge: &EdgeSegment, next: &EdgeSegment) -> Self {
        let ap = p - edge.point(0.0);
        let bp = p - edge.point(1.0);
        let a_dir = normalize(edge.direction(0.0), true);
        let b_dir = normalize(edge.direction(1.0), true);
        let prev_dir = normalize(prev.direction(1.0), true);
        let next_dir = normalize(next.direction(0.0), true);
        Self {
            ap,
            bp,
            a_dir,
            b_dir,
            a_domain_distance: ap.dot(normalize(prev_dir + a_dir, true)),
            b_domain_distance: -bp.dot(normalize(b_dir + next_dir, true)),
        }
    }
}

/// Selects the signed pseudo-distance: the perpendicular distance to the nearest edge, with
/// edges extended along their tangents past their endpoints.
#[derive(Clone, Copy, Debug, Default)]
pub struct PerpendicularDistanceSelector {
    p: Point,
    state: PerpendicularDistanceState,
}

impl PerpendicularDistanceSelector {
    /// The true distance to the nearest edge.
    pub fn true_distance(&self) -> SignedDistance {
        self.state.min_true_distance
    }
}

impl EdgeSelector for PerpendicularDistanceSelector {
    type Distance = f64;
    type EdgeCache = PerpendicularDistanceCache;

    fn reset(&mut self, p: Point) {
        let delta = DISTANCE_DELTA_FACTOR * (p - self.p).hypot();
        self.state.reset(delta);
        self.p = p;
    }

    fn add_edge(
        &mut self,
        cache: &mut PerpendicularDistanceCache,
        prev: &EdgeSegment,
        edge: &EdgeSegment,
        next: &EdgeSegment,
    ) {
        if !self.state.is_edge_relevant(cache, self.p) {
            return;
        }
        let (distance, param) = edge.signed_distance(self.p);
        self.state.add_edge_true_distance(edge, distance, param);
        cache.point = self.p;
        cache.abs_distance = distance.distance.abs();

        let domains = EndpointDomains::new(self.p, prev, edge, next);
        if domains.a_domain_distance > 0.0 {
            let mut pd = distance.distance;
            if perpendicular_distance(&mut pd, domains.ap, -domains.a_dir) {
                pd = -pd;
                self.state.add_edge_perpendicular_distance(pd);
            }
            cache.a_perpendicular_distance = pd;
        }
        if domains.b_domain_distance > 0.0 {
            let mut pd = distance.distance;
            if perpendicular_distance(&mut pd, domains.bp, domains.b_dir) {
                self.state.add_edge_perpendicular_distance(pd);
            }
            cache.b_perpendicular_distance = pd;
        }
        cache.a_domain_distance = domains.a_domain_distance;
        cache.b_domain_distance = domains.b_domain_distance;
    }

    fn merge(&mut self, other: &Self) {
        self.state.merge(&other.state);
    }

    fn distance(&self) -> f64 {
        self.state.compute_distance(self.p)
    }
}

/// Selects a pseudo-distance per color channel, considering only the edges whose color
/// includes that channel.
#[derive(Clone, Copy, Debug, Default)]
pub struct MultiDistanceSelector {
    p: Point,
    channels: [PerpendicularDistanceState; 3],
}

impl MultiDistanceSelector {
    /// The true distance to the nearest colored edge.
    pub fn true_distance(&self) -> SignedDistance {
        let mut distance = self.channels[0].min_true_distance;
        for channel in &self.channels[1..] {
            if channel.min_true_distance.is_closer_than(&distance) {
                distance = channel.min_true_distance;
            }
        }
        distance
    }

    fn add_perpendicular_distance(&mut self, color: EdgeColor, pd: f64) {
        for (i, channel) in self.channels.iter_mut().enumerate() {
            if color.has_channel(i) {
                channel.add_edge_perpendicular_distance(pd);
            }
        }
    }

    fn multi_distance(&self) -> MultiDistance {
        MultiDistance {
            r: self.channels[0].compute_distance(self.p),
            g: self.channels[1].compute_distance(self.p),
            b: self.channels[2].compute_distance(self.p),
        }
    }
}

impl EdgeSelector for MultiDistanceSelector {
    type Distance = MultiDistance;
    type EdgeCache = PerpendicularDistanceCache;

    fn reset(&mut self, p: Point) {
        let delta = DISTANCE_DELTA_FACTOR * (p - self.p).hypot();
        for channel in &mut self.channels {
            channel.reset(delta);
        }
        self.p = p;
    }

    fn add_edge(
        &mut self,
        cache: &mut PerpendicularDistanceCache,
        prev: &EdgeSegment,
        edge: &EdgeSegment,
        next: &EdgeSegment,
    ) {
        let color = edge.color;
        let relevant = self
            .channels
            .iter()
            .enumerate()
            .any(|(i, channel)| color.has_channel(i) && channel.is_edge_relevant(cache, self.p));
        if !relevant {
            return;
        }
        let (distance, param) = edge.signed_distance(self.p);
        for (i, channel) in self.channels.iter_mut().enumerate() {
            if color.has_channel(i) {
                channel.add_edge_true_distance(edge, distance, param);
            }
        }
        cache.point = self.p;
        cache.abs_distance = distance.distance.abs();

        let domains = EndpointDomains::new(self.p, prev, edge, next);
        if domains.a_domain_distance > 0.0 {
            let mut pd = distance.distance;
            if perpendicular_distance(&mut pd, domains.ap, -domains.a_dir) {
                pd = -pd;
                self.add_perpendicular_distance(color, pd);
            }
            cache.a_perpendicular_distance = pd;
        }
        if domains.b_domain_distance > 0.0 {
            let mut pd = distance.distance;
            if perpendicular_distance(&mut pd, domains.bp, domains.b_dir) {
                self.add_perpendicular_distance(color, pd);
            }
            cache.b_perpendicular_distance = pd;
        }
        cache.a_domain_distance = domains.a_domain_distance;
        cache.b_domain_distance = domains.b_domain_distance;
    }

    fn merge(&mut self, other: &Self) {
        for (channel, other) in self.channels.iter_mut().zip(&other.channels) {
            channel.merge(other);
        }
    }

    fn distance(&self) -> MultiDistance {
        self.multi_distance()
    }
}

/// A [`MultiDistanceSelector`] that also reports the true distance in the alpha channel.
#[derive(Clone, Copy, Debug, Default)]
pub struct MultiAndTrueDistanceSelector {
    inner: MultiDistanceSelector,
}

impl EdgeSelector for MultiAndTrueDistanceSelector {
    type Distance = MultiAndTrueDistance;
    type EdgeCache = PerpendicularDistanceCache;

    fn reset(&mut self, p: Point) {
        self.inner.reset(p);
    }

    fn add_edge(
        &mut self,
        cache: &mut PerpendicularDistanceCache,
        prev: &EdgeSegment,
        edge: &EdgeSegment,
        next: &EdgeSegment,
    ) {
        self.inner.add_edge(cache, prev, edge, next);
    }

    fn merge(&mut self, other: &Self) {
        self.inner.merge(&other.inner);
    }

    fn distance(&self) -> MultiAndTrueDistance {
        let multi = self.inner.multi_distance();
        MultiAndTrueDistance {
            r: multi.r,
            g: multi.g,
            b: multi.b,
            a: self.inner.true_distance().distance,
        }
    }
}
