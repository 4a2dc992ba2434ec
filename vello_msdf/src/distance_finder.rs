// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Distance queries against a whole shape.

use crate::contour_combiners::ContourCombiner;
use crate::edge_selectors::EdgeSelector;
use crate::kurbo::Point;
use crate::shape::Shape;

type DistanceOf<C> = <<C as ContourCombiner>::Selector as EdgeSelector>::Distance;
type EdgeCacheOf<C> = <<C as ContourCombiner>::Selector as EdgeSelector>::EdgeCache;

/// Finds the distance from points to a shape with the contour combiner `C`.
///
/// The finder keeps a cache per edge, so consecutive queries at nearby points are cheaper.
/// Use one finder per thread.
#[derive(Clone)]
pub struct ShapeDistanceFinder<'a, C: ContourCombiner> {
    shape: &'a Shape,
    combiner: C,
    edge_cache: Vec<EdgeCacheOf<C>>,
}

impl<'a, C: ContourCombiner> ShapeDistanceFinder<'a, C> {
    /// Create a new distance finder for `shape`.
    pub fn new(shape: &'a Shape) -> Self {
        Self {
            shape,
            combiner: C::new(shape),
            edge_cache: vec![EdgeCacheOf::<C>::default(); shape.edge_count()],
        }
    }

    /// The distance from `origin` to the shape.
    pub fn distance(&mut self, origin: Point) -> DistanceOf<C> {
        self.combiner.reset(origin);
        let mut caches = self.edge_cache.iter_mut();
        for (index, contour) in self.shape.contours.iter().enumerate() {
            let edges = contour.edges.as_slice();
            let (Some(first), Some(last)) = (edges.first(), edges.last()) else {
                continue;
            };
            let selector = self.combiner.edge_selector(index);
            let mut prev = if edges.len() >= 2 {
                &edges[edges.len() - 2]
            } else {
                first
            };
            let mut cur = last;
            for next in edges {
                if let Some(cache) = caches.next() {
                    selector.add_edge(cache, prev, cur, next);
                }
                prev = cur;
                cur = next;
            }
        }
        self.combiner.distance()
    }

    /// Computes a single distance without keeping any cache around.
    pub fn one_shot_distance(shape: &Shape, origin: Point) -> DistanceOf<C> {
        ShapeDistanceFinder::<C>::new(shape).distance(origin)
    }
}

#[cfg(test)]
mod tests {
    use super::ShapeDistanceFinder;
    use crate::contour_combiners::{OverlappingContourCombiner, SimpleContourCombiner};
    use crate::edge_selectors::{MultiDistanceSelector, TrueDistanceSelector};
    use crate::kurbo::{Circle, Point, Shape as _};
    use crate::shape::Shape;

    type TrueFinder<'a> = ShapeDistanceFinder<'a, SimpleContourCombiner<TrueDistanceSelector>>;

    fn circle(radius: f64) -> Shape {
        let mut shape = Shape::from_path(Circle::new((0.0, 0.0), radius).path_elements(1e-3));
        shape.normalize();
        shape.orient_contours();
        shape
    }

    #[test]
    fn circle_distances() {
        let shape = circle(10.0);
        let mut finder = TrueFinder::new(&shape);
        for (p, expected) in [
            ((0.0, 0.0), 10.0),
            ((5.0, 0.0), 5.0),
            ((0.0, -12.0), -2.0),
            ((-10.0, 0.0), 0.0),
        ] {
            let distance = finder.distance(Point::from(p));
            assert!((distance - expected).abs() < 1e-3, "{p:?}: {distance}");
        }
    }

    #[test]
    fn one_shot_matches_cached() {
        let shape = circle(3.0);
        let mut finder = TrueFinder::new(&shape);
        for i in 0..10 {
            let p = Point::new(-5.0 + f64::from(i), 1.0);
            let cached = finder.distance(p);
            let fresh = TrueFinder::one_shot_distance(&shape, p);
            assert!((cached - fresh).abs() < 1e-12);
        }
    }

    #[test]
    fn multi_distance_on_white_shape() {
        let shape = circle(4.0);
        let distance = ShapeDistanceFinder::<
            OverlappingContourCombiner<MultiDistanceSelector>,
        >::one_shot_distance(&shape, Point::new(1.0, 0.0));
        // Every edge is white, so all channels agree.
        assert!((distance.r - distance.g).abs() < 1e-12);
        assert!((distance.g - distance.b).abs() < 1e-12);
        assert!(distance.r > 0.0);
    }
}
