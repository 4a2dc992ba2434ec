// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contour combiners, which merge the per-contour results of edge selectors into the
//! distance to the whole shape.

use crate::edge_selectors::{DistanceValue, EdgeSelector};
use crate::kurbo::Point;
use crate::shape::Shape;

/// Combines the distances to the individual contours of a shape.
pub trait ContourCombiner {
    /// The edge selector used for each contour.
    type Selector: EdgeSelector;

    /// Create a combiner for `shape`.
    fn new(shape: &Shape) -> Self;

    /// Prepares the combiner for a new query point.
    fn reset(&mut self, p: Point);

    /// The selector that receives the edges of the contour with index `contour`.
    fn edge_selector(&mut self, contour: usize) -> &mut Self::Selector;

    /// The combined distance to the shape.
    fn distance(&self) -> <Self::Selector as EdgeSelector>::Distance;
}

/// Treats all contours as one: the nearest edge of any contour wins.
///
/// This is correct for shapes without overlapping contours.
#[derive(Clone, Debug)]
pub struct SimpleContourCombiner<S> {
    selector: S,
}

impl<S: EdgeSelector> ContourCombiner for SimpleContourCombiner<S> {
    type Selector = S;

    fn new(_shape: &Shape) -> Self {
        Self {
            selector: S::default(),
        }
    }

    fn reset(&mut self, p: Point) {
        self.selector.reset(p);
    }

    fn edge_selector(&mut self, _contour: usize) -> &mut S {
        &mut self.selector
    }

    fn distance(&self) -> S::Distance {
        self.selector.distance()
    }
}

/// Resolves the distance to shapes with overlapping or nested contours.
///
/// Each contour gets its own selector. Contours wound clockwise (positive winding) add filled
/// area and counter-clockwise contours remove it; a point inside a filled contour should not
/// report the distance to an edge of another contour that lies entirely within the fill.
#[derive(Clone, Debug)]
pub struct OverlappingContourCombiner<S> {
    p: Point,
    windings: Vec<i32>,
    selectors: Vec<S>,
}

impl<S: EdgeSelector> ContourCombiner for OverlappingContourCombiner<S> {
    type Selector = S;

    fn new(shape: &Shape) -> Self {
        Self {
            p: Point::ZERO,
            windings: shape.contours.iter().map(|c| c.winding()).collect(),
            selectors: vec![S::default(); shape.contours.len()],
        }
    }

    fn reset(&mut self, p: Point) {
        self.p = p;
        for selector in &mut self.selectors {
            selector.reset(p);
        }
    }

    fn edge_selector(&mut self, contour: usize) -> &mut S {
        &mut self.selectors[contour]
    }

    fn distance(&self) -> S::Distance {
        let mut shape_selector = S::default();
        let mut inner_selector = S::default();
        let mut outer_selector = S::default();
        shape_selector.reset(self.p);
        inner_selector.reset(self.p);
        outer_selector.reset(self.p);

        for (selector, &winding) in self.selectors.iter().zip(&self.windings) {
            let edge_distance = selector.distance().resolve();
            shape_selector.merge(selector);
            if winding > 0 && edge_distance >= 0.0 {
                inner_selector.merge(selector);
            }
            if winding < 0 && edge_distance <= 0.0 {
                outer_selector.merge(selector);
            }
        }

        let shape_distance = shape_selector.distance();
        let inner_distance = inner_selector.distance();
        let outer_distance = outer_selector.distance();
        let inner_scalar = inner_distance.resolve();
        let outer_scalar = outer_distance.resolve();

        let mut distance;
        let winding;
        if inner_scalar >= 0.0 && inner_scalar.abs() <= outer_scalar.abs() {
            distance = inner_distance;
            winding = 1;
            for (selector, &contour_winding) in self.selectors.iter().zip(&self.windings) {
                if contour_winding > 0 {
                    let contour_distance = selector.distance();
                    let scalar = contour_distance.resolve();
                    if scalar.abs() < outer_scalar.abs() && scalar > distance.resolve() {
                        distance = contour_distance;
                    }
                }
            }
        } else if outer_scalar <= 0.0 && outer_scalar.abs() < inner_scalar.abs() {
            distance = outer_distance;
            winding = -1;
            for (selector, &contour_winding) in self.selectors.iter().zip(&self.windings) {
                if contour_winding < 0 {
                    let contour_distance = selector.distance();
                    let scalar = contour_distance.resolve();
                    if scalar.abs() < inner_scalar.abs() && scalar < distance.resolve() {
                        distance = contour_distance;
                    }
                }
            }
        } else {
            return shape_distance;
        }

        for (selector, &contour_winding) in self.selectors.iter().zip(&self.windings) {
            if contour_winding != winding {
                let contour_distance = selector.distance();
                let scalar = contour_distance.resolve();
                let current = distance.resolve();
                if scalar * current >= 0.0 && scalar.abs() < current.abs() {
                    distance = contour_distance;
                }
            }
        }
        if distance.resolve() == shape_distance.resolve() {
            distance = shape_distance;
        }
        distance
    }
}

#[cfg(test)]
mod tests {
    use super::{ContourCombiner, OverlappingContourCombiner, SimpleContourCombiner};
    use crate::edge_selectors::{EdgeSelector, TrueDistanceSelector};
    use crate::kurbo::{Point, Rect, Shape as _};
    use crate::shape::Shape;

    /// Two overlapping squares, both wound clockwise.
    fn overlapping_squares() -> Shape {
        let mut shape = Shape::new();
        for rect in [Rect::new(0.0, 0.0, 2.0, 2.0), Rect::new(1.0, 0.0, 3.0, 2.0)] {
            let mut square = Shape::from_path(rect.path_elements(0.1));
            // kurbo emits rectangles counter-clockwise with the Y axis pointing up.
            square.contours[0].reverse();
            shape.contours.append(&mut square.contours);
        }
        shape
    }

    fn distance<C: ContourCombiner<Selector = TrueDistanceSelector>>(
        shape: &Shape,
        p: Point,
    ) -> f64 {
        let mut combiner = C::new(shape);
        combiner.reset(p);
        for (i, contour) in shape.contours.iter().enumerate() {
            let selector = combiner.edge_selector(i);
            let n = contour.edges.len();
            for j in 0..n {
                let mut cache = Default::default();
                selector.add_edge(
                    &mut cache,
                    &contour.edges[(j + n - 1) % n],
                    &contour.edges[j],
                    &contour.edges[(j + 1) % n],
                );
            }
        }
        combiner.distance()
    }

    #[test]
    fn overlap_ignores_interior_edges() {
        let shape = overlapping_squares();
        assert!(shape.contours.iter().all(|c| c.winding() == 1));
        // Right next to the left edge of the second square, which lies inside the first.
        let p = Point::new(1.1, 1.0);
        let simple = distance::<SimpleContourCombiner<TrueDistanceSelector>>(&shape, p);
        let overlapping = distance::<OverlappingContourCombiner<TrueDistanceSelector>>(&shape, p);
        assert!((simple - 0.1).abs() < 1e-9);
        // Inside both contours, the farther of the two contour edges is reported.
        assert!((overlapping - 0.9).abs() < 1e-9);
    }

    #[test]
    fn overlap_outside_matches_simple() {
        let shape = overlapping_squares();
        let p = Point::new(4.0, 1.0);
        let simple = distance::<SimpleContourCombiner<TrueDistanceSelector>>(&shape, p);
        let overlapping = distance::<OverlappingContourCombiner<TrueDistanceSelector>>(&shape, p);
        assert!((simple + 1.0).abs() < 1e-9);
        assert_eq!(simple, overlapping);
    }
}
