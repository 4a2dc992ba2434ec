// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Signed distances with an alignment term for resolving ties between edges.

/// A signed distance to an edge.
///
/// `dot` is `0` when the closest point is a perpendicular foot on the edge. When the closest
/// point is an endpoint, it is the absolute cosine between the edge's end tangent and the
/// direction towards the query point. Among equally distant edges, the one the point lies
/// more squarely beside wins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SignedDistance {
    /// The signed distance. Negative and positive values lie on opposite sides of the edge.
    pub distance: f64,
    /// The endpoint alignment term used to break ties.
    pub dot: f64,
}

impl SignedDistance {
    /// A distance that every other distance is closer than.
    pub const INFINITE: Self = Self {
        distance: -f64::MAX,
        dot: 0.0,
    };

    /// Create a new signed distance.
    pub const fn new(distance: f64, dot: f64) -> Self {
        Self { distance, dot }
    }

    /// Whether `self` is strictly closer than `other`.
    ///
    /// Distances are compared by magnitude first, then by their `dot` term.
    #[inline]
    pub fn is_closer_than(&self, other: &Self) -> bool {
        let (a, b) = (self.distance.abs(), other.distance.abs());
        a < b || (a == b && self.dot < other.dot)
    }
}

impl Default for SignedDistance {
    fn default() -> Self {
        Self::INFINITE
    }
}
