// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packing of rectangles into a container, and the search for container dimensions.

/// An axis-aligned rectangle in atlas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rectangle {
    /// Left edge.
    pub x: u32,
    /// Bottom edge.
    pub y: u32,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

/// Guillotine packer placing rectangles into the free spaces of a fixed-size container.
///
/// Every placement splits the space it was taken from into two smaller free spaces.
#[derive(Clone, Debug)]
pub struct RectanglePacker {
    spaces: Vec<Rectangle>,
}

impl RectanglePacker {
    /// Create a packer for an empty container of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        let mut spaces = Vec::new();
        if width > 0 && height > 0 {
            spaces.push(Rectangle::new(0, 0, width, height));
        }
        Self { spaces }
    }

    /// Places as many of `rectangles` as possible, setting their positions.
    ///
    /// Returns the number of rectangles that did not fit. Their positions are unspecified.
    pub fn pack(&mut self, rectangles: &mut [Rectangle]) -> usize {
        let mut remaining: Vec<usize> = (0..rectangles.len()).collect();
        while !remaining.is_empty() {
            let Some((space_index, remaining_index)) = self.best_fit(rectangles, &remaining)
            else {
                break;
            };
            let rect = &mut rectangles[remaining[remaining_index]];
            let space = self.spaces[space_index];
            rect.x = space.x;
            rect.y = space.y;
            self.split_space(space_index, rect.w, rect.h);
            remaining.swap_remove(remaining_index);
        }
        remaining.len()
    }

    /// Finds the free space and remaining rectangle with the smallest leftover along the
    /// shorter side. An exact match wins immediately.
    fn best_fit(&self, rectangles: &[Rectangle], remaining: &[usize]) -> Option<(usize, usize)> {
        let mut best = None;
        let mut best_fit = u32::MAX;
        for (i, space) in self.spaces.iter().enumerate() {
            for (j, &rect_index) in remaining.iter().enumerate() {
                let rect = &rectangles[rect_index];
                if rect.w == space.w && rect.h == space.h {
                    return Some((i, j));
                }
                if rect.w <= space.w && rect.h <= space.h {
                    let fit = (space.w - rect.w).min(space.h - rect.h);
                    if fit < best_fit {
                        best_fit = fit;
                        best = Some((i, j));
                    }
                }
            }
        }
        best
    }

    fn split_space(&mut self, index: usize, w: u32, h: u32) {
        let space = self.spaces.swap_remove(index);
        let mut a = Rectangle::new(space.x, space.y + h, w, space.h - h);
        let mut b = Rectangle::new(space.x + w, space.y, space.w - w, h);
        // Give the shared corner to the split with the larger leftover.
        if u64::from(w) * u64::from(space.h - h) < u64::from(h) * u64::from(space.w - w) {
            a.w = space.w;
        } else {
            b.h = space.h;
        }
        self.spaces.extend([a, b].into_iter().filter(|r| !r.is_empty()));
    }
}

/// A strategy for searching the smallest container dimensions that fit a set of rectangles.
///
/// The search proposes [`dimensions`](Self::dimensions), and is told whether the rectangles
/// fit through [`shrink`](Self::shrink) (they did, try smaller) or [`grow`](Self::grow)
/// (they did not).
pub trait SizeSelector {
    /// Starts a search for a container of at least `min_area` pixels.
    fn new(min_area: u64) -> Self;
    /// The next dimensions to try, or `None` once the search is over.
    fn dimensions(&self) -> Option<(u32, u32)>;
    /// The last proposed dimensions fit.
    fn shrink(&mut self);
    /// The last proposed dimensions did not fit.
    fn grow(&mut self);
}

/// Bisects square dimensions that are a multiple of `M`.
#[derive(Clone, Copy, Debug)]
pub struct SquareSizeSelector<const M: u32 = 1> {
    lower_bound: u32,
    upper_bound: Option<u32>,
    current: u32,
}

impl<const M: u32> SquareSizeSelector<M> {
    fn update_current(&mut self) {
        self.current = match self.upper_bound {
            None => 5 * self.lower_bound / 4 + 16 / M,
            Some(upper) => self.lower_bound + (upper - self.lower_bound) / 2,
        };
    }
}

impl<const M: u32> SizeSelector for SquareSizeSelector<M> {
    fn new(min_area: u64) -> Self {
        let lower_bound = if min_area > 0 {
            ((min_area - 1) as f64).sqrt() as u32 / M + 1
        } else {
            0
        };
        let mut selector = Self {
            lower_bound,
            upper_bound: None,
            current: 0,
        };
        selector.update_current();
        selector
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        match self.upper_bound {
            Some(upper) if self.lower_bound >= upper => None,
            _ => Some((M * self.current, M * self.current)),
        }
    }

    fn shrink(&mut self) {
        self.upper_bound = Some(self.current);
        self.update_current();
    }

    fn grow(&mut self) {
        self.lower_bound = self.current + 1;
        self.update_current();
    }
}

/// Tries square dimensions with a power of two side, growing until the rectangles fit.
#[derive(Clone, Copy, Debug)]
pub struct SquarePowerOfTwoSizeSelector {
    side: u32,
}

impl SizeSelector for SquarePowerOfTwoSizeSelector {
    fn new(min_area: u64) -> Self {
        let mut side = 1_u32;
        while u64::from(side) * u64::from(side) < min_area {
            side <<= 1;
        }
        Self { side }
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        (self.side > 0).then_some((self.side, self.side))
    }

    fn shrink(&mut self) {
        self.side = 0;
    }

    fn grow(&mut self) {
        self.side <<= 1;
    }
}

/// Tries power of two dimensions, alternately doubling the width and the height.
#[derive(Clone, Copy, Debug)]
pub struct PowerOfTwoSizeSelector {
    w: u32,
    h: u32,
}

impl SizeSelector for PowerOfTwoSizeSelector {
    fn new(min_area: u64) -> Self {
        let mut selector = Self { w: 1, h: 1 };
        while u64::from(selector.w) * u64::from(selector.h) < min_area {
            selector.grow();
        }
        selector
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        (self.w > 0 && self.h > 0).then_some((self.w, self.h))
    }

    fn shrink(&mut self) {
        self.w = 0;
        self.h = 0;
    }

    fn grow(&mut self) {
        if self.w == self.h {
            self.w <<= 1;
        } else {
            self.h = self.w;
        }
    }
}

fn with_spacing(rectangles: &[Rectangle], spacing: u32) -> Vec<Rectangle> {
    rectangles
        .iter()
        .map(|rect| Rectangle::new(0, 0, rect.w + spacing, rect.h + spacing))
        .collect()
}

fn copy_positions(rectangles: &mut [Rectangle], placed: &[Rectangle]) {
    for (rect, placed) in rectangles.iter_mut().zip(placed) {
        rect.x = placed.x;
        rect.y = placed.y;
    }
}

/// Packs `rectangles` into a `width` by `height` container, keeping `spacing` pixels between
/// them.
///
/// Returns the number of rectangles that did not fit.
pub fn pack_rectangles_into(
    rectangles: &mut [Rectangle],
    width: u32,
    height: u32,
    spacing: u32,
) -> usize {
    if spacing == 0 {
        return RectanglePacker::new(width, height).pack(rectangles);
    }
    let mut spaced = with_spacing(rectangles, spacing);
    let remaining = RectanglePacker::new(width + spacing, height + spacing).pack(&mut spaced);
    copy_positions(rectangles, &spaced);
    remaining
}

/// Packs `rectangles` into the smallest container the size selector `S` finds, keeping
/// `spacing` pixels between them.
///
/// Returns the container dimensions, or `None` if the search ended without a fit.
pub fn pack_rectangles<S: SizeSelector>(
    rectangles: &mut [Rectangle],
    spacing: u32,
) -> Option<(u32, u32)> {
    let total_area = rectangles
        .iter()
        .map(|rect| u64::from(rect.w) * u64::from(rect.h))
        .sum();
    let mut spaced = with_spacing(rectangles, spacing);
    let mut selector = S::new(total_area);
    let mut dimensions = None;
    while let Some((width, height)) = selector.dimensions() {
        let packed = RectanglePacker::new(width + spacing, height + spacing).pack(&mut spaced);
        if packed == 0 {
            dimensions = Some((width, height));
            copy_positions(rectangles, &spaced);
            selector.shrink();
        } else {
            selector.grow();
        }
    }
    dimensions
}
