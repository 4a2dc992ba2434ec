// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A simple owned bitmap with a fixed number of channels per pixel.

/// A row-major bitmap of `width * height` pixels with `N` channels of type `T` each.
///
/// Row 0 is the bottom row of the image when the shape's Y axis points up, and the top row
/// otherwise. Distance field generators use [`Shape::inverse_y_axis`] to decide which.
///
/// [`Shape::inverse_y_axis`]: crate::shape::Shape::inverse_y_axis
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap<T, const N: usize> {
    width: usize,
    height: usize,
    pixels: Vec<[T; N]>,
}

impl<T: Copy + Default, const N: usize> Bitmap<T, N> {
    /// Create a new bitmap with all channels set to their default value.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![[T::default(); N]; width * height],
        }
    }
}

impl<T, const N: usize> Bitmap<T, N> {
    /// Create a bitmap from existing pixel data.
    ///
    /// # Panics
    ///
    /// If `pixels` does not hold exactly `width * height` pixels.
    pub fn from_parts(width: usize, height: usize, pixels: Vec<[T; N]>) -> Self {
        assert_eq!(
            pixels.len(),
            width * height,
            "pixel data does not match the bitmap dimensions"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Width of the bitmap in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the bitmap in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The channels of the pixel at `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[T; N] {
        &self.pixels[self.width * y + x]
    }

    /// Mutable access to the channels of the pixel at `(x, y)`.
    #[inline]
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [T; N] {
        &mut self.pixels[self.width * y + x]
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> &[[T; N]] {
        &self.pixels
    }

    /// All pixels in row-major order.
    pub fn pixels_mut(&mut self) -> &mut [[T; N]] {
        &mut self.pixels
    }

    /// Iterates over the rows of the bitmap, starting at row 0.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [[T; N]]> {
        self.pixels.chunks_mut(self.width.max(1))
    }

    /// All channels of all pixels as one flat slice.
    pub fn as_flattened(&self) -> &[T] {
        self.pixels.as_flattened()
    }

    /// Consumes the bitmap, returning its pixel data.
    pub fn into_pixels(self) -> Vec<[T; N]> {
        self.pixels
    }

    /// Applies `f` to every pixel, producing a new bitmap of the same size.
    pub fn map<U, const M: usize>(&self, f: impl FnMut(&[T; N]) -> [U; M]) -> Bitmap<U, M> {
        Bitmap {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Bitmap;

    #[test]
    fn pixel_addressing_is_row_major() {
        let mut bitmap = Bitmap::<f32, 3>::new(4, 2);
        *bitmap.pixel_mut(1, 1) = [1.0, 2.0, 3.0];
        assert_eq!(bitmap.pixels()[5], [1.0, 2.0, 3.0]);
        assert_eq!(bitmap.as_flattened()[15..18], [1.0, 2.0, 3.0]);
    }

    #[test]
    fn map_changes_channel_count() {
        let bitmap = Bitmap::from_parts(2, 1, vec![[0.25_f32, 0.5, 0.75], [1.0, 0.0, 0.0]]);
        let medians = bitmap.map(|p| [p[1]]);
        assert_eq!(medians.pixels(), &[[0.5], [0.0]]);
    }

    #[test]
    #[should_panic(expected = "pixel data does not match")]
    fn from_parts_checks_size() {
        let _ = Bitmap::<u8, 1>::from_parts(2, 2, vec![[0]; 3]);
    }
}
