// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Storage of the atlas image.

use vello_msdf::Bitmap;
use vello_msdf::pixel_conversion::pixel_float_to_byte;

/// A channel type the atlas can be stored as.
pub trait AtlasChannel: Copy + Default + Send + Sync {
    /// Converts a generated distance value.
    fn from_distance(value: f32) -> Self;
}

impl AtlasChannel for f32 {
    #[inline]
    fn from_distance(value: f32) -> Self {
        value
    }
}

impl AtlasChannel for u8 {
    #[inline]
    fn from_distance(value: f32) -> Self {
        pixel_float_to_byte(value)
    }
}

/// An atlas image held in memory, with row zero at the bottom.
#[derive(Clone, Debug)]
pub struct BitmapAtlasStorage<T, const N: usize> {
    bitmap: Bitmap<T, N>,
}

impl<T: AtlasChannel, const N: usize> BitmapAtlasStorage<T, N> {
    /// Create an empty atlas of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            bitmap: Bitmap::new(width, height),
        }
    }

    /// Resizes the atlas, keeping the content of the overlapping area.
    pub fn resize(&mut self, width: usize, height: usize) {
        let mut bitmap = Bitmap::new(width, height);
        copy_rect(&self.bitmap, (0, 0), &mut bitmap, (0, 0), (width, height));
        self.bitmap = bitmap;
    }

    /// Stores a generated glyph bitmap with its bottom left corner at `(x, y)`.
    ///
    /// Parts outside of the atlas are dropped.
    pub fn put(&mut self, x: usize, y: usize, glyph: &Bitmap<f32, N>) {
        let w = glyph.width().min(self.bitmap.width().saturating_sub(x));
        let h = glyph.height().min(self.bitmap.height().saturating_sub(y));
        for row in 0..h {
            for col in 0..w {
                *self.bitmap.pixel_mut(x + col, y + row) =
                    glyph.pixel(col, row).map(T::from_distance);
            }
        }
    }

    /// Copies the area with its bottom left corner at `(x, y)` into `out`.
    pub fn get(&self, x: usize, y: usize, out: &mut Bitmap<T, N>) {
        let size = (out.width(), out.height());
        copy_rect(&self.bitmap, (x, y), out, (0, 0), size);
    }

    /// The atlas image.
    pub fn bitmap(&self) -> &Bitmap<T, N> {
        &self.bitmap
    }

    /// Takes the atlas image.
    pub fn into_bitmap(self) -> Bitmap<T, N> {
        self.bitmap
    }
}

impl<T, const N: usize> From<Bitmap<T, N>> for BitmapAtlasStorage<T, N> {
    fn from(bitmap: Bitmap<T, N>) -> Self {
        Self { bitmap }
    }
}

/// Copies a `w` by `h` area, clipped to both bitmaps.
fn copy_rect<T: Copy, const N: usize>(
    src: &Bitmap<T, N>,
    (src_x, src_y): (usize, usize),
    dst: &mut Bitmap<T, N>,
    (dst_x, dst_y): (usize, usize),
    (w, h): (usize, usize),
) {
    let w = w
        .min(src.width().saturating_sub(src_x))
        .min(dst.width().saturating_sub(dst_x));
    let h = h
        .min(src.height().saturating_sub(src_y))
        .min(dst.height().saturating_sub(dst_y));
    for row in 0..h {
        for col in 0..w {
            *dst.pixel_mut(dst_x + col, dst_y + row) = *src.pixel(src_x + col, src_y + row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BitmapAtlasStorage;
    use vello_msdf::Bitmap;

    #[test]
    fn put_converts_and_clips() {
        let mut storage = BitmapAtlasStorage::<u8, 1>::new(4, 3);
        let glyph = Bitmap::from_parts(2, 2, vec![[0.0], [0.5], [1.0], [2.0]]);
        storage.put(1, 0, &glyph);
        storage.put(3, 2, &Bitmap::from_parts(2, 2, vec![[1.0]; 4]));
        let bitmap = storage.bitmap();
        assert_eq!(bitmap.pixel(1, 0), &[0]);
        assert_eq!(bitmap.pixel(2, 0), &[128]);
        assert_eq!(bitmap.pixel(1, 1), &[255]);
        assert_eq!(bitmap.pixel(3, 2), &[255]);
        assert_eq!(bitmap.pixel(0, 0), &[0]);
        assert_eq!(bitmap.pixel(3, 1), &[0]);
        assert_eq!(bitmap.pixel(2, 2), &[0]);
    }

    #[test]
    fn resize_keeps_content() {
        let mut storage = BitmapAtlasStorage::<f32, 3>::new(2, 2);
        storage.put(0, 0, &Bitmap::from_parts(2, 2, vec![[0.25; 3]; 4]));
        storage.resize(3, 1);
        let mut out = Bitmap::new(3, 1);
        storage.get(0, 0, &mut out);
        assert_eq!(out.pixels(), &[[0.25; 3], [0.25; 3], [0.0; 3]]);
    }
}
