// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion between floating point and 8-bit pixel values.

use crate::bitmap::Bitmap;

/// Quantizes a value in `[0, 1]` to a byte, mapping `[k / 256, (k + 1) / 256)` to `k`.
#[inline]
pub fn pixel_float_to_byte(x: f32) -> u8 {
    // The float to int cast saturates, NaN becomes zero.
    (256.0 * x).clamp(0.0, 255.0) as u8
}

/// Maps a byte back to `[0, 1]`.
#[inline]
pub fn pixel_byte_to_float(x: u8) -> f32 {
    f32::from(x) / 255.0
}

impl<const N: usize> Bitmap<f32, N> {
    /// Quantizes every channel with [`pixel_float_to_byte`].
    pub fn to_bytes(&self) -> Bitmap<u8, N> {
        self.map(|pixel| pixel.map(pixel_float_to_byte))
    }
}

impl<const N: usize> Bitmap<u8, N> {
    /// Expands every channel with [`pixel_byte_to_float`].
    pub fn to_floats(&self) -> Bitmap<f32, N> {
        self.map(|pixel| pixel.map(pixel_byte_to_float))
    }
}
