// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Saving atlas images.

use std::io::Write;

use vello_msdf::Bitmap;

use crate::{ExportError, YDirection};

/// The file format of a saved atlas image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageFormat {
    /// 8-bit PNG, quantized with [`pixel_float_to_byte`].
    ///
    /// [`pixel_float_to_byte`]: vello_msdf::pixel_conversion::pixel_float_to_byte
    #[cfg(feature = "png")]
    #[default]
    Png,
    /// Raw native-endian 32-bit floats, row by row.
    #[cfg_attr(not(feature = "png"), default)]
    BinaryFloat,
}

/// Writes a byte bitmap with row zero at the bottom as a PNG image.
///
/// PNG images are stored top down, so the last row is written first.
#[cfg(feature = "png")]
pub fn save_png<W: Write, const N: usize>(
    writer: W,
    bitmap: &Bitmap<u8, N>,
) -> Result<(), ExportError> {
    let color = const {
        match N {
            1 => png::ColorType::Grayscale,
            3 => png::ColorType::Rgb,
            4 => png::ColorType::Rgba,
            _ => panic!("unsupported channel count"),
        }
    };
    let (width, height) = (bitmap.width(), bitmap.height());
    let mut encoder = png::Encoder::new(writer, width as u32, height as u32);
    encoder.set_color(color);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    let mut data = Vec::with_capacity(width * height * N);
    for y in (0..height).rev() {
        for x in 0..width {
            data.extend_from_slice(bitmap.pixel(x, y));
        }
    }
    writer.write_image_data(&data)?;
    writer.finish()?;
    Ok(())
}

/// Writes the raw samples of a float bitmap with row zero at the bottom.
///
/// With [`YDirection::TopDown`] the last row is written first.
pub fn save_binary_float<W: Write, const N: usize>(
    mut writer: W,
    bitmap: &Bitmap<f32, N>,
    y_direction: YDirection,
) -> Result<(), ExportError> {
    let row_len = bitmap.width() * N;
    if row_len == 0 {
        return Ok(());
    }
    let samples = bitmap.as_flattened();
    match y_direction {
        YDirection::BottomUp => writer.write_all(bytemuck::cast_slice(samples))?,
        YDirection::TopDown => {
            for row in samples.chunks_exact(row_len).rev() {
                writer.write_all(bytemuck::cast_slice(row))?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// Writes an atlas image in the given format.
///
/// The Y direction only applies to raw float output; PNG images are always top down.
pub fn save_image<W: Write, const N: usize>(
    writer: W,
    bitmap: &Bitmap<f32, N>,
    format: ImageFormat,
    y_direction: YDirection,
) -> Result<(), ExportError> {
    match format {
        #[cfg(feature = "png")]
        ImageFormat::Png => save_png(writer, &bitmap.to_bytes()),
        ImageFormat::BinaryFloat => save_binary_float(writer, bitmap, y_direction),
    }
}

#[cfg(test)]
mod tests {
    use super::{ImageFormat, save_binary_float, save_image};
    use crate::YDirection;
    use vello_msdf::Bitmap;

    #[test]
    fn binary_float_rows() {
        let bitmap = Bitmap::from_parts(2, 2, vec![[1.0_f32], [2.0], [3.0], [4.0]]);
        let mut out = Vec::new();
        save_binary_float(&mut out, &bitmap, YDirection::TopDown).unwrap();
        let samples: Vec<f32> = out
            .chunks_exact(4)
            .map(|bytes| f32::from_ne_bytes(bytes.try_into().unwrap()))
            .collect();
        assert_eq!(samples, [3.0, 4.0, 1.0, 2.0]);

        let mut out = Vec::new();
        save_image(&mut out, &bitmap, ImageFormat::BinaryFloat, YDirection::BottomUp).unwrap();
        assert_eq!(out.len(), 16);
        assert_eq!(&out[..4], &1.0_f32.to_ne_bytes());
    }

    #[cfg(feature = "png")]
    #[test]
    fn png_is_top_down() {
        let bitmap = Bitmap::from_parts(1, 2, vec![[0.0_f32, 0.0, 0.0], [1.0, 0.5, 0.0]]);
        let mut out = Vec::new();
        save_image(&mut out, &bitmap, ImageFormat::Png, YDirection::BottomUp).unwrap();

        let decoder = png::Decoder::new(out.as_slice());
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (1, 2));
        assert_eq!(info.color_type, png::ColorType::Rgb);
        assert_eq!(&buf[..info.buffer_size()], &[255, 128, 0, 0, 0, 0]);
    }
}
