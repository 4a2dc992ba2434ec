// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering of packed glyphs into the atlas image.

use core::num::NonZeroUsize;

use vello_msdf::error_correction::msdf_error_correction;
use vello_msdf::rasterization::distance_sign_correction;
use vello_msdf::{
    Bitmap, DistanceCheckMode, ErrorCorrectionMode, FillRule, MsdfGeneratorConfig,
    generate_msdf, generate_mtsdf, generate_psdf, generate_sdf,
};

use crate::atlas_storage::{AtlasChannel, BitmapAtlasStorage};
use crate::glyph_box::GlyphBox;
use crate::glyph_geometry::GlyphGeometry;

/// Glyph outlines are filled with the non-zero rule after the scanline pass.
const GLYPH_FILL_RULE: FillRule = FillRule::NonZero;

/// Options for rendering a single glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GeneratorAttributes {
    /// Generator and error correction options.
    pub config: MsdfGeneratorConfig,
    /// Fix the sign of the distances with a scanline pass over the outline afterwards.
    ///
    /// This makes glyphs with self-intersecting or wrongly wound contours render correctly.
    pub scanline_pass: bool,
}

/// Renders the distance field of a glyph into a bitmap of the size of its box.
pub type GeneratorFunction<const N: usize> =
    fn(&mut Bitmap<f32, N>, &GlyphGeometry, &GeneratorAttributes);

/// Renders a true signed distance field.
pub fn sdf_generator(
    output: &mut Bitmap<f32, 1>,
    glyph: &GlyphGeometry,
    attributes: &GeneratorAttributes,
) {
    let projection = glyph.box_projection();
    generate_sdf(
        output,
        glyph.shape(),
        &projection,
        glyph.box_range(),
        &attributes.config.generator,
    );
    if attributes.scanline_pass {
        distance_sign_correction(output, glyph.shape(), &projection, GLYPH_FILL_RULE);
    }
}

/// Renders a signed pseudo-distance field.
pub fn psdf_generator(
    output: &mut Bitmap<f32, 1>,
    glyph: &GlyphGeometry,
    attributes: &GeneratorAttributes,
) {
    let projection = glyph.box_projection();
    generate_psdf(
        output,
        glyph.shape(),
        &projection,
        glyph.box_range(),
        &attributes.config.generator,
    );
    if attributes.scanline_pass {
        distance_sign_correction(output, glyph.shape(), &projection, GLYPH_FILL_RULE);
    }
}

/// Renders a multi-channel signed distance field. The glyph's edges must be colored.
pub fn msdf_generator(
    output: &mut Bitmap<f32, 3>,
    glyph: &GlyphGeometry,
    attributes: &GeneratorAttributes,
) {
    multi_channel(output, glyph, attributes, generate_msdf);
}

/// Renders a multi-channel signed distance field with the true distance in alpha. The
/// glyph's edges must be colored.
pub fn mtsdf_generator(
    output: &mut Bitmap<f32, 4>,
    glyph: &GlyphGeometry,
    attributes: &GeneratorAttributes,
) {
    multi_channel(output, glyph, attributes, generate_mtsdf);
}

type MultiChannelGenerator<const N: usize> = fn(
    &mut Bitmap<f32, N>,
    &vello_msdf::Shape,
    &vello_msdf::Projection,
    f64,
    &MsdfGeneratorConfig,
);

fn multi_channel<const N: usize>(
    output: &mut Bitmap<f32, N>,
    glyph: &GlyphGeometry,
    attributes: &GeneratorAttributes,
    generate: MultiChannelGenerator<N>,
) {
    let projection = glyph.box_projection();
    let range = glyph.box_range();
    let mut config = attributes.config;
    if !attributes.scanline_pass {
        generate(output, glyph.shape(), &projection, range, &config);
        return;
    }
    // Artifacts can only be judged once the signs are final.
    config.error_correction.mode = ErrorCorrectionMode::Disabled;
    generate(output, glyph.shape(), &projection, range, &config);
    distance_sign_correction(output, glyph.shape(), &projection, GLYPH_FILL_RULE);
    let mode = attributes.config.error_correction.mode;
    if mode != ErrorCorrectionMode::Disabled {
        config.error_correction.mode = mode;
        config.error_correction.distance_check_mode = DistanceCheckMode::DoNotCheckDistance;
        msdf_error_correction(output, glyph.shape(), &projection, range, &config);
    }
}

/// Renders glyphs straight into an in-memory atlas.
///
/// Glyphs are rendered in parallel, each on a single thread.
#[derive(Debug)]
pub struct ImmediateAtlasGenerator<T, const N: usize> {
    storage: BitmapAtlasStorage<T, N>,
    generator: GeneratorFunction<N>,
    attributes: GeneratorAttributes,
    layout: Vec<GlyphBox>,
    num_threads: Option<NonZeroUsize>,
}

impl<T: AtlasChannel, const N: usize> ImmediateAtlasGenerator<T, N> {
    /// Create a generator for an atlas of the given size.
    pub fn new(width: usize, height: usize, generator: GeneratorFunction<N>) -> Self {
        Self {
            storage: BitmapAtlasStorage::new(width, height),
            generator,
            attributes: GeneratorAttributes::default(),
            layout: Vec::new(),
            num_threads: None,
        }
    }

    /// Sets the options glyphs are rendered with.
    pub fn set_attributes(&mut self, attributes: GeneratorAttributes) {
        self.attributes = attributes;
    }

    /// Sets the number of worker threads. `None` uses the available parallelism.
    pub fn set_thread_count(&mut self, num_threads: Option<NonZeroUsize>) {
        self.num_threads = num_threads;
    }

    /// Renders `glyphs` at their placed boxes and appends them to the layout.
    pub fn generate(&mut self, glyphs: &[GlyphGeometry]) {
        self.layout.extend(glyphs.iter().map(GlyphGeometry::glyph_box));
        let mut attributes = self.attributes;
        // Glyphs are the unit of parallelism.
        attributes.config.generator.num_threads = NonZeroUsize::new(1);
        let generator = self.generator;
        let render = |glyph: &GlyphGeometry| -> Option<(usize, usize, Bitmap<f32, N>)> {
            let rect = glyph.box_rect();
            if glyph.is_whitespace() || rect.w == 0 || rect.h == 0 {
                return None;
            }
            let mut bitmap = Bitmap::new(rect.w as usize, rect.h as usize);
            generator(&mut bitmap, glyph, &attributes);
            Some((rect.x as usize, rect.y as usize, bitmap))
        };
        for (x, y, bitmap) in self.render_all(glyphs, render) {
            self.storage.put(x, y, &bitmap);
        }
    }

    fn render_all<R, F>(&self, glyphs: &[GlyphGeometry], render: F) -> Vec<R>
    where
        R: Send,
        F: Fn(&GlyphGeometry) -> Option<R> + Sync + Send,
    {
        if self.num_threads.is_none_or(|n| n.get() > 1) {
            use rayon::ThreadPoolBuilder;
            use rayon::prelude::*;

            let mut builder = ThreadPoolBuilder::new();
            if let Some(n) = self.num_threads {
                builder = builder.num_threads(n.get());
            }
            match builder.build() {
                Ok(thread_pool) => {
                    return thread_pool.install(|| glyphs.par_iter().filter_map(&render).collect());
                }
                Err(e) => {
                    log::warn!("Failed to build a thread pool, rendering glyphs serially: {e}");
                }
            }
        }
        glyphs.iter().filter_map(render).collect()
    }

    /// Resizes the atlas, keeping its content.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.storage.resize(width, height);
    }

    /// The atlas image.
    pub fn atlas_storage(&self) -> &BitmapAtlasStorage<T, N> {
        &self.storage
    }

    /// The layout of all generated glyphs, in generation order.
    pub fn layout(&self) -> &[GlyphBox] {
        &self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::{
        GeneratorAttributes, ImmediateAtlasGenerator, msdf_generator, mtsdf_generator,
        sdf_generator,
    };
    use crate::glyph_geometry::GlyphGeometry;
    use crate::tight_atlas_packer::TightAtlasPacker;
    use core::num::NonZeroUsize;
    use vello_msdf::Shape;
    use vello_msdf::kurbo::{Rect, Shape as _};
    use vello_msdf::math::median;

    fn unit_squares(count: usize) -> Vec<GlyphGeometry> {
        let mut glyphs: Vec<_> = (0..count)
            .map(|_| {
                let shape = Shape::from_path(Rect::new(0.0, 0.0, 1.0, 1.0).path_elements(0.1));
                GlyphGeometry::new(shape, 1.0, 1.0)
            })
            .collect();
        glyphs.push(GlyphGeometry::new(Shape::new(), 1.0, 0.5));
        for glyph in &mut glyphs {
            glyph.edge_coloring(3.0, 0);
        }
        // Boxes of 16 * 1.25 + 1 = 21 pixels, with the square's center at pixel 10.
        let mut packer = TightAtlasPacker::new();
        packer.set_scale(16.0);
        packer.set_pixel_range(4.0);
        packer.pack(&mut glyphs).unwrap();
        glyphs
    }

    #[test]
    fn sdf_atlas() {
        let glyphs = unit_squares(2);
        for threads in [None, NonZeroUsize::new(1)] {
            let mut generator = ImmediateAtlasGenerator::<u8, 1>::new(64, 64, sdf_generator);
            generator.set_thread_count(threads);
            generator.generate(&glyphs);
            assert_eq!(generator.layout().len(), 3);
            let atlas = generator.atlas_storage().bitmap();
            for glyph in &glyphs[..2] {
                let rect = glyph.box_rect();
                let (x, y) = (rect.x as usize, rect.y as usize);
                assert_eq!(atlas.pixel(x + 10, y + 10), &[255]);
                assert_eq!(atlas.pixel(x, y), &[0]);
            }
        }
    }

    #[test]
    fn multi_channel_atlas_with_scanline_pass() {
        let glyphs = unit_squares(1);
        let attributes = GeneratorAttributes {
            scanline_pass: true,
            ..Default::default()
        };
        let mut msdf = ImmediateAtlasGenerator::<f32, 3>::new(32, 32, msdf_generator);
        msdf.set_attributes(attributes);
        msdf.generate(&glyphs);
        let mut mtsdf = ImmediateAtlasGenerator::<f32, 4>::new(32, 32, mtsdf_generator);
        mtsdf.set_attributes(attributes);
        mtsdf.generate(&glyphs);

        let rect = glyphs[0].box_rect();
        let (x, y) = (rect.x as usize, rect.y as usize);
        let [r, g, b] = *msdf.atlas_storage().bitmap().pixel(x + 10, y + 10);
        assert!(median(r, g, b) > 2.0, "{r} {g} {b}");
        let [r, g, b, a] = *mtsdf.atlas_storage().bitmap().pixel(x + 10, y + 10);
        assert!(median(r, g, b) > 2.0);
        assert!((a - 2.5).abs() < 1e-4, "{a}");
        let [r, g, b, a] = *mtsdf.atlas_storage().bitmap().pixel(x, y);
        assert!(median(r, g, b) < 0.5 && a < 0.0);
    }
}
