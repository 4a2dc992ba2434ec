// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Correction of interpolation artifacts in multi-channel distance fields.
//!
//! When a multi-channel field is sampled with bilinear filtering, the median of the
//! interpolated channels can differ wildly from the interpolated distance between two texels
//! whose channels disagree. The error correction pass finds texels that cause such
//! artifacts, marks them in a stencil and finally replaces all their color channels with
//! their median, giving up the sharp corner at that texel in exchange for a correct fill.

use core::num::NonZeroUsize;

use crate::bitmap::Bitmap;
use crate::contour_combiners::{
    ContourCombiner, OverlappingContourCombiner, SimpleContourCombiner,
};
use crate::dispatch::for_each_row;
use crate::distance_finder::ShapeDistanceFinder;
use crate::edge_color::EdgeColor;
use crate::edge_selectors::PerpendicularDistanceSelector;
use crate::equation::solve_quadratic;
use crate::generator::MsdfGeneratorConfig;
use crate::kurbo::{Point, Vec2};
use crate::math::{median, mix_f32};
use crate::projection::Projection;
use crate::shape::Shape;

/// Interpolation parameters closer than this to a texel are ignored, since two channels are
/// usually equal right at a texel.
const ARTIFACT_T_EPSILON: f64 = 0.01;
const PROTECTION_RADIUS_TOLERANCE: f64 = 1.001;

const CLASSIFIER_FLAG_CANDIDATE: u8 = 0x01;
const CLASSIFIER_FLAG_ARTIFACT: u8 = 0x02;

/// Which texels the error correction is allowed to change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorCorrectionMode {
    /// Skips error correction entirely.
    Disabled,
    /// Corrects all discontinuities of the distance field regardless of whether edges are
    /// adversely affected.
    Indiscriminate,
    /// Corrects artifacts at edges and other discontinuous distances only if doing so does
    /// not affect edges or corners.
    #[default]
    EdgePriority,
    /// Only corrects artifacts at edges.
    EdgeOnly,
}

/// When to compute the exact distance to the shape to confirm suspected artifacts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DistanceCheckMode {
    /// Never computes exact shape distance.
    DoNotCheckDistance,
    /// Only computes exact shape distance at edges. Provides a good balance between speed
    /// and precision.
    #[default]
    CheckDistanceAtEdge,
    /// Computes and compares the exact shape distance for each suspected artifact.
    AlwaysCheckDistance,
}

/// Configuration of the multi-channel error correction pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErrorCorrectionConfig {
    /// Which texels may be corrected.
    pub mode: ErrorCorrectionMode,
    /// When to confirm artifacts against the exact distance.
    pub distance_check_mode: DistanceCheckMode,
    /// The minimum ratio between the actual and maximum expected distance delta to be
    /// considered an error.
    pub min_deviation_ratio: f64,
    /// The minimum ratio between the pre-correction distance error and the post-correction
    /// distance error. Only used with an exact distance check.
    pub min_improve_ratio: f64,
}

impl ErrorCorrectionConfig {
    /// Default value of [`ErrorCorrectionConfig::min_deviation_ratio`].
    pub const DEFAULT_MIN_DEVIATION_RATIO: f64 = 1.111_111_111_111_111_1;
    /// Default value of [`ErrorCorrectionConfig::min_improve_ratio`].
    pub const DEFAULT_MIN_IMPROVE_RATIO: f64 = 1.111_111_111_111_111_1;
}

impl Default for ErrorCorrectionConfig {
    fn default() -> Self {
        Self {
            mode: ErrorCorrectionMode::default(),
            distance_check_mode: DistanceCheckMode::default(),
            min_deviation_ratio: Self::DEFAULT_MIN_DEVIATION_RATIO,
            min_improve_ratio: Self::DEFAULT_MIN_IMPROVE_RATIO,
        }
    }
}

/// The error correction engine, working on a stencil of per-texel flags.
///
/// The individual passes can be combined freely; [`msdf_error_correction`] runs them in the
/// order given by an [`ErrorCorrectionConfig`].
#[derive(Debug)]
pub struct MsdfErrorCorrection<'a> {
    stencil: &'a mut Bitmap<u8, 1>,
    projection: Projection,
    inv_range: f64,
    min_deviation_ratio: f64,
    min_improve_ratio: f64,
}

impl<'a> MsdfErrorCorrection<'a> {
    /// Stencil flag of texels that will be corrected.
    pub const ERROR: u8 = 1;
    /// Stencil flag of texels that only get corrected if they would invert the fill.
    pub const PROTECTED: u8 = 2;

    /// Create an engine for distance fields of `width` by `height` texels, generated with
    /// `projection` and `range`.
    ///
    /// The stencil is cleared, and reallocated if its size differs. All distance fields passed
    /// to the engine must have the given size.
    pub fn new(
        stencil: &'a mut Bitmap<u8, 1>,
        width: usize,
        height: usize,
        projection: Projection,
        range: f64,
    ) -> Self {
        if stencil.width() == width && stencil.height() == height {
            stencil.pixels_mut().fill([0]);
        } else {
            *stencil = Bitmap::new(width, height);
        }
        Self {
            stencil,
            projection,
            inv_range: 1.0 / range,
            min_deviation_ratio: ErrorCorrectionConfig::DEFAULT_MIN_DEVIATION_RATIO,
            min_improve_ratio: ErrorCorrectionConfig::DEFAULT_MIN_IMPROVE_RATIO,
        }
    }

    pub fn set_min_deviation_ratio(&mut self, min_deviation_ratio: f64) {
        self.min_deviation_ratio = min_deviation_ratio;
    }

    pub fn set_min_improve_ratio(&mut self, min_improve_ratio: f64) {
        self.min_improve_ratio = min_improve_ratio;
    }

    /// The current stencil.
    pub fn stencil(&self) -> &Bitmap<u8, 1> {
        self.stencil
    }

    /// Flags the four texels around every corner of the shape (where the edge color changes)
    /// as protected.
    pub fn protect_corners(&mut self, shape: &Shape) {
        let (width, height) = (self.stencil.width(), self.stencil.height());
        for contour in &shape.contours {
            let Some(mut prev) = contour.edges.last() else {
                continue;
            };
            for edge in &contour.edges {
                let common_color = prev.color & edge.color;
                prev = edge;
                if !common_color.is_single_channel() {
                    continue;
                }
                let mut p = self.projection.project(edge.point(0.0));
                if shape.inverse_y_axis {
                    p.y = height as f64 - p.y;
                }
                let l = (p.x - 0.5).floor();
                let b = (p.y - 0.5).floor();
                for (x, y) in [(l, b), (l + 1.0, b), (l, b + 1.0), (l + 1.0, b + 1.0)] {
                    if x >= 0.0 && y >= 0.0 && x < width as f64 && y < height as f64 {
                        self.stencil.pixel_mut(x as usize, y as usize)[0] |= Self::PROTECTED;
                    }
                }
            }
        }
    }

    /// Flags texels as protected when the channels that are not their median contribute to
    /// an edge between them and a neighbour.
    pub fn protect_edges<const N: usize>(&mut self, sdf: &Bitmap<f32, N>) {
        const { assert!(N >= 3, "error correction needs at least three channels") };
        let (width, height) = (sdf.width(), sdf.height());
        let radius = |v: Vec2| {
            (PROTECTION_RADIUS_TOLERANCE * self.projection.unproject_vector(v).hypot()) as f32
        };
        let inv_range = self.inv_range;
        let horizontal = radius(Vec2::new(inv_range, 0.0));
        let vertical = radius(Vec2::new(0.0, inv_range));
        let diagonal = radius(Vec2::new(inv_range, inv_range));

        let mut protect_pair = |(ax, ay): (usize, usize), (bx, by): (usize, usize), radius| {
            let a = rgb(sdf.pixel(ax, ay));
            let b = rgb(sdf.pixel(bx, by));
            let am = median(a[0], a[1], a[2]);
            let bm = median(b[0], b[1], b[2]);
            if (am - 0.5).abs() + (bm - 0.5).abs() < radius {
                let mask = edge_between_texels(&a, &b);
                protect_extreme_channels(&mut self.stencil.pixel_mut(ax, ay)[0], &a, am, mask);
                protect_extreme_channels(&mut self.stencil.pixel_mut(bx, by)[0], &b, bm, mask);
            }
        };
        for y in 0..height {
            for x in 1..width {
                protect_pair((x - 1, y), (x, y), horizontal);
            }
        }
        for y in 1..height {
            for x in 0..width {
                protect_pair((x, y - 1), (x, y), vertical);
            }
        }
        for y in 1..height {
            for x in 1..width {
                protect_pair((x - 1, y - 1), (x, y), diagonal);
                protect_pair((x, y - 1), (x - 1, y), diagonal);
            }
        }
    }

    /// Flags every texel as protected.
    pub fn protect_all(&mut self) {
        for flags in self.stencil.pixels_mut() {
            flags[0] |= Self::PROTECTED;
        }
    }

    /// Flags texels that are expected to cause interpolation artifacts, judging from the
    /// distance field alone.
    pub fn find_errors<const N: usize>(&mut self, sdf: &Bitmap<f32, N>) {
        const { assert!(N >= 3, "error correction needs at least three channels") };
        let spans = self.spans();
        for y in 0..sdf.height() {
            for x in 0..sdf.width() {
                let flags = &mut self.stencil.pixel_mut(x, y)[0];
                let mut classifier = BaseArtifactClassifier {
                    span: 0.0,
                    protected: *flags & Self::PROTECTED != 0,
                };
                if texel_has_artifact(&mut classifier, &spans, sdf, x, y) {
                    *flags |= Self::ERROR;
                }
            }
        }
    }

    /// Flags texels whose correction brings the interpolated distance closer to the exact
    /// distance to `shape`.
    ///
    /// Texels already flagged as errors are skipped. Rows are processed in parallel, each
    /// worker with its own distance finder using the combiner `C`.
    pub fn find_errors_with_shape<C, const N: usize>(
        &mut self,
        sdf: &Bitmap<f32, N>,
        shape: &Shape,
        num_threads: Option<NonZeroUsize>,
    ) where
        C: ContourCombiner<Selector = PerpendicularDistanceSelector>,
    {
        const { assert!(N >= 3, "error correction needs at least three channels") };
        let spans = self.spans();
        let (width, height) = (sdf.width(), sdf.height());
        let projection = self.projection;
        let inv_range = self.inv_range;
        let min_improve_ratio = self.min_improve_ratio;
        // Steps between texels, in shape space and following the rows of the bitmap.
        let mut texel_size = projection.unproject_vector(Vec2::new(1.0, 1.0));
        if shape.inverse_y_axis {
            texel_size.y = -texel_size.y;
        }
        for_each_row(
            self.stencil.pixels_mut(),
            width,
            num_threads,
            || ShapeArtifactClassifier::<C, N> {
                base: BaseArtifactClassifier {
                    span: 0.0,
                    protected: false,
                },
                direction: Vec2::ZERO,
                finder: ShapeDistanceFinder::new(shape),
                sdf,
                inv_range,
                texel_size,
                min_improve_ratio,
                shape_coord: Point::ZERO,
                sdf_coord: Point::ZERO,
                msd: [0.0; 3],
            },
            |classifier, row, stencil_row| {
                let y = if shape.inverse_y_axis {
                    height - row - 1
                } else {
                    row
                };
                let right_to_left = y % 2 == 1;
                for col in 0..width {
                    let x = if right_to_left { width - col - 1 } else { col };
                    let flags = &mut stencil_row[x][0];
                    if *flags & Self::ERROR != 0 {
                        continue;
                    }
                    classifier.shape_coord =
                        projection.unproject(Point::new(x as f64 + 0.5, y as f64 + 0.5));
                    classifier.sdf_coord = Point::new(x as f64 + 0.5, row as f64 + 0.5);
                    classifier.msd = rgb(sdf.pixel(x, row));
                    classifier.base.protected = *flags & Self::PROTECTED != 0;
                    if texel_has_artifact(classifier, &spans, sdf, x, row) {
                        *flags |= Self::ERROR;
                    }
                }
            },
        );
    }

    /// Replaces the color channels of every texel flagged as an error with their median.
    pub fn apply<const N: usize>(&self, sdf: &mut Bitmap<f32, N>) {
        const { assert!(N >= 3, "error correction needs at least three channels") };
        let mut corrected = 0_usize;
        for (texel, flags) in sdf.pixels_mut().iter_mut().zip(self.stencil.pixels()) {
            if flags[0] & Self::ERROR != 0 {
                let m = median(texel[0], texel[1], texel[2]);
                texel[..3].fill(m);
                corrected += 1;
            }
        }
        log::debug!(
            "Error correction changed {corrected} of {} texels",
            self.stencil.pixels().len()
        );
    }

    /// The largest expected value deltas between horizontally, vertically and diagonally
    /// adjacent texels.
    fn spans(&self) -> Spans {
        let span = |v: Vec2| self.min_deviation_ratio * self.projection.unproject_vector(v).hypot();
        Spans {
            horizontal: span(Vec2::new(self.inv_range, 0.0)),
            vertical: span(Vec2::new(0.0, self.inv_range)),
            diagonal: span(Vec2::new(self.inv_range, self.inv_range)),
        }
    }
}

struct Spans {
    horizontal: f64,
    vertical: f64,
    diagonal: f64,
}

#[inline]
fn rgb<const N: usize>(texel: &[f32; N]) -> [f32; 3] {
    [texel[0], texel[1], texel[2]]
}

/// Whether `channel` contributes to an edge between the texels `a` and `b`.
fn edge_between_texels_channel(a: &[f32; 3], b: &[f32; 3], channel: usize) -> bool {
    // Where the channel crosses 0.5 between the texels.
    let t = (f64::from(a[channel]) - 0.5) / f64::from(a[channel] - b[channel]);
    if t > 0.0 && t < 1.0 {
        let c = [
            mix_f32(a[0], b[0], t),
            mix_f32(a[1], b[1], t),
            mix_f32(a[2], b[2], t),
        ];
        return median(c[0], c[1], c[2]) == c[channel];
    }
    false
}

/// The channels that contribute to an edge between the texels `a` and `b`.
fn edge_between_texels(a: &[f32; 3], b: &[f32; 3]) -> EdgeColor {
    [EdgeColor::RED, EdgeColor::GREEN, EdgeColor::BLUE]
        .into_iter()
        .enumerate()
        .filter(|&(channel, _)| edge_between_texels_channel(a, b, channel))
        .fold(EdgeColor::BLACK, |mask, (_, color)| mask | color)
}

/// Protects a texel if one of its channels in `mask` is not its median `m`.
fn protect_extreme_channels(flags: &mut u8, msd: &[f32; 3], m: f32, mask: EdgeColor) {
    if (0..3).any(|channel| mask.has_channel(channel) && msd[channel] != m) {
        *flags |= MsdfErrorCorrection::PROTECTED;
    }
}

/// Decides whether an interpolated median value indicates an artifact.
trait ArtifactClassifier {
    /// Prepares the classifier for the neighbour in `direction`, for which values may deviate
    /// by `span` over a full texel.
    fn look_towards(&mut self, direction: Vec2, span: f64);

    /// Tests the median `xm` interpolated at `xt` against the range spanned by `am` at `at`
    /// and `bm` at `bt`, returning classifier flags.
    fn range_test(&self, at: f64, bt: f64, xt: f64, am: f32, bm: f32, xm: f32) -> u8;

    /// Whether the combined flags of the range tests at `t` indicate an artifact.
    fn evaluate(&mut self, t: f64, m: f32, flags: u8) -> bool;
}

/// Recognizes artifacts from the contents of the distance field alone.
#[derive(Clone, Copy, Debug)]
struct BaseArtifactClassifier {
    span: f64,
    protected: bool,
}

impl BaseArtifactClassifier {
    fn classify_range(&self, at: f64, bt: f64, xt: f64, am: f32, bm: f32, xm: f32) -> u8 {
        // Protected texels only count fill inversions, others any median outside its bounds.
        let inverted = (am > 0.5 && bm > 0.5 && xm <= 0.5) || (am < 0.5 && bm < 0.5 && xm >= 0.5);
        if inverted || (!self.protected && median(am, bm, xm) != xm) {
            let ax_span = (xt - at) * self.span;
            let bx_span = (bt - xt) * self.span;
            let (am, bm, xm) = (f64::from(am), f64::from(bm), f64::from(xm));
            if xm < am - ax_span || xm > am + ax_span || xm < bm - bx_span || xm > bm + bx_span {
                return CLASSIFIER_FLAG_CANDIDATE | CLASSIFIER_FLAG_ARTIFACT;
            }
            return CLASSIFIER_FLAG_CANDIDATE;
        }
        0
    }
}

impl ArtifactClassifier for BaseArtifactClassifier {
    fn look_towards(&mut self, _direction: Vec2, span: f64) {
        self.span = span;
    }

    fn range_test(&self, at: f64, bt: f64, xt: f64, am: f32, bm: f32, xm: f32) -> u8 {
        self.classify_range(at, bt, xt, am, bm, xm)
    }

    fn evaluate(&mut self, _t: f64, _m: f32, flags: u8) -> bool {
        flags & CLASSIFIER_FLAG_ARTIFACT != 0
    }
}

/// Confirms artifact candidates by comparing against the exact distance to the shape.
struct ShapeArtifactClassifier<'a, C: ContourCombiner, const N: usize> {
    base: BaseArtifactClassifier,
    direction: Vec2,
    finder: ShapeDistanceFinder<'a, C>,
    sdf: &'a Bitmap<f32, N>,
    inv_range: f64,
    texel_size: Vec2,
    min_improve_ratio: f64,
    /// The center of the current texel in shape space.
    shape_coord: Point,
    /// The center of the current texel in bitmap coordinates.
    sdf_coord: Point,
    /// The color channels of the current texel.
    msd: [f32; 3],
}

impl<C, const N: usize> ArtifactClassifier for ShapeArtifactClassifier<'_, C, N>
where
    C: ContourCombiner<Selector = PerpendicularDistanceSelector>,
{
    fn look_towards(&mut self, direction: Vec2, span: f64) {
        self.direction = direction;
        self.base.span = span;
    }

    fn range_test(&self, at: f64, bt: f64, xt: f64, am: f32, bm: f32, xm: f32) -> u8 {
        self.base.classify_range(at, bt, xt, am, bm, xm)
    }

    fn evaluate(&mut self, t: f64, _m: f32, flags: u8) -> bool {
        if flags & CLASSIFIER_FLAG_CANDIDATE == 0 {
            return false;
        }
        // Already an artifact, skip the expensive distance evaluation.
        if flags & CLASSIFIER_FLAG_ARTIFACT != 0 {
            return true;
        }
        let t_vector = t * self.direction;
        let msd = self.msd;
        // The color currently interpolated at the candidate position, and the color it would
        // have after correcting the current texel.
        let old_msd = interpolate(self.sdf, self.sdf_coord + t_vector);
        let a_weight = (1.0 - t_vector.x.abs()) * (1.0 - t_vector.y.abs());
        let a_psd = median(msd[0], msd[1], msd[2]);
        let new_msd: [f32; 3] = core::array::from_fn(|i| {
            (f64::from(old_msd[i]) + a_weight * f64::from(a_psd - msd[i])) as f32
        });
        let old_psd = median(old_msd[0], old_msd[1], old_msd[2]);
        let new_psd = median(new_msd[0], new_msd[1], new_msd[2]);
        let offset = Vec2::new(t_vector.x * self.texel_size.x, t_vector.y * self.texel_size.y);
        let distance = self.finder.distance(self.shape_coord + offset);
        let ref_psd = (self.inv_range * distance + 0.5) as f32;
        self.min_improve_ratio * f64::from((new_psd - ref_psd).abs())
            < f64::from((old_psd - ref_psd).abs())
    }
}

/// Bilinear interpolation of the color channels of `sdf` at `pos`, in bitmap coordinates.
fn interpolate<const N: usize>(sdf: &Bitmap<f32, N>, pos: Point) -> [f32; 3] {
    let pos = pos - Vec2::new(0.5, 0.5);
    let l = pos.x.floor();
    let b = pos.y.floor();
    let lr = pos.x - l;
    let bt = pos.y - b;
    let max_x = sdf.width().saturating_sub(1) as f64;
    let max_y = sdf.height().saturating_sub(1) as f64;
    let (l, r) = (l.clamp(0.0, max_x) as usize, (l + 1.0).clamp(0.0, max_x) as usize);
    let (b, t) = (b.clamp(0.0, max_y) as usize, (b + 1.0).clamp(0.0, max_y) as usize);
    let (lb, rb, lt, rt) = (
        sdf.pixel(l, b),
        sdf.pixel(r, b),
        sdf.pixel(l, t),
        sdf.pixel(r, t),
    );
    core::array::from_fn(|i| {
        mix_f32(mix_f32(lb[i], rb[i], lr), mix_f32(lt[i], rt[i], lr), bt)
    })
}

/// The median of the linear interpolation of the texels `a` and `b` at `t`.
fn interpolated_median(a: &[f32; 3], b: &[f32; 3], t: f64) -> f32 {
    median(
        mix_f32(a[0], b[0], t),
        mix_f32(a[1], b[1], t),
        mix_f32(a[2], b[2], t),
    )
}

/// The median of a bilinear interpolation along a diagonal, given by its constant term `a`,
/// linear term `l` and quadratic term `q`, at `t`.
fn interpolated_diagonal_median(a: &[f32; 3], l: &[f32; 3], q: &[f32; 3], t: f64) -> f32 {
    let channel = |i: usize| t * (t * f64::from(q[i]) + f64::from(l[i])) + f64::from(a[i]);
    median(channel(0), channel(1), channel(2)) as f32
}

/// Checks for an artifact where two channels, differing by `da` at `a` and by `db` at `b`,
/// become equal between the two texels.
fn has_linear_artifact_inner(
    classifier: &mut impl ArtifactClassifier,
    am: f32,
    bm: f32,
    a: &[f32; 3],
    b: &[f32; 3],
    da: f32,
    db: f32,
) -> bool {
    let t = f64::from(da) / f64::from(da - db);
    if t > ARTIFACT_T_EPSILON && t < 1.0 - ARTIFACT_T_EPSILON {
        let xm = interpolated_median(a, b, t);
        let flags = classifier.range_test(0.0, 1.0, t, am, bm, xm);
        return classifier.evaluate(t, xm, flags);
    }
    false
}

/// Checks for an artifact on the diagonal between `a` and `d`, where two channels become
/// equal. `t_ex0` and `t_ex1` are the local extremes of the two channels.
fn has_diagonal_artifact_inner(
    classifier: &mut impl ArtifactClassifier,
    (am, dm): (f32, f32),
    (a, l, q): (&[f32; 3], &[f32; 3], &[f32; 3]),
    (da, dbc, dd): (f32, f32, f32),
    t_ex0: f64,
    t_ex1: f64,
) -> bool {
    let roots = solve_quadratic(f64::from(dd - dbc + da), f64::from(dbc - da - da), f64::from(da));
    for &t in roots.as_slice() {
        // Solutions at the texels themselves are singularities.
        if t <= ARTIFACT_T_EPSILON || t >= 1.0 - ARTIFACT_T_EPSILON {
            continue;
        }
        let xm = interpolated_diagonal_median(a, l, q, t);
        let mut flags = classifier.range_test(0.0, 1.0, t, am, dm, xm);
        // Also check against the medians at the local extremes between the texels.
        for t_ex in [t_ex0, t_ex1] {
            if t_ex > 0.0 && t_ex < 1.0 {
                let em = interpolated_diagonal_median(a, l, q, t_ex);
                flags |= if t_ex > t {
                    classifier.range_test(0.0, t_ex, t, am, em, xm)
                } else {
                    classifier.range_test(t_ex, 1.0, t, em, dm, xm)
                };
            }
        }
        if classifier.evaluate(t, xm, flags) {
            return true;
        }
    }
    false
}

/// Whether interpolating between the adjacent texels `a` (with median `am`) and `b` causes an
/// artifact that should be blamed on `a`.
fn has_linear_artifact(
    classifier: &mut impl ArtifactClassifier,
    am: f32,
    a: &[f32; 3],
    b: &[f32; 3],
) -> bool {
    let bm = median(b[0], b[1], b[2]);
    // Only the texel farther from the edge is reported.
    (am - 0.5).abs() >= (bm - 0.5).abs()
        && (has_linear_artifact_inner(classifier, am, bm, a, b, a[1] - a[0], b[1] - b[0])
            || has_linear_artifact_inner(classifier, am, bm, a, b, a[2] - a[1], b[2] - b[1])
            || has_linear_artifact_inner(classifier, am, bm, a, b, a[0] - a[2], b[0] - b[2]))
}

/// Whether bilinear interpolation between the diagonally adjacent texels `a` and `d` causes
/// an artifact that should be blamed on `a`. `b` and `c` form the other diagonal.
fn has_diagonal_artifact(
    classifier: &mut impl ArtifactClassifier,
    am: f32,
    a: &[f32; 3],
    b: &[f32; 3],
    c: &[f32; 3],
    d: &[f32; 3],
) -> bool {
    let dm = median(d[0], d[1], d[2]);
    if (am - 0.5).abs() < (dm - 0.5).abs() {
        return false;
    }
    let abc: [f32; 3] = core::array::from_fn(|i| a[i] - b[i] - c[i]);
    let l: [f32; 3] = core::array::from_fn(|i| -a[i] - abc[i]);
    let q: [f32; 3] = core::array::from_fn(|i| d[i] + abc[i]);
    let t_ex: [f64; 3] = core::array::from_fn(|i| -0.5 * f64::from(l[i]) / f64::from(q[i]));
    let terms = (a, &l, &q);
    [(1, 0), (2, 1), (0, 2)]
        .into_iter()
        .zip([(0, 1), (1, 2), (2, 0)])
        .any(|((i, j), (ex0, ex1))| {
            has_diagonal_artifact_inner(
                classifier,
                (am, dm),
                terms,
                (a[i] - a[j], b[i] - b[j] + c[i] - c[j], d[i] - d[j]),
                t_ex[ex0],
                t_ex[ex1],
            )
        })
}

/// Whether interpolating the texel at `(x, y)` with any of its eight neighbours causes an
/// artifact.
fn texel_has_artifact<const N: usize>(
    classifier: &mut impl ArtifactClassifier,
    spans: &Spans,
    sdf: &Bitmap<f32, N>,
    x: usize,
    y: usize,
) -> bool {
    let (width, height) = (sdf.width(), sdf.height());
    let c = rgb(sdf.pixel(x, y));
    let cm = median(c[0], c[1], c[2]);
    let l = (x > 0).then(|| rgb(sdf.pixel(x - 1, y)));
    let b = (y > 0).then(|| rgb(sdf.pixel(x, y - 1)));
    let r = (x + 1 < width).then(|| rgb(sdf.pixel(x + 1, y)));
    let t = (y + 1 < height).then(|| rgb(sdf.pixel(x, y + 1)));

    let linear = [
        (l, (-1.0, 0.0), spans.horizontal),
        (b, (0.0, -1.0), spans.vertical),
        (r, (1.0, 0.0), spans.horizontal),
        (t, (0.0, 1.0), spans.vertical),
    ];
    for (neighbour, (dx, dy), span) in linear {
        if let Some(neighbour) = neighbour {
            classifier.look_towards(Vec2::new(dx, dy), span);
            if has_linear_artifact(classifier, cm, &c, &neighbour) {
                return true;
            }
        }
    }

    let diagonal = [
        (l, b, (x.wrapping_sub(1), y.wrapping_sub(1)), (-1.0, -1.0)),
        (r, b, (x + 1, y.wrapping_sub(1)), (1.0, -1.0)),
        (l, t, (x.wrapping_sub(1), y + 1), (-1.0, 1.0)),
        (r, t, (x + 1, y + 1), (1.0, 1.0)),
    ];
    for (horizontal, vertical, (dx_index, dy_index), (dx, dy)) in diagonal {
        if let (Some(horizontal), Some(vertical)) = (horizontal, vertical) {
            let d = rgb(sdf.pixel(dx_index, dy_index));
            classifier.look_towards(Vec2::new(dx, dy), spans.diagonal);
            if has_diagonal_artifact(classifier, cm, &c, &horizontal, &vertical, &d) {
                return true;
            }
        }
    }
    false
}

/// Runs error correction on a multi-channel distance field as configured in `config`,
/// allocating a temporary stencil.
pub fn msdf_error_correction<const N: usize>(
    sdf: &mut Bitmap<f32, N>,
    shape: &Shape,
    projection: &Projection,
    range: f64,
    config: &MsdfGeneratorConfig,
) {
    msdf_error_correction_with_stencil(sdf, shape, projection, range, config, None);
}

/// Runs error correction on a multi-channel distance field as configured in `config`.
///
/// A provided `stencil` is used as the working buffer (and resized if needed), and holds the
/// final flags afterwards.
pub fn msdf_error_correction_with_stencil<const N: usize>(
    sdf: &mut Bitmap<f32, N>,
    shape: &Shape,
    projection: &Projection,
    range: f64,
    config: &MsdfGeneratorConfig,
    stencil: Option<&mut Bitmap<u8, 1>>,
) {
    let ec_config = &config.error_correction;
    let mode = ec_config.mode;
    if mode == ErrorCorrectionMode::Disabled {
        return;
    }
    let mut owned_stencil: Bitmap<u8, 1>;
    let stencil = match stencil {
        Some(stencil) => stencil,
        None => {
            owned_stencil = Bitmap::new(sdf.width(), sdf.height());
            &mut owned_stencil
        }
    };
    let mut ec = MsdfErrorCorrection::new(stencil, sdf.width(), sdf.height(), *projection, range);
    ec.set_min_deviation_ratio(ec_config.min_deviation_ratio);
    ec.set_min_improve_ratio(ec_config.min_improve_ratio);
    match mode {
        ErrorCorrectionMode::Disabled | ErrorCorrectionMode::Indiscriminate => {}
        ErrorCorrectionMode::EdgePriority => {
            ec.protect_corners(shape);
            ec.protect_edges(sdf);
        }
        ErrorCorrectionMode::EdgeOnly => ec.protect_all(),
    }

    let check = ec_config.distance_check_mode;
    let check_at_edge = check == DistanceCheckMode::CheckDistanceAtEdge;
    if check == DistanceCheckMode::DoNotCheckDistance
        || (check_at_edge && mode != ErrorCorrectionMode::EdgeOnly)
    {
        ec.find_errors(sdf);
        if check_at_edge {
            ec.protect_all();
        }
    }
    if check != DistanceCheckMode::DoNotCheckDistance {
        let num_threads = config.generator.num_threads;
        if config.generator.overlap_support {
            type Combiner = OverlappingContourCombiner<PerpendicularDistanceSelector>;
            ec.find_errors_with_shape::<Combiner, N>(sdf, shape, num_threads);
        } else {
            type Combiner = SimpleContourCombiner<PerpendicularDistanceSelector>;
            ec.find_errors_with_shape::<Combiner, N>(sdf, shape, num_threads);
        }
    }
    ec.apply(sdf);
}

fn shapeless_error_correction<const N: usize>(
    sdf: &mut Bitmap<f32, N>,
    projection: &Projection,
    range: f64,
    min_deviation_ratio: f64,
    protect_all: bool,
) {
    let mut stencil = Bitmap::new(sdf.width(), sdf.height());
    let mut ec = MsdfErrorCorrection::new(
        &mut stencil,
        sdf.width(),
        sdf.height(),
        *projection,
        range,
    );
    ec.set_min_deviation_ratio(min_deviation_ratio);
    if protect_all {
        ec.protect_all();
    }
    ec.find_errors(sdf);
    ec.apply(sdf);
}

/// Corrects all artifacts judged from the distance field alone, without the shape.
pub fn msdf_fast_distance_error_correction<const N: usize>(
    sdf: &mut Bitmap<f32, N>,
    projection: &Projection,
    range: f64,
    min_deviation_ratio: f64,
) {
    shapeless_error_correction(sdf, projection, range, min_deviation_ratio, false);
}

/// Corrects only artifacts that invert the fill, judged from the distance field alone.
pub fn msdf_fast_edge_error_correction<const N: usize>(
    sdf: &mut Bitmap<f32, N>,
    projection: &Projection,
    range: f64,
    min_deviation_ratio: f64,
) {
    shapeless_error_correction(sdf, projection, range, min_deviation_ratio, true);
}
