// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Import of shapes from SVG path data and documents.
//!
//! Only a single `<path>` element is read from a document. Transformations and styling are
//! ignored, which is reported through [`SvgImportFlags`].

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

use roxmltree::{Document, Node};
use thiserror::Error;

use crate::kurbo::{BezPath, PathEl, Point, Rect};
use crate::shape::Shape;

/// Proportion of the document diagonal within which open contours are closed by moving the
/// last point instead of adding a line.
const ENDPOINT_SNAP_RANGE_PROPORTION: f64 = 1.0 / 16384.0;

/// Errors that can occur when importing SVG.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SvgImportError {
    /// The document is not well-formed XML.
    #[error("Couldn't parse SVG document")]
    Xml(#[from] roxmltree::Error),
    /// The root element of the document is not `<svg>`.
    #[error("Root element is `{0}` rather than `svg`")]
    NotSvg(String),
    /// The document contains no `<path>` element.
    #[error("No path element found")]
    NoPath,
    /// The selected `<path>` has no `d` attribute.
    #[error("Path element has no 'd' attribute")]
    MissingPathData,
    /// The path data could not be parsed.
    #[error("Couldn't parse path data")]
    PathData(#[from] crate::kurbo::SvgParseError),
}

/// Describes how completely a document was imported by [`load_svg_shape`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SvgImportFlags(u8);

impl SvgImportFlags {
    /// A path was imported.
    pub const SUCCESS: Self = Self(0x01);
    /// Some of the geometry failed to import.
    pub const PARTIAL_FAILURE: Self = Self(0x02);
    /// The document contains further geometry that was not imported.
    pub const INCOMPLETE: Self = Self(0x04);
    /// The document uses features, such as masks, that affect the result but are not supported.
    pub const UNSUPPORTED_FEATURE: Self = Self(0x08);
    /// The path or one of its ancestors has a transformation, which was not applied.
    pub const TRANSFORMATION_IGNORED: Self = Self(0x10);

    /// The raw bits of the flags.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether all flags in `other` are set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the three flags that end the search for a path are all set.
    fn is_final(self) -> bool {
        self.contains(Self::SUCCESS | Self::INCOMPLETE | Self::UNSUPPORTED_FEATURE)
    }
}

impl BitOr for SvgImportFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SvgImportFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for SvgImportFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(SvgImportFlags, &str); 5] = [
            (SvgImportFlags::SUCCESS, "SUCCESS"),
            (SvgImportFlags::PARTIAL_FAILURE, "PARTIAL_FAILURE"),
            (SvgImportFlags::INCOMPLETE, "INCOMPLETE"),
            (SvgImportFlags::UNSUPPORTED_FEATURE, "UNSUPPORTED_FEATURE"),
            (SvgImportFlags::TRANSFORMATION_IGNORED, "TRANSFORMATION_IGNORED"),
        ];
        f.debug_set()
            .entries(
                NAMES
                    .iter()
                    .filter(|(flag, _)| self.contains(*flag))
                    .map(|(_, name)| name),
            )
            .finish()
    }
}

/// The result of [`load_svg_shape`].
#[derive(Clone, Debug)]
pub struct SvgImport {
    /// The imported shape, with [`Shape::inverse_y_axis`] set.
    pub shape: Shape,
    /// The view box of the document, in the coordinates of the shape.
    pub view_box: Rect,
    /// How completely the document was imported.
    pub flags: SvgImportFlags,
}

/// Builds a shape from the `d` attribute of an SVG path.
///
/// Every subpath becomes a contour. Subpaths that are not closed are closed with a straight
/// line, unless their end point lies within `endpoint_snap_range` of their start, in which
/// case the end point is moved onto the start. Elliptical arcs are approximated with cubic
/// Bézier curves.
pub fn build_shape_from_svg_path(
    d: &str,
    endpoint_snap_range: f64,
) -> Result<Shape, SvgImportError> {
    let path = BezPath::from_svg(d)?;
    warn_on_open_subpaths(&path);
    Ok(Shape::from_path_with_snap(path, endpoint_snap_range))
}

fn warn_on_open_subpaths(path: &BezPath) {
    let mut start = Point::ZERO;
    let mut current = None;
    let mut open = 0_usize;
    for el in path.elements() {
        match el {
            PathEl::MoveTo(p) => {
                if current.is_some_and(|current| current != start) {
                    open += 1;
                }
                start = *p;
                current = None;
            }
            PathEl::LineTo(p) | PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => {
                current = Some(*p);
            }
            PathEl::ClosePath => current = None,
        }
    }
    if current.is_some_and(|current| current != start) {
        open += 1;
    }
    if open > 0 {
        log::warn!("closing {open} open contour(s) in SVG path");
    }
}

/// Walks the children of `parent` from last to first, selecting the first `<path>` found.
fn find_last_path<'a, 'input>(
    parent: Node<'a, 'input>,
    path: &mut Option<Node<'a, 'input>>,
    flags: &mut SvgImportFlags,
    has_transformation: bool,
) {
    for node in parent.children().rev().filter(Node::is_element) {
        if flags.is_final() {
            break;
        }
        let transformed = has_transformation || node.has_attribute("transform");
        match node.tag_name().name() {
            "path" => {
                if path.is_none() {
                    *path = Some(node);
                    *flags |= SvgImportFlags::SUCCESS;
                    if transformed {
                        *flags |= SvgImportFlags::TRANSFORMATION_IGNORED;
                    }
                } else {
                    *flags |= SvgImportFlags::INCOMPLETE;
                }
            }
            "g" => find_last_path(node, path, flags, transformed),
            "rect" | "circle" | "ellipse" | "polygon" => {
                *flags |= SvgImportFlags::INCOMPLETE;
            }
            "mask" | "use" => *flags |= SvgImportFlags::UNSUPPORTED_FEATURE,
            _ => {}
        }
    }
}

/// Reads the view box as `(x, y, width, height)`, keeping the defaults for missing values.
fn parse_view_box(view_box: &str, values: &mut [f64; 4]) {
    let numbers = view_box
        .split([',', ' ', '\t', '\n', '\r'])
        .filter(|s| !s.is_empty())
        .map_while(|s| s.parse().ok());
    for (value, number) in values.iter_mut().zip(numbers) {
        *value = number;
    }
}

/// Imports the last `<path>` element of an SVG document.
///
/// The returned shape has [`Shape::inverse_y_axis`] set, since SVG coordinates point down.
/// Open contours are closed, snapping end points within `1 / 16384` of the document
/// diagonal.
pub fn load_svg_shape(svg: &str) -> Result<SvgImport, SvgImportError> {
    let doc = Document::parse(svg)?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(SvgImportError::NotSvg(root.tag_name().name().to_owned()));
    }

    let mut path = None;
    let mut flags = SvgImportFlags::default();
    find_last_path(root, &mut path, &mut flags, false);
    let path = path.ok_or(SvgImportError::NoPath)?;
    let d = path
        .attribute("d")
        .ok_or(SvgImportError::MissingPathData)?;

    let dimension = |name: &str| {
        root.attribute(name)
            .and_then(|s: &str| s.trim().parse().ok())
            .unwrap_or(0.0)
    };
    let mut view_box = [0.0, 0.0, dimension("width"), dimension("height")];
    if let Some(s) = root.attribute("viewBox") {
        parse_view_box(s, &mut view_box);
    }
    let [x, y, width, height] = view_box;
    let snap_range = ENDPOINT_SNAP_RANGE_PROPORTION * width.hypot(height);

    let mut shape = build_shape_from_svg_path(d, snap_range)?;
    shape.inverse_y_axis = true;
    Ok(SvgImport {
        shape,
        view_box: Rect::new(x, y, x + width, y + height),
        flags,
    })
}

#[cfg(test)]
mod tests {
    use super::{SvgImportError, SvgImportFlags, build_shape_from_svg_path, load_svg_shape};
    use crate::kurbo::{PathSeg, Point, Rect};

    #[test]
    fn path_data() {
        let shape = build_shape_from_svg_path("M0 0 L10 0 L10 10 Z M20 20 h5 v5 h-5 z", 0.0)
            .unwrap();
        assert_eq!(shape.contours.len(), 2);
        assert_eq!(shape.contours[0].edges.len(), 3);
        assert_eq!(shape.contours[1].edges.len(), 4);
        assert!(shape.validate());
    }

    #[test]
    fn open_path_is_snapped() {
        let shape = build_shape_from_svg_path("M0 0 L10 0 L10 10 L0.001 0", 0.01).unwrap();
        let edges = &shape.contours[0].edges;
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[2].end(), Point::new(0.0, 0.0));

        let shape = build_shape_from_svg_path("M0 0 L10 0 L10 10 L0.001 0", 0.0).unwrap();
        assert_eq!(shape.contours[0].edges.len(), 4);
        assert!(shape.validate());
    }

    #[test]
    fn arcs_become_cubics() {
        let shape = build_shape_from_svg_path("M0 0 A5 5 0 0 1 10 0 Z", 0.0).unwrap();
        assert!(
            shape.contours[0]
                .edges
                .iter()
                .any(|edge| matches!(edge.segment, PathSeg::Cubic(_)))
        );
        assert!(shape.validate());
    }

    #[test]
    fn bad_path_data() {
        assert!(matches!(
            build_shape_from_svg_path("M0 0 X 1 1", 0.0),
            Err(SvgImportError::PathData(_))
        ));
    }

    #[test]
    fn document() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="32"
            viewBox="-2 -4 16 8">
            <path d="M0 0 L1 0 L1 1 Z"/>
            <g transform="scale(2)">
                <rect x="0" y="0" width="1" height="1"/>
                <path d="M0 0 L2 0 L2 2 L0 2 Z"/>
            </g>
        </svg>"#;
        let import = load_svg_shape(svg).unwrap();
        assert!(import.shape.inverse_y_axis);
        assert_eq!(import.shape.edge_count(), 4);
        assert_eq!(import.view_box, Rect::new(-2.0, -4.0, 14.0, 4.0));
        assert!(import.flags.contains(SvgImportFlags::SUCCESS));
        assert!(import.flags.contains(SvgImportFlags::TRANSFORMATION_IGNORED));
        assert!(import.flags.contains(SvgImportFlags::INCOMPLETE));
        assert!(!import.flags.contains(SvgImportFlags::UNSUPPORTED_FEATURE));
    }

    #[test]
    fn dimensions_without_view_box() {
        let svg = r#"<svg width="10" height="20"><path d="M0 0 L1 0 L1 1 Z"/></svg>"#;
        let import = load_svg_shape(svg).unwrap();
        assert_eq!(import.view_box, Rect::new(0.0, 0.0, 10.0, 20.0));
        assert_eq!(import.flags, SvgImportFlags::SUCCESS);
    }

    #[test]
    fn document_errors() {
        assert!(matches!(
            load_svg_shape("<svg><rect/></svg>"),
            Err(SvgImportError::NoPath)
        ));
        assert!(matches!(
            load_svg_shape("<html><path d=\"M0 0\"/></html>"),
            Err(SvgImportError::NotSvg(name)) if name == "html"
        ));
        assert!(matches!(
            load_svg_shape("<svg><path/></svg>"),
            Err(SvgImportError::MissingPathData)
        ));
        assert!(matches!(load_svg_shape("<svg>"), Err(SvgImportError::Xml(_))));
    }
}
