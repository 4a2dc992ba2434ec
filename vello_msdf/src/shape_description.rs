// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A compact text format for shapes.
//!
//! A description is an optional `@invert-y` marker followed by any number of contours.
//! Each contour lists its points between braces, separated by semicolons:
//!
//! ```text
//! { 0, 0; 0, 1; (1, 2); 2, 1; y(2, 0; 1, -1); 1, 0; # }
//! ```
//!
//! Between two points, a single control point in parentheses makes a quadratic Bézier edge
//! and two control points make a cubic one. A color letter (`r`, `g`, `b`, `y`, `m`, `c`,
//! `w` or `k`) may precede the control points, or stand alone, to color the edge. A color
//! or control point group is terminated by a semicolon. `#` in place of a point returns to
//! the first point of the contour. A contour that does not end at its first point is closed
//! with a straight line.

use core::fmt::Write as _;

use thiserror::Error;

use crate::contour::Contour;
use crate::edge::EdgeSegment;
use crate::edge_color::EdgeColor;
use crate::kurbo::{PathSeg, Point};
use crate::shape::Shape;

const INVERT_Y_MARKER: &str = "@invert-y";

/// Errors that can occur when reading a shape description.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("{kind} at byte {position}")]
pub struct ShapeDescriptionError {
    /// Byte offset into the input at which the problem was detected.
    pub position: usize,
    /// What went wrong.
    pub kind: ShapeDescriptionErrorKind,
}

/// The kind of a [`ShapeDescriptionError`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ShapeDescriptionErrorKind {
    /// A coordinate was missing or could not be parsed.
    #[error("expected a number")]
    ExpectedNumber,
    /// A specific delimiter was expected.
    #[error("expected `{0}`")]
    ExpectedChar(char),
}

enum Controls {
    None,
    Quad(Point),
    Cubic(Point, Point),
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, kind: ShapeDescriptionErrorKind) -> ShapeDescriptionError {
        ShapeDescriptionError {
            position: self.pos,
            kind,
        }
    }

    fn peek(&mut self) -> Option<u8> {
        while self.input.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
        self.input.get(self.pos).copied()
    }

    fn eat(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: u8) -> Result<(), ShapeDescriptionError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(ShapeDescriptionErrorKind::ExpectedChar(char::from(c))))
        }
    }

    fn number(&mut self) -> Result<f64, ShapeDescriptionError> {
        self.peek();
        let start = self.pos;
        let len = self.input[start..]
            .iter()
            .take_while(|&&c| matches!(c, b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E'))
            .count();
        let value = core::str::from_utf8(&self.input[start..start + len])
            .ok()
            .and_then(|token| token.parse().ok())
            .ok_or_else(|| self.error(ShapeDescriptionErrorKind::ExpectedNumber))?;
        self.pos += len;
        Ok(value)
    }

    fn point(&mut self) -> Result<Point, ShapeDescriptionError> {
        let x = self.number()?;
        self.expect(b',')?;
        let y = self.number()?;
        Ok(Point::new(x, y))
    }

    fn color(&mut self) -> Option<EdgeColor> {
        let color = match self.peek()? {
            b'k' => EdgeColor::BLACK,
            b'r' => EdgeColor::RED,
            b'g' => EdgeColor::GREEN,
            b'y' => EdgeColor::YELLOW,
            b'b' => EdgeColor::BLUE,
            b'm' => EdgeColor::MAGENTA,
            b'c' => EdgeColor::CYAN,
            b'w' => EdgeColor::WHITE,
            _ => return None,
        };
        self.pos += 1;
        Some(color)
    }

    fn controls(&mut self) -> Result<Controls, ShapeDescriptionError> {
        if !self.eat(b'(') {
            return Ok(Controls::None);
        }
        let p1 = self.point()?;
        let controls = if self.eat(b';') {
            Controls::Cubic(p1, self.point()?)
        } else {
            Controls::Quad(p1)
        };
        self.expect(b')')?;
        Ok(controls)
    }

    /// Parses one contour, including its braces. Returns whether any edge had a color.
    fn contour(&mut self, contour: &mut Contour) -> Result<bool, ShapeDescriptionError> {
        self.expect(b'{')?;
        if self.eat(b'}') {
            return Ok(false);
        }
        let first = self.point()?;
        let mut current = first;
        let mut colors_specified = false;
        loop {
            if !self.eat(b';') {
                self.expect(b'}')?;
                break;
            }
            if self.eat(b'}') {
                break;
            }
            let color = self.color();
            let controls = self.controls()?;
            if color.is_some() || !matches!(controls, Controls::None) {
                self.expect(b';')?;
            }
            let closing = self.eat(b'#');
            let end = if closing { first } else { self.point()? };
            let edge = match controls {
                Controls::None => EdgeSegment::line(current, end),
                Controls::Quad(p1) => EdgeSegment::quad(current, p1, end),
                Controls::Cubic(p1, p2) => EdgeSegment::cubic(current, p1, p2, end),
            };
            colors_specified |= color.is_some();
            contour.add_edge(edge.with_color(color.unwrap_or(EdgeColor::WHITE)));
            current = end;
            if closing {
                self.eat(b';');
                self.expect(b'}')?;
                break;
            }
        }
        if current != first {
            contour.add_edge(EdgeSegment::line(current, first));
        }
        Ok(colors_specified)
    }
}

/// Parses a shape description.
///
/// Returns the shape and whether any edge color was given explicitly. Edges without a color
/// letter are [`EdgeColor::WHITE`].
pub fn read_shape_description(input: &str) -> Result<(Shape, bool), ShapeDescriptionError> {
    let mut parser = Parser {
        input: input.as_bytes(),
        pos: 0,
    };
    let mut shape = Shape::new();
    parser.peek();
    if input[parser.pos..].starts_with(INVERT_Y_MARKER) {
        parser.pos += INVERT_Y_MARKER.len();
        shape.inverse_y_axis = true;
    }
    let mut colors_specified = false;
    while parser.peek().is_some() {
        colors_specified |= parser.contour(shape.add_empty_contour())?;
    }
    Ok((shape, colors_specified))
}

fn color_letter(color: EdgeColor) -> char {
    match color {
        EdgeColor::BLACK => 'k',
        EdgeColor::RED => 'r',
        EdgeColor::GREEN => 'g',
        EdgeColor::YELLOW => 'y',
        EdgeColor::BLUE => 'b',
        EdgeColor::MAGENTA => 'm',
        EdgeColor::CYAN => 'c',
        _ => 'w',
    }
}

/// Writes `shape` in the format read by [`read_shape_description`].
///
/// Contours are expected to be closed. Edge colors are only written if some edge is not
/// [`EdgeColor::WHITE`].
pub fn write_shape_description(shape: &Shape) -> String {
    let write_colors = shape.edges().any(|edge| edge.color != EdgeColor::WHITE);
    let mut out = String::new();
    if shape.inverse_y_axis {
        out.push_str(INVERT_Y_MARKER);
        out.push('\n');
    }
    // Writing to a `String` never fails.
    for contour in &shape.contours {
        out.push_str("{\n");
        if !contour.edges.is_empty() {
            for edge in &contour.edges {
                let start = edge.start();
                let _ = writeln!(out, "\t{}, {};", start.x, start.y);
                let controls = match edge.segment {
                    PathSeg::Line(_) => None,
                    PathSeg::Quad(q) => Some(format!("({}, {})", q.p1.x, q.p1.y)),
                    PathSeg::Cubic(c) => Some(format!(
                        "({}, {}; {}, {})",
                        c.p1.x, c.p1.y, c.p2.x, c.p2.y
                    )),
                };
                if write_colors || controls.is_some() {
                    out.push_str("\t\t");
                    if write_colors {
                        out.push(color_letter(edge.color));
                    }
                    out.push_str(controls.as_deref().unwrap_or_default());
                    out.push_str(";\n");
                }
            }
            out.push_str("\t#\n");
        }
        out.push_str("}\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{
        ShapeDescriptionError, ShapeDescriptionErrorKind, read_shape_description,
        write_shape_description,
    };
    use crate::edge::EdgeSegment;
    use crate::edge_color::EdgeColor;
    use crate::kurbo::{PathSeg, Point};
    use crate::shape::Shape;

    #[test]
    fn square() {
        let (shape, colors_specified) =
            read_shape_description("{ 0, 0; 0, 1; 1, 1; 1, 0; # }").unwrap();
        assert!(!colors_specified);
        assert!(!shape.inverse_y_axis);
        assert_eq!(shape.contours.len(), 1);
        assert_eq!(shape.edge_count(), 4);
        assert!(shape.validate());
        assert_eq!(shape.contours[0].edges[3].end(), Point::new(0.0, 0.0));
    }

    #[test]
    fn edge_colors() {
        let (shape, colors_specified) =
            read_shape_description("{ -1, -1; m; -1, 1; y; 1, 1; m; 1, -1; y; # }").unwrap();
        assert!(colors_specified);
        let colors: Vec<_> = shape.edges().map(|edge| edge.color).collect();
        assert_eq!(
            colors,
            [
                EdgeColor::MAGENTA,
                EdgeColor::YELLOW,
                EdgeColor::MAGENTA,
                EdgeColor::YELLOW
            ]
        );
    }

    #[test]
    fn curves() {
        let (shape, _) =
            read_shape_description("{ 0, 0; (1, 2); 2, 0; c(2, -1; 0, -1); # }").unwrap();
        let edges = &shape.contours[0].edges;
        assert_eq!(edges.len(), 2);
        match edges[0].segment {
            PathSeg::Quad(q) => assert_eq!(q.p1, Point::new(1.0, 2.0)),
            other => panic!("expected a quadratic edge, got {other:?}"),
        }
        match edges[1].segment {
            PathSeg::Cubic(c) => {
                assert_eq!(c.p2, Point::new(0.0, -1.0));
                assert_eq!(c.p3, Point::new(0.0, 0.0));
            }
            other => panic!("expected a cubic edge, got {other:?}"),
        }
        assert_eq!(edges[1].color, EdgeColor::CYAN);
        assert_eq!(edges[0].color, EdgeColor::WHITE);
    }

    #[test]
    fn open_contour_is_closed() {
        let (shape, _) = read_shape_description("@invert-y { 0, 0; 1, 0; 0, 1 }").unwrap();
        assert!(shape.inverse_y_axis);
        assert_eq!(shape.edge_count(), 3);
        assert!(shape.validate());
    }

    #[test]
    fn multiple_and_empty_contours() {
        let (shape, _) = read_shape_description("{}\n{ 0, 0; 1, 0; 0, 1; # }\n{ }").unwrap();
        assert_eq!(shape.contours.len(), 3);
        assert_eq!(shape.edge_count(), 3);
    }

    #[test]
    fn syntax_error_position() {
        let error = read_shape_description("{ 0, 0; 1 1; }").unwrap_err();
        assert_eq!(
            error,
            ShapeDescriptionError {
                position: 10,
                kind: ShapeDescriptionErrorKind::ExpectedChar(','),
            }
        );
        let error = read_shape_description("{ 0, 0; x, 1; }").unwrap_err();
        assert_eq!(error.kind, ShapeDescriptionErrorKind::ExpectedNumber);
        assert_eq!(error.position, 8);
    }

    #[test]
    fn written_shape_reads_back() {
        let mut shape = Shape::new();
        shape.inverse_y_axis = true;
        let contour = shape.add_empty_contour();
        contour.add_edge(EdgeSegment::line((0.0, 0.0), (4.5, 0.0)).with_color(EdgeColor::CYAN));
        contour.add_edge(
            EdgeSegment::quad((4.5, 0.0), (5.0, 2.0), (2.0, 3.25)).with_color(EdgeColor::YELLOW),
        );
        contour.add_edge(
            EdgeSegment::cubic((2.0, 3.25), (1.0, 3.0), (-0.125, 1.0), (0.0, 0.0))
                .with_color(EdgeColor::MAGENTA),
        );
        let text = write_shape_description(&shape);
        let (read, colors_specified) = read_shape_description(&text).unwrap();
        assert!(colors_specified);
        assert_eq!(read, shape);
    }
}
