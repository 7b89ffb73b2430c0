//! SVG path data (`d` attribute) import and export.
//!
//! Parsing resolves relative coordinates, implicit command repeats and the
//! smooth `S`/`T` reflections, so every [`SvgSegment`] is absolute.

use crate::error::SvgParseError;
use crate::geometry::arc::ArcEndpointParams;
use crate::geometry::cubic::CubicBezier;
use crate::geometry::limits::{self, MAX_NODES_PER_PATH, MAX_SVG_COMMANDS, MAX_SVG_SUBPATHS, MAX_SVG_TOKENS};
use crate::model::{PathNode, Vec2};
use crate::path::Path;
use crate::segment::PathSegment;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SvgSegment {
    Line { to: Vec2 },
    Cubic { c1: Vec2, c2: Vec2, to: Vec2 },
    Quadratic { c: Vec2, to: Vec2 },
    /// `rotation` is in degrees, as written.
    Arc { radius: Vec2, rotation: f64, large_arc: bool, sweep: bool, to: Vec2 },
}

impl SvgSegment {
    pub fn to(&self) -> Vec2 {
        match *self {
            SvgSegment::Line { to }
            | SvgSegment::Cubic { to, .. }
            | SvgSegment::Quadratic { to, .. }
            | SvgSegment::Arc { to, .. } => to,
        }
    }
}

/// One subpath.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgPath {
    pub start: Vec2,
    pub segments: Vec<SvgSegment>,
    pub closed: bool,
}

impl SvgPath {
    fn new(start: Vec2) -> Self {
        Self { start, segments: Vec::new(), closed: false }
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn skip_ws(&mut self) {
        while let Some(c) = self.bytes.get(self.pos) {
            if c.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn skip_separator(&mut self) {
        self.skip_ws();
        if self.bytes.get(self.pos) == Some(&b',') {
            self.pos += 1;
            self.skip_ws();
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn at_number(&self) -> bool {
        matches!(self.peek(), Some(b'0'..=b'9' | b'.' | b'-' | b'+'))
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// One number in the compact grammar: `1.5.5` is two numbers and so is `-1-2`.
    fn number(&mut self) -> Option<f64> {
        self.skip_separator();
        let start = self.pos;
        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        let mut mantissa = self.digits();
        if self.peek() == Some(b'.') {
            self.pos += 1;
            mantissa += self.digits();
        }
        if mantissa == 0 {
            self.pos = start;
            return None;
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'-' | b'+')) {
                self.pos += 1;
            }
            if self.digits() == 0 {
                self.pos = mark;
            }
        }
        std::str::from_utf8(&self.bytes[start..self.pos]).ok()?.parse().ok()
    }

    /// Arc flags are a single `0` or `1` and need no separator.
    fn flag(&mut self) -> Option<bool> {
        self.skip_separator();
        let v = match self.peek()? {
            b'0' => false,
            b'1' => true,
            _ => return None,
        };
        self.pos += 1;
        Some(v)
    }
}

struct Parser<'a> {
    cursor: Cursor<'a>,
    paths: Vec<SvgPath>,
    current: Option<SvgPath>,
    pos: Vec2,
    start: Vec2,
    /// Reflection source for `S` (second cubic control) or `T` (quadratic control).
    last_cubic: Option<Vec2>,
    last_quad: Option<Vec2>,
}

impl<'a> Parser<'a> {
    fn coord(&mut self, command: char) -> Result<f64, SvgParseError> {
        self.cursor.skip_separator();
        let offset = self.cursor.pos;
        let v = self.cursor.number().ok_or_else(|| SvgParseError::InvalidParameters {
            command,
            offset,
            reason: "expected number".into(),
        })?;
        if limits::in_coord_bounds(v) {
            Ok(v)
        } else {
            Err(SvgParseError::InvalidParameters { command, offset, reason: format!("coordinate {v} out of bounds") })
        }
    }

    fn point(&mut self, command: char, relative: bool) -> Result<Vec2, SvgParseError> {
        self.cursor.skip_separator();
        let offset = self.cursor.pos;
        let x = self.coord(command)?;
        let y = self.coord(command)?;
        let p = Vec2::new(x, y);
        let p = if relative { self.pos + p } else { p };
        if limits::point_in_bounds(p) {
            Ok(p)
        } else {
            Err(SvgParseError::InvalidParameters { command, offset, reason: "coordinate out of bounds".into() })
        }
    }

    fn flag(&mut self, command: char) -> Result<bool, SvgParseError> {
        self.cursor.skip_separator();
        let offset = self.cursor.pos;
        self.cursor
            .flag()
            .ok_or_else(|| SvgParseError::InvalidParameters { command, offset, reason: "expected flag".into() })
    }

    fn finish_subpath(&mut self) {
        if let Some(path) = self.current.take() {
            self.paths.push(path);
        }
    }

    fn begin_subpath(&mut self, at: Vec2) -> Result<(), SvgParseError> {
        self.finish_subpath();
        if self.paths.len() >= MAX_SVG_SUBPATHS {
            return Err(SvgParseError::LimitExceeded { what: "subpaths", limit: MAX_SVG_SUBPATHS });
        }
        self.current = Some(SvgPath::new(at));
        self.pos = at;
        self.start = at;
        Ok(())
    }

    fn push(&mut self, segment: SvgSegment) -> Result<(), SvgParseError> {
        if self.current.as_ref().map_or(true, |p| p.closed) {
            // Drawing after `Z` without a moveto continues from the subpath start.
            let start = self.start;
            self.begin_subpath(start)?;
        }
        if let Some(path) = self.current.as_mut() {
            if path.segments.len() + 1 >= MAX_NODES_PER_PATH {
                return Err(SvgParseError::LimitExceeded { what: "nodes per path", limit: MAX_NODES_PER_PATH });
            }
            path.segments.push(segment);
        }
        self.pos = segment.to();
        Ok(())
    }

    fn command(&mut self, letter: u8, explicit: bool) -> Result<(), SvgParseError> {
        let command = letter as char;
        let relative = letter.is_ascii_lowercase();
        let (mut next_cubic, mut next_quad) = (None, None);
        match letter.to_ascii_uppercase() {
            b'M' => {
                let p = self.point(command, relative)?;
                if explicit {
                    self.begin_subpath(p)?;
                } else {
                    self.push(SvgSegment::Line { to: p })?;
                }
            }
            b'L' => {
                let to = self.point(command, relative)?;
                self.push(SvgSegment::Line { to })?;
            }
            b'H' => {
                let x = self.coord(command)?;
                let to = Vec2::new(if relative { self.pos.x + x } else { x }, self.pos.y);
                self.push(SvgSegment::Line { to })?;
            }
            b'V' => {
                let y = self.coord(command)?;
                let to = Vec2::new(self.pos.x, if relative { self.pos.y + y } else { y });
                self.push(SvgSegment::Line { to })?;
            }
            b'C' => {
                let c1 = self.point(command, relative)?;
                let c2 = self.point(command, relative)?;
                let to = self.point(command, relative)?;
                self.push(SvgSegment::Cubic { c1, c2, to })?;
                next_cubic = Some(c2);
            }
            b'S' => {
                let c1 = match self.last_cubic {
                    Some(c) => self.pos * 2.0 - c,
                    None => self.pos,
                };
                let c2 = self.point(command, relative)?;
                let to = self.point(command, relative)?;
                self.push(SvgSegment::Cubic { c1, c2, to })?;
                next_cubic = Some(c2);
            }
            b'Q' => {
                let c = self.point(command, relative)?;
                let to = self.point(command, relative)?;
                self.push(SvgSegment::Quadratic { c, to })?;
                next_quad = Some(c);
            }
            b'T' => {
                let c = match self.last_quad {
                    Some(q) => self.pos * 2.0 - q,
                    None => self.pos,
                };
                let to = self.point(command, relative)?;
                self.push(SvgSegment::Quadratic { c, to })?;
                next_quad = Some(c);
            }
            b'A' => {
                let rx = self.coord(command)?.abs();
                let ry = self.coord(command)?.abs();
                let rotation = self.coord(command)?;
                let large_arc = self.flag(command)?;
                let sweep = self.flag(command)?;
                let to = self.point(command, relative)?;
                self.push(SvgSegment::Arc { radius: Vec2::new(rx, ry), rotation, large_arc, sweep, to })?;
            }
            b'Z' => {
                if let Some(path) = self.current.as_mut() {
                    path.closed = true;
                }
                self.pos = self.start;
            }
            _ => {
                return Err(SvgParseError::InvalidCommand { command, offset: self.cursor.pos.saturating_sub(1) });
            }
        }
        self.last_cubic = next_cubic;
        self.last_quad = next_quad;
        Ok(())
    }
}

/// Parse a `d` attribute into absolute subpaths.
pub fn parse_path_data(d: &str) -> Result<Vec<SvgPath>, SvgParseError> {
    if d.len() > MAX_SVG_TOKENS {
        return Err(SvgParseError::LimitExceeded { what: "path data length", limit: MAX_SVG_TOKENS });
    }
    let mut parser = Parser {
        cursor: Cursor { bytes: d.as_bytes(), pos: 0 },
        paths: Vec::new(),
        current: None,
        pos: Vec2::ZERO,
        start: Vec2::ZERO,
        last_cubic: None,
        last_quad: None,
    };
    let mut commands = 0usize;
    let mut started = false;
    let mut repeat: Option<u8> = None;

    loop {
        parser.cursor.skip_ws();
        let Some(c) = parser.cursor.peek() else { break };
        let (letter, explicit) = if c.is_ascii_alphabetic() {
            parser.cursor.pos += 1;
            (c, true)
        } else {
            match repeat {
                // Implicit repeats; extra moveto pairs are linetos.
                Some(prev) if parser.cursor.at_number() || c == b',' => (prev, false),
                _ => return Err(SvgParseError::InvalidCommand { command: c as char, offset: parser.cursor.pos }),
            }
        };
        if !started && !matches!(letter, b'M' | b'm') {
            return Err(SvgParseError::InvalidCommand { command: letter as char, offset: parser.cursor.pos - 1 });
        }
        started = true;
        commands += 1;
        if commands > MAX_SVG_COMMANDS {
            return Err(SvgParseError::LimitExceeded { what: "commands", limit: MAX_SVG_COMMANDS });
        }
        parser.command(letter, explicit)?;
        repeat = (!matches!(letter, b'Z' | b'z')).then_some(letter);
    }
    parser.finish_subpath();
    Ok(parser.paths)
}

impl Path {
    /// Build a path from one parsed subpath. Quadratics are elevated and arcs
    /// approximated by cubic pieces; a closing point that coincides with the
    /// start is folded into the first node.
    pub fn from_svg(svg: &SvgPath) -> Path {
        let mut nodes = vec![PathNode::new(svg.start)];
        let mut pos = svg.start;
        for segment in &svg.segments {
            let pieces: Vec<PathSegment> = match *segment {
                SvgSegment::Line { to } => vec![PathSegment::line(pos, to)],
                SvgSegment::Cubic { c1, c2, to } => vec![PathSegment::from_cubic(&CubicBezier::new(pos, c1, c2, to))],
                SvgSegment::Quadratic { c, to } => vec![PathSegment::from_quadratic(pos, c, to)],
                SvgSegment::Arc { radius, rotation, large_arc, sweep, to } => {
                    let params = ArcEndpointParams {
                        from: pos,
                        to,
                        radius,
                        rotation: rotation.to_radians(),
                        large_arc,
                        sweep,
                    };
                    match params.try_center_params() {
                        Ok(center) => {
                            let cubics = center.to_cubics();
                            if cubics.is_empty() {
                                vec![PathSegment::line(pos, to)]
                            } else {
                                cubics.iter().map(PathSegment::from_cubic).collect()
                            }
                        }
                        Err(e) => {
                            log::warn!("arc to {:?} drawn as a line: {}", to, e);
                            vec![PathSegment::line(pos, to)]
                        }
                    }
                }
            };
            for piece in pieces {
                if let Some(last) = nodes.last_mut() {
                    last.control_out = piece.edge.control_out;
                }
                nodes.push(PathNode::with_controls(piece.to, piece.edge.control_in, Vec2::ZERO));
                pos = piece.to;
            }
            // Arc pieces end on the exact requested endpoint.
            if let Some(last) = nodes.last_mut() {
                last.position = segment.to();
            }
            pos = segment.to();
        }
        if svg.closed && nodes.len() > 1 {
            if let Some(last) = nodes.last().copied() {
                if last.position.approx_eq(svg.start) {
                    nodes.pop();
                    nodes[0].control_in = last.control_in;
                }
            }
        }
        Path::from_nodes(nodes, svg.closed)
    }

    /// Path data for this path, `M … C … Z`.
    pub fn to_svg_path_data(&self) -> String {
        let mut out = String::new();
        for segment in self.segments() {
            segment.append_svg(&mut out);
        }
        if out.is_empty() {
            if let Some((_, node)) = self.first_node() {
                out.push('M');
                crate::segment::write_point(&mut out, node.position);
            }
        }
        if self.is_closed() && !out.is_empty() {
            out.push_str(" Z");
        }
        out
    }
}

/// Shortest decimal form, rounded to six places.
pub(crate) fn write_number(out: &mut String, v: f64) {
    use std::fmt::Write;
    let r = (v * 1e6).round() / 1e6;
    let r = if r == 0.0 { 0.0 } else { r };
    let _ = write!(out, "{}", r);
}
