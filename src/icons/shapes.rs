//! Reduce an SVG tree to primitives a terminal canvas can draw.
//!
//! Coordinates stay in viewBox space (y grows downwards). Transforms,
//! gradients and text are ignored.

use svgtypes::{SimplePathSegment, SimplifyingPathParser};

use super::svg::SvgElement;

/// Segments used to flatten one curve or ellipse quarter.
const CURVE_STEPS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Circle { x: f64, y: f64, radius: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ViewBox {
    fn default() -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            width: 24.0,
            height: 24.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IconShapes {
    pub view_box: ViewBox,
    pub shapes: Vec<Shape>,
}

/// Numbers in an attribute value, separated by whitespace and/or commas.
fn numbers(s: &str) -> Vec<f64> {
    s.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .filter_map(|t| t.parse().ok())
        .collect()
}

fn length(s: &str) -> Option<f64> {
    s.trim().trim_end_matches("px").parse().ok()
}

fn num_attr(el: &SvgElement, key: &str) -> f64 {
    el.attr(key).and_then(length).unwrap_or(0.0)
}

fn view_box_of(root: &SvgElement) -> ViewBox {
    if let Some(vb) = root.attr("viewBox") {
        if let [min_x, min_y, width, height] = numbers(vb)[..] {
            if width > 0.0 && height > 0.0 {
                return ViewBox {
                    min_x,
                    min_y,
                    width,
                    height,
                };
            }
        }
    }
    match (
        root.attr("width").and_then(length),
        root.attr("height").and_then(length),
    ) {
        (Some(width), Some(height)) if width > 0.0 && height > 0.0 => ViewBox {
            min_x: 0.0,
            min_y: 0.0,
            width,
            height,
        },
        _ => ViewBox::default(),
    }
}

fn push_polyline(out: &mut Vec<Shape>, points: &[(f64, f64)], closed: bool) {
    for pair in points.windows(2) {
        out.push(Shape::Line {
            x1: pair[0].0,
            y1: pair[0].1,
            x2: pair[1].0,
            y2: pair[1].1,
        });
    }
    if closed && points.len() > 2 {
        let (first, last) = (points[0], points[points.len() - 1]);
        if first != last {
            out.push(Shape::Line {
                x1: last.0,
                y1: last.1,
                x2: first.0,
                y2: first.1,
            });
        }
    }
}

fn ellipse_points(cx: f64, cy: f64, rx: f64, ry: f64) -> Vec<(f64, f64)> {
    let steps = CURVE_STEPS * 4;
    (0..=steps)
        .map(|i| {
            let t = std::f64::consts::TAU * i as f64 / steps as f64;
            (cx + rx * t.cos(), cy + ry * t.sin())
        })
        .collect()
}

fn line(out: &mut Vec<Shape>, x1: f64, y1: f64, x2: f64, y2: f64) {
    out.push(Shape::Line { x1, y1, x2, y2 });
}

/// Flatten path data into line segments.
///
/// Arcs and smooth curves arrive already converted to cubic and quadratic
/// Béziers. Drawing stops at the first malformed segment.
fn path_lines(d: &str, out: &mut Vec<Shape>) {
    let (mut x, mut y) = (0.0, 0.0);
    let (mut start_x, mut start_y) = (0.0, 0.0);

    for segment in SimplifyingPathParser::from(d).map_while(Result::ok) {
        match segment {
            SimplePathSegment::MoveTo { x: nx, y: ny } => {
                (x, y) = (nx, ny);
                (start_x, start_y) = (nx, ny);
            }
            SimplePathSegment::LineTo { x: nx, y: ny } => {
                line(out, x, y, nx, ny);
                (x, y) = (nx, ny);
            }
            SimplePathSegment::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x: nx,
                y: ny,
            } => {
                let (mut px, mut py) = (x, y);
                for step in 1..=CURVE_STEPS {
                    let t = step as f64 / CURVE_STEPS as f64;
                    let u = 1.0 - t;
                    let cx = u * u * u * x
                        + 3.0 * u * u * t * x1
                        + 3.0 * u * t * t * x2
                        + t * t * t * nx;
                    let cy = u * u * u * y
                        + 3.0 * u * u * t * y1
                        + 3.0 * u * t * t * y2
                        + t * t * t * ny;
                    line(out, px, py, cx, cy);
                    (px, py) = (cx, cy);
                }
                (x, y) = (nx, ny);
            }
            SimplePathSegment::Quadratic {
                x1,
                y1,
                x: nx,
                y: ny,
            } => {
                let (mut px, mut py) = (x, y);
                for step in 1..=CURVE_STEPS {
                    let t = step as f64 / CURVE_STEPS as f64;
                    let u = 1.0 - t;
                    let cx = u * u * x + 2.0 * u * t * x1 + t * t * nx;
                    let cy = u * u * y + 2.0 * u * t * y1 + t * t * ny;
                    line(out, px, py, cx, cy);
                    (px, py) = (cx, cy);
                }
                (x, y) = (nx, ny);
            }
            SimplePathSegment::ClosePath => {
                line(out, x, y, start_x, start_y);
                (x, y) = (start_x, start_y);
            }
        }
    }
}

const SKIPPED: [&str; 7] = [
    "defs", "clipPath", "mask", "symbol", "title", "desc", "metadata",
];

fn collect(el: &SvgElement, out: &mut Vec<Shape>) {
    match el.local_name() {
        "line" => out.push(Shape::Line {
            x1: num_attr(el, "x1"),
            y1: num_attr(el, "y1"),
            x2: num_attr(el, "x2"),
            y2: num_attr(el, "y2"),
        }),
        "rect" => {
            let (width, height) = (num_attr(el, "width"), num_attr(el, "height"));
            if width > 0.0 && height > 0.0 {
                out.push(Shape::Rect {
                    x: num_attr(el, "x"),
                    y: num_attr(el, "y"),
                    width,
                    height,
                });
            }
        }
        "circle" => {
            let radius = num_attr(el, "r");
            if radius > 0.0 {
                out.push(Shape::Circle {
                    x: num_attr(el, "cx"),
                    y: num_attr(el, "cy"),
                    radius,
                });
            }
        }
        "ellipse" => {
            let (rx, ry) = (num_attr(el, "rx"), num_attr(el, "ry"));
            if rx > 0.0 && ry > 0.0 {
                let points = ellipse_points(num_attr(el, "cx"), num_attr(el, "cy"), rx, ry);
                push_polyline(out, &points, false);
            }
        }
        name @ ("polyline" | "polygon") => {
            let points: Vec<(f64, f64)> = numbers(el.attr("points").unwrap_or(""))
                .chunks_exact(2)
                .map(|p| (p[0], p[1]))
                .collect();
            push_polyline(out, &points, name == "polygon");
        }
        "path" => {
            if let Some(d) = el.attr("d") {
                path_lines(d, out);
            }
        }
        name if SKIPPED.contains(&name) => {}
        _ => {
            for child in el.elements() {
                collect(child, out);
            }
        }
    }
}

/// Extract drawable primitives from an `<svg>` root.
pub fn extract(root: &SvgElement) -> IconShapes {
    let mut shapes = Vec::new();
    for child in root.elements() {
        collect(child, &mut shapes);
    }
    IconShapes {
        view_box: view_box_of(root),
        shapes,
    }
}
