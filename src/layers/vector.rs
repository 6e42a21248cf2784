use crate::{
    core::{
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
    rendering::context::{Primitive, RenderContext, StyleConversion},
    Result, TripError,
};

#[cfg(feature = "egui")]
use egui::Color32;

use serde::{Deserialize, Serialize};

/// Serializable color type that can convert to/from egui::Color32
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[cfg(feature = "egui")]
impl From<Color32> for SerializableColor {
    fn from(color: Color32) -> Self {
        Self {
            r: color.r(),
            g: color.g(),
            b: color.b(),
            a: color.a(),
        }
    }
}

#[cfg(feature = "egui")]
impl From<SerializableColor> for Color32 {
    fn from(color: SerializableColor) -> Self {
        Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
    }
}

impl SerializableColor {
    pub const WHITE: SerializableColor = SerializableColor::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parses `#rrggbb` or `#rgb`
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || TripError::InvalidData(format!("invalid color '{}'", hex));

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            6 => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => Err(invalid()),
        }
    }

    /// Like [`SerializableColor::from_hex`], logging and falling back on bad input
    pub fn from_hex_or(hex: &str, fallback: SerializableColor) -> Self {
        Self::from_hex(hex).unwrap_or_else(|e| {
            log::warn!("{}", e);
            fallback
        })
    }
}

/// Style for circle markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointStyle {
    /// Fill color
    pub fill_color: SerializableColor,
    /// Border color
    pub stroke_color: SerializableColor,
    /// Border width
    pub stroke_width: f32,
    /// Point radius
    pub radius: f32,
    pub fill_opacity: f32,
    pub stroke_opacity: f32,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            fill_color: SerializableColor::rgb(0x66, 0x7e, 0xea),
            stroke_color: SerializableColor::WHITE,
            stroke_width: 3.0,
            radius: 8.0,
            fill_opacity: 0.8,
            stroke_opacity: 1.0,
        }
    }
}

/// Style for line features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    /// Line color
    pub color: SerializableColor,
    /// Line width
    pub width: f32,
    /// Opacity (0.0 to 1.0)
    pub opacity: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: SerializableColor::rgb(0x66, 0x7e, 0xea),
            width: 4.0,
            opacity: 0.8,
        }
    }
}

/// Projects a path into container pixels
fn project_path(path: &[LatLng], viewport: &Viewport) -> Vec<Point> {
    path.iter().map(|p| viewport.lat_lng_to_pixel(p)).collect()
}

fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Prefix of a pixel path covering `length` pixels
fn truncate_path(points: &[Point], length: f64) -> Vec<Point> {
    let mut result = Vec::with_capacity(points.len());
    let Some(first) = points.first() else {
        return result;
    };
    result.push(*first);

    let mut remaining = length;
    for pair in points.windows(2) {
        let step = pair[0].distance_to(&pair[1]);
        if remaining >= step {
            result.push(pair[1]);
            remaining -= step;
        } else {
            if step > 0.0 && remaining > 0.0 {
                let t = remaining / step;
                result.push(pair[0].add(&pair[1].subtract(&pair[0]).multiply(t)));
            }
            break;
        }
    }
    result
}

/// A route line. Supports a progressive "snake-in" reveal that draws the
/// line from its start at a fixed pixel speed.
pub struct Polyline {
    properties: LayerProperties,
    points: Vec<LatLng>,
    style: LineStyle,
    popup: Option<String>,
    /// Pixels drawn so far while snaking, `None` once the whole line is shown
    reveal: Option<Reveal>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Reveal {
    drawn_px: f64,
    speed_px_per_sec: f64,
}

impl Polyline {
    pub fn new(id: String, points: Vec<LatLng>) -> Self {
        let name = format!("Polyline {}", id);
        Self {
            properties: LayerProperties::new(id, name, LayerType::Vector),
            points,
            style: LineStyle::default(),
            popup: None,
            reveal: None,
        }
    }

    pub fn with_style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_popup(mut self, text: String) -> Self {
        self.popup = Some(text);
        self
    }

    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    pub fn style(&self) -> &LineStyle {
        &self.style
    }

    /// Restarts the line from nothing and draws it in at `speed` px/s
    pub fn snake_in(&mut self, speed: f64) {
        self.reveal = Some(Reveal {
            drawn_px: 0.0,
            speed_px_per_sec: speed.max(1.0),
        });
    }

    pub fn is_snaking(&self) -> bool {
        self.reveal.is_some()
    }
}

impl LayerTrait for Polyline {
    crate::impl_layer_trait!(Polyline, properties);

    fn update(&mut self, delta_time: f64, viewport: &Viewport) -> Result<()> {
        if let Some(reveal) = &mut self.reveal {
            reveal.drawn_px += reveal.speed_px_per_sec * delta_time;
            let total = path_length(&project_path(&self.points, viewport));
            if reveal.drawn_px >= total {
                self.reveal = None;
            }
        }
        Ok(())
    }

    fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        let mut points = project_path(&self.points, viewport);
        if let Some(reveal) = &self.reveal {
            points = truncate_path(&points, reveal.drawn_px);
        }
        if points.len() < 2 {
            return Ok(());
        }

        context.push(Primitive::Polyline {
            points,
            style: self.style.to_render_style(self.properties.opacity),
        });
        Ok(())
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(self.points.iter())
    }

    fn popup(&self) -> Option<&str> {
        self.popup.as_deref()
    }
}

/// Repeating arrow heads along a path, pointing in travel direction
pub struct ArrowDecorator {
    properties: LayerProperties,
    path: Vec<LatLng>,
    color: SerializableColor,
    /// Distance before the first arrow
    offset_px: f64,
    repeat_px: f64,
    size_px: f64,
    fill_opacity: f32,
}

impl ArrowDecorator {
    pub fn new(id: String, path: Vec<LatLng>, color: SerializableColor) -> Self {
        let name = format!("Arrows {}", id);
        Self {
            properties: LayerProperties::new(id, name, LayerType::Decoration),
            path,
            color,
            offset_px: 10.0,
            repeat_px: 50.0,
            size_px: 12.0,
            fill_opacity: 0.8,
        }
    }

    pub fn with_pattern(mut self, repeat_px: f64, size_px: f64) -> Self {
        self.repeat_px = repeat_px.max(1.0);
        self.size_px = size_px;
        self
    }

    /// Arrow tips and headings along the projected path
    pub fn arrow_positions(&self, viewport: &Viewport) -> Vec<(Point, f64)> {
        let points = project_path(&self.path, viewport);
        let mut arrows = Vec::new();
        let mut next_at = self.offset_px;
        let mut walked = 0.0;

        for pair in points.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            let step = start.distance_to(&end);
            if step <= f64::EPSILON {
                continue;
            }
            let angle = (end.y - start.y).atan2(end.x - start.x);
            while next_at <= walked + step {
                let t = (next_at - walked) / step;
                arrows.push((start.add(&end.subtract(&start).multiply(t)), angle));
                next_at += self.repeat_px;
            }
            walked += step;
        }
        arrows
    }
}

impl LayerTrait for ArrowDecorator {
    crate::impl_layer_trait!(ArrowDecorator, properties);

    fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        for (tip, angle) in self.arrow_positions(viewport) {
            if !context.is_visible(&tip, self.size_px) {
                continue;
            }
            context.push(Primitive::Arrow {
                tip,
                angle,
                size: self.size_px as f32,
                color: self.color,
                opacity: self.fill_opacity * self.properties.opacity,
            });
        }
        Ok(())
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(self.path.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(LatLng::new(35.3, 137.6), 6.0, Point::new(1200.0, 800.0))
    }

    fn tokyo_to_kyoto() -> Vec<LatLng> {
        vec![LatLng::new(35.6762, 139.6503), LatLng::new(35.0116, 135.7681)]
    }

    #[test]
    fn test_color_from_hex() {
        assert_eq!(
            SerializableColor::from_hex("#ff6b6b").unwrap(),
            SerializableColor::rgb(255, 107, 107)
        );
        assert_eq!(
            SerializableColor::from_hex("#fff").unwrap(),
            SerializableColor::WHITE
        );
        assert!(SerializableColor::from_hex("#12345").is_err());
        assert!(SerializableColor::from_hex("#gggggg").is_err());
        assert_eq!(
            SerializableColor::from_hex_or("nope", SerializableColor::WHITE),
            SerializableColor::WHITE
        );
    }

    #[test]
    fn test_polyline_renders_full_line() {
        let mut line = Polyline::new("route-0".into(), tokyo_to_kyoto());
        let mut context = RenderContext::new();
        line.render(&mut context, &viewport()).unwrap();

        match &context.primitives()[0] {
            Primitive::Polyline { points, style } => {
                assert_eq!(points.len(), 2);
                assert_eq!(style.width, 4.0);
            }
            other => panic!("unexpected primitive {:?}", other),
        }
    }

    #[test]
    fn test_snake_in_reveals_progressively() {
        let viewport = viewport();
        let mut line = Polyline::new("route-0".into(), tokyo_to_kyoto());
        let total = path_length(&project_path(line.points(), &viewport));

        line.snake_in(200.0);
        assert!(line.is_snaking());

        let mut context = RenderContext::new();
        line.render(&mut context, &viewport).unwrap();
        assert!(context.is_empty(), "nothing drawn before time passes");

        line.update(0.1, &viewport).unwrap();
        context.begin_frame();
        line.render(&mut context, &viewport).unwrap();
        if let Primitive::Polyline { points, .. } = &context.primitives()[0] {
            assert!((path_length(points) - 20.0).abs() < 1e-6);
        }

        line.update(total / 200.0, &viewport).unwrap();
        assert!(!line.is_snaking());
    }

    #[test]
    fn test_arrows_repeat_along_path() {
        let viewport = viewport();
        let decorator =
            ArrowDecorator::new("route-0".into(), tokyo_to_kyoto(), SerializableColor::WHITE)
                .with_pattern(50.0, 12.0);
        let arrows = decorator.arrow_positions(&viewport);
        let total = path_length(&project_path(&tokyo_to_kyoto(), &viewport));

        assert_eq!(arrows.len(), ((total - 10.0) / 50.0).floor() as usize + 1);
        // Heading west: angle close to pi
        assert!(arrows[0].1.abs() > 2.5);
    }

    #[test]
    fn test_truncate_path() {
        let points = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        let prefix = truncate_path(&points, 15.0);
        assert_eq!(prefix, [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 5.0)]);
        assert_eq!(truncate_path(&points, 0.0), [Point::new(0.0, 0.0)]);
    }
}
