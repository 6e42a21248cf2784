use crate::{
    core::geo::Point,
    layers::vector::{LineStyle, PointStyle, SerializableColor},
};

/// Unified style conversion trait to eliminate duplicate conversion patterns
pub trait StyleConversion<T> {
    fn to_render_style(&self, opacity_multiplier: f32) -> T;
}

/// Styles for different rendering primitives
#[derive(Debug, Clone, PartialEq)]
pub struct PointRenderStyle {
    pub fill_color: SerializableColor,
    pub stroke_color: SerializableColor,
    pub stroke_width: f32,
    pub radius: f32,
    pub fill_opacity: f32,
    pub stroke_opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineRenderStyle {
    pub color: SerializableColor,
    pub width: f32,
    pub opacity: f32,
}

impl StyleConversion<PointRenderStyle> for PointStyle {
    fn to_render_style(&self, opacity_multiplier: f32) -> PointRenderStyle {
        PointRenderStyle {
            fill_color: self.fill_color,
            stroke_color: self.stroke_color,
            stroke_width: self.stroke_width,
            radius: self.radius,
            fill_opacity: self.fill_opacity * opacity_multiplier,
            stroke_opacity: self.stroke_opacity * opacity_multiplier,
        }
    }
}

impl StyleConversion<LineRenderStyle> for LineStyle {
    fn to_render_style(&self, opacity_multiplier: f32) -> LineRenderStyle {
        LineRenderStyle {
            color: self.color,
            width: self.width,
            opacity: self.opacity * opacity_multiplier,
        }
    }
}

/// A drawable shape in container pixel coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Circle {
        center: Point,
        style: PointRenderStyle,
    },
    Polyline {
        points: Vec<Point>,
        style: LineRenderStyle,
    },
    /// Arrow head pointing along `angle` (radians, screen space)
    Arrow {
        tip: Point,
        angle: f64,
        size: f32,
        color: SerializableColor,
        opacity: f32,
    },
}

/// Collects the primitives of one frame. Layers push into it; a UI backend
/// drains it and paints.
#[derive(Debug, Default)]
pub struct RenderContext {
    primitives: Vec<Primitive>,
    clip_bounds: Option<(Point, Point)>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new frame, dropping whatever the previous frame collected
    pub fn begin_frame(&mut self) {
        self.primitives.clear();
    }

    pub fn set_clip_bounds(&mut self, min: Point, max: Point) {
        self.clip_bounds = Some((min, max));
    }

    pub fn clear_clip_bounds(&mut self) {
        self.clip_bounds = None;
    }

    /// Whether a point lies inside the clip rectangle, padded by `margin`
    pub fn is_visible(&self, point: &Point, margin: f64) -> bool {
        match self.clip_bounds {
            Some((min, max)) => {
                point.x >= min.x - margin
                    && point.x <= max.x + margin
                    && point.y >= min.y - margin
                    && point.y <= max.y + margin
            }
            None => true,
        }
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_bounds() {
        let mut context = RenderContext::new();
        assert!(context.is_visible(&Point::new(-500.0, 0.0), 0.0));

        context.set_clip_bounds(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        assert!(context.is_visible(&Point::new(50.0, 50.0), 0.0));
        assert!(!context.is_visible(&Point::new(120.0, 50.0), 0.0));
        assert!(context.is_visible(&Point::new(120.0, 50.0), 25.0));

        context.clear_clip_bounds();
        assert!(context.is_visible(&Point::new(120.0, 50.0), 0.0));
    }

    #[test]
    fn test_begin_frame_clears() {
        let mut context = RenderContext::new();
        context.push(Primitive::Polyline {
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
            style: LineStyle::default().to_render_style(1.0),
        });
        assert_eq!(context.len(), 1);
        context.begin_frame();
        assert!(context.is_empty());
    }
}
