use crate::{
    core::{
        constants::{HOVER_RADIUS_GROWTH, HOVER_STROKE_WIDTH},
        geo::{LatLng, LatLngBounds},
        viewport::Viewport,
    },
    layers::{
        base::{LayerProperties, LayerTrait, LayerType},
        vector::PointStyle,
    },
    rendering::context::{Primitive, RenderContext, StyleConversion},
    Result,
};

/// A circle of fixed pixel radius at a geographic position
pub struct CircleMarker {
    properties: LayerProperties,
    position: LatLng,
    style: PointStyle,
    /// Radius at the reference zoom; `style.radius` is the scaled value
    base_radius: f32,
    popup_text: Option<String>,
    hovered: bool,
}

impl CircleMarker {
    pub fn new(id: String, position: LatLng) -> Self {
        let name = format!("Marker {}", id);
        let style = PointStyle::default();
        Self {
            properties: LayerProperties::new(id, name, LayerType::Marker),
            position,
            base_radius: style.radius,
            style,
            popup_text: None,
            hovered: false,
        }
    }

    pub fn with_style(mut self, style: PointStyle) -> Self {
        self.base_radius = style.radius;
        self.style = style;
        self
    }

    pub fn with_popup(mut self, text: String) -> Self {
        self.popup_text = Some(text);
        self
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn style(&self) -> &PointStyle {
        &self.style
    }

    pub fn radius(&self) -> f32 {
        self.style.radius
    }

    pub fn base_radius(&self) -> f32 {
        self.base_radius
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Hovered markers are drawn larger, with a heavier border and an
    /// opaque fill. The stored style is left untouched.
    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    /// Style used for drawing, including hover emphasis
    pub fn display_style(&self) -> PointStyle {
        let mut style = self.style.clone();
        if self.hovered {
            style.radius += HOVER_RADIUS_GROWTH;
            style.stroke_width = HOVER_STROKE_WIDTH;
            style.fill_opacity = 1.0;
        }
        style
    }

    /// Scales the radius relative to zoom 8, within half to double size
    pub fn scale_for_zoom(&mut self, zoom: f64) {
        let factor = (zoom / 8.0).clamp(0.5, 2.0) as f32;
        self.style.radius = self.base_radius * factor;
    }
}

impl LayerTrait for CircleMarker {
    crate::impl_layer_trait!(CircleMarker, properties);

    fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        let center = viewport.lat_lng_to_pixel(&self.position);
        let style = self.display_style();
        if !context.is_visible(&center, style.radius as f64) {
            return Ok(());
        }
        context.push(Primitive::Circle {
            center,
            style: style.to_render_style(self.properties.opacity),
        });
        Ok(())
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        Some(LatLngBounds::new(self.position, self.position))
    }

    fn popup(&self) -> Option<&str> {
        self.popup_text.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Point;

    #[test]
    fn test_scale_for_zoom() {
        let mut marker = CircleMarker::new("tokyo".into(), LatLng::new(35.6762, 139.6503))
            .with_style(PointStyle {
                radius: 12.0,
                ..PointStyle::default()
            });

        marker.scale_for_zoom(8.0);
        assert_eq!(marker.radius(), 12.0);
        marker.scale_for_zoom(12.0);
        assert_eq!(marker.radius(), 18.0);
        marker.scale_for_zoom(2.0);
        assert_eq!(marker.radius(), 6.0);
        marker.scale_for_zoom(18.0);
        assert_eq!(marker.radius(), 24.0);
        assert_eq!(marker.base_radius(), 12.0);
    }

    #[test]
    fn test_hover_emphasis() {
        let mut marker = CircleMarker::new("osaka".into(), LatLng::new(34.6937, 135.5023))
            .with_style(PointStyle {
                radius: 8.0,
                stroke_width: 3.0,
                fill_opacity: 0.8,
                ..PointStyle::default()
            });

        marker.set_hovered(true);
        let hovered = marker.display_style();
        assert_eq!(hovered.radius, 11.0);
        assert_eq!(hovered.stroke_width, 4.0);
        assert_eq!(hovered.fill_opacity, 1.0);
        // hit testing still uses the plain radius
        assert_eq!(marker.radius(), 8.0);

        marker.set_hovered(false);
        assert_eq!(marker.display_style(), *marker.style());
    }

    #[test]
    fn test_render_at_viewport_center() {
        let position = LatLng::new(35.0116, 135.7681);
        let viewport = Viewport::new(position, 10.0, Point::new(800.0, 600.0));
        let mut marker = CircleMarker::new("kyoto".into(), position).with_popup("Kyoto".into());
        let mut context = RenderContext::new();
        marker.render(&mut context, &viewport).unwrap();

        match &context.primitives()[0] {
            Primitive::Circle { center, .. } => {
                assert!((center.x - 400.0).abs() < 1e-6);
                assert!((center.y - 300.0).abs() < 1e-6);
            }
            other => panic!("unexpected primitive {:?}", other),
        }
        assert_eq!(marker.popup(), Some("Kyoto"));
    }
}
