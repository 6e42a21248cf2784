//! Paints the map overlays with egui and turns pointer input into
//! application input.

use crate::{
    app::MapApplication,
    core::geo::Point,
    input::events::InputEvent,
    layers::marker::CircleMarker,
    rendering::context::{Primitive, RenderContext},
    ui::{
        popup::paint_popup,
        style::{with_opacity, CanvasStyle},
    },
};
use egui::{Painter, Pos2, Response, Sense, Shape, Stroke, Ui, Vec2, Widget};

/// The map view of a [`MapApplication`]
pub struct MapCanvas<'a> {
    app: &'a mut MapApplication,
    style: CanvasStyle,
    size: Option<Vec2>,
    interactive: bool,
}

impl<'a> MapCanvas<'a> {
    pub fn new(app: &'a mut MapApplication) -> Self {
        Self {
            app,
            style: CanvasStyle::default(),
            size: None,
            interactive: true,
        }
    }

    pub fn style(mut self, style: CanvasStyle) -> Self {
        self.style = style;
        self
    }

    pub fn size(mut self, size: Vec2) -> Self {
        self.size = Some(size);
        self
    }

    /// Enable or disable panning, zooming and marker clicks
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    fn sync_size(&mut self, size: Vec2) {
        let size = Point::new(size.x as f64, size.y as f64);
        if size.x > 0.0 && size.y > 0.0 && self.app.map().viewport().size != size {
            self.app.handle_input(InputEvent::Resize { size });
        }
    }

    fn handle_pan_zoom(&mut self, ui: &Ui, response: &Response) {
        let viewport = self.app.map().viewport();
        let center = viewport.center;
        let zoom = viewport.zoom;

        if response.dragged() {
            let delta = response.drag_delta();
            if delta.length_sq() > 0.5 {
                let middle = viewport.size.multiply(0.5);
                let target = Point::new(middle.x - delta.x as f64, middle.y - delta.y as f64);
                let new_center = viewport.pixel_to_lat_lng(&target);
                self.app.map_mut().set_view(new_center, zoom);
                return;
            }
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.1 {
                let new_zoom = viewport.clamp_zoom(zoom + scroll.signum() as f64);
                if new_zoom != zoom {
                    self.app.map_mut().set_view(center, new_zoom);
                }
            }
        }
    }

    /// Location marker under a container-relative position, nearest first
    fn marker_at(&self, pos: Point) -> Option<String> {
        let map = self.app.map();
        let viewport = map.viewport();
        self.app
            .data()
            .locations()
            .iter()
            .filter_map(|location| {
                let layer = map.get_layer(&location.key)?;
                let marker = layer.as_any().downcast_ref::<CircleMarker>()?;
                let distance = viewport
                    .lat_lng_to_pixel(&marker.position())
                    .distance_to(&pos);
                let reach = marker.radius() as f64 + self.style.hit_slop as f64;
                (distance <= reach).then_some((distance, location.key.clone()))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, key)| key)
    }

    fn paint_popup(&self, painter: &Painter, origin: Pos2) {
        let map = self.app.map();
        let Some((layer_id, text)) = map.open_popup_content() else {
            return;
        };
        let Some(anchor) = map
            .get_layer(layer_id)
            .and_then(|layer| layer.bounds())
            .map(|bounds| bounds.center())
        else {
            return;
        };
        let anchor = to_pos(origin, &map.viewport().lat_lng_to_pixel(&anchor));
        paint_popup(painter, anchor, text, &self.style.popup, painter.clip_rect());
    }
}

impl Widget for MapCanvas<'_> {
    fn ui(mut self, ui: &mut Ui) -> Response {
        let desired_size = self.size.unwrap_or_else(|| ui.available_size());
        let (response, painter) = ui.allocate_painter(desired_size, Sense::click_and_drag());
        let rect = response.rect;
        self.sync_size(rect.size());

        if self.interactive {
            self.handle_pan_zoom(ui, &response);

            let hovered = response
                .hover_pos()
                .map(|pointer| pointer - rect.min)
                .and_then(|local| self.marker_at(Point::new(local.x as f64, local.y as f64)));
            self.app.hover_marker(hovered.as_deref());
            if hovered.is_some() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }

            if response.clicked() {
                if let Some(pointer) = response.interact_pointer_pos() {
                    let local = pointer - rect.min;
                    match self.marker_at(Point::new(local.x as f64, local.y as f64)) {
                        Some(key) => self
                            .app
                            .handle_input(InputEvent::LocationMarkerClick { key }),
                        None => self.app.map_mut().close_popup(),
                    }
                }
            }
        }

        painter.rect_filled(rect, 0.0, self.style.background_color);

        let mut context = RenderContext::new();
        if let Err(e) = self.app.render(&mut context) {
            log::warn!("Failed to render map: {}", e);
        }
        for primitive in context.primitives() {
            paint_primitive(&painter, rect.min, primitive);
        }

        self.paint_popup(&painter, rect.min);
        painter.rect_stroke(rect, 0.0, self.style.border_stroke);

        response
    }
}

fn to_pos(origin: Pos2, point: &Point) -> Pos2 {
    origin + Vec2::new(point.x as f32, point.y as f32)
}

fn paint_primitive(painter: &Painter, origin: Pos2, primitive: &Primitive) {
    match primitive {
        Primitive::Circle { center, style } => {
            painter.circle(
                to_pos(origin, center),
                style.radius,
                with_opacity(style.fill_color, style.fill_opacity),
                Stroke::new(
                    style.stroke_width,
                    with_opacity(style.stroke_color, style.stroke_opacity),
                ),
            );
        }
        Primitive::Polyline { points, style } => {
            if points.len() < 2 {
                return;
            }
            let points = points.iter().map(|p| to_pos(origin, p)).collect();
            painter.add(Shape::line(
                points,
                Stroke::new(style.width, with_opacity(style.color, style.opacity)),
            ));
        }
        Primitive::Arrow {
            tip,
            angle,
            size,
            color,
            opacity,
        } => {
            let tip = to_pos(origin, tip);
            let direction = Vec2::angled(*angle as f32);
            let normal = direction.rot90();
            let back = tip - direction * *size;
            let points = vec![
                tip,
                back + normal * (*size * 0.5),
                back - normal * (*size * 0.5),
            ];
            painter.add(Shape::convex_polygon(
                points,
                with_opacity(*color, *opacity),
                Stroke::NONE,
            ));
        }
    }
}
