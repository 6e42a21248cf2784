use crate::{layers::vector::SerializableColor, ui::popup::PopupStyle};
use egui::{Color32, Stroke};

/// Look of the map canvas
#[derive(Debug, Clone)]
pub struct CanvasStyle {
    /// Fill behind the overlays; there are no base tiles
    pub background_color: Color32,
    pub border_stroke: Stroke,
    /// Extra pixels around a marker that still count as a click on it
    pub hit_slop: f32,
    pub popup: PopupStyle,
}

impl Default for CanvasStyle {
    fn default() -> Self {
        Self {
            background_color: Color32::from_rgb(226, 234, 240),
            border_stroke: Stroke::new(1.0, Color32::from_gray(180)),
            hit_slop: 4.0,
            popup: PopupStyle::default(),
        }
    }
}

impl CanvasStyle {
    pub fn dark() -> Self {
        Self {
            background_color: Color32::from_rgb(32, 36, 44),
            border_stroke: Stroke::new(1.0, Color32::from_gray(70)),
            popup: PopupStyle {
                background_color: Color32::from_rgb(48, 52, 60),
                border_color: Color32::from_gray(90),
                text_color: Color32::from_gray(230),
                ..PopupStyle::default()
            },
            ..Self::default()
        }
    }
}

/// Applies a 0..=1 opacity to a color
pub fn with_opacity(color: SerializableColor, opacity: f32) -> Color32 {
    let alpha = (color.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, alpha)
}
