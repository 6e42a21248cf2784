use egui::{Color32, FontId, Painter, Pos2, Rect, Vec2};

#[derive(Debug, Clone)]
pub struct PopupStyle {
    pub background_color: Color32,
    pub border_color: Color32,
    pub border_width: f32,
    pub rounding: f32,
    pub padding: f32,
    pub font_id: FontId,
    pub title_font_id: FontId,
    pub text_color: Color32,
    pub max_width: f32,
    /// Gap between the anchor point and the popup's bottom edge
    pub offset: f32,
}

impl Default for PopupStyle {
    fn default() -> Self {
        Self {
            background_color: Color32::WHITE,
            border_color: Color32::GRAY,
            border_width: 1.0,
            rounding: 4.0,
            padding: 8.0,
            font_id: FontId::proportional(12.0),
            title_font_id: FontId::proportional(14.0),
            text_color: Color32::BLACK,
            max_width: 300.0,
            offset: 14.0,
        }
    }
}

/// Paints popup text above `anchor`, kept inside `clip`. The first line is
/// drawn as the title.
pub fn paint_popup(painter: &Painter, anchor: Pos2, text: &str, style: &PopupStyle, clip: Rect) {
    let (title, body) = text.split_once('\n').unwrap_or((text, ""));
    let wrap_width = style.max_width - style.padding * 2.0;

    let title_galley = painter.layout(
        title.to_string(),
        style.title_font_id.clone(),
        style.text_color,
        wrap_width,
    );
    let body_galley = painter.layout(
        body.to_string(),
        style.font_id.clone(),
        style.text_color,
        wrap_width,
    );

    let content = Vec2::new(
        title_galley.size().x.max(body_galley.size().x),
        title_galley.size().y + body_galley.size().y,
    );
    let size = content + Vec2::splat(style.padding * 2.0);

    let mut min = Pos2::new(anchor.x - size.x / 2.0, anchor.y - style.offset - size.y);
    min.x = min.x.clamp(clip.min.x, (clip.max.x - size.x).max(clip.min.x));
    min.y = min.y.max(clip.min.y);
    let rect = Rect::from_min_size(min, size);

    painter.rect_filled(rect, style.rounding, style.background_color);
    painter.rect_stroke(
        rect,
        style.rounding,
        (style.border_width, style.border_color),
    );

    let text_min = rect.min + Vec2::splat(style.padding);
    let body_min = text_min + Vec2::new(0.0, title_galley.size().y);
    painter.galley(text_min, title_galley, style.text_color);
    painter.galley(body_min, body_galley, style.text_color);
}
