use crate::app::MapApplication;

pub mod canvas;
pub mod popup;
pub mod style;
pub mod timeline;

pub use canvas::MapCanvas;
pub use popup::{paint_popup, PopupStyle};
pub use style::CanvasStyle;
pub use timeline::TimelinePanel;

/// Adds the map canvas of an application to a `Ui`
pub trait UiMapExt {
    fn trip_map(&mut self, app: &mut MapApplication) -> egui::Response;
}

impl UiMapExt for egui::Ui {
    fn trip_map(&mut self, app: &mut MapApplication) -> egui::Response {
        self.add(MapCanvas::new(app))
    }
}
