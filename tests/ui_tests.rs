#![cfg(feature = "egui")]

use egui::{Context, RawInput};
use tripmap::{
    ui::{MapCanvas, TimelinePanel},
    MapApplication, TravelData, TripConfig,
};

fn app() -> MapApplication {
    let mut app =
        MapApplication::new(TripConfig::default(), TravelData::embedded().unwrap()).unwrap();
    app.init().unwrap();
    app
}

/// Runs one frame with the timeline panel at the bottom and the map above
fn run_frame(ctx: &Context, app: &mut MapApplication, panel: &mut TimelinePanel) -> egui::Rect {
    let mut rect = egui::Rect::NOTHING;
    let _ = ctx.run(RawInput::default(), |ctx| {
        egui::TopBottomPanel::bottom("timeline").show(ctx, |ui| {
            panel.show(ui, app);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            rect = ui.add(MapCanvas::new(app)).rect;
        });
    });
    rect
}

#[test]
fn test_canvas_adopts_allocated_size() {
    let ctx = Context::default();
    let mut app = app();
    let mut panel = TimelinePanel::new();

    let rect = run_frame(&ctx, &mut app, &mut panel);
    assert!(rect.width() > 0.0);
    assert!(rect.height() > 0.0);

    let size = app.map().viewport().size;
    assert_eq!(size.x, rect.width() as f64);
    assert_eq!(size.y, rect.height() as f64);
}

#[test]
fn test_idle_frames_leave_timeline_alone() {
    let ctx = Context::default();
    let mut app = app();
    let mut panel = TimelinePanel::new();

    for _ in 0..3 {
        run_frame(&ctx, &mut app, &mut panel);
    }
    assert_eq!(app.timeline().current_day(), 1);
    assert!(!app.timeline().is_playing());
    assert_eq!(app.metrics().interactions, 0);
}

#[test]
fn test_panel_reports_focus_on_its_controls() {
    let ctx = Context::default();
    let mut app = app();
    let mut panel = TimelinePanel::new();

    run_frame(&ctx, &mut app, &mut panel);
    // three buttons, the slider and one label per stay
    assert_eq!(panel.widget_ids().len(), 4 + app.data().policy().transition_days().len());
    assert!(!panel.has_focus(&ctx));

    let play = panel.widget_ids()[0];
    ctx.memory_mut(|m| m.request_focus(play));
    run_frame(&ctx, &mut app, &mut panel);
    assert!(panel.has_focus(&ctx));
    assert!(!app.timeline().is_playing());
}
