//! End-to-end behaviour of the composed application: map setup, route
//! overlays following the timeline, focus and the journey animation.

use std::{cell::RefCell, rc::Rc, time::Duration};

use tripmap::{
    core::config::{Capabilities, MapViewConfig},
    events::EventKind,
    input::events::{Button, InputEvent},
    layers::marker::CircleMarker,
    rendering::{Primitive, RenderContext},
    MapApplication, TravelData, TripConfig, TripError, TripEvent,
};

fn new_app(config: TripConfig) -> MapApplication {
    MapApplication::new(config, TravelData::embedded().unwrap()).unwrap()
}

fn app() -> MapApplication {
    let mut app = new_app(TripConfig::default());
    app.init().unwrap();
    app
}

fn advance_ms(app: &mut MapApplication, ms: u64) {
    app.advance(Duration::from_millis(ms)).unwrap();
}

fn marker_radius(app: &MapApplication, key: &str) -> f32 {
    app.map()
        .get_layer(key)
        .and_then(|layer| layer.as_any().downcast_ref::<CircleMarker>())
        .map(|marker| marker.radius())
        .unwrap()
}

#[test]
fn test_map_ready_is_sent_once() {
    let mut app = new_app(TripConfig::default());
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    app.subscribe_to(EventKind::MapReady, move |_| *sink.borrow_mut() += 1);

    app.init().unwrap();
    app.init().unwrap();
    assert_eq!(*count.borrow(), 1);
    assert!(app.metrics().load_time_ms.is_some());
}

#[test]
fn test_init_draws_first_day_route() {
    let app = app();
    assert_eq!(app.animator().overlay_layers(), ["route:tokyo-to-fuji"]);
    assert_eq!(
        app.map().layer_count(),
        app.data().locations().len() + 1
    );
}

#[test]
fn test_missing_container_is_fatal() {
    let config = TripConfig {
        map: MapViewConfig {
            container_size: None,
            ..MapViewConfig::default()
        },
        ..TripConfig::default()
    };
    let result = MapApplication::new(config, TravelData::embedded().unwrap());
    assert!(matches!(result, Err(TripError::MissingDependency(_))));
}

#[test]
fn test_unreadable_travel_data() {
    let result = MapApplication::from_json(TripConfig::default(), "{ not json");
    assert!(matches!(result, Err(TripError::Serialization(_))));
}

#[test]
fn test_initial_focus_on_first_location() {
    let mut app = app();
    advance_ms(&mut app, 1000);

    let tokyo = app.data().location("tokyo").unwrap().coords;
    assert!(app.map().is_flying());
    assert_eq!(app.map().camera_target(), (tokyo, 11.0));

    advance_ms(&mut app, 1500);
    assert!(!app.map().is_flying());
    assert_eq!(app.map().open_popup_content().map(|(id, _)| id), Some("tokyo"));
}

#[test]
fn test_unknown_focus_leaves_camera_alone() {
    let mut app = app();
    let before = app.map().camera_target();
    let pending = app.scheduler().pending_effects();

    app.focus_location("atlantis");
    assert_eq!(app.map().camera_target(), before);
    assert!(!app.map().is_flying());
    assert_eq!(app.scheduler().pending_effects(), pending);
    assert!(matches!(
        app.try_focus_location("atlantis"),
        Err(TripError::UnknownLocation(_))
    ));
}

#[test]
fn test_focus_location_opens_popup_after_flight() {
    let mut app = app();
    advance_ms(&mut app, 3000);

    app.focus_location("kyoto");
    let kyoto = app.data().location("kyoto").unwrap().coords;
    assert_eq!(app.map().camera_target(), (kyoto, 11.0));

    advance_ms(&mut app, 1499);
    assert_ne!(app.map().open_popup_content().map(|(id, _)| id), Some("kyoto"));
    advance_ms(&mut app, 1);
    assert_eq!(app.map().open_popup_content().map(|(id, _)| id), Some("kyoto"));
    assert!(app.metrics().popups_opened >= 2);
}

#[test]
fn test_markers_scale_with_zoom() {
    let mut app = app();
    advance_ms(&mut app, 3000);
    assert_eq!(app.map().zoom(), 11.0);
    assert_eq!(marker_radius(&app, "tokyo"), 12.0 * 11.0 / 8.0);
    assert!(app.visible_markers().iter().any(|key| key == "tokyo"));
    assert!(!app.visible_markers().iter().any(|key| key == "osaka"));
}

#[test]
fn test_route_follows_day() {
    let mut app = app();
    app.handle_input(InputEvent::SliderInput { value: 8 });
    let drawn = app.animator().drawn_segments().to_vec();
    assert_eq!(drawn.len(), 2);
    assert!(drawn[0].complete);
    assert!(!drawn[1].complete);
    assert_eq!(
        app.animator().overlay_layers(),
        [
            "route:tokyo-to-fuji",
            "arrows:tokyo-to-fuji",
            "route:fuji-to-alps"
        ]
    );

    app.handle_input(InputEvent::SliderInput { value: 1 });
    assert_eq!(app.animator().overlay_layers(), ["route:tokyo-to-fuji"]);
}

#[test]
fn test_missing_decorator_only_drops_arrows() {
    let mut app = new_app(TripConfig {
        capabilities: Capabilities::none(),
        ..TripConfig::default()
    });
    app.init().unwrap();
    app.handle_input(InputEvent::SliderInput { value: 21 });
    assert_eq!(app.animator().drawn_segments().len(), 4);
    assert!(app
        .animator()
        .overlay_layers()
        .iter()
        .all(|id| id.starts_with("route:")));
}

#[test]
fn test_show_full_route_is_idempotent() {
    let mut app = app();
    app.show_full_route();
    let first = app.animator().overlay_layers().to_vec();
    let layers = app.map().layer_count();

    app.show_full_route();
    assert_eq!(app.animator().overlay_layers(), first);
    assert_eq!(app.map().layer_count(), layers);
    assert_eq!(first.len(), 8);
    assert!(app.animator().drawn_segments().iter().all(|s| s.complete));
}

#[test]
fn test_show_full_route_button_fits_camera() {
    let mut app = app();
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    app.subscribe_to(EventKind::ShowFullRoute, move |_| *sink.borrow_mut() += 1);

    app.handle_input(InputEvent::ButtonClick(Button::ShowFullRoute));
    assert_eq!(*count.borrow(), 1);

    advance_ms(&mut app, 4 * 300 + 500);
    assert!(app.map().is_flying());
    advance_ms(&mut app, 1000);
    let view = app.map().viewport().bounds();
    for segment in app.data().route_segments() {
        assert!(view.contains(&segment.from));
        assert!(view.contains(&segment.to));
    }
}

#[test]
fn test_day_change_highlight_expires() {
    let mut app = app();
    advance_ms(&mut app, 3000);

    app.handle_input(InputEvent::SliderInput { value: 8 });
    let highlights = app.animator().active_highlights().to_vec();
    assert_eq!(highlights.len(), 1);
    assert!(app.map().has_layer(&highlights[0]));
    assert_eq!(
        app.map().open_popup_content().map(|(id, _)| id),
        Some(highlights[0].as_str())
    );

    let target = app.data().location("kawaguchiko").unwrap().coords;
    assert_eq!(app.map().camera_target(), (target, 10.0));

    advance_ms(&mut app, 3000);
    assert!(app.animator().active_highlights().is_empty());
    assert!(!app.map().has_layer(&highlights[0]));
}

#[test]
fn test_highlights_survive_redraws() {
    let mut app = app();
    app.handle_input(InputEvent::SliderInput { value: 8 });
    app.handle_input(InputEvent::SliderInput { value: 9 });
    assert_eq!(app.animator().active_highlights().len(), 2);
}

#[test]
fn test_journey_animation_runs_to_completion() {
    let mut app = app();
    app.play_route_animation().unwrap();
    assert!(app.animator().animation_state().is_animating);

    advance_ms(&mut app, 1000);
    assert_eq!(app.animator().animation_state().current_step, 1);

    advance_ms(&mut app, 3 * 2600 + 1600);
    let state = app.animator().animation_state();
    assert!(!state.is_animating);
    assert_eq!(state.current_step, 4);
    assert_eq!(state.total_steps, 4);
}

#[test]
fn test_hidden_page_stops_journey() {
    let mut app = app();
    app.play_route_animation().unwrap();
    advance_ms(&mut app, 1000);

    app.handle_input(InputEvent::VisibilityChange { hidden: true });
    let state = app.animator().animation_state();
    assert!(!state.is_animating);
    assert_eq!(state.current_step, 0);
    assert!(app.animator().overlay_layers().is_empty());
}

#[test]
fn test_marker_click_opens_popup() {
    let mut app = app();
    app.handle_input(InputEvent::LocationMarkerClick {
        key: "osaka".to_string(),
    });
    let (id, text) = app.map().open_popup_content().unwrap();
    assert_eq!(id, "osaka");
    assert!(text.starts_with("Osaka"));
    assert_eq!(app.metrics().last_interaction.as_deref(), Some("marker_click"));
}

#[test]
fn test_render_draws_markers_and_route() {
    let mut app = app();
    app.handle_input(InputEvent::SliderInput { value: 21 });
    let mut context = RenderContext::new();
    app.render(&mut context).unwrap();

    let circles = context
        .primitives()
        .iter()
        .filter(|p| matches!(p, Primitive::Circle { .. }))
        .count();
    let lines = context
        .primitives()
        .iter()
        .filter(|p| matches!(p, Primitive::Polyline { .. }))
        .count();
    assert!(circles >= 1);
    assert!(lines >= 1);
}

#[test]
fn test_destroy_clears_everything() {
    let mut app = app();
    app.handle_input(InputEvent::ButtonClick(Button::PlayPause));
    app.handle_input(InputEvent::SliderInput { value: 12 });

    app.destroy();
    assert_eq!(app.map().layer_count(), 0);
    assert!(!app.timeline().is_playing());
    assert!(!app.scheduler().is_ticking());
    assert_eq!(app.scheduler().pending_effects(), 0);
}

#[test]
fn test_forwarded_events_reach_subscribers_after_handlers() {
    let mut app = app();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    app.subscribe_to(EventKind::DayChanged, move |event| {
        if let TripEvent::DayChanged { day, .. } = event {
            sink.borrow_mut().push(*day);
        }
    });

    app.handle_input(InputEvent::SliderInput { value: 15 });
    assert_eq!(*seen.borrow(), [15]);
    // the animator already redrew by the time the call returns
    assert_eq!(app.animator().drawn_segments().len(), 4);
}
