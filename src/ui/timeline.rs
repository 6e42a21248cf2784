use crate::{
    app::MapApplication,
    core::constants::TRIP_DAYS,
    input::events::{Button, FocusTarget, InputEvent, KeyCode},
};
use egui::{Id, Key, ProgressBar, RichText, Slider, Ui};

const KEY_BINDINGS: [(Key, KeyCode); 5] = [
    (Key::Space, KeyCode::Space),
    (Key::ArrowLeft, KeyCode::ArrowLeft),
    (Key::ArrowRight, KeyCode::ArrowRight),
    (Key::Home, KeyCode::Home),
    (Key::End, KeyCode::End),
];

/// Day slider, playback buttons and the details of the current day
#[derive(Debug, Clone)]
pub struct TimelinePanel {
    pub show_details: bool,
    pub keyboard_shortcuts: bool,
    /// Buttons, slider and marker labels drawn last frame
    widget_ids: Vec<Id>,
}

impl Default for TimelinePanel {
    fn default() -> Self {
        Self {
            show_details: true,
            keyboard_shortcuts: true,
            widget_ids: Vec::new(),
        }
    }
}

/// Where a shortcut key should go, or `None` when the focused panel widget
/// already reacts to the key itself (Space clicks a button, arrows move the
/// slider).
fn shortcut_target(focused: Option<Id>, panel_ids: &[Id], wants_text: bool) -> Option<FocusTarget> {
    if wants_text {
        return Some(FocusTarget::TextInput);
    }
    match focused {
        Some(id) if panel_ids.contains(&id) => None,
        _ => Some(FocusTarget::Other),
    }
}

impl TimelinePanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether one of the panel's own controls has keyboard focus
    pub fn has_focus(&self, ctx: &egui::Context) -> bool {
        ctx.memory(|m| m.focus())
            .map_or(false, |id| self.widget_ids.contains(&id))
    }

    pub fn widget_ids(&self) -> &[Id] {
        &self.widget_ids
    }

    /// Draws the panel and feeds whatever the user did into `app`
    pub fn show(&mut self, ui: &mut Ui, app: &mut MapApplication) {
        let events = self.collect_input(ui, app);
        for event in events {
            app.handle_input(event);
        }
    }

    fn collect_input(&mut self, ui: &mut Ui, app: &MapApplication) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let mut ids = Vec::new();
        let view = app.timeline().view();

        ui.horizontal(|ui| {
            for (label, button) in [
                (view.play_label, Button::PlayPause),
                ("Reset", Button::Reset),
                ("Show Full Route", Button::ShowFullRoute),
            ] {
                let response = ui.button(label);
                ids.push(response.id);
                if response.clicked() {
                    events.push(InputEvent::ButtonClick(button));
                }
            }
            ui.separator();
            ui.label(RichText::new(&view.day_label).strong());
            ui.label(&view.date_label);
            ui.label(&view.location_name);
        });

        let mut day = app.timeline().current_day() as i64;
        ui.spacing_mut().slider_width = ui.available_width();
        let slider = ui.add(Slider::new(&mut day, 1..=TRIP_DAYS as i64).show_value(false));
        ids.push(slider.id);
        if slider.changed() {
            events.push(InputEvent::SliderInput { value: day });
        } else if slider.drag_released() {
            events.push(InputEvent::SliderChange { value: day });
        }
        ui.add(ProgressBar::new(view.progress));

        ui.horizontal(|ui| {
            for (marker_day, active) in &view.markers {
                let label = ui.selectable_label(*active, format!("Day {}", marker_day));
                ids.push(label.id);
                if label.clicked() {
                    events.push(InputEvent::TimelineMarkerClick {
                        day: Some(*marker_day),
                    });
                }
            }
        });

        if self.show_details {
            let data = app.timeline().current_day_data();
            ui.separator();
            ui.heading(&data.title);
            for activity in &data.activities {
                ui.label(format!(
                    "{}  {} ({} min)",
                    activity.time, activity.name, activity.duration_min
                ));
            }
        }

        if self.keyboard_shortcuts {
            let focused = ui.memory(|m| m.focus());
            if let Some(target) =
                shortcut_target(focused, &ids, ui.ctx().wants_keyboard_input())
            {
                for (egui_key, key) in KEY_BINDINGS {
                    if ui.input(|i| i.key_pressed(egui_key)) {
                        events.push(InputEvent::KeyPress { key, target });
                    }
                }
            }
        }

        self.widget_ids = ids;
        events
    }
}
