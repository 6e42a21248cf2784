use std::{cell::RefCell, path::PathBuf, rc::Rc, time::Duration};

use anyhow::Context;
use clap::Parser;
use tripmap::{
    events::EventKind,
    ui::{MapCanvas, TimelinePanel},
    MapApplication, TravelData, TripConfig, TripEvent,
};

#[derive(Parser)]
#[command(name = "tripmap-app")]
#[command(about = "Interactive map of the Japan winter trip with a day-by-day timeline")]
#[command(version)]
struct Args {
    /// Map and timeline configuration (JSON); defaults are used when omitted
    config: Option<PathBuf>,

    /// Travel data (JSON); the bundled itinerary is used when omitted
    data: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let Args {
        config: config_path,
        data: data_path,
    } = Args::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Japan Winter Trip 2025"),
        ..Default::default()
    };

    eframe::run_native(
        "tripmap-app",
        options,
        Box::new(move |_cc| Box::new(TripApp::new(config_path, data_path))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {}", e))?;

    Ok(())
}

fn load(
    config_path: Option<PathBuf>,
    data_path: Option<PathBuf>,
) -> anyhow::Result<MapApplication> {
    let config = match config_path {
        Some(path) => TripConfig::load(&path)?,
        None => TripConfig::default(),
    };
    let data = match data_path {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            TravelData::from_json(&json)?
        }
        None => TravelData::embedded()?,
    };

    let mut app = MapApplication::new(config, data).context("map initialization failed")?;
    app.init()?;
    Ok(app)
}

enum TripApp {
    Ready {
        app: MapApplication,
        panel: TimelinePanel,
        announcement: Rc<RefCell<Option<String>>>,
    },
    /// Shown instead of the map when loading failed
    Failed(String),
}

impl TripApp {
    fn new(config_path: Option<PathBuf>, data_path: Option<PathBuf>) -> Self {
        match load(config_path, data_path) {
            Ok(mut app) => {
                let announcement = Rc::new(RefCell::new(None));
                let latest = Rc::clone(&announcement);
                app.subscribe_to(EventKind::Announcement, move |event| {
                    if let TripEvent::Announcement(text) = event {
                        *latest.borrow_mut() = Some(text.clone());
                    }
                });
                TripApp::Ready {
                    app,
                    panel: TimelinePanel::new(),
                    announcement,
                }
            }
            Err(e) => {
                log::error!("{:#}", e);
                TripApp::Failed(format!("{:#}", e))
            }
        }
    }
}

impl eframe::App for TripApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (app, panel, announcement) = match self {
            TripApp::Ready {
                app,
                panel,
                announcement,
            } => (app, panel, announcement),
            TripApp::Failed(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.centered_and_justified(|ui| {
                        ui.label(format!(
                            "Map could not be loaded.\n\n{}",
                            message
                        ));
                    });
                });
                return;
            }
        };

        let dt = ctx.input(|i| i.stable_dt).clamp(0.0, 0.1);
        if let Err(e) = app.advance(Duration::from_secs_f32(dt)) {
            app.log_error("frame update", &e);
        }

        egui::TopBottomPanel::bottom("timeline_panel").show(ctx, |ui| {
            panel.show(ui, app);
            if let Some(text) = announcement.borrow().as_ref() {
                ui.weak(text);
            }
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                ui.add(MapCanvas::new(app));
            });

        if app.is_animating() {
            ctx.request_repaint_after(Duration::from_millis(16));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_are_optional_paths() {
        let args = Args::try_parse_from(["tripmap-app"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.data.is_none());

        let args = Args::try_parse_from(["tripmap-app", "config.json", "trip.json"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("config.json")));
        assert_eq!(args.data, Some(PathBuf::from("trip.json")));
    }

    #[test]
    fn test_extra_args_are_rejected() {
        assert!(Args::try_parse_from(["tripmap-app", "a.json", "b.json", "c.json"]).is_err());
        assert!(Args::try_parse_from(["tripmap-app", "--fullscreen"]).is_err());
    }
}
