use crate::{
    animation::{
        easing::EasingType,
        flight::{CameraFlight, CameraState},
    },
    core::{
        config::MapViewConfig,
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    layers::{base::LayerTrait, manager::LayerManager},
    prelude::{Duration, VecDeque},
    rendering::context::RenderContext,
    Result, TripError,
};

/// Notifications about the map itself, drained with [`Map::process_events`]
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Map view has changed (center or zoom)
    ViewChanged { center: LatLng, zoom: f64 },
    /// A camera move finished
    MoveEnd { center: LatLng },
    /// A camera move that changed the zoom finished
    ZoomEnd { zoom: f64 },
    /// Layer was added to the map
    LayerAdd { layer_id: String },
    /// Layer was removed from the map
    LayerRemove { layer_id: String },
    /// A layer's popup was opened
    PopupOpen { layer_id: String },
}

/// The map handle: camera, overlay layers, popup and event queue
pub struct Map {
    pub viewport: Viewport,
    layer_manager: LayerManager,
    flight: Option<CameraFlight>,
    easing: EasingType,
    events: VecDeque<MapEvent>,
    open_popup: Option<String>,
}

impl Map {
    /// Creates the map inside its container. A map without a container
    /// cannot exist.
    pub fn new(config: &MapViewConfig) -> Result<Self> {
        let size = config.container_size.ok_or_else(|| {
            TripError::MissingDependency("map container is not available".to_string())
        })?;
        if size.x <= 0.0 || size.y <= 0.0 {
            return Err(TripError::MissingDependency(format!(
                "map container has no area ({}x{})",
                size.x, size.y
            )));
        }

        let mut viewport = Viewport::new(config.center, config.zoom, size);
        viewport.set_zoom_limits(config.min_zoom, config.max_zoom);
        viewport.set_max_bounds(config.max_bounds);
        viewport.set_zoom(config.zoom);

        Ok(Self {
            viewport,
            layer_manager: LayerManager::new(),
            flight: None,
            easing: EasingType::default(),
            events: VecDeque::new(),
            open_popup: None,
        })
    }

    pub fn set_easing(&mut self, easing: EasingType) {
        self.easing = easing;
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn center(&self) -> LatLng {
        self.viewport.center
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    pub fn set_size(&mut self, size: Point) {
        if size != self.viewport.size {
            self.viewport.set_size(size);
            self.events.push_back(MapEvent::MoveEnd {
                center: self.viewport.center,
            });
        }
    }

    /// Moves the camera immediately, superseding any flight in progress
    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.flight = None;
        self.apply_camera(center, zoom);
        self.finish_move();
    }

    /// Starts an animated camera move; a flight already in progress is
    /// replaced and continues from the current position
    pub fn fly_to(&mut self, center: LatLng, zoom: f64, duration: Duration) {
        let target_center = self.viewport.clamp_center(center);
        let target_zoom = self.viewport.clamp_zoom(zoom);
        if duration.is_zero() {
            self.set_view(target_center, target_zoom);
            return;
        }

        log::debug!(
            "Flying to ({:.4}, {:.4}) z{} over {:?}",
            target_center.lat,
            target_center.lng,
            target_zoom,
            duration
        );
        self.flight = Some(CameraFlight::new(
            self.viewport.center,
            self.viewport.zoom,
            target_center,
            target_zoom,
            duration,
            self.easing,
        ));
    }

    /// Flies to the view that contains `bounds` with `padding` pixels to spare
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds, padding: f64, duration: Duration) {
        let (center, zoom) = self.viewport.fit_view(bounds, padding);
        self.fly_to(center, zoom, duration);
    }

    /// Where the camera is heading, or where it is when idle
    pub fn camera_target(&self) -> (LatLng, f64) {
        self.flight
            .as_ref()
            .map(|flight| flight.target())
            .unwrap_or((self.viewport.center, self.viewport.zoom))
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    /// Advances the camera flight and layer animations by `delta`
    pub fn update(&mut self, delta: Duration) -> Result<()> {
        if let Some(flight) = &mut self.flight {
            let CameraState {
                center,
                zoom,
                progress,
            } = flight.step(delta);
            self.apply_camera(center, zoom);
            if progress >= 1.0 {
                self.flight = None;
                self.finish_move();
            }
        }

        self.layer_manager
            .update(delta.as_secs_f64(), &self.viewport)
    }

    fn apply_camera(&mut self, center: LatLng, zoom: f64) {
        let old_center = self.viewport.center;
        let old_zoom = self.viewport.zoom;
        self.viewport.set_center(center);
        self.viewport.set_zoom(zoom);

        if self.viewport.center != old_center || self.viewport.zoom != old_zoom {
            self.events.push_back(MapEvent::ViewChanged {
                center: self.viewport.center,
                zoom: self.viewport.zoom,
            });
        }
    }

    fn finish_move(&mut self) {
        self.events.push_back(MapEvent::MoveEnd {
            center: self.viewport.center,
        });
        self.events.push_back(MapEvent::ZoomEnd {
            zoom: self.viewport.zoom,
        });
    }

    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        self.layer_manager.add_layer(layer)?;
        self.events.push_back(MapEvent::LayerAdd { layer_id });
        Ok(())
    }

    /// Removes a layer; returns whether it was on the map
    pub fn remove_layer(&mut self, layer_id: &str) -> bool {
        if self.layer_manager.remove_layer(layer_id).is_none() {
            return false;
        }
        if self.open_popup.as_deref() == Some(layer_id) {
            self.open_popup = None;
        }
        self.events.push_back(MapEvent::LayerRemove {
            layer_id: layer_id.to_string(),
        });
        true
    }

    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layer_manager.get_layer(layer_id)
    }

    pub fn has_layer(&self, layer_id: &str) -> bool {
        self.layer_manager.has_layer(layer_id)
    }

    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layer_manager.with_layer_mut(layer_id, f)
    }

    pub fn for_each_layer_mut<F>(&mut self, f: F)
    where
        F: FnMut(&mut dyn LayerTrait),
    {
        self.layer_manager.for_each_layer_mut(f)
    }

    /// Layer IDs in render order
    pub fn list_layers(&self) -> Vec<String> {
        self.layer_manager.list_layers()
    }

    pub fn layer_count(&self) -> usize {
        self.layer_manager.len()
    }

    /// Opens the popup bound to a layer. Only one popup is open at a time.
    pub fn open_popup(&mut self, layer_id: &str) -> bool {
        let has_popup = self
            .layer_manager
            .get_layer(layer_id)
            .and_then(|layer| layer.popup())
            .is_some();
        if !has_popup {
            log::debug!("Layer '{}' has no popup to open", layer_id);
            return false;
        }

        self.open_popup = Some(layer_id.to_string());
        self.events.push_back(MapEvent::PopupOpen {
            layer_id: layer_id.to_string(),
        });
        true
    }

    pub fn close_popup(&mut self) {
        self.open_popup = None;
    }

    /// The open popup as `(layer id, text)`
    pub fn open_popup_content(&self) -> Option<(&str, &str)> {
        let layer_id = self.open_popup.as_deref()?;
        let text = self.layer_manager.get_layer(layer_id)?.popup()?;
        Some((layer_id, text))
    }

    /// Drains pending map events in the order they happened
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        self.events.drain(..).collect()
    }

    /// Draws every visible layer into `context`
    pub fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        context.begin_frame();
        context.set_clip_bounds(Point::new(0.0, 0.0), self.viewport.size);
        let result = self.layer_manager.render(context, &self.viewport);
        context.clear_clip_bounds();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::marker::CircleMarker;

    fn map() -> Map {
        Map::new(&MapViewConfig::default()).unwrap()
    }

    #[test]
    fn test_missing_container_is_fatal() {
        let config = MapViewConfig {
            container_size: None,
            ..MapViewConfig::default()
        };
        assert!(matches!(
            Map::new(&config),
            Err(TripError::MissingDependency(_))
        ));
    }

    #[test]
    fn test_fly_to_lands_and_reports() {
        let mut map = map();
        map.process_events();
        let kyoto = LatLng::new(35.0116, 135.7681);

        map.fly_to(kyoto, 10.0, Duration::from_millis(1000));
        assert!(map.is_flying());
        assert_eq!(map.camera_target(), (kyoto, 10.0));

        map.update(Duration::from_millis(400)).unwrap();
        assert!(map.is_flying());
        map.update(Duration::from_millis(600)).unwrap();
        assert!(!map.is_flying());
        assert_eq!(map.center(), kyoto);
        assert_eq!(map.zoom(), 10.0);

        let events = map.process_events();
        assert!(events.contains(&MapEvent::ZoomEnd { zoom: 10.0 }));
        assert!(matches!(events.last(), Some(MapEvent::ZoomEnd { .. })));
    }

    #[test]
    fn test_newer_flight_supersedes() {
        let mut map = map();
        let kyoto = LatLng::new(35.0116, 135.7681);
        let osaka = LatLng::new(34.6937, 135.5023);

        map.fly_to(kyoto, 10.0, Duration::from_millis(1000));
        map.update(Duration::from_millis(500)).unwrap();
        map.fly_to(osaka, 12.0, Duration::from_millis(1000));
        map.update(Duration::from_millis(1000)).unwrap();

        assert_eq!(map.center(), osaka);
        assert_eq!(map.zoom(), 12.0);
    }

    #[test]
    fn test_popup_follows_layer() {
        let mut map = map();
        let tokyo = LatLng::new(35.6762, 139.6503);
        map.add_layer(Box::new(CircleMarker::new("bare".into(), tokyo)))
            .unwrap();
        map.add_layer(Box::new(
            CircleMarker::new("tokyo".into(), tokyo).with_popup("Tokyo".into()),
        ))
        .unwrap();

        assert!(!map.open_popup("bare"));
        assert!(!map.open_popup("missing"));
        assert!(map.open_popup("tokyo"));
        assert_eq!(map.open_popup_content(), Some(("tokyo", "Tokyo")));

        assert!(map.remove_layer("tokyo"));
        assert_eq!(map.open_popup_content(), None);
        assert!(!map.remove_layer("tokyo"));
    }

    #[test]
    fn test_render_collects_visible_layers() {
        let mut map = map();
        let center = map.center();
        map.add_layer(Box::new(CircleMarker::new("center".into(), center)))
            .unwrap();
        // Far outside the Japan view
        map.add_layer(Box::new(CircleMarker::new(
            "paris".into(),
            LatLng::new(48.8566, 2.3522),
        )))
        .unwrap();

        let mut context = RenderContext::new();
        map.render(&mut context).unwrap();
        assert_eq!(context.len(), 1);
    }
}
