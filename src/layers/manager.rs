use crate::{core::viewport::Viewport, layers::base::LayerTrait, Result};

use crate::rendering::context::RenderContext;

use crate::prelude::HashMap;

/// Manages layers for the map, handling ordering and rendering
#[derive(Default)]
pub struct LayerManager {
    /// All layers indexed by ID
    layers: HashMap<String, Box<dyn LayerTrait>>,
    /// Ordered list of layer IDs for rendering (sorted by z-index)
    render_order: Vec<String>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a layer, replacing any layer with the same ID
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        let z_index = layer.z_index();

        if self.layers.insert(layer_id.clone(), layer).is_some() {
            log::debug!("Replacing layer '{}'", layer_id);
            self.render_order.retain(|id| id != &layer_id);
        }

        // Insert after every layer with the same or lower z-index
        let insert_pos = self
            .render_order
            .iter()
            .position(|id| {
                self.layers
                    .get(id)
                    .map(|l| l.z_index() > z_index)
                    .unwrap_or(false)
            })
            .unwrap_or(self.render_order.len());

        self.render_order.insert(insert_pos, layer_id);
        Ok(())
    }

    /// Removes a layer from the manager
    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn LayerTrait>> {
        self.render_order.retain(|id| id != layer_id);
        self.layers.remove(layer_id)
    }

    /// Gets a reference to a layer by ID
    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layers.get(layer_id).map(|l| l.as_ref())
    }

    pub fn has_layer(&self, layer_id: &str) -> bool {
        self.layers.contains_key(layer_id)
    }

    /// Applies a function to a specific layer mutably
    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layers.get_mut(layer_id).map(|layer| f(layer.as_mut()))
    }

    /// Lists all layer IDs in render order
    pub fn list_layers(&self) -> Vec<String> {
        self.render_order.clone()
    }

    /// Gets all layers in render order
    pub fn layers(&self) -> Vec<&dyn LayerTrait> {
        self.render_order
            .iter()
            .filter_map(|id| self.layers.get(id).map(|l| l.as_ref()))
            .collect()
    }

    /// Applies a function to each layer mutably in render order
    pub fn for_each_layer_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut dyn LayerTrait),
    {
        for id in &self.render_order {
            if let Some(layer) = self.layers.get_mut(id) {
                f(layer.as_mut());
            }
        }
    }

    /// Advances every layer's local animation
    pub fn update(&mut self, delta_time: f64, viewport: &Viewport) -> Result<()> {
        for layer in self.layers.values_mut() {
            layer.update(delta_time, viewport)?;
        }
        Ok(())
    }

    /// Renders all layers in order
    pub fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        let viewport_bounds = viewport.bounds();

        for layer_id in &self.render_order {
            if let Some(layer) = self.layers.get_mut(layer_id) {
                // Only render visible layers that intersect with viewport
                if layer.is_visible() && layer.intersects_bounds(&viewport_bounds) {
                    layer.render(context, viewport)?;
                }
            }
        }
        Ok(())
    }

    /// Gets the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Checks if the manager is empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::geo::LatLng,
        layers::{marker::CircleMarker, vector::Polyline},
    };

    #[test]
    fn test_render_order_follows_z_index() {
        let mut manager = LayerManager::new();
        manager
            .add_layer(Box::new(CircleMarker::new(
                "tokyo".into(),
                LatLng::new(35.6762, 139.6503),
            )))
            .unwrap();
        manager
            .add_layer(Box::new(Polyline::new(
                "route-0".into(),
                vec![LatLng::new(35.6762, 139.6503), LatLng::new(35.5131, 138.7697)],
            )))
            .unwrap();

        assert_eq!(manager.list_layers(), ["route-0", "tokyo"]);
    }

    #[test]
    fn test_add_with_same_id_replaces() {
        let mut manager = LayerManager::new();
        let position = LatLng::new(35.0116, 135.7681);
        manager
            .add_layer(Box::new(CircleMarker::new("kyoto".into(), position)))
            .unwrap();
        manager
            .add_layer(Box::new(CircleMarker::new("kyoto".into(), position)))
            .unwrap();

        assert_eq!(manager.len(), 1);
        assert_eq!(manager.list_layers().len(), 1);
        assert!(manager.remove_layer("kyoto").is_some());
        assert!(manager.is_empty());
        assert!(manager.remove_layer("kyoto").is_none());
    }
}
