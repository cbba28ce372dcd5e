//! Raster layers and the ordered layer stack.

use crate::error::EngineResult;
use crate::raster::{allocate_surface, copy_into, is_blank};
use serde::{Deserialize, Serialize};
use std::fmt;
use tiny_skia::Pixmap;
use uuid::Uuid;

/// Display name of the reserved selection layer.
pub const SELECTION_LAYER_NAME: &str = "Selection";

/// Opacity the selection layer starts with.
pub const DEFAULT_SELECTION_OPACITY: f64 = 0.7;

/// A unique identifier for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub Uuid);

impl LayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a layer is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerRole {
    /// Regular drawing layer.
    Normal,
    /// Reserved layer written only by the select tool.
    SelectionMask,
}

/// Direction for reordering a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards the top of the stack.
    Up,
    /// Towards the bottom of the stack.
    Down,
}

/// What happens to raster content when the viewport is resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizePolicy {
    /// Reallocate every surface blank; prior pixels are lost.
    #[default]
    DropContent,
    /// Reallocate and copy the old pixels anchored at the top-left corner.
    PreserveContent,
}

/// A single raster layer.
pub struct Layer {
    id: LayerId,
    /// Display name.
    pub name: String,
    surface: Pixmap,
    opacity: f64,
    role: LayerRole,
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("opacity", &self.opacity)
            .field("role", &self.role)
            .field("size", &(self.surface.width(), self.surface.height()))
            .finish()
    }
}

impl Layer {
    fn new(name: &str, role: LayerRole, width: u32, height: u32) -> EngineResult<Self> {
        Ok(Self {
            id: LayerId::new(),
            name: name.to_string(),
            surface: allocate_surface(width, height)?,
            opacity: 1.0,
            role,
        })
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn role(&self) -> LayerRole {
        self.role
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Set opacity, clamped to [0, 1]. NaN is ignored.
    pub fn set_opacity(&mut self, opacity: f64) {
        if !opacity.is_nan() {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    pub fn surface(&self) -> &Pixmap {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Pixmap {
        &mut self.surface
    }

    /// True when nothing has been painted (or everything was erased).
    pub fn is_blank(&self) -> bool {
        is_blank(&self.surface)
    }

    /// Wipe all pixels.
    pub fn clear(&mut self) {
        self.surface.fill(tiny_skia::Color::TRANSPARENT);
    }
}

/// Ordered stack of raster layers plus the reserved selection layer.
///
/// Normal layers are kept bottom to top; new layers always go on top. The
/// selection layer lives outside that list, so reorder and delete can never
/// reach it and the stack can never lose it.
pub struct LayerStack {
    selection: Layer,
    layers: Vec<Layer>,
    active: LayerId,
    next_number: u32,
    width: u32,
    height: u32,
}

impl fmt::Debug for LayerStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerStack")
            .field("names", &self.names())
            .field("active", &self.active)
            .finish()
    }
}

impl LayerStack {
    /// Create a stack holding the selection layer and "Layer 1".
    pub fn new(width: u32, height: u32) -> EngineResult<Self> {
        let mut selection = Layer::new(SELECTION_LAYER_NAME, LayerRole::SelectionMask, width, height)?;
        selection.opacity = DEFAULT_SELECTION_OPACITY;
        let first = Layer::new("Layer 1", LayerRole::Normal, width, height)?;
        Ok(Self {
            selection,
            active: first.id,
            layers: vec![first],
            next_number: 2,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Normal layers, bottom to top.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn selection(&self) -> &Layer {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Layer {
        &mut self.selection
    }

    /// Names in display order: the selection layer first, then bottom to top.
    pub fn names(&self) -> Vec<&str> {
        std::iter::once(self.selection.name.as_str())
            .chain(self.layers.iter().map(|l| l.name.as_str()))
            .collect()
    }

    /// Number of normal layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always false: a stack keeps at least one normal layer.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn active_id(&self) -> LayerId {
        self.active
    }

    pub fn active(&self) -> &Layer {
        let index = self.index_of(self.active).unwrap_or(0);
        &self.layers[index]
    }

    pub fn active_mut(&mut self) -> &mut Layer {
        let index = self.index_of(self.active).unwrap_or(0);
        &mut self.layers[index]
    }

    /// Look up any layer, the selection layer included.
    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        if id == self.selection.id {
            return Some(&self.selection);
        }
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        if id == self.selection.id {
            return Some(&mut self.selection);
        }
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Find a normal layer by name.
    pub fn find(&self, name: &str) -> Option<LayerId> {
        self.layers.iter().find(|l| l.name == name).map(|l| l.id)
    }

    fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// Add a normal layer on top and make it active.
    ///
    /// Without a name (or with a blank one) the layer is numbered "Layer N".
    pub fn add_layer(&mut self, name: Option<&str>) -> EngineResult<LayerId> {
        let number = self.next_number;
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Layer {}", number),
        };
        let layer = Layer::new(&name, LayerRole::Normal, self.width, self.height)?;
        let id = layer.id;
        self.next_number += 1;
        self.layers.push(layer);
        self.active = id;
        log::debug!("Added layer {} ({})", name, id);
        Ok(id)
    }

    /// Delete a normal layer.
    ///
    /// Ignored for the selection layer, unknown ids and the last normal layer.
    pub fn delete_layer(&mut self, id: LayerId) -> bool {
        if self.layers.len() <= 1 {
            log::debug!("Refusing to delete the last layer");
            return false;
        }
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.layers.remove(index);
        if self.active == id {
            self.active = self.layers[index.saturating_sub(1)].id;
        }
        true
    }

    /// Swap a normal layer with its neighbour above.
    pub fn move_up(&mut self, id: LayerId) -> bool {
        match self.index_of(id) {
            Some(index) if index + 1 < self.layers.len() => {
                self.layers.swap(index, index + 1);
                true
            }
            _ => false,
        }
    }

    /// Swap a normal layer with its neighbour below.
    pub fn move_down(&mut self, id: LayerId) -> bool {
        match self.index_of(id) {
            Some(index) if index > 0 => {
                self.layers.swap(index, index - 1);
                true
            }
            _ => false,
        }
    }

    pub fn move_layer(&mut self, id: LayerId, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.move_up(id),
            Direction::Down => self.move_down(id),
        }
    }

    /// Set a layer's opacity (clamped). Works for the selection layer too.
    pub fn set_opacity(&mut self, id: LayerId, opacity: f64) -> bool {
        match self.get_mut(id) {
            Some(layer) if !opacity.is_nan() => {
                layer.set_opacity(opacity);
                true
            }
            _ => false,
        }
    }

    /// Make a normal layer the drawing target. The selection layer is rejected.
    pub fn set_active(&mut self, id: LayerId) -> bool {
        if self.index_of(id).is_none() {
            log::debug!("Rejected active layer {}", id);
            return false;
        }
        self.active = id;
        true
    }

    /// Whether the select tool has left any coverage on the selection layer.
    pub fn has_selection(&self) -> bool {
        !self.selection.is_blank()
    }

    /// Erase the selection layer.
    pub fn clear_selection(&mut self) -> bool {
        if !self.has_selection() {
            return false;
        }
        self.selection.clear();
        true
    }

    /// Reallocate every surface at the new size.
    ///
    /// All surfaces are allocated before any is replaced, so a failed
    /// allocation leaves the stack exactly as it was.
    pub fn resize(&mut self, width: u32, height: u32, policy: ResizePolicy) -> EngineResult<()> {
        let fresh = self.allocate_surfaces(width, height)?;
        self.swap_surfaces(fresh, width, height, policy);
        Ok(())
    }

    /// One blank surface per layer (selection first), nothing swapped yet.
    pub(crate) fn allocate_surfaces(&self, width: u32, height: u32) -> EngineResult<Vec<Pixmap>> {
        (0..=self.layers.len())
            .map(|_| allocate_surface(width, height))
            .collect()
    }

    pub(crate) fn swap_surfaces(&mut self, fresh: Vec<Pixmap>, width: u32, height: u32, policy: ResizePolicy) {
        for (layer, mut surface) in std::iter::once(&mut self.selection)
            .chain(self.layers.iter_mut())
            .zip(fresh)
        {
            if policy == ResizePolicy::PreserveContent {
                copy_into(&mut surface, &layer.surface);
            }
            layer.surface = surface;
        }
        self.width = width;
        self.height = height;
    }
}
