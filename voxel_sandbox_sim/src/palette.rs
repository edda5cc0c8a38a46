// The block palette: named swatches plus the currently selected color.
//
// Selection is the only palette state the engine cares about. Placement
// commands without an explicit color use `selected()`; drag-and-drop
// placements carry their own color and leave the selection alone.
//
// Any color can be selected, named or not (a host color picker is free to
// offer more than the swatches). Selecting an unknown name leaves the
// selection unchanged.

use crate::config::{PaletteEntry, SandboxConfig};
use crate::types::Color;
use log::warn;

#[derive(Clone, Debug)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
    selected: Color,
}

impl Palette {
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            entries: config.palette.clone(),
            selected: config.default_color,
        }
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn selected(&self) -> Color {
        self.selected
    }

    pub fn select(&mut self, color: Color) {
        self.selected = color;
    }

    /// Select a swatch by name (case-insensitive). Returns the new color, or
    /// `None` if no swatch has that name.
    pub fn select_named(&mut self, name: &str) -> Option<Color> {
        let Some(color) = self.lookup(name).map(|entry| entry.color) else {
            warn!("unknown palette color {name:?}");
            return None;
        };
        self.selected = color;
        Some(color)
    }

    /// Find a swatch by name (case-insensitive).
    pub fn lookup(&self, name: &str) -> Option<&PaletteEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }
}
