use crate::{constants::OSM_COLOR_PALETTE, overlays::catalog::OverlayCatalog};
use serde::{Deserialize, Serialize};

/// Which list a WMS overlay was picked from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlaySource {
    /// Layers advertised by the WMS capabilities document
    Wms,
    /// Layers listed in the viewer configuration
    Generic,
}

impl std::fmt::Display for OverlaySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlaySource::Wms => write!(f, "wms"),
            OverlaySource::Generic => write!(f, "generic"),
        }
    }
}

/// Stable identity of a selected WMS overlay
///
/// Two lists may offer a layer with the same name; the key keeps them apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayKey {
    pub source: OverlaySource,
    pub name: String,
}

impl OverlayKey {
    pub fn new(source: OverlaySource, name: impl Into<String>) -> Self {
        Self {
            source,
            name: name.into(),
        }
    }

    /// Id of the map layer showing this overlay
    pub fn layer_id(&self) -> String {
        format!("overlay:{}:{}", self.source, self.name)
    }
}

/// Selected overlays in selection order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlaySelection {
    wms: Vec<String>,
    generic: Vec<String>,
    /// Ids restored from a permalink before any catalog could place them
    pending: Vec<String>,
    osm: Vec<String>,
    osm_colors: Vec<(String, String)>,
}

impl OverlaySelection {
    pub fn new() -> Self {
        Self::default()
    }

    fn list_mut(&mut self, source: OverlaySource) -> &mut Vec<String> {
        match source {
            OverlaySource::Wms => &mut self.wms,
            OverlaySource::Generic => &mut self.generic,
        }
    }

    pub fn names(&self, source: OverlaySource) -> &[String] {
        match source {
            OverlaySource::Wms => &self.wms,
            OverlaySource::Generic => &self.generic,
        }
    }

    /// Selects or deselects one WMS overlay; returns whether the selection changed
    pub fn toggle(&mut self, key: &OverlayKey, selected: bool) -> bool {
        let list = self.list_mut(key.source);
        let present = list.iter().any(|n| *n == key.name);
        match (present, selected) {
            (false, true) => {
                list.push(key.name.clone());
                true
            }
            (true, false) => {
                list.retain(|n| *n != key.name);
                true
            }
            _ => false,
        }
    }

    /// Replaces one list wholesale, as a multi-select widget reports it
    pub fn set_names(&mut self, source: OverlaySource, names: Vec<String>) {
        let mut unique = Vec::with_capacity(names.len());
        for name in names {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        *self.list_mut(source) = unique;
    }

    pub fn is_selected(&self, key: &OverlayKey) -> bool {
        self.names(key.source).iter().any(|n| *n == key.name)
    }

    /// Every selected WMS overlay, capabilities list first
    pub fn selected_keys(&self) -> Vec<OverlayKey> {
        self.wms
            .iter()
            .map(|n| OverlayKey::new(OverlaySource::Wms, n.clone()))
            .chain(
                self.generic
                    .iter()
                    .map(|n| OverlayKey::new(OverlaySource::Generic, n.clone())),
            )
            .collect()
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Ids for the `overlays` query parameter: both lists, then ids still
    /// waiting for a catalog
    pub fn overlay_ids(&self) -> Vec<String> {
        self.wms
            .iter()
            .chain(self.generic.iter())
            .chain(self.pending.iter())
            .cloned()
            .collect()
    }

    /// Restores the WMS selection from permalink ids
    ///
    /// Each id goes to the list whose catalog offers it, the capabilities list
    /// taking precedence. Ids neither list knows yet are held back until
    /// [`Self::resolve_pending`] sees a catalog that does.
    pub fn restore_ids(&mut self, ids: &[String], catalog: &OverlayCatalog) {
        self.wms.clear();
        self.generic.clear();
        self.pending.clear();
        for id in ids {
            self.place(id.clone(), catalog);
        }
    }

    /// Moves pending ids into the list that now offers them
    pub fn resolve_pending(&mut self, catalog: &OverlayCatalog) -> bool {
        let pending = std::mem::take(&mut self.pending);
        let before = pending.len();
        for id in pending {
            self.place(id, catalog);
        }
        self.pending.len() != before
    }

    fn place(&mut self, id: String, catalog: &OverlayCatalog) {
        let target = if catalog.has_wms(&id) {
            &mut self.wms
        } else if catalog.has_generic(&id) {
            &mut self.generic
        } else {
            &mut self.pending
        };
        if !target.contains(&id) {
            target.push(id);
        }
    }

    pub fn osm_ids(&self) -> &[String] {
        &self.osm
    }

    pub fn is_osm_selected(&self, id: &str) -> bool {
        self.osm.iter().any(|o| o == id)
    }

    /// Selects or deselects an OSM dataset; a newly selected dataset gets
    /// the first palette colour no other selected dataset uses
    pub fn toggle_osm(&mut self, id: &str, selected: bool) -> bool {
        let present = self.is_osm_selected(id);
        match (present, selected) {
            (false, true) => {
                let color = self.next_osm_color();
                self.osm.push(id.to_string());
                self.osm_colors.push((id.to_string(), color));
                true
            }
            (true, false) => {
                self.osm.retain(|o| o != id);
                self.osm_colors.retain(|(o, _)| o != id);
                true
            }
            _ => false,
        }
    }

    pub fn restore_osm_ids(&mut self, ids: &[String]) {
        self.osm.clear();
        self.osm_colors.clear();
        for id in ids {
            self.toggle_osm(id, true);
        }
    }

    /// Colour assigned to a selected OSM dataset
    pub fn osm_color(&self, id: &str) -> Option<&str> {
        self.osm_colors
            .iter()
            .find(|(o, _)| o == id)
            .map(|(_, c)| c.as_str())
    }

    fn next_osm_color(&self) -> String {
        OSM_COLOR_PALETTE
            .iter()
            .find(|c| !self.osm_colors.iter().any(|(_, used)| used == *c))
            .copied()
            .unwrap_or(OSM_COLOR_PALETTE[self.osm_colors.len() % OSM_COLOR_PALETTE.len()])
            .to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.wms.is_empty() && self.generic.is_empty() && self.pending.is_empty() && self.osm.is_empty()
    }
}
