//! What overlays can be selected: WMS layers from a capabilities document
//! or the configuration, and GeoJSON datasets from the OSM manifest.

use crate::{
    overlays::{
        feature_info::HttpClient,
        selection::{OverlayKey, OverlaySource},
    },
    MapError, Result,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

/// One selectable WMS layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WmsOverlayInfo {
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend_url: Option<String>,
}

impl WmsOverlayInfo {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            legend_url: None,
        }
    }
}

/// One GeoJSON dataset of the OSM manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsmItem {
    pub id: String,
    pub title: String,
    pub file: String,
}

/// Everything the overlay menus offer
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayCatalog {
    wms: Vec<WmsOverlayInfo>,
    generic: Vec<WmsOverlayInfo>,
    osm: Vec<OsmItem>,
}

impl Default for OverlayCatalog {
    fn default() -> Self {
        Self {
            wms: Vec::new(),
            generic: Vec::new(),
            osm: vec![OsmItem {
                id: "man_made_mast".to_string(),
                title: "Man Made: Mast".to_string(),
                file: "filtered_man_made_mast.geojson".to_string(),
            }],
        }
    }
}

impl OverlayCatalog {
    pub fn set_wms(&mut self, layers: Vec<WmsOverlayInfo>) {
        self.wms = layers;
    }

    pub fn set_generic(&mut self, layers: Vec<WmsOverlayInfo>) {
        self.generic = layers;
    }

    pub fn set_osm_items(&mut self, items: Vec<OsmItem>) {
        self.osm = items;
    }

    pub fn wms(&self) -> &[WmsOverlayInfo] {
        &self.wms
    }

    pub fn generic(&self) -> &[WmsOverlayInfo] {
        &self.generic
    }

    pub fn osm_items(&self) -> &[OsmItem] {
        &self.osm
    }

    pub fn has_wms(&self, name: &str) -> bool {
        self.wms.iter().any(|l| l.name == name)
    }

    pub fn has_generic(&self, name: &str) -> bool {
        self.generic.iter().any(|l| l.name == name)
    }

    pub fn osm_item(&self, id: &str) -> Option<&OsmItem> {
        self.osm.iter().find(|i| i.id == id)
    }

    pub fn info(&self, key: &OverlayKey) -> Option<&WmsOverlayInfo> {
        let list = match key.source {
            OverlaySource::Wms => &self.wms,
            OverlaySource::Generic => &self.generic,
        };
        list.iter().find(|l| l.name == key.name)
    }

    /// Human-readable title of an overlay, falling back to its name
    pub fn title<'a>(&'a self, key: &'a OverlayKey) -> &'a str {
        self.info(key).map(|l| l.title.as_str()).unwrap_or(&key.name)
    }

    /// Fetches and installs the WMS capabilities layer list
    pub async fn load_wms(&mut self, client: &dyn HttpClient, url: &str) -> Result<usize> {
        let xml = client.fetch_text(url).await?;
        let layers = parse_wms_capabilities(&xml)?;
        log::info!("Loaded {} WMS overlays from {}", layers.len(), url);
        self.wms = layers;
        Ok(self.wms.len())
    }

    /// Fetches and installs the OSM dataset manifest
    pub async fn load_osm_manifest(&mut self, client: &dyn HttpClient, url: &str) -> Result<usize> {
        let json = client.fetch_text(url).await?;
        self.osm = parse_osm_manifest(&json)?;
        log::info!("Loaded {} OSM datasets from {}", self.osm.len(), url);
        Ok(self.osm.len())
    }
}

/// Parses an OSM manifest: a JSON array of `{id, title, file}`
pub fn parse_osm_manifest(json: &str) -> Result<Vec<OsmItem>> {
    Ok(serde_json::from_str(json)?)
}

struct LayerFrame {
    slot: usize,
    nested: bool,
    name: Option<String>,
    title: Option<String>,
    legend_url: Option<String>,
}

/// Parses the named sub-layers of a WMS capabilities document
///
/// Every `Layer` nested in another `Layer` that carries both a `Name` and a
/// `Title` becomes an overlay, in document order. The legend is the first
/// `LegendURL/OnlineResource` link inside the layer.
pub fn parse_wms_capabilities(xml: &str) -> Result<Vec<WmsOverlayInfo>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut frames: Vec<LayerFrame> = Vec::new();
    let mut found: Vec<Option<WmsOverlayInfo>> = Vec::new();
    let mut saw_root = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                saw_root = true;
                let name = local_name(e);
                if name == "Layer" {
                    let nested = path.last().map(String::as_str) == Some("Layer");
                    found.push(None);
                    frames.push(LayerFrame {
                        slot: found.len() - 1,
                        nested,
                        name: None,
                        title: None,
                        legend_url: None,
                    });
                }
                if name == "OnlineResource" {
                    read_legend(e, &path, frames.last_mut())?;
                }
                path.push(name);
            }
            Event::Empty(ref e) => {
                saw_root = true;
                if local_name(e) == "OnlineResource" {
                    read_legend(e, &path, frames.last_mut())?;
                }
            }
            Event::Text(ref t) => {
                let parent = path.len().checked_sub(2).and_then(|i| path.get(i));
                if parent.map(String::as_str) == Some("Layer") {
                    if let Some(frame) = frames.last_mut() {
                        let text = t.unescape()?.trim().to_string();
                        match path.last().map(String::as_str) {
                            Some("Name") => frame.name = Some(text),
                            Some("Title") => frame.title = Some(text),
                            _ => {}
                        }
                    }
                }
            }
            Event::End(_) => {
                if path.pop().as_deref() == Some("Layer") {
                    if let Some(frame) = frames.pop() {
                        if let (true, Some(name), Some(title)) = (frame.nested, frame.name, frame.title) {
                            if !name.is_empty() && !title.is_empty() {
                                found[frame.slot] = Some(WmsOverlayInfo {
                                    name,
                                    title,
                                    legend_url: frame.legend_url,
                                });
                            }
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(MapError::ParseError("empty WMS capabilities document".to_string()));
    }
    Ok(found.into_iter().flatten().collect())
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn read_legend(e: &BytesStart, path: &[String], frame: Option<&mut LayerFrame>) -> Result<()> {
    let Some(frame) = frame else {
        return Ok(());
    };
    if frame.legend_url.is_some() || path.last().map(String::as_str) != Some("LegendURL") {
        return Ok(());
    }
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == b"href" {
            frame.legend_url = Some(attr.unescape_value()?.into_owned());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WMS_CAPS: &str = r#"<?xml version="1.0"?>
<WMS_Capabilities version="1.3.0" xmlns="http://www.opengis.net/wms" xmlns:xlink="http://www.w3.org/1999/xlink">
  <Service><Name>WMS</Name><Title>Digiroad</Title></Service>
  <Capability>
    <Layer>
      <Title>Digiroad root</Title>
      <Layer queryable="1">
        <Name>DR_NOPEUSRAJOITUS</Name>
        <Title>Nopeusrajoitus</Title>
        <Style>
          <Name>default</Name>
          <LegendURL width="20" height="20">
            <Format>image/png</Format>
            <OnlineResource xlink:type="simple" xlink:href="https://example.org/legend?layer=DR_NOPEUSRAJOITUS"/>
          </LegendURL>
        </Style>
      </Layer>
      <Layer queryable="1">
        <Name>DR_TIELINKKI</Name>
        <Title>Tielinkit &amp; kadut</Title>
      </Layer>
      <Layer>
        <Title>Untitled group without a name</Title>
      </Layer>
    </Layer>
  </Capability>
</WMS_Capabilities>"#;

    #[test]
    fn test_parse_wms_capabilities() {
        let layers = parse_wms_capabilities(WMS_CAPS).unwrap();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].name, "DR_NOPEUSRAJOITUS");
        assert_eq!(
            layers[0].legend_url.as_deref(),
            Some("https://example.org/legend?layer=DR_NOPEUSRAJOITUS")
        );
        assert_eq!(layers[1].title, "Tielinkit & kadut");
        assert!(layers[1].legend_url.is_none());
    }

    #[test]
    fn test_parse_manifest() {
        let items = parse_osm_manifest(
            r#"[{"id":"man_made_mast","title":"Man Made Mast","file":"man_made_mast.geojson"}]"#,
        )
        .unwrap();
        assert_eq!(items[0].file, "man_made_mast.geojson");
        assert!(parse_osm_manifest(r#"{"id":"x"}"#).is_err());
    }

    #[test]
    fn test_titles_fall_back_to_name() {
        let mut catalog = OverlayCatalog::default();
        catalog.set_wms(vec![WmsOverlayInfo::new("A", "Layer A")]);
        let known = OverlayKey::new(OverlaySource::Wms, "A");
        let unknown = OverlayKey::new(OverlaySource::Generic, "A");
        assert_eq!(catalog.title(&known), "Layer A");
        assert_eq!(catalog.title(&unknown), "A");
        assert!(catalog.osm_item("man_made_mast").is_some());
    }
}
