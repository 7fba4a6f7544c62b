//! WMTS capabilities document parsing.

use crate::{tiles::source::WmtsSource, MapError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One `Contents/Layer` entry of a WMTS capabilities document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WmtsLayerInfo {
    pub identifier: String,
    pub title: String,
    pub style: String,
    pub matrix_sets: Vec<String>,
    /// REST `ResourceURL` template for tiles, when advertised
    pub resource_template: Option<String>,
}

/// Layers advertised by a WMTS server
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WmtsCapabilities {
    pub layers: Vec<WmtsLayerInfo>,
}

impl WmtsCapabilities {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut path: Vec<String> = Vec::new();
        let mut layers = Vec::new();
        let mut current: Option<WmtsLayerInfo> = None;
        let mut in_default_style = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let name = local_name(e);
                    if name == "Layer" && path.last().map(String::as_str) == Some("Contents") {
                        current = Some(WmtsLayerInfo::default());
                    }
                    if name == "Style" && current.is_some() {
                        in_default_style = attribute(e, "isDefault")?.as_deref() != Some("false");
                    }
                    if name == "ResourceURL" {
                        read_resource_url(e, current.as_mut())?;
                    }
                    path.push(name);
                }
                Event::Empty(ref e) => {
                    if local_name(e) == "ResourceURL" {
                        read_resource_url(e, current.as_mut())?;
                    }
                }
                Event::Text(ref t) => {
                    let text = t.unescape()?.into_owned();
                    if let Some(layer) = current.as_mut() {
                        let depth = path.len();
                        let element = path.last().map(String::as_str);
                        let parent = depth
                            .checked_sub(2)
                            .and_then(|i| path.get(i))
                            .map(String::as_str);
                        match (parent, element) {
                            (Some("Layer"), Some("Identifier")) => layer.identifier = text,
                            (Some("Layer"), Some("Title")) => layer.title = text,
                            (Some("Style"), Some("Identifier")) if in_default_style => {
                                if layer.style.is_empty() {
                                    layer.style = text;
                                }
                            }
                            (Some("TileMatrixSetLink"), Some("TileMatrixSet")) => {
                                layer.matrix_sets.push(text)
                            }
                            _ => {}
                        }
                    }
                }
                Event::End(_) => {
                    let closed = path.pop();
                    if closed.as_deref() == Some("Style") {
                        in_default_style = false;
                    }
                    if closed.as_deref() == Some("Layer")
                        && path.last().map(String::as_str) == Some("Contents")
                    {
                        if let Some(layer) = current.take() {
                            layers.push(layer);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if layers.is_empty() {
            return Err(MapError::ParseError(
                "WMTS capabilities advertise no layers".to_string(),
            ));
        }
        Ok(Self { layers })
    }

    pub fn layer(&self, identifier: &str) -> Option<&WmtsLayerInfo> {
        self.layers.iter().find(|l| l.identifier == identifier)
    }

    /// Tile source for `identifier` in `matrix_set`, if the server advertises both
    pub fn source_for(&self, identifier: &str, matrix_set: &str, api_key: &str) -> Option<WmtsSource> {
        let layer = self.layer(identifier)?;
        if !layer.matrix_sets.iter().any(|m| m == matrix_set) {
            return None;
        }
        let style = if layer.style.is_empty() {
            "default"
        } else {
            layer.style.as_str()
        };
        let template = layer
            .resource_template
            .as_ref()?
            .replace("{TileMatrixSet}", matrix_set)
            .replace("{Style}", style);
        Some(WmtsSource::new(template, api_key))
    }
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart, key: &str) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == key.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn read_resource_url(e: &BytesStart, layer: Option<&mut WmtsLayerInfo>) -> Result<()> {
    let Some(layer) = layer else {
        return Ok(());
    };
    if attribute(e, "resourceType")?.as_deref() == Some("tile") && layer.resource_template.is_none() {
        layer.resource_template = attribute(e, "template")?;
    }
    Ok(())
}
