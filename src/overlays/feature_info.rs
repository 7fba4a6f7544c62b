//! GetFeatureInfo batches for a click on the map.

use crate::{overlays::selection::OverlayKey, MapError, Result};
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Anything that can GET a URL and hand back the body as text
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Production client on top of `reqwest`
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("maplink/", env!("CARGO_PKG_VERSION")))
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MapError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

/// One GetFeatureInfo request of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInfoRequest {
    pub key: OverlayKey,
    pub title: String,
    pub url: String,
}

/// HTML answer of one overlay that had something to say
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInfoResult {
    pub key: OverlayKey,
    pub title: String,
    pub html: String,
}

/// Issues all requests at once and waits for every one to settle
///
/// Failed requests, empty bodies and "no features found" answers are
/// dropped; the remaining results keep the request order.
pub async fn fetch_feature_info(
    client: &dyn HttpClient,
    requests: Vec<FeatureInfoRequest>,
) -> Vec<FeatureInfoResult> {
    let pending = requests.into_iter().map(|request| async move {
        match client.fetch_text(&request.url).await {
            Ok(html) => Some(FeatureInfoResult {
                key: request.key,
                title: request.title,
                html,
            }),
            Err(e) => {
                log::warn!("GetFeatureInfo for '{}' failed: {}", request.key.name, e);
                None
            }
        }
    });

    join_all(pending)
        .await
        .into_iter()
        .flatten()
        .filter(|result| has_content(&result.html))
        .collect()
}

/// Servers answer an empty hit with a page saying so instead of an empty body
fn has_content(html: &str) -> bool {
    !html.trim().is_empty() && !html.to_ascii_lowercase().contains("no features found")
}

const SECTION_OPEN: &str = r#"<div style="margin-bottom:12px;"><div style="font-weight:bold;font-size:1.08em;margin-bottom:4px;color:#0077cc;">"#;
const SECTION_MIDDLE: &str = "</div><div>";
const SECTION_CLOSE: &str = "</div></div>";

/// Popup HTML with one titled section per result, or `None` when nothing came back
pub fn render_popup(results: &[FeatureInfoResult]) -> Option<String> {
    if results.is_empty() {
        return None;
    }
    Some(
        results
            .iter()
            .map(|r| {
                format!(
                    "{}{}{}{}{}",
                    SECTION_OPEN, r.title, SECTION_MIDDLE, r.html, SECTION_CLOSE
                )
            })
            .collect(),
    )
}

/// Properties shown in an OSM feature popup at most
const MAX_OSM_PROPERTIES: usize = 8;

/// Longer property values are left out of the popup
const MAX_OSM_VALUE_LEN: usize = 100;

/// Geometry member of a GeoJSON feature; only its type is needed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureGeometry {
    #[serde(rename = "type")]
    pub kind: String,
}

/// A clicked GeoJSON feature of an OSM dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OsmFeature {
    #[serde(default)]
    pub geometry: Option<FeatureGeometry>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

impl OsmFeature {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// String properties worth showing, in document order
    pub fn display_properties(&self) -> Vec<(String, &str)> {
        let Some(properties) = &self.properties else {
            return Vec::new();
        };
        properties
            .iter()
            .filter(|(key, _)| key.as_str() != "geometry")
            .filter_map(|(key, value)| match value {
                Value::String(text)
                    if !text.is_empty() && text.chars().count() < MAX_OSM_VALUE_LEN =>
                {
                    Some((property_label(key), text.as_str()))
                }
                _ => None,
            })
            .take(MAX_OSM_PROPERTIES)
            .collect()
    }
}

/// `addr:street_name` reads as `Addr:Street Name`
fn property_label(key: &str) -> String {
    let mut label = String::with_capacity(key.len());
    let mut at_word_start = true;
    for c in key.chars().map(|c| if c == '_' { ' ' } else { c }) {
        if at_word_start && c.is_ascii_alphanumeric() {
            label.push(c.to_ascii_uppercase());
        } else {
            label.push(c);
        }
        at_word_start = !c.is_ascii_alphanumeric();
    }
    label
}

/// Popup HTML for a clicked OSM feature: a coloured title line, the
/// geometry type and a short property list
pub fn format_osm_feature(feature: &OsmFeature, title: &str, color: &str) -> String {
    let mut html = String::from(r#"<div style="margin-bottom:8px;">"#);
    html.push_str(&format!(
        r#"<div style="font-weight:bold;font-size:1.1em;margin-bottom:6px;color:{color};display:flex;align-items:center;"><div style="width:12px;height:12px;background:{color};border-radius:50%;margin-right:8px;"></div>{title}</div>"#,
    ));
    if let Some(geometry) = &feature.geometry {
        html.push_str(&format!(
            r#"<div style="font-size:0.85em;color:#666;margin-bottom:8px;">{}</div>"#,
            geometry.kind.to_uppercase()
        ));
    }

    let properties = feature.display_properties();
    if !properties.is_empty() {
        html.push_str(r#"<div style="font-size:0.9em;border-top:1px solid #eee;padding-top:6px;">"#);
        for (label, value) in properties {
            html.push_str(&format!(
                r#"<div style="margin-bottom:3px;"><strong>{}:</strong> {}</div>"#,
                label, value
            ));
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlays::selection::OverlaySource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HttpClient for ScriptedClient {
        async fn fetch_text(&self, url: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match url {
                "https://wms/a" => Ok("<table><tr><td>80 km/h</td></tr></table>".to_string()),
                "https://wms/b" => Err(MapError::HttpStatus {
                    status: 500,
                    url: url.to_string(),
                }),
                "https://wms/c" => Ok("<p>No Features Found</p>".to_string()),
                "https://wms/d" => Ok("   \n".to_string()),
                _ => Ok("<b>road</b>".to_string()),
            }
        }
    }

    fn request(name: &str, url: &str) -> FeatureInfoRequest {
        FeatureInfoRequest {
            key: OverlayKey::new(OverlaySource::Wms, name),
            title: format!("Title {}", name),
            url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn test_batch_drops_failures_and_empty_answers() {
        let client = ScriptedClient {
            calls: AtomicUsize::new(0),
        };
        let results = fetch_feature_info(
            &client,
            vec![
                request("A", "https://wms/a"),
                request("B", "https://wms/b"),
                request("C", "https://wms/c"),
                request("D", "https://wms/d"),
                request("E", "https://wms/e"),
            ],
        )
        .await;

        assert_eq!(client.calls.load(Ordering::SeqCst), 5);
        let names: Vec<_> = results.iter().map(|r| r.key.name.as_str()).collect();
        assert_eq!(names, vec!["A", "E"]);
    }

    #[test]
    fn test_render_popup_sections() {
        assert!(render_popup(&[]).is_none());
        let html = render_popup(&[FeatureInfoResult {
            key: OverlayKey::new(OverlaySource::Wms, "A"),
            title: "Speed limits".to_string(),
            html: "<b>80</b>".to_string(),
        }])
        .unwrap();
        assert!(html.contains(">Speed limits</div><div><b>80</b></div></div>"));
    }

    #[test]
    fn test_osm_feature_popup() {
        let feature = OsmFeature::from_json(
            r#"{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [24.9, 60.2] },
                "properties": {
                    "man_made": "mast",
                    "height": 120,
                    "name": "",
                    "operator_name": "Digita",
                    "geometry": "point"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(
            feature.display_properties(),
            vec![
                ("Man Made".to_string(), "mast"),
                ("Operator Name".to_string(), "Digita")
            ]
        );
        let html = format_osm_feature(&feature, "Man Made: Mast", "#e74c3c");
        assert!(html.contains("background:#e74c3c;"));
        assert!(html.contains("</div>Man Made: Mast</div>"));
        assert!(html.contains(">POINT</div>"));
        assert!(html.contains("<strong>Operator Name:</strong> Digita"));
        assert!(html.contains("border-top"));
    }

    #[test]
    fn test_osm_feature_popup_limits() {
        let mut properties = Map::new();
        properties.insert("note".to_string(), Value::String("x".repeat(100)));
        for i in 0..10 {
            properties.insert(format!("tag_{}", i), Value::String(i.to_string()));
        }
        let feature = OsmFeature {
            geometry: None,
            properties: Some(properties),
        };
        let shown = feature.display_properties();
        assert_eq!(shown.len(), 8);
        assert_eq!(shown[0], ("Tag 0".to_string(), "0"));

        let bare = OsmFeature::from_json(r#"{"type":"Feature","geometry":{"type":"LineString"},"properties":null}"#)
            .unwrap();
        let html = format_osm_feature(&bare, "Highway", "#3498db");
        assert!(html.contains(">LINESTRING</div>"));
        assert!(!html.contains("border-top"));
    }
}
