//! Building the OSM dataset manifest from a folder of GeoJSON files.

use crate::{overlays::catalog::OsmItem, Result};
use std::path::{Path, PathBuf};

const EXTENSION: &str = ".geojson";

/// Manifest entry for a dataset file name
pub fn item_for_file(file: &str) -> Option<OsmItem> {
    let stem_len = file.len().checked_sub(EXTENSION.len())?;
    if !file.is_char_boundary(stem_len) || !file[stem_len..].eq_ignore_ascii_case(EXTENSION) {
        return None;
    }
    let stem = &file[..stem_len];
    Some(OsmItem {
        id: dataset_id(stem),
        title: dataset_title(stem),
        file: file.to_string(),
    })
}

/// Characters outside `[A-Za-z0-9_-]` become `_`
fn dataset_id(stem: &str) -> String {
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Runs of `_` / `-` become one space and every word starts upper case
fn dataset_title(stem: &str) -> String {
    let mut spaced = String::with_capacity(stem.len());
    let mut in_separator = false;
    for c in stem.chars() {
        if c == '_' || c == '-' {
            if !in_separator {
                spaced.push(' ');
            }
            in_separator = true;
        } else {
            spaced.push(c);
            in_separator = false;
        }
    }

    let mut title = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for c in spaced.chars() {
        if at_word_start {
            title.extend(c.to_uppercase());
        } else {
            title.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    title
}

/// Manifest entries for every `.geojson` file in `dir`, sorted by file name
pub fn build_manifest(dir: impl AsRef<Path>) -> Result<Vec<OsmItem>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            files.push(name.to_string());
        }
    }
    files.sort();
    Ok(files.iter().filter_map(|f| item_for_file(f)).collect())
}

/// Writes `manifest.json` into `dir`; returns its path and the entry count
pub fn write_manifest(dir: impl AsRef<Path>) -> Result<(PathBuf, usize)> {
    let items = build_manifest(dir.as_ref())?;
    let path = dir.as_ref().join("manifest.json");
    std::fs::write(&path, serde_json::to_string_pretty(&items)?)?;
    log::info!("Wrote manifest with {} items to {}", items.len(), path.display());
    Ok((path, items.len()))
}
