//! Map identifiers and the static `maps.json` index.
//!
//! A map identifier is a terrain document's file name (`terrain_3_hills.json`).
//! Listings are ordered by the number in the second `_`-separated segment of
//! the file stem (the name with `.json` removed, so `map_10.json` is 10);
//! numbered names come first, the rest fall back to plain string order.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

pub const MAP_INDEX_FILE_NAME: &str = "maps.json";
pub const MAP_FILE_EXTENSION: &str = ".json";

pub fn is_map_file_name(name: &str) -> bool {
    name.ends_with(MAP_FILE_EXTENSION) && name != MAP_INDEX_FILE_NAME
}

/// `terrain_12_ridge.json` → `Some(12)`; `flat.json` → `None`.
pub fn map_sequence_number(name: &str) -> Option<u32> {
    let stem = name.strip_suffix(MAP_FILE_EXTENSION).unwrap_or(name);
    stem.split('_').nth(1).and_then(|part| part.parse::<u32>().ok())
}

pub fn compare_map_names(a: &str, b: &str) -> Ordering {
    match (map_sequence_number(a), map_sequence_number(b)) {
        (Some(na), Some(nb)) => na.cmp(&nb).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

pub fn sort_map_names(names: &mut [String]) {
    names.sort_by(|a, b| compare_map_names(a, b));
}

/// Lists terrain documents in `dir`, sorted. Subdirectories and the index file
/// itself are skipped.
pub fn scan_map_dir(dir: impl AsRef<Path>) -> std::io::Result<Vec<String>> {
    let mut maps = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_map_file_name(name) {
                maps.push(name.to_string());
            }
        }
    }
    sort_map_names(&mut maps);
    Ok(maps)
}

pub fn map_index_from_json(payload: &[u8]) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_slice(payload)
}

pub fn map_index_to_json(names: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(names)
}
