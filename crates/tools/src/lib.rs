//! Offline helpers for map directories: building the static `maps.json`
//! index and checking terrain files before they are served.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use formats::{MAP_INDEX_FILE_NAME, TerrainDocument, map_index_to_json, scan_map_dir};
use scene::mesh::build_chunk_mesh;

/// Writes the sorted map listing of `dir` to `out` (default `dir/maps.json`)
/// and returns the names written.
pub fn write_maps_index(dir: &Path, out: Option<&Path>) -> Result<(PathBuf, Vec<String>), String> {
    let names = scan_map_dir(dir).map_err(|e| format!("scan {}: {e}", dir.display()))?;
    let out = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.join(MAP_INDEX_FILE_NAME));
    let json = map_index_to_json(&names).map_err(|e| format!("encode index: {e}"))?;
    fs::write(&out, json).map_err(|e| format!("write {}: {e}", out.display()))?;
    Ok((out, names))
}

/// Human-readable summary of one terrain file. Errors only when the file
/// cannot be used at all; data problems are listed as warnings.
pub fn validate_report(path: &Path) -> Result<String, String> {
    let doc = TerrainDocument::from_path(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let mut out = String::new();
    let _ = writeln!(out, "{}: {} chunk(s)", path.display(), doc.terrains.len());

    let mut vertices = 0usize;
    let mut triangles = 0usize;
    for (i, chunk) in doc.terrains.iter().enumerate() {
        let mesh = build_chunk_mesh(chunk);
        vertices += mesh.vertex_count();
        triangles += mesh.triangle_count();
        let (lo, hi) = chunk
            .height_map
            .iter()
            .filter(|h| h.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &h| (lo.min(h), hi.max(h)));
        let range = if lo <= hi {
            format!("{:.2}..{:.2}", chunk.y + lo, chunk.y + hi)
        } else {
            "none".to_string()
        };
        let _ = writeln!(
            out,
            "  [{i}] origin ({}, {}) size {}x{} res {} heights {range}",
            chunk.x, chunk.z, chunk.width, chunk.depth, chunk.resolution
        );
    }
    let _ = writeln!(out, "  mesh: {vertices} vertices, {triangles} triangles");

    let warnings = doc.validate();
    if warnings.is_empty() {
        let _ = writeln!(out, "  ok");
    } else {
        for w in &warnings {
            let _ = writeln!(out, "  warning: {w}");
        }
    }
    Ok(out)
}
