use formats::{TerrainChunk, TerrainDocument};
use foundation::bounds::Aabb2;

/// Anything that can answer "how high is the ground at world (x, z)?".
pub trait HeightSampler {
    fn height_at(&self, x: f64, z: f64) -> f64;
}

/// Holds the current map's terrain and answers height queries.
///
/// The document is swapped wholesale on map change; it is never patched.
#[derive(Debug, Default, Clone)]
pub struct TerrainStore {
    document: Option<TerrainDocument>,
}

impl TerrainStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: TerrainDocument) -> Self {
        Self {
            document: Some(document),
        }
    }

    pub fn replace(&mut self, document: TerrainDocument) -> Option<TerrainDocument> {
        self.document.replace(document)
    }

    pub fn clear(&mut self) -> Option<TerrainDocument> {
        self.document.take()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks().is_empty()
    }

    pub fn document(&self) -> Option<&TerrainDocument> {
        self.document.as_ref()
    }

    pub fn chunks(&self) -> &[TerrainChunk] {
        self.document
            .as_ref()
            .map(|d| d.terrains.as_slice())
            .unwrap_or(&[])
    }

    /// First chunk (in document order) whose footprint contains the point.
    pub fn chunk_at(&self, x: f64, z: f64) -> Option<&TerrainChunk> {
        self.chunks()
            .iter()
            .find(|c| footprint(c).contains([x, z]))
    }

    /// Nearest-lower grid sample; no interpolation. Returns 0 outside every
    /// chunk and for samples missing from a short heightmap.
    pub fn height_at(&self, x: f64, z: f64) -> f64 {
        let Some(chunk) = self.chunk_at(x, z) else {
            return 0.0;
        };
        sample_chunk(chunk, x, z).unwrap_or(0.0)
    }
}

impl HeightSampler for TerrainStore {
    fn height_at(&self, x: f64, z: f64) -> f64 {
        TerrainStore::height_at(self, x, z)
    }
}

fn footprint(chunk: &TerrainChunk) -> Aabb2 {
    Aabb2::new(
        [chunk.x, chunk.z],
        [chunk.x + chunk.width, chunk.z + chunk.depth],
    )
}

fn sample_chunk(chunk: &TerrainChunk, x: f64, z: f64) -> Option<f64> {
    let segments = chunk.resolution.saturating_sub(1) as f64;
    let lx = x - chunk.x;
    let lz = z - chunk.z;
    let col = (lx / chunk.width * segments).floor();
    let row = (lz / chunk.depth * segments).floor();
    if !(col >= 0.0 && row >= 0.0) {
        return None;
    }

    chunk.sample(row as usize, col as usize).map(|h| chunk.y + h)
}
