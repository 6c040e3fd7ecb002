//! Heightmap chunk → grid mesh.
//!
//! The grid is authored the way a plane primitive is: flat in the XY plane,
//! centered on the origin, rows running down -Y, with the height sample as the
//! Z displacement. It is then rotated -90° about X so the displacement
//! becomes +Y and rows run along +Z. Vertex order therefore matches the
//! heightmap's row-major order (row = Z, column = X).
//!
//! The mesh is centered on its local origin while chunk coordinates are
//! corner-anchored, so the placement adds half the extents back.

use formats::{MAX_RESOLUTION, TerrainChunk};
use foundation::bounds::Aabb3;
use foundation::math::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMesh {
    /// Vertex positions relative to `position`.
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Counter-clockwise seen from above (+Y).
    pub indices: Vec<u32>,
    /// World-space placement of the local origin.
    pub position: Vec3,
    pub resolution: u32,
    pub local_bounds: Option<Aabb3>,
}

impl ChunkMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn world_bounds(&self) -> Option<Aabb3> {
        self.local_bounds.map(|b| b.translated(self.position))
    }

    pub fn world_vertex(&self, index: usize) -> Option<Vec3> {
        self.positions.get(index).map(|p| *p + self.position)
    }

    /// World-space triangles in index order.
    pub fn world_triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            Some([
                self.world_vertex(tri[0] as usize)?,
                self.world_vertex(tri[1] as usize)?,
                self.world_vertex(tri[2] as usize)?,
            ])
        })
    }
}

/// Chunks above [`MAX_RESOLUTION`] have no mesh indexable by `u32` and come
/// back empty, still placed at the chunk center.
pub fn build_chunk_mesh(chunk: &TerrainChunk) -> ChunkMesh {
    let half_w = chunk.width / 2.0;
    let half_d = chunk.depth / 2.0;
    let position = Vec3::new(chunk.x + half_w, chunk.y, chunk.z + half_d);

    let res = chunk.resolution as usize;
    let grid = res
        .checked_mul(res)
        .filter(|_| chunk.resolution <= MAX_RESOLUTION)
        .and_then(|total| Some((total, grid_indices(chunk.resolution)?)));
    let Some((vertex_total, indices)) = grid else {
        return ChunkMesh {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            position,
            resolution: chunk.resolution,
            local_bounds: None,
        };
    };

    let segments = chunk.resolution.saturating_sub(1).max(1) as f64;
    let seg_w = chunk.width / segments;
    let seg_d = chunk.depth / segments;

    let mut positions = Vec::with_capacity(vertex_total);
    for row in 0..res {
        let py = row as f64 * seg_d - half_d;
        for col in 0..res {
            let px = col as f64 * seg_w - half_w;
            // Missing samples stay flat rather than failing the build.
            let h = chunk.sample(row, col).unwrap_or(0.0);
            positions.push(rotate_to_ground(Vec3::new(px, -py, h)));
        }
    }

    let normals = vertex_normals(&positions, &indices);
    let local_bounds = Aabb3::from_points(positions.iter().copied());

    ChunkMesh {
        positions,
        normals,
        indices,
        position,
        resolution: chunk.resolution,
        local_bounds,
    }
}

/// Rotation of -90° about X: (x, y, z) → (x, z, -y).
fn rotate_to_ground(p: Vec3) -> Vec3 {
    Vec3::new(p.x, p.z, -p.y)
}

/// `None` when an index would not fit in `u32`.
fn grid_indices(resolution: u32) -> Option<Vec<u32>> {
    let res = resolution as usize;
    let cells = res.saturating_sub(1);
    let last_vertex = res.checked_mul(res)?.checked_sub(1).unwrap_or(0);
    u32::try_from(last_vertex).ok()?;

    let mut indices = Vec::with_capacity(cells.checked_mul(cells)?.checked_mul(6)?);
    for row in 0..cells {
        for col in 0..cells {
            let a = row * res + col;
            let b = (row + 1) * res + col;
            let c = b + 1;
            let d = a + 1;
            for i in [a, b, d, b, c, d] {
                indices.push(u32::try_from(i).ok()?);
            }
        }
    }
    Some(indices)
}

/// Area-weighted smooth normals from the displaced positions.
fn vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let face = (positions[ib] - positions[ia]).cross(positions[ic] - positions[ia]);
        acc[ia] += face;
        acc[ib] += face;
        acc[ic] += face;
    }
    acc.into_iter()
        .map(|n| n.normalized().unwrap_or(Vec3::UP))
        .collect()
}
