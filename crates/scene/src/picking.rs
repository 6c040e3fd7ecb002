use foundation::math::Vec3;
use foundation::math::precision::stable_total_cmp_f64;

use crate::mesh::ChunkMesh;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    /// Position of the hit mesh in the slice passed to [`pick_ray`].
    pub chunk: usize,
    pub distance: f64,
    pub point: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub max_distance: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            max_distance: 1.0e30,
        }
    }
}

/// Ray picking against chunk meshes.
///
/// Ordering contract:
/// - The closest hit along the (normalized) ray wins.
/// - Equal distances resolve to the lower chunk position.
///
/// Triangles are tested double-sided; each mesh's world bounds act as a
/// broadphase.
pub fn pick_ray<'a, I>(meshes: I, ray: Ray, opts: PickOptions) -> Option<PickHit>
where
    I: IntoIterator<Item = &'a ChunkMesh>,
{
    let dir = ray.dir.normalized()?;
    let ray = Ray::new(ray.origin, dir);

    let mut best: Option<(f64, usize)> = None;
    for (chunk, mesh) in meshes.into_iter().enumerate() {
        let Some(bounds) = mesh.world_bounds() else {
            continue;
        };
        if bounds
            .ray_hit_t(ray.origin, ray.dir, 0.0, opts.max_distance)
            .is_none()
        {
            continue;
        }

        for tri in mesh.world_triangles() {
            let Some(t) = ray_triangle_t(&ray, tri) else {
                continue;
            };
            if t > opts.max_distance {
                continue;
            }
            best = match best {
                None => Some((t, chunk)),
                Some((bt, bc)) => {
                    let ord = stable_total_cmp_f64(t, bt).then_with(|| chunk.cmp(&bc));
                    if ord.is_lt() { Some((t, chunk)) } else { Some((bt, bc)) }
                }
            };
        }
    }

    let (t, chunk) = best?;
    Some(PickHit {
        chunk,
        distance: t,
        point: ray.at(t),
    })
}

/// Möller–Trumbore; returns the hit distance for `t >= 0`.
fn ray_triangle_t(ray: &Ray, [a, b, c]: [Vec3; 3]) -> Option<f64> {
    const EPS: f64 = 1e-12;
    let e1 = b - a;
    let e2 = c - a;
    let p = ray.dir.cross(e2);
    let det = e1.dot(p);
    if det.abs() < EPS {
        return None;
    }
    let inv = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = ray.dir.dot(q) * inv;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv;
    if t < 0.0 {
        return None;
    }
    Some(t)
}

#[cfg(test)]
mod tests {
    use super::{PickOptions, Ray, pick_ray};
    use crate::mesh::build_chunk_mesh;
    use formats::TerrainChunk;
    use foundation::math::Vec3;

    fn flat_chunk(x: f64, z: f64, y: f64) -> TerrainChunk {
        TerrainChunk {
            x,
            z,
            y,
            width: 10.0,
            depth: 10.0,
            resolution: 3,
            height_map: vec![0.0; 9],
        }
    }

    #[test]
    fn downward_ray_hits_terrain_surface() {
        let mesh = build_chunk_mesh(&flat_chunk(0.0, 0.0, 2.0));
        let ray = Ray::new(Vec3::new(3.0, 50.0, 6.0), Vec3::new(0.0, -1.0, 0.0));
        let hit = pick_ray([&mesh], ray, PickOptions::default()).expect("hit");
        assert_eq!(hit.chunk, 0);
        assert!((hit.point.x - 3.0).abs() < 1e-9);
        assert!((hit.point.y - 2.0).abs() < 1e-9);
        assert!((hit.point.z - 6.0).abs() < 1e-9);
        assert!((hit.distance - 48.0).abs() < 1e-9);
    }

    #[test]
    fn miss_outside_every_chunk() {
        let mesh = build_chunk_mesh(&flat_chunk(0.0, 0.0, 0.0));
        let ray = Ray::new(Vec3::new(30.0, 10.0, 30.0), Vec3::new(0.0, -1.0, 0.0));
        assert!(pick_ray([&mesh], ray, PickOptions::default()).is_none());
        let up = Ray::new(Vec3::new(5.0, 10.0, 5.0), Vec3::new(0.0, 1.0, 0.0));
        assert!(pick_ray([&mesh], up, PickOptions::default()).is_none());
    }

    #[test]
    fn nearest_chunk_wins() {
        let low = build_chunk_mesh(&flat_chunk(0.0, 0.0, 0.0));
        let high = build_chunk_mesh(&flat_chunk(0.0, 0.0, 5.0));
        let ray = Ray::new(Vec3::new(4.0, 20.0, 3.0), Vec3::new(0.0, -2.0, 0.0));
        let hit = pick_ray([&low, &high], ray, PickOptions::default()).expect("hit");
        assert_eq!(hit.chunk, 1);
        assert!((hit.distance - 15.0).abs() < 1e-9);
    }

    #[test]
    fn zero_direction_is_rejected() {
        let mesh = build_chunk_mesh(&flat_chunk(0.0, 0.0, 0.0));
        let ray = Ray::new(Vec3::new(5.0, 20.0, 5.0), Vec3::ZERO);
        assert!(pick_ray([&mesh], ray, PickOptions::default()).is_none());
    }
}
