//! GPU-side resource ownership.
//!
//! Every mesh lives in a [`MeshStore`] slot addressed by a generational
//! [`MeshHandle`]. Nothing is reclaimed implicitly: the owner calls
//! [`MeshStore::release`] when the object leaves the scene, and a released
//! handle never resolves again.

use foundation::handles::{Handle, HandleAllocator};
use foundation::math::Vec3;
use scene::mesh::ChunkMesh;
use tracing::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub Handle);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: [f32; 4],
    pub wireframe: bool,
}

impl Material {
    pub const TERRAIN: Material = Material {
        color: [0.36, 0.55, 0.30, 1.0],
        wireframe: false,
    };
    pub const MARKER: Material = Material {
        color: [0.90, 0.20, 0.15, 1.0],
        wireframe: false,
    };
}

/// Marker primitive: an upright cylinder standing on its base.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerShape {
    pub radius: f64,
    pub height: f64,
    pub segments: u32,
}

impl Default for MarkerShape {
    fn default() -> Self {
        Self {
            radius: 0.5,
            height: 2.0,
            segments: 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MeshGeometry {
    Terrain(ChunkMesh),
    Marker(MarkerShape),
}

impl MeshGeometry {
    pub fn triangle_count(&self) -> usize {
        match self {
            MeshGeometry::Terrain(mesh) => mesh.triangle_count(),
            // Side quads plus both caps.
            MeshGeometry::Marker(shape) => shape.segments as usize * 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshResource {
    pub geometry: MeshGeometry,
    pub material: Material,
    pub position: Vec3,
    pub visible: bool,
}

impl MeshResource {
    pub fn new(geometry: MeshGeometry, material: Material, position: Vec3) -> Self {
        Self {
            geometry,
            material,
            position,
            visible: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct MeshStore {
    handles: HandleAllocator,
    slots: Vec<Option<MeshResource>>,
}

impl MeshStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, resource: MeshResource) -> MeshHandle {
        let handle = self.handles.allocate();
        let idx = handle.index() as usize;
        if self.slots.len() <= idx {
            self.slots.resize_with(idx + 1, || None);
        }
        self.slots[idx] = Some(resource);
        MeshHandle(handle)
    }

    pub fn get(&self, handle: MeshHandle) -> Option<&MeshResource> {
        if !self.handles.is_live(handle.0) {
            return None;
        }
        self.slots.get(handle.0.index() as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, handle: MeshHandle) -> Option<&mut MeshResource> {
        if !self.handles.is_live(handle.0) {
            return None;
        }
        self.slots.get_mut(handle.0.index() as usize)?.as_mut()
    }

    pub fn set_position(&mut self, handle: MeshHandle, position: Vec3) -> bool {
        match self.get_mut(handle) {
            Some(res) => {
                res.position = position;
                true
            }
            None => false,
        }
    }

    /// Mutates the material in place.
    pub fn set_wireframe(&mut self, handle: MeshHandle, wireframe: bool) -> bool {
        match self.get_mut(handle) {
            Some(res) => {
                res.material.wireframe = wireframe;
                true
            }
            None => false,
        }
    }

    /// Frees geometry and material. Stale handles are ignored.
    pub fn release(&mut self, handle: MeshHandle) -> Option<MeshResource> {
        if !self.handles.release(handle.0) {
            debug!(?handle, "release of stale mesh handle ignored");
            return None;
        }
        self.slots.get_mut(handle.0.index() as usize)?.take()
    }

    pub fn live_count(&self) -> usize {
        self.handles.live_count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshHandle, &MeshResource)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            let res = slot.as_ref()?;
            let handle = self.live_handle_at(idx)?;
            Some((handle, res))
        })
    }

    fn live_handle_at(&self, idx: usize) -> Option<MeshHandle> {
        let generation = self.handles.generation_at(idx as u32)?;
        let handle = Handle::new(idx as u32, generation);
        self.handles.is_live(handle).then_some(MeshHandle(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::{MarkerShape, Material, MeshGeometry, MeshResource, MeshStore};
    use foundation::math::Vec3;

    fn marker() -> MeshResource {
        MeshResource::new(
            MeshGeometry::Marker(MarkerShape::default()),
            Material::MARKER,
            Vec3::ZERO,
        )
    }

    #[test]
    fn release_frees_and_invalidates_handle() {
        let mut store = MeshStore::new();
        let a = store.insert(marker());
        let b = store.insert(marker());
        assert_eq!(store.live_count(), 2);

        assert!(store.release(a).is_some());
        assert!(store.get(a).is_none());
        assert!(store.release(a).is_none());
        assert_eq!(store.live_count(), 1);

        let c = store.insert(marker());
        assert!(store.get(a).is_none());
        assert!(store.get(c).is_some());
        assert!(store.get(b).is_some());
        assert_eq!(store.iter().count(), 2);
    }

    #[test]
    fn wireframe_is_mutated_in_place() {
        let mut store = MeshStore::new();
        let h = store.insert(marker());
        assert!(store.set_wireframe(h, true));
        assert!(store.get(h).expect("live").material.wireframe);
        assert!(store.set_position(h, Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(store.get(h).expect("live").position, Vec3::new(1.0, 2.0, 3.0));
    }
}
