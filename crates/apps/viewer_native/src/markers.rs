use foundation::math::Vec3;
use gpu::{Material, MarkerShape, MeshGeometry, MeshHandle, MeshResource, MeshStore};
use streaming::MarkerScene;

/// Marker meshes in the shared mesh store. Each marker stands on its
/// ground point.
pub struct MarkerLayer<'a> {
    meshes: &'a mut MeshStore,
    shape: MarkerShape,
}

impl<'a> MarkerLayer<'a> {
    pub fn new(meshes: &'a mut MeshStore) -> Self {
        Self {
            meshes,
            shape: MarkerShape::default(),
        }
    }
}

impl MarkerScene for MarkerLayer<'_> {
    type Handle = MeshHandle;

    fn spawn_marker(&mut self, _id: &str, ground: Vec3) -> MeshHandle {
        self.meshes.insert(MeshResource::new(
            MeshGeometry::Marker(self.shape),
            Material::MARKER,
            ground,
        ))
    }

    fn move_marker(&mut self, handle: &MeshHandle, ground: Vec3) {
        self.meshes.set_position(*handle, ground);
    }

    fn release_marker(&mut self, handle: MeshHandle) {
        self.meshes.release(handle);
    }
}
