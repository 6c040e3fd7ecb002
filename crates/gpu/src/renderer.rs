use foundation::math::Vec3;

use crate::camera::{Camera3D, Mat4, Viewport};
use crate::resources::{MeshHandle, MeshStore};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RenderCommand {
    DrawMesh {
        handle: MeshHandle,
        position: Vec3,
        color: [f32; 4],
        wireframe: bool,
        triangles: usize,
    },
}

#[derive(Debug, Default)]
pub struct RenderFrame {
    pub view_proj: Mat4,
    pub commands: Vec<RenderCommand>,
}

impl RenderFrame {
    pub fn triangle_count(&self) -> usize {
        self.commands
            .iter()
            .map(|c| match c {
                RenderCommand::DrawMesh { triangles, .. } => *triangles,
            })
            .sum()
    }
}

pub struct Renderer;

impl Renderer {
    /// Snapshot of everything visible this frame, in handle order.
    pub fn collect(store: &MeshStore, camera: Camera3D, viewport: Viewport) -> RenderFrame {
        let mut frame = RenderFrame {
            view_proj: camera.view_proj(viewport),
            commands: Vec::new(),
        };
        for (handle, res) in store.iter() {
            if !res.visible {
                continue;
            }
            frame.commands.push(RenderCommand::DrawMesh {
                handle,
                position: res.position,
                color: res.material.color,
                wireframe: res.material.wireframe,
                triangles: res.geometry.triangle_count(),
            });
        }
        frame
    }
}
