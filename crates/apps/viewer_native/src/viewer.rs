//! The viewer context. All mutable scene state lives here and is only
//! touched from the frame loop; async work comes back as [`ViewerEvent`]s
//! and goes out as [`Request`]s.

use std::mem;

use catalog::CatalogError;
use formats::TerrainDocument;
use foundation::math::{Vec2, Vec3};
use gpu::{
    Material, MeshGeometry, MeshHandle, MeshResource, MeshStore, OrbitCamera, RenderFrame,
    Renderer, Viewport,
};
use scene::mesh::build_chunk_mesh;
use scene::picking::{PickHit, PickOptions, pick_ray};
use scene::terrain::TerrainStore;
use streaming::{ConnectionState, MarkerBook, ServerMessage, SocketEvent};
use tracing::{debug, info, warn};

use crate::commands::Command;
use crate::events::{Request, ViewerEvent};
use crate::hud::{HudSnapshot, MapStatus};
use crate::markers::MarkerLayer;

#[derive(Debug)]
pub struct Viewer {
    meshes: MeshStore,
    terrain: TerrainStore,
    chunks: Vec<MeshHandle>,
    markers: MarkerBook<MeshHandle>,
    camera: OrbitCamera,
    viewport: Viewport,
    hover: Option<Vec3>,
    status: MapStatus,
    notice: Option<String>,
    maps: Vec<String>,
    wireframe: bool,
    /// Bumped on every map selection; load results carrying an older value
    /// are dropped.
    generation: u64,
    connection: ConnectionState,
    outbox: Vec<Request>,
    quit: bool,
}

impl Viewer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            meshes: MeshStore::new(),
            terrain: TerrainStore::new(),
            chunks: Vec::new(),
            markers: MarkerBook::new(),
            camera: OrbitCamera::default(),
            viewport,
            hover: None,
            status: MapStatus::NoMap,
            notice: None,
            maps: Vec::new(),
            wireframe: false,
            generation: 0,
            connection: ConnectionState::Disconnected,
            outbox: Vec::new(),
            quit: false,
        }
    }

    pub fn meshes(&self) -> &MeshStore {
        &self.meshes
    }

    pub fn terrain(&self) -> &TerrainStore {
        &self.terrain
    }

    pub fn chunk_handles(&self) -> &[MeshHandle] {
        &self.chunks
    }

    pub fn markers(&self) -> &MarkerBook<MeshHandle> {
        &self.markers
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn hover_point(&self) -> Option<Vec3> {
        self.hover
    }

    pub fn status(&self) -> &MapStatus {
        &self.status
    }

    pub fn maps(&self) -> &[String] {
        &self.maps
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Requests queued since the last call.
    pub fn take_requests(&mut self) -> Vec<Request> {
        mem::take(&mut self.outbox)
    }

    pub fn handle(&mut self, event: ViewerEvent) {
        match event {
            ViewerEvent::Socket(SocketEvent::State(state)) => self.set_connection(state),
            ViewerEvent::Socket(SocketEvent::Message(msg)) => self.apply_marker_message(msg),
            ViewerEvent::MapsListed(maps) => self.set_maps(maps),
            ViewerEvent::MapLoaded {
                generation,
                id,
                result,
            } => {
                self.finish_map_load(generation, id, result);
            }
            ViewerEvent::RequestFailed(msg) => self.notice = Some(msg),
            ViewerEvent::Input(command) => self.command(command),
            ViewerEvent::InputClosed => {
                info!("input closed");
                self.quit = true;
            }
        }
    }

    pub fn command(&mut self, command: Command) {
        match command {
            Command::Maps => self.request(Request::ListMaps),
            Command::Load(id) => self.select_map(id),
            Command::Click(px) => {
                self.click(px);
            }
            Command::Hover(px) => self.hover(px),
            Command::Orbit { dx, dy } => self.camera.orbit(dx, dy),
            Command::Pan { dx, dy } => self.camera.pan(dx, dy),
            Command::Zoom(delta) => self.camera.zoom(delta),
            Command::Resize { width, height } => self.viewport = Viewport::new(width, height),
            Command::Wireframe => self.toggle_wireframe(),
            Command::Clear => self.request(Request::ClearMarkers),
            // Printing is the shell's job.
            Command::Hud => {}
            Command::Quit => self.quit = true,
        }
    }

    /// Drops the current map right away, then asks for the new one.
    pub fn select_map(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.clear_map();
        self.generation += 1;
        info!(%id, generation = self.generation, "loading map");
        self.status = MapStatus::Loading(id.clone());
        self.request(Request::LoadMap {
            generation: self.generation,
            id,
        });
    }

    /// Queues `request`. A new request supersedes the previous notice.
    fn request(&mut self, request: Request) {
        self.notice = None;
        self.outbox.push(request);
    }

    /// Returns `false` when the result belongs to a superseded selection.
    pub fn finish_map_load(
        &mut self,
        generation: u64,
        id: String,
        result: Result<TerrainDocument, CatalogError>,
    ) -> bool {
        if generation != self.generation {
            debug!(%id, generation, current = self.generation, "stale map load dropped");
            return false;
        }
        match result {
            Ok(document) => self.populate(id, document),
            Err(err) => {
                warn!(%id, %err, "map load failed");
                self.status = MapStatus::Failed {
                    id,
                    reason: err.to_string(),
                };
            }
        }
        true
    }

    fn populate(&mut self, id: String, document: TerrainDocument) {
        for warning in document.validate() {
            warn!(%id, %warning, "terrain data issue");
        }
        let mut material = Material::TERRAIN;
        material.wireframe = self.wireframe;
        for chunk in &document.terrains {
            let mesh = build_chunk_mesh(chunk);
            let position = mesh.position;
            let handle = self.meshes.insert(MeshResource::new(
                MeshGeometry::Terrain(mesh),
                material,
                position,
            ));
            self.chunks.push(handle);
        }
        if let Some(first) = document.first_chunk() {
            let [x, y, z] = first.center();
            self.camera.frame(Vec3::new(x, y, z), first.width.max(first.depth));
        }
        self.terrain.replace(document);
        self.markers
            .resample(&mut MarkerLayer::new(&mut self.meshes), &self.terrain);
        info!(%id, chunks = self.chunks.len(), "map loaded");
        self.status = MapStatus::Loaded(id);
    }

    fn clear_map(&mut self) {
        for handle in self.chunks.drain(..) {
            self.meshes.release(handle);
        }
        self.terrain.clear();
        self.markers
            .resample(&mut MarkerLayer::new(&mut self.meshes), &self.terrain);
        self.hover = None;
    }

    /// Terrain under a pixel, if any map is loaded.
    pub fn pick(&self, px: Vec2) -> Option<PickHit> {
        if self.chunks.is_empty() {
            return None;
        }
        let ray = self.camera.camera().screen_ray(px, self.viewport)?;
        let meshes = self
            .chunks
            .iter()
            .filter_map(|handle| match &self.meshes.get(*handle)?.geometry {
                MeshGeometry::Terrain(mesh) => Some(mesh),
                MeshGeometry::Marker(_) => None,
            });
        pick_ray(meshes, ray, PickOptions::default())
    }

    /// Asks the server for a marker at the picked point. The marker shows
    /// up only once the server broadcasts it.
    pub fn click(&mut self, px: Vec2) -> Option<Vec3> {
        let hit = self.pick(px)?;
        debug!(x = hit.point.x, z = hit.point.z, "placing marker");
        self.request(Request::CreateMarker {
            x: hit.point.x,
            z: hit.point.z,
        });
        Some(hit.point)
    }

    pub fn hover(&mut self, px: Vec2) {
        self.hover = self.pick(px).map(|hit| hit.point);
    }

    pub fn toggle_wireframe(&mut self) {
        self.wireframe = !self.wireframe;
        for &handle in &self.chunks {
            self.meshes.set_wireframe(handle, self.wireframe);
        }
    }

    fn set_connection(&mut self, state: ConnectionState) {
        if self.connection != state {
            info!(from = %self.connection, to = %state, "marker connection");
            self.connection = state;
        }
    }

    fn set_maps(&mut self, maps: Vec<String>) {
        info!(count = maps.len(), "map catalog");
        self.notice = maps.is_empty().then(|| "No maps available".to_string());
        self.maps = maps;
    }

    fn apply_marker_message(&mut self, msg: ServerMessage) {
        let change = self
            .markers
            .apply(msg, &mut MarkerLayer::new(&mut self.meshes), &self.terrain);
        debug!(?change, markers = self.markers.len(), "marker update");
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            camera: self.camera.eye(),
            target: self.camera.target,
            hover: self.hover,
            markers: self.markers.len(),
            connection: self.connection,
            status: self.status.clone(),
            notice: self.notice.clone(),
        }
    }

    pub fn render(&self) -> RenderFrame {
        Renderer::collect(&self.meshes, self.camera.camera(), self.viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::Viewer;
    use crate::commands::Command;
    use crate::events::{Request, ViewerEvent};
    use crate::hud::MapStatus;
    use catalog::CatalogError;
    use formats::{TerrainChunk, TerrainDocument};
    use foundation::math::{Vec2, Vec3};
    use gpu::{MeshGeometry, RenderCommand, Viewport};
    use pretty_assertions::assert_eq;
    use streaming::{ConnectionState, PlayerRecord, ServerMessage, SocketEvent};

    fn flat_map(y: f64) -> TerrainDocument {
        TerrainDocument {
            terrains: vec![TerrainChunk {
                x: 0.0,
                z: 0.0,
                y,
                width: 10.0,
                depth: 10.0,
                resolution: 3,
                height_map: vec![0.0; 9],
            }],
        }
    }

    fn loaded_viewer(doc: TerrainDocument) -> Viewer {
        let mut viewer = Viewer::new(Viewport::default());
        viewer.select_map("map_1.json");
        let generation = viewer.generation();
        viewer.take_requests();
        assert!(viewer.finish_map_load(generation, "map_1.json".to_string(), Ok(doc)));
        viewer
    }

    fn socket(msg: ServerMessage) -> ViewerEvent {
        ViewerEvent::Socket(SocketEvent::Message(msg))
    }

    #[test]
    fn selecting_a_map_clears_and_requests_it() {
        let mut viewer = loaded_viewer(flat_map(0.0));
        assert_eq!(viewer.chunk_handles().len(), 1);

        viewer.command(Command::Load("map_2.json".to_string()));
        assert!(viewer.chunk_handles().is_empty());
        assert!(viewer.terrain().is_empty());
        assert_eq!(viewer.meshes().live_count(), 0);
        assert_eq!(viewer.status(), &MapStatus::Loading("map_2.json".to_string()));
        assert_eq!(
            viewer.take_requests(),
            vec![Request::LoadMap {
                generation: 2,
                id: "map_2.json".to_string()
            }]
        );
    }

    #[test]
    fn stale_map_results_are_dropped() {
        let mut viewer = Viewer::new(Viewport::default());
        viewer.select_map("a.json");
        viewer.select_map("b.json");

        assert!(!viewer.finish_map_load(1, "a.json".to_string(), Ok(flat_map(0.0))));
        assert!(viewer.chunk_handles().is_empty());
        assert_eq!(viewer.status(), &MapStatus::Loading("b.json".to_string()));

        assert!(viewer.finish_map_load(2, "b.json".to_string(), Ok(flat_map(0.0))));
        assert_eq!(viewer.chunk_handles().len(), 1);
        assert_eq!(viewer.status(), &MapStatus::Loaded("b.json".to_string()));
    }

    #[test]
    fn failed_load_shows_error_in_hud() {
        let mut viewer = Viewer::new(Viewport::default());
        viewer.select_map("gone.json");
        viewer.handle(ViewerEvent::MapLoaded {
            generation: 1,
            id: "gone.json".to_string(),
            result: Err(CatalogError::Status {
                url: "http://127.0.0.1:3000/maps/gone.json".to_string(),
                status: 404,
            }),
        });
        let hud = viewer.hud().to_string();
        assert!(hud.contains("Error loading map gone.json"), "{hud}");
        assert!(viewer.chunk_handles().is_empty());
    }

    #[test]
    fn load_frames_camera_on_first_chunk() {
        let viewer = loaded_viewer(flat_map(2.0));
        assert_eq!(viewer.camera().target, Vec3::new(5.0, 2.0, 5.0));
        assert_eq!(viewer.camera().distance, 15.0);
    }

    #[test]
    fn click_on_terrain_requests_marker_at_hit() {
        let mut viewer = loaded_viewer(flat_map(0.0));
        let hit = viewer.click(Vec2::new(700.0, 420.0)).expect("terrain under cursor");
        assert!(hit.x > 0.0 && hit.x < 10.0, "{hit:?}");
        assert!(hit.z > 0.0 && hit.z < 10.0, "{hit:?}");
        assert!(hit.y.abs() < 1e-9);
        assert_eq!(
            viewer.take_requests(),
            vec![Request::CreateMarker { x: hit.x, z: hit.z }]
        );
        // No optimistic insert.
        assert!(viewer.markers().is_empty());
    }

    #[test]
    fn click_without_map_or_on_sky_does_nothing() {
        let mut viewer = Viewer::new(Viewport::default());
        assert_eq!(viewer.click(Vec2::new(640.0, 360.0)), None);

        let mut viewer = loaded_viewer(flat_map(0.0));
        // Top edge of the view looks above the horizon.
        assert_eq!(viewer.click(Vec2::new(0.0, 0.0)), None);
        assert!(viewer.take_requests().is_empty());
    }

    #[test]
    fn hover_updates_cache_and_hud() {
        let mut viewer = loaded_viewer(flat_map(0.0));
        assert!(viewer.hud().to_string().contains("Hover: none"));
        viewer.command(Command::Hover(Vec2::new(700.0, 420.0)));
        assert!(viewer.hover_point().is_some());
        viewer.command(Command::Hover(Vec2::new(0.0, 0.0)));
        assert_eq!(viewer.hover_point(), None);
    }

    #[test]
    fn wireframe_toggles_chunk_materials_in_place() {
        let mut viewer = loaded_viewer(flat_map(0.0));
        viewer.handle(socket(ServerMessage::PlayerCreated {
            player: PlayerRecord::new("p", 1.0, 1.0),
        }));
        viewer.command(Command::Wireframe);
        assert!(viewer.wireframe());

        let frame = viewer.render();
        let flags: Vec<(bool, bool)> = frame
            .commands
            .iter()
            .map(|RenderCommand::DrawMesh { handle, wireframe, .. }| {
                let is_chunk = viewer.chunk_handles().contains(handle);
                (is_chunk, *wireframe)
            })
            .collect();
        assert_eq!(flags.len(), 2);
        assert!(flags.contains(&(true, true)));
        assert!(flags.contains(&(false, false)));

        viewer.command(Command::Wireframe);
        let handle = viewer.chunk_handles()[0];
        let material = viewer.meshes().get(handle).expect("chunk").material;
        assert!(!material.wireframe);
    }

    #[test]
    fn wireframe_state_carries_into_next_map() {
        let mut viewer = loaded_viewer(flat_map(0.0));
        viewer.toggle_wireframe();
        viewer.select_map("map_2.json");
        assert!(viewer.finish_map_load(2, "map_2.json".to_string(), Ok(flat_map(0.0))));
        let handle = viewer.chunk_handles()[0];
        assert!(viewer.meshes().get(handle).expect("chunk").material.wireframe);
    }

    #[test]
    fn marker_messages_drive_meshes() {
        let mut viewer = loaded_viewer(flat_map(1.5));
        viewer.handle(socket(ServerMessage::InitialState {
            players: vec![
                PlayerRecord::new("a", 2.0, 2.0),
                PlayerRecord::new("b", 20.0, 20.0),
            ],
        }));
        assert_eq!(viewer.markers().len(), 2);
        assert_eq!(viewer.meshes().live_count(), 3);

        let a = viewer.markers().get("a").expect("a").handle;
        let b = viewer.markers().get("b").expect("b").handle;
        assert_eq!(viewer.meshes().get(a).expect("mesh").position, Vec3::new(2.0, 1.5, 2.0));
        // Off the terrain: ground height 0.
        assert_eq!(viewer.meshes().get(b).expect("mesh").position, Vec3::new(20.0, 0.0, 20.0));
        assert!(matches!(
            viewer.meshes().get(a).expect("mesh").geometry,
            MeshGeometry::Marker(_)
        ));

        viewer.handle(socket(ServerMessage::AllCleared));
        assert!(viewer.markers().is_empty());
        assert_eq!(viewer.meshes().live_count(), 1);
        assert!(viewer.hud().to_string().contains("Markers: 0"));
    }

    #[test]
    fn markers_follow_terrain_across_map_loads() {
        let mut viewer = Viewer::new(Viewport::default());
        viewer.handle(socket(ServerMessage::PlayerCreated {
            player: PlayerRecord::new("p", 5.0, 5.0),
        }));
        let handle = viewer.markers().get("p").expect("marker").handle;
        assert_eq!(viewer.meshes().get(handle).expect("mesh").position.y, 0.0);

        viewer.select_map("map_1.json");
        assert!(viewer.finish_map_load(1, "map_1.json".to_string(), Ok(flat_map(3.0))));
        assert_eq!(viewer.meshes().get(handle).expect("mesh").position.y, 3.0);
    }

    #[test]
    fn failed_load_drops_markers_to_flat_ground() {
        let mut viewer = loaded_viewer(flat_map(3.0));
        viewer.handle(socket(ServerMessage::PlayerCreated {
            player: PlayerRecord::new("p", 5.0, 5.0),
        }));
        let handle = viewer.markers().get("p").expect("marker").handle;
        assert_eq!(viewer.meshes().get(handle).expect("mesh").position.y, 3.0);

        viewer.select_map("gone.json");
        assert_eq!(viewer.meshes().get(handle).expect("mesh").position.y, 0.0);
        assert!(viewer.finish_map_load(
            2,
            "gone.json".to_string(),
            Err(CatalogError::Status {
                url: "http://127.0.0.1:3000/maps/gone.json".to_string(),
                status: 404,
            }),
        ));
        assert_eq!(
            viewer.meshes().get(handle).expect("mesh").position,
            Vec3::new(5.0, 0.0, 5.0)
        );
        assert_eq!(viewer.terrain().height_at(5.0, 5.0), 0.0);
    }

    #[test]
    fn request_failure_notice_clears_on_next_request() {
        let mut viewer = loaded_viewer(flat_map(0.0));
        viewer.handle(ViewerEvent::RequestFailed(
            "Error placing marker: timeout".to_string(),
        ));
        assert!(viewer.hud().to_string().contains("Error placing marker"));

        // Hovering sends nothing, so the notice stays.
        viewer.command(Command::Hover(Vec2::new(700.0, 420.0)));
        assert!(viewer.hud().to_string().contains("Error placing marker"));

        viewer.command(Command::Click(Vec2::new(700.0, 420.0)));
        assert!(!viewer.hud().to_string().contains("Error placing marker"));
        assert_eq!(viewer.take_requests().len(), 1);

        viewer.handle(ViewerEvent::RequestFailed("Error clearing markers: 500".to_string()));
        viewer.command(Command::Load("map_2.json".to_string()));
        assert!(!viewer.hud().to_string().contains("Error clearing markers"));
    }

    #[test]
    fn connection_and_catalog_events_reach_hud() {
        let mut viewer = Viewer::new(Viewport::default());
        viewer.handle(ViewerEvent::Socket(SocketEvent::State(ConnectionState::Connected)));
        viewer.handle(ViewerEvent::MapsListed(Vec::new()));
        let hud = viewer.hud().to_string();
        assert!(hud.contains("Server: connected"));
        assert!(hud.contains("No maps available"));

        viewer.handle(ViewerEvent::MapsListed(vec!["map_1.json".to_string()]));
        assert_eq!(viewer.maps(), ["map_1.json".to_string()]);
        assert!(!viewer.hud().to_string().contains("No maps available"));
    }

    #[test]
    fn commands_queue_requests_and_quit() {
        let mut viewer = Viewer::new(Viewport::default());
        viewer.command(Command::Maps);
        viewer.command(Command::Clear);
        assert_eq!(viewer.take_requests(), vec![Request::ListMaps, Request::ClearMarkers]);
        viewer.command(Command::Resize {
            width: 640.0,
            height: 480.0,
        });
        assert_eq!(viewer.viewport(), Viewport::new(640.0, 480.0));
        assert!(!viewer.quit_requested());
        viewer.handle(ViewerEvent::InputClosed);
        assert!(viewer.quit_requested());
    }
}
