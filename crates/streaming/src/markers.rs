//! Local mirror of the server's marker set.
//!
//! The book only changes in response to server messages. Heights are never
//! taken from the wire: every placement resamples the current terrain.

use std::collections::BTreeMap;

use foundation::math::Vec3;
use scene::terrain::HeightSampler;
use tracing::debug;

use crate::protocol::{MarkerId, PlayerRecord, ServerMessage};

/// Rendering side of marker management.
pub trait MarkerScene {
    type Handle;

    /// `ground` is the terrain point the marker stands on.
    fn spawn_marker(&mut self, id: &str, ground: Vec3) -> Self::Handle;
    fn move_marker(&mut self, handle: &Self::Handle, ground: Vec3);
    fn release_marker(&mut self, handle: Self::Handle);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker<H> {
    pub ground: Vec3,
    pub handle: H,
}

/// What an applied message did to the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerChange {
    Reset { released: usize, created: usize },
    Created(MarkerId),
    Moved(MarkerId),
    Removed(MarkerId),
    Cleared { released: usize },
    /// Duplicate create, or move/remove of an unknown id.
    Ignored,
}

#[derive(Debug)]
pub struct MarkerBook<H> {
    markers: BTreeMap<MarkerId, Marker<H>>,
}

impl<H> Default for MarkerBook<H> {
    fn default() -> Self {
        Self {
            markers: BTreeMap::new(),
        }
    }
}

impl<H> MarkerBook<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Marker<H>> {
        self.markers.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.markers.keys().map(String::as_str)
    }

    pub fn apply<S>(
        &mut self,
        msg: ServerMessage,
        scene: &mut S,
        terrain: &dyn HeightSampler,
    ) -> MarkerChange
    where
        S: MarkerScene<Handle = H>,
    {
        match msg {
            ServerMessage::InitialState { players } => {
                let released = self.release_all(scene);
                let mut created = 0;
                for player in players {
                    if self.insert(player, scene, terrain) {
                        created += 1;
                    }
                }
                MarkerChange::Reset { released, created }
            }
            ServerMessage::PlayerCreated { player } => {
                let id = player.id.clone();
                if self.insert(player, scene, terrain) {
                    MarkerChange::Created(id)
                } else {
                    debug!(%id, "duplicate player_created ignored");
                    MarkerChange::Ignored
                }
            }
            ServerMessage::PlayerMoved { id, x, z } => {
                let Some(marker) = self.markers.get_mut(&id) else {
                    debug!(%id, "player_moved for unknown marker ignored");
                    return MarkerChange::Ignored;
                };
                marker.ground = ground_point(terrain, x, z);
                scene.move_marker(&marker.handle, marker.ground);
                MarkerChange::Moved(id)
            }
            ServerMessage::PlayerRemoved { id } => match self.markers.remove(&id) {
                Some(marker) => {
                    scene.release_marker(marker.handle);
                    MarkerChange::Removed(id)
                }
                None => MarkerChange::Ignored,
            },
            ServerMessage::AllCleared => MarkerChange::Cleared {
                released: self.release_all(scene),
            },
        }
    }

    /// Re-seat every marker on the current terrain, e.g. after a map change.
    pub fn resample<S>(&mut self, scene: &mut S, terrain: &dyn HeightSampler)
    where
        S: MarkerScene<Handle = H>,
    {
        for marker in self.markers.values_mut() {
            marker.ground = ground_point(terrain, marker.ground.x, marker.ground.z);
            scene.move_marker(&marker.handle, marker.ground);
        }
    }

    pub fn release_all<S>(&mut self, scene: &mut S) -> usize
    where
        S: MarkerScene<Handle = H>,
    {
        let released = self.markers.len();
        for (_, marker) in std::mem::take(&mut self.markers) {
            scene.release_marker(marker.handle);
        }
        released
    }

    fn insert<S>(&mut self, player: PlayerRecord, scene: &mut S, terrain: &dyn HeightSampler) -> bool
    where
        S: MarkerScene<Handle = H>,
    {
        if self.markers.contains_key(&player.id) {
            return false;
        }
        let ground = ground_point(terrain, player.x, player.z);
        let handle = scene.spawn_marker(&player.id, ground);
        self.markers.insert(player.id, Marker { ground, handle });
        true
    }
}

fn ground_point(terrain: &dyn HeightSampler, x: f64, z: f64) -> Vec3 {
    Vec3::new(x, terrain.height_at(x, z), z)
}
