#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural dungeon generator.
//!
//! The generator grows rooms outward from a start room placed at the origin,
//! joins anything left unconnected to its nearest connected neighbour,
//! promotes leaf rooms to treasure and boss roles, hangs secret rooms off hub
//! rooms, and finally backfills walls around every open tile. All randomness
//! flows through the caller's generator, so a seeded generator reproduces the
//! same dungeon.

pub mod catalog;
mod carve;

use std::collections::{BTreeSet, VecDeque};

use dungeon_snake_core::{CellRect, Direction, Room, RoomId, RoomKind};
use dungeon_snake_world::Dungeon;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::carve::Layout;
use crate::catalog::RoomCatalog;

/// Tunables for dungeon generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Number of rooms the growth phase aims for, start room included.
    pub target_rooms: usize,
    /// Base distance between a room and the room grown from it.
    pub base_spacing: i32,
    /// Inclusive range added to the base spacing for every attempt.
    pub spacing_jitter: (i32, i32),
    /// Spacing above which corridor rooms are preferred.
    pub corridor_room_spacing: i32,
    /// Width of every corridor.
    pub corridor_width: u32,
    /// Minimum empty margin between grown rooms.
    pub room_gap: i32,
    /// Connections after which a room stops expanding.
    pub max_connections: usize,
    /// Probability of growing a crossroads from a room that already branches.
    pub crossroads_chance: f64,
    /// Growth attempts allowed per target room.
    pub attempts_per_room: usize,
    /// Minimum depth of rooms eligible for treasure and boss roles.
    pub edge_depth: u32,
    /// Inclusive range of secret rooms to attempt.
    pub secret_rooms: (u32, u32),
    /// Inclusive range of secret corridor lengths.
    pub secret_corridor: (i32, i32),
    /// Minimum empty margin around secret rooms.
    pub secret_gap: i32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            target_rooms: 20,
            base_spacing: 15,
            spacing_jitter: (-2, 5),
            corridor_room_spacing: 18,
            corridor_width: 3,
            room_gap: 3,
            max_connections: 3,
            crossroads_chance: 0.3,
            attempts_per_room: 10,
            edge_depth: 3,
            secret_rooms: (1, 2),
            secret_corridor: (8, 12),
            secret_gap: 4,
        }
    }
}

/// Builds dungeons from a configuration and a room catalog.
#[derive(Clone, Debug, Default)]
pub struct DungeonGraph {
    config: GenerationConfig,
    catalog: RoomCatalog,
}

/// Generates a dungeon with default tunables and the provided room target.
pub fn generate<R: Rng + ?Sized>(target_room_count: usize, rng: &mut R) -> Dungeon {
    let config = GenerationConfig {
        target_rooms: target_room_count,
        ..GenerationConfig::default()
    };
    DungeonGraph::new(config, RoomCatalog::default()).generate(rng)
}

impl DungeonGraph {
    /// Creates a generator.
    #[must_use]
    pub fn new(config: GenerationConfig, catalog: RoomCatalog) -> Self {
        Self { config, catalog }
    }

    /// Tunables in use.
    #[must_use]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generates a complete dungeon.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Dungeon {
        let mut layout = Layout::default();
        let start = self.place_start(&mut layout, rng);

        self.grow(&mut layout, start, rng);
        self.ensure_connected(&mut layout, start);
        self.assign_special_rooms(&mut layout, start, rng);
        self.attach_secret_rooms(&mut layout, rng);
        mark_terminal_room(&mut layout, start);
        layout.backfill_walls();

        log::info!(
            "generated dungeon with {} rooms ({} requested) and {} tiles",
            layout.rooms.len(),
            self.config.target_rooms,
            layout.tiles.len()
        );

        Dungeon::new(layout.rooms, start, layout.tiles, layout.meta)
    }

    fn roll_room<R: Rng + ?Sized>(
        &self,
        layout: &Layout,
        kind: RoomKind,
        direction: Option<Direction>,
        rng: &mut R,
    ) -> Room {
        let (width, height) = self
            .catalog
            .template(kind)
            .map_or((10, 10), |template| {
                template.roll_size(direction.map(Direction::axis), rng)
            });
        Room::new(layout.next_id(), kind, 0, 0, width, height)
    }

    fn place_start<R: Rng + ?Sized>(&self, layout: &mut Layout, rng: &mut R) -> RoomId {
        let start = self.roll_room(layout, RoomKind::Start, None, rng);
        layout.push_room(start)
    }

    fn grow<R: Rng + ?Sized>(&self, layout: &mut Layout, start: RoomId, rng: &mut R) {
        let target = self.config.target_rooms.max(1);
        let max_attempts = target.saturating_mul(self.config.attempts_per_room);
        let mut attempts = 0;
        let mut queue = VecDeque::from([start]);

        while layout.rooms.len() < target && attempts < max_attempts {
            let Some(base_id) = queue.pop_front() else {
                break;
            };
            attempts += 1;

            let mut directions = Direction::ALL;
            directions.shuffle(rng);

            for direction in directions {
                if layout.rooms.len() >= target {
                    break;
                }
                let Some(base) = layout.room(base_id).cloned() else {
                    break;
                };
                if base.has_connection_toward(direction) {
                    continue;
                }

                let (low, high) = self.config.spacing_jitter;
                let spacing = self.config.base_spacing + rng.gen_range(low..=high.max(low));
                let kind = self.pick_growth_kind(&base, spacing, rng);
                let mut room = self.roll_room(layout, kind, Some(direction), rng);
                let (x, y) = place_beside(
                    base.rect(),
                    room.width,
                    room.height,
                    direction,
                    spacing,
                    rng,
                );
                if layout.overlaps_any(x, y, room.width, room.height, self.config.room_gap) {
                    log::trace!("room {:?} blocked {} of room {}", kind, direction.label(), base_id.get());
                    continue;
                }

                room.x = x;
                room.y = y;
                room.depth = base.depth + 1;
                let id = layout.push_room(room);
                layout.link(base_id, id, direction);
                layout.carve_corridor(base_id, id, direction, self.config.corridor_width);
                queue.push_back(id);

                if layout.connection_count(base_id) >= self.config.max_connections {
                    break;
                }
            }

            if layout.connection_count(base_id) < self.config.max_connections {
                queue.push_back(base_id);
            }
        }

        if layout.rooms.len() < target {
            log::warn!(
                "growth stopped after {attempts} attempts with {} of {target} rooms",
                layout.rooms.len()
            );
        }
    }

    fn pick_growth_kind<R: Rng + ?Sized>(&self, base: &Room, spacing: i32, rng: &mut R) -> RoomKind {
        if base.connection_count() >= 2 && rng.gen_bool(self.config.crossroads_chance.clamp(0.0, 1.0)) {
            return RoomKind::Crossroads;
        }

        let mut preferred = Vec::new();
        let depth = base.depth + 1;
        if depth <= 2 {
            preferred.extend([RoomKind::Normal, RoomKind::Square]);
        } else if depth >= 4 {
            preferred.extend([RoomKind::Hall, RoomKind::ObstacleCourse]);
        }
        if spacing > self.config.corridor_room_spacing {
            preferred.push(RoomKind::CorridorRoom);
        }

        self.catalog
            .growth_table(&preferred)
            .pick(rng)
            .copied()
            .unwrap_or(RoomKind::Normal)
    }

    /// Joins every room the connection graph cannot reach from the start room
    /// to the closest reached room, by origin Manhattan distance.
    fn ensure_connected(&self, layout: &mut Layout, start: RoomId) {
        let mut reached = BTreeSet::new();
        flood_connections(layout, start, &mut reached);

        loop {
            let closest = layout
                .rooms
                .iter()
                .filter(|room| !reached.contains(&room.id))
                .flat_map(|room| {
                    reached
                        .iter()
                        .filter_map(|id| layout.room(*id))
                        .map(move |anchor| (room.origin_distance(anchor), anchor.id, room.id))
                })
                .min_by_key(|(distance, _, _)| *distance);

            let Some((_, anchor, orphan)) = closest else {
                break;
            };
            let (Some(anchor_room), Some(orphan_room)) = (layout.room(anchor), layout.room(orphan))
            else {
                break;
            };
            let direction = separation_direction(anchor_room, orphan_room);
            log::debug!("joining orphan room {} to room {}", orphan.get(), anchor.get());
            layout.link(anchor, orphan, direction);
            layout.carve_corridor(anchor, orphan, direction, self.config.corridor_width);
            flood_connections(layout, orphan, &mut reached);
        }
    }

    fn assign_special_rooms<R: Rng + ?Sized>(&self, layout: &mut Layout, start: RoomId, rng: &mut R) {
        let mut edge_rooms: Vec<&Room> = layout
            .rooms
            .iter()
            .filter(|room| {
                matches!(room.kind, RoomKind::Normal | RoomKind::Hall | RoomKind::Square)
                    && room.connection_count() <= 2
                    && room.depth >= self.config.edge_depth
            })
            .collect();
        edge_rooms.sort_by_key(|room| room.connection_count());
        let edge_ids: Vec<RoomId> = edge_rooms.iter().map(|room| room.id).collect();

        let treasure_candidates: Vec<RoomId> = edge_ids
            .iter()
            .copied()
            .filter(|id| layout.connection_count(*id) == 1)
            .collect();
        let treasure = treasure_candidates.choose(rng).copied();
        if let Some(room) = treasure.and_then(|id| layout.rooms.get_mut(id.index())) {
            room.kind = RoomKind::Treasure;
            room.connections.truncate(1);
            log::debug!("room {} is the treasure room", room.id.get());
        }

        let Some(start_room) = layout.room(start).cloned() else {
            return;
        };
        let mut boss: Option<(u32, RoomId)> = None;
        for id in edge_ids.iter().copied().filter(|id| Some(*id) != treasure) {
            let Some(room) = layout.room(id) else {
                continue;
            };
            let distance = room.origin_distance(&start_room);
            if boss.map_or(true, |(best, _)| distance > best) {
                boss = Some((distance, id));
            }
        }
        if let Some(room) = boss.and_then(|(_, id)| layout.rooms.get_mut(id.index())) {
            room.kind = RoomKind::Boss;
            room.connections.truncate(2);
            log::debug!("room {} is the boss room", room.id.get());
        }
    }

    fn attach_secret_rooms<R: Rng + ?Sized>(&self, layout: &mut Layout, rng: &mut R) {
        let hubs: Vec<RoomId> = layout
            .rooms
            .iter()
            .filter(|room| {
                room.connection_count() >= 3
                    && !matches!(room.kind, RoomKind::Boss | RoomKind::Treasure)
            })
            .map(|room| room.id)
            .collect();

        let (low, high) = self.config.secret_rooms;
        let count = rng.gen_range(low..=high.max(low));
        for _ in 0..count {
            let Some(hub) = hubs.choose(rng).and_then(|id| layout.room(*id)).cloned() else {
                break;
            };
            let free: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|direction| !hub.has_connection_toward(*direction))
                .collect();
            let Some(direction) = free.choose(rng).copied() else {
                continue;
            };

            let (shortest, longest) = self.config.secret_corridor;
            let length = rng.gen_range(shortest..=longest.max(shortest));
            let mut room = self.roll_room(layout, RoomKind::Secret, Some(direction), rng);
            let (x, y) = place_beside(hub.rect(), room.width, room.height, direction, length, rng);
            if layout.overlaps_any(x, y, room.width, room.height, self.config.secret_gap) {
                log::debug!("secret room off room {} does not fit", hub.id.get());
                continue;
            }

            room.x = x;
            room.y = y;
            room.depth = hub.depth + 1;
            room.is_secret = true;
            let id = layout.push_room(room);
            layout.carve_corridor(hub.id, id, direction, self.config.corridor_width);
            layout.link(hub.id, id, direction);
        }
    }
}

/// Position of a `width`×`height` room placed `distance` cells beyond the
/// base rectangle in `direction`, jittered by up to a third of the base side.
fn place_beside<R: Rng + ?Sized>(
    base: CellRect,
    width: u32,
    height: u32,
    direction: Direction,
    distance: i32,
    rng: &mut R,
) -> (i32, i32) {
    let (bx, by) = (base.origin().x(), base.origin().y());
    let (bw, bh) = (base.width() as i32, base.height() as i32);
    let mut jitter = |side: i32| {
        let third = side / 3;
        rng.gen_range(-third..=third)
    };
    match direction {
        Direction::Right => (bx + bw + distance, by + jitter(bh)),
        Direction::Left => (bx - width as i32 - distance, by + jitter(bh)),
        Direction::Down => (bx + jitter(bw), by + bh + distance),
        Direction::Up => (bx + jitter(bw), by - height as i32 - distance),
    }
}

/// Direction from `anchor` toward `other` along an axis on which the two
/// rectangles do not overlap. When both axes separate them, the axis with the
/// larger origin offset wins.
fn separation_direction(anchor: &Room, other: &Room) -> Direction {
    let (a, b) = (anchor.rect(), other.rect());
    let horizontal = if b.origin().x() >= a.origin().x() + a.width() as i32 {
        Some(Direction::Right)
    } else if b.origin().x() + b.width() as i32 <= a.origin().x() {
        Some(Direction::Left)
    } else {
        None
    };
    let vertical = if b.origin().y() >= a.origin().y() + a.height() as i32 {
        Some(Direction::Down)
    } else if b.origin().y() + b.height() as i32 <= a.origin().y() {
        Some(Direction::Up)
    } else {
        None
    };

    let dx = anchor.x.abs_diff(other.x);
    let dy = anchor.y.abs_diff(other.y);
    match (horizontal, vertical) {
        (Some(h), Some(v)) => {
            if dx > dy {
                h
            } else {
                v
            }
        }
        (Some(h), None) => h,
        (None, Some(v)) => v,
        (None, None) => {
            if dx > dy {
                if other.x > anchor.x {
                    Direction::Right
                } else {
                    Direction::Left
                }
            } else if other.y > anchor.y {
                Direction::Down
            } else {
                Direction::Up
            }
        }
    }
}

fn flood_connections(layout: &Layout, seed: RoomId, reached: &mut BTreeSet<RoomId>) {
    let mut queue = VecDeque::from([seed]);
    let _ = reached.insert(seed);
    while let Some(id) = queue.pop_front() {
        let Some(room) = layout.room(id) else {
            continue;
        };
        for connection in &room.connections {
            if reached.insert(connection.room) {
                queue.push_back(connection.room);
            }
        }
    }
}

/// Flags the room that receives the level exit: the boss room, or failing
/// that the deepest ordinary room, ties broken by distance from the start.
fn mark_terminal_room(layout: &mut Layout, start: RoomId) {
    let Some(start_room) = layout.room(start).cloned() else {
        return;
    };
    let boss = layout
        .rooms
        .iter()
        .find(|room| room.kind == RoomKind::Boss)
        .map(|room| room.id);
    let terminal = boss.or_else(|| {
        layout
            .rooms
            .iter()
            .filter(|room| room.id != start && !room.is_secret)
            .max_by_key(|room| (room.depth, room.origin_distance(&start_room)))
            .map(|room| room.id)
    });
    if let Some(room) = terminal.and_then(|id| layout.rooms.get_mut(id.index())) {
        room.has_exit = true;
    }
}
