#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state management for Dungeon Snake.

pub mod entities;
pub mod reachability;
pub mod state;
pub mod tiles;

use dungeon_snake_core::{
    CellCoord, EntityId, EntityRef, LevelQuery, Room, RoomId, Tile, WELCOME_BANNER,
};

use crate::entities::EntityRegistry;
use crate::reachability::ReachabilityField;
use crate::state::GameState;
use crate::tiles::{Bounds, TileGrid, TileMetaMap};

/// Void margin added around the tile extent when reporting map bounds.
pub const BOUNDS_PADDING: i32 = 6;

/// Output of dungeon generation.
#[derive(Clone, Debug)]
pub struct Dungeon {
    rooms: Vec<Room>,
    start: RoomId,
    bounds: Bounds,
    tiles: TileGrid,
    meta: TileMetaMap,
}

impl Dungeon {
    /// Wraps generated rooms and tiles, deriving padded bounds from the tiles.
    #[must_use]
    pub fn new(rooms: Vec<Room>, start: RoomId, tiles: TileGrid, meta: TileMetaMap) -> Self {
        let bounds = tiles
            .extent()
            .unwrap_or(Bounds {
                min_x: 0,
                min_y: 0,
                max_x: 0,
                max_y: 0,
            })
            .padded(BOUNDS_PADDING);
        Self {
            rooms,
            start,
            bounds,
            tiles,
            meta,
        }
    }

    /// Every room, indexed by [`RoomId::index`].
    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Room by identifier.
    #[must_use]
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.index())
    }

    /// Identifier of the start room.
    #[must_use]
    pub const fn start(&self) -> RoomId {
        self.start
    }

    /// The start room.
    #[must_use]
    pub fn start_room(&self) -> Option<&Room> {
        self.room(self.start)
    }

    /// Room that receives the level exit.
    #[must_use]
    pub fn terminal_room(&self) -> Option<&Room> {
        self.rooms.iter().find(|room| room.has_exit)
    }

    /// Room whose rectangle contains the cell.
    #[must_use]
    pub fn room_containing(&self, cell: CellCoord) -> Option<&Room> {
        self.rooms.iter().find(|room| room.rect().contains(cell))
    }

    /// Padded bounds of the map.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Sparse tile map.
    #[must_use]
    pub fn tiles(&self) -> &TileGrid {
        &self.tiles
    }

    /// Decoration metadata.
    #[must_use]
    pub fn meta(&self) -> &TileMetaMap {
        &self.meta
    }

    /// Rooms whose interior cannot be reached on foot from the start room.
    #[must_use]
    pub fn unreachable_rooms(&self) -> Vec<RoomId> {
        let Some(start) = self.start_room() else {
            return self.rooms.iter().map(|room| room.id).collect();
        };
        let field = ReachabilityField::flood(&self.tiles, start.center());
        self.rooms
            .iter()
            .filter(|room| {
                let rect = room.rect();
                let reached = (rect.origin().y()..rect.origin().y() + rect.height() as i32)
                    .flat_map(|y| {
                        (rect.origin().x()..rect.origin().x() + rect.width() as i32)
                            .map(move |x| CellCoord::new(x, y))
                    })
                    .any(|cell| self.tiles.get(cell) == Some(Tile::Floor) && field.contains(cell));
                !reached
            })
            .map(|room| room.id)
            .collect()
    }
}

/// Represents the authoritative state of one dungeon level.
#[derive(Clone, Debug)]
pub struct World {
    banner: &'static str,
    dungeon: Dungeon,
    entities: EntityRegistry,
    state: GameState,
}

impl World {
    /// Assembles a level from its generated parts.
    #[must_use]
    pub fn new(dungeon: Dungeon, entities: EntityRegistry, state: GameState) -> Self {
        Self {
            banner: WELCOME_BANNER,
            dungeon,
            entities,
            state,
        }
    }

    /// Mutable access to the entity registry.
    pub fn entities_mut(&mut self) -> &mut EntityRegistry {
        &mut self.entities
    }

    /// Mutable access to the game state.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Splits the world into its registry and state for simultaneous updates.
    pub fn parts_mut(&mut self) -> (&Dungeon, &mut EntityRegistry, &mut GameState) {
        (&self.dungeon, &mut self.entities, &mut self.state)
    }
}

impl LevelQuery for World {
    fn is_wall_at(&self, cell: CellCoord) -> bool {
        self.dungeon.tiles.is_blocked(cell)
    }

    fn entity_at(&self, cell: CellCoord) -> Option<EntityRef> {
        self.entities.entity_at(cell)
    }

    fn enemy_at(&self, cell: CellCoord, exclude: Option<EntityId>) -> Option<EntityId> {
        self.entities.enemy_at(cell, exclude)
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Dungeon, World};
    use crate::entities::EntityRegistry;
    use crate::state::GameState;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the generated dungeon.
    #[must_use]
    pub fn dungeon(world: &World) -> &Dungeon {
        &world.dungeon
    }

    /// Provides read-only access to the entity registry.
    #[must_use]
    pub fn entities(world: &World) -> &EntityRegistry {
        &world.entities
    }

    /// Provides read-only access to the game state.
    #[must_use]
    pub fn state(world: &World) -> &GameState {
        &world.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{PlayerBase, RunCarryover};
    use dungeon_snake_core::{ItemKind, RoomKind};

    fn walled_room(tiles: &mut TileGrid, room: &Room) {
        let rect = room.rect();
        for dy in 0..rect.height() as i32 {
            for dx in 0..rect.width() as i32 {
                let cell = rect.origin().offset(dx, dy);
                let tile = if rect.interior_contains(cell) {
                    Tile::Floor
                } else {
                    Tile::Wall
                };
                tiles.set(cell, tile);
            }
        }
    }

    fn two_room_dungeon(joined: bool) -> Dungeon {
        let start = Room::new(RoomId::new(0), RoomKind::Start, 0, 0, 5, 5);
        let other = Room::new(RoomId::new(1), RoomKind::Normal, 6, 0, 5, 5);
        let mut tiles = TileGrid::new();
        walled_room(&mut tiles, &start);
        walled_room(&mut tiles, &other);
        if joined {
            tiles.set(CellCoord::new(4, 2), Tile::Door);
            tiles.set(CellCoord::new(5, 2), Tile::Corridor);
            tiles.set(CellCoord::new(6, 2), Tile::Door);
        }
        Dungeon::new(vec![start, other], RoomId::new(0), tiles, TileMetaMap::new())
    }

    #[test]
    fn bounds_include_padding() {
        let dungeon = two_room_dungeon(true);
        let bounds = dungeon.bounds();
        assert_eq!(bounds.min_x, -BOUNDS_PADDING);
        assert_eq!(bounds.max_x, 10 + BOUNDS_PADDING);
        assert_eq!(bounds.width(), 11 + 2 * BOUNDS_PADDING as u32);
    }

    #[test]
    fn unreachable_rooms_reports_sealed_rooms() {
        assert!(two_room_dungeon(true).unreachable_rooms().is_empty());
        assert_eq!(
            two_room_dungeon(false).unreachable_rooms(),
            vec![RoomId::new(1)]
        );
    }

    #[test]
    fn world_answers_level_queries() {
        let dungeon = two_room_dungeon(true);
        let mut entities = EntityRegistry::new();
        let apple = entities.spawn_item(ItemKind::Apple, CellCoord::new(2, 2), 1);
        let state = GameState::from_carryover(&RunCarryover::default(), &PlayerBase::default());
        let world = World::new(dungeon, entities, state);

        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert!(world.is_wall_at(CellCoord::new(0, 0)));
        assert!(world.is_wall_at(CellCoord::new(-20, 0)));
        assert!(!world.is_wall_at(CellCoord::new(5, 2)));
        assert_eq!(
            world.entity_at(CellCoord::new(2, 2)).map(|entity| entity.id()),
            apple
        );
        assert_eq!(world.enemy_at(CellCoord::new(2, 2), None), None);
    }
}
