#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dungeon Snake engine.
//!
//! This crate defines the vocabulary that connects the dungeon generator, the
//! authoritative world, the pure turn systems, and presentation adapters.
//! Systems address everything by [`CellCoord`], query the level through the
//! [`LevelQuery`] and [`PlayerView`] traits, and report back to the owning
//! scene exclusively through [`TurnHelpers`] callbacks. State changes that a
//! presentation layer cares about are broadcast as [`Event`] values.

pub mod catalog;
pub mod weighted;

use serde::{Deserialize, Serialize};

pub use catalog::{
    ActiveEffect, BossTransform, EffectKind, EffectSpec, Enemy, EnemyBehavior, EnemyKind,
    EnemyStats, ItemCategory, ItemKind, ItemProperties, LookupError, SprintBand, StatRule,
};
pub use weighted::WeightedTable;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Dungeon Snake.";

/// Minimum number of segments the snake may ever be reduced to.
pub const MIN_SNAKE_LENGTH: usize = 3;

/// Location of a single grid cell. The dungeon grows in every direction from
/// the origin, so both axes are signed.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    x: i32,
    y: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the cell displaced by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Returns the orthogonal neighbour in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Packs the coordinate into a single integer suitable for hashing.
    #[must_use]
    pub const fn key(self) -> u64 {
        ((self.x as u32 as u64) << 32) | (self.y as u32 as u64)
    }

    /// Restores a coordinate previously packed with [`CellCoord::key`].
    #[must_use]
    pub const fn from_key(key: u64) -> Self {
        Self::new((key >> 32) as u32 as i32, key as u32 as i32)
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    width: u32,
    height: u32,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and its dimensions.
    #[must_use]
    pub const fn new(origin: CellCoord, width: u32, height: u32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Cell at the integer centre of the rectangle.
    #[must_use]
    pub const fn center(&self) -> CellCoord {
        self.origin
            .offset((self.width / 2) as i32, (self.height / 2) as i32)
    }

    /// Reports whether the cell lies inside the rectangle, border included.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let dx = i64::from(cell.x()) - i64::from(self.origin.x());
        let dy = i64::from(cell.y()) - i64::from(self.origin.y());
        dx >= 0 && dy >= 0 && dx < i64::from(self.width) && dy < i64::from(self.height)
    }

    /// Reports whether the cell lies strictly inside the one-cell border.
    #[must_use]
    pub fn interior_contains(&self, cell: CellCoord) -> bool {
        let dx = i64::from(cell.x()) - i64::from(self.origin.x());
        let dy = i64::from(cell.y()) - i64::from(self.origin.y());
        dx >= 1
            && dy >= 1
            && dx < i64::from(self.width) - 1
            && dy < i64::from(self.height) - 1
    }

    /// Area of the rectangle in cells.
    #[must_use]
    pub const fn area(&self) -> u32 {
        self.width * self.height
    }
}

/// Cardinal movement directions shared by the snake and enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Movement toward decreasing rows.
    Up,
    /// Movement toward increasing rows.
    Down,
    /// Movement toward decreasing columns.
    Left,
    /// Movement toward increasing columns.
    Right,
}

impl Direction {
    /// Every direction in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Down,
        Direction::Up,
    ];

    /// Unit displacement applied by a step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Axis the direction travels along.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Left | Self::Right => Axis::Horizontal,
            Self::Up | Self::Down => Axis::Vertical,
        }
    }

    /// Lower-case label used in logs and transfer formats.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Parses a single-letter direction code (`U`, `D`, `L`, `R`).
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'U' => Some(Self::Up),
            'D' => Some(Self::Down),
            'L' => Some(Self::Left),
            'R' => Some(Self::Right),
            _ => None,
        }
    }
}

/// Orientation of a corridor run or room elongation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Runs along the x axis.
    Horizontal,
    /// Runs along the y axis.
    Vertical,
}

/// Symbol stored for a revealed grid cell. Absent cells are void.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Impassable wall (`#`).
    Wall,
    /// Room floor (`.`).
    Floor,
    /// Opening in a room wall (`D`).
    Door,
    /// Corridor floor between rooms (`C`).
    Corridor,
}

impl Tile {
    /// Single-character symbol used by the sparse tile map.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Wall => '#',
            Self::Floor => '.',
            Self::Door => 'D',
            Self::Corridor => 'C',
        }
    }

    /// Parses a tile symbol.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '#' => Some(Self::Wall),
            '.' => Some(Self::Floor),
            'D' => Some(Self::Door),
            'C' => Some(Self::Corridor),
            _ => None,
        }
    }

    /// Reports whether actors can stand on the tile.
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Wall)
    }
}

/// Identifier of a room within a generated dungeon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(u32);

impl RoomId {
    /// Creates a new room identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index of the room inside the dungeon's room list.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Room archetypes recognised by the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    /// Room the snake starts in.
    Start,
    /// Ordinary mid-sized room.
    Normal,
    /// Large room.
    Hall,
    /// Fixed-size square room.
    Square,
    /// Long, thin room elongated along the growth axis.
    CorridorRoom,
    /// Fixed-size room intended for obstacle layouts.
    ObstacleCourse,
    /// Small junction room favoured once a room already branches.
    Crossroads,
    /// Leaf room guarded by the level boss.
    Boss,
    /// Leaf room holding rewards.
    Treasure,
    /// Hidden room hanging off a hub through a long corridor.
    Secret,
}

impl RoomKind {
    /// Every archetype in catalog order.
    pub const ALL: [RoomKind; 10] = [
        RoomKind::Start,
        RoomKind::Normal,
        RoomKind::Hall,
        RoomKind::Square,
        RoomKind::CorridorRoom,
        RoomKind::ObstacleCourse,
        RoomKind::Crossroads,
        RoomKind::Boss,
        RoomKind::Treasure,
        RoomKind::Secret,
    ];

    /// Catalog key of the archetype.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Normal => "normal",
            Self::Hall => "hall",
            Self::Square => "square",
            Self::CorridorRoom => "corridor_room",
            Self::ObstacleCourse => "obstacle_course",
            Self::Crossroads => "crossroads",
            Self::Boss => "boss",
            Self::Treasure => "treasure",
            Self::Secret => "secret",
        }
    }
}

impl std::str::FromStr for RoomKind {
    type Err = LookupError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == value)
            .ok_or_else(|| LookupError::UnknownRoom(value.to_owned()))
    }
}

/// Undirected edge between two rooms, stored on both endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// Room on the far side of the edge.
    pub room: RoomId,
    /// Direction from the owning room toward `room`.
    pub direction: Direction,
}

/// A placed room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Identifier, equal to the room's index in the dungeon.
    pub id: RoomId,
    /// Column of the room's upper-left wall cell.
    pub x: i32,
    /// Row of the room's upper-left wall cell.
    pub y: i32,
    /// Width including both side walls.
    pub width: u32,
    /// Height including top and bottom walls.
    pub height: u32,
    /// Archetype, possibly reassigned after growth.
    pub kind: RoomKind,
    /// Edges to neighbouring rooms.
    pub connections: Vec<Connection>,
    /// Breadth-first distance from the start room at creation time.
    pub depth: u32,
    /// Marks the start room.
    pub is_start: bool,
    /// Marks rooms attached as secrets.
    pub is_secret: bool,
    /// Marks the terminal room that receives the level exit.
    pub has_exit: bool,
}

impl Room {
    /// Creates an unconnected room.
    #[must_use]
    pub fn new(id: RoomId, kind: RoomKind, x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            id,
            x,
            y,
            width,
            height,
            kind,
            connections: Vec::new(),
            depth: 0,
            is_start: kind == RoomKind::Start,
            is_secret: false,
            has_exit: false,
        }
    }

    /// Rectangle covered by the room, walls included.
    #[must_use]
    pub const fn rect(&self) -> CellRect {
        CellRect::new(CellCoord::new(self.x, self.y), self.width, self.height)
    }

    /// Integer centre cell of the room.
    #[must_use]
    pub const fn center(&self) -> CellCoord {
        self.rect().center()
    }

    /// Manhattan distance between the upper-left corners of two rooms.
    #[must_use]
    pub fn origin_distance(&self, other: &Room) -> u32 {
        CellCoord::new(self.x, self.y).manhattan_distance(CellCoord::new(other.x, other.y))
    }

    /// Number of recorded connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Reports whether an edge already leaves the room in `direction`.
    #[must_use]
    pub fn has_connection_toward(&self, direction: Direction) -> bool {
        self.connections
            .iter()
            .any(|connection| connection.direction == direction)
    }
}

/// Unique identifier assigned to an item, enemy, or exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Lightweight description of whatever occupies a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityRef {
    /// A collectible item.
    Item {
        /// Identifier of the item.
        id: EntityId,
        /// Kind of item.
        kind: ItemKind,
    },
    /// A living enemy.
    Enemy {
        /// Identifier of the enemy.
        id: EntityId,
    },
    /// The level exit.
    Exit {
        /// Identifier of the exit.
        id: EntityId,
        /// Whether entering the exit completes the level.
        open: bool,
    },
}

impl EntityRef {
    /// Identifier of the referenced entity.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        match self {
            Self::Item { id, .. } | Self::Enemy { id } | Self::Exit { id, .. } => *id,
        }
    }

    /// Reports whether the entity is an enemy.
    #[must_use]
    pub const fn is_enemy(&self) -> bool {
        matches!(self, Self::Enemy { .. })
    }
}

/// Terminal reasons for a run ending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathReason {
    /// The head moved into a wall or the void.
    Wall,
    /// The head moved into the snake's own body.
    SelfCollision,
    /// Enemy attacks reduced health to zero.
    Slain,
}

impl DeathReason {
    /// Short label reported to presentation layers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Wall => "wall",
            Self::SelfCollision => "self",
            Self::Slain => "slain",
        }
    }
}

/// Notifications broadcast whenever observable game state changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The score changed.
    ScoreChanged {
        /// Points added.
        delta: u32,
        /// Score after the change.
        total: u32,
    },
    /// Player health changed.
    HealthChanged {
        /// Signed change in health.
        delta: i32,
        /// Health after the change.
        current: u32,
        /// Maximum health.
        maximum: u32,
    },
    /// The snake's length changed.
    LengthChanged {
        /// Signed change in segment count.
        delta: i32,
        /// Segment count after the change.
        length: usize,
    },
    /// The coin purse changed.
    CoinsChanged {
        /// Signed change in coins.
        delta: i32,
        /// Coins after the change.
        total: u32,
    },
    /// The active effects list changed.
    EffectsChanged {
        /// Snapshot of the effects after the change.
        effects: Vec<ActiveEffect>,
    },
    /// The inventory changed.
    InventoryChanged {
        /// Snapshot of the inventory after the change.
        items: Vec<ItemKind>,
    },
    /// The snake consumed an item lying on the map.
    ItemCollected {
        /// Identifier of the item.
        item: EntityId,
        /// Kind of the item.
        kind: ItemKind,
    },
    /// The player struck an enemy without killing it.
    EnemyDamaged {
        /// Identifier of the enemy.
        enemy: EntityId,
        /// Damage dealt.
        dealt: u32,
        /// Enemy health after the strike.
        remaining: u32,
    },
    /// An enemy was killed.
    EnemyDefeated {
        /// Identifier of the enemy.
        enemy: EntityId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Whether the enemy was the level boss.
        boss: bool,
    },
    /// An enemy struck the player.
    PlayerAttacked {
        /// Identifier of the attacker.
        enemy: EntityId,
        /// Damage dealt after shields.
        dealt: u32,
    },
    /// The run ended.
    PlayerDied {
        /// Cause of death.
        reason: DeathReason,
    },
    /// The level exit became passable.
    ExitUnlocked {
        /// Identifier of the exit.
        exit: EntityId,
    },
    /// The snake entered an open exit.
    LevelCompleted {
        /// Level that was completed.
        level: u32,
    },
}

/// Read-only queries that turn systems issue against the level.
pub trait LevelQuery {
    /// Reports whether the cell blocks movement. Void cells block.
    fn is_wall_at(&self, cell: CellCoord) -> bool;

    /// Returns whatever entity occupies the cell.
    fn entity_at(&self, cell: CellCoord) -> Option<EntityRef>;

    /// Returns the living enemy on the cell, ignoring `exclude`.
    fn enemy_at(&self, cell: CellCoord, exclude: Option<EntityId>) -> Option<EntityId>;
}

/// Read-only view of the player's body.
pub trait PlayerView {
    /// Cell occupied by the head.
    fn head(&self) -> CellCoord;

    /// Reports whether any body segment covers the cell.
    fn is_snake_at(&self, cell: CellCoord) -> bool;
}

/// Result of handing a non-enemy entity to the owning scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EatOutcome {
    /// Segments the snake should grow by.
    pub grow: u32,
}

/// Result of the end-of-turn effect tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TurnEnd {
    /// Segments expired effects ask the snake to release.
    pub shrink: u32,
}

/// Capabilities the owning scene injects into the turn systems.
///
/// The engine trusts every answer; implementations are responsible for
/// keeping their registries consistent with the mutations they are told
/// about.
pub trait TurnHelpers: LevelQuery {
    /// The head entered a cell holding a non-enemy entity.
    fn on_eat(&mut self, entity: EntityRef) -> EatOutcome;

    /// The head bumped into an enemy; the snake did not move.
    fn on_collide(&mut self, enemy: EntityId);

    /// An enemy attacks the player.
    fn on_enemy_attack(&mut self, enemy: EntityId);

    /// The snake ran into itself.
    fn on_self_collision(&mut self);

    /// The snake ran into a wall.
    fn on_wall_collision(&mut self);

    /// Whether the enemy phase should be skipped this turn. Also cuts a
    /// double move short, for instance once the level is completed.
    fn skip_enemy_turn(&self) -> bool;

    /// Whether a double-move effect is active.
    fn double_move(&self) -> bool;

    /// Identifiers of living enemies in resolution order.
    fn enemy_roster(&self) -> Vec<EntityId>;

    /// Copy of the enemy's current state.
    fn enemy(&self, id: EntityId) -> Option<Enemy>;

    /// Persists the enemy's updated position and counters.
    fn store_enemy(&mut self, enemy: &Enemy);

    /// Whether the player still has health left.
    fn player_alive(&self) -> bool;

    /// Runs the end-of-turn effect tick.
    fn end_turn(&mut self) -> TurnEnd;
}
