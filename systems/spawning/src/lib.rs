#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Populates generated rooms with items, enemies, the boss and the exit.

use std::collections::BTreeMap;

use dungeon_snake_core::{
    CellCoord, EnemyKind, EntityId, ItemCategory, ItemKind, Room, RoomKind, Tile, WeightedTable,
};
use dungeon_snake_world::{entities::EntityRegistry, tiles::TileGrid, Dungeon};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

const BOSS_SEARCH_RADIUS: i32 = 3;

/// Spawnable entity families, each rolled independently per room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnCategory {
    /// Edible items.
    Food,
    /// Coins.
    Coin,
    /// Flasks.
    Potion,
    /// Regular enemies.
    Enemy,
    /// Exit keys.
    Key,
}

impl SpawnCategory {
    /// Every category in roll order.
    pub const ALL: [SpawnCategory; 5] = [
        SpawnCategory::Food,
        SpawnCategory::Coin,
        SpawnCategory::Potion,
        SpawnCategory::Enemy,
        SpawnCategory::Key,
    ];
}

/// Inclusive count range plus a bonus applied to large rooms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRule {
    /// Fewest entities spawned.
    pub min: u32,
    /// Most entities spawned before the bonus.
    pub max: u32,
    /// Extra entities spawned in large rooms.
    pub large_bonus: u32,
}

impl CountRule {
    const fn new(min: u32, max: u32, large_bonus: u32) -> Self {
        Self {
            min,
            max,
            large_bonus,
        }
    }
}

/// Per-category values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerCategory<T> {
    /// Value for food.
    pub food: T,
    /// Value for coins.
    pub coin: T,
    /// Value for potions.
    pub potion: T,
    /// Value for enemies.
    pub enemy: T,
    /// Value for keys.
    pub key: T,
}

impl<T: Copy> PerCategory<T> {
    /// Value for the category.
    #[must_use]
    pub fn get(&self, category: SpawnCategory) -> T {
        match category {
            SpawnCategory::Food => self.food,
            SpawnCategory::Coin => self.coin,
            SpawnCategory::Potion => self.potion,
            SpawnCategory::Enemy => self.enemy,
            SpawnCategory::Key => self.key,
        }
    }
}

/// Tunables for room population.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Probability that a room receives each category.
    pub rates: PerCategory<f64>,
    /// How many entities a successful roll spawns.
    pub counts: PerCategory<CountRule>,
    /// Area above which a room earns the large-room bonus.
    pub large_room_area: u32,
    /// Whether keys may spawn at all.
    pub keys_enabled: bool,
    /// Inclusive range of coins carried by a coin pile.
    pub coin_value: (u32, u32),
    /// Weight overrides keyed by item or enemy name.
    pub weights: BTreeMap<String, u32>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            rates: PerCategory {
                food: 0.7,
                coin: 0.5,
                potion: 0.3,
                enemy: 0.6,
                key: 0.1,
            },
            counts: PerCategory {
                food: CountRule::new(1, 3, 1),
                coin: CountRule::new(1, 3, 1),
                potion: CountRule::new(1, 1, 1),
                enemy: CountRule::new(1, 2, 1),
                key: CountRule::new(1, 1, 0),
            },
            large_room_area: 100,
            keys_enabled: true,
            coin_value: (1, 3),
            weights: BTreeMap::new(),
        }
    }
}

/// Default spawn weight of an item within its category.
#[must_use]
pub const fn default_item_weight(kind: ItemKind) -> u32 {
    match kind {
        ItemKind::Apple => 40,
        ItemKind::Meat => 25,
        ItemKind::Garlic | ItemKind::Jalapeno => 12,
        ItemKind::Espresso => 11,
        ItemKind::SmallRedFlask | ItemKind::SmallBlueFlask => 35,
        ItemKind::BigRedFlask | ItemKind::BigBlueFlask => 15,
        ItemKind::Coin | ItemKind::Key => 1,
    }
}

/// Summary of what a spawn pass placed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpawnReport {
    /// Items placed.
    pub items: Vec<EntityId>,
    /// Regular enemies placed.
    pub enemies: Vec<EntityId>,
    /// The boss, when one was placed.
    pub boss: Option<EntityId>,
    /// The exit, when one was placed.
    pub exit: Option<EntityId>,
    /// Placements skipped because the cell was taken or invalid.
    pub skipped: usize,
}

/// Populates every room of a dungeon.
#[derive(Clone, Debug)]
pub struct EntitySpawner {
    config: SpawnConfig,
    food: WeightedTable<ItemKind>,
    potions: WeightedTable<ItemKind>,
    keys: WeightedTable<ItemKind>,
    enemies: WeightedTable<EnemyKind>,
}

impl Default for EntitySpawner {
    fn default() -> Self {
        Self::new(SpawnConfig::default())
    }
}

impl EntitySpawner {
    /// Builds the weight tables, applying any overrides by name.
    #[must_use]
    pub fn new(config: SpawnConfig) -> Self {
        for name in config.weights.keys() {
            let known = name.parse::<ItemKind>().is_ok() || name.parse::<EnemyKind>().is_ok();
            if !known {
                log::warn!("ignoring spawn weight for unknown entity `{name}`");
            }
        }

        let weight_of = |name: &str, default: u32| config.weights.get(name).copied().unwrap_or(default);
        let items = |category: ItemCategory| -> WeightedTable<ItemKind> {
            ItemKind::of_category(category)
                .map(|kind| (kind, weight_of(kind.name(), default_item_weight(kind))))
                .collect()
        };
        let food = items(ItemCategory::Food);
        let potions = items(ItemCategory::Potion);
        let keys = items(ItemCategory::Key);
        let enemies = EnemyKind::ALL
            .into_iter()
            .map(|kind| (kind, weight_of(kind.name(), kind.weight())))
            .collect();

        Self {
            config,
            food,
            potions,
            keys,
            enemies,
        }
    }

    /// Places every entity of the level into `registry`.
    ///
    /// The exit goes to the centre of the terminal room first, so a boss
    /// sharing that room settles on the nearest free ring around it. The exit
    /// starts locked whenever a boss was placed.
    pub fn spawn_all<R: Rng + ?Sized>(
        &self,
        dungeon: &Dungeon,
        registry: &mut EntityRegistry,
        rng: &mut R,
    ) -> SpawnReport {
        let mut report = SpawnReport::default();

        if let Some(room) = dungeon.terminal_room() {
            report.exit = registry.spawn_exit(room.center(), true);
            if report.exit.is_none() {
                log::warn!("exit cell of room {} is taken", room.id.get());
            }
        }

        for room in dungeon.rooms() {
            match room.kind {
                RoomKind::Start => continue,
                RoomKind::Boss => report.boss = self.spawn_boss(room, dungeon.tiles(), registry, rng),
                _ => self.populate_room(room, dungeon.tiles(), registry, rng, &mut report),
            }
        }

        if report.boss.is_none() {
            let _ = registry.unlock_exit();
        }

        log::info!(
            "spawned {} items, {} enemies, boss: {}, exit: {}, skipped {}",
            report.items.len(),
            report.enemies.len(),
            report.boss.is_some(),
            report.exit.is_some(),
            report.skipped
        );
        report
    }

    fn populate_room<R: Rng + ?Sized>(
        &self,
        room: &Room,
        tiles: &TileGrid,
        registry: &mut EntityRegistry,
        rng: &mut R,
        report: &mut SpawnReport,
    ) {
        let positions = floor_positions(room, tiles);
        if positions.is_empty() {
            return;
        }

        for category in SpawnCategory::ALL {
            if category == SpawnCategory::Enemy && room.kind == RoomKind::Treasure {
                continue;
            }
            if category == SpawnCategory::Key && !self.config.keys_enabled {
                continue;
            }
            let rate = self.config.rates.get(category).clamp(0.0, 1.0);
            if !rng.gen_bool(rate) {
                continue;
            }

            let count = self.spawn_count(room, category, rng);
            let chosen: Vec<CellCoord> = positions
                .choose_multiple(rng, count)
                .copied()
                .collect();
            for cell in chosen {
                if registry.is_occupied(cell) || !is_valid_spawn(tiles, cell) {
                    log::debug!("skipping {category:?} at {cell:?}");
                    report.skipped += 1;
                    continue;
                }
                match self.spawn_entity(category, cell, room, registry, rng) {
                    Some(id) if category == SpawnCategory::Enemy => report.enemies.push(id),
                    Some(id) => report.items.push(id),
                    None => report.skipped += 1,
                }
            }
        }
    }

    fn spawn_count<R: Rng + ?Sized>(&self, room: &Room, category: SpawnCategory, rng: &mut R) -> usize {
        let rule = self.config.counts.get(category);
        let mut count = rng.gen_range(rule.min..=rule.max.max(rule.min));
        if room.rect().area() > self.config.large_room_area {
            count += rule.large_bonus;
        }
        count as usize
    }

    /// Creates one entity of the category. Returns `None` when the weight
    /// table for the category is empty, which means nothing spawned.
    fn spawn_entity<R: Rng + ?Sized>(
        &self,
        category: SpawnCategory,
        cell: CellCoord,
        room: &Room,
        registry: &mut EntityRegistry,
        rng: &mut R,
    ) -> Option<EntityId> {
        let pick_item = |table: &WeightedTable<ItemKind>, rng: &mut R| {
            let picked = table.pick(rng).copied();
            if picked.is_none() {
                log::warn!("no {category:?} has a positive spawn weight");
            }
            picked
        };

        match category {
            SpawnCategory::Food => {
                let kind = pick_item(&self.food, rng)?;
                registry.spawn_item(kind, cell, 1)
            }
            SpawnCategory::Potion => {
                let kind = pick_item(&self.potions, rng)?;
                registry.spawn_item(kind, cell, 1)
            }
            SpawnCategory::Key => {
                let kind = pick_item(&self.keys, rng)?;
                registry.spawn_item(kind, cell, 1)
            }
            SpawnCategory::Coin => {
                let (low, high) = self.config.coin_value;
                let value = rng.gen_range(low..=high.max(low));
                registry.spawn_item(ItemKind::Coin, cell, value)
            }
            SpawnCategory::Enemy => {
                let Some(kind) = self.enemies.pick(rng).copied() else {
                    log::warn!("no enemy has a positive spawn weight");
                    return None;
                };
                registry.spawn_enemy(kind, cell, Some(room.rect()), false)
            }
        }
    }

    fn spawn_boss<R: Rng + ?Sized>(
        &self,
        room: &Room,
        tiles: &TileGrid,
        registry: &mut EntityRegistry,
        rng: &mut R,
    ) -> Option<EntityId> {
        let Some(kind) = self.enemies.pick(rng).copied() else {
            log::warn!("no enemy has a positive spawn weight, boss room stays empty");
            return None;
        };
        let Some(cell) = boss_position(room, tiles, registry) else {
            log::warn!("boss room {} has no free floor", room.id.get());
            return None;
        };
        let id = registry.spawn_enemy(kind, cell, Some(room.rect()), true)?;
        log::info!("boss {kind} guards room {} at {cell:?}", room.id.get());
        Some(id)
    }
}

/// Whether the cell is plain floor with no door in its 8-neighbourhood.
#[must_use]
pub fn is_valid_spawn(tiles: &TileGrid, cell: CellCoord) -> bool {
    if tiles.get(cell) != Some(Tile::Floor) {
        return false;
    }
    (-1..=1).all(|dy| (-1..=1).all(|dx| tiles.get(cell.offset(dx, dy)) != Some(Tile::Door)))
}

/// Valid spawn cells inside the room's walls, column by column.
#[must_use]
pub fn floor_positions(room: &Room, tiles: &TileGrid) -> Vec<CellCoord> {
    let rect = room.rect();
    let mut positions = Vec::new();
    for dx in 1..rect.width() as i32 - 1 {
        for dy in 1..rect.height() as i32 - 1 {
            let cell = rect.origin().offset(dx, dy);
            if is_valid_spawn(tiles, cell) {
                positions.push(cell);
            }
        }
    }
    positions
}

/// Centre of the room when free, otherwise the first free cell on square
/// rings of growing radius, otherwise the first free floor cell.
fn boss_position(room: &Room, tiles: &TileGrid, registry: &EntityRegistry) -> Option<CellCoord> {
    let rect = room.rect();
    let accept = |cell: CellCoord| rect.interior_contains(cell) && is_valid_spawn(tiles, cell);
    registry
        .nearest_free(rect.center(), BOSS_SEARCH_RADIUS, accept)
        .or_else(|| {
            floor_positions(room, tiles)
                .into_iter()
                .find(|cell| !registry.is_occupied(*cell))
        })
}
