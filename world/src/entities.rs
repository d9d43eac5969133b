//! Authoritative registry of items, enemies and exits placed on the map.

use std::collections::{BTreeMap, HashMap};

use dungeon_snake_core::{CellCoord, CellRect, Enemy, EnemyKind, EntityId, EntityRef, ItemKind};

/// A collectible lying on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedItem {
    /// Identifier allocated by the registry.
    pub id: EntityId,
    /// Kind of item.
    pub kind: ItemKind,
    /// Cell the item occupies.
    pub cell: CellCoord,
    /// Quantity carried by the item, such as the number of coins.
    pub value: u32,
}

/// The level exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExitState {
    /// Identifier allocated by the registry.
    pub id: EntityId,
    /// Cell the exit occupies.
    pub cell: CellCoord,
    /// Whether the exit still refuses the snake.
    pub locked: bool,
}

#[derive(Clone, Debug)]
enum Entry {
    Item(PlacedItem),
    Enemy(Enemy),
    Exit(ExitState),
}

/// Stores entities and manages identifier allocation.
///
/// Items and exits never move, so they share one cell index. Enemies move
/// every turn and keep a separate index, which lets an enemy briefly stand on
/// top of an item without either of them being lost.
#[derive(Clone, Debug)]
pub struct EntityRegistry {
    entries: BTreeMap<EntityId, Entry>,
    fixtures_by_cell: HashMap<u64, EntityId>,
    enemies_by_cell: HashMap<u64, EntityId>,
    next_id: u32,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    /// Creates an empty registry with a reset identifier counter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            fixtures_by_cell: HashMap::new(),
            enemies_by_cell: HashMap::new(),
            next_id: 0,
        }
    }

    fn allocate(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Whether any entity stands on the cell.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.fixtures_by_cell.contains_key(&cell.key())
            || self.enemies_by_cell.contains_key(&cell.key())
    }

    /// Closest unoccupied cell to `center` that `accept` allows.
    ///
    /// The centre is tried first, then square rings of growing radius up to
    /// `max_radius`, each ring scanned column by column.
    pub fn nearest_free<F>(&self, center: CellCoord, max_radius: i32, accept: F) -> Option<CellCoord>
    where
        F: Fn(CellCoord) -> bool,
    {
        let free = |cell: CellCoord| accept(cell) && !self.is_occupied(cell);
        if free(center) {
            return Some(center);
        }
        for radius in 1..=max_radius {
            for dx in -radius..=radius {
                for dy in -radius..=radius {
                    if dx.abs() != radius && dy.abs() != radius {
                        continue;
                    }
                    let cell = center.offset(dx, dy);
                    if free(cell) {
                        return Some(cell);
                    }
                }
            }
        }
        None
    }

    /// Places an item. Returns `None` when the cell is already taken.
    pub fn spawn_item(&mut self, kind: ItemKind, cell: CellCoord, value: u32) -> Option<EntityId> {
        if self.is_occupied(cell) {
            return None;
        }
        let id = self.allocate();
        let _ = self.fixtures_by_cell.insert(cell.key(), id);
        let _ = self.entries.insert(
            id,
            Entry::Item(PlacedItem {
                id,
                kind,
                cell,
                value,
            }),
        );
        Some(id)
    }

    /// Places an enemy, promoting it to boss when requested.
    pub fn spawn_enemy(
        &mut self,
        kind: EnemyKind,
        cell: CellCoord,
        home: Option<CellRect>,
        boss: bool,
    ) -> Option<EntityId> {
        if self.is_occupied(cell) {
            return None;
        }
        let id = self.allocate();
        let enemy = if boss {
            Enemy::boss(id, kind, cell, home)
        } else {
            Enemy::new(id, kind, cell, home)
        };
        let _ = self.enemies_by_cell.insert(cell.key(), id);
        let _ = self.entries.insert(id, Entry::Enemy(enemy));
        Some(id)
    }

    /// Places the level exit.
    pub fn spawn_exit(&mut self, cell: CellCoord, locked: bool) -> Option<EntityId> {
        if self.is_occupied(cell) {
            return None;
        }
        let id = self.allocate();
        let _ = self.fixtures_by_cell.insert(cell.key(), id);
        let _ = self
            .entries
            .insert(id, Entry::Exit(ExitState { id, cell, locked }));
        Some(id)
    }

    /// Entity standing on the cell. Enemies shadow items beneath them.
    #[must_use]
    pub fn entity_at(&self, cell: CellCoord) -> Option<EntityRef> {
        let id = self
            .enemies_by_cell
            .get(&cell.key())
            .or_else(|| self.fixtures_by_cell.get(&cell.key()))?;
        match self.entries.get(id)? {
            Entry::Item(item) => Some(EntityRef::Item {
                id: item.id,
                kind: item.kind,
            }),
            Entry::Enemy(enemy) => Some(EntityRef::Enemy { id: enemy.id }),
            Entry::Exit(exit) => Some(EntityRef::Exit {
                id: exit.id,
                open: !exit.locked,
            }),
        }
    }

    /// Living enemy standing on the cell, unless it is `exclude`.
    #[must_use]
    pub fn enemy_at(&self, cell: CellCoord, exclude: Option<EntityId>) -> Option<EntityId> {
        let id = self.enemies_by_cell.get(&cell.key()).copied()?;
        (Some(id) != exclude).then_some(id)
    }

    /// Item record by identifier.
    #[must_use]
    pub fn item(&self, id: EntityId) -> Option<&PlacedItem> {
        match self.entries.get(&id)? {
            Entry::Item(item) => Some(item),
            _ => None,
        }
    }

    /// Enemy record by identifier.
    #[must_use]
    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        match self.entries.get(&id)? {
            Entry::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    /// Replaces an enemy record, moving its cell index when it changed position.
    pub fn store_enemy(&mut self, enemy: &Enemy) {
        let Some(Entry::Enemy(stored)) = self.entries.get_mut(&enemy.id) else {
            return;
        };
        if stored.cell != enemy.cell {
            let _ = self.enemies_by_cell.remove(&stored.cell.key());
            let _ = self.enemies_by_cell.insert(enemy.cell.key(), enemy.id);
        }
        *stored = enemy.clone();
    }

    /// Identifiers of every enemy in spawn order.
    #[must_use]
    pub fn enemy_ids(&self) -> Vec<EntityId> {
        self.entries
            .iter()
            .filter_map(|(id, entry)| matches!(entry, Entry::Enemy(_)).then_some(*id))
            .collect()
    }

    /// Every enemy in spawn order.
    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.entries.values().filter_map(|entry| match entry {
            Entry::Enemy(enemy) => Some(enemy),
            _ => None,
        })
    }

    /// Every item in spawn order.
    pub fn items(&self) -> impl Iterator<Item = &PlacedItem> {
        self.entries.values().filter_map(|entry| match entry {
            Entry::Item(item) => Some(item),
            _ => None,
        })
    }

    /// The level exit, if one was placed.
    #[must_use]
    pub fn exit(&self) -> Option<&ExitState> {
        self.entries.values().find_map(|entry| match entry {
            Entry::Exit(exit) => Some(exit),
            _ => None,
        })
    }

    /// Unlocks the exit. Returns its identifier when it was locked before.
    pub fn unlock_exit(&mut self) -> Option<EntityId> {
        self.entries.values_mut().find_map(|entry| match entry {
            Entry::Exit(exit) if exit.locked => {
                exit.locked = false;
                Some(exit.id)
            }
            _ => None,
        })
    }

    /// Whether a living boss remains.
    #[must_use]
    pub fn boss_alive(&self) -> bool {
        self.enemies().any(|enemy| enemy.is_boss && enemy.is_alive())
    }

    /// Removes an item, returning its record.
    pub fn remove_item(&mut self, id: EntityId) -> Option<PlacedItem> {
        let item = *self.item(id)?;
        let _ = self.entries.remove(&id);
        let _ = self.fixtures_by_cell.remove(&item.cell.key());
        Some(item)
    }

    /// Removes an enemy, returning its record.
    pub fn remove_enemy(&mut self, id: EntityId) -> Option<Enemy> {
        let cell = self.enemy(id)?.cell;
        let Some(Entry::Enemy(enemy)) = self.entries.remove(&id) else {
            return None;
        };
        let _ = self.enemies_by_cell.remove(&cell.key());
        Some(enemy)
    }

    /// Number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
