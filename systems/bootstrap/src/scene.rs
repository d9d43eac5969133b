//! The level as seen by the turn engine.

use dungeon_snake_core::{
    CellCoord, DeathReason, EatOutcome, EffectKind, Enemy, EntityId, EntityRef, Event,
    ItemCategory, ItemKind, LevelQuery, TurnEnd, TurnHelpers,
};
use dungeon_snake_system_combat::{apply_item, tick_effects, Combat};
use dungeon_snake_world::{query, World};
use rand_chacha::ChaCha8Rng;

/// Owns the world and routes engine callbacks into combat and item rules.
#[derive(Debug)]
pub(crate) struct Scene {
    world: World,
    combat: Combat,
    rng: ChaCha8Rng,
}

impl Scene {
    pub(crate) fn new(world: World, combat: Combat, rng: ChaCha8Rng) -> Self {
        Self { world, combat, rng }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn collect_item(&mut self, id: EntityId) -> EatOutcome {
        let Some(item) = self.world.entities_mut().remove_item(id) else {
            return EatOutcome::default();
        };
        let state = self.world.state_mut();
        state.notify(Event::ItemCollected {
            item: id,
            kind: item.kind,
        });

        match item.kind.category() {
            ItemCategory::Coin => {
                state.change_coins(i32::try_from(item.value).unwrap_or(i32::MAX));
                EatOutcome::default()
            }
            ItemCategory::Key => {
                state.add_to_inventory(ItemKind::Key);
                EatOutcome::default()
            }
            ItemCategory::Food | ItemCategory::Potion => EatOutcome {
                grow: apply_item(state, item.kind).grow,
            },
        }
    }

    /// Entering an open exit completes the level. A locked exit gives way to
    /// a key from the inventory.
    fn enter_exit(&mut self, exit: EntityId, open: bool) {
        let (_, entities, state) = self.world.parts_mut();
        if !open {
            if !state.take_kind_from_inventory(ItemKind::Key) {
                log::debug!("exit is locked and the snake carries no key");
                return;
            }
            if entities.unlock_exit().is_some() {
                state.notify(Event::ExitUnlocked { exit });
            }
        }
        state.mark_completed();
    }
}

impl LevelQuery for Scene {
    fn is_wall_at(&self, cell: CellCoord) -> bool {
        self.world.is_wall_at(cell)
    }

    fn entity_at(&self, cell: CellCoord) -> Option<EntityRef> {
        self.world.entity_at(cell)
    }

    fn enemy_at(&self, cell: CellCoord, exclude: Option<EntityId>) -> Option<EntityId> {
        self.world.enemy_at(cell, exclude)
    }
}

impl TurnHelpers for Scene {
    fn on_eat(&mut self, entity: EntityRef) -> EatOutcome {
        match entity {
            EntityRef::Item { id, .. } => self.collect_item(id),
            EntityRef::Exit { id, open } => {
                self.enter_exit(id, open);
                EatOutcome::default()
            }
            EntityRef::Enemy { .. } => EatOutcome::default(),
        }
    }

    fn on_collide(&mut self, enemy: EntityId) {
        let (dungeon, entities, state) = self.world.parts_mut();
        let _ = self
            .combat
            .player_strikes(dungeon.tiles(), state, entities, enemy, &mut self.rng);
    }

    fn on_enemy_attack(&mut self, enemy: EntityId) {
        let (_, entities, state) = self.world.parts_mut();
        let _ = self.combat.enemy_strikes(state, entities, enemy);
    }

    fn on_self_collision(&mut self) {
        self.world.state_mut().mark_dead(DeathReason::SelfCollision);
    }

    fn on_wall_collision(&mut self) {
        self.world.state_mut().mark_dead(DeathReason::Wall);
    }

    fn skip_enemy_turn(&self) -> bool {
        let state = query::state(&self.world);
        state.is_completed() || !state.is_alive()
    }

    fn double_move(&self) -> bool {
        query::state(&self.world).has_effect(EffectKind::DoubleMove)
    }

    fn enemy_roster(&self) -> Vec<EntityId> {
        query::entities(&self.world).enemy_ids()
    }

    fn enemy(&self, id: EntityId) -> Option<Enemy> {
        query::entities(&self.world).enemy(id).cloned()
    }

    fn store_enemy(&mut self, enemy: &Enemy) {
        self.world.entities_mut().store_enemy(enemy);
    }

    fn player_alive(&self) -> bool {
        query::state(&self.world).is_alive()
    }

    fn end_turn(&mut self) -> TurnEnd {
        tick_effects(self.world.state_mut())
    }
}
