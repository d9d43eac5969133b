#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Damage resolution, item consumption and the end-of-turn effect tick.

use dungeon_snake_core::{
    ActiveEffect, DeathReason, EffectKind, EnemyKind, EntityId, Event, ItemKind, Tile, TurnEnd,
    WeightedTable,
};
use dungeon_snake_world::{entities::EntityRegistry, state::GameState, tiles::TileGrid};
use rand::Rng;

/// Score awarded for killing a regular enemy.
pub const STRIKE_SCORE: u32 = 10;

/// Score awarded for killing a boss.
pub const BOSS_SCORE: u32 = 50;

/// How far from a fallen boss its reward may roll when the boss's own cell
/// is taken.
pub const DROP_SEARCH_RADIUS: i32 = 3;

/// Damage left after shields. Every hit deals at least one point.
#[must_use]
pub fn damage(attack: u32, shield: u32) -> u32 {
    attack.saturating_sub(shield).max(1)
}

/// Damage the player deals to an enemy of the given archetype.
#[must_use]
pub fn player_damage(state: &GameState, target: EnemyKind) -> u32 {
    let mut total = state
        .base_damage()
        .saturating_add(state.effect_total(EffectKind::DamageBoost));
    if target == EnemyKind::Vampire {
        total = total.saturating_add(state.effect_total(EffectKind::VampireBonus));
    }
    total
}

/// Permanent shield plus active shield effects.
#[must_use]
pub fn player_shield(state: &GameState) -> u32 {
    state
        .shield()
        .saturating_add(state.effect_total(EffectKind::Shield))
}

/// Result of the player biting an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrikeOutcome {
    /// The enemy survived.
    Wounded {
        /// Damage dealt.
        dealt: u32,
        /// Health left.
        remaining: u32,
    },
    /// The enemy died.
    Defeated {
        /// Damage dealt.
        dealt: u32,
        /// Reward dropped by a boss.
        drop: Option<EntityId>,
    },
}

/// Growth requested by a consumed item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemUse {
    /// Segments the snake should grow by.
    pub grow: u32,
}

/// Resolves strikes in both directions and awards kills.
#[derive(Clone, Debug)]
pub struct Combat {
    boss_rewards: WeightedTable<ItemKind>,
}

impl Default for Combat {
    fn default() -> Self {
        Self::new()
    }
}

impl Combat {
    /// Creates the resolver with the default boss reward table.
    #[must_use]
    pub fn new() -> Self {
        let boss_rewards = [
            (ItemKind::BigRedFlask, 3),
            (ItemKind::BigBlueFlask, 2),
            (ItemKind::Meat, 2),
            (ItemKind::Jalapeno, 1),
        ]
        .into_iter()
        .collect();
        Self { boss_rewards }
    }

    /// The player bites `enemy`.
    ///
    /// Returns `None` when the enemy is not registered. A boss kill drops a
    /// reward on the boss's cell, or the nearest free floor cell when an exit
    /// or item already lies there, and unlocks the exit once no boss remains.
    pub fn player_strikes<R: Rng + ?Sized>(
        &self,
        tiles: &TileGrid,
        state: &mut GameState,
        entities: &mut EntityRegistry,
        enemy: EntityId,
        rng: &mut R,
    ) -> Option<StrikeOutcome> {
        let mut target = entities.enemy(enemy)?.clone();
        let dealt = damage(player_damage(state, target.kind), target.stats.shield);
        target.health = target.health.saturating_sub(dealt);

        if target.is_alive() {
            entities.store_enemy(&target);
            state.notify(Event::EnemyDamaged {
                enemy,
                dealt,
                remaining: target.health,
            });
            return Some(StrikeOutcome::Wounded {
                dealt,
                remaining: target.health,
            });
        }

        let _ = entities.remove_enemy(enemy);
        state.notify(Event::EnemyDefeated {
            enemy,
            kind: target.kind,
            boss: target.is_boss,
        });
        log::info!("{} {:?} defeated", target.kind, enemy);

        let mut drop = None;
        if target.is_boss {
            state.add_score(BOSS_SCORE);
            let landing = entities.nearest_free(target.cell, DROP_SEARCH_RADIUS, |cell| {
                tiles.get(cell) == Some(Tile::Floor)
            });
            drop = self
                .boss_rewards
                .pick(rng)
                .copied()
                .zip(landing)
                .and_then(|(reward, cell)| entities.spawn_item(reward, cell, 1));
            if drop.is_none() {
                log::warn!("boss reward had nowhere to land at {:?}", target.cell);
            }
            if !entities.boss_alive() {
                if let Some(exit) = entities.unlock_exit() {
                    state.notify(Event::ExitUnlocked { exit });
                }
            }
        } else {
            state.add_score(STRIKE_SCORE);
        }

        Some(StrikeOutcome::Defeated { dealt, drop })
    }

    /// `enemy` bites the player. Returns the damage dealt.
    ///
    /// Lifesteal heals the attacker up to its maximum health. The player is
    /// marked slain when health reaches zero.
    pub fn enemy_strikes(
        &self,
        state: &mut GameState,
        entities: &mut EntityRegistry,
        enemy: EntityId,
    ) -> Option<u32> {
        let mut attacker = entities.enemy(enemy)?.clone();
        let dealt = damage(attacker.stats.damage, player_shield(state));
        state.change_health(-i32::try_from(dealt).unwrap_or(i32::MAX));
        state.notify(Event::PlayerAttacked { enemy, dealt });

        if attacker.stats.lifesteal > 0 {
            attacker.health = attacker
                .health
                .saturating_add(attacker.stats.lifesteal)
                .min(attacker.stats.health);
            entities.store_enemy(&attacker);
        }

        if state.health() == 0 {
            state.mark_dead(DeathReason::Slain);
        }
        Some(dealt)
    }
}

/// Applies a consumable's instant gains and pushes its timed effect.
///
/// Coins and keys have no consumable effect and request no growth.
pub fn apply_item(state: &mut GameState, kind: ItemKind) -> ItemUse {
    let properties = kind.properties();
    if properties.health_gain > 0 {
        state.change_health(i32::try_from(properties.health_gain).unwrap_or(i32::MAX));
    }

    let mut grow = properties.length_gain;
    if let Some(spec) = properties.effect {
        if spec.kind == EffectKind::TemporaryLength {
            grow = grow.saturating_add(spec.value);
        }
        state.push_effect(ActiveEffect::from_spec(spec, kind));
    }
    ItemUse { grow }
}

/// Ages every active effect by one turn.
///
/// Regeneration heals before aging. Expired temporary-length effects ask for
/// exactly the segments they granted back.
pub fn tick_effects(state: &mut GameState) -> TurnEnd {
    let regen = state.effect_total(EffectKind::Regen);
    if regen > 0 {
        state.change_health(i32::try_from(regen).unwrap_or(i32::MAX));
    }

    let mut shrink = 0;
    let mut kept = Vec::with_capacity(state.effects().len());
    for effect in state.effects() {
        let mut effect = effect.clone();
        effect.turns_left = effect.turns_left.saturating_sub(1);
        if effect.turns_left > 0 {
            kept.push(effect);
        } else if effect.kind == EffectKind::TemporaryLength {
            shrink += effect.value;
        }
    }
    state.replace_effects(kept);
    TurnEnd { shrink }
}
