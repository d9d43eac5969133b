//! Static item and enemy catalogs together with their runtime records.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellCoord, CellRect, EntityId};

/// Raised when a catalog name cannot be resolved.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    /// No item carries the provided name.
    #[error("unknown item `{0}`")]
    UnknownItem(String),
    /// No enemy archetype carries the provided name.
    #[error("unknown enemy `{0}`")]
    UnknownEnemy(String),
    /// No room archetype carries the provided name.
    #[error("unknown room type `{0}`")]
    UnknownRoom(String),
}

/// Broad grouping of collectible items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Edible items that grow the snake.
    Food,
    /// Currency.
    Coin,
    /// Flasks that heal or grant effects.
    Potion,
    /// Keys that open a locked exit.
    Key,
}

/// Concrete collectible item kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Plain food.
    Apple,
    /// Hearty food that also heals.
    Meat,
    /// Grants the vampire bonus.
    Garlic,
    /// Grants a damage boost.
    Jalapeno,
    /// Grants double movement.
    Espresso,
    /// Restores a little health.
    SmallRedFlask,
    /// Regenerates health over several turns.
    BigRedFlask,
    /// Grants a short shield.
    SmallBlueFlask,
    /// Temporarily lengthens the snake.
    BigBlueFlask,
    /// A handful of coins.
    Coin,
    /// Opens the exit before the boss falls.
    Key,
}

/// Effect applied when an item is consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectSpec {
    /// Behaviour of the effect.
    pub kind: EffectKind,
    /// Strength of the effect.
    pub value: u32,
    /// Number of turns the effect lasts.
    pub duration: u32,
}

/// Static properties of an item kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemProperties {
    /// Health restored immediately.
    pub health_gain: u32,
    /// Segments grown immediately.
    pub length_gain: u32,
    /// Timed effect granted on use.
    pub effect: Option<EffectSpec>,
    /// Shop price in coins.
    pub price: u32,
    /// Human readable description.
    pub description: &'static str,
}

impl ItemKind {
    /// Every item kind in catalog order.
    pub const ALL: [ItemKind; 11] = [
        ItemKind::Apple,
        ItemKind::Meat,
        ItemKind::Garlic,
        ItemKind::Jalapeno,
        ItemKind::Espresso,
        ItemKind::SmallRedFlask,
        ItemKind::BigRedFlask,
        ItemKind::SmallBlueFlask,
        ItemKind::BigBlueFlask,
        ItemKind::Coin,
        ItemKind::Key,
    ];

    /// Catalog key of the item.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Apple => "apple",
            Self::Meat => "meat",
            Self::Garlic => "garlic",
            Self::Jalapeno => "jalapeno",
            Self::Espresso => "espresso",
            Self::SmallRedFlask => "small_red_flask",
            Self::BigRedFlask => "big_red_flask",
            Self::SmallBlueFlask => "small_blue_flask",
            Self::BigBlueFlask => "big_blue_flask",
            Self::Coin => "coin",
            Self::Key => "key",
        }
    }

    /// Category the item belongs to.
    #[must_use]
    pub const fn category(self) -> ItemCategory {
        match self {
            Self::Apple | Self::Meat | Self::Garlic | Self::Jalapeno | Self::Espresso => {
                ItemCategory::Food
            }
            Self::SmallRedFlask | Self::BigRedFlask | Self::SmallBlueFlask | Self::BigBlueFlask => {
                ItemCategory::Potion
            }
            Self::Coin => ItemCategory::Coin,
            Self::Key => ItemCategory::Key,
        }
    }

    /// Item kinds belonging to the category, in catalog order.
    pub fn of_category(category: ItemCategory) -> impl Iterator<Item = ItemKind> {
        Self::ALL
            .into_iter()
            .filter(move |kind| kind.category() == category)
    }

    /// Static properties of the item.
    #[must_use]
    pub const fn properties(self) -> ItemProperties {
        const fn effect(kind: EffectKind, value: u32, duration: u32) -> Option<EffectSpec> {
            Some(EffectSpec {
                kind,
                value,
                duration,
            })
        }

        let (health_gain, length_gain, effect, price, description) = match self {
            Self::Apple => (0, 1, None, 2, "A crisp apple. Grows the snake by one."),
            Self::Meat => (1, 2, None, 4, "A hunk of meat. Heals and grows by two."),
            Self::Garlic => (
                0,
                1,
                effect(EffectKind::VampireBonus, 1, 10),
                5,
                "Pungent garlic. Bites hurt vampires more for a while.",
            ),
            Self::Jalapeno => (
                0,
                1,
                effect(EffectKind::DamageBoost, 1, 8),
                5,
                "A fiery pepper. Bites hit harder for a while.",
            ),
            Self::Espresso => (
                0,
                0,
                effect(EffectKind::DoubleMove, 1, 6),
                6,
                "Strong coffee. Move twice per turn for a while.",
            ),
            Self::SmallRedFlask => (1, 0, None, 3, "Restores one health."),
            Self::BigRedFlask => (
                1,
                0,
                effect(EffectKind::Regen, 1, 4),
                6,
                "Restores health and keeps regenerating.",
            ),
            Self::SmallBlueFlask => (
                0,
                0,
                effect(EffectKind::Shield, 1, 10),
                4,
                "Hardens scales against one point of damage.",
            ),
            Self::BigBlueFlask => (
                0,
                0,
                effect(EffectKind::TemporaryLength, 3, 8),
                7,
                "Stretches the snake by three segments for a while.",
            ),
            Self::Coin => (0, 0, None, 0, "Shiny coins."),
            Self::Key => (0, 0, None, 8, "Opens a sealed exit."),
        };

        ItemProperties {
            health_gain,
            length_gain,
            effect,
            price,
            description,
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ItemKind {
    type Err = LookupError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == value)
            .ok_or_else(|| LookupError::UnknownItem(value.to_owned()))
    }
}

/// Behaviours a timed effect can have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Heals `value` at every tick.
    Regen,
    /// Adds `value` to the player's shield.
    Shield,
    /// Adds `value` to the player's damage.
    DamageBoost,
    /// Adds `value` to the player's damage against vampires.
    VampireBonus,
    /// Lets the snake move twice per turn.
    DoubleMove,
    /// Grows the snake by `value`, released again on expiry.
    TemporaryLength,
}

/// A timed effect currently applied to the player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEffect {
    /// Behaviour of the effect.
    pub kind: EffectKind,
    /// Strength of the effect.
    pub value: u32,
    /// Total number of turns granted.
    pub duration: u32,
    /// Turns remaining before expiry.
    pub turns_left: u32,
    /// Item that granted the effect.
    pub source: ItemKind,
    /// Human readable description.
    pub description: String,
}

impl ActiveEffect {
    /// Instantiates an effect granted by `source`.
    #[must_use]
    pub fn from_spec(spec: EffectSpec, source: ItemKind) -> Self {
        Self {
            kind: spec.kind,
            value: spec.value,
            duration: spec.duration,
            turns_left: spec.duration,
            source,
            description: source.properties().description.to_owned(),
        }
    }
}

/// Enemy archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Fragile wanderer.
    Skull,
    /// Armoured drinker that heals when it bites.
    Vampire,
    /// Sluggish blob that moves every other turn.
    Slime,
    /// Skittish flyer that sprints when the snake is close.
    Bat,
    /// Brute that never leaves its room.
    Orc,
}

/// Combat and movement statistics of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Maximum health.
    pub health: u32,
    /// Damage dealt per attack.
    pub damage: u32,
    /// Damage absorbed per incoming strike.
    pub shield: u32,
    /// Manhattan distance from which the enemy can attack.
    pub attack_range: u32,
    /// Manhattan distance within which the enemy notices the snake.
    pub sight_range: u32,
    /// Patrol radius around the spawn cell.
    pub move_radius: u32,
    /// Turns between moves, when the enemy is slow.
    pub move_cooldown: Option<u32>,
    /// Health restored on every successful attack.
    pub lifesteal: u32,
}

/// Distance band in which an enemy takes several steps per turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SprintBand {
    /// Smallest distance to the head that triggers a sprint.
    pub min_distance: u32,
    /// Largest distance to the head that triggers a sprint.
    pub max_distance: u32,
    /// Steps taken while sprinting.
    pub steps: u32,
}

/// Movement quirks of an enemy archetype.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnemyBehavior {
    /// Enemy never leaves the interior of its home room.
    pub room_bound: bool,
    /// Optional sprint band.
    pub sprint: Option<SprintBand>,
}

impl EnemyKind {
    /// Every enemy archetype in catalog order.
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Skull,
        EnemyKind::Vampire,
        EnemyKind::Slime,
        EnemyKind::Bat,
        EnemyKind::Orc,
    ];

    /// Catalog key of the archetype.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Skull => "skull",
            Self::Vampire => "vampire",
            Self::Slime => "slime",
            Self::Bat => "bat",
            Self::Orc => "orc",
        }
    }

    /// Default spawn weight of the archetype.
    #[must_use]
    pub const fn weight(self) -> u32 {
        match self {
            Self::Skull => 30,
            Self::Vampire => 10,
            Self::Slime => 25,
            Self::Bat => 20,
            Self::Orc => 15,
        }
    }

    /// Base statistics of the archetype.
    #[must_use]
    pub const fn stats(self) -> EnemyStats {
        let (health, damage, shield, sight_range, move_radius, move_cooldown, lifesteal) =
            match self {
                Self::Skull => (2, 1, 0, 5, 3, None, 0),
                Self::Vampire => (4, 2, 2, 6, 4, None, 1),
                Self::Slime => (3, 1, 1, 4, 2, Some(2), 0),
                Self::Bat => (1, 1, 0, 7, 5, None, 0),
                Self::Orc => (5, 2, 1, 4, 3, None, 0),
            };
        EnemyStats {
            health,
            damage,
            shield,
            attack_range: 1,
            sight_range,
            move_radius,
            move_cooldown,
            lifesteal,
        }
    }

    /// Movement quirks of the archetype.
    #[must_use]
    pub const fn behavior(self) -> EnemyBehavior {
        match self {
            Self::Bat => EnemyBehavior {
                room_bound: false,
                sprint: Some(SprintBand {
                    min_distance: 2,
                    max_distance: 4,
                    steps: 2,
                }),
            },
            Self::Orc => EnemyBehavior {
                room_bound: true,
                sprint: None,
            },
            Self::Skull | Self::Vampire | Self::Slime => EnemyBehavior {
                room_bound: false,
                sprint: None,
            },
        }
    }

    /// Rules that turn the archetype's stats into boss stats.
    #[must_use]
    pub const fn boss_transform(self) -> BossTransform {
        let shield = match self {
            Self::Skull => StatRule::Add(1),
            Self::Vampire => StatRule::Scale {
                numerator: 3,
                denominator: 2,
            },
            Self::Slime | Self::Bat | Self::Orc => StatRule::Keep,
        };
        BossTransform {
            health: StatRule::DOUBLE,
            damage: StatRule::DOUBLE,
            shield,
            attack_range: StatRule::DOUBLE,
            sight_range: StatRule::DOUBLE,
            move_radius: StatRule::DOUBLE,
        }
    }
}

impl std::fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for EnemyKind {
    type Err = LookupError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == value)
            .ok_or_else(|| LookupError::UnknownEnemy(value.to_owned()))
    }
}

/// How a single statistic changes when an enemy is promoted to boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatRule {
    /// Leave the value untouched.
    Keep,
    /// Multiply by a fraction, rounding down.
    Scale {
        /// Multiplier applied first.
        numerator: u32,
        /// Divisor applied afterwards.
        denominator: u32,
    },
    /// Add a constant.
    Add(u32),
}

impl StatRule {
    /// Doubles the value.
    pub const DOUBLE: StatRule = StatRule::Scale {
        numerator: 2,
        denominator: 1,
    };

    /// Applies the rule to a value.
    #[must_use]
    pub const fn apply(self, value: u32) -> u32 {
        match self {
            Self::Keep => value,
            Self::Scale {
                numerator,
                denominator,
            } => {
                if denominator == 0 {
                    value
                } else {
                    value.saturating_mul(numerator) / denominator
                }
            }
            Self::Add(extra) => value.saturating_add(extra),
        }
    }
}

/// Per-stat rules promoting an archetype to boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BossTransform {
    /// Rule for maximum health.
    pub health: StatRule,
    /// Rule for damage.
    pub damage: StatRule,
    /// Rule for shield.
    pub shield: StatRule,
    /// Rule for attack range.
    pub attack_range: StatRule,
    /// Rule for sight range.
    pub sight_range: StatRule,
    /// Rule for patrol radius.
    pub move_radius: StatRule,
}

impl BossTransform {
    /// Applies every rule to the provided stats.
    #[must_use]
    pub const fn apply(&self, stats: EnemyStats) -> EnemyStats {
        EnemyStats {
            health: self.health.apply(stats.health),
            damage: self.damage.apply(stats.damage),
            shield: self.shield.apply(stats.shield),
            attack_range: self.attack_range.apply(stats.attack_range),
            sight_range: self.sight_range.apply(stats.sight_range),
            move_radius: self.move_radius.apply(stats.move_radius),
            move_cooldown: stats.move_cooldown,
            lifesteal: stats.lifesteal,
        }
    }
}

/// Runtime record of a spawned enemy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enemy {
    /// Identifier assigned by the entity registry.
    pub id: EntityId,
    /// Archetype.
    pub kind: EnemyKind,
    /// Current cell.
    pub cell: CellCoord,
    /// Cell the enemy spawned on, used as the patrol anchor.
    pub spawn: CellCoord,
    /// Effective statistics.
    pub stats: EnemyStats,
    /// Remaining health.
    pub health: u32,
    /// Turns counted toward the next move of a slow enemy.
    pub cooldown_counter: u32,
    /// Whether the enemy is the level boss.
    pub is_boss: bool,
    /// Room the enemy spawned in.
    pub home: Option<CellRect>,
}

impl Enemy {
    /// Creates a regular enemy of the provided archetype.
    #[must_use]
    pub fn new(id: EntityId, kind: EnemyKind, cell: CellCoord, home: Option<CellRect>) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            cell,
            spawn: cell,
            stats,
            health: stats.health,
            cooldown_counter: 0,
            is_boss: false,
            home,
        }
    }

    /// Creates a boss of the provided archetype.
    #[must_use]
    pub fn boss(id: EntityId, kind: EnemyKind, cell: CellCoord, home: Option<CellRect>) -> Self {
        let mut enemy = Self::new(id, kind, cell, home);
        enemy.stats = kind.boss_transform().apply(enemy.stats);
        enemy.health = enemy.stats.health;
        enemy.is_boss = true;
        enemy
    }

    /// Whether the enemy still has health left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Movement quirks of the enemy.
    #[must_use]
    pub const fn behavior(&self) -> EnemyBehavior {
        self.kind.behavior()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skull_boss_doubles_and_gains_shield() {
        let boss = Enemy::boss(EntityId::new(1), EnemyKind::Skull, CellCoord::new(0, 0), None);
        assert_eq!(boss.stats.health, 4);
        assert_eq!(boss.stats.damage, 2);
        assert_eq!(boss.stats.shield, 1);
        assert_eq!(boss.stats.attack_range, 2);
        assert_eq!(boss.stats.sight_range, 10);
        assert_eq!(boss.health, 4);
        assert!(boss.is_boss);
    }

    #[test]
    fn vampire_boss_shield_rounds_down() {
        let boss = Enemy::boss(EntityId::new(1), EnemyKind::Vampire, CellCoord::new(0, 0), None);
        assert_eq!(boss.stats.shield, 3);
        assert_eq!(boss.stats.lifesteal, 1);
    }

    #[test]
    fn categories_partition_the_catalog() {
        let foods: Vec<_> = ItemKind::of_category(ItemCategory::Food).collect();
        assert_eq!(foods.len(), 5);
        let total: usize = [
            ItemCategory::Food,
            ItemCategory::Coin,
            ItemCategory::Potion,
            ItemCategory::Key,
        ]
        .into_iter()
        .map(|category| ItemKind::of_category(category).count())
        .sum();
        assert_eq!(total, ItemKind::ALL.len());
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for kind in ItemKind::ALL {
            assert_eq!(kind.name().parse::<ItemKind>(), Ok(kind));
        }
        for kind in EnemyKind::ALL {
            assert_eq!(kind.name().parse::<EnemyKind>(), Ok(kind));
        }
        assert!(matches!(
            "dragon".parse::<EnemyKind>(),
            Err(LookupError::UnknownEnemy(_))
        ));
    }

    #[test]
    fn fresh_enemy_anchors_patrol_at_spawn() {
        let cell = CellCoord::new(5, -2);
        let enemy = Enemy::new(EntityId::new(3), EnemyKind::Slime, cell, None);
        assert_eq!(enemy.spawn, cell);
        assert_eq!(enemy.cooldown_counter, 0);
        assert_eq!(enemy.stats.move_cooldown, Some(2));
    }
}
