#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bootstrap system that turns a run carryover into a playable level and
//! carries the run from level to level.

mod scene;
mod session;

pub use session::{LevelOutcome, Session};

use dungeon_snake_core::{Direction, ItemKind, PlayerView, MIN_SNAKE_LENGTH};
use dungeon_snake_system_combat::Combat;
use dungeon_snake_system_enemy_ai::{EnemyAi, DEFAULT_WANDER_CHANCE};
use dungeon_snake_system_generation::{catalog::RoomCatalog, DungeonGraph, GenerationConfig};
use dungeon_snake_system_movement::{SnakeActor, DEFAULT_QUEUE_CAPACITY};
use dungeon_snake_system_spawning::{EntitySpawner, SpawnConfig};
use dungeon_snake_system_turn::TurnEngine;
use dungeon_snake_world::{
    entities::EntityRegistry,
    state::{GameState, PlayerBase, RunCarryover},
    World,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::scene::Scene;

const RNG_STREAM_COMBAT: &str = "combat";
const RNG_STREAM_ENEMIES: &str = "enemies";

/// Player tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Snake length at the start of a run.
    pub start_length: usize,
    /// Health at the start of every level, before bonuses.
    pub max_health: u32,
    /// Damage per bite, before bonuses and effects.
    pub damage: u32,
    /// Number of buffered direction inputs.
    pub queue_capacity: usize,
    /// Chance that a chasing enemy takes a random step.
    pub wander_chance: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        let base = PlayerBase::default();
        Self {
            start_length: MIN_SNAKE_LENGTH,
            max_health: base.max_health,
            damage: base.damage,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            wander_chance: DEFAULT_WANDER_CHANCE,
        }
    }
}

impl PlayerConfig {
    fn base(&self) -> PlayerBase {
        PlayerBase {
            max_health: self.max_health,
            damage: self.damage,
        }
    }
}

/// Every tunable of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Run seed every level seed derives from.
    pub seed: u64,
    /// Dungeon generation tunables.
    pub generation: GenerationConfig,
    /// Room population tunables.
    pub spawning: SpawnConfig,
    /// Player tunables.
    pub player: PlayerConfig,
}

/// Builds levels from a [`Config`].
#[derive(Debug)]
pub struct Bootstrap {
    config: Config,
    graph: DungeonGraph,
    spawner: EntitySpawner,
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Bootstrap {
    /// Prepares the generator and spawner described by the configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let graph = DungeonGraph::new(config.generation.clone(), RoomCatalog::default());
        let spawner = EntitySpawner::new(config.spawning.clone());
        Self {
            config,
            graph,
            spawner,
        }
    }

    /// Configuration the bootstrap was built from.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Carryover that starts a fresh run.
    #[must_use]
    pub fn new_run(&self) -> RunCarryover {
        RunCarryover {
            length: self.config.player.start_length.max(MIN_SNAKE_LENGTH),
            ..RunCarryover::default()
        }
    }

    /// Generates, populates and returns the level described by `carryover`.
    ///
    /// The snake starts at the centre of the start room facing right with the
    /// minimum body; any extra carried length arrives as pending growth.
    #[must_use]
    pub fn start_level(&self, carryover: &RunCarryover) -> Session {
        let level_seed = derive_level_seed(self.config.seed, carryover.level);
        let mut rng = ChaCha8Rng::seed_from_u64(level_seed);

        let dungeon = self.graph.generate(&mut rng);
        let mut entities = EntityRegistry::new();
        let report = self.spawner.spawn_all(&dungeon, &mut entities, &mut rng);
        log::info!(
            "level {} ready: {} rooms, {} items, {} enemies",
            carryover.level,
            dungeon.rooms().len(),
            report.items.len(),
            report.enemies.len() + usize::from(report.boss.is_some())
        );

        let head = dungeon
            .start_room()
            .map(|room| room.center())
            .unwrap_or_default();
        let state = GameState::from_carryover(carryover, &self.config.player.base());
        let mut snake = SnakeActor::new(
            head,
            Direction::Right,
            MIN_SNAKE_LENGTH,
            self.config.player.queue_capacity,
        );
        let carried = state.length().saturating_sub(MIN_SNAKE_LENGTH);
        snake.grow(u32::try_from(carried).unwrap_or(u32::MAX));
        log::debug!("snake starts at {:?}", snake.head());

        let world = World::new(dungeon, entities, state);
        let scene = Scene::new(
            world,
            Combat::new(),
            ChaCha8Rng::seed_from_u64(derive_labeled_seed(level_seed, RNG_STREAM_COMBAT)),
        );
        let engine = TurnEngine::new(snake, EnemyAi::new(self.config.player.wander_chance));
        Session::new(
            carryover.clone(),
            scene,
            engine,
            ChaCha8Rng::seed_from_u64(derive_labeled_seed(level_seed, RNG_STREAM_ENEMIES)),
        )
    }
}

/// Items the shop sells, with their prices.
#[must_use]
pub fn shop_stock() -> Vec<(ItemKind, u32)> {
    ItemKind::ALL
        .into_iter()
        .map(|kind| (kind, kind.properties().price))
        .filter(|&(_, price)| price > 0)
        .collect()
}

/// Seed of one level, independent of every other level of the run.
#[must_use]
pub fn derive_level_seed(run_seed: u64, level: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(run_seed.to_le_bytes());
    hasher.update(level.to_le_bytes());
    finalize_seed(hasher)
}

fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_seeds_depend_on_run_and_level() {
        assert_eq!(derive_level_seed(7, 1), derive_level_seed(7, 1));
        assert_ne!(derive_level_seed(7, 1), derive_level_seed(7, 2));
        assert_ne!(derive_level_seed(7, 1), derive_level_seed(8, 1));
        assert_ne!(
            derive_labeled_seed(3, RNG_STREAM_COMBAT),
            derive_labeled_seed(3, RNG_STREAM_ENEMIES)
        );
    }

    #[test]
    fn shop_never_sells_coins() {
        let stock = shop_stock();
        assert!(stock.iter().all(|(kind, _)| *kind != ItemKind::Coin));
        assert!(stock.contains(&(ItemKind::Key, 8)));
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            seed = 99

            [generation]
            target_rooms = 8

            [player]
            start_length = 5
            "#,
        )
        .unwrap_or_else(|error| panic!("config should parse: {error}"));
        assert_eq!(config.seed, 99);
        assert_eq!(config.generation.target_rooms, 8);
        assert_eq!(config.generation.corridor_width, 3);
        assert_eq!(config.player.start_length, 5);
        assert_eq!(config.player.max_health, 5);
        assert_eq!(config.spawning, SpawnConfig::default());
    }
}
