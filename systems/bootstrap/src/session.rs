//! A level in play: the scene, the turn engine and the run it belongs to.

use dungeon_snake_core::{DeathReason, Direction, Event, ItemCategory, ItemKind};
use dungeon_snake_system_combat::apply_item;
use dungeon_snake_system_movement::SnakeActor;
use dungeon_snake_system_turn::{TurnEngine, TurnReport};
use dungeon_snake_world::{query, state::RunCarryover, World};
use rand_chacha::ChaCha8Rng;

use crate::scene::Scene;

/// Where the level stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelOutcome {
    /// Still being played.
    InProgress,
    /// The snake left through the exit.
    Completed,
    /// The run ended.
    Died(DeathReason),
}

/// One playable level.
#[derive(Debug)]
pub struct Session {
    carryover: RunCarryover,
    scene: Scene,
    engine: TurnEngine,
    rng: ChaCha8Rng,
}

impl Session {
    pub(crate) fn new(
        carryover: RunCarryover,
        scene: Scene,
        engine: TurnEngine,
        rng: ChaCha8Rng,
    ) -> Self {
        Self {
            carryover,
            scene,
            engine,
            rng,
        }
    }

    /// The level's world.
    #[must_use]
    pub fn world(&self) -> &World {
        self.scene.world()
    }

    /// The player's snake.
    #[must_use]
    pub fn snake(&self) -> &SnakeActor {
        self.engine.snake()
    }

    /// Buffers a direction change.
    pub fn enqueue(&mut self, direction: Direction) -> bool {
        self.engine.snake_mut().enqueue(direction)
    }

    /// Current standing of the level.
    #[must_use]
    pub fn outcome(&self) -> LevelOutcome {
        let state = query::state(self.scene.world());
        if let Some(reason) = state.death() {
            LevelOutcome::Died(reason)
        } else if state.is_completed() {
            LevelOutcome::Completed
        } else {
            LevelOutcome::InProgress
        }
    }

    /// Plays one turn. Finished levels refuse further turns.
    pub fn turn(&mut self, direction: Option<Direction>) -> Option<TurnReport> {
        if self.outcome() != LevelOutcome::InProgress {
            return None;
        }
        let report = self
            .engine
            .process_turn(direction, &mut self.scene, &mut self.rng);
        let length = self.engine.snake().len();
        self.scene.world_mut().state_mut().set_length(length);
        Some(report)
    }

    /// Consumes the inventory item at `index` between turns.
    ///
    /// Keys stay in the inventory, since only a locked exit can use them.
    pub fn use_item(&mut self, index: usize) -> Option<ItemKind> {
        if self.outcome() != LevelOutcome::InProgress {
            return None;
        }
        let state = self.scene.world_mut().state_mut();
        let kind = *state.inventory().get(index)?;
        if kind.category() == ItemCategory::Key {
            return None;
        }
        let _ = state.take_from_inventory(index)?;
        let used = apply_item(state, kind);
        self.engine.snake_mut().grow(used.grow);
        log::info!("used {kind} from the inventory");
        Some(kind)
    }

    /// Notifications recorded since the previous drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.scene.world_mut().state_mut().drain_events()
    }

    /// Carryover for the next level, once this one is completed.
    ///
    /// Length still owed by pending growth is carried along; length lent by
    /// temporary effects that have not expired yet is not.
    #[must_use]
    pub fn next_carryover(&self) -> Option<RunCarryover> {
        if self.outcome() != LevelOutcome::Completed {
            return None;
        }
        let pending = usize::try_from(self.engine.snake().pending_growth()).unwrap_or(0);
        Some(
            self.carryover
                .advance(query::state(self.scene.world()), pending),
        )
    }
}
