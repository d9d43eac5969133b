#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Orchestrates one full turn: the player moves, then every living enemy
//! acts in roster order, then timed effects tick.

use dungeon_snake_core::{DeathReason, Direction, EntityId, TurnHelpers};
use dungeon_snake_system_enemy_ai::{EnemyAction, EnemyAi};
use dungeon_snake_system_movement::{MoveOutcome, SnakeActor};
use rand::Rng;

/// How a turn ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnStatus {
    /// The engine was locked and nothing happened.
    Skipped,
    /// The turn ran to completion.
    Resolved,
    /// The player died during the turn.
    PlayerDied(DeathReason),
}

/// One enemy's contribution to a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyStep {
    /// Enemy that acted.
    pub enemy: EntityId,
    /// What it did.
    pub action: EnemyAction,
}

/// Everything that happened during a turn, in resolution order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReport {
    /// Final status.
    pub status: TurnStatus,
    /// Outcome of every player sub-move.
    pub moves: Vec<MoveOutcome>,
    /// Enemy actions in roster order.
    pub enemies: Vec<EnemyStep>,
    /// Segments released by expiring effects.
    pub released: u32,
}

impl TurnReport {
    fn new(status: TurnStatus) -> Self {
        Self {
            status,
            moves: Vec::new(),
            enemies: Vec::new(),
            released: 0,
        }
    }
}

/// Single-flight turn orchestrator owning the snake.
#[derive(Clone, Debug)]
pub struct TurnEngine {
    snake: SnakeActor,
    ai: EnemyAi,
    locked: bool,
}

impl TurnEngine {
    /// Wraps a snake and the enemy decision function.
    #[must_use]
    pub fn new(snake: SnakeActor, ai: EnemyAi) -> Self {
        Self {
            snake,
            ai,
            locked: false,
        }
    }

    /// The player's snake.
    #[must_use]
    pub fn snake(&self) -> &SnakeActor {
        &self.snake
    }

    /// Mutable access to the snake, for between-turn item use.
    pub fn snake_mut(&mut self) -> &mut SnakeActor {
        &mut self.snake
    }

    /// Whether turns are currently refused.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Refuses turns until [`TurnEngine::unlock`], for example while a
    /// presentation layer animates the previous turn.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Accepts turns again.
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Runs one turn.
    ///
    /// A locked engine returns [`TurnStatus::Skipped`] without touching any
    /// state. With a double-move effect both player sub-moves resolve before
    /// any enemy acts, and effects tick once at the end.
    pub fn process_turn<H, R>(
        &mut self,
        direction: Option<Direction>,
        helpers: &mut H,
        rng: &mut R,
    ) -> TurnReport
    where
        H: TurnHelpers + ?Sized,
        R: Rng + ?Sized,
    {
        if self.locked {
            log::debug!("turn dropped while the engine is locked");
            return TurnReport::new(TurnStatus::Skipped);
        }
        self.locked = true;
        let report = self.resolve(direction, helpers, rng);
        self.locked = false;
        report
    }

    fn resolve<H, R>(&mut self, direction: Option<Direction>, helpers: &mut H, rng: &mut R) -> TurnReport
    where
        H: TurnHelpers + ?Sized,
        R: Rng + ?Sized,
    {
        let mut report = TurnReport::new(TurnStatus::Resolved);

        let sub_moves = if helpers.double_move() { 2 } else { 1 };
        for index in 0..sub_moves {
            let requested = if index == 0 { direction } else { None };
            let outcome = self.snake.take_turn(requested, helpers);
            report.moves.push(outcome);
            if let MoveOutcome::Died(reason) = outcome {
                report.status = TurnStatus::PlayerDied(reason);
                return report;
            }
            if helpers.skip_enemy_turn() {
                break;
            }
        }

        if !helpers.player_alive() {
            report.status = TurnStatus::PlayerDied(DeathReason::Slain);
            return report;
        }

        if !helpers.skip_enemy_turn() {
            for id in helpers.enemy_roster() {
                let Some(mut enemy) = helpers.enemy(id) else {
                    continue;
                };
                if !enemy.is_alive() {
                    continue;
                }
                let action = self.ai.decide(&mut enemy, &self.snake, &*helpers, rng);
                if let EnemyAction::Move { to, .. } = action {
                    enemy.cell = to;
                }
                helpers.store_enemy(&enemy);
                report.enemies.push(EnemyStep { enemy: id, action });

                if action == EnemyAction::Attack {
                    helpers.on_enemy_attack(id);
                    if !helpers.player_alive() {
                        report.status = TurnStatus::PlayerDied(DeathReason::Slain);
                        return report;
                    }
                }
            }
        }

        let end = helpers.end_turn();
        report.released = self.snake.shrink(end.shrink);
        report
    }
}
