#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-enemy decisions: wait out cooldowns, chase a visible snake, attack in
//! range, or patrol around the spawn cell.

use dungeon_snake_core::{CellCoord, Direction, Enemy, LevelQuery, PlayerView};
use rand::seq::SliceRandom;
use rand::Rng;

/// Chance that a chasing enemy takes a random valid step instead of the best one.
pub const DEFAULT_WANDER_CHANCE: f64 = 0.2;

/// What an enemy does this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyAction {
    /// Stays put.
    Idle,
    /// Moves from one cell to another, possibly several steps away.
    Move {
        /// Cell the enemy left.
        from: CellCoord,
        /// Cell the enemy ends on.
        to: CellCoord,
    },
    /// Strikes the snake without moving.
    Attack,
}

/// Decision function shared by every enemy.
#[derive(Clone, Debug)]
pub struct EnemyAi {
    wander_chance: f64,
    candidates: Vec<Candidate>,
}

impl Default for EnemyAi {
    fn default() -> Self {
        Self::new(DEFAULT_WANDER_CHANCE)
    }
}

impl EnemyAi {
    /// Creates the AI with the given wander probability.
    #[must_use]
    pub fn new(wander_chance: f64) -> Self {
        Self {
            wander_chance: wander_chance.clamp(0.0, 1.0),
            candidates: Vec::with_capacity(Direction::ALL.len()),
        }
    }

    /// Decides the enemy's action and advances its cooldown counter.
    ///
    /// The enemy's cell is left untouched; the caller applies a `Move`.
    pub fn decide<Q, P, R>(
        &mut self,
        enemy: &mut Enemy,
        player: &P,
        level: &Q,
        rng: &mut R,
    ) -> EnemyAction
    where
        Q: LevelQuery + ?Sized,
        P: PlayerView + ?Sized,
        R: Rng + ?Sized,
    {
        if let Some(threshold) = enemy.stats.move_cooldown {
            enemy.cooldown_counter += 1;
            if enemy.cooldown_counter < threshold {
                return EnemyAction::Idle;
            }
            enemy.cooldown_counter = 0;
        }

        let head = player.head();
        let distance = enemy.cell.manhattan_distance(head);
        if distance <= enemy.stats.attack_range {
            return EnemyAction::Attack;
        }

        let behavior = enemy.behavior();
        let shares_room =
            behavior.room_bound && enemy.home.map_or(false, |home| home.interior_contains(head));
        if distance <= enemy.stats.sight_range || shares_room {
            let steps = behavior
                .sprint
                .filter(|band| (band.min_distance..=band.max_distance).contains(&distance))
                .map_or(1, |band| band.steps.max(1));
            self.chase(enemy, head, steps, player, level, rng)
        } else {
            self.patrol(enemy, player, level, rng)
        }
    }

    fn chase<Q, P, R>(
        &mut self,
        enemy: &Enemy,
        head: CellCoord,
        steps: u32,
        player: &P,
        level: &Q,
        rng: &mut R,
    ) -> EnemyAction
    where
        Q: LevelQuery + ?Sized,
        P: PlayerView + ?Sized,
        R: Rng + ?Sized,
    {
        let mut cell = enemy.cell;
        for _ in 0..steps {
            if self.collect_steps(enemy, cell, head, player, level) {
                return EnemyAction::Attack;
            }
            let Some(best) = self.candidates.iter().copied().reduce(|best, candidate| {
                if candidate.precedes(&best) {
                    candidate
                } else {
                    best
                }
            }) else {
                break;
            };
            let chosen = if self.candidates.len() > 1 && rng.gen_bool(self.wander_chance) {
                self.candidates.choose(rng).copied().unwrap_or(best)
            } else {
                best
            };
            cell = chosen.cell;
            if cell.manhattan_distance(head) <= enemy.stats.attack_range {
                break;
            }
        }

        if cell == enemy.cell {
            EnemyAction::Idle
        } else {
            log::debug!("{} {:?} chases to {cell:?}", enemy.kind, enemy.id);
            EnemyAction::Move {
                from: enemy.cell,
                to: cell,
            }
        }
    }

    fn patrol<Q, P, R>(&mut self, enemy: &Enemy, player: &P, level: &Q, rng: &mut R) -> EnemyAction
    where
        Q: LevelQuery + ?Sized,
        P: PlayerView + ?Sized,
        R: Rng + ?Sized,
    {
        let head = player.head();
        if self.collect_steps(enemy, enemy.cell, head, player, level) {
            return EnemyAction::Attack;
        }
        let radius = enemy.stats.move_radius;
        if radius > 0 {
            // An enemy left outside its leash by a chase may still walk home.
            let current = enemy.cell.manhattan_distance(enemy.spawn);
            self.candidates.retain(|candidate| {
                let leash = candidate.cell.manhattan_distance(enemy.spawn);
                leash <= radius || leash < current
            });
        }
        match self.candidates.choose(rng) {
            Some(candidate) => EnemyAction::Move {
                from: enemy.cell,
                to: candidate.cell,
            },
            None => EnemyAction::Idle,
        }
    }

    /// Fills the workspace with valid steps from `from`.
    ///
    /// Returns `true` when one of the neighbours is the snake's head, which
    /// turns the step into an attack.
    fn collect_steps<Q, P>(
        &mut self,
        enemy: &Enemy,
        from: CellCoord,
        head: CellCoord,
        player: &P,
        level: &Q,
    ) -> bool
    where
        Q: LevelQuery + ?Sized,
        P: PlayerView + ?Sized,
    {
        self.candidates.clear();
        let room_bound = enemy.behavior().room_bound;
        for (order, direction) in Direction::ALL.into_iter().enumerate() {
            let cell = from.step(direction);
            if cell == head {
                return true;
            }
            if level.is_wall_at(cell)
                || level.enemy_at(cell, Some(enemy.id)).is_some()
                || player.is_snake_at(cell)
            {
                continue;
            }
            if room_bound && !enemy.home.map_or(true, |home| home.interior_contains(cell)) {
                continue;
            }
            self.candidates.push(Candidate {
                cell,
                distance: cell.manhattan_distance(head),
                order,
            });
        }
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Candidate {
    cell: CellCoord,
    distance: u32,
    order: usize,
}

impl Candidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance != other.distance {
            return self.distance < other.distance;
        }
        self.order < other.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closer_candidate_wins_and_ties_keep_direction_order() {
        let near = Candidate {
            cell: CellCoord::new(0, 0),
            distance: 2,
            order: 3,
        };
        let far = Candidate {
            cell: CellCoord::new(1, 0),
            distance: 4,
            order: 0,
        };
        let tied = Candidate {
            distance: 2,
            order: 1,
            ..far
        };
        assert!(near.precedes(&far));
        assert!(tied.precedes(&near));
        assert!(!near.precedes(&tied));
    }

    #[test]
    fn wander_chance_is_clamped() {
        assert_eq!(EnemyAi::new(3.0).wander_chance, 1.0);
        assert_eq!(EnemyAi::new(-1.0).wander_chance, 0.0);
    }
}
