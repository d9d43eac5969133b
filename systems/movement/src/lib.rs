#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! The player's snake: body segments, occupancy and the single-step turn.

use std::collections::{HashSet, VecDeque};

use dungeon_snake_core::{
    CellCoord, DeathReason, Direction, EntityId, EntityRef, PlayerView, TurnHelpers,
    MIN_SNAKE_LENGTH,
};

/// Default number of buffered direction inputs.
pub const DEFAULT_QUEUE_CAPACITY: usize = 3;

/// How a single step of the snake resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The snake hit something fatal and its body was left untouched.
    Died(DeathReason),
    /// The head bumped into an enemy; the snake stayed in place.
    Collided(EntityId),
    /// The snake advanced one cell.
    Moved {
        /// Non-enemy entity found under the new head, if any.
        ate: Option<EntityRef>,
    },
}

impl MoveOutcome {
    /// Whether the outcome ends the run.
    #[must_use]
    pub const fn is_death(&self) -> bool {
        matches!(self, MoveOutcome::Died(_))
    }
}

/// Bounded buffer of pending direction changes.
#[derive(Clone, Debug)]
struct InputQueue {
    pending: VecDeque<Direction>,
    capacity: usize,
}

impl InputQueue {
    fn new(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Rejects repeats and reversals of the most recent intent, and drops
    /// inputs once the buffer is full.
    fn push(&mut self, direction: Direction, current: Direction) -> bool {
        let last = self.pending.back().copied().unwrap_or(current);
        if direction == last || direction == last.opposite() {
            return false;
        }
        if self.pending.len() >= self.capacity {
            return false;
        }
        self.pending.push_back(direction);
        true
    }

    fn pop(&mut self) -> Option<Direction> {
        self.pending.pop_front()
    }
}

/// The player-controlled snake.
///
/// `segments` holds the body from head to tail and `occupancy` mirrors it as
/// packed cell keys, so self-collision tests never scan the body.
#[derive(Clone, Debug)]
pub struct SnakeActor {
    segments: VecDeque<CellCoord>,
    occupancy: HashSet<u64>,
    direction: Direction,
    grow: u32,
    inputs: InputQueue,
}

impl SnakeActor {
    /// Lays out a straight snake whose head sits on `head` and whose body
    /// trails behind it, opposite to `direction`.
    #[must_use]
    pub fn new(head: CellCoord, direction: Direction, length: usize, queue_capacity: usize) -> Self {
        let (dx, dy) = direction.opposite().delta();
        let segments = (0..length.max(1))
            .map(|index| {
                let steps = index as i32;
                head.offset(dx * steps, dy * steps)
            })
            .collect();
        Self::assemble(segments, direction, queue_capacity)
    }

    /// Rebuilds a snake from explicit segments, head first.
    ///
    /// Returns `None` when the list is empty or covers a cell twice.
    #[must_use]
    pub fn from_segments(
        segments: Vec<CellCoord>,
        direction: Direction,
        queue_capacity: usize,
    ) -> Option<Self> {
        let unique: HashSet<u64> = segments.iter().map(|cell| cell.key()).collect();
        if segments.is_empty() || unique.len() != segments.len() {
            return None;
        }
        Some(Self::assemble(segments.into(), direction, queue_capacity))
    }

    fn assemble(segments: VecDeque<CellCoord>, direction: Direction, queue_capacity: usize) -> Self {
        let occupancy = segments.iter().map(|cell| cell.key()).collect();
        Self {
            segments,
            occupancy,
            direction,
            grow: 0,
            inputs: InputQueue::new(queue_capacity),
        }
    }

    /// Buffers a direction change for a later turn.
    pub fn enqueue(&mut self, direction: Direction) -> bool {
        self.inputs.push(direction, self.direction)
    }

    /// Body cells from head to tail.
    pub fn segments(&self) -> impl ExactSizeIterator<Item = CellCoord> + '_ {
        self.segments.iter().copied()
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the snake has no body. Never true for a constructed snake.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Current heading.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Segments still to be added by upcoming moves.
    #[must_use]
    pub const fn pending_growth(&self) -> u32 {
        self.grow
    }

    /// Last body cell.
    #[must_use]
    pub fn tail(&self) -> CellCoord {
        self.segments.back().copied().unwrap_or_default()
    }

    /// Whether the occupancy set covers exactly the body cells.
    #[must_use]
    pub fn occupancy_consistent(&self) -> bool {
        self.occupancy.len() == self.segments.len()
            && self
                .segments
                .iter()
                .all(|cell| self.occupancy.contains(&cell.key()))
    }

    /// Schedules growth applied one segment per move.
    pub fn grow(&mut self, segments: u32) {
        self.grow = self.grow.saturating_add(segments);
    }

    /// Releases up to `segments` cells of length.
    ///
    /// Pending growth is cancelled first; the body itself never drops below
    /// the minimum length. Returns how much length was actually given up.
    pub fn shrink(&mut self, segments: u32) -> u32 {
        let cancelled = segments.min(self.grow);
        self.grow -= cancelled;

        let mut released = cancelled;
        while released < segments && self.segments.len() > MIN_SNAKE_LENGTH {
            if let Some(tail) = self.segments.pop_back() {
                let _ = self.occupancy.remove(&tail.key());
                released += 1;
            }
        }
        if released < segments {
            log::debug!(
                "snake kept {} segments it was asked to release",
                segments - released
            );
        }
        released
    }

    /// Resolves one step.
    ///
    /// The heading comes from `direction`, else the input queue, else the
    /// current heading; a reversal is ignored. Checks run in order: wall,
    /// self, enemy, then the move is committed and whatever lies under the
    /// new head is handed to `on_eat`. The current tail does not count as an
    /// obstacle when it is about to move away.
    pub fn take_turn<H>(&mut self, direction: Option<Direction>, helpers: &mut H) -> MoveOutcome
    where
        H: TurnHelpers + ?Sized,
    {
        let requested = direction.or_else(|| self.inputs.pop());
        if let Some(requested) = requested {
            if requested != self.direction.opposite() {
                self.direction = requested;
            }
        }

        let new_head = self.head().step(self.direction);

        if helpers.is_wall_at(new_head) {
            log::debug!("snake hit a wall at {new_head:?}");
            helpers.on_wall_collision();
            return MoveOutcome::Died(DeathReason::Wall);
        }

        let tail_leaves = self.grow == 0;
        if self.occupancy.contains(&new_head.key()) && !(tail_leaves && new_head == self.tail()) {
            log::debug!("snake bit itself at {new_head:?}");
            helpers.on_self_collision();
            return MoveOutcome::Died(DeathReason::SelfCollision);
        }

        if let Some(enemy) = helpers.enemy_at(new_head, None) {
            helpers.on_collide(enemy);
            return MoveOutcome::Collided(enemy);
        }

        if tail_leaves {
            if let Some(tail) = self.segments.pop_back() {
                let _ = self.occupancy.remove(&tail.key());
            }
        } else {
            self.grow -= 1;
        }
        self.segments.push_front(new_head);
        let _ = self.occupancy.insert(new_head.key());

        let ate = helpers
            .entity_at(new_head)
            .filter(|entity| !entity.is_enemy());
        if let Some(entity) = ate {
            let outcome = helpers.on_eat(entity);
            self.grow(outcome.grow);
        }
        MoveOutcome::Moved { ate }
    }
}

impl PlayerView for SnakeActor {
    fn head(&self) -> CellCoord {
        self.segments.front().copied().unwrap_or_default()
    }

    fn is_snake_at(&self, cell: CellCoord) -> bool {
        self.occupancy.contains(&cell.key())
    }
}
