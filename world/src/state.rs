//! Player-facing game state with change notifications, plus run carryover.

use dungeon_snake_core::{ActiveEffect, DeathReason, EffectKind, Event, ItemKind, MIN_SNAKE_LENGTH};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of purchased items a run may carry into the next level.
pub const BACKLOG_CAPACITY: usize = 3;

/// Owned game state for a single level.
///
/// Every mutation goes through a typed setter that records an [`Event`];
/// presentation layers drain the queue after each turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    level: u32,
    score: u32,
    coins: u32,
    health: u32,
    max_health: u32,
    base_damage: u32,
    shield: u32,
    length: usize,
    effects: Vec<ActiveEffect>,
    inventory: Vec<ItemKind>,
    death: Option<DeathReason>,
    completed: bool,
    events: Vec<Event>,
}

impl GameState {
    /// Builds the state for a level from the carried-over run values.
    #[must_use]
    pub fn from_carryover(carryover: &RunCarryover, base: &PlayerBase) -> Self {
        let max_health = base.max_health.saturating_add(carryover.bonus_max_health);
        Self {
            level: carryover.level,
            score: carryover.score,
            coins: carryover.coins,
            health: max_health,
            max_health,
            base_damage: base.damage.saturating_add(carryover.bonus_damage),
            shield: carryover.bonus_shield,
            length: carryover.length.max(MIN_SNAKE_LENGTH),
            effects: Vec::new(),
            inventory: carryover.backlog.clone(),
            death: None,
            completed: false,
            events: Vec::new(),
        }
    }

    /// Level being played.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Current score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Coins held.
    #[must_use]
    pub const fn coins(&self) -> u32 {
        self.coins
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Damage dealt before effects.
    #[must_use]
    pub const fn base_damage(&self) -> u32 {
        self.base_damage
    }

    /// Permanent shield.
    #[must_use]
    pub const fn shield(&self) -> u32 {
        self.shield
    }

    /// Last reported snake length.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// Active effects in application order.
    #[must_use]
    pub fn effects(&self) -> &[ActiveEffect] {
        &self.effects
    }

    /// Sum of the values of active effects of the given kind.
    #[must_use]
    pub fn effect_total(&self, kind: EffectKind) -> u32 {
        self.effects
            .iter()
            .filter(|effect| effect.kind == kind)
            .map(|effect| effect.value)
            .sum()
    }

    /// Whether any effect of the given kind is active.
    #[must_use]
    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|effect| effect.kind == kind)
    }

    /// Items available for use.
    #[must_use]
    pub fn inventory(&self) -> &[ItemKind] {
        &self.inventory
    }

    /// Whether the player is still alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.death.is_none()
    }

    /// Cause of death, once dead.
    #[must_use]
    pub const fn death(&self) -> Option<DeathReason> {
        self.death
    }

    /// Whether the level was completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Adds points to the score.
    pub fn add_score(&mut self, points: u32) {
        if points == 0 {
            return;
        }
        self.score = self.score.saturating_add(points);
        self.events.push(Event::ScoreChanged {
            delta: points,
            total: self.score,
        });
    }

    /// Adds or removes coins, never dropping below zero.
    pub fn change_coins(&mut self, delta: i32) {
        let updated = self.coins.saturating_add_signed(delta);
        if updated == self.coins {
            return;
        }
        let applied = signed_difference(updated, self.coins);
        self.coins = updated;
        self.events.push(Event::CoinsChanged {
            delta: applied,
            total: self.coins,
        });
    }

    /// Heals or damages the player, clamped to `0..=max_health`.
    pub fn change_health(&mut self, delta: i32) {
        let updated = self.health.saturating_add_signed(delta).min(self.max_health);
        if updated == self.health {
            return;
        }
        let applied = signed_difference(updated, self.health);
        self.health = updated;
        self.events.push(Event::HealthChanged {
            delta: applied,
            current: self.health,
            maximum: self.max_health,
        });
    }

    /// Records the snake's current length.
    pub fn set_length(&mut self, length: usize) {
        if length == self.length {
            return;
        }
        let delta = i32::try_from(length).unwrap_or(i32::MAX)
            - i32::try_from(self.length).unwrap_or(i32::MAX);
        self.length = length;
        self.events.push(Event::LengthChanged {
            delta,
            length: self.length,
        });
    }

    /// Appends a timed effect.
    pub fn push_effect(&mut self, effect: ActiveEffect) {
        self.effects.push(effect);
        self.publish_effects();
    }

    /// Replaces the active effects list.
    pub fn replace_effects(&mut self, effects: Vec<ActiveEffect>) {
        if effects == self.effects {
            return;
        }
        self.effects = effects;
        self.publish_effects();
    }

    fn publish_effects(&mut self) {
        self.events.push(Event::EffectsChanged {
            effects: self.effects.clone(),
        });
    }

    /// Adds an item to the inventory.
    pub fn add_to_inventory(&mut self, item: ItemKind) {
        self.inventory.push(item);
        self.publish_inventory();
    }

    /// Removes and returns the inventory item at `index`.
    pub fn take_from_inventory(&mut self, index: usize) -> Option<ItemKind> {
        if index >= self.inventory.len() {
            return None;
        }
        let item = self.inventory.remove(index);
        self.publish_inventory();
        Some(item)
    }

    /// Removes the first inventory item of the given kind.
    pub fn take_kind_from_inventory(&mut self, kind: ItemKind) -> bool {
        let Some(index) = self.inventory.iter().position(|item| *item == kind) else {
            return false;
        };
        self.take_from_inventory(index).is_some()
    }

    fn publish_inventory(&mut self) {
        self.events.push(Event::InventoryChanged {
            items: self.inventory.clone(),
        });
    }

    /// Records a non-state notification such as a kill or pickup.
    pub fn notify(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Ends the run. Later calls keep the first reason.
    pub fn mark_dead(&mut self, reason: DeathReason) {
        if self.death.is_some() {
            return;
        }
        self.death = Some(reason);
        self.events.push(Event::PlayerDied { reason });
    }

    /// Marks the level as completed.
    pub fn mark_completed(&mut self) {
        if self.completed {
            return;
        }
        self.completed = true;
        self.events.push(Event::LevelCompleted { level: self.level });
    }

    /// Takes every event recorded since the previous drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

fn signed_difference(after: u32, before: u32) -> i32 {
    let delta = i64::from(after) - i64::from(before);
    i32::try_from(delta).unwrap_or(if delta < 0 { i32::MIN } else { i32::MAX })
}

/// Baseline player statistics before carryover bonuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerBase {
    /// Health at level start.
    pub max_health: u32,
    /// Damage dealt per bite.
    pub damage: u32,
}

impl Default for PlayerBase {
    fn default() -> Self {
        Self {
            max_health: 5,
            damage: 1,
        }
    }
}

/// Values persisted between levels and the shop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunCarryover {
    /// Level about to be played.
    pub level: u32,
    /// Coins held.
    pub coins: u32,
    /// Accumulated score.
    pub score: u32,
    /// Snake length to start the level with.
    pub length: usize,
    /// Permanent bonus to maximum health.
    pub bonus_max_health: u32,
    /// Permanent bonus to damage.
    pub bonus_damage: u32,
    /// Permanent shield.
    pub bonus_shield: u32,
    /// Purchased items waiting to become inventory.
    pub backlog: Vec<ItemKind>,
}

impl Default for RunCarryover {
    fn default() -> Self {
        Self {
            level: 1,
            coins: 0,
            score: 0,
            length: MIN_SNAKE_LENGTH,
            bonus_max_health: 0,
            bonus_damage: 0,
            bonus_shield: 0,
            backlog: Vec::new(),
        }
    }
}

/// Errors raised when buying from the shop.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ShopError {
    /// The item cannot be bought.
    #[error("{0} is not for sale")]
    NotForSale(ItemKind),
    /// The run cannot afford the item.
    #[error("{item} costs {price} coins but only {available} are held")]
    InsufficientCoins {
        /// Item requested.
        item: ItemKind,
        /// Price of the item.
        price: u32,
        /// Coins held.
        available: u32,
    },
    /// Every backlog slot is taken.
    #[error("all {capacity} item slots are taken")]
    BacklogFull {
        /// Number of slots.
        capacity: usize,
    },
}

impl RunCarryover {
    /// Buys an item into the backlog.
    pub fn purchase(&mut self, item: ItemKind) -> Result<(), ShopError> {
        let price = item.properties().price;
        if price == 0 {
            return Err(ShopError::NotForSale(item));
        }
        if self.backlog.len() >= BACKLOG_CAPACITY {
            return Err(ShopError::BacklogFull {
                capacity: BACKLOG_CAPACITY,
            });
        }
        if self.coins < price {
            return Err(ShopError::InsufficientCoins {
                item,
                price,
                available: self.coins,
            });
        }
        self.coins -= price;
        self.backlog.push(item);
        log::info!("purchased {item} for {price} coins, {} left", self.coins);
        Ok(())
    }

    /// Carryover for the level after the one the state describes.
    ///
    /// Permanent bonuses survive; unused inventory returns to the backlog,
    /// trimmed to the slot capacity. `pending_growth` is length the snake is
    /// still owed. Segments lent by active temporary-length effects are
    /// returned before the length is carried.
    #[must_use]
    pub fn advance(&self, state: &GameState, pending_growth: usize) -> Self {
        let mut backlog = state.inventory().to_vec();
        backlog.truncate(BACKLOG_CAPACITY);
        let borrowed = usize::try_from(state.effect_total(EffectKind::TemporaryLength))
            .unwrap_or(usize::MAX);
        let length = state
            .length()
            .saturating_add(pending_growth)
            .saturating_sub(borrowed)
            .max(MIN_SNAKE_LENGTH);
        Self {
            level: state.level().saturating_add(1),
            coins: state.coins(),
            score: state.score(),
            length,
            bonus_max_health: self.bonus_max_health,
            bonus_damage: self.bonus_damage,
            bonus_shield: self.bonus_shield,
            backlog,
        }
    }
}
