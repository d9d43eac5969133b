use std::collections::{BTreeMap, HashSet};

use dungeon_snake_core::{
    CellCoord, DeathReason, Direction, EatOutcome, Enemy, EnemyKind, EntityId, EntityRef,
    LevelQuery, TurnEnd, TurnHelpers,
};
use dungeon_snake_system_enemy_ai::{EnemyAction, EnemyAi};
use dungeon_snake_system_movement::{MoveOutcome, SnakeActor};
use dungeon_snake_system_turn::{TurnEngine, TurnStatus};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Default)]
struct Scene {
    walls: HashSet<CellCoord>,
    enemies: BTreeMap<EntityId, Enemy>,
    roster: Vec<EntityId>,
    attacks: Vec<EntityId>,
    health: u32,
    double: bool,
    shrink_next: u32,
    end_turns: u32,
    wall_hits: u32,
}

impl Scene {
    fn new() -> Self {
        Self {
            health: 5,
            ..Self::default()
        }
    }

    fn add_enemy(&mut self, id: u32, kind: EnemyKind, x: i32, y: i32) -> EntityId {
        let id = EntityId::new(id);
        let _ = self
            .enemies
            .insert(id, Enemy::new(id, kind, CellCoord::new(x, y), None));
        self.roster.push(id);
        id
    }

    fn enemy_cell(&self, id: EntityId) -> Option<CellCoord> {
        self.enemies.get(&id).map(|enemy| enemy.cell)
    }
}

impl LevelQuery for Scene {
    fn is_wall_at(&self, cell: CellCoord) -> bool {
        self.walls.contains(&cell)
    }

    fn entity_at(&self, cell: CellCoord) -> Option<EntityRef> {
        self.enemy_at(cell, None).map(|id| EntityRef::Enemy { id })
    }

    fn enemy_at(&self, cell: CellCoord, exclude: Option<EntityId>) -> Option<EntityId> {
        self.enemies
            .values()
            .find(|enemy| enemy.cell == cell && Some(enemy.id) != exclude)
            .map(|enemy| enemy.id)
    }
}

impl TurnHelpers for Scene {
    fn on_eat(&mut self, _entity: EntityRef) -> EatOutcome {
        EatOutcome::default()
    }

    fn on_collide(&mut self, _enemy: EntityId) {}

    fn on_enemy_attack(&mut self, enemy: EntityId) {
        self.attacks.push(enemy);
        self.health = self.health.saturating_sub(1);
    }

    fn on_self_collision(&mut self) {}

    fn on_wall_collision(&mut self) {
        self.wall_hits += 1;
    }

    fn skip_enemy_turn(&self) -> bool {
        false
    }

    fn double_move(&self) -> bool {
        self.double
    }

    fn enemy_roster(&self) -> Vec<EntityId> {
        self.roster.clone()
    }

    fn enemy(&self, id: EntityId) -> Option<Enemy> {
        self.enemies.get(&id).cloned()
    }

    fn store_enemy(&mut self, enemy: &Enemy) {
        let _ = self.enemies.insert(enemy.id, enemy.clone());
    }

    fn player_alive(&self) -> bool {
        self.health > 0
    }

    fn end_turn(&mut self) -> TurnEnd {
        self.end_turns += 1;
        TurnEnd {
            shrink: std::mem::take(&mut self.shrink_next),
        }
    }
}

fn engine_facing_left() -> TurnEngine {
    let body = vec![CellCoord::new(0, 0), CellCoord::new(1, 0), CellCoord::new(2, 0)];
    let Some(snake) = SnakeActor::from_segments(body, Direction::Left, 3) else {
        panic!("valid body rejected");
    };
    TurnEngine::new(snake, EnemyAi::new(0.0))
}

fn body(engine: &TurnEngine) -> Vec<CellCoord> {
    engine.snake().segments().collect()
}

#[test]
fn locked_engine_changes_nothing() {
    let mut engine = engine_facing_left();
    let mut scene = Scene::new();
    let skull = scene.add_enemy(1, EnemyKind::Skull, -3, 0);
    let before = body(&engine);

    engine.lock();
    let report = engine.process_turn(None, &mut scene, &mut ChaCha8Rng::seed_from_u64(1));

    assert_eq!(report.status, TurnStatus::Skipped);
    assert!(report.moves.is_empty());
    assert_eq!(body(&engine), before);
    assert_eq!(scene.enemy_cell(skull), Some(CellCoord::new(-3, 0)));
    assert_eq!(scene.end_turns, 0);
    assert!(engine.is_locked());

    engine.unlock();
    let report = engine.process_turn(None, &mut scene, &mut ChaCha8Rng::seed_from_u64(1));
    assert_eq!(report.status, TurnStatus::Resolved);
    assert!(!engine.is_locked());
}

#[test]
fn death_skips_the_enemy_phase() {
    let mut engine = engine_facing_left();
    let mut scene = Scene::new();
    let _ = scene.walls.insert(CellCoord::new(-1, 0));
    let skull = scene.add_enemy(1, EnemyKind::Skull, -1, 3);

    let report = engine.process_turn(None, &mut scene, &mut ChaCha8Rng::seed_from_u64(2));

    assert_eq!(report.status, TurnStatus::PlayerDied(DeathReason::Wall));
    assert!(report.enemies.is_empty());
    assert_eq!(scene.enemy_cell(skull), Some(CellCoord::new(-1, 3)));
    assert_eq!(scene.end_turns, 0);
    assert_eq!(scene.wall_hits, 1);
}

#[test]
fn enemies_resolve_sequentially_after_the_player() {
    let mut engine = engine_facing_left();
    let mut scene = Scene::new();
    let first = scene.add_enemy(1, EnemyKind::Skull, -1, 3);
    let second = scene.add_enemy(2, EnemyKind::Skull, -1, 4);

    let report = engine.process_turn(None, &mut scene, &mut ChaCha8Rng::seed_from_u64(3));

    assert_eq!(report.status, TurnStatus::Resolved);
    assert_eq!(report.moves, vec![MoveOutcome::Moved { ate: None }]);
    assert_eq!(scene.enemy_cell(first), Some(CellCoord::new(-1, 2)));
    // The second skull steps into the cell the first one just vacated.
    assert_eq!(scene.enemy_cell(second), Some(CellCoord::new(-1, 3)));
    assert_eq!(report.enemies.len(), 2);
    assert_eq!(scene.end_turns, 1);
}

#[test]
fn adjacent_enemies_attack_instead_of_moving() {
    let mut engine = engine_facing_left();
    let mut scene = Scene::new();
    let skull = scene.add_enemy(1, EnemyKind::Skull, -1, 1);

    let report = engine.process_turn(None, &mut scene, &mut ChaCha8Rng::seed_from_u64(4));

    assert_eq!(report.enemies[0].action, EnemyAction::Attack);
    assert_eq!(scene.attacks, vec![skull]);
    assert_eq!(scene.enemy_cell(skull), Some(CellCoord::new(-1, 1)));
}

#[test]
fn fatal_attack_ends_the_turn_before_effects_tick() {
    let mut engine = engine_facing_left();
    let mut scene = Scene::new();
    scene.health = 1;
    let _ = scene.add_enemy(1, EnemyKind::Skull, -1, 1);
    let bystander = scene.add_enemy(2, EnemyKind::Skull, -4, 0);

    let report = engine.process_turn(None, &mut scene, &mut ChaCha8Rng::seed_from_u64(5));

    assert_eq!(report.status, TurnStatus::PlayerDied(DeathReason::Slain));
    assert_eq!(report.enemies.len(), 1);
    assert_eq!(scene.enemy_cell(bystander), Some(CellCoord::new(-4, 0)));
    assert_eq!(scene.end_turns, 0);
}

#[test]
fn double_move_runs_enemies_and_effects_once() {
    let mut engine = engine_facing_left();
    let mut scene = Scene::new();
    scene.double = true;
    let skull = scene.add_enemy(1, EnemyKind::Skull, -6, 3);

    let report = engine.process_turn(None, &mut scene, &mut ChaCha8Rng::seed_from_u64(6));

    assert_eq!(report.moves.len(), 2);
    assert_eq!(
        body(&engine),
        vec![CellCoord::new(-2, 0), CellCoord::new(-1, 0), CellCoord::new(0, 0)]
    );
    assert_eq!(report.enemies.len(), 1);
    assert_ne!(scene.enemy_cell(skull), Some(CellCoord::new(-6, 3)));
    assert_eq!(scene.end_turns, 1);
}

#[test]
fn expiring_length_is_released_at_turn_end() {
    let body = (0..6).map(|x| CellCoord::new(x, 0)).collect();
    let Some(snake) = SnakeActor::from_segments(body, Direction::Left, 3) else {
        panic!("valid body rejected");
    };
    let mut engine = TurnEngine::new(snake, EnemyAi::default());
    let mut scene = Scene::new();
    scene.shrink_next = 2;

    let report = engine.process_turn(None, &mut scene, &mut ChaCha8Rng::seed_from_u64(7));

    assert_eq!(report.released, 2);
    assert_eq!(engine.snake().len(), 4);
}
