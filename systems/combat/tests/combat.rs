use dungeon_snake_core::{CellCoord, DeathReason, EnemyKind, Event, ItemKind, Tile};
use dungeon_snake_system_combat::{
    apply_item, player_damage, player_shield, tick_effects, Combat, StrikeOutcome, BOSS_SCORE,
    STRIKE_SCORE,
};
use dungeon_snake_world::{
    entities::EntityRegistry,
    state::{GameState, PlayerBase, RunCarryover},
    tiles::TileGrid,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn fresh_state() -> GameState {
    GameState::from_carryover(&RunCarryover::default(), &PlayerBase::default())
}

fn open_floor() -> TileGrid {
    let mut tiles = TileGrid::new();
    for y in 0..10 {
        for x in 0..10 {
            tiles.set(CellCoord::new(x, y), Tile::Floor);
        }
    }
    tiles
}

#[test]
fn skulls_fall_after_two_bites() {
    let mut state = fresh_state();
    let mut entities = EntityRegistry::new();
    let Some(skull) = entities.spawn_enemy(EnemyKind::Skull, CellCoord::new(3, 3), None, false)
    else {
        panic!("spawn failed");
    };
    let combat = Combat::new();
    let tiles = open_floor();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let first = combat.player_strikes(&tiles, &mut state, &mut entities, skull, &mut rng);
    assert_eq!(
        first,
        Some(StrikeOutcome::Wounded {
            dealt: 1,
            remaining: 1
        })
    );
    let second = combat.player_strikes(&tiles, &mut state, &mut entities, skull, &mut rng);
    assert_eq!(
        second,
        Some(StrikeOutcome::Defeated {
            dealt: 1,
            drop: None
        })
    );

    assert!(entities.enemy(skull).is_none());
    assert_eq!(state.score(), STRIKE_SCORE);
    let events = state.drain_events();
    assert!(events.contains(&Event::EnemyDefeated {
        enemy: skull,
        kind: EnemyKind::Skull,
        boss: false,
    }));
}

#[test]
fn boss_kill_drops_a_reward_and_opens_the_exit() {
    let mut state = fresh_state();
    let mut entities = EntityRegistry::new();
    let Some(exit) = entities.spawn_exit(CellCoord::new(0, 0), true) else {
        panic!("exit spawn failed");
    };
    let Some(boss) = entities.spawn_enemy(EnemyKind::Bat, CellCoord::new(5, 5), None, true) else {
        panic!("boss spawn failed");
    };
    let combat = Combat::new();
    let tiles = open_floor();
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    // A bat boss has two health and no shield.
    let _ = combat.player_strikes(&tiles, &mut state, &mut entities, boss, &mut rng);
    let outcome = combat.player_strikes(&tiles, &mut state, &mut entities, boss, &mut rng);

    let Some(StrikeOutcome::Defeated { drop: Some(drop), .. }) = outcome else {
        panic!("boss should have died with a drop, got {outcome:?}");
    };
    assert_eq!(entities.item(drop).map(|item| item.cell), Some(CellCoord::new(5, 5)));
    assert_eq!(state.score(), BOSS_SCORE);
    assert_eq!(entities.exit().map(|exit| exit.locked), Some(false));
    assert!(state.drain_events().contains(&Event::ExitUnlocked { exit }));
}

#[test]
fn boss_reward_rolls_off_the_exit_it_died_on() {
    let mut state = fresh_state();
    let mut entities = EntityRegistry::new();
    let exit_cell = CellCoord::new(5, 5);
    let Some(exit) = entities.spawn_exit(exit_cell, true) else {
        panic!("exit spawn failed");
    };
    let Some(boss) = entities.spawn_enemy(EnemyKind::Bat, CellCoord::new(4, 5), None, true)
    else {
        panic!("boss spawn failed");
    };
    let Some(mut walked) = entities.enemy(boss).cloned() else {
        panic!("boss not stored");
    };
    walked.cell = exit_cell;
    entities.store_enemy(&walked);
    let combat = Combat::new();
    let tiles = open_floor();
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    let _ = combat.player_strikes(&tiles, &mut state, &mut entities, boss, &mut rng);
    let outcome = combat.player_strikes(&tiles, &mut state, &mut entities, boss, &mut rng);

    let Some(StrikeOutcome::Defeated { drop: Some(drop), .. }) = outcome else {
        panic!("boss should have died with a drop, got {outcome:?}");
    };
    let Some(landed) = entities.item(drop).map(|item| item.cell) else {
        panic!("drop was not registered");
    };
    assert_ne!(landed, exit_cell);
    assert!((landed.x() - 5).abs() <= 1 && (landed.y() - 5).abs() <= 1);
    assert_eq!(entities.exit().map(|exit| (exit.cell, exit.locked)), Some((exit_cell, false)));
    assert!(state.drain_events().contains(&Event::ExitUnlocked { exit }));
}

#[test]
fn garlic_only_helps_against_vampires() {
    let mut state = fresh_state();
    let used = apply_item(&mut state, ItemKind::Garlic);
    assert_eq!(used.grow, 1);
    assert_eq!(player_damage(&state, EnemyKind::Vampire), 2);
    assert_eq!(player_damage(&state, EnemyKind::Skull), 1);

    let _ = apply_item(&mut state, ItemKind::Jalapeno);
    assert_eq!(player_damage(&state, EnemyKind::Vampire), 3);
    assert_eq!(player_damage(&state, EnemyKind::Orc), 2);
}

#[test]
fn shields_soften_enemy_bites() {
    let mut state = fresh_state();
    let mut entities = EntityRegistry::new();
    let Some(orc) = entities.spawn_enemy(EnemyKind::Orc, CellCoord::new(1, 1), None, false) else {
        panic!("spawn failed");
    };
    let combat = Combat::new();

    assert_eq!(combat.enemy_strikes(&mut state, &mut entities, orc), Some(2));
    assert_eq!(state.health(), 3);

    let _ = apply_item(&mut state, ItemKind::SmallBlueFlask);
    assert_eq!(player_shield(&state), 1);
    assert_eq!(combat.enemy_strikes(&mut state, &mut entities, orc), Some(1));
    assert_eq!(state.health(), 2);
}

#[test]
fn vampires_heal_when_they_bite() {
    let mut state = fresh_state();
    let mut entities = EntityRegistry::new();
    let Some(vampire) = entities.spawn_enemy(EnemyKind::Vampire, CellCoord::new(1, 1), None, false)
    else {
        panic!("spawn failed");
    };
    let combat = Combat::new();
    let tiles = open_floor();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    // Base damage 1 against shield 2 still deals the minimum of 1.
    let _ = combat.player_strikes(&tiles, &mut state, &mut entities, vampire, &mut rng);
    assert_eq!(entities.enemy(vampire).map(|enemy| enemy.health), Some(3));

    let _ = combat.enemy_strikes(&mut state, &mut entities, vampire);
    assert_eq!(entities.enemy(vampire).map(|enemy| enemy.health), Some(4));

    let _ = combat.enemy_strikes(&mut state, &mut entities, vampire);
    assert_eq!(entities.enemy(vampire).map(|enemy| enemy.health), Some(4));
}

#[test]
fn repeated_bites_slay_the_player() {
    let mut state = fresh_state();
    let mut entities = EntityRegistry::new();
    let Some(orc) = entities.spawn_enemy(EnemyKind::Orc, CellCoord::new(1, 1), None, false) else {
        panic!("spawn failed");
    };
    let combat = Combat::new();

    for _ in 0..3 {
        let _ = combat.enemy_strikes(&mut state, &mut entities, orc);
    }
    assert_eq!(state.health(), 0);
    assert_eq!(state.death(), Some(DeathReason::Slain));
}

#[test]
fn temporary_length_is_returned_on_expiry() {
    let mut state = fresh_state();
    let used = apply_item(&mut state, ItemKind::BigBlueFlask);
    assert_eq!(used.grow, 3);

    for _ in 0..7 {
        assert_eq!(tick_effects(&mut state).shrink, 0);
    }
    assert_eq!(tick_effects(&mut state).shrink, 3);
    assert!(state.effects().is_empty());
}

#[test]
fn regeneration_heals_every_tick_until_it_expires() {
    let mut state = fresh_state();
    let mut entities = EntityRegistry::new();
    let Some(orc) = entities.spawn_enemy(EnemyKind::Orc, CellCoord::new(1, 1), None, false) else {
        panic!("spawn failed");
    };
    let combat = Combat::new();
    let _ = combat.enemy_strikes(&mut state, &mut entities, orc);
    let _ = combat.enemy_strikes(&mut state, &mut entities, orc);
    assert_eq!(state.health(), 1);

    let _ = apply_item(&mut state, ItemKind::BigRedFlask);
    assert_eq!(state.health(), 2);
    for expected in [3, 4, 5, 5] {
        let _ = tick_effects(&mut state);
        assert_eq!(state.health(), expected);
    }
    assert!(state.effects().is_empty());
}
