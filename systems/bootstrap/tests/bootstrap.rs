use dungeon_snake_core::{Direction, ItemKind, PlayerView};
use dungeon_snake_system_bootstrap::{Bootstrap, Config, LevelOutcome};
use dungeon_snake_system_turn::TurnReport;
use dungeon_snake_world::{query, state::RunCarryover};

fn bootstrap(seed: u64) -> Bootstrap {
    let mut config = Config {
        seed,
        ..Config::default()
    };
    config.generation.target_rooms = 10;
    Bootstrap::new(config)
}

const SCRIPT: [Direction; 8] = [
    Direction::Right,
    Direction::Down,
    Direction::Right,
    Direction::Up,
    Direction::Left,
    Direction::Up,
    Direction::Right,
    Direction::Down,
];

fn replay(seed: u64) -> (Vec<TurnReport>, LevelOutcome, Vec<(i32, i32)>) {
    let bootstrap = bootstrap(seed);
    let mut session = bootstrap.start_level(&bootstrap.new_run());
    let mut reports = Vec::new();
    for turn in 0..40 {
        let direction = (turn % 3 == 0).then(|| SCRIPT[turn / 3 % SCRIPT.len()]);
        match session.turn(direction) {
            Some(report) => reports.push(report),
            None => break,
        }
    }
    let body = session
        .snake()
        .segments()
        .map(|cell| (cell.x(), cell.y()))
        .collect();
    (reports, session.outcome(), body)
}

#[test]
fn same_seed_replays_identically() {
    assert_eq!(replay(0xabcd), replay(0xabcd));
}

#[test]
fn snake_starts_centred_in_the_start_room() {
    let bootstrap = bootstrap(5);
    let session = bootstrap.start_level(&bootstrap.new_run());
    let dungeon = query::dungeon(session.world());
    let Some(start) = dungeon.start_room() else {
        panic!("level without start room");
    };
    assert_eq!(session.snake().head(), start.center());
    assert_eq!(session.snake().len(), 3);
    assert_eq!(session.snake().direction(), Direction::Right);
    assert_eq!(session.outcome(), LevelOutcome::InProgress);
    assert!(session.next_carryover().is_none());
}

#[test]
fn carried_length_arrives_as_growth() {
    let bootstrap = bootstrap(6);
    let carryover = RunCarryover {
        length: 6,
        ..bootstrap.new_run()
    };
    let session = bootstrap.start_level(&carryover);
    assert_eq!(session.snake().len(), 3);
    assert_eq!(session.snake().pending_growth(), 3);
}

#[test]
fn finished_levels_refuse_turns() {
    let bootstrap = bootstrap(7);
    let mut session = bootstrap.start_level(&bootstrap.new_run());
    // Driving straight right eventually meets a wall.
    for _ in 0..200 {
        if session.turn(Some(Direction::Right)).is_none() {
            break;
        }
    }
    assert_ne!(session.outcome(), LevelOutcome::InProgress);
    assert!(session.turn(Some(Direction::Down)).is_none());
}

#[test]
fn purchased_items_become_usable_inventory() {
    let bootstrap = bootstrap(8);
    let mut carryover = RunCarryover {
        coins: 20,
        ..bootstrap.new_run()
    };
    let bought = [ItemKind::Apple, ItemKind::Key, ItemKind::SmallBlueFlask];
    for item in bought {
        assert!(carryover.purchase(item).is_ok());
    }
    assert_eq!(carryover.coins, 20 - 2 - 8 - 4);
    assert!(carryover.purchase(ItemKind::Meat).is_err());

    let mut session = bootstrap.start_level(&carryover);
    assert_eq!(query::state(session.world()).inventory(), &bought);

    assert_eq!(session.use_item(0), Some(ItemKind::Apple));
    assert_eq!(session.snake().pending_growth(), 1);
    assert_eq!(session.use_item(0), None, "keys are kept for the exit");
    assert_eq!(session.use_item(1), Some(ItemKind::SmallBlueFlask));
    assert_eq!(query::state(session.world()).inventory(), &[ItemKind::Key]);
    assert!(!session.drain_events().is_empty());
}
