use dungeon_snake_core::{CellCoord, Direction, Room, RoomKind, Tile};
use dungeon_snake_system_generation::{catalog::RoomCatalog, generate, DungeonGraph, GenerationConfig};
use dungeon_snake_world::reachability::ReachabilityField;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn rooms_intersect(a: &Room, b: &Room) -> bool {
    a.x < b.x + b.width as i32
        && a.x + a.width as i32 > b.x
        && a.y < b.y + b.height as i32
        && a.y + a.height as i32 > b.y
}

fn within_gap(a: &Room, b: &Room, gap: i32) -> bool {
    a.x - gap < b.x + b.width as i32
        && a.x + a.width as i32 + gap > b.x
        && a.y - gap < b.y + b.height as i32
        && a.y + a.height as i32 + gap > b.y
}

/// Empty cells between the facing edges of `hub` and `room` along `direction`.
fn corridor_span(hub: &Room, room: &Room, direction: Direction) -> i32 {
    match direction {
        Direction::Right => room.x - (hub.x + hub.width as i32),
        Direction::Left => hub.x - (room.x + room.width as i32),
        Direction::Down => room.y - (hub.y + hub.height as i32),
        Direction::Up => hub.y - (room.y + room.height as i32),
    }
}

#[test]
fn same_seed_reproduces_identical_dungeon() {
    let first = generate(18, &mut ChaCha8Rng::seed_from_u64(0x5eed));
    let second = generate(18, &mut ChaCha8Rng::seed_from_u64(0x5eed));

    assert_eq!(first.rooms(), second.rooms());
    assert_eq!(first.tiles(), second.tiles());
    assert_eq!(first.bounds(), second.bounds());
}

#[test]
fn different_seeds_diverge() {
    let first = generate(18, &mut ChaCha8Rng::seed_from_u64(1));
    let second = generate(18, &mut ChaCha8Rng::seed_from_u64(2));
    assert_ne!(first.tiles(), second.tiles());
}

#[test]
fn growth_stops_at_target_room_count() {
    let config = GenerationConfig {
        target_rooms: 6,
        secret_rooms: (0, 0),
        ..GenerationConfig::default()
    };
    let graph = DungeonGraph::new(config, RoomCatalog::default());
    let dungeon = graph.generate(&mut ChaCha8Rng::seed_from_u64(77));
    assert!(dungeon.rooms().len() <= 6);
    assert!(dungeon.rooms().iter().all(|room| !room.is_secret));
}

#[test]
fn inverted_jitter_falls_back_to_its_lower_bound() {
    let config = GenerationConfig {
        spacing_jitter: (4, -3),
        ..GenerationConfig::default()
    };
    let graph = DungeonGraph::new(config, RoomCatalog::default());
    let dungeon = graph.generate(&mut ChaCha8Rng::seed_from_u64(12));
    assert!(dungeon.rooms().len() > 1);
    assert!(dungeon.unreachable_rooms().is_empty());
}

#[test]
fn start_room_sits_at_origin() {
    let dungeon = generate(12, &mut ChaCha8Rng::seed_from_u64(9));
    let start = &dungeon.rooms()[0];
    assert_eq!(start.id, dungeon.start());
    assert_eq!((start.x, start.y), (0, 0));
    assert_eq!((start.width, start.height), (9, 9));
    assert_eq!(start.kind, RoomKind::Start);
    assert_eq!(start.depth, 0);
}

#[test]
fn doors_border_a_room_and_an_open_tile() {
    let dungeon = generate(15, &mut ChaCha8Rng::seed_from_u64(31));
    for door in dungeon.tiles().cells_with(Tile::Door) {
        let meta = dungeon.meta().get(door).copied().unwrap_or_default();
        assert!(meta.is_connection, "door at {door:?} lacks connection metadata");
        let open_neighbours = dungeon_snake_core::Direction::ALL
            .into_iter()
            .filter(|direction| dungeon.tiles().is_open(door.step(*direction)))
            .count();
        assert!(open_neighbours >= 1, "door at {door:?} leads nowhere");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_room_is_reachable_from_the_start(seed in any::<u64>(), target in 1_usize..=24) {
        let dungeon = generate(target, &mut ChaCha8Rng::seed_from_u64(seed));
        let unreachable = dungeon.unreachable_rooms();
        prop_assert!(
            unreachable.is_empty(),
            "seed={seed}, target={target} left rooms {unreachable:?} unreachable"
        );
    }

    #[test]
    fn rooms_never_overlap(seed in any::<u64>()) {
        let dungeon = generate(20, &mut ChaCha8Rng::seed_from_u64(seed));
        let rooms = dungeon.rooms();
        for (index, room) in rooms.iter().enumerate() {
            for other in &rooms[index + 1..] {
                prop_assert!(
                    !rooms_intersect(room, other),
                    "seed={seed}: rooms {} and {} overlap",
                    room.id.get(),
                    other.id.get()
                );
            }
        }
    }

    #[test]
    fn special_rooms_stay_leaf_like(seed in any::<u64>()) {
        let dungeon = generate(20, &mut ChaCha8Rng::seed_from_u64(seed));
        for room in dungeon.rooms() {
            match room.kind {
                RoomKind::Treasure => {
                    prop_assert_eq!(room.connection_count(), 1);
                }
                RoomKind::Boss => {
                    prop_assert!(room.connection_count() <= 2);
                }
                _ => {}
            }
        }
        let bosses = dungeon.rooms().iter().filter(|room| room.kind == RoomKind::Boss).count();
        prop_assert!(bosses <= 1);
    }

    #[test]
    fn secret_rooms_hang_off_busy_hubs(seed in any::<u64>()) {
        let config = GenerationConfig {
            secret_rooms: (2, 2),
            ..GenerationConfig::default()
        };
        let (shortest, longest) = config.secret_corridor;
        let gap = config.secret_gap;
        let graph = DungeonGraph::new(config, RoomCatalog::default());
        let dungeon = graph.generate(&mut ChaCha8Rng::seed_from_u64(seed));
        let Some(start) = dungeon.start_room() else {
            panic!("seed={seed}: dungeon without a start room");
        };
        let field = ReachabilityField::flood(dungeon.tiles(), start.center());

        for room in dungeon.rooms().iter().filter(|room| room.is_secret) {
            prop_assert_eq!(room.kind, RoomKind::Secret);
            prop_assert_eq!(room.connection_count(), 1);
            let link = room.connections[0];
            let direction = link.direction.opposite();
            let Some(hub) = dungeon.room(link.room) else {
                panic!("seed={seed}: secret room {} links to a missing room", room.id.get());
            };

            prop_assert!(!hub.is_secret);
            prop_assert!(!matches!(hub.kind, RoomKind::Boss | RoomKind::Treasure));
            let ordinary_links = hub
                .connections
                .iter()
                .filter(|connection| {
                    dungeon.room(connection.room).is_some_and(|other| !other.is_secret)
                })
                .count();
            prop_assert!(
                ordinary_links >= 3,
                "seed={seed}: hub {} had only {ordinary_links} links",
                hub.id.get()
            );
            let toward = hub
                .connections
                .iter()
                .filter(|connection| connection.direction == direction)
                .count();
            prop_assert_eq!(toward, 1, "seed={}: hub {} reuses {:?}", seed, hub.id.get(), direction);
            prop_assert_eq!(room.depth, hub.depth + 1);

            let span = corridor_span(hub, room, direction);
            prop_assert!(
                (shortest..=longest).contains(&span),
                "seed={seed}: secret room {} sits {span} cells away",
                room.id.get()
            );

            for other in dungeon.rooms().iter().filter(|other| other.id != room.id) {
                prop_assert!(
                    !within_gap(room, other, gap),
                    "seed={seed}: secret room {} crowds room {}",
                    room.id.get(),
                    other.id.get()
                );
            }

            let rect = room.rect();
            for y in rect.origin().y()..rect.origin().y() + rect.height() as i32 {
                for x in rect.origin().x()..rect.origin().x() + rect.width() as i32 {
                    let cell = CellCoord::new(x, y);
                    if dungeon.tiles().get(cell) == Some(Tile::Floor) {
                        prop_assert!(field.contains(cell), "seed={seed}: {cell:?} is cut off");
                    }
                }
            }
        }
    }
}
