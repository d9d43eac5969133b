//! Plain-text rendering of a level and its notifications.

use dungeon_snake_core::{CellCoord, EnemyKind, Event, ItemCategory, ItemKind, PlayerView};
use dungeon_snake_system_movement::SnakeActor;
use dungeon_snake_world::{query, World};

const VOID: char = ' ';
const SNAKE_HEAD: char = '@';
const SNAKE_BODY: char = 'o';
const BOSS: char = '&';

/// Draws the tiles, entities and snake of a level, one text row per map row.
pub(crate) fn render_level(world: &World, snake: Option<&SnakeActor>) -> String {
    let dungeon = query::dungeon(world);
    let Some(extent) = dungeon.tiles().extent() else {
        return String::new();
    };
    let width = extent.width() as usize;
    let height = extent.height() as usize;
    let mut canvas = vec![vec![VOID; width]; height];
    let mut plot = |cell: CellCoord, glyph: char| {
        let column = usize::try_from(cell.x() - extent.min_x).ok();
        let row = usize::try_from(cell.y() - extent.min_y).ok();
        if let (Some(column), Some(row)) = (column, row) {
            if let Some(slot) = canvas.get_mut(row).and_then(|line| line.get_mut(column)) {
                *slot = glyph;
            }
        }
    };

    for (cell, tile) in dungeon.tiles().iter() {
        plot(cell, tile.symbol());
    }
    let entities = query::entities(world);
    for item in entities.items() {
        plot(item.cell, item_glyph(item.kind));
    }
    if let Some(exit) = entities.exit() {
        plot(exit.cell, if exit.locked { 'X' } else { 'E' });
    }
    for enemy in entities.enemies() {
        let glyph = if enemy.is_boss {
            BOSS
        } else {
            enemy_glyph(enemy.kind)
        };
        plot(enemy.cell, glyph);
    }
    if let Some(snake) = snake {
        for segment in snake.segments() {
            plot(segment, SNAKE_BODY);
        }
        plot(snake.head(), SNAKE_HEAD);
    }

    canvas
        .into_iter()
        .map(|line| line.into_iter().collect::<String>().trim_end().to_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

fn item_glyph(kind: ItemKind) -> char {
    match kind.category() {
        ItemCategory::Food => '%',
        ItemCategory::Potion => '!',
        ItemCategory::Coin => '$',
        ItemCategory::Key => 'k',
    }
}

fn enemy_glyph(kind: EnemyKind) -> char {
    match kind {
        EnemyKind::Skull => 'S',
        EnemyKind::Vampire => 'V',
        EnemyKind::Slime => 'J',
        EnemyKind::Bat => 'B',
        EnemyKind::Orc => 'O',
    }
}

/// One-line description of a notification.
pub(crate) fn describe(event: &Event) -> String {
    match event {
        Event::ScoreChanged { delta, total } => format!("score +{delta} ({total})"),
        Event::HealthChanged {
            delta,
            current,
            maximum,
        } => format!("health {delta:+} ({current}/{maximum})"),
        Event::LengthChanged { delta, length } => format!("length {delta:+} ({length})"),
        Event::CoinsChanged { delta, total } => format!("coins {delta:+} ({total})"),
        Event::EffectsChanged { effects } => {
            let active: Vec<String> = effects
                .iter()
                .map(|effect| format!("{:?} {}t", effect.kind, effect.turns_left))
                .collect();
            format!("effects [{}]", active.join(", "))
        }
        Event::InventoryChanged { items } => {
            let names: Vec<&str> = items.iter().map(|item| item.name()).collect();
            format!("inventory [{}]", names.join(", "))
        }
        Event::ItemCollected { kind, .. } => format!("picked up {kind}"),
        Event::EnemyDamaged {
            enemy,
            dealt,
            remaining,
        } => format!("hit enemy {} for {dealt}, {remaining} left", enemy.get()),
        Event::EnemyDefeated { kind, boss, .. } => {
            if *boss {
                format!("defeated the {kind} boss")
            } else {
                format!("defeated a {kind}")
            }
        }
        Event::PlayerAttacked { enemy, dealt } => {
            format!("enemy {} bit for {dealt}", enemy.get())
        }
        Event::PlayerDied { reason } => format!("died ({})", reason.label()),
        Event::ExitUnlocked { .. } => "the exit is open".to_owned(),
        Event::LevelCompleted { level } => format!("level {level} completed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_snake_core::{DeathReason, Direction, EntityId, Room, RoomId, RoomKind, Tile};
    use dungeon_snake_world::{
        entities::EntityRegistry,
        state::{GameState, PlayerBase, RunCarryover},
        tiles::{TileGrid, TileMetaMap},
        Dungeon,
    };

    fn small_world() -> World {
        let room = Room::new(RoomId::new(0), RoomKind::Start, 0, 0, 6, 4);
        let mut tiles = TileGrid::new();
        for y in 0..4 {
            for x in 0..6 {
                let cell = CellCoord::new(x, y);
                let tile = if room.rect().interior_contains(cell) {
                    Tile::Floor
                } else {
                    Tile::Wall
                };
                tiles.set(cell, tile);
            }
        }
        let mut entities = EntityRegistry::new();
        let _ = entities.spawn_item(ItemKind::Coin, CellCoord::new(4, 1), 2);
        let _ = entities.spawn_exit(CellCoord::new(4, 2), true);
        World::new(
            Dungeon::new(vec![room], RoomId::new(0), tiles, TileMetaMap::new()),
            entities,
            GameState::from_carryover(&RunCarryover::default(), &PlayerBase::default()),
        )
    }

    #[test]
    fn level_draws_tiles_entities_and_snake() {
        let world = small_world();
        let body = vec![CellCoord::new(2, 1), CellCoord::new(1, 1), CellCoord::new(1, 2)];
        let snake = SnakeActor::from_segments(body, Direction::Right, 3).expect("snake");

        let rendered = render_level(&world, Some(&snake));
        assert_eq!(rendered, "######\n#o@.$#\n#o..X#\n######");
    }

    #[test]
    fn notifications_read_naturally() {
        assert_eq!(
            describe(&Event::PlayerDied {
                reason: DeathReason::SelfCollision
            }),
            "died (self)"
        );
        assert_eq!(
            describe(&Event::HealthChanged {
                delta: -2,
                current: 3,
                maximum: 5
            }),
            "health -2 (3/5)"
        );
        assert_eq!(
            describe(&Event::ItemCollected {
                item: EntityId::new(4),
                kind: ItemKind::Garlic
            }),
            "picked up garlic"
        );
    }
}
