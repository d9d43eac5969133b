//! Tile painting for rooms, corridors and the wall backfill.

use dungeon_snake_core::{Axis, CellCoord, CellRect, Connection, Direction, Room, RoomId, Tile};
use dungeon_snake_world::tiles::{TileGrid, TileMetaMap};

const NEIGHBORHOOD: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Rooms and tiles under construction.
#[derive(Debug, Default)]
pub(crate) struct Layout {
    pub(crate) rooms: Vec<Room>,
    pub(crate) tiles: TileGrid,
    pub(crate) meta: TileMetaMap,
}

impl Layout {
    pub(crate) fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.index())
    }

    pub(crate) fn connection_count(&self, id: RoomId) -> usize {
        self.room(id).map_or(0, Room::connection_count)
    }

    pub(crate) fn next_id(&self) -> RoomId {
        RoomId::new(u32::try_from(self.rooms.len()).unwrap_or(u32::MAX))
    }

    /// Registers the room and paints its tiles.
    pub(crate) fn push_room(&mut self, room: Room) -> RoomId {
        let id = room.id;
        self.paint_room(&room);
        self.rooms.push(room);
        id
    }

    /// Reports whether a `width`×`height` rectangle at (`x`, `y`) comes within
    /// `gap` cells of any placed room.
    pub(crate) fn overlaps_any(&self, x: i32, y: i32, width: u32, height: u32, gap: i32) -> bool {
        let (width, height) = (width as i32, height as i32);
        self.rooms.iter().any(|room| {
            x - gap < room.x + room.width as i32
                && x + width + gap > room.x
                && y - gap < room.y + room.height as i32
                && y + height + gap > room.y
        })
    }

    /// Records an undirected edge on both rooms.
    pub(crate) fn link(&mut self, from: RoomId, to: RoomId, direction: Direction) {
        if let Some(room) = self.rooms.get_mut(from.index()) {
            room.connections.push(Connection {
                room: to,
                direction,
            });
        }
        if let Some(room) = self.rooms.get_mut(to.index()) {
            room.connections.push(Connection {
                room: from,
                direction: direction.opposite(),
            });
        }
    }

    fn paint_room(&mut self, room: &Room) {
        let rect = room.rect();
        let (width, height) = (rect.width() as i32, rect.height() as i32);
        for dy in 0..height {
            for dx in 0..width {
                let cell = rect.origin().offset(dx, dy);
                let is_wall = !rect.interior_contains(cell);
                let is_corner = (dx == 0 || dx == width - 1) && (dy == 0 || dy == height - 1);
                let crossed = matches!(self.tiles.get(cell), Some(Tile::Corridor | Tile::Door));

                let tile = match (is_wall, crossed) {
                    (false, _) => Tile::Floor,
                    (true, true) => Tile::Door,
                    (true, false) => Tile::Wall,
                };
                self.tiles.set(cell, tile);

                let meta = self.meta.entry(cell);
                meta.room = Some(room.id);
                meta.is_wall = is_wall;
                meta.is_room = true;
                meta.is_corner = is_corner;
                meta.is_connection = tile == Tile::Door;
            }
        }
    }

    fn paint_door(&mut self, cell: CellCoord) {
        self.tiles.set(cell, Tile::Door);
        self.meta.entry(cell).is_connection = true;
    }

    fn paint_corridor(&mut self, cell: CellCoord, axis: Axis) {
        match self.tiles.get(cell) {
            Some(Tile::Floor | Tile::Door) => {}
            Some(Tile::Wall) => self.paint_door(cell),
            Some(Tile::Corridor) | None => {
                self.tiles.set(cell, Tile::Corridor);
                let meta = self.meta.entry(cell);
                meta.is_corridor = true;
                meta.corridor_direction = Some(axis);
            }
        }
    }

    /// Carves a `width`-wide corridor from `from` toward `to`, which lies in
    /// `direction`. Doors open on both facing walls; the corridor runs
    /// straight when the door centres line up and bends once at the midpoint
    /// otherwise.
    pub(crate) fn carve_corridor(&mut self, from: RoomId, to: RoomId, direction: Direction, width: u32) {
        let (Some(first), Some(second)) = (self.room(from), self.room(to)) else {
            return;
        };
        let (near, far) = match direction {
            Direction::Right | Direction::Down => (first.rect(), second.rect()),
            Direction::Left | Direction::Up => (second.rect(), first.rect()),
        };

        let frame = Frame(direction.axis());
        let half = (width / 2) as i32;
        let near_wall = frame.along_origin(near) + frame.along_length(near) - 1;
        let far_wall = frame.along_origin(far);
        let near_mid = frame.across_center(near);
        let far_mid = frame.across_center(far);

        for offset in -half..=half {
            self.paint_door(frame.cell(near_wall, near_mid + offset));
            self.paint_door(frame.cell(far_wall, far_mid + offset));
        }

        let start = near_wall + 1;
        let end = far_wall - 1;
        if near_mid == far_mid {
            self.run(frame, start, end, near_mid, half);
            return;
        }

        let turn = start + (end - start).div_euclid(2);
        self.run(frame, start, turn, near_mid, half);

        let bend = Frame(frame.cross_axis());
        self.run(
            bend,
            near_mid.min(far_mid),
            near_mid.max(far_mid),
            turn,
            half,
        );

        self.run(frame, turn + 1, end, far_mid, half);
    }

    fn run(&mut self, frame: Frame, start: i32, end: i32, across: i32, half: i32) {
        for along in start..=end {
            for offset in -half..=half {
                self.paint_corridor(frame.cell(along, across + offset), frame.0);
            }
        }
    }

    /// Surrounds every open tile with walls, then deletes the new walls that
    /// would sit between two open tiles.
    pub(crate) fn backfill_walls(&mut self) {
        let mut open: Vec<CellCoord> = self
            .tiles
            .iter()
            .filter(|(_, tile)| tile.is_open())
            .map(|(cell, _)| cell)
            .collect();
        open.sort();

        let mut added = Vec::new();
        for cell in open {
            for (dx, dy) in NEIGHBORHOOD {
                let neighbor = cell.offset(dx, dy);
                if self.tiles.set_if_void(neighbor, Tile::Wall) {
                    added.push(neighbor);
                }
            }
        }

        let blocking: Vec<CellCoord> = added
            .into_iter()
            .filter(|cell| blocks_open_path(&self.tiles, *cell))
            .collect();
        for cell in blocking {
            let _ = self.tiles.remove(cell);
        }
    }
}

fn blocks_open_path(tiles: &TileGrid, cell: CellCoord) -> bool {
    let open = |dx: i32, dy: i32| tiles.is_open(cell.offset(dx, dy));
    let void = |dx: i32, dy: i32| tiles.get(cell.offset(dx, dy)).is_none();

    if (open(-1, 0) && open(1, 0)) || (open(0, -1) && open(0, 1)) {
        return true;
    }

    let diagonal = (open(-1, -1) && open(1, 1)) || (open(1, -1) && open(-1, 1));
    let clear = (void(-1, 0) && void(1, 0)) || (void(0, -1) && void(0, 1));
    diagonal && clear
}

/// Maps (along, across) coordinates onto the grid for a travel axis.
#[derive(Clone, Copy, Debug)]
struct Frame(Axis);

impl Frame {
    fn cell(self, along: i32, across: i32) -> CellCoord {
        match self.0 {
            Axis::Horizontal => CellCoord::new(along, across),
            Axis::Vertical => CellCoord::new(across, along),
        }
    }

    fn cross_axis(self) -> Axis {
        match self.0 {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    fn along_origin(self, rect: CellRect) -> i32 {
        match self.0 {
            Axis::Horizontal => rect.origin().x(),
            Axis::Vertical => rect.origin().y(),
        }
    }

    fn along_length(self, rect: CellRect) -> i32 {
        match self.0 {
            Axis::Horizontal => rect.width() as i32,
            Axis::Vertical => rect.height() as i32,
        }
    }

    fn across_center(self, rect: CellRect) -> i32 {
        match self.0 {
            Axis::Horizontal => rect.center().y(),
            Axis::Vertical => rect.center().x(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_snake_core::RoomKind;

    fn layout_with(rooms: &[(i32, i32, u32, u32)]) -> Layout {
        let mut layout = Layout::default();
        for &(x, y, width, height) in rooms {
            let id = layout.next_id();
            let _ = layout.push_room(Room::new(id, RoomKind::Normal, x, y, width, height));
        }
        layout
    }

    #[test]
    fn straight_corridor_joins_aligned_rooms() {
        let mut layout = layout_with(&[(0, 0, 9, 9), (20, 0, 9, 9)]);
        layout.carve_corridor(RoomId::new(0), RoomId::new(1), Direction::Right, 3);

        for y in 3..=5 {
            assert_eq!(layout.tiles.get(CellCoord::new(8, y)), Some(Tile::Door));
            assert_eq!(layout.tiles.get(CellCoord::new(20, y)), Some(Tile::Door));
            for x in 9..=19 {
                assert_eq!(layout.tiles.get(CellCoord::new(x, y)), Some(Tile::Corridor));
            }
        }
        assert_eq!(layout.tiles.get(CellCoord::new(8, 2)), Some(Tile::Wall));
    }

    #[test]
    fn offset_rooms_get_a_single_bend_at_the_midpoint() {
        let mut layout = layout_with(&[(0, 0, 9, 9), (6, 20, 9, 9)]);
        layout.carve_corridor(RoomId::new(1), RoomId::new(0), Direction::Up, 3);

        // Top room door column is x=4, bottom room door column is x=10.
        // Corridor spans rows 9..=19, bending at row 14.
        let turn = 9 + (19 - 9) / 2;
        assert_eq!(layout.tiles.get(CellCoord::new(4, 8)), Some(Tile::Door));
        assert_eq!(layout.tiles.get(CellCoord::new(10, 20)), Some(Tile::Door));
        assert_eq!(layout.tiles.get(CellCoord::new(4, 9)), Some(Tile::Corridor));
        assert_eq!(layout.tiles.get(CellCoord::new(10, 19)), Some(Tile::Corridor));
        for x in 3..=10 {
            assert!(layout.tiles.is_open(CellCoord::new(x, turn)));
        }
        assert_eq!(
            layout
                .meta
                .get(CellCoord::new(7, turn))
                .and_then(|meta| meta.corridor_direction),
            Some(Axis::Horizontal)
        );
    }

    #[test]
    fn overlap_respects_gap() {
        let layout = layout_with(&[(0, 0, 10, 10)]);
        assert!(layout.overlaps_any(12, 0, 5, 5, 3));
        assert!(!layout.overlaps_any(13, 0, 5, 5, 3));
        assert!(layout.overlaps_any(13, 0, 5, 5, 4));
    }

    #[test]
    fn backfill_walls_in_corridors_without_cutting_them() {
        let mut layout = layout_with(&[(0, 0, 9, 9), (20, 0, 9, 9)]);
        layout.carve_corridor(RoomId::new(0), RoomId::new(1), Direction::Right, 3);
        layout.backfill_walls();

        for x in 9..=19 {
            assert_eq!(layout.tiles.get(CellCoord::new(x, 2)), Some(Tile::Wall));
            assert_eq!(layout.tiles.get(CellCoord::new(x, 6)), Some(Tile::Wall));
            assert!(layout.tiles.is_open(CellCoord::new(x, 4)));
        }
    }

    #[test]
    fn backfill_removes_walls_wedged_between_open_tiles() {
        let mut layout = Layout::default();
        layout.tiles.set(CellCoord::new(0, 0), Tile::Corridor);
        layout.tiles.set(CellCoord::new(2, 0), Tile::Corridor);
        layout.backfill_walls();
        assert_eq!(layout.tiles.get(CellCoord::new(1, 0)), None);
        assert_eq!(layout.tiles.get(CellCoord::new(1, 1)), Some(Tile::Wall));
    }
}
