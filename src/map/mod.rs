//! Level layout: a wall grid with rectangular rooms joined by L-shaped
//! tunnels.

use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;

pub const DEFAULT_MAP_WIDTH: i32 = 80;
pub const DEFAULT_MAP_HEIGHT: i32 = 48;

const ROOM_ATTEMPTS: usize = 30;
/// Solid rock kept between any two rooms, so monsters in one room have to
/// come round through a tunnel to reach the next.
const ROOM_GAP: i32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub blocks_move: bool,
}

impl Default for Tile {
    fn default() -> Self {
        Tile::wall()
    }
}

impl Tile {
    pub const fn wall() -> Self {
        Self { blocks_move: true }
    }

    pub const fn floor() -> Self {
        Self { blocks_move: false }
    }
}

#[derive(Clone, Debug)]
pub struct MapLayer {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Tile>,
    /// Carved rooms in placement order; the player starts in the first.
    pub rooms: Vec<Rect>,
    pub spawn: Point,
}

impl MapLayer {
    fn solid(width: i32, height: i32) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            tiles: vec![Tile::wall(); size],
            rooms: Vec::new(),
            spawn: Point::new(width / 2, height / 2),
        }
    }

    /// One open room walled in along the border.
    pub fn open(width: i32, height: i32) -> Self {
        let mut layer = Self::solid(width, height);
        let room = Rect::with_size(1, 1, (width - 2).max(0), (height - 2).max(0));
        layer.carve_room(room);
        layer.rooms.push(room);
        layer
    }

    /// Scatters non-overlapping rooms and chains each new room to the
    /// previous one. Falls back to [`MapLayer::open`] when nothing fits.
    pub fn generate(width: i32, height: i32, seed: u64) -> Self {
        let mut rng = RandomNumberGenerator::seeded(seed);
        let mut layer = Self::solid(width, height);

        for _ in 0..ROOM_ATTEMPTS {
            let room_w = rng.range(5, 13);
            let room_h = rng.range(4, 9);
            if room_w + 2 >= width || room_h + 2 >= height {
                continue;
            }

            let room = Rect::with_size(
                rng.range(1, width - room_w),
                rng.range(1, height - room_h),
                room_w,
                room_h,
            );
            let padded = Rect::with_size(
                room.x1 - ROOM_GAP,
                room.y1 - ROOM_GAP,
                room_w + ROOM_GAP * 2,
                room_h + ROOM_GAP * 2,
            );
            if layer.rooms.iter().any(|other| other.intersect(&padded)) {
                continue;
            }

            layer.carve_room(room);
            if let Some(previous) = layer.rooms.last().map(|other| other.center()) {
                layer.carve_tunnel(previous, room.center());
            }
            layer.rooms.push(room);
        }

        match layer.rooms.first() {
            Some(first) => {
                layer.spawn = first.center();
                layer
            }
            None => Self::open(width, height),
        }
    }

    fn carve_room(&mut self, room: Rect) {
        room.for_each(|point| self.set_tile(point, Tile::floor()));
    }

    /// Horizontal leg along `from.y`, then vertical leg along `to.x`.
    fn carve_tunnel(&mut self, from: Point, to: Point) {
        for x in from.x.min(to.x)..=from.x.max(to.x) {
            self.set_tile(Point::new(x, from.y), Tile::floor());
        }
        for y in from.y.min(to.y)..=from.y.max(to.y) {
            self.set_tile(Point::new(to.x, y), Tile::floor());
        }
    }

    fn idx(&self, point: Point) -> Option<usize> {
        self.in_bounds(point).then(|| (point.y * self.width + point.x) as usize)
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn set_tile(&mut self, point: Point, tile: Tile) {
        if let Some(idx) = self.idx(point) {
            self.tiles[idx] = tile;
        }
    }

    pub fn is_walkable(&self, point: Point) -> bool {
        self.idx(point).is_some_and(|idx| !self.tiles[idx].blocks_move)
    }

    pub fn walkable_points(&self) -> Vec<Point> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Point::new(x, y)))
            .filter(|point| self.is_walkable(*point))
            .collect()
    }

    /// The room the player starts in, if the layer has rooms at all.
    pub fn home_room(&self) -> Option<Rect> {
        self.rooms.first().copied()
    }
}
