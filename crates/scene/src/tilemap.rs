use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;
use tileworld_common::{TileId, WorldGrid};

static NEXT_TILEMAP_ID: AtomicU64 = AtomicU64::new(1);

/// Tileset key the single tile layer binds to.
pub const DEFAULT_TILESET: &str = "tiles";

/// Axis-aligned world rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// Bounds of a square grid: `(0,0)..(size*tile_edge, size*tile_edge)`.
    pub fn from_grid(size: usize, tile_edge: f32) -> Self {
        let extent = size as f32 * tile_edge;
        Self {
            min: Vec2::ZERO,
            max: Vec2::splat(extent),
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Clamp the centre of a box with the given half extent so the whole box
    /// stays inside. On an axis where the box is wider than the bounds, the
    /// box is centred.
    pub fn clamp_center(&self, center: Vec2, half_extent: Vec2) -> Vec2 {
        let lo = self.min + half_extent;
        let hi = self.max - half_extent;
        let mid = self.center();
        Vec2::new(
            if lo.x <= hi.x { center.x.clamp(lo.x, hi.x) } else { mid.x },
            if lo.y <= hi.y { center.y.clamp(lo.y, hi.y) } else { mid.y },
        )
    }
}

/// A single-layer tilemap built from a validated grid.
#[derive(Debug, Clone)]
pub struct Tilemap {
    id: u64,
    grid: WorldGrid,
    tile_edge: f32,
    tileset: String,
}

/// Equality compares content; the id is ignored.
impl PartialEq for Tilemap {
    fn eq(&self, other: &Self) -> bool {
        self.grid == other.grid && self.tile_edge == other.tile_edge && self.tileset == other.tileset
    }
}

impl Tilemap {
    pub fn new(grid: WorldGrid, tile_edge: f32) -> Self {
        Self {
            id: NEXT_TILEMAP_ID.fetch_add(1, Ordering::Relaxed),
            grid,
            tile_edge,
            tileset: DEFAULT_TILESET.to_string(),
        }
    }

    /// Process-unique id assigned at construction. Clones share it.
    ///
    /// Renderers key uploaded GPU data on this, so a new map of the same size
    /// is never mistaken for the old one.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn with_tileset(mut self, tileset: impl Into<String>) -> Self {
        self.tileset = tileset.into();
        self
    }

    pub fn grid(&self) -> &WorldGrid {
        &self.grid
    }

    /// Tiles per side.
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn tile_edge(&self) -> f32 {
        self.tile_edge
    }

    pub fn tileset(&self) -> &str {
        &self.tileset
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_grid(self.grid.size(), self.tile_edge)
    }

    /// Top-left corner of tile `(x, y)` in world pixels.
    pub fn tile_origin(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(x as f32, y as f32) * self.tile_edge
    }

    /// Tile under a world position, if inside the map.
    pub fn tile_at(&self, position: Vec2) -> Option<TileId> {
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        let x = (position.x / self.tile_edge) as usize;
        let y = (position.y / self.tile_edge) as usize;
        self.grid.get(x, y)
    }

    /// Tiles overlapping the world rectangle `min..max`, row-major.
    pub fn tiles_in(&self, min: Vec2, max: Vec2) -> impl Iterator<Item = (usize, usize, TileId)> + '_ {
        let size = self.grid.size();
        let to_index = |v: f32| (v / self.tile_edge).max(0.0);
        let x0 = (to_index(min.x).floor() as usize).min(size);
        let y0 = (to_index(min.y).floor() as usize).min(size);
        let x1 = (to_index(max.x).ceil() as usize).min(size);
        let y1 = (to_index(max.y).ceil() as usize).min(size);

        (y0..y1).flat_map(move |y| {
            (x0..x1).filter_map(move |x| self.grid.get(x, y).map(|id| (x, y, id)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(size: usize) -> WorldGrid {
        let tiles = (0..size)
            .map(|y| (0..size).map(|x| (x + y * size) as TileId).collect())
            .collect();
        WorldGrid::new(size, tiles).unwrap()
    }

    #[test]
    fn every_tilemap_gets_a_fresh_id() {
        let a = Tilemap::new(grid(4), 32.0);
        let b = Tilemap::new(grid(4), 32.0);
        assert_ne!(a.id(), b.id());
        assert_eq!(a, b);
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn bounds_match_grid_extent() {
        let map = Tilemap::new(grid(64), 32.0);
        let b = map.bounds();
        assert_eq!(b.min, Vec2::ZERO);
        assert_eq!(b.max, Vec2::new(2048.0, 2048.0));
        assert_eq!(b.center(), Vec2::new(1024.0, 1024.0));
    }

    #[test]
    fn clamp_keeps_box_inside() {
        let b = Bounds::from_grid(4, 10.0);
        let half = Vec2::splat(5.0);
        assert_eq!(b.clamp_center(Vec2::new(-3.0, 50.0), half), Vec2::new(5.0, 35.0));
        assert_eq!(b.clamp_center(Vec2::new(20.0, 20.0), half), Vec2::new(20.0, 20.0));
    }

    #[test]
    fn clamp_centres_oversized_box() {
        let b = Bounds::from_grid(2, 10.0);
        let clamped = b.clamp_center(Vec2::new(0.0, 3.0), Vec2::new(50.0, 5.0));
        assert_eq!(clamped, Vec2::new(10.0, 5.0));
    }

    #[test]
    fn tile_lookup() {
        let map = Tilemap::new(grid(3), 10.0);
        assert_eq!(map.tile_at(Vec2::new(15.0, 25.0)), Some(7));
        assert_eq!(map.tile_at(Vec2::new(-1.0, 0.0)), None);
        assert_eq!(map.tile_at(Vec2::new(30.0, 0.0)), None);
        assert_eq!(map.tile_origin(2, 1), Vec2::new(20.0, 10.0));
    }

    #[test]
    fn tiles_in_window() {
        let map = Tilemap::new(grid(4), 10.0);
        let visible: Vec<_> = map.tiles_in(Vec2::new(5.0, 5.0), Vec2::new(15.0, 12.0)).collect();
        assert_eq!(
            visible,
            vec![(0, 0, 0), (1, 0, 1), (0, 1, 4), (1, 1, 5)]
        );
        assert_eq!(map.tiles_in(Vec2::splat(-100.0), Vec2::splat(1000.0)).count(), 16);
    }

    #[test]
    fn default_tileset_binding() {
        let map = Tilemap::new(grid(1), 32.0);
        assert_eq!(map.tileset(), DEFAULT_TILESET);
        assert_eq!(map.with_tileset("terrain").tileset(), "terrain");
    }
}
