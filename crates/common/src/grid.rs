use serde::{Deserialize, Serialize};

use crate::types::TileId;

/// Reasons a payload is not a valid world grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("world data is not decodable: {0}")]
    Decode(String),
    #[error("declared size must be positive, got {0}")]
    NonPositiveSize(i64),
    #[error("expected {expected} rows, got {actual}")]
    RowCount { expected: usize, actual: usize },
    #[error("row {row} has {actual} tiles, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// World data exactly as it arrives on the wire, before shape validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawWorldGrid {
    pub size: i64,
    pub tiles: Vec<Vec<TileId>>,
}

/// A validated square grid of tile ids.
///
/// `tiles.len() == size` and every row has `size` entries. Rows are indexed
/// by `y`, columns by `x`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWorldGrid")]
pub struct WorldGrid {
    size: usize,
    tiles: Vec<Vec<TileId>>,
}

impl WorldGrid {
    /// Validate and wrap a tile matrix.
    pub fn new(size: usize, tiles: Vec<Vec<TileId>>) -> Result<Self, GridError> {
        if size == 0 {
            return Err(GridError::NonPositiveSize(0));
        }
        if tiles.len() != size {
            return Err(GridError::RowCount {
                expected: size,
                actual: tiles.len(),
            });
        }
        if let Some((row, r)) = tiles.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(GridError::RowLength {
                row,
                expected: size,
                actual: r.len(),
            });
        }
        Ok(Self { size, tiles })
    }

    /// Decode a JSON body and validate its shape.
    ///
    /// Any decode failure, including non-integer tiles, is reported as
    /// `GridError::Decode`; nothing is coerced.
    pub fn from_json(body: &[u8]) -> Result<Self, GridError> {
        let raw: RawWorldGrid =
            serde_json::from_slice(body).map_err(|e| GridError::Decode(e.to_string()))?;
        Self::try_from(raw)
    }

    pub fn to_json(&self) -> String {
        // Serializing plain integers into a String cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Edge length in tiles.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn tile_count(&self) -> usize {
        self.size * self.size
    }

    pub fn rows(&self) -> &[Vec<TileId>] {
        &self.tiles
    }

    /// Tile id at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<TileId> {
        self.tiles.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Iterate `(x, y, id)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, TileId)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .flat_map(|(y, row)| row.iter().enumerate().map(move |(x, id)| (x, y, *id)))
    }
}

impl TryFrom<RawWorldGrid> for WorldGrid {
    type Error = GridError;

    fn try_from(raw: RawWorldGrid) -> Result<Self, Self::Error> {
        if raw.size <= 0 {
            return Err(GridError::NonPositiveSize(raw.size));
        }
        Self::new(raw.size as usize, raw.tiles)
    }
}
