use serde::{Deserialize, Serialize};
use tileworld_common::{GridError, TileId, WorldGrid, WorldRequest};

use crate::noise::{NoiseParams, noise_map};

/// Terrain kinds emitted by the generator, with their wire ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Terrain {
    Water = 0,
    Grass = 1,
    Mountain = 2,
}

impl Terrain {
    pub fn id(self) -> TileId {
        self as TileId
    }
}

/// Upper noise bounds for each terrain band. Values at or above `grass` are mountains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainThresholds {
    pub water: f64,
    pub grass: f64,
}

impl Default for TerrainThresholds {
    fn default() -> Self {
        Self {
            water: 0.4,
            grass: 0.7,
        }
    }
}

impl TerrainThresholds {
    pub fn classify(&self, value: f64) -> Terrain {
        if value < self.water {
            Terrain::Water
        } else if value < self.grass {
            Terrain::Grass
        } else {
            Terrain::Mountain
        }
    }
}

/// Generate a world with the default terrain thresholds.
pub fn generate_world(
    request: &WorldRequest,
    params: &NoiseParams,
) -> Result<WorldGrid, GridError> {
    generate_world_with(request, params, &TerrainThresholds::default())
}

/// Generate a `size x size` terrain grid for a request.
///
/// A zero `request.size` yields `GridError::NonPositiveSize`.
pub fn generate_world_with(
    request: &WorldRequest,
    params: &NoiseParams,
    thresholds: &TerrainThresholds,
) -> Result<WorldGrid, GridError> {
    let size = request.size as usize;
    if size == 0 {
        return Err(GridError::NonPositiveSize(0));
    }
    tracing::info!(seed = request.seed, size, "generating world");

    let tiles: Vec<Vec<TileId>> = noise_map(size, size, params, request.seed)
        .into_iter()
        .map(|row| row.into_iter().map(|v| thresholds.classify(v).id()).collect())
        .collect();

    WorldGrid::new(size, tiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_bands() {
        let t = TerrainThresholds::default();
        assert_eq!(t.classify(0.0), Terrain::Water);
        assert_eq!(t.classify(0.39), Terrain::Water);
        assert_eq!(t.classify(0.4), Terrain::Grass);
        assert_eq!(t.classify(0.69), Terrain::Grass);
        assert_eq!(t.classify(0.7), Terrain::Mountain);
        assert_eq!(t.classify(1.0), Terrain::Mountain);
    }

    #[test]
    fn wire_ids() {
        assert_eq!(Terrain::Water.id(), 0);
        assert_eq!(Terrain::Grass.id(), 1);
        assert_eq!(Terrain::Mountain.id(), 2);
    }

    #[test]
    fn generated_grid_matches_request() {
        let grid = generate_world(&WorldRequest::new(123, 48), &NoiseParams::default()).unwrap();
        assert_eq!(grid.size(), 48);
        assert!(grid.iter().all(|(_, _, id)| (0..=2).contains(&id)));
    }

    #[test]
    fn generation_is_deterministic() {
        let req = WorldRequest::new(77, 32);
        let p = NoiseParams::default();
        assert_eq!(generate_world(&req, &p).unwrap(), generate_world(&req, &p).unwrap());
    }

    #[test]
    fn zero_size_is_an_error() {
        let err = generate_world(&WorldRequest::new(1, 0), &NoiseParams::default()).unwrap_err();
        assert_eq!(err, GridError::NonPositiveSize(0));
    }

    #[test]
    fn normalised_map_spans_all_bands() {
        // Min-max normalisation guarantees both a 0.0 and a 1.0 cell.
        let grid = generate_world(&WorldRequest::new(5, 64), &NoiseParams::default()).unwrap();
        let ids: Vec<TileId> = grid.iter().map(|(_, _, id)| id).collect();
        assert!(ids.contains(&Terrain::Water.id()));
        assert!(ids.contains(&Terrain::Mountain.id()));
    }
}
