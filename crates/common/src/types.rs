use serde::{Deserialize, Serialize};

/// Integer tile-type identifier as produced by the world generator.
pub type TileId = i32;

/// Parameters sent to the world-generation service.
///
/// Both fields are required. Front ends choose their own defaults for flags;
/// the request type itself has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldRequest {
    pub seed: i64,
    pub size: u32,
}

impl WorldRequest {
    pub fn new(seed: i64, size: u32) -> Self {
        Self { seed, size }
    }

    /// Query string for the `generate_world` route, without the leading `?`.
    pub fn query(&self) -> String {
        format!("seed={}&size={}", self.seed, self.size)
    }
}
