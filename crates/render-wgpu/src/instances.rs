use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use tileworld_render::TilePalette;
use tileworld_scene::{Player, Tilemap};

pub const PLAYER_COLOR: [f32; 4] = [0.95, 0.85, 0.2, 1.0];

/// Per-instance data for one quad, in world pixels.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TileInstance {
    pub offset: [f32; 2],
    pub size: [f32; 2],
    pub color: [f32; 4],
}

/// One instance per tile, row-major.
pub fn tile_instances(tilemap: &Tilemap, palette: &TilePalette) -> Vec<TileInstance> {
    let edge = tilemap.tile_edge();
    tilemap
        .grid()
        .iter()
        .map(|(x, y, id)| TileInstance {
            offset: tilemap.tile_origin(x, y).to_array(),
            size: [edge, edge],
            color: palette.style(id).color,
        })
        .collect()
}

/// Split `count` instances into consecutive ranges that each fit in one
/// buffer of at most `max_buffer_bytes`.
pub fn instance_chunks(count: usize, max_buffer_bytes: u64) -> Vec<Range<usize>> {
    let per_buffer = max_buffer_bytes / std::mem::size_of::<TileInstance>() as u64;
    let per_buffer = usize::try_from(per_buffer).unwrap_or(usize::MAX).max(1);
    (0..count)
        .step_by(per_buffer)
        .map(|start| start..count.min(start.saturating_add(per_buffer)))
        .collect()
}

pub fn player_instance(player: &Player, color: [f32; 4]) -> TileInstance {
    let min = player.position - player.half_extent;
    TileInstance {
        offset: min.to_array(),
        size: (player.half_extent * 2.0).to_array(),
        color,
    }
}
