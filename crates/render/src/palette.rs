use std::collections::BTreeMap;

use tileworld_common::TileId;

/// How one tile id is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileStyle {
    pub name: &'static str,
    /// Glyph for text output.
    pub glyph: char,
    /// Linear RGBA for GPU output.
    pub color: [f32; 4],
}

/// Tile id to style lookup with a fallback for ids it does not know.
#[derive(Debug, Clone, PartialEq)]
pub struct TilePalette {
    styles: BTreeMap<TileId, TileStyle>,
    fallback: TileStyle,
}

impl Default for TilePalette {
    /// Styles for the generator's terrain ids: 0 water, 1 grass, 2 mountain.
    fn default() -> Self {
        Self::new(TileStyle {
            name: "missing",
            glyph: '?',
            color: [1.0, 0.0, 1.0, 1.0],
        })
        .with_style(
            0,
            TileStyle {
                name: "water",
                glyph: '~',
                color: [0.12, 0.35, 0.75, 1.0],
            },
        )
        .with_style(
            1,
            TileStyle {
                name: "grass",
                glyph: '.',
                color: [0.25, 0.62, 0.22, 1.0],
            },
        )
        .with_style(
            2,
            TileStyle {
                name: "mountain",
                glyph: '^',
                color: [0.52, 0.5, 0.48, 1.0],
            },
        )
    }
}

impl TilePalette {
    pub fn new(fallback: TileStyle) -> Self {
        Self {
            styles: BTreeMap::new(),
            fallback,
        }
    }

    pub fn with_style(mut self, id: TileId, style: TileStyle) -> Self {
        self.styles.insert(id, style);
        self
    }

    pub fn style(&self, id: TileId) -> &TileStyle {
        self.styles.get(&id).unwrap_or(&self.fallback)
    }

    pub fn fallback(&self) -> &TileStyle {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}
