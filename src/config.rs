//! Runtime settings for model picking and render-data construction.

use serde::{Deserialize, Serialize};

use crate::math::SMALL_NUMBER;

/// World units covered by one repeat of a surface texture.
pub const DEFAULT_TEXTURE_TILE_SIZE: f32 = 128.0;

/// Projected vertices whose clip-space W magnitude is at or below this are treated as
/// degenerate by the hit test.
pub const DEFAULT_MIN_PROJECTED_W: f32 = SMALL_NUMBER;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FModelRenderConfig {
    /// Divisor applied to planar texture coordinates when building the vertex buffer.
    pub texture_tile_size: f32,
    /// Smallest clip-space |W| a projected hit-test vertex may have.
    pub min_projected_w: f32,
}

impl Default for FModelRenderConfig {
    fn default() -> Self {
        Self {
            texture_tile_size: DEFAULT_TEXTURE_TILE_SIZE,
            min_projected_w: DEFAULT_MIN_PROJECTED_W,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_test() {
        let config = FModelRenderConfig::default();
        assert_eq!(config.texture_tile_size, 128.0);
        assert_eq!(config.min_projected_w, SMALL_NUMBER);
    }

    #[test]
    fn partial_json_uses_defaults_test() {
        let config: FModelRenderConfig = serde_json::from_str(r#"{ "texture_tile_size": 256.0 }"#).unwrap();
        assert_eq!(config.texture_tile_size, 256.0);
        assert_eq!(config.min_projected_w, DEFAULT_MIN_PROJECTED_W);
    }
}
