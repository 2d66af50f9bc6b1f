//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    /// Byte distance between consecutive vertices in a buffer
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
    /// Byte offset of `color` inside a vertex
    pub const COLOR_OFFSET: usize = std::mem::size_of::<[f32; 2]>();

    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

/// View a vertex list as raw bytes for a GPU upload
pub fn as_bytes(vertices: &[Vertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Colors for game elements
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.039, 0.039, 0.102, 1.0];
    pub const PLAYER: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const PLAYER_DAMAGE: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const PLAYER_HEAL: [f32; 4] = [0.0, 1.0, 0.533, 1.0];
    pub const POWER_UP_CORE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const SHOCKWAVE: [f32; 4] = [0.0, 1.0, 1.0, 0.8];
    pub const SHOCKWAVE_INNER: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const SHOCKWAVE_TRAIL: [f32; 4] = [0.0, 1.0, 1.0, 0.4];
    pub const DAMAGE_FLASH: [f32; 4] = [1.0, 0.176, 0.176, 1.0];
    pub const HEAL_FLASH: [f32; 4] = [0.0, 1.0, 0.533, 1.0];
}
