//! Packed per-particle draw data bridging simulation and painters

use bytemuck::{Pod, Zeroable};
use sakura_engine::Particle;

/// Packed instance data for one particle.
/// 48 bytes, three vec4 rows, ready for upload should a GPU painter appear.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    /// x, y position + size + opacity packed into one vec4
    pub pos_size: [f32; 4],
    /// Color with alpha
    pub color: [f32; 4],
    /// x = rotation in degrees, y = variant index, z/w reserved
    pub rotation_variant: [f32; 4],
}

impl ParticleInstance {
    pub fn from_particle(p: &Particle) -> Self {
        Self {
            pos_size: [p.position.x, p.position.y, p.size, p.opacity],
            color: p.color.to_array(),
            rotation_variant: [p.rotation, p.variant.index() as f32, 0.0, 0.0],
        }
    }

    pub fn variant_index(&self) -> u32 {
        self.rotation_variant[1] as u32
    }
}
