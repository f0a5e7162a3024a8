//! Built-in shader materials.
//!
//! Each returns a fresh material with the default uniform values. Texture
//! inputs start unbound.

use crate::coords::Vec2;
use crate::gfx::{ShaderMaterial, TextureSource, Uniform};

const COPY_WGSL: &str = include_str!("shaders/copy.wgsl");
const DOT_SCREEN_WGSL: &str = include_str!("shaders/dot_screen.wgsl");
const GLITCH_WGSL: &str = include_str!("shaders/glitch.wgsl");
const TRANSITION_WGSL: &str = include_str!("shaders/transition.wgsl");

/// Pass-through of `tDiffuse`, scaled by `opacity` (1.0).
pub fn copy() -> ShaderMaterial {
    ShaderMaterial::new("copy", COPY_WGSL)
        .with_uniform("tDiffuse", Uniform::Texture(None))
        .with_uniform("opacity", Uniform::Float(1.0))
}

pub fn dot_screen(center: Vec2, angle: f32, scale: f32) -> ShaderMaterial {
    ShaderMaterial::new("dot_screen", DOT_SCREEN_WGSL)
        .with_uniform("tDiffuse", Uniform::Texture(None))
        .with_uniform("tSize", Uniform::Vec2([256.0, 256.0]))
        .with_uniform("center", Uniform::Vec2([center.x, center.y]))
        .with_uniform("angle", Uniform::Float(angle))
        .with_uniform("scale", Uniform::Float(scale))
}

pub fn glitch() -> ShaderMaterial {
    ShaderMaterial::new("glitch", GLITCH_WGSL)
        .with_uniform("tDiffuse", Uniform::Texture(None))
        .with_uniform("tDisp", Uniform::Texture(None))
        .with_uniform("byp", Uniform::Int(0))
        .with_uniform("amount", Uniform::Float(0.08))
        .with_uniform("angle", Uniform::Float(0.02))
        .with_uniform("seed", Uniform::Float(0.02))
        .with_uniform("seed_x", Uniform::Float(0.02))
        .with_uniform("seed_y", Uniform::Float(0.02))
        .with_uniform("distortion_x", Uniform::Float(0.5))
        .with_uniform("distortion_y", Uniform::Float(0.6))
        .with_uniform("col_s", Uniform::Float(0.05))
}

/// Two-texture crossfade. `tDiffuse1` is the incoming scene, `tDiffuse2` the
/// outgoing one; `mixRatio` 0 shows `tDiffuse2`.
pub fn transition(mask: Option<TextureSource>) -> ShaderMaterial {
    ShaderMaterial::new("transition", TRANSITION_WGSL)
        .with_uniform("tDiffuse1", Uniform::Texture(None))
        .with_uniform("tDiffuse2", Uniform::Texture(None))
        .with_uniform("mixRatio", Uniform::Float(0.0))
        .with_uniform("threshold", Uniform::Float(0.1))
        .with_uniform("useTexture", Uniform::Int(i32::from(mask.is_some())))
        .with_uniform("tMixTexture", Uniform::Texture(mask))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_expose_both_entry_points() {
        for m in [copy(), dot_screen(Vec2::new(0.5, 0.5), 1.57, 1.0), glitch(), transition(None)] {
            assert!(m.source.contains("fn vs_main"), "{}", m.label);
            assert!(m.source.contains("fn fs_main"), "{}", m.label);
        }
    }

    #[test]
    fn every_uniform_is_declared_in_the_source() {
        for m in [copy(), dot_screen(Vec2::new(0.5, 0.5), 1.57, 1.0), glitch(), transition(None)] {
            for (name, _) in m.uniforms() {
                assert!(m.source.contains(name), "{} lacks {name}", m.label);
            }
        }
    }
}
