use std::borrow::Cow;
use std::collections::BTreeMap;

use super::{TargetHandle, TextureHandle};

/// Where a texture uniform samples from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextureSource {
    /// The color attachment of an offscreen target.
    Target(TargetHandle),
    Texture(TextureHandle),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Uniform {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Texture(Option<TextureSource>),
}

/// A full-program material: one WGSL module exposing `vs_main` and `fs_main`,
/// plus its uniform values.
///
/// The engine only edits uniform values; compiling and binding the program is
/// the collaborator's job.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderMaterial {
    pub label: &'static str,
    pub source: Cow<'static, str>,
    pub defines: BTreeMap<String, String>,
    uniforms: BTreeMap<&'static str, Uniform>,
}

impl ShaderMaterial {
    pub fn new(label: &'static str, source: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label,
            source: source.into(),
            defines: BTreeMap::new(),
            uniforms: BTreeMap::new(),
        }
    }

    pub fn with_uniform(mut self, name: &'static str, value: Uniform) -> Self {
        self.uniforms.insert(name, value);
        self
    }

    pub fn with_define(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defines.insert(name.into(), value.into());
        self
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.contains_key(name)
    }

    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.get(name)
    }

    pub fn uniforms(&self) -> impl Iterator<Item = (&'static str, &Uniform)> {
        self.uniforms.iter().map(|(k, v)| (*k, v))
    }

    /// Sets `name` to `value`, declaring it if needed.
    pub fn set(&mut self, name: &'static str, value: Uniform) {
        self.uniforms.insert(name, value);
    }

    pub fn set_float(&mut self, name: &'static str, value: f32) {
        self.set(name, Uniform::Float(value));
    }

    pub fn set_int(&mut self, name: &'static str, value: i32) {
        self.set(name, Uniform::Int(value));
    }

    pub fn set_vec2(&mut self, name: &'static str, value: [f32; 2]) {
        self.set(name, Uniform::Vec2(value));
    }

    pub fn set_texture(&mut self, name: &'static str, value: Option<TextureSource>) {
        self.set(name, Uniform::Texture(value));
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.uniform(name)? {
            Uniform::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i32> {
        match self.uniform(name)? {
            Uniform::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn vec2(&self, name: &str) -> Option<[f32; 2]> {
        match self.uniform(name)? {
            Uniform::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn texture(&self, name: &str) -> Option<TextureSource> {
        match self.uniform(name)? {
            Uniform::Texture(v) => *v,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors_match_variant() {
        let mut m = ShaderMaterial::new("t", "")
            .with_uniform("amount", Uniform::Float(0.5))
            .with_uniform("byp", Uniform::Int(0));

        assert_eq!(m.float("amount"), Some(0.5));
        assert_eq!(m.int("amount"), None);

        m.set_texture("tDiffuse", Some(TextureSource::Target(TargetHandle(3))));
        assert_eq!(m.texture("tDiffuse"), Some(TextureSource::Target(TargetHandle(3))));
        assert!(m.has_uniform("byp"));
        assert!(!m.has_uniform("missing"));
    }
}
