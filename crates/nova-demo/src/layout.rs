//! Uniform and binding layout of a material, read from its WGSL source.
//!
//! Materials declare one `Params` struct at `@group(0) @binding(0)` and any
//! number of `texture_2d<f32>` + sampler pairs in group 0. Scalars and `vec2`s
//! are the only supported `Params` members.

use nova_engine::gfx::{ShaderMaterial, Uniform};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FieldKind {
    F32,
    I32,
    Vec2,
}

impl FieldKind {
    fn parse(ty: &str) -> Option<Self> {
        match ty {
            "f32" => Some(FieldKind::F32),
            "i32" => Some(FieldKind::I32),
            "vec2<f32>" | "vec2f" => Some(FieldKind::Vec2),
            _ => None,
        }
    }

    fn size(self) -> usize {
        match self {
            FieldKind::F32 | FieldKind::I32 => 4,
            FieldKind::Vec2 => 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub offset: usize,
}

/// A texture input: binding of the texture, sampler follows at `binding + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSlot {
    pub name: String,
    pub binding: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaterialLayout {
    pub fields: Vec<Field>,
    /// Size of the `Params` buffer, rounded up to 16 bytes. Zero without one.
    pub params_size: usize,
    pub textures: Vec<TextureSlot>,
}

impl MaterialLayout {
    pub fn parse(source: &str) -> Self {
        let mut layout = MaterialLayout::default();

        if let Some(body) = params_body(source) {
            let mut offset = 0usize;
            for member in body.split(',') {
                let Some((name, ty)) = member.split_once(':') else { continue };
                let (name, ty) = (name.trim(), ty.trim());
                let Some(kind) = FieldKind::parse(ty) else {
                    log::warn!("unsupported Params member `{name}: {ty}`");
                    continue;
                };
                offset = offset.next_multiple_of(kind.size());
                layout.fields.push(Field { name: name.to_string(), kind, offset });
                offset += kind.size();
            }
            layout.params_size = offset.next_multiple_of(16);
        }

        for line in source.lines() {
            let line = line.trim();
            if !line.starts_with("@group(0)") || !line.contains("texture_2d") {
                continue;
            }
            let binding = between(line, "@binding(", ")").and_then(|b| b.parse().ok());
            let name = between(line, "var ", ":").map(str::trim);
            if let (Some(binding), Some(name)) = (binding, name) {
                layout.textures.push(TextureSlot { name: name.to_string(), binding });
            }
        }

        layout
    }

    /// Packs the material's current uniform values. Missing values stay zero.
    pub fn pack(&self, material: &ShaderMaterial) -> Vec<u8> {
        let mut bytes = vec![0u8; self.params_size];

        for field in &self.fields {
            let at = field.offset;
            match (field.kind, material.uniform(&field.name)) {
                (FieldKind::F32, Some(Uniform::Float(v))) => {
                    bytes[at..at + 4].copy_from_slice(&v.to_le_bytes());
                }
                (FieldKind::I32, Some(Uniform::Int(v))) => {
                    bytes[at..at + 4].copy_from_slice(&v.to_le_bytes());
                }
                (FieldKind::Vec2, Some(Uniform::Vec2([x, y]))) => {
                    bytes[at..at + 4].copy_from_slice(&x.to_le_bytes());
                    bytes[at + 4..at + 8].copy_from_slice(&y.to_le_bytes());
                }
                _ => {}
            }
        }

        bytes
    }
}

fn params_body(source: &str) -> Option<&str> {
    let start = source.find("struct Params")?;
    let rest = &source[start..];
    let open = rest.find('{')?;
    let close = rest.find('}')?;
    Some(&rest[open + 1..close])
}

fn between<'a>(s: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = s.find(open)? + open.len();
    let len = s[start..].find(close)?;
    Some(&s[start..start + len])
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_engine::coords::Vec2;
    use nova_engine::post::shaders;

    #[test]
    fn vec2_members_are_eight_byte_aligned() {
        let layout = MaterialLayout::parse(&shaders::dot_screen(Vec2::new(0.5, 0.5), 1.57, 1.0).source);
        let offsets: Vec<_> = layout.fields.iter().map(|f| (f.name.as_str(), f.offset)).collect();
        assert_eq!(offsets, [("center", 0), ("tSize", 8), ("angle", 16), ("scale", 20)]);
        assert_eq!(layout.params_size, 32);
    }

    #[test]
    fn texture_slots_follow_binding_order() {
        let layout = MaterialLayout::parse(&shaders::transition(None).source);
        let names: Vec<_> = layout.textures.iter().map(|t| (t.name.as_str(), t.binding)).collect();
        assert_eq!(names, [("tDiffuse1", 1), ("tDiffuse2", 3), ("tMixTexture", 5)]);
    }

    #[test]
    fn pack_writes_current_values() {
        let mut material = shaders::copy();
        material.set_float("opacity", 0.25);
        let layout = MaterialLayout::parse(&material.source);

        let bytes = layout.pack(&material);
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[0..4], &0.25f32.to_le_bytes());
    }

    #[test]
    fn scalar_members_pack_back_to_back() {
        let material = shaders::transition(None);
        let layout = MaterialLayout::parse(&material.source);
        let offsets: Vec<_> = layout.fields.iter().map(|f| (f.name.as_str(), f.kind, f.offset)).collect();
        assert_eq!(
            offsets,
            [("mixRatio", FieldKind::F32, 0), ("threshold", FieldKind::F32, 4), ("useTexture", FieldKind::I32, 8)]
        );
        assert_eq!(layout.params_size, 16);
        assert_eq!(&layout.pack(&material)[8..12], &0i32.to_le_bytes());
    }
}
