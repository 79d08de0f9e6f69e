//! Material description consumed by buffer synchronization
//!
//! A material decides which per-vertex attribute arrays a chunk needs. The
//! decision is driven by an explicit [`MaterialCapabilities`] flag set rather
//! than by the concrete material kind.

use crate::math::Color;

/// How normals are shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shading {
    /// No lighting, so no normals are uploaded.
    None,
    /// One normal per face, repeated on every corner.
    Flat,
    /// Per-corner vertex normals.
    #[default]
    Smooth,
}

/// Where vertex colors come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertexColors {
    #[default]
    None,
    /// Face color repeated on every corner.
    Face,
    /// Per-corner vertex colors.
    Vertex,
}

/// Feature flags a material exposes to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaterialCapabilities {
    pub map: bool,
    pub env_map: bool,
    pub light_map: bool,
    pub bump_map: bool,
    pub normal_map: bool,
    pub specular_map: bool,
    pub skinning: bool,
    pub morph_targets: bool,
    pub morph_normals: bool,
    pub size_attenuation: bool,
    pub double_sided: bool,
    pub flip_sided: bool,
    pub shadow_map: bool,
    /// Fragments with alpha below this are discarded; 0 disables the test.
    pub alpha_test: f64,
}

/// Surface description for a mesh chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub color: Color,
    pub opacity: f64,
    pub shading: Shading,
    pub vertex_colors: VertexColors,
    pub wireframe: bool,
    pub capabilities: MaterialCapabilities,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            color: Color::default(),
            opacity: 1.0,
            shading: Shading::Smooth,
            vertex_colors: VertexColors::None,
            wireframe: false,
            capabilities: MaterialCapabilities::default(),
        }
    }
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Builder pattern: Set shading mode
    pub fn with_shading(mut self, shading: Shading) -> Self {
        self.shading = shading;
        self
    }

    /// Builder pattern: Set vertex color mode
    pub fn with_vertex_colors(mut self, vertex_colors: VertexColors) -> Self {
        self.vertex_colors = vertex_colors;
        self
    }

    /// Builder pattern: Render as wireframe lines
    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    /// Builder pattern: Set diffuse color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Builder pattern: Set opacity, clamped to `[0, 1]`
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Builder pattern: Replace the capability flags
    pub fn with_capabilities(mut self, capabilities: MaterialCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Normal layout the chunk arrays need, or `None` when unlit.
    pub fn normal_type(&self) -> Option<Shading> {
        match self.shading {
            Shading::None => None,
            shading => Some(shading),
        }
    }

    /// Color layout the chunk arrays need, or `None` without vertex colors.
    pub fn vertex_color_type(&self) -> Option<VertexColors> {
        match self.vertex_colors {
            VertexColors::None => None,
            colors => Some(colors),
        }
    }

    /// Whether the chunk needs texture coordinates.
    pub fn uv_type(&self) -> bool {
        self.capabilities.map || self.capabilities.light_map
    }

    pub fn needs_morph_normals(&self) -> bool {
        self.capabilities.morph_normals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_material() {
        let m = Material::default();
        assert_eq!(m.normal_type(), Some(Shading::Smooth));
        assert_eq!(m.vertex_color_type(), None);
        assert!(!m.uv_type());
        assert!(!m.needs_morph_normals());
    }

    #[test]
    fn test_buffer_guesses() {
        let unlit = Material::new("unlit").with_shading(Shading::None);
        assert_eq!(unlit.normal_type(), None);

        let flat = Material::new("flat")
            .with_shading(Shading::Flat)
            .with_vertex_colors(VertexColors::Face);
        assert_eq!(flat.normal_type(), Some(Shading::Flat));
        assert_eq!(flat.vertex_color_type(), Some(VertexColors::Face));

        let lightmapped = Material::new("lm").with_capabilities(MaterialCapabilities {
            light_map: true,
            ..Default::default()
        });
        assert!(lightmapped.uv_type());
    }

    #[test]
    fn test_opacity_clamped() {
        assert_eq!(Material::new("m").with_opacity(3.0).opacity, 1.0);
    }
}
