//! Surface material shared by every primitive kind.

use lumen_math::Color;

/// Ad hoc RGB surface description.
///
/// Copied by value into each primitive when it is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Base (diffuse) color
    pub color: Color,
    /// Mirror reflection weight in [0, 1]
    pub reflectivity: f32,
    /// Blinn specular weight
    pub specular: f32,
    /// Blinn specular exponent
    pub shininess: f32,
    /// Probability that a photon survives a bounce off this surface
    pub diffusivity: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::new(0.5, 0.5, 0.5), // Grey default
            reflectivity: 0.0,
            specular: 0.0,
            shininess: 0.0,
            diffusivity: 0.5,
        }
    }
}

impl Material {
    /// Create a purely diffuse material with the given color.
    pub fn diffuse(color: Color, diffusivity: f32) -> Self {
        Self {
            color,
            diffusivity: diffusivity.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// Add a Blinn highlight.
    pub fn with_specular(mut self, weight: f32, exponent: f32) -> Self {
        self.specular = weight;
        self.shininess = exponent;
        self
    }

    /// Set the mirror reflection weight (clamped to [0, 1]).
    pub fn with_reflectivity(mut self, reflectivity: f32) -> Self {
        self.reflectivity = reflectivity.clamp(0.0, 1.0);
        self
    }
}
