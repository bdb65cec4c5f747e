//! Point and area lights.
//!
//! The renderer only knows point lights. An area light is a disc that is
//! expanded up front into many dim point lights.

use lumen_math::{power, Color, Quat, Vec3};

/// Angle between successive samples of the disc spiral (radians).
const GOLDEN_ANGLE: f32 = 2.399963;

/// An isotropic point light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
    /// Average of the color channels; drives photon allocation
    pub power: f32,
}

impl PointLight {
    pub fn new(position: Vec3, color: Color) -> Self {
        Self {
            position,
            color,
            power: power(color),
        }
    }
}

/// A disc light approximated by point lights on a golden-angle spiral.
#[derive(Debug, Clone)]
pub struct AreaLight {
    pub position: Vec3,
    pub normal: Vec3,
    pub radius: f32,
    pub color: Color,
    points: Vec<PointLight>,
}

impl AreaLight {
    /// Distribute `n_points` lights over a disc of `radius` facing `normal`.
    ///
    /// Each point carries `color / n_points`, so the total power matches a
    /// single light of `color`.
    pub fn new(position: Vec3, normal: Vec3, radius: f32, color: Color, n_points: u32) -> Self {
        let normal = normal.normalize_or_zero();
        let rotation = if normal == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_rotation_arc(Vec3::Z, normal)
        };

        let n = n_points.max(1);
        let point_color = color / n as f32;
        let points = (0..n)
            .map(|i| {
                let theta = i as f32 * GOLDEN_ANGLE;
                let r = radius * (i as f32 / n as f32).sqrt();
                let local = Vec3::new(r * theta.cos(), r * theta.sin(), 0.0);
                PointLight::new(rotation * local + position, point_color)
            })
            .collect();

        Self {
            position,
            normal,
            radius,
            color,
            points,
        }
    }

    /// The point lights this area light expands into.
    pub fn points(&self) -> &[PointLight] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_light_power() {
        let light = PointLight::new(Vec3::ZERO, Color::new(1.0, 0.5, 0.0));
        assert!((light.power - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_area_light_splits_power() {
        let area = AreaLight::new(Vec3::ZERO, Vec3::Y, 2.0, Color::ONE, 64);
        assert_eq!(area.points().len(), 64);

        let total: f32 = area.points().iter().map(|p| p.power).sum();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_area_light_points_lie_on_disc() {
        let center = Vec3::new(1.0, 2.0, 3.0);
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();
        let area = AreaLight::new(center, normal, 1.5, Color::ONE, 32);

        for p in area.points() {
            let offset = p.position - center;
            assert!(offset.dot(normal).abs() < 1e-4, "point off the disc plane");
            assert!(offset.length() <= 1.5 + 1e-4);
        }
        // First spiral point sits at the center
        assert!((area.points()[0].position - center).length() < 1e-5);
    }
}
