//! Render upload: a read-only snapshot of live elements for a renderer.

use crate::config::WATER_SATURATION;
use crate::element::{ConnectedComponentId, ElementIndex};
use crate::float::Float;
use crate::material::RgbaColor;
use crate::vec::Vec2f;
use alloc::vec::Vec as AllocVec;

/// Color flooded points are tinted toward.
pub const WATER_TINT: RgbaColor = [0.18, 0.28, 0.56, 1.0];

/// How much a saturated point takes on the water tint.
pub const MAX_WATER_TINT: f32 = 0.6;

/// Receiver of uploaded elements. Called only between steps.
pub trait RenderSink {
    fn upload_point(&mut self, index: ElementIndex, position: Vec2f, color: RgbaColor, water: f32);

    fn upload_spring(&mut self, point_a: ElementIndex, point_b: ElementIndex);

    fn upload_rope(&mut self, point_a: ElementIndex, point_b: ElementIndex);

    fn upload_stressed_spring(&mut self, point_a: ElementIndex, point_b: ElementIndex);

    fn upload_triangle(&mut self, vertices: [ElementIndex; 3], component: ConnectedComponentId);
}

/// Point color: the material color, tinted toward water as the point floods.
pub fn point_color(material_color: RgbaColor, water: f32) -> RgbaColor {
    let t = (water / WATER_SATURATION).clamp(0.0, 1.0) * MAX_WATER_TINT;
    let mut color = material_color;
    for (channel, tint) in color.iter_mut().zip(WATER_TINT.iter()).take(3) {
        *channel = channel.lerp(*tint, t);
    }
    color
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointVertex {
    pub index: ElementIndex,
    pub position: Vec2f,
    pub color: RgbaColor,
    pub water: f32,
}

/// A [`RenderSink`] that collects everything into vectors.
#[derive(Clone, Debug, Default)]
pub struct RenderBuffers {
    pub points: AllocVec<PointVertex>,
    pub springs: AllocVec<[ElementIndex; 2]>,
    pub ropes: AllocVec<[ElementIndex; 2]>,
    pub stressed_springs: AllocVec<[ElementIndex; 2]>,
    pub triangles: AllocVec<([ElementIndex; 3], ConnectedComponentId)>,
}

impl RenderBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.springs.clear();
        self.ropes.clear();
        self.stressed_springs.clear();
        self.triangles.clear();
    }
}

impl RenderSink for RenderBuffers {
    fn upload_point(&mut self, index: ElementIndex, position: Vec2f, color: RgbaColor, water: f32) {
        self.points.push(PointVertex { index, position, color, water });
    }

    fn upload_spring(&mut self, point_a: ElementIndex, point_b: ElementIndex) {
        self.springs.push([point_a, point_b]);
    }

    fn upload_rope(&mut self, point_a: ElementIndex, point_b: ElementIndex) {
        self.ropes.push([point_a, point_b]);
    }

    fn upload_stressed_spring(&mut self, point_a: ElementIndex, point_b: ElementIndex) {
        self.stressed_springs.push([point_a, point_b]);
    }

    fn upload_triangle(&mut self, vertices: [ElementIndex; 3], component: ConnectedComponentId) {
        self.triangles.push((vertices, component));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_points_keep_material_color() {
        let color = [0.9, 0.1, 0.1, 1.0];
        assert_eq!(point_color(color, 0.0), color);
    }

    #[test]
    fn flooded_points_move_toward_water_tint() {
        let color = point_color([1.0, 1.0, 1.0, 0.5], WATER_SATURATION);
        assert!(color[0] < 1.0 && color[2] < 1.0);
        assert!((color[0] - (1.0 + (WATER_TINT[0] - 1.0) * MAX_WATER_TINT)).abs() < 1e-6);
        assert_eq!(color[3], 0.5, "alpha is untouched");
    }
}
