//! Bounding volumes.

use cgmath::{InnerSpace, Zero};

use super::Geometry;
use crate::math::Vec3;

/// Axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Vec3::zero(),
            max: Vec3::zero(),
        }
    }
}

impl BoundingBox {
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Sphere centered on the local origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingSphere {
    pub radius: f64,
}

impl Geometry {
    /// Per-axis min/max over all vertices. An empty geometry gets a box
    /// collapsed on the origin.
    pub fn compute_bounding_box(&mut self) -> &BoundingBox {
        let bb = self.bounding_box.get_or_insert_with(BoundingBox::default);

        match self.vertices.first() {
            None => *bb = BoundingBox::default(),
            Some(&first) => {
                let (mut min, mut max) = (first, first);
                for v in &self.vertices {
                    min.x = min.x.min(v.x);
                    min.y = min.y.min(v.y);
                    min.z = min.z.min(v.z);
                    max.x = max.x.max(v.x);
                    max.y = max.y.max(v.y);
                    max.z = max.z.max(v.z);
                }
                *bb = BoundingBox { min, max };
            }
        }
        bb
    }

    /// Radius of the smallest origin-centered sphere holding every vertex.
    pub fn compute_bounding_sphere(&mut self) -> &BoundingSphere {
        let max_radius_sq = self
            .vertices
            .iter()
            .map(|v| v.magnitude2())
            .fold(0.0_f64, f64::max);

        self.bounding_sphere.insert(BoundingSphere {
            radius: max_radius_sq.sqrt(),
        })
    }
}
