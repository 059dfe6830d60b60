#![allow(clippy::cast_precision_loss)]

use nalgebra::Matrix3;
use tracing::debug;

use crate::error::{OperationError, Result};
use crate::math::{Point3, Vector3};

/// The eight corners of an oriented box.
///
/// Corners 0-3 form the bottom face and 4-7 the top face, each
/// counter-clockwise about the box's third axis.
pub type ObbCorners = [Point3; 8];

/// Fits an oriented bounding box to a point set along its principal axes.
pub struct OrientedBoundingBox3D {
    points: Vec<Point3>,
}

impl OrientedBoundingBox3D {
    /// Creates a new `OrientedBoundingBox3D` operation.
    #[must_use]
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    /// Computes the box corners.
    ///
    /// The box axes are the eigenvectors of the point covariance; the
    /// extents come from the point bounds in that frame. Flat or collinear
    /// input yields a box with zero thickness.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if the point set is empty or
    /// holds a non-finite coordinate.
    pub fn execute(&self) -> Result<ObbCorners> {
        if self.points.is_empty() {
            return Err(OperationError::InvalidInput("no points for bounding box".into()).into());
        }
        if self.points.iter().any(|p| p.coords.iter().any(|c| !c.is_finite())) {
            return Err(
                OperationError::InvalidInput("non-finite point for bounding box".into()).into(),
            );
        }

        let sum: Vector3 = self.points.iter().map(|p| p.coords).sum();
        let centroid = Point3::from(sum / self.points.len() as f64);

        let mut covariance = Matrix3::zeros();
        for p in &self.points {
            let d = p - centroid;
            covariance += d * d.transpose();
        }
        covariance /= self.points.len() as f64;
        let mut axes = covariance.symmetric_eigen().eigenvectors;
        if axes.determinant() < 0.0 {
            // Keep the frame right-handed so corner winding is stable.
            axes.column_mut(2).neg_mut();
        }

        let mut local_min = Vector3::repeat(f64::INFINITY);
        let mut local_max = Vector3::repeat(f64::NEG_INFINITY);
        for p in &self.points {
            let local = axes.transpose() * (p - centroid);
            local_min = local_min.inf(&local);
            local_max = local_max.sup(&local);
        }

        let half = (local_max - local_min) / 2.0;
        let center = centroid + axes * ((local_min + local_max) / 2.0);
        let signs = [
            (-1.0, -1.0, -1.0),
            (1.0, -1.0, -1.0),
            (1.0, 1.0, -1.0),
            (-1.0, 1.0, -1.0),
            (-1.0, -1.0, 1.0),
            (1.0, -1.0, 1.0),
            (1.0, 1.0, 1.0),
            (-1.0, 1.0, 1.0),
        ];
        let corners = signs.map(|(sx, sy, sz)| {
            center + axes * Vector3::new(sx * half.x, sy * half.y, sz * half.z)
        });
        debug!(
            points = self.points.len(),
            extents = ?(half * 2.0),
            "Computed oriented bounding box"
        );
        Ok(corners)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn box_corners(size: Vector3) -> Vec<Point3> {
        let mut corners = Vec::new();
        for &x in &[0.0, size.x] {
            for &y in &[0.0, size.y] {
                for &z in &[0.0, size.z] {
                    corners.push(Point3::new(x, y, z));
                }
            }
        }
        corners
    }

    #[test]
    fn axis_aligned_box_recovers_corners() {
        let input = box_corners(Vector3::new(2.0, 4.0, 6.0));
        let corners = OrientedBoundingBox3D::new(input.clone()).execute().unwrap();
        for expected in &input {
            assert!(
                corners.iter().any(|c| (c - expected).norm() < 1e-9),
                "missing corner {expected:?}"
            );
        }
    }

    #[test]
    fn rotated_box_keeps_volume() {
        let rotation = nalgebra::Rotation3::from_axis_angle(&Vector3::z_axis(), 0.5);
        let input: Vec<Point3> = box_corners(Vector3::new(1.0, 3.0, 5.0))
            .into_iter()
            .map(|p| rotation * p)
            .collect();
        let c = OrientedBoundingBox3D::new(input).execute().unwrap();
        let volume = (c[1] - c[0]).norm() * (c[3] - c[0]).norm() * (c[4] - c[0]).norm();
        assert!((volume - 15.0).abs() < 1e-9);
    }

    #[test]
    fn corner_frame_is_right_handed() {
        let rotation = nalgebra::Rotation3::from_axis_angle(&Vector3::x_axis(), 0.3);
        let inputs = [
            box_corners(Vector3::new(2.0, 4.0, 6.0)),
            box_corners(Vector3::new(6.0, 4.0, 2.0)),
            box_corners(Vector3::new(1.0, 5.0, 3.0))
                .into_iter()
                .map(|p| rotation * p)
                .collect(),
        ];
        for input in inputs {
            let c = OrientedBoundingBox3D::new(input).execute().unwrap();
            let up = (c[1] - c[0]).cross(&(c[3] - c[0]));
            assert!(up.dot(&(c[4] - c[0])) > 0.0);
        }
    }

    #[test]
    fn empty_input_rejected() {
        assert!(OrientedBoundingBox3D::new(vec![]).execute().is_err());
    }

    #[test]
    fn single_point_collapses() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let corners = OrientedBoundingBox3D::new(vec![p]).execute().unwrap();
        assert!(corners.iter().all(|c| (c - p).norm() < 1e-12));
    }
}
