//! Validated planar polygons with holes.
//!
//! A [`PolygonWithHoles`] is the only input the skeleton engine accepts. It
//! is built from raw rings and guarantees:
//!
//! - every ring has at least three distinct vertices and non-zero area,
//! - the outer ring is counter-clockwise and every hole is clockwise,
//! - no ring touches itself or any other ring,
//! - every hole lies strictly inside the outer ring and outside the others.

mod validate;

use tracing::debug;

use crate::error::PolygonError;
use crate::math::polygon_2d::signed_area;
use crate::math::Point2;

/// How ring orientation mismatches are handled while building a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrientationPolicy {
    /// Reverse misoriented rings (outer becomes CCW, holes become CW).
    #[default]
    Reorient,
    /// Reject misoriented rings with [`PolygonError::Orientation`].
    Strict,
}

/// A polygon with zero or more holes, validated for skeleton construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonWithHoles {
    outer: Vec<Point2>,
    holes: Vec<Vec<Point2>>,
}

impl PolygonWithHoles {
    /// Builds and validates a polygon, reorienting rings as needed.
    ///
    /// # Errors
    ///
    /// Returns a [`PolygonError`] describing the first violation found.
    pub fn build(outer: Vec<Point2>, holes: Vec<Vec<Point2>>) -> Result<Self, PolygonError> {
        Self::build_with(outer, holes, OrientationPolicy::default())
    }

    /// Builds and validates a polygon with an explicit orientation policy.
    ///
    /// # Errors
    ///
    /// Returns a [`PolygonError`] describing the first violation found.
    pub fn build_with(
        outer: Vec<Point2>,
        holes: Vec<Vec<Point2>>,
        policy: OrientationPolicy,
    ) -> Result<Self, PolygonError> {
        let mut rings = Vec::with_capacity(holes.len() + 1);
        rings.push(outer);
        rings.extend(holes);

        let mut cleaned = Vec::with_capacity(rings.len());
        for (index, ring) in rings.into_iter().enumerate() {
            let ring = validate::clean_ring(index, ring)?;
            cleaned.push(orient_ring(index, ring, policy)?);
        }

        validate::check_rings(&cleaned)?;

        let mut iter = cleaned.into_iter();
        let outer = iter.next().unwrap_or_default();
        let holes: Vec<_> = iter.collect();
        debug!(
            outer_vertices = outer.len(),
            holes = holes.len(),
            "Validated polygon"
        );
        Ok(Self { outer, holes })
    }

    /// A polygon without holes.
    ///
    /// # Errors
    ///
    /// Returns a [`PolygonError`] describing the first violation found.
    pub fn simple(outer: Vec<Point2>) -> Result<Self, PolygonError> {
        Self::build(outer, Vec::new())
    }

    /// The counter-clockwise outer ring.
    #[must_use]
    pub fn outer(&self) -> &[Point2] {
        &self.outer
    }

    /// The clockwise hole rings.
    #[must_use]
    pub fn holes(&self) -> &[Vec<Point2>] {
        &self.holes
    }

    /// All rings, outer first.
    pub fn rings(&self) -> impl Iterator<Item = &[Point2]> {
        std::iter::once(self.outer.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }

    /// Total number of vertices (equal to the number of edges) over all rings.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.outer.len() + self.holes.iter().map(Vec::len).sum::<usize>()
    }

    /// Area enclosed by the outer ring minus the holes.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.rings().map(signed_area).sum()
    }
}

/// Orients ring `index` (0 = outer) according to `policy`.
fn orient_ring(
    index: usize,
    mut ring: Vec<Point2>,
    policy: OrientationPolicy,
) -> Result<Vec<Point2>, PolygonError> {
    let area = signed_area(&ring);
    let want_ccw = index == 0;
    if (area > 0.0) == want_ccw {
        return Ok(ring);
    }
    match policy {
        OrientationPolicy::Reorient => {
            debug!(ring = index, "Reversing misoriented ring");
            ring.reverse();
            Ok(ring)
        }
        OrientationPolicy::Strict => Err(PolygonError::Orientation {
            ring: index,
            expected: if want_ccw {
                "counter-clockwise"
            } else {
                "clockwise"
            },
        }),
    }
}
