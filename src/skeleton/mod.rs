//! Interior straight skeletons of polygons with holes.
//!
//! Every polygon edge moves inward at unit speed; the skeleton is the set of
//! trajectories traced by the wavefront vertices until the front vanishes.
//! [`StraightSkeleton2D`] runs the event simulation and returns a
//! [`SkeletonGraph`], a half-edge graph whose faces are indexed by the
//! contour edge they rise from.

mod event;
pub mod graph;
pub mod options;
pub mod prune;
mod wavefront;

pub use graph::{
    ContourEdge, EdgeKind, HalfEdgeData, HalfEdgeId, NodeData, NodeId, SkeletonGraph,
    SkeletonLines,
};
pub use options::SkeletonOptions;
pub use prune::PruneSkeleton2D;

use tracing::info;

use crate::error::Result;
use crate::polygon::PolygonWithHoles;
use wavefront::Wavefront;

/// Computes the interior straight skeleton of a validated polygon.
pub struct StraightSkeleton2D<'a> {
    polygon: &'a PolygonWithHoles,
    options: SkeletonOptions,
}

impl<'a> StraightSkeleton2D<'a> {
    /// Creates a new `StraightSkeleton2D` operation with default options.
    #[must_use]
    pub fn new(polygon: &'a PolygonWithHoles) -> Self {
        Self {
            polygon,
            options: SkeletonOptions::default(),
        }
    }

    /// Replaces the construction options.
    #[must_use]
    pub fn with_options(mut self, options: SkeletonOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs the wavefront simulation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SkeletonError`] if the event budget runs out,
    /// a wavefront vertex survives the simulation, or the resulting faces do
    /// not close.
    pub fn execute(&self) -> Result<SkeletonGraph> {
        info!(
            vertices = self.polygon.vertex_count(),
            holes = self.polygon.holes().len(),
            "Computing straight skeleton"
        );
        let graph = Wavefront::new(self.polygon, &self.options)?.run()?;
        info!(
            nodes = graph.node_count(),
            half_edges = graph.half_edge_count(),
            max_time = graph.max_time(),
            "Straight skeleton complete"
        );
        Ok(graph)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;

    fn ring(coords: &[(f64, f64)]) -> Vec<Point2> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    fn skeleton(poly: &PolygonWithHoles) -> SkeletonGraph {
        StraightSkeleton2D::new(poly).execute().unwrap()
    }

    fn assert_linked(graph: &SkeletonGraph) {
        for (id, he) in graph.half_edges() {
            let twin = graph.half_edge(he.twin).unwrap();
            assert_eq!(twin.twin, id);
            assert_ne!(he.twin, id);
            assert_eq!(graph.half_edge(he.next).unwrap().prev, id);
            assert_eq!(graph.target(id), Some(graph.half_edge(he.next).unwrap().origin));
            assert_eq!(he.kind, twin.kind);
        }
    }

    fn kind_count(graph: &SkeletonGraph, kind: EdgeKind) -> usize {
        graph.half_edges().filter(|(_, he)| he.kind == kind).count()
    }

    #[test]
    fn square_meets_at_center() {
        let poly = PolygonWithHoles::simple(ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]))
            .unwrap();
        let graph = skeleton(&poly);
        assert_linked(&graph);
        assert_eq!(graph.node_count(), 5);
        assert_eq!(kind_count(&graph, EdgeKind::Border), 8);
        assert_eq!(kind_count(&graph, EdgeKind::OuterBisector), 8);
        assert_eq!(kind_count(&graph, EdgeKind::InnerBisector), 0);

        let (_, center) = graph.nodes().find(|(_, n)| !n.contour).unwrap();
        assert!((center.point - Point2::new(2.0, 2.0)).norm() < 1e-9);
        assert!((center.time - 2.0).abs() < 1e-9);
        for face in 0..4 {
            assert_eq!(graph.face_loop(face).len(), 3);
        }
    }

    #[test]
    fn triangle_meets_at_incenter() {
        let poly = PolygonWithHoles::simple(ring(&[(0.0, 0.0), (4.0, 0.0), (0.0, 4.0)])).unwrap();
        let graph = skeleton(&poly);
        assert_linked(&graph);
        let r = 4.0 / (2.0 + 2.0_f64.sqrt());
        let (_, center) = graph.nodes().find(|(_, n)| !n.contour).unwrap();
        assert!((center.point - Point2::new(r, r)).norm() < 1e-9);
        assert!((graph.max_time() - r).abs() < 1e-9);
    }

    #[test]
    fn rectangle_has_single_ridge() {
        let poly =
            PolygonWithHoles::simple(ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 6.0), (0.0, 6.0)]))
                .unwrap();
        let graph = skeleton(&poly);
        assert_linked(&graph);
        let lines = graph.lines();
        assert_eq!(lines.skeletons.len(), 1);
        assert_eq!(lines.bisectors.len(), 4);
        assert_eq!(lines.contours.len(), 4);
        assert!((lines.skeletons[0].length() - 4.0).abs() < 1e-9);
        assert_eq!(lines.heights[0], (3.0, 3.0));
    }

    #[test]
    fn l_shape_reflex_vertex_reaches_corner_node() {
        let poly = PolygonWithHoles::simple(ring(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 2.0),
            (2.0, 2.0),
            (2.0, 4.0),
            (0.0, 4.0),
        ]))
        .unwrap();
        let graph = skeleton(&poly);
        assert_linked(&graph);
        assert_eq!(graph.node_count(), 9);
        assert_eq!(graph.half_edge_count(), 28);
        assert!((graph.max_time() - 1.0).abs() < 1e-9);
        let hub = graph
            .nodes()
            .find(|(_, n)| (n.point - Point2::new(1.0, 1.0)).norm() < 1e-9)
            .map(|(id, _)| id)
            .unwrap();
        let degree = graph.half_edges().filter(|(_, he)| he.origin == hub).count();
        assert_eq!(degree, 4);
    }

    #[test]
    fn rectangle_with_hole_links_both_rings() {
        let poly = PolygonWithHoles::build(
            ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 6.0), (0.0, 6.0)]),
            vec![ring(&[(4.0, 2.0), (4.0, 4.0), (6.0, 4.0), (6.0, 2.0)])],
        )
        .unwrap();
        let graph = skeleton(&poly);
        assert_linked(&graph);
        assert_eq!(graph.contour_edges().len(), 8);
        assert_eq!(kind_count(&graph, EdgeKind::Border), 16);
        assert_eq!(kind_count(&graph, EdgeKind::OuterBisector), 16);
        assert!((graph.max_time() - 2.0).abs() < 1e-9);
        for face in 0..8 {
            assert!(graph.face_loop(face).len() >= 3);
        }
    }

    #[test]
    fn border_edges_reproduce_rings() {
        let outer = ring(&[(0.0, 0.0), (6.0, 0.0), (6.0, 2.0), (3.0, 5.0), (0.0, 2.0)]);
        let poly = PolygonWithHoles::simple(outer.clone()).unwrap();
        let graph = skeleton(&poly);
        let traced: Vec<Point2> = (0..outer.len())
            .map(|face| {
                let border = graph.border_half_edge(face).unwrap();
                assert_eq!(graph.kind(border), Some(EdgeKind::Border));
                graph.endpoints(border).unwrap().0
            })
            .collect();
        assert_eq!(traced, outer);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let poly = PolygonWithHoles::simple(ring(&[
            (0.0, 0.0),
            (7.0, 0.0),
            (7.0, 3.0),
            (4.0, 3.0),
            (4.0, 6.0),
            (0.0, 5.0),
        ]))
        .unwrap();
        let endpoints = |g: &SkeletonGraph| -> Vec<(Point2, Point2)> {
            g.half_edges()
                .map(|(id, _)| g.endpoints(id).unwrap())
                .collect()
        };
        let first = skeleton(&poly);
        let second = skeleton(&poly);
        assert_eq!(endpoints(&first), endpoints(&second));
    }
}
