use slotmap::SecondaryMap;
use tracing::debug;

use super::graph::{EdgeKind, NodeId, SkeletonGraph};
use crate::math::Segment2;

/// Trims short stray branches from the inner skeleton.
///
/// An inner bisector hanging from a node of inner degree one is removed when
/// that node's time (its distance from the contour) is below `min_height`.
/// Removal repeats until no such branch remains, so whole low chains are
/// eaten from their tips.
pub struct PruneSkeleton2D<'a> {
    graph: &'a SkeletonGraph,
    min_height: f64,
}

impl<'a> PruneSkeleton2D<'a> {
    /// Creates a new `PruneSkeleton2D` operation.
    #[must_use]
    pub fn new(graph: &'a SkeletonGraph, min_height: f64) -> Self {
        Self { graph, min_height }
    }

    /// Returns the surviving inner skeleton segments in graph order.
    #[must_use]
    pub fn execute(&self) -> Vec<Segment2> {
        let mut edges: Vec<(NodeId, NodeId)> = Vec::new();
        let mut degree: SecondaryMap<NodeId, usize> = SecondaryMap::new();
        for (id, he) in self.graph.half_edges() {
            if he.kind != EdgeKind::InnerBisector || id > he.twin {
                continue;
            }
            let Some(target) = self.graph.target(id) else {
                continue;
            };
            edges.push((he.origin, target));
            for node in [he.origin, target] {
                if let Some(entry) = degree.entry(node) {
                    *entry.or_insert(0) += 1;
                }
            }
        }

        let height = |node: NodeId| self.graph.node(node).map_or(0.0, |n| n.time);
        let mut removed = vec![false; edges.len()];
        loop {
            let mut changed = false;
            for (index, &(a, b)) in edges.iter().enumerate() {
                if removed[index] {
                    continue;
                }
                let stray = [a, b]
                    .iter()
                    .any(|&n| degree.get(n) == Some(&1) && height(n) < self.min_height);
                if stray {
                    removed[index] = true;
                    for node in [a, b] {
                        if let Some(d) = degree.get_mut(node) {
                            *d -= 1;
                        }
                    }
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        let kept: Vec<Segment2> = edges
            .iter()
            .zip(&removed)
            .filter_map(|(&(a, b), &gone)| {
                if gone {
                    return None;
                }
                let start = self.graph.node(a)?.point;
                let end = self.graph.node(b)?.point;
                Some(Segment2::new(start, end))
            })
            .collect();
        debug!(
            total = edges.len(),
            kept = kept.len(),
            min_height = self.min_height,
            "Pruned inner skeleton"
        );
        kept
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use crate::polygon::PolygonWithHoles;
    use crate::skeleton::StraightSkeleton2D;

    fn skeleton(coords: &[(f64, f64)]) -> SkeletonGraph {
        let poly =
            PolygonWithHoles::simple(coords.iter().map(|&(x, y)| Point2::new(x, y)).collect())
                .unwrap();
        StraightSkeleton2D::new(&poly).execute().unwrap()
    }

    #[test]
    fn rectangle_ridge_survives_low_threshold() {
        let graph = skeleton(&[(0.0, 0.0), (10.0, 0.0), (10.0, 6.0), (0.0, 6.0)]);
        let kept = PruneSkeleton2D::new(&graph, 2.0).execute();
        assert_eq!(kept.len(), 1);
        assert!((kept[0].length() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn rectangle_ridge_removed_above_its_height() {
        let graph = skeleton(&[(0.0, 0.0), (10.0, 0.0), (10.0, 6.0), (0.0, 6.0)]);
        assert!(PruneSkeleton2D::new(&graph, 4.0).execute().is_empty());
    }

    #[test]
    fn l_shape_branches_pruned_from_tips() {
        let graph = skeleton(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 2.0),
            (2.0, 2.0),
            (2.0, 4.0),
            (0.0, 4.0),
        ]);
        assert_eq!(PruneSkeleton2D::new(&graph, 0.5).execute().len(), 2);
        assert!(PruneSkeleton2D::new(&graph, 1.5).execute().is_empty());
    }
}
