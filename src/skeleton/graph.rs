use std::collections::{HashMap, HashSet};

use slotmap::SlotMap;

use crate::error::{Result, SkeletonError};
use crate::math::polygon_2d::{left_normal, segment_direction};
use crate::math::{Point2, Segment2, Vector2};
use crate::polygon::PolygonWithHoles;

slotmap::new_key_type! {
    /// Unique identifier for a skeleton node.
    pub struct NodeId;
}

slotmap::new_key_type! {
    /// Unique identifier for a skeleton half-edge.
    pub struct HalfEdgeId;
}

/// Classification of a skeleton edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Bisector between two skeleton nodes, away from the boundary.
    InnerBisector,
    /// Bisector leaving an original contour vertex.
    OuterBisector,
    /// An original polygon edge.
    Border,
}

impl EdgeKind {
    /// Integer code used by the flat export (0 inner, 1 outer, 2 border).
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::InnerBisector => 0,
            Self::OuterBisector => 1,
            Self::Border => 2,
        }
    }
}

/// A skeleton node: position plus the time the wavefront reached it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeData {
    pub point: Point2,
    pub time: f64,
    /// `true` for original polygon vertices.
    pub contour: bool,
}

/// A directed skeleton edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfEdgeData {
    pub origin: NodeId,
    pub twin: HalfEdgeId,
    pub next: HalfEdgeId,
    pub prev: HalfEdgeId,
    /// Index of the contour edge whose roof face lies to the left; `None`
    /// on the unbounded side of a border edge.
    pub face: Option<usize>,
    pub kind: EdgeKind,
}

/// An original polygon edge and the supporting line of its moving front.
///
/// At time `t` the front of this edge is the line `normal · p = offset() + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourEdge {
    pub ring: usize,
    pub start: Point2,
    pub end: Point2,
    /// Unit direction from `start` to `end`.
    pub direction: Vector2,
    /// Unit normal pointing into the polygon interior.
    pub normal: Vector2,
}

impl ContourEdge {
    fn new(ring: usize, start: Point2, end: Point2) -> Result<Self> {
        let direction = segment_direction(&start, &end)?;
        Ok(Self {
            ring,
            start,
            end,
            direction,
            normal: left_normal(direction),
        })
    }

    /// Signed distance of the supporting line from the origin.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.normal.dot(&self.start.coords)
    }

    /// Signed distance of `point` ahead of this edge's front at time `time`.
    #[must_use]
    pub fn distance_ahead(&self, point: &Point2, time: f64) -> f64 {
        self.normal.dot(&point.coords) - self.offset() - time
    }
}

/// Undirected skeleton edges grouped the way consumers usually draw them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkeletonLines {
    /// Inner bisectors.
    pub skeletons: Vec<Segment2>,
    /// Endpoint times of each entry in `skeletons`.
    pub heights: Vec<(f64, f64)>,
    /// Outer bisectors, oriented from the contour vertex inward.
    pub bisectors: Vec<Segment2>,
    /// Original polygon edges in ring order.
    pub contours: Vec<Segment2>,
}

/// The straight skeleton of a polygon with holes as a half-edge graph.
///
/// Faces are indexed by contour edge: edge `i` of the concatenated rings
/// (outer first) owns face `i`. Iteration order is insertion order: border
/// pairs first in ring order, then bisector pairs in creation order.
#[derive(Debug, Clone)]
pub struct SkeletonGraph {
    nodes: SlotMap<NodeId, NodeData>,
    half_edges: SlotMap<HalfEdgeId, HalfEdgeData>,
    contour_edges: Vec<ContourEdge>,
    rings: Vec<Vec<Point2>>,
    borders: Vec<HalfEdgeId>,
}

impl SkeletonGraph {
    /// Number of nodes, contour vertices included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of half-edges (twice the number of edges).
    #[must_use]
    pub fn half_edge_count(&self) -> usize {
        self.half_edges.len()
    }

    /// Iterates over all nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeData)> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Iterates over all half-edges in stable order, twins adjacent.
    pub fn half_edges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdgeData)> {
        self.half_edges.iter()
    }

    #[must_use]
    pub fn half_edge(&self, id: HalfEdgeId) -> Option<&HalfEdgeData> {
        self.half_edges.get(id)
    }

    /// The node a half-edge points to.
    #[must_use]
    pub fn target(&self, id: HalfEdgeId) -> Option<NodeId> {
        let he = self.half_edges.get(id)?;
        self.half_edges.get(he.twin).map(|twin| twin.origin)
    }

    /// Origin and target positions of a half-edge.
    #[must_use]
    pub fn endpoints(&self, id: HalfEdgeId) -> Option<(Point2, Point2)> {
        let (from, to) = self.end_nodes(id)?;
        Some((from.point, to.point))
    }

    /// Origin and target times of a half-edge.
    #[must_use]
    pub fn times(&self, id: HalfEdgeId) -> Option<(f64, f64)> {
        let (from, to) = self.end_nodes(id)?;
        Some((from.time, to.time))
    }

    #[must_use]
    pub fn kind(&self, id: HalfEdgeId) -> Option<EdgeKind> {
        self.half_edges.get(id).map(|he| he.kind)
    }

    fn end_nodes(&self, id: HalfEdgeId) -> Option<(&NodeData, &NodeData)> {
        let he = self.half_edges.get(id)?;
        let from = self.nodes.get(he.origin)?;
        let to = self.nodes.get(self.target(id)?)?;
        Some((from, to))
    }

    /// The original polygon edges, outer ring first.
    #[must_use]
    pub fn contour_edges(&self) -> &[ContourEdge] {
        &self.contour_edges
    }

    /// The validated input rings, outer first.
    #[must_use]
    pub fn rings(&self) -> &[Vec<Point2>] {
        &self.rings
    }

    /// The border half-edge running along contour edge `face`.
    #[must_use]
    pub fn border_half_edge(&self, face: usize) -> Option<HalfEdgeId> {
        self.borders.get(face).copied()
    }

    /// Half-edges bounding the roof face of contour edge `face`, starting at
    /// its border half-edge and following `next`.
    #[must_use]
    pub fn face_loop(&self, face: usize) -> Vec<HalfEdgeId> {
        let Some(start) = self.border_half_edge(face) else {
            return Vec::new();
        };
        let mut result = vec![start];
        let mut current = start;
        while let Some(he) = self.half_edges.get(current) {
            if he.next == start || result.len() > self.half_edges.len() {
                break;
            }
            current = he.next;
            result.push(current);
        }
        result
    }

    /// Latest node time, i.e. the time the last wavefront collapsed.
    #[must_use]
    pub fn max_time(&self) -> f64 {
        self.nodes.values().map(|n| n.time).fold(0.0, f64::max)
    }

    /// One record per undirected edge, grouped by kind.
    #[must_use]
    pub fn lines(&self) -> SkeletonLines {
        let mut lines = SkeletonLines::default();
        let mut seen = HashSet::new();
        for (id, he) in &self.half_edges {
            if seen.contains(&id) {
                continue;
            }
            seen.insert(he.twin);
            let Some((from, to)) = self.end_nodes(id) else {
                continue;
            };
            match he.kind {
                EdgeKind::Border => {
                    if he.face.is_some() {
                        lines.contours.push(Segment2::new(from.point, to.point));
                    }
                }
                EdgeKind::OuterBisector => {
                    let segment = if from.contour {
                        Segment2::new(from.point, to.point)
                    } else {
                        Segment2::new(to.point, from.point)
                    };
                    lines.bisectors.push(segment);
                }
                EdgeKind::InnerBisector => {
                    lines.skeletons.push(Segment2::new(from.point, to.point));
                    lines.heights.push((from.time, to.time));
                }
            }
        }
        lines
    }
}

/// Incremental construction of a [`SkeletonGraph`] by the wavefront engine.
#[derive(Debug)]
pub(crate) struct GraphBuilder {
    nodes: SlotMap<NodeId, NodeData>,
    half_edges: SlotMap<HalfEdgeId, HalfEdgeData>,
    contour_edges: Vec<ContourEdge>,
    rings: Vec<Vec<Point2>>,
    borders: Vec<HalfEdgeId>,
    ring_nodes: Vec<Vec<NodeId>>,
}

impl GraphBuilder {
    /// Seeds the graph with the contour nodes and border edges of `polygon`.
    pub(crate) fn new(polygon: &PolygonWithHoles) -> Result<Self> {
        let mut builder = Self {
            nodes: SlotMap::with_key(),
            half_edges: SlotMap::with_key(),
            contour_edges: Vec::with_capacity(polygon.vertex_count()),
            rings: polygon.rings().map(<[Point2]>::to_vec).collect(),
            borders: Vec::with_capacity(polygon.vertex_count()),
            ring_nodes: Vec::new(),
        };

        for (ring_index, ring) in polygon.rings().enumerate() {
            let ids: Vec<NodeId> = ring
                .iter()
                .map(|&point| {
                    builder.nodes.insert(NodeData {
                        point,
                        time: 0.0,
                        contour: true,
                    })
                })
                .collect();
            let n = ring.len();
            for i in 0..n {
                let j = (i + 1) % n;
                let face = builder.contour_edges.len();
                builder
                    .contour_edges
                    .push(ContourEdge::new(ring_index, ring[i], ring[j])?);
                let (inner, _) =
                    builder.insert_pair(ids[i], ids[j], Some(face), None, EdgeKind::Border);
                builder.borders.push(inner);
            }
            builder.ring_nodes.push(ids);
        }
        Ok(builder)
    }

    pub(crate) fn contour_edges(&self) -> &[ContourEdge] {
        &self.contour_edges
    }

    /// Contour node ids per ring, parallel to the polygon's rings.
    pub(crate) fn ring_nodes(&self) -> &[Vec<NodeId>] {
        &self.ring_nodes
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    pub(crate) fn add_node(&mut self, point: Point2, time: f64) -> NodeId {
        self.nodes.insert(NodeData {
            point,
            time,
            contour: false,
        })
    }

    /// Adds the bisector `from → to` with face `left` on its left and
    /// `right` on its right. Zero-length bisectors (same node) are skipped.
    pub(crate) fn add_bisector(&mut self, from: NodeId, to: NodeId, left: usize, right: usize) {
        if from == to {
            return;
        }
        let touches_contour = [from, to]
            .iter()
            .any(|&id| self.nodes.get(id).is_some_and(|n| n.contour));
        let kind = if touches_contour {
            EdgeKind::OuterBisector
        } else {
            EdgeKind::InnerBisector
        };
        self.insert_pair(from, to, Some(left), Some(right), kind);
    }

    fn insert_pair(
        &mut self,
        from: NodeId,
        to: NodeId,
        left: Option<usize>,
        right: Option<usize>,
        kind: EdgeKind,
    ) -> (HalfEdgeId, HalfEdgeId) {
        let forward = self.half_edges.insert_with_key(|id| HalfEdgeData {
            origin: from,
            twin: id,
            next: id,
            prev: id,
            face: left,
            kind,
        });
        let backward = self.half_edges.insert_with_key(|id| HalfEdgeData {
            origin: to,
            twin: forward,
            next: id,
            prev: id,
            face: right,
            kind,
        });
        self.half_edges[forward].twin = backward;
        (forward, backward)
    }

    /// Links `next`/`prev` around every face and checks that each face is a
    /// single closed loop.
    ///
    /// # Errors
    ///
    /// Returns [`SkeletonError::Inconsistent`] if a face visits a node twice,
    /// a loop cannot be continued, or a face splits into several loops.
    pub(crate) fn finish(mut self) -> std::result::Result<SkeletonGraph, SkeletonError> {
        let mut outgoing: HashMap<(usize, NodeId), HalfEdgeId> = HashMap::new();
        let mut face_sizes = vec![0_usize; self.contour_edges.len()];
        for (id, he) in &self.half_edges {
            let Some(face) = he.face else { continue };
            if outgoing.insert((face, he.origin), id).is_some() {
                return Err(SkeletonError::Inconsistent(format!(
                    "face {face} leaves one node twice"
                )));
            }
            face_sizes[face] += 1;
        }

        let links: Vec<(HalfEdgeId, HalfEdgeId)> = self
            .half_edges
            .iter()
            .filter_map(|(id, he)| {
                let face = he.face?;
                let target = self.half_edges[he.twin].origin;
                Some(
                    outgoing
                        .get(&(face, target))
                        .map(|&next| (id, next))
                        .ok_or(face),
                )
            })
            .collect::<std::result::Result<_, usize>>()
            .map_err(|face| {
                SkeletonError::Inconsistent(format!("face {face} does not close"))
            })?;

        // Unbounded side of each ring runs against ring order.
        let mut offset = 0;
        for ring in &self.ring_nodes {
            let n = ring.len();
            for i in 0..n {
                let outer = self.half_edges[self.borders[offset + i]].twin;
                let previous = self.half_edges[self.borders[offset + (i + n - 1) % n]].twin;
                self.half_edges[outer].next = previous;
                self.half_edges[previous].prev = outer;
            }
            offset += n;
        }

        for (id, next) in links {
            self.half_edges[id].next = next;
            self.half_edges[next].prev = id;
        }

        let graph = SkeletonGraph {
            nodes: self.nodes,
            half_edges: self.half_edges,
            contour_edges: self.contour_edges,
            rings: self.rings,
            borders: self.borders,
        };
        for (face, &size) in face_sizes.iter().enumerate() {
            let walked = graph.face_loop(face).len();
            if walked != size {
                return Err(SkeletonError::Inconsistent(format!(
                    "face {face} has {size} half-edges but its loop visits {walked}"
                )));
            }
        }
        Ok(graph)
    }
}
