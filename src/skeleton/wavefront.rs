use tracing::{debug, trace};

use super::event::{EventKind, EventQueue};
use super::graph::{ContourEdge, GraphBuilder, NodeId, SkeletonGraph};
use super::options::SkeletonOptions;
use crate::error::{Result, SkeletonError};
use crate::math::polygon_2d::bounding_diagonal;
use crate::math::{cross_2d, Point2, Vector2};
use crate::polygon::PolygonWithHoles;

/// Closing speeds below this are treated as parallel motion.
const RATE_EPS: f64 = 1e-12;

/// Normals closer than this (via `1 - dot`) are treated as the same direction.
const PARALLEL_EPS: f64 = 1e-12;

/// Normals closer than this (via `1 + dot`) are treated as opposed.
const OPPOSED_EPS: f64 = 1e-9;

/// A vertex of the moving wavefront, valid from `time` until retired.
#[derive(Debug, Clone, Copy)]
struct WavefrontVertex {
    origin: Point2,
    time: f64,
    /// `None` when the two incident fronts face each other head on.
    velocity: Option<Vector2>,
    left: usize,
    right: usize,
    prev: usize,
    next: usize,
    node: NodeId,
    reflex: bool,
    active: bool,
}

impl WavefrontVertex {
    fn position_at(&self, time: f64) -> Point2 {
        self.velocity
            .map_or(self.origin, |v| self.origin + v * (time - self.time))
    }
}

/// Event-driven simulation of the inward-moving polygon boundary.
///
/// Each ring becomes a cyclic list of wavefront vertices. Vertices are
/// never mutated in place apart from their links and `active` flag: every
/// topological change retires the consumed vertices, records their
/// trajectories in the graph, and spawns replacements.
pub(super) struct Wavefront {
    graph: GraphBuilder,
    edges: Vec<ContourEdge>,
    vertices: Vec<WavefrontVertex>,
    queue: EventQueue,
    eps: f64,
    recent: Vec<NodeId>,
    recent_time: f64,
    budget: usize,
}

impl Wavefront {
    pub(super) fn new(polygon: &PolygonWithHoles, options: &SkeletonOptions) -> Result<Self> {
        let graph = GraphBuilder::new(polygon)?;
        let edges = graph.contour_edges().to_vec();
        let eps = options.tolerance * bounding_diagonal(polygon.rings().flatten());
        let budget = options.event_budget(edges.len());

        let mut wavefront = Self {
            graph,
            edges,
            vertices: Vec::new(),
            queue: EventQueue::default(),
            eps,
            recent: Vec::new(),
            recent_time: 0.0,
            budget,
        };

        let rings = wavefront.graph.ring_nodes().to_vec();
        let mut first_edge = 0;
        for ids in &rings {
            let n = ids.len();
            let base = wavefront.vertices.len();
            for (i, &node) in ids.iter().enumerate() {
                let left = first_edge + (i + n - 1) % n;
                let right = first_edge + i;
                let point = wavefront.edges[right].start;
                let index = wavefront.spawn(point, 0.0, left, right, node);
                wavefront.vertices[index].prev = base + (i + n - 1) % n;
                wavefront.vertices[index].next = base + (i + 1) % n;
            }
            first_edge += n;
        }
        Ok(wavefront)
    }

    /// Runs the simulation to completion and returns the linked graph.
    pub(super) fn run(mut self) -> Result<SkeletonGraph> {
        for index in 0..self.vertices.len() {
            self.resolve(index, 0.0)?;
        }
        debug!(
            vertices = self.vertices.len(),
            queued = self.queue.len(),
            eps = self.eps,
            "Wavefront initialized"
        );

        let mut processed = 0;
        let mut stale = 0;
        while let Some(event) = self.queue.pop() {
            let handled = match event.kind {
                EventKind::Edge { left, right } => {
                    self.handle_edge_event(left, right, event.time, event.point)?
                }
                EventKind::Split { vertex, edge } => {
                    self.handle_split_event(vertex, edge, event.time, event.point)?
                }
            };
            if !handled {
                stale += 1;
                continue;
            }
            processed += 1;
            if processed > self.budget {
                return Err(SkeletonError::EventBudgetExhausted { limit: self.budget }.into());
            }
        }
        debug!(processed, stale, "Event queue drained");

        if let Some(index) = self.vertices.iter().position(|v| v.active) {
            return Err(SkeletonError::Degenerate(format!(
                "wavefront vertex {index} never collapsed"
            ))
            .into());
        }
        Ok(self.graph.finish()?)
    }

    fn spawn(&mut self, point: Point2, time: f64, left: usize, right: usize, node: NodeId) -> usize {
        let (a, b) = (&self.edges[left], &self.edges[right]);
        let dot = a.normal.dot(&b.normal);
        let velocity = if dot > 1.0 - PARALLEL_EPS {
            Some(a.normal)
        } else if 1.0 + dot < OPPOSED_EPS {
            None
        } else {
            Some((a.normal + b.normal) / (1.0 + dot))
        };
        let reflex = cross_2d(&a.direction, &b.direction) < -PARALLEL_EPS;

        let index = self.vertices.len();
        self.vertices.push(WavefrontVertex {
            origin: point,
            time,
            velocity,
            left,
            right,
            prev: index,
            next: index,
            node,
            reflex,
            active: true,
        });
        index
    }

    fn link(&mut self, from: usize, to: usize) {
        self.vertices[from].next = to;
        self.vertices[to].prev = from;
    }

    fn position(&self, index: usize, time: f64) -> Point2 {
        self.vertices[index].position_at(time)
    }

    fn coincident(&self, index: usize, time: f64, point: &Point2) -> bool {
        (self.position(index, time) - point).norm() <= self.eps
    }

    /// The vertices of the cycle containing `start`, in `next` order.
    fn cycle(&self, start: usize) -> Result<Vec<usize>> {
        let mut members = vec![start];
        let mut current = self.vertices[start].next;
        while current != start {
            if members.len() > self.vertices.len() {
                return Err(SkeletonError::Inconsistent("wavefront cycle does not close".into()).into());
            }
            members.push(current);
            current = self.vertices[current].next;
        }
        Ok(members)
    }

    /// Records the trajectory of `index` up to `node` and deactivates it.
    fn retire(&mut self, index: usize, node: NodeId) {
        let v = self.vertices[index];
        self.graph.add_bisector(v.node, node, v.left, v.right);
        self.vertices[index].active = false;
    }

    fn node_matches(&self, id: NodeId, point: &Point2, time: f64) -> bool {
        self.graph.node(id).is_some_and(|n| {
            (n.time - time).abs() <= self.eps && (n.point - point).norm() <= self.eps
        })
    }

    /// Returns the node at `point` for the current instant, reusing one
    /// already created there by a participant or a simultaneous event.
    fn settle_node(&mut self, point: Point2, time: f64, participants: &[usize]) -> NodeId {
        if (time - self.recent_time).abs() > self.eps {
            self.recent.clear();
            self.recent_time = time;
        }
        let existing = participants
            .iter()
            .map(|&v| self.vertices[v].node)
            .chain(self.recent.iter().copied())
            .find(|&id| self.node_matches(id, &point, time));
        if let Some(id) = existing {
            return id;
        }
        let id = self.graph.add_node(point, time);
        self.recent.push(id);
        id
    }

    /// Brings a freshly spawned vertex into a consistent state at `time`
    /// and queues its future events.
    fn resolve(&mut self, start: usize, time: f64) -> Result<()> {
        let mut current = start;
        loop {
            if !self.vertices[current].active {
                return Ok(());
            }
            let cycle = self.cycle(current)?;
            if cycle.len() <= 2 {
                self.close_small_cycle(&cycle, time);
                return Ok(());
            }

            let point = self.position(current, time);
            let run = self.coincident_run(current, time, &point);
            if run.len() == cycle.len() {
                self.collapse_cycle(&cycle, time);
                return Ok(());
            }
            if run.len() >= 2 {
                current = self.merge_run(&run, point, time);
                continue;
            }
            if self.vertices[current].velocity.is_none() {
                current = self.collapse_sliver(current, time);
                continue;
            }

            self.schedule(current, time);
            return Ok(());
        }
    }

    /// Maximal chain of consecutive vertices at `point`, in `next` order.
    fn coincident_run(&self, index: usize, time: f64, point: &Point2) -> Vec<usize> {
        let mut first = index;
        loop {
            let prev = self.vertices[first].prev;
            if prev == index || !self.coincident(prev, time, point) {
                break;
            }
            first = prev;
        }
        let mut run = vec![first];
        let mut current = first;
        loop {
            let next = self.vertices[current].next;
            if next == first || !self.coincident(next, time, point) {
                break;
            }
            run.push(next);
            current = next;
        }
        run
    }

    /// Replaces a chain of vertices meeting at `point` with a single vertex.
    fn merge_run(&mut self, run: &[usize], point: Point2, time: f64) -> usize {
        let node = self.settle_node(point, time, run);
        for &index in run {
            self.retire(index, node);
        }
        let first = self.vertices[run[0]];
        let last = self.vertices[run[run.len() - 1]];
        let merged = self.spawn(point, time, first.left, last.right, node);
        self.link(first.prev, merged);
        self.link(merged, last.next);
        trace!(time, members = run.len(), "Merged coincident vertices");
        merged
    }

    /// Retires every vertex of a cycle that shrank to a single point.
    fn collapse_cycle(&mut self, cycle: &[usize], time: f64) {
        let sum = cycle
            .iter()
            .fold(Vector2::zeros(), |acc, &v| acc + self.position(v, time).coords);
        #[allow(clippy::cast_precision_loss)]
        let point = Point2::from(sum / cycle.len() as f64);
        let node = self.settle_node(point, time, cycle);
        for &index in cycle {
            self.retire(index, node);
        }
        trace!(time, members = cycle.len(), "Cycle collapsed");
    }

    /// Closes a cycle of one or two vertices.
    fn close_small_cycle(&mut self, cycle: &[usize], time: f64) {
        match *cycle {
            [a, b] if !self.coincident(b, time, &self.position(a, time)) => {
                let (pa, pb) = (self.position(a, time), self.position(b, time));
                let na = self.settle_node(pa, time, &[a]);
                let nb = self.settle_node(pb, time, &[b]);
                let va = self.vertices[a];
                self.retire(a, na);
                self.retire(b, nb);
                self.graph.add_bisector(na, nb, va.left, va.right);
                trace!(time, "Two-vertex cycle closed with a ridge");
            }
            _ => self.collapse_cycle(cycle, time),
        }
    }

    /// Resolves a vertex whose incident fronts are anti-parallel.
    ///
    /// Both neighbours lie on the shared supporting line on the same side of
    /// the vertex. The zero-width sliver up to the nearer one collapses into
    /// a ridge; ties go to the previous vertex.
    fn collapse_sliver(&mut self, index: usize, time: f64) -> usize {
        let v = self.vertices[index];
        let point = v.position_at(time);
        let to_prev = (self.position(v.prev, time) - point).norm();
        let to_next = (self.position(v.next, time) - point).norm();

        let replacement = if to_next < to_prev {
            let target = self.vertices[v.next];
            let at = target.position_at(time);
            let node = self.settle_node(at, time, &[v.next]);
            self.retire(v.next, node);
            self.retire(index, node);
            let merged = self.spawn(at, time, v.left, target.right, node);
            self.link(v.prev, merged);
            self.link(merged, target.next);
            merged
        } else {
            let target = self.vertices[v.prev];
            let at = target.position_at(time);
            let node = self.settle_node(at, time, &[v.prev]);
            self.retire(v.prev, node);
            self.retire(index, node);
            let merged = self.spawn(at, time, target.left, v.right, node);
            self.link(target.prev, merged);
            self.link(merged, v.next);
            merged
        };
        trace!(time, "Collapsed opposed fronts into a ridge");
        replacement
    }

    fn schedule(&mut self, index: usize, now: f64) {
        let v = self.vertices[index];
        self.schedule_edge_event(v.prev, index, now);
        self.schedule_edge_event(index, v.next, now);
        if v.reflex {
            self.schedule_split_events(index, now);
        }
    }

    /// Queues the collapse of the front segment between `a` and `b`.
    fn schedule_edge_event(&mut self, a: usize, b: usize, now: f64) {
        let (va, vb) = (self.vertices[a], self.vertices[b]);
        let (Some(vel_a), Some(vel_b)) = (va.velocity, vb.velocity) else {
            return;
        };
        let direction = self.edges[va.right].direction;
        let rate = direction.dot(&(vel_b - vel_a));
        if rate >= -RATE_EPS {
            return;
        }
        let gap = direction.dot(&(vb.position_at(now) - va.position_at(now)));
        let time = now + (-gap / rate).max(0.0);
        let point = nalgebra::center(&va.position_at(time), &vb.position_at(time));
        self.queue.push(time, point, EventKind::Edge { left: a, right: b });
    }

    /// Queues the first contact of reflex vertex `index` with the supporting
    /// line of every other front. Contacts off the live front are dropped
    /// when popped.
    fn schedule_split_events(&mut self, index: usize, now: f64) {
        let v = self.vertices[index];
        let Some(velocity) = v.velocity else {
            return;
        };
        let point = v.position_at(now);
        for (edge, front) in self.edges.iter().enumerate() {
            if edge == v.left || edge == v.right {
                continue;
            }
            let speed = 1.0 - front.normal.dot(&velocity);
            if speed <= RATE_EPS {
                continue;
            }
            let ahead = front.distance_ahead(&point, now);
            if ahead < -self.eps {
                continue;
            }
            let time = now + ahead.max(0.0) / speed;
            self.queue.push(
                time,
                v.position_at(time),
                EventKind::Split {
                    vertex: index,
                    edge,
                },
            );
        }
    }

    fn handle_edge_event(&mut self, a: usize, b: usize, time: f64, point: Point2) -> Result<bool> {
        let (va, vb) = (self.vertices[a], self.vertices[b]);
        if !va.active || !vb.active || va.next != b {
            return Ok(false);
        }
        trace!(time, left = a, right = b, "Edge event");

        let mut before = Vec::new();
        let mut cursor = a;
        loop {
            let prev = self.vertices[cursor].prev;
            if prev == b || !self.coincident(prev, time, &point) {
                break;
            }
            before.push(prev);
            cursor = prev;
        }
        let mut after = Vec::new();
        cursor = b;
        loop {
            let next = self.vertices[cursor].next;
            if next == a || before.last() == Some(&next) || !self.coincident(next, time, &point) {
                break;
            }
            after.push(next);
            cursor = next;
        }
        let run: Vec<usize> = before
            .into_iter()
            .rev()
            .chain([a, b])
            .chain(after)
            .collect();

        let cycle = self.cycle(a)?;
        if run.len() >= cycle.len() {
            self.collapse_cycle(&cycle, time);
        } else {
            let merged = self.merge_run(&run, point, time);
            self.resolve(merged, time)?;
        }
        Ok(true)
    }

    fn handle_split_event(
        &mut self,
        index: usize,
        edge: usize,
        time: f64,
        point: Point2,
    ) -> Result<bool> {
        let v = self.vertices[index];
        if !v.active {
            return Ok(false);
        }
        let Some((x, y)) = self.find_front_segment(edge, index, time, &point) else {
            return Ok(false);
        };
        trace!(time, vertex = index, edge, "Split event");

        let node = self.settle_node(point, time, &[index]);
        self.retire(index, node);
        let first = self.spawn(point, time, v.left, edge, node);
        let second = self.spawn(point, time, edge, v.right, node);
        self.link(v.prev, first);
        self.link(first, y);
        self.link(x, second);
        self.link(second, v.next);

        self.resolve(first, time)?;
        self.resolve(second, time)?;
        Ok(true)
    }

    /// Finds the live front segment of `edge` containing `point` at `time`,
    /// as its bounding vertex pair.
    fn find_front_segment(
        &self,
        edge: usize,
        exclude: usize,
        time: f64,
        point: &Point2,
    ) -> Option<(usize, usize)> {
        let direction = self.edges[edge].direction;
        let along = direction.dot(&point.coords);
        self.vertices.iter().enumerate().find_map(|(x, vx)| {
            if !vx.active || vx.right != edge || x == exclude {
                return None;
            }
            let y = vx.next;
            let vy = &self.vertices[y];
            if !vy.active || vy.left != edge {
                return None;
            }
            let start = direction.dot(&vx.position_at(time).coords);
            let end = direction.dot(&vy.position_at(time).coords);
            (along >= start - self.eps && along <= end + self.eps).then_some((x, y))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn polygon(coords: &[(f64, f64)]) -> PolygonWithHoles {
        PolygonWithHoles::simple(coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()).unwrap()
    }

    fn wavefront(poly: &PolygonWithHoles) -> Wavefront {
        Wavefront::new(poly, &SkeletonOptions::default()).unwrap()
    }

    #[test]
    fn convex_corner_velocity_is_unit_per_front() {
        let poly = polygon(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let front = wavefront(&poly);
        let v = front.vertices[0];
        let velocity = v.velocity.unwrap();
        assert!((velocity - Vector2::new(1.0, 1.0)).norm() < 1e-12);
        assert!(!v.reflex);
        for edge in [v.left, v.right] {
            assert!((front.edges[edge].normal.dot(&velocity) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn reflex_corner_detected() {
        let poly = polygon(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 2.0),
            (2.0, 2.0),
            (2.0, 4.0),
            (0.0, 4.0),
        ]);
        let front = wavefront(&poly);
        let reflex: Vec<usize> = (0..front.vertices.len())
            .filter(|&i| front.vertices[i].reflex)
            .collect();
        assert_eq!(reflex, vec![3]);
        let velocity = front.vertices[3].velocity.unwrap();
        assert!((velocity - Vector2::new(-1.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn rings_are_linked_cyclically() {
        let poly = polygon(&[(0.0, 0.0), (3.0, 0.0), (0.0, 3.0)]);
        let front = wavefront(&poly);
        assert_eq!(front.cycle(0).unwrap(), vec![0, 1, 2]);
        assert_eq!(front.vertices[0].prev, 2);
    }

    #[test]
    fn rectangle_ridge_is_resolved() {
        let poly = polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 6.0), (0.0, 6.0)]);
        let graph = wavefront(&poly).run().unwrap();
        assert_eq!(graph.node_count(), 6);
        assert_eq!(graph.half_edge_count(), 18);
        assert!((graph.max_time() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn tiny_budget_is_exhausted() {
        let poly = polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 6.0), (0.0, 6.0)]);
        let options = SkeletonOptions::default().with_max_events(0);
        let err = Wavefront::new(&poly, &options).unwrap().run().unwrap_err();
        assert!(matches!(
            err,
            crate::error::RooflineError::DegenerateSkeleton(SkeletonError::EventBudgetExhausted {
                limit: 0
            })
        ));
    }
}
