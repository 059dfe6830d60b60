use std::collections::HashMap;

use tracing::debug;

use crate::error::{OperationError, Result};

/// Disjoint sets with path compression and union by rank.
#[derive(Debug)]
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    /// Merges the sets of `x` and `y`; returns `false` if already joined.
    fn union(&mut self, x: usize, y: usize) -> bool {
        let (root_x, root_y) = (self.find(x), self.find(y));
        if root_x == root_y {
            return false;
        }
        match self.rank[root_x].cmp(&self.rank[root_y]) {
            std::cmp::Ordering::Less => self.parent[root_x] = root_y,
            std::cmp::Ordering::Greater => self.parent[root_y] = root_x,
            std::cmp::Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] += 1;
            }
        }
        true
    }
}

/// Kruskal's minimum spanning tree (a forest for disconnected input).
///
/// Vertex ids may be any sparse set of indices. Edges are considered by
/// ascending weight, ties in input order, and returned in the order they
/// were accepted.
pub struct MinSpanningTree {
    edges: Vec<(usize, usize)>,
    weights: Vec<f64>,
}

impl MinSpanningTree {
    /// Creates a new `MinSpanningTree` operation.
    #[must_use]
    pub fn new(edges: Vec<(usize, usize)>, weights: Vec<f64>) -> Self {
        Self { edges, weights }
    }

    /// Selects the spanning edges.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if the edge and weight counts
    /// differ or a weight is not finite.
    pub fn execute(&self) -> Result<Vec<(usize, usize)>> {
        if self.edges.len() != self.weights.len() {
            return Err(OperationError::InvalidInput(format!(
                "{} edges but {} weights",
                self.edges.len(),
                self.weights.len()
            ))
            .into());
        }
        if let Some(index) = self.weights.iter().position(|w| !w.is_finite()) {
            return Err(OperationError::InvalidInput(format!(
                "weight of edge {index} is not finite"
            ))
            .into());
        }

        // Vertex ids are sparse; the sets run over their first-seen ranks.
        let mut dense: HashMap<usize, usize> = HashMap::new();
        for &(a, b) in &self.edges {
            for id in [a, b] {
                let next = dense.len();
                dense.entry(id).or_insert(next);
            }
        }
        let vertex_count = dense.len();
        let mut order: Vec<usize> = (0..self.edges.len()).collect();
        order.sort_by(|&a, &b| self.weights[a].total_cmp(&self.weights[b]));

        let mut sets = UnionFind::new(vertex_count);
        let tree: Vec<(usize, usize)> = order
            .into_iter()
            .map(|i| self.edges[i])
            .filter(|(a, b)| match (dense.get(a), dense.get(b)) {
                (Some(&a), Some(&b)) => sets.union(a, b),
                _ => false,
            })
            .collect();
        debug!(
            vertices = vertex_count,
            edges = self.edges.len(),
            selected = tree.len(),
            "Computed minimum spanning tree"
        );
        Ok(tree)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn picks_cheapest_spanning_edges() {
        let edges = vec![(0, 1), (1, 2), (0, 2), (2, 3), (1, 3)];
        let weights = vec![1.0, 2.0, 2.5, 1.5, 3.0];
        let tree = MinSpanningTree::new(edges, weights).execute().unwrap();
        assert_eq!(tree, vec![(0, 1), (2, 3), (1, 2)]);
    }

    #[test]
    fn ties_keep_input_order() {
        let edges = vec![(0, 1), (1, 2), (0, 2)];
        let tree = MinSpanningTree::new(edges, vec![1.0; 3]).execute().unwrap();
        assert_eq!(tree, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn disconnected_graph_gives_forest() {
        let edges = vec![(0, 1), (2, 3)];
        let tree = MinSpanningTree::new(edges, vec![1.0, 1.0]).execute().unwrap();
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn more_than_a_hundred_edges_accepted() {
        let edges: Vec<(usize, usize)> = (0..150).map(|i| (i, i + 1)).collect();
        let weights: Vec<f64> = (0..150_u32).map(|i| f64::from(150 - i)).collect();
        let tree = MinSpanningTree::new(edges, weights).execute().unwrap();
        assert_eq!(tree.len(), 150);
        assert_eq!(tree[0], (149, 150));
    }

    #[test]
    fn sparse_vertex_ids_stay_small() {
        let edges = vec![(0, 1), (1, 2_000_000_000), (0, 2_000_000_000), (usize::MAX, 1)];
        let weights = vec![1.0, 2.0, 3.0, 0.5];
        let tree = MinSpanningTree::new(edges, weights).execute().unwrap();
        assert_eq!(tree, vec![(usize::MAX, 1), (0, 1), (1, 2_000_000_000)]);
    }

    #[test]
    fn mismatched_lengths_rejected() {
        let err = MinSpanningTree::new(vec![(0, 1)], vec![]).execute();
        assert!(err.is_err());
    }

    #[test]
    fn nan_weight_rejected() {
        let err = MinSpanningTree::new(vec![(0, 1)], vec![f64::NAN]).execute();
        assert!(err.is_err());
    }

    #[test]
    fn empty_input_gives_empty_tree() {
        assert!(MinSpanningTree::new(vec![], vec![]).execute().unwrap().is_empty());
    }
}
