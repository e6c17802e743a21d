//! Dijkstra shortest path over the visibility graph.

use serde::Serialize;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::graph::RouteGraph;

/// Improvements smaller than this do not replace an already-found route.
const RELAX_EPS_NM: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Heap entry ordered by distance, then node index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    distance: FloatOrd,
    node: usize,
}

/// Ordered node indices from source to target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    pub nodes: Vec<usize>,
    pub total_nm: f64,
    pub nodes_visited: usize,
}

/// Shortest path from `source` to `target`, or `None` when unreachable.
///
/// Ties are broken by node index and by discovery order, so a given graph
/// always yields the same path and a direct edge beats an equal-length detour.
pub fn shortest_path(graph: &RouteGraph, source: usize, target: usize) -> Option<Path> {
    let n = graph.node_count();
    if source >= n || target >= n {
        return None;
    }

    let mut dist = vec![f64::INFINITY; n];
    let mut came_from: Vec<Option<usize>> = vec![None; n];
    let mut closed = vec![false; n];
    let mut open_set: BinaryHeap<Reverse<OpenNode>> = BinaryHeap::new();

    dist[source] = 0.0;
    open_set.push(Reverse(OpenNode {
        distance: FloatOrd(0.0),
        node: source,
    }));

    let mut nodes_visited = 0usize;
    let mut reached = false;

    while let Some(Reverse(current)) = open_set.pop() {
        if closed[current.node] {
            continue;
        }
        closed[current.node] = true;
        nodes_visited += 1;

        if current.node == target {
            reached = true;
            break;
        }

        for &(next, weight) in graph.neighbors(current.node) {
            if closed[next] {
                continue;
            }
            let tentative = dist[current.node] + weight;
            if tentative < dist[next] - RELAX_EPS_NM {
                dist[next] = tentative;
                came_from[next] = Some(current.node);
                open_set.push(Reverse(OpenNode {
                    distance: FloatOrd(tentative),
                    node: next,
                }));
            }
        }
    }

    if !reached {
        return None;
    }

    let mut nodes = vec![target];
    let mut current = target;
    while let Some(previous) = came_from[current] {
        nodes.push(previous);
        current = previous;
    }
    nodes.reverse();

    Some(Path {
        nodes,
        total_nm: dist[target],
        nodes_visited,
    })
}
