//! Visibility graph over water grid points plus the leg endpoints.
//!
//! Every pair of nodes is tested, so construction is O(n²) segment checks.
//! The grid size cap in the planner bounds that cost.

use serde::Serialize;

use crate::land::LandPredicate;
use crate::models::{Coordinate, GridPoint};
use crate::spatial::haversine_nm;

pub const START_NODE: usize = 0;
pub const END_NODE: usize = 1;
const GRID_NODE_OFFSET: usize = 2;

/// Undirected weighted edge, stored with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub distance_nm: f64,
}

#[derive(Debug, Clone)]
pub struct RouteGraph {
    nodes: Vec<Coordinate>,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<(usize, f64)>>,
}

impl RouteGraph {
    /// Build the graph. Node 0 is `start`, node 1 is `end`, grid point `i` is node `i + 2`.
    ///
    /// An edge joins two nodes iff their segment does not cross land; this
    /// includes the direct start-end edge and start/end to every visible grid point.
    pub fn build(
        start: Coordinate,
        end: Coordinate,
        points: &[GridPoint],
        land: &dyn LandPredicate,
    ) -> Self {
        let mut nodes = Vec::with_capacity(points.len() + GRID_NODE_OFFSET);
        nodes.push(start);
        nodes.push(end);
        nodes.extend(points.iter().map(|point| point.coord));

        let n = nodes.len();
        let mut edges = Vec::new();
        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        let mut pairs_tested = 0usize;

        for a in 0..n {
            for b in (a + 1)..n {
                pairs_tested += 1;
                if land.segment_crosses_land(nodes[a], nodes[b]) {
                    continue;
                }
                let distance_nm = haversine_nm(nodes[a], nodes[b]);
                edges.push(Edge { a, b, distance_nm });
                adjacency[a].push((b, distance_nm));
                adjacency[b].push((a, distance_nm));
            }
        }

        tracing::debug!(
            "Visibility graph: {} nodes, {} edges from {} pairs",
            n,
            edges.len(),
            pairs_tested
        );

        Self {
            nodes,
            edges,
            adjacency,
        }
    }

    pub fn grid_node(index: usize) -> usize {
        index + GRID_NODE_OFFSET
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Coordinate] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn coordinate(&self, node: usize) -> Option<Coordinate> {
        self.nodes.get(node).copied()
    }

    pub fn neighbors(&self, node: usize) -> &[(usize, f64)] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Weight of the edge between `a` and `b`, if present.
    pub fn edge_weight(&self, a: usize, b: usize) -> Option<f64> {
        self.neighbors(a)
            .iter()
            .find(|(node, _)| *node == b)
            .map(|(_, weight)| *weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::land::{segment_crosses_land, LandMask, LandPolygon};

    fn grid_points(coords: &[(f64, f64)]) -> Vec<GridPoint> {
        coords
            .iter()
            .enumerate()
            .map(|(index, &(lat, lon))| GridPoint {
                index,
                coord: Coordinate::new(lat, lon),
            })
            .collect()
    }

    fn wall() -> LandMask {
        // Thin north-south wall between lon 0.4 and 0.6, lat -1..1
        LandMask::new(vec![LandPolygon::new(vec![
            Coordinate::new(-1.0, 0.4),
            Coordinate::new(-1.0, 0.6),
            Coordinate::new(1.0, 0.6),
            Coordinate::new(1.0, 0.4),
        ])
        .unwrap()])
    }

    #[test]
    fn open_water_graph_is_complete() {
        let points = grid_points(&[(0.0, 0.5), (1.0, 0.5), (0.5, 1.0)]);
        let graph = RouteGraph::build(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            &points,
            &LandMask::default(),
        );
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 10);
        assert!(graph.edge_weight(START_NODE, END_NODE).is_some());
    }

    #[test]
    fn edges_exist_iff_segment_is_clear() {
        let land = wall();
        let points = grid_points(&[(1.5, 0.5), (-1.5, 0.5), (0.5, 0.0), (0.5, 1.0), (-0.5, 0.2)]);
        let start = Coordinate::new(0.0, 0.0);
        let end = Coordinate::new(0.0, 1.0);
        let graph = RouteGraph::build(start, end, &points, &land);

        let n = graph.node_count();
        for a in 0..n {
            for b in (a + 1)..n {
                let clear = !segment_crosses_land(
                    graph.nodes()[a],
                    graph.nodes()[b],
                    land.polygons(),
                );
                assert_eq!(
                    graph.edge_weight(a, b).is_some(),
                    clear,
                    "edge {a}-{b} presence should match visibility"
                );
                assert_eq!(graph.edge_weight(a, b), graph.edge_weight(b, a));
            }
        }
        assert!(graph.edge_weight(START_NODE, END_NODE).is_none());
    }

    #[test]
    fn start_connects_to_every_visible_grid_point() {
        let land = wall();
        let points = grid_points(&[(1.5, 0.5), (-1.5, 0.5), (0.5, 0.0)]);
        let graph = RouteGraph::build(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            &points,
            &land,
        );
        for index in 0..points.len() {
            assert!(graph
                .edge_weight(START_NODE, RouteGraph::grid_node(index))
                .is_some());
        }
    }

    #[test]
    fn edge_weights_are_great_circle_nm() {
        let points = grid_points(&[]);
        let start = Coordinate::new(0.0, 0.0);
        let end = Coordinate::new(1.0, 0.0);
        let graph = RouteGraph::build(start, end, &points, &LandMask::default());
        let weight = graph.edge_weight(START_NODE, END_NODE).unwrap();
        assert!((weight - haversine_nm(start, end)).abs() < 1e-12);
    }
}
