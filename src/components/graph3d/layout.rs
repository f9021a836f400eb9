//! Node positioning.
//!
//! [`LayoutEngine`] maps `(nodes, edges, graph type)` to positioned nodes.
//! Tree and DAG graphs go through the radial hierarchy in [`super::tree`];
//! every other type runs a fixed number of synchronous force-simulation steps.
//!
//! The force branch delegates charge and spring integration to `force_graph`
//! and layers three position passes on top of every integrator step:
//! link distance, collision and centering. Their strength follows a decaying
//! `alpha` so the layout settles within the step budget.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::error::GraphError;
use super::tree::Hierarchy;
use super::types::{Edge, GraphData, GraphType, Node};

/// Tuning for both layout branches.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutSettings {
	/// Number of synchronous simulation steps.
	///
	/// Charge repulsion in the integrator compares every node pair, so the
	/// force branch costs `steps × n²`. Lower this for graphs of thousands of
	/// nodes, which otherwise block the UI thread for seconds.
	pub steps: usize,
	/// Link distance for graphs of up to ten nodes; shrinks with `log10(n)` beyond.
	pub base_link_distance: f64,
	/// Repulsion between every node pair.
	pub charge: f32,
	/// Spring stiffness along edges.
	pub spring: f32,
	/// Cap on the force applied to a node in one step.
	pub max_force: f32,
	/// Velocity scale applied by the integrator.
	pub node_speed: f32,
	/// Velocity retained between steps.
	pub damping: f32,
	/// Integrator time step per simulation step.
	pub time_step: f32,
	/// Collision radius as a fraction of link distance.
	pub collision_ratio: f64,
	/// Outer radius of the tree layout (depth of the deepest leaf).
	pub tree_radius: f64,
}

impl Default for LayoutSettings {
	fn default() -> Self {
		Self {
			steps: 300,
			base_link_distance: 50.0,
			charge: 150.0,
			spring: 0.05,
			max_force: 100.0,
			node_speed: 3000.0,
			damping: 0.9,
			time_step: 0.016,
			collision_ratio: 0.5,
			tree_radius: 200.0,
		}
	}
}

impl LayoutSettings {
	/// Target separation of linked nodes for a graph of `node_count` nodes.
	pub fn link_distance(&self, node_count: usize) -> f64 {
		let scale = (node_count.max(1) as f64).log10().max(1.0);
		self.base_link_distance / scale
	}

	fn simulation_parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.charge,
			force_spring: self.spring,
			force_max: self.max_force,
			node_speed: self.node_speed,
			damping_factor: self.damping,
		}
	}
}

/// Computes positions for the nodes of one graph.
///
/// Constructed per data set; [`Graph3D::update_data`](super::Graph3D::update_data)
/// builds a fresh engine.
#[derive(Clone, Debug)]
pub struct LayoutEngine {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	graph_type: GraphType,
	settings: LayoutSettings,
}

impl LayoutEngine {
	/// Engine for the given graph with default settings.
	pub fn new(nodes: Vec<Node>, edges: Vec<Edge>, graph_type: GraphType) -> Self {
		Self {
			nodes,
			edges,
			graph_type,
			settings: LayoutSettings::default(),
		}
	}

	/// Engine over a copy of `data`.
	pub fn from_data(data: &GraphData) -> Self {
		Self::new(data.nodes.clone(), data.edges.clone(), data.graph_type)
	}

	/// Replace the force simulation settings.
	pub fn with_settings(mut self, settings: LayoutSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Type tag that picks the layout branch.
	pub fn graph_type(&self) -> GraphType {
		self.graph_type
	}

	/// Returns every input node, in input order, with `position` set.
	pub fn calculate_layout(&self) -> Result<Vec<Node>, GraphError> {
		if self.graph_type.is_hierarchical() {
			self.tree_layout()
		} else {
			Ok(self.force_layout())
		}
	}

	/// First node without an incoming edge, for tree/DAG graphs.
	pub fn find_root(&self) -> Option<&Node> {
		if !self.graph_type.is_hierarchical() {
			return None;
		}
		self.indegree_zero().next()
	}

	fn indegree_zero(&self) -> impl Iterator<Item = &Node> {
		let has_incoming: std::collections::HashSet<&str> =
			self.edges.iter().map(|e| e.to.as_str()).collect();
		self.nodes
			.iter()
			.filter(move |n| !has_incoming.contains(n.id.as_str()))
	}

	fn tree_layout(&self) -> Result<Vec<Node>, GraphError> {
		// An unknown edge source would otherwise hide the real root behind NoRoot.
		let known: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
		if let Some(missing) = self
			.edges
			.iter()
			.flat_map(|e| [e.from.as_str(), e.to.as_str()])
			.find(|id| !known.contains(id))
		{
			return Err(GraphError::UnknownNode(missing.to_string()));
		}

		let roots: Vec<&Node> = self.indegree_zero().collect();
		let Some(root) = roots.first() else {
			return Err(GraphError::NoRoot);
		};
		if roots.len() > 1 {
			warn!(
				"graph3d: {} nodes without incoming edges, using {:?} as root",
				roots.len(),
				root.id
			);
		}

		let mut hierarchy = Hierarchy::build(&root.id, &self.nodes, &self.edges)?;
		hierarchy.layout(self.settings.tree_radius);
		debug!(
			"graph3d: tree layout of {} nodes, depth {}",
			hierarchy.len(),
			hierarchy.max_depth()
		);

		let placed = hierarchy.positions();
		self.nodes
			.iter()
			.map(|node| {
				let position = placed
					.get(node.id.as_str())
					.copied()
					.ok_or_else(|| GraphError::UnknownNode(node.id.clone()))?;
				Ok(Node {
					position: Some(position),
					..node.clone()
				})
			})
			.collect()
	}

	fn force_layout(&self) -> Vec<Node> {
		let n = self.nodes.len();
		if n == 0 {
			return Vec::new();
		}
		let link_distance = self.settings.link_distance(n);
		debug!(
			"graph3d: force layout of {} nodes, {} steps, link distance {:.1}",
			n, self.settings.steps, link_distance
		);

		let mut graph: ForceGraph<usize, ()> =
			ForceGraph::new(self.settings.simulation_parameters());
		let mut id_to_idx: HashMap<&str, (usize, DefaultNodeIdx)> = HashMap::new();
		let mut seeds = Vec::with_capacity(n);
		let mut anchored = Vec::with_capacity(n);

		for (i, node) in self.nodes.iter().enumerate() {
			let (x, y) = match node.position {
				Some([x, y, _]) => (x, y),
				None => phyllotaxis(i),
			};
			let idx = graph.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: 10.0,
				is_anchor: node.position.is_some(),
				user_data: i,
			});
			id_to_idx.insert(node.id.as_str(), (i, idx));
			seeds.push([x, y]);
			anchored.push(node.position.is_some());
		}

		let mut links = Vec::new();
		for edge in &self.edges {
			match (
				id_to_idx.get(edge.from.as_str()),
				id_to_idx.get(edge.to.as_str()),
			) {
				(Some(&(a, _)), Some(&(b, _))) if a == b => {}
				(Some(&(a, src)), Some(&(b, tgt))) => {
					graph.add_edge(src, tgt, EdgeData::default());
					links.push((a, b));
				}
				_ => warn!(
					"graph3d: edge {} -> {} names an unknown node, left out of simulation",
					edge.from, edge.to
				),
			}
		}

		let passes = PositionPasses::new(
			links,
			anchored,
			link_distance,
			link_distance * self.settings.collision_ratio,
		);
		let mut positions: Vec<Option<[f64; 2]>> = vec![None; n];
		let mut working = seeds.clone();

		for step in 0..self.settings.steps {
			graph.update(self.settings.time_step);

			graph.visit_nodes(|node| {
				working[node.data.user_data] = [node.x() as f64, node.y() as f64];
			});
			for (i, p) in working.iter_mut().enumerate() {
				if passes.anchored[i] || !p[0].is_finite() || !p[1].is_finite() {
					*p = seeds[i];
				}
			}

			passes.apply(&mut working, alpha(step, self.settings.steps));

			graph.visit_nodes_mut(|node| {
				let p = working[node.data.user_data];
				node.data.x = p[0] as f32;
				node.data.y = p[1] as f32;
			});
		}

		graph.visit_nodes(|node| {
			let (x, y) = (node.x() as f64, node.y() as f64);
			if x.is_finite() && y.is_finite() {
				positions[node.data.user_data] = Some([x, y]);
			}
		});

		self.nodes
			.iter()
			.zip(positions)
			.map(|(node, pos)| {
				// Unmatched simulation output lands on the origin.
				let [x, y] = pos.unwrap_or([0.0, 0.0]);
				let z = node.position.map(|p| p[2]).unwrap_or(0.0);
				Node {
					position: Some([x, y, z]),
					..node.clone()
				}
			})
			.collect()
	}
}

/// Initial placement on a sunflower spiral, deterministic and non-overlapping.
fn phyllotaxis(i: usize) -> (f64, f64) {
	let radius = 10.0 * (0.5 + i as f64).sqrt();
	let angle = i as f64 * PI * (3.0 - 5f64.sqrt());
	(radius * angle.cos(), radius * angle.sin())
}

/// Simulation temperature: decays from 1 to 0.001 across `steps`.
fn alpha(step: usize, steps: usize) -> f64 {
	if steps == 0 {
		return 0.0;
	}
	let decay = 1.0 - 0.001f64.powf(1.0 / steps as f64);
	(1.0 - decay).powi(step as i32)
}

/// Tiny deterministic offset used to separate coincident points.
fn jiggle(seed: usize) -> f64 {
	((seed as f64 * 0.618_033_988_7).fract() - 0.5) * 1e-6
}

/// Link, collision and centering corrections applied between integrator steps.
struct PositionPasses {
	links: Vec<(usize, usize)>,
	/// Per-link strength, `1 / min(degree)`.
	strengths: Vec<f64>,
	/// Per-link share of the correction applied to the source.
	bias: Vec<f64>,
	anchored: Vec<bool>,
	link_distance: f64,
	collision_radius: f64,
}

impl PositionPasses {
	fn new(
		links: Vec<(usize, usize)>,
		anchored: Vec<bool>,
		link_distance: f64,
		collision_radius: f64,
	) -> Self {
		let mut degree = vec![0usize; anchored.len()];
		for &(a, b) in &links {
			degree[a] += 1;
			degree[b] += 1;
		}
		let strengths = links
			.iter()
			.map(|&(a, b)| 1.0 / degree[a].min(degree[b]).max(1) as f64)
			.collect();
		let bias = links
			.iter()
			.map(|&(a, b)| degree[a] as f64 / (degree[a] + degree[b]) as f64)
			.collect();
		Self {
			links,
			strengths,
			bias,
			anchored,
			link_distance,
			collision_radius,
		}
	}

	fn apply(&self, positions: &mut [[f64; 2]], alpha: f64) {
		self.apply_links(positions, alpha);
		self.apply_collisions(positions);
		self.apply_centering(positions);
	}

	fn apply_links(&self, positions: &mut [[f64; 2]], alpha: f64) {
		for (i, &(a, b)) in self.links.iter().enumerate() {
			let mut dx = positions[b][0] - positions[a][0];
			let mut dy = positions[b][1] - positions[a][1];
			if dx == 0.0 && dy == 0.0 {
				dx = jiggle(i);
				dy = jiggle(i + 1);
			}
			let len = (dx * dx + dy * dy).sqrt();
			let k = (len - self.link_distance) / len * alpha * self.strengths[i];
			let (dx, dy) = (dx * k, dy * k);

			let (target_share, source_share) = match (self.anchored[a], self.anchored[b]) {
				(true, true) => continue,
				(true, false) => (1.0, 0.0),
				(false, true) => (0.0, 1.0),
				(false, false) => (self.bias[i], 1.0 - self.bias[i]),
			};
			positions[b][0] -= dx * target_share;
			positions[b][1] -= dy * target_share;
			positions[a][0] += dx * source_share;
			positions[a][1] += dy * source_share;
		}
	}

	/// Push apart nodes closer than twice the collision radius.
	///
	/// Candidates come from a uniform grid with cells one collision diameter
	/// wide, so only nodes in neighbouring cells are compared.
	fn apply_collisions(&self, positions: &mut [[f64; 2]]) {
		let min_dist = self.collision_radius * 2.0;
		if min_dist <= 0.0 {
			return;
		}
		let cell_of = |p: [f64; 2]| {
			(
				(p[0] / min_dist).floor() as i64,
				(p[1] / min_dist).floor() as i64,
			)
		};
		let cells: Vec<(i64, i64)> = positions.iter().map(|p| cell_of(*p)).collect();
		let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
		for (i, cell) in cells.iter().enumerate() {
			grid.entry(*cell).or_default().push(i);
		}

		for (i, &(cx, cy)) in cells.iter().enumerate() {
			for gx in cx - 1..=cx + 1 {
				for gy in cy - 1..=cy + 1 {
					let Some(bucket) = grid.get(&(gx, gy)) else {
						continue;
					};
					for &j in bucket {
						if j > i {
							self.separate(positions, i, j, min_dist);
						}
					}
				}
			}
		}
	}

	fn separate(&self, positions: &mut [[f64; 2]], i: usize, j: usize, min_dist: f64) {
		let n = positions.len();
		let mut dx = positions[j][0] - positions[i][0];
		let mut dy = positions[j][1] - positions[i][1];
		if dx == 0.0 && dy == 0.0 {
			dx = jiggle(i * n + j);
			dy = jiggle(j * n + i);
		}
		let len = (dx * dx + dy * dy).sqrt();
		if len >= min_dist {
			return;
		}
		let push = (min_dist - len) / len * 0.5;
		let (px, py) = (dx * push, dy * push);
		match (self.anchored[i], self.anchored[j]) {
			(true, true) => {}
			(true, false) => {
				positions[j][0] += 2.0 * px;
				positions[j][1] += 2.0 * py;
			}
			(false, true) => {
				positions[i][0] -= 2.0 * px;
				positions[i][1] -= 2.0 * py;
			}
			(false, false) => {
				positions[j][0] += px;
				positions[j][1] += py;
				positions[i][0] -= px;
				positions[i][1] -= py;
			}
		}
	}

	/// Shift the mean to the origin. Pinned nodes define the frame instead.
	fn apply_centering(&self, positions: &mut [[f64; 2]]) {
		if positions.is_empty() || self.anchored.iter().any(|&a| a) {
			return;
		}
		let n = positions.len() as f64;
		let (sx, sy) = positions
			.iter()
			.fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
		let (cx, cy) = (sx / n, sy / n);
		for p in positions.iter_mut() {
			p[0] -= cx;
			p[1] -= cy;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ids(nodes: &[&str]) -> Vec<Node> {
		nodes.iter().map(|id| Node::new(*id)).collect()
	}

	fn radius(node: &Node) -> f64 {
		let [x, _, z] = node.position.unwrap();
		(x * x + z * z).sqrt()
	}

	#[test]
	fn directed_pair_gets_two_positions() {
		let engine = LayoutEngine::new(
			ids(&["1", "2"]),
			vec![Edge::new("1", "2")],
			GraphType::Directed,
		);
		let nodes = engine.calculate_layout().unwrap();
		assert_eq!(nodes.len(), 2);
		for node in &nodes {
			let [x, y, z] = node.position.unwrap();
			assert!(x.is_finite() && y.is_finite());
			assert_eq!(z, 0.0);
		}
		assert_ne!(nodes[0].position, nodes[1].position);
	}

	#[test]
	fn force_layout_is_deterministic() {
		let engine = LayoutEngine::new(
			ids(&["a", "b", "c", "d"]),
			vec![Edge::new("a", "b"), Edge::new("b", "c"), Edge::new("c", "a")],
			GraphType::Cyclic,
		);
		assert_eq!(
			engine.calculate_layout().unwrap(),
			engine.calculate_layout().unwrap()
		);
	}

	#[test]
	fn force_layout_ignores_edges_to_missing_nodes() {
		let engine = LayoutEngine::new(
			ids(&["a", "b"]),
			vec![Edge::new("a", "ghost"), Edge::new("a", "b")],
			GraphType::Undirected,
		);
		let nodes = engine.calculate_layout().unwrap();
		assert_eq!(nodes.len(), 2);
	}

	#[test]
	fn force_layout_centres_free_nodes() {
		let engine = LayoutEngine::new(
			ids(&["a", "b", "c"]),
			vec![Edge::new("a", "b")],
			GraphType::Acyclic,
		);
		let nodes = engine.calculate_layout().unwrap();
		let (sx, sy) = nodes.iter().fold((0.0, 0.0), |(sx, sy), n| {
			let [x, y, _] = n.position.unwrap();
			(sx + x, sy + y)
		});
		assert!((sx / 3.0).abs() < 1.0, "mean x {sx}");
		assert!((sy / 3.0).abs() < 1.0, "mean y {sy}");
	}

	#[test]
	fn pinned_nodes_keep_their_position() {
		let nodes = vec![
			Node::new("fixed").with_position([10.0, -4.0, 7.0]),
			Node::new("free"),
		];
		let engine = LayoutEngine::new(nodes, vec![Edge::new("fixed", "free")], GraphType::Directed);
		let out = engine.calculate_layout().unwrap();
		assert_eq!(out[0].position, Some([10.0, -4.0, 7.0]));
		assert_eq!(out[1].position.unwrap()[2], 0.0);
	}

	#[test]
	fn empty_force_graph_is_empty() {
		let engine = LayoutEngine::new(vec![], vec![], GraphType::Directed);
		assert!(engine.calculate_layout().unwrap().is_empty());
	}

	#[test]
	fn tree_root_sits_at_radius_zero() {
		let engine = LayoutEngine::new(ids(&["A", "B"]), vec![Edge::new("A", "B")], GraphType::Tree);
		assert_eq!(engine.find_root().map(|n| n.id.as_str()), Some("A"));
		let nodes = engine.calculate_layout().unwrap();
		assert!(radius(&nodes[0]).abs() < 1e-9);
		assert!((radius(&nodes[1]) - 200.0).abs() < 1e-9);
	}

	#[test]
	fn tree_projection_uses_angle_as_height() {
		let engine = LayoutEngine::new(
			ids(&["r", "a", "b"]),
			vec![Edge::new("r", "a"), Edge::new("r", "b")],
			GraphType::Dag,
		);
		let nodes = engine.calculate_layout().unwrap();
		for node in &nodes[1..] {
			let [x, angle, z] = node.position.unwrap();
			assert!((x - 200.0 * angle.cos()).abs() < 1e-9);
			assert!((z - 200.0 * angle.sin()).abs() < 1e-9);
			assert!((0.0..=2.0 * PI).contains(&angle));
		}
		assert_ne!(nodes[1].position, nodes[2].position);
	}

	#[test]
	fn tree_without_root_fails() {
		let engine = LayoutEngine::new(
			ids(&["a", "b"]),
			vec![Edge::new("a", "b"), Edge::new("b", "a")],
			GraphType::Tree,
		);
		assert_eq!(engine.calculate_layout(), Err(GraphError::NoRoot));
		assert!(engine.find_root().is_none());
	}

	#[test]
	fn empty_tree_has_no_root() {
		let engine = LayoutEngine::new(vec![], vec![], GraphType::Tree);
		assert_eq!(engine.calculate_layout(), Err(GraphError::NoRoot));
	}

	#[test]
	fn tree_edge_to_missing_node_names_it() {
		let engine = LayoutEngine::new(
			ids(&["A", "B"]),
			vec![Edge::new("A", "B"), Edge::new("B", "C")],
			GraphType::Tree,
		);
		assert_eq!(
			engine.calculate_layout(),
			Err(GraphError::UnknownNode("C".into()))
		);
	}

	#[test]
	fn tree_edge_from_missing_node_names_it() {
		let engine = LayoutEngine::new(
			ids(&["A", "B"]),
			vec![Edge::new("C", "A"), Edge::new("A", "B")],
			GraphType::Tree,
		);
		assert_eq!(
			engine.calculate_layout(),
			Err(GraphError::UnknownNode("C".into()))
		);
	}

	#[test]
	fn find_root_only_for_hierarchies() {
		let engine = LayoutEngine::new(ids(&["a"]), vec![], GraphType::Directed);
		assert!(engine.find_root().is_none());
	}

	#[test]
	fn link_distance_shrinks_past_ten_nodes() {
		let settings = LayoutSettings::default();
		assert_eq!(settings.link_distance(2), 50.0);
		assert_eq!(settings.link_distance(10), 50.0);
		assert!((settings.link_distance(100) - 25.0).abs() < 1e-9);
	}

	#[test]
	fn alpha_decays_to_floor() {
		assert_eq!(alpha(0, 300), 1.0);
		assert!((alpha(300, 300) - 0.001).abs() < 1e-9);
		assert!(alpha(150, 300) < alpha(149, 300));
	}

	#[test]
	fn collision_pass_separates_overlapping_points() {
		let passes = PositionPasses::new(vec![], vec![false, false], 10.0, 5.0);
		let mut positions = [[0.0, 0.0], [1.0, 0.0]];
		passes.apply_collisions(&mut positions);
		let dx = positions[1][0] - positions[0][0];
		assert!((dx - 10.0).abs() < 1e-9);
	}

	#[test]
	fn collision_pass_reaches_across_grid_cells() {
		let passes = PositionPasses::new(vec![], vec![false, false, false], 10.0, 5.0);
		// Cells are 10 wide: the first two straddle a boundary, the third is far away.
		let mut positions = [[9.5, 0.0], [10.5, 0.0], [100.0, 100.0]];
		passes.apply_collisions(&mut positions);
		let dx = positions[1][0] - positions[0][0];
		assert!((dx - 10.0).abs() < 1e-9);
		assert_eq!(positions[2], [100.0, 100.0]);
	}

	#[test]
	fn collision_pass_leaves_anchors_in_place() {
		let passes = PositionPasses::new(vec![], vec![true, false], 10.0, 5.0);
		let mut positions = [[0.0, 0.0], [0.0, -2.0]];
		passes.apply_collisions(&mut positions);
		assert_eq!(positions[0], [0.0, 0.0]);
		assert!((positions[1][1] + 10.0).abs() < 1e-9);
	}

	#[test]
	fn link_pass_moves_towards_target_distance() {
		let passes = PositionPasses::new(vec![(0, 1)], vec![false, false], 10.0, 0.0);
		let mut positions = [[0.0, 0.0], [30.0, 0.0]];
		passes.apply_links(&mut positions, 1.0);
		let dx = positions[1][0] - positions[0][0];
		assert!((dx - 10.0).abs() < 1e-9);
	}
}
