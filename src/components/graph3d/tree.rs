//! Radial hierarchy layout for tree and DAG graphs.
//!
//! The hierarchy is grown depth-first from the root along outgoing edges, in
//! edge order. A node is claimed by the first parent that reaches it, so DAG
//! diamonds and stray cycles still yield a proper tree. Nodes the root cannot
//! reach (further roots, detached cycles) are adopted as extra children of the
//! root so every input node gets a position.
//!
//! Placement is a tidy polar layout: leaves take consecutive slots, spaced by
//! `(siblings ? 1 : 2) / depth`, and each parent is centred over its children.
//! The horizontal extent is then normalised to an angle in `[0, 2π]` and depth
//! to a radius in `[0, tree_radius]`.

use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

use log::warn;

use super::error::GraphError;
use super::types::{Edge, Node};

#[derive(Clone, Debug)]
struct TreeNode {
	id: String,
	parent: Option<usize>,
	children: Vec<usize>,
	depth: usize,
	/// Horizontal slot before normalisation, angle after.
	x: f64,
	/// Radius after normalisation.
	y: f64,
}

/// Arena-backed hierarchy; index 0 is the root and indices follow preorder.
#[derive(Clone, Debug)]
pub struct Hierarchy {
	nodes: Vec<TreeNode>,
}

impl Hierarchy {
	/// Grow the hierarchy from `root`.
	///
	/// Fails with [`GraphError::UnknownNode`] when an edge leads to an id that
	/// is not in `nodes`.
	pub fn build(root: &str, nodes: &[Node], edges: &[Edge]) -> Result<Self, GraphError> {
		let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
		if !known.contains(root) {
			return Err(GraphError::UnknownNode(root.to_string()));
		}
		let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
		for edge in edges {
			outgoing
				.entry(edge.from.as_str())
				.or_default()
				.push(edge.to.as_str());
		}

		let mut hierarchy = Self { nodes: Vec::new() };
		let mut claimed: HashSet<&str> = HashSet::new();
		hierarchy.grow(root, None, &known, &outgoing, &mut claimed)?;

		// Adopt whatever the root cannot reach, in input order.
		for node in nodes {
			if !claimed.contains(node.id.as_str()) {
				warn!(
					"graph3d: {:?} is unreachable from root {:?}, adopting it",
					node.id, root
				);
				hierarchy.grow(&node.id, Some(0), &known, &outgoing, &mut claimed)?;
			}
		}
		Ok(hierarchy)
	}

	/// Depth-first, claim-on-visit traversal from `start`.
	fn grow<'a>(
		&mut self,
		start: &'a str,
		parent: Option<usize>,
		known: &HashSet<&str>,
		outgoing: &HashMap<&str, Vec<&'a str>>,
		claimed: &mut HashSet<&'a str>,
	) -> Result<(), GraphError> {
		let mut stack: Vec<(&'a str, Option<usize>)> = vec![(start, parent)];
		while let Some((id, parent)) = stack.pop() {
			if claimed.contains(id) {
				continue;
			}
			if !known.contains(id) {
				return Err(GraphError::UnknownNode(id.to_string()));
			}
			claimed.insert(id);

			let index = self.nodes.len();
			let depth = parent.map(|p| self.nodes[p].depth + 1).unwrap_or(0);
			self.nodes.push(TreeNode {
				id: id.to_string(),
				parent,
				children: Vec::new(),
				depth,
				x: 0.0,
				y: 0.0,
			});
			if let Some(p) = parent {
				self.nodes[p].children.push(index);
			}

			if let Some(targets) = outgoing.get(id) {
				for &child in targets.iter().rev() {
					if !claimed.contains(child) {
						stack.push((child, Some(index)));
					}
				}
			}
		}
		Ok(())
	}

	/// Number of placed nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// True when no node was placed.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Depth of the deepest node; the root is 0.
	pub fn max_depth(&self) -> usize {
		self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
	}

	fn separation(&self, a: usize, b: usize) -> f64 {
		let (na, nb) = (&self.nodes[a], &self.nodes[b]);
		let base = if na.parent == nb.parent { 1.0 } else { 2.0 };
		base / na.depth.max(1) as f64
	}

	/// Assign polar coordinates: `x` becomes the angle, `y` the radius.
	pub fn layout(&mut self, tree_radius: f64) {
		if self.nodes.is_empty() {
			return;
		}

		// Preorder arena: leaves in index order run left to right.
		let mut previous_leaf: Option<usize> = None;
		for i in 0..self.nodes.len() {
			if !self.nodes[i].children.is_empty() {
				continue;
			}
			let x = match previous_leaf {
				Some(prev) => self.nodes[prev].x + self.separation(prev, i),
				None => 0.0,
			};
			self.nodes[i].x = x;
			previous_leaf = Some(i);
		}

		// Children always follow their parent, so a reverse sweep is post-order.
		for i in (0..self.nodes.len()).rev() {
			let children = &self.nodes[i].children;
			let span = children.first().copied().zip(children.last().copied());
			if let Some((first, last)) = span {
				self.nodes[i].x = (self.nodes[first].x + self.nodes[last].x) / 2.0;
			}
		}

		let (mut left, mut right) = (0, 0);
		for (i, node) in self.nodes.iter().enumerate() {
			if node.x < self.nodes[left].x {
				left = i;
			}
			if node.x > self.nodes[right].x {
				right = i;
			}
		}
		let s = if left == right {
			1.0
		} else {
			self.separation(left, right) / 2.0
		};
		let tx = s - self.nodes[left].x;
		let kx = TAU / (self.nodes[right].x + s + tx);
		let ky = tree_radius / self.max_depth().max(1) as f64;

		for node in &mut self.nodes {
			node.x = (node.x + tx) * kx;
			node.y = node.depth as f64 * ky;
		}
	}

	/// Project every node to 3D as `(r·cos θ, θ, r·sin θ)`.
	pub fn positions(&self) -> HashMap<&str, [f64; 3]> {
		self.nodes
			.iter()
			.map(|n| {
				let (angle, radius) = (n.x, n.y);
				(
					n.id.as_str(),
					[radius * angle.cos(), angle, radius * angle.sin()],
				)
			})
			.collect()
	}

	/// `(angle, radius)` of `id`, after [`layout`](Self::layout).
	pub fn polar(&self, id: &str) -> Option<(f64, f64)> {
		self.nodes.iter().find(|n| n.id == id).map(|n| (n.x, n.y))
	}

	/// Id of the node that claimed `id`; `None` for the root.
	pub fn parent_of(&self, id: &str) -> Option<&str> {
		let node = self.nodes.iter().find(|n| n.id == id)?;
		node.parent.map(|p| self.nodes[p].id.as_str())
	}
}
