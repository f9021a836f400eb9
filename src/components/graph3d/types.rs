//! Graph data structures for input to the 3D graph component.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Structural tag of a graph. Selects the layout strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphType {
	/// Directed edges; force layout.
	#[default]
	Directed,
	/// Undirected edges; force layout.
	Undirected,
	/// Single-rooted hierarchy; radial layout.
	Tree,
	/// Directed acyclic graph; radial layout.
	#[serde(rename = "DAG")]
	Dag,
	/// General graph with cycles; force layout.
	Cyclic,
	/// General acyclic graph; force layout.
	Acyclic,
}

impl GraphType {
	/// Tree and DAG graphs get the radial hierarchy layout, everything else the
	/// force simulation.
	pub fn is_hierarchical(self) -> bool {
		matches!(self, GraphType::Tree | GraphType::Dag)
	}
}

impl fmt::Display for GraphType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			GraphType::Directed => "directed",
			GraphType::Undirected => "undirected",
			GraphType::Tree => "tree",
			GraphType::Dag => "DAG",
			GraphType::Cyclic => "cyclic",
			GraphType::Acyclic => "acyclic",
		};
		f.write_str(name)
	}
}

/// A node in the graph.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Node {
	/// Unique identifier for this node. Used to reference nodes in edges.
	pub id: String,
	/// Optional display label, rendered as a sprite above the node.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	/// Optional CSS color override (e.g., "#ff0000" or "rgb(255, 0, 0)").
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
	/// World position. Filled in by the layout step; a caller-supplied value
	/// pins the node during force simulation.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub position: Option<[f64; 3]>,
}

impl Node {
	/// Node with just an id.
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			..Self::default()
		}
	}

	/// Set the display label.
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	/// Set the CSS color override.
	pub fn with_color(mut self, color: impl Into<String>) -> Self {
		self.color = Some(color.into());
		self
	}

	/// Pin the node at `position`.
	pub fn with_position(mut self, position: [f64; 3]) -> Self {
		self.position = Some(position);
		self
	}
}

/// An edge between two nodes, ordered `from` -> `to`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Edge {
	/// Source node ID.
	pub from: String,
	/// Target node ID.
	pub to: String,
	/// Optional weight. Carried through untouched.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub weight: Option<f64>,
	/// Optional CSS color override.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
}

impl Edge {
	/// Edge `from` -> `to` with no weight or color.
	pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
		Self {
			from: from.into(),
			to: to.into(),
			..Self::default()
		}
	}

	/// Set the weight.
	pub fn with_weight(mut self, weight: f64) -> Self {
		self.weight = Some(weight);
		self
	}

	/// Set the CSS color override.
	pub fn with_color(mut self, color: impl Into<String>) -> Self {
		self.color = Some(color.into());
		self
	}

	/// Key of the first edge between this ordered pair.
	pub fn key(&self) -> EdgeKey {
		EdgeKey::new(&self.from, &self.to, 0)
	}
}

/// Registry key for an edge primitive. Parallel edges between the same ordered
/// pair are told apart by `ordinal`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
	/// Source node id.
	pub from: String,
	/// Target node id.
	pub to: String,
	/// 0 for the first edge of the pair, then 1, 2, ...
	pub ordinal: usize,
}

impl EdgeKey {
	/// Key for the `ordinal`-th edge from `from` to `to`.
	pub fn new(from: &str, to: &str, ordinal: usize) -> Self {
		Self {
			from: from.to_string(),
			to: to.to_string(),
			ordinal,
		}
	}
}

impl fmt::Display for EdgeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.ordinal == 0 {
			write!(f, "{}-{}", self.from, self.to)
		} else {
			write!(f, "{}-{}#{}", self.from, self.to, self.ordinal)
		}
	}
}

/// Complete graph data: type tag, nodes and edges.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct GraphData {
	/// Selects the layout.
	#[serde(rename = "type", default)]
	pub graph_type: GraphType,
	/// Nodes, in input order.
	#[serde(default)]
	pub nodes: Vec<Node>,
	/// Edges, in input order.
	#[serde(default)]
	pub edges: Vec<Edge>,
}

impl GraphData {
	/// Graph from parts.
	pub fn new(graph_type: GraphType, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
		Self {
			graph_type,
			nodes,
			edges,
		}
	}
}
