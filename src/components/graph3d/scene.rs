//! Scene graph owned by the renderer.
//!
//! Holds one [`NodeMesh`] per node id and one [`EdgeLine`] per [`EdgeKey`].
//! The registries are replaced wholesale on every render cycle; nothing else
//! creates or destroys primitives.

use std::collections::HashMap;

use glam::DVec3;

use super::theme::{Color, Lighting, Theme};
use super::types::EdgeKey;

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
	/// Lowest corner.
	pub min: DVec3,
	/// Highest corner.
	pub max: DVec3,
}

impl Aabb {
	/// Box spanning `min` to `max`.
	pub fn new(min: DVec3, max: DVec3) -> Self {
		Self { min, max }
	}

	/// Box of `half_extent` on each side of `center`.
	pub fn around(center: DVec3, half_extent: DVec3) -> Self {
		Self::new(center - half_extent, center + half_extent)
	}

	/// Smallest box holding both.
	pub fn union(self, other: Aabb) -> Self {
		Self::new(self.min.min(other.min), self.max.max(other.max))
	}

	/// Midpoint of the box.
	pub fn center(&self) -> DVec3 {
		(self.min + self.max) * 0.5
	}

	/// Extent along each axis.
	pub fn size(&self) -> DVec3 {
		self.max - self.min
	}
}

/// Surface color of a node mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshMaterial {
	/// Base color, lit by the scene lighting.
	pub color: Color,
	/// Added on top of the lit color; black when idle.
	pub emissive: Color,
}

/// Text billboard attached to a node mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelSprite {
	/// Text drawn.
	pub text: String,
	/// Offset from the owning mesh centre.
	pub offset: DVec3,
	/// World units.
	pub width: f64,
	/// World units.
	pub height: f64,
	/// Text color.
	pub color: Color,
}

/// Sphere primitive for one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeMesh {
	/// Id of the node this mesh draws.
	pub id: String,
	/// Sphere centre, world space.
	pub center: DVec3,
	/// Sphere radius, world units.
	pub radius: f64,
	/// Current material; the hover highlight edits it in place.
	pub material: MeshMaterial,
	/// Present when the node has a label.
	pub label: Option<LabelSprite>,
}

impl NodeMesh {
	/// Bounds of the sphere and its label.
	pub fn bounds(&self) -> Aabb {
		let sphere = Aabb::around(self.center, DVec3::splat(self.radius));
		match &self.label {
			Some(label) => sphere.union(Aabb::around(
				self.center + label.offset,
				DVec3::new(label.width / 2.0, label.height / 2.0, 0.0),
			)),
			None => sphere,
		}
	}
}

/// Line primitive for one edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeLine {
	/// Registry key of the edge this line draws.
	pub key: EdgeKey,
	/// Source endpoint, world space.
	pub from: DVec3,
	/// Target endpoint, world space.
	pub to: DVec3,
	/// Color currently drawn.
	pub color: Color,
	/// Color to restore when a highlight is removed.
	pub base_color: Color,
	/// Line width in pixels.
	pub width: f64,
}

impl EdgeLine {
	/// Box spanned by both endpoints.
	pub fn bounds(&self) -> Aabb {
		Aabb::new(self.from.min(self.to), self.from.max(self.to))
	}
}

/// The renderable world: background, lights and the primitive registries.
#[derive(Clone, Debug)]
pub struct Scene {
	/// Clear color.
	pub background: Color,
	/// Lights used to shade node spheres.
	pub lighting: Lighting,
	node_meshes: HashMap<String, NodeMesh>,
	edge_lines: HashMap<EdgeKey, EdgeLine>,
}

impl Scene {
	/// Empty scene using the theme's background and lighting.
	pub fn new(theme: &Theme) -> Self {
		Self {
			background: theme.background,
			lighting: theme.lighting.clone(),
			node_meshes: HashMap::new(),
			edge_lines: HashMap::new(),
		}
	}

	/// Drop every primitive.
	pub fn clear(&mut self) {
		self.node_meshes.clear();
		self.edge_lines.clear();
	}

	/// Swap in freshly built registries, releasing the previous ones.
	pub fn replace(
		&mut self,
		node_meshes: HashMap<String, NodeMesh>,
		edge_lines: HashMap<EdgeKey, EdgeLine>,
	) {
		self.node_meshes = node_meshes;
		self.edge_lines = edge_lines;
	}

	/// Mesh for node `id`.
	pub fn node(&self, id: &str) -> Option<&NodeMesh> {
		self.node_meshes.get(id)
	}

	/// Mutable mesh for node `id`.
	pub fn node_mut(&mut self, id: &str) -> Option<&mut NodeMesh> {
		self.node_meshes.get_mut(id)
	}

	/// Line for edge `key`.
	pub fn edge(&self, key: &EdgeKey) -> Option<&EdgeLine> {
		self.edge_lines.get(key)
	}

	/// Mutable line for edge `key`.
	pub fn edge_mut(&mut self, key: &EdgeKey) -> Option<&mut EdgeLine> {
		self.edge_lines.get_mut(key)
	}

	/// Node meshes, in no particular order.
	pub fn nodes(&self) -> impl Iterator<Item = &NodeMesh> {
		self.node_meshes.values()
	}

	/// Edge lines, in no particular order.
	pub fn edges(&self) -> impl Iterator<Item = &EdgeLine> {
		self.edge_lines.values()
	}

	/// Number of node meshes.
	pub fn node_count(&self) -> usize {
		self.node_meshes.len()
	}

	/// Number of edge lines.
	pub fn edge_count(&self) -> usize {
		self.edge_lines.len()
	}

	/// True when there are no meshes and no lines.
	pub fn is_empty(&self) -> bool {
		self.node_meshes.is_empty() && self.edge_lines.is_empty()
	}

	/// Bounds of every mesh, label and line; `None` for an empty scene.
	pub fn bounding_box(&self) -> Option<Aabb> {
		self.nodes()
			.map(NodeMesh::bounds)
			.chain(self.edges().map(EdgeLine::bounds))
			.reduce(Aabb::union)
	}
}
