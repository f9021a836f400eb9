//! Scene renderer: turns positioned graph data into scene primitives.
//!
//! [`GraphRenderer`] owns the [`Scene`], the camera and its orbit controls,
//! and a [`RenderTarget`] that rasterizes the projected scene. Each
//! [`render`](GraphRenderer::render) call builds a complete replacement set of
//! primitives and swaps it in only when every edge resolves, then frames the
//! camera on the new bounds.
//!
//! Pointer input is fed in through `pointer_*`/`wheel`; the renderer updates
//! highlights and returns [`Interaction`]s for the caller to dispatch, so no
//! user callback ever runs while the renderer is borrowed.

use std::collections::HashMap;

use glam::DVec3;
use log::{debug, info};

use super::camera::{OrbitControls, PerspectiveCamera, screen_to_ndc};
use super::config::{CameraOptions, GraphOptions};
use super::error::GraphError;
use super::picking::{Hit, PickTarget, pick};
use super::scene::{EdgeLine, LabelSprite, MeshMaterial, NodeMesh, Scene};
use super::sizing::{NodeSizing, SizingConfig};
use super::state::{HoverChange, HoverState, PointerState};
use super::theme::{Color, Theme};
use super::types::{Edge, EdgeKey, Node};

/// Rasterizer seam. Receives the scene and camera once per frame.
pub trait RenderTarget {
	/// Drawing surface size in pixels.
	fn size(&self) -> (f64, f64);

	/// Match a new surface size in pixels.
	fn resize(&mut self, width: f64, height: f64);

	/// Paint one frame.
	fn draw(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), GraphError>;

	/// Release the surface. Called once.
	fn dispose(&mut self);
}

/// User-facing event produced by pointer input.
#[derive(Clone, Debug, PartialEq)]
pub enum Interaction {
	/// Pointer entered a node, or left one (`None`).
	NodeHover(Option<Node>),
	/// Pointer entered an edge, or left one (`None`).
	EdgeHover(Option<Edge>),
	/// A node was clicked.
	NodeClick(Node),
	/// An edge was clicked.
	EdgeClick(Edge),
}

/// Edge pick tolerance as a fraction of node radius.
const EDGE_PICK_RATIO: f64 = 0.5;

/// Owns the scene, camera and controls for one render target.
///
/// Fed by [`render`](Self::render) and the pointer methods; draws on
/// [`frame`](Self::frame).
pub struct GraphRenderer<T: RenderTarget> {
	scene: Scene,
	camera: PerspectiveCamera,
	controls: OrbitControls,
	target: T,
	theme: Theme,
	sizing: SizingConfig,
	node_sizing: NodeSizing,
	camera_options: CameraOptions,
	edge_width: f64,
	node_radius: f64,
	nodes: HashMap<String, Node>,
	edges: HashMap<EdgeKey, Edge>,
	hover: HoverState,
	pointer: PointerState,
	frames: u64,
	disposed: bool,
}

impl<T: RenderTarget> GraphRenderer<T> {
	/// Renderer with an empty scene, themed and sized from `options`.
	pub fn new(options: &GraphOptions, target: T) -> Self {
		let theme = Theme::for_mode(options.theme);
		let (width, height) = target.size();
		let node_sizing = options.sizing.strategy(options.node_size);
		Self {
			scene: Scene::new(&theme),
			camera: PerspectiveCamera::new(&options.camera, width / height),
			controls: OrbitControls::new(&options.camera),
			target,
			node_radius: node_sizing.radius(1),
			node_sizing,
			theme,
			sizing: options.sizing.clone(),
			camera_options: options.camera.clone(),
			edge_width: options.edge_width(),
			nodes: HashMap::new(),
			edges: HashMap::new(),
			hover: HoverState::default(),
			pointer: PointerState::default(),
			frames: 0,
			disposed: false,
		}
	}

	/// Replace every primitive with ones built from `nodes` and `edges`.
	///
	/// Fails without touching the current scene when an edge names a node
	/// that is not in `nodes`. On success returns the hover-leave interactions
	/// for whatever was hovered in the replaced scene.
	pub fn render(
		&mut self,
		nodes: &[Node],
		edges: &[Edge],
	) -> Result<Vec<Interaction>, GraphError> {
		if self.disposed {
			return Err(GraphError::Disposed);
		}
		let radius = self.node_sizing.radius(nodes.len());
		let lookup: HashMap<&str, &Node> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();

		let mut node_meshes = HashMap::with_capacity(nodes.len());
		for node in nodes {
			node_meshes.insert(node.id.clone(), self.create_node_mesh(node, radius));
		}

		let mut edge_lines = HashMap::with_capacity(edges.len());
		let mut edge_data = HashMap::with_capacity(edges.len());
		let mut ordinals: HashMap<(&str, &str), usize> = HashMap::new();
		for edge in edges {
			let ordinal = ordinals
				.entry((edge.from.as_str(), edge.to.as_str()))
				.or_insert(0);
			let key = EdgeKey::new(&edge.from, &edge.to, *ordinal);
			*ordinal += 1;
			let line = self.create_edge_line(edge, key.clone(), &lookup)?;
			edge_lines.insert(key.clone(), line);
			edge_data.insert(key, edge.clone());
		}

		let left = self
			.hover
			.set(None)
			.map(|change| self.hover_interactions(&change))
			.unwrap_or_default();
		self.scene.replace(node_meshes, edge_lines);
		self.nodes = lookup
			.into_iter()
			.map(|(id, node)| (id.to_string(), node.clone()))
			.collect();
		self.edges = edge_data;
		self.node_radius = radius;
		self.frame_scene();

		info!(
			"graph3d: rendered {} nodes, {} edges (radius {:.2})",
			self.scene.node_count(),
			self.scene.edge_count(),
			radius
		);
		Ok(left)
	}

	fn create_node_mesh(&self, node: &Node, radius: f64) -> NodeMesh {
		let center = node.position.map(DVec3::from_array).unwrap_or(DVec3::ZERO);
		let label = node
			.label
			.as_deref()
			.filter(|text| !text.is_empty())
			.map(|text| {
				let (width, height) = self.sizing.label_extent(text, radius);
				LabelSprite {
					text: text.to_string(),
					offset: DVec3::new(0.0, radius * self.sizing.label_offset, 0.0),
					width,
					height,
					color: self.theme.label,
				}
			});
		NodeMesh {
			id: node.id.clone(),
			center,
			radius,
			material: MeshMaterial {
				color: self.theme.node_color(node.color.as_deref()),
				emissive: Color::BLACK,
			},
			label,
		}
	}

	fn create_edge_line(
		&self,
		edge: &Edge,
		key: EdgeKey,
		nodes: &HashMap<&str, &Node>,
	) -> Result<EdgeLine, GraphError> {
		let invalid = |missing: &str| GraphError::InvalidEdge {
			from: edge.from.clone(),
			to: edge.to.clone(),
			missing: missing.to_string(),
		};
		let from = nodes
			.get(edge.from.as_str())
			.ok_or_else(|| invalid(&edge.from))?;
		let to = nodes.get(edge.to.as_str()).ok_or_else(|| invalid(&edge.to))?;

		let color = self.theme.edge_color(edge.color.as_deref());
		Ok(EdgeLine {
			key,
			from: from.position.map(DVec3::from_array).unwrap_or(DVec3::ZERO),
			to: to.position.map(DVec3::from_array).unwrap_or(DVec3::ZERO),
			color,
			base_color: color,
			width: self.edge_width,
		})
	}

	/// Point the camera at the scene centre from far enough to see all of it.
	fn frame_scene(&mut self) {
		let Some(bounds) = self.scene.bounding_box() else {
			return;
		};
		let center = self
			.camera
			.frame(&bounds, self.camera_options.frame_padding);
		self.controls.target = center;
		self.controls.update(&mut self.camera);
		debug!(
			"graph3d: camera framed at {:?}, looking at {:?}",
			self.camera.position, center
		);
	}

	/// One animation step: advance the controls and redraw.
	pub fn frame(&mut self) -> Result<(), GraphError> {
		if self.disposed {
			return Err(GraphError::Disposed);
		}
		self.controls.update(&mut self.camera);
		self.frames += 1;
		self.target.draw(&self.scene, &self.camera)
	}

	/// Nearest primitive under the canvas pixel `(x, y)`.
	pub fn pick_at(&self, x: f64, y: f64) -> Option<Hit> {
		let (width, height) = self.target.size();
		let ray = self.camera.ray_from_ndc(screen_to_ndc(x, y, width, height));
		pick(&self.scene, &ray, self.node_radius * EDGE_PICK_RATIO)
	}

	/// Start a press; ignored after dispose.
	pub fn pointer_down(&mut self, x: f64, y: f64) {
		if !self.disposed {
			self.pointer.press(x, y);
		}
	}

	/// Orbit while pressed, then re-pick the hovered primitive.
	pub fn pointer_move(&mut self, x: f64, y: f64) -> Vec<Interaction> {
		if self.disposed {
			return Vec::new();
		}
		if let Some((dx, dy)) = self.pointer.drag_to(x, y) {
			self.controls.rotate(dx, dy);
		}
		let target = self.pick_at(x, y).map(|hit| hit.target);
		self.hover_to(target)
	}

	/// A release without dragging is a click on whatever lies under the pointer.
	pub fn pointer_up(&mut self, x: f64, y: f64) -> Vec<Interaction> {
		if self.disposed || !self.pointer.release() {
			return Vec::new();
		}
		let clicked = match self.pick_at(x, y).map(|hit| hit.target) {
			Some(PickTarget::Node(id)) => self.nodes.get(&id).cloned().map(Interaction::NodeClick),
			Some(PickTarget::Edge(key)) => self.edges.get(&key).cloned().map(Interaction::EdgeClick),
			None => None,
		};
		clicked.into_iter().collect()
	}

	/// Pointer left the surface: cancel the press and clear the hover.
	pub fn pointer_leave(&mut self) -> Vec<Interaction> {
		self.pointer.cancel();
		if self.disposed {
			return Vec::new();
		}
		self.hover_to(None)
	}

	/// Dolly the camera; positive `delta_y` moves away.
	pub fn wheel(&mut self, delta_y: f64) {
		if !self.disposed {
			self.controls.dolly(delta_y);
		}
	}

	/// Resize the target and the camera aspect.
	pub fn resize(&mut self, width: f64, height: f64) {
		if self.disposed {
			return;
		}
		self.camera.set_aspect(width, height);
		self.target.resize(width, height);
	}

	fn hover_to(&mut self, target: Option<PickTarget>) -> Vec<Interaction> {
		let Some(change) = self.hover.set(target) else {
			return Vec::new();
		};
		self.apply_highlight(&change);
		self.hover_interactions(&change)
	}

	/// Hover notifications for `change`: one per primitive kind entered or left.
	fn hover_interactions(&self, change: &HoverChange) -> Vec<Interaction> {
		let touches_node = |t: &Option<PickTarget>| matches!(t, Some(PickTarget::Node(_)));
		let touches_edge = |t: &Option<PickTarget>| matches!(t, Some(PickTarget::Edge(_)));
		let mut out = Vec::new();
		if touches_node(&change.previous) || touches_node(&change.current) {
			let node = match &change.current {
				Some(PickTarget::Node(id)) => self.nodes.get(id).cloned(),
				_ => None,
			};
			out.push(Interaction::NodeHover(node));
		}
		if touches_edge(&change.previous) || touches_edge(&change.current) {
			let edge = match &change.current {
				Some(PickTarget::Edge(key)) => self.edges.get(key).cloned(),
				_ => None,
			};
			out.push(Interaction::EdgeHover(edge));
		}
		out
	}

	/// Revert the previous target's look and highlight the current one.
	fn apply_highlight(&mut self, change: &HoverChange) {
		match &change.previous {
			Some(PickTarget::Node(id)) => {
				if let Some(mesh) = self.scene.node_mut(id) {
					mesh.material.emissive = Color::BLACK;
				}
			}
			Some(PickTarget::Edge(key)) => {
				if let Some(line) = self.scene.edge_mut(key) {
					line.color = line.base_color;
				}
			}
			None => {}
		}
		match &change.current {
			Some(PickTarget::Node(id)) => {
				if let Some(mesh) = self.scene.node_mut(id) {
					mesh.material.emissive = self.theme.hover_emissive;
				}
			}
			Some(PickTarget::Edge(key)) => {
				if let Some(line) = self.scene.edge_mut(key) {
					line.color = self.theme.hover_edge;
				}
			}
			None => {}
		}
	}

	/// Release controls and the target, drop every primitive.
	pub fn dispose(&mut self) {
		if self.disposed {
			return;
		}
		self.controls.dispose();
		self.target.dispose();
		self.scene.clear();
		self.hover.reset();
		self.pointer.cancel();
		self.disposed = true;
		info!("graph3d: renderer disposed after {} frames", self.frames);
	}

	/// True after `dispose`.
	pub fn is_disposed(&self) -> bool {
		self.disposed
	}

	/// Current scene, as last built by `render`.
	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	/// Camera used for drawing and picking.
	pub fn camera(&self) -> &PerspectiveCamera {
		&self.camera
	}

	/// Orbit controls driving the camera.
	pub fn controls(&self) -> &OrbitControls {
		&self.controls
	}

	/// The render target, for inspection.
	pub fn target(&self) -> &T {
		&self.target
	}

	/// Radius used for every node in the last render.
	pub fn node_radius(&self) -> f64 {
		self.node_radius
	}

	/// Primitive currently under the pointer.
	pub fn hovered(&self) -> Option<&PickTarget> {
		self.hover.current()
	}

	/// Frames drawn so far.
	pub fn frame_count(&self) -> u64 {
		self.frames
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph3d::camera::ndc_to_screen;
	use pretty_assertions::assert_eq;

	#[derive(Default)]
	struct NullTarget {
		draws: usize,
		disposed: bool,
	}

	impl RenderTarget for NullTarget {
		fn size(&self) -> (f64, f64) {
			(800.0, 600.0)
		}

		fn resize(&mut self, _width: f64, _height: f64) {}

		fn draw(&mut self, _scene: &Scene, _camera: &PerspectiveCamera) -> Result<(), GraphError> {
			self.draws += 1;
			Ok(())
		}

		fn dispose(&mut self) {
			self.disposed = true;
		}
	}

	fn renderer() -> GraphRenderer<NullTarget> {
		GraphRenderer::new(&GraphOptions::default(), NullTarget::default())
	}

	fn placed(id: &str, p: [f64; 3]) -> Node {
		Node::new(id).with_position(p)
	}

	fn screen_of(r: &GraphRenderer<NullTarget>, world: DVec3) -> (f64, f64) {
		let p = r.camera().project(world).unwrap();
		let s = ndc_to_screen(p.ndc, 800.0, 600.0);
		(s.x, s.y)
	}

	#[test]
	fn render_builds_one_primitive_per_entity() {
		let mut r = renderer();
		let nodes = [placed("1", [0.0, 0.0, 0.0]), placed("2", [10.0, 0.0, 0.0])];
		r.render(&nodes, &[Edge::new("1", "2")]).unwrap();
		assert_eq!(r.scene().node_count(), 2);
		assert_eq!(r.scene().edge_count(), 1);
		let line = r.scene().edge(&EdgeKey::new("1", "2", 0)).unwrap();
		assert_eq!(line.to, DVec3::new(10.0, 0.0, 0.0));
	}

	#[test]
	fn unknown_endpoint_fails_and_keeps_previous_scene() {
		let mut r = renderer();
		r.render(&[placed("a", [0.0; 3])], &[]).unwrap();
		let err = r
			.render(&[placed("x", [0.0; 3])], &[Edge::new("x", "C")])
			.unwrap_err();
		assert_eq!(
			err,
			GraphError::InvalidEdge {
				from: "x".into(),
				to: "C".into(),
				missing: "C".into(),
			}
		);
		assert!(r.scene().node("a").is_some());
		assert!(r.scene().node("x").is_none());
	}

	#[test]
	fn parallel_edges_get_distinct_primitives() {
		let mut r = renderer();
		let nodes = [placed("a", [0.0; 3]), placed("b", [1.0, 0.0, 0.0])];
		r.render(&nodes, &[Edge::new("a", "b"), Edge::new("a", "b")])
			.unwrap();
		assert_eq!(r.scene().edge_count(), 2);
		assert!(r.scene().edge(&EdgeKey::new("a", "b", 1)).is_some());
	}

	#[test]
	fn labels_scale_with_node_radius() {
		let mut options = GraphOptions::default();
		options.node_size = Some(2.0);
		let mut r = GraphRenderer::new(&options, NullTarget::default());
		r.render(&[placed("a", [0.0; 3]).with_label("Alpha"), placed("b", [5.0, 0.0, 0.0]).with_label("")], &[])
			.unwrap();
		let label = r.scene().node("a").unwrap().label.clone().unwrap();
		assert_eq!(label.height, 2.0 * options.sizing.label_scale);
		assert_eq!(label.offset.y, 2.0 * options.sizing.label_offset);
		assert!(r.scene().node("b").unwrap().label.is_none());
	}

	#[test]
	fn camera_frames_the_scene() {
		let mut r = renderer();
		let nodes = [placed("a", [-50.0, 0.0, 0.0]), placed("b", [50.0, 20.0, 0.0])];
		r.render(&nodes, &[]).unwrap();
		let cam = r.camera();
		assert!((cam.target - DVec3::new(0.0, 10.0, 0.0)).length() < 1e-9);
		assert!(cam.position.z > 100.0);
		for id in ["a", "b"] {
			let center = r.scene().node(id).unwrap().center;
			let p = cam.project(center).unwrap();
			assert!(p.ndc.x.abs() < 1.0 && p.ndc.y.abs() < 1.0, "{id} off screen");
		}
	}

	#[test]
	fn hovering_highlights_and_reverts() {
		let mut r = renderer();
		let nodes = [placed("a", [-20.0, 0.0, 0.0]), placed("b", [20.0, 0.0, 0.0])];
		r.render(&nodes, &[Edge::new("a", "b")]).unwrap();

		let (ax, ay) = screen_of(&r, DVec3::new(-20.0, 0.0, 0.0));
		let events = r.pointer_move(ax, ay);
		assert_eq!(events, vec![Interaction::NodeHover(Some(nodes[0].clone()))]);
		assert_eq!(
			r.scene().node("a").unwrap().material.emissive,
			Theme::light().hover_emissive
		);

		let (mx, my) = screen_of(&r, DVec3::ZERO);
		let events = r.pointer_move(mx, my);
		assert_eq!(
			events,
			vec![
				Interaction::NodeHover(None),
				Interaction::EdgeHover(Some(Edge::new("a", "b"))),
			]
		);
		assert_eq!(r.scene().node("a").unwrap().material.emissive, Color::BLACK);
		let line = r.scene().edge(&EdgeKey::new("a", "b", 0)).unwrap();
		assert_eq!(line.color, Theme::light().hover_edge);

		let events = r.pointer_move(1.0, 1.0);
		assert_eq!(events, vec![Interaction::EdgeHover(None)]);
		let line = r.scene().edge(&EdgeKey::new("a", "b", 0)).unwrap();
		assert_eq!(line.color, line.base_color);
		assert!(r.pointer_move(2.0, 2.0).is_empty());
	}

	#[test]
	fn rerender_reports_hover_leave() {
		let mut r = renderer();
		let nodes = [placed("a", [0.0; 3])];
		assert!(r.render(&nodes, &[]).unwrap().is_empty());
		let (x, y) = screen_of(&r, DVec3::ZERO);
		r.pointer_move(x, y);
		assert_eq!(r.hovered(), Some(&PickTarget::Node("a".into())));

		let left = r.render(&[placed("b", [0.0; 3])], &[]).unwrap();
		assert_eq!(left, vec![Interaction::NodeHover(None)]);
		assert!(r.hovered().is_none());
		assert!(r.render(&[placed("b", [0.0; 3])], &[]).unwrap().is_empty());
	}

	#[test]
	fn click_without_drag_reports_node() {
		let mut r = renderer();
		let nodes = [placed("a", [0.0; 3])];
		r.render(&nodes, &[]).unwrap();
		let (x, y) = screen_of(&r, DVec3::ZERO);
		r.pointer_down(x, y);
		assert_eq!(r.pointer_up(x, y), vec![Interaction::NodeClick(nodes[0].clone())]);

		r.pointer_down(x, y);
		r.pointer_move(x + 40.0, y);
		assert!(r.pointer_up(x, y).is_empty());
	}

	#[test]
	fn frame_draws_until_disposed() {
		let mut r = renderer();
		r.render(&[placed("a", [0.0; 3])], &[]).unwrap();
		r.frame().unwrap();
		r.frame().unwrap();
		assert_eq!(r.target().draws, 2);
		r.dispose();
		assert!(r.target().disposed);
		assert!(r.scene().is_empty());
		assert_eq!(r.frame(), Err(GraphError::Disposed));
		assert_eq!(r.render(&[], &[]), Err(GraphError::Disposed));
		assert_eq!(r.target().draws, 2);
	}
}
