//! Construction-time configuration: data, visual options and callbacks.
//!
//! [`GraphOptions`] is plain data and deserializes from JSON with every field
//! optional. [`GraphCallbacks`] holds the caller's hover/click handlers.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::layout::LayoutSettings;
use super::sizing::SizingConfig;
use super::theme::ThemeMode;
use super::types::{Edge, GraphData, Node};

/// Camera and orbit-control parameters.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraOptions {
	/// Vertical field of view in degrees.
	pub fov: f64,
	/// Near clip distance.
	pub near: f64,
	/// Far clip distance.
	pub far: f64,
	/// Camera distance multiplier applied when framing the scene.
	pub frame_padding: f64,
	/// Ease orbit and zoom motion out over several frames.
	pub enable_damping: bool,
	/// Fraction of pending motion applied per frame when damping.
	pub damping_factor: f64,
	/// Radians of orbit per pixel of pointer drag.
	pub rotate_speed: f64,
	/// Distance factor per wheel notch.
	pub zoom_speed: f64,
}

impl Default for CameraOptions {
	fn default() -> Self {
		Self {
			fov: 75.0,
			near: 0.1,
			far: 1000.0,
			frame_padding: 1.5,
			enable_damping: true,
			damping_factor: 0.05,
			rotate_speed: 0.005,
			zoom_speed: 0.95,
		}
	}
}

/// Visual and layout knobs for a graph instance.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphOptions {
	/// Light or dark palette.
	pub theme: ThemeMode,
	/// Fixed node radius. When absent, radius is derived from node count.
	pub node_size: Option<f64>,
	/// Edge line width in pixels. Defaults to 1.
	pub edge_width: Option<f64>,
	/// Density-derived sizing, used when `node_size` is absent.
	pub sizing: SizingConfig,
	/// Camera and orbit settings.
	pub camera: CameraOptions,
	/// Force simulation parameters.
	pub layout: LayoutSettings,
}

impl GraphOptions {
	/// Configured edge width, or 1 when unset or not positive.
	pub fn edge_width(&self) -> f64 {
		self.edge_width.filter(|w| *w > 0.0).unwrap_or(1.0)
	}
}

type HoverFn<T> = Rc<dyn Fn(Option<&T>)>;
type ClickFn<T> = Rc<dyn Fn(&T)>;

/// Optional interaction handlers.
///
/// Hover handlers receive `None` when the pointer leaves every primitive.
#[derive(Clone, Default)]
pub struct GraphCallbacks {
	/// Called with the node entered, or `None` on leave.
	pub on_node_hover: Option<HoverFn<Node>>,
	/// Called with the edge entered, or `None` on leave.
	pub on_edge_hover: Option<HoverFn<Edge>>,
	/// Called with the clicked node.
	pub on_node_click: Option<ClickFn<Node>>,
	/// Called with the clicked edge.
	pub on_edge_click: Option<ClickFn<Edge>>,
}

impl GraphCallbacks {
	/// Set the node hover handler.
	pub fn on_node_hover(mut self, f: impl Fn(Option<&Node>) + 'static) -> Self {
		self.on_node_hover = Some(Rc::new(f));
		self
	}

	/// Set the edge hover handler.
	pub fn on_edge_hover(mut self, f: impl Fn(Option<&Edge>) + 'static) -> Self {
		self.on_edge_hover = Some(Rc::new(f));
		self
	}

	/// Set the node click handler.
	pub fn on_node_click(mut self, f: impl Fn(&Node) + 'static) -> Self {
		self.on_node_click = Some(Rc::new(f));
		self
	}

	/// Set the edge click handler.
	pub fn on_edge_click(mut self, f: impl Fn(&Edge) + 'static) -> Self {
		self.on_edge_click = Some(Rc::new(f));
		self
	}
}

impl fmt::Debug for GraphCallbacks {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("GraphCallbacks")
			.field("on_node_hover", &self.on_node_hover.is_some())
			.field("on_edge_hover", &self.on_edge_hover.is_some())
			.field("on_node_click", &self.on_node_click.is_some())
			.field("on_edge_click", &self.on_edge_click.is_some())
			.finish()
	}
}

/// Everything needed to build a [`Graph3D`](super::Graph3D).
///
/// The host container is not part of this struct: it is bound by the render
/// target (see [`CanvasTarget::attach`](super::CanvasTarget::attach)).
#[derive(Clone, Debug, Default)]
pub struct GraphConfig {
	/// Graph to lay out and draw.
	pub data: GraphData,
	/// Visual and layout options.
	pub options: GraphOptions,
	/// Interaction handlers.
	pub callbacks: GraphCallbacks,
}

impl GraphConfig {
	/// Config for `data` with default options and no callbacks.
	pub fn new(data: GraphData) -> Self {
		Self {
			data,
			..Self::default()
		}
	}

	/// Replace the options.
	pub fn with_options(mut self, options: GraphOptions) -> Self {
		self.options = options;
		self
	}

	/// Replace the callbacks.
	pub fn with_callbacks(mut self, callbacks: GraphCallbacks) -> Self {
		self.callbacks = callbacks;
		self
	}
}
