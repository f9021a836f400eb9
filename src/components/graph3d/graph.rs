//! Public facade tying layout, rendering and input together.
//!
//! A [`Graph3D`] owns the current [`GraphData`], a shared [`GraphRenderer`]
//! and, once rendered, the animation loop. `render` lays the data out and
//! rebuilds the scene; `update_data` swaps the data and renders again;
//! `dispose` stops everything and releases the render target.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use log::{info, warn};
use web_sys::{HtmlCanvasElement, HtmlElement, MouseEvent, WheelEvent};

use super::animation::AnimationLoop;
use super::config::{GraphCallbacks, GraphConfig, GraphOptions};
use super::error::GraphError;
use super::layout::LayoutEngine;
use super::listeners::EventSubscription;
use super::render::{CanvasTarget, container_size};
use super::renderer::{GraphRenderer, Interaction, RenderTarget};
use super::types::GraphData;

/// An interactive 3D graph bound to one render target.
pub struct Graph3D<T: RenderTarget + 'static> {
	data: GraphData,
	options: GraphOptions,
	callbacks: GraphCallbacks,
	renderer: Rc<RefCell<GraphRenderer<T>>>,
	animation: Option<AnimationLoop>,
	subscriptions: Vec<EventSubscription>,
	disposed: bool,
}

impl<T: RenderTarget + 'static> Graph3D<T> {
	/// Build a graph drawing into `target`. Nothing is laid out until [`render`](Self::render).
	pub fn new(config: GraphConfig, target: T) -> Self {
		let GraphConfig {
			data,
			options,
			callbacks,
		} = config;
		let renderer = GraphRenderer::new(&options, target);
		info!(
			"graph3d: created {} graph ({} nodes, {} edges)",
			data.graph_type,
			data.nodes.len(),
			data.edges.len()
		);
		Self {
			data,
			options,
			callbacks,
			renderer: Rc::new(RefCell::new(renderer)),
			animation: None,
			subscriptions: Vec::new(),
			disposed: false,
		}
	}

	/// Lay out the current data, rebuild the scene and make sure frames are being drawn.
	pub fn render(&mut self) -> Result<(), GraphError> {
		self.ensure_live()?;
		let positioned = LayoutEngine::from_data(&self.data)
			.with_settings(self.options.layout.clone())
			.calculate_layout()?;
		let left = self
			.renderer
			.borrow_mut()
			.render(&positioned, &self.data.edges)?;
		for interaction in &left {
			dispatch(&self.callbacks, interaction);
		}
		self.animate()
	}

	/// Replace the graph data and render it.
	///
	/// The new data is kept even when rendering it fails.
	pub fn update_data(&mut self, data: GraphData) -> Result<(), GraphError> {
		self.ensure_live()?;
		info!(
			"graph3d: updating data to {} nodes, {} edges",
			data.nodes.len(),
			data.edges.len()
		);
		self.data = data;
		self.render()
	}

	/// Stop the animation loop, detach input listeners and release the target.
	///
	/// Later calls do nothing; `render` and `update_data` fail with
	/// [`GraphError::Disposed`].
	pub fn dispose(&mut self) {
		if self.disposed {
			return;
		}
		if let Some(animation) = self.animation.take() {
			animation.stop();
		}
		self.subscriptions.clear();
		self.renderer.borrow_mut().dispose();
		self.disposed = true;
		info!("graph3d: disposed");
	}

	fn ensure_live(&self) -> Result<(), GraphError> {
		if self.disposed {
			Err(GraphError::Disposed)
		} else {
			Ok(())
		}
	}

	fn animate(&mut self) -> Result<(), GraphError> {
		if self.animation.as_ref().is_some_and(AnimationLoop::is_running) {
			return Ok(());
		}
		let renderer = Rc::clone(&self.renderer);
		self.animation = Some(AnimationLoop::start(move |_| {
			if let Err(err) = renderer.borrow_mut().frame() {
				warn!("graph3d: frame failed: {}", err);
			}
		})?);
		Ok(())
	}

	/// Start a press at canvas pixel `(x, y)`.
	pub fn pointer_down(&self, x: f64, y: f64) {
		self.renderer.borrow_mut().pointer_down(x, y);
	}

	/// Orbit or re-pick hover, notifying hover callbacks.
	pub fn pointer_move(&self, x: f64, y: f64) {
		route(&self.renderer, &self.callbacks, |r| r.pointer_move(x, y));
	}

	/// End a press; fires a click callback when it was not a drag.
	pub fn pointer_up(&self, x: f64, y: f64) {
		route(&self.renderer, &self.callbacks, |r| r.pointer_up(x, y));
	}

	/// Cancel any press and clear the hover.
	pub fn pointer_leave(&self) {
		route(&self.renderer, &self.callbacks, |r| r.pointer_leave());
	}

	/// Zoom by wheel delta.
	pub fn wheel(&self, delta_y: f64) {
		self.renderer.borrow_mut().wheel(delta_y);
	}

	/// Resize the render target and camera.
	pub fn resize(&self, width: f64, height: f64) {
		self.renderer.borrow_mut().resize(width, height);
	}

	/// Data from the last `new` or `update_data`.
	pub fn data(&self) -> &GraphData {
		&self.data
	}

	/// Options the graph was built with.
	pub fn options(&self) -> &GraphOptions {
		&self.options
	}

	/// Borrow the renderer, mainly for inspection.
	pub fn renderer(&self) -> Ref<'_, GraphRenderer<T>> {
		self.renderer.borrow()
	}

	/// True after `dispose`.
	pub fn is_disposed(&self) -> bool {
		self.disposed
	}
}

impl<T: RenderTarget + 'static> Drop for Graph3D<T> {
	fn drop(&mut self) {
		self.dispose();
	}
}

impl Graph3D<CanvasTarget> {
	/// Append a canvas to `container` and wire pointer, wheel and resize input.
	pub fn mount(container: &HtmlElement, config: GraphConfig) -> Result<Self, GraphError> {
		let target = CanvasTarget::attach(container)?;
		let canvas = target.canvas().clone();
		let mut graph = Self::new(config, target);
		graph.subscriptions = subscribe(&graph.renderer, &graph.callbacks, &canvas, container)?;
		info!(
			"graph3d: mounted with {} listeners",
			graph.subscriptions.len()
		);
		Ok(graph)
	}
}

/// Run one input step on the renderer, then hand its interactions to the callbacks.
///
/// The renderer borrow ends before any callback runs.
fn route<T: RenderTarget>(
	renderer: &Rc<RefCell<GraphRenderer<T>>>,
	callbacks: &GraphCallbacks,
	input: impl FnOnce(&mut GraphRenderer<T>) -> Vec<Interaction>,
) {
	let interactions = input(&mut renderer.borrow_mut());
	for interaction in &interactions {
		dispatch(callbacks, interaction);
	}
}

fn dispatch(callbacks: &GraphCallbacks, interaction: &Interaction) {
	match interaction {
		Interaction::NodeHover(node) => {
			if let Some(f) = &callbacks.on_node_hover {
				f(node.as_ref());
			}
		}
		Interaction::EdgeHover(edge) => {
			if let Some(f) = &callbacks.on_edge_hover {
				f(edge.as_ref());
			}
		}
		Interaction::NodeClick(node) => {
			if let Some(f) = &callbacks.on_node_click {
				f(node);
			}
		}
		Interaction::EdgeClick(edge) => {
			if let Some(f) = &callbacks.on_edge_click {
				f(edge);
			}
		}
	}
}

fn local_coords(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

fn subscribe(
	renderer: &Rc<RefCell<GraphRenderer<CanvasTarget>>>,
	callbacks: &GraphCallbacks,
	canvas: &HtmlCanvasElement,
	container: &HtmlElement,
) -> Result<Vec<EventSubscription>, GraphError> {
	let window = web_sys::window().ok_or_else(|| GraphError::dom("no window"))?;
	let mut subscriptions = Vec::with_capacity(6);

	let (r, c) = (renderer.clone(), canvas.clone());
	subscriptions.push(EventSubscription::listen(
		canvas,
		"mousedown",
		move |ev: MouseEvent| {
			let (x, y) = local_coords(&c, &ev);
			r.borrow_mut().pointer_down(x, y);
		},
	)?);

	let (r, cb, c) = (renderer.clone(), callbacks.clone(), canvas.clone());
	subscriptions.push(EventSubscription::listen(
		canvas,
		"mousemove",
		move |ev: MouseEvent| {
			let (x, y) = local_coords(&c, &ev);
			route(&r, &cb, |renderer| renderer.pointer_move(x, y));
		},
	)?);

	let (r, cb, c) = (renderer.clone(), callbacks.clone(), canvas.clone());
	subscriptions.push(EventSubscription::listen(
		canvas,
		"mouseup",
		move |ev: MouseEvent| {
			let (x, y) = local_coords(&c, &ev);
			route(&r, &cb, |renderer| renderer.pointer_up(x, y));
		},
	)?);

	let (r, cb) = (renderer.clone(), callbacks.clone());
	subscriptions.push(EventSubscription::listen(
		canvas,
		"mouseleave",
		move |_: MouseEvent| {
			route(&r, &cb, |renderer| renderer.pointer_leave());
		},
	)?);

	let r = renderer.clone();
	subscriptions.push(EventSubscription::listen(
		canvas,
		"wheel",
		move |ev: WheelEvent| {
			ev.prevent_default();
			r.borrow_mut().wheel(ev.delta_y());
		},
	)?);

	let (r, host) = (renderer.clone(), container.clone());
	subscriptions.push(EventSubscription::listen(
		&window,
		"resize",
		move |_: web_sys::Event| {
			let (w, h) = container_size(&host);
			r.borrow_mut().resize(w, h);
		},
	)?);

	Ok(subscriptions)
}
