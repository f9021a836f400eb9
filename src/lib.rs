//! graph3d: Interactive 3D graph visualization for the browser.
//!
//! This crate provides a WASM-based component that lays graphs out in 3D
//! (force-directed or radial tree) and renders them with orbit controls,
//! hover highlighting and click picking.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::graph3d::{
	CanvasTarget, Edge, EdgeKey, Graph3D, Graph3DCanvas, GraphCallbacks, GraphConfig, GraphData,
	GraphError, GraphOptions, GraphType, Node, RenderTarget, ThemeMode,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("graph3d: logging initialized");
}

/// Parse the JSON body of the `<script>` element with the given id.
fn load_script_json<T: DeserializeOwned>(id: &str) -> Option<T> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<T>(&json_text) {
		Ok(value) => Some(value),
		Err(e) => {
			warn!("graph3d: failed to parse #{}: {}", id, e);
			None
		}
	}
}

/// Main application component.
///
/// Reads graph data from `#graph-data` and optional visual options from
/// `#graph-options`, then renders the graph fullscreen.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data: GraphData = load_script_json("graph-data").unwrap_or_default();
	let options: GraphOptions = load_script_json("graph-options").unwrap_or_default();
	info!(
		"graph3d: loaded {} graph with {} nodes, {} edges",
		graph_data.graph_type,
		graph_data.nodes.len(),
		graph_data.edges.len()
	);
	let theme = match options.theme {
		ThemeMode::Light => "light",
		ThemeMode::Dark => "dark",
	};
	let graph_signal = Signal::derive(move || graph_data.clone());

	let callbacks = GraphCallbacks::default()
		.on_node_click(|node: &Node| info!("graph3d: clicked node {}", node.id))
		.on_edge_click(|edge: &Edge| info!("graph3d: clicked edge {} -> {}", edge.from, edge.to));

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme=theme />
		<Title text="3D Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<Graph3DCanvas data=graph_signal options=options callbacks=callbacks fullscreen=true />
			<div class="graph-overlay">
				<h1>"Graph"</h1>
				<p class="subtitle">"Drag to orbit. Scroll to zoom. Hover or click nodes and edges."</p>
			</div>
		</div>
	}
}
