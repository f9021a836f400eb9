//! Leptos component hosting a [`Graph3D`] in a container div.
//!
//! The graph is mounted on the first effect run and re-rendered through
//! `update_data` whenever the `data` signal changes. It is disposed when the
//! component's owner is cleaned up.

use leptos::prelude::*;
use log::error;
use web_sys::HtmlElement;

use super::config::{GraphCallbacks, GraphConfig, GraphOptions};
use super::error::GraphError;
use super::graph::Graph3D;
use super::render::CanvasTarget;
use super::types::GraphData;

/// Renders `data` as an interactive 3D graph.
///
/// The container fills its parent by default; set `fullscreen = true` to pin
/// it to the viewport.
#[component]
pub fn Graph3DCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(optional)] options: GraphOptions,
	#[prop(optional)] callbacks: GraphCallbacks,
	#[prop(default = false)] fullscreen: bool,
) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let graph: StoredValue<Option<Graph3D<CanvasTarget>>, LocalStorage> =
		StoredValue::new_local(None);

	Effect::new(move |_| {
		let data = data.get();
		let Some(container) = container_ref.get() else {
			return;
		};
		let container: HtmlElement = container.into();
		let config = GraphConfig::new(data)
			.with_options(options.clone())
			.with_callbacks(callbacks.clone());
		graph.update_value(|slot| {
			if let Err(err) = show(slot, &container, config) {
				error!("graph3d: {}", err);
			}
		});
	});

	on_cleanup(move || {
		graph.update_value(|slot| {
			if let Some(mut g) = slot.take() {
				g.dispose();
			}
		});
	});

	let style = if fullscreen {
		"position: fixed; inset: 0;"
	} else {
		"width: 100%; height: 100%;"
	};

	view! { <div node_ref=container_ref class="graph3d-container" style=style /> }
}

fn show(
	slot: &mut Option<Graph3D<CanvasTarget>>,
	container: &HtmlElement,
	config: GraphConfig,
) -> Result<(), GraphError> {
	if let Some(graph) = slot.as_mut() {
		return graph.update_data(config.data);
	}
	slot.insert(Graph3D::mount(container, config)?).render()
}
