//! Failure signals raised by layout, rendering and DOM setup.

use wasm_bindgen::JsValue;

/// Errors surfaced by [`Graph3D`](super::Graph3D) operations.
///
/// All of them abort the current `render`/`update_data` call; none are retried.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GraphError {
	/// An edge endpoint does not name a node in the current data.
	#[error("invalid edge {from} -> {to}: node {missing} not found")]
	InvalidEdge {
		/// Source node id.
		from: String,
		/// Target node id.
		to: String,
		/// The endpoint that was not found.
		missing: String,
	},
	/// Tree/DAG layout found no node without incoming edges.
	#[error("no root node found for tree/DAG layout")]
	NoRoot,
	/// A node reached while building the hierarchy is not in the node list.
	#[error("node {0} not found")]
	UnknownNode(String),
	/// A browser API call failed.
	#[error("DOM operation failed: {0}")]
	Dom(String),
	/// The graph was used after `dispose`.
	#[error("graph has been disposed")]
	Disposed,
}

impl GraphError {
	pub(crate) fn dom(what: &str) -> Self {
		GraphError::Dom(what.to_string())
	}
}

impl From<JsValue> for GraphError {
	fn from(value: JsValue) -> Self {
		let message = value
			.as_string()
			.unwrap_or_else(|| format!("{value:?}"));
		GraphError::Dom(message)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages_identify_the_missing_node() {
		let err = GraphError::InvalidEdge {
			from: "A".into(),
			to: "C".into(),
			missing: "C".into(),
		};
		assert_eq!(err.to_string(), "invalid edge A -> C: node C not found");
		assert_eq!(GraphError::UnknownNode("C".into()).to_string(), "node C not found");
	}
}
