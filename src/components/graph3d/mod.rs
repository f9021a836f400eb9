//! Interactive 3D graph visualization.
//!
//! Lays out a graph in 3D space and renders it with a perspective camera:
//! - Force-directed layout for general graphs, radial tree layout for trees and DAGs
//! - Spheres for nodes with optional labels, lines for edges
//! - Orbit/zoom camera controls and hover/click picking
//! - Light and dark themes
//!
//! # Example
//!
//! ```ignore
//! use graph3d::{Edge, Graph3D, GraphConfig, GraphData, GraphType, Node};
//!
//! let data = GraphData::new(
//!     GraphType::Tree,
//!     vec![Node::new("root").with_label("Root"), Node::new("a"), Node::new("b")],
//!     vec![Edge::new("root", "a"), Edge::new("root", "b")],
//! );
//!
//! let mut graph = Graph3D::mount(&container, GraphConfig::new(data))?;
//! graph.render()?;
//! ```

mod animation;
pub mod camera;
mod component;
pub mod config;
pub mod error;
mod graph;
pub mod layout;
mod listeners;
pub mod picking;
mod render;
pub mod renderer;
pub mod scene;
pub mod sizing;
mod state;
pub mod theme;
pub mod tree;
pub mod types;

pub use animation::{AnimationLoop, CancelToken};
pub use component::Graph3DCanvas;
pub use config::{CameraOptions, GraphCallbacks, GraphConfig, GraphOptions};
pub use error::GraphError;
pub use graph::Graph3D;
pub use layout::{LayoutEngine, LayoutSettings};
pub use render::CanvasTarget;
pub use renderer::{GraphRenderer, Interaction, RenderTarget};
pub use theme::{Color, Theme, ThemeMode};
pub use types::{Edge, EdgeKey, GraphData, GraphType, Node};
