//! Node and label sizing.
//!
//! Node radius is either fixed by the caller or derived from graph density:
//! the more nodes in the scene, the smaller each sphere, following a
//! logarithmic falloff clamped to `[min_radius, max_radius]`.
//!
//! Label sprites scale with the radius of the node they annotate, so a
//! crowded graph gets proportionally smaller text.

use serde::{Deserialize, Serialize};

/// How the sphere radius of every node is chosen for a render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeSizing {
	/// Same radius regardless of node count.
	Fixed(f64),
	/// `max / (1 + falloff * ln(n))`, clamped to `[min, max]`.
	Density {
		/// Smallest radius.
		min: f64,
		/// Radius of a single-node graph.
		max: f64,
		/// How quickly the radius shrinks with node count.
		falloff: f64,
	},
}

impl NodeSizing {
	/// Radius for a graph with `node_count` nodes.
	pub fn radius(&self, node_count: usize) -> f64 {
		match *self {
			NodeSizing::Fixed(radius) => radius,
			NodeSizing::Density { min, max, falloff } => {
				let n = node_count.max(1) as f64;
				let raw = max / (1.0 + falloff.max(0.0) * n.ln());
				raw.clamp(min.min(max), max)
			}
		}
	}
}

/// Sizing knobs, deserializable from the options JSON.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SizingConfig {
	/// Smallest density-derived radius.
	pub min_radius: f64,
	/// Radius of a lone node.
	pub max_radius: f64,
	/// Strength of the logarithmic shrink.
	pub falloff: f64,
	/// Label sprite height as a multiple of node radius.
	pub label_scale: f64,
	/// Label sprite vertical offset as a multiple of node radius.
	pub label_offset: f64,
}

impl Default for SizingConfig {
	fn default() -> Self {
		Self {
			min_radius: 1.0,
			max_radius: 6.0,
			falloff: 0.35,
			label_scale: 1.2,
			label_offset: 1.5,
		}
	}
}

impl SizingConfig {
	/// Pick the sizing strategy: a configured fixed size wins over density.
	pub fn strategy(&self, fixed: Option<f64>) -> NodeSizing {
		match fixed {
			Some(radius) if radius > 0.0 => NodeSizing::Fixed(radius),
			_ => NodeSizing::Density {
				min: self.min_radius,
				max: self.max_radius,
				falloff: self.falloff,
			},
		}
	}

	/// Label sprite `(width, height)` for `text` on a node of `radius`.
	///
	/// Width follows the character count at a fixed glyph aspect.
	pub fn label_extent(&self, text: &str, radius: f64) -> (f64, f64) {
		let height = radius * self.label_scale;
		let glyphs = text.chars().count().max(1) as f64;
		(height * 0.6 * glyphs, height)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn density() -> NodeSizing {
		SizingConfig::default().strategy(None)
	}

	#[test]
	fn lone_node_gets_max_radius() {
		assert_eq!(density().radius(1), 6.0);
		assert_eq!(density().radius(0), 6.0);
	}

	#[test]
	fn radius_shrinks_with_count_and_bottoms_out() {
		let sizing = density();
		let mut last = f64::INFINITY;
		for n in [1, 2, 5, 10, 100, 1_000, 100_000, 10_000_000] {
			let r = sizing.radius(n);
			assert!(r <= last, "radius grew at n={n}");
			assert!((1.0..=6.0).contains(&r));
			last = r;
		}
		assert_eq!(sizing.radius(usize::MAX), 1.0);
	}

	#[test]
	fn fixed_size_wins_when_positive() {
		let config = SizingConfig::default();
		assert_eq!(config.strategy(Some(0.2)), NodeSizing::Fixed(0.2));
		assert_eq!(config.strategy(Some(0.2)).radius(5_000), 0.2);
		assert!(matches!(config.strategy(Some(0.0)), NodeSizing::Density { .. }));
	}

	#[test]
	fn label_extent_scales_with_radius() {
		let config = SizingConfig::default();
		let (w1, h1) = config.label_extent("abc", 1.0);
		let (w2, h2) = config.label_extent("abc", 2.0);
		assert!((w2 - 2.0 * w1).abs() < 1e-9);
		assert!((h2 - 2.0 * h1).abs() < 1e-9);
	}
}
