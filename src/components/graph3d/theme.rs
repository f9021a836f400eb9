//! Visual theming for the 3D graph.
//!
//! Provides the color type shared by materials and the painter, plus the light
//! and dark scene palettes.

use serde::{Deserialize, Serialize};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
	/// Alpha, 0.0 to 1.0.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Build from a packed `0xRRGGBB` value.
	pub const fn hex(value: u32) -> Self {
		Self::rgb(
			((value >> 16) & 0xff) as u8,
			((value >> 8) & 0xff) as u8,
			(value & 0xff) as u8,
		)
	}

	/// Opaque black; also the idle emissive.
	pub const BLACK: Color = Color::rgb(0, 0, 0);

	/// Same color with alpha `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Scale each channel by `factor`, saturating at white.
	pub fn scale(self, factor: f64) -> Self {
		let f = factor.max(0.0);
		Self {
			r: (self.r as f64 * f).min(255.0) as u8,
			g: (self.g as f64 * f).min(255.0) as u8,
			b: (self.b as f64 * f).min(255.0) as u8,
			a: self.a,
		}
	}

	/// Channel-wise saturating sum, used for emissive tints.
	pub fn add(self, other: Color) -> Self {
		Self {
			r: self.r.saturating_add(other.r),
			g: self.g.saturating_add(other.g),
			b: self.b.saturating_add(other.b),
			a: self.a,
		}
	}

	/// CSS form: `#rrggbb` when opaque, `rgba(..)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// Parses a CSS color string.
	/// Supports hex (`#RRGGBB`, `#RGB`) and `rgb()`/`rgba()` functional notation.
	pub fn parse(color_str: &str) -> Option<Color> {
		let s = color_str.trim();
		if let Some(hex) = s.strip_prefix('#') {
			return match hex.len() {
				6 => u32::from_str_radix(hex, 16).ok().map(Color::hex),
				3 => {
					let mut chans = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
					Some(Color::rgb(chans.next()??, chans.next()??, chans.next()??))
				}
				_ => None,
			};
		}
		if s.starts_with("rgb") {
			let nums: Vec<&str> = s
				.trim_start_matches("rgba(")
				.trim_start_matches("rgb(")
				.trim_end_matches(')')
				.split(',')
				.collect();
			let r = nums.first()?.trim().parse().ok()?;
			let g = nums.get(1)?.trim().parse().ok()?;
			let b = nums.get(2)?.trim().parse().ok()?;
			let a = nums
				.get(3)
				.and_then(|s| s.trim().parse().ok())
				.unwrap_or(1.0);
			return Some(Color::rgba(r, g, b, a));
		}
		None
	}
}

/// Light or dark scene appearance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
	/// Light background.
	#[default]
	Light,
	/// Dark background.
	Dark,
}

/// Ambient plus one directional light, applied by the painter when shading spheres.
#[derive(Clone, Debug)]
pub struct Lighting {
	/// Ambient intensity.
	pub ambient: f64,
	/// Directional light intensity.
	pub directional: f64,
	/// Direction *towards* the light, world space.
	pub direction: [f64; 3],
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// `light` or `dark`.
	pub name: &'static str,
	/// Scene clear color.
	pub background: Color,
	/// Default node color.
	pub node: Color,
	/// Default edge color.
	pub edge: Color,
	/// Label text color.
	pub label: Color,
	/// Emissive tint added to a hovered node.
	pub hover_emissive: Color,
	/// Color override applied to a hovered edge.
	pub hover_edge: Color,
	/// Scene lights.
	pub lighting: Lighting,
}

impl Theme {
	/// White background, blue nodes.
	pub fn light() -> Self {
		Self {
			name: "light",
			background: Color::hex(0xffffff),
			node: Color::hex(0x1a73e8),
			edge: Color::hex(0x999999),
			label: Color::hex(0x000000),
			hover_emissive: Color::hex(0x555555),
			hover_edge: Color::hex(0xff9800),
			lighting: Lighting {
				ambient: 0.5,
				directional: 0.5,
				direction: [1.0, 1.0, 1.0],
			},
		}
	}

	/// Near-black background, lighter blue nodes.
	pub fn dark() -> Self {
		Self {
			name: "dark",
			background: Color::hex(0x111111),
			node: Color::hex(0x4a90e2),
			edge: Color::hex(0x666666),
			label: Color::hex(0xffffff),
			hover_emissive: Color::hex(0x444444),
			hover_edge: Color::hex(0xffc107),
			lighting: Lighting {
				ambient: 0.5,
				directional: 0.5,
				direction: [1.0, 1.0, 1.0],
			},
		}
	}

	/// Theme for `mode`.
	pub fn for_mode(mode: ThemeMode) -> Self {
		match mode {
			ThemeMode::Light => Self::light(),
			ThemeMode::Dark => Self::dark(),
		}
	}

	/// Resolve a node's material color: explicit override, else theme default.
	pub fn node_color(&self, color: Option<&str>) -> Color {
		color.and_then(Color::parse).unwrap_or(self.node)
	}

	/// Resolve an edge's line color: explicit override, else theme default.
	pub fn edge_color(&self, color: Option<&str>) -> Color {
		color.and_then(Color::parse).unwrap_or(self.edge)
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::light()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_css_colors() {
		assert_eq!(Color::parse("#4a90e2"), Some(Color::rgb(0x4a, 0x90, 0xe2)));
		assert_eq!(Color::parse("#fff"), Some(Color::rgb(255, 255, 255)));
		assert_eq!(
			Color::parse("rgba(10, 20, 30, 0.5)"),
			Some(Color::rgba(10, 20, 30, 0.5))
		);
		assert_eq!(Color::parse("papayawhip"), None);
		assert_eq!(Color::parse("#12"), None);
	}

	#[test]
	fn css_round_trip_for_opaque_colors() {
		assert_eq!(Color::hex(0x1a73e8).to_css(), "#1a73e8");
		assert_eq!(Color::rgba(1, 2, 3, 0.25).to_css(), "rgba(1, 2, 3, 0.25)");
	}

	#[test]
	fn theme_defaults_follow_mode() {
		let dark = Theme::for_mode(ThemeMode::Dark);
		assert_eq!(dark.node_color(None), Color::hex(0x4a90e2));
		assert_eq!(dark.edge_color(Some("bogus")), Color::hex(0x666666));
		let light = Theme::for_mode(ThemeMode::Light);
		assert_eq!(light.node_color(Some("#ff0000")), Color::rgb(255, 0, 0));
		assert_eq!(light.background, Color::hex(0xffffff));
	}

	#[test]
	fn emissive_add_saturates() {
		let c = Color::rgb(250, 10, 0).add(Color::rgb(10, 10, 10));
		assert_eq!(c, Color::rgb(255, 20, 10));
	}
}
