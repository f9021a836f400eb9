//! Canvas 2D rasterizer for the scene.
//!
//! Draws in three passes for a usable depth order:
//! 1. Background fill
//! 2. Edge lines
//! 3. Node spheres back to front, each followed by its label
//!
//! Spheres are shaded with a radial gradient whose highlight is offset towards
//! the scene's directional light, brightened by the material's emissive tint.

use std::f64::consts::PI;

use glam::{DVec2, DVec3};
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement};

use super::camera::{PerspectiveCamera, Projected, ndc_to_screen};
use super::error::GraphError;
use super::renderer::RenderTarget;
use super::scene::{NodeMesh, Scene};
use super::theme::Lighting;

/// Spheres smaller than this on screen are skipped.
const MIN_SPHERE_PX: f64 = 0.3;
/// Labels smaller than this are unreadable and skipped.
const MIN_LABEL_PX: f64 = 4.0;
const FALLBACK_SIZE: (f64, f64) = (800.0, 600.0);

/// A canvas appended to a host container.
pub struct CanvasTarget {
	container: HtmlElement,
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	width: f64,
	height: f64,
}

impl CanvasTarget {
	/// Create a canvas sized to `container` and append it.
	pub fn attach(container: &HtmlElement) -> Result<Self, GraphError> {
		let document = web_sys::window()
			.and_then(|w| w.document())
			.ok_or_else(|| GraphError::dom("no document"))?;
		let canvas: HtmlCanvasElement = document
			.create_element("canvas")?
			.dyn_into()
			.map_err(|_| GraphError::dom("created element is not a canvas"))?;
		let (width, height) = container_size(container);
		canvas.set_width(width as u32);
		canvas.set_height(height as u32);
		canvas.set_class_name("graph3d-canvas");
		canvas.style().set_property("display", "block")?;
		canvas.style().set_property("cursor", "grab")?;
		container.append_child(&canvas)?;

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")?
			.ok_or_else(|| GraphError::dom("2d context unavailable"))?
			.dyn_into()
			.map_err(|_| GraphError::dom("context is not 2d"))?;

		debug!("graph3d: canvas attached at {}x{}", width, height);
		Ok(Self {
			container: container.clone(),
			canvas,
			ctx,
			width,
			height,
		})
	}

	/// The canvas painted each frame.
	pub fn canvas(&self) -> &HtmlCanvasElement {
		&self.canvas
	}

	/// Element the canvas was appended to.
	pub fn container(&self) -> &HtmlElement {
		&self.container
	}

	fn paint(&self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), GraphError> {
		let ctx = &self.ctx;
		ctx.set_fill_style_str(&scene.background.to_css());
		ctx.fill_rect(0.0, 0.0, self.width, self.height);

		self.draw_edges(scene, camera);

		let mut visible: Vec<(&NodeMesh, Projected)> = scene
			.nodes()
			.filter_map(|mesh| camera.project(mesh.center).map(|p| (mesh, p)))
			.collect();
		visible.sort_by(|a, b| b.1.depth.total_cmp(&a.1.depth));

		let light = light_offset(camera, &scene.lighting);
		for (mesh, projected) in visible {
			self.draw_node(mesh, projected, camera, &scene.lighting, light)?;
		}
		Ok(())
	}

	fn screen(&self, ndc: DVec2) -> DVec2 {
		ndc_to_screen(ndc, self.width, self.height)
	}

	fn draw_edges(&self, scene: &Scene, camera: &PerspectiveCamera) {
		let ctx = &self.ctx;
		for line in scene.edges() {
			let (Some(a), Some(b)) = (camera.project(line.from), camera.project(line.to)) else {
				continue;
			};
			let (a, b) = (self.screen(a.ndc), self.screen(b.ndc));
			ctx.set_stroke_style_str(&line.color.to_css());
			ctx.set_line_width(line.width);
			ctx.begin_path();
			ctx.move_to(a.x, a.y);
			ctx.line_to(b.x, b.y);
			ctx.stroke();
		}
	}

	fn draw_node(
		&self,
		mesh: &NodeMesh,
		projected: Projected,
		camera: &PerspectiveCamera,
		lighting: &Lighting,
		light: DVec2,
	) -> Result<(), GraphError> {
		let ctx = &self.ctx;
		let center = self.screen(projected.ndc);
		let radius = mesh.radius * camera.pixels_per_unit(projected.depth, self.height);
		if radius < MIN_SPHERE_PX {
			return Ok(());
		}

		let base = mesh.material.color;
		let emissive = mesh.material.emissive;
		let lit = base
			.scale(lighting.ambient + lighting.directional)
			.add(emissive);
		let highlight = lit.lighten(0.4);
		let shadow = base.scale(lighting.ambient).add(emissive);

		let (hx, hy) = (center.x + light.x * radius, center.y + light.y * radius);
		let gradient = ctx.create_radial_gradient(hx, hy, 0.0, center.x, center.y, radius)?;
		gradient.add_color_stop(0.0, &highlight.to_css())?;
		gradient.add_color_stop(0.6, &lit.to_css())?;
		gradient.add_color_stop(1.0, &shadow.to_css())?;

		ctx.begin_path();
		ctx.arc(center.x, center.y, radius, 0.0, 2.0 * PI)?;
		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
		ctx.fill();

		let Some(label) = &mesh.label else {
			return Ok(());
		};
		let Some(anchor) = camera.project(mesh.center + label.offset) else {
			return Ok(());
		};
		let font_px = label.height * camera.pixels_per_unit(anchor.depth, self.height);
		if font_px < MIN_LABEL_PX {
			return Ok(());
		}
		let at = self.screen(anchor.ndc);
		ctx.set_fill_style_str(&label.color.to_css());
		ctx.set_font(&format!("{:.0}px sans-serif", font_px));
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		ctx.fill_text(&label.text, at.x, at.y)?;
		Ok(())
	}
}

impl RenderTarget for CanvasTarget {
	fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	fn resize(&mut self, width: f64, height: f64) {
		self.width = width.max(1.0);
		self.height = height.max(1.0);
		self.canvas.set_width(self.width as u32);
		self.canvas.set_height(self.height as u32);
	}

	fn draw(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), GraphError> {
		self.paint(scene, camera)
	}

	fn dispose(&mut self) {
		self.canvas.remove();
		debug!("graph3d: canvas removed");
	}
}

/// Client size of `container`, falling back to 800x600 when it has no layout yet.
pub fn container_size(container: &HtmlElement) -> (f64, f64) {
	let (w, h) = (container.client_width(), container.client_height());
	if w > 0 && h > 0 {
		(w as f64, h as f64)
	} else {
		FALLBACK_SIZE
	}
}

/// Screen-space direction (in sphere radii) of the specular highlight.
fn light_offset(camera: &PerspectiveCamera, lighting: &Lighting) -> DVec2 {
	let towards = camera
		.view()
		.transform_vector3(DVec3::from_array(lighting.direction))
		.normalize_or_zero();
	// Screen y grows downwards.
	DVec2::new(towards.x, -towards.y) * 0.35
}
