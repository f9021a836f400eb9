//! Perspective camera and orbit controls.
//!
//! The camera looks from `position` at `target` with +Y up. [`OrbitControls`]
//! moves it on a sphere around the target: pointer drags accumulate angular
//! deltas and wheel events accumulate a dolly factor, both applied (and damped)
//! on the next [`OrbitControls::update`].

use std::f64::consts::PI;

use glam::{DMat4, DVec2, DVec3};

use super::config::CameraOptions;
use super::picking::Ray;
use super::scene::Aabb;

/// A world point after projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
	/// Normalized device coordinates, `[-1, 1]` on both axes inside the view.
	pub ndc: DVec2,
	/// Distance along the view axis, always positive.
	pub depth: f64,
}

/// Perspective projection looking from `position` at `target`.
#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
	/// Vertical field of view in degrees.
	pub fov: f64,
	/// Viewport width over height.
	pub aspect: f64,
	/// Near clip distance.
	pub near: f64,
	/// Far clip distance.
	pub far: f64,
	/// Eye position.
	pub position: DVec3,
	/// Point the camera looks at.
	pub target: DVec3,
	/// Up vector.
	pub up: DVec3,
}

impl PerspectiveCamera {
	/// Camera at `(0, 0, 5)` looking at the origin.
	pub fn new(options: &CameraOptions, aspect: f64) -> Self {
		Self {
			fov: options.fov,
			aspect: sanitize_aspect(aspect),
			near: options.near,
			far: options.far,
			position: DVec3::new(0.0, 0.0, 5.0),
			target: DVec3::ZERO,
			up: DVec3::Y,
		}
	}

	/// Update the aspect ratio for a `width` x `height` viewport.
	pub fn set_aspect(&mut self, width: f64, height: f64) {
		self.aspect = sanitize_aspect(width / height);
	}

	/// World to view transform.
	pub fn view(&self) -> DMat4 {
		DMat4::look_at_rh(self.position, self.target, self.up)
	}

	/// OpenGL-style perspective projection.
	pub fn projection(&self) -> DMat4 {
		DMat4::perspective_rh_gl(self.fov.to_radians(), self.aspect, self.near, self.far)
	}

	/// Projection times view.
	pub fn view_projection(&self) -> DMat4 {
		self.projection() * self.view()
	}

	/// Project `world`; `None` when it lies behind the near plane.
	pub fn project(&self, world: DVec3) -> Option<Projected> {
		let view = self.view().transform_point3(world);
		let depth = -view.z;
		if depth < self.near {
			return None;
		}
		let clip = self.projection().project_point3(view);
		Some(Projected {
			ndc: DVec2::new(clip.x, clip.y),
			depth,
		})
	}

	/// World units to screen pixels at `depth`, for a viewport `height` px tall.
	pub fn pixels_per_unit(&self, depth: f64, height: f64) -> f64 {
		let half_fov = (self.fov.to_radians() / 2.0).tan();
		height / (2.0 * depth.max(self.near) * half_fov)
	}

	/// Ray from the eye through a point given in normalized device coordinates.
	pub fn ray_from_ndc(&self, ndc: DVec2) -> Ray {
		let inverse = self.view_projection().inverse();
		let near = inverse.project_point3(DVec3::new(ndc.x, ndc.y, -1.0));
		let far = inverse.project_point3(DVec3::new(ndc.x, ndc.y, 1.0));
		Ray::new(self.position, far - near)
	}

	/// Move back along +Z from the box centre until the whole box fits.
	///
	/// Returns the new target (the box centre).
	pub fn frame(&mut self, bounds: &Aabb, padding: f64) -> DVec3 {
		let center = bounds.center();
		let max_dim = bounds.size().max_element();
		let half_fov = (self.fov.to_radians() / 2.0).tan();
		let distance = (max_dim / half_fov).abs() * padding;
		self.position = center + DVec3::new(0.0, 0.0, distance.max(self.near * 2.0));
		self.target = center;
		// Keep the far side of the box inside the frustum.
		self.far = self.far.max(distance + max_dim * 2.0);
		center
	}
}

fn sanitize_aspect(aspect: f64) -> f64 {
	if aspect.is_finite() && aspect > 0.0 {
		aspect
	} else {
		1.0
	}
}

/// Convert canvas pixel coordinates to normalized device coordinates.
pub fn screen_to_ndc(x: f64, y: f64, width: f64, height: f64) -> DVec2 {
	DVec2::new(
		(x / width.max(1.0)) * 2.0 - 1.0,
		1.0 - (y / height.max(1.0)) * 2.0,
	)
}

/// Inverse of [`screen_to_ndc`].
pub fn ndc_to_screen(ndc: DVec2, width: f64, height: f64) -> DVec2 {
	DVec2::new((ndc.x + 1.0) / 2.0 * width, (1.0 - ndc.y) / 2.0 * height)
}

const MIN_POLAR: f64 = 1e-6;

/// Orbit-style camera controller with optional damping.
#[derive(Clone, Debug)]
pub struct OrbitControls {
	/// Orbit centre.
	pub target: DVec3,
	/// Ease motion out over several updates.
	pub enable_damping: bool,
	/// Fraction of the pending motion applied per update.
	pub damping_factor: f64,
	/// Radians per pixel of drag.
	pub rotate_speed: f64,
	/// Distance factor per wheel notch, below 1.
	pub zoom_speed: f64,
	/// Closest allowed distance to the target.
	pub min_distance: f64,
	/// Farthest allowed distance to the target.
	pub max_distance: f64,
	/// Input is ignored while false.
	pub enabled: bool,
	theta_delta: f64,
	phi_delta: f64,
	scale: f64,
}

impl OrbitControls {
	/// Controls orbiting the origin with `options` speeds.
	pub fn new(options: &CameraOptions) -> Self {
		Self {
			target: DVec3::ZERO,
			enable_damping: options.enable_damping,
			damping_factor: options.damping_factor.clamp(0.0, 1.0),
			rotate_speed: options.rotate_speed,
			zoom_speed: options.zoom_speed.clamp(0.01, 0.999),
			min_distance: 0.0,
			max_distance: f64::INFINITY,
			enabled: true,
			theta_delta: 0.0,
			phi_delta: 0.0,
			scale: 1.0,
		}
	}

	/// Queue a rotation for a pointer drag of `(dx, dy)` pixels.
	pub fn rotate(&mut self, dx: f64, dy: f64) {
		if !self.enabled {
			return;
		}
		self.theta_delta -= dx * self.rotate_speed;
		self.phi_delta -= dy * self.rotate_speed;
	}

	/// Queue a dolly step. Positive wheel delta moves away from the target.
	pub fn dolly(&mut self, wheel_delta: f64) {
		if !self.enabled || wheel_delta == 0.0 {
			return;
		}
		if wheel_delta > 0.0 {
			self.scale /= self.zoom_speed;
		} else {
			self.scale *= self.zoom_speed;
		}
	}

	/// Apply queued motion to `camera`. Returns whether the camera moved.
	pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
		let offset = camera.position - self.target;
		let radius = offset.length();
		let (mut theta, mut phi) = if radius > 0.0 {
			(
				offset.x.atan2(offset.z),
				(offset.y / radius).clamp(-1.0, 1.0).acos(),
			)
		} else {
			(0.0, PI / 2.0)
		};

		let step = if self.enable_damping {
			self.damping_factor
		} else {
			1.0
		};
		theta += self.theta_delta * step;
		phi = (phi + self.phi_delta * step).clamp(MIN_POLAR, PI - MIN_POLAR);
		let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

		let offset = DVec3::new(
			radius * phi.sin() * theta.sin(),
			radius * phi.cos(),
			radius * phi.sin() * theta.cos(),
		);
		let previous = camera.position;
		camera.position = self.target + offset;
		camera.target = self.target;

		if self.enable_damping {
			self.theta_delta *= 1.0 - self.damping_factor;
			self.phi_delta *= 1.0 - self.damping_factor;
		} else {
			self.theta_delta = 0.0;
			self.phi_delta = 0.0;
		}
		self.scale = 1.0;

		previous.distance_squared(camera.position) > 1e-12
	}

	/// Stop reacting to input and drop queued motion.
	pub fn dispose(&mut self) {
		self.enabled = false;
		self.theta_delta = 0.0;
		self.phi_delta = 0.0;
		self.scale = 1.0;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn camera() -> PerspectiveCamera {
		PerspectiveCamera::new(&CameraOptions::default(), 1.0)
	}

	#[test]
	fn target_projects_to_centre() {
		let cam = camera();
		let p = cam.project(DVec3::ZERO).unwrap();
		assert!(p.ndc.length() < 1e-9);
		assert!((p.depth - 5.0).abs() < 1e-9);
	}

	#[test]
	fn points_behind_camera_do_not_project() {
		assert!(camera().project(DVec3::new(0.0, 0.0, 10.0)).is_none());
	}

	#[test]
	fn centre_ray_points_at_target() {
		let cam = camera();
		let ray = cam.ray_from_ndc(DVec2::ZERO);
		assert!((ray.direction - DVec3::NEG_Z).length() < 1e-9);
		assert_eq!(ray.origin, cam.position);
	}

	#[test]
	fn ray_passes_through_projected_point() {
		let cam = camera();
		let world = DVec3::new(1.0, -0.5, 0.0);
		let p = cam.project(world).unwrap();
		let ray = cam.ray_from_ndc(p.ndc);
		let t = (world - ray.origin).dot(ray.direction);
		assert!((ray.at(t) - world).length() < 1e-6);
	}

	#[test]
	fn frame_fits_box_on_view_axis() {
		let mut cam = camera();
		let bounds = Aabb::new(DVec3::new(-10.0, -2.0, -1.0), DVec3::new(10.0, 4.0, 1.0));
		let center = cam.frame(&bounds, 1.5);
		assert_eq!(center, DVec3::new(0.0, 1.0, 0.0));
		let expected = 20.0 / (75f64.to_radians() / 2.0).tan() * 1.5;
		assert!((cam.position.z - expected).abs() < 1e-9);
		assert_eq!(cam.position.x, 0.0);
		assert_eq!(cam.target, center);
		assert!(cam.far >= expected + 40.0);
	}

	#[test]
	fn screen_ndc_round_trip() {
		let ndc = screen_to_ndc(200.0, 50.0, 800.0, 600.0);
		assert!((ndc - DVec2::new(-0.5, 1.0 - 100.0 / 600.0)).length() < 1e-12);
		let back = ndc_to_screen(ndc, 800.0, 600.0);
		assert!((back - DVec2::new(200.0, 50.0)).length() < 1e-9);
	}

	#[test]
	fn undamped_rotation_orbits_at_constant_distance() {
		let mut options = CameraOptions::default();
		options.enable_damping = false;
		let mut cam = camera();
		let mut controls = OrbitControls::new(&options);
		controls.rotate(100.0, 0.0);
		assert!(controls.update(&mut cam));
		assert!((cam.position.length() - 5.0).abs() < 1e-9);
		assert!(cam.position.x < 0.0);
		assert!(!controls.update(&mut cam));
	}

	#[test]
	fn damping_spreads_motion_over_frames() {
		let mut cam = camera();
		let mut controls = OrbitControls::new(&CameraOptions::default());
		controls.rotate(0.0, 50.0);
		assert!(controls.update(&mut cam));
		assert!(controls.update(&mut cam));
	}

	#[test]
	fn dolly_scales_distance() {
		let mut cam = camera();
		let mut controls = OrbitControls::new(&CameraOptions::default());
		controls.dolly(-1.0);
		controls.update(&mut cam);
		assert!((cam.position.length() - 5.0 * 0.95).abs() < 1e-9);
	}

	#[test]
	fn disposed_controls_ignore_input() {
		let mut cam = camera();
		let mut controls = OrbitControls::new(&CameraOptions::default());
		controls.dispose();
		controls.rotate(100.0, 100.0);
		controls.dolly(1.0);
		assert!(!controls.update(&mut cam));
	}
}
