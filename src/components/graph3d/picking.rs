//! Ray casting against node spheres and edge lines.

use glam::DVec3;

use super::scene::Scene;
use super::types::EdgeKey;

/// Half-line used for hover and click picking.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
	/// Start point.
	pub origin: DVec3,
	/// Unit length.
	pub direction: DVec3,
}

impl Ray {
	/// Ray from `origin` along `direction`, normalized. A zero direction becomes `-Z`.
	pub fn new(origin: DVec3, direction: DVec3) -> Self {
		Self {
			origin,
			direction: direction.normalize_or(DVec3::NEG_Z),
		}
	}

	/// Point at distance `t` along the ray.
	pub fn at(&self, t: f64) -> DVec3 {
		self.origin + self.direction * t
	}

	/// Distance along the ray to the first hit on a sphere, if any.
	pub fn intersect_sphere(&self, center: DVec3, radius: f64) -> Option<f64> {
		let to_center = center - self.origin;
		let along = to_center.dot(self.direction);
		let d2 = to_center.length_squared() - along * along;
		let r2 = radius * radius;
		if d2 > r2 {
			return None;
		}
		let half_chord = (r2 - d2).sqrt();
		let (t0, t1) = (along - half_chord, along + half_chord);
		if t1 < 0.0 {
			return None;
		}
		Some(if t0 >= 0.0 { t0 } else { t1 })
	}

	/// Closest approach between the ray and segment `a..b`.
	///
	/// Returns `(distance along ray, gap between ray and segment)`.
	pub fn closest_to_segment(&self, a: DVec3, b: DVec3) -> (f64, f64) {
		let seg = b - a;
		let seg_len2 = seg.length_squared();
		let w = self.origin - a;
		let (t, s) = if seg_len2 < 1e-18 {
			(self.direction.dot(a - self.origin).max(0.0), 0.0)
		} else {
			let b_dot = self.direction.dot(seg);
			let d = self.direction.dot(w);
			let e = seg.dot(w);
			let denom = seg_len2 - b_dot * b_dot;
			let mut s = if denom.abs() < 1e-12 {
				0.0
			} else {
				((e - b_dot * d) / denom).clamp(0.0, 1.0)
			};
			let mut t = b_dot * s - d;
			if t < 0.0 {
				t = 0.0;
				s = (e / seg_len2).clamp(0.0, 1.0);
			}
			(t, s)
		};
		let on_ray = self.at(t);
		let on_segment = a + seg * s;
		(t, on_ray.distance(on_segment))
	}
}

/// What a pick landed on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PickTarget {
	/// Node, by id.
	Node(String),
	/// Edge, by registry key.
	Edge(EdgeKey),
}

/// A pick result.
#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
	/// What was hit.
	pub target: PickTarget,
	/// Distance along the ray.
	pub distance: f64,
}

/// Nearest node or edge along `ray`.
///
/// Edges count as hit when the ray passes within `edge_threshold` world units.
pub fn pick(scene: &Scene, ray: &Ray, edge_threshold: f64) -> Option<Hit> {
	let nodes = scene.nodes().filter_map(|mesh| {
		ray.intersect_sphere(mesh.center, mesh.radius).map(|distance| Hit {
			target: PickTarget::Node(mesh.id.clone()),
			distance,
		})
	});
	let edges = scene.edges().filter_map(|line| {
		let (distance, gap) = ray.closest_to_segment(line.from, line.to);
		(gap <= edge_threshold).then(|| Hit {
			target: PickTarget::Edge(line.key.clone()),
			distance,
		})
	});
	nodes
		.chain(edges)
		.min_by(|a, b| a.distance.total_cmp(&b.distance))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sphere_hit_reports_front_surface() {
		let ray = Ray::new(DVec3::new(0.0, 0.0, 10.0), DVec3::NEG_Z);
		assert_eq!(ray.intersect_sphere(DVec3::ZERO, 1.0), Some(9.0));
		assert_eq!(ray.intersect_sphere(DVec3::new(3.0, 0.0, 0.0), 1.0), None);
	}

	#[test]
	fn sphere_behind_ray_is_missed() {
		let ray = Ray::new(DVec3::ZERO, DVec3::Z);
		assert_eq!(ray.intersect_sphere(DVec3::new(0.0, 0.0, -5.0), 1.0), None);
	}

	#[test]
	fn ray_from_inside_sphere_hits_exit() {
		let ray = Ray::new(DVec3::ZERO, DVec3::X);
		assert_eq!(ray.intersect_sphere(DVec3::ZERO, 2.0), Some(2.0));
	}

	#[test]
	fn segment_gap_measures_perpendicular_distance() {
		let ray = Ray::new(DVec3::new(0.0, 0.5, 10.0), DVec3::NEG_Z);
		let (t, gap) = ray
			.closest_to_segment(DVec3::new(-1.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 0.0));
		assert!((t - 10.0).abs() < 1e-9);
		assert!((gap - 0.5).abs() < 1e-9);
	}

	#[test]
	fn segment_endpoint_clamps() {
		let ray = Ray::new(DVec3::new(5.0, 0.0, 10.0), DVec3::NEG_Z);
		let (_, gap) = ray
			.closest_to_segment(DVec3::new(-1.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 0.0));
		assert!((gap - 4.0).abs() < 1e-9);
	}
}
