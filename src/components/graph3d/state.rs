//! Pointer and hover tracking.
//!
//! [`PointerState`] follows a press from mousedown to mouseup so the renderer
//! can tell an orbit drag from a click. [`HoverState`] remembers which
//! primitive is highlighted so the previous one can be reverted.

use super::picking::PickTarget;

/// Movement (px) beyond which a press counts as a drag rather than a click.
pub const CLICK_SLOP: f64 = 3.0;

/// Tracks an in-progress pointer press.
#[derive(Clone, Debug, Default)]
pub struct PointerState {
	/// A press is in progress.
	pub active: bool,
	/// Press position, horizontal.
	pub start_x: f64,
	/// Press position, vertical.
	pub start_y: f64,
	/// Last horizontal position seen while pressed.
	pub last_x: f64,
	/// Last vertical position seen while pressed.
	pub last_y: f64,
	/// Set once the press has travelled further than [`CLICK_SLOP`].
	pub dragged: bool,
}

impl PointerState {
	/// Begin a press at `(x, y)`.
	pub fn press(&mut self, x: f64, y: f64) {
		*self = Self {
			active: true,
			start_x: x,
			start_y: y,
			last_x: x,
			last_y: y,
			dragged: false,
		};
	}

	/// Record a move while pressed, returning the delta since the last one.
	pub fn drag_to(&mut self, x: f64, y: f64) -> Option<(f64, f64)> {
		if !self.active {
			return None;
		}
		let delta = (x - self.last_x, y - self.last_y);
		self.last_x = x;
		self.last_y = y;
		let (tx, ty) = (x - self.start_x, y - self.start_y);
		if (tx * tx + ty * ty).sqrt() > CLICK_SLOP {
			self.dragged = true;
		}
		Some(delta)
	}

	/// End the press. Returns true when it was a click (no drag).
	pub fn release(&mut self) -> bool {
		let was_click = self.active && !self.dragged;
		self.active = false;
		self.dragged = false;
		was_click
	}

	/// Forget the press without treating it as a click.
	pub fn cancel(&mut self) {
		self.active = false;
		self.dragged = false;
	}
}

/// Change of hovered primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverChange {
	/// Target hovered before the change.
	pub previous: Option<PickTarget>,
	/// Target hovered now.
	pub current: Option<PickTarget>,
}

/// Currently hovered primitive, if any.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	current: Option<PickTarget>,
}

impl HoverState {
	/// Currently hovered target.
	pub fn current(&self) -> Option<&PickTarget> {
		self.current.as_ref()
	}

	/// Update the hovered primitive. `None` when nothing changed.
	pub fn set(&mut self, target: Option<PickTarget>) -> Option<HoverChange> {
		if self.current == target {
			return None;
		}
		let previous = std::mem::replace(&mut self.current, target.clone());
		Some(HoverChange {
			previous,
			current: target,
		})
	}

	/// Forget the hovered primitive without reporting a change.
	pub fn reset(&mut self) -> Option<PickTarget> {
		self.current.take()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn small_moves_still_click() {
		let mut pointer = PointerState::default();
		pointer.press(10.0, 10.0);
		assert_eq!(pointer.drag_to(11.0, 11.0), Some((1.0, 1.0)));
		assert!(pointer.release());
	}

	#[test]
	fn long_moves_are_drags() {
		let mut pointer = PointerState::default();
		pointer.press(0.0, 0.0);
		pointer.drag_to(10.0, 0.0);
		pointer.drag_to(0.0, 0.0);
		assert!(!pointer.release());
		assert!(!pointer.active);
	}

	#[test]
	fn moves_without_press_are_ignored() {
		let mut pointer = PointerState::default();
		assert_eq!(pointer.drag_to(5.0, 5.0), None);
		assert!(!pointer.release());
	}

	#[test]
	fn hover_reports_only_changes() {
		let mut hover = HoverState::default();
		let a = PickTarget::Node("a".into());
		let change = hover.set(Some(a.clone())).unwrap();
		assert_eq!(change.previous, None);
		assert_eq!(change.current, Some(a.clone()));
		assert!(hover.set(Some(a.clone())).is_none());
		let change = hover.set(None).unwrap();
		assert_eq!(change.previous, Some(a));
		assert!(hover.current().is_none());
	}
}
