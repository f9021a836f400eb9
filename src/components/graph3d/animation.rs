//! `requestAnimationFrame` loop with explicit cancellation.
//!
//! The frame closure reschedules itself until its [`CancelToken`] is tripped.
//! Stopping cancels the pending frame and drops the closure, so nothing keeps
//! the renderer alive after dispose.
//!
//! Outside the browser there is no display refresh to hook into: starting a
//! loop runs the callback once and leaves the loop stopped.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::debug;
use wasm_bindgen::prelude::*;

use super::error::GraphError;

/// Shared stop flag, checked at the top of every frame.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
	/// New, uncancelled token.
	pub fn new() -> Self {
		Self::default()
	}

	/// Stop every loop holding a clone of this token.
	pub fn cancel(&self) {
		self.0.set(true);
	}

	/// Whether `cancel` was called.
	pub fn is_cancelled(&self) -> bool {
		self.0.get()
	}
}

type FrameClosure = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// A running (or stopped) per-frame callback.
pub struct AnimationLoop {
	token: CancelToken,
	callback: FrameClosure,
	handle: Rc<Cell<Option<i32>>>,
}

impl AnimationLoop {
	/// Start calling `on_frame` with the frame timestamp once per display refresh.
	pub fn start(on_frame: impl FnMut(f64) + 'static) -> Result<Self, GraphError> {
		let this = Self {
			token: CancelToken::new(),
			callback: Rc::new(RefCell::new(None)),
			handle: Rc::new(Cell::new(None)),
		};

		#[cfg(target_arch = "wasm32")]
		this.schedule(on_frame)?;

		#[cfg(not(target_arch = "wasm32"))]
		{
			let mut on_frame = on_frame;
			on_frame(0.0);
			this.token.cancel();
		}

		Ok(this)
	}

	#[cfg(target_arch = "wasm32")]
	fn schedule(&self, mut on_frame: impl FnMut(f64) + 'static) -> Result<(), GraphError> {
		let window = web_sys::window().ok_or_else(|| GraphError::dom("no window"))?;
		let (token, callback, handle) = (
			self.token.clone(),
			self.callback.clone(),
			self.handle.clone(),
		);
		*self.callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			if token.is_cancelled() {
				return;
			}
			on_frame(timestamp);
			if token.is_cancelled() {
				return;
			}
			let Some(window) = web_sys::window() else {
				return;
			};
			if let Some(cb) = callback.borrow().as_ref() {
				handle.set(
					window
						.request_animation_frame(cb.as_ref().unchecked_ref())
						.ok(),
				);
			}
		}));
		if let Some(cb) = self.callback.borrow().as_ref() {
			let id = window.request_animation_frame(cb.as_ref().unchecked_ref())?;
			self.handle.set(Some(id));
		}
		debug!("graph3d: animation loop started");
		Ok(())
	}

	/// False once `stop` has been called.
	pub fn is_running(&self) -> bool {
		!self.token.is_cancelled()
	}

	/// Cancel the pending frame and release the closure. Idempotent.
	///
	/// Must not be called from inside `on_frame`.
	pub fn stop(&self) {
		let was_running = self.is_running();
		self.token.cancel();
		if let Some(id) = self.handle.take() {
			if let Some(window) = web_sys::window() {
				let _ = window.cancel_animation_frame(id);
			}
		}
		self.callback.borrow_mut().take();
		if was_running {
			debug!("graph3d: animation loop stopped");
		}
	}
}

impl Drop for AnimationLoop {
	fn drop(&mut self) {
		self.stop();
	}
}
