//! DOM event listeners that detach themselves.
//!
//! Each [`EventSubscription`] owns the exact closure it registered, so dropping
//! it removes that listener and nothing else.

use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget};

use super::error::GraphError;

/// A DOM listener removed again on drop.
pub struct EventSubscription {
	target: EventTarget,
	event: &'static str,
	callback: Closure<dyn FnMut(Event)>,
}

impl EventSubscription {
	/// Register `handler` for `event` on `target`, downcasting the event to `E`.
	pub fn listen<E>(
		target: &EventTarget,
		event: &'static str,
		mut handler: impl FnMut(E) + 'static,
	) -> Result<Self, GraphError>
	where
		E: JsCast + 'static,
	{
		let callback = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
			handler(ev.unchecked_into::<E>());
		});
		target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
		Ok(Self {
			target: target.clone(),
			event,
			callback,
		})
	}
}

impl Drop for EventSubscription {
	fn drop(&mut self) {
		let _ = self
			.target
			.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
	}
}
