//! Browser host (WASM only).
//!
//! Implements [`Host`] on top of `window.location`, `window.history` and DOM
//! events. Listeners are registered as `popstate`/`hashchange` handlers on the
//! window and as a capturing `click` handler on `document.body`; the returned
//! guard removes all three.

use super::config::RouterOptions;
use super::core::Router;
use super::error::{Result, RouterError};
use super::history::{Anchor, Host, HostEvents, LinkClick, ListenerGuard};
use super::route::RouteTable;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, HtmlAnchorElement, MouseEvent, Window};

/// Host backed by the browser window.
#[derive(Debug, Clone)]
pub struct BrowserHost {
	window: Window,
}

impl BrowserHost {
	/// Returns a host for the current window, or `None` outside a browser.
	pub fn new() -> Option<Self> {
		web_sys::window().map(|window| Self { window })
	}
}

fn js_error(action: &str, error: JsValue) -> RouterError {
	RouterError::NavigationFailed(format!("{}: {:?}", action, error))
}

impl Host for BrowserHost {
	fn href(&self) -> String {
		self.window.location().href().unwrap_or_default()
	}

	fn origin(&self) -> String {
		self.window.location().origin().unwrap_or_default()
	}

	fn hash(&self) -> String {
		self.window.location().hash().unwrap_or_default()
	}

	fn push_state(&self, url: &str) -> Result<()> {
		self.window
			.history()
			.and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(url)))
			.map_err(|e| js_error("pushState", e))
	}

	fn replace_state(&self, url: &str) -> Result<()> {
		self.window
			.history()
			.and_then(|history| history.replace_state_with_url(&JsValue::NULL, "", Some(url)))
			.map_err(|e| js_error("replaceState", e))
	}

	fn set_hash(&self, hash: &str) -> Result<()> {
		self.window
			.location()
			.set_hash(hash)
			.map_err(|e| js_error("location.hash", e))
	}

	fn dispatch_hash_change(&self) -> Result<()> {
		let event = Event::new("hashchange").map_err(|e| js_error("hashchange", e))?;
		self.window
			.dispatch_event(&event)
			.map(|_| ())
			.map_err(|e| js_error("hashchange", e))
	}

	fn listen(&self, events: HostEvents) -> ListenerGuard {
		let on_change = Rc::clone(&events.on_location_change);
		let change = Closure::wrap(Box::new(move |_event: Event| on_change()) as Box<dyn FnMut(_)>);

		for kind in ["popstate", "hashchange"] {
			if let Err(error) = self
				.window
				.add_event_listener_with_callback(kind, change.as_ref().unchecked_ref())
			{
				tracing::warn!(kind, ?error, "failed to add window listener");
			}
		}

		let body = self.window.document().and_then(|document| document.body());
		let click = match (&events.on_link_click, &body) {
			(Some(on_click), Some(body)) => {
				let on_click = Rc::clone(on_click);
				let closure = Closure::wrap(Box::new(move |event: Event| {
					if let Some(click) = link_click_from_event(&event) {
						if on_click(&click) {
							event.prevent_default();
						}
					}
				}) as Box<dyn FnMut(_)>);
				if let Err(error) = body.add_event_listener_with_callback_and_bool(
					"click",
					closure.as_ref().unchecked_ref(),
					true,
				) {
					tracing::warn!(?error, "failed to add click listener");
				}
				Some(closure)
			}
			_ => None,
		};

		let window = self.window.clone();
		ListenerGuard::new(move || {
			for kind in ["popstate", "hashchange"] {
				if let Err(error) = window
					.remove_event_listener_with_callback(kind, change.as_ref().unchecked_ref())
				{
					tracing::warn!(kind, ?error, "failed to remove window listener");
				}
			}
			if let (Some(closure), Some(body)) = (click, body) {
				if let Err(error) = body.remove_event_listener_with_callback_and_bool(
					"click",
					closure.as_ref().unchecked_ref(),
					true,
				) {
					tracing::warn!(?error, "failed to remove click listener");
				}
			}
		})
	}
}

/// Reads the fields the router needs from a DOM click event.
fn link_click_from_event(event: &Event) -> Option<LinkClick> {
	let mouse = event.dyn_ref::<MouseEvent>()?;
	let anchor = event
		.target()
		.and_then(|target| target.dyn_into::<Element>().ok())
		.and_then(|element| element.closest("a").ok().flatten())
		.and_then(|element| element.dyn_into::<HtmlAnchorElement>().ok())
		.map(|anchor| Anchor {
			href: anchor.href(),
			origin: anchor.origin(),
			hash: anchor.hash(),
			target: anchor.target(),
			rel: anchor.rel(),
			download: anchor.has_attribute("download"),
		});

	Some(LinkClick {
		button: mouse.button(),
		alt_key: mouse.alt_key(),
		meta_key: mouse.meta_key(),
		ctrl_key: mouse.ctrl_key(),
		shift_key: mouse.shift_key(),
		default_prevented: event.default_prevented(),
		anchor,
	})
}

impl Router {
	/// Creates a router bound to the browser window.
	///
	/// Outside a browser (no `window`), falls back to
	/// [`Router::headless`].
	pub fn browser(table: RouteTable, options: RouterOptions) -> Result<Self> {
		match BrowserHost::new() {
			Some(host) => Self::with_host(table, options, Rc::new(host)),
			None => {
				tracing::debug!("no browser window, running headless");
				Self::headless(table, options)
			}
		}
	}
}
