//! Host environment abstraction.
//!
//! The router never touches browser globals directly. Everything it needs from
//! the environment (the current location, the History API, and the three event
//! sources it listens to) goes through the [`Host`] trait. The browser
//! implementation lives in `browser.rs`; [`MemoryHost`](crate::MemoryHost)
//! implements the same contract in memory.

use super::error::Result;
use std::fmt;
use std::rc::Rc;

/// How a navigation records itself in the history stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationType {
	/// Push a new history entry.
	#[default]
	Push,
	/// Replace the current entry. Used for redirects.
	Replace,
}

/// The anchor element a click landed on (or inside).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchor {
	/// Fully resolved `href`.
	pub href: String,
	/// Origin of the resolved `href`.
	pub origin: String,
	/// Fragment of the resolved `href`, including `#`, or empty.
	pub hash: String,
	/// The `target` attribute, or empty.
	pub target: String,
	/// The `rel` attribute, or empty.
	pub rel: String,
	/// Whether the `download` attribute is present.
	pub download: bool,
}

/// A click event as seen by the router.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkClick {
	/// Mouse button; `0` is the primary button.
	pub button: i16,
	/// Alt key held.
	pub alt_key: bool,
	/// Meta key held.
	pub meta_key: bool,
	/// Control key held.
	pub ctrl_key: bool,
	/// Shift key held.
	pub shift_key: bool,
	/// Whether another handler already called `preventDefault()`.
	pub default_prevented: bool,
	/// Closest enclosing anchor, if any.
	pub anchor: Option<Anchor>,
}

impl LinkClick {
	/// A plain primary-button click on `anchor`.
	pub fn on(anchor: Anchor) -> Self {
		Self {
			anchor: Some(anchor),
			..Self::default()
		}
	}

	/// Returns the anchor when this click should be routed in-page.
	///
	/// A click is routed only if it is a plain primary-button click on a
	/// same-origin anchor that does not open a new browsing context, is not a
	/// download or an explicitly external link, and has not been cancelled.
	pub fn routable_anchor(&self, origin: &str) -> Option<&Anchor> {
		let anchor = self.anchor.as_ref()?;
		let plain_click = self.button == 0
			&& !self.alt_key
			&& !self.meta_key
			&& !self.ctrl_key
			&& !self.shift_key
			&& !self.default_prevented;
		let in_page = anchor.origin == origin
			&& anchor.target != "_blank"
			&& anchor.target != "_self"
			&& anchor.rel != "external"
			&& !anchor.download;

		(plain_click && in_page).then_some(anchor)
	}
}

/// Callbacks a host invokes while the router is listening.
#[derive(Clone)]
pub struct HostEvents {
	/// Called on `popstate` and `hashchange`.
	pub on_location_change: Rc<dyn Fn()>,
	/// Called for every click in the document. Returns `true` when the router
	/// handled the click and the default navigation must be prevented.
	/// `None` when link interception is disabled.
	pub on_link_click: Option<Rc<dyn Fn(&LinkClick) -> bool>>,
}

impl fmt::Debug for HostEvents {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HostEvents")
			.field("on_link_click", &self.on_link_click.is_some())
			.finish()
	}
}

/// Keeps host listeners installed. Dropping the guard removes them.
#[must_use = "listeners are removed as soon as the guard is dropped"]
pub struct ListenerGuard {
	detach: Option<Box<dyn FnOnce()>>,
}

impl ListenerGuard {
	/// Creates a guard that runs `detach` when dropped.
	pub fn new(detach: impl FnOnce() + 'static) -> Self {
		Self {
			detach: Some(Box::new(detach)),
		}
	}

	/// A guard with nothing to detach.
	pub fn noop() -> Self {
		Self { detach: None }
	}
}

impl Drop for ListenerGuard {
	fn drop(&mut self) {
		if let Some(detach) = self.detach.take() {
			detach();
		}
	}
}

impl fmt::Debug for ListenerGuard {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ListenerGuard")
			.field("armed", &self.detach.is_some())
			.finish()
	}
}

/// The environment a router runs in.
///
/// Implementations must not call back into the router synchronously from
/// `push_state` or `replace_state`; browsers do not fire `popstate` for them.
pub trait Host {
	/// The full current URL.
	fn href(&self) -> String;

	/// Origin of the current document (`scheme://host[:port]`).
	fn origin(&self) -> String;

	/// Current fragment including `#`, or empty.
	fn hash(&self) -> String;

	/// Adds a history entry for `url`.
	fn push_state(&self, url: &str) -> Result<()>;

	/// Replaces the current history entry with `url`.
	fn replace_state(&self, url: &str) -> Result<()>;

	/// Sets the fragment of the current location.
	fn set_hash(&self, hash: &str) -> Result<()>;

	/// Fires a synthetic `hashchange` event.
	fn dispatch_hash_change(&self) -> Result<()>;

	/// Installs `events`. The listeners stay installed until the returned
	/// guard is dropped.
	fn listen(&self, events: HostEvents) -> ListenerGuard;
}
