//! In-memory host.
//!
//! A [`Host`] that keeps its own history stack. It behaves like a browser tab
//! as far as the router can observe: `push_state`/`replace_state` change the
//! location silently, while back/forward navigation and fragment changes fire
//! the location-change callback. Used for tests and non-browser embeddings.

use super::error::{Result, RouterError};
use super::history::{Host, HostEvents, LinkClick, ListenerGuard};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use url::Url;

const DEFAULT_ORIGIN: &str = "http://localhost";

#[derive(Debug)]
struct MemoryState {
	entries: Vec<Url>,
	index: usize,
	events: Option<HostEvents>,
	listen_count: usize,
	hash_change_dispatches: usize,
}

/// History stack kept in memory.
///
/// Cloning yields another handle to the same stack.
#[derive(Debug, Clone)]
pub struct MemoryHost {
	state: Rc<RefCell<MemoryState>>,
	// Bumped on every listen; a stale guard must not remove newer listeners.
	generation: Rc<Cell<u64>>,
}

impl MemoryHost {
	/// Creates a host at `http://localhost/`.
	pub fn new() -> Self {
		let start = Url::parse(DEFAULT_ORIGIN).map(|base| vec![base]).unwrap_or_default();
		Self {
			state: Rc::new(RefCell::new(MemoryState {
				entries: start,
				index: 0,
				events: None,
				listen_count: 0,
				hash_change_dispatches: 0,
			})),
			generation: Rc::new(Cell::new(0)),
		}
	}

	/// Creates a host whose initial entry is `location`, resolved against
	/// `http://localhost/`.
	///
	/// # Errors
	///
	/// [`RouterError::InvalidLocation`] if `location` cannot be resolved.
	pub fn with_location(location: &str) -> Result<Self> {
		let host = Self::new();
		host.set_href(location)?;
		Ok(host)
	}

	/// Replaces the current entry without firing any event, like typing into
	/// the address bar before the page loads.
	pub fn set_href(&self, location: &str) -> Result<()> {
		let url = self.resolve(location)?;
		let mut state = self.state.borrow_mut();
		let index = state.index;
		match state.entries.get_mut(index) {
			Some(entry) => *entry = url,
			None => state.entries.push(url),
		}
		Ok(())
	}

	/// Path, query and fragment of the current entry.
	pub fn location(&self) -> String {
		self.current()
			.map(|url| {
				let mut location = url.path().to_string();
				if let Some(query) = url.query() {
					location.push('?');
					location.push_str(query);
				}
				if let Some(fragment) = url.fragment() {
					location.push('#');
					location.push_str(fragment);
				}
				location
			})
			.unwrap_or_default()
	}

	/// Number of entries in the history stack.
	pub fn history_len(&self) -> usize {
		self.state.borrow().entries.len()
	}

	/// Position of the current entry.
	pub fn history_index(&self) -> usize {
		self.state.borrow().index
	}

	/// Whether listeners are currently installed.
	pub fn is_listening(&self) -> bool {
		self.state.borrow().events.is_some()
	}

	/// How many times listeners were installed over the host's lifetime.
	pub fn listen_count(&self) -> usize {
		self.state.borrow().listen_count
	}

	/// How many synthetic `hashchange` events were dispatched.
	pub fn hash_change_dispatches(&self) -> usize {
		self.state.borrow().hash_change_dispatches
	}

	/// Goes one entry back, firing a location change. Returns `false` at the
	/// start of the stack.
	pub fn back(&self) -> bool {
		self.go(-1)
	}

	/// Goes one entry forward, firing a location change. Returns `false` at
	/// the end of the stack.
	pub fn forward(&self) -> bool {
		self.go(1)
	}

	/// Moves `delta` entries through the stack, firing a location change.
	pub fn go(&self, delta: isize) -> bool {
		{
			let mut state = self.state.borrow_mut();
			let Some(target) = state.index.checked_add_signed(delta) else {
				return false;
			};
			if delta == 0 || target >= state.entries.len() {
				return false;
			}
			state.index = target;
		}
		self.fire_location_change();
		true
	}

	/// Delivers a click to the installed click listener.
	///
	/// Returns `true` when the listener intercepted it, i.e. the default
	/// navigation would have been prevented.
	pub fn click(&self, click: &LinkClick) -> bool {
		let listener = self
			.state
			.borrow()
			.events
			.as_ref()
			.and_then(|events| events.on_link_click.clone());
		listener.is_some_and(|listener| listener(click))
	}

	/// Builds a plain primary-button click on an anchor pointing at `href`,
	/// resolved against the current location.
	pub fn link_click(&self, href: &str) -> Result<LinkClick> {
		let url = self.resolve(href)?;
		Ok(LinkClick::on(super::history::Anchor {
			href: url.to_string(),
			origin: url.origin().ascii_serialization(),
			hash: url
				.fragment()
				.filter(|fragment| !fragment.is_empty())
				.map(|fragment| format!("#{}", fragment))
				.unwrap_or_default(),
			..Default::default()
		}))
	}

	fn current(&self) -> Option<Url> {
		let state = self.state.borrow();
		state.entries.get(state.index).cloned()
	}

	fn resolve(&self, location: &str) -> Result<Url> {
		let base = match self.current() {
			Some(url) => url,
			None => Url::parse(DEFAULT_ORIGIN).map_err(|e| invalid(DEFAULT_ORIGIN, e))?,
		};
		base.join(location).map_err(|e| invalid(location, e))
	}

	fn fire_location_change(&self) {
		let callback = self
			.state
			.borrow()
			.events
			.as_ref()
			.map(|events| Rc::clone(&events.on_location_change));
		if let Some(callback) = callback {
			callback();
		}
	}

	fn push(&self, url: Url) {
		let mut state = self.state.borrow_mut();
		let next = state.index + 1;
		state.entries.truncate(next);
		state.entries.push(url);
		state.index = next;
	}
}

impl Default for MemoryHost {
	fn default() -> Self {
		Self::new()
	}
}

fn invalid(location: &str, error: url::ParseError) -> RouterError {
	RouterError::InvalidLocation {
		location: location.to_string(),
		reason: error.to_string(),
	}
}

impl Host for MemoryHost {
	fn href(&self) -> String {
		self.current().map(String::from).unwrap_or_default()
	}

	fn origin(&self) -> String {
		self.current()
			.map(|url| url.origin().ascii_serialization())
			.unwrap_or_default()
	}

	fn hash(&self) -> String {
		self.current()
			.and_then(|url| url.fragment().map(|fragment| format!("#{}", fragment)))
			.filter(|hash| hash != "#")
			.unwrap_or_default()
	}

	fn push_state(&self, url: &str) -> Result<()> {
		let url = self.resolve(url)?;
		self.push(url);
		Ok(())
	}

	fn replace_state(&self, url: &str) -> Result<()> {
		self.set_href(url)
	}

	fn set_hash(&self, hash: &str) -> Result<()> {
		let Some(mut url) = self.current() else {
			return Err(RouterError::NavigationFailed("no current entry".to_string()));
		};
		let fragment = hash.strip_prefix('#').unwrap_or(hash);
		let before = url.fragment().unwrap_or_default().to_string();
		url.set_fragment(Some(fragment));
		if before == fragment {
			return Ok(());
		}

		self.push(url);
		self.fire_location_change();
		Ok(())
	}

	fn dispatch_hash_change(&self) -> Result<()> {
		self.state.borrow_mut().hash_change_dispatches += 1;
		self.fire_location_change();
		Ok(())
	}

	fn listen(&self, events: HostEvents) -> ListenerGuard {
		let generation = self.generation.get() + 1;
		self.generation.set(generation);
		{
			let mut state = self.state.borrow_mut();
			state.events = Some(events);
			state.listen_count += 1;
		}

		let state: Weak<RefCell<MemoryState>> = Rc::downgrade(&self.state);
		let current = Rc::downgrade(&self.generation);
		ListenerGuard::new(move || {
			let (Some(state), Some(current)) = (state.upgrade(), current.upgrade()) else {
				return;
			};
			if current.get() == generation {
				// Take the callbacks out first; dropping them may drop the router.
				let events = state.borrow_mut().events.take();
				drop(events);
			}
		})
	}
}
