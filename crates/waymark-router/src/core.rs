//! Router core.
//!
//! [`Router`] owns the compiled route table and a reactive cell holding the
//! current [`Page`]. Programmatic navigation, history traversal, link clicks
//! and fragment changes all funnel through the same keyed parse, so each
//! distinct location produces at most one page update.
//!
//! Host listeners are only installed while somebody is subscribed. The first
//! subscriber triggers a fresh parse of the host location and attaches the
//! listeners; the last one leaving detaches them and forgets the last parsed
//! key, so a later subscriber starts from a clean slate.

use super::config::{RouterConfig, RouterOptions};
use super::error::Result;
use super::history::{Host, HostEvents, LinkClick, ListenerGuard, NavigationType};
use super::location::{LocationParser, Page};
use super::reverse;
use super::route::{CompiledRoutes, RouteTable};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use waymark_reactive::{Signal, SubscriptionId};

/// Location parsed by a router without a host.
const HEADLESS_LOCATION: &str = "/";

#[derive(Debug, Default)]
struct RouterState {
	last_key: Option<String>,
	subscribers: usize,
	listening: Option<ListenerGuard>,
}

struct RouterInner {
	routes: CompiledRoutes,
	options: RouterOptions,
	host: Option<Rc<dyn Host>>,
	page: Signal<Option<Page>>,
	state: RefCell<RouterState>,
}

/// Client-side router.
///
/// Cloning a `Router` yields another handle to the same router.
///
/// # Example
///
/// ```
/// use waymark_router::{MemoryHost, NavigationType, RouteTable, Router, RouterOptions};
///
/// let table = RouteTable::new()
/// 	.route("servers", "/servers")
/// 	.route("serversAdd", "/servers/add")
/// 	.route("serversEdit", "/servers/:name");
/// let router = Router::new(table, RouterOptions::default(), MemoryHost::new()).unwrap();
///
/// assert!(router.open("/servers/add", NavigationType::Push).unwrap());
/// assert_eq!(router.page().unwrap().route, "serversAdd");
///
/// // Opening the current location again changes nothing.
/// assert!(!router.open("/servers/add", NavigationType::Push).unwrap());
/// ```
#[derive(Clone)]
pub struct Router {
	inner: Rc<RouterInner>,
}

impl Router {
	/// Creates a router attached to `host` and parses the host's current
	/// location.
	///
	/// # Errors
	///
	/// Returns the route table's compilation error, or
	/// [`RouterError::InvalidLocation`](crate::RouterError::InvalidLocation) if
	/// the host reports a location that cannot be resolved.
	pub fn new(table: RouteTable, options: RouterOptions, host: impl Host + 'static) -> Result<Self> {
		Self::with_host(table, options, Rc::new(host))
	}

	/// Creates a router with no host environment.
	///
	/// The current location is parsed once as `/`. [`open`](Self::open) only
	/// updates the in-memory page, and subscribing never installs listeners.
	pub fn headless(table: RouteTable, options: RouterOptions) -> Result<Self> {
		Self::build(table, options, None, HEADLESS_LOCATION)
	}

	/// Creates a router from a [`RouterConfig`].
	pub fn from_config(config: &RouterConfig, host: impl Host + 'static) -> Result<Self> {
		Self::new(config.to_table(), config.options, host)
	}

	pub(crate) fn with_host(
		table: RouteTable,
		options: RouterOptions,
		host: Rc<dyn Host>,
	) -> Result<Self> {
		let initial = host.href();
		Self::build(table, options, Some(host), &initial)
	}

	fn build(
		table: RouteTable,
		options: RouterOptions,
		host: Option<Rc<dyn Host>>,
		initial: &str,
	) -> Result<Self> {
		let routes = table.compile()?;
		let mut last_key = None;
		let page = LocationParser::new(&routes, &options).parse(initial, &mut last_key)?;

		tracing::debug!(
			routes = routes.len(),
			headless = host.is_none(),
			initial_route = page.as_ref().map(|p| p.route.as_str()),
			"router created"
		);

		Ok(Self {
			inner: Rc::new(RouterInner {
				routes,
				options,
				host,
				page: Signal::new(page),
				state: RefCell::new(RouterState {
					last_key,
					..RouterState::default()
				}),
			}),
		})
	}

	/// Navigates to `path`.
	///
	/// When `path` resolves to a route, the host history is updated according
	/// to `navigation` and subscribers are notified. Returns `Ok(false)` when
	/// the location is the one last parsed or matches no route; neither the
	/// history nor the page changes in that case.
	///
	/// # Errors
	///
	/// [`RouterError::InvalidLocation`](crate::RouterError::InvalidLocation) for
	/// an unparseable `path`, or the host's error if the history update fails.
	pub fn open(&self, path: &str, navigation: NavigationType) -> Result<bool> {
		self.inner.open(path, navigation)
	}

	/// [`open`](Self::open) with [`NavigationType::Push`].
	pub fn push(&self, path: &str) -> Result<bool> {
		self.open(path, NavigationType::Push)
	}

	/// [`open`](Self::open) with [`NavigationType::Replace`].
	pub fn replace(&self, path: &str) -> Result<bool> {
		self.open(path, NavigationType::Replace)
	}

	/// Builds the path for route `name` and pushes it.
	pub fn open_page(
		&self,
		name: &str,
		params: &[(&str, &str)],
		search: &[(&str, &str)],
	) -> Result<bool> {
		let path = self.build_path(name, params, search)?;
		self.open(&path, NavigationType::Push)
	}

	/// Builds the path for route `name` and replaces the current entry with it.
	pub fn redirect_page(
		&self,
		name: &str,
		params: &[(&str, &str)],
		search: &[(&str, &str)],
	) -> Result<bool> {
		let path = self.build_path(name, params, search)?;
		self.open(&path, NavigationType::Replace)
	}

	/// See [`build_path`](crate::build_path).
	pub fn build_path(
		&self,
		name: &str,
		params: &[(&str, &str)],
		search: &[(&str, &str)],
	) -> Result<String> {
		reverse::build_path(&self.inner.routes, name, params, search)
	}

	/// Resolves `location` without navigating or touching the last parsed key.
	pub fn match_location(&self, location: &str) -> Result<Option<Page>> {
		LocationParser::new(&self.inner.routes, &self.inner.options).resolve(location)
	}

	/// The current page, if any location has matched so far.
	pub fn page(&self) -> Option<Page> {
		self.inner.page.get()
	}

	/// The compiled route table.
	pub fn routes(&self) -> &CompiledRoutes {
		&self.inner.routes
	}

	/// The router options.
	pub fn options(&self) -> &RouterOptions {
		&self.inner.options
	}

	/// Whether the router runs without a host.
	pub fn is_headless(&self) -> bool {
		self.inner.host.is_none()
	}

	/// Registers `listener` for page changes.
	///
	/// The listener is not called with the current page. The first subscriber
	/// re-parses the host location and installs host listeners.
	pub fn subscribe<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&Page) + 'static,
	{
		let first = {
			let mut state = self.inner.state.borrow_mut();
			state.subscribers += 1;
			state.subscribers == 1
		};
		if first && self.inner.host.is_some() {
			self.inner.sync_with_host();
			self.inner.attach();
		}

		let id = self.inner.page.subscribe(move |page: &Option<Page>| {
			if let Some(page) = page {
				listener(page);
			}
		});

		Subscription {
			router: Rc::downgrade(&self.inner),
			id: Some(id),
		}
	}

	/// Number of live subscriptions.
	pub fn subscriber_count(&self) -> usize {
		self.inner.state.borrow().subscribers
	}

	/// Whether host listeners are installed.
	pub fn is_listening(&self) -> bool {
		self.inner.state.borrow().listening.is_some()
	}
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.state.borrow();
		f.debug_struct("Router")
			.field("routes", &self.inner.routes.len())
			.field("options", &self.inner.options)
			.field("headless", &self.inner.host.is_none())
			.field("page", &self.inner.page)
			.field("last_key", &state.last_key)
			.field("subscribers", &state.subscribers)
			.finish()
	}
}

impl RouterInner {
	fn parse(&self, location: &str) -> Result<Option<Page>> {
		let mut state = self.state.borrow_mut();
		LocationParser::new(&self.routes, &self.options).parse(location, &mut state.last_key)
	}

	fn open(&self, path: &str, navigation: NavigationType) -> Result<bool> {
		let Some(page) = self.parse(path)? else {
			return Ok(false);
		};

		if let Some(host) = &self.host {
			let recorded = match navigation {
				NavigationType::Push => host.push_state(path),
				NavigationType::Replace => host.replace_state(path),
			};
			if let Err(error) = recorded {
				// The location was never reached; allow retrying it.
				self.state.borrow_mut().last_key = None;
				return Err(error);
			}
		}

		tracing::debug!(route = %page.route, path = %page.path, ?navigation, "navigated");
		self.page.set(Some(page));
		Ok(true)
	}

	/// Re-parses the host location and publishes the result if it changed.
	fn sync_with_host(&self) {
		let Some(host) = &self.host else {
			return;
		};
		let href = host.href();
		match self.parse(&href) {
			Ok(Some(page)) => {
				tracing::debug!(route = %page.route, path = %page.path, "location changed");
				self.page.set(Some(page));
			}
			Ok(None) => {}
			Err(error) => tracing::warn!(%href, %error, "failed to parse host location"),
		}
	}

	fn attach(self: &Rc<Self>) {
		let Some(host) = &self.host else {
			return;
		};

		let on_location_change: Rc<dyn Fn()> = Rc::new({
			let router = Rc::downgrade(self);
			move || {
				if let Some(router) = router.upgrade() {
					router.sync_with_host();
				}
			}
		});
		let on_link_click = self.options.links.then(|| {
			let router = Rc::downgrade(self);
			Rc::new(move |click: &LinkClick| {
				router
					.upgrade()
					.is_some_and(|router| router.handle_click(click))
			}) as Rc<dyn Fn(&LinkClick) -> bool>
		});

		let guard = host.listen(HostEvents {
			on_location_change,
			on_link_click,
		});
		self.state.borrow_mut().listening = Some(guard);
		tracing::debug!(links = self.options.links, "host listeners attached");
	}

	fn unsubscribe(&self, id: SubscriptionId) {
		if !self.page.unsubscribe(id) {
			return;
		}

		let detached = {
			let mut state = self.state.borrow_mut();
			state.subscribers = state.subscribers.saturating_sub(1);
			if state.subscribers == 0 && self.host.is_some() {
				state.last_key = None;
				state.listening.take()
			} else {
				None
			}
		};
		if let Some(guard) = detached {
			drop(guard);
			tracing::debug!("host listeners detached");
		}
	}

	fn handle_click(&self, click: &LinkClick) -> bool {
		let Some(host) = &self.host else {
			return false;
		};
		let origin = host.origin();
		let Some(anchor) = click.routable_anchor(&origin) else {
			return false;
		};

		let hash_changed = host.hash() != anchor.hash;
		if let Err(error) = self.open(&anchor.href, NavigationType::Push) {
			tracing::warn!(href = %anchor.href, %error, "link navigation failed");
		}

		if hash_changed {
			if let Err(error) = host.set_hash(&anchor.hash) {
				tracing::warn!(hash = %anchor.hash, %error, "failed to set location hash");
			}
			// Clearing the fragment does not reliably fire hashchange.
			if anchor.hash.is_empty() || anchor.hash == "#" {
				if let Err(error) = host.dispatch_hash_change() {
					tracing::warn!(%error, "failed to dispatch hashchange");
				}
			}
		}
		true
	}
}

/// A live page subscription. Dropping it unsubscribes.
#[must_use = "the listener is removed as soon as the subscription is dropped"]
pub struct Subscription {
	router: Weak<RouterInner>,
	id: Option<SubscriptionId>,
}

impl Subscription {
	/// Removes the listener.
	pub fn unsubscribe(mut self) {
		self.release();
	}

	fn release(&mut self) {
		if let (Some(id), Some(router)) = (self.id.take(), self.router.upgrade()) {
			router.unsubscribe(id);
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.release();
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription").field("id", &self.id).finish()
	}
}
