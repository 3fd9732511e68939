//! # Waymark
//!
//! A reactive, pattern-based client-side router.
//!
//! Waymark turns a table of named path patterns into compiled matchers, tracks
//! the current location as an observable [`Page`](router::Page), and keeps
//! that value, the browser history and in-page link clicks in sync.
//!
//! ## Feature Flags
//!
//! - `full` (default) - Everything below
//! - `router` - Route tables, location parsing, path building and the router
//! - `reactive` - The observable [`Signal`](reactive::Signal) cell
//!
//! ## Quick Example
//!
//! ```
//! use waymark::prelude::*;
//!
//! let table = RouteTable::new()
//! 	.route("servers", "/servers")
//! 	.route("serversAdd", "/servers/add")
//! 	.route("serversEdit", "/servers/:name");
//! let router = Router::headless(table, RouterOptions::default()).unwrap();
//!
//! router.open_page("serversEdit", &[("name", "my server")], &[]).unwrap();
//! let page = router.page().unwrap();
//! assert_eq!(page.route, "serversEdit");
//! assert_eq!(page.path, "/servers/my%20server");
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "router")]
#[cfg_attr(docsrs, doc(cfg(feature = "router")))]
pub use waymark_router as router;

#[cfg(feature = "reactive")]
#[cfg_attr(docsrs, doc(cfg(feature = "reactive")))]
pub use waymark_reactive as reactive;

// Re-export commonly used types
#[cfg(feature = "router")]
pub use waymark_router::{
	NavigationType, Page, RouteTable, Router, RouterConfig, RouterError, RouterOptions,
	build_path,
};

/// Commonly used types.
pub mod prelude {
	#[cfg(feature = "router")]
	pub use waymark_router::{
		Host, MemoryHost, NavigationType, Page, Params, RouteTable, Router, RouterConfig,
		RouterError, RouterOptions, Subscription, build_path,
	};

	#[cfg(all(feature = "router", target_arch = "wasm32"))]
	pub use waymark_router::BrowserHost;

	#[cfg(feature = "reactive")]
	pub use waymark_reactive::Signal;
}
