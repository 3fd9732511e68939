//! # waymark-router
//!
//! Reactive, pattern-based client-side routing.
//!
//! ## Overview
//!
//! A route table maps names to path patterns (`/servers/:name`,
//! `/servers/:name?`) or to regular expressions. The table is compiled once;
//! afterwards a [`Router`] keeps the current [`Page`] in a reactive cell and
//! keeps it synchronized with the host's history:
//!
//! - [`Router::open`] navigates programmatically (push or replace)
//! - back/forward and fragment changes re-parse the host location
//! - plain same-origin link clicks are intercepted and routed in-page
//!
//! Every navigation trigger goes through the same keyed parse, so duplicate
//! notifications for one location collapse into a single page update.
//! Host listeners exist only while the router has subscribers.
//!
//! ## Resolution order
//!
//! Routes are tried in declaration order and the first match wins. Declare
//! literal routes before parametric routes that would also match them:
//!
//! ```
//! use waymark_router::{LocationParser, RouteTable, RouterOptions};
//!
//! let routes = RouteTable::new()
//! 	.route("servers", "/servers")
//! 	.route("serversAdd", "/servers/add")
//! 	.route("serversEdit", "/servers/:name")
//! 	.compile()
//! 	.unwrap();
//! let parser = LocationParser::new(&routes, &RouterOptions::default());
//!
//! let page = parser.resolve("/servers/add").unwrap().unwrap();
//! assert_eq!(page.route, "serversAdd");
//! ```
//!
//! ## Hosts
//!
//! The environment is abstracted by the [`Host`] trait. [`MemoryHost`] keeps
//! history in memory; on `wasm32`, `BrowserHost` drives `window.history`.
//! [`Router::headless`] runs without any host.

mod config;
mod core;
mod error;
mod history;
mod location;
mod memory;
mod pattern;
mod reverse;
mod route;

#[cfg(target_arch = "wasm32")]
mod browser;

pub use config::{RouteEntry, RouterConfig, RouterOptions};
pub use core::{Router, Subscription};
pub use error::{Result, RouterError};
pub use history::{Anchor, Host, HostEvents, LinkClick, ListenerGuard, NavigationType};
pub use location::{LocationParser, Page, normalize_path};
pub use memory::MemoryHost;
pub use pattern::{PathPattern, Segment};
pub use reverse::{build_path, encode_search};
pub use route::{CompiledRoute, CompiledRoutes, Extractor, Params, RouteDefinition, RouteTable};

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserHost;
