//! Location parsing.
//!
//! Resolves a location string (absolute URL, or a path relative to the site
//! root) into a [`Page`] by trying the compiled routes in declaration order.
//!
//! Parsing is keyed: the normalized `pathname + search + hash` of every
//! attempted parse is remembered, and parsing the same key again yields
//! nothing. Several event sources firing for one navigation therefore produce a
//! single page update.

use super::config::RouterOptions;
use super::error::{Result, RouterError};
use super::route::{CompiledRoutes, Params};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// Scaffolding base for relative locations. Never appears in output.
const RESOLUTION_BASE: &str = "http://a/";

/// The resolved result of matching a location against the route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
	/// Name of the matched route.
	pub route: String,
	/// Decoded path parameters. Absent optional parameters have no key.
	pub params: Params,
	/// The normalized path that was matched.
	pub path: String,
	/// Query string as a flat map (last value wins).
	pub search: HashMap<String, String>,
	/// The fragment including `#`, or empty.
	pub hash: String,
}

impl Page {
	/// Returns a path parameter.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}

	/// Returns a query parameter.
	pub fn query(&self, name: &str) -> Option<&str> {
		self.search.get(name).map(String::as_str)
	}
}

/// A location split into the parts the parser cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Location {
	pub pathname: String,
	/// `?query`, or empty.
	pub search: String,
	/// `#fragment`, or empty.
	pub hash: String,
	pub query: HashMap<String, String>,
}

impl Location {
	/// Resolves `location` against the scaffolding base.
	pub fn resolve(location: &str) -> Result<Self> {
		let trimmed = location.strip_suffix('#').unwrap_or(location);
		let url = Url::parse(RESOLUTION_BASE)
			.and_then(|base| base.join(trimmed))
			.map_err(|e| RouterError::InvalidLocation {
				location: location.to_string(),
				reason: e.to_string(),
			})?;

		let search = match url.query() {
			Some(q) if !q.is_empty() => format!("?{}", q),
			_ => String::new(),
		};
		let hash = match url.fragment() {
			Some(f) if !f.is_empty() => format!("#{}", f),
			_ => String::new(),
		};
		let query = url.query_pairs().into_owned().collect();

		Ok(Self {
			pathname: url.path().to_string(),
			search,
			hash,
			query,
		})
	}

	/// The de-duplication key.
	pub fn key(&self) -> String {
		format!("{}{}{}", self.pathname, self.search, self.hash)
	}

	/// The path routes are matched against.
	pub fn match_path(&self, search_sensitive: bool) -> String {
		if search_sensitive {
			normalize_path(&format!("{}{}", self.pathname, self.search))
		} else {
			normalize_path(&self.pathname)
		}
	}
}

/// Removes the first `/` that ends the path or precedes the query string.
///
/// `/servers/` becomes `/servers`, `/servers/?tab=1` becomes `/servers?tab=1`,
/// and the empty path or a bare `/` become `/`.
pub fn normalize_path(path: &str) -> String {
	let bytes = path.as_bytes();
	let cut = (0..bytes.len())
		.find(|&i| bytes[i] == b'/' && matches!(bytes.get(i + 1), None | Some(b'?')));

	let mut normalized = match cut {
		Some(i) => format!("{}{}", &path[..i], &path[i + 1..]),
		None => path.to_string(),
	};
	if normalized.is_empty() || normalized.starts_with('?') {
		normalized.insert(0, '/');
	}
	normalized
}

/// Turns locations into pages using a compiled route table.
#[derive(Debug, Clone, Copy)]
pub struct LocationParser<'a> {
	routes: &'a CompiledRoutes,
	search_sensitive: bool,
}

impl<'a> LocationParser<'a> {
	/// Creates a parser over `routes`.
	pub fn new(routes: &'a CompiledRoutes, options: &RouterOptions) -> Self {
		Self {
			routes,
			search_sensitive: options.search,
		}
	}

	/// Parses `location`, skipping it when its key equals `last_key`.
	///
	/// Returns `Ok(None)` when the location is unchanged or matches no route.
	/// The key is stored in `last_key` before matching, so a location is
	/// attempted at most once even if it matches nothing.
	///
	/// # Errors
	///
	/// [`RouterError::InvalidLocation`] if the string cannot be resolved as a URL.
	pub fn parse(&self, location: &str, last_key: &mut Option<String>) -> Result<Option<Page>> {
		let resolved = Location::resolve(location)?;
		let key = resolved.key();

		if last_key.as_deref() == Some(key.as_str()) {
			tracing::trace!(%key, "location unchanged, skipping parse");
			return Ok(None);
		}
		*last_key = Some(key);

		Ok(self.page_for(resolved))
	}

	/// Parses `location` without consulting or recording a key.
	pub fn resolve(&self, location: &str) -> Result<Option<Page>> {
		Location::resolve(location).map(|resolved| self.page_for(resolved))
	}

	fn page_for(&self, location: Location) -> Option<Page> {
		let path = location.match_path(self.search_sensitive);

		match self.routes.match_path(&path) {
			Some((route, params)) => {
				tracing::debug!(route = route.name(), %path, "location matched");
				Some(Page {
					route: route.name().to_string(),
					params,
					path,
					search: location.query,
					hash: location.hash,
				})
			}
			None => {
				tracing::debug!(%path, "no route matched location");
				None
			}
		}
	}
}
