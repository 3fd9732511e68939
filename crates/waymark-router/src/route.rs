//! Route tables and compiled routes.
//!
//! A [`RouteTable`] is the ordered list of named route definitions supplied at
//! startup. [`RouteTable::compile`] turns it into [`CompiledRoutes`], which the
//! location parser walks in declaration order: the first route whose matcher
//! accepts a path wins. The compiler never reorders routes, so a literal route
//! such as `/servers/add` must be declared before a parametric route such as
//! `/servers/:name` that would also accept it.

use super::error::{Result, RouterError};
use super::pattern::PathPattern;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::Arc;

/// Parameters extracted from a matched path.
pub type Params = HashMap<String, String>;

/// Custom extractor for raw-matcher routes.
///
/// Receives the positional capture groups of the matcher (group 1 first);
/// groups that did not participate in the match are `None`. Values are passed
/// undecoded.
pub type Extractor = Arc<dyn Fn(&[Option<&str>]) -> Params + Send + Sync>;

/// How a single route is defined in the table.
#[derive(Clone)]
pub enum RouteDefinition {
	/// A `/fixed/:param` / `/fixed/:param?` pattern string.
	Pattern(String),
	/// A precompiled matcher whose named capture groups become parameters.
	Regex(Regex),
	/// A precompiled matcher paired with a custom extractor.
	Matcher(Regex, Extractor),
}

impl std::fmt::Debug for RouteDefinition {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Pattern(p) => f.debug_tuple("Pattern").field(p).finish(),
			Self::Regex(r) => f.debug_tuple("Regex").field(&r.as_str()).finish(),
			Self::Matcher(r, _) => f.debug_tuple("Matcher").field(&r.as_str()).finish(),
		}
	}
}

impl From<&str> for RouteDefinition {
	fn from(pattern: &str) -> Self {
		Self::Pattern(pattern.to_string())
	}
}

impl From<String> for RouteDefinition {
	fn from(pattern: String) -> Self {
		Self::Pattern(pattern)
	}
}

impl From<Regex> for RouteDefinition {
	fn from(regex: Regex) -> Self {
		Self::Regex(regex)
	}
}

/// Ordered table of named route definitions.
///
/// # Example
///
/// ```
/// use waymark_router::RouteTable;
///
/// let routes = RouteTable::new()
/// 	.route("servers", "/servers")
/// 	.route("serversAdd", "/servers/add")
/// 	.route("serversEdit", "/servers/:name")
/// 	.compile()
/// 	.unwrap();
///
/// assert_eq!(routes.match_path("/servers/add").unwrap().0.name(), "serversAdd");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
	entries: Vec<(String, RouteDefinition)>,
}

impl RouteTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a route. Declaration order is resolution order.
	pub fn route(mut self, name: impl Into<String>, definition: impl Into<RouteDefinition>) -> Self {
		self.entries.push((name.into(), definition.into()));
		self
	}

	/// Appends a raw-matcher route with a custom extractor.
	pub fn matcher<F>(mut self, name: impl Into<String>, regex: Regex, extractor: F) -> Self
	where
		F: Fn(&[Option<&str>]) -> Params + Send + Sync + 'static,
	{
		self.entries
			.push((name.into(), RouteDefinition::Matcher(regex, Arc::new(extractor))));
		self
	}

	/// Number of routes declared so far.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether no route has been declared.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Compiles every definition, preserving declaration order.
	///
	/// # Errors
	///
	/// - [`RouterError::DuplicateRoute`] if a name is declared twice
	/// - [`RouterError::InvalidPattern`] if a pattern string does not compile
	pub fn compile(self) -> Result<CompiledRoutes> {
		let mut routes: Vec<CompiledRoute> = Vec::with_capacity(self.entries.len());
		let mut by_name = HashMap::with_capacity(self.entries.len());

		for (name, definition) in self.entries {
			if by_name.contains_key(&name) {
				return Err(RouterError::DuplicateRoute(name));
			}

			let route = CompiledRoute::compile(name, definition)?;
			warn_if_shadowed(&routes, &route);

			by_name.insert(route.name.clone(), routes.len());
			routes.push(route);
		}

		tracing::debug!(routes = routes.len(), "compiled route table");
		Ok(CompiledRoutes { routes, by_name })
	}
}

/// Emits a warning when an earlier route already accepts a literal route's path.
fn warn_if_shadowed(earlier: &[CompiledRoute], route: &CompiledRoute) {
	let Some(pattern) = &route.pattern else {
		return;
	};
	if pattern.required_params().next().is_some() || pattern.optional_params().next().is_some() {
		return;
	}
	if let Some(shadowing) = earlier.iter().find(|r| r.matcher.is_match(pattern.as_str())) {
		tracing::warn!(
			route = %route.name,
			shadowed_by = %shadowing.name,
			path = %pattern,
			"route is unreachable: an earlier route matches the same path; declare it first"
		);
	}
}

#[derive(Clone)]
enum Extraction {
	NamedGroups,
	Custom(Extractor),
}

/// A route ready for matching.
#[derive(Clone)]
pub struct CompiledRoute {
	name: String,
	matcher: Regex,
	extraction: Extraction,
	/// Present only for string-derived routes.
	pattern: Option<PathPattern>,
}

impl std::fmt::Debug for CompiledRoute {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CompiledRoute")
			.field("name", &self.name)
			.field("matcher", &self.matcher.as_str())
			.field("pattern", &self.pattern.as_ref().map(PathPattern::as_str))
			.field(
				"custom_extractor",
				&matches!(self.extraction, Extraction::Custom(_)),
			)
			.finish()
	}
}

impl CompiledRoute {
	fn compile(name: String, definition: RouteDefinition) -> Result<Self> {
		match definition {
			RouteDefinition::Pattern(source) => {
				let pattern =
					PathPattern::new(&source).map_err(|reason| RouterError::InvalidPattern {
						route: name.clone(),
						pattern: source.clone(),
						reason,
					})?;
				Ok(Self {
					name,
					matcher: pattern.regex().clone(),
					extraction: Extraction::NamedGroups,
					pattern: Some(pattern),
				})
			}
			RouteDefinition::Regex(matcher) => Ok(Self {
				name,
				matcher,
				extraction: Extraction::NamedGroups,
				pattern: None,
			}),
			RouteDefinition::Matcher(matcher, extractor) => Ok(Self {
				name,
				matcher,
				extraction: Extraction::Custom(extractor),
				pattern: None,
			}),
		}
	}

	/// Returns the route name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the source pattern, if the route was declared with one.
	pub fn pattern(&self) -> Option<&PathPattern> {
		self.pattern.as_ref()
	}

	/// Returns the matcher.
	pub fn matcher(&self) -> &Regex {
		&self.matcher
	}

	/// Whether the path builder can reconstruct paths for this route.
	pub fn is_invertible(&self) -> bool {
		self.pattern.is_some()
	}

	/// Parameters the route requires when building a path.
	pub fn required_params(&self) -> Vec<&str> {
		self.pattern
			.as_ref()
			.map(|p| p.required_params().collect())
			.unwrap_or_default()
	}

	/// Parameters the route accepts but does not require.
	pub fn optional_params(&self) -> Vec<&str> {
		self.pattern
			.as_ref()
			.map(|p| p.optional_params().collect())
			.unwrap_or_default()
	}

	/// Checks if this route would match the given normalized path.
	pub fn is_match(&self, path: &str) -> bool {
		self.matcher.is_match(path)
	}

	/// Matches a normalized path and extracts its parameters.
	///
	/// Captured values are percent-decoded on a best-effort basis: a value
	/// that does not decode to UTF-8 is kept as captured. Optional captures
	/// that did not participate are omitted.
	pub fn extract(&self, path: &str) -> Option<Params> {
		let caps = self.matcher.captures(path)?;
		Some(match &self.extraction {
			Extraction::NamedGroups => self.named_params(&caps),
			Extraction::Custom(extractor) => {
				let parts: Vec<Option<&str>> = caps
					.iter()
					.skip(1)
					.map(|m| m.map(|m| m.as_str()))
					.collect();
				extractor(&parts)
			}
		})
	}

	fn named_params(&self, caps: &Captures<'_>) -> Params {
		self.matcher
			.capture_names()
			.flatten()
			.filter_map(|name| {
				caps.name(name)
					.map(|m| (name.to_string(), decode_param(m.as_str())))
			})
			.collect()
	}
}

pub(crate) fn decode_param(raw: &str) -> String {
	urlencoding::decode(raw)
		.map(|decoded| decoded.into_owned())
		.unwrap_or_else(|_| raw.to_string())
}

/// The ordered, immutable result of compiling a [`RouteTable`].
#[derive(Debug, Clone)]
pub struct CompiledRoutes {
	routes: Vec<CompiledRoute>,
	by_name: HashMap<String, usize>,
}

impl CompiledRoutes {
	/// Routes in declaration order.
	pub fn iter(&self) -> std::slice::Iter<'_, CompiledRoute> {
		self.routes.iter()
	}

	/// Number of routes.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Whether the table was empty.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	/// Looks a route up by name.
	pub fn get(&self, name: &str) -> Option<&CompiledRoute> {
		self.by_name.get(name).map(|&index| &self.routes[index])
	}

	/// Checks if a route name exists.
	pub fn has_route(&self, name: &str) -> bool {
		self.by_name.contains_key(name)
	}

	/// Returns the first route, in declaration order, that matches `path`,
	/// together with its parameters.
	pub fn match_path(&self, path: &str) -> Option<(&CompiledRoute, Params)> {
		self.routes
			.iter()
			.find_map(|route| route.extract(path).map(|params| (route, params)))
	}
}

impl<'a> IntoIterator for &'a CompiledRoutes {
	type Item = &'a CompiledRoute;
	type IntoIter = std::slice::Iter<'a, CompiledRoute>;

	fn into_iter(self) -> Self::IntoIter {
		self.routes.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn servers() -> CompiledRoutes {
		RouteTable::new()
			.route("home", "/")
			.route("servers", "/servers")
			.route("serversAdd", "/servers/add")
			.route("serversEdit", "/servers/:name")
			.compile()
			.unwrap()
	}

	#[rstest]
	fn test_compile_preserves_order(servers: CompiledRoutes) {
		let names: Vec<&str> = servers.iter().map(CompiledRoute::name).collect();
		assert_eq!(names, vec!["home", "servers", "serversAdd", "serversEdit"]);
		assert_eq!(servers.len(), 4);
	}

	#[rstest]
	fn test_first_match_wins(servers: CompiledRoutes) {
		let (route, params) = servers.match_path("/servers/add").unwrap();
		assert_eq!(route.name(), "serversAdd");
		assert!(params.is_empty());

		let (route, params) = servers.match_path("/servers/alpha").unwrap();
		assert_eq!(route.name(), "serversEdit");
		assert_eq!(params.get("name").map(String::as_str), Some("alpha"));
	}

	#[rstest]
	fn test_declaration_order_is_authoritative() {
		let routes = RouteTable::new()
			.route("serversEdit", "/servers/:name")
			.route("serversAdd", "/servers/add")
			.compile()
			.unwrap();

		let (route, params) = routes.match_path("/servers/add").unwrap();
		assert_eq!(route.name(), "serversEdit");
		assert_eq!(params.get("name").map(String::as_str), Some("add"));
	}

	#[rstest]
	fn test_lookup_by_name(servers: CompiledRoutes) {
		assert!(servers.has_route("serversEdit"));
		assert!(!servers.has_route("nonexistent"));
		assert_eq!(servers.get("serversEdit").unwrap().required_params(), vec!["name"]);
	}

	#[rstest]
	fn test_duplicate_route_rejected() {
		let result = RouteTable::new()
			.route("home", "/")
			.route("home", "/home")
			.compile();
		assert_eq!(result.unwrap_err(), RouterError::DuplicateRoute("home".to_string()));
	}

	#[rstest]
	fn test_invalid_pattern_is_configuration_error() {
		let result = RouteTable::new().route("bad", "/:id/:id").compile();
		assert!(matches!(
			result,
			Err(RouterError::InvalidPattern { ref route, .. }) if route == "bad"
		));
	}

	#[rstest]
	fn test_optional_param_omitted_not_empty() {
		let routes = RouteTable::new()
			.route("servers", "/servers/:name?")
			.compile()
			.unwrap();

		let (_, params) = routes.match_path("/servers").unwrap();
		assert!(!params.contains_key("name"));

		let (_, params) = routes.match_path("/servers/foo").unwrap();
		assert_eq!(params.get("name").map(String::as_str), Some("foo"));
	}

	#[rstest]
	fn test_params_are_percent_decoded() {
		let routes = RouteTable::new()
			.route("edit", "/servers/:name")
			.compile()
			.unwrap();

		let (_, params) = routes.match_path("/servers/my%20server").unwrap();
		assert_eq!(params.get("name").map(String::as_str), Some("my server"));
	}

	#[rstest]
	fn test_undecodable_param_kept_raw() {
		let routes = RouteTable::new()
			.route("edit", "/servers/:name")
			.compile()
			.unwrap();

		let (_, params) = routes.match_path("/servers/%FF").unwrap();
		assert_eq!(params.get("name").map(String::as_str), Some("%FF"));
	}

	#[rstest]
	fn test_regex_route_uses_named_groups() {
		let routes = RouteTable::new()
			.route("legacy", Regex::new(r"^/legacy/(?P<id>\d+)$").unwrap())
			.compile()
			.unwrap();

		let route = routes.get("legacy").unwrap();
		assert!(!route.is_invertible());
		assert!(route.required_params().is_empty());

		let (_, params) = routes.match_path("/legacy/7").unwrap();
		assert_eq!(params.get("id").map(String::as_str), Some("7"));
		assert!(routes.match_path("/legacy/x").is_none());
	}

	#[rstest]
	fn test_matcher_route_uses_custom_extractor() {
		let routes = RouteTable::new()
			.matcher(
				"range",
				Regex::new(r"^/range/(\d+)-(\d+)?$").unwrap(),
				|parts| {
					let mut params = Params::new();
					if let Some(from) = parts[0] {
						params.insert("from".to_string(), from.to_string());
					}
					params.insert("to".to_string(), parts[1].unwrap_or("end").to_string());
					params
				},
			)
			.compile()
			.unwrap();

		let (_, params) = routes.match_path("/range/3-").unwrap();
		assert_eq!(params.get("from").map(String::as_str), Some("3"));
		assert_eq!(params.get("to").map(String::as_str), Some("end"));
	}

	#[rstest]
	fn test_route_definition_debug() {
		let definition = RouteDefinition::from("/servers");
		assert_eq!(format!("{:?}", definition), "Pattern(\"/servers\")");
	}
}
