//! Path building (reverse routing).
//!
//! The inverse of the location parser: given a route name and parameters,
//! rebuild a concrete path from the route's source pattern. Only routes
//! declared with a pattern string can be inverted.

use super::error::{Result, RouterError};
use super::pattern::Segment;
use super::route::CompiledRoutes;
use url::form_urlencoded;

/// Builds the path for route `name`.
///
/// - mandatory `:name` segments are replaced by the percent-encoded value
/// - optional `:name?` segments become `/value`, or disappear when the value is
///   absent or empty
/// - a non-empty `search` is appended as a form-encoded query string
///
/// When a key appears more than once in `params`, the last occurrence wins.
///
/// The values `.` and `..` are rejected: URL resolution collapses them as dot
/// segments (even percent-encoded), so the built path would not match the
/// route again.
///
/// # Errors
///
/// - [`RouterError::InvalidRouteName`] if no route has this name
/// - [`RouterError::NotInvertible`] if the route was declared with a raw matcher
/// - [`RouterError::UnknownParameter`] if `params` holds a name the pattern
///   does not declare
/// - [`RouterError::MissingParameter`] if a mandatory parameter is absent or empty
/// - [`RouterError::DotSegment`] if a substituted value is `.` or `..`
///
/// # Example
///
/// ```
/// use waymark_router::{RouteTable, build_path};
///
/// let routes = RouteTable::new()
/// 	.route("serversEdit", "/servers/:name")
/// 	.compile()
/// 	.unwrap();
///
/// let path = build_path(&routes, "serversEdit", &[("name", "my server")], &[]).unwrap();
/// assert_eq!(path, "/servers/my%20server");
/// ```
pub fn build_path(
	routes: &CompiledRoutes,
	name: &str,
	params: &[(&str, &str)],
	search: &[(&str, &str)],
) -> Result<String> {
	let route = routes
		.get(name)
		.ok_or_else(|| RouterError::InvalidRouteName(name.to_string()))?;
	let pattern = route
		.pattern()
		.ok_or_else(|| RouterError::NotInvertible(name.to_string()))?;

	if let Some((unknown, _)) = params.iter().find(|(key, _)| !pattern.declares(key)) {
		return Err(RouterError::UnknownParameter {
			route: name.to_string(),
			param: unknown.to_string(),
		});
	}

	let lookup = |param: &str| {
		params
			.iter()
			.rev()
			.find(|(key, _)| *key == param)
			.map(|(_, value)| *value)
			.filter(|value| !value.is_empty())
	};
	let push_segment = |path: &mut String, param: &str, value: &str| {
		if matches!(value, "." | "..") {
			return Err(RouterError::DotSegment {
				route: name.to_string(),
				param: param.to_string(),
				value: value.to_string(),
			});
		}
		path.push('/');
		path.push_str(&urlencoding::encode(value));
		Ok(())
	};

	let mut path = String::with_capacity(pattern.as_str().len());
	for segment in pattern.segments() {
		match segment {
			Segment::Literal(text) => path.push_str(text),
			Segment::Param(param) => {
				let value = lookup(param).ok_or_else(|| RouterError::MissingParameter {
					route: name.to_string(),
					param: param.clone(),
				})?;
				push_segment(&mut path, param, value)?;
			}
			Segment::OptionalParam(param) => {
				if let Some(value) = lookup(param) {
					push_segment(&mut path, param, value)?;
				}
			}
		}
	}
	if path.is_empty() {
		path.push('/');
	}

	let query = encode_search(search);
	if !query.is_empty() {
		path.push('?');
		path.push_str(&query);
	}

	Ok(path)
}

/// Form-encodes `search` pairs in order.
pub fn encode_search(search: &[(&str, &str)]) -> String {
	form_urlencoded::Serializer::new(String::new())
		.extend_pairs(search.iter())
		.finish()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::location::Location;
	use crate::route::RouteTable;
	use proptest::prelude::*;
	use regex::Regex;
	use rstest::{fixture, rstest};

	#[fixture]
	fn routes() -> CompiledRoutes {
		RouteTable::new()
			.route("home", "/")
			.route("servers", "/servers/")
			.route("serversEdit", "/servers/:name")
			.route("list", "/servers/:name?")
			.route("tab", "/orgs/:org/servers/:name/:tab?")
			.route("optionalOnly", "/:lang?")
			.route("legacy", Regex::new(r"^/legacy/(?P<id>\d+)$").unwrap())
			.compile()
			.unwrap()
	}

	#[rstest]
	fn test_build_static(routes: CompiledRoutes) {
		assert_eq!(build_path(&routes, "home", &[], &[]).unwrap(), "/");
		assert_eq!(build_path(&routes, "servers", &[], &[]).unwrap(), "/servers");
	}

	#[rstest]
	fn test_build_encodes_params(routes: CompiledRoutes) {
		assert_eq!(
			build_path(&routes, "serversEdit", &[("name", "my server")], &[]).unwrap(),
			"/servers/my%20server"
		);
		assert_eq!(
			build_path(&routes, "serversEdit", &[("name", "a/b?c")], &[]).unwrap(),
			"/servers/a%2Fb%3Fc"
		);
	}

	#[rstest]
	fn test_build_optional_segments(routes: CompiledRoutes) {
		assert_eq!(build_path(&routes, "list", &[], &[]).unwrap(), "/servers");
		assert_eq!(build_path(&routes, "list", &[("name", "")], &[]).unwrap(), "/servers");
		assert_eq!(
			build_path(&routes, "list", &[("name", "foo")], &[]).unwrap(),
			"/servers/foo"
		);
		assert_eq!(
			build_path(&routes, "tab", &[("org", "acme"), ("name", "db")], &[]).unwrap(),
			"/orgs/acme/servers/db"
		);
		assert_eq!(build_path(&routes, "optionalOnly", &[], &[]).unwrap(), "/");
		assert_eq!(
			build_path(&routes, "optionalOnly", &[("lang", "en")], &[]).unwrap(),
			"/en"
		);
	}

	#[rstest]
	fn test_build_with_search(routes: CompiledRoutes) {
		assert_eq!(
			build_path(&routes, "servers", &[], &[("q", "a b"), ("page", "2")]).unwrap(),
			"/servers?q=a+b&page=2"
		);
	}

	#[rstest]
	fn test_last_duplicate_param_wins(routes: CompiledRoutes) {
		assert_eq!(
			build_path(&routes, "serversEdit", &[("name", "a"), ("name", "b")], &[]).unwrap(),
			"/servers/b"
		);
	}

	#[rstest]
	fn test_build_errors(routes: CompiledRoutes) {
		assert_eq!(
			build_path(&routes, "nope", &[], &[]).unwrap_err(),
			RouterError::InvalidRouteName("nope".to_string())
		);
		assert_eq!(
			build_path(&routes, "legacy", &[("id", "1")], &[]).unwrap_err(),
			RouterError::NotInvertible("legacy".to_string())
		);
		assert_eq!(
			build_path(&routes, "serversEdit", &[], &[]).unwrap_err(),
			RouterError::MissingParameter {
				route: "serversEdit".to_string(),
				param: "name".to_string(),
			}
		);
		assert_eq!(
			build_path(&routes, "serversEdit", &[("name", "a"), ("id", "1")], &[]).unwrap_err(),
			RouterError::UnknownParameter {
				route: "serversEdit".to_string(),
				param: "id".to_string(),
			}
		);
	}

	#[rstest]
	#[case::mandatory("serversEdit", "name", ".")]
	#[case::mandatory_parent("serversEdit", "name", "..")]
	#[case::optional("list", "name", "..")]
	fn test_dot_segment_values_rejected(
		routes: CompiledRoutes,
		#[case] route: &str,
		#[case] param: &str,
		#[case] value: &str,
	) {
		assert_eq!(
			build_path(&routes, route, &[(param, value)], &[]).unwrap_err(),
			RouterError::DotSegment {
				route: route.to_string(),
				param: param.to_string(),
				value: value.to_string(),
			}
		);
		assert_eq!(
			build_path(&routes, "serversEdit", &[("name", "...")], &[]).unwrap(),
			"/servers/..."
		);
	}

	#[rstest]
	fn test_encode_search_empty() {
		assert_eq!(encode_search(&[]), "");
	}

	proptest! {
		#[test]
		fn prop_build_then_match_round_trips(
			org in "[a-zA-Z0-9 ._%/?#&=+~é-]{1,12}",
			name in "[a-zA-Z0-9 ._%/?#&=+~é-]{1,12}",
		) {
			prop_assume!(!matches!(org.as_str(), "." | ".."));
			prop_assume!(!matches!(name.as_str(), "." | ".."));

			let routes = RouteTable::new()
				.route("edit", "/orgs/:org/servers/:name")
				.compile()
				.unwrap();

			let path = build_path(&routes, "edit", &[("org", org.as_str()), ("name", name.as_str())], &[]).unwrap();
			let location = Location::resolve(&path).unwrap();
			let (route, params) = routes.match_path(&location.match_path(false)).unwrap();

			prop_assert_eq!(route.name(), "edit");
			prop_assert_eq!(params.get("org"), Some(&org));
			prop_assert_eq!(params.get("name"), Some(&name));
		}
	}
}
