//! Error types for client-side routing.

/// Error type for router operations.
///
/// Every variant except [`RouterError::NavigationFailed`] describes a
/// programming mistake in the route table or in a navigation call. A location
/// that matches no route is not an error; it simply produces no page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
	/// A route pattern could not be compiled.
	#[error("Invalid pattern '{pattern}' for route '{route}': {reason}")]
	InvalidPattern {
		/// Name of the offending route.
		route: String,
		/// The pattern as written in the route table.
		pattern: String,
		/// Why compilation failed.
		reason: String,
	},
	/// Two routes were declared with the same name.
	#[error("Duplicate route name: {0}")]
	DuplicateRoute(String),
	/// No route with this name exists.
	#[error("Invalid route name: {0}")]
	InvalidRouteName(String),
	/// The route was supplied as a raw matcher and has no pattern to rebuild.
	#[error("Route '{0}' was registered with a raw matcher and cannot build paths")]
	NotInvertible(String),
	/// A mandatory parameter was not supplied when building a path.
	#[error("Missing parameter '{param}' for route '{route}'")]
	MissingParameter {
		/// Route being built.
		route: String,
		/// The absent parameter.
		param: String,
	},
	/// A parameter was supplied that the route's pattern does not declare.
	#[error("Unknown parameter '{param}' for route '{route}'")]
	UnknownParameter {
		/// Route being built.
		route: String,
		/// The unexpected parameter.
		param: String,
	},
	/// A parameter value would be read back as a `.` or `..` path segment.
	#[error("Parameter '{param}' for route '{route}' cannot be the dot segment '{value}'")]
	DotSegment {
		/// Route being built.
		route: String,
		/// The offending parameter.
		param: String,
		/// The rejected value.
		value: String,
	},
	/// A location string could not be resolved into a URL.
	#[error("Invalid location '{location}': {reason}")]
	InvalidLocation {
		/// The location as given.
		location: String,
		/// Resolution failure.
		reason: String,
	},
	/// The host refused a history update.
	#[error("Navigation failed: {0}")]
	NavigationFailed(String),
	/// The router configuration could not be read.
	#[error("Invalid router configuration: {0}")]
	Config(String),
}

impl From<toml::de::Error> for RouterError {
	fn from(err: toml::de::Error) -> Self {
		Self::Config(err.to_string())
	}
}

/// Result alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
