//! Router configuration.
//!
//! Options are plain serde structs so they can live next to the rest of an
//! application's settings. A whole route table can also be declared in TOML;
//! routes are an array of tables so their declaration order survives
//! deserialization.
//!
//! ```toml
//! [options]
//! links = true
//! search = false
//!
//! [[routes]]
//! name = "servers"
//! pattern = "/servers"
//!
//! [[routes]]
//! name = "serversEdit"
//! pattern = "/servers/:name"
//! ```

use super::error::Result;
use super::route::RouteTable;
use serde::{Deserialize, Serialize};

/// Behavioural switches for a [`Router`](crate::Router).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterOptions {
	/// Intercept same-origin link clicks and route them in-page.
	pub links: bool,
	/// Include the query string in matching and in [`Page::path`](crate::Page::path).
	pub search: bool,
}

impl Default for RouterOptions {
	fn default() -> Self {
		Self {
			links: true,
			search: false,
		}
	}
}

/// One `[[routes]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
	/// Unique route name.
	pub name: String,
	/// Pattern using `/fixed/:param` and `/fixed/:param?` segments.
	pub pattern: String,
}

/// A complete router definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
	/// Router options.
	pub options: RouterOptions,
	/// Routes in resolution order.
	pub routes: Vec<RouteEntry>,
}

impl RouterConfig {
	/// Reads a configuration from TOML text.
	///
	/// # Errors
	///
	/// [`RouterError::Config`](crate::RouterError::Config) if the text is not
	/// valid TOML or does not have the expected shape.
	pub fn from_toml_str(source: &str) -> Result<Self> {
		Ok(toml::from_str(source)?)
	}

	/// Builds the (uncompiled) route table.
	pub fn to_table(&self) -> RouteTable {
		self.routes
			.iter()
			.fold(RouteTable::new(), |table, entry| {
				table.route(entry.name.clone(), entry.pattern.as_str())
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::RouterError;
	use rstest::rstest;

	#[rstest]
	fn test_default_options() {
		let options = RouterOptions::default();
		assert!(options.links);
		assert!(!options.search);
	}

	#[rstest]
	fn test_from_toml_preserves_order() {
		let config = RouterConfig::from_toml_str(
			r#"
			[options]
			search = true

			[[routes]]
			name = "servers"
			pattern = "/servers"

			[[routes]]
			name = "serversAdd"
			pattern = "/servers/add"

			[[routes]]
			name = "serversEdit"
			pattern = "/servers/:name"
			"#,
		)
		.unwrap();

		assert!(config.options.links);
		assert!(config.options.search);

		let routes = config.to_table().compile().unwrap();
		let names: Vec<&str> = routes.iter().map(|r| r.name()).collect();
		assert_eq!(names, vec!["servers", "serversAdd", "serversEdit"]);
	}

	#[rstest]
	fn test_empty_toml_is_default() {
		let config = RouterConfig::from_toml_str("").unwrap();
		assert_eq!(config, RouterConfig::default());
	}

	#[rstest]
	fn test_malformed_toml() {
		let result = RouterConfig::from_toml_str("[[routes]]\nname = 1");
		assert!(matches!(result, Err(RouterError::Config(_))));
	}
}
