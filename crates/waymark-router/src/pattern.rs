//! Path Pattern Compilation.
//!
//! Turns route patterns such as `/servers/:name` or `/servers/:name?` into
//! anchored, case-insensitive regular expressions with one named capture per
//! parameter.
//!
//! # Pattern Syntax
//!
//! - `/servers` - literal text, matched exactly (ignoring ASCII case)
//! - `/:name` - mandatory parameter, one or more characters other than `/`
//! - `/:name?` - optional parameter; the whole `/value` segment may be absent
//!
//! Parameter names are made of ASCII letters, digits and `_`. A `:` that is
//! not directly preceded by `/` and followed by a name is plain text.
//!
//! A trailing slash is stripped before compilation (`/servers/` is the same
//! pattern as `/servers`), except for the root pattern `/`.

use regex::{Regex, RegexBuilder};

/// Maximum allowed length for a route pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of path segments in a route pattern.
const MAX_PATH_SEGMENTS: usize = 32;

/// Maximum allowed size for a compiled pattern regex (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// One piece of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	/// Literal text, including its leading `/`.
	Literal(String),
	/// `/:name`
	Param(String),
	/// `/:name?`
	OptionalParam(String),
}

/// A compiled route pattern.
///
/// Keeps the normalized source so the path builder can invert it.
#[derive(Debug, Clone)]
pub struct PathPattern {
	source: String,
	segments: Vec<Segment>,
	regex: Regex,
}

impl PathPattern {
	/// Compiles a pattern string.
	///
	/// # Errors
	///
	/// Returns the failure reason if the pattern is too long, has too many
	/// segments, declares a parameter name twice, or yields an invalid regex.
	pub fn new(pattern: &str) -> Result<Self, String> {
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(format!(
				"pattern length {} exceeds maximum allowed length of {} bytes",
				pattern.len(),
				MAX_PATTERN_LENGTH
			));
		}

		let segment_count = pattern.split('/').count();
		if segment_count > MAX_PATH_SEGMENTS {
			return Err(format!(
				"pattern has {} path segments, exceeding maximum of {}",
				segment_count, MAX_PATH_SEGMENTS
			));
		}

		let source = normalize_pattern(pattern).to_string();
		let segments = tokenize(&source);

		let mut seen: Vec<&str> = Vec::new();
		for name in segments.iter().filter_map(segment_param) {
			if seen.contains(&name) {
				return Err(format!("parameter ':{}' is declared more than once", name));
			}
			seen.push(name);
		}

		let regex = RegexBuilder::new(&to_regex(&segments))
			.case_insensitive(true)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|e| format!("failed to compile pattern regex: {}", e))?;

		Ok(Self {
			source,
			segments,
			regex,
		})
	}

	/// Returns the normalized pattern string.
	pub fn as_str(&self) -> &str {
		&self.source
	}

	/// Returns the parsed segments in order.
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// Returns the compiled matcher.
	pub fn regex(&self) -> &Regex {
		&self.regex
	}

	/// Names of the parameters that must be present.
	pub fn required_params(&self) -> impl Iterator<Item = &str> {
		self.segments.iter().filter_map(|s| match s {
			Segment::Param(name) => Some(name.as_str()),
			_ => None,
		})
	}

	/// Names of the parameters that may be omitted.
	pub fn optional_params(&self) -> impl Iterator<Item = &str> {
		self.segments.iter().filter_map(|s| match s {
			Segment::OptionalParam(name) => Some(name.as_str()),
			_ => None,
		})
	}

	/// Whether `name` is declared by this pattern.
	pub fn declares(&self, name: &str) -> bool {
		self.segments
			.iter()
			.filter_map(segment_param)
			.any(|param| param == name)
	}

	/// Checks if this pattern would match the given (normalized) path.
	pub fn is_match(&self, path: &str) -> bool {
		self.regex.is_match(path)
	}
}

impl PartialEq for PathPattern {
	fn eq(&self, other: &Self) -> bool {
		self.source == other.source
	}
}

impl Eq for PathPattern {}

impl std::fmt::Display for PathPattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.source)
	}
}

/// Strips one trailing slash unless the pattern is the root.
pub(crate) fn normalize_pattern(pattern: &str) -> &str {
	match pattern.strip_suffix('/') {
		Some(stripped) if !stripped.is_empty() => stripped,
		Some(_) => "/",
		None if pattern.is_empty() => "/",
		None => pattern,
	}
}

fn segment_param(segment: &Segment) -> Option<&str> {
	match segment {
		Segment::Param(name) | Segment::OptionalParam(name) => Some(name),
		Segment::Literal(_) => None,
	}
}

fn is_name_char(b: u8) -> bool {
	b.is_ascii_alphanumeric() || b == b'_'
}

fn tokenize(pattern: &str) -> Vec<Segment> {
	let bytes = pattern.as_bytes();
	let mut segments = Vec::new();
	let mut literal = String::new();
	let mut i = 0;

	while i < bytes.len() {
		if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b':') {
			let start = i + 2;
			let end = start
				+ bytes[start..]
					.iter()
					.take_while(|b| is_name_char(**b))
					.count();

			if end > start {
				if !literal.is_empty() {
					segments.push(Segment::Literal(std::mem::take(&mut literal)));
				}
				let name = pattern[start..end].to_string();
				if bytes.get(end) == Some(&b'?') {
					segments.push(Segment::OptionalParam(name));
					i = end + 1;
				} else {
					segments.push(Segment::Param(name));
					i = end;
				}
				continue;
			}
		}

		// `i` always sits on a char boundary: parameters only span ASCII.
		let ch = pattern[i..].chars().next().unwrap_or_default();
		literal.push(ch);
		i += ch.len_utf8();
	}

	if !literal.is_empty() {
		segments.push(Segment::Literal(literal));
	}
	segments
}

fn to_regex(segments: &[Segment]) -> String {
	let mut regex_str = String::from("^");
	for segment in segments {
		match segment {
			Segment::Literal(text) => regex_str.push_str(&regex::escape(text)),
			Segment::Param(name) => {
				regex_str.push_str(&format!("/(?P<{}>[^/]+)", name));
			}
			Segment::OptionalParam(name) => {
				regex_str.push_str(&format!("(?:/(?P<{}>[^/]+))?", name));
			}
		}
	}
	regex_str.push('$');
	regex_str
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/", "/")]
	#[case("", "/")]
	#[case("/servers/", "/servers")]
	#[case("/servers", "/servers")]
	#[case("/servers/:name/", "/servers/:name")]
	fn test_normalize_pattern(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(normalize_pattern(input), expected);
	}

	#[rstest]
	fn test_tokenize_mixed() {
		assert_eq!(
			tokenize("/servers/:name/edit/:tab?"),
			vec![
				Segment::Literal("/servers".to_string()),
				Segment::Param("name".to_string()),
				Segment::Literal("/edit".to_string()),
				Segment::OptionalParam("tab".to_string()),
			]
		);
	}

	#[rstest]
	fn test_tokenize_colon_without_name_is_literal() {
		assert_eq!(
			tokenize("/a/:/b:c"),
			vec![Segment::Literal("/a/:/b:c".to_string())]
		);
	}

	#[rstest]
	fn test_exact_pattern() {
		let pattern = PathPattern::new("/servers").unwrap();
		assert!(pattern.is_match("/servers"));
		assert!(pattern.is_match("/SERVERS"));
		assert!(!pattern.is_match("/servers/42"));
		assert!(!pattern.is_match("/serversx"));
	}

	#[rstest]
	fn test_root_pattern() {
		let pattern = PathPattern::new("/").unwrap();
		assert_eq!(pattern.as_str(), "/");
		assert!(pattern.is_match("/"));
		assert!(!pattern.is_match("/servers"));
	}

	#[rstest]
	fn test_single_param() {
		let pattern = PathPattern::new("/servers/:name").unwrap();
		assert!(pattern.is_match("/servers/alpha"));
		assert!(!pattern.is_match("/servers"));
		assert!(!pattern.is_match("/servers/alpha/beta"));

		let caps = pattern.regex().captures("/servers/alpha").unwrap();
		assert_eq!(&caps["name"], "alpha");
	}

	#[rstest]
	fn test_optional_param() {
		let pattern = PathPattern::new("/servers/:name?").unwrap();
		assert!(pattern.is_match("/servers"));
		assert!(pattern.is_match("/servers/alpha"));
		assert!(!pattern.is_match("/servers/"));

		let caps = pattern.regex().captures("/servers").unwrap();
		assert!(caps.name("name").is_none());
	}

	#[rstest]
	fn test_param_lists() {
		let pattern = PathPattern::new("/a/:x/b/:y?/c/:z").unwrap();
		assert_eq!(pattern.required_params().collect::<Vec<_>>(), vec!["x", "z"]);
		assert_eq!(pattern.optional_params().collect::<Vec<_>>(), vec!["y"]);
		assert!(pattern.declares("y"));
		assert!(!pattern.declares("w"));
	}

	#[rstest]
	#[case("/api/v1.0", "/api/v1.0", true)]
	#[case("/api/v1.0", "/api/v1X0", false)]
	#[case("/price/$(x)+", "/price/$(x)+", true)]
	#[case("/a|b", "/a", false)]
	fn test_special_chars_escaped(#[case] pattern: &str, #[case] path: &str, #[case] expected: bool) {
		let pattern = PathPattern::new(pattern).unwrap();
		assert_eq!(pattern.is_match(path), expected);
	}

	#[rstest]
	fn test_param_followed_by_literal() {
		let pattern = PathPattern::new("/files/:id.json").unwrap();
		let caps = pattern.regex().captures("/files/42.json").unwrap();
		assert_eq!(&caps["id"], "42");
	}

	#[rstest]
	fn test_duplicate_param_rejected() {
		let result = PathPattern::new("/:id/:id");
		assert!(result.unwrap_err().contains("more than once"));
	}

	#[rstest]
	fn test_pattern_rejects_excessive_length() {
		// Arrange
		let long_pattern = "/".to_string() + &"a".repeat(1025);

		// Act
		let result = PathPattern::new(&long_pattern);

		// Assert
		assert!(result.unwrap_err().contains("exceeds maximum allowed length"));
	}

	#[rstest]
	fn test_pattern_rejects_excessive_segments() {
		// Arrange
		let segments: Vec<&str> = (0..35).map(|_| "seg").collect();
		let pattern = format!("/{}", segments.join("/"));

		// Act
		let result = PathPattern::new(&pattern);

		// Assert
		assert!(result.unwrap_err().contains("exceeding maximum"));
	}

	#[rstest]
	fn test_pattern_display_and_equality() {
		let p1 = PathPattern::new("/servers/:name/").unwrap();
		let p2 = PathPattern::new("/servers/:name").unwrap();
		let p3 = PathPattern::new("/servers/:id").unwrap();

		assert_eq!(p1.to_string(), "/servers/:name");
		assert_eq!(p1, p2);
		assert_ne!(p1, p3);
	}
}
