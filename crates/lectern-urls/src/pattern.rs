//! Path patterns with `{name}` placeholders.

use std::collections::HashMap;

/// Longest pattern accepted, in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// A compiled `{name}`-style path pattern.
///
/// Each placeholder matches one non-empty path segment.
///
/// # Examples
///
/// ```
/// use lectern_urls::PathPattern;
///
/// let pattern = PathPattern::new("/articles/{article_id}/comments/{id}").unwrap();
/// let params = pattern.matches("/articles/4/comments/17").unwrap();
///
/// assert_eq!(params["article_id"], "4");
/// assert_eq!(params["id"], "17");
/// assert!(pattern.matches("/articles/4/comments").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PathPattern {
	pattern: String,
	regex: regex::Regex,
	param_names: Vec<String>,
}

impl PathPattern {
	pub fn new(pattern: &str) -> Result<Self, String> {
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(format!(
				"Pattern length {} exceeds maximum allowed length of {} bytes",
				pattern.len(),
				MAX_PATTERN_LENGTH
			));
		}
		if !pattern.starts_with('/') {
			return Err(format!("Pattern '{}' must start with '/'", pattern));
		}

		let (regex_str, param_names) = Self::compile_pattern(pattern)?;
		let regex = regex::Regex::new(&regex_str)
			.map_err(|e| format!("Failed to compile pattern regex: {}", e))?;

		Ok(Self {
			pattern: pattern.to_string(),
			regex,
			param_names,
		})
	}

	fn compile_pattern(pattern: &str) -> Result<(String, Vec<String>), String> {
		let mut regex_str = String::from("^");
		let mut param_names = Vec::new();
		let mut chars = pattern.chars();

		while let Some(c) = chars.next() {
			if c == '{' {
				let name: String = chars.by_ref().take_while(|&c| c != '}').collect();
				if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
					return Err(format!("Invalid parameter name '{}' in '{}'", name, pattern));
				}
				if param_names.contains(&name) {
					return Err(format!("Duplicate parameter '{}' in '{}'", name, pattern));
				}
				regex_str.push_str(&format!("(?P<{}>[^/]+)", name));
				param_names.push(name);
			} else {
				regex_str.push_str(&regex::escape(&c.to_string()));
			}
		}

		regex_str.push('$');
		Ok((regex_str, param_names))
	}

	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Captured parameters when `path` matches.
	pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
		let caps = self.regex.captures(path)?;
		Some(
			self.param_names
				.iter()
				.filter_map(|name| caps.name(name).map(|m| (name.clone(), m.as_str().to_string())))
				.collect(),
		)
	}

	pub fn is_match(&self, path: &str) -> bool {
		self.regex.is_match(path)
	}

	/// Builds a concrete path, or `None` when a parameter is missing or
	/// would break out of its segment.
	pub fn reverse(&self, params: &[(&str, &str)]) -> Option<String> {
		let mut result = self.pattern.clone();
		for name in &self.param_names {
			let (_, value) = params.iter().find(|(key, _)| key == name)?;
			if value.is_empty() || value.contains(['/', '?', '#']) {
				return None;
			}
			result = result.replace(&format!("{{{}}}", name), value);
		}
		Some(result)
	}
}

impl PartialEq for PathPattern {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/", "/", true)]
	#[case("/articles", "/articles", true)]
	#[case("/articles", "/articles/", false)]
	#[case("/articles/{id}", "/articles/12", true)]
	#[case("/articles/{id}", "/articles/", false)]
	#[case("/articles/{id}", "/articles/12/edit", false)]
	#[case("/articles/{id}/edit", "/articles/12/edit", true)]
	fn test_matching(#[case] pattern: &str, #[case] path: &str, #[case] expected: bool) {
		let pattern = PathPattern::new(pattern).unwrap();
		assert_eq!(pattern.is_match(path), expected);
	}

	#[rstest]
	fn test_literal_dots_are_escaped() {
		let pattern = PathPattern::new("/feed.xml").unwrap();

		assert!(pattern.is_match("/feed.xml"));
		assert!(!pattern.is_match("/feedaxml"));
	}

	#[rstest]
	#[case("articles")]
	#[case("/articles/{}")]
	#[case("/articles/{id-x}")]
	#[case("/a/{id}/b/{id}")]
	fn test_invalid_patterns(#[case] pattern: &str) {
		assert!(PathPattern::new(pattern).is_err());
	}

	#[rstest]
	fn test_reverse() {
		let pattern = PathPattern::new("/articles/{article_id}/comments/{id}").unwrap();

		assert_eq!(
			pattern.reverse(&[("article_id", "3"), ("id", "9")]),
			Some("/articles/3/comments/9".to_string())
		);
		assert_eq!(pattern.reverse(&[("article_id", "3")]), None);
		assert_eq!(pattern.reverse(&[("article_id", "../x"), ("id", "1")]), None);
	}
}
