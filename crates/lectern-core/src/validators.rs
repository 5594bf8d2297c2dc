//! Field validators and the error collection they report into.
//!
//! Validators return a bare message such as `"can't be blank"`; the
//! [`ValidationErrors`] collection keeps those messages per field, in the
//! order they were added, and renders full messages ("Title can't be
//! blank") for forms.
//!
//! ```
//! use lectern_core::validators::{LengthValidator, PresenceValidator, ValidationErrors};
//!
//! let mut errors = ValidationErrors::new();
//! errors.check("title", &PresenceValidator, "");
//! errors.check("body", &LengthValidator::min(10), "Short");
//!
//! assert_eq!(
//! 	errors.full_messages(),
//! 	vec![
//! 		"Title can't be blank".to_string(),
//! 		"Body is too short (minimum is 10 characters)".to_string(),
//! 	]
//! );
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

pub const BLANK: &str = "can't be blank";
pub const TAKEN: &str = "has already been taken";
pub const NOT_INCLUDED: &str = "is not included in the list";
pub const MUST_EXIST: &str = "must exist";
pub const INVALID: &str = "is invalid";

static EMAIL_REGEX: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid email regex pattern"));

/// A single-field validation rule.
pub trait Validator<T: ?Sized> {
	/// Returns the error message when `value` is rejected.
	fn validate(&self, value: &T) -> Result<(), String>;
}

/// Rejects empty and whitespace-only strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceValidator;

impl Validator<str> for PresenceValidator {
	fn validate(&self, value: &str) -> Result<(), String> {
		if value.trim().is_empty() {
			Err(BLANK.to_string())
		} else {
			Ok(())
		}
	}
}

/// Requires a minimum character count.
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthValidator {
	min: usize,
}

impl LengthValidator {
	pub fn min(min: usize) -> Self {
		Self { min }
	}
}

impl Validator<str> for LengthValidator {
	fn validate(&self, value: &str) -> Result<(), String> {
		if value.chars().count() < self.min {
			return Err(format!("is too short (minimum is {} characters)", self.min));
		}
		Ok(())
	}
}

/// Accepts only one of a fixed set of values.
#[derive(Debug, Clone, Copy)]
pub struct InclusionValidator {
	allowed: &'static [&'static str],
}

impl InclusionValidator {
	pub const fn new(allowed: &'static [&'static str]) -> Self {
		Self { allowed }
	}
}

impl Validator<str> for InclusionValidator {
	fn validate(&self, value: &str) -> Result<(), String> {
		if self.allowed.contains(&value) {
			Ok(())
		} else {
			Err(NOT_INCLUDED.to_string())
		}
	}
}

/// Loose `local@domain.tld` shape check.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailValidator;

impl Validator<str> for EmailValidator {
	fn validate(&self, value: &str) -> Result<(), String> {
		if EMAIL_REGEX.is_match(value) {
			Ok(())
		} else {
			Err(INVALID.to_string())
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct FieldErrors {
	field: String,
	messages: Vec<String>,
}

/// Per-field validation messages in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
	fields: Vec<FieldErrors>,
}

impl ValidationErrors {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds `message` under `field`.
	pub fn add(&mut self, field: &str, message: impl Into<String>) {
		let message = message.into();
		match self.fields.iter_mut().find(|f| f.field == field) {
			Some(entry) => entry.messages.push(message),
			None => self.fields.push(FieldErrors {
				field: field.to_string(),
				messages: vec![message],
			}),
		}
	}

	/// Runs `validator` against `value`, recording a failure under `field`.
	///
	/// Returns `true` when the value passed.
	pub fn check<T: ?Sized, V: Validator<T>>(&mut self, field: &str, validator: &V, value: &T) -> bool {
		match validator.validate(value) {
			Ok(()) => true,
			Err(message) => {
				self.add(field, message);
				false
			}
		}
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	/// Number of fields with at least one message.
	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn contains(&self, field: &str) -> bool {
		self.fields.iter().any(|f| f.field == field)
	}

	/// Messages recorded for `field`, empty if none.
	pub fn get(&self, field: &str) -> &[String] {
		self.fields
			.iter()
			.find(|f| f.field == field)
			.map(|f| f.messages.as_slice())
			.unwrap_or(&[])
	}

	/// "Field message" strings, one per recorded message.
	pub fn full_messages(&self) -> Vec<String> {
		self.fields
			.iter()
			.flat_map(|f| {
				let label = humanize(&f.field);
				f.messages
					.iter()
					.map(move |message| format!("{} {}", label, message))
			})
			.collect()
	}

	/// Appends every message of `other`.
	pub fn merge(&mut self, other: ValidationErrors) {
		for entry in other.fields {
			for message in entry.messages {
				self.add(&entry.field, message);
			}
		}
	}

	/// `Ok(())` when empty, otherwise the collection itself.
	pub fn into_result(self) -> Result<(), ValidationErrors> {
		if self.is_empty() { Ok(()) } else { Err(self) }
	}
}

impl fmt::Display for ValidationErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.full_messages().join("; "))
	}
}

impl std::error::Error for ValidationErrors {}

/// `category_id` -> `Category`, `commenter` -> `Commenter`.
pub fn humanize(field: &str) -> String {
	let base = field.strip_suffix("_id").unwrap_or(field);
	let spaced = base.replace('_', " ");
	let mut chars = spaced.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("", false)]
	#[case("   \t", false)]
	#[case("x", true)]
	fn test_presence(#[case] value: &str, #[case] ok: bool) {
		assert_eq!(PresenceValidator.validate(value).is_ok(), ok);
	}

	#[rstest]
	#[case("Short", false)]
	#[case("123456789", false)]
	#[case("1234567890", true)]
	#[case("ééééééééééé", true)]
	fn test_min_length_counts_characters(#[case] value: &str, #[case] ok: bool) {
		assert_eq!(LengthValidator::min(10).validate(value).is_ok(), ok);
	}

	#[rstest]
	fn test_length_message() {
		let validator = LengthValidator::min(6);

		assert_eq!(
			validator.validate("abc").unwrap_err(),
			"is too short (minimum is 6 characters)"
		);
		assert!(validator.validate("abcdefghij").is_ok());
	}

	#[rstest]
	#[case("public", true)]
	#[case("archived", true)]
	#[case("secret", false)]
	fn test_inclusion(#[case] value: &str, #[case] ok: bool) {
		let validator = InclusionValidator::new(&["public", "private", "archived"]);
		assert_eq!(validator.validate(value).is_ok(), ok);
	}

	#[rstest]
	#[case("jane@example.com", true)]
	#[case("jane@example", false)]
	#[case("jane example.com", false)]
	#[case("", false)]
	fn test_email(#[case] value: &str, #[case] ok: bool) {
		assert_eq!(EmailValidator.validate(value).is_ok(), ok);
	}

	#[rstest]
	fn test_errors_keep_field_order() {
		// Arrange
		let mut errors = ValidationErrors::new();

		// Act
		errors.add("title", BLANK);
		errors.add("body", BLANK);
		errors.add("title", "is odd");

		// Assert
		assert_eq!(errors.len(), 2);
		assert_eq!(errors.get("title"), &[BLANK.to_string(), "is odd".to_string()]);
		assert_eq!(
			errors.full_messages(),
			vec![
				"Title can't be blank".to_string(),
				"Title is odd".to_string(),
				"Body can't be blank".to_string(),
			]
		);
	}

	#[rstest]
	#[case("category_id", "Category")]
	#[case("commenter", "Commenter")]
	#[case("byte_size", "Byte size")]
	fn test_humanize(#[case] field: &str, #[case] expected: &str) {
		assert_eq!(humanize(field), expected);
	}

	#[rstest]
	fn test_into_result() {
		assert!(ValidationErrors::new().into_result().is_ok());

		let mut errors = ValidationErrors::new();
		errors.add("name", TAKEN);
		let err = errors.into_result().unwrap_err();
		assert_eq!(err.get("name"), &[TAKEN.to_string()]);
	}
}
