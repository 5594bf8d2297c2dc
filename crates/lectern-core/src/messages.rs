//! Flash messages.
//!
//! A message is queued while handling one request (usually right before a
//! redirect) and shown once by the next rendered page. Storage lives in the
//! session; this module only defines the value types.

use serde::{Deserialize, Serialize};

/// Session key under which pending messages are stored.
pub const FLASH_SESSION_KEY: &str = "_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
	Info,
	Success,
	Warning,
	Error,
}

impl MessageLevel {
	/// CSS class used by the layout template.
	pub fn tag(&self) -> &'static str {
		match self {
			MessageLevel::Info => "info",
			MessageLevel::Success => "notice",
			MessageLevel::Warning => "warning",
			MessageLevel::Error => "alert",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
	pub level: MessageLevel,
	pub text: String,
}

impl Message {
	pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
		Self {
			level,
			text: text.into(),
		}
	}

	pub fn info(text: impl Into<String>) -> Self {
		Self::new(MessageLevel::Info, text)
	}

	/// A confirmation such as "Category was successfully created."
	pub fn notice(text: impl Into<String>) -> Self {
		Self::new(MessageLevel::Success, text)
	}

	pub fn warning(text: impl Into<String>) -> Self {
		Self::new(MessageLevel::Warning, text)
	}

	/// A refusal such as "You need to sign in or sign up before continuing."
	pub fn alert(text: impl Into<String>) -> Self {
		Self::new(MessageLevel::Error, text)
	}

	pub fn tag(&self) -> &'static str {
		self.level.tag()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_levels_serialize_lowercase() {
		let message = Message::notice("Saved.");

		let json = serde_json::to_value(&message).unwrap();

		assert_eq!(json["level"], "success");
		assert_eq!(json["text"], "Saved.");
	}

	#[rstest]
	#[case(Message::notice("a"), "notice")]
	#[case(Message::alert("a"), "alert")]
	#[case(Message::info("a"), "info")]
	#[case(Message::warning("a"), "warning")]
	fn test_tags(#[case] message: Message, #[case] tag: &str) {
		assert_eq!(message.tag(), tag);
	}
}
