use lectern_core::validators::{InclusionValidator, NOT_INCLUDED};
use serde::Serialize;
use std::str::FromStr;

/// Visibility of articles and comments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Status {
	#[default]
	Public,
	Private,
	Archived,
}

impl Status {
	pub const VALUES: &'static [&'static str] = &["public", "private", "archived"];

	pub const VALIDATOR: InclusionValidator = InclusionValidator::new(Self::VALUES);

	pub fn as_str(&self) -> &'static str {
		match self {
			Status::Public => "public",
			Status::Private => "private",
			Status::Archived => "archived",
		}
	}

	pub fn is_archived(&self) -> bool {
		matches!(self, Status::Archived)
	}
}

impl FromStr for Status {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"public" => Ok(Status::Public),
			"private" => Ok(Status::Private),
			"archived" => Ok(Status::Archived),
			_ => Err(NOT_INCLUDED.to_string()),
		}
	}
}

impl std::fmt::Display for Status {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use lectern_core::Validator;
	use rstest::rstest;

	#[rstest]
	#[case("public", Ok(Status::Public))]
	#[case("archived", Ok(Status::Archived))]
	#[case("Public", Err(NOT_INCLUDED.to_string()))]
	#[case("deleted", Err(NOT_INCLUDED.to_string()))]
	fn test_parse(#[case] raw: &str, #[case] expected: Result<Status, String>) {
		assert_eq!(raw.parse::<Status>(), expected);
		assert_eq!(Status::VALIDATOR.validate(raw).is_ok(), expected.is_ok());
	}
}
