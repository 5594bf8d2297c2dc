use chrono::{DateTime, Utc};
use lectern_auth::PasswordHasher;
use lectern_core::ValidationErrors;
use lectern_core::validators::{EmailValidator, LengthValidator, PresenceValidator, TAKEN};
use lectern_http::FormData;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::error::{DatabaseError, Result, is_unique_violation};

pub const PASSWORD_MIN_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
	pub id: i64,
	pub name: String,
	pub email: String,
	#[serde(skip_serializing)]
	pub password_digest: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignUpForm {
	pub name: String,
	pub email: String,
	#[serde(skip_serializing)]
	pub password: String,
}

impl SignUpForm {
	pub fn new(name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			email: email.into(),
			password: password.into(),
		}
	}

	/// Reads the `user[...]` fields.
	pub fn from_form(form: &FormData) -> Self {
		let scope = form.scope("user");
		Self {
			name: scope.string("name"),
			email: scope.string("email"),
			password: scope.string("password"),
		}
	}
}

fn normalize_email(email: &str) -> String {
	email.trim().to_lowercase()
}

impl User {
	pub async fn find(pool: &SqlitePool, id: i64) -> Result<User> {
		sqlx::query_as("SELECT * FROM users WHERE id = ?")
			.bind(id)
			.fetch_optional(pool)
			.await?
			.ok_or_else(|| DatabaseError::not_found("User", id))
	}

	pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
		let user = sqlx::query_as("SELECT * FROM users WHERE email = ?")
			.bind(normalize_email(email))
			.fetch_optional(pool)
			.await?;
		Ok(user)
	}

	/// Validates the sign-up form and stores the user with a hashed
	/// password. Emails are compared case-insensitively.
	pub async fn register(
		pool: &SqlitePool,
		form: &SignUpForm,
		hasher: &dyn PasswordHasher,
	) -> Result<User> {
		let email = normalize_email(&form.email);

		let mut errors = ValidationErrors::new();
		errors.check("name", &PresenceValidator, form.name.as_str());
		if errors.check("email", &PresenceValidator, email.as_str())
			&& errors.check("email", &EmailValidator, email.as_str())
			&& Self::find_by_email(pool, &email).await?.is_some()
		{
			errors.add("email", TAKEN);
		}
		errors.check(
			"password",
			&LengthValidator::min(PASSWORD_MIN_LENGTH),
			form.password.as_str(),
		);
		errors.into_result()?;

		let digest = hasher
			.hash(&form.password)
			.map_err(|e| DatabaseError::Password(e.to_string()))?;
		let now = Utc::now();

		let user: User = sqlx::query_as(
			"INSERT INTO users (name, email, password_digest, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?) RETURNING *",
		)
		.bind(form.name.trim())
		.bind(&email)
		.bind(&digest)
		.bind(now)
		.bind(now)
		.fetch_one(pool)
		.await
		.map_err(|e| {
			if is_unique_violation(&e) {
				DatabaseError::invalid("email", TAKEN)
			} else {
				e.into()
			}
		})?;

		tracing::info!(user_id = user.id, "user registered");
		Ok(user)
	}

	/// The user with `email` when `password` matches, otherwise `None`.
	pub async fn authenticate(
		pool: &SqlitePool,
		email: &str,
		password: &str,
		hasher: &dyn PasswordHasher,
	) -> Result<Option<User>> {
		let Some(user) = Self::find_by_email(pool, email).await? else {
			return Ok(None);
		};

		let matches = hasher
			.verify(password, &user.password_digest)
			.map_err(|e| DatabaseError::Password(e.to_string()))?;
		Ok(matches.then_some(user))
	}
}
