//! Sign-up, sign-in and sign-out.

use hyper::StatusCode;
use lectern_core::{Message, Result, ValidationErrors};
use lectern_db::{DatabaseError, SignUpForm, User};
use lectern_http::{Request, Response};
use std::sync::Arc;
use tera::Context;

use crate::shortcuts::{redirect_with, render_with_status, session};
use crate::state::AppState;

pub const INVALID_LOGIN: &str = "Invalid Email or password.";

pub async fn sign_in_form(state: Arc<AppState>, request: Request) -> Result<Response> {
	render_sign_in(&state, &request, "", None).await
}

/// Rotates the session id before storing the user.
pub async fn sign_in(state: Arc<AppState>, request: Request) -> Result<Response> {
	let form = request.form().await?;
	let scope = form.scope("user");
	let email = scope.string("email");
	let password = scope.string("password");

	match User::authenticate(&state.pool, &email, &password, state.hasher.as_ref()).await? {
		Some(user) => {
			session(&request).login(user.id, &user.name);
			tracing::info!(user_id = user.id, "signed in");
			Ok(redirect_with(&request, "/", Message::notice("Signed in successfully.")))
		}
		None => {
			tracing::info!("sign-in rejected");
			render_sign_in(&state, &request, &email, Some(INVALID_LOGIN)).await
		}
	}
}

pub async fn sign_out(_state: Arc<AppState>, request: Request) -> Result<Response> {
	session(&request).logout();
	Ok(redirect_with(&request, "/", Message::notice("Signed out successfully.")))
}

pub async fn sign_up_form(state: Arc<AppState>, request: Request) -> Result<Response> {
	render_sign_up(&state, &request, &SignUpForm::default(), ValidationErrors::new()).await
}

pub async fn sign_up(state: Arc<AppState>, request: Request) -> Result<Response> {
	let form = SignUpForm::from_form(&request.form().await?);

	match User::register(&state.pool, &form, state.hasher.as_ref()).await {
		Ok(user) => {
			session(&request).login(user.id, &user.name);
			Ok(redirect_with(
				&request,
				"/",
				Message::notice("Welcome! You have signed up successfully."),
			))
		}
		Err(DatabaseError::Validation(errors)) => render_sign_up(&state, &request, &form, errors).await,
		Err(e) => Err(e.into()),
	}
}

async fn render_sign_in(
	state: &AppState,
	request: &Request,
	email: &str,
	alert: Option<&str>,
) -> Result<Response> {
	let status = match alert {
		Some(_) => StatusCode::UNPROCESSABLE_ENTITY,
		None => StatusCode::OK,
	};

	let mut context = Context::new();
	context.insert("email", email);
	context.insert("alert", &alert);
	render_with_status(state, request, "users/sign_in.html", context, status).await
}

async fn render_sign_up(
	state: &AppState,
	request: &Request,
	form: &SignUpForm,
	errors: ValidationErrors,
) -> Result<Response> {
	let status = if errors.is_empty() {
		StatusCode::OK
	} else {
		StatusCode::UNPROCESSABLE_ENTITY
	};

	let mut context = Context::new();
	context.insert("form", form);
	context.insert("errors", &errors.full_messages());
	render_with_status(state, request, "users/sign_up.html", context, status).await
}
