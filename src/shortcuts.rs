//! Helpers shared by the views: rendering, redirects and the sign-in gate.

use hyper::StatusCode;
use lectern_auth::{CurrentUser, SessionHandle};
use lectern_core::{Message, Result};
use lectern_db::Article;
use lectern_http::{Request, Response};
use serde::Serialize;
use tera::Context;

use crate::state::AppState;
use crate::templates;

/// Alert shown when an anonymous visitor reaches a gated action.
pub const SIGN_IN_REQUIRED: &str = "You need to sign in or sign up before continuing.";

pub const SIGN_IN_PATH: &str = "/users/sign_in";

/// The request's session, or a fresh one when no session middleware ran.
pub fn session(request: &Request) -> SessionHandle {
	request
		.extensions
		.get::<SessionHandle>()
		.unwrap_or_else(SessionHandle::empty)
}

pub fn current_user(request: &Request) -> CurrentUser {
	request.extensions.get::<CurrentUser>().unwrap_or_default()
}

/// The signed-in user id, or the redirect to the sign-in page.
///
/// ```rust,ignore
/// let user_id = match require_login(&request) {
/// 	Ok(id) => id,
/// 	Err(redirect) => return Ok(redirect),
/// };
/// ```
pub fn require_login(request: &Request) -> std::result::Result<i64, Response> {
	current_user(request).require().map_err(|_| {
		tracing::debug!(path = request.path(), "sign-in required");
		redirect_with(request, SIGN_IN_PATH, Message::alert(SIGN_IN_REQUIRED))
	})
}

/// 303 to `location`, queueing `message` for the next page.
pub fn redirect_with(request: &Request, location: &str, message: Message) -> Response {
	session(request).flash(message);
	Response::see_other(location)
}

#[derive(Serialize)]
struct FlashView {
	tag: &'static str,
	text: String,
}

#[derive(Serialize)]
struct UserView {
	signed_in: bool,
	name: Option<String>,
}

/// Renders `template` inside the layout with status 200.
pub async fn render(state: &AppState, request: &Request, template: &str, context: Context) -> Result<Response> {
	render_with_status(state, request, template, context, StatusCode::OK).await
}

/// Renders `template` with the layout context: the current user, pending
/// flash messages and the public article count.
pub async fn render_with_status(
	state: &AppState,
	request: &Request,
	template: &str,
	mut context: Context,
	status: StatusCode,
) -> Result<Response> {
	let user = current_user(request);
	context.insert(
		"current_user",
		&UserView {
			signed_in: user.is_authenticated(),
			name: user.name().map(str::to_string),
		},
	);

	let flash: Vec<FlashView> = session(request)
		.take_flash()
		.into_iter()
		.map(|message| FlashView {
			tag: message.tag(),
			text: message.text,
		})
		.collect();
	context.insert("flash", &flash);
	context.insert("public_article_count", &Article::public_count(&state.pool).await?);

	let html = templates::render(template, &context)?;
	Ok(Response::new(status).with_html(html))
}
