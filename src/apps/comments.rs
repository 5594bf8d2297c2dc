use lectern_core::{Message, Result};
use lectern_db::{Comment, CommentForm, DatabaseError};
use lectern_http::{Request, Response};
use std::sync::Arc;

use crate::shortcuts::{current_user, redirect_with, require_login};
use crate::state::AppState;

/// Open to visitors, except on archived articles which only signed-in
/// users can see. Invalid input goes back to the article with the
/// validation messages as an alert.
pub async fn create(state: Arc<AppState>, request: Request) -> Result<Response> {
	let article_id = request.path_param_as::<i64>("article_id")?;
	let form = CommentForm::from_form(&request.form().await?);
	let location = format!("/articles/{}", article_id);
	let signed_in = current_user(&request).is_authenticated();

	match Comment::create(&state.pool, article_id, &form, signed_in).await {
		Ok(_) => Ok(Response::see_other(&location)),
		Err(DatabaseError::Validation(errors)) => Ok(redirect_with(
			&request,
			&location,
			Message::alert(errors.full_messages().join(", ")),
		)),
		Err(e) => Err(e.into()),
	}
}

pub async fn destroy(state: Arc<AppState>, request: Request) -> Result<Response> {
	if let Err(redirect) = require_login(&request) {
		return Ok(redirect);
	}
	let article_id = request.path_param_as::<i64>("article_id")?;
	let id = request.path_param_as::<i64>("id")?;

	Comment::destroy(&state.pool, article_id, id).await?;
	Ok(Response::see_other(format!("/articles/{}", article_id)))
}
