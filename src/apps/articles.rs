//! Article views: listing, reading, searching, writing and deleting.

use hyper::StatusCode;
use lectern_core::{Message, Result, ValidationErrors};
use lectern_db::{Article, ArticleForm, Category, Comment, CommentForm, DatabaseError, Image, Status};
use lectern_http::{Request, Response};
use std::sync::Arc;
use tera::Context;

use crate::shortcuts::{current_user, redirect_with, render, render_with_status, require_login};
use crate::state::AppState;

pub async fn index(state: Arc<AppState>, request: Request) -> Result<Response> {
	let signed_in = current_user(&request).is_authenticated();
	let number = state.paginator.page_number(request.query("page"));
	let page = Article::page(&state.pool, &state.paginator, number, signed_in).await?;

	let mut context = Context::new();
	context.insert("articles", &page.items);
	context.insert("page_number", &page.number);
	context.insert("total_pages", &page.total_pages());
	context.insert("next_page", &page.next_page_number());
	context.insert("previous_page", &page.previous_page_number());
	render(&state, &request, "articles/index.html", context).await
}

pub async fn show(state: Arc<AppState>, request: Request) -> Result<Response> {
	let id = request.path_param_as::<i64>("id")?;
	let signed_in = current_user(&request).is_authenticated();
	let article = Article::find_visible(&state.pool, id, signed_in).await?;

	let mut context = Context::new();
	context.insert("category", &Category::find(&state.pool, article.category_id).await?);
	context.insert("comments", &Comment::for_article(&state.pool, id).await?);
	context.insert("image", &Image::for_article(&state.pool, id).await?);
	context.insert("comment", &CommentForm::default());
	context.insert("statuses", Status::VALUES);
	context.insert("article", &article);
	render(&state, &request, "articles/show.html", context).await
}

pub async fn new(state: Arc<AppState>, request: Request) -> Result<Response> {
	if let Err(redirect) = require_login(&request) {
		return Ok(redirect);
	}
	let form = ArticleForm::default();
	render_form(&state, &request, "articles/new.html", &form, None, ValidationErrors::new()).await
}

pub async fn create(state: Arc<AppState>, request: Request) -> Result<Response> {
	if let Err(redirect) = require_login(&request) {
		return Ok(redirect);
	}
	let form = ArticleForm::from_form(&request.form().await?);

	match Article::create(&state.pool, state.storage.as_ref(), &form).await {
		Ok(article) => Ok(redirect_with(
			&request,
			&format!("/articles/{}", article.id),
			Message::notice("Article was successfully created."),
		)),
		Err(DatabaseError::Validation(errors)) => {
			render_form(&state, &request, "articles/new.html", &form, None, errors).await
		}
		Err(e) => Err(e.into()),
	}
}

pub async fn edit(state: Arc<AppState>, request: Request) -> Result<Response> {
	if let Err(redirect) = require_login(&request) {
		return Ok(redirect);
	}
	let id = request.path_param_as::<i64>("id")?;
	let article = Article::find(&state.pool, id).await?;

	let form = ArticleForm::default().merged_with(&article);
	render_form(&state, &request, "articles/edit.html", &form, Some(&article), ValidationErrors::new()).await
}

pub async fn update(state: Arc<AppState>, request: Request) -> Result<Response> {
	if let Err(redirect) = require_login(&request) {
		return Ok(redirect);
	}
	let id = request.path_param_as::<i64>("id")?;
	let form = ArticleForm::from_form(&request.form().await?);

	match Article::update(&state.pool, state.storage.as_ref(), id, &form).await {
		Ok(article) => Ok(redirect_with(
			&request,
			&format!("/articles/{}", article.id),
			Message::notice("Article was successfully updated."),
		)),
		Err(DatabaseError::Validation(errors)) => {
			let article = Article::find(&state.pool, id).await?;
			let form = form.merged_with(&article);
			render_form(&state, &request, "articles/edit.html", &form, Some(&article), errors).await
		}
		Err(e) => Err(e.into()),
	}
}

/// Needs both a signed-in session and the static basic-auth credential.
pub async fn destroy(state: Arc<AppState>, request: Request) -> Result<Response> {
	if let Err(redirect) = require_login(&request) {
		return Ok(redirect);
	}
	state.basic_auth.verify(&request)?;

	let id = request.path_param_as::<i64>("id")?;
	Article::destroy(&state.pool, state.storage.as_ref(), id).await?;

	Ok(redirect_with(
		&request,
		"/",
		Message::notice("Article was successfully destroyed."),
	))
}

/// Serves the attached image with its content type.
pub async fn image(state: Arc<AppState>, request: Request) -> Result<Response> {
	let id = request.path_param_as::<i64>("id")?;
	let signed_in = current_user(&request).is_authenticated();
	let article = Article::find_visible(&state.pool, id, signed_in).await?;

	let image = Image::for_article(&state.pool, article.id)
		.await?
		.ok_or_else(|| lectern_core::Error::NotFound(format!("image for article {}", id)))?;
	let bytes = image.read(state.storage.as_ref()).await?;

	let content_type = if image.content_type.is_empty() || image.content_type == "application/octet-stream" {
		mime_guess::from_path(&image.filename)
			.first_or_octet_stream()
			.to_string()
	} else {
		image.content_type.clone()
	};

	Ok(Response::ok()
		.with_header("content-type", &content_type)
		.with_header("cache-control", "private, max-age=300")
		.with_body(bytes))
}

/// A blank query goes back to the front page without searching.
pub async fn search(state: Arc<AppState>, request: Request) -> Result<Response> {
	let query = request.query("search").unwrap_or_default().to_string();
	if query.trim().is_empty() {
		return Ok(Response::see_other("/"));
	}

	let signed_in = current_user(&request).is_authenticated();
	let articles = Article::search(&state.pool, &query, signed_in).await?;

	let mut context = Context::new();
	context.insert("query", &query);
	context.insert("articles", &articles);
	render(&state, &request, "articles/search.html", context).await
}

async fn render_form(
	state: &AppState,
	request: &Request,
	template: &str,
	form: &ArticleForm,
	article: Option<&Article>,
	errors: ValidationErrors,
) -> Result<Response> {
	let status = if errors.is_empty() {
		StatusCode::OK
	} else {
		StatusCode::UNPROCESSABLE_ENTITY
	};
	let selected_category_id = form
		.category_id
		.as_deref()
		.and_then(|raw| raw.trim().parse::<i64>().ok());

	let mut context = Context::new();
	context.insert("form", form);
	context.insert("selected_category_id", &selected_category_id);
	context.insert("article", &article);
	context.insert("errors", &errors.full_messages());
	context.insert("categories", &Category::all(&state.pool).await?);
	context.insert("statuses", Status::VALUES);
	render_with_status(state, request, template, context, status).await
}
