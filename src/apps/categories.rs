use hyper::StatusCode;
use lectern_core::{Message, Result, ValidationErrors};
use lectern_db::{Article, Category, CategoryForm, DatabaseError};
use lectern_http::{FormData, Request, Response};
use std::sync::Arc;
use tera::Context;

use crate::shortcuts::{current_user, redirect_with, render, render_with_status, require_login};
use crate::state::AppState;

fn form_from(form: &FormData) -> CategoryForm {
	CategoryForm::new(form.scope("category").string("name"))
}

pub async fn index(state: Arc<AppState>, request: Request) -> Result<Response> {
	let mut context = Context::new();
	context.insert("categories", &Category::all(&state.pool).await?);
	render(&state, &request, "categories/index.html", context).await
}

pub async fn show(state: Arc<AppState>, request: Request) -> Result<Response> {
	let id = request.path_param_as::<i64>("id")?;
	let category = Category::find(&state.pool, id).await?;
	let signed_in = current_user(&request).is_authenticated();

	let mut context = Context::new();
	context.insert("articles", &Article::for_category(&state.pool, id, signed_in).await?);
	context.insert("category", &category);
	render(&state, &request, "categories/show.html", context).await
}

pub async fn new(state: Arc<AppState>, request: Request) -> Result<Response> {
	if let Err(redirect) = require_login(&request) {
		return Ok(redirect);
	}
	render_form(&state, &request, "categories/new.html", &CategoryForm::default(), None, ValidationErrors::new()).await
}

pub async fn create(state: Arc<AppState>, request: Request) -> Result<Response> {
	if let Err(redirect) = require_login(&request) {
		return Ok(redirect);
	}
	let form = form_from(&request.form().await?);

	match Category::create(&state.pool, &form).await {
		Ok(category) => Ok(redirect_with(
			&request,
			&format!("/categories/{}", category.id),
			Message::notice("Category was successfully created."),
		)),
		Err(DatabaseError::Validation(errors)) => {
			render_form(&state, &request, "categories/new.html", &form, None, errors).await
		}
		Err(e) => Err(e.into()),
	}
}

pub async fn edit(state: Arc<AppState>, request: Request) -> Result<Response> {
	if let Err(redirect) = require_login(&request) {
		return Ok(redirect);
	}
	let id = request.path_param_as::<i64>("id")?;
	let category = Category::find(&state.pool, id).await?;

	let form = CategoryForm::new(category.name.clone());
	render_form(&state, &request, "categories/edit.html", &form, Some(&category), ValidationErrors::new()).await
}

pub async fn update(state: Arc<AppState>, request: Request) -> Result<Response> {
	if let Err(redirect) = require_login(&request) {
		return Ok(redirect);
	}
	let id = request.path_param_as::<i64>("id")?;
	let form = form_from(&request.form().await?);

	match Category::update(&state.pool, id, &form).await {
		Ok(category) => Ok(redirect_with(
			&request,
			&format!("/categories/{}", category.id),
			Message::notice("Category was successfully updated."),
		)),
		Err(DatabaseError::Validation(errors)) => {
			let category = Category::find(&state.pool, id).await?;
			render_form(&state, &request, "categories/edit.html", &form, Some(&category), errors).await
		}
		Err(e) => Err(e.into()),
	}
}

/// Refuses while articles still reference the category.
pub async fn destroy(state: Arc<AppState>, request: Request) -> Result<Response> {
	if let Err(redirect) = require_login(&request) {
		return Ok(redirect);
	}
	let id = request.path_param_as::<i64>("id")?;

	match Category::destroy(&state.pool, id).await {
		Ok(()) => Ok(redirect_with(
			&request,
			"/categories",
			Message::notice("Category was successfully destroyed."),
		)),
		Err(DatabaseError::Restricted(message)) => Ok(redirect_with(
			&request,
			&format!("/categories/{}", id),
			Message::alert(message),
		)),
		Err(e) => Err(e.into()),
	}
}

async fn render_form(
	state: &AppState,
	request: &Request,
	template: &str,
	form: &CategoryForm,
	category: Option<&Category>,
	errors: ValidationErrors,
) -> Result<Response> {
	let status = if errors.is_empty() {
		StatusCode::OK
	} else {
		StatusCode::UNPROCESSABLE_ENTITY
	};

	let mut context = Context::new();
	context.insert("form", form);
	context.insert("category", &category);
	context.insert("errors", &errors.full_messages());
	render_with_status(state, request, template, context, status).await
}
