//! The URL table.

use lectern_core::Result;
use lectern_http::{Handler, Request, Response};
use lectern_urls::{Router, from_fn};
use std::future::Future;
use std::sync::Arc;

use crate::apps::{accounts, articles, categories, comments};
use crate::state::AppState;

/// Binds `view` to the shared state.
fn view<F, Fut>(state: &Arc<AppState>, f: F) -> Arc<dyn Handler>
where
	F: Fn(Arc<AppState>, Request) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Response>> + Send + 'static,
{
	let state = state.clone();
	from_fn(move |request| f(state.clone(), request))
}

/// Every route of the blog. Literal segments such as `/articles/new` are
/// registered before the `{id}` patterns they would otherwise match.
pub fn routes(state: Arc<AppState>) -> Result<Router> {
	let s = &state;
	let router = Router::new()
		.get("/", view(s, articles::index))?
		.name("root")
		// Articles
		.get("/articles", view(s, articles::index))?
		.name("articles")
		.post("/articles", view(s, articles::create))?
		.get("/articles/new", view(s, articles::new))?
		.name("new_article")
		.get("/articles/{id}", view(s, articles::show))?
		.name("article")
		.patch("/articles/{id}", view(s, articles::update))?
		.put("/articles/{id}", view(s, articles::update))?
		.delete("/articles/{id}", view(s, articles::destroy))?
		.get("/articles/{id}/edit", view(s, articles::edit))?
		.name("edit_article")
		.get("/articles/{id}/image", view(s, articles::image))?
		.name("article_image")
		// Comments
		.post("/articles/{article_id}/comments", view(s, comments::create))?
		.name("article_comments")
		.delete("/articles/{article_id}/comments/{id}", view(s, comments::destroy))?
		.name("article_comment")
		// Categories
		.get("/categories", view(s, categories::index))?
		.name("categories")
		.post("/categories", view(s, categories::create))?
		.get("/categories/new", view(s, categories::new))?
		.name("new_category")
		.get("/categories/{id}", view(s, categories::show))?
		.name("category")
		.patch("/categories/{id}", view(s, categories::update))?
		.put("/categories/{id}", view(s, categories::update))?
		.delete("/categories/{id}", view(s, categories::destroy))?
		.get("/categories/{id}/edit", view(s, categories::edit))?
		.name("edit_category")
		// Search
		.get("/search", view(s, articles::search))?
		.name("search")
		// Accounts
		.get("/users/sign_in", view(s, accounts::sign_in_form))?
		.name("new_user_session")
		.post("/users/sign_in", view(s, accounts::sign_in))?
		.get("/users/sign_out", view(s, accounts::sign_out))?
		.name("destroy_user_session")
		.delete("/users/sign_out", view(s, accounts::sign_out))?
		.get("/users/sign_up", view(s, accounts::sign_up_form))?
		.name("new_user_registration")
		.post("/users", view(s, accounts::sign_up))?
		.name("user_registration");
	Ok(router)
}
