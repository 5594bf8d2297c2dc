//! Embedded tera templates.
//!
//! Templates are compiled into the binary and parsed once, on first use.
//! Names end in `.html` so tera auto-escapes every variable.

use lectern_core::{Error, Result};
use once_cell::sync::OnceCell;
use tera::{Context, Tera};

static ENGINE: OnceCell<Tera> = OnceCell::new();

const TEMPLATES: &[(&str, &str)] = &[
	("layout.html", include_str!("../templates/layout.html")),
	("shared/_errors.html", include_str!("../templates/shared/_errors.html")),
	("articles/_form.html", include_str!("../templates/articles/_form.html")),
	("articles/_list.html", include_str!("../templates/articles/_list.html")),
	("articles/index.html", include_str!("../templates/articles/index.html")),
	("articles/show.html", include_str!("../templates/articles/show.html")),
	("articles/new.html", include_str!("../templates/articles/new.html")),
	("articles/edit.html", include_str!("../templates/articles/edit.html")),
	("articles/search.html", include_str!("../templates/articles/search.html")),
	("categories/_form.html", include_str!("../templates/categories/_form.html")),
	("categories/index.html", include_str!("../templates/categories/index.html")),
	("categories/show.html", include_str!("../templates/categories/show.html")),
	("categories/new.html", include_str!("../templates/categories/new.html")),
	("categories/edit.html", include_str!("../templates/categories/edit.html")),
	("users/sign_in.html", include_str!("../templates/users/sign_in.html")),
	("users/sign_up.html", include_str!("../templates/users/sign_up.html")),
];

/// The shared engine, parsing every template on first call.
pub fn engine() -> Result<&'static Tera> {
	ENGINE.get_or_try_init(|| {
		let mut tera = Tera::default();
		tera.add_raw_templates(TEMPLATES.iter().copied())
			.map_err(|e| Error::Template(format!("failed to parse templates: {:?}", e)))?;
		Ok(tera)
	})
}

/// Renders `name` with `context` into HTML.
pub fn render(name: &str, context: &Context) -> Result<String> {
	engine()?
		.render(name, context)
		.map_err(|e| Error::Template(format!("{}: {:?}", name, e)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_every_template_parses() {
		let tera = engine().unwrap();

		for (name, _) in TEMPLATES {
			assert!(tera.get_template_names().any(|n| n == *name), "missing {}", name);
		}
	}

	#[rstest]
	fn test_variables_are_escaped() {
		let mut context = Context::new();
		context.insert("errors", &vec!["<script>alert(1)</script>"]);

		let html = render("shared/_errors.html", &context).unwrap();

		assert!(html.contains("&lt;script&gt;"));
		assert!(!html.contains("<script>"));
	}
}
