//! Title search term sanitizing.

/// Escape character used in `LIKE ... ESCAPE '\'`.
pub const LIKE_ESCAPE: char = '\\';

/// Case-folds a title for the `articles.title_search` column.
///
/// SQLite's `LOWER()` only folds ASCII, so titles are folded here and the
/// search term goes through the same function in [`like_pattern`].
///
/// ```
/// use lectern_db::search::fold;
///
/// assert_eq!(fold("Über Rust"), "über rust");
/// ```
pub fn fold(text: &str) -> String {
	text.to_lowercase()
}

/// Builds the bound `LIKE` pattern for a title search.
///
/// Returns `None` for a blank term. Otherwise the term is trimmed and
/// [`fold`]ed, `%`, `_` and `\` are escaped, and the result is wrapped in
/// `%...%`.
///
/// # Examples
///
/// ```
/// use lectern_db::search::like_pattern;
///
/// assert_eq!(like_pattern("  Rails "), Some("%rails%".to_string()));
/// assert_eq!(like_pattern("100%"), Some("%100\\%%".to_string()));
/// assert_eq!(like_pattern("   "), None);
/// ```
pub fn like_pattern(term: &str) -> Option<String> {
	let term = term.trim();
	if term.is_empty() {
		return None;
	}

	let mut pattern = String::with_capacity(term.len() + 2);
	pattern.push('%');
	for c in fold(term).chars() {
		if matches!(c, '%' | '_' | LIKE_ESCAPE) {
			pattern.push(LIKE_ESCAPE);
		}
		pattern.push(c);
	}
	pattern.push('%');
	Some(pattern)
}
