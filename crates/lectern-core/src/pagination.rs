//! Page-number pagination.
//!
//! Pages are numbered from 1. Out-of-range or malformed page parameters
//! fall back to page 1; a page past the end is simply empty.

use serde::Serialize;

/// Splits counted result sets into fixed-size pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
	per_page: u32,
}

impl Paginator {
	/// Creates a paginator; a zero page size is bumped to 1.
	pub fn new(per_page: u32) -> Self {
		Self {
			per_page: per_page.max(1),
		}
	}

	pub fn per_page(&self) -> u32 {
		self.per_page
	}

	/// Parses a raw `page` parameter.
	///
	/// # Examples
	///
	/// ```
	/// use lectern_core::Paginator;
	///
	/// let paginator = Paginator::new(5);
	/// assert_eq!(paginator.page_number(Some("3")), 3);
	/// assert_eq!(paginator.page_number(Some("0")), 1);
	/// assert_eq!(paginator.page_number(Some("abc")), 1);
	/// assert_eq!(paginator.page_number(None), 1);
	/// ```
	pub fn page_number(&self, raw: Option<&str>) -> u32 {
		raw.and_then(|s| s.trim().parse::<u32>().ok())
			.filter(|n| *n >= 1)
			.unwrap_or(1)
	}

	/// Row offset of the first item on page `number`.
	pub fn offset(&self, number: u32) -> u64 {
		u64::from(number.saturating_sub(1)) * u64::from(self.per_page)
	}

	/// Wraps one page of already-fetched items.
	pub fn page<T>(&self, items: Vec<T>, number: u32, total_count: u64) -> Page<T> {
		Page {
			items,
			number,
			per_page: self.per_page,
			total_count,
		}
	}
}

/// One page of results plus the numbers needed to render navigation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
	pub items: Vec<T>,
	pub number: u32,
	pub per_page: u32,
	pub total_count: u64,
}

impl<T> Page<T> {
	/// At least 1, so an empty listing still reads "Page 1 of 1".
	pub fn total_pages(&self) -> u32 {
		let per_page = u64::from(self.per_page.max(1));
		let pages = self.total_count.div_ceil(per_page).max(1);
		u32::try_from(pages).unwrap_or(u32::MAX)
	}

	pub fn has_next(&self) -> bool {
		self.number < self.total_pages()
	}

	pub fn has_previous(&self) -> bool {
		self.number > 1
	}

	pub fn next_page_number(&self) -> Option<u32> {
		self.has_next().then(|| self.number + 1)
	}

	pub fn previous_page_number(&self) -> Option<u32> {
		self.has_previous().then(|| self.number - 1)
	}

	pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
		Page {
			items: self.items.into_iter().map(f).collect(),
			number: self.number,
			per_page: self.per_page,
			total_count: self.total_count,
		}
	}
}
