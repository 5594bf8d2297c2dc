//! The blog's views, one module per resource.
//!
//! Every view takes the shared [`AppState`](crate::AppState) and the
//! request, and returns a rendered page or a redirect. Gated actions call
//! [`require_login`](crate::shortcuts::require_login) before touching any
//! record.

pub mod accounts;
pub mod articles;
pub mod categories;
pub mod comments;
