//! Core types shared by every Lectern crate.
//!
//! - [`exception`]: the request-level error taxonomy and its HTTP status mapping
//! - [`validators`]: field validators and the ordered [`ValidationErrors`] collection
//! - [`messages`]: one-shot flash messages carried across a redirect
//! - [`pagination`]: page-number pagination over counted result sets

pub mod exception;
pub mod messages;
pub mod pagination;
pub mod validators;

pub use exception::{Error, Result};
pub use messages::{Message, MessageLevel};
pub use pagination::{Page, Paginator};
pub use validators::{ValidationErrors, Validator};
