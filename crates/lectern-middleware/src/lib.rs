//! Middleware used by the Lectern application.
//!
//! Applied outermost first:
//!
//! 1. [`LoggingMiddleware`]: one structured log line per request
//! 2. [`SessionMiddleware`]: loads the session and the [`CurrentUser`], and
//!    persists changes afterwards
//! 3. [`MethodOverrideMiddleware`]: dispatches `POST` + `_method=...` as
//!    that method
//!
//! [`CurrentUser`]: lectern_auth::CurrentUser

pub mod logging;
pub mod method_override;
pub mod session;

pub use logging::LoggingMiddleware;
pub use method_override::{METHOD_OVERRIDE_FIELD, MethodOverrideMiddleware};
pub use session::{SessionConfig, SessionMiddleware};
