//! Session form protocol: CSRF tokens, flash messages, and preserved input.
//!
//! Each handler method that renders a form owns one entry in the session,
//! keyed by `(handler, method)`. The form system supports:
//! - Lazily issued CSRF tokens that survive failed submissions
//! - Field-scoped and form-wide error messages
//! - One-shot success messages
//! - Echoing the last submission back into the form
//! - Input validation predicates

mod entry;
mod session;
mod token;
mod validate;

pub use entry::{FORM_SESSION_PREFIX, Failure, FormKey, HandlerForms, SessionFormEntry};
pub use session::{
    EXPIRED_MESSAGE, Flash, FlashKind, FormSession, FormView, Submission, TOKEN_FIELD,
};
pub use token::{DEFAULT_TOKEN_BYTES, TokenIssuer, tokens_match};
pub use validate::{InputKind, is_absolute_url, validate};
