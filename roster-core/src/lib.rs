//! roster-core: domain types for the roster user service
//!
//! Holds the [`User`] entity, the write payload shared by create and
//! update, and the validation rules applied to it. Storage backends and
//! the HTTP layer live in `roster-server`.

pub mod user;
pub mod validation;

pub use user::{User, UserPayload, MAX_TEXT_LEN};
pub use validation::ValidationError;
