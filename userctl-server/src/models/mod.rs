//! Domain models with validation at construction
//!
//! All user input is validated before it can reach the store.
//! Invalid input returns ValidationErrors, not panic.

pub mod validation;
pub mod user;

pub use validation::{FieldViolation, ValidationError, ValidationErrors};
pub use user::{NewUserRequest, UserFields, UserRecord, MAX_EMAIL_LEN};
