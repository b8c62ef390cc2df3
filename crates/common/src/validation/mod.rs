//! Client-side field validation
//!
//! Validators run before any network call; a failure here never reaches
//! the store. Callers map the returned message into
//! `TrestleError::Validation`.

pub mod validators;

pub use validators::{EmailValidator, FieldValidator, PhoneValidator, StringValidator};
