// Completeness scoring over the reconciled record and its source text.

pub mod validator;

pub use validator::{validate, ValidationReport};
