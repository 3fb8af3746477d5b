//! Caller identity for the category API.
//!
//! Session tokens are issued by the login flow elsewhere; this feature only
//! validates them and exposes the caller's role to handlers.

mod validator;

pub mod guards;
pub mod model;

pub use validator::JwtValidator;
