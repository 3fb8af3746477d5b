//! Liveness probe, public and unauthenticated.

pub mod handlers;
pub mod routes;
