//! HTTP gateway for the recovery subsystem.

pub mod auth;
pub mod ratelimit;
pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
