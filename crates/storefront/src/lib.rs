//! Emporium Storefront library.
//!
//! Server-rendered storefront and admin dashboard in front of the Emporium
//! REST backend. The crate is a library so integration tests can build the
//! same router the binary serves.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod filters;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod views;

pub use app::build_router;
