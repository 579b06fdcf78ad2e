//! Core types for Emporium.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod page;
pub mod price;
pub mod role;
pub mod session_token;

pub use email::{Email, EmailError};
pub use id::*;
pub use page::Page;
pub use price::{CurrencyCode, Price};
pub use role::Role;
pub use session_token::{SessionToken, SessionTokenError};
