//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart_session` - Guest cart identity and the login-time cart merge

pub mod cart_session;
