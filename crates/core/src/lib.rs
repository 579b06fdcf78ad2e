//! Emporium Core - Shared types library.
//!
//! This crate provides the records exchanged with the Emporium backend and the
//! small amount of logic that operates on them without I/O:
//! - [`types`] - Newtype wrappers for IDs, emails, prices, roles and session tokens
//! - [`catalog`] - Products, brands and categories
//! - [`cart`] - Carts and the guest-to-user cart merge
//! - [`user`] - Users and authentication payloads
//!
//! No HTTP clients, no async runtime. The storefront crate owns all I/O.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;
pub mod user;

pub use cart::{Cart, CartItem, CartLineInput, MergeOutcome, merge_items};
pub use catalog::{
    Brand, BrandInput, BrandRef, Category, CategoryInput, CategoryRef, Product, ProductInput,
    ProductSort,
};
pub use types::*;
pub use user::{AuthResponse, LoginRequest, RegisterRequest, User};
