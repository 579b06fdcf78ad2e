//! Validated form input.
//!
//! Every form posted by the storefront or admin pages deserializes into a raw
//! `*Form` struct of strings, then passes through [`Validate`] to become the
//! typed value the API client sends. Failures are collected per field so a
//! page can re-render with every message next to its input.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

pub use admin::RoleForm;
pub use auth::{LoginForm, RegisterForm};
pub use cart::{CartItemForm, CartQuantityForm, CartRemoveForm};
pub use catalog::{BrandForm, CategoryForm, ProductForm};

/// Slugs are lowercase alphanumerics separated by single hyphens.
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug regex is valid"));

/// A form that can be checked and converted into its typed output.
pub trait Validate {
    /// Value produced when every field is valid.
    type Output;

    /// Check all fields, returning either the typed value or every error.
    ///
    /// # Errors
    ///
    /// Returns `FieldErrors` listing each invalid field.
    fn validate(&self) -> Result<Self::Output, FieldErrors>;
}

/// Validation messages keyed by field name, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, Vec<String>)>,
}

/// One error as reported by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendFieldError {
    pub field: String,
    pub message: String,
}

impl FieldErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a message for `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        if let Some((_, messages)) = self.entries.iter_mut().find(|(f, _)| f == field) {
            messages.push(message);
        } else {
            self.entries.push((field.to_string(), vec![message]));
        }
    }

    /// Record a form-wide message (not tied to an input).
    pub fn add_form(&mut self, message: impl Into<String>) {
        self.add("_form", message);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.entries.iter().any(|(f, _)| f == field)
    }

    /// First message for `field`, for display next to its input.
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .and_then(|(_, messages)| messages.first())
            .map(String::as_str)
    }

    /// Every `(field, message)` pair, flattened.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(field, messages)| {
            messages.iter().map(move |m| (field.as_str(), m.as_str()))
        })
    }

    /// `Ok(value)` if no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when any error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl FromIterator<BackendFieldError> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = BackendFieldError>>(iter: I) -> Self {
        let mut errors = Self::new();
        for e in iter {
            errors.add(&snake_case(&e.field), e.message);
        }
        errors
    }
}

/// Backend field names are camelCase; form inputs are snake_case.
fn snake_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for c in field.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

// =============================================================================
// Field helpers
// =============================================================================

/// Trim a required text field and check its length in characters.
pub(crate) fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) -> String {
    let value = value.trim();
    let len = value.chars().count();
    if len == 0 {
        errors.add(field, "This field is required");
    } else if len < min {
        errors.add(field, format!("Must be at least {min} characters"));
    } else if len > max {
        errors.add(field, format!("Must be at most {max} characters"));
    }
    value.to_string()
}

/// Trim an optional text field; blank becomes `None`.
pub(crate) fn optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Option<String> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    if value.chars().count() > max {
        errors.add(field, format!("Must be at most {max} characters"));
    }
    Some(value.to_string())
}

/// Use the given slug, or derive one from `name` when blank.
pub(crate) fn slug_or_derived(
    errors: &mut FieldErrors,
    slug: Option<&str>,
    name: &str,
) -> String {
    let slug = slug
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(|| slugify(name), str::to_string);
    if !SLUG_RE.is_match(&slug) {
        errors.add(
            "slug",
            "Use lowercase letters, numbers and single hyphens only",
        );
    }
    slug
}

/// Check that an optional value is an absolute http(s) URL.
pub(crate) fn optional_url(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
) -> Option<String> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    if !is_http_url(value) {
        errors.add(field, "Must be an http(s) URL");
    }
    Some(value.to_string())
}

pub(crate) fn is_http_url(value: &str) -> bool {
    url::Url::parse(value)
        .is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
}

/// Lowercase, replace runs of non-alphanumerics with single hyphens.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_errors_use_form_field_names() {
        let errors: FieldErrors = vec![BackendFieldError {
            field: "compareAtPrice".to_string(),
            message: "Too low".to_string(),
        }]
        .into_iter()
        .collect();
        assert_eq!(errors.first("compare_at_price"), Some("Too low"));
    }

    #[test]
    fn test_field_errors_group_by_field() {
        let mut errors = FieldErrors::new();
        errors.add("email", "Required");
        errors.add("password", "Too short");
        errors.add("email", "Invalid");

        assert_eq!(errors.first("email"), Some("Required"));
        assert_eq!(errors.iter().count(), 3);
        assert_eq!(errors.to_string(), "email: Required; email: Invalid; password: Too short");
        assert!(errors.into_result(()).is_err());
    }

    #[test]
    fn test_field_errors_from_backend() {
        let errors: FieldErrors = vec![BackendFieldError {
            field: "slug".to_string(),
            message: "already taken".to_string(),
        }]
        .into_iter()
        .collect();
        assert!(errors.contains("slug"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Ceramic   Mug 2.0 "), "ceramic-mug-2-0");
        assert_eq!(slugify("Über"), "ber");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_slug_or_derived() {
        let mut errors = FieldErrors::new();
        assert_eq!(slug_or_derived(&mut errors, None, "Desk Lamp"), "desk-lamp");
        assert_eq!(slug_or_derived(&mut errors, Some("  "), "Desk Lamp"), "desk-lamp");
        assert!(errors.is_empty());

        slug_or_derived(&mut errors, Some("Bad Slug"), "x");
        assert!(errors.contains("slug"));
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://cdn.example.com/a.png"));
        assert!(!is_http_url("javascript:alert(1)"));
        assert!(!is_http_url("/relative.png"));
    }
}
