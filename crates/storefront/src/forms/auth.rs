//! Login and registration forms.

use emporium_core::{Email, LoginRequest, RegisterRequest};
use serde::Deserialize;

use super::{FieldErrors, Validate, required_text};

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Local path to return to after signing in.
    #[serde(default)]
    pub next: Option<String>,
}

impl Validate for LoginForm {
    type Output = LoginRequest;

    fn validate(&self) -> Result<LoginRequest, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = parse_email(&mut errors, &self.email);
        if self.password.is_empty() {
            errors.add("password", "This field is required");
        }

        match email {
            Some(email) => errors.into_result(LoginRequest {
                email,
                password: self.password.clone(),
            }),
            None => Err(errors),
        }
    }
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub next: Option<String>,
}

impl Validate for RegisterForm {
    type Output = RegisterRequest;

    fn validate(&self) -> Result<RegisterRequest, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", &self.name, 2, 80);
        let email = parse_email(&mut errors, &self.email);
        check_password_strength(&mut errors, &self.password);
        if self.password != self.password_confirm {
            errors.add("password_confirm", "Passwords do not match");
        }

        match email {
            Some(email) => errors.into_result(RegisterRequest {
                name,
                email,
                password: self.password.clone(),
            }),
            None => Err(errors),
        }
    }
}

fn parse_email(errors: &mut FieldErrors, raw: &str) -> Option<Email> {
    if raw.trim().is_empty() {
        errors.add("email", "This field is required");
        return None;
    }
    match Email::parse(raw) {
        Ok(email) => Some(email),
        Err(_) => {
            errors.add("email", "Enter a valid email address");
            None
        }
    }
}

fn check_password_strength(errors: &mut FieldErrors, password: &str) {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("Must be at least {MIN_PASSWORD_LENGTH} characters"),
        );
    } else if len > MAX_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("Must be at most {MAX_PASSWORD_LENGTH} characters"),
        );
    }
    if !password.chars().any(char::is_alphabetic) || !password.chars().any(|c| c.is_ascii_digit())
    {
        errors.add("password", "Must contain a letter and a number");
    }
}

/// Only allow redirects to local paths, never to another origin.
#[must_use]
pub fn safe_next_path(next: Option<&str>) -> Option<&str> {
    next.filter(|p| p.starts_with('/') && !p.starts_with("//") && !p.contains('\\'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn register(name: &str, email: &str, password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            password_confirm: confirm.to_string(),
            next: None,
        }
    }

    #[test]
    fn test_login_valid() {
        let form = LoginForm {
            email: " Shopper@Example.com ".to_string(),
            password: "hunter22".to_string(),
            next: None,
        };
        let request = form.validate().unwrap();
        assert_eq!(request.email.as_str(), "Shopper@example.com");
    }

    #[test]
    fn test_login_reports_every_field() {
        let form = LoginForm {
            email: "nope".to_string(),
            password: String::new(),
            next: None,
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.contains("email"));
        assert!(errors.contains("password"));
    }

    #[test]
    fn test_register_valid() {
        let request = register("  Ada Lovelace ", "ada@example.com", "engine42", "engine42")
            .validate()
            .unwrap();
        assert_eq!(request.name, "Ada Lovelace");
    }

    #[test]
    fn test_register_password_rules() {
        let errors = register("Ada", "ada@example.com", "short1", "short1")
            .validate()
            .unwrap_err();
        assert_eq!(errors.first("password"), Some("Must be at least 8 characters"));

        let errors = register("Ada", "ada@example.com", "lettersonly", "lettersonly")
            .validate()
            .unwrap_err();
        assert_eq!(errors.first("password"), Some("Must contain a letter and a number"));

        let errors = register("Ada", "ada@example.com", "engine42", "engine43")
            .validate()
            .unwrap_err();
        assert!(errors.contains("password_confirm"));
    }

    #[test]
    fn test_register_name_length() {
        let errors = register("A", "ada@example.com", "engine42", "engine42")
            .validate()
            .unwrap_err();
        assert!(errors.contains("name"));
    }

    #[test]
    fn test_safe_next_path() {
        assert_eq!(safe_next_path(Some("/account")), Some("/account"));
        assert_eq!(safe_next_path(Some("//evil.example")), None);
        assert_eq!(safe_next_path(Some("https://evil.example")), None);
        assert_eq!(safe_next_path(Some("/\\evil.example")), None);
        assert_eq!(safe_next_path(None), None);
    }
}
