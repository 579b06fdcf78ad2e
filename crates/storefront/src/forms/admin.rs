//! Admin user-management forms.

use emporium_core::Role;
use serde::Deserialize;

use super::{FieldErrors, Validate};

/// Role change form data.
#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: String,
}

impl Validate for RoleForm {
    type Output = Role;

    fn validate(&self) -> Result<Role, FieldErrors> {
        self.role.trim().parse::<Role>().map_err(|_| {
            let mut errors = FieldErrors::new();
            errors.add("role", "Choose customer or admin");
            errors
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_form() {
        let form = RoleForm {
            role: "admin".to_string(),
        };
        assert_eq!(form.validate().unwrap(), Role::Admin);

        let form = RoleForm {
            role: "owner".to_string(),
        };
        assert!(form.validate().unwrap_err().contains("role"));
    }
}
