// ==========================================
// Sponsorship MIS - operator roles
// ==========================================
// Bulk import and contact maintenance are limited to
// administrators and managers.
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    Manager,
    Staff,
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Manager => "manager",
            Role::Staff => "staff",
            Role::Guest => "guest",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "administrator" | "admin" => Ok(Role::Administrator),
            "manager" => Ok(Role::Manager),
            "staff" => Ok(Role::Staff),
            "guest" => Ok(Role::Guest),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    BulkImport,
    ContactMaintenance,
}

impl Permission {
    fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Permission::BulkImport | Permission::ContactMaintenance => {
                &[Role::Administrator, Role::Manager]
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("user '{username}' ({role}) is not allowed to perform {permission:?}")]
pub struct AccessDenied {
    pub username: String,
    pub role: Role,
    pub permission: Permission,
}

/// The person running an import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub username: String,
    pub role: Role,
}

impl Operator {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn can(&self, permission: Permission) -> bool {
        permission.allowed_roles().contains(&self.role)
    }

    pub fn require(&self, permission: Permission) -> Result<(), AccessDenied> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(AccessDenied {
                username: self.username.clone(),
                role: self.role,
                permission,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_and_manager_may_import() {
        assert!(Operator::new("root", Role::Administrator).can(Permission::BulkImport));
        assert!(Operator::new("mary", Role::Manager).can(Permission::ContactMaintenance));
    }

    #[test]
    fn test_staff_is_denied() {
        let err = Operator::new("tom", Role::Staff)
            .require(Permission::BulkImport)
            .unwrap_err();
        assert_eq!(err.role, Role::Staff);
        assert_eq!(
            err.to_string(),
            "user 'tom' (staff) is not allowed to perform BulkImport"
        );
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Administrator);
        assert!("owner".parse::<Role>().is_err());
    }
}
