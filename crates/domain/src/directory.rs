// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only directory reference data: users, roles and departments.
//!
//! The directory is owned by an external service. The core only reads a
//! snapshot of it.

use crate::error::DomainError;
use crate::types::{DepartmentId, UserId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Directory role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    Employee,
    Principal,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
            Self::Employee => "EMPLOYEE",
            Self::Principal => "PRINCIPAL",
        }
    }

    /// Returns true for the roles that may act on any complaint
    /// and bypass the review field lock.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        matches!(self, Self::Admin | Self::Principal)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "MANAGER" => Ok(Self::Manager),
            "EMPLOYEE" => Ok(Self::Employee),
            "PRINCIPAL" => Ok(Self::Principal),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Loose syntactic email check used to pick notification recipients.
#[must_use]
pub fn is_valid_email(candidate: &str) -> bool {
    let candidate: &str = candidate.trim();
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// A directory user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    /// Contact addresses in order of preference.
    #[serde(default)]
    pub emails: Vec<String>,
}

impl User {
    /// Creates a new directory user without contact addresses.
    #[must_use]
    pub fn new(id: &str, name: &str, role: Role, department_id: Option<&str>) -> Self {
        Self {
            id: UserId::new(id),
            name: name.to_string(),
            role,
            department_id: department_id.and_then(DepartmentId::parse_optional),
            emails: Vec::new(),
        }
    }

    /// Adds a contact address.
    #[must_use]
    pub fn with_email(mut self, email: &str) -> Self {
        self.emails.push(email.to_string());
        self
    }

    /// Returns the first syntactically valid contact address.
    #[must_use]
    pub fn primary_email(&self) -> Option<&str> {
        self.emails
            .iter()
            .map(|e| e.trim())
            .find(|e| is_valid_email(e))
    }
}

/// A department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    #[serde(default)]
    pub manager_user_id: Option<UserId>,
    #[serde(default)]
    pub members: Vec<UserId>,
}

impl Department {
    /// Creates a new department.
    #[must_use]
    pub fn new(id: &str, name: &str, manager_user_id: Option<&str>) -> Self {
        Self {
            id: DepartmentId::new(id),
            name: name.to_string(),
            manager_user_id: manager_user_id.and_then(UserId::parse_optional),
            members: Vec::new(),
        }
    }
}

/// A snapshot of the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub departments: Vec<Department>,
}

impl Directory {
    #[must_use]
    pub const fn new(users: Vec<User>, departments: Vec<Department>) -> Self {
        Self { users, departments }
    }

    /// Looks up a user by id.
    #[must_use]
    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == id)
    }

    /// Looks up a department by id.
    #[must_use]
    pub fn department(&self, id: &DepartmentId) -> Option<&Department> {
        self.departments.iter().find(|d| &d.id == id)
    }

    /// Returns every user holding `role`.
    #[must_use]
    pub fn users_with_role(&self, role: Role) -> Vec<&User> {
        self.users.iter().filter(|u| u.role == role).collect()
    }

    /// Returns the users a complaint in `department_id` may be assigned to:
    /// the department's employees plus its manager.
    #[must_use]
    pub fn assignable_users_for_department(&self, department_id: &DepartmentId) -> Vec<&User> {
        let department: Option<&Department> = self.department(department_id);
        let manager: Option<&UserId> = department.and_then(|d| d.manager_user_id.as_ref());

        self.users
            .iter()
            .filter(|u| {
                let employee_here: bool = u.role == Role::Employee
                    && (u.department_id.as_ref() == Some(department_id)
                        || department.is_some_and(|d| d.members.contains(&u.id)));
                employee_here || manager == Some(&u.id)
            })
            .collect()
    }

    /// Returns true if `user_id` may hold complaints of `department_id`.
    #[must_use]
    pub fn is_assignable_in(&self, user_id: &UserId, department_id: &DepartmentId) -> bool {
        self.assignable_users_for_department(department_id)
            .iter()
            .any(|u| &u.id == user_id)
    }
}
