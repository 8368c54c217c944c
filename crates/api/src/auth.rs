// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and the complaint access policy.
//!
//! The policy is a set of pure predicates over an actor and a complaint.
//! The same predicates gate single-complaint access and list filtering,
//! so visibility cannot drift between the two paths.

use complaint_desk::ComplaintField;
use complaint_desk_audit::Actor;
use complaint_desk_domain::{Complaint, ComplaintStatus, DepartmentId, Directory, Role, User, UserId};

use crate::error::AuthError;

/// Code reported when the review field lock rejects a mutation.
pub const REVIEW_LOCK_CODE: &str = "review_lock";

/// An authenticated actor, resolved from the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The directory user id.
    pub user_id: UserId,
    /// The display name.
    pub name: String,
    /// The directory role.
    pub role: Role,
    /// The actor's own department, if any.
    pub department_id: Option<DepartmentId>,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The directory user id
    /// * `role` - The directory role
    /// * `department_id` - The actor's department, if any
    #[must_use]
    pub fn new(user_id: &str, role: Role, department_id: Option<&str>) -> Self {
        Self {
            user_id: UserId::new(user_id),
            name: String::new(),
            role,
            department_id: department_id.and_then(DepartmentId::parse_optional),
        }
    }

    /// Creates an actor from a directory user.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            name: user.name.clone(),
            role: user.role,
            department_id: user.department_id.clone(),
        }
    }

    /// Returns true for ADMIN and PRINCIPAL actors.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }

    /// Converts this authenticated actor into an audit Actor.
    ///
    /// This is used when recording audit events to attribute actions
    /// to the authenticated user.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(
            self.user_id.value().to_string(),
            self.role.as_str().to_string(),
        )
    }
}

/// Resolves request credentials into actors.
///
/// The credential is the bearer token presented by the identity provider;
/// here it carries the directory user id.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Resolves a credential into an authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `directory` - The directory snapshot
    /// * `credential` - The bearer token, if any
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthenticated` if the credential is missing,
    /// blank, or names no directory user.
    pub fn resolve_actor(
        directory: &Directory,
        credential: Option<&str>,
    ) -> Result<AuthenticatedActor, AuthError> {
        let token: &str = credential
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::Unauthenticated {
                reason: String::from("missing credential"),
            })?;

        directory
            .user(&UserId::new(token))
            .map(AuthenticatedActor::from_user)
            .ok_or_else(|| AuthError::Unauthenticated {
                reason: String::from("unknown user"),
            })
    }
}

fn same_department(actor: &AuthenticatedActor, department_id: Option<&DepartmentId>) -> bool {
    match (actor.department_id.as_ref(), department_id) {
        (Some(own), Some(target)) => own == target,
        _ => false,
    }
}

/// Returns true if the actor may see the complaint.
///
/// ADMIN and PRINCIPAL see everything, a MANAGER sees their department,
/// an EMPLOYEE sees what is assigned to them.
#[must_use]
pub fn can_read(actor: &AuthenticatedActor, complaint: &Complaint) -> bool {
    match actor.role {
        Role::Admin | Role::Principal => true,
        Role::Manager => same_department(actor, complaint.department_id.as_ref()),
        Role::Employee => complaint.is_assignee(&actor.user_id),
    }
}

/// Returns true if the actor may change the complaint at all.
///
/// Write visibility is the same as read visibility.
#[must_use]
pub fn can_mutate(actor: &AuthenticatedActor, complaint: &Complaint) -> bool {
    can_read(actor, complaint)
}

#[must_use]
pub const fn can_change_department(actor: &AuthenticatedActor) -> bool {
    actor.is_privileged()
}

/// Returns true if the actor may assign complaints of `effective_department`.
#[must_use]
pub fn can_assign(actor: &AuthenticatedActor, effective_department: Option<&DepartmentId>) -> bool {
    match actor.role {
        Role::Admin | Role::Principal => true,
        Role::Manager => same_department(actor, effective_department),
        Role::Employee => false,
    }
}

#[must_use]
pub fn can_write_letter(actor: &AuthenticatedActor, complaint: &Complaint) -> bool {
    complaint.is_assignee(&actor.user_id)
}

#[must_use]
pub const fn can_act_as_principal(actor: &AuthenticatedActor) -> bool {
    actor.is_privileged()
}

/// Returns the first review-locked field the actor may not touch, if any.
///
/// While a complaint awaits principal review, non-privileged actors may not
/// change its messages, status, assignee or letter.
#[must_use]
pub fn review_lock_violation(
    actor: &AuthenticatedActor,
    complaint: &Complaint,
    touched: &[ComplaintField],
) -> Option<ComplaintField> {
    if complaint.status != ComplaintStatus::AwaitingPrincipalReview || actor.is_privileged() {
        return None;
    }
    touched.iter().copied().find(ComplaintField::is_review_locked)
}

/// Authorization service wrapping the policy predicates.
///
/// Each check turns a `false` predicate into a Forbidden error naming the
/// attempted action.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that the actor may see the complaint.
    ///
    /// # Errors
    ///
    /// Returns an error if the complaint is outside the actor's visibility.
    pub fn authorize_read(actor: &AuthenticatedActor, complaint: &Complaint) -> Result<(), AuthError> {
        if can_read(actor, complaint) {
            Ok(())
        } else {
            Err(AuthError::forbidden(
                "read_complaint",
                "not_visible",
                "Complaint is outside your visibility",
            ))
        }
    }

    /// Checks that the actor may change the complaint.
    ///
    /// # Errors
    ///
    /// Returns an error if the complaint is outside the actor's scope.
    pub fn authorize_mutate(
        actor: &AuthenticatedActor,
        complaint: &Complaint,
        action: &str,
    ) -> Result<(), AuthError> {
        if can_mutate(actor, complaint) {
            Ok(())
        } else {
            Err(AuthError::forbidden(
                action,
                "not_permitted",
                "You may not change this complaint",
            ))
        }
    }

    /// Applies the review field lock.
    ///
    /// # Errors
    ///
    /// Returns a Forbidden error with code `review_lock` if a locked field
    /// is touched.
    pub fn authorize_field_lock(
        actor: &AuthenticatedActor,
        complaint: &Complaint,
        touched: &[ComplaintField],
        action: &str,
    ) -> Result<(), AuthError> {
        match review_lock_violation(actor, complaint, touched) {
            None => Ok(()),
            Some(field) => Err(AuthError::Forbidden {
                action: action.to_string(),
                code: String::from(REVIEW_LOCK_CODE),
                message: format!(
                    "Field '{}' is locked while the complaint awaits principal review",
                    field.as_str()
                ),
            }),
        }
    }

    /// Checks that the actor may assign complaints of the department.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not assign in that department.
    pub fn authorize_assign(
        actor: &AuthenticatedActor,
        effective_department: Option<&DepartmentId>,
    ) -> Result<(), AuthError> {
        if can_assign(actor, effective_department) {
            Ok(())
        } else {
            Err(AuthError::forbidden(
                "assign",
                "not_permitted",
                "Only an administrator, the principal or the department manager may assign",
            ))
        }
    }

    /// Checks that the actor may move complaints between departments.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is ADMIN or PRINCIPAL.
    pub fn authorize_change_department(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        if can_change_department(actor) {
            Ok(())
        } else {
            Err(AuthError::forbidden(
                "change_department",
                "not_permitted",
                "Only an administrator or the principal may change the department",
            ))
        }
    }

    /// Checks that the actor is the assignee.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not the current assignee.
    pub fn authorize_write_letter(
        actor: &AuthenticatedActor,
        complaint: &Complaint,
        action: &str,
    ) -> Result<(), AuthError> {
        if can_write_letter(actor, complaint) {
            Ok(())
        } else {
            Err(AuthError::forbidden(
                action,
                "not_assignee",
                "Only the assignee may write the letter",
            ))
        }
    }

    /// Checks that the actor may take principal decisions.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is PRINCIPAL or ADMIN.
    pub fn authorize_principal(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        if can_act_as_principal(actor) {
            Ok(())
        } else {
            Err(AuthError::forbidden(
                action,
                "not_principal",
                "Only the principal may review the letter",
            ))
        }
    }

    /// Checks that the actor is an administrator.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is ADMIN.
    pub fn authorize_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Manager | Role::Employee | Role::Principal => Err(AuthError::forbidden(
                action,
                "not_admin",
                "Only an administrator may run maintenance",
            )),
        }
    }
}
