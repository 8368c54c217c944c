// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use complaint_desk_domain::{Complaint, ComplaintId, ComplaintStatus, DepartmentId, UserId};

#[cfg(test)]
mod tests;

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor, usually the directory role.
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The name of the action (e.g., "`SubmitForReview`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// The routing-relevant state of a complaint at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    pub status: ComplaintStatus,
    pub department_id: Option<DepartmentId>,
    pub assignee_user_id: Option<UserId>,
    pub return_count: u32,
}

impl StateSnapshot {
    /// Captures the snapshot of a complaint.
    #[must_use]
    pub fn of(complaint: &Complaint) -> Self {
        Self {
            status: complaint.status,
            department_id: complaint.department_id.clone(),
            assignee_user_id: complaint.assignee_user_id.clone(),
            return_count: complaint.lifetime_return_count(),
        }
    }
}

impl std::fmt::Display for StateSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "status={} department={} assignee={} returns={}",
            self.status,
            self.department_id.as_ref().map_or("-", DepartmentId::value),
            self.assignee_user_id.as_ref().map_or("-", UserId::value),
            self.return_count
        )
    }
}

/// An immutable audit event representing a complaint transition.
///
/// Every successful transition produces exactly one audit event capturing
/// who acted, what they did, and the complaint state before and after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The action that was performed.
    pub action: Action,
    /// The complaint the action was performed on.
    pub complaint_id: ComplaintId,
    /// The state before the transition.
    pub before: StateSnapshot,
    /// The state after the transition.
    pub after: StateSnapshot,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`.
    ///
    /// # Arguments
    ///
    /// * `actor` - The actor who initiated the change
    /// * `action` - The action that was performed
    /// * `complaint_id` - The complaint that changed
    /// * `before` - The state before the transition
    /// * `after` - The state after the transition
    #[must_use]
    pub const fn new(
        actor: Actor,
        action: Action,
        complaint_id: ComplaintId,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            actor,
            action,
            complaint_id,
            before,
            after,
        }
    }

    /// Returns true if the transition changed the complaint status.
    #[must_use]
    pub fn changed_status(&self) -> bool {
        self.before.status != self.after.status
    }
}
