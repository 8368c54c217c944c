// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The complaint workflow pipeline.
//!
//! Every operation runs the same ordering: load the record, resolve the
//! actor, check scope, apply the review field lock, check the
//! operation-specific permission, apply the transition, then commit it with
//! a compare-and-swap on `updated_at`.
//!
//! `prepare` and `commit` are split so that a caller sharing the store can
//! hold its lock only around the read and the write.

use time::OffsetDateTime;
use tracing::{debug, info};

use complaint_desk::{Command, TransitionResult, apply};
use complaint_desk_audit::AuditEvent;
use complaint_desk_domain::{Complaint, ComplaintId, DepartmentId, Directory};
use complaint_desk_persistence::{ComplaintStore, SheetBackend};

use crate::auth::{AuthenticatedActor, AuthenticationService, AuthorizationService};
use crate::capabilities::compute_complaint_capabilities;
use crate::error::{ApiError, translate_core_error, translate_persistence_error};
use crate::notifications::{
    ClosureArtifact, ClosureArtifactRenderer, Notification, plan_notifications,
};
use crate::query::{ListQuery, list_complaints, visible_complaints};
use crate::request_response::{
    ApproveAndCloseRequest, AssignRequest, AssignableUserInfo, AssignableUsersResponse,
    ChangeDepartmentRequest, ComplaintListResponse, ComplaintResponse, ComplaintStatsResponse,
    ListComplaintsRequest, PatchComplaintRequest, PostMessageRequest, RepairNullCellsResponse,
    ReturnForRedoRequest, SaveLetterRequest,
};
use crate::stats::complaint_stats;

/// A validated transition that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransition {
    /// The record as loaded; its `updated_at` is the expected version.
    pub before: Complaint,
    /// The record to write.
    pub after: Complaint,
    pub audit_event: AuditEvent,
}

/// A transition that has been written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedTransition {
    pub complaint: Complaint,
    pub audit_event: AuditEvent,
    /// Notifications to hand to the dispatcher.
    pub notifications: Vec<Notification>,
}

/// Runs complaint operations against a directory snapshot.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowService<'a> {
    directory: &'a Directory,
    app_url: Option<&'a str>,
}

impl<'a> WorkflowService<'a> {
    /// Creates a workflow service.
    ///
    /// # Arguments
    ///
    /// * `directory` - The directory snapshot
    /// * `app_url` - Base URL used for links in notifications
    #[must_use]
    pub const fn new(directory: &'a Directory, app_url: Option<&'a str>) -> Self {
        Self { directory, app_url }
    }

    #[must_use]
    pub const fn directory(&self) -> &'a Directory {
        self.directory
    }

    /// Resolves the request credential.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthenticated` if the credential names no user.
    pub fn authenticate(&self, credential: Option<&str>) -> Result<AuthenticatedActor, ApiError> {
        Ok(AuthenticationService::resolve_actor(
            self.directory,
            credential,
        )?)
    }

    /// Returns a loaded complaint with the actor's capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is unauthenticated or may not see the
    /// complaint.
    pub fn view(
        &self,
        complaint: Complaint,
        credential: Option<&str>,
    ) -> Result<ComplaintResponse, ApiError> {
        let actor: AuthenticatedActor = self.authenticate(credential)?;
        AuthorizationService::authorize_read(&actor, &complaint)?;

        let capabilities = compute_complaint_capabilities(&actor, &complaint);
        Ok(ComplaintResponse {
            complaint,
            capabilities,
        })
    }

    /// Validates and applies a command to a loaded complaint.
    ///
    /// Nothing is written; pass the result to `commit`.
    ///
    /// # Arguments
    ///
    /// * `current` - The complaint as loaded from the store
    /// * `credential` - The request credential
    /// * `command` - The command to apply
    /// * `now` - The transition timestamp
    ///
    /// # Errors
    ///
    /// Returns, in this order of precedence:
    /// - `Unauthenticated` if the credential names no user
    /// - `Forbidden` if the complaint is outside the actor's scope, a
    ///   review-locked field is touched, or the operation is not permitted
    /// - `InvalidState` or `InvalidInput` if the transition is rejected
    pub fn prepare(
        &self,
        current: &Complaint,
        credential: Option<&str>,
        command: Command,
        now: OffsetDateTime,
    ) -> Result<PreparedTransition, ApiError> {
        let actor: AuthenticatedActor = self.authenticate(credential)?;
        let action: &'static str = command.name();

        AuthorizationService::authorize_mutate(&actor, current, action)?;
        AuthorizationService::authorize_field_lock(
            &actor,
            current,
            &command.touched_fields(),
            action,
        )?;
        authorize_operation(&actor, current, &command)?;

        let result: TransitionResult = apply(
            current,
            command,
            actor.to_audit_actor(),
            self.directory,
            now,
        )
        .map_err(translate_core_error)?;

        debug!(
            complaint_id = current.id.value(),
            actor_id = actor.user_id.value(),
            action,
            "Transition prepared"
        );

        Ok(PreparedTransition {
            before: current.clone(),
            after: result.new_complaint,
            audit_event: result.audit_event,
        })
    }

    /// Writes a prepared transition and plans its notifications.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the row disappeared, `Conflict` if the
    /// record changed since it was loaded, or `StoreUnavailable` if the
    /// store cannot be reached.
    pub fn commit<B: SheetBackend>(
        &self,
        store: &mut ComplaintStore<B>,
        prepared: PreparedTransition,
    ) -> Result<CommittedTransition, ApiError> {
        store
            .commit(&prepared.before, &prepared.after)
            .map_err(translate_persistence_error)?;

        let event: &AuditEvent = &prepared.audit_event;
        info!(
            complaint_id = event.complaint_id.value(),
            actor_id = event.actor.id.as_str(),
            action = event.action.name.as_str(),
            details = event.action.details.as_deref(),
            status = prepared.after.status.as_str(),
            before = %event.before,
            after = %event.after,
            "Complaint transition committed"
        );

        let notifications: Vec<Notification> = plan_notifications(
            &prepared.before,
            &prepared.after,
            self.directory,
            self.app_url,
        );

        Ok(CommittedTransition {
            complaint: prepared.after,
            audit_event: prepared.audit_event,
            notifications,
        })
    }

    /// Loads, validates, applies and commits a command.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the complaint does not exist, then any
    /// error of `prepare` or `commit`.
    pub fn execute<B: SheetBackend>(
        &self,
        store: &mut ComplaintStore<B>,
        credential: Option<&str>,
        id: &ComplaintId,
        command: Command,
        now: OffsetDateTime,
    ) -> Result<CommittedTransition, ApiError> {
        let current: Complaint = store.load(id).map_err(translate_persistence_error)?;
        let prepared: PreparedTransition = self.prepare(&current, credential, command, now)?;
        self.commit(store, prepared)
    }

    /// Gets one complaint with capabilities.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound`, `Unauthenticated` or `Forbidden`.
    pub fn get_complaint<B: SheetBackend>(
        &self,
        store: &mut ComplaintStore<B>,
        credential: Option<&str>,
        id: &ComplaintId,
    ) -> Result<ComplaintResponse, ApiError> {
        let complaint: Complaint = store.load(id).map_err(translate_persistence_error)?;
        self.view(complaint, credential)
    }

    /// Assigns, reassigns or unassigns a complaint.
    ///
    /// # Errors
    ///
    /// See `execute`.
    pub fn assign<B: SheetBackend>(
        &self,
        store: &mut ComplaintStore<B>,
        credential: Option<&str>,
        id: &ComplaintId,
        request: AssignRequest,
        now: OffsetDateTime,
    ) -> Result<CommittedTransition, ApiError> {
        self.execute(store, credential, id, request.into_command(), now)
    }

    /// Moves a complaint to another department.
    ///
    /// # Errors
    ///
    /// See `execute`.
    pub fn change_department<B: SheetBackend>(
        &self,
        store: &mut ComplaintStore<B>,
        credential: Option<&str>,
        id: &ComplaintId,
        request: ChangeDepartmentRequest,
        now: OffsetDateTime,
    ) -> Result<CommittedTransition, ApiError> {
        self.execute(store, credential, id, request.into_command(), now)
    }

    /// Posts a message.
    ///
    /// # Errors
    ///
    /// See `execute`.
    pub fn post_message<B: SheetBackend>(
        &self,
        store: &mut ComplaintStore<B>,
        credential: Option<&str>,
        id: &ComplaintId,
        request: PostMessageRequest,
        now: OffsetDateTime,
    ) -> Result<CommittedTransition, ApiError> {
        self.execute(store, credential, id, request.into_command(), now)
    }

    /// Saves the assignee letter.
    ///
    /// # Errors
    ///
    /// See `execute`.
    pub fn save_letter<B: SheetBackend>(
        &self,
        store: &mut ComplaintStore<B>,
        credential: Option<&str>,
        id: &ComplaintId,
        request: SaveLetterRequest,
        now: OffsetDateTime,
    ) -> Result<CommittedTransition, ApiError> {
        self.execute(store, credential, id, request.into_command(), now)
    }

    /// Submits the letter for principal review.
    ///
    /// # Errors
    ///
    /// See `execute`.
    pub fn submit_for_review<B: SheetBackend>(
        &self,
        store: &mut ComplaintStore<B>,
        credential: Option<&str>,
        id: &ComplaintId,
        now: OffsetDateTime,
    ) -> Result<CommittedTransition, ApiError> {
        self.execute(store, credential, id, Command::SubmitForReview, now)
    }

    /// Returns the complaint to the assignee.
    ///
    /// # Errors
    ///
    /// See `execute`.
    pub fn return_for_redo<B: SheetBackend>(
        &self,
        store: &mut ComplaintStore<B>,
        credential: Option<&str>,
        id: &ComplaintId,
        request: ReturnForRedoRequest,
        now: OffsetDateTime,
    ) -> Result<CommittedTransition, ApiError> {
        self.execute(store, credential, id, request.into_command(), now)
    }

    /// Approves the letter and closes the complaint.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `justified` is missing, otherwise see
    /// `execute`.
    pub fn approve_and_close<B: SheetBackend>(
        &self,
        store: &mut ComplaintStore<B>,
        credential: Option<&str>,
        id: &ComplaintId,
        request: ApproveAndCloseRequest,
        now: OffsetDateTime,
    ) -> Result<CommittedTransition, ApiError> {
        let command: Command = request.into_command()?;
        self.execute(store, credential, id, command, now)
    }

    /// Applies the generic complaint patch.
    ///
    /// # Errors
    ///
    /// See `execute`.
    pub fn patch_complaint<B: SheetBackend>(
        &self,
        store: &mut ComplaintStore<B>,
        credential: Option<&str>,
        id: &ComplaintId,
        request: PatchComplaintRequest,
        now: OffsetDateTime,
    ) -> Result<CommittedTransition, ApiError> {
        let command: Command = Command::Patch(request.into_patch(now));
        self.execute(store, credential, id, command, now)
    }

    /// Lists one page of the complaints visible to the actor.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated`, or `InvalidInput` for bad parameters.
    pub fn list(
        &self,
        complaints: Vec<Complaint>,
        credential: Option<&str>,
        request: ListComplaintsRequest,
    ) -> Result<ComplaintListResponse, ApiError> {
        let actor: AuthenticatedActor = self.authenticate(credential)?;
        let query: ListQuery = ListQuery::from_request(request)?;
        list_complaints(&actor, complaints, &query)
    }

    /// Computes statistics over the complaints visible to the actor.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` if the credential names no user.
    pub fn stats(
        &self,
        complaints: Vec<Complaint>,
        credential: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<ComplaintStatsResponse, ApiError> {
        let actor: AuthenticatedActor = self.authenticate(credential)?;
        let visible: Vec<Complaint> = visible_complaints(&actor, complaints);
        Ok(ComplaintStatsResponse {
            stats: complaint_stats(&visible, self.directory, now),
        })
    }

    /// Lists the users a department's complaints may be assigned to.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated`, or `ResourceNotFound` for an unknown
    /// department.
    pub fn assignable_users(
        &self,
        credential: Option<&str>,
        department_id: &str,
    ) -> Result<AssignableUsersResponse, ApiError> {
        self.authenticate(credential)?;
        let department_id: DepartmentId = DepartmentId::new(department_id);
        if self.directory.department(&department_id).is_none() {
            return Err(ApiError::ResourceNotFound {
                resource_type: String::from("Department"),
                message: format!("Department {department_id} not found"),
            });
        }

        let users: Vec<AssignableUserInfo> = self
            .directory
            .assignable_users_for_department(&department_id)
            .into_iter()
            .map(AssignableUserInfo::from)
            .collect();

        Ok(AssignableUsersResponse {
            department_id: department_id.value().to_string(),
            users,
        })
    }

    /// Renders the closure artifact of a closed complaint.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` or `Forbidden` as for reads,
    /// `InvalidState` if the complaint is not closed, or `Internal` if
    /// rendering fails.
    pub fn closure_artifact(
        &self,
        complaint: &Complaint,
        credential: Option<&str>,
        renderer: &dyn ClosureArtifactRenderer,
    ) -> Result<ClosureArtifact, ApiError> {
        let actor: AuthenticatedActor = self.authenticate(credential)?;
        AuthorizationService::authorize_read(&actor, complaint)?;

        if !complaint.status.is_terminal() {
            return Err(ApiError::InvalidState {
                rule: String::from("not_closed"),
                message: format!("Complaint {} is not closed", complaint.id),
            });
        }

        renderer.render(complaint).map_err(|e| ApiError::Internal {
            message: e.to_string(),
        })
    }

    /// Rewrites literal `null` cells left behind by older writers.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated`, `Forbidden` unless the actor is ADMIN, or
    /// a store error.
    pub fn repair_null_cells<B: SheetBackend>(
        &self,
        store: &mut ComplaintStore<B>,
        credential: Option<&str>,
    ) -> Result<RepairNullCellsResponse, ApiError> {
        let actor: AuthenticatedActor = self.authenticate(credential)?;
        AuthorizationService::authorize_admin(&actor, "repair_null_cells")?;

        let repaired_rows: usize = store
            .repair_null_cells()
            .map_err(translate_persistence_error)?;
        info!(
            actor_id = actor.user_id.value(),
            repaired_rows, "Repaired null cells"
        );

        Ok(RepairNullCellsResponse { repaired_rows })
    }
}

/// Applies the permission specific to the command.
fn authorize_operation(
    actor: &AuthenticatedActor,
    complaint: &Complaint,
    command: &Command,
) -> Result<(), ApiError> {
    let action: &'static str = command.name();
    match command {
        Command::Assign { .. } => {
            AuthorizationService::authorize_assign(actor, complaint.department_id.as_ref())?;
        }
        Command::ChangeDepartment { .. } => {
            AuthorizationService::authorize_change_department(actor)?;
        }
        Command::PostMessage { .. } => {}
        Command::SaveLetter { .. } | Command::SubmitForReview => {
            AuthorizationService::authorize_write_letter(actor, complaint, action)?;
        }
        Command::ReturnForRedo { .. } | Command::ApproveAndClose { .. } => {
            AuthorizationService::authorize_principal(actor, action)?;
        }
        Command::Patch(patch) => {
            if patch.department_id.is_some() {
                AuthorizationService::authorize_change_department(actor)?;
            }
            if patch.assignee_user_id.is_some() {
                let effective: Option<&DepartmentId> = patch
                    .department_id
                    .as_ref()
                    .map_or(complaint.department_id.as_ref(), Option::as_ref);
                AuthorizationService::authorize_assign(actor, effective)?;
            }
        }
    }
    Ok(())
}
