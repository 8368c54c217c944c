// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{Command, ComplaintPatch};
use crate::error::CoreError;
use crate::state::TransitionResult;
use complaint_desk_audit::{Action, Actor, AuditEvent, StateSnapshot};
use complaint_desk_domain::{
    AssigneeLetter, Complaint, ComplaintStatus, DepartmentId, Directory, DomainError, Message,
    PrincipalReview, ReturnInfo, ReviewCycle, UserId, validate_closure_summary,
    validate_letter_body, validate_message_body, validate_message_extension,
    validate_return_reason, validate_signer,
};
use time::OffsetDateTime;

/// Applies a command to a complaint, producing the next complaint and an
/// audit event.
///
/// This function is pure: it checks the lifecycle preconditions of the
/// command and computes the next record in memory. Authorization is the
/// caller's responsibility and must happen before this is called.
///
/// # Arguments
///
/// * `complaint` - The current complaint (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `directory` - Directory snapshot used to resolve users and departments
/// * `now` - The transition timestamp, becomes `updated_at`
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the next complaint and audit event
/// * `Err(CoreError)` if the command is invalid in the current state
///
/// # Errors
///
/// Returns an error if:
/// - The complaint is closed
/// - The command's state precondition is not met
/// - The command's input fails validation
pub fn apply(
    complaint: &Complaint,
    command: Command,
    actor: Actor,
    directory: &Directory,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    if complaint.status.is_terminal() {
        return Err(CoreError::DomainViolation(DomainError::ComplaintClosed {
            complaint_id: complaint.id.value().to_string(),
        }));
    }

    let actor_id: UserId = UserId::new(&actor.id);
    let action_name: &'static str = command.name();
    let mut next: Complaint = complaint.clone();

    let details: Option<String> = match command {
        Command::Assign { assignee_user_id } => {
            let details: String = describe_assignee(assignee_user_id.as_ref());
            set_assignee(&mut next, assignee_user_id, &actor_id, directory, now)?;
            Some(details)
        }
        Command::ChangeDepartment {
            department_id,
            clear_assignee_if_not_in_department,
        } => {
            let details: String = describe_department(department_id.as_ref());
            set_department(
                &mut next,
                department_id,
                clear_assignee_if_not_in_department,
                &actor_id,
                directory,
                now,
            )?;
            Some(details)
        }
        Command::PostMessage { body } => {
            let body: String = validate_message_body(&body)?;
            append_message(&mut next, &actor_id, body, now);
            None
        }
        Command::SaveLetter { body } => {
            save_letter(&mut next, &actor_id, &body, now)?;
            None
        }
        Command::SubmitForReview => {
            submit_for_review(&mut next, &actor_id, now)?;
            None
        }
        Command::ReturnForRedo { reason } => {
            let reason: String = return_for_redo(&mut next, &actor_id, &reason, now)?;
            Some(reason)
        }
        Command::ApproveAndClose {
            justified,
            summary,
            signed_by_user_id,
            signature_image_path,
        } => {
            approve_and_close(
                &mut next,
                &actor_id,
                ClosureDecision {
                    justified,
                    summary: &summary,
                    signed_by_user_id: &signed_by_user_id,
                    signature_image_path,
                },
                now,
            )?;
            Some(format!("justified={justified}"))
        }
        Command::Patch(patch) => Some(apply_patch(&mut next, patch, &actor_id, directory, now)?),
    };

    next.updated_at = now;

    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        Action::new(String::from(action_name), details),
        complaint.id.clone(),
        StateSnapshot::of(complaint),
        StateSnapshot::of(&next),
    );

    Ok(TransitionResult {
        new_complaint: next,
        audit_event,
    })
}

fn describe_assignee(assignee: Option<&UserId>) -> String {
    assignee.map_or_else(
        || String::from("unassigned"),
        |id| format!("assigned to {id}"),
    )
}

fn describe_department(department: Option<&DepartmentId>) -> String {
    department.map_or_else(
        || String::from("department cleared"),
        |id| format!("moved to department {id}"),
    )
}

/// Moves the complaint to `status`, enforcing the lifecycle edges.
fn transition(complaint: &mut Complaint, status: ComplaintStatus) -> Result<(), DomainError> {
    complaint.status.validate_transition(status)?;
    complaint.status = status;
    Ok(())
}

/// Sets or clears the assignee.
///
/// The status follows the assignee: `ASSIGNED` with one, `OPEN` without.
/// A new assignee starts from a clean slate, so the previous assignee's
/// letter and any pending return are dropped. Leaving review this way
/// withdraws the open review cycle and the letter's submission.
fn set_assignee(
    complaint: &mut Complaint,
    assignee: Option<UserId>,
    actor: &UserId,
    directory: &Directory,
    now: OffsetDateTime,
) -> Result<(), DomainError> {
    if let Some(user_id) = &assignee {
        if complaint.department_id.is_none() {
            return Err(DomainError::NoDepartment);
        }
        if directory.user(user_id).is_none() {
            return Err(DomainError::UnknownUser(user_id.value().to_string()));
        }
    }

    let status: ComplaintStatus = if assignee.is_some() {
        ComplaintStatus::Assigned
    } else {
        ComplaintStatus::Open
    };
    let was_in_review: bool = complaint.status == ComplaintStatus::AwaitingPrincipalReview;
    transition(complaint, status)?;
    if was_in_review {
        withdraw_review(complaint, actor, now);
    }

    if complaint.assignee_user_id != assignee {
        complaint.assignee_letter = None;
    }
    if assignee.is_some() {
        complaint.return_info = None;
    }
    complaint.assignee_user_id = assignee;
    Ok(())
}

/// Closes the open review cycle without a decision.
fn withdraw_review(complaint: &mut Complaint, actor: &UserId, now: OffsetDateTime) {
    if let Some(cycle) = complaint
        .review_cycles
        .last_mut()
        .filter(|cycle| cycle.is_open())
    {
        cycle.withdrawn_at = Some(now);
        cycle.withdrawn_by_user_id = Some(actor.clone());
    }
    if let Some(letter) = complaint.assignee_letter.as_mut() {
        letter.submitted_at = None;
    }
}

fn set_department(
    complaint: &mut Complaint,
    department: Option<DepartmentId>,
    clear_assignee_if_not_in_department: bool,
    actor: &UserId,
    directory: &Directory,
    now: OffsetDateTime,
) -> Result<(), DomainError> {
    if let Some(unknown) = department
        .as_ref()
        .filter(|id| directory.department(id).is_none())
    {
        return Err(DomainError::UnknownDepartment(unknown.value().to_string()));
    }

    let assignee_still_valid: bool = match (&complaint.assignee_user_id, &department) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(assignee), Some(department_id)) => {
            directory.is_assignable_in(assignee, department_id)
        }
    };

    complaint.department_id = department;

    if clear_assignee_if_not_in_department && !assignee_still_valid {
        set_assignee(complaint, None, actor, directory, now)?;
    }
    Ok(())
}

fn append_message(complaint: &mut Complaint, author: &UserId, body: String, now: OffsetDateTime) {
    let message: Message = Message {
        id: complaint.next_message_id(),
        author_id: author.clone(),
        body,
        created_at: now,
    };
    complaint.messages.push(message);
}

fn save_letter(
    complaint: &mut Complaint,
    author: &UserId,
    body: &str,
    now: OffsetDateTime,
) -> Result<(), DomainError> {
    if complaint.status == ComplaintStatus::AwaitingPrincipalReview {
        return Err(DomainError::AwaitingPrincipalReview {
            complaint_id: complaint.id.value().to_string(),
        });
    }
    if complaint.assignee_user_id.is_none() {
        return Err(DomainError::NoAssignee);
    }
    let body: String = validate_letter_body(body)?;

    transition(complaint, ComplaintStatus::InProgress)?;

    // The message trail stays the source the letter can be rebuilt from.
    append_message(complaint, author, body.clone(), now);
    complaint.assignee_letter = Some(AssigneeLetter {
        body,
        author_user_id: author.clone(),
        updated_at: now,
        submitted_at: None,
    });
    complaint.return_info = None;
    Ok(())
}

fn submit_for_review(
    complaint: &mut Complaint,
    submitter: &UserId,
    now: OffsetDateTime,
) -> Result<(), DomainError> {
    if complaint.status == ComplaintStatus::AwaitingPrincipalReview {
        return Err(DomainError::AwaitingPrincipalReview {
            complaint_id: complaint.id.value().to_string(),
        });
    }
    if complaint.assignee_user_id.is_none() {
        return Err(DomainError::NoAssignee);
    }

    complaint.restore_letter_from_messages();
    let Some(letter) = complaint
        .assignee_letter
        .as_mut()
        .filter(|letter| letter.has_body())
    else {
        return Err(DomainError::EmptyLetter);
    };
    letter.submitted_at = Some(now);

    transition(complaint, ComplaintStatus::AwaitingPrincipalReview)?;
    complaint
        .review_cycles
        .push(ReviewCycle::new(now, submitter.clone()));
    Ok(())
}

/// Checks the shared preconditions of the two principal decisions.
fn require_reviewable_letter(complaint: &mut Complaint) -> Result<(), DomainError> {
    if complaint.status != ComplaintStatus::AwaitingPrincipalReview {
        return Err(DomainError::NotAwaitingPrincipalReview {
            status: complaint.status.as_str().to_string(),
        });
    }
    complaint.restore_letter_from_messages();
    if !complaint.has_employee_letter() {
        return Err(DomainError::NoLetterToReview);
    }
    Ok(())
}

/// Returns the review cycle the principal is deciding on.
///
/// Records written before review cycles were tracked may lack one; a cycle
/// is opened from the letter in that case.
fn current_review_cycle(complaint: &mut Complaint) -> &mut ReviewCycle {
    let needs_cycle: bool = complaint
        .review_cycles
        .last()
        .is_none_or(|cycle| !cycle.is_open());

    if needs_cycle {
        let (submitted_at, submitted_by): (OffsetDateTime, UserId) = complaint
            .assignee_letter
            .as_ref()
            .map_or_else(
                || (complaint.updated_at, UserId::new("")),
                |letter| {
                    (
                        letter.submitted_at.unwrap_or(letter.updated_at),
                        letter.author_user_id.clone(),
                    )
                },
            );
        complaint
            .review_cycles
            .push(ReviewCycle::new(submitted_at, submitted_by));
    }

    let last: usize = complaint.review_cycles.len() - 1;
    &mut complaint.review_cycles[last]
}

fn return_for_redo(
    complaint: &mut Complaint,
    principal: &UserId,
    reason: &str,
    now: OffsetDateTime,
) -> Result<String, DomainError> {
    require_reviewable_letter(complaint)?;
    let reason: String = validate_return_reason(reason)?;

    let count: u32 = complaint.lifetime_return_count().saturating_add(1);

    let cycle: &mut ReviewCycle = current_review_cycle(complaint);
    cycle.returned_at = Some(now);
    cycle.return_reason = Some(reason.clone());
    cycle.returned_by_user_id = Some(principal.clone());

    transition(complaint, ComplaintStatus::InProgress)?;
    complaint.return_info = Some(ReturnInfo {
        count,
        reason: reason.clone(),
        returned_at: now,
        returned_by_user_id: principal.clone(),
    });
    complaint.principal_review = None;
    if let Some(letter) = complaint.assignee_letter.as_mut() {
        letter.submitted_at = None;
    }
    Ok(reason)
}

/// Inputs of the closing decision.
struct ClosureDecision<'a> {
    justified: bool,
    summary: &'a str,
    signed_by_user_id: &'a str,
    signature_image_path: Option<String>,
}

fn approve_and_close(
    complaint: &mut Complaint,
    principal: &UserId,
    decision: ClosureDecision<'_>,
    now: OffsetDateTime,
) -> Result<(), DomainError> {
    require_reviewable_letter(complaint)?;
    let summary: String = validate_closure_summary(decision.summary)?;
    let signer: UserId = validate_signer(decision.signed_by_user_id)?;

    let cycle: &mut ReviewCycle = current_review_cycle(complaint);
    cycle.approved_at = Some(now);
    cycle.principal_user_id = Some(principal.clone());
    cycle.justified = Some(decision.justified);
    cycle.summary = Some(summary.clone());

    transition(complaint, ComplaintStatus::Closed)?;
    complaint.principal_review = Some(PrincipalReview {
        justified: decision.justified,
        summary,
        signed_by_user_id: signer,
        signed_at: now,
        signature_image_path: decision
            .signature_image_path
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty()),
    });
    complaint.return_info = None;
    Ok(())
}

/// Applies a generic patch: department first, then assignee against the
/// effective department, then appended messages.
fn apply_patch(
    complaint: &mut Complaint,
    patch: ComplaintPatch,
    author: &UserId,
    directory: &Directory,
    now: OffsetDateTime,
) -> Result<String, CoreError> {
    if patch.is_empty() {
        return Err(CoreError::EmptyPatch);
    }

    let mut changes: Vec<String> = Vec::new();

    if let Some(department) = patch.department_id {
        changes.push(describe_department(department.as_ref()));
        set_department(complaint, department, true, author, directory, now)?;
    }

    if let Some(assignee) = patch.assignee_user_id {
        changes.push(describe_assignee(assignee.as_ref()));
        set_assignee(complaint, assignee, author, directory, now)?;
    }

    if let Some(messages) = patch.messages {
        let appended: Vec<Message> =
            validate_message_extension(&complaint.messages, &messages, author)?.to_vec();
        changes.push(format!("{} message(s) appended", appended.len()));
        // Appended entries always get a server-issued id.
        for message in appended {
            let body: String = validate_message_body(&message.body)?;
            let id: String = complaint.next_message_id();
            complaint.messages.push(Message {
                id,
                author_id: author.clone(),
                body,
                created_at: now,
            });
        }
    }

    Ok(changes.join(", "))
}
