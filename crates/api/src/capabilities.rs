// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability computation for authorization-aware UI gating.
//!
//! Capabilities expose what actions an actor may perform on a complaint
//! without leaking policy internals. They are advisory only and do not
//! replace the checks in the workflow pipeline.

use complaint_desk_domain::{Complaint, ComplaintStatus};

use crate::auth::{
    AuthenticatedActor, can_act_as_principal, can_assign, can_change_department, can_mutate,
    can_write_letter,
};
use crate::request_response::{Capability, ComplaintCapabilities};

/// Computes the capabilities of an actor on a complaint.
///
/// # Arguments
///
/// * `actor` - The authenticated actor
/// * `complaint` - The complaint being viewed
#[must_use]
pub fn compute_complaint_capabilities(
    actor: &AuthenticatedActor,
    complaint: &Complaint,
) -> ComplaintCapabilities {
    let awaiting_review: bool = complaint.status == ComplaintStatus::AwaitingPrincipalReview;
    let has_letter: bool = complaint.has_employee_letter();
    let principal: bool = can_act_as_principal(actor);

    // Closed complaints are read-only for everyone
    if complaint.status.is_terminal() || !can_mutate(actor, complaint) {
        return ComplaintCapabilities::denied();
    }

    let locked: bool = awaiting_review && !actor.is_privileged();
    let writer: bool = can_write_letter(actor, complaint) && !awaiting_review;

    ComplaintCapabilities {
        can_assign: Capability::from_bool(
            !locked && can_assign(actor, complaint.department_id.as_ref()),
        ),
        can_change_department: Capability::from_bool(can_change_department(actor)),
        can_write_letter: Capability::from_bool(writer),
        can_submit: Capability::from_bool(writer && has_letter),
        can_return: Capability::from_bool(principal && awaiting_review && has_letter),
        can_close: Capability::from_bool(principal && awaiting_review && has_letter),
        can_post_message: Capability::from_bool(!locked),
        principal_actions_need_letter: principal && awaiting_review && !has_letter,
    }
}
