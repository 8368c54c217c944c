// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Access policy tests.

use complaint_desk::ComplaintField;
use complaint_desk_domain::{Complaint, ComplaintStatus, DepartmentId, Directory, Role, UserId};

use crate::{
    AuthError, AuthenticatedActor, AuthenticationService, AuthorizationService, REVIEW_LOCK_CODE,
    can_act_as_principal, can_assign, can_change_department, can_mutate, can_read,
    can_write_letter, review_lock_violation,
};

use super::helpers::{
    ADMIN, ASSIGNEE, MANAGER, OTHER_EMPLOYEE, PRINCIPAL, SAME_DEPT_EMPLOYEE, SPORTS_MANAGER,
    actor, create_test_complaint, create_test_directory,
};

fn assigned_complaint() -> Complaint {
    let mut complaint: Complaint = create_test_complaint("17");
    complaint.assignee_user_id = Some(UserId::new(ASSIGNEE));
    complaint.status = ComplaintStatus::Assigned;
    complaint
}

fn awaiting_complaint() -> Complaint {
    let mut complaint: Complaint = assigned_complaint();
    complaint.status = ComplaintStatus::AwaitingPrincipalReview;
    complaint
}

// ============================================================================
// Authentication
// ============================================================================

#[test]
fn test_resolve_actor_from_directory() {
    let directory: Directory = create_test_directory();

    let resolved: AuthenticatedActor =
        AuthenticationService::resolve_actor(&directory, Some(" u1 ")).unwrap();

    assert_eq!(resolved.user_id, UserId::new(MANAGER));
    assert_eq!(resolved.role, Role::Manager);
    assert_eq!(resolved.department_id, Some(DepartmentId::new("d1")));
    assert_eq!(resolved.name, "Maya Manager");
}

#[test]
fn test_resolve_actor_rejects_missing_credential() {
    let directory: Directory = create_test_directory();

    for credential in [None, Some(""), Some("   ")] {
        let result = AuthenticationService::resolve_actor(&directory, credential);
        assert!(matches!(result, Err(AuthError::Unauthenticated { .. })));
    }
}

#[test]
fn test_resolve_actor_rejects_unknown_user() {
    let directory: Directory = create_test_directory();

    let result = AuthenticationService::resolve_actor(&directory, Some("ghost"));

    assert!(matches!(result, Err(AuthError::Unauthenticated { .. })));
}

#[test]
fn test_audit_actor_carries_id_and_role() {
    let audit = actor(PRINCIPAL).to_audit_actor();

    assert_eq!(audit.id, PRINCIPAL);
    assert_eq!(audit.actor_type, "PRINCIPAL");
}

// ============================================================================
// Visibility
// ============================================================================

#[test]
fn test_privileged_roles_read_everything() {
    let mut complaint: Complaint = create_test_complaint("17");
    complaint.department_id = None;

    assert!(can_read(&actor(ADMIN), &complaint));
    assert!(can_read(&actor(PRINCIPAL), &complaint));
}

#[test]
fn test_manager_reads_own_department_only() {
    let complaint: Complaint = create_test_complaint("17");

    assert!(can_read(&actor(MANAGER), &complaint));
    assert!(!can_read(&actor(SPORTS_MANAGER), &complaint));
}

#[test]
fn test_manager_without_department_match_reads_nothing() {
    let mut complaint: Complaint = create_test_complaint("17");
    complaint.department_id = None;

    assert!(!can_read(&actor(MANAGER), &complaint));
}

#[test]
fn test_employee_reads_only_assigned() {
    let complaint: Complaint = assigned_complaint();

    assert!(can_read(&actor(ASSIGNEE), &complaint));
    assert!(!can_read(&actor(SAME_DEPT_EMPLOYEE), &complaint));
    assert!(!can_read(&actor(OTHER_EMPLOYEE), &complaint));
}

#[test]
fn test_mutate_matches_read() {
    let complaint: Complaint = assigned_complaint();

    for user in [ADMIN, PRINCIPAL, MANAGER, SPORTS_MANAGER, ASSIGNEE, OTHER_EMPLOYEE] {
        let who: AuthenticatedActor = actor(user);
        assert_eq!(can_read(&who, &complaint), can_mutate(&who, &complaint));
    }
}

// ============================================================================
// Operation predicates
// ============================================================================

#[test]
fn test_change_department_is_privileged() {
    assert!(can_change_department(&actor(ADMIN)));
    assert!(can_change_department(&actor(PRINCIPAL)));
    assert!(!can_change_department(&actor(MANAGER)));
    assert!(!can_change_department(&actor(ASSIGNEE)));
}

#[test]
fn test_assign_depends_on_effective_department() {
    let d1: DepartmentId = DepartmentId::new("d1");
    let d2: DepartmentId = DepartmentId::new("d2");

    assert!(can_assign(&actor(MANAGER), Some(&d1)));
    assert!(!can_assign(&actor(MANAGER), Some(&d2)));
    assert!(!can_assign(&actor(MANAGER), None));
    assert!(can_assign(&actor(ADMIN), None));
    assert!(can_assign(&actor(PRINCIPAL), Some(&d2)));
    assert!(!can_assign(&actor(ASSIGNEE), Some(&d1)));
}

#[test]
fn test_only_assignee_writes_letter() {
    let complaint: Complaint = assigned_complaint();

    assert!(can_write_letter(&actor(ASSIGNEE), &complaint));
    assert!(!can_write_letter(&actor(MANAGER), &complaint));
    assert!(!can_write_letter(&actor(PRINCIPAL), &complaint));
    assert!(!can_write_letter(&actor(ASSIGNEE), &create_test_complaint("18")));
}

#[test]
fn test_principal_actions() {
    assert!(can_act_as_principal(&actor(PRINCIPAL)));
    assert!(can_act_as_principal(&actor(ADMIN)));
    assert!(!can_act_as_principal(&actor(MANAGER)));
}

// ============================================================================
// Review field lock
// ============================================================================

#[test]
fn test_field_lock_applies_to_non_privileged_during_review() {
    let complaint: Complaint = awaiting_complaint();

    let violation = review_lock_violation(
        &actor(MANAGER),
        &complaint,
        &[ComplaintField::DepartmentId, ComplaintField::Messages],
    );

    assert_eq!(violation, Some(ComplaintField::Messages));
}

#[test]
fn test_field_lock_ignores_unlocked_fields() {
    let complaint: Complaint = awaiting_complaint();

    let violation = review_lock_violation(
        &actor(MANAGER),
        &complaint,
        &[ComplaintField::DepartmentId],
    );

    assert_eq!(violation, None);
}

#[test]
fn test_field_lock_exempts_privileged() {
    let complaint: Complaint = awaiting_complaint();
    let touched: [ComplaintField; 2] = [ComplaintField::Messages, ComplaintField::AssigneeUserId];

    assert_eq!(review_lock_violation(&actor(PRINCIPAL), &complaint, &touched), None);
    assert_eq!(review_lock_violation(&actor(ADMIN), &complaint, &touched), None);
}

#[test]
fn test_field_lock_only_during_review() {
    let complaint: Complaint = assigned_complaint();

    let violation = review_lock_violation(
        &actor(ASSIGNEE),
        &complaint,
        &[ComplaintField::AssigneeLetter],
    );

    assert_eq!(violation, None);
}

#[test]
fn test_authorize_field_lock_reports_review_lock_code() {
    let complaint: Complaint = awaiting_complaint();

    let err = AuthorizationService::authorize_field_lock(
        &actor(ASSIGNEE),
        &complaint,
        &[ComplaintField::AssigneeLetter],
        "SaveLetter",
    )
    .unwrap_err();

    match err {
        AuthError::Forbidden { action, code, .. } => {
            assert_eq!(action, "SaveLetter");
            assert_eq!(code, REVIEW_LOCK_CODE);
        }
        AuthError::Unauthenticated { .. } => panic!("expected Forbidden"),
    }
}

// ============================================================================
// Authorization service
// ============================================================================

#[test]
fn test_authorize_admin_rejects_everyone_else() {
    assert!(AuthorizationService::authorize_admin(&actor(ADMIN), "repair").is_ok());

    for user in [PRINCIPAL, MANAGER, ASSIGNEE] {
        let result = AuthorizationService::authorize_admin(&actor(user), "repair");
        assert!(matches!(
            result,
            Err(AuthError::Forbidden { ref code, .. }) if code == "not_admin"
        ));
    }
}

#[test]
fn test_authorize_read_reports_not_visible() {
    let complaint: Complaint = create_test_complaint("17");

    let result = AuthorizationService::authorize_read(&actor(SPORTS_MANAGER), &complaint);

    assert!(matches!(
        result,
        Err(AuthError::Forbidden { ref code, .. }) if code == "not_visible"
    ));
}
