// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Command, ComplaintField, ComplaintPatch};
use complaint_desk_domain::DepartmentId;

fn locked(command: &Command) -> bool {
    command
        .touched_fields()
        .iter()
        .any(ComplaintField::is_review_locked)
}

#[test]
fn test_review_locked_fields() {
    assert!(ComplaintField::Messages.is_review_locked());
    assert!(ComplaintField::Status.is_review_locked());
    assert!(ComplaintField::AssigneeUserId.is_review_locked());
    assert!(ComplaintField::AssigneeLetter.is_review_locked());
    assert!(!ComplaintField::DepartmentId.is_review_locked());
    assert!(!ComplaintField::PrincipalReview.is_review_locked());
}

#[test]
fn test_assignee_side_commands_touch_locked_fields() {
    assert!(locked(&Command::SaveLetter {
        body: String::from("x"),
    }));
    assert!(locked(&Command::SubmitForReview));
    assert!(locked(&Command::PostMessage {
        body: String::from("x"),
    }));
    assert!(locked(&Command::Assign {
        assignee_user_id: None,
    }));
}

#[test]
fn test_department_only_change_is_not_locked() {
    let command: Command = Command::ChangeDepartment {
        department_id: Some(DepartmentId::new("d2")),
        clear_assignee_if_not_in_department: false,
    };
    assert_eq!(command.touched_fields(), vec![ComplaintField::DepartmentId]);
    assert!(!locked(&command));
}

#[test]
fn test_patch_touches_only_present_fields() {
    let patch: ComplaintPatch = ComplaintPatch {
        department_id: Some(Some(DepartmentId::new("d2"))),
        ..ComplaintPatch::default()
    };
    assert_eq!(
        Command::Patch(patch).touched_fields(),
        vec![ComplaintField::DepartmentId]
    );

    let patch: ComplaintPatch = ComplaintPatch {
        messages: Some(Vec::new()),
        ..ComplaintPatch::default()
    };
    assert_eq!(
        Command::Patch(patch).touched_fields(),
        vec![ComplaintField::Messages]
    );

    assert!(ComplaintPatch::default().is_empty());
}

#[test]
fn test_command_names() {
    assert_eq!(Command::SubmitForReview.name(), "SubmitForReview");
    assert_eq!(
        Command::Patch(ComplaintPatch::default()).name(),
        "PatchComplaint"
    );
    assert_eq!(ComplaintField::AssigneeUserId.as_str(), "assignee_user_id");
}
