// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Command, TransitionResult, apply};
use complaint_desk_audit::Actor;
use complaint_desk_domain::{
    Complaint, ComplaintId, DepartmentId, Department, Directory, Reporter, Role, User, UserId,
};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

pub const MANAGER: &str = "u1";
pub const ASSIGNEE: &str = "u2";
pub const OTHER_EMPLOYEE: &str = "u3";
pub const PRINCIPAL: &str = "u7";
pub const ADMIN: &str = "u9";

pub fn create_test_directory() -> Directory {
    Directory::new(
        vec![
            User::new(MANAGER, "Manager", Role::Manager, Some("d1")),
            User::new(ASSIGNEE, "Assignee", Role::Employee, Some("d1")),
            User::new(OTHER_EMPLOYEE, "Other", Role::Employee, Some("d2")),
            User::new(PRINCIPAL, "Principal", Role::Principal, None),
            User::new(ADMIN, "Admin", Role::Admin, None),
        ],
        vec![
            Department::new("d1", "Science", Some(MANAGER)),
            Department::new("d2", "Sports", None),
        ],
    )
}

pub fn actor(id: &str, role: Role) -> Actor {
    Actor::new(id.to_string(), role.as_str().to_string())
}

pub fn t0() -> OffsetDateTime {
    datetime!(2026-03-01 08:00 UTC)
}

pub fn at(minutes: i64) -> OffsetDateTime {
    t0() + Duration::minutes(minutes)
}

/// A freshly received complaint routed to department `d1`.
pub fn create_test_complaint() -> Complaint {
    let mut complaint: Complaint = Complaint::new(
        ComplaintId::new("17"),
        String::from("Transport"),
        String::from("Late bus"),
        String::from("The bus was late every day this week."),
        Reporter::ParentStudent {
            full_name: String::from("Dana Levi"),
            email: String::from("dana@example.org"),
            phone: String::from("050-0000000"),
            grade: String::from("7"),
            class_number: String::from("2"),
        },
        t0(),
    );
    complaint.department_id = Some(DepartmentId::new("d1"));
    complaint
}

/// Applies a command and returns the next complaint, panicking on error.
pub fn step(
    complaint: &Complaint,
    command: Command,
    actor: Actor,
    now: OffsetDateTime,
) -> Complaint {
    let result: TransitionResult =
        apply(complaint, command, actor, &create_test_directory(), now).unwrap();
    result.new_complaint
}

pub fn assigned_complaint() -> Complaint {
    step(
        &create_test_complaint(),
        Command::Assign {
            assignee_user_id: Some(UserId::new(ASSIGNEE)),
        },
        actor(MANAGER, Role::Manager),
        at(1),
    )
}

pub fn drafted_complaint() -> Complaint {
    step(
        &assigned_complaint(),
        Command::SaveLetter {
            body: String::from("טיפלתי"),
        },
        actor(ASSIGNEE, Role::Employee),
        at(2),
    )
}

pub fn awaiting_review_complaint() -> Complaint {
    step(
        &drafted_complaint(),
        Command::SubmitForReview,
        actor(ASSIGNEE, Role::Employee),
        at(3),
    )
}

pub fn close_command() -> Command {
    Command::ApproveAndClose {
        justified: true,
        summary: String::from("טופל במלואו"),
        signed_by_user_id: String::from(PRINCIPAL),
        signature_image_path: None,
    }
}

pub fn closed_complaint() -> Complaint {
    step(
        &awaiting_review_complaint(),
        close_command(),
        actor(PRINCIPAL, Role::Principal),
        at(4),
    )
}
