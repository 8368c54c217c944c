// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use complaint_desk_domain::{
    Complaint, ComplaintId, Department, DepartmentId, Directory, Reporter, Role, User,
};
use complaint_desk_persistence::{ComplaintStore, MemorySheet};

use crate::{
    ApproveAndCloseRequest, AssignRequest, AuthenticatedActor, CommittedTransition,
    SaveLetterRequest, WorkflowService,
};

pub const MANAGER: &str = "u1";
pub const ASSIGNEE: &str = "u2";
pub const OTHER_EMPLOYEE: &str = "u3";
pub const SAME_DEPT_EMPLOYEE: &str = "u4";
pub const SPORTS_MANAGER: &str = "u5";
pub const PRINCIPAL: &str = "u7";
pub const ADMIN: &str = "u9";

pub const COMPLAINT_ID: &str = "17";

pub fn create_test_directory() -> Directory {
    Directory::new(
        vec![
            User::new(MANAGER, "Maya Manager", Role::Manager, Some("d1"))
                .with_email("maya@school.example"),
            User::new(ASSIGNEE, "Avi Assignee", Role::Employee, Some("d1"))
                .with_email("not-an-address")
                .with_email("avi@school.example"),
            User::new(OTHER_EMPLOYEE, "Omer Other", Role::Employee, Some("d2"))
                .with_email("omer@school.example"),
            User::new(SAME_DEPT_EMPLOYEE, "Sara Same", Role::Employee, Some("d1")),
            User::new(SPORTS_MANAGER, "Sami Sports", Role::Manager, Some("d2"))
                .with_email("sami@school.example"),
            User::new(PRINCIPAL, "Pnina Principal", Role::Principal, None)
                .with_email("principal@school.example"),
            User::new(ADMIN, "Adam Admin", Role::Admin, None).with_email("admin@school.example"),
        ],
        vec![
            Department::new("d1", "Science", Some(MANAGER)),
            Department::new("d2", "Sports", Some(SPORTS_MANAGER)),
            Department::new("d3", "Library", None),
        ],
    )
}

pub fn actor(id: &str) -> AuthenticatedActor {
    let directory: Directory = create_test_directory();
    let user = directory
        .user(&complaint_desk_domain::UserId::new(id))
        .expect("unknown test user");
    AuthenticatedActor::from_user(user)
}

pub fn t0() -> OffsetDateTime {
    datetime!(2026-03-01 08:00 UTC)
}

pub fn at(minutes: i64) -> OffsetDateTime {
    t0() + Duration::minutes(minutes)
}

pub fn create_test_complaint(id: &str) -> Complaint {
    let mut complaint: Complaint = Complaint::new(
        ComplaintId::new(id),
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

pub fn store_with(complaints: &[Complaint]) -> ComplaintStore<MemorySheet> {
    let mut store: ComplaintStore<MemorySheet> = ComplaintStore::new(MemorySheet::new());
    for complaint in complaints {
        store.append(complaint).unwrap();
    }
    store
}

pub fn id() -> ComplaintId {
    ComplaintId::new(COMPLAINT_ID)
}

pub fn assign_to(user: Option<&str>) -> AssignRequest {
    AssignRequest {
        assignee_user_id: user.map(str::to_string),
    }
}

pub fn letter(body: &str) -> SaveLetterRequest {
    SaveLetterRequest {
        body: body.to_string(),
    }
}

pub fn close_request() -> ApproveAndCloseRequest {
    ApproveAndCloseRequest {
        justified: Some(true),
        summary: String::from("טופל במלואו"),
        signed_by_user_id: String::from(PRINCIPAL),
        signature_image_path: None,
    }
}

/// Drives the stored complaint to ASSIGNED, IN_PROGRESS and then
/// AWAITING_PRINCIPAL_REVIEW, one minute apart.
pub fn drive_to_review(
    service: &WorkflowService<'_>,
    store: &mut ComplaintStore<MemorySheet>,
) -> CommittedTransition {
    service
        .assign(store, Some(MANAGER), &id(), assign_to(Some(ASSIGNEE)), at(1))
        .unwrap();
    service
        .save_letter(store, Some(ASSIGNEE), &id(), letter("טיפלתי"), at(2))
        .unwrap();
    service
        .submit_for_review(store, Some(ASSIGNEE), &id(), at(3))
        .unwrap()
}
