// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod row_tests;
mod store_tests;

use complaint_desk_domain::{
    AssigneeLetter, Complaint, ComplaintId, ComplaintStatus, DepartmentId, Message, Reporter,
    UserId,
};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

pub fn t0() -> OffsetDateTime {
    datetime!(2026-03-01 08:00 UTC)
}

pub fn at(minutes: i64) -> OffsetDateTime {
    t0() + Duration::minutes(minutes)
}

/// An unassigned complaint in department `d1`.
pub fn create_test_complaint(id: &str) -> Complaint {
    let mut complaint: Complaint = Complaint::new(
        ComplaintId::new(id),
        String::from("Transport"),
        String::from("Late bus"),
        String::from("The bus was late, again."),
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

/// A complaint assigned to `u2` with a drafted letter.
pub fn create_drafted_complaint(id: &str) -> Complaint {
    let mut complaint: Complaint = create_test_complaint(id);
    complaint.status = ComplaintStatus::InProgress;
    complaint.assignee_user_id = Some(UserId::new("u2"));
    complaint.messages.push(Message {
        id: complaint.next_message_id(),
        author_id: UserId::new("u2"),
        body: String::from("Spoke with the driver."),
        created_at: at(2),
    });
    complaint.assignee_letter = Some(AssigneeLetter {
        body: String::from("Spoke with the driver."),
        author_user_id: UserId::new("u2"),
        updated_at: at(2),
        submitted_at: None,
    });
    complaint.updated_at = at(2);
    complaint
}
