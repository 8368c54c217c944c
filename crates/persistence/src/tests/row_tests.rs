// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{at, create_drafted_complaint, create_test_complaint, t0};
use crate::row::{COLUMNS, decode_row, encode_row, header_row, is_header};
use complaint_desk_domain::{
    Complaint, ComplaintId, ComplaintStatus, DepartmentId, Reporter, ReturnInfo, UserId,
};

fn column(name: &str) -> usize {
    COLUMNS.iter().position(|c| *c == name).unwrap()
}

fn encoded(complaint: &Complaint) -> Vec<String> {
    encode_row(complaint).unwrap()
}

// ============================================================================
// Header
// ============================================================================

#[test]
fn test_header_row_lists_all_columns() {
    let header: Vec<String> = header_row();

    assert_eq!(header.len(), 24);
    assert_eq!(header[0], "id");
    assert_eq!(header[23], "notificationEmailJSON");
    assert!(is_header(&header));
}

#[test]
fn test_data_row_is_not_header() {
    assert!(!is_header(&encoded(&create_test_complaint("17"))));
    assert!(!is_header(&[]));
}

// ============================================================================
// Encoding
// ============================================================================

#[test]
fn test_encode_writes_scalar_columns() {
    let cells: Vec<String> = encoded(&create_drafted_complaint("17"));

    assert_eq!(cells.len(), COLUMNS.len());
    assert_eq!(cells[column("id")], "17");
    assert_eq!(cells[column("createdAt")], "2026-03-01T08:00:00Z");
    assert_eq!(cells[column("updatedAt")], "2026-03-01T08:02:00Z");
    assert_eq!(cells[column("status")], "IN_PROGRESS");
    assert_eq!(cells[column("departmentId")], "d1");
    assert_eq!(cells[column("assigneeUserId")], "u2");
    assert_eq!(cells[column("reporterType")], "PARENT_STUDENT");
    assert_eq!(cells[column("reporterGrade")], "7");
    assert_eq!(cells[column("reporterJobTitle")], "");
}

#[test]
fn test_encode_writes_cleared_documents_as_empty_cells() {
    let cells: Vec<String> = encoded(&create_test_complaint("17"));

    assert_eq!(cells[column("messagesJSON")], "[]");
    assert_eq!(cells[column("assigneeLetterJSON")], "");
    assert_eq!(cells[column("returnInfoJSON")], "");
    assert_eq!(cells[column("principalReviewJSON")], "");
    assert_eq!(cells[column("notificationEmailJSON")], "");
}

#[test]
fn test_encoded_row_decodes_to_same_complaint() {
    let mut complaint: Complaint = create_drafted_complaint("17");
    complaint.return_info = Some(ReturnInfo {
        count: 2,
        reason: String::from("Add the driver's response"),
        returned_at: at(5),
        returned_by_user_id: UserId::new("u7"),
    });

    let decoded: Complaint = decode_row(&encoded(&complaint)).unwrap();

    assert_eq!(decoded, complaint);
}

#[test]
fn test_staff_reporter_survives_row() {
    let mut complaint: Complaint = create_test_complaint("18");
    complaint.reporter = Reporter::Staff {
        full_name: String::from("Noa Cohen"),
        email: String::from("noa@school.example"),
        phone: String::new(),
        job_title: String::from("Teacher"),
        department_id: Some(DepartmentId::new("d2")),
    };

    let decoded: Complaint = decode_row(&encoded(&complaint)).unwrap();

    assert_eq!(decoded.reporter, complaint.reporter);
}

// ============================================================================
// Lenient decoding
// ============================================================================

#[test]
fn test_decode_pads_short_rows() {
    let row: Vec<String> = vec![
        String::from("5"),
        String::from("2026-03-01T08:00:00Z"),
        String::new(),
        String::from("Cleanliness"),
        String::from("Dirty yard"),
        String::new(),
        String::from("OPEN"),
    ];

    let complaint: Complaint = decode_row(&row).unwrap();

    assert_eq!(complaint.id, ComplaintId::new("5"));
    assert_eq!(complaint.status, ComplaintStatus::Open);
    assert_eq!(complaint.updated_at, t0());
    assert!(complaint.messages.is_empty());
    assert!(complaint.assignee_user_id.is_none());
}

#[test]
fn test_decode_treats_null_and_malformed_json_as_empty() {
    let mut cells: Vec<String> = encoded(&create_test_complaint("17"));
    cells[column("messagesJSON")] = String::from("null");
    cells[column("returnInfoJSON")] = String::from("{not json");
    cells[column("reviewCyclesJSON")] = String::from("  ");

    let complaint: Complaint = decode_row(&cells).unwrap();

    assert!(complaint.messages.is_empty());
    assert!(complaint.return_info.is_none());
    assert!(complaint.review_cycles.is_empty());
}

#[test]
fn test_decode_skips_rows_without_required_cells() {
    let valid: Vec<String> = encoded(&create_test_complaint("17"));

    for name in ["id", "createdAt", "subject"] {
        let mut cells: Vec<String> = valid.clone();
        cells[column(name)] = String::new();
        assert!(decode_row(&cells).is_none(), "blank {name} must be skipped");
    }

    assert!(decode_row(&[]).is_none());
}

#[test]
fn test_decode_skips_unknown_status() {
    let mut cells: Vec<String> = encoded(&create_test_complaint("17"));
    cells[column("status")] = String::from("ARCHIVED");

    assert!(decode_row(&cells).is_none());
}

#[test]
fn test_decode_normalizes_ids() {
    let mut cells: Vec<String> = encoded(&create_test_complaint("17"));
    cells[column("id")] = String::from("'17");
    cells[column("departmentId")] = String::from(" d3 ");

    let complaint: Complaint = decode_row(&cells).unwrap();

    assert_eq!(complaint.id, ComplaintId::new("17"));
    assert_eq!(complaint.department_id, Some(DepartmentId::new("d3")));
}

#[test]
fn test_unrecognized_reporter_type_reads_as_parent_student() {
    let mut cells: Vec<String> = encoded(&create_test_complaint("17"));
    cells[column("reporterType")] = String::new();

    let complaint: Complaint = decode_row(&cells).unwrap();

    assert_eq!(complaint.reporter.kind(), "PARENT_STUDENT");
}

#[test]
fn test_decode_restores_missing_letter_from_messages() {
    let mut cells: Vec<String> = encoded(&create_drafted_complaint("17"));
    cells[column("assigneeLetterJSON")] = String::new();

    let complaint: Complaint = decode_row(&cells).unwrap();
    let letter = complaint.assignee_letter.unwrap();

    assert_eq!(letter.body, "Spoke with the driver.");
    assert_eq!(letter.author_user_id, UserId::new("u2"));
    assert!(letter.submitted_at.is_none());
}
