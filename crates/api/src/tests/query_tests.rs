// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Listing, filtering and cursor paging tests.

use time::Duration;

use complaint_desk_domain::{Complaint, ComplaintStatus, DepartmentId, Directory, UserId};

use crate::{
    ApiError, ComplaintListResponse, Cursor, DEFAULT_PAGE_SIZE, ListComplaintsRequest, ListQuery,
    MAX_PAGE_SIZE, WorkflowService, list_complaints,
};

use super::helpers::{
    ADMIN, ASSIGNEE, MANAGER, SPORTS_MANAGER, actor, create_test_complaint, create_test_directory,
    t0,
};

/// Five complaints, one hour apart, ids 1 to 5; even ids are in `d2`.
fn fixture() -> Vec<Complaint> {
    (1..=5)
        .map(|n: i64| {
            let mut complaint: Complaint = create_test_complaint(&n.to_string());
            complaint.created_at = t0() + Duration::hours(n);
            complaint.updated_at = complaint.created_at;
            if n % 2 == 0 {
                complaint.department_id = Some(DepartmentId::new("d2"));
            }
            complaint
        })
        .collect()
}

fn ids(response: &ComplaintListResponse) -> Vec<&str> {
    response.items.iter().map(|c| c.id.value()).collect()
}

fn query(limit: usize) -> ListQuery {
    ListQuery {
        limit,
        ..ListQuery::default()
    }
}

#[test]
fn test_newest_first() {
    let response = list_complaints(&actor(ADMIN), fixture(), &ListQuery::default()).unwrap();

    assert_eq!(ids(&response), vec!["5", "4", "3", "2", "1"]);
    assert_eq!(response.next_cursor, None);
}

#[test]
fn test_ties_break_on_numeric_id_descending() {
    let mut complaints: Vec<Complaint> = fixture();
    for complaint in &mut complaints {
        complaint.created_at = t0();
    }
    complaints.push({
        let mut c: Complaint = create_test_complaint("10");
        c.created_at = t0();
        c
    });

    let response = list_complaints(&actor(ADMIN), complaints, &ListQuery::default()).unwrap();

    assert_eq!(ids(&response), vec!["10", "5", "4", "3", "2", "1"]);
}

#[test]
fn test_visibility_matches_read_policy() {
    let manager = list_complaints(&actor(MANAGER), fixture(), &ListQuery::default()).unwrap();
    assert_eq!(ids(&manager), vec!["5", "3", "1"]);

    let sports = list_complaints(&actor(SPORTS_MANAGER), fixture(), &ListQuery::default()).unwrap();
    assert_eq!(ids(&sports), vec!["4", "2"]);

    let employee = list_complaints(&actor(ASSIGNEE), fixture(), &ListQuery::default()).unwrap();
    assert!(employee.items.is_empty());
}

#[test]
fn test_employee_sees_assigned_complaints() {
    let mut complaints: Vec<Complaint> = fixture();
    complaints[2].assignee_user_id = Some(UserId::new(ASSIGNEE));
    complaints[2].status = ComplaintStatus::Assigned;

    let response = list_complaints(&actor(ASSIGNEE), complaints, &ListQuery::default()).unwrap();

    assert_eq!(ids(&response), vec!["3"]);
}

#[test]
fn test_filters_combine() {
    let mut complaints: Vec<Complaint> = fixture();
    complaints[0].status = ComplaintStatus::Assigned;
    complaints[0].assignee_user_id = Some(UserId::new(ASSIGNEE));
    complaints[2].status = ComplaintStatus::Assigned;

    let filter: ListQuery = ListQuery {
        status: Some(ComplaintStatus::Assigned),
        assignee_user_id: Some(UserId::new(ASSIGNEE)),
        ..ListQuery::default()
    };
    let response = list_complaints(&actor(ADMIN), complaints, &filter).unwrap();

    assert_eq!(ids(&response), vec!["1"]);
}

#[test]
fn test_text_filter_is_case_insensitive() {
    let mut complaints: Vec<Complaint> = fixture();
    complaints[3].title = String::from("Broken LOCKER");

    let filter: ListQuery = ListQuery::from_request(ListComplaintsRequest {
        q: Some(String::from("  locker ")),
        ..ListComplaintsRequest::default()
    })
    .unwrap();
    let response = list_complaints(&actor(ADMIN), complaints, &filter).unwrap();

    assert_eq!(ids(&response), vec!["4"]);
}

#[test]
fn test_cursor_pages_without_overlap() {
    let first = list_complaints(&actor(ADMIN), fixture(), &query(2)).unwrap();
    assert_eq!(ids(&first), vec!["5", "4"]);
    let cursor: String = first.next_cursor.clone().unwrap();

    let second_query: ListQuery = ListQuery {
        cursor: Some(Cursor::decode(&cursor).unwrap()),
        ..query(2)
    };
    let second = list_complaints(&actor(ADMIN), fixture(), &second_query).unwrap();
    assert_eq!(ids(&second), vec!["3", "2"]);

    let third_query: ListQuery = ListQuery {
        cursor: Some(Cursor::decode(&second.next_cursor.clone().unwrap()).unwrap()),
        ..query(2)
    };
    let third = list_complaints(&actor(ADMIN), fixture(), &third_query).unwrap();
    assert_eq!(ids(&third), vec!["1"]);
    assert_eq!(third.next_cursor, None);
}

#[test]
fn test_cursor_paging_terminates_over_mixed_ids() {
    let complaints: Vec<Complaint> = ["2", "10", "1a", "inf"]
        .into_iter()
        .map(|id: &str| {
            let mut complaint: Complaint = create_test_complaint(id);
            complaint.created_at = t0();
            complaint
        })
        .collect();

    let mut seen: Vec<String> = Vec::new();
    let mut cursor: Option<Cursor> = None;
    for _ in 0..10 {
        let page_query: ListQuery = ListQuery {
            cursor: cursor.take(),
            ..query(1)
        };
        let page = list_complaints(&actor(ADMIN), complaints.clone(), &page_query).unwrap();
        seen.extend(ids(&page).into_iter().map(String::from));
        match page.next_cursor {
            Some(next) => cursor = Some(Cursor::decode(&next).unwrap()),
            None => break,
        }
    }

    assert_eq!(seen, vec!["inf", "1a", "10", "2"]);
}

#[test]
fn test_cursor_round_trip() {
    let complaint: Complaint = fixture().remove(0);
    let cursor: Cursor = Cursor::at(&complaint);

    let decoded: Cursor = Cursor::decode(&cursor.encode().unwrap()).unwrap();

    assert_eq!(decoded, cursor);
}

#[test]
fn test_malformed_cursor_is_invalid_input() {
    for raw in ["", "no-separator", "yesterday|5", "2026-03-01T08:00:00Z|"] {
        let err: ApiError = Cursor::decode(raw).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "cursor"));
    }
}

#[test]
fn test_limit_is_clamped() {
    let huge: ListQuery = ListQuery::from_request(ListComplaintsRequest {
        limit: Some(10_000),
        ..ListComplaintsRequest::default()
    })
    .unwrap();
    assert_eq!(huge.limit, MAX_PAGE_SIZE);

    let zero: ListQuery = ListQuery::from_request(ListComplaintsRequest {
        limit: Some(0),
        ..ListComplaintsRequest::default()
    })
    .unwrap();
    assert_eq!(zero.limit, 1);

    let default: ListQuery = ListQuery::from_request(ListComplaintsRequest::default()).unwrap();
    assert_eq!(default.limit, DEFAULT_PAGE_SIZE);
}

#[test]
fn test_unknown_status_filter_is_invalid_input() {
    let err: ApiError = ListQuery::from_request(ListComplaintsRequest {
        status: Some(String::from("PENDING")),
        ..ListComplaintsRequest::default()
    })
    .unwrap_err();

    assert_eq!(err.category(), "invalid_input");
}

#[test]
fn test_service_list_requires_credential() {
    let directory: Directory = create_test_directory();
    let service: WorkflowService<'_> = WorkflowService::new(&directory, None);

    let err: ApiError = service
        .list(fixture(), None, ListComplaintsRequest::default())
        .unwrap_err();
    assert_eq!(err.category(), "unauthenticated");

    let response = service
        .list(fixture(), Some(MANAGER), ListComplaintsRequest::default())
        .unwrap();
    assert_eq!(response.items.len(), 3);
}
