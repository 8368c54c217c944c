// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{at, create_drafted_complaint, create_test_complaint};
use crate::backend::SheetBackend;
use crate::row::{COLUMNS, encode_row, header_row};
use crate::{ComplaintStore, LocatedRow, MemorySheet, PersistenceError};
use complaint_desk_domain::{Complaint, ComplaintId, ComplaintStatus, UserId};

fn store_with(complaints: &[Complaint]) -> ComplaintStore<MemorySheet> {
    let mut store: ComplaintStore<MemorySheet> = ComplaintStore::new(MemorySheet::new());
    for complaint in complaints {
        store.append(complaint).unwrap();
    }
    store
}

fn json_column(name: &str) -> usize {
    COLUMNS.iter().position(|c| *c == name).unwrap()
}

// ============================================================================
// Locate and load
// ============================================================================

#[test]
fn test_append_then_load() {
    let mut store: ComplaintStore<MemorySheet> = store_with(&[create_test_complaint("17")]);

    let loaded: Complaint = store.load(&ComplaintId::new("17")).unwrap();

    assert_eq!(loaded, create_test_complaint("17"));
    assert_eq!(store.backend().rows().len(), 2);
}

#[test]
fn test_locate_matches_normalized_ids() {
    let mut cells: Vec<String> = encode_row(&create_test_complaint("17")).unwrap();
    cells[0] = String::from("'017");
    let mut store: ComplaintStore<MemorySheet> =
        ComplaintStore::new(MemorySheet::from_rows(vec![header_row(), cells]));

    let located: LocatedRow = store.locate(&ComplaintId::new("17")).unwrap().unwrap();

    assert_eq!(located.row_number, 2);
}

#[test]
fn test_locate_without_header_row() {
    let cells: Vec<String> = encode_row(&create_test_complaint("4")).unwrap();
    let mut store: ComplaintStore<MemorySheet> =
        ComplaintStore::new(MemorySheet::from_rows(vec![cells]));

    let located: LocatedRow = store.locate(&ComplaintId::new("4")).unwrap().unwrap();

    assert_eq!(located.row_number, 1);
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn test_load_missing_complaint_is_not_found() {
    let mut store: ComplaintStore<MemorySheet> = store_with(&[create_test_complaint("17")]);

    let result: Result<Complaint, PersistenceError> = store.load(&ComplaintId::new("99"));

    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_append_rejects_duplicate_id() {
    let mut store: ComplaintStore<MemorySheet> = store_with(&[create_test_complaint("17")]);

    let result: Result<usize, PersistenceError> = store.append(&create_test_complaint("17.0"));

    assert_eq!(result, Err(PersistenceError::DuplicateId(String::from("17"))));
}

#[test]
fn test_list_skips_undecodable_rows() {
    let mut broken: Vec<String> = encode_row(&create_test_complaint("3")).unwrap();
    broken[6] = String::from("UNKNOWN");
    let mut store: ComplaintStore<MemorySheet> = ComplaintStore::new(MemorySheet::from_rows(vec![
        header_row(),
        encode_row(&create_test_complaint("1")).unwrap(),
        Vec::new(),
        broken,
        encode_row(&create_test_complaint("2")).unwrap(),
    ]));

    let ids: Vec<String> = store
        .list()
        .unwrap()
        .iter()
        .map(|c| c.id.to_string())
        .collect();

    assert_eq!(ids, vec!["1", "2"]);
}

// ============================================================================
// Commit
// ============================================================================

#[test]
fn test_commit_replaces_whole_row() {
    let original: Complaint = create_test_complaint("17");
    let mut store: ComplaintStore<MemorySheet> = store_with(&[original.clone()]);
    let mut next: Complaint = original.clone();
    next.status = ComplaintStatus::Assigned;
    next.assignee_user_id = Some(UserId::new("u2"));
    next.updated_at = at(1);

    store.commit(&original, &next).unwrap();

    assert_eq!(store.load(&original.id).unwrap(), next);
}

#[test]
fn test_commit_rejects_stale_version() {
    let original: Complaint = create_test_complaint("17");
    let mut store: ComplaintStore<MemorySheet> = store_with(&[original.clone()]);

    let mut first: Complaint = original.clone();
    first.updated_at = at(1);
    first.status = ComplaintStatus::Assigned;
    store.commit(&original, &first).unwrap();

    let mut second: Complaint = original.clone();
    second.updated_at = at(2);
    let result: Result<(), PersistenceError> = store.commit(&original, &second);

    assert_eq!(
        result,
        Err(PersistenceError::StaleWrite {
            complaint_id: String::from("17")
        })
    );
    assert_eq!(store.load(&original.id).unwrap(), first);
}

#[test]
fn test_commit_follows_row_that_moved() {
    let target: Complaint = create_test_complaint("17");
    let other: Complaint = create_test_complaint("18");
    let mut store: ComplaintStore<MemorySheet> = store_with(&[target.clone(), other.clone()]);
    let loaded: Complaint = store.load(&target.id).unwrap();

    // Someone re-sorts the sheet between the read and the write.
    let mut resorted: ComplaintStore<MemorySheet> =
        ComplaintStore::new(MemorySheet::from_rows(vec![
            header_row(),
            encode_row(&other).unwrap(),
            encode_row(&target).unwrap(),
        ]));
    let mut next: Complaint = loaded.clone();
    next.updated_at = at(1);
    next.status = ComplaintStatus::Assigned;

    resorted.commit(&loaded, &next).unwrap();

    assert_eq!(resorted.load(&other.id).unwrap(), other);
    assert_eq!(resorted.load(&target.id).unwrap(), next);
    assert_eq!(
        resorted.locate(&target.id).unwrap().unwrap().row_number,
        3
    );
}

#[test]
fn test_commit_when_row_removed_is_not_found() {
    let original: Complaint = create_test_complaint("17");
    let mut store: ComplaintStore<MemorySheet> =
        ComplaintStore::new(MemorySheet::from_rows(vec![header_row()]));

    let result: Result<(), PersistenceError> = store.commit(&original, &original);

    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

// ============================================================================
// Maintenance writes
// ============================================================================

#[test]
fn test_record_notification_email_keeps_version() {
    let original: Complaint = create_drafted_complaint("17");
    let mut store: ComplaintStore<MemorySheet> = store_with(&[original.clone()]);

    store
        .record_notification_email(&original.id, "dana@example.org", at(10))
        .unwrap();

    let stored: Complaint = store.load(&original.id).unwrap();
    let email = stored.notification_email.clone().unwrap();
    assert!(email.sent);
    assert_eq!(email.sent_at, Some(at(10)));
    assert_eq!(email.to.as_deref(), Some("dana@example.org"));
    assert_eq!(stored.updated_at, original.updated_at);

    // A client holding the earlier read can still commit.
    let mut next: Complaint = stored;
    next.updated_at = at(11);
    store.commit(&original, &next).unwrap();
}

#[test]
fn test_repair_null_cells_counts_changed_rows() {
    let mut with_nulls: Vec<String> = encode_row(&create_test_complaint("1")).unwrap();
    with_nulls[json_column("returnInfoJSON")] = String::from("null");
    with_nulls[json_column("principalReviewJSON")] = String::from("null");
    let clean: Vec<String> = encode_row(&create_test_complaint("2")).unwrap();
    let mut store: ComplaintStore<MemorySheet> = ComplaintStore::new(MemorySheet::from_rows(vec![
        header_row(),
        with_nulls,
        clean.clone(),
    ]));

    let repaired: usize = store.repair_null_cells().unwrap();

    assert_eq!(repaired, 1);
    let rows: Vec<Vec<String>> = store.backend().rows().to_vec();
    assert_eq!(rows[1][json_column("returnInfoJSON")], "");
    assert_eq!(rows[1][json_column("principalReviewJSON")], "");
    assert_eq!(rows[2], clean);
    assert_eq!(store.repair_null_cells().unwrap(), 0);
}

#[test]
fn test_memory_sheet_rejects_unknown_row() {
    let mut sheet: MemorySheet = MemorySheet::new();

    let result: Result<(), PersistenceError> = sheet.write_row(5, &header_row());

    assert_eq!(result, Err(PersistenceError::RowOutOfRange { row_number: 5 }));
}
