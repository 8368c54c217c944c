// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mapping between complaint records and sheet rows.
//!
//! A row has one cell per column of `COLUMNS`. Nested structures are kept
//! as JSON in their own cells and decoded leniently: a blank, `null` or
//! malformed cell falls back to the empty value instead of hiding the
//! whole complaint.

use serde::Serialize;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};

use complaint_desk_domain::{
    AssigneeLetter, Complaint, ComplaintId, ComplaintStatus, DepartmentId, Message,
    NotificationEmail, PrincipalReview, Reporter, ReturnInfo, ReviewCycle, UserId,
};

use crate::error::PersistenceError;

/// Sheet columns, in order.
pub const COLUMNS: [&str; 24] = [
    "id",
    "createdAt",
    "updatedAt",
    "subject",
    "title",
    "body",
    "status",
    "departmentId",
    "assigneeUserId",
    "createdById",
    "reporterType",
    "reporterFullName",
    "reporterEmail",
    "reporterPhone",
    "reporterJobTitle",
    "reporterDepartmentId",
    "reporterGrade",
    "reporterClassNumber",
    "messagesJSON",
    "assigneeLetterJSON",
    "returnInfoJSON",
    "reviewCyclesJSON",
    "principalReviewJSON",
    "notificationEmailJSON",
];

pub const COL_ID: usize = 0;
const COL_CREATED_AT: usize = 1;
const COL_UPDATED_AT: usize = 2;
const COL_SUBJECT: usize = 3;
const COL_TITLE: usize = 4;
const COL_BODY: usize = 5;
const COL_STATUS: usize = 6;
const COL_DEPARTMENT_ID: usize = 7;
const COL_ASSIGNEE_USER_ID: usize = 8;
const COL_CREATED_BY_ID: usize = 9;
const COL_REPORTER_TYPE: usize = 10;
const COL_REPORTER_FULL_NAME: usize = 11;
const COL_REPORTER_EMAIL: usize = 12;
const COL_REPORTER_PHONE: usize = 13;
const COL_REPORTER_JOB_TITLE: usize = 14;
const COL_REPORTER_DEPARTMENT_ID: usize = 15;
const COL_REPORTER_GRADE: usize = 16;
const COL_REPORTER_CLASS_NUMBER: usize = 17;
const COL_MESSAGES: usize = 18;
const COL_ASSIGNEE_LETTER: usize = 19;
const COL_RETURN_INFO: usize = 20;
const COL_REVIEW_CYCLES: usize = 21;
const COL_PRINCIPAL_REVIEW: usize = 22;
const COL_NOTIFICATION_EMAIL: usize = 23;

/// Columns holding JSON documents.
pub const JSON_COLUMNS: std::ops::Range<usize> = COL_MESSAGES..COLUMNS.len();

/// Returns the header row.
#[must_use]
pub fn header_row() -> Vec<String> {
    COLUMNS.iter().map(|c| (*c).to_string()).collect()
}

/// Returns true if `row` is the header row.
#[must_use]
pub fn is_header(row: &[String]) -> bool {
    row.first()
        .is_some_and(|cell| cell.trim().eq_ignore_ascii_case(COLUMNS[COL_ID]))
}

fn format_timestamp(value: OffsetDateTime) -> Result<String, PersistenceError> {
    Ok(value.format(&Rfc3339)?)
}

fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(value.trim(), &Rfc3339).ok()
}

fn encode_json<T: Serialize>(value: &T) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(value)?)
}

/// Optional documents are written as an empty cell when absent.
fn encode_optional_json<T: Serialize>(value: Option<&T>) -> Result<String, PersistenceError> {
    value.map_or_else(|| Ok(String::new()), encode_json)
}

fn decode_json<T: DeserializeOwned + Default>(cell: &str, column: usize, row_id: &str) -> T {
    let trimmed: &str = cell.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return T::default();
    }
    serde_json::from_str(trimmed).unwrap_or_else(|e| {
        warn!(
            complaint_id = row_id,
            column = COLUMNS[column],
            error = %e,
            "Ignoring malformed JSON cell"
        );
        T::default()
    })
}

fn cell_at(row: &[String], index: usize) -> &str {
    row.get(index).map_or("", String::as_str)
}

/// Serializes a complaint into a full sheet row.
///
/// # Errors
///
/// Returns an error if a timestamp or nested document cannot be serialized.
pub fn encode_row(complaint: &Complaint) -> Result<Vec<String>, PersistenceError> {
    let mut cells: Vec<String> = vec![String::new(); COLUMNS.len()];

    cells[COL_ID] = complaint.id.value().to_string();
    cells[COL_CREATED_AT] = format_timestamp(complaint.created_at)?;
    cells[COL_UPDATED_AT] = format_timestamp(complaint.updated_at)?;
    cells[COL_SUBJECT].clone_from(&complaint.subject);
    cells[COL_TITLE].clone_from(&complaint.title);
    cells[COL_BODY].clone_from(&complaint.body);
    cells[COL_STATUS] = complaint.status.as_str().to_string();
    cells[COL_DEPARTMENT_ID] = complaint
        .department_id
        .as_ref()
        .map(|id| id.value().to_string())
        .unwrap_or_default();
    cells[COL_ASSIGNEE_USER_ID] = complaint
        .assignee_user_id
        .as_ref()
        .map(|id| id.value().to_string())
        .unwrap_or_default();
    cells[COL_CREATED_BY_ID] = complaint
        .created_by_id
        .as_ref()
        .map(|id| id.value().to_string())
        .unwrap_or_default();

    cells[COL_REPORTER_TYPE] = complaint.reporter.kind().to_string();
    cells[COL_REPORTER_FULL_NAME] = complaint.reporter.full_name().to_string();
    cells[COL_REPORTER_EMAIL] = complaint.reporter.email().to_string();
    cells[COL_REPORTER_PHONE] = complaint.reporter.phone().to_string();
    match &complaint.reporter {
        Reporter::Staff {
            job_title,
            department_id,
            ..
        } => {
            cells[COL_REPORTER_JOB_TITLE].clone_from(job_title);
            cells[COL_REPORTER_DEPARTMENT_ID] = department_id
                .as_ref()
                .map(|id| id.value().to_string())
                .unwrap_or_default();
        }
        Reporter::ParentStudent {
            grade,
            class_number,
            ..
        } => {
            cells[COL_REPORTER_GRADE].clone_from(grade);
            cells[COL_REPORTER_CLASS_NUMBER].clone_from(class_number);
        }
    }

    cells[COL_MESSAGES] = encode_json(&complaint.messages)?;
    cells[COL_ASSIGNEE_LETTER] = encode_optional_json(complaint.assignee_letter.as_ref())?;
    cells[COL_RETURN_INFO] = encode_optional_json(complaint.return_info.as_ref())?;
    cells[COL_REVIEW_CYCLES] = encode_json(&complaint.review_cycles)?;
    cells[COL_PRINCIPAL_REVIEW] = encode_optional_json(complaint.principal_review.as_ref())?;
    cells[COL_NOTIFICATION_EMAIL] =
        encode_optional_json(complaint.notification_email.as_ref())?;

    Ok(cells)
}

/// Decodes a sheet row into a complaint.
///
/// Short rows are padded with empty cells. Returns `None` for rows that do
/// not hold a complaint: blank rows, and rows missing the id, creation
/// time, subject or a known status.
#[must_use]
pub fn decode_row(row: &[String]) -> Option<Complaint> {
    let cell = |index: usize| cell_at(row, index);
    let text = |index: usize| cell_at(row, index).trim().to_string();

    let id: ComplaintId = ComplaintId::new(cell(COL_ID));
    if id.is_empty() {
        return None;
    }

    let Some(created_at) = parse_timestamp(cell(COL_CREATED_AT)) else {
        debug!(complaint_id = id.value(), "Skipping row without creation time");
        return None;
    };

    let subject: String = text(COL_SUBJECT);
    if subject.is_empty() {
        debug!(complaint_id = id.value(), "Skipping row without subject");
        return None;
    }

    let status: ComplaintStatus = match cell(COL_STATUS).parse() {
        Ok(status) => status,
        Err(e) => {
            warn!(complaint_id = id.value(), error = %e, "Skipping row with unknown status");
            return None;
        }
    };

    let reporter: Reporter = if cell(COL_REPORTER_TYPE).trim() == "STAFF" {
        Reporter::Staff {
            full_name: text(COL_REPORTER_FULL_NAME),
            email: text(COL_REPORTER_EMAIL),
            phone: text(COL_REPORTER_PHONE),
            job_title: text(COL_REPORTER_JOB_TITLE),
            department_id: DepartmentId::parse_optional(cell(COL_REPORTER_DEPARTMENT_ID)),
        }
    } else {
        Reporter::ParentStudent {
            full_name: text(COL_REPORTER_FULL_NAME),
            email: text(COL_REPORTER_EMAIL),
            phone: text(COL_REPORTER_PHONE),
            grade: text(COL_REPORTER_GRADE),
            class_number: text(COL_REPORTER_CLASS_NUMBER),
        }
    };

    let row_id: &str = id.value();
    let messages: Vec<Message> = decode_json(cell(COL_MESSAGES), COL_MESSAGES, row_id);
    let assignee_letter: Option<AssigneeLetter> =
        decode_json(cell(COL_ASSIGNEE_LETTER), COL_ASSIGNEE_LETTER, row_id);
    let return_info: Option<ReturnInfo> =
        decode_json(cell(COL_RETURN_INFO), COL_RETURN_INFO, row_id);
    let review_cycles: Vec<ReviewCycle> =
        decode_json(cell(COL_REVIEW_CYCLES), COL_REVIEW_CYCLES, row_id);
    let principal_review: Option<PrincipalReview> =
        decode_json(cell(COL_PRINCIPAL_REVIEW), COL_PRINCIPAL_REVIEW, row_id);
    let notification_email: Option<NotificationEmail> =
        decode_json(cell(COL_NOTIFICATION_EMAIL), COL_NOTIFICATION_EMAIL, row_id);

    let mut complaint: Complaint = Complaint {
        updated_at: parse_timestamp(cell(COL_UPDATED_AT)).unwrap_or(created_at),
        created_at,
        subject,
        title: text(COL_TITLE),
        body: cell(COL_BODY).to_string(),
        status,
        department_id: DepartmentId::parse_optional(cell(COL_DEPARTMENT_ID)),
        assignee_user_id: UserId::parse_optional(cell(COL_ASSIGNEE_USER_ID)),
        created_by_id: UserId::parse_optional(cell(COL_CREATED_BY_ID)),
        reporter,
        messages,
        assignee_letter,
        return_info,
        review_cycles,
        principal_review,
        notification_email,
        id,
    };
    complaint.restore_letter_from_messages();

    Some(complaint)
}
