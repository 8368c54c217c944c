// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Complaint listing: visibility, filters, ordering and cursor paging.

use std::cmp::Ordering;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use complaint_desk_domain::{Complaint, ComplaintId, ComplaintStatus, DepartmentId, UserId};

use crate::auth::{AuthenticatedActor, can_read};
use crate::error::{ApiError, translate_domain_error};
use crate::request_response::{ComplaintListResponse, ListComplaintsRequest};

/// Page size when the request does not name one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Largest page a request may ask for.
pub const MAX_PAGE_SIZE: usize = 200;

/// Position in the list ordering, encoded as `<created_at>|<id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub created_at: OffsetDateTime,
    pub id: ComplaintId,
}

impl Cursor {
    /// Returns the cursor positioned at a complaint.
    #[must_use]
    pub fn at(complaint: &Complaint) -> Self {
        Self {
            created_at: complaint.created_at,
            id: complaint.id.clone(),
        }
    }

    /// Encodes the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the timestamp cannot be formatted.
    pub fn encode(&self) -> Result<String, ApiError> {
        let created_at: String =
            self.created_at
                .format(&Rfc3339)
                .map_err(|e| ApiError::Internal {
                    message: format!("Failed to encode cursor: {e}"),
                })?;
        Ok(format!("{created_at}|{}", self.id))
    }

    /// Decodes a cursor produced by `encode`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` if the cursor is malformed.
    pub fn decode(value: &str) -> Result<Self, ApiError> {
        let invalid = || ApiError::InvalidInput {
            field: String::from("cursor"),
            message: format!("Invalid cursor '{value}'"),
        };

        let (created_at, id) = value.split_once('|').ok_or_else(invalid)?;
        let created_at: OffsetDateTime =
            OffsetDateTime::parse(created_at, &Rfc3339).map_err(|_| invalid())?;
        let id: ComplaintId = ComplaintId::new(id);
        if id.is_empty() {
            return Err(invalid());
        }

        Ok(Self { created_at, id })
    }
}

/// Digits of a decimal id without leading zeros, or `None` if the id is not
/// all ASCII digits.
fn decimal_digits(id: &str) -> Option<&str> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(id.trim_start_matches('0'))
}

/// Total order on complaint ids.
///
/// Decimal ids sort before every other id and compare by value; the rest
/// compare as strings. Equal values fall back to the raw string.
fn compare_ids(a: &ComplaintId, b: &ComplaintId) -> Ordering {
    let by_value: Ordering = match (decimal_digits(a.value()), decimal_digits(b.value())) {
        (Some(x), Some(y)) => x.len().cmp(&y.len()).then_with(|| x.cmp(y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_value.then_with(|| a.value().cmp(b.value()))
}

/// Newest first, ties broken by id descending.
fn list_order(a: &Complaint, b: &Complaint) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| compare_ids(&b.id, &a.id))
}

/// True if `complaint` sorts strictly after the cursor position.
fn is_after(complaint: &Complaint, cursor: &Cursor) -> bool {
    complaint
        .created_at
        .cmp(&cursor.created_at)
        .then_with(|| compare_ids(&complaint.id, &cursor.id))
        == Ordering::Less
}

/// A validated list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub status: Option<ComplaintStatus>,
    pub department_id: Option<DepartmentId>,
    pub assignee_user_id: Option<UserId>,
    /// Lowercased free-text filter.
    pub text: Option<String>,
    pub limit: usize,
    pub cursor: Option<Cursor>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            status: None,
            department_id: None,
            assignee_user_id: None,
            text: None,
            limit: DEFAULT_PAGE_SIZE,
            cursor: None,
        }
    }
}

impl ListQuery {
    /// Validates list request parameters.
    ///
    /// The limit is clamped to `1..=MAX_PAGE_SIZE`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for an unknown status or a
    /// malformed cursor.
    pub fn from_request(request: ListComplaintsRequest) -> Result<Self, ApiError> {
        let status: Option<ComplaintStatus> = match request.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(value.parse().map_err(translate_domain_error)?),
        };
        let cursor: Option<Cursor> = match request.cursor.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(Cursor::decode(value)?),
        };

        Ok(Self {
            status,
            department_id: request
                .department_id
                .as_deref()
                .and_then(DepartmentId::parse_optional),
            assignee_user_id: request
                .assignee_user_id
                .as_deref()
                .and_then(UserId::parse_optional),
            text: request
                .q
                .map(|q| q.trim().to_lowercase())
                .filter(|q| !q.is_empty()),
            limit: request
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            cursor,
        })
    }

    /// Returns true if the complaint passes every filter.
    #[must_use]
    pub fn matches(&self, complaint: &Complaint) -> bool {
        if self.status.is_some_and(|s| s != complaint.status) {
            return false;
        }
        if self
            .department_id
            .as_ref()
            .is_some_and(|d| complaint.department_id.as_ref() != Some(d))
        {
            return false;
        }
        if self
            .assignee_user_id
            .as_ref()
            .is_some_and(|u| complaint.assignee_user_id.as_ref() != Some(u))
        {
            return false;
        }
        self.text.as_ref().is_none_or(|text| {
            [&complaint.title, &complaint.body, &complaint.subject]
                .iter()
                .any(|field| field.to_lowercase().contains(text.as_str()))
        })
    }
}

/// Returns the complaints of `complaints` that the actor may see.
#[must_use]
pub fn visible_complaints(actor: &AuthenticatedActor, complaints: Vec<Complaint>) -> Vec<Complaint> {
    complaints
        .into_iter()
        .filter(|c| can_read(actor, c))
        .collect()
}

/// Lists one page of complaints visible to the actor.
///
/// # Arguments
///
/// * `actor` - The authenticated actor
/// * `complaints` - Every stored complaint
/// * `query` - The validated query
///
/// # Errors
///
/// Returns an error if the next-page cursor cannot be encoded.
pub fn list_complaints(
    actor: &AuthenticatedActor,
    complaints: Vec<Complaint>,
    query: &ListQuery,
) -> Result<ComplaintListResponse, ApiError> {
    let mut matching: Vec<Complaint> = visible_complaints(actor, complaints)
        .into_iter()
        .filter(|c| query.matches(c))
        .filter(|c| query.cursor.as_ref().is_none_or(|cursor| is_after(c, cursor)))
        .collect();
    matching.sort_by(list_order);
    matching.truncate(query.limit);

    let next_cursor: Option<String> = if matching.len() == query.limit {
        matching
            .last()
            .map(|last| Cursor::at(last).encode())
            .transpose()?
    } else {
        None
    };

    Ok(ComplaintListResponse {
        items: matching,
        next_cursor,
    })
}
