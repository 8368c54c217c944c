// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use complaint_desk::{Command, ComplaintPatch};
use complaint_desk_domain::{Complaint, DepartmentId, Message, User, UserId};

use crate::error::ApiError;
use crate::stats::ComplaintStats;

/// Parses a JSON request body.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if the body is not valid JSON for `T`,
/// including unknown fields on requests that reject them.
pub fn parse_request<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let body: &str = if body.trim().is_empty() { "{}" } else { body };
    serde_json::from_str(body).map_err(|e| ApiError::InvalidInput {
        field: String::from("body"),
        message: e.to_string(),
    })
}

/// Distinguishes an absent field from an explicit `null`.
///
/// Used with `#[serde(default)]` so that a missing field stays `None` and
/// `null` becomes `Some(None)`.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

const fn default_true() -> bool {
    true
}

/// API request to assign, reassign or unassign a complaint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssignRequest {
    /// The new assignee, or `null` to unassign.
    #[serde(default)]
    pub assignee_user_id: Option<String>,
}

impl AssignRequest {
    #[must_use]
    pub fn into_command(self) -> Command {
        Command::Assign {
            assignee_user_id: self
                .assignee_user_id
                .as_deref()
                .and_then(UserId::parse_optional),
        }
    }
}

/// API request to move a complaint to another department.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeDepartmentRequest {
    /// The new department, or `null` to clear it.
    #[serde(default)]
    pub department_id: Option<String>,
    /// Drop an assignee who does not belong to the new department.
    #[serde(default = "default_true")]
    pub clear_assignee_if_not_in_department: bool,
}

impl ChangeDepartmentRequest {
    #[must_use]
    pub fn into_command(self) -> Command {
        Command::ChangeDepartment {
            department_id: self
                .department_id
                .as_deref()
                .and_then(DepartmentId::parse_optional),
            clear_assignee_if_not_in_department: self.clear_assignee_if_not_in_department,
        }
    }
}

/// API request to post a message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostMessageRequest {
    #[serde(default)]
    pub body: String,
}

impl PostMessageRequest {
    #[must_use]
    pub fn into_command(self) -> Command {
        Command::PostMessage { body: self.body }
    }
}

/// API request to save the assignee letter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SaveLetterRequest {
    #[serde(default)]
    pub body: String,
}

impl SaveLetterRequest {
    #[must_use]
    pub fn into_command(self) -> Command {
        Command::SaveLetter { body: self.body }
    }
}

/// API request to return a complaint for redo.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReturnForRedoRequest {
    #[serde(default)]
    pub reason: String,
}

impl ReturnForRedoRequest {
    #[must_use]
    pub fn into_command(self) -> Command {
        Command::ReturnForRedo {
            reason: self.reason,
        }
    }
}

/// API request to approve the letter and close the complaint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApproveAndCloseRequest {
    /// Whether the complaint was found justified. Required.
    #[serde(default)]
    pub justified: Option<bool>,
    /// The closing summary.
    #[serde(default)]
    pub summary: String,
    /// Who signs the closure.
    #[serde(default)]
    pub signed_by_user_id: String,
    /// Optional stored signature image.
    #[serde(default)]
    pub signature_image_path: Option<String>,
}

impl ApproveAndCloseRequest {
    /// Converts the request into a command.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` if `justified` is missing.
    pub fn into_command(self) -> Result<Command, ApiError> {
        let justified: bool = self.justified.ok_or_else(|| ApiError::InvalidInput {
            field: String::from("justified"),
            message: String::from("justified must be true or false"),
        })?;

        Ok(Command::ApproveAndClose {
            justified,
            summary: self.summary,
            signed_by_user_id: self.signed_by_user_id,
            signature_image_path: self.signature_image_path,
        })
    }
}

/// A message as sent in a patch request.
///
/// Existing messages must be echoed back unchanged; new ones may omit the
/// id and timestamp, which the server assigns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchMessage {
    #[serde(default)]
    pub id: String,
    pub author_id: String,
    pub body: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

/// API request for the generic complaint patch.
///
/// Only `department_id`, `assignee_user_id` and `messages` may be patched;
/// any other field is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchComplaintRequest {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub department_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub assignee_user_id: Option<Option<String>>,
    #[serde(default)]
    pub messages: Option<Vec<PatchMessage>>,
}

impl PatchComplaintRequest {
    /// Converts the request into a core patch.
    ///
    /// # Arguments
    ///
    /// * `now` - Timestamp for messages sent without one
    #[must_use]
    pub fn into_patch(self, now: OffsetDateTime) -> ComplaintPatch {
        ComplaintPatch {
            department_id: self
                .department_id
                .map(|d| d.as_deref().and_then(DepartmentId::parse_optional)),
            assignee_user_id: self
                .assignee_user_id
                .map(|u| u.as_deref().and_then(UserId::parse_optional)),
            messages: self.messages.map(|messages| {
                messages
                    .into_iter()
                    .map(|m| Message {
                        id: m.id,
                        author_id: UserId::new(&m.author_id),
                        body: m.body,
                        created_at: m.created_at.unwrap_or(now),
                    })
                    .collect()
            }),
        }
    }
}

/// Query parameters of the complaint list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListComplaintsRequest {
    pub status: Option<String>,
    pub department_id: Option<String>,
    pub assignee_user_id: Option<String>,
    /// Free text matched against title, body and subject.
    pub q: Option<String>,
    pub limit: Option<usize>,
    /// Opaque cursor returned by the previous page.
    pub cursor: Option<String>,
}

/// Represents whether a specific action is permitted.
///
/// This enum provides better type safety than raw booleans and serializes
/// to JSON as true/false for API compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The action is permitted.
    Allowed,
    /// The action is not permitted.
    Denied,
}

impl Capability {
    /// Returns true if the capability is allowed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Creates a capability from a boolean value.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Allowed } else { Self::Denied }
    }
}

impl Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bool(matches!(self, Self::Allowed))
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let b = bool::deserialize(deserializer)?;
        Ok(Self::from_bool(b))
    }
}

/// What the actor may do with a complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintCapabilities {
    pub can_assign: Capability,
    pub can_change_department: Capability,
    pub can_write_letter: Capability,
    pub can_submit: Capability,
    pub can_return: Capability,
    pub can_close: Capability,
    pub can_post_message: Capability,
    /// The actor could act as principal but there is no letter to review.
    pub principal_actions_need_letter: bool,
}

impl ComplaintCapabilities {
    /// Capabilities with every action denied.
    #[must_use]
    pub const fn denied() -> Self {
        Self {
            can_assign: Capability::Denied,
            can_change_department: Capability::Denied,
            can_write_letter: Capability::Denied,
            can_submit: Capability::Denied,
            can_return: Capability::Denied,
            can_close: Capability::Denied,
            can_post_message: Capability::Denied,
            principal_actions_need_letter: false,
        }
    }
}

/// API response carrying one complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintResponse {
    pub complaint: Complaint,
    pub capabilities: ComplaintCapabilities,
}

/// API response for a page of complaints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintListResponse {
    pub items: Vec<Complaint>,
    /// Cursor for the next page; present only when this page is full.
    pub next_cursor: Option<String>,
}

/// API response for the statistics endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintStatsResponse {
    pub stats: ComplaintStats,
}

/// A user that may receive complaints of a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignableUserInfo {
    pub id: String,
    pub name: String,
    pub role: String,
}

impl From<&User> for AssignableUserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.value().to_string(),
            name: user.name.clone(),
            role: user.role.as_str().to_string(),
        }
    }
}

/// API response for the assignable users of a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignableUsersResponse {
    pub department_id: String,
    pub users: Vec<AssignableUserInfo>,
}

/// API response for the null-cell repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairNullCellsResponse {
    /// The number of rows that were rewritten.
    pub repaired_rows: usize,
}
