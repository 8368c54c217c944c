// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use complaint_desk_domain::{DepartmentId, Message, UserId};

/// A complaint field that a command may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplaintField {
    Status,
    DepartmentId,
    AssigneeUserId,
    Messages,
    AssigneeLetter,
    ReturnInfo,
    ReviewCycles,
    PrincipalReview,
}

impl ComplaintField {
    /// Returns the wire name of the field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::DepartmentId => "department_id",
            Self::AssigneeUserId => "assignee_user_id",
            Self::Messages => "messages",
            Self::AssigneeLetter => "assignee_letter",
            Self::ReturnInfo => "return_info",
            Self::ReviewCycles => "review_cycles",
            Self::PrincipalReview => "principal_review",
        }
    }

    /// Returns true for fields frozen for non-privileged actors while a
    /// complaint awaits principal review.
    #[must_use]
    pub const fn is_review_locked(&self) -> bool {
        matches!(
            self,
            Self::Messages | Self::Status | Self::AssigneeUserId | Self::AssigneeLetter
        )
    }
}

/// A partial update of the simple complaint fields.
///
/// Each `Some` is a requested change; `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintPatch {
    /// New department, or `Some(None)` to clear it.
    pub department_id: Option<Option<DepartmentId>>,
    /// New assignee, or `Some(None)` to unassign.
    pub assignee_user_id: Option<Option<UserId>>,
    /// The complete message list. Must keep every stored message as an
    /// unchanged prefix.
    pub messages: Option<Vec<Message>>,
}

impl ComplaintPatch {
    /// Returns true if the patch requests no change at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.department_id.is_none() && self.assignee_user_id.is_none() && self.messages.is_none()
    }
}

/// A command represents user intent as data only.
///
/// Commands are the only way to request complaint state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Assign, reassign or unassign the complaint.
    Assign {
        /// The new assignee, or `None` to unassign.
        assignee_user_id: Option<UserId>,
    },
    /// Move the complaint to another department.
    ChangeDepartment {
        /// The new department, or `None` to clear it.
        department_id: Option<DepartmentId>,
        /// Drop an assignee who does not belong to the new department.
        clear_assignee_if_not_in_department: bool,
    },
    /// Append a message to the communication trail.
    PostMessage {
        /// The message text.
        body: String,
    },
    /// Save the assignee's reply draft.
    SaveLetter {
        /// The letter text.
        body: String,
    },
    /// Hand the letter to the principal.
    SubmitForReview,
    /// Send the complaint back to the assignee.
    ReturnForRedo {
        /// Why the letter is not accepted.
        reason: String,
    },
    /// Approve the letter and close the complaint.
    ApproveAndClose {
        /// Whether the complaint was found justified.
        justified: bool,
        /// The closing summary sent to the reporter.
        summary: String,
        /// Who signs the closure.
        signed_by_user_id: String,
        /// Optional stored signature image.
        signature_image_path: Option<String>,
    },
    /// Generic edit of department, assignee and messages.
    Patch(ComplaintPatch),
}

impl Command {
    /// Returns the audit name of the command.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Assign { .. } => "Assign",
            Self::ChangeDepartment { .. } => "ChangeDepartment",
            Self::PostMessage { .. } => "PostMessage",
            Self::SaveLetter { .. } => "SaveLetter",
            Self::SubmitForReview => "SubmitForReview",
            Self::ReturnForRedo { .. } => "ReturnForRedo",
            Self::ApproveAndClose { .. } => "ApproveAndClose",
            Self::Patch(_) => "PatchComplaint",
        }
    }

    /// Returns every field the command may change.
    ///
    /// Used by the review field lock, so it lists what the caller asked for
    /// rather than what actually ends up different.
    #[must_use]
    pub fn touched_fields(&self) -> Vec<ComplaintField> {
        match self {
            Self::Assign { .. } => vec![
                ComplaintField::AssigneeUserId,
                ComplaintField::Status,
                ComplaintField::ReturnInfo,
            ],
            Self::ChangeDepartment {
                clear_assignee_if_not_in_department,
                ..
            } => {
                if *clear_assignee_if_not_in_department {
                    vec![
                        ComplaintField::DepartmentId,
                        ComplaintField::AssigneeUserId,
                        ComplaintField::Status,
                    ]
                } else {
                    vec![ComplaintField::DepartmentId]
                }
            }
            Self::PostMessage { .. } => vec![ComplaintField::Messages],
            Self::SaveLetter { .. } => vec![
                ComplaintField::AssigneeLetter,
                ComplaintField::Messages,
                ComplaintField::Status,
                ComplaintField::ReturnInfo,
            ],
            Self::SubmitForReview => vec![
                ComplaintField::AssigneeLetter,
                ComplaintField::Status,
                ComplaintField::ReviewCycles,
            ],
            Self::ReturnForRedo { .. } => vec![
                ComplaintField::Status,
                ComplaintField::ReturnInfo,
                ComplaintField::ReviewCycles,
                ComplaintField::PrincipalReview,
            ],
            Self::ApproveAndClose { .. } => vec![
                ComplaintField::Status,
                ComplaintField::ReturnInfo,
                ComplaintField::ReviewCycles,
                ComplaintField::PrincipalReview,
            ],
            Self::Patch(patch) => {
                let mut fields: Vec<ComplaintField> = Vec::new();
                if patch.department_id.is_some() {
                    fields.push(ComplaintField::DepartmentId);
                }
                if patch.assignee_user_id.is_some() {
                    fields.push(ComplaintField::AssigneeUserId);
                    fields.push(ComplaintField::Status);
                }
                if patch.messages.is_some() {
                    fields.push(ComplaintField::Messages);
                }
                fields
            }
        }
    }
}
