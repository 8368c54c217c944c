// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The status string is not a known complaint status.
    InvalidStatus(String),
    /// The role string is not a known directory role.
    InvalidRole(String),
    /// A status transition is not permitted by the lifecycle.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition was refused.
        reason: String,
    },
    /// The complaint is closed and cannot be changed.
    ComplaintClosed {
        /// The closed complaint.
        complaint_id: String,
    },
    /// The complaint is waiting for a principal decision.
    AwaitingPrincipalReview {
        /// The complaint under review.
        complaint_id: String,
    },
    /// The operation requires a complaint awaiting principal review.
    NotAwaitingPrincipalReview {
        /// The current status.
        status: String,
    },
    /// There is no letter for the principal to act on.
    NoLetterToReview,
    /// The complaint has no assignee.
    NoAssignee,
    /// The complaint has no department, so nobody can be assigned.
    NoDepartment,
    /// The referenced user is not in the directory.
    UnknownUser(String),
    /// The referenced department is not in the directory.
    UnknownDepartment(String),
    /// The letter body is empty after trimming.
    EmptyLetter,
    /// The message body is empty after trimming.
    EmptyMessage,
    /// The return reason is empty after trimming.
    EmptyReturnReason,
    /// The closure summary is empty after trimming.
    MissingSummary,
    /// The closure summary exceeds the maximum length.
    SummaryTooLong {
        /// Length of the submitted summary in characters.
        length: usize,
        /// The maximum permitted length.
        max: usize,
    },
    /// No signer was given for the closure.
    MissingSigner,
    /// A proposed message list drops or edits existing messages.
    MessageHistoryRewritten {
        /// How many messages the stored complaint has.
        existing: usize,
    },
    /// An appended message claims an author other than the actor.
    MessageAuthorMismatch {
        /// The offending message.
        message_id: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStatus(status) => write!(f, "Invalid complaint status: '{status}'"),
            Self::InvalidRole(role) => write!(f, "Invalid role: '{role}'"),
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Invalid status transition from {from} to {to}: {reason}")
            }
            Self::ComplaintClosed { complaint_id } => {
                write!(f, "Complaint {complaint_id} is closed and cannot be changed")
            }
            Self::AwaitingPrincipalReview { complaint_id } => {
                write!(f, "Complaint {complaint_id} is awaiting principal review")
            }
            Self::NotAwaitingPrincipalReview { status } => {
                write!(
                    f,
                    "Complaint must be awaiting principal review (current status: {status})"
                )
            }
            Self::NoLetterToReview => write!(f, "There is no assignee letter to review"),
            Self::NoAssignee => write!(f, "Complaint has no assignee"),
            Self::NoDepartment => {
                write!(f, "Complaint must have a department before it can be assigned")
            }
            Self::UnknownUser(id) => write!(f, "Unknown user: '{id}'"),
            Self::UnknownDepartment(id) => write!(f, "Unknown department: '{id}'"),
            Self::EmptyLetter => write!(f, "Letter body cannot be empty"),
            Self::EmptyMessage => write!(f, "Message body cannot be empty"),
            Self::EmptyReturnReason => write!(f, "A reason is required to return a complaint"),
            Self::MissingSummary => write!(f, "A closure summary is required"),
            Self::SummaryTooLong { length, max } => {
                write!(
                    f,
                    "Closure summary is {length} characters; the maximum is {max}"
                )
            }
            Self::MissingSigner => write!(f, "A signer is required to close a complaint"),
            Self::MessageHistoryRewritten { existing } => {
                write!(
                    f,
                    "Messages are append-only; the first {existing} messages must be kept unchanged"
                )
            }
            Self::MessageAuthorMismatch { message_id } => {
                write!(
                    f,
                    "Message '{message_id}' must be authored by the acting user"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
