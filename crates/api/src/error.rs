// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use complaint_desk::CoreError;
use complaint_desk_domain::DomainError;
use complaint_desk_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No verifiable actor is attached to the request.
    Unauthenticated {
        /// Why the credential was not accepted.
        reason: String,
    },
    /// The actor is known but the policy denies the action.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// Stable machine-readable reason.
        code: String,
        /// A human-readable description.
        message: String,
    },
}

impl AuthError {
    /// Creates a `Forbidden` error.
    #[must_use]
    pub fn forbidden(action: &str, code: &str, message: &str) -> Self {
        Self::Forbidden {
            action: action.to_string(),
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated { reason } => write!(f, "Authentication required: {reason}"),
            Self::Forbidden {
                action, message, ..
            } => {
                write!(f, "Forbidden: '{action}': {message}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
/// Each variant is a stable category that the HTTP layer maps to a status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No verifiable actor.
    Unauthenticated {
        /// Why the credential was not accepted.
        reason: String,
    },
    /// The policy denies the action.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// Stable machine-readable reason (e.g. `review_lock`).
        code: String,
        /// A human-readable description.
        message: String,
    },
    /// The complaint is not in a state that allows the operation.
    InvalidState {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The record changed since it was read.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// The store could not be reached or used.
    StoreUnavailable {
        /// A description of the failure.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Returns the error category as exposed to clients.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::Forbidden { .. } => "forbidden",
            Self::InvalidState { .. } => "invalid_state",
            Self::InvalidInput { .. } => "invalid_input",
            Self::ResourceNotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::Internal { .. } => "internal",
        }
    }

    /// Returns the specific reason code within the category.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Forbidden { code, .. } => code,
            Self::InvalidState { rule, .. } => rule,
            Self::InvalidInput { field, .. } => field,
            Self::Unauthenticated { .. }
            | Self::ResourceNotFound { .. }
            | Self::Conflict { .. }
            | Self::StoreUnavailable { .. }
            | Self::Internal { .. } => self.category(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated { reason } => {
                write!(f, "Authentication required: {reason}")
            }
            Self::Forbidden {
                action, message, ..
            } => {
                write!(f, "Forbidden: '{action}': {message}")
            }
            Self::InvalidState { rule, message } => {
                write!(f, "Invalid state ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::StoreUnavailable { message } => write!(f, "Store unavailable: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated { reason } => Self::Unauthenticated { reason },
            AuthError::Forbidden {
                action,
                code,
                message,
            } => Self::Forbidden {
                action,
                code,
                message,
            },
        }
    }
}

fn invalid_input(field: &str, err: &DomainError) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    }
}

fn invalid_state(rule: &str, err: &DomainError) -> ApiError {
    ApiError::InvalidState {
        rule: rule.to_string(),
        message: err.to_string(),
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match &err {
        DomainError::InvalidStatus(_) => invalid_input("status", &err),
        DomainError::InvalidRole(_) => invalid_input("role", &err),
        DomainError::InvalidStatusTransition { .. } => invalid_state("status_transition", &err),
        DomainError::ComplaintClosed { .. } => invalid_state("complaint_closed", &err),
        DomainError::AwaitingPrincipalReview { .. } => {
            invalid_state("awaiting_principal_review", &err)
        }
        DomainError::NotAwaitingPrincipalReview { .. } => {
            invalid_state("not_awaiting_principal_review", &err)
        }
        DomainError::NoLetterToReview => ApiError::Forbidden {
            action: String::from("principal_review"),
            code: String::from("no_letter_to_review"),
            message: err.to_string(),
        },
        DomainError::NoAssignee => invalid_state("no_assignee", &err),
        DomainError::NoDepartment => invalid_state("no_department", &err),
        DomainError::UnknownUser(_) => invalid_input("assignee_user_id", &err),
        DomainError::UnknownDepartment(_) => invalid_input("department_id", &err),
        DomainError::EmptyLetter | DomainError::EmptyMessage => invalid_input("body", &err),
        DomainError::EmptyReturnReason => invalid_input("reason", &err),
        DomainError::MissingSummary | DomainError::SummaryTooLong { .. } => {
            invalid_input("summary", &err)
        }
        DomainError::MissingSigner => invalid_input("signed_by_user_id", &err),
        DomainError::MessageHistoryRewritten { .. } | DomainError::MessageAuthorMismatch { .. } => {
            invalid_input("messages", &err)
        }
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::EmptyPatch => ApiError::InvalidInput {
            field: String::from("patch"),
            message: err.to_string(),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Store outages stay distinct from record-level failures so callers can
/// decide whether to retry.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    if err.is_unavailable() {
        return ApiError::StoreUnavailable {
            message: err.to_string(),
        };
    }

    match err {
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Complaint"),
            message,
        },
        PersistenceError::RowOutOfRange { .. } => ApiError::ResourceNotFound {
            resource_type: String::from("Complaint"),
            message: err.to_string(),
        },
        PersistenceError::StaleWrite { .. } | PersistenceError::DuplicateId(_) => {
            ApiError::Conflict {
                message: err.to_string(),
            }
        }
        _ => ApiError::Internal {
            message: err.to_string(),
        },
    }
}
