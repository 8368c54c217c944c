// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{Message, UserId};

/// Maximum length of a closure summary, in characters.
pub const MAX_SUMMARY_LENGTH: usize = 5000;

/// Validates an assignee letter body.
///
/// # Returns
///
/// The trimmed body.
///
/// # Errors
///
/// Returns `DomainError::EmptyLetter` if the body is blank.
pub fn validate_letter_body(body: &str) -> Result<String, DomainError> {
    let trimmed: &str = body.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyLetter);
    }
    Ok(trimmed.to_string())
}

/// Validates a message body.
///
/// # Errors
///
/// Returns `DomainError::EmptyMessage` if the body is blank.
pub fn validate_message_body(body: &str) -> Result<String, DomainError> {
    let trimmed: &str = body.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyMessage);
    }
    Ok(trimmed.to_string())
}

/// Validates the reason given when returning a complaint for redo.
///
/// # Errors
///
/// Returns `DomainError::EmptyReturnReason` if the reason is blank.
pub fn validate_return_reason(reason: &str) -> Result<String, DomainError> {
    let trimmed: &str = reason.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyReturnReason);
    }
    Ok(trimmed.to_string())
}

/// Validates a closure summary.
///
/// # Errors
///
/// Returns an error if:
/// - The summary is blank
/// - The trimmed summary is longer than `MAX_SUMMARY_LENGTH` characters
pub fn validate_closure_summary(summary: &str) -> Result<String, DomainError> {
    let trimmed: &str = summary.trim();
    if trimmed.is_empty() {
        return Err(DomainError::MissingSummary);
    }

    let length: usize = trimmed.chars().count();
    if length > MAX_SUMMARY_LENGTH {
        return Err(DomainError::SummaryTooLong {
            length,
            max: MAX_SUMMARY_LENGTH,
        });
    }

    Ok(trimmed.to_string())
}

/// Validates the signer of a closure.
///
/// # Errors
///
/// Returns `DomainError::MissingSigner` if the signer id is blank.
pub fn validate_signer(signer: &str) -> Result<UserId, DomainError> {
    UserId::parse_optional(signer).ok_or(DomainError::MissingSigner)
}

/// Validates that `proposed` only appends to `existing`.
///
/// Every existing message must be kept unchanged and in order, and every
/// appended message must be authored by `author`.
///
/// # Returns
///
/// The appended messages.
///
/// # Errors
///
/// Returns an error if:
/// - An existing message was dropped, reordered or edited
/// - An appended message has a blank body
/// - An appended message names another author
pub fn validate_message_extension<'a>(
    existing: &[Message],
    proposed: &'a [Message],
    author: &UserId,
) -> Result<&'a [Message], DomainError> {
    if proposed.len() < existing.len() || proposed[..existing.len()] != *existing {
        return Err(DomainError::MessageHistoryRewritten {
            existing: existing.len(),
        });
    }

    let appended: &[Message] = &proposed[existing.len()..];
    for message in appended {
        if message.body.trim().is_empty() {
            return Err(DomainError::EmptyMessage);
        }
        if &message.author_id != author {
            return Err(DomainError::MessageAuthorMismatch {
                message_id: message.id.clone(),
            });
        }
    }

    Ok(appended)
}
