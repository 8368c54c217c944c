// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod complaint_status;
mod directory;
mod error;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use complaint_status::ComplaintStatus;
pub use directory::{Department, Directory, Role, User, is_valid_email};
pub use error::DomainError;
pub use types::{
    AssigneeLetter, Complaint, ComplaintId, DepartmentId, Message, NotificationEmail,
    PrincipalReview, Reporter, ReturnInfo, ReviewCycle, UserId, normalize_id,
};
pub use validation::{
    MAX_SUMMARY_LENGTH, validate_closure_summary, validate_letter_body, validate_message_body,
    validate_message_extension, validate_return_reason, validate_signer,
};
