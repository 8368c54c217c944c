// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Complaint status states and transition rules.
//!
//! `OPEN` and `ASSIGNED` differ only by whether an assignee is set.
//! `CLOSED` is terminal: nothing reopens a closed complaint.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status of a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    /// Received, nobody assigned
    Open,
    /// An assignee is responsible, no letter drafted yet
    Assigned,
    /// The assignee is drafting (or redrafting) a response
    InProgress,
    /// A letter was submitted and waits for the principal
    AwaitingPrincipalReview,
    /// Approved and closed by a principal
    Closed,
}

impl ComplaintStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Open,
        Self::Assigned,
        Self::InProgress,
        Self::AwaitingPrincipalReview,
        Self::Closed,
    ];

    /// Returns the wire and storage representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Assigned => "ASSIGNED",
            Self::InProgress => "IN_PROGRESS",
            Self::AwaitingPrincipalReview => "AWAITING_PRINCIPAL_REVIEW",
            Self::Closed => "CLOSED",
        }
    }

    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "OPEN" => Ok(Self::Open),
            "ASSIGNED" => Ok(Self::Assigned),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "AWAITING_PRINCIPAL_REVIEW" => Ok(Self::AwaitingPrincipalReview),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }

    /// Returns true if this status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns true while the complaint still needs work.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ComplaintClosed`-style transition errors when
    /// leaving a terminal state, or `InvalidStatusTransition` when the
    /// lifecycle has no such edge.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }

        let valid: bool = match new_status {
            // Assignment and unassignment are available from any open state.
            Self::Open | Self::Assigned => true,
            Self::InProgress => matches!(
                self,
                Self::Open | Self::Assigned | Self::InProgress | Self::AwaitingPrincipalReview
            ),
            Self::AwaitingPrincipalReview => {
                matches!(self, Self::Open | Self::Assigned | Self::InProgress)
            }
            Self::Closed => matches!(self, Self::AwaitingPrincipalReview),
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "transition not permitted by complaint lifecycle rules".to_string(),
            })
        }
    }
}

impl FromStr for ComplaintStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s.trim())
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
