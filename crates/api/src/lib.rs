// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the complaint desk.
//!
//! This crate turns credentials and request bodies into authorized
//! commands, runs them through the lifecycle engine, commits them to the
//! store and plans the resulting notifications. It is transport-agnostic;
//! the HTTP server maps `ApiError` onto status codes.

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
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod capabilities;
mod error;
mod notifications;
mod query;
mod request_response;
mod stats;
mod workflow;

#[cfg(test)]
mod tests;

pub use auth::{
    AuthenticatedActor, AuthenticationService, AuthorizationService, REVIEW_LOCK_CODE, can_assign,
    can_act_as_principal, can_change_department, can_mutate, can_read, can_write_letter,
    review_lock_violation,
};
pub use capabilities::compute_complaint_capabilities;
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use notifications::{
    ClosureArtifact, ClosureArtifactRenderer, DeliveryReport, LogNotifier, Notification,
    NotificationError, NotificationKind, Notifier, TextClosureRenderer, deliver,
    plan_notifications,
};
pub use query::{Cursor, DEFAULT_PAGE_SIZE, ListQuery, MAX_PAGE_SIZE, list_complaints, visible_complaints};
pub use request_response::{
    ApproveAndCloseRequest, AssignRequest, AssignableUserInfo, AssignableUsersResponse,
    Capability, ChangeDepartmentRequest, ComplaintCapabilities, ComplaintListResponse,
    ComplaintResponse, ComplaintStatsResponse, ListComplaintsRequest, PatchComplaintRequest,
    PatchMessage, PostMessageRequest, RepairNullCellsResponse, ReturnForRedoRequest,
    SaveLetterRequest, parse_request,
};
pub use stats::{
    ComplaintStats, DepartmentStats, ReturnStats, SLA_DAYS, SlaMetrics, Totals, complaint_stats,
};
pub use workflow::{CommittedTransition, PreparedTransition, WorkflowService};
