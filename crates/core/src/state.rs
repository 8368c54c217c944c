// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use complaint_desk_audit::AuditEvent;
use complaint_desk_domain::Complaint;

/// The result of a successful complaint transition.
///
/// A transition either fully succeeds, producing the next record and
/// exactly one audit event, or fails and leaves nothing behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The complaint after the transition.
    pub new_complaint: Complaint,
    /// The audit event describing the transition.
    pub audit_event: AuditEvent,
}
