// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notification planning and delivery.
//!
//! Planning is pure: it compares the record before and after a committed
//! transition and decides who must hear about it. Delivery goes through the
//! `Notifier` and `ClosureArtifactRenderer` collaborators and never fails
//! the caller.

use std::fmt::Write as _;

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info, warn};

use complaint_desk_domain::{
    Complaint, ComplaintId, ComplaintStatus, Directory, Role, User, UserId, is_valid_email,
};

/// Why a notification is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// The recipient became the assignee.
    Assigned,
    /// The complaint was taken away from the recipient.
    ReassignedAway,
    /// A letter is waiting for the principal.
    AwaitingPrincipalReview,
    /// The complaint was closed; sent to the reporter.
    ClosureNotice,
    /// The complaint moved into the recipient's department.
    DepartmentChanged,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::ReassignedAway => "reassigned_away",
            Self::AwaitingPrincipalReview => "awaiting_principal_review",
            Self::ClosureNotice => "closure_notice",
            Self::DepartmentChanged => "department_changed",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One planned notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub complaint_id: ComplaintId,
    /// Valid email addresses, never empty.
    pub recipients: Vec<String>,
    pub subject: String,
    /// Body paragraphs.
    pub lines: Vec<String>,
    /// Link to the complaint, when a base URL is configured.
    pub link: Option<String>,
}

/// A rendered closure document attached to the closure notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureArtifact {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Errors raised by delivery collaborators.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotificationError {
    #[error("Failed to render closure artifact for complaint {complaint_id}: {reason}")]
    Render {
        complaint_id: String,
        reason: String,
    },
    #[error("Failed to deliver {kind} notification to {recipients}: {reason}")]
    Delivery {
        kind: String,
        recipients: String,
        reason: String,
    },
}

/// Sends notifications to their recipients.
pub trait Notifier: Send + Sync {
    /// Sends one notification, with the closure artifact for closure notices.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::Delivery` if the message was not sent.
    fn send(
        &self,
        notification: &Notification,
        attachment: Option<&ClosureArtifact>,
    ) -> Result<(), NotificationError>;
}

/// Renders the closure document of a closed complaint.
pub trait ClosureArtifactRenderer: Send + Sync {
    /// Renders the closure artifact.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::Render` if the complaint has no closure
    /// or the document cannot be produced.
    fn render(&self, complaint: &Complaint) -> Result<ClosureArtifact, NotificationError>;
}

/// A notifier that writes notifications to the log instead of mailing them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(
        &self,
        notification: &Notification,
        attachment: Option<&ClosureArtifact>,
    ) -> Result<(), NotificationError> {
        info!(
            kind = notification.kind.as_str(),
            complaint_id = notification.complaint_id.value(),
            recipients = %notification.recipients.join(", "),
            subject = notification.subject.as_str(),
            attachment = attachment.map(|a| a.file_name.as_str()),
            "Notification sent"
        );
        Ok(())
    }
}

/// Renders the closure as a plain-text document.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextClosureRenderer;

impl ClosureArtifactRenderer for TextClosureRenderer {
    fn render(&self, complaint: &Complaint) -> Result<ClosureArtifact, NotificationError> {
        let render_error = |reason: String| NotificationError::Render {
            complaint_id: complaint.id.value().to_string(),
            reason,
        };

        let review = complaint
            .principal_review
            .as_ref()
            .ok_or_else(|| render_error(String::from("complaint is not closed")))?;
        let signed_at: String = review
            .signed_at
            .format(&Rfc3339)
            .map_err(|e| render_error(e.to_string()))?;

        let mut text: String = String::new();
        let _ = writeln!(text, "Complaint {}", complaint.id);
        let _ = writeln!(text, "Subject: {}", complaint.subject);
        let _ = writeln!(text, "Title: {}", complaint.title);
        let _ = writeln!(text, "Reporter: {}", complaint.reporter.full_name());
        let _ = writeln!(
            text,
            "Finding: {}",
            if review.justified {
                "justified"
            } else {
                "not justified"
            }
        );
        let _ = writeln!(text);
        let _ = writeln!(text, "{}", review.summary);
        if let Some(letter) = complaint
            .assignee_letter
            .as_ref()
            .filter(|l| l.has_body())
        {
            let _ = writeln!(text);
            let _ = writeln!(text, "{}", letter.body.trim());
        }
        let _ = writeln!(text);
        let _ = writeln!(text, "Signed by {} at {signed_at}", review.signed_by_user_id);

        Ok(ClosureArtifact {
            file_name: format!("complaint-{}-closure.txt", complaint.id),
            content_type: String::from("text/plain; charset=utf-8"),
            bytes: text.into_bytes(),
        })
    }
}

fn complaint_link(base_url: Option<&str>, id: &ComplaintId) -> Option<String> {
    base_url
        .map(|base| base.trim().trim_end_matches('/'))
        .filter(|base| !base.is_empty())
        .map(|base| format!("{base}/complaints/{id}"))
}

fn user_email(directory: &Directory, user_id: &UserId) -> Option<String> {
    directory
        .user(user_id)
        .and_then(User::primary_email)
        .map(str::to_string)
}

fn user_name(directory: &Directory, user_id: &UserId) -> String {
    directory
        .user(user_id)
        .map_or_else(|| user_id.value().to_string(), |u| u.name.clone())
}

fn entered(before: &Complaint, after: &Complaint, status: ComplaintStatus) -> bool {
    before.status != status && after.status == status
}

/// Collects planned notifications, dropping those nobody can receive.
struct Plan<'a> {
    complaint: &'a Complaint,
    link: Option<String>,
    notifications: Vec<Notification>,
}

impl Plan<'_> {
    fn push(
        &mut self,
        kind: NotificationKind,
        recipients: Vec<String>,
        subject: String,
        lines: Vec<String>,
    ) {
        if recipients.is_empty() {
            debug!(
                kind = kind.as_str(),
                complaint_id = self.complaint.id.value(),
                "Dropping notification without a valid recipient"
            );
            return;
        }
        self.notifications.push(Notification {
            kind,
            complaint_id: self.complaint.id.clone(),
            recipients,
            subject,
            lines,
            link: self.link.clone(),
        });
    }
}

/// Plans the notifications caused by a committed transition.
///
/// # Arguments
///
/// * `before` - The record as loaded
/// * `after` - The record as committed
/// * `directory` - Directory snapshot for recipients
/// * `base_url` - Application URL used for links, if configured
#[must_use]
pub fn plan_notifications(
    before: &Complaint,
    after: &Complaint,
    directory: &Directory,
    base_url: Option<&str>,
) -> Vec<Notification> {
    let id: &ComplaintId = &after.id;
    let mut plan: Plan<'_> = Plan {
        complaint: after,
        link: complaint_link(base_url, id),
        notifications: Vec::new(),
    };

    let assignee_changed: bool = before.assignee_user_id != after.assignee_user_id;
    let newly_assigned: Option<&UserId> = if assignee_changed {
        after.assignee_user_id.as_ref()
    } else {
        after
            .assignee_user_id
            .as_ref()
            .filter(|_| entered(before, after, ComplaintStatus::Assigned))
    };
    if let Some(assignee) = newly_assigned {
        plan.push(
            NotificationKind::Assigned,
            user_email(directory, assignee).into_iter().collect(),
            format!("Complaint #{id} was assigned to you"),
            vec![
                format!(
                    "{}, a complaint was assigned to you.",
                    user_name(directory, assignee)
                ),
                after.title.clone(),
            ],
        );
    }
    if let Some(previous) = before.assignee_user_id.as_ref().filter(|_| assignee_changed) {
        plan.push(
            NotificationKind::ReassignedAway,
            user_email(directory, previous).into_iter().collect(),
            format!("Complaint #{id} was reassigned"),
            vec![format!(
                "{}, a complaint assigned to you was handed to someone else.",
                user_name(directory, previous)
            )],
        );
    }

    if entered(before, after, ComplaintStatus::AwaitingPrincipalReview) {
        let recipients: Vec<String> = directory
            .users_with_role(Role::Principal)
            .into_iter()
            .filter_map(|u| u.primary_email().map(str::to_string))
            .collect();
        plan.push(
            NotificationKind::AwaitingPrincipalReview,
            recipients,
            format!("Complaint #{id} awaits principal review"),
            vec![
                String::from("A reply letter is waiting for your review."),
                after.title.clone(),
            ],
        );
    }

    if entered(before, after, ComplaintStatus::Closed) {
        let email: &str = after.reporter.email().trim();
        let recipients: Vec<String> = if is_valid_email(email) {
            vec![email.to_string()]
        } else {
            Vec::new()
        };
        let summary: String = after
            .principal_review
            .as_ref()
            .map(|r| r.summary.clone())
            .unwrap_or_default();
        plan.push(
            NotificationKind::ClosureNotice,
            recipients,
            format!("Your complaint #{id} has been handled"),
            vec![
                format!("Dear {},", after.reporter.full_name()),
                summary,
            ],
        );
    }

    let new_manager = after
        .department_id
        .as_ref()
        .filter(|_| before.department_id != after.department_id)
        .and_then(|d| directory.department(d))
        .and_then(|d| d.manager_user_id.as_ref().map(|m| (d, m)));
    if let Some((department, manager)) = new_manager {
        plan.push(
            NotificationKind::DepartmentChanged,
            user_email(directory, manager).into_iter().collect(),
            format!("Complaint #{id} moved to {}", department.name),
            vec![
                format!("A complaint was moved to {}.", department.name),
                after.title.clone(),
            ],
        );
    }

    plan.notifications
}

/// Outcome of delivering a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
    /// Recipients of a delivered closure notice.
    pub closure_sent_to: Option<String>,
}

/// Delivers a notification plan.
///
/// Failures are logged and counted; they never propagate.
///
/// # Arguments
///
/// * `plan` - Notifications from `plan_notifications`
/// * `complaint` - The committed record, used for the closure artifact
/// * `notifier` - The delivery collaborator
/// * `renderer` - The closure artifact collaborator
pub fn deliver(
    plan: &[Notification],
    complaint: &Complaint,
    notifier: &dyn Notifier,
    renderer: &dyn ClosureArtifactRenderer,
) -> DeliveryReport {
    let mut report: DeliveryReport = DeliveryReport::default();

    for notification in plan {
        let attachment: Option<ClosureArtifact> =
            if notification.kind == NotificationKind::ClosureNotice {
                match renderer.render(complaint) {
                    Ok(artifact) => Some(artifact),
                    Err(e) => {
                        warn!(
                            complaint_id = complaint.id.value(),
                            error = %e,
                            "Closure notice not sent"
                        );
                        report.failed += 1;
                        continue;
                    }
                }
            } else {
                None
            };

        match notifier.send(notification, attachment.as_ref()) {
            Ok(()) => {
                report.sent += 1;
                if notification.kind == NotificationKind::ClosureNotice {
                    report.closure_sent_to = Some(notification.recipients.join(", "));
                }
            }
            Err(e) => {
                warn!(
                    kind = notification.kind.as_str(),
                    complaint_id = complaint.id.value(),
                    error = %e,
                    "Notification delivery failed"
                );
                report.failed += 1;
            }
        }
    }

    report
}
