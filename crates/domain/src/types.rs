// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::complaint_status::ComplaintStatus;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Left-to-right and right-to-left marks that spreadsheets and
/// bidirectional text editors leave around identifiers.
const DIRECTIONALITY_MARKS: [char; 2] = ['\u{200E}', '\u{200F}'];

/// Strips whitespace and directionality marks from an identifier.
fn clean_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|c| !DIRECTIONALITY_MARKS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Rewrites a numeric string into its canonical decimal form.
///
/// `"007"` becomes `"7"`, `"1.50"` becomes `"1.5"`, `"2.0"` becomes `"2"`.
/// Returns `None` when the input is not of the form `-?\d+(\.\d+)?`.
fn canonicalize_numeric(value: &str) -> Option<String> {
    let (negative, unsigned): (bool, &str) = value
        .strip_prefix('-')
        .map_or((false, value), |rest| (true, rest));
    let (integer, fraction): (&str, Option<&str>) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(integer) || fraction.is_some_and(|f| !all_digits(f)) {
        return None;
    }

    let integer: &str = match integer.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };
    let fraction: Option<&str> = fraction
        .map(|f| f.trim_end_matches('0'))
        .filter(|f| !f.is_empty());

    let mut canonical: String = String::new();
    if negative && (integer != "0" || fraction.is_some()) {
        canonical.push('-');
    }
    canonical.push_str(integer);
    if let Some(fraction) = fraction {
        canonical.push('.');
        canonical.push_str(fraction);
    }
    Some(canonical)
}

/// Normalizes a complaint identifier for comparison and storage.
///
/// Trims, strips directionality marks and a leading spreadsheet text marker
/// (`'`), and canonicalizes numeric identifiers so that `"01"` and `"1"`
/// address the same complaint.
#[must_use]
pub fn normalize_id(raw: &str) -> String {
    let cleaned: String = clean_identifier(raw);
    let unquoted: &str = cleaned.strip_prefix('\'').unwrap_or(&cleaned).trim();
    canonicalize_numeric(unquoted).unwrap_or_else(|| unquoted.to_string())
}

/// Stable identifier of a complaint.
///
/// Identifiers are normalized on construction, so equality is
/// normalized-id equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ComplaintId {
    value: String,
}

impl ComplaintId {
    /// Creates a new `ComplaintId`.
    ///
    /// # Arguments
    ///
    /// * `value` - The raw identifier (will be normalized)
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: normalize_id(value),
        }
    }

    /// Returns the normalized identifier.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns true if the identifier is empty after normalization.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl From<String> for ComplaintId {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<ComplaintId> for String {
    fn from(id: ComplaintId) -> Self {
        id.value
    }
}

impl std::fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Identifier of a directory user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct UserId {
    value: String,
}

impl UserId {
    /// Creates a new `UserId`, trimming whitespace and directionality marks.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: clean_identifier(value),
        }
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns true if the identifier is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Parses an optional identifier, treating blank input as absent.
    #[must_use]
    pub fn parse_optional(value: &str) -> Option<Self> {
        Some(Self::new(value)).filter(|id| !id.is_empty())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.value
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Identifier of a department.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DepartmentId {
    value: String,
}

impl DepartmentId {
    /// Creates a new `DepartmentId`, trimming whitespace and directionality marks.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: clean_identifier(value),
        }
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns true if the identifier is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Parses an optional identifier, treating blank input as absent.
    #[must_use]
    pub fn parse_optional(value: &str) -> Option<Self> {
        Some(Self::new(value)).filter(|id| !id.is_empty())
    }
}

impl From<String> for DepartmentId {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<DepartmentId> for String {
    fn from(id: DepartmentId) -> Self {
        id.value
    }
}

impl std::fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// The person who filed the complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reporter {
    /// A staff member of the institution.
    Staff {
        full_name: String,
        email: String,
        phone: String,
        job_title: String,
        department_id: Option<DepartmentId>,
    },
    /// A parent or a student.
    ParentStudent {
        full_name: String,
        email: String,
        phone: String,
        grade: String,
        class_number: String,
    },
}

impl Reporter {
    /// Returns the storage tag of the reporter kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Staff { .. } => "STAFF",
            Self::ParentStudent { .. } => "PARENT_STUDENT",
        }
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        match self {
            Self::Staff { full_name, .. } | Self::ParentStudent { full_name, .. } => full_name,
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        match self {
            Self::Staff { email, .. } | Self::ParentStudent { email, .. } => email,
        }
    }

    #[must_use]
    pub fn phone(&self) -> &str {
        match self {
            Self::Staff { phone, .. } | Self::ParentStudent { phone, .. } => phone,
        }
    }
}

/// One entry of the append-only communication trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub author_id: UserId,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The assignee's formal reply draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssigneeLetter {
    pub body: String,
    pub author_user_id: UserId,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Set only when the letter is submitted for principal review.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub submitted_at: Option<OffsetDateTime>,
}

impl AssigneeLetter {
    /// Returns true if the letter has a non-blank body.
    #[must_use]
    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }
}

/// The most recent "sent back for redo" state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnInfo {
    /// Number of returns over the complaint's whole lifetime.
    pub count: u32,
    pub reason: String,
    #[serde(with = "time::serde::rfc3339")]
    pub returned_at: OffsetDateTime,
    pub returned_by_user_id: UserId,
}

/// One submit-to-decision round with the principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCycle {
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
    pub submitted_by_user_id: UserId,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub returned_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub return_reason: Option<String>,
    #[serde(default)]
    pub returned_by_user_id: Option<UserId>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub approved_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub principal_user_id: Option<UserId>,
    #[serde(default)]
    pub justified: Option<bool>,
    #[serde(default)]
    pub summary: Option<String>,
    /// Set when a reassignment pulls the complaint out of review. Not a
    /// return.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub withdrawn_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub withdrawn_by_user_id: Option<UserId>,
}

impl ReviewCycle {
    /// Opens a new review cycle.
    #[must_use]
    pub const fn new(submitted_at: OffsetDateTime, submitted_by_user_id: UserId) -> Self {
        Self {
            submitted_at,
            submitted_by_user_id,
            returned_at: None,
            return_reason: None,
            returned_by_user_id: None,
            approved_at: None,
            principal_user_id: None,
            justified: None,
            summary: None,
            withdrawn_at: None,
            withdrawn_by_user_id: None,
        }
    }

    /// Returns true if the cycle has not been returned, approved or
    /// withdrawn.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.returned_at.is_none() && self.approved_at.is_none() && self.withdrawn_at.is_none()
    }
}

/// The principal's closing decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalReview {
    pub justified: bool,
    pub summary: String,
    pub signed_by_user_id: UserId,
    #[serde(with = "time::serde::rfc3339")]
    pub signed_at: OffsetDateTime,
    #[serde(default)]
    pub signature_image_path: Option<String>,
}

/// Record of the closure notice sent to the reporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEmail {
    pub sent: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub sent_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub to: Option<String>,
}

/// The complaint aggregate.
///
/// Fields are public for construction and inspection; every mutation of a
/// stored complaint goes through the transition engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: ComplaintId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub subject: String,
    pub title: String,
    pub body: String,
    pub status: ComplaintStatus,
    pub department_id: Option<DepartmentId>,
    pub assignee_user_id: Option<UserId>,
    pub created_by_id: Option<UserId>,
    pub reporter: Reporter,
    pub messages: Vec<Message>,
    pub assignee_letter: Option<AssigneeLetter>,
    pub return_info: Option<ReturnInfo>,
    pub review_cycles: Vec<ReviewCycle>,
    pub principal_review: Option<PrincipalReview>,
    pub notification_email: Option<NotificationEmail>,
}

impl Complaint {
    /// Creates a freshly received complaint: `OPEN`, unassigned, no history.
    ///
    /// # Arguments
    ///
    /// * `id` - The complaint identifier
    /// * `subject` - Short category of the complaint
    /// * `title` - Title given by the reporter
    /// * `body` - Full complaint text
    /// * `reporter` - Who filed the complaint
    /// * `created_at` - Intake timestamp
    #[must_use]
    pub const fn new(
        id: ComplaintId,
        subject: String,
        title: String,
        body: String,
        reporter: Reporter,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            created_at,
            updated_at: created_at,
            subject,
            title,
            body,
            status: ComplaintStatus::Open,
            department_id: None,
            assignee_user_id: None,
            created_by_id: None,
            reporter,
            messages: Vec::new(),
            assignee_letter: None,
            return_info: None,
            review_cycles: Vec::new(),
            principal_review: None,
            notification_email: None,
        }
    }

    /// Returns true if there is a non-blank assignee letter.
    #[must_use]
    pub fn has_employee_letter(&self) -> bool {
        self.assignee_letter
            .as_ref()
            .is_some_and(AssigneeLetter::has_body)
    }

    /// Returns true if `user_id` is the current assignee.
    #[must_use]
    pub fn is_assignee(&self, user_id: &UserId) -> bool {
        self.assignee_user_id.as_ref() == Some(user_id)
    }

    /// Rebuilds the assignee letter from the latest message written by the
    /// current assignee.
    ///
    /// The derived letter counts as submitted only if the complaint has
    /// already reached principal review.
    #[must_use]
    pub fn derive_letter_from_messages(&self) -> Option<AssigneeLetter> {
        let assignee: &UserId = self.assignee_user_id.as_ref()?;
        let latest: &Message = self
            .messages
            .iter()
            .rev()
            .find(|m| &m.author_id == assignee && !m.body.trim().is_empty())?;

        let submitted: bool = matches!(
            self.status,
            ComplaintStatus::AwaitingPrincipalReview | ComplaintStatus::Closed
        );

        Some(AssigneeLetter {
            body: latest.body.clone(),
            author_user_id: assignee.clone(),
            updated_at: latest.created_at,
            submitted_at: submitted.then_some(latest.created_at),
        })
    }

    /// Fills in a missing assignee letter from the message history.
    pub fn restore_letter_from_messages(&mut self) {
        if self.assignee_letter.is_none() {
            self.assignee_letter = self.derive_letter_from_messages();
        }
    }

    /// Number of times the complaint has been returned for redo.
    ///
    /// Survives `return_info` being cleared by later saves or approval,
    /// because every return also closes a review cycle.
    #[must_use]
    pub fn lifetime_return_count(&self) -> u32 {
        let from_cycles: u32 = u32::try_from(
            self.review_cycles
                .iter()
                .filter(|c| c.returned_at.is_some())
                .count(),
        )
        .unwrap_or(u32::MAX);
        let from_info: u32 = self.return_info.as_ref().map_or(0, |r| r.count);
        from_cycles.max(from_info)
    }

    /// Identifier for the next appended message.
    ///
    /// Sequential on the trail length, skipping any id already present on
    /// the trail.
    #[must_use]
    pub fn next_message_id(&self) -> String {
        let mut sequence: usize = self.messages.len() + 1;
        loop {
            let id: String = format!("{}-m{sequence}", self.id.value());
            if !self.messages.iter().any(|message| message.id == id) {
                return id;
            }
            sequence += 1;
        }
    }
}
