// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Dashboard statistics over the complaints visible to an actor.
//!
//! Durations are counted in whole days, rounded down. A complaint is
//! overdue when it is still active more than `SLA_DAYS` after intake.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use complaint_desk_domain::{Complaint, ComplaintStatus, Directory};

/// Response target for complaints, in days.
pub const SLA_DAYS: i64 = 7;

/// Key used for complaints without a department.
const NO_DEPARTMENT: &str = "unknown";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub total: usize,
    pub active: usize,
    pub closed: usize,
    pub awaiting_principal: usize,
    /// Active complaints without an assignee.
    pub unassigned: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentStats {
    pub department_id: String,
    /// Department name from the directory, if known.
    pub name: Option<String>,
    pub total: usize,
    pub active: usize,
    pub overdue: usize,
}

/// Service-level metrics. Each is `None` when there is nothing to measure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlaMetrics {
    pub average_days_to_close: Option<f64>,
    pub median_days_to_close: Option<i64>,
    /// Share of closed complaints closed within `SLA_DAYS`, from 0 to 1.
    pub closed_within_sla: Option<f64>,
    pub median_open_age_days: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnStats {
    /// Complaints returned for redo at least once.
    pub complaints_returned: usize,
    /// Returns over all complaints.
    pub total_returns: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintStats {
    pub totals: Totals,
    /// Counts per status wire name.
    pub by_status: BTreeMap<String, usize>,
    /// Per-department counts, largest first.
    pub by_department: Vec<DepartmentStats>,
    pub sla: SlaMetrics,
    pub returns: ReturnStats,
}

/// Whole days between two instants, never negative.
fn days_between(from: OffsetDateTime, to: OffsetDateTime) -> i64 {
    (to - from).whole_days().max(0)
}

fn is_overdue(complaint: &Complaint, now: OffsetDateTime) -> bool {
    complaint.status.is_active() && days_between(complaint.created_at, now) > SLA_DAYS
}

/// When a closed complaint was closed.
fn closed_at(complaint: &Complaint) -> OffsetDateTime {
    complaint
        .principal_review
        .as_ref()
        .map_or(complaint.updated_at, |review| review.signed_at)
}

/// Upper median of a list of day counts.
fn median(values: &mut [i64]) -> Option<i64> {
    values.sort_unstable();
    values.get(values.len() / 2).copied()
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, whole: usize) -> Option<f64> {
    (whole > 0).then(|| part as f64 / whole as f64)
}

/// Computes statistics over a set of complaints.
///
/// # Arguments
///
/// * `complaints` - The complaints visible to the caller
/// * `directory` - Directory snapshot for department names
/// * `now` - Reference time for ages and overdue checks
#[must_use]
pub fn complaint_stats(
    complaints: &[Complaint],
    directory: &Directory,
    now: OffsetDateTime,
) -> ComplaintStats {
    let mut totals: Totals = Totals {
        total: complaints.len(),
        ..Totals::default()
    };
    let mut by_status: BTreeMap<String, usize> = ComplaintStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    let mut departments: BTreeMap<String, DepartmentStats> = BTreeMap::new();
    let mut close_days: Vec<i64> = Vec::new();
    let mut open_ages: Vec<i64> = Vec::new();
    let mut returns: ReturnStats = ReturnStats::default();

    for complaint in complaints {
        let overdue: bool = is_overdue(complaint, now);
        *by_status
            .entry(complaint.status.as_str().to_string())
            .or_insert(0) += 1;

        if complaint.status.is_active() {
            totals.active += 1;
            open_ages.push(days_between(complaint.created_at, now));
            if complaint.assignee_user_id.is_none() {
                totals.unassigned += 1;
            }
        } else {
            totals.closed += 1;
            close_days.push(days_between(complaint.created_at, closed_at(complaint)));
        }
        if complaint.status == ComplaintStatus::AwaitingPrincipalReview {
            totals.awaiting_principal += 1;
        }
        if overdue {
            totals.overdue += 1;
        }

        let key: String = complaint
            .department_id
            .as_ref()
            .map_or_else(|| NO_DEPARTMENT.to_string(), |d| d.value().to_string());
        let entry: &mut DepartmentStats =
            departments
                .entry(key.clone())
                .or_insert_with(|| DepartmentStats {
                    name: complaint
                        .department_id
                        .as_ref()
                        .and_then(|d| directory.department(d))
                        .map(|d| d.name.clone()),
                    department_id: key,
                    total: 0,
                    active: 0,
                    overdue: 0,
                });
        entry.total += 1;
        if complaint.status.is_active() {
            entry.active += 1;
        }
        if overdue {
            entry.overdue += 1;
        }

        let returned: u32 = complaint.lifetime_return_count();
        if returned > 0 {
            returns.complaints_returned += 1;
            returns.total_returns += u64::from(returned);
        }
    }

    let within_sla: usize = close_days.iter().filter(|d| **d <= SLA_DAYS).count();
    #[allow(clippy::cast_precision_loss)]
    let average_days_to_close: Option<f64> = (!close_days.is_empty())
        .then(|| close_days.iter().sum::<i64>() as f64 / close_days.len() as f64);

    let sla: SlaMetrics = SlaMetrics {
        average_days_to_close,
        closed_within_sla: ratio(within_sla, close_days.len()),
        median_days_to_close: median(&mut close_days),
        median_open_age_days: median(&mut open_ages),
    };

    let mut by_department: Vec<DepartmentStats> = departments.into_values().collect();
    by_department.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.department_id.cmp(&b.department_id))
    });

    ComplaintStats {
        totals,
        by_status,
        by_department,
        sla,
        returns,
    }
}
