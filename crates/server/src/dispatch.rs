// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Background delivery of complaint notifications.
//!
//! Handlers hand a committed record and its planned notifications to the
//! dispatcher and return immediately. A single worker task drains the queue,
//! runs delivery on the blocking pool, and records closure notices on the
//! complaint row. Delivery failures are logged and never reach a caller.

use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use complaint_desk_api::{ClosureArtifactRenderer, DeliveryReport, Notification, Notifier, deliver};
use complaint_desk_domain::{Complaint, ComplaintId};

use crate::SharedStore;

/// One committed transition waiting for delivery.
#[derive(Debug)]
struct DeliveryJob {
    complaint: Complaint,
    notifications: Vec<Notification>,
}

/// Queues notifications for the background worker.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: mpsc::UnboundedSender<DeliveryJob>,
}

impl NotificationDispatcher {
    /// Starts the delivery worker.
    ///
    /// The worker stops once every clone of the returned dispatcher has been
    /// dropped and the queue is drained.
    ///
    /// # Arguments
    ///
    /// * `store` - The shared store, used to record closure notices
    /// * `notifier` - The delivery collaborator
    /// * `renderer` - Renders the artifact attached to closure notices
    #[must_use]
    pub fn spawn(
        store: SharedStore,
        notifier: Arc<dyn Notifier>,
        renderer: Arc<dyn ClosureArtifactRenderer>,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel::<DeliveryJob>();
        let worker: JoinHandle<()> = tokio::spawn(run(receiver, store, notifier, renderer));
        (Self { sender }, worker)
    }

    /// Queues notifications without waiting for delivery.
    pub fn enqueue(&self, complaint: Complaint, notifications: Vec<Notification>) {
        if notifications.is_empty() {
            return;
        }

        let complaint_id: ComplaintId = complaint.id.clone();
        let queued: usize = notifications.len();
        if self
            .sender
            .send(DeliveryJob {
                complaint,
                notifications,
            })
            .is_err()
        {
            error!(
                complaint_id = complaint_id.value(),
                queued, "Notification worker has stopped; dropping notifications"
            );
            return;
        }
        debug!(
            complaint_id = complaint_id.value(),
            queued, "Queued notifications"
        );
    }
}

async fn run(
    mut receiver: mpsc::UnboundedReceiver<DeliveryJob>,
    store: SharedStore,
    notifier: Arc<dyn Notifier>,
    renderer: Arc<dyn ClosureArtifactRenderer>,
) {
    info!("Notification worker started");

    while let Some(job) = receiver.recv().await {
        let complaint_id: ComplaintId = job.complaint.id.clone();
        let notifier: Arc<dyn Notifier> = Arc::clone(&notifier);
        let renderer: Arc<dyn ClosureArtifactRenderer> = Arc::clone(&renderer);

        let delivery = tokio::task::spawn_blocking(move || {
            deliver(
                &job.notifications,
                &job.complaint,
                notifier.as_ref(),
                renderer.as_ref(),
            )
        })
        .await;

        let report: DeliveryReport = match delivery {
            Ok(report) => report,
            Err(e) => {
                error!(
                    complaint_id = complaint_id.value(),
                    error = %e,
                    "Notification delivery task failed"
                );
                continue;
            }
        };

        debug!(
            complaint_id = complaint_id.value(),
            sent = report.sent,
            failed = report.failed,
            "Delivered notifications"
        );

        if let Some(to) = report.closure_sent_to {
            let mut store = store.lock().await;
            let recorded = store.record_notification_email(
                &complaint_id,
                &to,
                OffsetDateTime::now_utc(),
            );
            drop(store);

            if let Err(e) = recorded {
                warn!(
                    complaint_id = complaint_id.value(),
                    error = %e,
                    "Failed to record closure notification"
                );
            }
        }
    }

    info!("Notification worker stopped");
}
